pub mod downloader;
pub mod filter;
