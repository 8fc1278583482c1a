pub mod aws;
pub mod clock;
pub mod document_table;
pub mod notice_source;
pub mod object_store;
