use crate::contract::CellarId;

pub const NOTICE_OBJECT_PREFIX: &str = "notice_";
pub const NOTICE_OBJECT_EXTENSION: &str = "xml";
pub const NOTICE_DOWNLOAD_PATH: &str = "download-notice.html";

/// Blob key holding the raw notice for `cellar_id`.
pub fn notice_object_key(cellar_id: &CellarId) -> String {
    format!(
        "{NOTICE_OBJECT_PREFIX}{}.{NOTICE_OBJECT_EXTENSION}",
        cellar_id.as_str()
    )
}

pub fn notice_download_url(notice_host: &str, cellar_id: &CellarId) -> String {
    let host = notice_host.trim_end_matches('/');
    format!(
        "{host}/{NOTICE_DOWNLOAD_PATH}?legalContentId=cellar:{}&noticeType=branch&callingUrl=&lng=EN",
        cellar_id.as_str()
    )
}
