#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoticeResponse {
    pub status: u16,
    /// Empty unless `status` is 200.
    pub body: Vec<u8>,
}

impl NoticeResponse {
    pub fn is_success(&self) -> bool {
        self.status == 200
    }
}

pub trait NoticeSource {
    fn fetch_notice(&self, url: &str) -> Result<NoticeResponse, String>;
}
