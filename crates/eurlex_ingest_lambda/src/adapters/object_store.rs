/// Blob store holding downloaded notices.
pub trait NoticeStore {
    /// Keys starting with `prefix`.
    fn list_keys(&self, prefix: &str) -> Result<Vec<String>, String>;
    fn delete_object(&self, key: &str) -> Result<(), String>;
    fn write_object(&self, key: &str, body: &[u8]) -> Result<(), String>;
}
