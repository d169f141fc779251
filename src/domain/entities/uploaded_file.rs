//! # UploadedFile Value Object
//!
//! アップロードされたファイル

/// アップロードされたファイル
///
/// アップロードリクエストが所有し、抽出後に破棄される
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(filename: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: filename.into(),
            bytes: bytes.into(),
        }
    }
}
