use thiserror::Error;

#[derive(Debug, Error)]
pub enum OcrError {
    #[error("engine initialization failed: {message}")]
    Init { message: String },
    #[error("backend error: {message}")]
    Backend { message: String },
}

impl OcrError {
    pub fn init(message: impl Into<String>) -> Self {
        Self::Init {
            message: message.into(),
        }
    }

    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }
}

impl From<OcrError> for mrz_fast_types::ScanError {
    fn from(err: OcrError) -> Self {
        mrz_fast_types::ScanError::ocr_engine(err.to_string())
    }
}
