use crate::error::OcrError;
use crate::request::OcrRequest;
use crate::response::OcrResponse;

/// Common interface for all OCR engines. Implementations are constructed
/// once and reused across frames; `recognize` must be safe to call from the
/// blocking pool.
pub trait OcrEngine: Send + Sync {
    fn name(&self) -> &'static str;

    /// One-time warm-up hook so heavyweight engines can pay their
    /// initialization cost before the first frame arrives.
    fn warm_up(&self) -> Result<(), OcrError> {
        Ok(())
    }

    fn recognize(&self, request: &OcrRequest<'_>) -> Result<OcrResponse, OcrError>;
}

/// Placeholder engine used when no real backend is compiled in or wired up.
#[derive(Debug, Default)]
pub struct NoopOcrEngine;

impl OcrEngine for NoopOcrEngine {
    fn name(&self) -> &'static str {
        "noop"
    }

    fn recognize(&self, _: &OcrRequest<'_>) -> Result<OcrResponse, OcrError> {
        Ok(OcrResponse::empty())
    }
}
