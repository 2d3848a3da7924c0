//! OCR engine boundary for the mrz-fast pipeline.
//!
//! The pipeline treats recognition as a black box: a normalized image goes
//! in, raw multi-line text comes out. Engines implement [`OcrEngine`]; the
//! Tesseract adapter ships behind the `engine-tesseract` feature so the rest
//! of the workspace builds without the native library.

mod backends;
mod engine;
mod error;
mod request;
mod response;
mod settings;

#[cfg(feature = "engine-tesseract")]
pub use backends::tesseract::{TesseractConfig, TesseractOcrEngine};
pub use engine::{NoopOcrEngine, OcrEngine};
pub use error::OcrError;
pub use request::OcrRequest;
pub use response::OcrResponse;
pub use settings::{OcrSettings, PageSegMode, MRZ_CHARSET};
