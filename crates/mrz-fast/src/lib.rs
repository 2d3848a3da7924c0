//! MRZ scanning pipeline: orientation, fixed-ratio document geometry, OCR
//! normalization, and line validation, composed per frame or per photo.

pub mod cli;
pub mod engine;
pub mod imageio;
pub mod mock;
pub mod pipeline;
pub mod scanner;
pub mod session;
pub mod settings;
pub mod source;

pub use scanner::{FrameOutcome, MrzScanner, PhotoCrop, ScannerConfig};
pub use session::{MrzStream, ScanSession, SessionHandle};
pub use source::{CameraSource, DynCameraSource, FrameStream};
