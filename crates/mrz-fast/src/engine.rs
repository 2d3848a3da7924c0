use std::sync::Arc;

use mrz_fast_ocr::{NoopOcrEngine, OcrEngine, OcrError};
use tracing::debug;

use crate::cli::OcrBackend;
use crate::settings::EffectiveSettings;

/// Build the OCR engine once, up front. `Auto` prefers the Tesseract
/// backend when it is compiled in and initializes, and otherwise falls back
/// to the noop engine so image-only workflows keep working.
pub fn build_engine(settings: &EffectiveSettings) -> Result<Arc<dyn OcrEngine>, OcrError> {
    match settings.ocr_backend {
        OcrBackend::Noop => build_noop_engine(),
        OcrBackend::Tesseract => build_tesseract_engine(settings),
        OcrBackend::Auto => build_auto_engine(settings),
    }
}

fn build_noop_engine() -> Result<Arc<dyn OcrEngine>, OcrError> {
    let engine = NoopOcrEngine;
    engine.warm_up()?;
    Ok(Arc::new(engine))
}

#[cfg(feature = "engine-tesseract")]
fn build_tesseract_engine(settings: &EffectiveSettings) -> Result<Arc<dyn OcrEngine>, OcrError> {
    use mrz_fast_ocr::{TesseractConfig, TesseractOcrEngine};

    let config = TesseractConfig {
        tessdata_dir: settings.tessdata_dir.clone(),
        language: settings.ocr_language.clone(),
    };
    let engine = TesseractOcrEngine::new(config)?;
    engine.warm_up()?;
    Ok(Arc::new(engine))
}

#[cfg(not(feature = "engine-tesseract"))]
fn build_tesseract_engine(_settings: &EffectiveSettings) -> Result<Arc<dyn OcrEngine>, OcrError> {
    Err(OcrError::backend(
        "the tesseract backend is not compiled into this build",
    ))
}

fn build_auto_engine(settings: &EffectiveSettings) -> Result<Arc<dyn OcrEngine>, OcrError> {
    match build_tesseract_engine(settings) {
        Ok(engine) => Ok(engine),
        Err(err) => {
            debug!(error = %err, "falling back to the noop OCR engine");
            build_noop_engine()
        }
    }
}
