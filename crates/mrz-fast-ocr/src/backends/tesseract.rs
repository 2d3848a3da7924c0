use std::io::{Cursor, Write};
use std::path::PathBuf;
use std::sync::Mutex;

use image::{DynamicImage, GrayImage, ImageFormat, RgbImage, RgbaImage};
use mrz_fast_types::{Image, PixelFormat};
use tempfile::NamedTempFile;
use tesseract::Tesseract;

use crate::engine::OcrEngine;
use crate::error::OcrError;
use crate::request::OcrRequest;
use crate::response::OcrResponse;
use crate::settings::PageSegMode;

/// Construction-time dependencies of the Tesseract adapter. The trained-data
/// directory is injected here, once; nothing probes the filesystem per frame.
#[derive(Debug, Clone)]
pub struct TesseractConfig {
    pub tessdata_dir: Option<PathBuf>,
    pub language: String,
}

impl Default for TesseractConfig {
    fn default() -> Self {
        Self {
            tessdata_dir: None,
            language: "ocrb".to_string(),
        }
    }
}

/// OCR engine backed by the `tesseract` crate. The native handle is created
/// once and reused across calls; the crate's builder API consumes the handle
/// on every step, so it lives in a mutex as an `Option` that is taken for
/// the duration of a call and put back afterwards. Errors leave the slot
/// empty and the next call re-initializes.
pub struct TesseractOcrEngine {
    config: TesseractConfig,
    handle: Mutex<Option<Tesseract>>,
}

impl TesseractOcrEngine {
    pub fn new(config: TesseractConfig) -> Result<Self, OcrError> {
        let handle = init_handle(&config)?;
        Ok(Self {
            config,
            handle: Mutex::new(Some(handle)),
        })
    }

    pub fn with_defaults() -> Result<Self, OcrError> {
        Self::new(TesseractConfig::default())
    }
}

impl OcrEngine for TesseractOcrEngine {
    fn name(&self) -> &'static str {
        "tesseract"
    }

    fn warm_up(&self) -> Result<(), OcrError> {
        let mut guard = self
            .handle
            .lock()
            .map_err(|_| OcrError::backend("tesseract handle poisoned"))?;
        if guard.is_none() {
            *guard = Some(init_handle(&self.config)?);
        }
        Ok(())
    }

    fn recognize(&self, request: &OcrRequest<'_>) -> Result<OcrResponse, OcrError> {
        let page = encode_png(request.image())?;
        let mut file = NamedTempFile::new()
            .map_err(|err| OcrError::backend(format!("failed to create page file: {err}")))?;
        file.write_all(&page)
            .map_err(|err| OcrError::backend(format!("failed to write page file: {err}")))?;
        let path = file
            .path()
            .to_str()
            .ok_or_else(|| OcrError::backend("page file path is not valid UTF-8"))?;

        let mut guard = self
            .handle
            .lock()
            .map_err(|_| OcrError::backend("tesseract handle poisoned"))?;
        let handle = match guard.take() {
            Some(handle) => handle,
            None => init_handle(&self.config)?,
        };

        let settings = request.settings();
        let backend = |err: &dyn std::fmt::Display| OcrError::backend(format!("tesseract: {err}"));

        let handle = handle
            .set_variable("tessedit_char_whitelist", &settings.whitelist)
            .map_err(|err| backend(&err))?
            .set_variable("tessedit_pageseg_mode", page_seg_value(settings.page_seg_mode))
            .map_err(|err| backend(&err))?;
        let handle = match settings.dpi {
            Some(dpi) => handle
                .set_variable("user_defined_dpi", &dpi.to_string())
                .map_err(|err| backend(&err))?,
            None => handle,
        };
        let handle = if settings.dictionary_lookup {
            handle
        } else {
            handle
                .set_variable("load_system_dawg", "F")
                .map_err(|err| backend(&err))?
                .set_variable("load_freq_dawg", "F")
                .map_err(|err| backend(&err))?
        };

        let mut handle = handle.set_image(path).map_err(|err| backend(&err))?;
        let text = handle.get_text().map_err(|err| backend(&err))?;
        *guard = Some(handle);

        Ok(OcrResponse::new(text))
    }
}

fn init_handle(config: &TesseractConfig) -> Result<Tesseract, OcrError> {
    let datapath = match config.tessdata_dir.as_deref() {
        Some(dir) => Some(dir.to_str().ok_or_else(|| {
            OcrError::init(format!("tessdata path {} is not valid UTF-8", dir.display()))
        })?),
        None => None,
    };
    Tesseract::new(datapath, Some(&config.language))
        .map_err(|err| OcrError::init(format!("tesseract: {err}")))
}

fn page_seg_value(mode: PageSegMode) -> &'static str {
    match mode {
        PageSegMode::SingleBlock => "6",
        PageSegMode::AutoOsd => "1",
    }
}

fn encode_png(image: &Image) -> Result<Vec<u8>, OcrError> {
    let data = image.data().to_vec();
    let dynamic = match image.format() {
        PixelFormat::Gray8 => GrayImage::from_raw(image.width(), image.height(), data)
            .map(DynamicImage::ImageLuma8),
        PixelFormat::Rgb8 => {
            RgbImage::from_raw(image.width(), image.height(), data).map(DynamicImage::ImageRgb8)
        }
        PixelFormat::Rgba8 => {
            RgbaImage::from_raw(image.width(), image.height(), data).map(DynamicImage::ImageRgba8)
        }
    }
    .ok_or_else(|| OcrError::backend("image buffer did not match its dimensions"))?;

    let mut bytes = Vec::new();
    dynamic
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .map_err(|err| OcrError::backend(format!("failed to encode page: {err}")))?;
    Ok(bytes)
}
