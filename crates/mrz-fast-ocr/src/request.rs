use mrz_fast_types::Image;

use crate::settings::OcrSettings;

/// OCR invocation: the normalized image plus the recognition knobs.
#[derive(Debug)]
pub struct OcrRequest<'a> {
    image: &'a Image,
    settings: &'a OcrSettings,
}

impl<'a> OcrRequest<'a> {
    pub fn new(image: &'a Image, settings: &'a OcrSettings) -> Self {
        Self { image, settings }
    }

    pub fn image(&self) -> &'a Image {
        self.image
    }

    pub fn settings(&self) -> &'a OcrSettings {
        self.settings
    }
}
