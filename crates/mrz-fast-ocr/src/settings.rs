/// Characters that can legally appear in a machine-readable zone.
pub const MRZ_CHARSET: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789<";

/// Page segmentation strategy handed to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageSegMode {
    /// Treat the page as a single uniform text block (the MRZ band is one).
    #[default]
    SingleBlock,
    /// Let the engine detect orientation and segmentation itself.
    AutoOsd,
}

/// Recognition knobs shared by all engines. MRZ text is not natural
/// language, so dictionary lookup stays off and the whitelist stays tight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OcrSettings {
    pub whitelist: String,
    pub page_seg_mode: PageSegMode,
    /// Resolution hint for engines that want one; MRZ crops carry no DPI
    /// metadata of their own.
    pub dpi: Option<u32>,
    pub dictionary_lookup: bool,
}

impl Default for OcrSettings {
    fn default() -> Self {
        Self {
            whitelist: MRZ_CHARSET.to_string(),
            page_seg_mode: PageSegMode::SingleBlock,
            dpi: Some(300),
            dictionary_lookup: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_restrict_to_mrz_characters() {
        let settings = OcrSettings::default();
        assert_eq!(settings.whitelist, MRZ_CHARSET);
        assert_eq!(settings.page_seg_mode, PageSegMode::SingleBlock);
        assert!(!settings.dictionary_lookup);
        assert_eq!(settings.whitelist.len(), 37);
    }
}
