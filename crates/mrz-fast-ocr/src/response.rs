/// Raw engine output: UTF-8 text, one recognized line per row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OcrResponse {
    text: String,
}

impl OcrResponse {
    pub fn new(text: String) -> Self {
        Self { text }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}
