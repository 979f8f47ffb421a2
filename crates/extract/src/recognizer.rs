use thiserror::Error;

#[derive(Debug, Error)]
pub enum RecognizeError {
    #[error("Recognition backend error: {0}")]
    Backend(String),
    #[error("Recognition response carried no text content")]
    MissingContent,
}

/// Abstraction over the external document-recognition model.
///
/// Implementations accept one page (or a whole document) as opaque bytes
/// and return the model's raw text output. Transport, encoding, and
/// retry policy all live behind this seam.
pub trait RecognizerBackend: Send + Sync {
    fn recognize(&self, page: &[u8]) -> Result<String, RecognizeError>;
}

/// Returns a pre-set string — used for unit testing the normalization
/// pipeline without a live model.
pub struct MockRecognizer {
    pub text: String,
}

impl MockRecognizer {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl RecognizerBackend for MockRecognizer {
    fn recognize(&self, _page: &[u8]) -> Result<String, RecognizeError> {
        Ok(self.text.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_returns_preset_text() {
        let r = MockRecognizer::new("[{\"id\": \"NK1\"}]");
        assert_eq!(r.recognize(b"page bytes").unwrap(), "[{\"id\": \"NK1\"}]");
    }

    #[test]
    fn mock_ignores_page_content() {
        let r = MockRecognizer::new("hello");
        assert_eq!(r.recognize(b"anything").unwrap(), "hello");
        assert_eq!(r.recognize(b"").unwrap(), "hello");
    }
}
