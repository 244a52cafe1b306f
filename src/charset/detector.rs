//! Statistical encoding detection
//!
//! The resolver only consults a detector when the server did not declare a
//! usable charset. Detection needs the whole body, so it is the slow path.

use chardetng::EncodingDetector;

/// Guesses the encoding of an undeclared byte stream
pub trait CharsetDetector: Send + Sync {
    /// Returns the label of the single most likely encoding
    ///
    /// `None` means the detector could not produce a guess at all.
    fn detect(&self, body: &[u8]) -> Option<String>;
}

/// Detector backed by `chardetng`, the detector Firefox uses for legacy content
#[derive(Debug, Default, Clone, Copy)]
pub struct ChardetngDetector;

impl CharsetDetector for ChardetngDetector {
    fn detect(&self, body: &[u8]) -> Option<String> {
        if body.is_empty() {
            return None;
        }

        let mut detector = EncodingDetector::new();
        detector.feed(body, true);
        let encoding = detector.guess(None, true);

        Some(encoding.name().to_ascii_lowercase())
    }
}
