//! Charset resolution for fetched pages
//!
//! Decoding runs through three tiers, cheapest first:
//!
//! 1. The server declared `charset=utf-8`: the body is streamed through the
//!    UTF-8 decoder as-is and the detector is never consulted.
//! 2. The server declared another charset we can convert: the body is
//!    streamed through that encoding's decoder.
//! 3. The declaration is missing or unknown: the whole body is buffered and a
//!    statistical detector picks the encoding. An unsupported or missing guess
//!    is an [`EncodingError`].
//!
//! Malformed byte sequences decode to U+FFFD, which the title check later
//! treats as invalid text.

mod body;
mod detector;

pub use body::{BodyError, BodySource};
pub use detector::{ChardetngDetector, CharsetDetector};

#[cfg(test)]
pub use body::ChunkedBody;

use encoding_rs::{CoderResult, Decoder, Encoding, REPLACEMENT, UTF_8};
use regex::Regex;
use std::sync::{Arc, OnceLock};
use thiserror::Error;

/// Canonical label of the passthrough encoding
const UTF8_LABEL: &str = "utf-8";

/// The charset could not be resolved to a supported encoding
#[derive(Debug, Error)]
pub enum EncodingError {
    #[error("no known encoding (declared: {declared:?}, detected: {detected:?})")]
    Undetectable {
        declared: Option<String>,
        detected: Option<String>,
    },
}

/// Failure while turning a response body into text
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("failed to read body: {0}")]
    Body(#[source] BodyError),

    #[error(transparent)]
    Encoding(#[from] EncodingError),
}

/// How the encoding of a body was decided
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CharsetDecision {
    /// Declared UTF-8, decoded without conversion or detection
    Utf8Passthrough,

    /// Declared charset found in the conversion table
    Declared(&'static Encoding),

    /// Declaration absent or unknown, encoding picked by the detector
    Detected {
        declared: Option<String>,
        encoding: &'static Encoding,
    },
}

/// Text produced from a response body
#[derive(Debug, Clone)]
pub struct DecodedBody {
    pub text: String,
    pub decision: CharsetDecision,
}

fn charset_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?i)charset\s*=\s*["']?([A-Za-z0-9_.:-]+)"#).expect("valid charset regex")
    })
}

/// Extracts the lower-cased `charset=` token from a Content-Type header value
///
/// # Example
///
/// ```
/// use title_scraper::charset::extract_charset;
///
/// assert_eq!(
///     extract_charset("text/html; Charset=ISO-8859-1"),
///     Some("iso-8859-1".to_string())
/// );
/// assert_eq!(extract_charset("text/html"), None);
/// ```
pub fn extract_charset(content_type: &str) -> Option<String> {
    charset_regex()
        .captures(content_type)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_ascii_lowercase())
}

/// Looks a charset label up in the conversion table
///
/// The table is the WHATWG label set. Labels that map to the `replacement`
/// encoding are treated as unsupported since they decode to nothing useful.
pub fn supported_encoding(label: &str) -> Option<&'static Encoding> {
    Encoding::for_label(label.trim().as_bytes()).filter(|encoding| *encoding != REPLACEMENT)
}

/// Decides and applies the byte-to-text decoding of response bodies
#[derive(Clone)]
pub struct CharsetResolver {
    detector: Arc<dyn CharsetDetector>,
}

impl Default for CharsetResolver {
    fn default() -> Self {
        Self::new(Arc::new(ChardetngDetector))
    }
}

impl CharsetResolver {
    pub fn new(detector: Arc<dyn CharsetDetector>) -> Self {
        Self { detector }
    }

    /// Decodes a body according to its declared Content-Type
    ///
    /// # Arguments
    ///
    /// * `content_type` - The Content-Type header value, if any
    /// * `body` - The body, read lazily
    ///
    /// # Returns
    ///
    /// * `Ok(DecodedBody)` - Decoded text and how its encoding was chosen
    /// * `Err(DecodeError)` - The body could not be read or no encoding applies
    pub async fn decode<B: BodySource>(
        &self,
        content_type: Option<&str>,
        body: B,
    ) -> Result<DecodedBody, DecodeError> {
        let declared = content_type.and_then(extract_charset);

        if declared.as_deref() == Some(UTF8_LABEL) {
            let text = stream_decode(UTF_8.new_decoder_with_bom_removal(), body).await?;
            return Ok(DecodedBody {
                text,
                decision: CharsetDecision::Utf8Passthrough,
            });
        }

        if let Some(encoding) = declared.as_deref().and_then(supported_encoding) {
            let text = stream_decode(encoding.new_decoder(), body).await?;
            return Ok(DecodedBody {
                text,
                decision: CharsetDecision::Declared(encoding),
            });
        }

        self.detect_and_decode(declared, body).await
    }

    async fn detect_and_decode<B: BodySource>(
        &self,
        declared: Option<String>,
        mut body: B,
    ) -> Result<DecodedBody, DecodeError> {
        let mut bytes = Vec::new();
        while let Some(chunk) = body.next_chunk().await.map_err(DecodeError::Body)? {
            bytes.extend_from_slice(&chunk);
        }

        let detected = self.detector.detect(&bytes);
        let encoding = match detected.as_deref().and_then(supported_encoding) {
            Some(encoding) => encoding,
            None => return Err(EncodingError::Undetectable { declared, detected }.into()),
        };

        tracing::debug!(
            declared = ?declared,
            detected = encoding.name(),
            "Charset resolved by detection"
        );

        let (text, _, _) = encoding.decode(&bytes);
        Ok(DecodedBody {
            text: text.into_owned(),
            decision: CharsetDecision::Detected { declared, encoding },
        })
    }
}

/// Feeds every chunk of `body` through `decoder`
async fn stream_decode<B: BodySource>(
    mut decoder: Decoder,
    mut body: B,
) -> Result<String, DecodeError> {
    let mut text = String::new();
    while let Some(chunk) = body.next_chunk().await.map_err(DecodeError::Body)? {
        decode_chunk(&mut decoder, &chunk, &mut text, false);
    }
    decode_chunk(&mut decoder, &[], &mut text, true);
    Ok(text)
}

fn decode_chunk(decoder: &mut Decoder, mut chunk: &[u8], text: &mut String, last: bool) {
    loop {
        let needed = decoder
            .max_utf8_buffer_length(chunk.len())
            .unwrap_or(chunk.len().saturating_mul(3).saturating_add(16));
        text.reserve(needed);

        let (result, read, _) = decoder.decode_to_string(chunk, text, last);
        chunk = &chunk[read..];

        match result {
            CoderResult::InputEmpty => return,
            CoderResult::OutputFull => continue,
        }
    }
}
