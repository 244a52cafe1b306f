//! Title and meta-refresh extraction
//!
//! Works on decoded text with two case-insensitive patterns rather than a full
//! HTML parse: only the first `<title>` element and the first
//! `<meta http-equiv="refresh">` tag matter.

use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;
use url::{ParseError, Url};

/// What a page offers the scraper
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    /// The page has a non-empty title
    Title(String),

    /// The page has no title but redirects via meta-refresh
    Redirect(Url),

    /// Neither a title nor a redirect
    Neither,
}

/// A meta-refresh target that cannot be turned into an absolute URL
#[derive(Debug, Error)]
#[error("cannot resolve meta refresh target {target:?}: {reason}")]
pub struct RedirectUrlError {
    pub target: String,
    pub reason: String,
}

impl RedirectUrlError {
    fn new(target: &str, reason: impl ToString) -> Self {
        Self {
            target: target.to_string(),
            reason: reason.to_string(),
        }
    }
}

fn title_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?is)<title\s*(?:[A-Za-z-]+\s*=\s*["'][^"'<>]*["']\s*)?>([^<]+)</title>"#)
            .expect("valid title regex")
    })
}

fn meta_refresh_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r#"(?is)<meta\s+http-equiv\s*=\s*["']?refresh["']?\s[^>]*?url\s*=\s*["']?([^"'>\s]+)"#,
        )
        .expect("valid meta refresh regex")
    })
}

/// Classifies a decoded page
///
/// The title wins when both are present. A meta-refresh tag whose target
/// cannot be resolved is reported as an error so the caller can log it.
pub fn extract(text: &str, page_url: &Url) -> Result<Extraction, RedirectUrlError> {
    if let Some(title) = extract_title(text) {
        return Ok(Extraction::Title(title));
    }

    Ok(match extract_meta_refresh(text, page_url)? {
        Some(target) => Extraction::Redirect(target),
        None => Extraction::Neither,
    })
}

/// Extracts the trimmed text of the first `<title>` element
///
/// # Example
///
/// ```
/// use title_scraper::scraper::extract_title;
///
/// let html = "<html><head><TITLE lang=\"en\">\n  Hello\n</TITLE></head></html>";
/// assert_eq!(extract_title(html), Some("Hello".to_string()));
/// ```
pub fn extract_title(text: &str) -> Option<String> {
    title_regex()
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|title| !title.is_empty())
}

/// Extracts the meta-refresh target of a page as an absolute URL
///
/// # Arguments
///
/// * `text` - The decoded page
/// * `page_url` - The URL the page was fetched from
///
/// # Returns
///
/// * `Ok(Some(Url))` - The resolved target
/// * `Ok(None)` - The page has no meta-refresh tag
/// * `Err(RedirectUrlError)` - The target is malformed
pub fn extract_meta_refresh(text: &str, page_url: &Url) -> Result<Option<Url>, RedirectUrlError> {
    let target = match meta_refresh_regex().captures(text).and_then(|caps| caps.get(1)) {
        Some(m) => m.as_str(),
        None => return Ok(None),
    };

    resolve_redirect(target, page_url).map(Some)
}

/// Turns a meta-refresh target into an absolute http(s) URL
///
/// Targets without a host take the scheme, host and port of `page_url`.
/// Path-only targets always get a leading `/`, so `new` becomes `/new`
/// rather than being resolved relative to the current directory.
pub fn resolve_redirect(target: &str, page_url: &Url) -> Result<Url, RedirectUrlError> {
    let target = target.trim();

    let resolved = match Url::parse(target) {
        Ok(url) => url,
        Err(ParseError::RelativeUrlWithoutBase) if target.starts_with("//") => page_url
            .join(target)
            .map_err(|e| RedirectUrlError::new(target, e))?,
        Err(ParseError::RelativeUrlWithoutBase) => {
            let path = if target.starts_with('/') {
                target.to_string()
            } else {
                format!("/{}", target)
            };
            page_url
                .join(&path)
                .map_err(|e| RedirectUrlError::new(target, e))?
        }
        Err(e) => return Err(RedirectUrlError::new(target, e)),
    };

    if !matches!(resolved.scheme(), "http" | "https") || !resolved.has_host() {
        return Err(RedirectUrlError::new(target, "not an http(s) URL"));
    }

    Ok(resolved)
}

/// Checks that an extracted title is clean text
///
/// Decoding replaces malformed byte sequences with U+FFFD; a title containing
/// one, or containing control characters, was not decoded correctly.
pub fn is_well_formed_title(title: &str) -> bool {
    !title
        .chars()
        .any(|c| c == char::REPLACEMENT_CHARACTER || (c.is_control() && !c.is_whitespace()))
}
