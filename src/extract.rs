use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Selector};
use tracing::debug;

use crate::error::FieldError;
use crate::record::{FieldValue, NOT_AVAILABLE};

static COUNT_NOISE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\d.,KMB]").unwrap());

/// What to read from the element a selector chain lands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Read {
    /// Text content, trimmed at both ends.
    Text,
    Attr(&'static str),
}

/// A named field and how to locate it.
///
/// Each selector in `chain` is applied inside the first match of the previous one,
/// e.g. `["#byline-container", "ytd-channel-name a"]`.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub chain: &'static [&'static str],
    pub read: Read,
}

impl FieldSpec {
    pub const fn text(name: &'static str, chain: &'static [&'static str]) -> Self {
        Self { name, chain, read: Read::Text }
    }

    pub const fn attr(name: &'static str, chain: &'static [&'static str], attr: &'static str) -> Self {
        Self { name, chain, read: Read::Attr(attr) }
    }
}

// ============================================================================
// Extraction
// ============================================================================

/// Runs one field's selector chain below `scope`.
pub fn extract(scope: ElementRef<'_>, spec: &FieldSpec) -> Result<String, FieldError> {
    let mut current = scope;
    for (step, css) in spec.chain.iter().enumerate() {
        let selector =
            Selector::parse(css).map_err(|_| FieldError::InvalidSelector(css.to_string()))?;
        current = match current.select(&selector).next() {
            Some(el) => el,
            None if step == 0 => return Err(FieldError::NoMatch(css.to_string())),
            None => {
                return Err(FieldError::MissingNested {
                    step,
                    selector: css.to_string(),
                })
            }
        };
    }

    let value = match spec.read {
        Read::Text => current.text().collect::<String>().trim().to_string(),
        Read::Attr(attr) => current
            .value()
            .attr(attr)
            .ok_or(FieldError::MissingAttribute(attr))?
            .trim()
            .to_string(),
    };

    if value.is_empty() {
        Err(FieldError::Empty)
    } else {
        Ok(value)
    }
}

/// Collapses a field outcome into a record cell, logging why it defaulted.
pub fn resolve(field: &str, outcome: Result<String, FieldError>) -> FieldValue {
    match outcome {
        Ok(value) => FieldValue::from_text(value),
        Err(e) => {
            debug!(field, error = %e, "field defaulted to {}", NOT_AVAILABLE);
            FieldValue::Missing
        }
    }
}

pub fn extract_field(scope: ElementRef<'_>, spec: &FieldSpec) -> FieldValue {
    resolve(spec.name, extract(scope, spec))
}

// ============================================================================
// Count normalization
// ============================================================================

/// Keeps only digits, `.`/`,` separators and `K`/`M`/`B` suffixes.
///
/// "1.234.567 lượt xem" becomes "1.234.567"; text with nothing left becomes the sentinel.
pub fn clean_count(text: &str) -> String {
    if text == NOT_AVAILABLE {
        return text.to_string();
    }
    let cleaned = COUNT_NOISE.replace_all(text, "");
    if cleaned.is_empty() {
        NOT_AVAILABLE.to_string()
    } else {
        cleaned.into_owned()
    }
}

pub fn clean_count_value(value: FieldValue) -> FieldValue {
    value.map(clean_count)
}
