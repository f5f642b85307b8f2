use crate::config::SlugsConfig;
use once_cell::sync::Lazy;
use regex::Regex;
use slug::slugify;

static SLUG_SHAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9]+(?:[-_.][a-z0-9]+)*$").expect("valid slug regex"));

pub const MAX_SLUG_LENGTH: usize = 200;

/// Turns free text into a slug-shaped string.
///
/// Implementations must be deterministic: the same input always yields the
/// same output, with no dependence on stored data.
pub trait Normalizer: Send + Sync {
    fn normalize(&self, input: &str) -> String;
}

/// Transliterates to ASCII, lowercases and collapses everything else into a
/// single separator, then truncates on a separator boundary when possible.
#[derive(Debug, Clone)]
pub struct DefaultNormalizer {
    separator: char,
    max_length: usize,
}

impl Default for DefaultNormalizer {
    fn default() -> Self {
        Self {
            separator: '-',
            max_length: 100,
        }
    }
}

impl DefaultNormalizer {
    pub fn new(separator: char, max_length: usize) -> Self {
        Self {
            separator,
            max_length: max_length.clamp(1, MAX_SLUG_LENGTH),
        }
    }

    pub fn from_config(config: &SlugsConfig) -> Self {
        Self::new(config.separator_char(), config.max_length)
    }
}

impl Normalizer for DefaultNormalizer {
    fn normalize(&self, input: &str) -> String {
        let mut slug = generate_slug(input);
        if self.separator != '-' {
            slug = slug.replace('-', &self.separator.to_string());
        }
        truncate(&slug, self.max_length, self.separator)
    }
}

pub fn generate_slug(title: &str) -> String {
    slugify(title)
}

pub fn validate_slug(slug: &str) -> bool {
    if slug.is_empty() || slug.len() > MAX_SLUG_LENGTH {
        return false;
    }
    SLUG_SHAPE.is_match(slug)
}

// Slugs are ASCII by now, so byte offsets are char offsets.
pub(crate) fn truncate(slug: &str, max_length: usize, separator: char) -> String {
    if slug.len() <= max_length {
        return slug.to_string();
    }
    let cut = &slug[..max_length];
    let cut = match cut.rfind(separator) {
        Some(pos) if pos > 0 && slug.as_bytes().get(max_length) != Some(&(separator as u8)) => {
            &cut[..pos]
        }
        _ => cut,
    };
    cut.trim_end_matches(separator).to_string()
}
