//! Candidate generation and conflict resolution policies.
//!
//! The assigner asks a [`CandidateGenerator`] for the first free candidate
//! and falls back to a [`ConflictResolver`] when every candidate is taken.

use crate::config::{ResolverKind, SlugsConfig, UniquenessScope};
use crate::error::{SlugError, SlugResult};
use crate::services::candidates::Candidates;
use crate::services::normalize::{generate_slug, truncate, MAX_SLUG_LENGTH};
use crate::services::store::{HistoryStore, SlugIndex};
use anyhow::Result;
use std::sync::Arc;

pub trait CandidateGenerator: Send + Sync {
    /// First candidate nobody else holds, or `None` if all are taken.
    fn generate(&self, candidates: &Candidates) -> SlugResult<Option<String>>;
}

pub trait ConflictResolver: Send + Sync {
    /// A slug guaranteed to be free, derived from the candidates' base.
    fn resolve(&self, candidates: &Candidates) -> SlugResult<String>;
}

/// Decides whether a slug is free for a given record.
///
/// A slug held by the same record (in any locale, or in its history) never
/// counts as a conflict.
pub struct SlugAvailability {
    index: Arc<dyn SlugIndex>,
    history: Option<Arc<dyn HistoryStore>>,
    slug_field: String,
    scope: UniquenessScope,
    reserved: Vec<String>,
}

impl SlugAvailability {
    pub fn new(
        index: Arc<dyn SlugIndex>,
        slug_field: impl Into<String>,
        scope: UniquenessScope,
    ) -> Self {
        Self {
            index,
            history: None,
            slug_field: slug_field.into(),
            scope,
            reserved: Vec::new(),
        }
    }

    /// Also treat slugs other records held in the past as taken. Under
    /// [`UniquenessScope::PerLocale`] only past slugs of the same locale count.
    pub fn with_history(mut self, history: Arc<dyn HistoryStore>) -> Self {
        self.history = Some(history);
        self
    }

    pub fn with_reserved(mut self, reserved: Vec<String>) -> Self {
        self.reserved = reserved;
        self
    }

    pub fn is_free(&self, candidates: &Candidates, slug: &str) -> Result<bool> {
        if slug.is_empty() || self.reserved.iter().any(|w| w == slug) {
            return Ok(false);
        }

        let locale = match self.scope {
            UniquenessScope::Global => None,
            UniquenessScope::PerLocale => Some(candidates.locale()),
        };
        let owners =
            self.index
                .slug_owners(candidates.model(), &self.slug_field, slug, locale)?;
        if owners.iter().any(|owner| *owner != candidates.record()) {
            return Ok(false);
        }

        if let Some(history) = &self.history {
            if let Some(owner) = history.contains(candidates.model(), slug, locale)? {
                if owner != candidates.record() {
                    return Ok(false);
                }
            }
        }

        Ok(true)
    }
}

/// Checks each candidate against the store in order.
pub struct StoreBackedGenerator {
    availability: Arc<SlugAvailability>,
}

impl StoreBackedGenerator {
    pub fn new(availability: Arc<SlugAvailability>) -> Self {
        Self { availability }
    }
}

impl CandidateGenerator for StoreBackedGenerator {
    fn generate(&self, candidates: &Candidates) -> SlugResult<Option<String>> {
        for candidate in candidates.iter() {
            if self.availability.is_free(candidates, candidate)? {
                return Ok(Some(candidate.to_string()));
            }
        }
        Ok(None)
    }
}

/// Appends `-2`, `-3`, ... to the base until a free slug turns up.
///
/// The base is shortened as needed so the suffixed slug stays within
/// `max_length`.
pub struct SequentialSuffixResolver {
    availability: Arc<SlugAvailability>,
    separator: char,
    max_attempts: u32,
    max_length: usize,
}

impl SequentialSuffixResolver {
    pub fn new(availability: Arc<SlugAvailability>, separator: char, max_attempts: u32) -> Self {
        Self {
            availability,
            separator,
            max_attempts,
            max_length: MAX_SLUG_LENGTH,
        }
    }

    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = max_length;
        self
    }
}

impl ConflictResolver for SequentialSuffixResolver {
    fn resolve(&self, candidates: &Candidates) -> SlugResult<String> {
        let base = fallback_base(candidates);

        for counter in 2..2 + u64::from(self.max_attempts) {
            let slug = with_suffix(&base, &counter.to_string(), self.separator, self.max_length);
            if self.availability.is_free(candidates, &slug)? {
                tracing::debug!("Resolved conflict for '{}' with '{}'", base, slug);
                return Ok(slug);
            }
        }

        Err(SlugError::ConflictResolution {
            base,
            attempts: self.max_attempts,
        })
    }
}

/// Appends a random UUID to the base. The UUID itself is never cut, so a
/// `max_length` below 36 yields a bare UUID that still exceeds it.
pub struct UuidSuffixResolver {
    availability: Arc<SlugAvailability>,
    separator: char,
    max_length: usize,
}

impl UuidSuffixResolver {
    const ATTEMPTS: u32 = 3;

    pub fn new(availability: Arc<SlugAvailability>, separator: char) -> Self {
        Self {
            availability,
            separator,
            max_length: MAX_SLUG_LENGTH,
        }
    }

    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = max_length;
        self
    }
}

impl ConflictResolver for UuidSuffixResolver {
    fn resolve(&self, candidates: &Candidates) -> SlugResult<String> {
        let base = candidates.base();

        for _ in 0..Self::ATTEMPTS {
            let suffix = uuid::Uuid::new_v4().to_string();
            let slug = with_suffix(base, &suffix, self.separator, self.max_length);
            if self.availability.is_free(candidates, &slug)? {
                return Ok(slug);
            }
        }

        Err(SlugError::ConflictResolution {
            base: base.to_string(),
            attempts: Self::ATTEMPTS,
        })
    }
}

pub fn resolver_from_config(
    config: &SlugsConfig,
    availability: Arc<SlugAvailability>,
) -> Arc<dyn ConflictResolver> {
    match config.resolver {
        ResolverKind::Sequential => Arc::new(
            SequentialSuffixResolver::new(
                availability,
                config.separator_char(),
                config.max_attempts,
            )
            .with_max_length(config.max_length),
        ),
        ResolverKind::Uuid => Arc::new(
            UuidSuffixResolver::new(availability, config.separator_char())
                .with_max_length(config.max_length),
        ),
    }
}

// An empty base would produce bare suffixes like `-2`; the model name
// stands in for it.
fn fallback_base(candidates: &Candidates) -> String {
    if candidates.base().is_empty() {
        generate_slug(candidates.model())
    } else {
        candidates.base().to_string()
    }
}

fn with_suffix(base: &str, suffix: &str, separator: char, max_length: usize) -> String {
    let room = max_length.saturating_sub(suffix.len() + 1);
    let base = truncate(base, room, separator);
    if base.is_empty() {
        suffix.to_string()
    } else {
        format!("{}{}{}", base, separator, suffix)
    }
}
