use serde::Deserialize;

// Basic safety limits
const MAX_FIELD_VALUE_LENGTH: usize = 10_000;
const MAX_SEARCH_TERM_LENGTH: usize = 10_000;

/// Tunables for a [`QueryTranslator`](crate::QueryTranslator).
///
/// Can be embedded in an application's config file:
///
/// ```toml
/// [query]
/// max_value_length = 512
/// max_term_length = 128
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TranslateOptions {
    /// Filter values longer than this many bytes are dropped from the predicate
    pub max_value_length: usize,
    /// Search terms are truncated to this many bytes
    pub max_term_length: usize,
}

impl Default for TranslateOptions {
    fn default() -> Self {
        Self {
            max_value_length: MAX_FIELD_VALUE_LENGTH,
            max_term_length: MAX_SEARCH_TERM_LENGTH,
        }
    }
}

impl TranslateOptions {
    pub(crate) const fn accepts_value(&self, value: &str) -> bool {
        value.len() <= self.max_value_length
    }

    /// Cut `term` down to `max_term_length` bytes without splitting a character.
    pub(crate) fn truncate_term<'a>(&self, term: &'a str) -> &'a str {
        if term.len() <= self.max_term_length {
            return term;
        }
        let mut end = self.max_term_length;
        while !term.is_char_boundary(end) {
            end -= 1;
        }
        &term[..end]
    }
}
