//! Sensitive-field masking for request/response logging.
//!
//! The logging interceptor only depends on the [`FieldMasker`] trait: given a
//! field name and its value it returns the masked value, or `None` when the
//! field is not sensitive. [`MaskingRules`] is the rule-set implementation:
//! rules are keyed by exact, case-sensitive field name.
//!
//! `Authorization` and `Proxy-Authorization` headers are masked by the
//! payload renderer itself and cannot be switched off by any masker.

pub mod payload;

use std::collections::HashMap;
use std::fmt;

use regex::Regex;

/// Replacement used by [`MaskingStrategy::FullReplace`] and for always-masked headers.
pub const MASKED_VALUE: &str = "*ENCRYPTED";

/// Logged instead of a payload that could not be masked.
pub const UNMASKABLE_PAYLOAD: &str = "<unmaskable payload>";

/// Header names (lower-case) masked regardless of configuration.
pub const ALWAYS_MASKED_HEADERS: [&str; 2] = ["authorization", "proxy-authorization"];

/// Masking engine interface.
pub trait FieldMasker: Send + Sync {
    /// Masked form of `value`, or `None` when `field` is not sensitive.
    fn mask(&self, field: &str, value: &str) -> Option<String>;
}

#[derive(Clone)]
pub enum MaskingStrategy {
    /// Replace the whole value with [`MASKED_VALUE`].
    FullReplace,
    /// Keep `leading` and `trailing` characters, star out the rest.
    PartialReveal { leading: usize, trailing: usize },
    /// Run a regex replacement over the value.
    RegexSubstitute { pattern: Regex, replacement: String },
}

impl MaskingStrategy {
    pub fn apply(&self, value: &str) -> String {
        match self {
            MaskingStrategy::FullReplace => MASKED_VALUE.to_string(),
            MaskingStrategy::PartialReveal { leading, trailing } => {
                let chars: Vec<char> = value.chars().collect();
                if chars.len() <= leading + trailing {
                    return MASKED_VALUE.to_string();
                }
                let hidden = chars.len() - leading - trailing;
                let mut masked = String::with_capacity(value.len());
                masked.extend(&chars[..*leading]);
                masked.extend(std::iter::repeat_n('*', hidden));
                masked.extend(&chars[chars.len() - trailing..]);
                masked
            }
            MaskingStrategy::RegexSubstitute {
                pattern,
                replacement,
            } => pattern
                .replace_all(value, replacement.as_str())
                .into_owned(),
        }
    }
}

impl fmt::Debug for MaskingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MaskingStrategy::FullReplace => write!(f, "FullReplace"),
            MaskingStrategy::PartialReveal { leading, trailing } => {
                write!(f, "PartialReveal({leading}, {trailing})")
            }
            MaskingStrategy::RegexSubstitute { pattern, .. } => {
                write!(f, "RegexSubstitute({})", pattern.as_str())
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct MaskingRule {
    pub field_name: String,
    pub strategy: MaskingStrategy,
}

impl MaskingRule {
    pub fn full(field_name: impl Into<String>) -> Self {
        Self {
            field_name: field_name.into(),
            strategy: MaskingStrategy::FullReplace,
        }
    }

    pub fn partial(field_name: impl Into<String>, leading: usize, trailing: usize) -> Self {
        Self {
            field_name: field_name.into(),
            strategy: MaskingStrategy::PartialReveal { leading, trailing },
        }
    }

    /// # Errors
    ///
    /// Returns the regex compilation error for an invalid `pattern`.
    pub fn regex(
        field_name: impl Into<String>,
        pattern: &str,
        replacement: impl Into<String>,
    ) -> Result<Self, regex::Error> {
        Ok(Self {
            field_name: field_name.into(),
            strategy: MaskingStrategy::RegexSubstitute {
                pattern: Regex::new(pattern)?,
                replacement: replacement.into(),
            },
        })
    }
}

/// Set of masking rules keyed by field name.
#[derive(Debug, Clone, Default)]
pub struct MaskingRules {
    rules: HashMap<String, MaskingStrategy>,
}

impl MaskingRules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rules for the usual credential and card fields.
    pub fn with_defaults() -> Self {
        let mut rules = Self::new();
        for field in ["password", "pin", "cvv2", "secret"] {
            rules.insert(MaskingRule::full(field));
        }
        rules.insert(MaskingRule::partial("pan", 6, 4));
        rules
    }

    /// Add a rule, replacing any existing rule for the same field.
    pub fn insert(&mut self, rule: MaskingRule) {
        self.rules.insert(rule.field_name, rule.strategy);
    }

    pub fn with_rule(mut self, rule: MaskingRule) -> Self {
        self.insert(rule);
        self
    }

    pub fn contains(&self, field: &str) -> bool {
        self.rules.contains_key(field)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl FromIterator<MaskingRule> for MaskingRules {
    fn from_iter<I: IntoIterator<Item = MaskingRule>>(iter: I) -> Self {
        let mut rules = Self::new();
        for rule in iter {
            rules.insert(rule);
        }
        rules
    }
}

impl FieldMasker for MaskingRules {
    fn mask(&self, field: &str, value: &str) -> Option<String> {
        self.rules.get(field).map(|strategy| strategy.apply(value))
    }
}
