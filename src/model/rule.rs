//! Detection Rules
//!
//! A rule pairs a keyword (also used as a regular expression) with a severity.
//! Rules are validated once when they are loaded so that an invalid pattern is
//! reported as configuration, never discovered half way through a scan.

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashSet;
use std::str::FromStr;
use strum_macros::{AsRefStr, Display, EnumString};

/// Severity classification of a rule
///
/// Stored as its numeric score (1..=3) and rendered as `LOW`/`MEDIUM`/`HIGH`
/// on issues.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumString, AsRefStr,
)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum Severity {
    Low = 1,
    Medium = 2,
    High = 3,
}

impl Severity {
    /// Numeric score used by rule storage
    pub fn score(self) -> u8 {
        self as u8
    }

    pub fn from_score(score: u8) -> Option<Self> {
        match score {
            1 => Some(Severity::Low),
            2 => Some(Severity::Medium),
            3 => Some(Severity::High),
            _ => None,
        }
    }

    /// Rendered form carried by issues
    pub fn as_str(&self) -> &str {
        self.as_ref()
    }
}

impl Serialize for Severity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.score())
    }
}

impl<'de> Deserialize<'de> for Severity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Score(u8),
            Name(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Score(score) => Severity::from_score(score).ok_or_else(|| {
                serde::de::Error::custom(format!("invalid severity score: {score}"))
            }),
            Repr::Name(name) => Severity::from_str(&name)
                .map_err(|_| serde::de::Error::custom(format!("invalid severity: {name}"))),
        }
    }
}

/// Format a rule id for display on issues (`1` -> `G001`)
pub fn formatted_id(id: u64) -> String {
    format!("G{:03}", id)
}

/// A named secret-detection pattern
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Rule {
    pub id: u64,
    pub name: String,
    pub keyword: String,
    pub description: String,
    pub severity: Severity,
}

impl Rule {
    pub fn new(
        id: u64,
        name: impl Into<String>,
        keyword: impl Into<String>,
        description: impl Into<String>,
        severity: Severity,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            keyword: keyword.into(),
            description: description.into(),
            severity,
        }
    }

    pub fn formatted_id(&self) -> String {
        formatted_id(self.id)
    }

    /// Check the rule can be used for detection
    pub fn validate(&self) -> Result<(), RuleError> {
        if self.id == 0 {
            return Err(RuleError::InvalidId {
                name: self.name.clone(),
            });
        }
        if self.keyword.is_empty() {
            return Err(RuleError::EmptyKeyword {
                rule_id: self.formatted_id(),
            });
        }
        Regex::new(&self.keyword).map_err(|e| RuleError::InvalidPattern {
            rule_id: self.formatted_id(),
            keyword: self.keyword.clone(),
            message: e.to_string(),
        })?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuleError {
    #[error("rule '{name}' has an invalid id (ids start at 1)")]
    InvalidId { name: String },

    #[error("rule {rule_id} has an empty keyword")]
    EmptyKeyword { rule_id: String },

    #[error("rule {rule_id} keyword '{keyword}' is not a valid pattern: {message}")]
    InvalidPattern {
        rule_id: String,
        keyword: String,
        message: String,
    },

    #[error("rule id {rule_id} is defined more than once")]
    DuplicateId { rule_id: String },
}

/// Validate a full rule set: every rule individually, and ids unique
pub fn validate_rules(rules: &[Rule]) -> Result<(), RuleError> {
    let mut seen = HashSet::with_capacity(rules.len());
    for rule in rules {
        rule.validate()?;
        if !seen.insert(rule.id) {
            return Err(RuleError::DuplicateId {
                rule_id: rule.formatted_id(),
            });
        }
    }
    Ok(())
}

/// Seed rules used when no rule set is configured
pub fn builtin_rules() -> Vec<Rule> {
    vec![
        Rule::new(
            1,
            "Public key leak",
            "public_key",
            "A secret starts with the prefix public_key",
            Severity::Low,
        ),
        Rule::new(
            2,
            "Private key leak",
            "private_key",
            "A secret starts with the prefix private_key",
            Severity::High,
        ),
    ]
}
