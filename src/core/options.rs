//! Per-table game options.
//!
//! Games declare their options as a static list of [`OptionSpec`]s. The
//! table stores only the chosen values in an [`OptionBag`]; anything not
//! set explicitly reads as the spec's default.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// Shape and bounds of one option.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OptionKind {
    Int { min: i64, max: i64, default: i64 },
    Bool { default: bool },
    Choice {
        choices: &'static [&'static str],
        default: &'static str,
    },
}

/// A declared option.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OptionSpec {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: OptionKind,
}

impl OptionSpec {
    #[must_use]
    pub const fn int(key: &'static str, label: &'static str, min: i64, max: i64, default: i64) -> Self {
        Self {
            key,
            label,
            kind: OptionKind::Int { min, max, default },
        }
    }

    #[must_use]
    pub const fn boolean(key: &'static str, label: &'static str, default: bool) -> Self {
        Self {
            key,
            label,
            kind: OptionKind::Bool { default },
        }
    }

    #[must_use]
    pub const fn choice(
        key: &'static str,
        label: &'static str,
        choices: &'static [&'static str],
        default: &'static str,
    ) -> Self {
        Self {
            key,
            label,
            kind: OptionKind::Choice { choices, default },
        }
    }

    #[must_use]
    pub fn default_value(&self) -> OptionValue {
        match self.kind {
            OptionKind::Int { default, .. } => OptionValue::Int(default),
            OptionKind::Bool { default } => OptionValue::Bool(default),
            OptionKind::Choice { default, .. } => OptionValue::Text(default.to_string()),
        }
    }

    /// Parse and range-check raw user text against this spec.
    pub fn parse(&self, raw: &str) -> Result<OptionValue, Cow<'static, str>> {
        let raw = raw.trim();
        match self.kind {
            OptionKind::Int { min, max, .. } => {
                let value: i64 = raw
                    .parse()
                    .map_err(|_| Cow::Owned(format!("{raw:?} is not a whole number.")))?;
                if value < min || value > max {
                    return Err(Cow::Owned(format!(
                        "{} must be between {min} and {max}.",
                        self.label
                    )));
                }
                Ok(OptionValue::Int(value))
            }
            OptionKind::Bool { .. } => match raw.to_ascii_lowercase().as_str() {
                "true" | "on" | "yes" | "1" => Ok(OptionValue::Bool(true)),
                "false" | "off" | "no" | "0" => Ok(OptionValue::Bool(false)),
                _ => Err(Cow::Owned(format!("{raw:?} is not on or off."))),
            },
            OptionKind::Choice { choices, .. } => choices
                .iter()
                .find(|choice| **choice == raw)
                .map(|choice| OptionValue::Text((*choice).to_string()))
                .ok_or_else(|| Cow::Owned(format!("{raw:?} is not a valid choice."))),
        }
    }
}

/// A stored option value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum OptionValue {
    Int(i64),
    Bool(bool),
    Text(String),
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Int(value) => write!(f, "{value}"),
            OptionValue::Bool(true) => f.write_str("on"),
            OptionValue::Bool(false) => f.write_str("off"),
            OptionValue::Text(value) => f.write_str(value),
        }
    }
}

/// Option values chosen for a table, in the order they were set.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionBag {
    values: IndexMap<String, OptionValue>,
}

impl OptionBag {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate `raw` against `spec` and store it.
    pub fn set(&mut self, spec: &OptionSpec, raw: &str) -> Result<&OptionValue, Cow<'static, str>> {
        let value = self.insert(spec.key, spec.parse(raw)?);
        Ok(value)
    }

    /// Store an already-typed value.
    pub fn insert(&mut self, key: &str, value: OptionValue) -> &OptionValue {
        let (index, _) = self.values.insert_full(key.to_string(), value);
        &self.values[index]
    }

    /// Current value, falling back to the spec default.
    #[must_use]
    pub fn value(&self, spec: &OptionSpec) -> OptionValue {
        self.values
            .get(spec.key)
            .cloned()
            .unwrap_or_else(|| spec.default_value())
    }

    #[must_use]
    pub fn int(&self, spec: &OptionSpec) -> i64 {
        match (self.values.get(spec.key), spec.kind) {
            (Some(OptionValue::Int(value)), _) => *value,
            (_, OptionKind::Int { default, .. }) => default,
            _ => 0,
        }
    }

    #[must_use]
    pub fn flag(&self, spec: &OptionSpec) -> bool {
        match (self.values.get(spec.key), spec.kind) {
            (Some(OptionValue::Bool(value)), _) => *value,
            (_, OptionKind::Bool { default }) => default,
            _ => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &OptionValue)> {
        self.values.iter().map(|(key, value)| (key.as_str(), value))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TARGET: OptionSpec = OptionSpec::int("target_score", "Target score", 10, 1000, 50);
    const FAST: OptionSpec = OptionSpec::boolean("fast", "Fast mode", false);
    const DECK: OptionSpec = OptionSpec::choice("deck", "Deck", &["small", "large"], "small");

    #[test]
    fn test_defaults_without_values() {
        let bag = OptionBag::new();
        assert_eq!(bag.int(&TARGET), 50);
        assert!(!bag.flag(&FAST));
        assert_eq!(bag.value(&DECK), OptionValue::Text("small".to_string()));
    }

    #[test]
    fn test_int_range_checked() {
        let mut bag = OptionBag::new();
        assert!(bag.set(&TARGET, "5").is_err());
        assert!(bag.set(&TARGET, "abc").is_err());
        assert_eq!(bag.set(&TARGET, " 75 ").unwrap(), &OptionValue::Int(75));
        assert_eq!(bag.int(&TARGET), 75);
    }

    #[test]
    fn test_bool_and_choice_parsing() {
        let mut bag = OptionBag::new();
        bag.set(&FAST, "on").unwrap();
        assert!(bag.flag(&FAST));
        assert!(bag.set(&DECK, "huge").is_err());
        bag.set(&DECK, "large").unwrap();
        assert_eq!(bag.value(&DECK).to_string(), "large");
    }

    #[test]
    fn test_insertion_order_preserved() {
        let mut bag = OptionBag::new();
        bag.set(&FAST, "yes").unwrap();
        bag.set(&TARGET, "20").unwrap();
        bag.set(&FAST, "no").unwrap();

        let keys: Vec<_> = bag.iter().map(|(key, _)| key).collect();
        assert_eq!(keys, vec!["fast", "target_score"]);
    }
}
