use super::overrides::RuleOverrides;
use super::rules::{fold, CompiledRules, RuleSet, RuleSetError};
use regex::{NoExpand, Regex};
use serde_json::Value;
use std::sync::OnceLock;

static STANDARD_NORMALIZER: OnceLock<MerchantNormalizer> = OnceLock::new();

/// Maps raw bank merchant text onto canonical merchant names.
///
/// Each call runs the same ordered stages:
/// - lowercase and trim
/// - exact alias lookup against the whole folded string (at most once)
/// - fuzzy alias substitution, in table order
/// - noise stripping, in table order, each match replaced by one space
/// - whitespace collapse and trim
///
/// The rule tables are fixed at construction, so a normalizer can be shared
/// freely between threads.
///
/// # Examples
///
/// ```
/// use merchant_ledger::workflows::merchants::MerchantNormalizer;
///
/// let normalizer = MerchantNormalizer::standard();
/// assert_eq!(normalizer.normalize("ALBERT HEIJN B.V. APELDOORN 12345"), "albert heijn");
/// assert_eq!(normalizer.normalize("1444 deventer"), "action");
/// ```
#[derive(Debug, Clone)]
pub struct MerchantNormalizer {
    rules: CompiledRules,
}

impl MerchantNormalizer {
    /// Shared normalizer over the built-in tables.
    pub fn standard() -> &'static MerchantNormalizer {
        STANDARD_NORMALIZER.get_or_init(|| {
            Self::from_rules(&RuleSet::builtin()).expect("built-in merchant rules compile")
        })
    }

    pub fn from_rules(rules: &RuleSet) -> Result<Self, RuleSetError> {
        Ok(Self {
            rules: rules.compile()?,
        })
    }

    /// Built-in tables extended with `overrides`.
    pub fn with_overrides(overrides: RuleOverrides) -> Result<Self, RuleSetError> {
        let mut rules = RuleSet::builtin();
        rules.extend(overrides);
        Self::from_rules(&rules)
    }

    pub fn normalize(&self, raw: &str) -> String {
        let folded = fold(raw);

        let mut text = match self.rules.exact.get(&folded) {
            Some(canonical) => canonical.clone(),
            None => folded,
        };

        for (pattern, replacement) in &self.rules.fuzzy {
            text = replace_all(pattern, text, replacement);
        }

        for pattern in &self.rules.noise {
            text = replace_all(pattern, text, " ");
        }

        collapse_whitespace(&text)
    }

    /// Untyped entry point: anything other than a JSON string yields `""`.
    pub fn normalize_value(&self, raw: &Value) -> String {
        match raw {
            Value::String(text) => self.normalize(text),
            _ => String::new(),
        }
    }

    pub fn normalize_optional(&self, raw: Option<&str>) -> String {
        raw.map(|text| self.normalize(text)).unwrap_or_default()
    }
}

fn replace_all(pattern: &Regex, text: String, replacement: &str) -> String {
    if !pattern.is_match(&text) {
        return text;
    }
    pattern.replace_all(&text, NoExpand(replacement)).into_owned()
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
