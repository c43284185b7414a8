use super::overrides::RuleOverrides;
use regex::Regex;
use std::collections::HashMap;

/// Whole-string aliases keyed by the lowercased, trimmed raw merchant text.
pub(crate) const EXACT_ALIASES: &[(&str, &str)] = &[
    ("1444 deventer", "action"),
    ("bk 20748 apeldoorn", "burger king"),
    ("bk 15019 907j2g", "burger king"),
    ("bk 15928 sot", "burger king"),
    ("caelum supermarkt erp", "albert heijn"),
    // Stripe settles Amazon marketplace purchases under its own legal name.
    ("stripe technology europe ltd", "amazon"),
    (r"x-620 maxima\kestucio g. 20-3\telsiai\\ltultu", "maxima"),
];

/// Known spelling variants, replaced wherever they occur.
pub(crate) const FUZZY_ALIASES: &[(&str, &str)] = &[(r"ahtogo|ah to go", "albert heijn")];

/// Applied in order; each match becomes a single space.
pub(crate) const NOISE_PATTERNS: &[&str] = &[
    // Internal terminal codes
    r"\s*(dev183|x-088)\s*",
    // Transaction channel prefixes
    r"^(pinbetaling|betaling|payment|ideal)\b",
    // Legal-entity suffixes
    r"\s+(b\.v\.|b\.v|bv|nv|inc|llc|bck|uab|lv|gt|ltd)\b",
    // Repeated entity tokens
    r"(uab)+\s",
    // Country codes
    r"\s+(nl|lt)\s*",
    // Cities and store locations
    r"\s*(deventer|vosselman|telsiai|klaipeda|paris|plunges|vilnius|putten|warszawa|kaunas|doornh|lithuani|kauno|deurne|wilmink|drielanden|boekel|apeldoorn|devent|utrecht|amsterdam|rotterdam)\s*",
    // Remaining punctuation
    r"[^\w\s]+",
    // Transaction and reference codes, consecutive codes as one run
    r"(?:\s+\d{3,})+\s*",
];

/// Uncompiled lookup tables, in application order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSet {
    pub exact_aliases: Vec<(String, String)>,
    pub fuzzy_aliases: Vec<(String, String)>,
    pub noise_patterns: Vec<String>,
}

impl RuleSet {
    /// The tables shipped with the crate.
    pub fn builtin() -> Self {
        Self {
            exact_aliases: owned_pairs(EXACT_ALIASES),
            fuzzy_aliases: owned_pairs(FUZZY_ALIASES),
            noise_patterns: NOISE_PATTERNS.iter().map(|p| p.to_string()).collect(),
        }
    }

    /// Appends override entries after the existing ones.
    ///
    /// Exact keys are folded the same way raw input is before lookup, and an
    /// override key replaces an existing entry with the same key in place.
    pub fn extend(&mut self, overrides: RuleOverrides) {
        for (raw, canonical) in overrides.exact_aliases {
            let key = fold(&raw);
            match self.exact_aliases.iter_mut().find(|(k, _)| *k == key) {
                Some(entry) => entry.1 = canonical,
                None => self.exact_aliases.push((key, canonical)),
            }
        }

        self.fuzzy_aliases.extend(
            overrides
                .fuzzy_aliases
                .into_iter()
                .map(|alias| (alias.pattern, alias.replacement)),
        );
        self.noise_patterns.extend(overrides.noise_patterns);
    }

    pub(crate) fn compile(&self) -> Result<CompiledRules, RuleSetError> {
        let exact = self.exact_aliases.iter().cloned().collect();

        let fuzzy = self
            .fuzzy_aliases
            .iter()
            .map(|(pattern, replacement)| Ok((compile_pattern(pattern)?, replacement.clone())))
            .collect::<Result<Vec<_>, RuleSetError>>()?;

        let noise = self
            .noise_patterns
            .iter()
            .map(|pattern| compile_pattern(pattern))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(CompiledRules {
            exact,
            fuzzy,
            noise,
        })
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::builtin()
    }
}

#[derive(Debug, Clone)]
pub(crate) struct CompiledRules {
    pub(crate) exact: HashMap<String, String>,
    pub(crate) fuzzy: Vec<(Regex, String)>,
    pub(crate) noise: Vec<Regex>,
}

/// Raised when a rule table contains a pattern the regex engine rejects.
#[derive(Debug, thiserror::Error)]
pub enum RuleSetError {
    #[error("invalid merchant rule pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

fn compile_pattern(pattern: &str) -> Result<Regex, RuleSetError> {
    Regex::new(pattern).map_err(|source| RuleSetError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}

/// Lowercases and trims `raw` the way exact-alias keys are stored.
///
/// Trimming also drops the ASCII separator controls `\x1c`..`\x1f`, which
/// some bank exports leave at field edges.
pub(crate) fn fold(raw: &str) -> String {
    raw.to_lowercase()
        .trim_matches(|c: char| c.is_whitespace() || ('\x1c'..='\x1f').contains(&c))
        .to_string()
}

fn owned_pairs(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
    pairs
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::merchants::overrides::FuzzyAlias;
    use std::collections::BTreeMap;

    #[test]
    fn builtin_tables_compile() {
        let compiled = RuleSet::builtin().compile().expect("built-in rules compile");
        assert_eq!(compiled.exact.len(), EXACT_ALIASES.len());
        assert_eq!(compiled.fuzzy.len(), FUZZY_ALIASES.len());
        assert_eq!(compiled.noise.len(), NOISE_PATTERNS.len());
    }

    #[test]
    fn exact_keys_are_already_folded() {
        for (key, _) in EXACT_ALIASES {
            assert_eq!(*key, fold(key), "key '{key}' is not folded");
        }
    }

    #[test]
    fn punctuation_and_digit_passes_run_last() {
        let tail = &NOISE_PATTERNS[NOISE_PATTERNS.len() - 2..];
        assert_eq!(tail, &[r"[^\w\s]+", r"(?:\s+\d{3,})+\s*"]);
    }

    #[test]
    fn extend_appends_after_builtin_entries() {
        let mut rules = RuleSet::builtin();
        let mut exact_aliases = BTreeMap::new();
        exact_aliases.insert("  JUMBO 7781 ".to_string(), "jumbo".to_string());
        rules.extend(RuleOverrides {
            exact_aliases,
            fuzzy_aliases: vec![FuzzyAlias {
                pattern: "lidl\\s*nl".to_string(),
                replacement: "lidl".to_string(),
            }],
            noise_patterns: vec![r"\s*(zwolle)\s*".to_string()],
        });

        assert_eq!(
            rules.exact_aliases.last(),
            Some(&("jumbo 7781".to_string(), "jumbo".to_string()))
        );
        assert_eq!(rules.fuzzy_aliases[0].0, FUZZY_ALIASES[0].0);
        assert_eq!(rules.fuzzy_aliases.last().map(|(p, _)| p.as_str()), Some("lidl\\s*nl"));
        assert_eq!(rules.noise_patterns.len(), NOISE_PATTERNS.len() + 1);
        assert_eq!(rules.noise_patterns[0], NOISE_PATTERNS[0]);
    }

    #[test]
    fn extend_replaces_existing_exact_key_in_place() {
        let mut rules = RuleSet::builtin();
        let mut exact_aliases = BTreeMap::new();
        exact_aliases.insert("1444 Deventer".to_string(), "action nl".to_string());
        rules.extend(RuleOverrides {
            exact_aliases,
            ..RuleOverrides::default()
        });

        assert_eq!(rules.exact_aliases.len(), EXACT_ALIASES.len());
        assert_eq!(rules.exact_aliases[0].1, "action nl");
    }

    #[test]
    fn compile_reports_offending_pattern() {
        let mut rules = RuleSet::builtin();
        rules.noise_patterns.push("(unclosed".to_string());

        match rules.compile().expect_err("invalid pattern rejected") {
            RuleSetError::InvalidPattern { pattern, .. } => assert_eq!(pattern, "(unclosed"),
        }
    }
}
