use serde::Deserialize;
use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

/// Additional table entries loaded from a JSON document.
///
/// ```json
/// {
///   "exact_aliases": { "jumbo 7781 zwolle": "jumbo" },
///   "fuzzy_aliases": [{ "pattern": "lidl\\s*nl", "replacement": "lidl" }],
///   "noise_patterns": ["\\s*(zwolle)\\s*"]
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RuleOverrides {
    pub exact_aliases: BTreeMap<String, String>,
    pub fuzzy_aliases: Vec<FuzzyAlias>,
    pub noise_patterns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FuzzyAlias {
    pub pattern: String,
    pub replacement: String,
}

#[derive(Debug, thiserror::Error)]
pub enum RuleOverridesError {
    #[error("failed to read merchant rule overrides: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid merchant rule overrides document: {0}")]
    Json(#[from] serde_json::Error),
}

impl RuleOverrides {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, RuleOverridesError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, RuleOverridesError> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn is_empty(&self) -> bool {
        self.exact_aliases.is_empty() && self.fuzzy_aliases.is_empty() && self.noise_patterns.is_empty()
    }
}
