mod normalizer;
mod overrides;
mod rules;

pub use normalizer::MerchantNormalizer;
pub use overrides::{FuzzyAlias, RuleOverrides, RuleOverridesError};
pub use rules::{RuleSet, RuleSetError};

use serde_json::Value;
use std::path::Path;

/// Normalizes `raw` with the built-in tables.
pub fn normalize_merchant(raw: &str) -> String {
    MerchantNormalizer::standard().normalize(raw)
}

/// Normalizes an arbitrary JSON value with the built-in tables; non-strings yield `""`.
pub fn normalize_merchant_value(raw: &Value) -> String {
    MerchantNormalizer::standard().normalize_value(raw)
}

#[derive(Debug, thiserror::Error)]
pub enum MerchantRulesError {
    #[error(transparent)]
    Overrides(#[from] RuleOverridesError),
    #[error(transparent)]
    Rules(#[from] RuleSetError),
}

/// Builds the normalizer for a deployment: the built-in tables, extended by the
/// override document at `rules_path` when one is configured.
pub fn load_normalizer(rules_path: Option<&Path>) -> Result<MerchantNormalizer, MerchantRulesError> {
    let Some(path) = rules_path else {
        return Ok(MerchantNormalizer::standard().clone());
    };

    let overrides = RuleOverrides::from_path(path)?;
    if overrides.is_empty() {
        tracing::warn!(path = %path.display(), "merchant rule overrides document is empty");
    }
    tracing::info!(
        path = %path.display(),
        exact = overrides.exact_aliases.len(),
        fuzzy = overrides.fuzzy_aliases.len(),
        noise = overrides.noise_patterns.len(),
        "loaded merchant rule overrides"
    );
    Ok(MerchantNormalizer::with_overrides(overrides)?)
}
