use crate::error::{BayesError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Feature value -> P(value | class).
pub type ValueProbs = BTreeMap<String, f64>;

/// Class -> feature -> value -> P(value | class).
pub type Likelihoods = BTreeMap<String, BTreeMap<String, ValueProbs>>;

/// A trained categorical Naive Bayes model. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Model {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub priors: BTreeMap<String, f64>,
    pub likelihoods: Likelihoods,
}

impl Model {
    /// Parses a model document, reporting structural problems as `InvalidModel`.
    pub fn from_json(text: &str) -> Result<Self> {
        let model: Model =
            serde_json::from_str(text).map_err(|e| BayesError::InvalidModel(e.to_string()))?;
        model.validate()?;
        Ok(model)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.likelihoods.keys().map(String::as_str)
    }

    /// The feature names the model was trained on.
    pub fn features(&self) -> Vec<&str> {
        let mut features: Vec<&str> = self
            .likelihoods
            .values()
            .flat_map(|per_feature| per_feature.keys().map(String::as_str))
            .collect();
        features.sort_unstable();
        features.dedup();
        features
    }

    /// Same priors and likelihoods, regardless of name.
    pub fn same_parameters(&self, other: &Model) -> bool {
        self.priors == other.priors && self.likelihoods == other.likelihoods
    }

    /// Checks what the classifier depends on: every class has a prior, and every
    /// probability is a finite, nonnegative number.
    pub fn validate(&self) -> Result<()> {
        for (class, prior) in &self.priors {
            if !prior.is_finite() || *prior < 0.0 {
                return Err(BayesError::InvalidModel(format!(
                    "prior for class '{class}' is {prior}"
                )));
            }
        }

        for (class, per_feature) in &self.likelihoods {
            if !self.priors.contains_key(class) {
                return Err(BayesError::InvalidModel(format!(
                    "class '{class}' has likelihoods but no prior"
                )));
            }

            for (feature, probs) in per_feature {
                if let Some((value, p)) = probs.iter().find(|(_, p)| !p.is_finite() || **p < 0.0) {
                    return Err(BayesError::InvalidModel(format!(
                        "likelihood of {feature}={value} given '{class}' is {p}"
                    )));
                }
            }
        }

        Ok(())
    }
}
