use crate::{
    dataset::Dataset,
    error::{BayesError, Result},
    model::{Likelihoods, Model, ValueProbs},
};
use log::{debug, info};
use std::collections::{hash_map::Entry, BTreeMap, HashMap, HashSet};

/// One feature column keyed by the string form of its values.
struct FeatureColumn<'a> {
    name: &'a str,
    keys: Vec<String>,
    vocabulary: HashSet<String>,
}

/// Builds a model from labeled data: empirical class priors, and add-one smoothed
/// likelihoods over each feature's full training vocabulary.
pub fn build(dataset: &Dataset, name: Option<&str>) -> Result<Model> {
    let features = dataset.features()?;
    let target = dataset.target()?;
    if dataset.is_empty() {
        return Err(BayesError::InvalidInput("dataset has no rows".into()));
    }

    // Sort row indices into classes:
    let mut classes = HashMap::new();
    for (row, label) in target.values.iter().enumerate() {
        match classes.entry(label.to_string()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(Vec::new()),
        }
        .push(row);
    }

    // Collect every value seen for each feature, across all classes:
    let mut columns = Vec::with_capacity(features.len());
    for column in &features {
        let keys: Vec<String> = column.values.iter().map(|v| v.to_string()).collect();
        let vocabulary: HashSet<String> = keys.iter().cloned().collect();
        if vocabulary.is_empty() {
            return Err(BayesError::InvalidInput(format!(
                "feature '{}' has no values",
                column.name
            )));
        }
        columns.push(FeatureColumn {
            name: column.name,
            keys,
            vocabulary,
        });
    }

    let num_records = dataset.len() as f64;
    let mut priors = BTreeMap::new();
    let mut likelihoods = Likelihoods::new();
    for (class, rows) in &classes {
        let total = rows.len() as f64;
        let prior = total / num_records;
        debug!("class '{class}': {} rows, prior {prior:.6}", rows.len());
        priors.insert(class.clone(), prior);

        let mut per_feature = BTreeMap::new();
        for column in &columns {
            let mut counts: HashMap<&str, usize> = HashMap::new();
            for &row in rows {
                *counts.entry(column.keys[row].as_str()).or_default() += 1;
            }

            let denominator = total + column.vocabulary.len() as f64;
            let probs: ValueProbs = column
                .vocabulary
                .iter()
                .map(|value| {
                    let count = counts.get(value.as_str()).copied().unwrap_or(0) as f64;
                    (value.clone(), (count + 1.0) / denominator)
                })
                .collect();

            per_feature.insert(column.name.to_string(), probs);
        }

        likelihoods.insert(class.clone(), per_feature);
    }

    info!(
        "trained model{} on {} rows: {} classes, {} features",
        name.map(|n| format!(" '{n}'")).unwrap_or_default(),
        dataset.len(),
        classes.len(),
        columns.len()
    );

    Ok(Model {
        name: name.map(str::to_string),
        priors,
        likelihoods,
    })
}
