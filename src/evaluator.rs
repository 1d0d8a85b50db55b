use crate::{classifier, dataset::Dataset, error::Result, model::Model};
use log::info;

/// Fraction of rows whose label the model predicts, or 0 for an empty dataset.
pub fn accuracy(model: &Model, labeled: &Dataset) -> Result<f64> {
    let total = labeled.len();
    if total == 0 {
        return Ok(0.0);
    }

    let mut correct = 0;
    for (record, actual) in labeled.labeled_records()? {
        let predicted = classifier::classify(&record, model)?;
        if predicted.as_deref() == Some(actual.to_string().as_str()) {
            correct += 1;
        }
    }

    let accuracy = correct as f64 / total as f64;
    info!("accuracy: {correct}/{total} ({:.2}%)", accuracy * 100.0);
    Ok(accuracy)
}
