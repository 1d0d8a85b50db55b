use crate::{
    dataset::{Dataset, Record},
    error::Result,
    model::Model,
};
use log::{debug, info, warn};
use std::{collections::BTreeMap, path::Path};

/// Prior times the product of the record's likelihoods, per class. Values outside the
/// training vocabulary (and features the model never saw) multiply by 1.
pub fn scores(record: &Record, model: &Model) -> Result<BTreeMap<String, f64>> {
    model.validate()?;

    let mut scores = BTreeMap::new();
    for (class, per_feature) in &model.likelihoods {
        let prior = model.priors[class];
        let score = record.iter().fold(prior, |acc, (feature, value)| {
            let p = per_feature
                .get(feature)
                .and_then(|probs| probs.get(&value.to_string()))
                .copied()
                .unwrap_or(1.0);
            acc * p
        });

        debug!("{class}: {score:.6}");
        scores.insert(class.clone(), score);
    }

    Ok(scores)
}

/// Predicts the class of a record, or `None` when the model knows no classes.
/// Equal scores go to the lexicographically smallest label.
pub fn classify(record: &Record, model: &Model) -> Result<Option<String>> {
    let scores = scores(record, model)?;

    let best = scores
        .into_iter()
        .fold(None, |best: Option<(String, f64)>, (class, score)| match best {
            Some((_, best_score)) if score <= best_score => best,
            _ => Some((class, score)),
        })
        .map(|(class, _)| class);

    match &best {
        Some(class) => debug!("predicted class: {class}"),
        None => debug!("model has no classes to predict"),
    }

    Ok(best)
}

/// What a record carries that the model can't score. None of it fails classification.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RecordReport {
    pub unknown_features: Vec<String>,
    pub unseen_values: Vec<(String, String)>,
    pub missing_features: Vec<String>,
}

impl RecordReport {
    pub fn is_clean(&self) -> bool {
        self.unknown_features.is_empty()
            && self.unseen_values.is_empty()
            && self.missing_features.is_empty()
    }
}

/// Checks a record against the features and vocabularies the model was trained on.
pub fn validate_record(record: &Record, model: &Model) -> RecordReport {
    let mut report = RecordReport::default();
    let known = model.features();
    // Every class shares the same vocabulary per feature, so one class is enough:
    let vocabulary = model.likelihoods.values().next();

    for (feature, value) in record {
        let probs = vocabulary.and_then(|per_feature| per_feature.get(feature));
        match probs {
            None => {
                warn!("feature '{feature}' is unknown to the model and will be ignored");
                report.unknown_features.push(feature.clone());
            }
            Some(probs) if !probs.contains_key(&value.to_string()) => {
                warn!("value '{value}' was never seen for feature '{feature}'");
                report.unseen_values.push((feature.clone(), value.to_string()));
            }
            Some(_) => {}
        }
    }

    report.missing_features = known
        .into_iter()
        .filter(|feature| !record.contains_key(*feature))
        .map(str::to_string)
        .collect();

    report
}

/// Classifies every row of a CSV file (all columns are features) and writes an
/// `ID,Prediction` file with 1-based IDs.
pub fn predict_csv<P: AsRef<Path>, Q: AsRef<Path>>(
    model: &Model,
    inpath: P,
    outpath: Q,
) -> Result<usize> {
    let input = Dataset::from_csv_path(inpath)?;

    let mut results = Vec::with_capacity(input.len());
    for record in input.records() {
        results.push(classify(&record, model)?);
    }

    // Now we can write the result:
    let mut writer = csv::Writer::from_path(outpath)?;

    writer.write_record(["ID", "Prediction"])?;
    for (i, result) in results.iter().enumerate() {
        writer.write_record([(i + 1).to_string(), result.clone().unwrap_or_default()])?;
    }
    writer.flush()?;

    info!("wrote {} predictions", results.len());
    Ok(results.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{dataset::Value, error::BayesError, model::Likelihoods, trainer};

    fn weather_model() -> Model {
        let data =
            Dataset::from_csv_reader("weather,play\nsunny,yes\nrainy,no\nsunny,yes\n".as_bytes())
                .unwrap();
        trainer::build(&data, Some("weather")).unwrap()
    }

    fn record(pairs: &[(&str, &str)]) -> Record {
        pairs
            .iter()
            .map(|&(k, v)| (k.to_string(), Value::from(v)))
            .collect()
    }

    #[test]
    fn sunny_weather_plays() {
        let model = weather_model();
        let sunny = record(&[("weather", "sunny")]);

        let scores = scores(&sunny, &model).unwrap();
        assert!((scores["yes"] - 0.5).abs() < 1e-12);
        assert!((scores["no"] - 1.0 / 9.0).abs() < 1e-12);

        assert_eq!(classify(&sunny, &model).unwrap().as_deref(), Some("yes"));
    }

    #[test]
    fn rainy_weather_does_not() {
        let model = weather_model();
        // yes: 2/3 * 1/4 = 1/6, no: 1/3 * 2/3 = 2/9
        let rainy = record(&[("weather", "rainy")]);
        assert_eq!(classify(&rainy, &model).unwrap().as_deref(), Some("no"));
    }

    #[test]
    fn unseen_values_fall_back_to_the_highest_prior() {
        let model = weather_model();
        let strange = record(&[("weather", "hail"), ("humidity", "high")]);

        let scores = scores(&strange, &model).unwrap();
        assert_eq!(scores["yes"], model.priors["yes"]);
        assert_eq!(scores["no"], model.priors["no"]);
        assert_eq!(classify(&strange, &model).unwrap().as_deref(), Some("yes"));
    }

    #[test]
    fn no_classes_means_no_prediction() {
        let model = Model {
            name: None,
            priors: BTreeMap::new(),
            likelihoods: Likelihoods::new(),
        };
        assert_eq!(classify(&record(&[("weather", "sunny")]), &model).unwrap(), None);
    }

    #[test]
    fn ties_go_to_the_smallest_label() {
        let data = Dataset::from_csv_reader("x,label\na,zeta\nb,alpha\n".as_bytes()).unwrap();
        let model = trainer::build(&data, None).unwrap();
        assert_eq!(
            classify(&Record::new(), &model).unwrap().as_deref(),
            Some("alpha")
        );
    }

    #[test]
    fn malformed_model_is_rejected() {
        let mut model = weather_model();
        model.priors.remove("no");
        assert!(matches!(
            classify(&record(&[("weather", "sunny")]), &model),
            Err(BayesError::InvalidModel(_))
        ));
    }

    #[test]
    fn classification_is_deterministic() {
        let model = weather_model();
        let sunny = record(&[("weather", "sunny")]);
        let first = scores(&sunny, &model).unwrap();
        for _ in 0..10 {
            assert_eq!(scores(&sunny, &model).unwrap(), first);
        }
    }

    #[test]
    fn report_lists_what_the_model_cannot_score() {
        let model = weather_model();

        assert!(validate_record(&record(&[("weather", "sunny")]), &model).is_clean());

        let report = validate_record(&record(&[("weather", "hail"), ("wind", "calm")]), &model);
        assert_eq!(report.unknown_features, ["wind"]);
        assert_eq!(report.unseen_values, [("weather".to_string(), "hail".to_string())]);
        assert!(report.missing_features.is_empty());

        let report = validate_record(&Record::new(), &model);
        assert_eq!(report.missing_features, ["weather"]);
    }

    #[test]
    fn predicts_a_csv_file() {
        let model = weather_model();
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("input.csv");
        let output = dir.path().join("output.csv");
        std::fs::write(&input, "weather\nsunny\nrainy\nhail\n").unwrap();

        assert_eq!(predict_csv(&model, &input, &output).unwrap(), 3);
        assert_eq!(
            std::fs::read_to_string(&output).unwrap(),
            "ID,Prediction\n1,yes\n2,no\n3,yes\n"
        );
    }
}
