//! Categorical Naive Bayes.
//!
//! Train a model from labeled tabular data (the last column is the label) and classify
//! unlabeled records with it:
//!
//! ```
//! use categorical_bayes::{classify, train, Dataset, Record, Value};
//!
//! let data = Dataset::from_csv_reader(
//!     "weather,play\nsunny,yes\nrainy,no\nsunny,yes\n".as_bytes(),
//! )?;
//! let model = train(&data, Some("weather"))?;
//!
//! let record: Record = [("weather".to_string(), Value::from("sunny"))].into();
//! assert_eq!(classify(&record, &model)?.as_deref(), Some("yes"));
//! # Ok::<(), categorical_bayes::BayesError>(())
//! ```

pub mod classifier;
pub mod dataset;
pub mod error;
pub mod evaluator;
pub mod model;
pub mod registry;
pub mod store;
pub mod trainer;

pub use classifier::{classify, predict_csv, scores, validate_record, RecordReport};
pub use dataset::{Column, Dataset, FeatureSchema, Record, Value};
pub use error::{BayesError, Result};
pub use evaluator::accuracy;
pub use model::Model;
pub use registry::ModelRegistry;
pub use store::ModelStore;

/// Builds a model from `dataset`. See [`trainer::build`].
pub fn train(dataset: &Dataset, model_name: Option<&str>) -> Result<Model> {
    trainer::build(dataset, model_name)
}
