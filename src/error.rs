use thiserror::Error;

/// Errors raised by training, classification and the model store.
#[derive(Debug, Error)]
pub enum BayesError {
    /// Training data that can't produce a model (empty, too few columns, ragged rows...).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A model that is missing structure the classifier relies on.
    #[error("invalid model: {0}")]
    InvalidModel(String),

    #[error("no model has been trained under the name '{0}'")]
    NoModelTrained(String),

    #[error("a model named '{0}' already exists")]
    ModelExists(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, BayesError>;
