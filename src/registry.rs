use crate::{
    error::{BayesError, Result},
    model::Model,
};
use log::info;
use std::{
    collections::HashMap,
    sync::{Arc, RwLock},
};

/// Name -> trained model, shared between threads.
///
/// Models are only inserted once they are fully built, so a reader sees either the
/// previous model under a name or the new one, never a partial one.
#[derive(Debug, Default)]
pub struct ModelRegistry {
    models: RwLock<HashMap<String, Arc<Model>>>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `model` available under `name`, returning the model it replaced.
    pub fn publish(&self, name: &str, model: Model) -> Option<Arc<Model>> {
        let model = Arc::new(model);
        let previous = self
            .models
            .write()
            .expect("model registry lock poisoned")
            .insert(name.to_string(), model);
        info!("published model '{name}'");
        previous
    }

    pub fn get(&self, name: &str) -> Result<Arc<Model>> {
        self.models
            .read()
            .expect("model registry lock poisoned")
            .get(name)
            .cloned()
            .ok_or_else(|| BayesError::NoModelTrained(name.to_string()))
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .models
            .read()
            .expect("model registry lock poisoned")
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.models.read().expect("model registry lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
