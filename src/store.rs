use crate::{
    error::{BayesError, Result},
    model::Model,
};
use log::info;
use std::{
    fs, io,
    path::{Path, PathBuf},
};

/// Persists models as one pretty-printed JSON document per name: `<root>/<name>.json`.
pub struct ModelStore {
    root: PathBuf,
}

impl ModelStore {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, name: &str) -> Result<PathBuf> {
        if name.is_empty()
            || name.starts_with('.')
            || name.contains(|c: char| c == '/' || c == '\\')
        {
            return Err(BayesError::InvalidInput(format!(
                "'{name}' can't be used as a model name"
            )));
        }
        Ok(self.root.join(format!("{name}.json")))
    }

    pub fn contains(&self, name: &str) -> Result<bool> {
        Ok(self.path_for(name)?.is_file())
    }

    /// Writes `model` under `name`. Fails with `ModelExists` if the name is taken and
    /// `overwrite` is off.
    pub fn save(&self, name: &str, model: &Model, overwrite: bool) -> Result<PathBuf> {
        let path = self.path_for(name)?;
        if !overwrite && path.is_file() {
            return Err(BayesError::ModelExists(name.to_string()));
        }

        fs::create_dir_all(&self.root)?;
        fs::write(&path, model.to_json()?)?;

        info!("saved model '{name}' to {}", path.display());
        Ok(path)
    }

    pub fn load(&self, name: &str) -> Result<Model> {
        let path = self.path_for(name)?;
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(BayesError::NoModelTrained(name.to_string()))
            }
            Err(e) => return Err(e.into()),
        };

        let model = Model::from_json(&text)?;
        info!("loaded model '{name}' from {}", path.display());
        Ok(model)
    }

    /// Names of every stored model, sorted.
    pub fn list(&self) -> Result<Vec<String>> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut names = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            // Skip files whose stem isn't a name `save` would accept:
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                if self.path_for(stem).is_ok() {
                    names.push(stem.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    /// The name of a stored model with the same priors and likelihoods as `model`, if any.
    /// Documents that no longer parse are skipped.
    pub fn find_identical(&self, model: &Model) -> Result<Option<String>> {
        for name in self.list()? {
            match self.load(&name) {
                Ok(stored) if stored.same_parameters(model) => return Ok(Some(name)),
                Ok(_) | Err(BayesError::InvalidModel(_)) => {}
                Err(e) => return Err(e),
            }
        }
        Ok(None)
    }
}
