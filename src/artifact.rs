//! Saved model artifacts
//!
//! A fitted model is persisted as an opaque blob wrapped in a small
//! envelope with provenance metadata. Consumers pass artifacts between
//! workflow steps without inspecting the payload.

use crate::error::{Result, TabflowError};
use crate::models::Regressor;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A serialized model with metadata, written as `model-{name}.json`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    /// Artifact name, typically the location or team the model was trained for
    pub name: String,
    /// Model family identifier ("linear", "random_forest", "gradient_boosting")
    pub model_kind: String,
    /// Serialized model payload, opaque to consumers
    pub payload: Vec<u8>,
    pub created_at: DateTime<Utc>,
}

impl ModelArtifact {
    /// Wrap a fitted model into an artifact
    pub fn from_model<M: Regressor>(name: &str, model_kind: &str, model: &M) -> Result<Self> {
        Ok(Self {
            name: name.to_string(),
            model_kind: model_kind.to_string(),
            payload: model.to_bytes()?,
            created_at: Utc::now(),
        })
    }

    /// Reconstruct the model from the payload
    pub fn to_model<M: Regressor>(&self) -> Result<M> {
        M::from_bytes(&self.payload)
    }

    /// The file path this artifact uses under `workdir`
    pub fn path_for(workdir: &Path, name: &str) -> PathBuf {
        workdir.join(format!("model-{}.json", name))
    }

    /// Write the artifact to `workdir/model-{name}.json`, returning the path
    pub fn save(&self, workdir: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(workdir)?;
        let path = Self::path_for(workdir, &self.name);
        let file = std::fs::File::create(&path)?;
        serde_json::to_writer(file, self)?;
        Ok(path)
    }

    /// Load an artifact from disk
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(TabflowError::DataError(format!(
                "artifact not found: {}",
                path.display()
            )));
        }
        let file = std::fs::File::open(path)?;
        Ok(serde_json::from_reader(file)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LinearRegression;
    use ndarray::array;
    use tempfile::tempdir;

    #[test]
    fn test_save_load_round_trip() {
        let x = array![[1.0], [2.0], [3.0]];
        let y = array![2.0, 4.0, 6.0];

        let mut model = LinearRegression::new();
        model.fit(&x, &y).unwrap();

        let dir = tempdir().unwrap();
        let artifact = ModelArtifact::from_model("austin", "linear", &model).unwrap();
        let path = artifact.save(dir.path()).unwrap();

        assert_eq!(path.file_name().unwrap(), "model-austin.json");

        let loaded = ModelArtifact::load(&path).unwrap();
        assert_eq!(loaded.name, "austin");
        assert_eq!(loaded.model_kind, "linear");

        let restored: LinearRegression = loaded.to_model().unwrap();
        assert_eq!(model.predict(&x).unwrap(), restored.predict(&x).unwrap());
    }

    #[test]
    fn test_load_missing_artifact_errors() {
        let dir = tempdir().unwrap();
        let path = ModelArtifact::path_for(dir.path(), "nowhere");
        assert!(ModelArtifact::load(&path).is_err());
    }
}
