//! Identity provider backed by a JSON file

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tn_core::session::Metadata;
use tn_core::{CoreError, CoreResult, Identity, IdentityProvider};

pub struct FileIdentityProvider {
    path: PathBuf,
    identity: Mutex<Identity>,
}

impl FileIdentityProvider {
    pub fn open(path: &Path) -> CoreResult<Self> {
        let data = std::fs::read_to_string(path)?;
        let identity: Identity =
            serde_json::from_str(&data).map_err(|e| CoreError::Serialization(e.to_string()))?;

        Ok(Self {
            path: path.to_path_buf(),
            identity: Mutex::new(identity),
        })
    }

    pub fn identity(&self) -> Identity {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Identity> {
        self.identity.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl IdentityProvider for FileIdentityProvider {
    async fn update_metadata(&self, metadata: Metadata) -> CoreResult<()> {
        let mut updated = self.identity();
        if !updated.signed_in {
            return Err(CoreError::RoleAssignment("identity is not signed in".to_string()));
        }
        updated.metadata = metadata;

        // memory only follows a successful write
        let json = serde_json::to_string_pretty(&updated)
            .map_err(|e| CoreError::Serialization(e.to_string()))?;
        tokio::fs::write(&self.path, json)
            .await
            .map_err(|e| CoreError::RoleAssignment(e.to_string()))?;

        *self.lock() = updated;
        tracing::debug!("Identity written to {}", self.path.display());
        Ok(())
    }
}
