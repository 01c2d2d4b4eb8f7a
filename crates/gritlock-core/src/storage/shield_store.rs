//! Local shield backed by the kv store.
//!
//! Stands in for a platform settings store: blocking records the shielded
//! app set under [`SHIELD_APPS_KEY`], unblocking deletes it. Blocking only
//! succeeds after the local authorization flag has been granted.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::database::Database;
use crate::error::{AuthorizationError, ShieldError};
use crate::shield::{AppSet, AppShield, AuthorizationProvider};

pub const SHIELD_APPS_KEY: &str = "shield.applications";
pub const AUTHORIZED_KEY: &str = "shield.authorized";

pub struct ShieldStore {
    db: Database,
}

impl ShieldStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Apps currently shielded, `None` when nothing is blocked.
    pub fn shielded(&self) -> Result<Option<AppSet>, ShieldError> {
        let Some(json) = self.db.kv_get(SHIELD_APPS_KEY)? else {
            return Ok(None);
        };
        match serde_json::from_str::<AppSet>(&json) {
            Ok(apps) => Ok(Some(apps)),
            Err(e) => {
                tracing::warn!(error = %e, "discarding unreadable shield entry");
                Ok(None)
            }
        }
    }

    pub fn is_authorized(&self) -> Result<bool, ShieldError> {
        Ok(self.db.kv_get_bool(AUTHORIZED_KEY)?)
    }

    pub fn set_authorized(&self, granted: bool) -> Result<(), ShieldError> {
        self.db.kv_set_bool(AUTHORIZED_KEY, granted)?;
        Ok(())
    }
}

impl AppShield for ShieldStore {
    fn block(&mut self, apps: &AppSet) -> Result<(), ShieldError> {
        if !self.is_authorized()? {
            return Err(ShieldError::NotAuthorized);
        }
        let json = serde_json::to_string(apps)?;
        self.db.kv_set(SHIELD_APPS_KEY, &json)?;
        Ok(())
    }

    fn unblock(&mut self) -> Result<(), ShieldError> {
        self.db.kv_delete(SHIELD_APPS_KEY)?;
        Ok(())
    }
}

/// Authorization provider that reads the local flag from the database file.
///
/// Opens its own connection per request on tokio's blocking pool.
#[derive(Debug, Clone, Default)]
pub struct StoreAuthorization {
    path: Option<PathBuf>,
}

impl StoreAuthorization {
    /// Use the default database location.
    pub fn new() -> Self {
        Self { path: None }
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    fn read_flag(path: Option<&Path>) -> Result<(), AuthorizationError> {
        let db = match path {
            Some(path) => Database::open_at(path),
            None => Database::open(),
        }
        .map_err(|e| AuthorizationError::Failed(e.to_string()))?;

        match db.kv_get_bool(AUTHORIZED_KEY) {
            Ok(true) => Ok(()),
            Ok(false) => Err(AuthorizationError::Denied),
            Err(e) => Err(AuthorizationError::Failed(e.to_string())),
        }
    }
}

#[async_trait]
impl AuthorizationProvider for StoreAuthorization {
    async fn request_authorization(&self) -> Result<(), AuthorizationError> {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || Self::read_flag(path.as_deref()))
            .await
            .map_err(|e| AuthorizationError::Failed(e.to_string()))?
    }
}
