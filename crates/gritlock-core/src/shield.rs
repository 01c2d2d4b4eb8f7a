//! App shielding and screen-time authorization seams.
//!
//! The platform mechanism that actually blocks applications lives outside
//! this crate. [`AppShield`] and [`AuthorizationProvider`] are the traits a
//! host implements; [`MemoryShield`] and [`StaticAuthorization`] are in-process
//! stand-ins.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{AuthorizationError, ShieldError};

/// Ordered, de-duplicated set of application identifiers.
///
/// Identifiers are trimmed and blanks dropped, including when read from
/// config or the shield store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AppSet(BTreeSet<String>);

impl<'de> Deserialize<'de> for AppSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let apps = Vec::<String>::deserialize(deserializer)?;
        Ok(apps.into_iter().collect())
    }
}

impl AppSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `app`, returning `false` if it was already present. Blank
    /// identifiers are ignored.
    pub fn insert(&mut self, app: impl Into<String>) -> bool {
        let app = app.into();
        let app = app.trim();
        if app.is_empty() {
            return false;
        }
        self.0.insert(app.to_string())
    }

    pub fn remove(&mut self, app: &str) -> bool {
        self.0.remove(app.trim())
    }

    pub fn contains(&self, app: &str) -> bool {
        self.0.contains(app)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for AppSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = AppSet::new();
        for app in iter {
            set.insert(app);
        }
        set
    }
}

/// Blocks and unblocks applications.
pub trait AppShield {
    /// Shield every app in `apps`. Callers never pass an empty set.
    fn block(&mut self, apps: &AppSet) -> Result<(), ShieldError>;

    /// Clear any shield, whether or not one is engaged.
    fn unblock(&mut self) -> Result<(), ShieldError>;
}

/// In-memory shield. Clones share the shielded set.
#[derive(Debug, Clone, Default)]
pub struct MemoryShield {
    shielded: Arc<Mutex<Option<AppSet>>>,
}

impl MemoryShield {
    pub fn new() -> Self {
        Self::default()
    }

    /// The currently shielded set, `None` when nothing is blocked.
    pub fn shielded(&self) -> Option<AppSet> {
        self.shielded.lock().ok().and_then(|guard| guard.clone())
    }

    pub fn is_engaged(&self) -> bool {
        self.shielded().is_some()
    }
}

impl AppShield for MemoryShield {
    fn block(&mut self, apps: &AppSet) -> Result<(), ShieldError> {
        if let Ok(mut guard) = self.shielded.lock() {
            *guard = Some(apps.clone());
        }
        Ok(())
    }

    fn unblock(&mut self) -> Result<(), ShieldError> {
        if let Ok(mut guard) = self.shielded.lock() {
            *guard = None;
        }
        Ok(())
    }
}

/// Requests permission to shield apps. Called once at launch; the result is
/// only logged.
#[async_trait]
pub trait AuthorizationProvider: Send + Sync {
    async fn request_authorization(&self) -> Result<(), AuthorizationError>;
}

/// Provider with a fixed answer.
#[derive(Debug, Clone, Copy)]
pub struct StaticAuthorization {
    pub granted: bool,
}

#[async_trait]
impl AuthorizationProvider for StaticAuthorization {
    async fn request_authorization(&self) -> Result<(), AuthorizationError> {
        if self.granted {
            Ok(())
        } else {
            Err(AuthorizationError::Denied)
        }
    }
}
