// src/store.rs

use chrono::{DateTime, Utc};
use std::sync::{Arc, RwLock};

use crate::client::PerimeterClient;
use crate::error::GeofenceError;
use crate::perimeter::PerimeterSet;

/// A complete, read-only view of the perimeter collection at one point in time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PerimeterSnapshot {
    pub perimeters: PerimeterSet,
    /// When the collection was installed. `None` for the initial empty snapshot.
    pub loaded_at: Option<DateTime<Utc>>,
}

/// Holds the current perimeter collection.
///
/// Readers take an `Arc` to the current snapshot and keep using it even if a reload
/// installs a new one meanwhile. Replacement swaps the whole snapshot at once.
#[derive(Debug, Default)]
pub struct PerimeterStore {
    current: RwLock<Arc<PerimeterSnapshot>>,
}

impl PerimeterStore {
    /// Creates an empty store. Classification against it reports "outside, no nearest".
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding a hard-coded collection.
    pub fn with_perimeters(perimeters: PerimeterSet) -> Self {
        let store = Self::new();
        store.replace(perimeters);
        store
    }

    /// Returns the current snapshot.
    pub fn snapshot(&self) -> Arc<PerimeterSnapshot> {
        // A poisoned lock still holds a complete Arc; nothing is ever written partially.
        let guard = self.current.read().unwrap_or_else(|e| e.into_inner());
        Arc::clone(&guard)
    }

    /// Installs a new collection, discarding the previous one.
    pub fn replace(&self, perimeters: PerimeterSet) {
        let snapshot = Arc::new(PerimeterSnapshot {
            perimeters,
            loaded_at: Some(Utc::now()),
        });
        let mut guard = self.current.write().unwrap_or_else(|e| e.into_inner());
        log::debug!(
            "Replacing {} perimeters with {}",
            guard.perimeters.len(),
            snapshot.perimeters.len()
        );
        *guard = snapshot;
    }

    /// Reloads the collection from `client`.
    ///
    /// On failure the error is logged and returned, and the current collection stays in
    /// place. On success the number of installed perimeters is returned.
    pub async fn refresh(&self, client: &PerimeterClient) -> Result<usize, GeofenceError> {
        match client.fetch_perimeters().await {
            Ok(perimeters) => {
                let count = perimeters.len();
                self.replace(perimeters);
                log::debug!(
                    "Loaded {} perimeters from {}",
                    count,
                    client.locations_url()
                );
                Ok(count)
            }
            Err(e) => {
                log::error!(
                    "Error loading perimeters from {}: {}. Keeping {} existing perimeters.",
                    client.locations_url(),
                    e,
                    self.len()
                );
                Err(e)
            }
        }
    }

    pub fn len(&self) -> usize {
        self.snapshot().perimeters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot().perimeters.is_empty()
    }
}
