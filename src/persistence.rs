use crate::error::PersistenceError;
use crate::workout::Workout;
use serde_json::Value as JsonValue;
use std::collections::HashMap;

/// Key under which the whole collection is stored.
pub const STORAGE_KEY: &str = "workouts";

/// Minimal durable key-value storage.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistenceError>;
    fn remove(&mut self, key: &str) -> Result<(), PersistenceError>;
}

/// In-process storage. `unavailable()` builds one whose every call fails.
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: HashMap<String, String>,
    unavailable: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unavailable() -> Self {
        Self {
            items: HashMap::new(),
            unavailable: true,
        }
    }

    fn check(&self) -> Result<(), PersistenceError> {
        if self.unavailable {
            Err(PersistenceError::Unavailable(
                "storage is switched off".to_string(),
            ))
        } else {
            Ok(())
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        self.check()?;
        Ok(self.items.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistenceError> {
        self.check()?;
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), PersistenceError> {
        self.check()?;
        self.items.remove(key);
        Ok(())
    }
}

/// Serializes the ordered workout collection under [`STORAGE_KEY`].
pub struct Persistence {
    backend: Box<dyn KeyValueStore>,
}

impl Persistence {
    pub fn new(backend: impl KeyValueStore + 'static) -> Self {
        Self {
            backend: Box::new(backend),
        }
    }

    /// Overwrites the stored collection with `workouts`.
    ///
    /// serde_json writes NaN and infinity as `null`, which would not load
    /// back, so such a collection is refused and the old value kept.
    pub fn save(&mut self, workouts: &[Workout]) -> Result<(), PersistenceError> {
        if let Some(bad) = workouts.iter().find(|w| !w.is_finite()) {
            return Err(PersistenceError::NonFinite(bad.id().clone()));
        }
        let json = serde_json::to_string(workouts).map_err(PersistenceError::Encode)?;
        self.backend.set(STORAGE_KEY, &json)
    }

    /// The stored collection, or an empty one when nothing was saved yet.
    ///
    /// Records that no longer decode are skipped with a warning; a value that
    /// is not a JSON array at all is reported as [`PersistenceError::Corrupt`].
    pub fn load(&self) -> Result<Vec<Workout>, PersistenceError> {
        let Some(raw) = self.backend.get(STORAGE_KEY)? else {
            return Ok(Vec::new());
        };

        let records: Vec<JsonValue> = serde_json::from_str(&raw)?;
        let mut out = Vec::with_capacity(records.len());
        for (i, record) in records.into_iter().enumerate() {
            match serde_json::from_value::<Workout>(record) {
                Ok(w) => out.push(w),
                Err(e) => tracing::warn!(index = i, err = %e, "skipping unreadable stored workout"),
            }
        }
        Ok(out)
    }

    pub fn clear(&mut self) -> Result<(), PersistenceError> {
        self.backend.remove(STORAGE_KEY)
    }
}
