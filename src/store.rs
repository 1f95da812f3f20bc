use crate::config::StorageConfig;
use crate::errors::Result;
use crate::models::{Bike, Booking, User};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;

/// Flat-file persistence for the three entity collections.
///
/// Each collection lives in its own JSON file under the configured data
/// directory. Loads read the whole file; saves rewrite the whole file. A
/// missing or unparseable file loads as an empty collection so a fresh data
/// directory bootstraps itself.
pub struct Store {
    storage: StorageConfig,
}

impl Store {
    pub fn new(storage: StorageConfig) -> Self {
        Self { storage }
    }

    pub fn load_users(&self) -> Vec<User> {
        load_slot(&self.storage.users_path())
    }

    pub fn save_users(&self, users: &[User]) -> Result<()> {
        self.save_slot(&self.storage.users_path(), users)
    }

    pub fn load_bikes(&self) -> Vec<Bike> {
        load_slot(&self.storage.bikes_path())
    }

    pub fn save_bikes(&self, bikes: &[Bike]) -> Result<()> {
        self.save_slot(&self.storage.bikes_path(), bikes)
    }

    pub fn load_bookings(&self) -> Vec<Booking> {
        load_slot(&self.storage.bookings_path())
    }

    pub fn save_bookings(&self, bookings: &[Booking]) -> Result<()> {
        self.save_slot(&self.storage.bookings_path(), bookings)
    }

    fn save_slot<T: Serialize>(&self, path: &Path, records: &[T]) -> Result<()> {
        std::fs::create_dir_all(&self.storage.data_dir)?;
        let content = serde_json::to_string_pretty(records)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

fn load_slot<T: DeserializeOwned>(path: &Path) -> Vec<T> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(_) => return Vec::new(),
    };
    match serde_json::from_str(&content) {
        Ok(records) => records,
        Err(err) => {
            eprintln!(
                "Warning: failed to parse {}: {}; treating as empty",
                path.display(),
                err
            );
            Vec::new()
        }
    }
}
