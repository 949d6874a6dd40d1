pub mod json_store;
pub mod schema;
pub mod share;

use std::collections::BTreeMap;
use std::io;

/// String-keyed durable storage the engine reads and writes through.
/// Values are whole documents; every update is a full overwrite.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&mut self, key: &str, value: &str) -> io::Result<()>;

    fn remove(&mut self, key: &str) -> io::Result<()>;

    /// Write several keys. Stores that can commit atomically override this
    /// so a failure leaves none of the keys changed.
    fn set_many(&mut self, entries: &[(String, String)]) -> io::Result<()> {
        for (key, value) in entries {
            self.set(key, value)?;
        }
        Ok(())
    }

    fn remove_many(&mut self, keys: &[&str]) -> io::Result<()> {
        for key in keys {
            self.remove(key)?;
        }
        Ok(())
    }
}

/// Volatile store, for tests and for running without a data directory.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> io::Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> io::Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> io::Result<()> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> io::Result<()> {
        (**self).remove(key)
    }

    fn set_many(&mut self, entries: &[(String, String)]) -> io::Result<()> {
        (**self).set_many(entries)
    }

    fn remove_many(&mut self, keys: &[&str]) -> io::Result<()> {
        (**self).remove_many(keys)
    }
}
