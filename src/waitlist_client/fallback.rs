//! Local record of signups made while the waitlist endpoint is unavailable.
//!
//! Signups are kept as a JSON list under a single key of a small key-value
//! store, mirroring browser local storage.

use chrono::{DateTime, Utc};
use std::{
    collections::{BTreeMap, HashMap},
    fs,
    io::ErrorKind,
    path::PathBuf,
    sync::Mutex,
};

/// Key the signup list is stored under.
pub const WAITLIST_KEY: &str = "waitlist_emails";

/// Callback for [`LocalStorage::update`]: receives the current value and
/// returns the value to store, or `None` to leave it unchanged.
pub type Update<'a> =
    dyn FnMut(Option<&str>) -> Result<Option<String>, LocalStorageError> + 'a;

pub trait LocalStorage: Send + Sync + std::fmt::Debug {
    fn get_item(&self, key: &str) -> Result<Option<String>, LocalStorageError>;
    fn set_item(&self, key: &str, value: &str) -> Result<(), LocalStorageError>;

    /// Read, modify and write `key` as one step. No other access to the
    /// storage happens in between.
    fn update(&self, key: &str, f: &mut Update<'_>) -> Result<(), LocalStorageError>;
}

#[derive(thiserror::Error)]
pub enum LocalStorageError {
    #[error("Failed to access local storage")]
    Io(#[from] std::io::Error),
    #[error("Local storage holds malformed data")]
    Malformed(#[from] serde_json::Error),
    #[error("Local storage lock was poisoned")]
    Poisoned,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct LocalSignup {
    #[serde(default)]
    pub email: String,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalRecord {
    Added,
    AlreadyPresent,
}

/// All signups recorded so far.
pub fn load_signups(storage: &dyn LocalStorage) -> Result<Vec<LocalSignup>, LocalStorageError> {
    parse_signups(storage.get_item(WAITLIST_KEY)?.as_deref())
}

fn parse_signups(raw: Option<&str>) -> Result<Vec<LocalSignup>, LocalStorageError> {
    match raw {
        Some(raw) => Ok(serde_json::from_str(raw)?),
        None => Ok(Vec::new()),
    }
}

/// Append `email` to the local list unless it is already there.
/// `email` is expected to be normalized already.
pub fn record_signup(
    storage: &dyn LocalStorage,
    email: &str,
    at: DateTime<Utc>,
) -> Result<LocalRecord, LocalStorageError> {
    let mut record = LocalRecord::AlreadyPresent;
    storage.update(WAITLIST_KEY, &mut |raw: Option<&str>| {
        let mut signups = parse_signups(raw)?;
        if signups
            .iter()
            .any(|signup| signup.email.to_lowercase() == email)
        {
            record = LocalRecord::AlreadyPresent;
            return Ok(None);
        }

        signups.push(LocalSignup {
            email: email.to_string(),
            at,
        });
        record = LocalRecord::Added;
        Ok(Some(serde_json::to_string(&signups)?))
    })?;

    if record == LocalRecord::Added {
        tracing::info!("Signup recorded locally");
    }
    Ok(record)
}

/// Key-value storage persisted as a JSON object in a single file.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, LocalStorageError> {
        match fs::read_to_string(&self.path) {
            Ok(raw) if raw.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn write_all(&self, items: &BTreeMap<String, String>) -> Result<(), LocalStorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(items)?)?;
        Ok(())
    }
}

impl LocalStorage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, LocalStorageError> {
        let _guard = self.lock.lock().map_err(|_| LocalStorageError::Poisoned)?;
        Ok(self.read_all()?.remove(key))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), LocalStorageError> {
        let _guard = self.lock.lock().map_err(|_| LocalStorageError::Poisoned)?;
        let mut items = self.read_all()?;
        items.insert(key.to_string(), value.to_string());
        self.write_all(&items)
    }

    fn update(&self, key: &str, f: &mut Update<'_>) -> Result<(), LocalStorageError> {
        let _guard = self.lock.lock().map_err(|_| LocalStorageError::Poisoned)?;
        let mut items = self.read_all()?;
        match f(items.get(key).map(String::as_str))? {
            Some(value) => {
                items.insert(key.to_string(), value);
                self.write_all(&items)
            }
            None => Ok(()),
        }
    }
}

/// Key-value storage that lives as long as the process.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: Mutex<HashMap<String, String>>,
}

impl LocalStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, LocalStorageError> {
        let items = self.items.lock().map_err(|_| LocalStorageError::Poisoned)?;
        Ok(items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), LocalStorageError> {
        let mut items = self.items.lock().map_err(|_| LocalStorageError::Poisoned)?;
        items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn update(&self, key: &str, f: &mut Update<'_>) -> Result<(), LocalStorageError> {
        let mut items = self.items.lock().map_err(|_| LocalStorageError::Poisoned)?;
        if let Some(value) = f(items.get(key).map(String::as_str))? {
            items.insert(key.to_string(), value);
        }
        Ok(())
    }
}
