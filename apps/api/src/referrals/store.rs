//! RefStore — the read-only ref → referral record map, loaded once at startup.
//!
//! Records are decoded eagerly at load time. A record without a usable name
//! is skipped; any other malformed field or list entry is dropped on its own
//! and the rest of the record stays available. The raw JSON of every
//! record is kept next to its typed form because the prompt composer merges
//! at the JSON level.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{info, warn};

use crate::models::agent::DefaultRecord;
use crate::models::referral::ReferralRecord;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("referral document must be a JSON object keyed by ref")]
    NotAnObject,

    #[error("default record is invalid: {0}")]
    InvalidDefault(#[source] serde_json::Error),

    #[error("failed to encode record: {0}")]
    Encode(#[source] serde_json::Error),
}

#[derive(Debug, Clone)]
struct ReferralEntry {
    record: ReferralRecord,
    raw: Value,
}

#[derive(Debug)]
pub struct RefStore {
    default_record: DefaultRecord,
    default_raw: Value,
    records: HashMap<String, ReferralEntry>,
}

impl RefStore {
    /// Builds a store from already-parsed documents.
    ///
    /// The default document must decode as a `DefaultRecord`. Referral records
    /// without a string `name` are skipped with a warning.
    pub fn new(default_raw: Value, refs: Map<String, Value>) -> Result<Self, StoreError> {
        let default_record: DefaultRecord =
            serde_json::from_value(default_raw.clone()).map_err(StoreError::InvalidDefault)?;

        let mut records = HashMap::with_capacity(refs.len());
        for (key, raw) in refs {
            match serde_json::from_value::<ReferralRecord>(raw.clone()) {
                Ok(record) => {
                    records.insert(key, ReferralEntry { record, raw });
                }
                Err(e) => warn!("Skipping malformed referral record '{key}': {e}"),
            }
        }

        Ok(Self {
            default_record,
            default_raw,
            records,
        })
    }

    /// Builds a store from typed records, for callers that never touch JSON.
    pub fn from_records(
        default_record: DefaultRecord,
        records: impl IntoIterator<Item = (String, ReferralRecord)>,
    ) -> Result<Self, StoreError> {
        let default_raw = serde_json::to_value(&default_record).map_err(StoreError::Encode)?;
        let mut refs = Map::new();
        for (key, record) in records {
            refs.insert(
                key,
                serde_json::to_value(&record).map_err(StoreError::Encode)?,
            );
        }
        Self::new(default_raw, refs)
    }

    /// Reads the default and referral documents from disk.
    pub fn load(default_path: &Path, refs_path: &Path) -> Result<Self, StoreError> {
        let default_raw = read_json(default_path)?;
        let refs = match read_json(refs_path)? {
            Value::Object(map) => map,
            _ => return Err(StoreError::NotAnObject),
        };

        let total = refs.len();
        let store = Self::new(default_raw, refs)?;
        info!(
            "Loaded {} of {} referral records from {}",
            store.len(),
            total,
            refs_path.display()
        );
        Ok(store)
    }

    /// Returns the referral record for `reference`. Absence is not an error;
    /// callers fall back to defaults.
    pub fn lookup(&self, reference: &str) -> Option<&ReferralRecord> {
        self.records.get(reference).map(|entry| &entry.record)
    }

    /// The record exactly as it appeared in the source document.
    pub fn lookup_raw(&self, reference: &str) -> Option<&Value> {
        self.records.get(reference).map(|entry| &entry.raw)
    }

    pub fn default_record(&self) -> &DefaultRecord {
        &self.default_record
    }

    pub fn default_raw(&self) -> &Value {
        &self.default_raw
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn read_json(path: &Path) -> Result<Value, StoreError> {
    let text = std::fs::read_to_string(path).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| StoreError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
