use crate::config::TicketConfig;
use crate::error::{TicketError, TicketResult};
use crate::storage;
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use opendal::{EntryMode, Metadata, Operator};
use std::collections::BTreeMap;
use tracing::{debug, info};

pub const DOCUMENT_SUFFIX: &str = ".json";

/// One persisted ticket: field key to string value, serialized with sorted keys.
pub type Record = BTreeMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PutOutcome {
    Written,
    /// Stored bytes already matched; nothing was written.
    Unchanged,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordMeta {
    /// File name including the `.json` suffix.
    pub name: String,
    pub modified_at: DateTime<Utc>,
}

/// Directory of ticket documents on top of an OpenDAL operator.
#[derive(Debug, Clone)]
pub struct RecordStore {
    op: Operator,
    dir: String,
}

impl RecordStore {
    pub fn new(op: Operator, tickets_dir: &str) -> Self {
        Self {
            op,
            dir: format!("{}/", tickets_dir.trim_matches('/')),
        }
    }

    pub fn from_config(config: &TicketConfig) -> TicketResult<Self> {
        let op = storage::operator_from_uri(&config.storage_uri)?;
        Ok(Self::new(op, &config.tickets_dir))
    }

    pub fn operator(&self) -> &Operator {
        &self.op
    }

    /// Directory path relative to the operator root, with a trailing slash.
    pub fn dir(&self) -> &str {
        &self.dir
    }

    pub async fn ensure_directory(&self) -> TicketResult<()> {
        if !self.op.exists(&self.dir).await? {
            debug!(dir = %self.dir, "creating ticket directory");
            self.op.create_dir(&self.dir).await?;
        }
        Ok(())
    }

    pub async fn put(&self, name: &str, value: &Record) -> TicketResult<PutOutcome> {
        let path = self.document_path(name)?;
        self.ensure_directory().await?;
        let payload = serialize_record(value)?;

        if self.op.exists(&path).await? {
            let existing = self.op.read(&path).await?;
            if existing.to_vec() == payload {
                debug!(path = %path, "ticket unchanged, skipping write");
                return Ok(PutOutcome::Unchanged);
            }
        }

        self.op.write(&path, payload).await?;
        info!(path = %path, "ticket written");
        Ok(PutOutcome::Written)
    }

    pub async fn get(&self, name: &str) -> TicketResult<Vec<u8>> {
        let path = self.document_path(name)?;
        if !self.op.exists(&path).await? {
            return Err(TicketError::NotFound(document_file_name(name)));
        }
        let bytes = self.op.read(&path).await?;
        Ok(bytes.to_vec())
    }

    pub async fn read_record(&self, name: &str) -> TicketResult<Record> {
        let bytes = self.get(name).await?;
        parse_record(&document_file_name(name), &bytes)
    }

    /// Every `.json` document directly inside the ticket directory, in backend order.
    pub async fn list(&self) -> TicketResult<Vec<RecordMeta>> {
        if !self.op.exists(&self.dir).await? {
            return Ok(vec![]);
        }

        let mut lister = self.op.lister(&self.dir).await?;
        let mut metas = Vec::new();

        while let Some(entry) = lister.try_next().await? {
            if entry.metadata().mode() != EntryMode::FILE {
                continue;
            }
            let name = entry.name().rsplit('/').next().unwrap_or("");
            if !name.ends_with(DOCUMENT_SUFFIX) {
                continue;
            }
            let stat = self.op.stat(&format!("{}{}", self.dir, name)).await?;
            metas.push(RecordMeta {
                name: name.to_string(),
                modified_at: modified_at(&stat),
            });
        }

        Ok(metas)
    }

    pub async fn delete(&self, name: &str) -> TicketResult<()> {
        let path = self.document_path(name)?;
        if !self.op.exists(&path).await? {
            return Err(TicketError::NotFound(document_file_name(name)));
        }
        self.op.delete(&path).await?;
        info!(path = %path, "ticket deleted");
        Ok(())
    }

    fn document_path(&self, name: &str) -> TicketResult<String> {
        let stem = name.strip_suffix(DOCUMENT_SUFFIX).unwrap_or(name);
        if stem.is_empty() || stem.contains('/') || stem.contains('\\') {
            return Err(TicketError::InvalidName(name.to_string()));
        }
        Ok(format!("{}{}{}", self.dir, stem, DOCUMENT_SUFFIX))
    }
}

/// Pretty printed, keys sorted. Identical records always produce identical bytes.
pub fn serialize_record(value: &Record) -> TicketResult<Vec<u8>> {
    serde_json::to_vec_pretty(value).map_err(TicketError::Serialize)
}

pub fn parse_record(name: &str, bytes: &[u8]) -> TicketResult<Record> {
    serde_json::from_slice(bytes).map_err(|source| TicketError::Parse {
        name: name.to_string(),
        source,
    })
}

pub fn document_file_name(name: &str) -> String {
    if name.ends_with(DOCUMENT_SUFFIX) {
        name.to_string()
    } else {
        format!("{}{}", name, DOCUMENT_SUFFIX)
    }
}

// Backends without modification times sort as the oldest entries.
fn modified_at(meta: &Metadata) -> DateTime<Utc> {
    meta.last_modified()
        .and_then(|ts| ts.to_string().parse::<DateTime<Utc>>().ok())
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialization_is_stable_regardless_of_insert_order() -> TicketResult<()> {
        let mut a = Record::new();
        a.insert("rowName".to_string(), "10".to_string());
        a.insert("eventName".to_string(), "Finals".to_string());
        let mut b = Record::new();
        b.insert("eventName".to_string(), "Finals".to_string());
        b.insert("rowName".to_string(), "10".to_string());
        assert_eq!(serialize_record(&a)?, serialize_record(&b)?);
        Ok(())
    }

    #[test]
    fn parse_rejects_non_string_values() {
        let err = parse_record("bad.json", br#"{"rowName": 10}"#);
        assert!(matches!(err, Err(TicketError::Parse { .. })));
    }

    #[test]
    fn document_names_are_normalized() {
        let store = RecordStore::new(
            Operator::new(opendal::services::Memory::default())
                .expect("memory operator")
                .finish(),
            "/tickets/",
        );
        assert_eq!(store.dir(), "tickets/");
        assert_eq!(store.document_path("a").ok(), Some("tickets/a.json".to_string()));
        assert_eq!(
            store.document_path("a.json").ok(),
            Some("tickets/a.json".to_string())
        );
        assert!(store.document_path("../a").is_err());
        assert!(store.document_path(".json").is_err());
    }
}
