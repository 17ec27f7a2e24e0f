use anyhow::Result;
use opendal::services::Memory;
use opendal::Operator;
use std::sync::Arc;
use ticketmaker_core::config::FieldDefaults;
use ticketmaker_core::{RecordStore, SchemaRegistry};

#[allow(dead_code)]
pub fn setup_operator() -> Result<Operator> {
    let builder = Memory::default();
    let op = Operator::new(builder)?.finish();
    Ok(op)
}

#[allow(dead_code)]
pub fn setup_store() -> Result<RecordStore> {
    Ok(RecordStore::new(setup_operator()?, "tickets"))
}

/// Filesystem-backed store for tests that depend on modification times.
#[allow(dead_code)]
pub fn setup_fs_store(dir: &tempfile::TempDir) -> Result<RecordStore> {
    let op = ticketmaker_core::storage::operator_for_dir(dir.path())?;
    Ok(RecordStore::new(op, "tickets"))
}

#[allow(dead_code)]
pub fn fixed_registry() -> Arc<SchemaRegistry> {
    let defaults = FieldDefaults {
        date_of_event: Some("Feb 3, 2025".to_string()),
        ..FieldDefaults::default()
    };
    Arc::new(SchemaRegistry::new(&defaults))
}

#[allow(dead_code)]
pub fn ticket(pairs: &[(&str, &str)]) -> ticketmaker_core::Record {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
