use anyhow::{anyhow, Context, Result};
use opendal::services::{Fs, Memory};
use opendal::Operator;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Mutex, OnceLock};
use url::Url;

static MEMORY_OPERATORS: OnceLock<Mutex<HashMap<String, Operator>>> = OnceLock::new();

fn memory_cache() -> &'static Mutex<HashMap<String, Operator>> {
    MEMORY_OPERATORS.get_or_init(|| Mutex::new(HashMap::new()))
}

/// Creates an OpenDAL Operator from a storage URI.
///
/// Supported schemes:
/// - file:///path/to/documents -> local filesystem rooted at that directory
/// - memory://name -> in-memory store, shared by every caller using the same URI
pub fn operator_from_uri(uri: &str) -> Result<Operator> {
    if uri.starts_with("memory://") {
        let mut cache = memory_cache()
            .lock()
            .map_err(|_| anyhow!("memory operator cache lock poisoned"))?;
        if let Some(op) = cache.get(uri) {
            return Ok(op.clone());
        }
        let op = Operator::new(Memory::default())?.finish();
        cache.insert(uri.to_string(), op.clone());
        return Ok(op);
    }

    let url = Url::parse(uri).map_err(|e| anyhow!("Invalid storage URI: {}", e))?;
    match url.scheme() {
        "file" => {
            let root = url
                .to_file_path()
                .map_err(|_| anyhow!("Storage URI is not an absolute file path: {}", uri))?;
            operator_for_dir(&root)
        }
        other => Err(anyhow!("Unsupported storage scheme: {}", other)),
    }
}

/// Local filesystem operator rooted at `root`.
pub fn operator_for_dir(root: &Path) -> Result<Operator> {
    let root = root
        .to_str()
        .with_context(|| format!("Storage root is not valid UTF-8: {}", root.display()))?;
    let op = Operator::new(Fs::default().root(root))?.finish();
    Ok(op)
}
