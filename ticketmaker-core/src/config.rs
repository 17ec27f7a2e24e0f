use anyhow::{Context, Result};
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const ENV_STORAGE_URI: &str = "TICKETMAKER_STORAGE_URI";
pub const ENV_TICKETS_DIR: &str = "TICKETMAKER_TICKETS_DIR";

pub const DEFAULT_TICKETS_DIR: &str = "tickets";
pub const DEFAULT_READ_CONCURRENCY: usize = 8;
pub const DEFAULT_HOLD_TO_UNLOCK_MS: u64 = 3000;

/// Top-level configuration for the ticket maker.
///
/// Every section falls back to its `Default`, so a YAML file only needs to
/// carry the keys it overrides.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct TicketConfig {
    /// `file:///absolute/dir` or `memory://<name>`.
    pub storage_uri: String,
    /// Directory under the storage root holding one JSON document per ticket.
    pub tickets_dir: String,
    /// Upper bound on concurrent document reads while refreshing the list.
    pub read_concurrency: usize,
    pub defaults: FieldDefaults,
    pub preview: PreviewConfig,
}

impl Default for TicketConfig {
    fn default() -> Self {
        Self {
            storage_uri: "memory://ticketmaker".to_string(),
            tickets_dir: DEFAULT_TICKETS_DIR.to_string(),
            read_concurrency: DEFAULT_READ_CONCURRENCY,
            defaults: FieldDefaults::default(),
            preview: PreviewConfig::default(),
        }
    }
}

/// Values a brand new ticket form starts with.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct FieldDefaults {
    pub location_field_name: String,
    pub event_name: String,
    pub section_name: String,
    pub row_name: String,
    pub seat_names: String,
    /// `None` means "today", rendered like `Feb 3, 2025`.
    pub date_of_event: Option<String>,
    pub time_of_event: String,
    pub ticket_type_name: String,
}

impl Default for FieldDefaults {
    fn default() -> Self {
        Self {
            location_field_name: "Chase Center".to_string(),
            event_name: "Golden State Warriors vs. Orlando Magic".to_string(),
            section_name: "103".to_string(),
            row_name: "10".to_string(),
            seat_names: "1,2,3".to_string(),
            date_of_event: None,
            time_of_event: "7:00 PM".to_string(),
            ticket_type_name: "TICKET TYPE".to_string(),
        }
    }
}

impl FieldDefaults {
    pub fn date_of_event(&self) -> String {
        match &self.date_of_event {
            Some(date) => date.clone(),
            None => today_label(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct PreviewConfig {
    pub hold_to_unlock_ms: u64,
    /// Width of one seat page plus its trailing padding, in scroll units.
    pub page_width: f64,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            hold_to_unlock_ms: DEFAULT_HOLD_TO_UNLOCK_MS,
            page_width: 363.0,
        }
    }
}

impl TicketConfig {
    pub fn from_yaml_str(raw: &str) -> Result<Self> {
        let config: TicketConfig =
            serde_yaml::from_str(raw).context("Failed to parse ticket maker config")?;
        config.validated()
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::from_yaml_str(&raw)
    }

    /// Applies `TICKETMAKER_*` environment variables on top of the loaded values.
    pub fn apply_env_overrides(mut self) -> Self {
        if let Ok(uri) = std::env::var(ENV_STORAGE_URI) {
            if !uri.trim().is_empty() {
                self.storage_uri = uri;
            }
        }
        if let Ok(dir) = std::env::var(ENV_TICKETS_DIR) {
            if !dir.trim().is_empty() {
                self.tickets_dir = dir;
            }
        }
        self
    }

    fn validated(self) -> Result<Self> {
        if self.read_concurrency == 0 {
            anyhow::bail!("read_concurrency must be at least 1");
        }
        if self.preview.page_width <= 0.0 {
            anyhow::bail!("preview.page_width must be positive");
        }
        if self.tickets_dir.trim_matches('/').is_empty() {
            anyhow::bail!("tickets_dir must not be empty");
        }
        Ok(self)
    }
}

pub fn today_label() -> String {
    Local::now().format("%b %-d, %Y").to_string()
}
