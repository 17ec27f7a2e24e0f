use crate::error::{TicketError, TicketResult};
use crate::navigation::{PreviewMode, Route, ScreenParams};
use crate::record::{parse_record, PutOutcome, Record, RecordStore};
use crate::schema::{
    derive_file_name, FieldSpec, SchemaRegistry, DATE_OF_EVENT, FILE_NAME, FILE_NAME_TRIGGERS,
    ROW_NAME, SEAT_NAMES, SECTION_NAME, TICKET_SOURCE,
};
use regex::Regex;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};
use tracing::{debug, info, warn};

/// In-memory values of the ticket being edited.
///
/// Values of fields that belong to a source other than the selected one are
/// kept, so switching sources back and forth never loses input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormState {
    values: Record,
    source: String,
}

impl FormState {
    pub fn values(&self) -> &Record {
        &self.values
    }

    pub fn source(&self) -> &str {
        &self.source
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveOutcome {
    /// Document name without the `.json` suffix.
    pub name: String,
    pub status: PutOutcome,
}

impl SaveOutcome {
    /// Title and message to show the user.
    pub fn notice(&self) -> (String, String) {
        match self.status {
            PutOutcome::Written => (
                "Saved!".to_string(),
                format!("Ticket saved as {}.json", self.name),
            ),
            PutOutcome::Unchanged => (
                "No Changes".to_string(),
                "There are no differences from the existing saved ticket.".to_string(),
            ),
        }
    }
}

pub struct FormController {
    registry: Arc<SchemaRegistry>,
    state: FormState,
}

impl FormController {
    /// A blank form seeded with the registry defaults.
    pub fn new(registry: Arc<SchemaRegistry>) -> Self {
        Self::initialize(registry, None, None)
    }

    /// Seeds defaults, overlays a previously saved ticket, then applies the
    /// source hint.
    pub fn initialize(
        registry: Arc<SchemaRegistry>,
        prior: Option<&Record>,
        source_hint: Option<&str>,
    ) -> Self {
        let mut values = registry.defaults();
        let source = prior
            .and_then(|record| record.get(TICKET_SOURCE))
            .filter(|s| !s.is_empty())
            .cloned()
            .unwrap_or_else(|| registry.default_source().to_string());
        values.insert(TICKET_SOURCE.to_string(), source.clone());
        if let Some(prior) = prior {
            values.extend(prior.iter().map(|(k, v)| (k.clone(), v.clone())));
        }

        let mut controller = Self {
            registry,
            state: FormState { values, source },
        };
        if let Some(hint) = source_hint.filter(|s| !s.is_empty()) {
            controller.set_source(hint);
        }
        debug!(source = %controller.state.source, "ticket form initialized");
        controller
    }

    pub fn from_params(registry: Arc<SchemaRegistry>, params: &ScreenParams) -> TicketResult<Self> {
        let prior = match params.ticket_payload.as_deref() {
            Some(payload) if !payload.trim().is_empty() => {
                Some(parse_record("ticketPayload", payload.as_bytes())?)
            }
            _ => None,
        };
        Ok(Self::initialize(
            registry,
            prior.as_ref(),
            params.ticket_source.as_deref(),
        ))
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn values(&self) -> &Record {
        &self.state.values
    }

    pub fn source(&self) -> &str {
        &self.state.source
    }

    pub fn value(&self, key: &str) -> &str {
        self.state.values.get(key).map(String::as_str).unwrap_or("")
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    /// Fields rendered for the selected source, in display order.
    pub fn active_fields(&self) -> Vec<FieldSpec> {
        self.registry.resolve(&self.state.source)
    }

    pub fn set_field(&mut self, key: &str, value: &str) {
        if key == TICKET_SOURCE {
            self.set_source(value);
            return;
        }

        self.state.values.insert(key.to_string(), value.to_string());
        if FILE_NAME_TRIGGERS.contains(&key) {
            self.rederive_file_name();
        }
    }

    pub fn set_source(&mut self, source_id: &str) {
        self.state.source = source_id.to_string();
        self.state
            .values
            .insert(TICKET_SOURCE.to_string(), source_id.to_string());
        for (key, default) in self.registry.source_defaults(source_id) {
            self.state.values.entry(key).or_insert(default);
        }
        debug!(source = %source_id, "ticket source selected");
    }

    // Overwrites any manual fileName edit.
    fn rederive_file_name(&mut self) {
        let section = self.value(SECTION_NAME);
        let row = self.value(ROW_NAME);
        let seats = self.value(SEAT_NAMES);
        if section.is_empty() || row.is_empty() || seats.is_empty() {
            return;
        }
        let file_name = derive_file_name(self.value(DATE_OF_EVENT), section, row, seats);
        self.state.values.insert(FILE_NAME.to_string(), file_name);
    }

    pub fn is_field_valid(&self, key: &str) -> bool {
        match self.active_fields().iter().find(|f| f.key == key) {
            Some(field) if field.required => !self.value(key).trim().is_empty(),
            _ => true,
        }
    }

    /// Keys of required fields that are blank, in display order.
    pub fn validate(&self) -> Vec<String> {
        self.missing_fields().into_iter().map(|f| f.key).collect()
    }

    fn missing_fields(&self) -> Vec<FieldSpec> {
        self.active_fields()
            .into_iter()
            .filter(|f| f.required && self.value(&f.key).trim().is_empty())
            .collect()
    }

    /// Validates, then writes the ticket under its sanitized file name.
    pub async fn request_save(&self, store: &RecordStore) -> TicketResult<SaveOutcome> {
        let missing = self.missing_fields();
        if !missing.is_empty() {
            let labels: Vec<String> = missing.into_iter().map(|f| f.label).collect();
            warn!(missing = ?labels, "ticket save rejected");
            return Err(TicketError::Validation { labels });
        }

        let name = sanitize_file_name(self.value(FILE_NAME));
        let status = store.put(&name, &self.state.values).await?;
        info!(name = %name, status = ?status, "ticket save finished");
        Ok(SaveOutcome { name, status })
    }

    /// Route for previewing the unsaved values.
    pub fn preview_route(&self) -> TicketResult<Route> {
        let ticket_payload =
            serde_json::to_string_pretty(&self.state.values).map_err(TicketError::Serialize)?;
        Ok(Route::Preview {
            ticket_payload,
            mode: PreviewMode::Preview,
        })
    }

    pub fn focus_order(&self) -> Vec<String> {
        self.active_fields().into_iter().map(|f| f.key).collect()
    }
}

/// Collapses every run of whitespace into a single `_`.
pub fn sanitize_file_name(file_name: &str) -> String {
    whitespace_regex().replace_all(file_name, "_").into_owned()
}

fn whitespace_regex() -> &'static Regex {
    static WHITESPACE_REGEX: OnceLock<Regex> = OnceLock::new();
    WHITESPACE_REGEX.get_or_init(|| Regex::new(r"\s+").expect("whitespace regex must compile"))
}

/// Field key to input handle, walked in display order when an input is submitted.
pub struct FocusChain<H> {
    order: Vec<String>,
    positions: HashMap<String, usize>,
    handles: HashMap<String, H>,
}

impl<H> FocusChain<H> {
    pub fn new(order: Vec<String>) -> Self {
        let positions = order
            .iter()
            .enumerate()
            .map(|(idx, key)| (key.clone(), idx))
            .collect();
        Self {
            order,
            positions,
            handles: HashMap::new(),
        }
    }

    pub fn register(&mut self, key: &str, handle: H) {
        self.handles.insert(key.to_string(), handle);
    }

    pub fn next_key(&self, key: &str) -> Option<&str> {
        let idx = *self.positions.get(key)?;
        self.order.get(idx + 1).map(String::as_str)
    }

    /// Handle of the field after `key`, if one was registered.
    pub fn focus_next(&self, key: &str) -> Option<&H> {
        self.next_key(key).and_then(|next| self.handles.get(next))
    }
}
