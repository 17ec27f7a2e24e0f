#![warn(warnings)]
#![deny(clippy::all)]

use serde_json::Value;
use std::sync::Arc;

pub mod config;
pub mod error;
pub mod form;
pub mod logging;
pub mod navigation;
pub mod preview;
pub mod record;
pub mod schema;
pub mod storage;
pub mod ticket_list;

pub use config::TicketConfig;
pub use error::{TicketError, TicketResult};
pub use form::{FocusChain, FormController, FormState, SaveOutcome};
pub use navigation::{Navigator, PreviewMode, Route, ScreenParams};
pub use preview::{GestureGate, GestureNotice, GestureState, SeatPage, TicketPreview};
pub use record::{PutOutcome, Record, RecordMeta, RecordStore};
pub use schema::{FieldSpec, SchemaRegistry};
pub use ticket_list::{
    ConfirmAction, ConfirmPrompt, Confirmer, DeleteOutcome, ListedTicket, RefreshReport,
    TicketList,
};

// --- Helpers ---

fn params_from_json(params: Option<Value>) -> TicketResult<ScreenParams> {
    match params {
        None | Some(Value::Null) => Ok(ScreenParams::default()),
        Some(value) => ScreenParams::from_json(value).map_err(|source| TicketError::Parse {
            name: "screen params".to_string(),
            source,
        }),
    }
}

// --- Screens ---

/// Shared wiring for the ticket maker screens: configuration, field schema and
/// the ticket directory.
#[derive(Clone)]
pub struct TicketMaker {
    config: TicketConfig,
    registry: Arc<SchemaRegistry>,
    store: RecordStore,
}

impl TicketMaker {
    pub fn new(config: TicketConfig) -> TicketResult<Self> {
        let store = RecordStore::from_config(&config)?;
        Ok(Self::with_store(config, store))
    }

    pub fn with_store(config: TicketConfig, store: RecordStore) -> Self {
        let registry = Arc::new(SchemaRegistry::new(&config.defaults));
        Self {
            config,
            registry,
            store,
        }
    }

    pub fn config(&self) -> &TicketConfig {
        &self.config
    }

    pub fn registry(&self) -> Arc<SchemaRegistry> {
        Arc::clone(&self.registry)
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    /// Form screen entry: `params` is the host's JSON (`ticketPayload`,
    /// `ticketSource`, `editMode`), or `None` for a new ticket.
    pub fn open_form(&self, params: Option<Value>) -> TicketResult<FormController> {
        let params = params_from_json(params)?;
        FormController::from_params(self.registry(), &params)
    }

    /// List screen entry. The caller refreshes it on every activation.
    pub fn open_list(&self) -> TicketList {
        TicketList::from_config(self.store.clone(), &self.config)
    }

    /// Preview screen entry: payload defaults to `{}` and mode to `preview`.
    pub fn open_preview(
        &self,
        params: Option<Value>,
    ) -> TicketResult<(TicketPreview, tokio::sync::mpsc::UnboundedReceiver<GestureNotice>)> {
        let params = params_from_json(params)?;
        TicketPreview::from_params(&params, &self.config)
    }
}
