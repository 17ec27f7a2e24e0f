use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const FORM_SCREEN: &str = "ticket-maker/form";
pub const PREVIEW_SCREEN: &str = "ticket-maker/preview";

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum PreviewMode {
    /// Checking a ticket while editing; the back gesture starts enabled.
    #[default]
    Preview,
    /// Showing a ticket at the gate; the back gesture starts locked.
    InGame,
}

/// Parameters a screen receives on entry. Every value is an opaque string, the
/// ticket itself travels as serialized JSON in `ticket_payload`.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ScreenParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticket_payload: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticket_source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<PreviewMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edit_mode: Option<String>,
}

impl ScreenParams {
    pub fn from_json(value: Value) -> serde_json::Result<Self> {
        serde_json::from_value(value)
    }

    pub fn is_edit(&self) -> bool {
        self.edit_mode.as_deref() == Some("true")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Form {
        ticket_payload: String,
        edit_mode: bool,
    },
    Preview {
        ticket_payload: String,
        mode: PreviewMode,
    },
    Back,
}

impl Route {
    pub fn target_screen(&self) -> Option<&'static str> {
        match self {
            Route::Form { .. } => Some(FORM_SCREEN),
            Route::Preview { .. } => Some(PREVIEW_SCREEN),
            Route::Back => None,
        }
    }

    pub fn params(&self) -> ScreenParams {
        match self {
            Route::Form {
                ticket_payload,
                edit_mode,
            } => ScreenParams {
                ticket_payload: Some(ticket_payload.clone()),
                edit_mode: edit_mode.then(|| "true".to_string()),
                ..ScreenParams::default()
            },
            Route::Preview {
                ticket_payload,
                mode,
            } => ScreenParams {
                ticket_payload: Some(ticket_payload.clone()),
                mode: Some(*mode),
                ..ScreenParams::default()
            },
            Route::Back => ScreenParams::default(),
        }
    }

    pub fn params_json(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self.params())
    }
}

/// Host-side screen stack.
pub trait Navigator {
    fn navigate(&self, route: Route);
}
