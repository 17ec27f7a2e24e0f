use crate::config::TicketConfig;
use crate::error::{TicketError, TicketResult};
use crate::navigation::{Navigator, PreviewMode, Route};
use crate::record::{document_file_name, parse_record, Record, RecordMeta, RecordStore};
use crate::schema::{EVENT_NAME, ROW_NAME, SEAT_NAMES, SECTION_NAME};
use chrono::{DateTime, Local, Utc};
use futures::{stream, StreamExt, TryStreamExt};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListedTicket {
    pub meta: RecordMeta,
    pub ticket: Record,
}

impl ListedTicket {
    pub fn name(&self) -> &str {
        &self.meta.name
    }

    pub fn modified_at(&self) -> DateTime<Utc> {
        self.meta.modified_at
    }

    /// `Sec 103 / Row 10 / Seats 1,2,3`, with `-` for blank parts.
    pub fn title(&self) -> String {
        format!(
            "Sec {} / Row {} / Seats {}",
            self.field_or_dash(SECTION_NAME),
            self.field_or_dash(ROW_NAME),
            self.field_or_dash(SEAT_NAMES)
        )
    }

    pub fn subtitle(&self) -> &str {
        self.ticket.get(EVENT_NAME).map(String::as_str).unwrap_or("")
    }

    /// Local wall-clock time of the last edit, e.g. `7:05 PM`.
    pub fn edited_time(&self) -> String {
        self.meta
            .modified_at
            .with_timezone(&Local)
            .format("%-I:%M %p")
            .to_string()
    }

    fn field_or_dash(&self, key: &str) -> &str {
        match self.ticket.get(key) {
            Some(value) if !value.is_empty() => value,
            _ => "-",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedDocument {
    pub name: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefreshReport {
    pub loaded: usize,
    pub skipped: Vec<SkippedDocument>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmAction {
    Cancel,
    Delete,
}

impl ConfirmAction {
    pub fn label(&self) -> &'static str {
        match self {
            ConfirmAction::Cancel => "Cancel",
            ConfirmAction::Delete => "Delete",
        }
    }

    pub fn is_destructive(&self) -> bool {
        matches!(self, ConfirmAction::Delete)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmPrompt {
    pub title: String,
    pub message: String,
    pub actions: Vec<ConfirmAction>,
}

/// Asks the user to pick exactly one of the prompt's actions.
pub trait Confirmer {
    fn confirm(&self, prompt: &ConfirmPrompt) -> ConfirmAction;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    Cancelled,
}

enum Loaded {
    Ticket(ListedTicket),
    Skipped(SkippedDocument),
}

/// Saved tickets, most recently edited first.
pub struct TicketList {
    store: RecordStore,
    read_concurrency: usize,
    tickets: Vec<ListedTicket>,
    skipped: Vec<SkippedDocument>,
}

impl TicketList {
    pub fn new(store: RecordStore, read_concurrency: usize) -> Self {
        Self {
            store,
            read_concurrency: read_concurrency.max(1),
            tickets: Vec::new(),
            skipped: Vec::new(),
        }
    }

    pub fn from_config(store: RecordStore, config: &TicketConfig) -> Self {
        Self::new(store, config.read_concurrency)
    }

    pub fn tickets(&self) -> &[ListedTicket] {
        &self.tickets
    }

    /// Documents left out of the last successful refresh.
    pub fn skipped(&self) -> &[SkippedDocument] {
        &self.skipped
    }

    pub fn is_empty(&self) -> bool {
        self.tickets.is_empty()
    }

    /// Reloads every document. Call whenever the list screen becomes active.
    ///
    /// Reads run concurrently, at most `read_concurrency` at a time. The visible
    /// list is replaced only once every read has finished; a storage failure
    /// leaves it untouched. Documents that fail to parse, carry an unusable
    /// name, or vanish between listing and reading, are skipped and reported.
    pub async fn refresh(&mut self) -> TicketResult<RefreshReport> {
        let metas = self.store.list().await?;
        let store = &self.store;

        let loaded: Vec<Loaded> = stream::iter(metas)
            .map(|meta| async move {
                let bytes = match store.get(&meta.name).await {
                    Ok(bytes) => bytes,
                    Err(TicketError::NotFound(name)) => {
                        return Ok(Loaded::Skipped(SkippedDocument {
                            name,
                            reason: "removed while loading".to_string(),
                        }))
                    }
                    Err(err @ TicketError::InvalidName(_)) => {
                        return Ok(Loaded::Skipped(SkippedDocument {
                            name: meta.name,
                            reason: err.to_string(),
                        }))
                    }
                    Err(err) => return Err(err),
                };
                Ok::<_, TicketError>(match parse_record(&meta.name, &bytes) {
                    Ok(ticket) => Loaded::Ticket(ListedTicket { meta, ticket }),
                    Err(err) => Loaded::Skipped(SkippedDocument {
                        name: meta.name,
                        reason: err.to_string(),
                    }),
                })
            })
            .buffer_unordered(self.read_concurrency)
            .try_collect()
            .await?;

        let mut tickets = Vec::new();
        let mut skipped = Vec::new();
        for item in loaded {
            match item {
                Loaded::Ticket(ticket) => tickets.push(ticket),
                Loaded::Skipped(doc) => {
                    warn!(name = %doc.name, reason = %doc.reason, "skipping unreadable ticket");
                    skipped.push(doc);
                }
            }
        }
        tickets.sort_by(|a, b| {
            b.meta
                .modified_at
                .cmp(&a.meta.modified_at)
                .then_with(|| a.meta.name.cmp(&b.meta.name))
        });

        let report = RefreshReport {
            loaded: tickets.len(),
            skipped: skipped.clone(),
        };
        self.tickets = tickets;
        self.skipped = skipped;
        info!(
            loaded = report.loaded,
            skipped = report.skipped.len(),
            "ticket list refreshed"
        );
        Ok(report)
    }

    pub fn delete_prompt(name: &str) -> ConfirmPrompt {
        ConfirmPrompt {
            title: "Confirm Delete".to_string(),
            message: format!("Are you sure you want to delete {}?", name),
            actions: vec![ConfirmAction::Cancel, ConfirmAction::Delete],
        }
    }

    /// Deletes `name` after confirmation, then refreshes. Once the delete
    /// succeeds the outcome is `Deleted` even if the refresh fails; the entry is
    /// then dropped from the visible list directly.
    pub async fn request_delete<C: Confirmer>(
        &mut self,
        name: &str,
        confirmer: &C,
    ) -> TicketResult<DeleteOutcome> {
        match confirmer.confirm(&Self::delete_prompt(name)) {
            ConfirmAction::Cancel => {
                debug!(name = %name, "ticket delete cancelled");
                Ok(DeleteOutcome::Cancelled)
            }
            ConfirmAction::Delete => {
                self.store.delete(name).await?;
                let refreshed = self.refresh().await;
                self.settle_delete(name, refreshed);
                Ok(DeleteOutcome::Deleted)
            }
        }
    }

    pub async fn request_edit<N: Navigator>(&self, name: &str, navigator: &N) -> TicketResult<Route> {
        let ticket_payload = self.load_payload(name).await?;
        let route = Route::Form {
            ticket_payload,
            edit_mode: true,
        };
        navigator.navigate(route.clone());
        Ok(route)
    }

    pub async fn request_preview<N: Navigator>(
        &self,
        name: &str,
        mode: PreviewMode,
        navigator: &N,
    ) -> TicketResult<Route> {
        let ticket_payload = self.load_payload(name).await?;
        let route = Route::Preview {
            ticket_payload,
            mode,
        };
        navigator.navigate(route.clone());
        Ok(route)
    }

    fn settle_delete(&mut self, name: &str, refreshed: TicketResult<RefreshReport>) {
        if let Err(err) = refreshed {
            warn!(name = %name, error = %err, "ticket deleted but list refresh failed");
            let file_name = document_file_name(name);
            self.tickets.retain(|ticket| ticket.meta.name != file_name);
        }
    }

    async fn load_payload(&self, name: &str) -> TicketResult<String> {
        let bytes = self.store.get(name).await?;
        parse_record(name, &bytes)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use opendal::{services::Memory, Operator};

    fn listed(name: &str, secs: i64) -> ListedTicket {
        ListedTicket {
            meta: RecordMeta {
                name: name.to_string(),
                modified_at: Utc.timestamp_opt(secs, 0).single().unwrap_or_default(),
            },
            ticket: Record::new(),
        }
    }

    #[test]
    fn failed_refresh_after_delete_drops_the_entry() {
        let op = Operator::new(Memory::default())
            .expect("memory operator")
            .finish();
        let mut list = TicketList::new(RecordStore::new(op, "tickets"), 1);
        list.tickets = vec![listed("gone.json", 2), listed("kept.json", 1)];

        list.settle_delete(
            "gone",
            Err(TicketError::Other(anyhow::anyhow!("storage offline"))),
        );

        let names: Vec<&str> = list.tickets().iter().map(|t| t.name()).collect();
        assert_eq!(names, vec!["kept.json"]);
    }

    #[test]
    fn successful_refresh_after_delete_keeps_reloaded_state() {
        let op = Operator::new(Memory::default())
            .expect("memory operator")
            .finish();
        let mut list = TicketList::new(RecordStore::new(op, "tickets"), 1);
        list.tickets = vec![listed("kept.json", 1)];

        list.settle_delete("gone.json", Ok(RefreshReport::default()));

        assert_eq!(list.tickets().len(), 1);
    }
}
