use crate::config::TicketConfig;
use crate::error::TicketResult;
use crate::navigation::{PreviewMode, ScreenParams};
use crate::record::{parse_record, Record};
use crate::schema::{
    DATE_OF_EVENT, ENTRY_INFO, EVENT_NAME, LOCATION_FIELD_NAME, ROW_NAME, SEAT_NAMES,
    SECTION_NAME, TICKET_TYPE_NAME, TICKET_TYPE_VALUE, TIME_OF_EVENT,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info};

const FALLBACK_SEAT: &str = "1";

/// Seat labels from a comma separated list. Blank or missing input yields the
/// single seat `1`.
pub fn seat_labels(seat_names: Option<&str>) -> Vec<String> {
    match seat_names {
        Some(raw) if !raw.trim().is_empty() => {
            raw.split(',').map(|seat| seat.trim().to_string()).collect()
        }
        _ => vec![FALLBACK_SEAT.to_string()],
    }
}

/// One swipeable ticket page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeatPage {
    pub seat: String,
    pub venue: String,
    pub event_name: String,
    pub section: String,
    pub row: String,
    pub date: String,
    pub time: String,
    pub entry_info: String,
    /// Label and value, present only when both are filled in.
    pub ticket_type: Option<(String, String)>,
}

pub struct TicketPreview {
    pages: Vec<SeatPage>,
    active_index: usize,
    page_width: f64,
    gesture: GestureGate,
}

impl TicketPreview {
    /// Builds the pages and the gesture gate. The returned receiver yields the
    /// notices the gate raises. A blank event name falls back to the configured
    /// default.
    pub fn new(
        ticket: &Record,
        mode: PreviewMode,
        config: &TicketConfig,
    ) -> (Self, mpsc::UnboundedReceiver<GestureNotice>) {
        let field = |key: &str| ticket.get(key).cloned().unwrap_or_default();
        let event_name = match ticket.get(EVENT_NAME) {
            Some(name) if !name.is_empty() => name.clone(),
            _ => config.defaults.event_name.clone(),
        };
        let ticket_type = match (ticket.get(TICKET_TYPE_NAME), ticket.get(TICKET_TYPE_VALUE)) {
            (Some(name), Some(value)) if !name.is_empty() && !value.is_empty() => {
                Some((name.clone(), value.clone()))
            }
            _ => None,
        };

        let pages = seat_labels(ticket.get(SEAT_NAMES).map(String::as_str))
            .into_iter()
            .map(|seat| SeatPage {
                seat,
                venue: field(LOCATION_FIELD_NAME),
                event_name: event_name.clone(),
                section: field(SECTION_NAME),
                row: field(ROW_NAME),
                date: field(DATE_OF_EVENT),
                time: field(TIME_OF_EVENT),
                entry_info: field(ENTRY_INFO),
                ticket_type: ticket_type.clone(),
            })
            .collect();

        let (gesture, notices) =
            GestureGate::new(mode, Duration::from_millis(config.preview.hold_to_unlock_ms));
        let preview = Self {
            pages,
            active_index: 0,
            page_width: config.preview.page_width,
            gesture,
        };
        (preview, notices)
    }

    /// Entry point for the preview screen: payload defaults to `{}`, mode to
    /// `preview`.
    pub fn from_params(
        params: &ScreenParams,
        config: &TicketConfig,
    ) -> TicketResult<(Self, mpsc::UnboundedReceiver<GestureNotice>)> {
        let payload = params.ticket_payload.as_deref().unwrap_or("{}");
        let ticket = parse_record("ticketPayload", payload.as_bytes())?;
        Ok(Self::new(&ticket, params.mode.unwrap_or_default(), config))
    }

    pub fn pages(&self) -> &[SeatPage] {
        &self.pages
    }

    pub fn active_index(&self) -> usize {
        self.active_index
    }

    pub fn scroll_enabled(&self) -> bool {
        self.pages.len() > 1
    }

    pub fn shows_page_dots(&self) -> bool {
        self.pages.len() > 1
    }

    /// One entry per page, `true` for the active one.
    pub fn page_dots(&self) -> Vec<bool> {
        (0..self.pages.len())
            .map(|idx| idx == self.active_index)
            .collect()
    }

    /// Snaps the horizontal scroll offset to the nearest page.
    pub fn on_scroll(&mut self, offset_x: f64) -> usize {
        let last = self.pages.len().saturating_sub(1);
        let index = (offset_x / self.page_width).round();
        self.active_index = if index.is_nan() || index <= 0.0 {
            0
        } else {
            (index as usize).min(last)
        };
        self.active_index
    }

    pub fn gesture(&self) -> &GestureGate {
        &self.gesture
    }

    pub fn gesture_enabled(&self) -> bool {
        self.gesture.is_unlocked()
    }

    pub fn press_in(&mut self) {
        self.gesture.press_in();
    }

    pub fn press_out(&mut self) {
        self.gesture.press_out();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureState {
    Locked,
    Unlocked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureNotice {
    /// The hold just unlocked the back gesture.
    Enabled,
    /// The gesture was already unlocked.
    AlreadyEnabled,
}

impl GestureNotice {
    pub fn title(&self) -> &'static str {
        match self {
            GestureNotice::Enabled => "Gesture Enabled",
            GestureNotice::AlreadyEnabled => "Gesture Already Enabled",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            GestureNotice::Enabled => "You can now swipe to go back",
            GestureNotice::AlreadyEnabled => "You can swipe to go back",
        }
    }
}

/// Press-and-hold gate for the back-swipe gesture.
///
/// A hold of at least `hold` while locked unlocks the gate for good. Releasing
/// early, pressing again, or dropping the gate cancels the pending timer. A
/// release exactly at the deadline still counts as a full hold.
pub struct GestureGate {
    unlocked: Arc<AtomicBool>,
    hold: Duration,
    pending: Option<PendingHold>,
    notices: mpsc::UnboundedSender<GestureNotice>,
}

struct PendingHold {
    task: JoinHandle<()>,
    started: Instant,
    // Set by whichever of the timer or the release settles the hold first.
    settled: Arc<AtomicBool>,
}

impl GestureGate {
    pub fn new(
        mode: PreviewMode,
        hold: Duration,
    ) -> (Self, mpsc::UnboundedReceiver<GestureNotice>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let gate = Self {
            unlocked: Arc::new(AtomicBool::new(mode == PreviewMode::Preview)),
            hold,
            pending: None,
            notices: tx,
        };
        (gate, rx)
    }

    pub fn state(&self) -> GestureState {
        if self.is_unlocked() {
            GestureState::Unlocked
        } else {
            GestureState::Locked
        }
    }

    pub fn is_unlocked(&self) -> bool {
        self.unlocked.load(Ordering::SeqCst)
    }

    pub fn is_pending(&self) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|hold| !hold.task.is_finished())
    }

    /// Starts the hold timer, replacing any timer already running.
    ///
    /// Must be called within a Tokio runtime.
    pub fn press_in(&mut self) {
        self.cancel_pending();

        let unlocked = Arc::clone(&self.unlocked);
        let notices = self.notices.clone();
        let settled = Arc::new(AtomicBool::new(false));
        let task_settled = Arc::clone(&settled);
        let hold = self.hold;
        let task = tokio::spawn(async move {
            tokio::time::sleep(hold).await;
            if !task_settled.swap(true, Ordering::SeqCst) {
                complete_hold(&unlocked, &notices);
            }
        });
        self.pending = Some(PendingHold {
            task,
            started: Instant::now(),
            settled,
        });
    }

    /// Ends the hold. If the full duration has elapsed but the timer has not
    /// run yet, the hold completes here.
    pub fn press_out(&mut self) {
        if let Some(pending) = self.pending.as_ref() {
            if pending.started.elapsed() >= self.hold
                && !pending.settled.swap(true, Ordering::SeqCst)
            {
                complete_hold(&self.unlocked, &self.notices);
            }
        }
        self.cancel_pending();
    }

    fn cancel_pending(&mut self) {
        if let Some(pending) = self.pending.take() {
            if !pending.settled.swap(true, Ordering::SeqCst) {
                debug!("gesture hold cancelled");
            }
            pending.task.abort();
        }
    }
}

fn complete_hold(unlocked: &AtomicBool, notices: &mpsc::UnboundedSender<GestureNotice>) {
    let notice = if unlocked.swap(true, Ordering::SeqCst) {
        GestureNotice::AlreadyEnabled
    } else {
        info!("back gesture unlocked");
        GestureNotice::Enabled
    };
    // The receiver may already be gone with its screen.
    let _ = notices.send(notice);
}

impl Drop for GestureGate {
    fn drop(&mut self) {
        self.cancel_pending();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seat_labels_trim_each_entry() {
        assert_eq!(seat_labels(Some("1, 2 ,3")), vec!["1", "2", "3"]);
        assert_eq!(seat_labels(Some("A12")), vec!["A12"]);
        assert_eq!(seat_labels(None), vec!["1"]);
        assert_eq!(seat_labels(Some("  ")), vec!["1"]);
    }

    #[test]
    fn notices_carry_user_text() {
        assert_eq!(GestureNotice::Enabled.title(), "Gesture Enabled");
        assert_eq!(
            GestureNotice::AlreadyEnabled.message(),
            "You can swipe to go back"
        );
    }
}
