mod common;
use common::{fixed_registry, setup_store, ticket};
use ticketmaker_core::navigation::{PreviewMode, Route, ScreenParams};
use ticketmaker_core::schema::{FieldSpec, SchemaRegistry, TICKETMASTER};
use ticketmaker_core::{FormController, PutOutcome, TicketError};

#[test]
fn test_form_new_is_seeded_with_defaults() {
    let form = FormController::new(fixed_registry());

    assert_eq!(form.source(), TICKETMASTER);
    assert_eq!(form.value("ticketSource"), TICKETMASTER);
    assert_eq!(form.value("sectionName"), "103");
    assert_eq!(form.value("fileName"), "Feb 3, 2025__103-10-Seat1_2_3");
    assert_eq!(form.value("ticketTypeName"), "TICKET TYPE");
    assert_eq!(form.validate(), vec!["entryInfo".to_string()]);
}

#[test]
fn test_form_file_name_follows_trigger_fields() {
    let mut form = FormController::new(fixed_registry());

    form.set_field("fileName", "my custom name");
    form.set_field("seatNames", "4,5");
    assert_eq!(form.value("fileName"), "Feb 3, 2025__103-10-Seat4_5");

    form.set_field("fileName", "manual again");
    form.set_field("rowName", "22");
    assert_eq!(form.value("fileName"), "Feb 3, 2025__103-22-Seat4_5");

    form.set_field("sectionName", "201");
    assert_eq!(form.value("fileName"), "Feb 3, 2025__201-22-Seat4_5");
}

#[test]
fn test_form_file_name_matches_documented_example() {
    let mut form = FormController::new(fixed_registry());
    form.set_field("dateOfEvent", "Feb 3, 2025");
    form.set_field("sectionName", "103");
    form.set_field("rowName", "10");
    form.set_field("seatNames", "1,2,3");

    assert_eq!(form.value("fileName"), "Feb 3, 2025__103-10-Seat1_2_3");
}

#[test]
fn test_form_non_trigger_edits_keep_file_name() {
    let mut form = FormController::new(fixed_registry());
    form.set_field("fileName", "kept");
    form.set_field("dateOfEvent", "Mar 9, 2025");
    form.set_field("eventName", "Playoffs");

    assert_eq!(form.value("fileName"), "kept");
}

#[test]
fn test_form_blank_trigger_field_skips_rederive() {
    let mut form = FormController::new(fixed_registry());
    form.set_field("fileName", "manual");
    form.set_field("rowName", "");

    assert_eq!(form.value("fileName"), "manual");
    assert!(!form.is_field_valid("rowName"));
}

#[test]
fn test_form_validation_trims_whitespace() {
    let mut form = FormController::new(fixed_registry());
    form.set_field("entryInfo", "   ");
    form.set_field("eventName", "\t");

    assert_eq!(
        form.validate(),
        vec!["eventName".to_string(), "entryInfo".to_string()]
    );
    assert!(form.is_field_valid("ticketTypeValue"));
}

#[test]
fn test_form_prior_record_overrides_defaults() {
    let prior = ticket(&[
        ("sectionName", "300"),
        ("fileName", "saved-name"),
        ("ticketSource", TICKETMASTER),
        ("legacyField", "kept"),
    ]);
    let form = FormController::initialize(fixed_registry(), Some(&prior), None);

    assert_eq!(form.value("sectionName"), "300");
    assert_eq!(form.value("fileName"), "saved-name");
    assert_eq!(form.value("rowName"), "10");
    assert_eq!(form.value("legacyField"), "kept");
}

#[test]
fn test_form_source_switch_keeps_existing_values() {
    let registry = SchemaRegistry::new(&ticketmaker_core::config::FieldDefaults {
        date_of_event: Some("Feb 3, 2025".to_string()),
        ..Default::default()
    })
    .with_source(
        "AXS",
        vec![
            FieldSpec::new("Gate", "gate").required().default_value("A"),
            FieldSpec::new("Entry Info", "entryInfo"),
        ],
    );
    let mut form = FormController::new(std::sync::Arc::new(registry));
    form.set_field("entryInfo", "Gate 5");
    form.set_field("ticketTypeValue", "VIP");

    form.set_field("ticketSource", "AXS");

    assert_eq!(form.source(), "AXS");
    assert_eq!(form.value("ticketSource"), "AXS");
    assert_eq!(form.value("gate"), "A");
    assert_eq!(form.value("entryInfo"), "Gate 5");
    assert_eq!(form.value("ticketTypeValue"), "VIP");
    assert!(form.validate().is_empty());

    let keys = form.focus_order();
    assert_eq!(keys.last().map(String::as_str), Some("entryInfo"));
    assert!(!keys.contains(&"ticketTypeValue".to_string()));
}

#[test]
fn test_form_source_hint_is_applied_last() {
    let prior = ticket(&[("ticketSource", TICKETMASTER)]);
    let form = FormController::initialize(fixed_registry(), Some(&prior), Some("Unknown"));

    assert_eq!(form.source(), "Unknown");
    assert_eq!(form.active_fields().len(), 8);
}

#[test]
fn test_form_from_params_rejects_bad_payload() {
    let params = ScreenParams {
        ticket_payload: Some("not json".to_string()),
        ..ScreenParams::default()
    };
    let result = FormController::from_params(fixed_registry(), &params);
    assert!(matches!(result, Err(TicketError::Parse { .. })));
}

#[tokio::test]
async fn test_form_save_rejects_missing_fields() -> anyhow::Result<()> {
    let store = setup_store()?;
    let mut form = FormController::new(fixed_registry());
    form.set_field("eventName", " ");

    let err = form.request_save(&store).await.unwrap_err();
    match err {
        TicketError::Validation { labels } => {
            assert_eq!(labels, vec!["Event Name".to_string(), "Entry Info".to_string()]);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(store.list().await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_form_save_round_trips_form_state() -> anyhow::Result<()> {
    let store = setup_store()?;
    let mut form = FormController::new(fixed_registry());
    form.set_field("entryInfo", "Gate A");
    form.set_field("seatNames", "7,8");

    let outcome = form.request_save(&store).await?;
    assert_eq!(outcome.name, "Feb_3,_2025__103-10-Seat7_8");
    assert_eq!(outcome.status, PutOutcome::Written);
    assert_eq!(
        outcome.notice().1,
        "Ticket saved as Feb_3,_2025__103-10-Seat7_8.json"
    );

    let saved = store.read_record(&outcome.name).await?;
    assert_eq!(&saved, form.values());
    Ok(())
}

#[tokio::test]
async fn test_form_second_save_reports_no_changes() -> anyhow::Result<()> {
    let store = setup_store()?;
    let mut form = FormController::new(fixed_registry());
    form.set_field("entryInfo", "Gate A");

    form.request_save(&store).await?;
    let again = form.request_save(&store).await?;

    assert_eq!(again.status, PutOutcome::Unchanged);
    assert_eq!(again.notice().0, "No Changes");
    Ok(())
}

#[tokio::test]
async fn test_form_edit_existing_ticket_overwrites_it() -> anyhow::Result<()> {
    let store = setup_store()?;
    let mut form = FormController::new(fixed_registry());
    form.set_field("entryInfo", "Gate A");
    let first = form.request_save(&store).await?;

    let saved = store.read_record(&first.name).await?;
    let mut edit = FormController::initialize(fixed_registry(), Some(&saved), None);
    edit.set_field("entryInfo", "Gate B");
    let second = edit.request_save(&store).await?;

    assert_eq!(second.name, first.name);
    assert_eq!(second.status, PutOutcome::Written);
    assert_eq!(store.list().await?.len(), 1);
    assert_eq!(
        store.read_record(&first.name).await?.get("entryInfo"),
        Some(&"Gate B".to_string())
    );
    Ok(())
}

#[test]
fn test_form_preview_route_carries_current_values() -> anyhow::Result<()> {
    let mut form = FormController::new(fixed_registry());
    form.set_field("seatNames", "9");

    let route = form.preview_route()?;
    let Route::Preview {
        ticket_payload,
        mode,
    } = route
    else {
        panic!("expected a preview route");
    };
    assert_eq!(mode, PreviewMode::Preview);
    let parsed: ticketmaker_core::Record = serde_json::from_str(&ticket_payload)?;
    assert_eq!(&parsed, form.values());
    Ok(())
}
