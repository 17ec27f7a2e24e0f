use crate::config::FieldDefaults;
use std::collections::BTreeMap;

pub const LOCATION_FIELD_NAME: &str = "locationFieldName";
pub const EVENT_NAME: &str = "eventName";
pub const SECTION_NAME: &str = "sectionName";
pub const ROW_NAME: &str = "rowName";
pub const SEAT_NAMES: &str = "seatNames";
pub const DATE_OF_EVENT: &str = "dateOfEvent";
pub const TIME_OF_EVENT: &str = "timeOfEvent";
pub const FILE_NAME: &str = "fileName";
pub const TICKET_SOURCE: &str = "ticketSource";

pub const ENTRY_INFO: &str = "entryInfo";
pub const TICKET_TYPE_NAME: &str = "ticketTypeName";
pub const TICKET_TYPE_VALUE: &str = "ticketTypeValue";

pub const TICKETMASTER: &str = "Ticketmaster";

/// Keys whose edits re-derive `fileName`.
pub const FILE_NAME_TRIGGERS: [&str; 3] = [SECTION_NAME, ROW_NAME, SEAT_NAMES];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub label: String,
    pub key: String,
    pub required: bool,
    pub example: Option<String>,
    pub default: Option<String>,
}

impl FieldSpec {
    pub fn new(label: &str, key: &str) -> Self {
        Self {
            label: label.to_string(),
            key: key.to_string(),
            required: false,
            example: None,
            default: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn example(mut self, example: &str) -> Self {
        self.example = Some(example.to_string());
        self
    }

    pub fn default_value(mut self, value: impl Into<String>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Hint shown in an empty input.
    pub fn placeholder(&self) -> &str {
        self.example.as_deref().unwrap_or(&self.label)
    }
}

/// `<date>__<section>-<row>-Seat<seats with commas as underscores>`
pub fn derive_file_name(date: &str, section: &str, row: &str, seats: &str) -> String {
    format!(
        "{}__{}-{}-Seat{}",
        date,
        section,
        row,
        seats.replace(',', "_")
    )
}

#[derive(Debug, Clone)]
struct SourceFields {
    id: String,
    fields: Vec<FieldSpec>,
}

/// Declares the common ticket fields and the fields specific to each ticket source.
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    common: Vec<FieldSpec>,
    sources: Vec<SourceFields>,
}

impl SchemaRegistry {
    /// Registry with the common fields and the Ticketmaster source, seeded from `defaults`.
    pub fn new(defaults: &FieldDefaults) -> Self {
        let date = defaults.date_of_event();
        let file_name = derive_file_name(
            &date,
            &defaults.section_name,
            &defaults.row_name,
            &defaults.seat_names,
        );

        let common = vec![
            FieldSpec::new("Location Field Name", LOCATION_FIELD_NAME)
                .required()
                .example("Chase Center")
                .default_value(defaults.location_field_name.as_str()),
            FieldSpec::new("Event Name", EVENT_NAME)
                .required()
                .example("Golden State Warriors vs. Orlando Magic")
                .default_value(defaults.event_name.as_str()),
            FieldSpec::new("Section Name", SECTION_NAME)
                .required()
                .default_value(defaults.section_name.as_str()),
            FieldSpec::new("Row Name", ROW_NAME)
                .required()
                .default_value(defaults.row_name.as_str()),
            FieldSpec::new("Seat Names (separated by commas)", SEAT_NAMES)
                .required()
                .example("1,2,3")
                .default_value(defaults.seat_names.as_str()),
            FieldSpec::new("Date of Event", DATE_OF_EVENT)
                .required()
                .example("Feb 3, 2025")
                .default_value(date),
            FieldSpec::new("Time of Event", TIME_OF_EVENT)
                .required()
                .example("7:00 PM")
                .default_value(defaults.time_of_event.as_str()),
            FieldSpec::new("File Name", FILE_NAME)
                .required()
                .default_value(file_name),
        ];

        Self {
            common,
            sources: Vec::new(),
        }
        .with_source(
            TICKETMASTER,
            vec![
                FieldSpec::new("Entry Info", ENTRY_INFO).required(),
                FieldSpec::new("Ticket Type Name", TICKET_TYPE_NAME)
                    .default_value(defaults.ticket_type_name.as_str()),
                FieldSpec::new("Ticket Type Value", TICKET_TYPE_VALUE),
            ],
        )
    }

    /// Registers (or replaces) the specific fields of a source.
    pub fn with_source(mut self, id: &str, fields: Vec<FieldSpec>) -> Self {
        match self.sources.iter_mut().find(|s| s.id == id) {
            Some(existing) => existing.fields = fields,
            None => self.sources.push(SourceFields {
                id: id.to_string(),
                fields,
            }),
        }
        self
    }

    pub fn common_fields(&self) -> &[FieldSpec] {
        &self.common
    }

    pub fn source_fields(&self, source_id: &str) -> &[FieldSpec] {
        self.sources
            .iter()
            .find(|s| s.id == source_id)
            .map(|s| s.fields.as_slice())
            .unwrap_or(&[])
    }

    /// Common fields followed by the fields of `source_id`.
    /// An unknown source yields just the common fields.
    pub fn resolve(&self, source_id: &str) -> Vec<FieldSpec> {
        self.common
            .iter()
            .chain(self.source_fields(source_id))
            .cloned()
            .collect()
    }

    pub fn sources(&self) -> Vec<&str> {
        self.sources.iter().map(|s| s.id.as_str()).collect()
    }

    pub fn default_source(&self) -> &str {
        self.sources.first().map(|s| s.id.as_str()).unwrap_or("")
    }

    pub fn field(&self, key: &str) -> Option<&FieldSpec> {
        self.common
            .iter()
            .chain(self.sources.iter().flat_map(|s| s.fields.iter()))
            .find(|f| f.key == key)
    }

    /// Starting values for every known field of every source; fields without a
    /// default start empty.
    pub fn defaults(&self) -> BTreeMap<String, String> {
        self.common
            .iter()
            .chain(self.sources.iter().flat_map(|s| s.fields.iter()))
            .map(|f| (f.key.clone(), f.default.clone().unwrap_or_default()))
            .collect()
    }

    pub fn source_defaults(&self, source_id: &str) -> BTreeMap<String, String> {
        self.source_fields(source_id)
            .iter()
            .map(|f| (f.key.clone(), f.default.clone().unwrap_or_default()))
            .collect()
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new(&FieldDefaults::default())
    }
}
