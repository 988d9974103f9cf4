use crate::dto::health_record_dto::HealthRecordPayload;
use crate::error::{Error, Result};
use crate::forms::bmi::calculate_bmi;
use crate::forms::fields::{self, FieldKind, FieldSpec};
use crate::models::health_record::{HealthRecordUpdate, RecordData, RecordType};
use crate::services::health_record_service::RecordSaver;
use crate::utils::in_flight::InFlight;
use serde_json::{Map, Number, Value as JsonValue};
use std::collections::BTreeMap;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit { record_id: String },
}

/// Editable state of the add/edit health record dialog.
///
/// Values are held as the raw text the user typed and only parsed when a
/// payload is built, so a failed save never loses input. Lists keep
/// insertion order and allow duplicates.
#[derive(Debug, Clone)]
pub struct RecordForm {
    mode: FormMode,
    patient_id: String,
    record_type: RecordType,
    values: BTreeMap<&'static str, String>,
    lists: BTreeMap<&'static str, Vec<String>>,
    location: String,
    notes: String,
    open: bool,
    is_submitting: bool,
    form_error: Option<String>,
    field_errors: BTreeMap<String, Vec<String>>,
}

impl RecordForm {
    pub fn new(patient_id: impl Into<String>, record_type: RecordType) -> Self {
        Self {
            mode: FormMode::Create,
            patient_id: patient_id.into(),
            record_type,
            values: BTreeMap::new(),
            lists: BTreeMap::new(),
            location: String::new(),
            notes: String::new(),
            open: true,
            is_submitting: false,
            form_error: None,
            field_errors: BTreeMap::new(),
        }
    }

    /// Opens a form over a copy of `record`; the record itself is untouched.
    pub fn edit(record: &HealthRecordUpdate) -> Result<Self> {
        let mut form = Self::new(record.patient_id.clone(), record.record_type());
        form.mode = FormMode::Edit {
            record_id: record.id.clone(),
        };
        form.location = record.location.clone().unwrap_or_default();
        form.notes = record.notes.clone().unwrap_or_default();

        let data = match record.data.to_json()? {
            JsonValue::Object(map) => map,
            _ => Map::new(),
        };
        for spec in form.specs() {
            match data.get(spec.key) {
                None | Some(JsonValue::Null) => {}
                Some(JsonValue::Array(items)) if spec.is_list() => {
                    let items = items.iter().filter_map(display_value).collect();
                    form.lists.insert(spec.key, items);
                }
                Some(value) => {
                    if let Some(text) = display_value(value) {
                        form.values.insert(spec.key, text);
                    }
                }
            }
        }
        if form.record_type == RecordType::Vital
            && form.parsed_decimal("weight").is_some()
            && form.parsed_decimal("height").is_some()
        {
            form.recalculate_bmi();
        }
        Ok(form)
    }

    pub fn mode(&self) -> &FormMode {
        &self.mode
    }

    pub fn record_type(&self) -> RecordType {
        self.record_type
    }

    pub fn patient_id(&self) -> &str {
        &self.patient_id
    }

    pub fn specs(&self) -> &'static [FieldSpec] {
        fields::fields_for(self.record_type)
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn is_submitting(&self) -> bool {
        self.is_submitting
    }

    pub fn can_submit(&self) -> bool {
        self.open && !self.is_submitting
    }

    pub fn form_error(&self) -> Option<&str> {
        self.form_error.as_deref()
    }

    pub fn field_errors(&self) -> &BTreeMap<String, Vec<String>> {
        &self.field_errors
    }

    pub fn value(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn list(&self, key: &str) -> &[String] {
        self.lists.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }

    /// Switches the field set. Only allowed while creating; clears every
    /// type-specific value.
    pub fn set_record_type(&mut self, record_type: RecordType) -> Result<()> {
        self.ensure_open()?;
        if let FormMode::Edit { .. } = self.mode {
            return Err(Error::InvalidState(
                "The record type of an existing record cannot change".to_string(),
            ));
        }
        if record_type != self.record_type {
            self.record_type = record_type;
            self.values.clear();
            self.lists.clear();
            self.field_errors.clear();
        }
        Ok(())
    }

    pub fn set_field(&mut self, key: &str, value: impl Into<String>) -> Result<()> {
        self.ensure_open()?;
        let spec = self.spec(key)?;
        match spec.kind {
            FieldKind::Derived { .. } => {
                return Err(Error::InvalidState(format!("{} is calculated automatically", spec.label)))
            }
            FieldKind::List => {
                return Err(Error::InvalidState(format!("{} is a list; add items instead", spec.label)))
            }
            _ => {}
        }
        self.values.insert(spec.key, value.into());
        self.field_errors.remove(spec.key);
        if self.record_type == RecordType::Vital && matches!(spec.key, "weight" | "height") {
            self.recalculate_bmi();
        }
        Ok(())
    }

    pub fn set_flag(&mut self, key: &str, flag: Option<bool>) -> Result<()> {
        let spec = self.spec(key)?;
        if spec.kind != FieldKind::Bool {
            return Err(Error::validation(format!("{} is not a yes/no field", spec.label)));
        }
        match flag {
            Some(flag) => self.set_field(key, flag.to_string()),
            None => self.clear_field(key),
        }
    }

    pub fn clear_field(&mut self, key: &str) -> Result<()> {
        self.set_field(key, String::new())
    }

    /// Appends `item` after trimming. Blank input is ignored and reported
    /// as `false`.
    pub fn add_list_item(&mut self, key: &str, item: &str) -> Result<bool> {
        self.ensure_open()?;
        let spec = self.list_spec(key)?;
        let item = item.trim();
        if item.is_empty() {
            return Ok(false);
        }
        self.lists.entry(spec.key).or_default().push(item.to_string());
        self.field_errors.remove(spec.key);
        Ok(true)
    }

    pub fn remove_list_item(&mut self, key: &str, index: usize) -> Result<Option<String>> {
        self.ensure_open()?;
        let spec = self.list_spec(key)?;
        let Some(items) = self.lists.get_mut(spec.key) else {
            return Ok(None);
        };
        if index >= items.len() {
            return Ok(None);
        }
        Ok(Some(items.remove(index)))
    }

    pub fn set_location(&mut self, location: impl Into<String>) {
        self.location = location.into();
    }

    pub fn set_notes(&mut self, notes: impl Into<String>) {
        self.notes = notes.into();
    }

    /// Parses and validates the current input into a sparse payload.
    /// Blank fields are left out entirely.
    pub fn to_payload(&self) -> Result<HealthRecordPayload> {
        let mut data = Map::new();
        let mut errors: BTreeMap<String, Vec<String>> = BTreeMap::new();

        for spec in self.specs() {
            if spec.is_list() {
                let items = self.list(spec.key);
                if !items.is_empty() {
                    data.insert(spec.key.to_string(), items.into());
                }
                continue;
            }
            let Some(raw) = self.values.get(spec.key).map(|v| v.trim()) else {
                continue;
            };
            if raw.is_empty() {
                continue;
            }
            match parse_value(spec, raw) {
                Ok(value) => {
                    data.insert(spec.key.to_string(), value);
                }
                Err(message) => errors.entry(spec.key.to_string()).or_default().push(message),
            }
        }
        if !errors.is_empty() {
            return Err(Error::invalid_fields(errors));
        }

        let data = RecordData::from_parts(self.record_type, JsonValue::Object(data))?;
        data.validate().map_err(rekey_validation)?;

        Ok(HealthRecordPayload {
            record_id: match &self.mode {
                FormMode::Edit { record_id } => Some(record_id.clone()),
                FormMode::Create => None,
            },
            patient_id: self.patient_id.clone(),
            record_type: self.record_type,
            data,
            location: non_blank(&self.location),
            notes: non_blank(&self.notes),
        })
    }

    /// Saves through `saver`. On failure every entered value stays in place
    /// and the form reopens for another try; on success the form is cleared
    /// and closed.
    pub async fn submit<S: RecordSaver + ?Sized>(&mut self, saver: &S) -> Result<HealthRecordUpdate> {
        self.ensure_open()?;
        if self.is_submitting {
            return Err(Error::InvalidState("The record is already being saved".to_string()));
        }
        self.form_error = None;
        self.field_errors.clear();

        let payload = match self.to_payload() {
            Ok(payload) => payload,
            Err(e) => {
                self.record_failure(&e);
                return Err(e);
            }
        };

        let outcome = {
            let _in_flight = InFlight::raise(&mut self.is_submitting);
            saver.save(payload).await
        };

        match outcome {
            Ok(record) => {
                info!(
                    record_id = %record.id,
                    record_type = %self.record_type,
                    edit = matches!(self.mode, FormMode::Edit { .. }),
                    "Health record saved"
                );
                self.reset();
                self.open = false;
                Ok(record)
            }
            Err(e) => {
                warn!(record_type = %self.record_type, error = %e, "Health record save failed");
                self.record_failure(&e);
                Err(e)
            }
        }
    }

    /// Closes without saving. Nothing outside the form is touched.
    pub fn cancel(&mut self) {
        self.reset();
        self.open = false;
    }

    fn reset(&mut self) {
        self.values.clear();
        self.lists.clear();
        self.location.clear();
        self.notes.clear();
        self.form_error = None;
        self.field_errors.clear();
    }

    fn record_failure(&mut self, err: &Error) {
        self.form_error = Some(err.user_message());
        if let Some(fields) = err.field_errors() {
            self.field_errors = fields.clone();
        }
    }

    fn recalculate_bmi(&mut self) {
        match calculate_bmi(self.parsed_decimal("weight"), self.parsed_decimal("height")) {
            Some(bmi) => {
                self.values.insert("bmi", format!("{:.1}", bmi.value));
                self.values.insert("bmiCategory", bmi.category.label().to_string());
            }
            None => {
                self.values.insert("bmi", String::new());
                self.values.insert("bmiCategory", String::new());
            }
        }
    }

    fn parsed_decimal(&self, key: &str) -> Option<f64> {
        self.values.get(key)?.trim().parse::<f64>().ok()
    }

    fn spec(&self, key: &str) -> Result<&'static FieldSpec> {
        fields::find_field(self.record_type, key).ok_or_else(|| {
            Error::validation(format!("{} records have no {} field", self.record_type, key))
        })
    }

    fn list_spec(&self, key: &str) -> Result<&'static FieldSpec> {
        let spec = self.spec(key)?;
        if !spec.is_list() {
            return Err(Error::validation(format!("{} is not a list field", spec.label)));
        }
        Ok(spec)
    }

    fn ensure_open(&self) -> Result<()> {
        if self.open {
            Ok(())
        } else {
            Err(Error::InvalidState("The form has been closed".to_string()))
        }
    }
}

fn parse_value(spec: &FieldSpec, raw: &str) -> std::result::Result<JsonValue, String> {
    match spec.kind {
        FieldKind::Text | FieldKind::Derived { numeric: false } => Ok(JsonValue::String(raw.to_string())),
        FieldKind::Integer => raw
            .parse::<i64>()
            .map(JsonValue::from)
            .map_err(|_| format!("{} must be a whole number", spec.label)),
        FieldKind::Decimal | FieldKind::Derived { numeric: true } => raw
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(JsonValue::Number)
            .ok_or_else(|| format!("{} must be a number", spec.label)),
        FieldKind::Bool => match raw.to_ascii_lowercase().as_str() {
            "true" | "yes" => Ok(JsonValue::Bool(true)),
            "false" | "no" => Ok(JsonValue::Bool(false)),
            _ => Err(format!("{} must be yes or no", spec.label)),
        },
        FieldKind::Choice(options) => {
            let lowered = raw.to_ascii_lowercase();
            if options.contains(&lowered.as_str()) {
                Ok(JsonValue::String(lowered))
            } else {
                Err(format!("{} must be one of: {}", spec.label, options.join(", ")))
            }
        }
        FieldKind::List => Err(format!("{} is a list", spec.label)),
    }
}

fn display_value(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        JsonValue::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn rekey_validation(err: Error) -> Error {
    match err {
        Error::Validation { fields, .. } => Error::invalid_fields(
            fields
                .into_iter()
                .map(|(key, messages)| (fields::camel_case(&key), messages))
                .collect(),
        ),
        other => other,
    }
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
