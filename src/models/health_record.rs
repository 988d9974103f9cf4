use crate::error::{Error, Result};
use crate::utils::flexible;
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value as JsonValue;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;
use validator::{Validate, ValidationError};

static BLOOD_PRESSURE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\d{2,3}\s*/\s*\d{2,3}\s*$").expect("valid regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordType {
    Vital,
    Medication,
    Symptom,
    Note,
    Assessment,
    Treatment,
}

impl RecordType {
    pub const ALL: [RecordType; 6] = [
        RecordType::Vital,
        RecordType::Medication,
        RecordType::Symptom,
        RecordType::Note,
        RecordType::Assessment,
        RecordType::Treatment,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::Vital => "vital",
            RecordType::Medication => "medication",
            RecordType::Symptom => "symptom",
            RecordType::Note => "note",
            RecordType::Assessment => "assessment",
            RecordType::Treatment => "treatment",
        }
    }

    /// Upper-cased form the backend stores and expects.
    pub fn wire_name(&self) -> String {
        self.as_str().to_ascii_uppercase()
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let lowered = s.trim().to_ascii_lowercase();
        RecordType::ALL
            .into_iter()
            .find(|rt| rt.as_str() == lowered)
            .ok_or_else(|| Error::validation(format!("Unknown record type: {}", s)))
    }
}

impl Serialize for RecordType {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.wire_name())
    }
}

impl<'de> Deserialize<'de> for RecordType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Excellent,
    Good,
    Fair,
    Poor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Appetite {
    Good,
    Fair,
    Poor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mobility {
    Independent,
    Assisted,
    Limited,
    Bedbound,
}

fn validate_blood_pressure(value: &str) -> std::result::Result<(), ValidationError> {
    if BLOOD_PRESSURE.is_match(value) {
        Ok(())
    } else {
        let mut err = ValidationError::new("blood_pressure");
        err.message = Some("Blood pressure must look like 120/80".into());
        Err(err)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct VitalSigns {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "validate_blood_pressure"))]
    pub blood_pressure: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "flexible::opt_i64")]
    #[validate(range(min = 20, max = 250, message = "Heart rate must be between 20 and 250 bpm"))]
    pub heart_rate: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "flexible::opt_f64")]
    #[validate(range(min = 80.0, max = 115.0, message = "Temperature must be between 80 and 115 °F"))]
    pub temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "flexible::opt_f64")]
    #[validate(range(exclusive_min = 0.0, message = "Weight must be positive"))]
    pub weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "flexible::opt_f64")]
    #[validate(range(exclusive_min = 0.0, message = "Height must be positive"))]
    pub height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "flexible::opt_f64")]
    pub bmi: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bmi_category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "flexible::opt_f64")]
    #[validate(range(exclusive_min = 0.0, message = "Blood sugar must be positive"))]
    pub blood_sugar: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "flexible::opt_f64")]
    #[validate(range(min = 0.0, max = 100.0, message = "Oxygen saturation must be between 0 and 100"))]
    pub oxygen_saturation: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MedicationData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medication: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dosage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "flexible::opt_bool")]
    pub taken: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SymptomData {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub symptoms: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "flexible::opt_i64")]
    #[validate(range(min = 1, max = 10, message = "Pain level must be between 1 and 10"))]
    pub pain_level: Option<i64>,
}

/// Field set shared by `note` and `treatment` records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct WellbeingData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood: Option<Mood>,
    /// Hours.
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "flexible::opt_f64")]
    #[validate(range(min = 0.0, max = 24.0, message = "Sleep must be between 0 and 24 hours"))]
    pub sleep: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub appetite: Option<Appetite>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mobility: Option<Mobility>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub injury_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "flexible::opt_i64")]
    #[validate(range(min = 0, max = 10, message = "Pain scale must be between 0 and 10"))]
    pub pain_scale: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mobility_level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_appointment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chief_complaint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medical_history: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub examination: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagnosis: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub affected_area: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub functional_limitations: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub current_medications: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub goals: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub recommendations: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assessment_notes: Option<String>,
}

/// Record payload, discriminated by record type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RecordData {
    Vital(VitalSigns),
    Medication(MedicationData),
    Symptom(SymptomData),
    Note(WellbeingData),
    Assessment(AssessmentData),
    Treatment(WellbeingData),
}

impl RecordData {
    pub fn empty(record_type: RecordType) -> Self {
        match record_type {
            RecordType::Vital => RecordData::Vital(VitalSigns::default()),
            RecordType::Medication => RecordData::Medication(MedicationData::default()),
            RecordType::Symptom => RecordData::Symptom(SymptomData::default()),
            RecordType::Note => RecordData::Note(WellbeingData::default()),
            RecordType::Assessment => RecordData::Assessment(AssessmentData::default()),
            RecordType::Treatment => RecordData::Treatment(WellbeingData::default()),
        }
    }

    pub fn record_type(&self) -> RecordType {
        match self {
            RecordData::Vital(_) => RecordType::Vital,
            RecordData::Medication(_) => RecordType::Medication,
            RecordData::Symptom(_) => RecordType::Symptom,
            RecordData::Note(_) => RecordType::Note,
            RecordData::Assessment(_) => RecordType::Assessment,
            RecordData::Treatment(_) => RecordType::Treatment,
        }
    }

    /// Interprets a free-form `data` object according to `record_type`.
    /// Keys that belong to other record types are ignored.
    pub fn from_parts(record_type: RecordType, data: JsonValue) -> Result<Self> {
        let data = match data {
            JsonValue::Null => JsonValue::Object(Default::default()),
            other => other,
        };
        Ok(match record_type {
            RecordType::Vital => RecordData::Vital(serde_json::from_value(data)?),
            RecordType::Medication => RecordData::Medication(serde_json::from_value(data)?),
            RecordType::Symptom => RecordData::Symptom(serde_json::from_value(data)?),
            RecordType::Note => RecordData::Note(serde_json::from_value(data)?),
            RecordType::Assessment => RecordData::Assessment(serde_json::from_value(data)?),
            RecordType::Treatment => RecordData::Treatment(serde_json::from_value(data)?),
        })
    }

    pub fn to_json(&self) -> Result<JsonValue> {
        Ok(serde_json::to_value(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        match self {
            RecordData::Vital(d) => d.validate()?,
            RecordData::Medication(d) => d.validate()?,
            RecordData::Symptom(d) => d.validate()?,
            RecordData::Note(d) | RecordData::Treatment(d) => d.validate()?,
            RecordData::Assessment(d) => d.validate()?,
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "HealthRecordWire")]
pub struct HealthRecordUpdate {
    pub id: String,
    pub patient_id: String,
    pub data: RecordData,
    pub location: Option<String>,
    pub notes: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub updated_by: Option<String>,
    pub updated_by_name: Option<String>,
    pub updated_by_role: Option<String>,
    pub verified: bool,
}

impl HealthRecordUpdate {
    pub fn record_type(&self) -> RecordType {
        self.data.record_type()
    }
}

/// Raw backend shape: `recordType` plus an untyped `data` object.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthRecordWire {
    #[serde(deserialize_with = "flexible::id")]
    id: String,
    #[serde(deserialize_with = "flexible::id")]
    patient_id: String,
    record_type: RecordType,
    #[serde(default)]
    data: JsonValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    notes: Option<String>,
    timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "flexible::opt_id")]
    updated_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    updated_by_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    updated_by_role: Option<String>,
    #[serde(default, deserialize_with = "flexible::bool")]
    verified: bool,
}

impl TryFrom<HealthRecordWire> for HealthRecordUpdate {
    type Error = Error;

    fn try_from(wire: HealthRecordWire) -> Result<Self> {
        Ok(Self {
            data: RecordData::from_parts(wire.record_type, wire.data)?,
            id: wire.id,
            patient_id: wire.patient_id,
            location: wire.location,
            notes: wire.notes,
            timestamp: wire.timestamp,
            updated_by: wire.updated_by,
            updated_by_name: wire.updated_by_name,
            updated_by_role: wire.updated_by_role,
            verified: wire.verified,
        })
    }
}

impl TryFrom<&HealthRecordUpdate> for HealthRecordWire {
    type Error = Error;

    fn try_from(record: &HealthRecordUpdate) -> Result<Self> {
        Ok(Self {
            record_type: record.data.record_type(),
            data: record.data.to_json()?,
            id: record.id.clone(),
            patient_id: record.patient_id.clone(),
            location: record.location.clone(),
            notes: record.notes.clone(),
            timestamp: record.timestamp,
            updated_by: record.updated_by.clone(),
            updated_by_name: record.updated_by_name.clone(),
            updated_by_role: record.updated_by_role.clone(),
            verified: record.verified,
        })
    }
}

impl Serialize for HealthRecordUpdate {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        HealthRecordWire::try_from(self)
            .map_err(serde::ser::Error::custom)?
            .serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn record_type_is_upper_on_wire_and_lower_on_read() {
        assert_eq!(serde_json::to_value(RecordType::Vital).unwrap(), json!("VITAL"));
        let rt: RecordType = serde_json::from_value(json!("Assessment")).unwrap();
        assert_eq!(rt, RecordType::Assessment);
        assert_eq!(rt.to_string(), "assessment");
        assert!("vitals".parse::<RecordType>().is_err());
    }

    #[test]
    fn parses_vital_record_into_tagged_data() {
        let record: HealthRecordUpdate = serde_json::from_value(json!({
            "id": "r1",
            "patientId": 7,
            "recordType": "VITAL",
            "data": { "bloodPressure": "120/80", "heartRate": "72", "weight": 150, "height": 65 },
            "timestamp": "2026-03-04T10:00:00Z",
            "updatedByRole": "NURSE",
            "verified": false
        }))
        .unwrap();
        assert_eq!(record.record_type(), RecordType::Vital);
        assert_eq!(record.patient_id, "7");
        match &record.data {
            RecordData::Vital(v) => {
                assert_eq!(v.heart_rate, Some(72));
                assert_eq!(v.weight, Some(150.0));
                assert_eq!(v.bmi, None);
            }
            other => panic!("unexpected data {:?}", other),
        }
    }

    #[test]
    fn treatment_shares_wellbeing_fields() {
        let data = RecordData::from_parts(
            RecordType::Treatment,
            json!({ "mood": "good", "sleep": 7.5, "mobility": "assisted" }),
        )
        .unwrap();
        assert_eq!(data.record_type(), RecordType::Treatment);
        assert_eq!(
            data.to_json().unwrap(),
            json!({ "mood": "good", "sleep": 7.5, "mobility": "assisted" })
        );
    }

    #[test]
    fn sparse_serialization_omits_empty_fields() {
        let data = RecordData::Symptom(SymptomData { symptoms: vec![], pain_level: None });
        assert_eq!(data.to_json().unwrap(), json!({}));
    }

    #[test]
    fn validation_flags_out_of_range_vitals() {
        let data = RecordData::Vital(VitalSigns {
            blood_pressure: Some("high".into()),
            heart_rate: Some(400),
            ..Default::default()
        });
        let err = data.validate().unwrap_err();
        let fields = err.field_errors().unwrap();
        assert!(fields.contains_key("blood_pressure"));
        assert!(fields.contains_key("heart_rate"));
    }

    #[test]
    fn pain_level_bounds() {
        let ok = RecordData::Symptom(SymptomData { symptoms: vec!["Fever".into()], pain_level: Some(10) });
        assert!(ok.validate().is_ok());
        let bad = RecordData::Symptom(SymptomData { symptoms: vec![], pain_level: Some(0) });
        assert!(bad.validate().is_err());
    }

    #[test]
    fn serializes_back_to_wire_shape() {
        let raw = json!({
            "id": "r2",
            "patientId": "p1",
            "recordType": "SYMPTOM",
            "data": { "symptoms": ["Fever"], "painLevel": 3 },
            "timestamp": "2026-03-04T10:00:00Z",
            "verified": true
        });
        let record: HealthRecordUpdate = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(serde_json::to_value(&record).unwrap(), raw);
    }
}
