use crate::models::health_record::RecordType;

pub const MOOD_CHOICES: &[&str] = &["excellent", "good", "fair", "poor"];
pub const APPETITE_CHOICES: &[&str] = &["good", "fair", "poor"];
pub const MOBILITY_CHOICES: &[&str] = &["independent", "assisted", "limited", "bedbound"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Integer,
    Decimal,
    Bool,
    Choice(&'static [&'static str]),
    List,
    /// Computed by the form; read-only to the user.
    Derived { numeric: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Key inside the record's `data` object.
    pub key: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
}

impl FieldSpec {
    const fn new(key: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self { key, label, kind }
    }

    pub fn is_list(&self) -> bool {
        matches!(self.kind, FieldKind::List)
    }

    pub fn is_read_only(&self) -> bool {
        matches!(self.kind, FieldKind::Derived { .. })
    }
}

const VITAL_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("bloodPressure", "Blood Pressure", FieldKind::Text),
    FieldSpec::new("heartRate", "Heart Rate (bpm)", FieldKind::Integer),
    FieldSpec::new("temperature", "Temperature (°F)", FieldKind::Decimal),
    FieldSpec::new("weight", "Weight (lbs)", FieldKind::Decimal),
    FieldSpec::new("height", "Height (inches)", FieldKind::Decimal),
    FieldSpec::new("bmi", "BMI", FieldKind::Derived { numeric: true }),
    FieldSpec::new("bmiCategory", "BMI Category", FieldKind::Derived { numeric: false }),
    FieldSpec::new("bloodSugar", "Blood Sugar (mg/dL)", FieldKind::Decimal),
    FieldSpec::new("oxygenSaturation", "Oxygen Saturation (%)", FieldKind::Decimal),
];

const MEDICATION_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("medication", "Medication", FieldKind::Text),
    FieldSpec::new("dosage", "Dosage", FieldKind::Text),
    FieldSpec::new("taken", "Taken", FieldKind::Bool),
];

const SYMPTOM_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("symptoms", "Symptoms", FieldKind::List),
    FieldSpec::new("painLevel", "Pain Level (1-10)", FieldKind::Integer),
];

const WELLBEING_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("mood", "Mood", FieldKind::Choice(MOOD_CHOICES)),
    FieldSpec::new("sleep", "Sleep (hours)", FieldKind::Decimal),
    FieldSpec::new("appetite", "Appetite", FieldKind::Choice(APPETITE_CHOICES)),
    FieldSpec::new("mobility", "Mobility", FieldKind::Choice(MOBILITY_CHOICES)),
];

const ASSESSMENT_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("injuryType", "Injury Type", FieldKind::Text),
    FieldSpec::new("painScale", "Pain Scale (0-10)", FieldKind::Integer),
    FieldSpec::new("mobilityLevel", "Mobility Level", FieldKind::Text),
    FieldSpec::new("nextAppointment", "Next Appointment", FieldKind::Text),
    FieldSpec::new("chiefComplaint", "Chief Complaint", FieldKind::Text),
    FieldSpec::new("medicalHistory", "Medical History", FieldKind::Text),
    FieldSpec::new("examination", "Examination", FieldKind::Text),
    FieldSpec::new("diagnosis", "Diagnosis", FieldKind::Text),
    FieldSpec::new("affectedArea", "Affected Area", FieldKind::List),
    FieldSpec::new("functionalLimitations", "Functional Limitations", FieldKind::List),
    FieldSpec::new("currentMedications", "Current Medications", FieldKind::List),
    FieldSpec::new("goals", "Goals", FieldKind::List),
    FieldSpec::new("recommendations", "Recommendations", FieldKind::List),
    FieldSpec::new("assessmentNotes", "Assessment Notes", FieldKind::Text),
];

pub fn fields_for(record_type: RecordType) -> &'static [FieldSpec] {
    match record_type {
        RecordType::Vital => VITAL_FIELDS,
        RecordType::Medication => MEDICATION_FIELDS,
        RecordType::Symptom => SYMPTOM_FIELDS,
        RecordType::Note | RecordType::Treatment => WELLBEING_FIELDS,
        RecordType::Assessment => ASSESSMENT_FIELDS,
    }
}

pub fn find_field(record_type: RecordType, key: &str) -> Option<&'static FieldSpec> {
    fields_for(record_type).iter().find(|f| f.key == key)
}

/// `heart_rate` -> `heartRate`, for re-keying validator output.
pub fn camel_case(snake: &str) -> String {
    let mut out = String::with_capacity(snake.len());
    let mut upper = false;
    for ch in snake.chars() {
        if ch == '_' {
            upper = true;
        } else if upper {
            out.extend(ch.to_uppercase());
            upper = false;
        } else {
            out.push(ch);
        }
    }
    out
}
