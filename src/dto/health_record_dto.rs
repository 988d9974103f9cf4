use crate::models::health_record::{RecordData, RecordType};
use serde::Serialize;

/// Body for `POST /health-records` and `PUT /health-records/{id}`.
/// Optional keys are omitted rather than sent as null.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthRecordPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_id: Option<String>,
    pub patient_id: String,
    pub record_type: RecordType,
    pub data: RecordData,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl HealthRecordPayload {
    pub fn is_edit(&self) -> bool {
        self.record_id.is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthRecordQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_type: Option<RecordType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

impl HealthRecordQuery {
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(rt) = self.record_type {
            pairs.push(("recordType", rt.wire_name()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        pairs
    }
}
