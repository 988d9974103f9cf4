use crate::utils::flexible;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Approval status. Transitions happen on the backend only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CertificateStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamCertificate {
    #[serde(deserialize_with = "flexible::id")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "flexible::opt_id")]
    pub attempt_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "flexible::opt_id")]
    pub exam_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "flexible::opt_id")]
    pub user_id: Option<String>,
    pub status: CertificateStatus,
    #[serde(default, deserialize_with = "flexible::opt_f64")]
    pub score: Option<f64>,
    pub certificate_number: String,
    pub issued_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "flexible::opt_id")]
    pub approved_by_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exam_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub holder_name: Option<String>,
}

impl ExamCertificate {
    pub fn is_approved(&self) -> bool {
        self.status == CertificateStatus::Approved
    }
}

/// What the attempt view shows about a certificate.
#[derive(Debug, Clone, PartialEq)]
pub enum CertificateState {
    /// The attempt has not passed (or is not submitted yet).
    NotEligible,
    /// Passed, but the backend has not attached a certificate yet.
    Generating,
    Issued(ExamCertificate),
}

impl CertificateState {
    pub fn is_settled(&self) -> bool {
        !matches!(self, CertificateState::Generating)
    }
}
