use crate::models::certificate::ExamCertificate;
use crate::utils::flexible;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Wire sentinel for a question that has not been answered.
pub const UNANSWERED: i32 = -1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttemptStatus {
    InProgress,
    Submitted,
    TimedOut,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamAttempt {
    #[serde(deserialize_with = "flexible::id")]
    pub id: String,
    #[serde(deserialize_with = "flexible::id")]
    pub exam_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "flexible::opt_id")]
    pub user_id: Option<String>,
    #[serde(default)]
    pub answers: Vec<i32>,
    pub started_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "flexible::opt_f64")]
    pub score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "flexible::opt_bool")]
    pub passed: Option<bool>,
    pub status: AttemptStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate: Option<ExamCertificate>,
}

impl ExamAttempt {
    pub fn is_submitted(&self) -> bool {
        self.submitted_at.is_some() || self.status != AttemptStatus::InProgress
    }

    /// Backend score as a 0–100 integer, when reported.
    pub fn reported_score(&self) -> Option<u32> {
        self.score
            .filter(|s| s.is_finite())
            .map(|s| s.round().clamp(0.0, 100.0) as u32)
    }

    /// Answers decoded into option indices, padded or truncated to `len`.
    pub fn answer_slots(&self, len: usize) -> Vec<Option<usize>> {
        (0..len)
            .map(|i| {
                self.answers
                    .get(i)
                    .copied()
                    .filter(|a| *a >= 0)
                    .map(|a| a as usize)
            })
            .collect()
    }
}
