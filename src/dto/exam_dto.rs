use crate::models::exam::Question;
use crate::models::exam_attempt::{AttemptStatus, UNANSWERED};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartAttemptRequest {
    pub exam_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerSubmission {
    pub question_id: String,
    /// Selected option index, or `-1` when left blank.
    pub answer: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitAttemptRequest {
    pub answers: Vec<AnswerSubmission>,
    /// Only sent when the client closes the attempt on an expired timer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<AttemptStatus>,
}

impl SubmitAttemptRequest {
    /// Pairs each answer slot with the question at the same position.
    pub fn from_slots(questions: &[Question], slots: &[Option<usize>]) -> Self {
        let answers = questions
            .iter()
            .zip(slots.iter())
            .map(|(q, slot)| AnswerSubmission {
                question_id: q.id.clone(),
                answer: slot.map(|i| i as i32).unwrap_or(UNANSWERED),
            })
            .collect();
        Self { answers, status: None }
    }

    pub fn timed_out(mut self) -> Self {
        self.status = Some(AttemptStatus::TimedOut);
        self
    }
}
