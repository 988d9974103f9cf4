use crate::utils::flexible;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExamStatus {
    Draft,
    Published,
    Archived,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    #[serde(deserialize_with = "flexible::id")]
    pub id: String,
    #[serde(alias = "question", alias = "text")]
    pub prompt: String,
    pub options: Vec<String>,
    /// Index into `options`; absent when the exam was loaded without answers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correct_answer: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "flexible::opt_f64")]
    pub points: Option<f64>,
}

impl Question {
    pub fn weight(&self) -> f64 {
        self.points.filter(|p| *p > 0.0).unwrap_or(1.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exam {
    #[serde(deserialize_with = "flexible::id")]
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub questions: Vec<Question>,
    pub passing_score: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_attempts: Option<u32>,
    /// Minutes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_limit: Option<u32>,
    pub status: ExamStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question_order: Option<Vec<String>>,
}

impl Exam {
    /// Questions in presentation order. A `questionOrder` override wins for
    /// the ids it names; unnamed questions follow in their listed order and
    /// unknown ids are ignored.
    pub fn ordered_questions(&self) -> Vec<Question> {
        let Some(order) = &self.question_order else {
            return self.questions.clone();
        };

        let mut taken = vec![false; self.questions.len()];
        let mut ordered = Vec::with_capacity(self.questions.len());
        for id in order {
            if let Some(pos) = self
                .questions
                .iter()
                .enumerate()
                .position(|(i, q)| !taken[i] && &q.id == id)
            {
                taken[pos] = true;
                ordered.push(self.questions[pos].clone());
            }
        }
        for (i, q) in self.questions.iter().enumerate() {
            if !taken[i] {
                ordered.push(q.clone());
            }
        }
        ordered
    }

    pub fn has_answer_key(&self) -> bool {
        !self.questions.is_empty() && self.questions.iter().all(|q| q.correct_answer.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn exam_json() -> serde_json::Value {
        json!({
            "id": 12,
            "title": "Infection Control",
            "passingScore": 70,
            "maxAttempts": 3,
            "timeLimit": 30,
            "status": "PUBLISHED",
            "questions": [
                { "id": "q1", "question": "Wash hands for?", "options": ["5s", "20s"], "correctAnswer": 1 },
                { "id": "q2", "prompt": "Glove change?", "options": ["Never", "Between patients"], "correctAnswer": 1, "points": "2" },
                { "id": "q3", "text": "PPE order?", "options": ["A", "B", "C"] }
            ]
        })
    }

    #[test]
    fn parses_backend_exam() {
        let exam: Exam = serde_json::from_value(exam_json()).unwrap();
        assert_eq!(exam.id, "12");
        assert_eq!(exam.status, ExamStatus::Published);
        assert_eq!(exam.questions[0].prompt, "Wash hands for?");
        assert_eq!(exam.questions[1].weight(), 2.0);
        assert_eq!(exam.questions[2].correct_answer, None);
        assert!(!exam.has_answer_key());
    }

    #[test]
    fn question_order_override_reorders_and_appends_rest() {
        let mut exam: Exam = serde_json::from_value(exam_json()).unwrap();
        exam.question_order = Some(vec!["q3".into(), "missing".into(), "q1".into()]);
        let ids: Vec<_> = exam.ordered_questions().into_iter().map(|q| q.id).collect();
        assert_eq!(ids, vec!["q3", "q1", "q2"]);
    }

    #[test]
    fn without_override_order_is_listed_order() {
        let exam: Exam = serde_json::from_value(exam_json()).unwrap();
        let ids: Vec<_> = exam.ordered_questions().into_iter().map(|q| q.id).collect();
        assert_eq!(ids, vec!["q1", "q2", "q3"]);
    }
}
