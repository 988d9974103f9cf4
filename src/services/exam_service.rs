use crate::dto::exam_dto::{StartAttemptRequest, SubmitAttemptRequest};
use crate::error::Result;
use crate::http::api_client::ApiClient;
use crate::models::exam::Exam;
use crate::models::exam_attempt::ExamAttempt;
use async_trait::async_trait;
use tracing::info;

/// Backend operations the exam session depends on.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ExamBackend: Send + Sync {
    async fn get_exam(&self, exam_id: &str, include_answers: bool) -> Result<Exam>;
    async fn start_attempt(&self, exam_id: &str) -> Result<ExamAttempt>;
    async fn submit_attempt(&self, attempt_id: &str, request: &SubmitAttemptRequest) -> Result<ExamAttempt>;
    async fn get_attempt(&self, attempt_id: &str) -> Result<ExamAttempt>;
}

#[derive(Clone)]
pub struct ExamService {
    api: ApiClient,
}

impl ExamService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn list_exams(&self) -> Result<Vec<Exam>> {
        self.api.get("/exams-v2", &[]).await
    }
}

#[async_trait]
impl ExamBackend for ExamService {
    async fn get_exam(&self, exam_id: &str, include_answers: bool) -> Result<Exam> {
        let query = if include_answers {
            vec![("includeAnswers", "true".to_string())]
        } else {
            Vec::new()
        };
        self.api.get(&format!("/exams-v2/{}", exam_id), &query).await
    }

    async fn start_attempt(&self, exam_id: &str) -> Result<ExamAttempt> {
        let body = StartAttemptRequest {
            exam_id: exam_id.to_string(),
        };
        let attempt: ExamAttempt = self.api.post("/attempts", &body).await?;
        info!(exam_id, attempt_id = %attempt.id, "Exam attempt started");
        Ok(attempt)
    }

    async fn submit_attempt(&self, attempt_id: &str, request: &SubmitAttemptRequest) -> Result<ExamAttempt> {
        self.api
            .post(&format!("/attempts/{}/submit", attempt_id), request)
            .await
    }

    async fn get_attempt(&self, attempt_id: &str) -> Result<ExamAttempt> {
        self.api.get(&format!("/attempts/{}", attempt_id), &[]).await
    }
}
