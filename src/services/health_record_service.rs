use crate::dto::health_record_dto::{HealthRecordPayload, HealthRecordQuery};
use crate::error::Result;
use crate::http::api_client::ApiClient;
use crate::models::health_record::HealthRecordUpdate;
use async_trait::async_trait;
use tracing::info;

/// Persists a record form submission.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecordSaver: Send + Sync {
    async fn save(&self, payload: HealthRecordPayload) -> Result<HealthRecordUpdate>;
}

#[derive(Clone)]
pub struct HealthRecordService {
    api: ApiClient,
}

impl HealthRecordService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn create(&self, payload: &HealthRecordPayload) -> Result<HealthRecordUpdate> {
        let record: HealthRecordUpdate = self.api.post("/health-records", payload).await?;
        info!(
            record_id = %record.id,
            patient_id = %record.patient_id,
            record_type = %record.record_type(),
            "Health record created"
        );
        Ok(record)
    }

    pub async fn update(&self, record_id: &str, payload: &HealthRecordPayload) -> Result<HealthRecordUpdate> {
        let record: HealthRecordUpdate = self
            .api
            .put(&format!("/health-records/{}", record_id), payload)
            .await?;
        info!(record_id, record_type = %record.record_type(), "Health record updated");
        Ok(record)
    }

    pub async fn get(&self, record_id: &str) -> Result<HealthRecordUpdate> {
        self.api
            .get(&format!("/health-records/{}", record_id), &[])
            .await
    }

    pub async fn list_for_patient(
        &self,
        patient_id: &str,
        query: &HealthRecordQuery,
    ) -> Result<Vec<HealthRecordUpdate>> {
        self.api
            .get(
                &format!("/patients/{}/health-records", patient_id),
                &query.to_pairs(),
            )
            .await
    }
}

#[async_trait]
impl RecordSaver for HealthRecordService {
    async fn save(&self, payload: HealthRecordPayload) -> Result<HealthRecordUpdate> {
        match payload.record_id.clone() {
            Some(id) => self.update(&id, &payload).await,
            None => self.create(&payload).await,
        }
    }
}
