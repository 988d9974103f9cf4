pub mod config;
pub mod dto;
pub mod error;
pub mod forms;
pub mod http;
pub mod models;
pub mod services;
pub mod session;
pub mod utils;

use crate::config::Config;
use crate::error::Result;
use crate::forms::record_form::RecordForm;
use crate::http::api_client::ApiClient;
use crate::models::health_record::{HealthRecordUpdate, RecordType};
use crate::services::{
    certificate_service::CertificateService, exam_service::ExamService,
    health_record_service::HealthRecordService,
};
use crate::session::exam_session::{ExamSession, SessionOptions};

/// Services sharing one configured HTTP client.
#[derive(Clone)]
pub struct HomecareClient {
    pub api: ApiClient,
    pub exam_service: ExamService,
    pub certificate_service: CertificateService,
    pub health_record_service: HealthRecordService,
}

impl HomecareClient {
    pub fn new(config: Config) -> Result<Self> {
        let api = ApiClient::new(config)?;

        let exam_service = ExamService::new(api.clone());
        let certificate_service = CertificateService::new(api.clone());
        let health_record_service = HealthRecordService::new(api.clone());

        Ok(Self {
            api,
            exam_service,
            certificate_service,
            health_record_service,
        })
    }

    pub fn exam_session(&self) -> ExamSession<ExamService> {
        ExamSession::new(
            self.exam_service.clone(),
            SessionOptions::from(self.api.config()),
        )
    }

    pub fn new_record_form(&self, patient_id: &str, record_type: RecordType) -> RecordForm {
        RecordForm::new(patient_id, record_type)
    }

    pub fn edit_record_form(&self, record: &HealthRecordUpdate) -> Result<RecordForm> {
        RecordForm::edit(record)
    }
}
