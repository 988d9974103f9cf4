use crate::error::{Error, Result};
use crate::http::api_client::ApiClient;
use crate::models::certificate::ExamCertificate;

/// Read-only access to certificates. Approval happens elsewhere.
#[derive(Clone)]
pub struct CertificateService {
    api: ApiClient,
}

impl CertificateService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn get_certificate(&self, certificate_id: &str) -> Result<ExamCertificate> {
        self.api
            .get(&format!("/certificates/{}", certificate_id), &[])
            .await
    }

    pub async fn list_my_certificates(&self) -> Result<Vec<ExamCertificate>> {
        self.api.get("/certificates/me", &[]).await
    }

    /// `None` while the backend is still issuing the certificate.
    pub async fn find_for_attempt(&self, attempt_id: &str) -> Result<Option<ExamCertificate>> {
        match self
            .api
            .get(&format!("/attempts/{}/certificate", attempt_id), &[])
            .await
        {
            Ok(cert) => Ok(Some(cert)),
            Err(Error::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }
}
