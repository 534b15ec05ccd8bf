// Certificate templates: `/api/v2/certificate-templates` on cert-manager.

use crate::client::ApiClient;
use crate::endpoint::CERT_MANAGER_SERVICE;
use crate::error::Error;
use crate::models::{CertificateTemplate, CertificateTemplateCreateRequest};

const ROOT: &str = "/api/v2/certificate-templates";

#[derive(Debug, Clone)]
pub struct CertificateTemplatesClient {
    api: ApiClient,
}

impl CertificateTemplatesClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn list(&self) -> Result<Vec<CertificateTemplate>, Error> {
        self.api.get(CERT_MANAGER_SERVICE, ROOT).await
    }

    pub async fn get(&self, template_id: i64) -> Result<CertificateTemplate, Error> {
        self.api
            .get(CERT_MANAGER_SERVICE, &format!("{ROOT}/{template_id}"))
            .await
    }

    pub async fn create(
        &self,
        req: &CertificateTemplateCreateRequest,
    ) -> Result<CertificateTemplate, Error> {
        self.api.post(CERT_MANAGER_SERVICE, ROOT, req).await
    }

    pub async fn delete(&self, template_id: i64) -> Result<(), Error> {
        self.api
            .delete(CERT_MANAGER_SERVICE, &format!("{ROOT}/{template_id}"))
            .await
    }
}
