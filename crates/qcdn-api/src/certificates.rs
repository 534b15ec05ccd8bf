// Certificates sub-client: `/api/v2/certificates` on cert-manager.

use crate::client::ApiClient;
use crate::endpoint::CERT_MANAGER_SERVICE;
use crate::error::Error;
use crate::models::{Certificate, CertificateRequest};

#[derive(Debug, Clone)]
pub struct CertificatesClient {
    api: ApiClient,
}

fn detailed_params(detailed: bool) -> Vec<(&'static str, String)> {
    if detailed {
        vec![("detailed", "true".into())]
    } else {
        Vec::new()
    }
}

impl CertificatesClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn list(&self, detailed: bool) -> Result<Vec<Certificate>, Error> {
        self.api
            .get_with_params(
                CERT_MANAGER_SERVICE,
                "/api/v2/certificates",
                &detailed_params(detailed),
            )
            .await
    }

    pub async fn get(&self, cert_id: i64, detailed: bool) -> Result<Certificate, Error> {
        self.api
            .get_with_params(
                CERT_MANAGER_SERVICE,
                &format!("/api/v2/certificates/{cert_id}"),
                &detailed_params(detailed),
            )
            .await
    }

    pub async fn create(&self, req: &CertificateRequest) -> Result<Certificate, Error> {
        self.api
            .post(CERT_MANAGER_SERVICE, "/api/v2/certificates", req)
            .await
    }

    /// Replace the certificate material in place.
    pub async fn update(&self, cert_id: i64, req: &CertificateRequest) -> Result<Certificate, Error> {
        self.api
            .put(
                CERT_MANAGER_SERVICE,
                &format!("/api/v2/certificates/{cert_id}"),
                req,
            )
            .await
    }

    pub async fn delete(&self, cert_id: i64) -> Result<(), Error> {
        self.api
            .delete(
                CERT_MANAGER_SERVICE,
                &format!("/api/v2/certificates/{cert_id}"),
            )
            .await
    }
}
