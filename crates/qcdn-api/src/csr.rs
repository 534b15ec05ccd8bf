// Certificate signing requests: `/api/v2/certificate-signing-requests`.

use crate::client::ApiClient;
use crate::endpoint::CERT_MANAGER_SERVICE;
use crate::error::Error;
use crate::models::{CertificateSigningRequest, ChallengeDelegations};

#[derive(Debug, Clone)]
pub struct CertificateSigningRequestClient {
    api: ApiClient,
}

impl CertificateSigningRequestClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn get(&self, csr_id: i64) -> Result<CertificateSigningRequest, Error> {
        self.api
            .get(
                CERT_MANAGER_SERVICE,
                &format!("/api/v2/certificate-signing-requests/{csr_id}"),
            )
            .await
    }

    /// DNS records the customer must publish before the CSR can be signed.
    pub async fn challenge_delegations(&self, csr_id: i64) -> Result<ChallengeDelegations, Error> {
        let csr = self.get(csr_id).await?;
        Ok(ChallengeDelegations::from(&csr))
    }
}
