// Certificate resource.
//
// The API never returns the private key, so the value from the previous
// state is carried through reads.

use std::fmt;

use qcdn_api::models::{Certificate, CertificateRequest};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::CoreError;
use crate::facade::SiteFacade;

#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateState {
    pub cert_id: i64,
    pub certificate: String,
    pub certificate_chain: String,
    pub private_key: String,
    pub description: String,
    pub pk_hash: String,
    pub tenant: String,
    pub domain: String,
    pub status: String,
    #[serde(rename = "type")]
    pub cert_type: String,
}

impl CertificateState {
    fn from_api(cert: Certificate, private_key: String) -> Self {
        Self {
            cert_id: cert.cert_id,
            certificate: cert.certificate,
            certificate_chain: cert.certificate_chain,
            private_key,
            description: cert.description,
            pk_hash: cert.pk_hash,
            tenant: cert.tenant,
            domain: cert.domain,
            status: cert.status.to_string(),
            cert_type: cert.cert_type,
        }
    }
}

impl fmt::Debug for CertificateState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CertificateState")
            .field("cert_id", &self.cert_id)
            .field("domain", &self.domain)
            .field("status", &self.status)
            .field("private_key", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificatePlan {
    pub certificate: String,
    pub certificate_chain: String,
    pub private_key: String,
    pub description: String,
}

impl fmt::Debug for CertificatePlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CertificatePlan")
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

impl From<&CertificatePlan> for CertificateRequest {
    fn from(plan: &CertificatePlan) -> Self {
        Self {
            certificate: plan.certificate.clone(),
            certificate_chain: plan.certificate_chain.clone(),
            private_key: plan.private_key.clone(),
            description: plan.description.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CertificateResource {
    facade: SiteFacade,
}

impl CertificateResource {
    pub fn new(facade: SiteFacade) -> Self {
        Self { facade }
    }

    pub async fn create(&self, plan: &CertificatePlan) -> Result<CertificateState, CoreError> {
        let cert = self.facade.certificates.create(&plan.into()).await?;
        info!(cert_id = cert.cert_id, domain = %cert.domain, "uploaded certificate");
        Ok(CertificateState::from_api(cert, plan.private_key.clone()))
    }

    pub async fn read(&self, state: &CertificateState) -> Result<CertificateState, CoreError> {
        let cert = self.facade.certificates.get(state.cert_id, true).await?;
        Ok(CertificateState::from_api(cert, state.private_key.clone()))
    }

    /// Replace the certificate material in place.
    pub async fn update(
        &self,
        state: &CertificateState,
        plan: &CertificatePlan,
    ) -> Result<CertificateState, CoreError> {
        let cert = self
            .facade
            .certificates
            .update(state.cert_id, &plan.into())
            .await?;
        Ok(CertificateState::from_api(cert, plan.private_key.clone()))
    }

    pub async fn delete(&self, state: &CertificateState) -> Result<(), CoreError> {
        info!(cert_id = state.cert_id, "deleting certificate");
        self.facade.certificates.delete(state.cert_id).await?;
        Ok(())
    }

    /// Import by certificate id. The private key stays empty.
    pub async fn import(&self, id: &str) -> Result<CertificateState, CoreError> {
        let cert_id = parse_numeric_id(id, "cert_id")?;
        let cert = self.facade.certificates.get(cert_id, true).await?;
        Ok(CertificateState::from_api(cert, String::new()))
    }
}

pub(crate) fn parse_numeric_id(id: &str, expected: &'static str) -> Result<i64, CoreError> {
    id.trim().parse().map_err(|_| CoreError::InvalidImportId {
        id: id.to_owned(),
        expected,
    })
}
