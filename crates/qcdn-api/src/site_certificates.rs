// Site ↔ certificate links: `/api/v2/sites/{id}/certificates`.

use tracing::debug;

use crate::client::ApiClient;
use crate::endpoint::SITES_SERVICE;
use crate::error::{Error, require};
use crate::models::{SiteCertificate, SiteCertificateLinkRequest};

#[derive(Debug, Clone)]
pub struct SiteCertificatesClient {
    api: ApiClient,
}

impl SiteCertificatesClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Certificates linked to a site, optionally as of a given revision.
    pub async fn list(
        &self,
        site_id: &str,
        revision_id: Option<&str>,
    ) -> Result<Vec<SiteCertificate>, Error> {
        require(&[("siteId", site_id)])?;
        let params: Vec<(&str, String)> = revision_id
            .filter(|r| !r.is_empty())
            .map(|r| vec![("siteRevisionId", r.to_owned())])
            .unwrap_or_default();
        self.api
            .get_with_params(
                SITES_SERVICE,
                &format!("/api/v2/sites/{site_id}/certificates"),
                &params,
            )
            .await
    }

    /// Link `cert_id` to a site, replacing whatever is linked now.
    ///
    /// The service currently supports a single certificate per site, so
    /// every existing link is removed first. Linking the same certificate
    /// twice therefore leaves exactly one link.
    pub async fn link(
        &self,
        site_id: &str,
        cert_id: &str,
    ) -> Result<Option<SiteCertificate>, Error> {
        require(&[("siteId", site_id), ("certId", cert_id)])?;

        for existing in self.list(site_id, None).await? {
            debug!(site_id, cert_id = %existing.certificate_id, "unlinking existing certificate");
            self.unlink(site_id, &existing.certificate_id).await?;
        }

        let req = SiteCertificateLinkRequest {
            certificate_id: cert_id.to_owned(),
        };
        let linked: Vec<SiteCertificate> = self
            .api
            .post(
                SITES_SERVICE,
                &format!("/api/v2/sites/{site_id}/certificates"),
                &req,
            )
            .await?;
        Ok(linked.into_iter().next())
    }

    /// Remove one link. Not idempotent: unlinking twice is up to the service.
    pub async fn unlink(&self, site_id: &str, cert_id: &str) -> Result<(), Error> {
        require(&[("siteId", site_id), ("certId", cert_id)])?;
        self.api
            .delete(
                SITES_SERVICE,
                &format!("/api/v2/sites/{site_id}/certificates/{cert_id}"),
            )
            .await
    }
}
