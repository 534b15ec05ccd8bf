// Site configuration sub-client: `/api/1/sites/{id}/configurations`.

use crate::client::ApiClient;
use crate::endpoint::SITES_SERVICE;
use crate::error::{Error, require};
use crate::models::{SiteConfigAddRequest, SiteConfigVersion};

#[derive(Debug, Clone)]
pub struct SiteConfigurationClient {
    api: ApiClient,
}

fn truncate_params(truncate_host_index: bool) -> Vec<(&'static str, String)> {
    if truncate_host_index {
        vec![("truncateHostIndex", "true".into())]
    } else {
        Vec::new()
    }
}

impl SiteConfigurationClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// All revisions of a site, oldest first as returned by the service.
    pub async fn list(
        &self,
        site_id: &str,
        truncate_host_index: bool,
    ) -> Result<Vec<SiteConfigVersion>, Error> {
        require(&[("siteId", site_id)])?;
        self.api
            .get_with_params(
                SITES_SERVICE,
                &format!("/api/1/sites/{site_id}/configurations"),
                &truncate_params(truncate_host_index),
            )
            .await
    }

    pub async fn get(
        &self,
        site_id: &str,
        revision_id: &str,
        truncate_host_index: bool,
    ) -> Result<SiteConfigVersion, Error> {
        require(&[("siteId", site_id), ("revisionId", revision_id)])?;
        self.api
            .get_with_params(
                SITES_SERVICE,
                &format!("/api/1/sites/{site_id}/configurations/{revision_id}"),
                &truncate_params(truncate_host_index),
            )
            .await
    }

    /// Append a new revision. Revisions are never mutated.
    pub async fn create(
        &self,
        site_id: &str,
        req: &SiteConfigAddRequest,
    ) -> Result<SiteConfigVersion, Error> {
        require(&[("siteId", site_id)])?;
        self.api
            .post(
                SITES_SERVICE,
                &format!("/api/1/sites/{site_id}/configurations"),
                req,
            )
            .await
    }
}
