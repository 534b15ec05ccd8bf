// Sites sub-client: `/api/v2/sites` on the media-sites service.

use std::time::{SystemTime, UNIX_EPOCH};

use tracing::debug;

use crate::client::ApiClient;
use crate::endpoint::SITES_SERVICE;
use crate::error::{Error, require};
use crate::models::{Site, SiteCreateRequest, SiteUpdateRequest, Target};

#[derive(Debug, Clone)]
pub struct SitesClient {
    api: ApiClient,
}

impl SitesClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// List sites, dropping soft-deleted ones unless `include_deleted`.
    pub async fn list(
        &self,
        include_publish_details: bool,
        include_deleted: bool,
    ) -> Result<Vec<Site>, Error> {
        let params: Vec<(&str, String)> = if include_publish_details {
            vec![("includePublishDetails", "true".into())]
        } else {
            Vec::new()
        };

        let sites: Vec<Site> = self
            .api
            .get_with_params(SITES_SERVICE, "/api/v2/sites", &params)
            .await?;

        if include_deleted {
            return Ok(sites);
        }
        Ok(sites.into_iter().filter(|s| !s.is_deleted).collect())
    }

    /// Fetch one site.
    ///
    /// With `include_publish_details` the active and last publishing
    /// operations for `target` (default `ga`) are embedded. A soft-deleted
    /// site is an error unless `include_deleted`.
    pub async fn get(
        &self,
        site_id: &str,
        target: Option<Target>,
        include_publish_details: bool,
        include_deleted: bool,
    ) -> Result<Site, Error> {
        require(&[("siteId", site_id)])?;

        let mut params: Vec<(&str, String)> = Vec::new();
        if include_publish_details {
            params.push(("includePublishDetails", "true".into()));
            params.push(("publishTarget", target.unwrap_or_default().to_string()));
        } else if let Some(target) = target {
            params.push(("publishTarget", target.to_string()));
        }

        let site: Site = self
            .api
            .get_with_params(SITES_SERVICE, &format!("/api/v2/sites/{site_id}"), &params)
            .await?;

        if !include_deleted && site.is_deleted {
            return Err(Error::SiteDeleted {
                site_id: site_id.to_owned(),
            });
        }
        Ok(site)
    }

    pub async fn create(&self, req: &SiteCreateRequest) -> Result<Site, Error> {
        self.api.post(SITES_SERVICE, "/api/v2/sites", req).await
    }

    /// Rename a site. The routing method cannot be changed.
    pub async fn update(&self, site_id: &str, req: &SiteUpdateRequest) -> Result<Site, Error> {
        require(&[("siteId", site_id)])?;
        self.api
            .put(SITES_SERVICE, &format!("/api/v2/sites/{site_id}"), req)
            .await
    }

    /// Mark a site deleted server-side.
    pub async fn delete(&self, site_id: &str) -> Result<(), Error> {
        require(&[("siteId", site_id)])?;
        self.api
            .delete_with_params(
                SITES_SERVICE,
                &format!("/api/v2/sites/{site_id}"),
                &[("permanent", "true".into())],
            )
            .await
    }

    /// Delete a site and rename it to `"{name} DELETED {unix_nanos}"` so the
    /// name can be reused.
    pub async fn delete_and_rename(&self, site_id: &str, site_name: &str) -> Result<(), Error> {
        require(&[("siteId", site_id), ("siteName", site_name)])?;

        self.delete(site_id).await?;

        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or_default();
        let req = SiteUpdateRequest {
            site_name: deleted_site_name(site_name, nanos),
        };
        debug!(site_id, new_name = %req.site_name, "renaming deleted site");
        self.update(site_id, &req).await?;
        Ok(())
    }
}

pub(crate) fn deleted_site_name(site_name: &str, unix_nanos: u128) -> String {
    format!("{site_name} DELETED {unix_nanos}")
}
