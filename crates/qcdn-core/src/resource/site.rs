// Site resource.

use qcdn_api::models::{Site, SiteCreateRequest, SiteUpdateRequest};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::CoreError;
use crate::facade::SiteFacade;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteState {
    pub id: String,
    pub site_id: String,
    pub owner_org_id: String,
    pub site_dns_cname_delegation_target: String,
    pub site_name: String,
    pub routing_method: String,
    pub last_update_time_milli: i64,
}

impl From<Site> for SiteState {
    fn from(site: Site) -> Self {
        Self {
            id: site.site_id.clone(),
            site_id: site.site_id,
            owner_org_id: site.owner_org_id,
            site_dns_cname_delegation_target: site.site_dns_cname_delegation_target,
            site_name: site.site_name,
            routing_method: site.routing_method,
            last_update_time_milli: site.last_update_time_milli,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SitePlan {
    pub site_name: String,
    /// Fixed at creation; the service picks one when unset.
    pub routing_method: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SiteResource {
    facade: SiteFacade,
}

impl SiteResource {
    pub fn new(facade: SiteFacade) -> Self {
        Self { facade }
    }

    pub async fn create(&self, plan: &SitePlan) -> Result<SiteState, CoreError> {
        info!(site_name = %plan.site_name, "creating site");
        let req = SiteCreateRequest {
            site_name: plan.site_name.clone(),
            routing_method: plan.routing_method.clone().filter(|m| !m.is_empty()),
        };
        let site = self.facade.sites.create(&req).await?;
        Ok(site.into())
    }

    pub async fn read(&self, state: &SiteState) -> Result<SiteState, CoreError> {
        self.import(&state.site_id).await
    }

    /// Rename the site. Changing the routing method is rejected.
    pub async fn update(&self, state: &SiteState, plan: &SitePlan) -> Result<SiteState, CoreError> {
        if let Some(method) = plan.routing_method.as_deref() {
            if !method.is_empty() && method != state.routing_method {
                return Err(CoreError::InvalidInput {
                    message: format!(
                        "routing_method cannot be changed from {:?} to {method:?}; recreate the site",
                        state.routing_method
                    ),
                });
            }
        }

        let req = SiteUpdateRequest {
            site_name: plan.site_name.clone(),
        };
        let site = self.facade.sites.update(&state.site_id, &req).await?;

        // The service may report a routing-method override; keep ours.
        let mut updated = SiteState::from(site);
        updated.routing_method.clone_from(&state.routing_method);
        Ok(updated)
    }

    /// Sites are only marked deleted server-side, so the name is released
    /// by renaming the site afterwards.
    pub async fn delete(&self, state: &SiteState) -> Result<(), CoreError> {
        info!(site_id = %state.site_id, "deleting site");
        self.facade
            .sites
            .delete_and_rename(&state.site_id, &state.site_name)
            .await?;
        Ok(())
    }

    pub async fn import(&self, site_id: &str) -> Result<SiteState, CoreError> {
        let site = self.facade.sites.get(site_id, None, false, false).await?;
        Ok(site.into())
    }
}
