// Site configuration resource.
//
// Revisions are append-only: "update" creates a new revision and "delete"
// only forgets the state. The host index is compared semantically so that
// reformatting the JSON never produces a new revision.

use qcdn_api::models::{SiteConfigAddRequest, SiteConfigVersion, Target};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::CoreError;
use crate::facade::SiteFacade;
use crate::host_index;
use crate::import_id::{ImportId, compose};

const IMPORT_FORMAT: &str = "site_id:revision_id OR site_id";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteConfigState {
    /// `site_id:revision_id`
    pub id: String,
    pub site_id: String,
    pub revision_id: String,
    pub revision_num: i64,
    pub owner_org_id: String,
    pub host_index: String,
    pub change_description: String,
    pub last_update_time_milli: i64,
}

impl SiteConfigState {
    fn from_version(
        site_id: &str,
        version: SiteConfigVersion,
        host_index: String,
    ) -> Self {
        Self {
            id: compose(site_id, &version.revision_id),
            site_id: site_id.to_owned(),
            revision_id: version.revision_id,
            revision_num: version.revision_num,
            owner_org_id: version.owner_org_id,
            host_index,
            change_description: version.change_description,
            last_update_time_milli: version.last_update_time_milli,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteConfigPlan {
    pub site_id: String,
    /// Host index document as JSON text.
    pub host_index: String,
    pub change_description: String,
}

#[derive(Debug, Clone)]
pub struct SiteConfigResource {
    facade: SiteFacade,
}

impl SiteConfigResource {
    pub fn new(facade: SiteFacade) -> Self {
        Self { facade }
    }

    pub async fn create(&self, plan: &SiteConfigPlan) -> Result<SiteConfigState, CoreError> {
        let req = SiteConfigAddRequest {
            host_index: host_index::parse(&plan.host_index)?,
            change_description: plan.change_description.clone(),
        };
        let version = self.facade.site_configs.create(&plan.site_id, &req).await?;
        info!(
            site_id = %plan.site_id,
            revision_id = %version.revision_id,
            revision_num = version.revision_num,
            "created site configuration revision"
        );
        Ok(SiteConfigState::from_version(
            &plan.site_id,
            version,
            plan.host_index.clone(),
        ))
    }

    /// Refresh from the service, keeping the stored host index text when it
    /// is semantically unchanged.
    pub async fn read(&self, state: &SiteConfigState) -> Result<SiteConfigState, CoreError> {
        let version = self
            .facade
            .site_configs
            .get(&state.site_id, &state.revision_id, false)
            .await?;
        let previous = (!state.host_index.is_empty()).then_some(state.host_index.as_str());
        let host_index = host_index::reconcile(previous, &version.host_index)?;
        Ok(SiteConfigState::from_version(
            &state.site_id,
            version,
            host_index,
        ))
    }

    /// Create a new revision unless nothing meaningful changed.
    pub async fn update(
        &self,
        state: &SiteConfigState,
        plan: &SiteConfigPlan,
    ) -> Result<SiteConfigState, CoreError> {
        if plan.site_id == state.site_id
            && plan.change_description == state.change_description
            && host_index::semantically_equal(&plan.host_index, &state.host_index)
        {
            debug!(id = %state.id, "host index unchanged; keeping revision");
            return Ok(state.clone());
        }
        self.create(plan).await
    }

    /// Revisions cannot be deleted; the state is simply dropped.
    pub fn delete(&self, state: &SiteConfigState) {
        info!(id = %state.id, "site configuration revisions are immutable; nothing deleted");
    }

    /// Import `site_id:revision_id`, or `site_id` alone to take the active
    /// revision, else the last published one, else the highest revision.
    pub async fn import(&self, id: &str) -> Result<SiteConfigState, CoreError> {
        let import = ImportId::parse(id, IMPORT_FORMAT)?;
        let site_id = import.primary().to_owned();
        let revision_id = match import.secondary() {
            Some(revision_id) => revision_id.to_owned(),
            None => self.implicit_revision(&site_id).await?,
        };
        info!(site_id, revision_id, "importing site configuration");

        let state = SiteConfigState {
            site_id,
            revision_id,
            ..SiteConfigState::default()
        };
        self.read(&state).await
    }

    async fn implicit_revision(&self, site_id: &str) -> Result<String, CoreError> {
        let site = self
            .facade
            .sites
            .get(site_id, Some(Target::Ga), true, false)
            .await?;

        if let Some(ops) = site.active_and_last_publishing_operation {
            let from_ops = [ops.active, ops.last]
                .into_iter()
                .flatten()
                .map(|op| op.revision_id)
                .find(|r| !r.is_empty());
            if let Some(revision_id) = from_ops {
                return Ok(revision_id);
            }
        }

        debug!(site_id, "no publish history; using highest revision number");
        let versions = self.facade.site_configs.list(site_id, true).await?;
        versions
            .into_iter()
            .max_by_key(|v| v.revision_num)
            .map(|v| v.revision_id)
            .ok_or_else(|| CoreError::NotFound {
                message: format!("site {site_id} has no configuration revisions"),
            })
    }
}
