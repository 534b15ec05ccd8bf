// Publishing operations: `/api/v2/sites/{id}/publishing-operations`.
//
// Only single requests live here. The acceptance polling loop is in
// `qcdn-core` so it can run against an injectable clock.

use serde::Serialize;

use crate::client::ApiClient;
use crate::endpoint::SITES_SERVICE;
use crate::error::{Error, require};
use crate::models::{PubOp, PubRequest, Target, TargetRequest};

/// Publish state of a site derived from its operation history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SitePublishState {
    /// `Published`, or `Unpublished` when nothing is active.
    pub current: String,
    /// `Publishing`/`Unpublishing` while an operation runs, else `current`.
    pub transition: String,
}

impl SitePublishState {
    pub fn from_ops(ops: &[PubOp]) -> Self {
        let mut current = "Unpublished".to_owned();
        let mut transition = None;

        for op in ops {
            if op.is_active {
                current = format!("{}ed", op.operation_type);
            }
            if op.is_in_progress() {
                transition = Some(format!("{}ing", op.operation_type));
            }
        }

        let transition = transition.unwrap_or_else(|| current.clone());
        Self {
            current,
            transition,
        }
    }
}

/// Pick the operation that best represents `revision_id`.
///
/// An `InProgress` match wins immediately; otherwise the last `is_active`
/// match is returned. `None` when nothing matches.
pub fn select_latest_pub_op<'a>(ops: &'a [PubOp], revision_id: &str) -> Option<&'a PubOp> {
    let mut active = None;
    for op in ops.iter().filter(|op| op.revision_id == revision_id) {
        if op.is_in_progress() {
            return Some(op);
        }
        if op.is_active {
            active = Some(op);
        }
    }
    active
}

#[derive(Debug, Clone)]
pub struct PublishOpsClient {
    api: ApiClient,
}

impl PublishOpsClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    fn root(site_id: &str) -> String {
        format!("/api/v2/sites/{site_id}/publishing-operations")
    }

    /// List a site's operations, optionally only active ones or only those
    /// in `publish_state`.
    pub async fn list(
        &self,
        site_id: &str,
        is_active: bool,
        publish_state: Option<&str>,
    ) -> Result<Vec<PubOp>, Error> {
        require(&[("siteId", site_id)])?;

        let mut params: Vec<(&str, String)> = Vec::new();
        if is_active {
            params.push(("isActive", "isActive".into()));
        }
        if let Some(state) = publish_state.filter(|s| !s.is_empty()) {
            params.push(("publishState", state.to_owned()));
        }

        self.api
            .get_with_params(SITES_SERVICE, &Self::root(site_id), &params)
            .await
    }

    pub async fn get(&self, site_id: &str, publish_id: &str) -> Result<PubOp, Error> {
        require(&[("siteId", site_id), ("publishId", publish_id)])?;
        self.api
            .get(
                SITES_SERVICE,
                &format!("{}/{publish_id}", Self::root(site_id)),
            )
            .await
    }

    /// The in-progress or active operation for `revision_id`, if any.
    pub async fn find_latest(
        &self,
        site_id: &str,
        revision_id: &str,
    ) -> Result<Option<PubOp>, Error> {
        require(&[("siteId", site_id), ("revisionId", revision_id)])?;
        let ops = self.list(site_id, false, None).await?;
        Ok(select_latest_pub_op(&ops, revision_id).cloned())
    }

    pub async fn site_publish_status(&self, site_id: &str) -> Result<SitePublishState, Error> {
        let ops = self.list(site_id, false, None).await?;
        Ok(SitePublishState::from_ops(&ops))
    }

    pub async fn publish(
        &self,
        site_id: &str,
        revision_id: &str,
        target: Target,
    ) -> Result<PubOp, Error> {
        require(&[("siteId", site_id), ("revisionId", revision_id)])?;
        let req = PubRequest {
            revision_id: revision_id.to_owned(),
            target,
        };
        self.api
            .post(SITES_SERVICE, &Self::root(site_id), &req)
            .await
    }

    pub async fn unpublish(&self, site_id: &str, target: Target) -> Result<PubOp, Error> {
        require(&[("siteId", site_id)])?;
        self.api
            .post(
                SITES_SERVICE,
                &format!("{}/actions/un-publish", Self::root(site_id)),
                &TargetRequest { target },
            )
            .await
    }

    /// Publish the currently active revision again.
    pub async fn republish(&self, site_id: &str, target: Target) -> Result<PubOp, Error> {
        require(&[("siteId", site_id)])?;
        self.api
            .post(
                SITES_SERVICE,
                &format!("{}/actions/republish", Self::root(site_id)),
                &TargetRequest { target },
            )
            .await
    }

    pub async fn cancel(&self, site_id: &str, publish_id: &str) -> Result<(), Error> {
        require(&[("siteId", site_id), ("publishId", publish_id)])?;
        self.api
            .post_no_response(
                SITES_SERVICE,
                &format!("{}/{publish_id}/actions/cancel", Self::root(site_id)),
            )
            .await
    }
}
