// Site activation resource.
//
// A virtual entity: the publishing operation that made a revision live,
// plus the certificate linked for it. Identity is `site_id:publish_id`.

use qcdn_api::models::{OperationType, PubOp, Target};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::activation::{ActivationRequest, Activator, CertificateRef, Clock, TokioClock};
use crate::error::CoreError;
use crate::import_id::{ImportId, compose};

const IMPORT_FORMAT: &str = "site_id:publish_id OR site_id";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteActivationState {
    /// `site_id:publish_id`
    pub id: String,
    pub site_id: String,
    pub revision_id: String,
    pub publish_id: String,
    pub certificate_id: Option<i64>,
    pub certificate_template_id: Option<i64>,
    pub target: String,
    pub owner_org_id: String,
    pub creation_time_milli: i64,
    pub last_update_time_milli: i64,
    pub username: String,
    pub publish_state: String,
    pub publish_status: String,
    pub publish_acceptance_status: String,
    pub operation_type: String,
    pub is_active: bool,
    pub validators_err_details: String,
}

impl SiteActivationState {
    fn from_op(site_id: &str, op: PubOp, certificate: CertificateRef) -> Self {
        Self {
            id: compose(site_id, &op.publish_id),
            site_id: site_id.to_owned(),
            revision_id: op.revision_id.clone(),
            certificate_id: certificate.certificate_id(),
            certificate_template_id: certificate.template_id(),
            target: op.target.clone(),
            owner_org_id: op.owner_org_id.clone(),
            creation_time_milli: op.creation_time_milli,
            last_update_time_milli: op.last_update_time_milli,
            username: op.username.clone(),
            publish_state: op.publish_state.clone(),
            publish_status: op.publish_status.to_string(),
            publish_acceptance_status: op.publish_acceptance_status.to_string(),
            operation_type: op.operation_type.to_string(),
            is_active: op.is_active,
            validators_err_details: op.validators_err_details_string(),
            publish_id: op.publish_id,
        }
    }

    fn certificate_ref(&self) -> Result<CertificateRef, CoreError> {
        CertificateRef::from_ids(self.certificate_id, self.certificate_template_id)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteActivationPlan {
    pub site_id: String,
    pub revision_id: String,
    pub certificate_id: Option<i64>,
    pub certificate_template_id: Option<i64>,
}

impl SiteActivationPlan {
    fn request(&self, target: Target) -> Result<ActivationRequest, CoreError> {
        Ok(ActivationRequest {
            site_id: self.site_id.clone(),
            revision_id: self.revision_id.clone(),
            target,
            certificate: CertificateRef::from_ids(
                self.certificate_id,
                self.certificate_template_id,
            )?,
        })
    }
}

/// Activation lifecycle bound to one target (`ga` or `staging`).
#[derive(Debug, Clone)]
pub struct SiteActivationResource<C = TokioClock> {
    activator: Activator<C>,
    target: Target,
}

impl<C: Clock> SiteActivationResource<C> {
    pub fn new(activator: Activator<C>, target: Target) -> Self {
        Self { activator, target }
    }

    pub fn target(&self) -> Target {
        self.target
    }

    pub async fn create(&self, plan: &SiteActivationPlan) -> Result<SiteActivationState, CoreError> {
        let req = plan.request(self.target)?;
        let op = self.activator.activate(&req).await?;
        Ok(SiteActivationState::from_op(&plan.site_id, op, req.certificate))
    }

    /// Refresh from the publishing operation and the site's linked
    /// certificate. A certificate issued from an auto-managed CSR is
    /// reported as its template.
    pub async fn read(&self, state: &SiteActivationState) -> Result<SiteActivationState, CoreError> {
        let facade = self.activator.facade();
        let op = facade.publish_ops.get(&state.site_id, &state.publish_id).await?;
        let certificate = self.linked_certificate(&state.site_id).await?;
        Ok(SiteActivationState::from_op(&state.site_id, op, certificate))
    }

    async fn linked_certificate(&self, site_id: &str) -> Result<CertificateRef, CoreError> {
        let facade = self.activator.facade();
        let links = facade.site_certificates.list(site_id, None).await?;
        let Some(link) = links.first() else {
            return Ok(CertificateRef::None);
        };

        let cert_id = parse_id("certificate id", &link.certificate_id)?;
        let cert = facade.certificates.get(cert_id, false).await?;
        let Some(csr_id) = cert.csr_id.as_deref() else {
            return Ok(CertificateRef::Certificate(cert_id));
        };

        let csr = facade.csrs.get(parse_id("CSR id", csr_id)?).await?;
        if csr.auto_managed_csr {
            let template_id = parse_id("certificate template id", &csr.certificate_template_id_ref)?;
            debug!(site_id, cert_id, template_id, "certificate comes from auto-managed template");
            return Ok(CertificateRef::Template(template_id));
        }
        Ok(CertificateRef::Certificate(cert_id))
    }

    pub async fn update(
        &self,
        state: &SiteActivationState,
        plan: &SiteActivationPlan,
    ) -> Result<SiteActivationState, CoreError> {
        let req = plan.request(self.target)?;
        let op = self
            .activator
            .update_activation(state.certificate_ref()?, &req)
            .await?;
        Ok(SiteActivationState::from_op(&plan.site_id, op, req.certificate))
    }

    /// Deleting an activation unpublishes the site.
    ///
    /// The unpublish is not awaited for acceptance. Only an explicit
    /// `certificate_id` is unlinked: a certificate issued from the state's
    /// template stays linked to the site.
    pub async fn delete(&self, state: &SiteActivationState) -> Result<PubOp, CoreError> {
        info!(id = %state.id, publish_status = %state.publish_status, "deleting activation");
        self.activator
            .deactivate(&state.site_id, self.target, state.certificate_id)
            .await
    }

    /// Import `site_id:publish_id`, or `site_id` alone to take the active
    /// operation, else the last one, skipping unpublish operations.
    pub async fn import(&self, id: &str) -> Result<SiteActivationState, CoreError> {
        let import = ImportId::parse(id, IMPORT_FORMAT)?;
        let site_id = import.primary().to_owned();
        let publish_id = match import.secondary() {
            Some(publish_id) => publish_id.to_owned(),
            None => self.implicit_publish_id(&site_id).await?,
        };
        info!(site_id, publish_id, "importing site activation");

        let state = SiteActivationState {
            site_id,
            publish_id,
            ..SiteActivationState::default()
        };
        self.read(&state).await
    }

    async fn implicit_publish_id(&self, site_id: &str) -> Result<String, CoreError> {
        let site = self
            .activator
            .facade()
            .sites
            .get(site_id, Some(self.target), true, false)
            .await?;

        site.active_and_last_publishing_operation
            .and_then(|ops| {
                [ops.active, ops.last]
                    .into_iter()
                    .flatten()
                    .find(|op| op.operation_type != OperationType::Unpublish)
            })
            .map(|op| op.publish_id)
            .ok_or_else(|| CoreError::NotFound {
                message: format!("site {site_id} has no publishing operation to import"),
            })
    }
}

fn parse_id(what: &str, raw: &str) -> Result<i64, CoreError> {
    raw.parse().map_err(|e| CoreError::Internal(format!("invalid {what} {raw:?}: {e}")))
}
