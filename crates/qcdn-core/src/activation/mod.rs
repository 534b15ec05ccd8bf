// Publish/activation workflow.
//
// Drives a site from "has a configuration revision" to "is live" and back:
// resolve the certificate, link it, publish, poll until the CDN leaves
// `Pending` acceptance, then classify the result. Every step is awaited in
// order; nothing here issues concurrent requests.

mod clock;

use std::fmt;
use std::time::Duration;

use qcdn_api::models::{PubOp, Target};
use tracing::{debug, info, warn};

pub use clock::{Clock, ManualClock, TokioClock};

use crate::config::ClientConfig;
use crate::error::CoreError;
use crate::facade::SiteFacade;

// ── Certificate source ───────────────────────────────────────────────

/// Where the certificate for an activation comes from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CertificateRef {
    /// Plain HTTP, nothing to link.
    #[default]
    None,
    /// An uploaded certificate.
    Certificate(i64),
    /// The latest certificate issued from a template.
    Template(i64),
}

impl CertificateRef {
    /// Build from the two optional ids; setting both is rejected.
    pub fn from_ids(
        certificate_id: Option<i64>,
        certificate_template_id: Option<i64>,
    ) -> Result<Self, CoreError> {
        match (certificate_id, certificate_template_id) {
            (Some(_), Some(_)) => Err(CoreError::MutuallyExclusive {
                first: "certificate_id",
                second: "certificate_template_id",
            }),
            (Some(id), None) => Ok(Self::Certificate(id)),
            (None, Some(id)) => Ok(Self::Template(id)),
            (None, None) => Ok(Self::None),
        }
    }

    pub fn certificate_id(self) -> Option<i64> {
        match self {
            Self::Certificate(id) => Some(id),
            _ => None,
        }
    }

    pub fn template_id(self) -> Option<i64> {
        match self {
            Self::Template(id) => Some(id),
            _ => None,
        }
    }
}

impl fmt::Display for CertificateRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("none"),
            Self::Certificate(id) => write!(f, "certificate {id}"),
            Self::Template(id) => write!(f, "template {id}"),
        }
    }
}

// ── Requests and policy ──────────────────────────────────────────────

/// Everything needed to publish one revision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivationRequest {
    pub site_id: String,
    pub revision_id: String,
    pub target: Target,
    pub certificate: CertificateRef,
}

/// Fixed-interval acceptance poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AcceptancePolicy {
    pub timeout: Duration,
    pub interval: Duration,
}

impl Default for AcceptancePolicy {
    fn default() -> Self {
        Self {
            timeout: ClientConfig::DEFAULT_ACCEPTANCE_TIMEOUT,
            interval: ClientConfig::DEFAULT_POLL_INTERVAL,
        }
    }
}

impl From<&ClientConfig> for AcceptancePolicy {
    fn from(config: &ClientConfig) -> Self {
        Self {
            timeout: config.acceptance_timeout,
            interval: config.poll_interval,
        }
    }
}

/// Fail on `Invalid`/`Dismissed` acceptance; pass anything else through.
pub fn classify_acceptance(site_id: &str, op: PubOp) -> Result<PubOp, CoreError> {
    if op.publish_acceptance_status.is_rejected() {
        return Err(CoreError::PublishRejected {
            site_id: site_id.to_owned(),
            publish_id: op.publish_id.clone(),
            acceptance_status: op.publish_acceptance_status.to_string(),
            details: op.validators_err_details_string(),
            status_line: op.status_line.join(","),
        });
    }
    Ok(op)
}

// ── Activator ────────────────────────────────────────────────────────

/// Runs the activation workflow against a [`SiteFacade`].
#[derive(Debug, Clone)]
pub struct Activator<C = TokioClock> {
    facade: SiteFacade,
    policy: AcceptancePolicy,
    clock: C,
}

impl Activator<TokioClock> {
    pub fn new(facade: SiteFacade, policy: AcceptancePolicy) -> Self {
        Self::with_clock(facade, policy, TokioClock)
    }
}

impl<C: Clock> Activator<C> {
    pub fn with_clock(facade: SiteFacade, policy: AcceptancePolicy, clock: C) -> Self {
        Self {
            facade,
            policy,
            clock,
        }
    }

    pub fn facade(&self) -> &SiteFacade {
        &self.facade
    }

    pub fn policy(&self) -> AcceptancePolicy {
        self.policy
    }

    // ── Certificates ─────────────────────────────────────────────────

    /// Turn a certificate source into a concrete certificate id.
    ///
    /// A template without an issued certificate is a precondition failure:
    /// auto-managed templates report the DNS records still to be created,
    /// others ask for an upload.
    pub async fn resolve_certificate(
        &self,
        certificate: CertificateRef,
    ) -> Result<Option<i64>, CoreError> {
        let template_id = match certificate {
            CertificateRef::None => return Ok(None),
            CertificateRef::Certificate(id) => return Ok(Some(id)),
            CertificateRef::Template(id) => id,
        };

        let template = self.facade.certificate_templates.get(template_id).await?;
        if let Some(cert_id) = template.last_certificate_id {
            debug!(template_id, cert_id, "template resolved to certificate");
            return Ok(Some(cert_id));
        }

        if !template.auto_managed_certificate_template {
            return Err(CoreError::TemplateMissingCertificate { template_id });
        }

        let delegations = match template.latest_csr_id() {
            Some(csr_id) => self.facade.csrs.challenge_delegations(csr_id).await?,
            None => Default::default(),
        };
        Err(CoreError::TemplatePendingVerification {
            template_id,
            delegations,
        })
    }

    /// Like [`resolve_certificate`](Self::resolve_certificate), but a
    /// template that never produced a certificate resolves to `None`: such
    /// a template cannot have been linked.
    async fn resolve_previous_certificate(
        &self,
        certificate: CertificateRef,
    ) -> Result<Option<i64>, CoreError> {
        match self.resolve_certificate(certificate).await {
            Err(
                CoreError::TemplatePendingVerification { .. }
                | CoreError::TemplateMissingCertificate { .. },
            ) => Ok(None),
            other => other,
        }
    }

    /// Make `cert_id` the only certificate linked to the site.
    ///
    /// The service supports a single certificate per site for now, so
    /// existing links are removed first.
    pub async fn link_certificate(&self, site_id: &str, cert_id: i64) -> Result<(), CoreError> {
        info!(site_id, cert_id, "linking certificate");
        self.facade
            .site_certificates
            .link(site_id, &cert_id.to_string())
            .await?;
        Ok(())
    }

    pub async fn unlink_certificate(&self, site_id: &str, cert_id: i64) -> Result<(), CoreError> {
        info!(site_id, cert_id, "unlinking certificate");
        self.facade
            .site_certificates
            .unlink(site_id, &cert_id.to_string())
            .await?;
        Ok(())
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Link the certificate (if any), publish, and wait for acceptance.
    ///
    /// Returns the accepted operation. `publish_status` is not awaited.
    pub async fn activate(&self, req: &ActivationRequest) -> Result<PubOp, CoreError> {
        let cert_id = self.resolve_certificate(req.certificate).await?;
        if let Some(cert_id) = cert_id {
            self.link_certificate(&req.site_id, cert_id).await?;
        }
        self.publish_and_wait(req).await
    }

    /// Re-publish with a possibly different certificate.
    ///
    /// Links are only touched when the resolved certificate changed: the
    /// old one is unlinked, then the new one linked.
    pub async fn update_activation(
        &self,
        previous: CertificateRef,
        req: &ActivationRequest,
    ) -> Result<PubOp, CoreError> {
        let old_id = self.resolve_previous_certificate(previous).await?;
        let new_id = self.resolve_certificate(req.certificate).await?;

        if old_id != new_id {
            if let Some(old_id) = old_id {
                self.unlink_certificate(&req.site_id, old_id).await?;
            }
            if let Some(new_id) = new_id {
                self.link_certificate(&req.site_id, new_id).await?;
            }
        }

        self.publish_and_wait(req).await
    }

    /// Unpublish, then unlink the certificate if one was associated.
    ///
    /// Unlike publishing, the unpublish operation is not polled for
    /// acceptance; the returned operation is whatever the service answered.
    pub async fn deactivate(
        &self,
        site_id: &str,
        target: Target,
        certificate_id: Option<i64>,
    ) -> Result<PubOp, CoreError> {
        info!(site_id, %target, "unpublishing site");
        let op = self.facade.publish_ops.unpublish(site_id, target).await?;

        if let Some(cert_id) = certificate_id {
            self.unlink_certificate(site_id, cert_id).await?;
        }
        Ok(op)
    }

    /// The in-progress or active operation for a revision, if any.
    pub async fn find_latest_pub_op(
        &self,
        site_id: &str,
        revision_id: &str,
    ) -> Result<Option<PubOp>, CoreError> {
        Ok(self
            .facade
            .publish_ops
            .find_latest(site_id, revision_id)
            .await?)
    }

    async fn publish_and_wait(&self, req: &ActivationRequest) -> Result<PubOp, CoreError> {
        info!(
            site_id = %req.site_id,
            revision_id = %req.revision_id,
            target = %req.target,
            "publishing revision"
        );
        let op = self
            .facade
            .publish_ops
            .publish(&req.site_id, &req.revision_id, req.target)
            .await?;

        let op = self.wait_for_acceptance(&req.site_id, &op.publish_id).await?;
        info!(
            site_id = %req.site_id,
            publish_id = %op.publish_id,
            acceptance = %op.publish_acceptance_status,
            "publish acceptance resolved"
        );
        classify_acceptance(&req.site_id, op)
    }

    /// Poll the operation until its acceptance status leaves `Pending`.
    ///
    /// Polls immediately, then every `policy.interval` while less than
    /// `policy.timeout` has elapsed. Fails with
    /// [`CoreError::AcceptanceTimeout`] once the deadline passes.
    pub async fn wait_for_acceptance(
        &self,
        site_id: &str,
        publish_id: &str,
    ) -> Result<PubOp, CoreError> {
        let start = self.clock.now();
        let mut polls = 0_u32;

        while self.clock.now().duration_since(start) < self.policy.timeout {
            let op = self.facade.publish_ops.get(site_id, publish_id).await?;
            polls += 1;
            if !op.publish_acceptance_status.is_pending() {
                debug!(site_id, publish_id, polls, "acceptance left Pending");
                return Ok(op);
            }
            self.clock.sleep(self.policy.interval).await;
        }

        let elapsed = self.clock.now().duration_since(start);
        warn!(site_id, publish_id, polls, ?elapsed, "timed out waiting for acceptance");
        Err(CoreError::AcceptanceTimeout {
            site_id: site_id.to_owned(),
            publish_id: publish_id.to_owned(),
            elapsed,
        })
    }
}
