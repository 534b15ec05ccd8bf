// Wire types for the Qwilt CDN REST APIs.
//
// Field names follow the JSON bodies exactly (camelCase, with a few
// exceptions noted inline). Every response struct is `#[serde(default)]`
// so that missing or null fields never fail a read.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use strum::{Display, EnumString};

/// Treat an explicit JSON `null` the same as an absent field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ── Status axes ──────────────────────────────────────────────────────

/// Deployment target of a publishing operation.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Target {
    #[default]
    Ga,
    Staging,
}

/// Execution progress of an accepted publishing operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display)]
pub enum PublishStatus {
    InProgress,
    Success,
    Failed,
    Aborted,
    #[default]
    #[serde(other)]
    Unknown,
}

/// Whether the CDN accepted a publishing operation for execution.
///
/// Leaves `Pending` exactly once per operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display)]
pub enum AcceptanceStatus {
    Pending,
    Accepted,
    Invalid,
    Dismissed,
    Aborted,
    #[default]
    #[serde(other)]
    Unknown,
}

impl AcceptanceStatus {
    pub fn is_pending(self) -> bool {
        self == Self::Pending
    }

    /// `Invalid` and `Dismissed` mean the operation will never run.
    pub fn is_rejected(self) -> bool {
        matches!(self, Self::Invalid | Self::Dismissed)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display)]
pub enum OperationType {
    Publish,
    Unpublish,
    #[default]
    #[serde(other)]
    Unknown,
}

/// Lifecycle status of an uploaded certificate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum CertificateStatus {
    Issued,
    Active,
    Expired,
    Revoked,
    #[default]
    #[serde(other)]
    Unknown,
}

// ── Publishing operations ────────────────────────────────────────────

/// One publish or unpublish attempt.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PubOp {
    #[serde(deserialize_with = "null_as_default")]
    pub publish_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub creation_time_milli: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub owner_org_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub last_update_time_milli: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub revision_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub target: String,
    #[serde(deserialize_with = "null_as_default")]
    pub username: String,
    #[serde(deserialize_with = "null_as_default")]
    pub publish_state: String,
    #[serde(deserialize_with = "null_as_default")]
    pub publish_status: PublishStatus,
    #[serde(deserialize_with = "null_as_default")]
    pub publish_acceptance_status: AcceptanceStatus,
    #[serde(deserialize_with = "null_as_default")]
    pub publish_hidden: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub publish_mode: String,
    #[serde(deserialize_with = "null_as_default")]
    pub operation_type: OperationType,
    #[serde(deserialize_with = "null_as_default")]
    pub status_line: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub config_last_modified_time_milli: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub is_active: bool,
    /// Opaque validator output, present when acceptance failed.
    pub validators_err_details: Option<serde_json::Value>,
}

impl PubOp {
    pub fn is_in_progress(&self) -> bool {
        self.publish_status == PublishStatus::InProgress
    }

    /// Validator details rendered as compact JSON, or empty.
    pub fn validators_err_details_string(&self) -> String {
        match &self.validators_err_details {
            None | Some(serde_json::Value::Null) => String::new(),
            Some(v) => v.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PubRequest {
    pub revision_id: String,
    pub target: Target,
}

/// Body for both `actions/un-publish` and `actions/republish`.
#[derive(Debug, Clone, Serialize)]
pub struct TargetRequest {
    pub target: Target,
}

// ── Sites ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Site {
    #[serde(deserialize_with = "null_as_default")]
    pub site_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub owner_org_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub creation_time_milli: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub last_update_time_milli: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub created_user: String,
    #[serde(deserialize_with = "null_as_default")]
    pub last_updated_user: String,
    #[serde(deserialize_with = "null_as_default")]
    pub site_dns_cname_delegation_target: String,
    #[serde(deserialize_with = "null_as_default")]
    pub site_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub api_version: String,
    pub active_and_last_publishing_operation: Option<ActiveLastPub>,
    #[serde(deserialize_with = "null_as_default")]
    pub service_type: String,
    #[serde(deserialize_with = "null_as_default")]
    pub routing_method: String,
    #[serde(deserialize_with = "null_as_default")]
    pub should_provision_to_third_party_cdn: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub service_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub is_self_service_blocked: bool,
    /// The sites service capitalizes this one field.
    #[serde(rename = "IsDeleted", alias = "isDeleted")]
    #[serde(deserialize_with = "null_as_default")]
    pub is_deleted: bool,
}

/// Active and most recent publishing operation of a site.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActiveLastPub {
    pub last: Option<PubOp>,
    pub active: Option<PubOp>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteCreateRequest {
    pub site_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub routing_method: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteUpdateRequest {
    pub site_name: String,
}

// ── Site configurations ──────────────────────────────────────────────

/// One immutable configuration revision of a site.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SiteConfigVersion {
    #[serde(deserialize_with = "null_as_default")]
    pub site_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub revision_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub revision_num: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub owner_org_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub creation_time_milli: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub last_update_time_milli: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub created_user: String,
    pub host_index: serde_json::Value,
    #[serde(deserialize_with = "null_as_default")]
    pub change_description: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteConfigAddRequest {
    pub host_index: serde_json::Value,
    pub change_description: String,
}

// ── Site certificates ────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SiteCertificate {
    #[serde(deserialize_with = "null_as_default")]
    pub certificate_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub certificate_type: String,
    #[serde(deserialize_with = "null_as_default")]
    pub target: String,
    #[serde(deserialize_with = "null_as_default")]
    pub state: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteCertificateLinkRequest {
    pub certificate_id: String,
}

// ── Certificates ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Certificate {
    #[serde(deserialize_with = "null_as_default")]
    pub cert_id: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub certificate: String,
    #[serde(deserialize_with = "null_as_default")]
    pub certificate_chain: String,
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(deserialize_with = "null_as_default")]
    pub pk_hash: String,
    #[serde(deserialize_with = "null_as_default")]
    pub tenant: String,
    #[serde(deserialize_with = "null_as_default")]
    pub domain: String,
    #[serde(deserialize_with = "null_as_default")]
    pub status: CertificateStatus,
    #[serde(rename = "type")]
    #[serde(deserialize_with = "null_as_default")]
    pub cert_type: String,
    /// Set when the certificate was issued from a CSR.
    pub csr_id: Option<String>,
}

/// Body for creating or replacing a certificate.
///
/// The private key is write-only; the API never returns it.
#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateRequest {
    pub certificate: String,
    pub certificate_chain: String,
    pub private_key: String,
    pub description: String,
}

impl fmt::Debug for CertificateRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CertificateRequest")
            .field("description", &self.description)
            .field("private_key", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

// ── Certificate templates ────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CertificateTemplate {
    #[serde(deserialize_with = "null_as_default")]
    pub certificate_template_id: i64,
    pub country: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub tenant: String,
    pub state: Option<String>,
    pub locality: Option<String>,
    pub organization_name: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub common_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub sans: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub auto_managed_certificate_template: bool,
    /// `None` while issuance or domain verification is pending.
    pub last_certificate_id: Option<i64>,
    #[serde(deserialize_with = "null_as_default")]
    pub csr_ids: Vec<i64>,
}

impl CertificateTemplate {
    /// Most recently spawned CSR, if any.
    pub fn latest_csr_id(&self) -> Option<i64> {
        self.csr_ids.last().copied()
    }
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateTemplateCreateRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locality: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization_name: Option<String>,
    pub common_name: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sans: Vec<String>,
    pub auto_managed_certificate_template: bool,
}

// ── Certificate signing requests ─────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CertificateSigningRequest {
    #[serde(deserialize_with = "null_as_default")]
    pub csr_id: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub tenant: String,
    #[serde(deserialize_with = "null_as_default")]
    pub common_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub sans: Vec<String>,
    #[serde(alias = "autoManagedCSR")]
    #[serde(deserialize_with = "null_as_default")]
    pub auto_managed_csr: bool,
    #[serde(alias = "certificateTemplateIDRef")]
    #[serde(deserialize_with = "null_as_default")]
    pub certificate_template_id_ref: String,
    #[serde(deserialize_with = "null_as_default")]
    pub challenge_delegation_of_domains_list: Vec<DomainDelegation>,
}

/// One DNS record the customer must create to prove domain ownership.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DomainDelegation {
    #[serde(deserialize_with = "null_as_default")]
    pub from_domain: String,
    #[serde(deserialize_with = "null_as_default")]
    pub to_domain: String,
}

/// Ordered `record name → value` pairs from a CSR's delegation list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeDelegations(pub Vec<(String, String)>);

impl ChallengeDelegations {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl From<&CertificateSigningRequest> for ChallengeDelegations {
    fn from(csr: &CertificateSigningRequest) -> Self {
        Self(
            csr.challenge_delegation_of_domains_list
                .iter()
                .map(|d| (d.from_domain.clone(), d.to_domain.clone()))
                .collect(),
        )
    }
}

impl fmt::Display for ChallengeDelegations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (from, to)) in self.0.iter().enumerate() {
            writeln!(f, "{}. Record Name: {from} Value: {to}", i + 1)?;
        }
        Ok(())
    }
}

// ── Origin allow-list ────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkDeviceIps {
    #[serde(deserialize_with = "null_as_default")]
    pub ipv4: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub ipv6: Vec<String>,
}

/// IP addresses of the Qwilt devices that reach customer origins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeviceIps {
    #[serde(deserialize_with = "null_as_default")]
    pub md5: String,
    #[serde(deserialize_with = "null_as_default")]
    pub create_time_millis: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub ip_data: BTreeMap<String, NetworkDeviceIps>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn pub_op_tolerates_nulls_and_unknown_statuses() {
        let op: PubOp = serde_json::from_value(json!({
            "publishId": "p1",
            "revisionId": "r1",
            "publishStatus": "Queued",
            "publishAcceptanceStatus": "Pending",
            "operationType": "Publish",
            "statusLine": null,
            "validatorsErrDetails": null,
        }))
        .unwrap();

        assert_eq!(op.publish_status, PublishStatus::Unknown);
        assert!(op.publish_acceptance_status.is_pending());
        assert!(op.status_line.is_empty());
        assert_eq!(op.validators_err_details_string(), "");
    }

    #[test]
    fn pending_pub_op_with_null_scalars() {
        let op: PubOp = serde_json::from_value(json!({
            "publishId": "p1",
            "revisionId": "r1",
            "target": null,
            "username": null,
            "creationTimeMilli": null,
            "isActive": null,
            "publishStatus": null,
            "publishAcceptanceStatus": "Pending",
            "operationType": null,
        }))
        .unwrap();

        assert_eq!(op.publish_id, "p1");
        assert_eq!(op.target, "");
        assert_eq!(op.username, "");
        assert_eq!(op.creation_time_milli, 0);
        assert!(!op.is_active);
        assert_eq!(op.publish_status, PublishStatus::Unknown);
        assert_eq!(op.operation_type, OperationType::Unknown);
        assert!(op.publish_acceptance_status.is_pending());
    }

    #[test]
    fn site_and_certificate_with_null_scalars() {
        let site: Site = serde_json::from_value(json!({
            "siteId": "s1",
            "siteName": null,
            "routingMethod": null,
            "IsDeleted": null,
        }))
        .unwrap();
        assert_eq!(site.site_name, "");
        assert!(!site.is_deleted);

        let cert: Certificate = serde_json::from_value(json!({
            "certId": 3,
            "domain": null,
            "status": null,
            "type": null,
        }))
        .unwrap();
        assert_eq!(cert.domain, "");
        assert_eq!(cert.status, CertificateStatus::Unknown);

        let tpl: CertificateTemplate = serde_json::from_value(json!({
            "certificateTemplateId": 9,
            "tenant": null,
            "commonName": null,
        }))
        .unwrap();
        assert_eq!(tpl.common_name, "");
    }

    #[test]
    fn site_reads_capitalized_deleted_flag() {
        let site: Site = serde_json::from_value(json!({
            "siteId": "s1",
            "siteName": "demo",
            "IsDeleted": true,
        }))
        .unwrap();
        assert!(site.is_deleted);

        let back = serde_json::to_value(&site).unwrap();
        assert_eq!(back["IsDeleted"], json!(true));
    }

    #[test]
    fn certificate_type_field_is_renamed() {
        let cert: Certificate = serde_json::from_value(json!({
            "certId": 42,
            "type": "Custom",
            "status": "ACTIVE",
            "csrId": "7",
        }))
        .unwrap();
        assert_eq!(cert.cert_type, "Custom");
        assert_eq!(cert.status, CertificateStatus::Active);
        assert_eq!(cert.csr_id.as_deref(), Some("7"));
    }

    #[test]
    fn template_without_certificate_is_pending() {
        let tpl: CertificateTemplate = serde_json::from_value(json!({
            "certificateTemplateId": 9,
            "commonName": "example.com",
            "autoManagedCertificateTemplate": true,
            "lastCertificateId": null,
            "csrIds": [3, 4],
        }))
        .unwrap();
        assert_eq!(tpl.last_certificate_id, None);
        assert_eq!(tpl.csr_ids, vec![3, 4]);
    }

    #[test]
    fn challenge_delegations_pretty_print() {
        let csr = CertificateSigningRequest {
            challenge_delegation_of_domains_list: vec![
                DomainDelegation {
                    from_domain: "_acme-challenge.a.com".into(),
                    to_domain: "a.acme.qwilt.com".into(),
                },
                DomainDelegation {
                    from_domain: "_acme-challenge.b.com".into(),
                    to_domain: "b.acme.qwilt.com".into(),
                },
            ],
            ..Default::default()
        };
        let rendered = ChallengeDelegations::from(&csr).to_string();
        assert_eq!(
            rendered,
            "1. Record Name: _acme-challenge.a.com Value: a.acme.qwilt.com\n\
             2. Record Name: _acme-challenge.b.com Value: b.acme.qwilt.com\n"
        );
    }

    #[test]
    fn target_round_trips_lowercase() {
        assert_eq!(serde_json::to_value(Target::Staging).unwrap(), json!("staging"));
        assert_eq!("ga".parse::<Target>().unwrap(), Target::Ga);
        assert_eq!(Target::Ga.to_string(), "ga");
    }

    #[test]
    fn certificate_request_debug_redacts_key() {
        let req = CertificateRequest {
            certificate: "pem".into(),
            certificate_chain: String::new(),
            private_key: "secret".into(),
            description: "d".into(),
        };
        assert!(!format!("{req:?}").contains("secret"));
    }
}
