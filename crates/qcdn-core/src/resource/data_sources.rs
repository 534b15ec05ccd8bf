// Read-only listings: sites (with revisions and publishing operations),
// certificates, certificate templates and the origin allow-list.

use qcdn_api::models::{Certificate, CertificateTemplate, DeviceIps, PubOp, Site, SiteConfigVersion};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::facade::SiteFacade;

/// Narrows the sites listing. Revisions and publishing operations are only
/// fetched when a site is selected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SitesFilter {
    pub site_id: Option<String>,
    pub revision_id: Option<String>,
    pub publish_id: Option<String>,
    #[serde(default)]
    pub truncate_host_index: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SitesData {
    pub sites: Vec<Site>,
    pub revisions: Vec<SiteConfigVersion>,
    pub publish_ops: Vec<PubOp>,
}

fn matches(filter: Option<&String>, value: &str) -> bool {
    filter.is_none_or(|f| f.is_empty() || f == value)
}

/// Every site, including soft-deleted ones.
pub async fn sites(facade: &SiteFacade, filter: &SitesFilter) -> Result<SitesData, CoreError> {
    let sites: Vec<Site> = facade
        .sites
        .list(true, true)
        .await?
        .into_iter()
        .filter(|s| matches(filter.site_id.as_ref(), &s.site_id))
        .collect();

    let mut data = SitesData {
        sites,
        ..SitesData::default()
    };

    let Some(site_id) = filter.site_id.as_deref().filter(|s| !s.is_empty()) else {
        return Ok(data);
    };

    data.revisions = facade
        .site_configs
        .list(site_id, filter.truncate_host_index)
        .await?
        .into_iter()
        .filter(|r| matches(filter.revision_id.as_ref(), &r.revision_id))
        .collect();

    data.publish_ops = facade
        .publish_ops
        .list(site_id, false, None)
        .await?
        .into_iter()
        .filter(|op| matches(filter.publish_id.as_ref(), &op.publish_id))
        .collect();

    Ok(data)
}

pub async fn certificates(
    facade: &SiteFacade,
    cert_id: Option<i64>,
) -> Result<Vec<Certificate>, CoreError> {
    let certs = facade.certificates.list(true).await?;
    Ok(certs
        .into_iter()
        .filter(|c| cert_id.is_none_or(|id| c.cert_id == id))
        .collect())
}

pub async fn certificate_templates(
    facade: &SiteFacade,
    template_id: Option<i64>,
) -> Result<Vec<CertificateTemplate>, CoreError> {
    let templates = facade.certificate_templates.list().await?;
    Ok(templates
        .into_iter()
        .filter(|t| template_id.is_none_or(|id| t.certificate_template_id == id))
        .collect())
}

pub async fn origin_allow_list(facade: &SiteFacade) -> Result<DeviceIps, CoreError> {
    Ok(facade.device_ips.origin_allow_list().await?)
}
