// Certificate template resource. Templates are replaced, never updated.

use qcdn_api::models::{CertificateTemplate, CertificateTemplateCreateRequest};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::certificate::parse_numeric_id;
use crate::error::CoreError;
use crate::facade::SiteFacade;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateTemplateState {
    pub certificate_template_id: i64,
    pub country: Option<String>,
    pub tenant: String,
    pub state: Option<String>,
    pub locality: Option<String>,
    pub organization_name: Option<String>,
    pub common_name: String,
    pub sans: Vec<String>,
    pub auto_managed_certificate_template: bool,
    pub last_certificate_id: Option<i64>,
    pub csr_ids: Vec<i64>,
}

impl From<CertificateTemplate> for CertificateTemplateState {
    fn from(t: CertificateTemplate) -> Self {
        Self {
            certificate_template_id: t.certificate_template_id,
            country: t.country,
            tenant: t.tenant,
            state: t.state,
            locality: t.locality,
            organization_name: t.organization_name,
            common_name: t.common_name,
            sans: t.sans,
            auto_managed_certificate_template: t.auto_managed_certificate_template,
            last_certificate_id: t.last_certificate_id,
            csr_ids: t.csr_ids,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateTemplatePlan {
    pub country: Option<String>,
    pub state: Option<String>,
    pub locality: Option<String>,
    pub organization_name: Option<String>,
    pub common_name: String,
    #[serde(default)]
    pub sans: Vec<String>,
    #[serde(default)]
    pub auto_managed_certificate_template: bool,
}

impl From<&CertificateTemplatePlan> for CertificateTemplateCreateRequest {
    fn from(plan: &CertificateTemplatePlan) -> Self {
        Self {
            country: plan.country.clone(),
            state: plan.state.clone(),
            locality: plan.locality.clone(),
            organization_name: plan.organization_name.clone(),
            common_name: plan.common_name.clone(),
            sans: plan.sans.clone(),
            auto_managed_certificate_template: plan.auto_managed_certificate_template,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CertificateTemplateResource {
    facade: SiteFacade,
}

impl CertificateTemplateResource {
    pub fn new(facade: SiteFacade) -> Self {
        Self { facade }
    }

    pub async fn create(
        &self,
        plan: &CertificateTemplatePlan,
    ) -> Result<CertificateTemplateState, CoreError> {
        let template = self
            .facade
            .certificate_templates
            .create(&plan.into())
            .await?;
        info!(
            template_id = template.certificate_template_id,
            common_name = %template.common_name,
            "created certificate template"
        );
        Ok(template.into())
    }

    pub async fn read(
        &self,
        state: &CertificateTemplateState,
    ) -> Result<CertificateTemplateState, CoreError> {
        let template = self
            .facade
            .certificate_templates
            .get(state.certificate_template_id)
            .await?;
        Ok(template.into())
    }

    pub async fn delete(&self, state: &CertificateTemplateState) -> Result<(), CoreError> {
        self.facade
            .certificate_templates
            .delete(state.certificate_template_id)
            .await?;
        Ok(())
    }

    pub async fn import(&self, id: &str) -> Result<CertificateTemplateState, CoreError> {
        let template_id = parse_numeric_id(id, "certificate_template_id")?;
        let template = self.facade.certificate_templates.get(template_id).await?;
        Ok(template.into())
    }
}
