//! Certificate template command handlers.

use tabled::Tabled;

use qcdn_core::resource::{CertificateTemplatePlan, CertificateTemplateResource, data_sources};
use qcdn_core::{CertificateTemplate, ChallengeDelegations, SiteFacade};

use crate::cli::{GlobalOpts, TemplatesArgs, TemplatesCommand};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct TemplateRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Common Name")]
    common_name: String,
    #[tabled(rename = "SANs")]
    sans: String,
    #[tabled(rename = "Auto")]
    auto_managed: String,
    #[tabled(rename = "Certificate")]
    certificate: String,
}

impl From<&CertificateTemplate> for TemplateRow {
    fn from(t: &CertificateTemplate) -> Self {
        Self {
            id: t.certificate_template_id,
            common_name: t.common_name.clone(),
            sans: t.sans.join(", "),
            auto_managed: util::yes_no(t.auto_managed_certificate_template),
            certificate: t
                .last_certificate_id
                .map_or_else(|| "pending".into(), |id| id.to_string()),
        }
    }
}

fn detail(t: &CertificateTemplate) -> String {
    let opt = |v: &Option<String>| v.clone().unwrap_or_else(|| "-".into());
    [
        format!("ID:           {}", t.certificate_template_id),
        format!("Common name:  {}", t.common_name),
        format!("SANs:         {}", t.sans.join(", ")),
        format!("Auto-managed: {}", util::yes_no(t.auto_managed_certificate_template)),
        format!(
            "Certificate:  {}",
            t.last_certificate_id
                .map_or_else(|| "pending".into(), |id| id.to_string())
        ),
        format!("Organization: {}", opt(&t.organization_name)),
        format!("Locality:     {}", opt(&t.locality)),
        format!("State:        {}", opt(&t.state)),
        format!("Country:      {}", opt(&t.country)),
        format!(
            "CSRs:         {}",
            t.csr_ids
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        ),
    ]
    .join("\n")
}

pub async fn handle(
    facade: &SiteFacade,
    args: TemplatesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let resource = CertificateTemplateResource::new(facade.clone());

    match args.command {
        TemplatesCommand::List => {
            let templates = data_sources::certificate_templates(facade, None).await?;
            let out = output::render_list(
                &global.output,
                &templates,
                |t| TemplateRow::from(t),
                |t| t.certificate_template_id.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        TemplatesCommand::Get { template_id } => {
            let template = facade.certificate_templates.get(template_id).await?;
            let out = output::render_single(&global.output, &template, detail, |t| {
                t.certificate_template_id.to_string()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        TemplatesCommand::Create {
            common_name,
            sans,
            auto_managed,
            country,
            state,
            locality,
            organization,
        } => {
            let created = resource
                .create(&CertificateTemplatePlan {
                    country,
                    state,
                    locality,
                    organization_name: organization,
                    common_name,
                    sans,
                    auto_managed_certificate_template: auto_managed,
                })
                .await?;
            output::notice(
                &format!(
                    "Created certificate template {} for {}",
                    created.certificate_template_id, created.common_name
                ),
                global.quiet,
            );
            output::print_output(&created.certificate_template_id.to_string(), global.quiet);
            Ok(())
        }

        TemplatesCommand::Delete { template_id } => {
            if !util::confirm(
                &format!("Delete certificate template {template_id}?"),
                global.yes,
            )? {
                return Ok(());
            }
            let state = resource.import(&template_id.to_string()).await?;
            resource.delete(&state).await?;
            output::notice(&format!("Template {template_id} deleted"), global.quiet);
            Ok(())
        }

        TemplatesCommand::Challenges { template_id } => {
            let state = resource.import(&template_id.to_string()).await?;
            let delegations = match state.csr_ids.last() {
                Some(csr_id) => facade.csrs.challenge_delegations(*csr_id).await?,
                None => ChallengeDelegations::default(),
            };
            let out = output::render_single(
                &global.output,
                &delegations,
                |d| {
                    if d.is_empty() {
                        "No challenge records".into()
                    } else {
                        d.to_string().trim_end().to_owned()
                    }
                },
                |d| {
                    d.0.iter()
                        .map(|(from, to)| format!("{from} {to}"))
                        .collect::<Vec<_>>()
                        .join("\n")
                },
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
