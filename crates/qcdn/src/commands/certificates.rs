//! Certificate command handlers.

use tabled::Tabled;

use qcdn_core::resource::{CertificatePlan, CertificateResource, data_sources};
use qcdn_core::{Certificate, SiteFacade};

use crate::cli::{CertificateFiles, CertificatesArgs, CertificatesCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct CertificateRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Domain")]
    domain: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Type")]
    cert_type: String,
    #[tabled(rename = "Description")]
    description: String,
}

impl From<&Certificate> for CertificateRow {
    fn from(c: &Certificate) -> Self {
        Self {
            id: c.cert_id,
            domain: util::dash(&c.domain).into(),
            status: c.status.to_string(),
            cert_type: util::dash(&c.cert_type).into(),
            description: util::dash(&c.description).into(),
        }
    }
}

fn detail(c: &Certificate) -> String {
    [
        format!("ID:          {}", c.cert_id),
        format!("Domain:      {}", util::dash(&c.domain)),
        format!("Status:      {}", c.status),
        format!("Type:        {}", util::dash(&c.cert_type)),
        format!("Tenant:      {}", util::dash(&c.tenant)),
        format!("Key hash:    {}", util::dash(&c.pk_hash)),
        format!("CSR:         {}", c.csr_id.as_deref().unwrap_or("-")),
        format!("Description: {}", util::dash(&c.description)),
    ]
    .join("\n")
}

fn plan(files: &CertificateFiles) -> Result<CertificatePlan, CliError> {
    Ok(CertificatePlan {
        certificate: util::read_text(&files.cert, "cert")?,
        certificate_chain: files
            .chain
            .as_deref()
            .map(|p| util::read_text(p, "chain"))
            .transpose()?
            .unwrap_or_default(),
        private_key: util::read_text(&files.key, "key")?,
        description: files.description.clone(),
    })
}

pub async fn handle(
    facade: &SiteFacade,
    args: CertificatesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let resource = CertificateResource::new(facade.clone());

    match args.command {
        CertificatesCommand::List => {
            let certs = data_sources::certificates(facade, None).await?;
            let out = output::render_list(
                &global.output,
                &certs,
                |c| CertificateRow::from(c),
                |c| c.cert_id.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        CertificatesCommand::Get { cert_id } => {
            let cert = data_sources::certificates(facade, Some(cert_id))
                .await?
                .into_iter()
                .next()
                .ok_or_else(|| CliError::NotFound {
                    message: format!("certificate {cert_id}"),
                })?;
            let out = output::render_single(&global.output, &cert, detail, |c| {
                c.cert_id.to_string()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        CertificatesCommand::Create(files) => {
            let state = resource.create(&plan(&files)?).await?;
            output::notice(
                &format!("Uploaded certificate {} for {}", state.cert_id, util::dash(&state.domain)),
                global.quiet,
            );
            output::print_output(&state.cert_id.to_string(), global.quiet);
            Ok(())
        }

        CertificatesCommand::Update { cert_id, files } => {
            let state = resource.import(&cert_id.to_string()).await?;
            let updated = resource.update(&state, &plan(&files)?).await?;
            output::notice(
                &format!("Replaced certificate {} ({})", updated.cert_id, updated.status),
                global.quiet,
            );
            Ok(())
        }

        CertificatesCommand::Delete { cert_id } => {
            if !util::confirm(&format!("Delete certificate {cert_id}?"), global.yes)? {
                return Ok(());
            }
            let state = resource.import(&cert_id.to_string()).await?;
            resource.delete(&state).await?;
            output::notice(&format!("Certificate {cert_id} deleted"), global.quiet);
            Ok(())
        }
    }
}
