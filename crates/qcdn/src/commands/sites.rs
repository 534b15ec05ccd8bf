//! Site command handlers.

use tabled::Tabled;

use qcdn_core::resource::{SitePlan, SiteResource, SiteState, SitesData, SitesFilter, data_sources};
use qcdn_core::{PubOp, Site, SiteFacade, SitePublishState};

use crate::cli::{GlobalOpts, SitesArgs, SitesCommand};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct SiteRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Routing")]
    routing: String,
    #[tabled(rename = "CNAME Target")]
    cname: String,
    #[tabled(rename = "Deleted")]
    deleted: String,
    #[tabled(rename = "Updated")]
    updated: String,
}

impl From<&Site> for SiteRow {
    fn from(s: &Site) -> Self {
        Self {
            id: s.site_id.clone(),
            name: s.site_name.clone(),
            routing: util::dash(&s.routing_method).into(),
            cname: util::dash(&s.site_dns_cname_delegation_target).into(),
            deleted: util::yes_no(s.is_deleted),
            updated: output::millis(s.last_update_time_milli),
        }
    }
}

fn op_line(label: &str, op: Option<&PubOp>) -> String {
    match op {
        Some(op) => format!(
            "{label:<11} {} ({} {}, revision {})",
            op.publish_id, op.operation_type, op.publish_acceptance_status, op.revision_id
        ),
        None => format!("{label:<11} -"),
    }
}

fn detail(s: &Site) -> String {
    let ops = s.active_and_last_publishing_operation.as_ref();
    [
        format!("ID:         {}", s.site_id),
        format!("Name:       {}", s.site_name),
        format!("Routing:    {}", util::dash(&s.routing_method)),
        format!("CNAME:      {}", util::dash(&s.site_dns_cname_delegation_target)),
        format!("Owner org:  {}", util::dash(&s.owner_org_id)),
        format!("Created:    {}", output::millis(s.creation_time_milli)),
        format!("Updated:    {}", output::millis(s.last_update_time_milli)),
        op_line("Active:", ops.and_then(|o| o.active.as_ref())),
        op_line("Last:", ops.and_then(|o| o.last.as_ref())),
    ]
    .join("\n")
}

fn state_detail(s: &SiteState) -> String {
    [
        format!("ID:         {}", s.site_id),
        format!("Name:       {}", s.site_name),
        format!("Routing:    {}", util::dash(&s.routing_method)),
        format!("CNAME:      {}", util::dash(&s.site_dns_cname_delegation_target)),
    ]
    .join("\n")
}

fn inspect_detail(data: &SitesData) -> String {
    let mut lines = Vec::new();
    for site in &data.sites {
        lines.push(detail(site));
    }
    lines.push(String::new());
    lines.push(format!("Revisions ({}):", data.revisions.len()));
    for rev in &data.revisions {
        lines.push(format!(
            "  #{:<4} {}  {}",
            rev.revision_num,
            rev.revision_id,
            util::dash(&rev.change_description)
        ));
    }
    lines.push(format!("Publishing operations ({}):", data.publish_ops.len()));
    for op in &data.publish_ops {
        lines.push(format!(
            "  {}  {} {} -> {} ({})",
            op.publish_id, op.operation_type, op.revision_id, op.target, op.publish_acceptance_status
        ));
    }
    lines.join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    facade: &SiteFacade,
    args: SitesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        SitesCommand::List { include_deleted } => {
            let sites = facade.sites.list(false, include_deleted).await?;
            let out = output::render_list(
                &global.output,
                &sites,
                |s| SiteRow::from(s),
                |s| s.site_id.clone(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        SitesCommand::Get { site_id, target } => {
            let site = facade.sites.get(&site_id, Some(target.into()), true, false).await?;
            let out = output::render_single(&global.output, &site, detail, |s| s.site_id.clone())?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        SitesCommand::Inspect {
            site_id,
            revision,
            publish,
            truncate,
        } => {
            let filter = SitesFilter {
                site_id: Some(site_id),
                revision_id: revision,
                publish_id: publish,
                truncate_host_index: truncate,
            };
            let data = data_sources::sites(facade, &filter).await?;
            if data.sites.is_empty() {
                return Err(CliError::NotFound {
                    message: format!("site {}", filter.site_id.unwrap_or_default()),
                });
            }
            let out = output::render_single(&global.output, &data, inspect_detail, |d| {
                d.sites
                    .iter()
                    .map(|s| s.site_id.clone())
                    .collect::<Vec<_>>()
                    .join("\n")
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        SitesCommand::Create {
            name,
            routing_method,
        } => {
            let resource = SiteResource::new(facade.clone());
            let state = resource
                .create(&SitePlan {
                    site_name: name,
                    routing_method,
                })
                .await?;
            let out = output::render_single(&global.output, &state, state_detail, |s| {
                s.site_id.clone()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        SitesCommand::Rename { site_id, name } => {
            let resource = SiteResource::new(facade.clone());
            let state = resource.import(&site_id).await?;
            let updated = resource
                .update(
                    &state,
                    &SitePlan {
                        site_name: name,
                        routing_method: None,
                    },
                )
                .await?;
            output::notice(
                &format!("Site {} renamed to '{}'", updated.site_id, updated.site_name),
                global.quiet,
            );
            Ok(())
        }

        SitesCommand::Delete { site_id } => {
            let resource = SiteResource::new(facade.clone());
            let state = resource.import(&site_id).await?;
            if !util::confirm(
                &format!("Delete site '{}' ({site_id})?", state.site_name),
                global.yes,
            )? {
                return Ok(());
            }
            resource.delete(&state).await?;
            output::notice(&format!("Site {site_id} deleted"), global.quiet);
            Ok(())
        }

        SitesCommand::Status { site_id } => {
            let status = facade.publish_ops.site_publish_status(&site_id).await?;
            let out = output::render_single(
                &global.output,
                &status,
                |s: &SitePublishState| {
                    format!("Current:    {}\nTransition: {}", s.current, s.transition)
                },
                |s| s.current.clone(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
