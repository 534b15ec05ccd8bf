//! Activation command handlers.
//!
//! Activate/update/deactivate go through the site activation resource so
//! the CLI and library share one workflow; the remaining commands read or
//! nudge publishing operations directly.

use tabled::Tabled;

use qcdn_core::resource::{SiteActivationPlan, SiteActivationResource, SiteActivationState};
use qcdn_core::{AcceptancePolicy, Activator, PubOp, SiteFacade, classify_acceptance};

use crate::cli::{ActivationArgs, ActivationCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct PubOpRow {
    #[tabled(rename = "Publish ID")]
    id: String,
    #[tabled(rename = "Type")]
    op_type: String,
    #[tabled(rename = "Revision")]
    revision: String,
    #[tabled(rename = "Target")]
    target: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Acceptance")]
    acceptance: String,
    #[tabled(rename = "Active")]
    active: String,
    #[tabled(rename = "Updated")]
    updated: String,
}

fn row(op: &PubOp, color: bool) -> PubOpRow {
    PubOpRow {
        id: op.publish_id.clone(),
        op_type: op.operation_type.to_string(),
        revision: op.revision_id.clone(),
        target: util::dash(&op.target).into(),
        status: op.publish_status.to_string(),
        acceptance: output::acceptance(op.publish_acceptance_status, color),
        active: util::yes_no(op.is_active),
        updated: output::millis(op.last_update_time_milli),
    }
}

fn op_detail(op: &PubOp, color: bool) -> String {
    let mut lines = vec![
        format!("Publish ID: {}", op.publish_id),
        format!("Type:       {}", op.operation_type),
        format!("Revision:   {}", op.revision_id),
        format!("Target:     {}", util::dash(&op.target)),
        format!("State:      {}", util::dash(&op.publish_state)),
        format!("Status:     {}", op.publish_status),
        format!(
            "Acceptance: {}",
            output::acceptance(op.publish_acceptance_status, color)
        ),
        format!("Active:     {}", util::yes_no(op.is_active)),
        format!("User:       {}", util::dash(&op.username)),
        format!("Updated:    {}", output::millis(op.last_update_time_milli)),
    ];
    if !op.status_line.is_empty() {
        lines.push(format!("Status line: {}", op.status_line.join(", ")));
    }
    let details = op.validators_err_details_string();
    if !details.is_empty() {
        lines.push(format!("Validators: {details}"));
    }
    lines.join("\n")
}

fn state_detail(s: &SiteActivationState) -> String {
    let certificate = match (s.certificate_id, s.certificate_template_id) {
        (Some(id), _) => format!("certificate {id}"),
        (None, Some(id)) => format!("template {id}"),
        (None, None) => "-".into(),
    };
    [
        format!("ID:          {}", s.id),
        format!("Revision:    {}", s.revision_id),
        format!("Target:      {}", util::dash(&s.target)),
        format!("Type:        {}", s.operation_type),
        format!("Status:      {}", s.publish_status),
        format!("Acceptance:  {}", s.publish_acceptance_status),
        format!("Certificate: {certificate}"),
    ]
    .join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

#[allow(clippy::too_many_lines)]
pub async fn handle(
    facade: &SiteFacade,
    policy: AcceptancePolicy,
    args: ActivationArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let color = output::should_color(&global.color);
    let activator = Activator::new(facade.clone(), policy);
    let resource = SiteActivationResource::new(activator.clone(), args.target.into());

    let print_state = |state: &SiteActivationState| -> Result<(), CliError> {
        let out = output::render_single(&global.output, state, state_detail, |s| s.id.clone())?;
        output::print_output(&out, global.quiet);
        Ok(())
    };
    let print_op = |op: &PubOp| -> Result<(), CliError> {
        let out = output::render_single(
            &global.output,
            op,
            |o| op_detail(o, color),
            |o| o.publish_id.clone(),
        )?;
        output::print_output(&out, global.quiet);
        Ok(())
    };

    match args.command {
        ActivationCommand::Activate {
            site_id,
            revision_id,
            certificate,
        } => {
            let plan = SiteActivationPlan {
                site_id,
                revision_id,
                certificate_id: certificate.certificate_id,
                certificate_template_id: certificate.template_id,
            };
            let pb = util::spinner("Publishing and waiting for acceptance", global.quiet);
            let result = resource.create(&plan).await;
            pb.finish_and_clear();
            print_state(&result?)
        }

        ActivationCommand::Update {
            site_id,
            revision_id,
            certificate,
            previous_certificate_id,
            previous_template_id,
        } => {
            let previous = SiteActivationState {
                site_id: site_id.clone(),
                certificate_id: previous_certificate_id,
                certificate_template_id: previous_template_id,
                ..SiteActivationState::default()
            };
            let plan = SiteActivationPlan {
                site_id,
                revision_id,
                certificate_id: certificate.certificate_id,
                certificate_template_id: certificate.template_id,
            };
            let pb = util::spinner("Publishing and waiting for acceptance", global.quiet);
            let result = resource.update(&previous, &plan).await;
            pb.finish_and_clear();
            print_state(&result?)
        }

        ActivationCommand::Deactivate {
            site_id,
            certificate_id,
        } => {
            if !util::confirm(
                &format!("Unpublish site {site_id} from {}?", resource.target()),
                global.yes,
            )? {
                return Ok(());
            }
            let state = SiteActivationState {
                id: site_id.clone(),
                site_id,
                certificate_id,
                ..SiteActivationState::default()
            };
            let op = resource.delete(&state).await?;
            output::notice(
                &format!("Unpublish requested ({}); acceptance is not awaited", op.publish_id),
                global.quiet,
            );
            print_op(&op)
        }

        ActivationCommand::List {
            site_id,
            active,
            state,
        } => {
            let ops = facade
                .publish_ops
                .list(&site_id, active, state.as_deref())
                .await?;
            let out = output::render_list(
                &global.output,
                &ops,
                |op| row(op, color),
                |op| op.publish_id.clone(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ActivationCommand::Get {
            site_id,
            publish_id,
        } => {
            let op = facade.publish_ops.get(&site_id, &publish_id).await?;
            print_op(&op)
        }

        ActivationCommand::Find {
            site_id,
            revision_id,
        } => {
            let op = activator
                .find_latest_pub_op(&site_id, &revision_id)
                .await?
                .ok_or_else(|| CliError::NotFound {
                    message: format!(
                        "no publishing operation for revision {revision_id} of site {site_id}"
                    ),
                })?;
            print_op(&op)
        }

        ActivationCommand::Wait {
            site_id,
            publish_id,
        } => {
            let pb = util::spinner("Waiting for acceptance", global.quiet);
            let result = activator.wait_for_acceptance(&site_id, &publish_id).await;
            pb.finish_and_clear();
            let op = classify_acceptance(&site_id, result?)?;
            print_op(&op)
        }

        ActivationCommand::Import { id } => {
            let state = resource.import(&id).await?;
            print_state(&state)
        }

        ActivationCommand::Republish { site_id } => {
            let op = facade
                .publish_ops
                .republish(&site_id, resource.target())
                .await?;
            let pb = util::spinner("Waiting for acceptance", global.quiet);
            let result = activator.wait_for_acceptance(&site_id, &op.publish_id).await;
            pb.finish_and_clear();
            let op = classify_acceptance(&site_id, result?)?;
            print_op(&op)
        }

        ActivationCommand::Cancel {
            site_id,
            publish_id,
        } => {
            if !util::confirm(
                &format!("Cancel publishing operation {publish_id}?"),
                global.yes,
            )? {
                return Ok(());
            }
            facade.publish_ops.cancel(&site_id, &publish_id).await?;
            output::notice(&format!("Cancelled {publish_id}"), global.quiet);
            Ok(())
        }
    }
}
