//! Site configuration command handlers.

use tabled::Tabled;

use qcdn_core::host_index;
use qcdn_core::resource::{SiteConfigPlan, SiteConfigResource, SiteConfigState};
use qcdn_core::{SiteConfigVersion, SiteFacade};

use crate::cli::{ConfigsArgs, ConfigsCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct RevisionRow {
    #[tabled(rename = "#")]
    num: i64,
    #[tabled(rename = "Revision ID")]
    id: String,
    #[tabled(rename = "Description")]
    description: String,
    #[tabled(rename = "Created By")]
    user: String,
    #[tabled(rename = "Created")]
    created: String,
}

impl From<&SiteConfigVersion> for RevisionRow {
    fn from(r: &SiteConfigVersion) -> Self {
        Self {
            num: r.revision_num,
            id: r.revision_id.clone(),
            description: util::dash(&r.change_description).into(),
            user: util::dash(&r.created_user).into(),
            created: output::millis(r.creation_time_milli),
        }
    }
}

fn detail(s: &SiteConfigState) -> String {
    format!(
        "ID:          {}\nRevision:    #{} {}\nDescription: {}\nUpdated:     {}\nHost index:\n{}",
        s.id,
        s.revision_num,
        s.revision_id,
        util::dash(&s.change_description),
        output::millis(s.last_update_time_milli),
        s.host_index.trim_end()
    )
}

pub async fn handle(
    facade: &SiteFacade,
    args: ConfigsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let resource = SiteConfigResource::new(facade.clone());

    match args.command {
        ConfigsCommand::List { site_id } => {
            let mut revisions = facade.site_configs.list(&site_id, true).await?;
            revisions.sort_by_key(|r| r.revision_num);
            let out = output::render_list(
                &global.output,
                &revisions,
                |r| RevisionRow::from(r),
                |r| r.revision_id.clone(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigsCommand::Get {
            site_id,
            revision_id,
        } => {
            let state = resource
                .read(&SiteConfigState {
                    site_id,
                    revision_id,
                    ..SiteConfigState::default()
                })
                .await?;
            let out = output::render_single(&global.output, &state, detail, |s| s.id.clone())?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigsCommand::Create {
            site_id,
            file,
            description,
        } => {
            let raw = util::read_text(&file, "file")?;
            // Fail early on malformed JSON instead of sending it.
            host_index::parse(&raw)?;

            let state = resource
                .create(&SiteConfigPlan {
                    site_id,
                    host_index: raw,
                    change_description: description,
                })
                .await?;
            output::notice(
                &format!("Created revision #{} ({})", state.revision_num, state.revision_id),
                global.quiet,
            );
            let out = output::render_single(&global.output, &state, detail, |s| {
                s.revision_id.clone()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigsCommand::Import { id } => {
            let state = resource.import(&id).await?;
            let out = output::render_single(&global.output, &state, detail, |s| s.id.clone())?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
