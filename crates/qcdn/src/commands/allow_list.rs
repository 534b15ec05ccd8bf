//! Origin allow-list handler.

use tabled::Tabled;

use qcdn_core::resource::data_sources;
use qcdn_core::{DeviceIps, SiteFacade};

use crate::cli::{GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct IpRow {
    #[tabled(rename = "Network")]
    network: String,
    #[tabled(rename = "Family")]
    family: &'static str,
    #[tabled(rename = "Address")]
    address: String,
}

fn rows(ips: &DeviceIps) -> Vec<IpRow> {
    let mut rows = Vec::new();
    for (network, data) in &ips.ip_data {
        for addr in &data.ipv4 {
            rows.push(IpRow {
                network: network.clone(),
                family: "ipv4",
                address: addr.clone(),
            });
        }
        for addr in &data.ipv6 {
            rows.push(IpRow {
                network: network.clone(),
                family: "ipv6",
                address: addr.clone(),
            });
        }
    }
    rows
}

pub async fn handle(facade: &SiteFacade, global: &GlobalOpts) -> Result<(), CliError> {
    let ips = data_sources::origin_allow_list(facade).await?;

    let out = match global.output {
        OutputFormat::Table => {
            output::notice(
                &format!("md5 {} ({})", ips.md5, output::millis(ips.create_time_millis)),
                global.quiet,
            );
            output::render_table(&rows(&ips))
        }
        OutputFormat::Plain => rows(&ips)
            .into_iter()
            .map(|r| r.address)
            .collect::<Vec<_>>()
            .join("\n"),
        _ => output::render_single(&global.output, &ips, |_| String::new(), |i| i.md5.clone())?,
    };
    output::print_output(&out, global.quiet);
    Ok(())
}
