// qcdn-api: Async Rust client for the Qwilt CDN REST APIs
//
// One `ApiClient` carries the authenticated `reqwest::Client` and the
// endpoint table; every resource family gets a thin sub-client that owns
// its paths and wire types.

pub mod auth;
pub mod certificate_templates;
pub mod certificates;
pub mod client;
pub mod csr;
pub mod device_ips;
pub mod endpoint;
pub mod error;
pub mod models;
pub mod publish_ops;
pub mod site_certificates;
pub mod site_configs;
pub mod sites;
pub mod transport;

pub use auth::Credentials;
pub use certificate_templates::CertificateTemplatesClient;
pub use certificates::CertificatesClient;
pub use client::ApiClient;
pub use csr::CertificateSigningRequestClient;
pub use device_ips::DeviceIpsClient;
pub use endpoint::{EndpointBuilder, EnvType};
pub use error::Error;
pub use publish_ops::{PublishOpsClient, SitePublishState, select_latest_pub_op};
pub use site_certificates::SiteCertificatesClient;
pub use site_configs::SiteConfigurationClient;
pub use sites::SitesClient;
pub use transport::TransportConfig;
