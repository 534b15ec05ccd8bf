// Site facade: one handle exposing every sub-client.
//
// Each field is a named capability sharing the same authenticated
// `ApiClient`. Consumers take the facade and reach for the sub-client they
// need instead of holding eight separate handles.

use qcdn_api::{
    ApiClient, CertificateSigningRequestClient, CertificateTemplatesClient, CertificatesClient,
    Credentials, DeviceIpsClient, PublishOpsClient, SiteCertificatesClient,
    SiteConfigurationClient, SitesClient,
};
use tracing::info;

use crate::config::ClientConfig;
use crate::error::CoreError;

#[derive(Debug, Clone)]
pub struct SiteFacade {
    pub sites: SitesClient,
    pub site_configs: SiteConfigurationClient,
    pub site_certificates: SiteCertificatesClient,
    pub publish_ops: PublishOpsClient,
    pub certificates: CertificatesClient,
    pub certificate_templates: CertificateTemplatesClient,
    pub csrs: CertificateSigningRequestClient,
    pub device_ips: DeviceIpsClient,
}

impl SiteFacade {
    /// Authenticate according to `config` and build every sub-client.
    pub async fn connect(config: &ClientConfig) -> Result<Self, CoreError> {
        let endpoints = config.endpoints();
        info!(env = %config.env, "connecting to Qwilt CDN");
        let credentials = Credentials::from(&config.auth);
        let api = ApiClient::connect(endpoints, &credentials, &config.transport()).await?;
        Ok(Self::from_api(api))
    }

    pub fn from_api(api: ApiClient) -> Self {
        Self {
            sites: SitesClient::new(api.clone()),
            site_configs: SiteConfigurationClient::new(api.clone()),
            site_certificates: SiteCertificatesClient::new(api.clone()),
            publish_ops: PublishOpsClient::new(api.clone()),
            certificates: CertificatesClient::new(api.clone()),
            certificate_templates: CertificateTemplatesClient::new(api.clone()),
            csrs: CertificateSigningRequestClient::new(api.clone()),
            device_ips: DeviceIpsClient::new(api),
        }
    }
}
