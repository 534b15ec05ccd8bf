// Resource lifecycles.
//
// Host-independent stand-ins for the declarative resources: each module
// pairs a serde state record with create/read/update/delete/import
// functions built on the site facade. Nothing here holds state between
// calls; every read goes back to the API.

pub mod certificate;
pub mod certificate_template;
pub mod data_sources;
pub mod site;
pub mod site_activation;
pub mod site_config;

pub use certificate::{CertificatePlan, CertificateResource, CertificateState};
pub use certificate_template::{
    CertificateTemplatePlan, CertificateTemplateResource, CertificateTemplateState,
};
pub use data_sources::{SitesData, SitesFilter};
pub use site::{SitePlan, SiteResource, SiteState};
pub use site_activation::{SiteActivationPlan, SiteActivationResource, SiteActivationState};
pub use site_config::{SiteConfigPlan, SiteConfigResource, SiteConfigState};
