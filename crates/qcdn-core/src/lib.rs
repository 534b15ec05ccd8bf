// qcdn-core: Activation workflow and resource lifecycles over qcdn-api.

pub mod activation;
pub mod config;
pub mod error;
pub mod facade;
pub mod host_index;
pub mod import_id;
pub mod resource;

// ── Primary re-exports ──────────────────────────────────────────────
pub use activation::{
    AcceptancePolicy, ActivationRequest, Activator, CertificateRef, Clock, ManualClock,
    TokioClock, classify_acceptance,
};
pub use config::{AuthCredentials, ClientConfig};
pub use error::CoreError;
pub use facade::SiteFacade;
pub use import_id::ImportId;

// Wire types consumers need without depending on qcdn-api directly.
pub use qcdn_api::models::{
    AcceptanceStatus, Certificate, CertificateSigningRequest, CertificateTemplate,
    ChallengeDelegations, DeviceIps, OperationType, PubOp, PublishStatus, Site,
    SiteCertificate, SiteConfigVersion, Target,
};
pub use qcdn_api::{EnvType, Error as ApiError, SitePublishState};
