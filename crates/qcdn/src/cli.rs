//! Clap derive structures for the `qcdn` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// qcdn -- manage Qwilt CDN sites from the command line
#[derive(Debug, Parser)]
#[command(
    name = "qcdn",
    version,
    about = "Manage Qwilt CDN sites, activations and certificates",
    long_about = "Create sites and configuration revisions, publish them to the \
        Qwilt CDN and manage the certificates they serve.\n\n\
        Activation commands wait until the CDN accepts or rejects the \
        published revision.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Configuration profile to use
    #[arg(long, short = 'p', env = "QCDN_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Environment type (prod, stage, prestg, dev)
    #[arg(long = "env", global = true)]
    pub env_type: Option<String>,

    /// API token (overrides profile, keyring and QCDN_XAPI_TOKEN)
    #[arg(long, global = true)]
    pub token: Option<String>,

    /// Send every request to this base URL instead of the environment's hosts
    #[arg(long, global = true, hide = true)]
    pub endpoint: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "QCDN_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Request timeout in seconds
    #[arg(long, env = "QCDN_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

/// Deployment target of an activation.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum TargetArg {
    /// Production traffic
    #[default]
    Ga,
    /// Staging
    Staging,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage sites
    #[command(alias = "s")]
    Sites(SitesArgs),

    /// Manage site configuration revisions
    #[command(alias = "cfg")]
    Configs(ConfigsArgs),

    /// Publish, update and unpublish site revisions
    #[command(alias = "act")]
    Activation(ActivationArgs),

    /// Manage uploaded certificates
    #[command(alias = "certs")]
    Certificates(CertificatesArgs),

    /// Manage certificate templates
    #[command(alias = "tpl")]
    Templates(TemplatesArgs),

    /// Show the IP addresses Qwilt devices use to reach origins
    AllowList,

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Sites ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct SitesArgs {
    #[command(subcommand)]
    pub command: SitesCommand,
}

#[derive(Debug, Subcommand)]
pub enum SitesCommand {
    /// List sites
    #[command(alias = "ls")]
    List {
        /// Include sites marked for deletion
        #[arg(long)]
        include_deleted: bool,
    },

    /// Show one site with its publish state
    Get {
        /// Site ID
        site_id: String,

        /// Target whose publishing operations are shown
        #[arg(long, value_enum, default_value_t)]
        target: TargetArg,
    },

    /// Show a site with its revisions and publishing operations
    Inspect {
        /// Site ID
        site_id: String,

        /// Only this revision
        #[arg(long)]
        revision: Option<String>,

        /// Only this publishing operation
        #[arg(long)]
        publish: Option<String>,

        /// Omit host index bodies
        #[arg(long)]
        truncate: bool,
    },

    /// Create a site
    Create {
        /// Site name
        #[arg(long)]
        name: String,

        /// Routing method (fixed after creation)
        #[arg(long)]
        routing_method: Option<String>,
    },

    /// Rename a site
    Rename {
        /// Site ID
        site_id: String,

        /// New name
        #[arg(long)]
        name: String,
    },

    /// Delete a site and free its name for reuse
    #[command(alias = "rm")]
    Delete {
        /// Site ID
        site_id: String,
    },

    /// Show whether a site is published
    Status {
        /// Site ID
        site_id: String,
    },
}

// ── Site configurations ──────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigsArgs {
    #[command(subcommand)]
    pub command: ConfigsCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigsCommand {
    /// List configuration revisions of a site
    #[command(alias = "ls")]
    List {
        /// Site ID
        site_id: String,
    },

    /// Show one revision, including its host index
    Get {
        /// Site ID
        site_id: String,

        /// Revision ID
        revision_id: String,
    },

    /// Create a new revision from a host index JSON file
    Create {
        /// Site ID
        site_id: String,

        /// Host index JSON file
        #[arg(long, short = 'f')]
        file: PathBuf,

        /// Change description
        #[arg(long, short = 'm', default_value = "")]
        description: String,
    },

    /// Resolve `site_id[:revision_id]` to a revision
    Import {
        /// `site_id` or `site_id:revision_id`
        id: String,
    },
}

// ── Activation ───────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ActivationArgs {
    /// Target to activate on
    #[arg(long, value_enum, default_value_t, global = true)]
    pub target: TargetArg,

    #[command(subcommand)]
    pub command: ActivationCommand,
}

/// Certificate to link before publishing. At most one may be given.
#[derive(Debug, Args)]
pub struct CertificateSelection {
    /// Certificate to link
    #[arg(long)]
    pub certificate_id: Option<i64>,

    /// Certificate template whose latest certificate is linked
    #[arg(long)]
    pub template_id: Option<i64>,
}

#[derive(Debug, Subcommand)]
pub enum ActivationCommand {
    /// Link a certificate, publish a revision and wait for acceptance
    Activate {
        /// Site ID
        site_id: String,

        /// Revision ID
        revision_id: String,

        #[command(flatten)]
        certificate: CertificateSelection,
    },

    /// Swap the linked certificate if it changed, then publish again
    Update {
        /// Site ID
        site_id: String,

        /// Revision ID
        revision_id: String,

        #[command(flatten)]
        certificate: CertificateSelection,

        /// Certificate linked by the previous activation
        #[arg(long)]
        previous_certificate_id: Option<i64>,

        /// Template used by the previous activation
        #[arg(long)]
        previous_template_id: Option<i64>,
    },

    /// Unpublish a site and unlink its certificate
    Deactivate {
        /// Site ID
        site_id: String,

        /// Certificate to unlink afterwards
        #[arg(long)]
        certificate_id: Option<i64>,
    },

    /// List publishing operations of a site
    #[command(alias = "ls")]
    List {
        /// Site ID
        site_id: String,

        /// Only the active operation
        #[arg(long)]
        active: bool,

        /// Filter by publish state
        #[arg(long)]
        state: Option<String>,
    },

    /// Show one publishing operation
    Get {
        /// Site ID
        site_id: String,

        /// Publish ID
        publish_id: String,
    },

    /// Find the most relevant publishing operation of a revision
    Find {
        /// Site ID
        site_id: String,

        /// Revision ID
        revision_id: String,
    },

    /// Wait for a publishing operation to leave Pending
    Wait {
        /// Site ID
        site_id: String,

        /// Publish ID
        publish_id: String,
    },

    /// Resolve `site_id[:publish_id]` to an activation
    Import {
        /// `site_id` or `site_id:publish_id`
        id: String,
    },

    /// Publish the active revision again
    Republish {
        /// Site ID
        site_id: String,
    },

    /// Cancel an in-progress publishing operation
    Cancel {
        /// Site ID
        site_id: String,

        /// Publish ID
        publish_id: String,
    },
}

// ── Certificates ─────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CertificatesArgs {
    #[command(subcommand)]
    pub command: CertificatesCommand,
}

/// PEM material for a certificate upload.
#[derive(Debug, Args)]
pub struct CertificateFiles {
    /// Certificate PEM file
    #[arg(long)]
    pub cert: PathBuf,

    /// Certificate chain PEM file
    #[arg(long)]
    pub chain: Option<PathBuf>,

    /// Private key PEM file
    #[arg(long)]
    pub key: PathBuf,

    /// Description
    #[arg(long, default_value = "")]
    pub description: String,
}

#[derive(Debug, Subcommand)]
pub enum CertificatesCommand {
    /// List certificates
    #[command(alias = "ls")]
    List,

    /// Show one certificate
    Get {
        /// Certificate ID
        cert_id: i64,
    },

    /// Upload a certificate
    Create(CertificateFiles),

    /// Replace a certificate's material
    Update {
        /// Certificate ID
        cert_id: i64,

        #[command(flatten)]
        files: CertificateFiles,
    },

    /// Delete a certificate
    #[command(alias = "rm")]
    Delete {
        /// Certificate ID
        cert_id: i64,
    },
}

// ── Certificate templates ────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct TemplatesArgs {
    #[command(subcommand)]
    pub command: TemplatesCommand,
}

#[derive(Debug, Subcommand)]
pub enum TemplatesCommand {
    /// List certificate templates
    #[command(alias = "ls")]
    List,

    /// Show one template
    Get {
        /// Template ID
        template_id: i64,
    },

    /// Create a template
    Create {
        /// Common name
        #[arg(long)]
        common_name: String,

        /// Subject alternative name (repeatable)
        #[arg(long = "san")]
        sans: Vec<String>,

        /// Let Qwilt issue and renew the certificate
        #[arg(long)]
        auto_managed: bool,

        #[arg(long)]
        country: Option<String>,

        #[arg(long)]
        state: Option<String>,

        #[arg(long)]
        locality: Option<String>,

        #[arg(long)]
        organization: Option<String>,
    },

    /// Delete a template
    #[command(alias = "rm")]
    Delete {
        /// Template ID
        template_id: i64,
    },

    /// Show the DNS records needed to verify a template's domains
    Challenges {
        /// Template ID
        template_id: i64,
    },
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Interactive configuration wizard
    Init,

    /// Show the resolved configuration
    Show,

    /// Print the config file path
    Path,

    /// List profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name
        name: String,
    },

    /// Store an API token in the system keyring
    SetToken,

    /// Store a login password in the system keyring
    SetPassword,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
