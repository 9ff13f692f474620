//! Project H.I.V.E CLI
//!
//! A command-line tool for building, validating and managing honeypots and
//! the services that collect their events.

mod commands;
mod config;
mod output;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use commands::{honeypot, ports, services, types, validate};
use hive_lib::{
    HoneypotAction, HoneypotType, HttpLifecycleClient, MemoryLimit, RestartStrategy, ServiceAction,
};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Project H.I.V.E CLI
#[derive(Parser)]
#[command(name = "hive")]
#[command(author, version, about = "CLI for Project H.I.V.E honeypot management", long_about = None)]
pub struct Cli {
    /// API endpoint URL (can also be set via HIVE_API_URL env var)
    #[arg(long, env = "HIVE_API_URL")]
    pub api_url: Option<String>,

    /// Output format
    #[arg(long, short)]
    pub format: Option<output::OutputFormat>,

    /// Restart strategy (endpoint, stop-then-start)
    #[arg(long, env = "HIVE_RESTART_STRATEGY", default_value = "endpoint")]
    pub restart_strategy: RestartStrategy,

    /// Enable verbose output
    #[arg(long, short)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create and manage honeypots
    #[command(subcommand)]
    Honeypot(HoneypotCommands),

    /// Check host ports
    #[command(subcommand)]
    Port(PortCommands),

    /// Manage the event collection services
    #[command(subcommand)]
    Services(ServiceCommands),

    /// Validate builder input without contacting the API
    #[command(subcommand)]
    Validate(ValidateCommands),

    /// Show the honeypot type catalog
    Types {
        /// Fetch the catalog from the gateway instead of the built-in one
        #[arg(long)]
        remote: bool,
    },

    /// Show or change CLI settings
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Args)]
pub struct ResourceArgs {
    /// CPU period in microseconds
    #[arg(long, default_value_t = 100_000)]
    pub cpu_period: i64,

    /// CPU quota in microseconds
    #[arg(long, default_value_t = 50_000)]
    pub cpu_quota: i64,

    /// Memory limit (64m, 128m, 256m, 512m, 768m, 1024m, 1536m, 2048m)
    #[arg(long, default_value = "512m")]
    pub memory: MemoryLimit,

    /// Memory + swap limit; raised to the next option above --memory when lower
    #[arg(long)]
    pub swap: Option<MemoryLimit>,
}

#[derive(Subcommand)]
pub enum HoneypotCommands {
    /// Create a honeypot
    Create {
        /// Honeypot type (ssh, ftp, http)
        #[arg(long = "type", short = 't')]
        honeypot_type: HoneypotType,

        /// Host port
        #[arg(long, short)]
        port: u32,

        #[command(flatten)]
        resources: ResourceArgs,

        /// Banner shown to connecting clients
        #[arg(long, short)]
        banner: String,

        /// Credential pair as username:password (repeat 3 to 10 times)
        #[arg(long = "credential", short = 'c', required = true)]
        credentials: Vec<hive_lib::CredentialPair>,

        /// Only validate the submission
        #[arg(long)]
        dry_run: bool,
    },

    /// List honeypots
    List {
        /// Show only running honeypots
        #[arg(long)]
        running: bool,
    },

    /// Show a honeypot
    Status {
        /// Honeypot name
        name: String,
    },

    /// Start a honeypot
    Start {
        /// Honeypot name
        name: String,
    },

    /// Stop a honeypot
    Stop {
        /// Honeypot name
        name: String,
    },

    /// Restart a honeypot
    Restart {
        /// Honeypot name
        name: String,
    },

    /// Delete a honeypot
    Delete {
        /// Honeypot name
        name: String,
    },
}

#[derive(Subcommand)]
pub enum PortCommands {
    /// Check whether a host port can be used
    Check {
        /// Host port
        port: u32,
    },
}

#[derive(Args)]
pub struct AdminArgs {
    /// Admin password for bulk service actions
    #[arg(long, env = "HIVE_ADMIN_PASSWORD", hide_env_values = true)]
    pub admin_password: String,
}

#[derive(Subcommand)]
pub enum ServiceCommands {
    /// List services
    List,
    /// Create all services
    Create(AdminArgs),
    /// Start all services
    Start(AdminArgs),
    /// Stop all services
    Stop(AdminArgs),
    /// Restart all services
    Restart(AdminArgs),
    /// Delete all services
    Delete(AdminArgs),
}

#[derive(Subcommand)]
pub enum ValidateCommands {
    /// Validate CPU and memory settings
    Resources {
        /// CPU period in microseconds
        #[arg(long)]
        cpu_period: String,

        /// CPU quota in microseconds
        #[arg(long)]
        cpu_quota: String,

        /// Memory limit
        #[arg(long, default_value = "512m")]
        memory: String,

        /// Memory + swap limit
        #[arg(long, default_value = "768m")]
        swap: String,
    },

    /// Validate credential pairs
    Credentials {
        /// Credential pair as username:password
        #[arg(long = "credential", short = 'c')]
        credentials: Vec<hive_lib::CredentialPair>,
    },

    /// Validate a banner
    Banner {
        /// Banner text
        #[arg(long, short, conflicts_with = "file")]
        banner: Option<String>,

        /// Read the banner from a file
        #[arg(long)]
        file: Option<std::path::PathBuf>,

        /// Print the sanitized banner as well
        #[arg(long)]
        sanitize: bool,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the effective settings
    Show,

    /// Store defaults in the config file
    Set {
        /// Default API endpoint URL
        #[arg(long)]
        api_url: Option<String>,

        /// Default output format
        #[arg(long)]
        format: Option<output::OutputFormat>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        tracing_subscriber::registry()
            .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")))
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    let settings = config::Config::load()?;
    let api_url = config::resolve_api_url(cli.api_url.clone(), &settings);
    let format = cli
        .format
        .or_else(|| settings.format())
        .unwrap_or_default();
    tracing::debug!(api_url = %api_url, format = ?format, "Resolved CLI settings");

    let client = || -> Result<HttpLifecycleClient> {
        HttpLifecycleClient::builder(api_url.clone())
            .restart_strategy(cli.restart_strategy)
            .build()
            .with_context(|| format!("Invalid API URL {}", api_url))
    };

    match cli.command {
        Commands::Honeypot(cmd) => match cmd {
            HoneypotCommands::Create {
                honeypot_type,
                port,
                resources,
                banner,
                credentials,
                dry_run,
            } => {
                let (request, swap_raised) = honeypot::build_request(
                    honeypot_type,
                    port,
                    &resources,
                    banner,
                    credentials,
                );
                if swap_raised {
                    output::print_warning(&format!(
                        "Swap limit raised to {} (must be at least the memory limit)",
                        request.resources.memory_swap_limit
                    ));
                }
                honeypot::create(&client()?, request, dry_run, format).await?;
            }
            HoneypotCommands::List { running } => {
                honeypot::list(&client()?, running, format).await?;
            }
            HoneypotCommands::Status { name } => {
                honeypot::status(&client()?, &name, format).await?;
            }
            HoneypotCommands::Start { name } => {
                honeypot::lifecycle(&client()?, &name, HoneypotAction::Start, format).await?;
            }
            HoneypotCommands::Stop { name } => {
                honeypot::lifecycle(&client()?, &name, HoneypotAction::Stop, format).await?;
            }
            HoneypotCommands::Restart { name } => {
                honeypot::lifecycle(&client()?, &name, HoneypotAction::Restart, format).await?;
            }
            HoneypotCommands::Delete { name } => {
                honeypot::lifecycle(&client()?, &name, HoneypotAction::Delete, format).await?;
            }
        },
        Commands::Port(PortCommands::Check { port }) => {
            ports::check(&client()?, port, format).await?;
        }
        Commands::Services(cmd) => match cmd {
            ServiceCommands::List => services::list(&client()?, format).await?,
            ServiceCommands::Create(admin) => {
                services::bulk(&client()?, ServiceAction::Create, &admin.admin_password, format)
                    .await?
            }
            ServiceCommands::Start(admin) => {
                services::bulk(&client()?, ServiceAction::Start, &admin.admin_password, format)
                    .await?
            }
            ServiceCommands::Stop(admin) => {
                services::bulk(&client()?, ServiceAction::Stop, &admin.admin_password, format)
                    .await?
            }
            ServiceCommands::Restart(admin) => {
                services::bulk(&client()?, ServiceAction::Restart, &admin.admin_password, format)
                    .await?
            }
            ServiceCommands::Delete(admin) => {
                services::bulk(&client()?, ServiceAction::Delete, &admin.admin_password, format)
                    .await?
            }
        },
        Commands::Validate(cmd) => match cmd {
            ValidateCommands::Resources {
                cpu_period,
                cpu_quota,
                memory,
                swap,
            } => validate::resources(&cpu_period, &cpu_quota, &memory, &swap, format)?,
            ValidateCommands::Credentials { credentials } => {
                validate::credentials(&credentials, format)?
            }
            ValidateCommands::Banner {
                banner,
                file,
                sanitize,
            } => {
                let text = match (banner, file) {
                    (Some(text), _) => text,
                    (None, Some(path)) => std::fs::read_to_string(&path)
                        .with_context(|| format!("Failed to read banner file {}", path.display()))?,
                    (None, None) => anyhow::bail!("Provide --banner or --file"),
                };
                validate::banner(&text, sanitize, format)?
            }
        },
        Commands::Types { remote } => {
            if remote {
                types::show_remote(&client()?, format).await?;
            } else {
                types::show(&hive_lib::HoneypotCatalog::builtin(), format)?;
            }
        }
        Commands::Config(cmd) => match cmd {
            ConfigCommands::Show => config::show(&settings, &api_url, format)?,
            ConfigCommands::Set { api_url, format } => {
                let mut updated = settings.clone();
                updated.set(api_url, format);
                updated.save()?;
                output::print_success("Configuration saved");
            }
        },
    }

    Ok(())
}
