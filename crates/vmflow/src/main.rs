mod commands;
mod context;

use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use vmflow_config::CleanupPolicy;

pub const SUBSCRIPTION_ENV: &str = "AZURE_SUBSCRIPTION_ID";

#[derive(Parser)]
#[command(name = "vmflow")]
#[command(about = "Provision an Azure VM with its network, list it, and tear it down again", long_about = None)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Settings file (default: discovered vmflow.yaml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Subscription to operate in
    #[arg(long, env = SUBSCRIPTION_ENV, global = true)]
    pub subscription: Option<String>,

    /// Resource group (overrides the settings file)
    #[arg(short = 'g', long, global = true)]
    pub resource_group: Option<String>,

    /// Azure region (overrides the settings file)
    #[arg(short, long, global = true)]
    pub location: Option<String>,

    /// What `run` deletes at the end: all, vm-only or none
    #[arg(long, global = true)]
    pub cleanup: Option<CleanupPolicy>,

    /// Where the access token comes from
    #[arg(long, value_enum, default_value_t = CredentialSource::Default, global = true)]
    pub credential: CredentialSource,

    /// Admin password for the VM
    #[arg(long, env = "VMFLOW_ADMIN_PASSWORD", hide_env_values = true, global = true)]
    pub admin_password: Option<String>,

    /// Debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    /// Environment token, service principal, then Azure CLI
    Default,
    /// Azure CLI session (`az login`)
    Cli,
    /// AZURE_ACCESS_TOKEN or AZURE_TENANT_ID/AZURE_CLIENT_ID/AZURE_CLIENT_SECRET
    Env,
}

#[derive(Subcommand)]
enum Commands {
    /// Create VNet, public IP, NIC and VM, list VMs, then clean up
    Run,
    /// Show the steps and resource names of a run without calling Azure
    Plan,
    /// List virtual machines in the subscription
    List {
        /// Also list networks, public IPs, NICs and storage accounts
        #[arg(short, long)]
        all: bool,
    },
    /// List operations offered by the compute provider
    Operations,
    /// Act on a single virtual machine
    #[command(subcommand)]
    Vm(VmCommands),
    /// Show version information
    Version,
}

#[derive(Subcommand, Debug, Clone)]
pub enum VmCommands {
    /// Show a virtual machine
    Get { name: String },
    /// Start a virtual machine
    Start { name: String },
    /// Power off a virtual machine (still billed)
    Stop { name: String },
    /// Restart a virtual machine
    Restart { name: String },
    /// Stop and release compute resources
    Deallocate { name: String },
    /// Delete a virtual machine
    Delete { name: String },
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.global.verbose);

    if matches!(cli.command, Commands::Version) {
        println!("vmflow {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    // plan never talks to Azure
    if matches!(cli.command, Commands::Plan) {
        let options = context::load_options(&cli.global)?;
        return commands::plan::handle(&options);
    }

    let subscription_id = match cli.global.subscription.as_deref().map(str::trim) {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => {
            eprintln!(
                "{}",
                format!("{} is not set. Export it or pass --subscription.", SUBSCRIPTION_ENV).red()
            );
            std::process::exit(1);
        }
    };

    let options = context::load_options(&cli.global)?;

    match cli.command {
        Commands::Run => commands::run::handle(&cli.global, &options, &subscription_id).await,
        Commands::List { all } => {
            let clients = context::connect(&cli.global, &options, &subscription_id).await?;
            commands::list::handle(&clients, all).await
        }
        Commands::Operations => {
            let clients = context::connect(&cli.global, &options, &subscription_id).await?;
            commands::operations::handle(&clients).await
        }
        Commands::Vm(vm) => {
            let clients = context::connect(&cli.global, &options, &subscription_id).await?;
            commands::vm::handle(&clients, &options, vm).await
        }
        Commands::Plan | Commands::Version => Ok(()),
    }
}
