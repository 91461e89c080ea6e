//! SSO IdP service provider registration agent.
//!
//! Loads trusted SAML2 service provider definitions from
//! `sso-idp-config.xml` in the configuration directory and registers them
//! into the in-memory issuer-keyed registry consulted by the SSO protocol
//! handlers. A missing file is not an error: service providers may be
//! managed entirely through the management API instead.

mod sp;

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

use sp::{InMemorySpRegistry, SpConfigLoader};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "sso-idp-agent")]
#[command(about = "Service provider registration agent for a SAML2 SSO identity provider")]
struct Args {
    /// Directory containing sso-idp-config.xml
    #[arg(long, default_value = "/etc/sso-idp", env = "IDP_CONFIG_DIR")]
    config_dir: PathBuf,

    /// Print the registered service providers as JSON and exit
    #[arg(long)]
    dump: bool,

    /// Enable verbose logging
    #[arg(short, long, env = "IDP_VERBOSE")]
    verbose: bool,
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize tracing
    let log_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(format!("{}={}", env!("CARGO_CRATE_NAME"), log_level))
        .json()
        .init();

    info!("Starting SSO IdP service provider registration");

    let registry = InMemorySpRegistry::new();
    let loader = SpConfigLoader::new(&args.config_dir);
    loader.load_and_register(&registry);

    let count = registry.count()?;
    info!(
        config_dir = %args.config_dir.display(),
        service_providers = count,
        "Service provider registry populated"
    );

    if args.dump {
        let providers = registry.list()?;
        println!("{}", serde_json::to_string_pretty(&providers)?);
    }

    Ok(())
}
