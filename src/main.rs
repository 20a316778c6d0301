use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::io::BufReader;
use unsecured_jwt_info::auth::jwks_client::CertsClient;
use unsecured_jwt_info::auth::Verifier;
use unsecured_jwt_info::config::{parse_host_alias, Config, ConfigOverrides};
use unsecured_jwt_info::error::Error;
use unsecured_jwt_info::logging::{self, LogFormat};

/// Unsecured JWT token-info verifier
///
/// Reads one JSON request per line from stdin (`{"token": "..."}`) and
/// writes one JSON response per line to stdout (`{"success": .., "status": ..}`).
#[derive(Parser, Debug)]
#[command(name = "unsecured-jwt-info")]
#[command(version, about, long_about = None)]
struct Args {
    /// Optional YAML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Allowed subject claim (repeatable; none = allow any)
    #[arg(long = "allowed-subject", value_name = "SUB")]
    allowed_subjects: Vec<String>,

    /// Allowed header algorithm (repeatable; none = allow any)
    #[arg(long = "allowed-algorithm", value_name = "ALG")]
    allowed_algorithms: Vec<String>,

    /// Rewrite an issuer host before fetching its certs, e.g. localhost=host.docker.internal
    #[arg(long = "host-alias", value_name = "FROM=TO", value_parser = parse_host_alias)]
    host_aliases: Vec<(String, String)>,

    /// Tolerance for iat/exp checks in seconds
    #[arg(long)]
    clock_skew_secs: Option<u64>,

    /// Timeout for fetching issuer certs in seconds
    #[arg(long)]
    certs_timeout_secs: Option<u64>,

    /// Log output format (json or pretty)
    #[arg(long, default_value = "json")]
    log_format: LogFormat,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            allowed_subjects: self.allowed_subjects.clone(),
            allowed_algorithms: self.allowed_algorithms.clone(),
            host_aliases: self.host_aliases.clone(),
            clock_skew_secs: self.clock_skew_secs,
            certs_timeout_secs: self.certs_timeout_secs,
        }
    }
}

fn load_config(args: &Args) -> Result<Config, Error> {
    let mut config = match &args.config {
        Some(path) => Config::from_file(path).map_err(Error::Config)?,
        None => Config::default(),
    };
    config.apply_overrides(args.overrides());
    config.validate().map_err(Error::Config)?;
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    logging::init_subscriber(args.log_format)
        .map_err(|e| anyhow::anyhow!("{}", e))
        .context("Failed to initialize logging subsystem")?;

    let config = load_config(&args).context("Failed to load configuration")?;

    tracing::info!(
        config_file = ?args.config,
        allowed_subjects = ?config.allowed_subjects,
        allowed_algorithms = ?config.allowed_algorithms,
        clock_skew_secs = config.clock_skew_secs,
        certs_timeout_secs = config.certs.timeout_secs,
        host_aliases = config.certs.host_aliases.len(),
        "Configuration loaded successfully"
    );

    let certs_client = CertsClient::new(config.certs.to_client_config())
        .context("Failed to create certs client")?;
    let verifier =
        Arc::new(Verifier::new(config.verifier_config()).with_resolver(Arc::new(certs_client)));

    unsecured_jwt_info::server::serve(
        verifier,
        BufReader::new(tokio::io::stdin()),
        tokio::io::stdout(),
    )
    .await
    .context("Verification loop failed")?;

    Ok(())
}
