use anyhow::{anyhow, Context};
use clap::{Args, Parser, Subcommand};
use serde_json::Value;
use std::path::PathBuf;
use std::process::exit;
use std::time::Duration;
use tracing::*;
use tracing_subscriber::{filter::LevelFilter, EnvFilter, FmtSubscriber};
use wsclient::jsonrpc::EnvTokenSupplier;
use wsclient::{AuthContext, ClientConfig, ServiceRevision, WorkspaceClient};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    globals: Globals,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Globals {
    /// Read the client config from a JSON file
    ///
    /// The other connection options override whatever the file specifies.
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// URL of the workspace service
    #[arg(long, global = true, env = "WORKSPACE_SERVICE_URL")]
    url: Option<String>,

    /// Token to send in the Authorization header
    #[arg(long, global = true, env = "KB_AUTH_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Read the token from this environment variable before every call, instead of once
    ///
    /// Takes precedence over --token.
    #[arg(long, value_name = "VAR", global = true)]
    token_env: Option<String>,

    /// Give up on a call after this many seconds (fractions allowed).  By default calls never
    /// time out.
    #[arg(long, value_name = "SECS", global = true)]
    timeout_secs: Option<f64>,

    /// Turn debugging information on
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    debug: u8,
}

impl Globals {
    fn client_config(&self) -> anyhow::Result<ClientConfig> {
        let mut config = match &self.config {
            Some(path) => {
                debug!(path = %path.display(), "Loading client config");
                ClientConfig::from_file(path)?
            }
            None => ClientConfig::new(self.url.clone().ok_or_else(|| {
                anyhow!("No service URL; use --url, WORKSPACE_SERVICE_URL, or a config file")
            })?),
        };

        if let Some(url) = &self.url {
            config.url = url.clone();
        }
        if let Some(token) = &self.token {
            config.token = Some(token.clone());
        }
        if let Some(timeout_secs) = self.timeout_secs {
            let timeout = Duration::try_from_secs_f64(timeout_secs)
                .with_context(|| format!("Invalid --timeout-secs value {timeout_secs}"))?;
            config.timeout = Some(timeout);
        }

        Ok(config)
    }

    fn auth(&self, config: &ClientConfig) -> AuthContext {
        let auth = match &config.token {
            Some(token) => AuthContext::with_token(token),
            None => AuthContext::none(),
        };

        match &self.token_env {
            Some(var) => auth.supplier(EnvTokenSupplier::new(var)),
            None => auth,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// List the methods of the workspace service
    Methods {
        /// List the legacy positional-parameter methods instead
        #[arg(long)]
        legacy: bool,
    },

    /// Call a workspace service method and print its result as JSON
    Call {
        /// Method name, with or without the `workspaceService.` prefix
        method: String,

        /// Positional arguments.  Each one is parsed as JSON; anything that isn't valid JSON is
        /// passed as a string.
        args: Vec<String>,

        /// Call the legacy positional-parameter method of this name
        #[arg(long)]
        legacy: bool,
    },
}

fn revision(legacy: bool) -> ServiceRevision {
    if legacy {
        ServiceRevision::Legacy
    } else {
        ServiceRevision::Current
    }
}

fn parse_arg(arg: &str) -> Value {
    serde_json::from_str(arg).unwrap_or_else(|_| Value::String(arg.to_string()))
}

impl Commands {
    async fn execute(self, globals: &Globals) -> anyhow::Result<()> {
        use Commands::*;
        match self {
            Methods { legacy } => {
                for spec in revision(legacy).methods() {
                    println!(
                        "{}({}) -> {}",
                        spec.qualified_name(),
                        spec.params.join(", "),
                        spec.result
                    );
                }
            }
            Call {
                method,
                args,
                legacy,
            } => {
                let config = globals.client_config()?;
                let client = WorkspaceClient::with_auth(&config, globals.auth(&config))?;
                let args = args.iter().map(|arg| parse_arg(arg)).collect();

                info!(url = %config.url, %method, "Calling workspace service");
                let result = client
                    .call_method(revision(legacy), &method, args)
                    .await
                    .map_err(|e| {
                        if let Some(rpc) = e.rpc_error() {
                            error!(
                                kind = %rpc.kind(),
                                status = ?rpc.status(),
                                detail = ?rpc.detail(),
                                "Workspace service call failed"
                            );
                        }
                        e
                    })
                    .with_context(|| format!("Calling '{method}'"))?;

                println!("{}", serde_json::to_string_pretty(&result)?);
            }
        }

        Ok(())
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let default_log_directive = match cli.globals.debug {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };

    // Results go to stdout, so logs are JSON on stderr
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(default_log_directive.into())
                .from_env_lossy(),
        )
        .json()
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set subscriber");

    if let Err(e) = cli.command.execute(&cli.globals).await {
        error!("{:#}", e);
        exit(1);
    } else {
        debug!("command executed successfully");
    }
}
