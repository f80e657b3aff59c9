//! Credforge CLI
//!
//! Command-line interface for managing provisioner credentials.
//!
//! # Usage
//!
//! ```bash
//! # Create a credential from a JSON payload on stdin
//! echo '{"AccessKey": "A", "SecretKey": "B"}' | credforge create aws prod
//!
//! # Replace it with a YAML payload that names its provisioner
//! credforge update prod --input prod.yaml --content-type yaml
//!
//! # Print it back
//! credforge get prod --content-type yaml
//! ```

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use credforge_cli::{load_config, register_all, render, CliConfig, StoreKind};
use credforge_core::{
    create_store, ContentType, CredentialError, CredentialManager, CredentialStore,
    CredforgeError, DefaultCredentialManager, ProvisionerRegistry,
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::debug;
use tracing_subscriber::{fmt, EnvFilter};

type Manager = DefaultCredentialManager<Box<dyn CredentialStore>>;

#[derive(Parser)]
#[command(name = "credforge")]
#[command(about = "Provisioner credential management for the raibid-labs ecosystem")]
#[command(version)]
struct Cli {
    /// Path to the configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Storage backend (overrides the configuration file)
    #[arg(long, global = true, value_enum)]
    store: Option<StoreKind>,

    /// Directory for the file backend
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a credential for a provisioner
    Create {
        /// Provisioner name (e.g., aws, azure)
        provisioner: String,

        /// Key to store the credential under
        key: String,

        /// Payload file, or `-` for stdin
        #[arg(short, long, default_value = "-")]
        input: PathBuf,

        /// Payload content type (json, yaml or a MIME type)
        #[arg(short, long)]
        content_type: Option<ContentType>,
    },

    /// Replace an existing credential
    Update {
        /// Key of the credential to replace
        key: String,

        /// Payload file, or `-` for stdin
        #[arg(short, long, default_value = "-")]
        input: PathBuf,

        /// Payload content type (json, yaml or a MIME type)
        #[arg(short, long)]
        content_type: Option<ContentType>,
    },

    /// Print a credential
    Get {
        /// Key of the credential
        key: String,

        /// Output content type (json, yaml or a MIME type)
        #[arg(short, long)]
        content_type: Option<ContentType>,
    },

    /// List stored credential keys
    List,

    /// Exit with status 0 if a credential exists, 1 otherwise
    Exists {
        /// Key of the credential
        key: String,
    },

    /// Delete a credential
    Delete {
        /// Key of the credential
        key: String,
    },

    /// List registered provisioners
    Provisioners,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => code,
        Err(err) => {
            let (message, status) = render(&err);
            eprintln!("{}", message);
            ExitCode::from(status)
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let mut config = load_config(cli.config.as_deref())?;
    config.apply_overrides(cli.store, cli.data_dir);

    init_logging(&config, cli.verbose);
    debug!("Loaded configuration from {:?}", config.config_path);

    let registry = Arc::new(ProvisionerRegistry::new());
    register_all(&registry);

    let manager = build_manager(&config, registry)
        .await
        .context("Failed to open credential store")?;

    match cli.command {
        Commands::Create {
            provisioner,
            key,
            input,
            content_type,
        } => {
            let payload = read_input(&input).await?;
            manager
                .create_credential(&provisioner, &key, &payload, content_type)
                .await?;
            println!("Created {} credential {}", provisioner, key);
        }
        Commands::Update {
            key,
            input,
            content_type,
        } => {
            let payload = read_input(&input).await?;
            manager.update_credential(&key, &payload, content_type).await?;
            println!("Updated credential {}", key);
        }
        Commands::Get { key, content_type } => {
            let credential = manager.get(&key).await?;
            let bytes = manager
                .marshal(content_type, credential.as_ref())
                .map_err(CredentialError::from)?;
            write_output(&bytes).await?;
        }
        Commands::List => {
            for key in manager.list_ids().await? {
                println!("{}", key);
            }
        }
        Commands::Exists { key } => {
            return Ok(if manager.exists(&key).await {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            });
        }
        Commands::Delete { key } => {
            manager.delete(&key).await?;
            println!("Deleted credential {}", key);
        }
        Commands::Provisioners => {
            for name in manager.registry().names() {
                println!("{}", name);
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn init_logging(config: &CliConfig, verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level))
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn build_manager(
    config: &CliConfig,
    registry: Arc<ProvisionerRegistry>,
) -> Result<Manager, CredforgeError> {
    let store = create_store(&config.store).await?;

    Ok(DefaultCredentialManager::new(store, registry)
        .with_default_content_type(config.default_content_type))
}

async fn read_input(path: &Path) -> Result<Vec<u8>> {
    if path == Path::new("-") {
        let mut buf = Vec::new();
        tokio::io::stdin()
            .read_to_end(&mut buf)
            .await
            .context("Failed to read payload from stdin")?;
        Ok(buf)
    } else {
        tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read payload from {:?}", path))
    }
}

async fn write_output(bytes: &[u8]) -> Result<()> {
    let mut stdout = tokio::io::stdout();
    stdout.write_all(bytes).await?;
    if !bytes.ends_with(b"\n") {
        stdout.write_all(b"\n").await?;
    }
    stdout.flush().await?;
    Ok(())
}
