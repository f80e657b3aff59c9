//! Credforge CLI Library
//!
//! This library exposes the CLI's configuration, bundled provisioner
//! schemas and error reporting for testing and for embedding in other tools.

pub mod config;
pub mod provisioners;
pub mod report;

pub use config::{load_config, CliConfig, StoreKind};
pub use provisioners::{register_all, AwsCredential, AzureCredential};
pub use report::{exit_status, render};
