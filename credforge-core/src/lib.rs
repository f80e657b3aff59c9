//! # Credforge Core
//!
//! Core library for Credforge provisioner credential management.
//!
//! This crate provides:
//! - A credential model where each provisioner brings its own typed schema
//! - A registry mapping provisioner names to credential factories
//! - JSON and YAML codecs selected by content type
//! - A credential store abstraction with in-memory and file-backed implementations
//! - A manager implementing create/read/update/delete with two-phase decoding
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use credforge_core::{
//!     CredentialManager, DefaultCredentialManager, MemoryStore, ProvisionerRegistry,
//! };
//!
//! async fn store_key(registry: Arc<ProvisionerRegistry>) -> Result<(), credforge_core::CredentialError> {
//!     let manager = DefaultCredentialManager::new(MemoryStore::new(), registry);
//!     let payload = br#"{"access_key": "AKIA...", "secret_key": "..."}"#;
//!     manager.create_credential("aws", "prod", payload, None).await?;
//!
//!     let cred = manager.get("prod").await?;
//!     println!("{} credential: {:?}", cred.provisioner_name(), cred);
//!     Ok(())
//! }
//! ```

pub mod codec;
pub mod credential;
pub mod error;
pub mod manager;
pub mod registry;
pub mod store;

// Re-export commonly used types at crate root
pub use credential::{
    Credential,
    CredentialBase,
    CredentialShape,
    Document,
    ProvisionerCredential,
    Secret,
};

pub use codec::{
    Codec,
    CodecError,
    ContentType,
    JsonCodec,
    YamlCodec,
};

pub use error::{
    CredentialError,
    CredforgeError,
    ErrorKind,
};

pub use registry::{
    CredentialFactory,
    ProvisionerRegistry,
};

pub use store::{
    CredentialStore,
    FileStore,
    MemoryStore,
    StoreBackend,
    StoreError,
    create_store,
};

pub use manager::{
    CredentialManager,
    DefaultCredentialManager,
};
