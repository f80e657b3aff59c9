//! Credential manager.
//!
//! This module provides [`DefaultCredentialManager`], the implementation of
//! [`CredentialManager`] that ties a [`CredentialStore`], the
//! [`ProvisionerRegistry`] and the codecs together.
//!
//! # Two-phase decode
//!
//! Stored records and update payloads do not say up front which schema they
//! use. The manager first decodes them into a [`CredentialBase`] to read the
//! `provisioner` discriminator, asks the registry for an empty credential of
//! that provisioner, and then decodes the same record or payload again into it.
//!
//! `get` reads the store twice and is not transactional. If the record is
//! replaced with one of a different provisioner between the two reads, the
//! second decode fails with a provisioner mismatch instead of returning a
//! wrongly typed value.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use credforge_core::{
//!     CredentialManager, DefaultCredentialManager, MemoryStore, ProvisionerRegistry,
//! };
//!
//! let registry = Arc::new(ProvisionerRegistry::new());
//! registry.register_type::<AwsCredential>();
//!
//! let manager = DefaultCredentialManager::new(MemoryStore::new(), registry);
//! manager
//!     .create_credential("aws", "prod", br#"{"access_key": "A", "secret_key": "B"}"#, None)
//!     .await?;
//!
//! let cred = manager.get("prod").await?;
//! assert_eq!(cred.provisioner_name(), "aws");
//! ```

use async_trait::async_trait;
use std::sync::Arc;

use crate::codec::{Codec, CodecError, ContentType};
use crate::credential::{Credential, CredentialBase, CredentialShape};
use crate::error::CredentialError;
use crate::registry::ProvisionerRegistry;
use crate::store::CredentialStore;

/// Create, read, update and delete typed credentials.
///
/// Create and update check existence before decoding anything, so a
/// malformed payload never touches an existing record and create never
/// overwrites one.
#[async_trait]
pub trait CredentialManager: Send + Sync {
    /// Allocate an empty credential for a provisioner.
    fn new_credential(&self, provisioner: &str) -> Result<Box<dyn Credential>, CredentialError>;

    /// Decode `data` into `target` using the given content type.
    ///
    /// `None` selects the manager's default content type.
    fn unmarshal(
        &self,
        content_type: Option<ContentType>,
        data: &[u8],
        target: &mut dyn CredentialShape,
    ) -> Result<(), CodecError>;

    /// Encode a credential using the given content type.
    ///
    /// `None` selects the manager's default content type.
    fn marshal(
        &self,
        content_type: Option<ContentType>,
        credential: &dyn Credential,
    ) -> Result<Vec<u8>, CodecError>;

    /// List the keys of all stored credentials.
    async fn list_ids(&self) -> Result<Vec<String>, CredentialError>;

    /// Store a credential under `key`, replacing any existing one.
    async fn save(&self, key: &str, credential: &dyn Credential) -> Result<(), CredentialError>;

    /// Load the credential stored under `key` as its concrete type.
    async fn get(&self, key: &str) -> Result<Box<dyn Credential>, CredentialError>;

    /// Delete the credential stored under `key`.
    async fn delete(&self, key: &str) -> Result<(), CredentialError>;

    /// Returns `true` if a credential is stored under `key` and can be read.
    async fn exists(&self, key: &str) -> bool;

    /// Create a new credential for `provisioner` from an encoded payload.
    ///
    /// Fails with `Duplicate` if `key` is taken and `UnknownProvisioner` if
    /// no factory is registered for `provisioner`.
    async fn create_credential(
        &self,
        provisioner: &str,
        key: &str,
        input: &[u8],
        content_type: Option<ContentType>,
    ) -> Result<(), CredentialError>;

    /// Replace an existing credential with an encoded payload.
    ///
    /// The payload names its own provisioner. Fails with `NotFound` if `key`
    /// is not stored and `UnknownProvisioner` if the payload's provisioner
    /// is not registered.
    async fn update_credential(
        &self,
        key: &str,
        input: &[u8],
        content_type: Option<ContentType>,
    ) -> Result<(), CredentialError>;
}

/// Default implementation of [`CredentialManager`].
///
/// # Type Parameters
///
/// * `S` - The credential store implementation to use
pub struct DefaultCredentialManager<S: CredentialStore> {
    store: S,
    registry: Arc<ProvisionerRegistry>,
    default_content_type: ContentType,
}

impl<S: CredentialStore> DefaultCredentialManager<S> {
    /// Create a new manager over the given store and registry.
    ///
    /// Uses JSON as the default content type.
    pub fn new(store: S, registry: Arc<ProvisionerRegistry>) -> Self {
        Self {
            store,
            registry,
            default_content_type: ContentType::default(),
        }
    }

    /// Set the content type used when callers pass `None`.
    pub fn with_default_content_type(mut self, content_type: ContentType) -> Self {
        self.default_content_type = content_type;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn registry(&self) -> &Arc<ProvisionerRegistry> {
        &self.registry
    }

    pub fn default_content_type(&self) -> ContentType {
        self.default_content_type
    }

    /// The codec for `content_type`, or for the default content type.
    pub fn codec(&self, content_type: Option<ContentType>) -> &'static dyn Codec {
        content_type.unwrap_or(self.default_content_type).codec()
    }
}

impl<S: CredentialStore> std::fmt::Debug for DefaultCredentialManager<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DefaultCredentialManager")
            .field("registry", &self.registry)
            .field("default_content_type", &self.default_content_type)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl<S: CredentialStore + 'static> CredentialManager for DefaultCredentialManager<S> {
    fn new_credential(&self, provisioner: &str) -> Result<Box<dyn Credential>, CredentialError> {
        self.registry.new_credential(provisioner)
    }

    fn unmarshal(
        &self,
        content_type: Option<ContentType>,
        data: &[u8],
        target: &mut dyn CredentialShape,
    ) -> Result<(), CodecError> {
        let codec = self.codec(content_type);
        tracing::trace!(content_type = %codec.content_type(), len = data.len(), "Decoding payload");
        codec.unmarshal(data, target)
    }

    fn marshal(
        &self,
        content_type: Option<ContentType>,
        credential: &dyn Credential,
    ) -> Result<Vec<u8>, CodecError> {
        let codec = self.codec(content_type);
        tracing::trace!(
            content_type = %codec.content_type(),
            provisioner = %credential.provisioner_name(),
            "Encoding credential"
        );
        codec.marshal(credential.as_shape())
    }

    async fn list_ids(&self) -> Result<Vec<String>, CredentialError> {
        Ok(self.store.list().await?)
    }

    async fn save(&self, key: &str, credential: &dyn Credential) -> Result<(), CredentialError> {
        tracing::debug!(
            key = %key,
            provisioner = %credential.provisioner_name(),
            "Saving credential"
        );
        self.store.save(key, credential.as_shape()).await?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Box<dyn Credential>, CredentialError> {
        let mut base = CredentialBase::default();
        self.store.get(key, &mut base).await?;

        let mut detail = self.new_credential(base.provisioner_name())?;
        self.store.get(key, detail.as_shape_mut()).await?;

        tracing::debug!(
            key = %key,
            provisioner = %detail.provisioner_name(),
            "Loaded credential"
        );
        Ok(detail)
    }

    async fn delete(&self, key: &str) -> Result<(), CredentialError> {
        self.store.delete(key).await?;
        tracing::debug!(key = %key, "Deleted credential");
        Ok(())
    }

    async fn exists(&self, key: &str) -> bool {
        let mut base = CredentialBase::default();
        self.store.get(key, &mut base).await.is_ok()
    }

    async fn create_credential(
        &self,
        provisioner: &str,
        key: &str,
        input: &[u8],
        content_type: Option<ContentType>,
    ) -> Result<(), CredentialError> {
        if self.exists(key).await {
            tracing::warn!(key = %key, "Refusing to create credential: key exists");
            return Err(CredentialError::duplicate(key));
        }

        let mut credential = self.new_credential(provisioner)?;

        self.unmarshal(content_type, input, credential.as_shape_mut())
            .map_err(CredentialError::generic)?;
        self.store
            .save(key, credential.as_shape())
            .await
            .map_err(CredentialError::generic)?;

        tracing::info!(key = %key, provisioner = %provisioner, "Created credential");
        Ok(())
    }

    async fn update_credential(
        &self,
        key: &str,
        input: &[u8],
        content_type: Option<ContentType>,
    ) -> Result<(), CredentialError> {
        if !self.exists(key).await {
            tracing::warn!(key = %key, "Refusing to update credential: key not found");
            return Err(CredentialError::not_found(key));
        }

        let mut base = CredentialBase::default();
        self.unmarshal(content_type, input, &mut base)
            .map_err(CredentialError::generic)?;

        let mut detail = self.new_credential(base.provisioner_name())?;
        self.unmarshal(content_type, input, detail.as_shape_mut())
            .map_err(CredentialError::generic)?;

        self.store
            .save(key, detail.as_shape())
            .await
            .map_err(CredentialError::generic)?;

        tracing::info!(
            key = %key,
            provisioner = %base.provisioner_name(),
            "Updated credential"
        );
        Ok(())
    }
}
