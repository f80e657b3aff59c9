//! Credential model types.
//!
//! This module defines the values that flow through Credforge:
//! - [`Credential`] - Object-safe view of any provisioner credential
//! - [`ProvisionerCredential`] - Implemented by concrete provisioner schemas
//! - [`CredentialBase`] - Discriminator-only view of a serialized credential
//! - [`CredentialShape`] - Anything a codec or store can encode from and decode into
//! - [`Secret`] - A wrapper for sensitive fields that prevents accidental logging
//!
//! # Discriminator
//!
//! Every encoded credential carries a `provisioner` field naming the
//! provisioner that owns its schema. Concrete schemas must not declare that
//! field themselves; it is written on encode and checked on decode.
//!
//! # Example
//!
//! ```
//! use credforge_core::{Credential, ProvisionerCredential, Secret};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
//! struct DigitalOceanCredential {
//!     token: Secret,
//! }
//!
//! impl ProvisionerCredential for DigitalOceanCredential {
//!     const PROVISIONER: &'static str = "digitalocean";
//! }
//!
//! let cred: Box<dyn Credential> = Box::new(DigitalOceanCredential::default());
//! assert_eq!(cred.provisioner_name(), "digitalocean");
//! ```

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::codec::CodecError;

/// Format-neutral tree every codec and store converts to and from.
pub type Document = serde_json::Value;

/// Name of the discriminator field embedded in every encoded credential.
pub const PROVISIONER_FIELD: &str = "provisioner";

/// A structural shape that can be encoded to and decoded from a [`Document`].
///
/// Codecs and stores are shape-agnostic: they only ever see this trait, so
/// the same read can target a [`CredentialBase`] or a concrete credential.
pub trait CredentialShape: Send + Sync {
    /// Encode this value as a document.
    fn to_document(&self) -> Result<Document, CodecError>;

    /// Replace this value with the contents of `document`.
    ///
    /// On error the value is left unchanged.
    fn apply_document(&mut self, document: Document) -> Result<(), CodecError>;
}

/// Minimal view of an encoded credential: just the discriminator.
///
/// All provisioner-specific fields are ignored when decoding into this shape.
/// A record without the discriminator decodes to an empty provisioner name,
/// which no registry entry matches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialBase {
    #[serde(default)]
    provisioner: String,
}

impl CredentialBase {
    /// Create a base view for the given provisioner.
    pub fn new(provisioner: impl Into<String>) -> Self {
        Self {
            provisioner: provisioner.into(),
        }
    }

    /// The provisioner named by the discriminator.
    pub fn provisioner_name(&self) -> &str {
        &self.provisioner
    }
}

impl CredentialShape for CredentialBase {
    fn to_document(&self) -> Result<Document, CodecError> {
        serde_json::to_value(self).map_err(CodecError::Shape)
    }

    fn apply_document(&mut self, document: Document) -> Result<(), CodecError> {
        *self = serde_json::from_value(document).map_err(CodecError::Shape)?;
        Ok(())
    }
}

/// A concrete, provisioner-specific credential schema.
///
/// Implementing this trait is all a provisioner needs to do; [`Credential`]
/// and [`CredentialShape`] come for free.
pub trait ProvisionerCredential:
    Serialize + DeserializeOwned + fmt::Debug + Clone + Send + Sync + 'static
{
    /// Name this schema is registered under and written as the discriminator.
    const PROVISIONER: &'static str;
}

/// Object-safe view of a credential of any provisioner.
///
/// Values are usually produced by
/// [`ProvisionerRegistry::new_credential`](crate::registry::ProvisionerRegistry::new_credential)
/// and recovered as their concrete type with [`downcast_ref`](trait.Credential.html#method.downcast_ref)
/// or [`downcast`](trait.Credential.html#method.downcast).
pub trait Credential: CredentialShape + fmt::Debug {
    /// Name of the provisioner that owns this credential's schema.
    fn provisioner_name(&self) -> &str;

    fn as_shape(&self) -> &dyn CredentialShape;

    fn as_shape_mut(&mut self) -> &mut dyn CredentialShape;

    fn as_any(&self) -> &dyn Any;

    fn into_any(self: Box<Self>) -> Box<dyn Any + Send>;

    fn clone_box(&self) -> Box<dyn Credential>;
}

impl dyn Credential {
    /// Returns `true` if the concrete type is `T`.
    pub fn is<T: ProvisionerCredential>(&self) -> bool {
        self.as_any().is::<T>()
    }

    /// Borrow the credential as its concrete type.
    pub fn downcast_ref<T: ProvisionerCredential>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    /// Convert the credential into its concrete type.
    ///
    /// Returns `None` (dropping the value) if the concrete type is not `T`;
    /// check with [`is`](Self::is) first to keep it.
    pub fn downcast<T: ProvisionerCredential>(self: Box<Self>) -> Option<Box<T>> {
        self.into_any().downcast::<T>().ok()
    }
}

impl Clone for Box<dyn Credential> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

impl<T: ProvisionerCredential> CredentialShape for T {
    fn to_document(&self) -> Result<Document, CodecError> {
        let mut document = serde_json::to_value(self).map_err(CodecError::Shape)?;
        let fields = document
            .as_object_mut()
            .ok_or_else(|| CodecError::NotAnObject {
                provisioner: T::PROVISIONER.to_string(),
            })?;
        fields.insert(
            PROVISIONER_FIELD.to_string(),
            Document::String(T::PROVISIONER.to_string()),
        );
        Ok(document)
    }

    fn apply_document(&mut self, mut document: Document) -> Result<(), CodecError> {
        let fields = document
            .as_object_mut()
            .ok_or_else(|| CodecError::NotAnObject {
                provisioner: T::PROVISIONER.to_string(),
            })?;

        if let Some(found) = fields.remove(PROVISIONER_FIELD) {
            if found.as_str() != Some(T::PROVISIONER) {
                let found = match found {
                    Document::String(name) => name,
                    other => other.to_string(),
                };
                return Err(CodecError::ProvisionerMismatch {
                    expected: T::PROVISIONER.to_string(),
                    found,
                });
            }
        }

        *self = serde_json::from_value(document).map_err(CodecError::Shape)?;
        Ok(())
    }
}

impl<T: ProvisionerCredential> Credential for T {
    fn provisioner_name(&self) -> &str {
        T::PROVISIONER
    }

    fn as_shape(&self) -> &dyn CredentialShape {
        self
    }

    fn as_shape_mut(&mut self) -> &mut dyn CredentialShape {
        self
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any + Send> {
        self
    }

    fn clone_box(&self) -> Box<dyn Credential> {
        Box::new(self.clone())
    }
}

/// A secret value that prevents accidental exposure in logs.
///
/// The inner value is only accessible via [`expose()`](Secret::expose).
/// Debug and Display implementations show `[REDACTED]` instead of the value.
/// It serializes as a plain string, so provisioner schemas can use it for
/// their secret fields without changing the wire format. The memory is
/// zeroed when the value is dropped.
#[derive(Clone, Default, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct Secret(String);

impl Secret {
    /// Create a new secret from a string value.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Expose the secret value.
    ///
    /// Use sparingly and never log the result.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Consume the secret and return the inner value.
    pub fn into_inner(mut self) -> String {
        std::mem::take(&mut self.0)
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Secret([REDACTED])")
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl PartialEq for Secret {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for Secret {}

impl From<&str> for Secret {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Secret {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    struct ApiKeyCredential {
        api_key: Secret,
        region: String,
    }

    impl ProvisionerCredential for ApiKeyCredential {
        const PROVISIONER: &'static str = "example";
    }

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    struct OtherCredential {
        token: String,
    }

    impl ProvisionerCredential for OtherCredential {
        const PROVISIONER: &'static str = "other";
    }

    fn sample() -> ApiKeyCredential {
        ApiKeyCredential {
            api_key: Secret::new("k-123"),
            region: "eu-west-1".to_string(),
        }
    }

    #[test]
    fn test_secret_debug_redacted() {
        let secret = Secret::new("super-secret");
        let debug = format!("{:?}", secret);
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("REDACTED"));
    }

    #[test]
    fn test_secret_display_redacted() {
        let secret = Secret::new("super-secret");
        let display = format!("{}", secret);
        assert!(!display.contains("super-secret"));
        assert!(display.contains("REDACTED"));
    }

    #[test]
    fn test_secret_serializes_as_plain_string() {
        let value = serde_json::to_value(Secret::new("abc")).unwrap();
        assert_eq!(value, json!("abc"));
    }

    #[test]
    fn test_secret_zeroize() {
        let mut secret = Secret::new("abc");
        secret.zeroize();
        assert_eq!(secret.expose(), "");

        assert_eq!(Secret::from("xyz").into_inner(), "xyz");
    }

    #[test]
    fn test_credential_debug_hides_secret_fields() {
        let debug = format!("{:?}", sample());
        assert!(!debug.contains("k-123"));
        assert!(debug.contains("eu-west-1"));
    }

    #[test]
    fn test_to_document_writes_discriminator() {
        let document = sample().to_document().unwrap();
        assert_eq!(document["provisioner"], json!("example"));
        assert_eq!(document["api_key"], json!("k-123"));
        assert_eq!(document["region"], json!("eu-west-1"));
    }

    #[test]
    fn test_base_reads_only_discriminator() {
        let document = sample().to_document().unwrap();
        let mut base = CredentialBase::default();
        base.apply_document(document).unwrap();
        assert_eq!(base.provisioner_name(), "example");
    }

    #[test]
    fn test_base_without_discriminator_is_empty() {
        let mut base = CredentialBase::new("stale");
        base.apply_document(json!({ "api_key": "k" })).unwrap();
        assert_eq!(base.provisioner_name(), "");
    }

    #[test]
    fn test_base_rejects_non_object() {
        let mut base = CredentialBase::default();
        let result = base.apply_document(json!("aws"));
        assert!(matches!(result, Err(CodecError::Shape(_))));
    }

    #[test]
    fn test_apply_document_without_discriminator() {
        let mut cred = ApiKeyCredential::default();
        cred.apply_document(json!({ "api_key": "k-9", "region": "us-east-1" }))
            .unwrap();
        assert_eq!(cred.api_key.expose(), "k-9");
        assert_eq!(cred.region, "us-east-1");
    }

    #[test]
    fn test_apply_document_rejects_other_provisioner() {
        let mut cred = ApiKeyCredential::default();
        let result = cred.apply_document(json!({
            "provisioner": "other",
            "api_key": "k",
            "region": "r",
        }));

        match result {
            Err(CodecError::ProvisionerMismatch { expected, found }) => {
                assert_eq!(expected, "example");
                assert_eq!(found, "other");
            }
            other => panic!("unexpected result: {:?}", other),
        }
        assert_eq!(cred, ApiKeyCredential::default());
    }

    #[test]
    fn test_apply_document_rejects_non_object() {
        let mut cred = ApiKeyCredential::default();
        let result = cred.apply_document(json!(["not", "an", "object"]));
        assert!(matches!(result, Err(CodecError::NotAnObject { .. })));
    }

    #[test]
    fn test_document_round_trip() {
        let original = sample();
        let mut decoded = ApiKeyCredential::default();
        decoded.apply_document(original.to_document().unwrap()).unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn test_downcast() {
        let cred: Box<dyn Credential> = Box::new(sample());
        assert!(cred.is::<ApiKeyCredential>());
        assert!(!cred.is::<OtherCredential>());
        assert!(cred.downcast_ref::<OtherCredential>().is_none());
        assert_eq!(cred.downcast_ref::<ApiKeyCredential>(), Some(&sample()));

        let concrete = cred.downcast::<ApiKeyCredential>().unwrap();
        assert_eq!(*concrete, sample());
    }

    #[test]
    fn test_boxed_credential_clone() {
        let cred: Box<dyn Credential> = Box::new(sample());
        let copy = cred.clone();
        assert_eq!(copy.provisioner_name(), "example");
        assert_eq!(copy.downcast_ref::<ApiKeyCredential>(), Some(&sample()));
    }
}
