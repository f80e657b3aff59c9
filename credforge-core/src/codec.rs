//! Wire codecs for credential payloads.
//!
//! A codec turns bytes into a [`Document`] and back; the
//! [`CredentialShape`] it is handed decides what the document means. A
//! [`ContentType`] token selects the codec, and `None` falls back to
//! [`ContentType::default()`] (JSON).
//!
//! # Example
//!
//! ```
//! use credforge_core::codec::ContentType;
//!
//! let ct: ContentType = "application/x-yaml".parse().unwrap();
//! assert_eq!(ct, ContentType::Yaml);
//! assert_eq!(ContentType::resolve(None), ContentType::Json);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::credential::{CredentialShape, Document};

/// Error type for encoding and decoding credentials.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The bytes are not valid JSON, or the document cannot be written as JSON.
    #[error("JSON error: {0}")]
    Json(#[source] serde_json::Error),

    /// The bytes are not valid YAML, or the document cannot be written as YAML.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The document does not match the structure of the target shape.
    #[error("invalid credential document: {0}")]
    Shape(#[source] serde_json::Error),

    /// The credential does not encode to, or the payload is not, a map of fields.
    #[error("credential for provisioner '{provisioner}' must be a map of fields")]
    NotAnObject { provisioner: String },

    /// The payload names a different provisioner than the target schema.
    #[error("provisioner mismatch: expected '{expected}', got '{found}'")]
    ProvisionerMismatch { expected: String, found: String },

    /// The content type string is not recognized.
    #[error("unsupported content type: {0}")]
    UnsupportedContentType(String),
}

/// A pluggable serialization strategy.
pub trait Codec: Send + Sync {
    /// The content type this codec reads and writes.
    fn content_type(&self) -> ContentType;

    /// Serialize a document to bytes.
    fn encode(&self, document: &Document) -> Result<Vec<u8>, CodecError>;

    /// Parse bytes into a document.
    fn decode(&self, bytes: &[u8]) -> Result<Document, CodecError>;

    /// Encode any shape to bytes.
    fn marshal(&self, shape: &dyn CredentialShape) -> Result<Vec<u8>, CodecError> {
        self.encode(&shape.to_document()?)
    }

    /// Decode bytes into the given shape, replacing its contents.
    fn unmarshal(&self, bytes: &[u8], target: &mut dyn CredentialShape) -> Result<(), CodecError> {
        target.apply_document(self.decode(bytes)?)
    }
}

/// JSON codec (`application/json`). The default.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn content_type(&self) -> ContentType {
        ContentType::Json
    }

    fn encode(&self, document: &Document) -> Result<Vec<u8>, CodecError> {
        serde_json::to_vec_pretty(document).map_err(CodecError::Json)
    }

    fn decode(&self, bytes: &[u8]) -> Result<Document, CodecError> {
        serde_json::from_slice(bytes).map_err(CodecError::Json)
    }
}

/// YAML codec (`application/x-yaml`).
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlCodec;

impl Codec for YamlCodec {
    fn content_type(&self) -> ContentType {
        ContentType::Yaml
    }

    fn encode(&self, document: &Document) -> Result<Vec<u8>, CodecError> {
        Ok(serde_yaml::to_string(document)?.into_bytes())
    }

    fn decode(&self, bytes: &[u8]) -> Result<Document, CodecError> {
        Ok(serde_yaml::from_slice(bytes)?)
    }
}

static JSON: JsonCodec = JsonCodec;
static YAML: YamlCodec = YamlCodec;

/// Selects a [`Codec`].
///
/// Serializes as its short name. Deserializes from anything [`FromStr`]
/// accepts, so configuration files may use MIME types.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum ContentType {
    #[default]
    Json,
    Yaml,
}

impl ContentType {
    /// Resolve an optional selector, falling back to the default content type.
    pub fn resolve(selector: Option<ContentType>) -> ContentType {
        selector.unwrap_or_default()
    }

    /// Canonical MIME type.
    pub fn mime(&self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Yaml => "application/x-yaml",
        }
    }

    /// The codec for this content type.
    pub fn codec(&self) -> &'static dyn Codec {
        match self {
            Self::Json => &JSON,
            Self::Yaml => &YAML,
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.mime())
    }
}

impl FromStr for ContentType {
    type Err = CodecError;

    /// Accepts MIME types (parameters such as `; charset=utf-8` are ignored)
    /// and the short names `json`, `yaml` and `yml`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let essence = s.split(';').next().unwrap_or("").trim().to_ascii_lowercase();
        match essence.as_str() {
            "application/json" | "text/json" | "json" => Ok(Self::Json),
            "application/x-yaml" | "application/yaml" | "text/yaml" | "text/x-yaml" | "yaml"
            | "yml" => Ok(Self::Yaml),
            _ => Err(CodecError::UnsupportedContentType(s.to_string())),
        }
    }
}

impl TryFrom<String> for ContentType {
    type Error = CodecError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}
