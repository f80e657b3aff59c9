//! Provisioner schemas bundled with the CLI.

use credforge_core::{ProvisionerCredential, ProvisionerRegistry, Secret};
use serde::{Deserialize, Serialize};

/// AWS access key pair.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AwsCredential {
    pub access_key: String,
    pub secret_key: Secret,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_token: Option<Secret>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

impl ProvisionerCredential for AwsCredential {
    const PROVISIONER: &'static str = "aws";
}

/// Azure service principal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AzureCredential {
    pub subscription_id: String,
    pub tenant_id: String,
    pub client_id: String,
    pub client_secret: Secret,
}

impl ProvisionerCredential for AzureCredential {
    const PROVISIONER: &'static str = "azure";
}

/// Register every bundled provisioner.
pub fn register_all(registry: &ProvisionerRegistry) {
    registry.register_type::<AwsCredential>();
    registry.register_type::<AzureCredential>();
}
