//! Provisioner registry.
//!
//! Maps provisioner names to factories that allocate an empty credential of
//! that provisioner's schema. Provisioners register at process start; the
//! manager looks factories up on every decode.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use credforge_core::{Credential, ProvisionerCredential, ProvisionerRegistry};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, Clone, Default, Serialize, Deserialize)]
//! struct GcpCredential {
//!     service_account_json: String,
//! }
//!
//! impl ProvisionerCredential for GcpCredential {
//!     const PROVISIONER: &'static str = "gcp";
//! }
//!
//! let registry = Arc::new(ProvisionerRegistry::new());
//! registry.register_type::<GcpCredential>();
//!
//! let cred = registry.new_credential("gcp").unwrap();
//! assert_eq!(cred.provisioner_name(), "gcp");
//! assert!(registry.new_credential("aws").is_err());
//! ```

use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::credential::{Credential, ProvisionerCredential};
use crate::error::CredentialError;

/// Allocates an empty credential for one provisioner.
pub type CredentialFactory = Arc<dyn Fn() -> Box<dyn Credential> + Send + Sync>;

/// Registry of credential factories keyed by provisioner name.
///
/// # Thread Safety
///
/// One mutex guards the map for both registration and lookup. It is held only
/// for the map access; factories run after it is released.
pub struct ProvisionerRegistry {
    factories: Mutex<HashMap<String, CredentialFactory>>,
}

impl ProvisionerRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            factories: Mutex::new(HashMap::new()),
        }
    }

    /// Register the factory for a provisioner.
    ///
    /// If a factory with the same name already exists, it will be replaced.
    pub fn register<F>(&self, provisioner: impl Into<String>, factory: F)
    where
        F: Fn() -> Box<dyn Credential> + Send + Sync + 'static,
    {
        let provisioner = provisioner.into();
        let replaced = self
            .factories
            .lock()
            .insert(provisioner.clone(), Arc::new(factory))
            .is_some();

        if replaced {
            tracing::warn!(provisioner = %provisioner, "Replaced existing credential factory");
        } else {
            tracing::debug!(provisioner = %provisioner, "Registered credential factory");
        }
    }

    /// Register `T::default` under `T::PROVISIONER`.
    pub fn register_type<T>(&self)
    where
        T: ProvisionerCredential + Default,
    {
        self.register(T::PROVISIONER, || Box::new(T::default()));
    }

    /// Allocate an empty credential for `provisioner`.
    ///
    /// Fails with [`ErrorKind::UnknownProvisioner`](crate::ErrorKind::UnknownProvisioner)
    /// if nothing is registered under that name.
    pub fn new_credential(&self, provisioner: &str) -> Result<Box<dyn Credential>, CredentialError> {
        let factory = self.factories.lock().get(provisioner).cloned();
        match factory {
            Some(factory) => Ok(factory()),
            None => Err(CredentialError::unknown_provisioner(provisioner)),
        }
    }

    /// Check if a provisioner is registered.
    pub fn contains(&self, provisioner: &str) -> bool {
        self.factories.lock().contains_key(provisioner)
    }

    /// List all registered provisioner names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.factories.lock().keys().cloned().collect();
        names.sort();
        names
    }

    /// Get the number of registered provisioners.
    pub fn len(&self) -> usize {
        self.factories.lock().len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.factories.lock().is_empty()
    }
}

impl Default for ProvisionerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ProvisionerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProvisionerRegistry")
            .field("provisioners", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credential::Secret;
    use crate::error::ErrorKind;
    use serde::{Deserialize, Serialize};
    use std::thread;

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    struct LinodeCredential {
        token: Secret,
    }

    impl ProvisionerCredential for LinodeCredential {
        const PROVISIONER: &'static str = "linode";
    }

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    struct VultrCredential {
        api_key: Secret,
    }

    impl ProvisionerCredential for VultrCredential {
        const PROVISIONER: &'static str = "vultr";
    }

    #[test]
    fn test_registry_new() {
        let registry = ProvisionerRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn test_unknown_provisioner() {
        let registry = ProvisionerRegistry::new();
        for name in ["aws", "azure", "", "LINODE"] {
            let err = registry.new_credential(name).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::UnknownProvisioner);
        }
    }

    #[test]
    fn test_register_type_and_new() {
        let registry = ProvisionerRegistry::new();
        registry.register_type::<LinodeCredential>();

        assert!(registry.contains("linode"));
        let cred = registry.new_credential("linode").unwrap();
        assert_eq!(cred.provisioner_name(), "linode");
        assert_eq!(
            cred.downcast_ref::<LinodeCredential>(),
            Some(&LinodeCredential::default())
        );
    }

    #[test]
    fn test_each_call_returns_fresh_value() {
        let registry = ProvisionerRegistry::new();
        registry.register_type::<LinodeCredential>();

        let mut first = registry
            .new_credential("linode")
            .unwrap()
            .downcast::<LinodeCredential>()
            .unwrap();
        first.token = Secret::new("changed");

        let second = registry.new_credential("linode").unwrap();
        assert_eq!(
            second.downcast_ref::<LinodeCredential>(),
            Some(&LinodeCredential::default())
        );
    }

    #[test]
    fn test_last_registration_wins() {
        let registry = ProvisionerRegistry::new();
        registry.register_type::<LinodeCredential>();
        registry.register("linode", || Box::new(VultrCredential::default()));

        assert_eq!(registry.len(), 1);
        let cred = registry.new_credential("linode").unwrap();
        assert!(cred.is::<VultrCredential>());
    }

    #[test]
    fn test_names_sorted() {
        let registry = ProvisionerRegistry::new();
        registry.register_type::<VultrCredential>();
        registry.register_type::<LinodeCredential>();
        assert_eq!(registry.names(), vec!["linode", "vultr"]);
    }

    #[test]
    fn test_concurrent_register_and_lookup() {
        let registry = Arc::new(ProvisionerRegistry::new());
        registry.register_type::<LinodeCredential>();

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let registry = Arc::clone(&registry);
                thread::spawn(move || {
                    for j in 0..100 {
                        registry.register(format!("p-{}-{}", i, j), || {
                            Box::new(VultrCredential::default())
                        });
                        let cred = registry.new_credential("linode").unwrap();
                        assert_eq!(cred.provisioner_name(), "linode");
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(registry.len(), 1 + 8 * 100);
        assert!(registry.new_credential("p-3-42").unwrap().is::<VultrCredential>());
    }
}
