//! Error rendering and exit statuses.

use credforge_core::{CredentialError, CredforgeError, ErrorKind};

/// Exit status for a credential error of the given kind.
pub fn exit_status(kind: ErrorKind) -> u8 {
    match kind {
        ErrorKind::Generic => 1,
        ErrorKind::Duplicate => 2,
        ErrorKind::NotFound => 3,
        ErrorKind::UnknownProvisioner => 4,
    }
}

/// Render `err` for stderr and pick the exit status for it.
///
/// Credential errors print as `error[<kind>]: <message>`; everything else
/// prints its full context chain and exits with 1.
pub fn render(err: &anyhow::Error) -> (String, u8) {
    match credential_error(err) {
        Some(cred_err) => (
            format!("error[{}]: {}", cred_err.kind(), cred_err.message()),
            exit_status(cred_err.kind()),
        ),
        None => (format!("error: {:#}", err), 1),
    }
}

fn credential_error(err: &anyhow::Error) -> Option<&CredentialError> {
    err.downcast_ref::<CredentialError>()
        .or_else(|| match err.downcast_ref::<CredforgeError>() {
            Some(CredforgeError::Credential(inner)) => Some(inner),
            _ => None,
        })
}
