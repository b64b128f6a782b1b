use thiserror::Error;

use crate::AuthVariant;

/// Configuration errors, raised before any network attempt.
#[derive(Debug, Error)]
pub enum Error {
    /// A credential the selected auth variant requires was not supplied.
    #[error("{credential} is not set; it is required for the '{variant}' auth variant")]
    MissingCredential {
        credential: &'static str,
        variant: AuthVariant,
    },
}
