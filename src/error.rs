use thiserror::Error;

/// Result type for portal operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the credential store and job repository.
///
/// Invalid credentials are deliberately not a variant: login mismatches are
/// ordinary return values (`authenticate` yields `Ok(None)`) so the caller
/// cannot tell an unknown username from a wrong password.
#[derive(Debug, Error)]
pub enum Error {
    /// Signup collision. Recoverable; the store is left unchanged.
    #[error("username '{0}' is already taken")]
    DuplicateUsername(String),

    /// Usernames must be non-empty.
    #[error("username must not be empty")]
    EmptyUsername,

    /// Delete attempted by someone other than the posting's creator.
    #[error("posting #{id} belongs to another account")]
    NotPostingOwner { id: i64 },

    /// Any underlying persistence failure. Not retried; surfaced as-is.
    #[error("storage failure: {0}")]
    Storage(#[from] rusqlite::Error),

    /// The database file or its directory could not be set up.
    #[error("storage failure: {0}")]
    Io(#[from] std::io::Error),
}
