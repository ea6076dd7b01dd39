use thiserror::Error;

/// Why a role lookup produced no usable answer.
///
/// None of these reach the resolver's caller; each one is logged and the
/// identity is treated as a non-admin.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    #[error("Profile lookup failed: {0}")]
    LookupFailed(String),

    #[error("No profile found")]
    NotFound,

    #[error("Expected one profile, found {0}")]
    Ambiguous(usize),

    #[error("Malformed profile: {0}")]
    Malformed(String),
}

impl From<supabase_client::SupabaseError> for LookupError {
    fn from(err: supabase_client::SupabaseError) -> Self {
        use supabase_client::SupabaseError;

        match err {
            SupabaseError::NoRows => LookupError::NotFound,
            SupabaseError::MultipleRows(n) => LookupError::Ambiguous(n),
            SupabaseError::Parse(msg) => LookupError::Malformed(msg),
            other => LookupError::LookupFailed(other.to_string()),
        }
    }
}
