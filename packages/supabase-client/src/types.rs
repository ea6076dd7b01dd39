use serde::Deserialize;

/// Equality filter on a PostgREST column (`column=eq.value`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EqFilter {
    pub column: String,
    pub value: String,
}

impl EqFilter {
    pub fn new(column: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            value: value.into(),
        }
    }

    /// Render as a query pair, e.g. `("id", "eq.u1")`.
    pub fn to_query_pair(&self) -> (String, String) {
        (self.column.clone(), format!("eq.{}", self.value))
    }
}

/// User returned by `GET /auth/v1/user`.
#[derive(Debug, Clone, Deserialize)]
pub struct SupabaseUser {
    pub id: String,
    pub email: Option<String>,
    /// Postgres role of the session (`authenticated`, `anon`), not the profile role.
    pub role: Option<String>,
    pub aud: Option<String>,
}

/// Error body shape shared by PostgREST and GoTrue.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorBody {
    pub message: Option<String>,
    pub msg: Option<String>,
    pub error_description: Option<String>,
}

impl ErrorBody {
    pub(crate) fn into_message(self) -> Option<String> {
        self.message.or(self.msg).or(self.error_description)
    }
}
