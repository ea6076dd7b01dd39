//! Admin status resolution for Supabase-authenticated users.
//!
//! Given the current signed-in identity, [`AdminStatusResolver`] looks up the
//! identity's `role` in the `profiles` table and exposes whether it is
//! `"admin"`. Lookup failures are logged and read as "not admin"; callers only
//! ever see a boolean (or the [`AdminStatus`] it is derived from).

pub mod check;
pub mod config;
pub mod error;
pub mod identity;
pub mod resolver;
pub mod session;
pub mod supabase;
pub mod testing;
pub mod traits;

pub use check::{check, identity_for_subject, run_check, Report, Subject};
pub use config::Config;
pub use error::LookupError;
pub use identity::{identity_feed, Identity, IdentityPublisher};
pub use resolver::{AdminStatus, AdminStatusResolver, ADMIN_ROLE};
pub use session::follow_session;
pub use supabase::SupabaseProfileStore;
pub use traits::{BaseAuthProvider, BaseProfileStore};
