//! Authentication and role-gated identity management.
//!
//! JWT-based stateless authentication with Argon2 password hashing. Tokens
//! are validated locally on every request; the subject is re-resolved
//! against storage each time so role changes and deletions take effect
//! immediately.
//!
//! ## Identity Types
//!
//! - [`Account`] — Registered user with credentials and a role tag
//! - [`Role`] — Closed set of role tags with an exact-match policy
//!
//! ## Security
//!
//! - [`Crypto`] — JWT signing and verification
//! - [`Claims`] — JWT payload structure
//! - [`password`] — Argon2 hashing and verification
//! - [`AuthError`] — Failure taxonomy from hashing through verification
mod account;
mod claims;
mod crypto;
mod errors;
pub mod password;
mod role;
mod dto;

pub use account::*;
pub use claims::*;
pub use crypto::*;
pub use dto::*;
pub use errors::*;
pub use role::*;

#[cfg(feature = "database")]
mod repository;
#[cfg(feature = "database")]
pub use repository::*;

#[cfg(feature = "server")]
mod handlers;
#[cfg(feature = "server")]
mod middleware;
#[cfg(feature = "server")]
pub use handlers::*;
#[cfg(feature = "server")]
pub use middleware::*;
