//! `turnstile-auth` — stateless token inspection and credential storage.
//!
//! This crate decodes bearer-token claims and checks their freshness; it
//! never asserts trust. Signature verification belongs to the server that
//! issued the token.

pub mod claims;
pub mod roles;
pub mod store;
pub mod token;

pub use claims::{Claims, TokenError, decode, is_expired};
pub use roles::Role;
pub use store::{CredentialStore, InMemoryCredentialStore};
pub use token::BearerToken;
