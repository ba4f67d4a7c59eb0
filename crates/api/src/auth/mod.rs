//! Authentication primitives.
//!
//! - [`password`] -- Argon2id password hashing and verification.
//! - [`jwt`] -- session token issuance and validation ([`jwt::CredentialService`]).

pub mod jwt;
pub mod password;
