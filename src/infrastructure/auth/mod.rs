//! Authentication infrastructure
//!
//! Compact bearer token issuance and verification.

mod tokens;

pub use tokens::{far_future_expiry, hash_subject, IssuedToken, TokenConfig, TokenService};
