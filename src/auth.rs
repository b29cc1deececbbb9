//! OIDC authentication: signed assertions, bearer tokens, and the caching token provider.

pub mod assertion;
pub mod provider;
pub mod token;

pub use assertion::*;
pub use provider::*;
pub use token::{secret::*, *};
