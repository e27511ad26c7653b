//! Authentication: tokens, the authorize URL and token renewal.

pub mod oauth;
pub mod provider;
pub mod token;

pub use oauth::{OAuth2, VALID_SCOPES};
pub use provider::{AuthProvider, Grant};
pub use token::Token;
