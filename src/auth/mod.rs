//! Credential management for the keyed geocoding provider
//!
//! # Examples
//!
//! ```rust
//! use city_geocoder::auth::Credential;
//! use city_geocoder::app::models::ProviderKind;
//!
//! let credential = Credential::resolve(None, Some("my-api-key-123"), None);
//! assert_eq!(credential.provider(), ProviderKind::Keyed);
//! assert_eq!(credential.masked().as_deref(), Some("my-a...23"));
//! ```

pub mod credentials;

// Re-export main public API
pub use credentials::{
    get_auth_status, mask_secret, show_auth_status, AuthStatus, Credential, CredentialSource,
};
