pub mod authenticator;
pub mod claims;
pub mod clock;
pub mod codec;
pub mod error;
pub mod factory;
pub mod identity;
pub mod principal;
pub mod revocation;
pub mod service;
pub mod signing_key;

pub use authenticator::{RequestAuthenticator, extract_bearer};
pub use claims::Claims;
pub use clock::{Clock, ManualClock, SystemClock};
pub use codec::{IssuedToken, TokenCodec};
pub use error::AuthError;
pub use factory::{StartupError, build_auth_service};
pub use identity::{CredentialVerifier, Identity, IdentityError, IdentityResolver};
pub use principal::AuthenticatedPrincipal;
pub use revocation::{RevocationRegistry, TokenId};
pub use service::AuthService;
pub use signing_key::SigningKey;
