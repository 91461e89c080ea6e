//! SAML2 service provider registration.
//!
//! Loads trusted service provider definitions from `sso-idp-config.xml` at
//! startup and registers them into the shared issuer-keyed registry consulted
//! by the SSO protocol handlers.

pub mod loader;
pub mod registry;
pub mod types;

pub use loader::{SpConfigLoader, SP_CONFIG_FILE_NAME};
pub use registry::{InMemorySpRegistry, SpRegistry};
pub use types::ServiceProvider;
