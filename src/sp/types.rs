//! Service provider record types.

use serde::{Deserialize, Serialize};

/// A trusted relying party registered with the identity provider.
///
/// One record per `<ServiceProvider>` entry in `sso-idp-config.xml`, keyed
/// in the registry by its issuer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceProvider {
    /// SP entity ID; unique key into the registry.
    pub issuer: String,

    /// Assertion Consumer Service URL (where the IdP posts responses).
    #[serde(default)]
    pub assertion_consumer_url: String,

    /// Custom login page shown for this SP (optional).
    #[serde(default)]
    pub custom_login_page_url: Option<String>,

    /// Qualify the subject with the user store domain.
    #[serde(default)]
    pub use_fully_qualified_username: bool,

    /// Participate in Single Logout.
    #[serde(default)]
    pub single_logout_enabled: bool,

    /// Logout endpoint; populated only when single logout is enabled.
    #[serde(default)]
    pub logout_url: Option<String>,

    /// Sign assertions issued to this SP.
    #[serde(default)]
    pub sign_assertions: bool,

    /// Sign the enclosing response.
    #[serde(default)]
    pub sign_response: bool,

    /// Keystore alias for the SP certificate; populated only when request
    /// signature validation is enabled.
    #[serde(default)]
    pub cert_alias: Option<String>,

    /// Claim URIs requested by the SP, in document order.
    #[serde(default)]
    pub requested_claims: Vec<String>,

    /// Include the attribute statement even without an explicit request.
    #[serde(default)]
    pub enable_attributes_by_default: bool,

    /// Audience URIs for the assertion audience restriction, in document order.
    #[serde(default)]
    pub requested_audiences: Vec<String>,

    /// Accept IdP-initiated SSO for this SP.
    #[serde(default)]
    pub idp_initiated_sso: bool,

    /// Index selecting among the SP's attribute consuming services; opaque
    /// to the loader.
    #[serde(default)]
    pub attribute_consuming_service_index: Option<String>,
}

impl ServiceProvider {
    /// Create a record with the given issuer and everything else unset.
    pub fn new(issuer: impl Into<String>) -> Self {
        Self {
            issuer: issuer.into(),
            ..Default::default()
        }
    }
}

impl Default for ServiceProvider {
    fn default() -> Self {
        Self {
            issuer: String::new(),
            assertion_consumer_url: String::new(),
            custom_login_page_url: None,
            use_fully_qualified_username: false,
            single_logout_enabled: false,
            logout_url: None,
            sign_assertions: false,
            sign_response: false,
            cert_alias: None,
            requested_claims: Vec::new(),
            enable_attributes_by_default: false,
            requested_audiences: Vec::new(),
            idp_initiated_sso: false,
            attribute_consuming_service_index: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_record() {
        let sp = ServiceProvider::new("https://sp.example.com");
        assert_eq!(sp.issuer, "https://sp.example.com");
        assert!(sp.assertion_consumer_url.is_empty());
        assert!(sp.logout_url.is_none());
        assert!(sp.requested_claims.is_empty());
        assert!(!sp.single_logout_enabled);
    }

    #[test]
    fn test_serde_round_trip() {
        let mut sp = ServiceProvider::new("https://sp.example.com");
        sp.assertion_consumer_url = "https://sp.example.com/acs".to_string();
        sp.requested_claims = vec!["http://example.org/claims/email".to_string()];

        let json = serde_json::to_string(&sp).unwrap();
        let back: ServiceProvider = serde_json::from_str(&json).unwrap();
        assert_eq!(back.issuer, sp.issuer);
        assert_eq!(back.assertion_consumer_url, sp.assertion_consumer_url);
        assert_eq!(back.requested_claims, sp.requested_claims);
    }
}
