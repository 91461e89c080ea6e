//! Startup loader for `sso-idp-config.xml`.
//!
//! Reads the service provider definitions shipped in the configuration
//! directory and registers them into the issuer-keyed registry. The file is
//! optional: deployments that manage service providers entirely through the
//! management API ship without it. Failures never propagate to the host
//! lifecycle; the loader logs and leaves the registry untouched.

use anyhow::{Context, Result};
use roxmltree::{Document, Node};
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

use super::registry::SpRegistry;
use super::types::ServiceProvider;

/// Configuration file consulted at startup, relative to the config directory.
pub const SP_CONFIG_FILE_NAME: &str = "sso-idp-config.xml";

// Element names in sso-idp-config.xml.
const SERVICE_PROVIDER: &str = "ServiceProvider";
const ISSUER: &str = "Issuer";
const ASSERTION_CONSUMER_URL: &str = "AssertionConsumerUrl";
const CUSTOM_LOGIN_PAGE: &str = "CustomLoginPage";
const USE_FULLY_QUALIFIED_USERNAME: &str = "UseFullyQualifiedUserName";
const SINGLE_LOGOUT: &str = "SingleLogout";
const LOGOUT_URL: &str = "LogoutURL";
const SIGN_ASSERTION: &str = "SignAssertion";
const SIGN_RESPONSE: &str = "SignResponse";
const SIG_VALIDATION: &str = "SigValidation";
const CERT_ALIAS: &str = "CertAlias";
const ATTRIBUTE_PROFILE: &str = "AttributeProfile";
const CLAIMS: &str = "Claims";
const CLAIM: &str = "Claim";
const INCLUDE_ATTRIBUTE: &str = "IncludeAttribute";
const AUDIENCE_RESTRICTION: &str = "AudienceRestriction";
const AUDIENCE_LIST: &str = "AudienceList";
const AUDIENCE: &str = "Audience";
const IDP_INIT: &str = "IdPInit";
const CONSUMING_SERVICE_INDEX: &str = "AttributeConsumingServiceIndex";

/// Running defaults for the three fields whose explicit value carries over
/// to later entries that omit them. All three start out enabled.
///
/// Entry N's resolved value can depend on entry N-1's explicit value; the
/// accumulator is threaded through the fold over entries to keep that
/// carry-over exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct EntryDefaults {
    fully_qualified_username: bool,
    single_logout: bool,
    sign_assertions: bool,
}

impl Default for EntryDefaults {
    fn default() -> Self {
        Self {
            fully_qualified_username: true,
            single_logout: true,
            sign_assertions: true,
        }
    }
}

/// Loads service provider definitions from the configuration directory and
/// registers them.
pub struct SpConfigLoader {
    config_dir: PathBuf,
}

impl SpConfigLoader {
    /// Create a loader rooted at the given configuration directory.
    pub fn new(config_dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: config_dir.into(),
        }
    }

    /// Load `sso-idp-config.xml` and register every service provider it
    /// defines. Never returns an error to the caller: a missing file is a
    /// warning, a read or parse failure discards the whole batch with an
    /// error log, and the registry is left as it was.
    pub fn load_and_register(&self, registry: &dyn SpRegistry) {
        let path = self.config_dir.join(SP_CONFIG_FILE_NAME);

        if !path.exists() {
            warn!(
                path = %path.display(),
                "sso-idp-config.xml not found; relying on service providers \
                 registered through the management API"
            );
            return;
        }

        let providers = match read_service_providers(&path) {
            Ok(providers) => providers,
            Err(e) => {
                error!(
                    path = %path.display(),
                    error = %e,
                    "Failed to read service providers from sso-idp-config.xml"
                );
                return;
            }
        };

        for sp in providers {
            let issuer = sp.issuer.clone();
            match registry.add_service_provider(&issuer, sp) {
                Ok(()) => info!(issuer = %issuer, "Registered SSO service provider"),
                Err(e) => {
                    error!(issuer = %issuer, error = %e, "Failed to register service provider")
                }
            }
        }
    }
}

/// Parse the configuration file into service provider records, in document
/// order.
///
/// Entries without an issuer are skipped with a warning; their explicit
/// default-carrying values still update the running defaults so later
/// entries resolve the same way they would have with the entry present.
fn read_service_providers(path: &Path) -> Result<Vec<ServiceProvider>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let doc = Document::parse(&text)
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    let mut providers = Vec::new();
    let mut defaults = EntryDefaults::default();

    for (index, node) in doc
        .descendants()
        .filter(|n| n.has_tag_name(SERVICE_PROVIDER))
        .enumerate()
    {
        let (next_defaults, sp) = parse_entry(node, defaults);
        defaults = next_defaults;
        match sp {
            Some(sp) => providers.push(sp),
            None => {
                warn!(entry = index, "Skipping service provider entry without an Issuer")
            }
        }
    }

    Ok(providers)
}

/// Build one record from a `<ServiceProvider>` element, resolving the
/// default-carrying fields against the accumulator.
///
/// Returns the updated accumulator and the record, or `None` when the entry
/// has no usable issuer. The accumulator is updated even for rejected
/// entries.
fn parse_entry(node: Node, mut defaults: EntryDefaults) -> (EntryDefaults, Option<ServiceProvider>) {
    if let Some(text) = text_value(node, USE_FULLY_QUALIFIED_USERNAME) {
        defaults.fully_qualified_username = text.eq_ignore_ascii_case("true");
    }
    if let Some(text) = text_value(node, SINGLE_LOGOUT) {
        defaults.single_logout = text.eq_ignore_ascii_case("true");
    }
    if let Some(text) = text_value(node, SIGN_ASSERTION) {
        defaults.sign_assertions = text.eq_ignore_ascii_case("true");
    }

    let issuer = match text_value(node, ISSUER) {
        Some(issuer) if !issuer.is_empty() => issuer.to_string(),
        _ => return (defaults, None),
    };

    let mut sp = ServiceProvider::new(issuer);
    sp.assertion_consumer_url = text_value(node, ASSERTION_CONSUMER_URL)
        .unwrap_or_default()
        .to_string();
    sp.custom_login_page_url = text_value(node, CUSTOM_LOGIN_PAGE).map(str::to_string);

    sp.use_fully_qualified_username = defaults.fully_qualified_username;
    sp.single_logout_enabled = defaults.single_logout;
    if sp.single_logout_enabled {
        sp.logout_url = text_value(node, LOGOUT_URL).map(str::to_string);
    }
    sp.sign_assertions = defaults.sign_assertions;

    sp.sign_response = bool_flag(node, SIGN_RESPONSE);

    if bool_flag(node, SIG_VALIDATION) {
        sp.cert_alias = text_value(node, CERT_ALIAS).map(str::to_string);
    }

    if bool_flag(node, ATTRIBUTE_PROFILE) {
        if has_element(node, CLAIMS) {
            sp.requested_claims = text_values(node, CLAIM);
        }
        sp.enable_attributes_by_default = bool_flag(node, INCLUDE_ATTRIBUTE);
    }

    if bool_flag(node, AUDIENCE_RESTRICTION) && has_element(node, AUDIENCE_LIST) {
        sp.requested_audiences = text_values(node, AUDIENCE);
    }

    sp.idp_initiated_sso = bool_flag(node, IDP_INIT);
    sp.attribute_consuming_service_index =
        text_value(node, CONSUMING_SERVICE_INDEX).map(str::to_string);

    (defaults, Some(sp))
}

/// Text of the first descendant element with the given name, untrimmed.
fn text_value<'a>(node: Node<'a, '_>, tag: &str) -> Option<&'a str> {
    node.descendants()
        .find(|n| n.has_tag_name(tag))
        .and_then(|n| n.text())
}

/// Texts of all descendant elements with the given name, in document order.
fn text_values(node: Node, tag: &str) -> Vec<String> {
    node.descendants()
        .filter(|n| n.has_tag_name(tag))
        .filter_map(|n| n.text())
        .map(str::to_string)
        .collect()
}

/// Whether a descendant element with the given name exists.
fn has_element(node: Node, tag: &str) -> bool {
    node.descendants().any(|n| n.has_tag_name(tag))
}

/// Boolean flag coercion: `true` iff the element text is `"true"`
/// case-insensitively. Absent elements, empty text, and anything else read
/// as `false`, so "not specified" and "explicitly false" are
/// indistinguishable for these flags.
fn bool_flag(node: Node, tag: &str) -> bool {
    text_value(node, tag)
        .map(|t| t.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}
