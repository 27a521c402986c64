//! core::types
//!
//! Strong types for core domain concepts.
//!
//! # Types
//!
//! - [`Label`] - Validated handle for clusters, roles, and projects
//! - [`ClusterUrl`] - Parsed absolute http(s) URL
//! - [`Email`] - Permissively validated email address
//! - [`Password`] - Opaque secret with a minimum-length policy
//! - [`AuthToken`] - Opaque base-64 session credential
//! - [`OrgRole`] / [`ProjectRole`] - The fixed sets of system roles
//!
//! # Validation
//!
//! These types enforce validity at construction time. Invalid values
//! cannot be represented, so downstream code never re-checks them.
//! Secret-bearing types render a fixed placeholder from `Display`;
//! the raw value is reachable only through an explicit call used by
//! creation flows.
//!
//! # Examples
//!
//! ```
//! use cape::core::types::{Label, ClusterUrl, Email};
//!
//! let label = Label::new("production").unwrap();
//! assert_eq!(label.as_str(), "production");
//!
//! let url = ClusterUrl::new("https://prod.example").unwrap();
//! assert_eq!(url.scheme(), "https");
//!
//! assert!(Label::new("Not Valid").is_err());
//! assert!(Email::new("not-an-email").is_err());
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use url::Url;

use super::errors::{causes, Error};

/// Maximum length of a label.
const MAX_LABEL_LEN: usize = 64;

/// Minimum length of a password.
const MIN_PASSWORD_LEN: usize = 8;

/// Placeholder rendered in place of secret material.
const SECRET_PLACEHOLDER: &str = "********";

/// A validated label.
///
/// Labels are the stable local handles for clusters, roles, and
/// projects. They must:
/// - be non-empty and at most 64 characters
/// - start with a lowercase ASCII letter
/// - contain only lowercase ASCII letters, digits, and hyphens
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Label(String);

impl Label {
    /// Create a new validated label.
    ///
    /// # Errors
    ///
    /// Returns a bad-request error with cause `invalid_label`.
    pub fn new(value: impl Into<String>) -> Result<Self, Error> {
        let value = value.into();
        Self::validate(&value)?;
        Ok(Self(value))
    }

    fn validate(value: &str) -> Result<(), Error> {
        if value.is_empty() {
            return Err(Error::bad_request(
                causes::INVALID_LABEL,
                "label cannot be empty",
            ));
        }
        if value.len() > MAX_LABEL_LEN {
            return Err(Error::bad_request(
                causes::INVALID_LABEL,
                format!("label cannot be longer than {} characters", MAX_LABEL_LEN),
            ));
        }
        let first = value.chars().next().unwrap_or_default();
        if !first.is_ascii_lowercase() {
            return Err(Error::bad_request(
                causes::INVALID_LABEL,
                "label must start with a lowercase letter",
            ));
        }
        if !value
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        {
            return Err(Error::bad_request(
                causes::INVALID_LABEL,
                "label may only contain lowercase letters, digits, and hyphens",
            ));
        }
        Ok(())
    }

    /// The label as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Label {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Error> {
        Self::new(value)
    }
}

impl From<Label> for String {
    fn from(label: Label) -> Self {
        label.0
    }
}

impl FromStr for Label {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        Self::new(s)
    }
}

/// A parsed absolute URL with an http or https scheme.
///
/// Always valid after construction; there is no empty value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClusterUrl(Url);

impl ClusterUrl {
    /// Parse and validate a cluster URL.
    ///
    /// # Errors
    ///
    /// Returns a bad-request error with cause `invalid_url` if the
    /// value does not parse or carries a scheme other than http/https.
    pub fn new(value: &str) -> Result<Self, Error> {
        let url = Url::parse(value).map_err(|e| {
            Error::bad_request(
                causes::INVALID_URL,
                format!("invalid url '{}': {}", value, e),
            )
        })?;
        match url.scheme() {
            "http" | "https" => {}
            other => {
                return Err(Error::bad_request(
                    causes::INVALID_URL,
                    format!("unsupported url scheme '{}'", other),
                ))
            }
        }
        if url.host_str().is_none() {
            return Err(Error::bad_request(
                causes::INVALID_URL,
                "url must carry a host",
            ));
        }
        Ok(Self(url))
    }

    /// The URL scheme ("http" or "https").
    pub fn scheme(&self) -> &str {
        self.0.scheme()
    }

    /// The host component.
    pub fn host(&self) -> &str {
        self.0.host_str().unwrap_or_default()
    }

    /// The port, if explicitly present.
    pub fn port(&self) -> Option<u16> {
        self.0.port()
    }

    /// The inner parsed URL.
    pub fn as_url(&self) -> &Url {
        &self.0
    }

    /// The URL rendered without a trailing slash on the root path.
    pub fn as_str(&self) -> &str {
        self.0.as_str().trim_end_matches('/')
    }
}

impl fmt::Display for ClusterUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for ClusterUrl {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Error> {
        Self::new(&value)
    }
}

impl From<ClusterUrl> for String {
    fn from(url: ClusterUrl) -> Self {
        url.as_str().to_string()
    }
}

/// A permissively validated email address.
///
/// The check accepts anything of the form `local@domain` with a
/// non-empty local part and a domain containing a dot. Full RFC
/// validation is the coordinator's job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// Create a new validated email.
    ///
    /// # Errors
    ///
    /// Returns a bad-request error with cause `invalid_email`.
    pub fn new(value: impl Into<String>) -> Result<Self, Error> {
        let value = value.into();
        let invalid =
            || Error::bad_request(causes::INVALID_EMAIL, format!("invalid email '{}'", value));
        let (local, domain) = value.split_once('@').ok_or_else(invalid)?;
        if local.is_empty() || domain.is_empty() || !domain.contains('.') {
            return Err(invalid());
        }
        Ok(Self(value))
    }

    /// Validate a candidate without constructing an email.
    ///
    /// Used as a UI prompt validator.
    pub fn validate(value: &str) -> Result<(), Error> {
        Self::new(value).map(|_| ())
    }

    /// The email as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Email {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Error> {
        Self::new(value)
    }
}

impl From<Email> for String {
    fn from(email: Email) -> Self {
        email.0
    }
}

/// An opaque password.
///
/// `Display` and `Debug` render a fixed placeholder. The raw value is
/// only reachable through [`Password::reveal`], which creation flows
/// call exactly once to show generated credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(String);

impl Password {
    /// Create a new validated password.
    ///
    /// # Errors
    ///
    /// Returns a bad-request error with cause `invalid_password` if the
    /// value is shorter than the minimum length.
    pub fn new(value: impl Into<String>) -> Result<Self, Error> {
        let value = value.into();
        if value.len() < MIN_PASSWORD_LEN {
            return Err(Error::bad_request(
                causes::INVALID_PASSWORD,
                format!("password must be at least {} characters", MIN_PASSWORD_LEN),
            ));
        }
        Ok(Self(value))
    }

    /// Validate a candidate without constructing a password.
    ///
    /// Used as a UI prompt validator.
    pub fn validate(value: &str) -> Result<(), Error> {
        Self::new(value).map(|_| ())
    }

    /// The raw secret. Call only from credential-display flows.
    pub fn reveal(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(SECRET_PLACEHOLDER)
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(\"********\")")
    }
}

/// An opaque base-64 session credential.
///
/// May be empty, which means "unauthenticated". Like [`Password`], the
/// printable form is a placeholder.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuthToken(String);

impl AuthToken {
    /// Wrap an issued token.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The empty (unauthenticated) token.
    pub fn empty() -> Self {
        Self(String::new())
    }

    /// Whether no token value is present.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The raw token for the authorization header.
    pub fn reveal(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            f.write_str("<none>")
        } else {
            f.write_str(SECRET_PLACEHOLDER)
        }
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AuthToken({})", self)
    }
}

/// Organization-level system roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrgRole {
    Admin,
    User,
}

impl OrgRole {
    /// The role label.
    pub fn label(&self) -> &'static str {
        match self {
            OrgRole::Admin => "admin",
            OrgRole::User => "user",
        }
    }
}

impl fmt::Display for OrgRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for OrgRole {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s {
            "admin" => Ok(OrgRole::Admin),
            "user" => Ok(OrgRole::User),
            other => Err(Error::bad_request(
                causes::INVALID_ROLE,
                format!("'{}' is not an organization role (admin, user)", other),
            )),
        }
    }
}

/// Project-level system roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectRole {
    Owner,
    Contributor,
    Reviewer,
    Member,
}

impl ProjectRole {
    /// The role label.
    pub fn label(&self) -> &'static str {
        match self {
            ProjectRole::Owner => "owner",
            ProjectRole::Contributor => "contributor",
            ProjectRole::Reviewer => "reviewer",
            ProjectRole::Member => "member",
        }
    }
}

impl fmt::Display for ProjectRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ProjectRole {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s {
            "owner" => Ok(ProjectRole::Owner),
            "contributor" => Ok(ProjectRole::Contributor),
            "reviewer" => Ok(ProjectRole::Reviewer),
            "member" => Ok(ProjectRole::Member),
            other => Err(Error::bad_request(
                causes::INVALID_ROLE,
                format!(
                    "'{}' is not a project role (owner, contributor, reviewer, member)",
                    other
                ),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::errors::causes;

    #[test]
    fn valid_labels() {
        for value in ["production", "a", "dev-2", "x9-y"] {
            assert!(Label::new(value).is_ok(), "expected '{}' valid", value);
        }
    }

    #[test]
    fn invalid_labels() {
        let long = "a".repeat(MAX_LABEL_LEN + 1);
        for value in [
            "",
            "Production",
            "9lives",
            "-lead",
            "has space",
            "uber_score",
            long.as_str(),
        ] {
            let err = Label::new(value.to_string()).unwrap_err();
            assert!(err.is(causes::INVALID_LABEL), "expected '{}' invalid", value);
        }
    }

    #[test]
    fn cluster_url_accepts_http_and_https() {
        let url = ClusterUrl::new("https://prod.example").unwrap();
        assert_eq!(url.scheme(), "https");
        assert_eq!(url.host(), "prod.example");
        assert_eq!(url.as_str(), "https://prod.example");

        let with_port = ClusterUrl::new("http://localhost:8080").unwrap();
        assert_eq!(with_port.port(), Some(8080));
    }

    #[test]
    fn cluster_url_rejects_other_schemes() {
        for value in ["ftp://example.com", "not a url", "file:///etc/passwd"] {
            let err = ClusterUrl::new(value).unwrap_err();
            assert!(err.is(causes::INVALID_URL), "expected '{}' invalid", value);
        }
    }

    #[test]
    fn email_validation() {
        assert!(Email::new("friend@cape.com").is_ok());
        for value in ["", "friend", "@cape.com", "friend@", "friend@cape"] {
            assert!(Email::new(value).is_err(), "expected '{}' invalid", value);
        }
    }

    #[test]
    fn password_minimum_length() {
        assert!(Password::new("longenough").is_ok());
        let err = Password::new("short").unwrap_err();
        assert!(err.is(causes::INVALID_PASSWORD));
    }

    #[test]
    fn password_never_renders_its_value() {
        let password = Password::new("super-secret-value").unwrap();
        assert_eq!(password.to_string(), SECRET_PLACEHOLDER);
        assert!(!format!("{:?}", password).contains("super-secret-value"));
        assert_eq!(password.reveal(), "super-secret-value");
    }

    #[test]
    fn auth_token_placeholder() {
        let token = AuthToken::new("abcdef012345");
        assert_eq!(token.to_string(), SECRET_PLACEHOLDER);
        assert_eq!(AuthToken::empty().to_string(), "<none>");
        assert!(AuthToken::empty().is_empty());
    }

    #[test]
    fn org_roles_parse_exactly() {
        assert_eq!("admin".parse::<OrgRole>().unwrap(), OrgRole::Admin);
        assert_eq!("user".parse::<OrgRole>().unwrap(), OrgRole::User);
        assert!("owner".parse::<OrgRole>().is_err());
    }

    #[test]
    fn project_roles_parse_exactly() {
        assert_eq!("owner".parse::<ProjectRole>().unwrap(), ProjectRole::Owner);
        assert_eq!(
            "reviewer".parse::<ProjectRole>().unwrap(),
            ProjectRole::Reviewer
        );
        let err = "admin".parse::<ProjectRole>().unwrap_err();
        assert!(err.is(causes::INVALID_ROLE));
    }

    #[test]
    fn label_serde_round_trip() {
        let label = Label::new("production").unwrap();
        let yaml = serde_yaml::to_string(&label).unwrap();
        let back: Label = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back, label);
    }

    #[test]
    fn label_serde_rejects_invalid() {
        let result: Result<Label, _> = serde_yaml::from_str("\"Not Valid\"");
        assert!(result.is_err());
    }
}
