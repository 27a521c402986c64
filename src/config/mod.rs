//! config
//!
//! Persisted per-user CLI configuration.
//!
//! # Overview
//!
//! One YAML file per user holds the registered clusters, the current
//! cluster selection, and UI preferences. The file is created with
//! defaults on first read and rewritten atomically on every mutation.
//!
//! # Location
//!
//! 1. `$CAPE_HOME/config.yaml` if `CAPE_HOME` is set
//! 2. `~/.cape/config.yaml` otherwise
//!
//! # Permissions
//!
//! The enclosing directory and the file itself are owner-only (0700).
//! The stored auth token leaves this module only through the client
//! transport built from a [`Cluster`].
//!
//! # Invariants
//!
//! - `version` is exactly 1
//! - cluster labels are unique
//! - if a current cluster is set, a matching record exists
//!
//! # Example
//!
//! ```no_run
//! use cape::config::Config;
//! use cape::core::types::{ClusterUrl, Label};
//!
//! let mut config = Config::parse().unwrap();
//! config.add_cluster(
//!     Label::new("production").unwrap(),
//!     ClusterUrl::new("https://prod.example").unwrap(),
//! ).unwrap();
//! config.write().unwrap();
//! ```

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::errors::{causes, Error};
use crate::core::types::{AuthToken, ClusterUrl, Label};

/// Environment variable overriding the config directory.
pub const CAPE_HOME: &str = "CAPE_HOME";

/// Dot-directory under the user's home when `CAPE_HOME` is unset.
const CONFIG_DIR: &str = ".cape";

/// Fixed config file name.
const CONFIG_FILE: &str = "config.yaml";

/// The only supported schema version.
const SCHEMA_VERSION: u32 = 1;

/// Owner-only mode for the config directory and file.
#[cfg(unix)]
const OWNER_ONLY: u32 = 0o700;

/// A registered cluster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cluster {
    /// Local handle for the cluster.
    pub label: Label,
    /// Coordinator endpoint.
    pub url: ClusterUrl,
    /// Stored session token, if authenticated.
    #[serde(default, skip_serializing_if = "AuthToken::is_empty")]
    pub auth_token: AuthToken,
    /// Optional extra TLS trust anchor (PEM file).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tls_cert: Option<PathBuf>,
}

impl Cluster {
    /// Create an unauthenticated cluster record.
    pub fn new(label: Label, url: ClusterUrl) -> Self {
        Self {
            label,
            url,
            auth_token: AuthToken::empty(),
            tls_cert: None,
        }
    }
}

/// UI preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiPrefs {
    pub colors: bool,
    pub animations: bool,
}

impl Default for UiPrefs {
    fn default() -> Self {
        Self {
            colors: true,
            animations: true,
        }
    }
}

/// The current-cluster selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Context {
    /// Label of the current cluster, or `None` when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster: Option<Label>,
}

/// The persisted configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Schema version; must be 1.
    pub version: u32,
    #[serde(default)]
    pub ui: UiPrefs,
    #[serde(default)]
    pub context: Context,
    #[serde(default)]
    pub clusters: Vec<Cluster>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: SCHEMA_VERSION,
            ui: UiPrefs::default(),
            context: Context::default(),
            clusters: Vec::new(),
        }
    }
}

impl Config {
    /// Resolve the config file path.
    ///
    /// # Errors
    ///
    /// Fails only when `CAPE_HOME` is unset and no home directory can
    /// be determined.
    pub fn path() -> Result<PathBuf, Error> {
        if let Ok(home) = std::env::var(CAPE_HOME) {
            if !home.is_empty() {
                return Ok(PathBuf::from(home).join(CONFIG_FILE));
            }
        }
        let home = dirs::home_dir().ok_or_else(|| {
            Error::internal(causes::INVALID_CONFIG, "home directory not found")
        })?;
        Ok(home.join(CONFIG_DIR).join(CONFIG_FILE))
    }

    /// Read the config from its default location.
    ///
    /// Missing file is not an error; defaults are returned. A present
    /// but invalid file fails closed.
    pub fn parse() -> Result<Self, Error> {
        Self::parse_from(&Self::path()?)
    }

    /// Read the config from an explicit path.
    pub fn parse_from(path: &Path) -> Result<Self, Error> {
        if !path.exists() {
            debug!(path = %path.display(), "config file absent, using defaults");
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path).map_err(|e| {
            Error::internal(
                causes::IO_FAILURE,
                format!("failed to read config '{}': {}", path.display(), e),
            )
        })?;
        let config: Config = serde_yaml::from_str(&contents).map_err(|e| {
            Error::bad_request(
                causes::INVALID_CONFIG,
                format!("failed to parse config '{}': {}", path.display(), e),
            )
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the schema version and cross-record invariants.
    pub fn validate(&self) -> Result<(), Error> {
        if self.version != SCHEMA_VERSION {
            return Err(Error::bad_request(
                causes::INVALID_VERSION,
                format!(
                    "unsupported config version {} (expected {})",
                    self.version, SCHEMA_VERSION
                ),
            ));
        }
        for (i, cluster) in self.clusters.iter().enumerate() {
            if self.clusters[..i].iter().any(|c| c.label == cluster.label) {
                return Err(Error::bad_request(
                    causes::DUPLICATE_CLUSTER,
                    format!("duplicate cluster label '{}'", cluster.label),
                ));
            }
        }
        if let Some(current) = &self.context.cluster {
            if !self.has_cluster(current) {
                return Err(Error::bad_request(
                    causes::INVALID_CONFIG,
                    format!("current cluster '{}' has no matching record", current),
                ));
            }
        }
        Ok(())
    }

    /// Write the config to its default location.
    pub fn write(&self) -> Result<(), Error> {
        self.write_to(&Self::path()?)
    }

    /// Write the config atomically with owner-only permissions.
    ///
    /// Validates first, creates the enclosing directory, serializes as
    /// YAML to a temp file in the same directory, and renames over the
    /// target.
    pub fn write_to(&self, path: &Path) -> Result<(), Error> {
        self.validate()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                Error::internal(
                    causes::IO_FAILURE,
                    format!("failed to create '{}': {}", parent.display(), e),
                )
            })?;
            set_owner_only(parent)?;
        }

        let contents = serde_yaml::to_string(self).map_err(|e| {
            Error::internal(causes::INVALID_CONFIG, format!("serialization failed: {}", e))
        })?;

        let temp_path = path.with_extension("yaml.tmp");
        let mut file = fs::File::create(&temp_path).map_err(|e| {
            Error::internal(
                causes::IO_FAILURE,
                format!("failed to create '{}': {}", temp_path.display(), e),
            )
        })?;
        file.write_all(contents.as_bytes()).map_err(|e| {
            Error::internal(
                causes::IO_FAILURE,
                format!("failed to write '{}': {}", temp_path.display(), e),
            )
        })?;
        file.sync_all()
            .map_err(|e| Error::internal(causes::IO_FAILURE, e.to_string()))?;
        drop(file);
        set_owner_only(&temp_path)?;

        fs::rename(&temp_path, path).map_err(|e| {
            Error::internal(
                causes::IO_FAILURE,
                format!("failed to write '{}': {}", path.display(), e),
            )
        })?;
        debug!(path = %path.display(), "config written");
        Ok(())
    }

    /// Append a cluster record.
    ///
    /// # Errors
    ///
    /// Conflict with cause `duplicate_cluster` if the label is taken.
    pub fn add_cluster(&mut self, label: Label, url: ClusterUrl) -> Result<(), Error> {
        if self.has_cluster(&label) {
            return Err(Error::conflict(
                causes::DUPLICATE_CLUSTER,
                format!("a cluster labeled '{}' already exists", label),
            ));
        }
        self.clusters.push(Cluster::new(label, url));
        Ok(())
    }

    /// Remove a cluster by label.
    ///
    /// If the removed cluster was current, the selection is cleared.
    ///
    /// # Errors
    ///
    /// Not-found with cause `cluster_not_found` for an unknown label.
    pub fn remove_cluster(&mut self, label: &Label) -> Result<Cluster, Error> {
        let index = self
            .clusters
            .iter()
            .position(|c| &c.label == label)
            .ok_or_else(|| {
                Error::not_found(
                    causes::CLUSTER_NOT_FOUND,
                    format!("no cluster labeled '{}'", label),
                )
            })?;
        let removed = self.clusters.remove(index);
        if self.context.cluster.as_ref() == Some(label) {
            self.context.cluster = None;
        }
        Ok(removed)
    }

    /// Set or clear the current cluster.
    ///
    /// `None` clears the selection; otherwise the cluster must exist.
    pub fn use_cluster(&mut self, label: Option<Label>) -> Result<(), Error> {
        match label {
            None => {
                self.context.cluster = None;
                Ok(())
            }
            Some(label) => {
                if !self.has_cluster(&label) {
                    return Err(Error::not_found(
                        causes::CLUSTER_NOT_FOUND,
                        format!("no cluster labeled '{}'", label),
                    ));
                }
                self.context.cluster = Some(label);
                Ok(())
            }
        }
    }

    /// The current cluster record.
    ///
    /// # Errors
    ///
    /// The `no_cluster` sentinel when no selection is set. Callers
    /// branch on [`Error::is`] with [`causes::NO_CLUSTER`].
    pub fn cluster(&self) -> Result<&Cluster, Error> {
        let label = self.context.cluster.as_ref().ok_or_else(Error::no_cluster)?;
        // validate() guarantees the record exists, but fail closed anyway.
        self.get_cluster(label)
    }

    /// Whether a cluster with this label is registered.
    pub fn has_cluster(&self, label: &Label) -> bool {
        self.clusters.iter().any(|c| &c.label == label)
    }

    /// Look up a cluster by label.
    pub fn get_cluster(&self, label: &Label) -> Result<&Cluster, Error> {
        self.clusters
            .iter()
            .find(|c| &c.label == label)
            .ok_or_else(|| {
                Error::not_found(
                    causes::CLUSTER_NOT_FOUND,
                    format!("no cluster labeled '{}'", label),
                )
            })
    }

    /// Mutable lookup, used by the authentication handlers to store
    /// and clear tokens.
    pub fn get_cluster_mut(&mut self, label: &Label) -> Result<&mut Cluster, Error> {
        self.clusters
            .iter_mut()
            .find(|c| &c.label == label)
            .ok_or_else(|| {
                Error::not_found(
                    causes::CLUSTER_NOT_FOUND,
                    format!("no cluster labeled '{}'", label),
                )
            })
    }

    /// Render the config as YAML with token values masked.
    pub fn render(&self) -> Result<String, Error> {
        let mut masked = self.clone();
        for cluster in &mut masked.clusters {
            if !cluster.auth_token.is_empty() {
                cluster.auth_token = AuthToken::new("********");
            }
        }
        serde_yaml::to_string(&masked)
            .map_err(|e| Error::internal(causes::INVALID_CONFIG, e.to_string()))
    }
}

/// Restrict a path to owner-only permissions.
#[cfg(unix)]
fn set_owner_only(path: &Path) -> Result<(), Error> {
    use std::os::unix::fs::PermissionsExt;
    let perms = fs::Permissions::from_mode(OWNER_ONLY);
    fs::set_permissions(path, perms).map_err(|e| {
        Error::internal(
            causes::IO_FAILURE,
            format!("failed to set permissions on '{}': {}", path.display(), e),
        )
    })
}

#[cfg(not(unix))]
fn set_owner_only(_path: &Path) -> Result<(), Error> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn label(value: &str) -> Label {
        Label::new(value).unwrap()
    }

    fn url(value: &str) -> ClusterUrl {
        ClusterUrl::new(value).unwrap()
    }

    #[test]
    fn parse_absent_file_returns_defaults() {
        let temp = TempDir::new().unwrap();
        let config = Config::parse_from(&temp.path().join(CONFIG_FILE)).unwrap();
        assert_eq!(config.version, 1);
        assert!(config.clusters.is_empty());
        assert!(config.context.cluster.is_none());
        assert!(config.ui.colors);
    }

    #[test]
    fn write_then_parse_round_trips() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("home").join(CONFIG_FILE);

        let mut config = Config::default();
        config
            .add_cluster(label("production"), url("https://prod.example"))
            .unwrap();
        config.use_cluster(Some(label("production"))).unwrap();
        config.write_to(&path).unwrap();

        let loaded = Config::parse_from(&path).unwrap();
        assert_eq!(loaded, config);
        assert!(loaded.validate().is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn write_sets_owner_only_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let path = temp.path().join("home").join(CONFIG_FILE);
        Config::default().write_to(&path).unwrap();

        let file_mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        let dir_mode = fs::metadata(path.parent().unwrap())
            .unwrap()
            .permissions()
            .mode()
            & 0o777;
        assert_eq!(file_mode, 0o700);
        assert_eq!(dir_mode, 0o700);
    }

    #[test]
    fn add_cluster_rejects_duplicate_label() {
        let mut config = Config::default();
        config
            .add_cluster(label("production"), url("https://prod.example"))
            .unwrap();
        let err = config
            .add_cluster(label("production"), url("https://other.example"))
            .unwrap_err();
        assert!(err.is(causes::DUPLICATE_CLUSTER));
    }

    #[test]
    fn remove_unknown_cluster_fails() {
        let mut config = Config::default();
        let err = config.remove_cluster(&label("ghost")).unwrap_err();
        assert!(err.is(causes::CLUSTER_NOT_FOUND));
    }

    #[test]
    fn removing_current_cluster_clears_selection() {
        let mut config = Config::default();
        config
            .add_cluster(label("production"), url("https://prod.example"))
            .unwrap();
        config.use_cluster(Some(label("production"))).unwrap();

        config.remove_cluster(&label("production")).unwrap();
        assert!(config.context.cluster.is_none());
        assert!(config.clusters.is_empty());
    }

    #[test]
    fn use_cluster_requires_existing_record() {
        let mut config = Config::default();
        let err = config.use_cluster(Some(label("ghost"))).unwrap_err();
        assert!(err.is(causes::CLUSTER_NOT_FOUND));
    }

    #[test]
    fn use_none_clears_current() {
        let mut config = Config::default();
        config
            .add_cluster(label("production"), url("https://prod.example"))
            .unwrap();
        config.use_cluster(Some(label("production"))).unwrap();
        config.use_cluster(None).unwrap();
        assert!(config.context.cluster.is_none());
    }

    #[test]
    fn cluster_returns_no_cluster_sentinel() {
        let config = Config::default();
        let err = config.cluster().unwrap_err();
        assert!(err.is(causes::NO_CLUSTER));
    }

    #[test]
    fn cluster_returns_current_record() {
        let mut config = Config::default();
        config
            .add_cluster(label("production"), url("https://prod.example"))
            .unwrap();
        config
            .add_cluster(label("staging"), url("https://stage.example"))
            .unwrap();
        config.use_cluster(Some(label("staging"))).unwrap();

        let cluster = config.cluster().unwrap();
        assert_eq!(cluster.label, label("staging"));
    }

    #[test]
    fn validate_rejects_wrong_version() {
        let config = Config {
            version: 2,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.is(causes::INVALID_VERSION));
    }

    #[test]
    fn parse_rejects_dangling_current_cluster() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILE);
        fs::write(
            &path,
            "version: 1\ncontext:\n  cluster: ghost\nclusters: []\n",
        )
        .unwrap();
        let err = Config::parse_from(&path).unwrap_err();
        assert!(err.is(causes::INVALID_CONFIG));
    }

    #[test]
    fn render_masks_stored_tokens() {
        let mut config = Config::default();
        config
            .add_cluster(label("production"), url("https://prod.example"))
            .unwrap();
        config.clusters[0].auth_token = AuthToken::new("c2VjcmV0LXRva2Vu");

        let rendered = config.render().unwrap();
        assert!(!rendered.contains("c2VjcmV0LXRva2Vu"));
        assert!(rendered.contains("********"));
    }

    #[test]
    fn stored_token_survives_round_trip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILE);

        let mut config = Config::default();
        config
            .add_cluster(label("production"), url("https://prod.example"))
            .unwrap();
        config.clusters[0].auth_token = AuthToken::new("c2VjcmV0LXRva2Vu");
        config.write_to(&path).unwrap();

        let loaded = Config::parse_from(&path).unwrap();
        assert_eq!(loaded.clusters[0].auth_token.reveal(), "c2VjcmV0LXRva2Vu");
    }
}
