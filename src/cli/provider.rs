//! cli::provider
//!
//! The per-invocation dependency container.
//!
//! # Design
//!
//! One `Provider` is constructed before dispatch and handed to every
//! handler. It bundles the parsed config, the UI, the transport
//! factory, and the migrator; nothing lives in module-scope state, so
//! tests substitute mocks by building a provider around them.
//!
//! The stored auth token leaves the config only through
//! [`Provider::transport`].

use std::path::PathBuf;
use std::sync::Arc;

use crate::client::{Transport, TransportFactory};
use crate::config::{Cluster, Config};
use crate::core::errors::Error;
use crate::core::types::Label;
use crate::migrate::Migrator;
use crate::ui::Ui;

/// Per-invocation container for everything handlers depend on.
pub struct Provider {
    config: Config,
    config_path: PathBuf,
    ui: Arc<dyn Ui>,
    transports: Arc<dyn TransportFactory>,
    migrator: Arc<dyn Migrator>,
    cluster_override: Option<Label>,
}

impl Provider {
    /// Build a provider around an already-parsed config.
    pub fn new(
        config: Config,
        config_path: PathBuf,
        ui: Arc<dyn Ui>,
        transports: Arc<dyn TransportFactory>,
        migrator: Arc<dyn Migrator>,
    ) -> Self {
        Self {
            config,
            config_path,
            ui,
            transports,
            migrator,
            cluster_override: None,
        }
    }

    /// Build a provider by parsing the config from its default
    /// location.
    pub fn from_env(
        ui: Arc<dyn Ui>,
        transports: Arc<dyn TransportFactory>,
        migrator: Arc<dyn Migrator>,
    ) -> Result<Self, Error> {
        let path = Config::path()?;
        let config = Config::parse_from(&path)?;
        Ok(Self::new(config, path, ui, transports, migrator))
    }

    /// Apply the `--cluster` session override.
    pub fn with_cluster_override(mut self, label: Option<Label>) -> Self {
        self.cluster_override = label;
        self
    }

    /// The UI for this invocation.
    pub fn ui(&self) -> &dyn Ui {
        self.ui.as_ref()
    }

    /// Read access to the config.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Mutable access for handlers that change persisted state.
    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    /// Persist the config to the path it was loaded from.
    pub fn save(&self) -> Result<(), Error> {
        self.config.write_to(&self.config_path)
    }

    /// The cluster this invocation targets: the `--cluster` override
    /// when present, otherwise the configured current cluster.
    ///
    /// # Errors
    ///
    /// `cluster_not_found` for an unknown override label; the
    /// `no_cluster` sentinel when nothing is selected.
    pub fn current_cluster(&self) -> Result<&Cluster, Error> {
        match &self.cluster_override {
            Some(label) => self.config.get_cluster(label),
            None => self.config.cluster(),
        }
    }

    /// A transport bound to the target cluster.
    pub fn transport(&self) -> Result<Arc<dyn Transport>, Error> {
        let cluster = self.current_cluster()?;
        self.transports.transport(cluster)
    }

    /// The migration engine.
    pub fn migrator(&self) -> &dyn Migrator {
        self.migrator.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::mock::MockTransport;
    use crate::core::errors::causes;
    use crate::core::types::ClusterUrl;
    use crate::migrate::MockMigrator;
    use crate::ui::mock::MockUi;
    use tempfile::TempDir;

    fn provider_with(config: Config) -> (Provider, TempDir) {
        let temp = TempDir::new().unwrap();
        let provider = Provider::new(
            config,
            temp.path().join("config.yaml"),
            Arc::new(MockUi::new()),
            Arc::new(MockTransport::new()),
            Arc::new(MockMigrator::new()),
        );
        (provider, temp)
    }

    #[test]
    fn current_cluster_uses_config_selection() {
        let mut config = Config::default();
        config
            .add_cluster(
                Label::new("production").unwrap(),
                ClusterUrl::new("https://prod.example").unwrap(),
            )
            .unwrap();
        config
            .use_cluster(Some(Label::new("production").unwrap()))
            .unwrap();

        let (provider, _temp) = provider_with(config);
        assert_eq!(
            provider.current_cluster().unwrap().label,
            Label::new("production").unwrap()
        );
    }

    #[test]
    fn cluster_override_wins() {
        let mut config = Config::default();
        config
            .add_cluster(
                Label::new("production").unwrap(),
                ClusterUrl::new("https://prod.example").unwrap(),
            )
            .unwrap();
        config
            .add_cluster(
                Label::new("staging").unwrap(),
                ClusterUrl::new("https://stage.example").unwrap(),
            )
            .unwrap();
        config
            .use_cluster(Some(Label::new("production").unwrap()))
            .unwrap();

        let (provider, _temp) = provider_with(config);
        let provider = provider.with_cluster_override(Some(Label::new("staging").unwrap()));
        assert_eq!(
            provider.current_cluster().unwrap().label,
            Label::new("staging").unwrap()
        );
    }

    #[test]
    fn no_selection_yields_sentinel() {
        let (provider, _temp) = provider_with(Config::default());
        let err = provider.current_cluster().unwrap_err();
        assert!(err.is(causes::NO_CLUSTER));
    }

    #[test]
    fn unknown_override_yields_not_found() {
        let (provider, _temp) = provider_with(Config::default());
        let provider = provider.with_cluster_override(Some(Label::new("ghost").unwrap()));
        let err = provider.current_cluster().unwrap_err();
        assert!(err.is(causes::CLUSTER_NOT_FOUND));
    }

    #[test]
    fn save_persists_to_loaded_path() {
        let (mut provider, temp) = provider_with(Config::default());
        provider
            .config_mut()
            .add_cluster(
                Label::new("production").unwrap(),
                ClusterUrl::new("https://prod.example").unwrap(),
            )
            .unwrap();
        provider.save().unwrap();

        let loaded = Config::parse_from(&temp.path().join("config.yaml")).unwrap();
        assert_eq!(loaded.clusters.len(), 1);
    }
}
