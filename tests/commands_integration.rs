//! End-to-end command tests driven through the mock UI and mock
//! transport: parse a real argv, dispatch, and assert the recorded
//! interactions and the state left on disk.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use serde_json::json;
use tempfile::TempDir;

use cape::cli::args::Cli;
use cape::cli::commands::dispatch;
use cape::cli::provider::Provider;
use cape::client::mock::MockTransport;
use cape::config::Config;
use cape::core::errors::causes;
use cape::core::types::{ClusterUrl, Label};
use cape::migrate::MockMigrator;
use cape::ui::mock::{MockUi, UiCall};
use cape::ui::NotifyKind;

struct Harness {
    ui: MockUi,
    transport: MockTransport,
    migrator: Arc<MockMigrator>,
    config_path: PathBuf,
    _temp: TempDir,
}

impl Harness {
    fn new(config: Config) -> (Self, Provider) {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("config.yaml");
        let ui = MockUi::new();
        let transport = MockTransport::new();
        let migrator = Arc::new(MockMigrator::new());

        let provider = Provider::new(
            config,
            config_path.clone(),
            Arc::new(ui.clone()),
            Arc::new(transport.clone()),
            migrator.clone(),
        );
        (
            Self {
                ui,
                transport,
                migrator,
                config_path,
                _temp: temp,
            },
            provider,
        )
    }

    fn saved_config(&self) -> Config {
        Config::parse_from(&self.config_path).unwrap()
    }
}

fn config_with_current(label: &str, url: &str) -> Config {
    let mut config = Config::default();
    config
        .add_cluster(Label::new(label).unwrap(), ClusterUrl::new(url).unwrap())
        .unwrap();
    config.use_cluster(Some(Label::new(label).unwrap())).unwrap();
    config
}

async fn run(provider: &mut Provider, argv: &[&str]) -> Result<(), cape::core::errors::Error> {
    let cli = Cli::try_parse_from(argv).unwrap();
    dispatch(cli.command, provider).await
}

#[tokio::test]
async fn clusters_add_persists_without_selecting() {
    let (harness, mut provider) = Harness::new(Config::default());

    run(
        &mut provider,
        &["cape", "config", "clusters", "add", "production", "https://prod.example"],
    )
    .await
    .unwrap();

    let saved = harness.saved_config();
    assert_eq!(saved.clusters.len(), 1);
    assert_eq!(saved.clusters[0].label.as_str(), "production");
    assert_eq!(saved.clusters[0].url.as_str(), "https://prod.example");
    assert!(saved.context.cluster.is_none());
}

#[tokio::test]
async fn clusters_add_with_use_selects_and_announces() {
    let (harness, mut provider) = Harness::new(Config::default());

    run(
        &mut provider,
        &[
            "cape", "config", "clusters", "add", "production", "https://prod.example", "--use",
        ],
    )
    .await
    .unwrap();

    let saved = harness.saved_config();
    assert_eq!(
        saved.context.cluster,
        Some(Label::new("production").unwrap())
    );

    let templates = harness.ui.templates();
    assert_eq!(templates.len(), 2);
    assert!(templates[0].contains("Added cluster production"));
    assert!(templates[1].contains("current cluster has been set to production"));
}

#[tokio::test]
async fn removing_the_current_cluster_clears_it_and_hints() {
    let (harness, mut provider) =
        Harness::new(config_with_current("production", "https://prod.example"));

    run(
        &mut provider,
        &["cape", "config", "clusters", "remove", "production", "-y"],
    )
    .await
    .unwrap();

    let saved = harness.saved_config();
    assert!(saved.clusters.is_empty());
    assert!(saved.context.cluster.is_none());

    let templates = harness.ui.templates();
    assert!(templates[0].contains("Removed cluster production"));
    let notifications = harness.ui.notifications();
    assert!(notifications
        .iter()
        .any(|(_, message)| message.contains("No current cluster")));
}

#[tokio::test]
async fn roles_set_routes_to_set_org_role() {
    let (harness, mut provider) =
        Harness::new(config_with_current("production", "https://prod.example"));
    harness.transport.push_response(json!({"setOrgRole": null}));

    run(
        &mut provider,
        &["cape", "roles", "set", "friend@cape.com", "admin"],
    )
    .await
    .unwrap();

    let exchanges = harness.transport.exchanges();
    assert_eq!(exchanges.len(), 1);
    assert!(exchanges[0].query.contains("setOrgRole"));
    assert_eq!(exchanges[0].variables["input"]["email"], "friend@cape.com");
    assert_eq!(exchanges[0].variables["input"]["role"], "admin");

    let templates = harness.ui.templates();
    assert_eq!(templates.len(), 1);
    assert!(templates[0].contains("friend@cape.com"));
    assert!(templates[0].contains("admin"));
}

#[tokio::test]
async fn roles_set_without_role_fails_before_any_network_call() {
    let (harness, mut provider) =
        Harness::new(config_with_current("production", "https://prod.example"));

    let err = run(
        &mut provider,
        &["cape", "roles", "set", "whahahdhshdashdsajkdhsa"],
    )
    .await
    .unwrap_err();

    assert!(err.is(causes::MISSING_ARGUMENT));
    assert!(harness.transport.exchanges().is_empty());
    // No UI before validation succeeds.
    assert!(harness.ui.calls().is_empty());
}

#[tokio::test]
async fn tokens_list_renders_table_then_count() {
    let ids = [
        "2018d9x3ntbca95dda3bu9wnrr",
        "2015338ejcum4rzncvnugucvtc",
        "2011e949qta0quff3n4yx7ny3r",
        "201dandy989092yebk2m0143p4",
    ];
    let (harness, mut provider) =
        Harness::new(config_with_current("production", "https://prod.example"));
    harness.transport.push_response(json!({ "tokens": ids }));

    run(&mut provider, &["cape", "tokens", "list"]).await.unwrap();

    let calls = harness.ui.calls();
    match &calls[0] {
        UiCall::Table { header, rows } => {
            assert_eq!(header, &vec!["Token ID".to_string()]);
            let expected: Vec<Vec<String>> =
                ids.iter().map(|id| vec![id.to_string()]).collect();
            assert_eq!(rows, &expected);
        }
        other => panic!("expected a table first, got {:?}", other),
    }
    match &calls[1] {
        UiCall::Template { rendered, .. } => assert!(rendered.contains('4')),
        other => panic!("expected a template second, got {:?}", other),
    }
}

#[tokio::test]
async fn users_create_shows_credentials_once() {
    let (harness, mut provider) =
        Harness::new(config_with_current("production", "https://prod.example"));
    harness.ui.push_answer("Jane Operator");
    harness.transport.push_response(json!({
        "createUser": {
            "id": "u1",
            "email": "new@cape.com",
            "password": "generated-secret"
        }
    }));

    run(&mut provider, &["cape", "users", "create", "new@cape.com"])
        .await
        .unwrap();

    let notifications = harness.ui.notifications();
    assert!(notifications
        .iter()
        .any(|(kind, _)| *kind == NotifyKind::Remember));

    let calls = harness.ui.calls();
    assert!(calls.iter().any(|c| matches!(
        c,
        UiCall::Details { pairs }
            if pairs.iter().any(|(_, v)| v == "generated-secret")
    )));
}

#[tokio::test]
async fn login_stores_the_token_on_the_cluster_record() {
    let (harness, mut provider) =
        Harness::new(config_with_current("production", "https://prod.example"));
    harness.ui.push_answer("strong-password");
    harness.transport.push_response(json!({
        "createSession": { "token": "c2Vzc2lvbg==", "user_id": "u1" }
    }));

    run(&mut provider, &["cape", "login", "admin@cape.com"])
        .await
        .unwrap();

    // The session exchange must not carry a bearer token.
    let exchanges = harness.transport.exchanges();
    assert!(!exchanges[0].authenticated);

    let saved = harness.saved_config();
    assert_eq!(saved.clusters[0].auth_token.reveal(), "c2Vzc2lvbg==");
}

#[tokio::test]
async fn logout_clears_the_stored_token() {
    let mut config = config_with_current("production", "https://prod.example");
    config.clusters[0].auth_token = cape::core::types::AuthToken::new("c2Vzc2lvbg==");
    let (harness, mut provider) = Harness::new(config);

    run(&mut provider, &["cape", "logout"]).await.unwrap();

    let saved = harness.saved_config();
    assert!(saved.clusters[0].auth_token.is_empty());
}

#[tokio::test]
async fn update_requires_the_database_url() {
    let (harness, mut provider) =
        Harness::new(config_with_current("production", "https://prod.example"));

    std::env::remove_var("CAPE_DB_URL");
    let err = run(&mut provider, &["cape", "update"]).await.unwrap_err();

    assert!(err.is(causes::MISSING_ENVIRONMENT_VARIABLE));
    assert!(harness.migrator.calls().is_empty());
}

#[tokio::test]
async fn remove_aborts_when_not_confirmed() {
    let (harness, mut provider) =
        Harness::new(config_with_current("production", "https://prod.example"));
    harness.ui.push_confirm(false);

    run(&mut provider, &["cape", "config", "clusters", "remove", "production"])
        .await
        .unwrap();

    // Nothing was written; the in-memory config still has the cluster.
    assert_eq!(provider.config().clusters.len(), 1);
    assert!(harness
        .ui
        .notifications()
        .iter()
        .any(|(_, message)| message == "Aborted."));
}
