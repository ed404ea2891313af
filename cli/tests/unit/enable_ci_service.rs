//! End-to-end tests for the `enable_ci` workflow against in-memory ports.

#![allow(clippy::expect_used)]

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use shiftci_cli::application::services::enable_ci::{EnableOptions, EnableOutcome, enable_ci};
use shiftci_cli::application::services::provision::Provisioned;
use shiftci_cli::domain::platform::{Cartridge, Credentials, EmbeddableCartridge};
use shiftci_cli::domain::project::Project;

use crate::fakes::{
    FakeConnector, FakePlatform, MemFs, Probe, RecordingReporter, RecordingRunner, code_of,
};

const KEY_PATH: &str = "/home/dev/.ssh/id_rsa.pub";

struct Harness {
    connector: FakeConnector,
    runner: RecordingRunner,
    fs: MemFs,
    reporter: RecordingReporter,
    project: Project,
    credentials: Credentials,
    ssh_key: Option<PathBuf>,
}

impl Harness {
    fn new(platform: FakePlatform) -> Self {
        Self {
            connector: FakeConnector::new(platform),
            runner: RecordingRunner::new(),
            fs: MemFs::new()
                .with_project("/work/shop")
                .with_file(KEY_PATH, "ssh-rsa AAAAB3NzaC1yc2E dev@laptop"),
            reporter: RecordingReporter::default(),
            project: Project::new(PathBuf::from("/work/shop")).expect("project"),
            credentials: Credentials {
                user: "dev@example.com".to_string(),
                password: "secret".to_string(),
            },
            ssh_key: Some(PathBuf::from(KEY_PATH)),
        }
    }

    fn platform(&self) -> &FakePlatform {
        &self.connector.platform
    }

    async fn run(&self) -> Result<EnableOutcome> {
        enable_ci(
            &self.connector,
            &self.runner,
            &self.fs,
            EnableOptions {
                reporter: &self.reporter,
                project: &self.project,
                credentials: &self.credentials,
                endpoint: "openshift.example.com",
                domain_name: "openshiftci",
                builder_name: "jenkins",
                readiness_timeout: Duration::from_secs(180),
                ssh_key: self.ssh_key.as_deref(),
            },
        )
        .await
    }
}

#[tokio::test]
async fn fresh_account_gets_everything_created_in_order() {
    let h = Harness::new(FakePlatform::new());
    let outcome = h.run().await.expect("enable");

    assert_eq!(outcome.login, "dev@example.com");
    assert_eq!(outcome.domain.status, Provisioned::Created);
    assert_eq!(outcome.application.status, Provisioned::Created);
    assert_eq!(outcome.builder.status, Provisioned::Created);
    assert_eq!(outcome.ci_client.status, Provisioned::Created);
    assert_eq!(outcome.builder.resource.cartridge, Cartridge::Jenkins14);
    assert_eq!(
        outcome.ci_client.resource.cartridge,
        EmbeddableCartridge::JenkinsClient14
    );

    assert_eq!(
        h.platform().mutations(),
        vec![
            "add_ssh_key enableci",
            "create_domain openshiftci",
            "create_application shop jbossas-7",
            "create_application jenkins jenkins-1.4",
            "add_embedded_capability shop jenkins-client-1.4",
        ]
    );
    let waits: Vec<String> = h
        .platform()
        .calls()
        .into_iter()
        .filter(|c| c.starts_with("wait_until_reachable"))
        .collect();
    assert_eq!(
        waits,
        vec!["wait_until_reachable jenkins 180", "wait_until_reachable shop 180"]
    );
    assert_eq!(h.runner.command_lines().len(), 5);
    assert_eq!(
        h.reporter.events().last().map(String::as_str),
        Some("success: Done.")
    );
}

#[tokio::test]
async fn connects_with_client_id_and_endpoint() {
    let h = Harness::new(FakePlatform::new());
    h.run().await.expect("enable");
    let connections = h.connector.connections.lock().expect("lock").clone();
    assert_eq!(
        connections,
        vec![(
            "enable-openshift-ci".to_string(),
            "dev@example.com".to_string(),
            "openshift.example.com".to_string()
        )]
    );
}

#[tokio::test]
async fn second_run_creates_nothing() {
    let h = Harness::new(FakePlatform::new());
    h.run().await.expect("first run");
    let after_first = h.platform().mutations();

    let outcome = h.run().await.expect("second run");
    assert_eq!(h.platform().mutations(), after_first);
    assert_eq!(outcome.domain.status, Provisioned::Reused);
    assert_eq!(outcome.application.status, Provisioned::Reused);
    assert_eq!(outcome.builder.status, Provisioned::Reused);
    assert_eq!(outcome.ci_client.status, Provisioned::Reused);
    assert_eq!(h.platform().app_names(), vec!["shop", "jenkins"]);
}

#[tokio::test]
async fn existing_domain_skips_key_registration() {
    let h = Harness::new(FakePlatform::new().with_domain("mine"));
    let outcome = h.run().await.expect("enable");
    assert_eq!(outcome.domain.resource.name, "mine");
    assert!(!h.platform().calls().iter().any(|c| c.starts_with("ssh_keys")));
}

#[tokio::test]
async fn missing_key_aborts_before_domain_creation() {
    let mut h = Harness::new(FakePlatform::new());
    h.fs = MemFs::new().with_project("/work/shop");
    let err = h.run().await.expect_err("no key");
    assert_eq!(code_of(&err), "precondition");
    assert!(h.platform().mutations().is_empty());
}

#[tokio::test]
async fn no_key_path_skips_registration() {
    let mut h = Harness::new(FakePlatform::new());
    h.ssh_key = None;
    h.run().await.expect("enable");
    assert!(!h.platform().mutations().iter().any(|m| m.starts_with("add_ssh_key")));
}

#[tokio::test]
async fn existing_builder_is_reused_whatever_its_name() {
    let h = Harness::new(
        FakePlatform::new()
            .with_domain("openshiftci")
            .with_app("ci", Cartridge::Jenkins14),
    );
    let outcome = h.run().await.expect("enable");
    assert_eq!(outcome.builder.resource.name, "ci");
    assert_eq!(outcome.builder.status, Provisioned::Reused);
    assert_eq!(h.platform().app_names(), vec!["ci", "shop"]);
}

#[tokio::test]
async fn cartridge_mismatch_stops_before_anything_is_created() {
    let h = Harness::new(
        FakePlatform::new()
            .with_domain("openshiftci")
            .with_app("shop", Cartridge::Other("php-5.3".to_string())),
    );
    let err = h.run().await.expect_err("mismatch");
    assert_eq!(code_of(&err), "precondition");
    assert!(h.platform().mutations().is_empty());
    assert!(h.runner.command_lines().is_empty());
}

#[tokio::test]
async fn unreachable_builder_stops_before_embedding_and_deploying() {
    let h = Harness::new(FakePlatform::new().with_probe("jenkins", Probe::NotReady));
    let err = h.run().await.expect_err("timeout");
    assert_eq!(code_of(&err), "timeout");
    assert!(err.to_string().contains("jenkins"));

    let calls = h.platform().calls();
    assert!(!calls.iter().any(|c| c.starts_with("embedded_capability")));
    assert!(!calls.iter().any(|c| c == "wait_until_reachable shop 180"));
    assert!(h.runner.command_lines().is_empty());
}

#[tokio::test(start_paused = true)]
async fn hanging_probe_is_torn_down_when_the_run_fails() {
    let h = Harness::new(FakePlatform::new().with_probe("shop", Probe::Hang));
    let err = h.run().await.expect_err("timeout");
    assert_eq!(code_of(&err), "timeout");
    assert_eq!(h.platform().lock().cancelled_probes, 1);
    assert!(h.runner.command_lines().is_empty());
}

#[tokio::test]
async fn full_domain_aborts_before_deploy() {
    let h = Harness::new(
        FakePlatform::new()
            .with_domain("openshiftci")
            .with_app("blog", Cartridge::Other("php-5.3".to_string())),
    );
    let err = h.run().await.expect_err("quota");
    assert_eq!(code_of(&err), "quota");
    // The client is embedded before the slot check.
    assert!(
        h.platform()
            .mutations()
            .contains(&"add_embedded_capability shop jenkins-client-1.4".to_string())
    );
    assert!(h.runner.command_lines().is_empty());
}

#[tokio::test]
async fn rejected_login_is_an_upstream_error() {
    let mut h = Harness::new(FakePlatform::new());
    h.connector.reject = true;
    let err = h.run().await.expect_err("auth");
    assert_eq!(code_of(&err), "upstream");
    assert!(format!("{err:#}").contains("authentication failed for user dev@example.com"));
    assert!(h.platform().calls().is_empty());
}

#[tokio::test]
async fn failed_push_is_the_final_outcome() {
    let mut h = Harness::new(FakePlatform::new());
    h.runner = RecordingRunner::new().exiting_at(4, 1);
    let err = h.run().await.expect_err("push");
    assert_eq!(code_of(&err), "transport");
    assert!(err.to_string().starts_with("git push openshift HEAD -f --progress"));
    assert!(
        !h.reporter
            .events()
            .iter()
            .any(|e| e == "success: Done.")
    );
}

#[tokio::test]
async fn key_path_is_read_through_the_filesystem_port() {
    let h = Harness::new(FakePlatform::new());
    h.run().await.expect("enable");
    let key = h.platform().lock().keys.first().cloned().expect("key");
    assert_eq!(key.content, "AAAAB3NzaC1yc2E");
}
