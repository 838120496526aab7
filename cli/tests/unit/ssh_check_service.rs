//! Tests for the `ssh_check` orchestration service.

#![allow(clippy::expect_used)]

use provcheck_cli::application::services::ssh_check::{check_server, run_ssh_check};
use provcheck_cli::domain::ConnectError;
use provcheck_common::ConnectionType;

use crate::helpers::{INSTALL, LISTING_WITH_20G, LSBLK, fail, input, ok, settings};
use crate::mocks::{
    AlwaysFailingConnector, FakeConnector, FakeKeyLoader, FakeProbe, FakeShell, NoopReporter,
    RecordingSleeper, Reply,
};

/// Server that satisfies every rule for a non-zero-tier package.
fn healthy_shell() -> FakeShell {
    FakeShell::new()
        .on(LSBLK, Reply::Output(ok(LISTING_WITH_20G)))
        .on("nc -z smtp.mail.yahoo.com 25", Reply::Output(fail(1, "")))
        .on("nc -z smtp.mail.yahoo.com 587", Reply::Output(fail(1, "")))
        .on("nc -z smtp.mail.yahoo.com 467", Reply::Output(fail(1, "")))
}

fn all_inbound_open() -> FakeProbe {
    FakeProbe::with_open(&[22, 443, 80, 1000])
}

#[tokio::test]
async fn test_healthy_server_passes() {
    let connector = FakeConnector::new(healthy_shell());

    let violations = run_ssh_check(
        &connector,
        &all_inbound_open(),
        &RecordingSleeper::default(),
        &FakeKeyLoader::default(),
        &NoopReporter,
        &input("SSH Key"),
        &settings(),
    )
    .await;

    assert!(violations.is_empty(), "unexpected: {violations:?}");
    assert_eq!(connector.attempts()[0].mode, ConnectionType::SshKey);
    assert_eq!(connector.shell.close_count(), 1);
}

#[tokio::test]
async fn test_unsupported_connection_type_stops_immediately() {
    let connector = FakeConnector::new(healthy_shell());
    let keys = FakeKeyLoader::default();

    let violations = run_ssh_check(
        &connector,
        &all_inbound_open(),
        &RecordingSleeper::default(),
        &keys,
        &NoopReporter,
        &input("Kerberos"),
        &settings(),
    )
    .await;

    assert_eq!(
        violations,
        vec!["Debian 12 with CloudV 1 unsupported SSH connection type: Kerberos.".to_string()]
    );
    assert!(connector.attempts().is_empty());
    assert_eq!(keys.loads(), 0);
}

#[tokio::test]
async fn test_connection_type_label_is_exact() {
    let connector = FakeConnector::new(healthy_shell());

    let violations = run_ssh_check(
        &connector,
        &all_inbound_open(),
        &RecordingSleeper::default(),
        &FakeKeyLoader::default(),
        &NoopReporter,
        &input("ssh key"),
        &settings(),
    )
    .await;

    assert_eq!(violations.len(), 1);
    assert!(connector.attempts().is_empty());
}

#[tokio::test]
async fn test_connect_failure_stops_with_single_violation() {
    let connector = AlwaysFailingConnector(ConnectError::Authentication("denied".to_string()));

    let violations = run_ssh_check(
        &connector,
        &all_inbound_open(),
        &RecordingSleeper::default(),
        &FakeKeyLoader::default(),
        &NoopReporter,
        &input("Password"),
        &settings(),
    )
    .await;

    assert_eq!(
        violations,
        vec![
            "Debian 12 with CloudV 1 can't connect with password: authentication failed: denied"
                .to_string()
        ]
    );
}

#[tokio::test]
async fn test_key_load_failure_makes_no_connect_attempt() {
    let connector = FakeConnector::new(healthy_shell());
    let keys = FakeKeyLoader::rejecting("missing PEM private key header");

    let violations = run_ssh_check(
        &connector,
        &all_inbound_open(),
        &RecordingSleeper::default(),
        &keys,
        &NoopReporter,
        &input("SSH Key"),
        &settings(),
    )
    .await;

    assert_eq!(keys.loads(), 1);
    assert!(connector.attempts().is_empty());
    assert_eq!(violations.len(), 1);
    assert!(violations[0].starts_with("Debian 12 with CloudV 1 can't connect with ssh key:"));
}

#[tokio::test]
async fn test_missing_password_is_connect_failure() {
    let connector = FakeConnector::new(healthy_shell());
    let mut request = input("Password");
    request.password = None;

    let violations = run_ssh_check(
        &connector,
        &all_inbound_open(),
        &RecordingSleeper::default(),
        &FakeKeyLoader::default(),
        &NoopReporter,
        &request,
        &settings(),
    )
    .await;

    assert!(connector.attempts().is_empty());
    assert_eq!(
        violations,
        vec![
            "Debian 12 with CloudV 1 can't connect with password: \
             no password supplied for password authentication"
                .to_string()
        ]
    );
}

#[tokio::test]
async fn test_violations_keep_step_order() {
    // port 443 closed, port 25 open, volume missing
    let shell = FakeShell::new()
        .on(LSBLK, Reply::Output(ok("NAME SIZE\nvda 25G\n")))
        .on("nc -z smtp.mail.yahoo.com 587", Reply::Output(fail(1, "")))
        .on("nc -z smtp.mail.yahoo.com 467", Reply::Output(fail(1, "")));
    let connector = FakeConnector::new(shell);
    let probe = FakeProbe::with_open(&[22, 80, 1000]);

    let violations = run_ssh_check(
        &connector,
        &probe,
        &RecordingSleeper::default(),
        &FakeKeyLoader::default(),
        &NoopReporter,
        &input("Password"),
        &settings(),
    )
    .await;

    assert_eq!(
        violations,
        vec![
            "CloudV 1 port 443 is closed.".to_string(),
            "CloudV 1 port 25 is open.".to_string(),
            "Debian 12 with CloudV 1 no extra drive with correct size is present.".to_string(),
        ]
    );
    assert_eq!(connector.shell.close_count(), 1);
}

#[tokio::test]
async fn test_zero_tier_requires_port_1000_closed() {
    let connector = FakeConnector::new(healthy_shell());
    let mut request = input("SSH Key");
    request.package = "CloudV 0".to_string();

    let violations = run_ssh_check(
        &connector,
        &all_inbound_open(),
        &RecordingSleeper::default(),
        &FakeKeyLoader::default(),
        &NoopReporter,
        &request,
        &settings(),
    )
    .await;

    assert_eq!(violations, vec!["CloudV 0 port 1000 is open.".to_string()]);
}

#[tokio::test]
async fn test_install_failure_still_checks_volume() {
    let shell = healthy_shell().on(INSTALL, Reply::Output(fail(100, "")));
    let connector = FakeConnector::new(shell);

    let violations = run_ssh_check(
        &connector,
        &all_inbound_open(),
        &RecordingSleeper::default(),
        &FakeKeyLoader::default(),
        &NoopReporter,
        &input("SSH Key"),
        &settings(),
    )
    .await;

    assert_eq!(
        violations,
        vec![
            "CloudV 1 with Debian 12 can't install netcat with: \
             sudo apt-get install -y netcat-traditional."
                .to_string()
        ]
    );
    assert!(connector.shell.commands().contains(&LSBLK.to_string()));
    assert_eq!(connector.shell.close_count(), 1);
}

#[tokio::test]
async fn test_identical_inputs_give_identical_results() {
    let mut runs = Vec::new();
    for _ in 0..2 {
        let connector = FakeConnector::new(FakeShell::new());
        runs.push(
            run_ssh_check(
                &connector,
                &FakeProbe::with_open(&[22]),
                &RecordingSleeper::default(),
                &FakeKeyLoader::default(),
                &NoopReporter,
                &input("SSH Key"),
                &settings(),
            )
            .await,
        );
    }
    assert_eq!(runs[0], runs[1]);
    assert!(!runs[0].is_empty());
}

#[tokio::test]
async fn test_verify_key_auth_checks_both_logins() {
    let connector = FakeConnector::new(healthy_shell());
    let mut config = settings();
    config.verify_key_auth = true;

    let violations = run_ssh_check(
        &connector,
        &all_inbound_open(),
        &RecordingSleeper::default(),
        &FakeKeyLoader::default(),
        &NoopReporter,
        &input("Password"),
        &config,
    )
    .await;

    assert!(violations.is_empty(), "unexpected: {violations:?}");
    let modes: Vec<ConnectionType> = connector.attempts().iter().map(|a| a.mode).collect();
    assert_eq!(modes, vec![ConnectionType::SshKey, ConnectionType::Password]);
    assert_eq!(connector.shell.close_count(), 2, "one close per session");
}

#[tokio::test]
async fn test_verify_key_auth_failure_is_reported_and_run_continues() {
    let connector = FakeConnector::new(healthy_shell());
    let keys = FakeKeyLoader::rejecting("unreadable");
    let mut config = settings();
    config.verify_key_auth = true;

    let violations = run_ssh_check(
        &connector,
        &all_inbound_open(),
        &RecordingSleeper::default(),
        &keys,
        &NoopReporter,
        &input("Password"),
        &config,
    )
    .await;

    assert_eq!(violations.len(), 1);
    assert!(violations[0].starts_with("Debian 12 with CloudV 1 can't connect with ssh key:"));
    assert_eq!(connector.attempts().len(), 1);
    assert_eq!(connector.shell.close_count(), 1);
}

#[tokio::test]
async fn test_outcome_keeps_port_observations() {
    let connector = FakeConnector::new(healthy_shell());

    let outcome = check_server(
        &connector,
        &all_inbound_open(),
        &RecordingSleeper::default(),
        &FakeKeyLoader::default(),
        &NoopReporter,
        &input("SSH Key"),
        &settings(),
    )
    .await;

    assert!(outcome.violations.is_empty(), "unexpected: {:?}", outcome.violations);
    let ports: Vec<(u16, bool)> = outcome
        .ports
        .iter()
        .map(|(port, record)| (port, record.is_open))
        .collect();
    assert_eq!(
        ports,
        vec![
            (22, true),
            (443, true),
            (80, true),
            (1000, true),
            (25, false),
            (587, false),
            (467, false)
        ]
    );
}

#[tokio::test]
async fn test_outcome_without_session_has_no_ports() {
    let connector = AlwaysFailingConnector(ConnectError::Authentication("denied".to_string()));

    let outcome = check_server(
        &connector,
        &all_inbound_open(),
        &RecordingSleeper::default(),
        &FakeKeyLoader::default(),
        &NoopReporter,
        &input("SSH Key"),
        &settings(),
    )
    .await;

    assert_eq!(outcome.violations.len(), 1);
    assert!(outcome.ports.is_empty());
}
