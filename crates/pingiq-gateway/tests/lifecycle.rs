#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::time::Duration;

use pingiq_gateway::config::ShutdownConfig;
use pingiq_gateway::lifecycle::{begin_drain, ShutdownOptions, ShutdownSignal};
use pingiq_gateway::readiness::RuntimeState;
use pingiq_gateway::PingIq;

#[test]
fn signal_names_parse_case_insensitively() {
    assert_eq!("sigterm".parse::<ShutdownSignal>().unwrap(), ShutdownSignal::Term);
    assert_eq!("SIGHUP".parse::<ShutdownSignal>().unwrap(), ShutdownSignal::Hup);
    assert!("SIGUSR1".parse::<ShutdownSignal>().is_err());
    assert_eq!(ShutdownSignal::Quit.to_string(), "SIGQUIT");
}

#[test]
fn options_from_config() {
    let cfg = ShutdownConfig {
        signals: vec!["SIGINT".into()],
        drain_ms: 250,
    };
    let opts = ShutdownOptions::from_config(&cfg).unwrap();
    assert_eq!(opts.signals, vec![ShutdownSignal::Int]);
    assert_eq!(opts.drain, Duration::from_millis(250));
    assert!(opts.exit_process);
    assert!(!opts.with_exit_process(false).exit_process);
}

#[test]
fn drain_enters_maintenance() {
    let state = RuntimeState::new();
    begin_drain(&state);
    assert!(state.is_maintenance());
    assert!(!state.has_cache());
}

#[tokio::test]
async fn install_and_unregister() {
    let app = PingIq::new(Default::default()).unwrap();
    let opts = ShutdownOptions::default()
        .with_exit_process(false)
        .on_signal(|_| {});
    let shutdown = app.install_graceful_shutdown(opts).unwrap();
    assert!(!app.maintenance().is_enabled());
    shutdown.unregister();
    assert!(!app.maintenance().is_enabled());
}

#[tokio::test]
async fn drained_stays_pending_after_unregister() {
    let app = PingIq::new(Default::default()).unwrap();
    let shutdown = app
        .install_graceful_shutdown(ShutdownOptions::default().with_exit_process(false))
        .unwrap();
    let drained = shutdown.drained();
    shutdown.unregister();
    // Let the aborted listener tasks drop their senders.
    tokio::task::yield_now().await;

    let res = tokio::time::timeout(Duration::from_millis(200), drained).await;
    assert!(res.is_err(), "drained must not resolve without a signal");
    assert!(!app.maintenance().is_enabled());
}
