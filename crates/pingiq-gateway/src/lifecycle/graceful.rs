//! Signal-driven graceful shutdown.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use pingiq_core::error::{PingIqError, Result};

use crate::config::ShutdownConfig;
use crate::readiness::RuntimeState;

/// Termination signals a host can ask to listen for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownSignal {
    Term,
    Int,
    Hup,
    Quit,
}

impl ShutdownSignal {
    pub fn as_str(self) -> &'static str {
        match self {
            ShutdownSignal::Term => "SIGTERM",
            ShutdownSignal::Int => "SIGINT",
            ShutdownSignal::Hup => "SIGHUP",
            ShutdownSignal::Quit => "SIGQUIT",
        }
    }
}

impl fmt::Display for ShutdownSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShutdownSignal {
    type Err = PingIqError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "SIGTERM" => Ok(ShutdownSignal::Term),
            "SIGINT" => Ok(ShutdownSignal::Int),
            "SIGHUP" => Ok(ShutdownSignal::Hup),
            "SIGQUIT" => Ok(ShutdownSignal::Quit),
            other => Err(PingIqError::Config(format!("unsupported shutdown signal: {other}"))),
        }
    }
}

type SignalCallback = Arc<dyn Fn(ShutdownSignal) + Send + Sync>;

/// How the shutdown listener behaves once a signal arrives.
#[derive(Clone)]
pub struct ShutdownOptions {
    pub signals: Vec<ShutdownSignal>,
    pub drain: Duration,
    /// Call `std::process::exit(0)` after draining. When false the listener
    /// only resolves [`GracefulShutdown::drained`].
    pub exit_process: bool,
    pub on_signal: Option<SignalCallback>,
}

impl Default for ShutdownOptions {
    fn default() -> Self {
        Self {
            signals: vec![ShutdownSignal::Term, ShutdownSignal::Int],
            drain: Duration::ZERO,
            exit_process: true,
            on_signal: None,
        }
    }
}

impl ShutdownOptions {
    pub fn from_config(cfg: &ShutdownConfig) -> Result<Self> {
        Ok(Self {
            signals: cfg.parsed_signals()?,
            drain: cfg.drain(),
            ..Self::default()
        })
    }

    pub fn with_exit_process(mut self, exit: bool) -> Self {
        self.exit_process = exit;
        self
    }

    pub fn on_signal(mut self, f: impl Fn(ShutdownSignal) + Send + Sync + 'static) -> Self {
        self.on_signal = Some(Arc::new(f));
        self
    }
}

/// Start draining: readiness fails from now on and the cache is dropped.
pub fn begin_drain(state: &RuntimeState) {
    state.set_maintenance(true);
}

/// Registered signal listeners. Call [`GracefulShutdown::unregister`] to remove them.
pub struct GracefulShutdown {
    tasks: Vec<JoinHandle<()>>,
    drained: watch::Receiver<bool>,
}

impl GracefulShutdown {
    /// Install one listener per configured signal. Must run inside a Tokio runtime.
    pub fn install(state: Arc<RuntimeState>, opts: ShutdownOptions) -> Result<Self> {
        let (tx, rx) = watch::channel(false);
        let tx = Arc::new(tx);
        let mut tasks = Vec::with_capacity(opts.signals.len());

        for sig in opts.signals.iter().copied() {
            let mut listener = SignalListener::new(sig)?;
            let state = Arc::clone(&state);
            let opts = opts.clone();
            let tx = Arc::clone(&tx);
            tasks.push(tokio::spawn(async move {
                if !listener.recv().await {
                    return;
                }
                tracing::info!(signal = %sig, drain_ms = opts.drain.as_millis() as u64, "shutdown signal received, draining");
                if let Some(cb) = &opts.on_signal {
                    cb(sig);
                }
                begin_drain(&state);
                if !opts.drain.is_zero() {
                    tokio::time::sleep(opts.drain).await;
                }
                if opts.exit_process {
                    tracing::info!("drain complete, exiting");
                    std::process::exit(0);
                }
                tx.send_replace(true);
            }));
        }

        Ok(Self { tasks, drained: rx })
    }

    /// Resolves once a signal has been handled and the drain delay elapsed.
    /// Never resolves if the listeners were unregistered first.
    pub fn drained(&self) -> impl std::future::Future<Output = ()> + Send + 'static {
        let mut rx = self.drained.clone();
        async move {
            if rx.wait_for(|done| *done).await.is_err() {
                // Senders gone without a signal: nothing will ever drain.
                std::future::pending::<()>().await;
            }
        }
    }

    pub fn unregister(self) {
        for task in self.tasks {
            task.abort();
        }
    }
}

#[cfg(unix)]
struct SignalListener(tokio::signal::unix::Signal);

#[cfg(unix)]
impl SignalListener {
    fn new(sig: ShutdownSignal) -> Result<Self> {
        use tokio::signal::unix::{signal, SignalKind};
        let kind = match sig {
            ShutdownSignal::Term => SignalKind::terminate(),
            ShutdownSignal::Int => SignalKind::interrupt(),
            ShutdownSignal::Hup => SignalKind::hangup(),
            ShutdownSignal::Quit => SignalKind::quit(),
        };
        signal(kind)
            .map(SignalListener)
            .map_err(|e| PingIqError::Internal(format!("install {sig} handler failed: {e}")))
    }

    async fn recv(&mut self) -> bool {
        self.0.recv().await.is_some()
    }
}

#[cfg(not(unix))]
struct SignalListener(ShutdownSignal);

#[cfg(not(unix))]
impl SignalListener {
    fn new(sig: ShutdownSignal) -> Result<Self> {
        Ok(SignalListener(sig))
    }

    async fn recv(&mut self) -> bool {
        match self.0 {
            ShutdownSignal::Int => tokio::signal::ctrl_c().await.is_ok(),
            _ => std::future::pending::<bool>().await,
        }
    }
}
