// Process-wide shutdown: a flag set from signal context, acted on by the dispatch loops
use crate::error::{DaemonError, Result};
use nix::sys::signal::{sigaction, SaFlags, SigAction, SigHandler, SigSet, Signal};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use tracing::warn;

static SIGNAL_FLAG: OnceLock<Arc<AtomicBool>> = OnceLock::new();

/// Cancellation flag observed by the dispatch loops between waits.
#[derive(Debug, Clone, Default)]
pub struct ShutdownToken {
    flag: Arc<AtomicBool>,
}

impl ShutdownToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trigger(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_triggered(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

extern "C" fn on_signal(_signum: libc::c_int) {
    if let Some(flag) = SIGNAL_FLAG.get() {
        flag.store(true, Ordering::SeqCst);
    }
}

/// Route SIGINT and SIGTERM to `token`.
///
/// Installed without `SA_RESTART` so a blocked `poll` wakes with `EINTR`.
/// Only the first token passed here is ever signalled.
pub fn install_signal_handlers(token: &ShutdownToken) -> Result<()> {
    if SIGNAL_FLAG.set(Arc::clone(&token.flag)).is_err() {
        warn!("signal handlers already bound to another shutdown token");
    }

    let action = SigAction::new(
        SigHandler::Handler(on_signal),
        SaFlags::empty(),
        SigSet::empty(),
    );
    for signal in [Signal::SIGINT, Signal::SIGTERM] {
        // SAFETY: the handler only performs an atomic store.
        unsafe { sigaction(signal, &action) }.map_err(DaemonError::Signal)?;
    }
    Ok(())
}
