//! Termination signals. The handler only raises a flag; the driving loop
//! and the blocking event wait both watch it.

use std::sync::atomic::{AtomicBool, Ordering};

use nix::sys::signal::{sigaction, SaFlags, SigAction, SigHandler, SigSet, Signal};

use crate::platform::PlatformError;

static REQUESTED: AtomicBool = AtomicBool::new(false);

extern "C" fn on_signal(_: nix::libc::c_int) {
    REQUESTED.store(true, Ordering::SeqCst);
}

/// Route SIGINT, SIGTERM and SIGHUP to the shutdown flag.
///
/// Installed without `SA_RESTART`, so a blocked `poll` on the display
/// socket returns `EINTR` and notices the request right away.
pub fn install() -> Result<(), PlatformError> {
    let action = SigAction::new(
        SigHandler::Handler(on_signal),
        SaFlags::empty(),
        SigSet::empty(),
    );
    for signal in [Signal::SIGINT, Signal::SIGTERM, Signal::SIGHUP] {
        // SAFETY: the handler only performs an atomic store.
        unsafe { sigaction(signal, &action) }.map_err(PlatformError::Signal)?;
    }
    Ok(())
}

/// The process-wide shutdown flag.
pub fn flag() -> &'static AtomicBool {
    &REQUESTED
}

pub fn requested() -> bool {
    REQUESTED.load(Ordering::SeqCst)
}
