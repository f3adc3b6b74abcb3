//! A one-shot latching event used to rendezvous an HSP state with a CPE
//! job running on another thread (§6.1, "flag barrier").

use std::sync::{Condvar, Mutex};

use core_status::Status;

/// A flag that starts unset, can be released exactly once usefully (later
/// releases are no-ops), and can be reset for reuse.
pub struct FlagBarrier {
    flag: Mutex<bool>,
    cvar: Condvar,
}

impl FlagBarrier {
    pub fn new() -> Self {
        Self {
            flag: Mutex::new(false),
            cvar: Condvar::new(),
        }
    }

    /// Block the calling thread until [`FlagBarrier::release`] has been
    /// called at least once since creation or the last [`FlagBarrier::reset`].
    pub fn wait(&self) {
        let guard = self.flag.lock().unwrap();
        let _guard = self.cvar.wait_while(guard, |set| !*set).unwrap();
    }

    /// Set the flag and wake every waiter. Idempotent: releasing an
    /// already-released barrier has no effect and still returns `OK`.
    pub fn release(&self) -> Status {
        let mut guard = self.flag.lock().unwrap();
        *guard = true;
        self.cvar.notify_all();
        core_status::OK
    }

    /// Clear the flag so the barrier can be waited on again. The caller
    /// must ensure no thread is still blocked in [`FlagBarrier::wait`] when
    /// resetting.
    pub fn reset(&self) -> Status {
        let mut guard = self.flag.lock().unwrap();
        *guard = false;
        core_status::OK
    }

    pub fn is_released(&self) -> bool {
        *self.flag.lock().unwrap()
    }
}

impl Default for FlagBarrier {
    fn default() -> Self {
        Self::new()
    }
}
