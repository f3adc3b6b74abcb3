//! The unit of work a [`crate::group::ThreadGroup`] dispatches to its
//! workers, and the callback fired once the last worker drains it (§3,
//! "Job").

use core_hsp::Payload;

/// Arguments passed to a [`ProcessingFn`] for one claimed index.
pub struct ProcessingArgs<'a> {
    /// The job's total `work_size`, constant across every call.
    pub work_size: usize,
    /// The specific index this call covers, in `0..work_size`.
    pub index: usize,
    pub data: Option<Payload<'a>>,
}

/// A processing function: does the work for one index. Must be safe to
/// call concurrently for distinct indices (§4.3, "ordering guarantee").
pub type ProcessingFn = fn(ProcessingArgs<'_>);

/// Arguments passed to a [`CallbackFn`] when a job completes.
pub struct CallbackArgs<'a> {
    pub work_size: usize,
    pub data: Option<Payload<'a>>,
}

/// Fired exactly once per `execute`, by the worker that observes
/// completion (or by the caller thread itself, for a `work_size == 0` job).
pub type CallbackFn = fn(CallbackArgs<'_>);

/// A job description.
#[derive(Clone, Copy)]
pub struct Job<'a> {
    pub pfunc: ProcessingFn,
    pub pfunc_data: Option<Payload<'a>>,
    pub work_size: usize,
    pub batch_size: usize,
    pub callback: Option<CallbackFn>,
    pub callback_data: Option<Payload<'a>>,
}

impl<'a> Job<'a> {
    /// A job with `pfunc` data but no completion callback.
    pub fn new<T>(pfunc: ProcessingFn, pfunc_data: &'a T, work_size: usize, batch_size: usize) -> Self {
        Self {
            pfunc,
            pfunc_data: Some(Payload::new(pfunc_data)),
            work_size,
            batch_size,
            callback: None,
            callback_data: None,
        }
    }

    /// A job whose `pfunc` closes over nothing.
    pub fn bare(pfunc: ProcessingFn, work_size: usize, batch_size: usize) -> Self {
        Self {
            pfunc,
            pfunc_data: None,
            work_size,
            batch_size,
            callback: None,
            callback_data: None,
        }
    }

    /// Attach a completion callback with its own data.
    pub fn with_callback<T>(mut self, callback: CallbackFn, data: &'a T) -> Self {
        self.callback = Some(callback);
        self.callback_data = Some(Payload::new(data));
        self
    }

    /// Attach a completion callback that closes over nothing.
    pub fn with_bare_callback(mut self, callback: CallbackFn) -> Self {
        self.callback = Some(callback);
        self
    }
}
