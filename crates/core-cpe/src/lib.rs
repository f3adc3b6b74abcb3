//! Concurrent processing engine (§4.3 of the runtime design): a persistent
//! worker-thread pool that claims batches of indices lock-free instead of
//! spawning threads per job.

pub mod group;
pub mod job;

pub use group::{ThreadGroup, WaitMode, MAX_THREADS};
pub use job::{CallbackArgs, CallbackFn, Job, ProcessingArgs, ProcessingFn};
