//! A persistent worker-thread pool driven by a lock-free claim protocol.
//!
//! Workers are spawned once, in [`ThreadGroup::new`], and parked until the
//! next [`ThreadGroup::execute`] call publishes a job. Dispatch uses no
//! per-item locking: workers race a single [`AtomicUsize`] with
//! `fetch_add` to claim successive batches of indices (§4.3).

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread;

use core_hsp::Payload;
use core_status::{ErrorKind, Status};
use tracing::trace;

use crate::job::{CallbackArgs, CallbackFn, Job, ProcessingArgs, ProcessingFn};

/// Hard cap on the number of worker threads a group may hold.
pub const MAX_THREADS: usize = 256;

/// Whether idle/finished workers spin or block waiting for the next job.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum WaitMode {
    /// Spin on an atomic epoch counter (`std::hint::spin_loop`). Lower
    /// wake-up latency, burns a core per idle worker.
    Busy,
    /// Park on a `Mutex`+`Condvar`. Higher wake-up latency, no CPU use
    /// while idle.
    Blocking,
}

struct StoredJob {
    pfunc: ProcessingFn,
    pfunc_data: Option<*const ()>,
    callback: Option<CallbackFn>,
    callback_data: Option<*const ()>,
}

// SAFETY: a `StoredJob` is only ever published by `execute`, which blocks
// the publishing thread until every worker has observed the matching
// "done" epoch, so the pointees it refers to are guaranteed live for the
// entire time any worker might dereference them.
unsafe impl Send for StoredJob {}
unsafe impl Sync for StoredJob {}

struct Shared {
    mode: WaitMode,
    shutdown: AtomicBool,

    /// Bumped by `execute` after publishing a new job; workers wait for it
    /// to change from the value they last observed ("ping").
    job_epoch: AtomicU64,
    /// Bumped by the worker that fires the completion callback; `execute`
    /// waits for it to reach `job_epoch` ("pong").
    done_epoch: AtomicU64,

    next_index: AtomicUsize,
    work_size: AtomicUsize,
    batch_size: AtomicUsize,
    /// Workers still owed a claim attempt before this job is fully spent.
    active_workers: AtomicUsize,

    job: Mutex<Option<StoredJob>>,

    wake: Mutex<()>,
    wake_cvar: Condvar,
    done: Mutex<()>,
    done_cvar: Condvar,
}

/// A persistent group of worker threads (§3, "Thread group").
pub struct ThreadGroup {
    shared: Arc<Shared>,
    workers: Vec<thread::JoinHandle<()>>,
}

impl ThreadGroup {
    /// Spawn `num_threads` workers. Returns [`ErrorKind::Misuse`] if
    /// `num_threads` is `0` or exceeds [`MAX_THREADS`], or
    /// [`ErrorKind::Resource`] if a thread fails to spawn (any already-
    /// spawned workers are shut down before returning).
    pub fn new(num_threads: usize, mode: WaitMode) -> Result<Self, Status> {
        if num_threads == 0 || num_threads > MAX_THREADS {
            return Err(ErrorKind::Misuse.code());
        }

        let shared = Arc::new(Shared {
            mode,
            shutdown: AtomicBool::new(false),
            job_epoch: AtomicU64::new(0),
            done_epoch: AtomicU64::new(0),
            next_index: AtomicUsize::new(0),
            work_size: AtomicUsize::new(0),
            batch_size: AtomicUsize::new(1),
            active_workers: AtomicUsize::new(0),
            job: Mutex::new(None),
            wake: Mutex::new(()),
            wake_cvar: Condvar::new(),
            done: Mutex::new(()),
            done_cvar: Condvar::new(),
        });

        let mut workers = Vec::with_capacity(num_threads);
        for thread_idx in 0..num_threads {
            let shared = Arc::clone(&shared);
            let spawned = thread::Builder::new()
                .name(format!("cpe-worker-{thread_idx}"))
                .spawn(move || worker_loop(shared));

            match spawned {
                Ok(handle) => workers.push(handle),
                Err(err) => {
                    trace!(%err, thread_idx, "failed to spawn worker");
                    shared.shutdown.store(true, Ordering::SeqCst);
                    shared.job_epoch.fetch_add(1, Ordering::SeqCst);
                    let _wake = shared.wake.lock().unwrap();
                    shared.wake_cvar.notify_all();
                    drop(_wake);
                    for handle in workers {
                        let _ = handle.join();
                    }
                    return Err(ErrorKind::Resource.code());
                }
            }
        }

        Ok(Self { shared, workers })
    }

    /// Dispatch `job` and block until it has run to completion (including
    /// its callback, if any). Returns [`ErrorKind::Misuse`] if
    /// `job.batch_size == 0`.
    ///
    /// A `work_size == 0` job is a no-op: `pfunc` is never called, and the
    /// callback (if present) fires exactly once from the calling thread
    /// rather than from a worker.
    pub fn execute(&self, job: Job<'_>) -> Status {
        if job.batch_size == 0 {
            return ErrorKind::Misuse.code();
        }
        if job.work_size == 0 {
            if let Some(callback) = job.callback {
                callback(CallbackArgs {
                    work_size: 0,
                    data: job.callback_data,
                });
            }
            return core_status::OK;
        }

        {
            let mut slot = self.shared.job.lock().unwrap();
            *slot = Some(StoredJob {
                pfunc: job.pfunc,
                pfunc_data: job.pfunc_data.map(|p| p.as_raw()),
                callback: job.callback,
                callback_data: job.callback_data.map(|p| p.as_raw()),
            });
        }
        self.shared.next_index.store(0, Ordering::SeqCst);
        self.shared.work_size.store(job.work_size, Ordering::SeqCst);
        self.shared.batch_size.store(job.batch_size, Ordering::SeqCst);
        self.shared
            .active_workers
            .store(self.workers.len(), Ordering::SeqCst);

        let target_epoch = self.shared.job_epoch.fetch_add(1, Ordering::SeqCst) + 1;
        {
            let _wake = self.shared.wake.lock().unwrap();
            self.shared.wake_cvar.notify_all();
        }

        match self.shared.mode {
            WaitMode::Busy => {
                while self.shared.done_epoch.load(Ordering::SeqCst) < target_epoch {
                    std::hint::spin_loop();
                }
            }
            WaitMode::Blocking => {
                let guard = self.shared.done.lock().unwrap();
                let _guard = self
                    .shared
                    .done_cvar
                    .wait_while(guard, |_| {
                        self.shared.done_epoch.load(Ordering::SeqCst) < target_epoch
                    })
                    .unwrap();
            }
        }

        core_status::OK
    }
}

impl Drop for ThreadGroup {
    fn drop(&mut self) {
        self.shared.shutdown.store(true, Ordering::SeqCst);
        self.shared.job_epoch.fetch_add(1, Ordering::SeqCst);
        {
            let _wake = self.shared.wake.lock().unwrap();
            self.shared.wake_cvar.notify_all();
        }
        for handle in self.workers.drain(..) {
            let _ = handle.join();
        }
    }
}

fn worker_loop(shared: Arc<Shared>) {
    let mut seen_epoch = 0u64;

    loop {
        match shared.mode {
            WaitMode::Busy => {
                while shared.job_epoch.load(Ordering::SeqCst) == seen_epoch
                    && !shared.shutdown.load(Ordering::SeqCst)
                {
                    std::hint::spin_loop();
                }
            }
            WaitMode::Blocking => {
                let guard = shared.wake.lock().unwrap();
                let _guard = shared
                    .wake_cvar
                    .wait_while(guard, |_| {
                        shared.job_epoch.load(Ordering::SeqCst) == seen_epoch
                            && !shared.shutdown.load(Ordering::SeqCst)
                    })
                    .unwrap();
            }
        }

        if shared.shutdown.load(Ordering::SeqCst) {
            return;
        }
        seen_epoch = shared.job_epoch.load(Ordering::SeqCst);

        let work_size = shared.work_size.load(Ordering::SeqCst);
        let batch_size = shared.batch_size.load(Ordering::SeqCst);

        // The job descriptor is fixed for the whole epoch once published, so
        // it's read out of the mutex once here rather than once per claimed
        // batch -- the claim loop below never touches `shared.job` and stays
        // lock-free, racing only on `next_index`.
        let (pfunc, pfunc_data) = {
            let stored = shared.job.lock().unwrap();
            let job = stored.as_ref().expect("job published before job_epoch bump");
            (job.pfunc, job.pfunc_data)
        };

        loop {
            let start = shared.next_index.fetch_add(batch_size, Ordering::SeqCst);
            if start >= work_size {
                break;
            }
            let end = (start + batch_size).min(work_size);

            for index in start..end {
                pfunc(ProcessingArgs {
                    work_size,
                    index,
                    data: pfunc_data.map(|ptr| unsafe { Payload::from_raw(ptr) }),
                });
            }
        }

        if shared.active_workers.fetch_sub(1, Ordering::SeqCst) == 1 {
            let stored = shared.job.lock().unwrap();
            let callback = stored.as_ref().and_then(|job| job.callback);
            let callback_data = stored.as_ref().and_then(|job| job.callback_data);
            drop(stored);

            if let Some(callback) = callback {
                let data = callback_data.map(|ptr| unsafe { Payload::from_raw(ptr) });
                callback(CallbackArgs { work_size, data });
            }

            shared.done_epoch.store(seen_epoch, Ordering::SeqCst);
            let _done = shared.done.lock().unwrap();
            shared.done_cvar.notify_all();
        }
    }
}
