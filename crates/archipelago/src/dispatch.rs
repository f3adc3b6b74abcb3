//! Joins an HSP state to a CPE job through a flag barrier (§4.4,
//! "integration pattern"): create a barrier, hand `flag_barrier_release` to
//! the job as its completion callback, dispatch, then wait. Because
//! `execute` itself blocks until the callback has already fired, the wait
//! that follows always finds the flag already latched — the point is
//! uniformity with callers that dispatch asynchronously through some other
//! mechanism, not to add blocking that `execute` doesn't already do.

use core_cpe::{Job, ThreadGroup};
use core_hsp::{StateAction, StateArgs, StateFrame};
use core_sync::{flag_barrier_release, FlagBarrier};

/// Data closed over by [`state_dispatch_and_wait`]: the group and job to
/// run, plus the barrier the run rendezvous through.
pub struct DispatchCtx<'a> {
    pub group: &'a ThreadGroup,
    pub job: Job<'a>,
    pub barrier: FlagBarrier,
}

impl<'a> DispatchCtx<'a> {
    pub fn new(group: &'a ThreadGroup, job: Job<'a>) -> Self {
        Self {
            group,
            job,
            barrier: FlagBarrier::new(),
        }
    }
}

/// Runs `ctx.job` on `ctx.group` (wiring `ctx.barrier`'s release in as the
/// job's callback if the job didn't already have one), waits on the
/// barrier, then proceeds. Suitable as an HSP entry or continuation state.
pub fn state_dispatch_and_wait<'a>(args: StateArgs<'a>) -> StateAction<'a> {
    let ctx = unsafe { args.data.unwrap().get::<DispatchCtx<'a>>() };

    let job = if ctx.job.callback.is_none() {
        ctx.job.with_callback(flag_barrier_release, &ctx.barrier)
    } else {
        ctx.job
    };

    let code = ctx.group.execute(job);
    ctx.barrier.wait();

    StateAction::default().with_code(code)
}
