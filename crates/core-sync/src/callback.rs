//! Thread-group callback that releases a [`FlagBarrier`] (§4.4).

use core_cpe::CallbackArgs;
use tracing::error;

use crate::barrier::FlagBarrier;

/// A [`core_cpe::CallbackFn`] that releases the [`FlagBarrier`] passed as
/// its data, ignoring `work_size`. The canonical way an HSP state suspends
/// on a dispatched job: pass this as the job's callback, with the barrier
/// as its data, then call [`FlagBarrier::wait`].
pub fn flag_barrier_release<'a>(args: CallbackArgs<'a>) {
    let barrier = unsafe { args.data.unwrap().get::<FlagBarrier>() };
    let code = barrier.release();
    if code != 0 {
        error!(code, "flag_barrier_release: release() failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_cpe::{Job, ProcessingArgs, ThreadGroup, WaitMode};

    #[test]
    fn releasing_through_a_thread_group_callback_wakes_the_waiter() {
        let barrier = FlagBarrier::new();
        let group = ThreadGroup::new(2, WaitMode::Blocking).unwrap();

        fn noop<'a>(_args: ProcessingArgs<'a>) {}
        let job = Job::bare(noop, 1, 1).with_callback(flag_barrier_release, &barrier);
        let code = group.execute(job);
        assert_eq!(code, 0);

        barrier.wait();
        assert!(barrier.is_released());
    }

    #[test]
    fn fires_even_for_a_zero_work_size_job() {
        let barrier = FlagBarrier::new();
        let group = ThreadGroup::new(2, WaitMode::Busy).unwrap();

        fn noop<'a>(_args: ProcessingArgs<'a>) {}
        let job = Job::bare(noop, 0, 1).with_callback(flag_barrier_release, &barrier);
        let code = group.execute(job);
        assert_eq!(code, 0);

        barrier.wait();
        assert!(barrier.is_released());
    }
}
