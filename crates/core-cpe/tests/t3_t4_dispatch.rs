use std::sync::atomic::{AtomicUsize, Ordering};

use core_cpe::{CallbackArgs, Job, ProcessingArgs, ThreadGroup, WaitMode};

#[test]
fn zero_work_size_never_calls_pfunc_but_fires_the_callback_once() {
    let group = ThreadGroup::new(4, WaitMode::Busy).unwrap();
    let pfunc_calls = AtomicUsize::new(0);
    let callback_calls = AtomicUsize::new(0);

    fn bump_pfunc<'a>(args: ProcessingArgs<'a>) {
        unsafe { args.data.unwrap().get::<AtomicUsize>() }.fetch_add(1, Ordering::SeqCst);
    }
    fn bump_callback<'a>(args: CallbackArgs<'a>) {
        unsafe { args.data.unwrap().get::<AtomicUsize>() }.fetch_add(1, Ordering::SeqCst);
    }

    let job = Job::new(bump_pfunc, &pfunc_calls, 0, 16).with_callback(bump_callback, &callback_calls);
    let code = group.execute(job);

    assert_eq!(code, 0);
    assert_eq!(pfunc_calls.load(Ordering::SeqCst), 0);
    assert_eq!(callback_calls.load(Ordering::SeqCst), 1);
}

#[test]
fn every_index_is_visited_exactly_once_under_contention() {
    for mode in [WaitMode::Busy, WaitMode::Blocking] {
        const NUM_ENTRIES: usize = 1024;
        const BATCH_SIZE: usize = 16;

        let group = ThreadGroup::new(8, mode).unwrap();
        let visits: Vec<AtomicUsize> = (0..NUM_ENTRIES).map(|_| AtomicUsize::new(0)).collect();

        fn visit<'a>(args: ProcessingArgs<'a>) {
            let visits = unsafe { args.data.unwrap().get::<Vec<AtomicUsize>>() };
            visits[args.index].fetch_add(1, Ordering::SeqCst);
        }

        let code = group.execute(Job::new(visit, &visits, NUM_ENTRIES, BATCH_SIZE));

        assert_eq!(code, 0);
        assert!(
            visits.iter().all(|v| v.load(Ordering::SeqCst) == 1),
            "every index must be visited exactly once in {mode:?} mode"
        );
    }
}

#[test]
fn callback_fires_exactly_once_per_execute() {
    const NUM_ENTRIES: usize = 200;

    let group = ThreadGroup::new(8, WaitMode::Blocking).unwrap();
    let callback_calls = AtomicUsize::new(0);

    fn noop<'a>(_args: ProcessingArgs<'a>) {}
    fn bump<'a>(args: CallbackArgs<'a>) {
        assert_eq!(args.work_size, NUM_ENTRIES);
        unsafe { args.data.unwrap().get::<AtomicUsize>() }.fetch_add(1, Ordering::SeqCst);
    }

    let job = Job::bare(noop, NUM_ENTRIES, 7).with_callback(bump, &callback_calls);
    let code = group.execute(job);

    assert_eq!(code, 0);
    assert_eq!(callback_calls.load(Ordering::SeqCst), 1);
}

#[test]
fn a_group_can_run_many_jobs_in_sequence() {
    let group = ThreadGroup::new(4, WaitMode::Blocking).unwrap();
    let total = AtomicUsize::new(0);

    fn bump<'a>(args: ProcessingArgs<'a>) {
        unsafe { args.data.unwrap().get::<AtomicUsize>() }.fetch_add(1, Ordering::SeqCst);
    }

    for _ in 0..20 {
        let code = group.execute(Job::new(bump, &total, 100, 7));
        assert_eq!(code, 0);
    }

    assert_eq!(total.load(Ordering::SeqCst), 2000);
}

#[test]
fn batch_size_zero_is_rejected() {
    let group = ThreadGroup::new(2, WaitMode::Busy).unwrap();
    fn noop<'a>(_args: ProcessingArgs<'a>) {}
    let code = group.execute(Job::bare(noop, 10, 0));
    assert_eq!(code, core_status::ErrorKind::Misuse.code());
}
