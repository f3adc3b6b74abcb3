//! Archipelago demo entrypoint.

use std::cell::Cell;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::Result;
use clap::Parser;
use tracing::info;

use archipelago::{
    Hsp, Job, ProcessingArgs, StateAction, StateArgs, StateFrame, ThreadGroup, Transition,
    TransitionArgs, TransitionEffect, WaitMode,
};

/// CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "archipelago-demo", version, about = "Archipelago runtime demo")]
struct Args {
    /// Number of states to chain through the HSP demo.
    #[arg(long, default_value_t = 5)]
    chain_len: usize,

    /// Number of entries to sum in the CPE demo.
    #[arg(long, default_value_t = 1024)]
    num_entries: usize,

    /// Entries claimed per batch in the CPE demo.
    #[arg(long, default_value_t = 16)]
    batch_size: usize,

    /// Worker threads in the CPE demo's thread group.
    #[arg(long, default_value_t = 8)]
    workers: usize,

    /// Spin instead of parking idle/finished workers.
    #[arg(long)]
    busy_wait: bool,
}

fn configure_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

struct ChainCounters {
    activations: Cell<usize>,
    remaining: Cell<usize>,
}

fn counting_state<'a>(args: StateArgs<'a>) -> StateAction<'a> {
    let counters = unsafe { args.data.unwrap().get::<ChainCounters>() };
    counters.activations.set(counters.activations.get() + 1);

    let remaining = counters.remaining.get();
    if remaining == 0 {
        return StateAction::done();
    }
    counters.remaining.set(remaining - 1);
    StateAction::proceed([StateFrame::new(counting_state, counters)])
}

fn logging_transition<'a>(args: TransitionArgs<'a, '_>) -> TransitionEffect<'a> {
    info!(
        stack_size = args.stack_size,
        code = args.code,
        "hsp transition"
    );
    TransitionEffect::none()
}

fn run_hsp_demo(chain_len: usize) {
    let counters = ChainCounters {
        activations: Cell::new(0),
        remaining: Cell::new(chain_len),
    };
    let entry = StateFrame::new(counting_state, &counters);
    let hsp = Hsp::new(entry, Some(Transition::bare(logging_transition)));

    let code = hsp.run();
    info!(
        code,
        activations = counters.activations.get(),
        "hsp demo finished"
    );
}

fn run_cpe_demo(num_entries: usize, batch_size: usize, workers: usize, mode: WaitMode) -> Result<()> {
    let group = ThreadGroup::new(workers, mode)
        .map_err(|code| anyhow::anyhow!("ThreadGroup::new failed: status {code}"))?;

    let total = AtomicUsize::new(0);

    fn sum_entries<'a>(args: ProcessingArgs<'a>) {
        let total = unsafe { args.data.unwrap().get::<AtomicUsize>() };
        total.fetch_add(1, Ordering::SeqCst);
    }

    let code = group.execute(Job::new(sum_entries, &total, num_entries, batch_size));
    info!(
        code,
        total = total.load(Ordering::SeqCst),
        "cpe demo finished"
    );
    Ok(())
}

fn main() -> Result<()> {
    configure_logging();
    let args = Args::parse();

    info!(chain_len = args.chain_len, "running hsp demo");
    run_hsp_demo(args.chain_len);

    let mode = if args.busy_wait {
        WaitMode::Busy
    } else {
        WaitMode::Blocking
    };
    info!(
        num_entries = args.num_entries,
        batch_size = args.batch_size,
        workers = args.workers,
        ?mode,
        "running cpe demo"
    );
    run_cpe_demo(args.num_entries, args.batch_size, args.workers, mode)?;

    Ok(())
}
