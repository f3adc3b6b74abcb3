//! Archipelago: a runtime framework pairing a hierarchical state processor
//! (continuation-style state machine) with a concurrent processing engine
//! (persistent worker-thread pool), joined by flag-barrier rendezvous.

pub mod dispatch;

pub use core_cpe::{
    CallbackArgs, CallbackFn, Job, ProcessingArgs, ProcessingFn, ThreadGroup, WaitMode,
    MAX_THREADS,
};
pub use core_hsp::{
    state_chain_execute, ChainLink, Hsp, Payload, StateAction, StateArgs, StateFn, StateFrame,
    Transition, TransitionArgs, TransitionEffect, TransitionFn, MAX_PUSH, MAX_STACK,
};
pub use core_status::{ErrorKind, Status, OK};
pub use core_sync::{flag_barrier_release, FlagBarrier};
pub use dispatch::{state_dispatch_and_wait, DispatchCtx};
