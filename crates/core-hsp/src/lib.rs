//! Hierarchical state processor (§4 of the runtime design): a stack-based,
//! continuation-style state machine driver. A state's only handle to the
//! rest of the system is the data/metadata it closes over and the code the
//! previous transition propagated to it; it decides what happens next by
//! returning a [`state::StateAction`].

pub mod chain;
pub mod driver;
pub mod payload;
pub mod state;
pub mod transition;

pub use chain::{state_chain_execute, ChainLink};
pub use driver::{Hsp, MAX_PUSH, MAX_STACK};
pub use payload::Payload;
pub use state::{StateAction, StateArgs, StateFn, StateFrame};
pub use transition::{Transition, TransitionArgs, TransitionEffect, TransitionFn};
