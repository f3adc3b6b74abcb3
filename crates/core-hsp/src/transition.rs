//! The transition invoked after every state return (§4.1, §4.2).

use core_status::Status;

use crate::payload::Payload;
use crate::state::StateFrame;

/// Arguments passed to a [`TransitionFn`] after a state returns (or, for the
/// bootstrap call, before the entry state's first activation).
pub struct TransitionArgs<'a, 'b> {
    /// The state that just returned. `None` only on the bootstrap call that
    /// precedes the entry state's first activation.
    pub prev: Option<&'b StateFrame<'a>>,
    /// The frame currently on top of the stack, or `None` if it is empty.
    pub next: Option<&'b StateFrame<'a>>,
    /// The code propagated by the state (or transition) that just ran.
    pub code: Status,
    /// `STACK_SIZE()` -- stack depth after the state's action was applied,
    /// before this transition call mutates anything.
    pub stack_size: usize,
    pub data: Option<Payload<'a>>,
}

/// The effect a transition produces. Both fields default to "leave alone";
/// a transition opts into rewriting `next` or `code` by setting the
/// corresponding field.
#[derive(Default)]
pub struct TransitionEffect<'a> {
    /// `Some(new_next)` overwrites the stack top (`Some(frame)` replaces or
    /// pushes it, `None` pops it). `None` (the outer option) means "don't
    /// touch the stack".
    pub next: Option<Option<StateFrame<'a>>>,
    pub code: Option<Status>,
}

impl<'a> TransitionEffect<'a> {
    /// No effect at all -- the identity transition's usual return value.
    pub fn none() -> Self {
        Self::default()
    }

    /// Overwrite the propagated code, leave the stack alone.
    pub fn set_code(code: Status) -> Self {
        Self {
            next: None,
            code: Some(code),
        }
    }

    /// Overwrite the stack top, leave the code alone.
    pub fn set_next(next: Option<StateFrame<'a>>) -> Self {
        Self {
            next: Some(next),
            code: None,
        }
    }
}

/// The transition procedure invoked after every state return.
pub type TransitionFn<'a> = for<'b> fn(TransitionArgs<'a, 'b>) -> TransitionEffect<'a>;

/// An immutable transition record. The source design's "null transition" is
/// modeled as `Option<Transition>::None`: the driver skips calling it
/// entirely (not even the bootstrap call), which is also how the
/// `transition invoked 0 times` invariant is satisfied for free.
#[derive(Clone, Copy)]
pub struct Transition<'a> {
    pub function: TransitionFn<'a>,
    pub data: Option<Payload<'a>>,
}

impl<'a> Transition<'a> {
    pub fn new<T>(function: TransitionFn<'a>, data: &'a T) -> Self {
        Self {
            function,
            data: Some(Payload::new(data)),
        }
    }

    pub fn bare(function: TransitionFn<'a>) -> Self {
        Self {
            function,
            data: None,
        }
    }
}
