//! State & transition value types (§4.1).

use core_status::Status;

use crate::payload::Payload;

/// Arguments passed to a [`StateFn`] on activation.
#[derive(Clone, Copy)]
pub struct StateArgs<'a> {
    pub data: Option<Payload<'a>>,
    pub metadata: Option<Payload<'a>>,
    /// The code propagated into this activation by the previous transition
    /// (or `0` on the very first activation).
    pub code: Status,
}

/// A state procedure: given its own frame's opaque data/metadata and the
/// incoming code, decides what happens next by returning a [`StateAction`].
pub type StateFn<'a> = fn(StateArgs<'a>) -> StateAction<'a>;

/// An immutable frame: a procedure plus the two opaque handles it closes
/// over. Two frames are equal iff all three fields compare equal.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct StateFrame<'a> {
    pub function: StateFn<'a>,
    pub data: Option<Payload<'a>>,
    pub metadata: Option<Payload<'a>>,
}

impl<'a> StateFrame<'a> {
    /// Build a state with `data` only.
    pub fn new<T>(function: StateFn<'a>, data: &'a T) -> Self {
        Self {
            function,
            data: Some(Payload::new(data)),
            metadata: None,
        }
    }

    /// Build a state with both `data` and `metadata`.
    pub fn with_metadata<T, M>(function: StateFn<'a>, data: &'a T, metadata: &'a M) -> Self {
        Self {
            function,
            data: Some(Payload::new(data)),
            metadata: Some(Payload::new(metadata)),
        }
    }

    /// Build a state that closes over nothing.
    pub fn bare(function: StateFn<'a>) -> Self {
        Self {
            function,
            data: None,
            metadata: None,
        }
    }

    /// `STATE_OTHER_FUNC` -- the same data/metadata, a different function.
    pub fn with_function(self, function: StateFn<'a>) -> Self {
        Self { function, ..self }
    }
}

impl std::fmt::Debug for StateFrame<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateFrame")
            .field("function", &(self.function as usize as *const ()))
            .field("data", &self.data)
            .field("metadata", &self.metadata)
            .finish()
    }
}

/// The action a state produces after being activated.
///
/// The source design lets a state set a pop-count and/or a push list through
/// ambient, thread-local-style setters, and treats setting both as undefined
/// behaviour the implementation merely asserts against. Returning one of
/// these variants removes that ambient state entirely and makes the
/// DONE/PROCEED choice exhaustive at compile time, per the redesign notes.
pub enum StateAction<'a> {
    /// Pop `pop` frames (saturating at the current stack depth) and
    /// optionally overwrite the propagated code.
    Done { pop: usize, code: Option<Status> },
    /// Pop the current frame, then push `pushes` in order so the last
    /// element ends up on top; `0..=MAX_PUSH` frames are allowed.
    Proceed {
        code: Option<Status>,
        pushes: Vec<StateFrame<'a>>,
    },
}

impl<'a> StateAction<'a> {
    /// Pop just the current frame. Equivalent to returning no action at all.
    pub fn done() -> Self {
        Self::Done { pop: 1, code: None }
    }

    /// Pop `pop` frames (`DONE(n)`). Pass `usize::MAX` to drain the whole stack.
    pub fn done_n(pop: usize) -> Self {
        Self::Done { pop, code: None }
    }

    /// Pop the whole stack (`DONE(STACK_SIZE())`).
    pub fn done_all() -> Self {
        Self::done_n(usize::MAX)
    }

    /// Replace the current frame and push `pushes` above it (`PROCEED`).
    pub fn proceed(pushes: impl Into<Vec<StateFrame<'a>>>) -> Self {
        Self::Proceed {
            code: None,
            pushes: pushes.into(),
        }
    }

    /// Attach a code to assign after this action is applied.
    pub fn with_code(self, code: Status) -> Self {
        match self {
            Self::Done { pop, .. } => Self::Done {
                pop,
                code: Some(code),
            },
            Self::Proceed { pushes, .. } => Self::Proceed {
                code: Some(code),
                pushes,
            },
        }
    }
}

impl Default for StateAction<'_> {
    /// "No action" in the source design, equivalent to `DONE(1)`.
    fn default() -> Self {
        Self::done()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dummy(_args: StateArgs<'_>) -> StateAction<'_> {
        StateAction::default()
    }

    #[test]
    fn frames_compare_by_field_identity() {
        let a = 1i32;
        let b = 1i32;
        let f1 = StateFrame::new(dummy, &a);
        let f2 = StateFrame::new(dummy, &a);
        let f3 = StateFrame::new(dummy, &b);
        assert_eq!(f1, f2);
        assert_ne!(f1, f3);
    }

    #[test]
    fn with_function_preserves_data_and_metadata() {
        let a = 1i32;
        let m = 2i32;
        let f1 = StateFrame::with_metadata(dummy, &a, &m);
        let f2 = f1.with_function(dummy);
        assert_eq!(f1.data, f2.data);
        assert_eq!(f1.metadata, f2.metadata);
    }

    #[test]
    fn default_action_is_pop_self() {
        match StateAction::default() {
            StateAction::Done { pop, code } => {
                assert_eq!(pop, 1);
                assert_eq!(code, None);
            }
            StateAction::Proceed { .. } => panic!("expected Done"),
        }
    }
}
