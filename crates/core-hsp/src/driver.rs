//! The HSP driver: `run(H) -> S` (§4.2).

use core_status::{ErrorKind, Status};
use tracing::trace;

use crate::state::{StateArgs, StateFrame};
use crate::transition::{Transition, TransitionArgs, TransitionEffect};

/// Hard maximum frame-stack depth (§3, "Frame stack K").
pub const MAX_STACK: usize = 512;

/// Maximum number of frames a single `PROCEED` may push (`0..=MAX_PUSH`).
pub const MAX_PUSH: usize = 64;

/// A hierarchical state processor instance.
///
/// `entry_state` is `None` to model the source design's "null entry" case;
/// everything else in the type is non-optional because the frames it names
/// (when present) are always real.
pub struct Hsp<'a> {
    pub entry_state: Option<StateFrame<'a>>,
    pub transition: Option<Transition<'a>>,
}

impl<'a> Hsp<'a> {
    pub fn new(entry_state: StateFrame<'a>, transition: Option<Transition<'a>>) -> Self {
        Self {
            entry_state: Some(entry_state),
            transition,
        }
    }

    /// Drive the state stack to completion and return the final code.
    ///
    /// Exactly one `run` may execute on a given instance at a time (§3); the
    /// type's `&self` borrow does not enforce that by itself, but nothing in
    /// `run` is safe to call reentrantly.
    pub fn run(&self) -> Status {
        // Open question (§9): whether the transition is invoked when
        // entry_state is null. The source appears not to enter the main loop
        // in that case, so here: return 0, no transition call at all.
        let Some(entry) = self.entry_state else {
            return core_status::OK;
        };

        let mut code: Status = core_status::OK;
        let mut stack: Vec<StateFrame<'a>> = vec![entry];

        // Bootstrap transition call: gives the transition one look at the
        // entry state before its first activation (prev = None). This is
        // what makes the "N+1 invocations for N activations" invariant work
        // out, matching the reference test harness exactly.
        if let Some(transition) = &self.transition {
            let next = stack.last().copied();
            let effect = (transition.function)(TransitionArgs {
                prev: None,
                next: next.as_ref(),
                code,
                stack_size: stack.len(),
                data: transition.data,
            });
            apply_effect(&mut stack, &mut code, effect);
        }

        while let Some(cur) = stack.last().copied() {
            let args = StateArgs {
                data: cur.data,
                metadata: cur.metadata,
                code,
            };
            let action = (cur.function)(args);

            match action {
                crate::state::StateAction::Done { pop, code: new_code } => {
                    let pop = pop.min(stack.len());
                    stack.truncate(stack.len() - pop);
                    if let Some(c) = new_code {
                        code = c;
                    }
                }
                crate::state::StateAction::Proceed {
                    code: new_code,
                    pushes,
                } => {
                    if pushes.len() > MAX_PUSH {
                        trace!(len = pushes.len(), "PROCEED exceeded MAX_PUSH");
                        stack.clear();
                        return ErrorKind::Misuse.code();
                    }

                    stack.pop(); // replace cur ...
                    if stack.len() + pushes.len() > MAX_STACK {
                        trace!(depth = stack.len() + pushes.len(), "stack overflow");
                        stack.clear();
                        return ErrorKind::StackOverflow.code();
                    }
                    stack.extend(pushes); // ... and push the rest, last on top.

                    if let Some(c) = new_code {
                        code = c;
                    }
                }
            }

            if let Some(transition) = &self.transition {
                let next = stack.last().copied();
                let effect = (transition.function)(TransitionArgs {
                    prev: Some(&cur),
                    next: next.as_ref(),
                    code,
                    stack_size: stack.len(),
                    data: transition.data,
                });
                apply_effect(&mut stack, &mut code, effect);
            }
        }

        code
    }
}

fn apply_effect<'a>(
    stack: &mut Vec<StateFrame<'a>>,
    code: &mut Status,
    effect: TransitionEffect<'a>,
) {
    if let Some(new_next) = effect.next {
        match new_next {
            Some(frame) => {
                if let Some(top) = stack.last_mut() {
                    *top = frame;
                } else {
                    stack.push(frame);
                }
            }
            None => {
                stack.pop();
            }
        }
    }
    if let Some(c) = effect.code {
        *code = c;
    }
}
