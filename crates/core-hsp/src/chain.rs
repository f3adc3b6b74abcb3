//! Chain helper: visits a linked list of states one at a time so a long
//! sequence never has to fit inside a single `PROCEED`'s `MAX_PUSH` limit
//! (§4.3, "state chaining").

use std::cell::Cell;

use crate::state::{StateAction, StateArgs, StateFrame};

/// One link of a state chain: the frame to run, plus the rest of the chain
/// to continue with once it's `DONE`.
///
/// `rest` is a `Cell` rather than a plain reference so two links can form a
/// genuine cycle (link A's rest is link B, link B's rest is link A): both
/// are built with `rest: None` and wired together afterward via
/// [`ChainLink::set_rest`], once both have a stable address to point at.
pub struct ChainLink<'a> {
    pub frame: StateFrame<'a>,
    pub rest: Cell<Option<&'a ChainLink<'a>>>,
}

impl<'a> ChainLink<'a> {
    pub fn new(frame: StateFrame<'a>, rest: Option<&'a ChainLink<'a>>) -> Self {
        Self {
            frame,
            rest: Cell::new(rest),
        }
    }

    /// Rewire this link's successor, e.g. to close a cycle after both ends
    /// of it already exist.
    pub fn set_rest(&self, rest: Option<&'a ChainLink<'a>>) {
        self.rest.set(rest);
    }
}

/// Wrap `link` as a single [`StateFrame`] that, instead of requiring the
/// whole chain to be pushed at once, runs `link.frame` and then re-wraps
/// `link.rest` (if any) the same way once it finishes with `DONE(1)`.
///
/// A `DONE(n)` with `n > 1` is passed through unchanged: the inner state is
/// asking to pop through an ancestor frame, which should drain the rest of
/// the chain along with it rather than continue it.
pub fn state_chain_execute<'a>(link: &'a ChainLink<'a>) -> StateFrame<'a> {
    StateFrame::with_metadata(chain_step, &link.frame, link)
}

fn chain_step<'a>(args: StateArgs<'a>) -> StateAction<'a> {
    let inner_frame = unsafe { args.data.unwrap().get::<StateFrame<'a>>() };
    let link = unsafe { args.metadata.unwrap().get::<ChainLink<'a>>() };

    let inner_args = StateArgs {
        data: inner_frame.data,
        metadata: inner_frame.metadata,
        code: args.code,
    };
    let action = (inner_frame.function)(inner_args);

    match action {
        StateAction::Proceed { code, pushes } => StateAction::Proceed { code, pushes },
        StateAction::Done { pop, code } if pop <= 1 => match link.rest.get() {
            Some(next) => StateAction::Proceed {
                code,
                pushes: vec![state_chain_execute(next)],
            },
            None => StateAction::Done { pop: 1, code },
        },
        done => done,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn visit<'a>(args: StateArgs<'a>) -> StateAction<'a> {
        let counter = unsafe { args.data.unwrap().get::<Cell<u32>>() };
        counter.set(counter.get() + 1);
        StateAction::default()
    }

    #[test]
    fn chain_visits_every_link_in_order() {
        let order = std::cell::RefCell::new(Vec::<u32>::new());

        struct Ctx<'a> {
            order: &'a std::cell::RefCell<Vec<u32>>,
            id: u32,
        }

        fn record<'a>(args: StateArgs<'a>) -> StateAction<'a> {
            let ctx = unsafe { args.data.unwrap().get::<Ctx<'a>>() };
            ctx.order.borrow_mut().push(ctx.id);
            StateAction::default()
        }

        let c1 = Ctx { order: &order, id: 1 };
        let c2 = Ctx { order: &order, id: 2 };
        let c3 = Ctx { order: &order, id: 3 };

        let link3 = ChainLink::new(StateFrame::new(record, &c3), None);
        let link2 = ChainLink::new(StateFrame::new(record, &c2), Some(&link3));
        let link1 = ChainLink::new(StateFrame::new(record, &c1), Some(&link2));

        let entry = state_chain_execute(&link1);
        let hsp = crate::driver::Hsp::new(entry, None);
        let code = hsp.run();

        assert_eq!(code, 0);
        assert_eq!(*order.borrow(), vec![1, 2, 3]);
    }

    #[test]
    fn chain_advances_one_link_per_driver_iteration() {
        // Each link's wrapper frame replaces itself with the next link's
        // wrapper (a one-frame PROCEED) rather than ever pushing the whole
        // remaining chain at once, so the driver's stack depth never
        // exceeds 2 regardless of chain length.
        let counter = Cell::new(0u32);

        let link3 = ChainLink::new(StateFrame::new(visit, &counter), None);
        let link2 = ChainLink::new(StateFrame::new(visit, &counter), Some(&link3));
        let link1 = ChainLink::new(StateFrame::new(visit, &counter), Some(&link2));

        let entry = state_chain_execute(&link1);
        let hsp = crate::driver::Hsp::new(entry, None);
        let code = hsp.run();

        assert_eq!(code, 0);
        assert_eq!(counter.get(), 3);
    }

    #[test]
    fn done_n_greater_than_one_skips_the_rest_of_the_chain() {
        fn pop_through<'a>(_args: StateArgs<'a>) -> StateAction<'a> {
            StateAction::done_n(2)
        }

        let reached = Cell::new(false);
        fn mark<'a>(args: StateArgs<'a>) -> StateAction<'a> {
            unsafe { args.data.unwrap().get::<Cell<bool>>() }.set(true);
            StateAction::default()
        }

        let link2 = ChainLink::new(StateFrame::new(mark, &reached), None);
        let link1 = ChainLink::new(StateFrame::bare(pop_through), Some(&link2));

        let entry = state_chain_execute(&link1);
        let hsp = crate::driver::Hsp::new(entry, None);
        let code = hsp.run();
        assert_eq!(code, 0);
        assert!(!reached.get(), "DONE(2) should have popped past link2");
    }
}
