//! Type-erased, non-owning handles to caller data.
//!
//! The driver shuffles [`Payload`] values around by value and never looks
//! inside them; only the state/transition functions that produced a handle
//! know the real pointee type and may recover it via [`Payload::get`]. This
//! mirrors the `data`/`metadata` opaque pointers of the source design more
//! directly than `dyn Any` would: payloads routinely point at data that
//! itself borrows for the lifetime of a single `run()` call (the chain
//! helper in [`crate::chain`] is the clearest example), and `dyn Any`
//! requires `'static`, which a self-referential borrow like that can't
//! offer.

use std::marker::PhantomData;

/// An opaque, borrowed handle to caller-owned data.
#[derive(Clone, Copy)]
pub struct Payload<'a> {
    ptr: *const (),
    _marker: PhantomData<&'a ()>,
}

impl<'a> Payload<'a> {
    /// Wrap a reference as an opaque handle.
    pub fn new<T>(value: &'a T) -> Self {
        Self {
            ptr: (value as *const T).cast(),
            _marker: PhantomData,
        }
    }

    /// Recover the original reference.
    ///
    /// # Safety
    ///
    /// The caller must ensure `T` is the same type that was passed to
    /// [`Payload::new`] when this handle was created. The driver itself never
    /// calls this; only state/transition/processing functions that agreed on
    /// a shared type out of band should.
    pub unsafe fn get<T>(&self) -> &'a T {
        unsafe { &*self.ptr.cast::<T>() }
    }

    /// The handle's raw address, for callers that need to ferry a payload
    /// across a boundary `Payload`'s own lifetime can't express (e.g. into
    /// a worker-pool job that is known to rejoin before the pointee drops).
    pub fn as_raw(&self) -> *const () {
        self.ptr
    }

    /// Rebuild a handle from a raw address produced by [`Payload::as_raw`].
    ///
    /// # Safety
    ///
    /// The caller must ensure the pointee is still alive and of the
    /// original type for as long as the returned handle is used.
    pub unsafe fn from_raw(ptr: *const ()) -> Payload<'static> {
        Payload {
            ptr,
            _marker: PhantomData,
        }
    }
}

impl PartialEq for Payload<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.ptr, other.ptr)
    }
}

impl Eq for Payload<'_> {}

impl std::fmt::Debug for Payload<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Payload").field(&self.ptr).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_get() {
        let value = 42i32;
        let handle = Payload::new(&value);
        assert_eq!(unsafe { *handle.get::<i32>() }, 42);
    }

    #[test]
    fn equality_is_by_pointer_identity() {
        let a = 1i32;
        let b = 1i32;
        assert_eq!(Payload::new(&a), Payload::new(&a));
        assert_ne!(Payload::new(&a), Payload::new(&b));
    }
}
