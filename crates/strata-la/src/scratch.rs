//! Thread-local free-list of element buffers for call-scoped temporaries.
//!
//! Factorizations and `ops` routines that need a working copy take it from here
//! instead of allocating. A [`Scratch`] guard hands the buffer back on drop, on every
//! exit path, unless a view created from it is still alive.

use crate::{Matrix, Storage, Vector};
use core::cell::{Cell, RefCell};
use std::thread::LocalKey;
use strata::{Complex64, Scalar};
use tracing::trace;

/// Buffers kept per element type and thread.
const MAX_POOLED: usize = 8;

/// Element types with a thread-local scratch pool.
pub trait Pooled: Copy + Default + 'static {
    #[doc(hidden)]
    fn pool() -> &'static LocalKey<RefCell<Vec<Storage<Self>>>>;
}

macro_rules! impl_pooled {
    ($($t:ty => $pool:ident),* $(,)?) => {
        $(
            thread_local! {
                static $pool: RefCell<Vec<Storage<$t>>> = const { RefCell::new(Vec::new()) };
            }

            impl Pooled for $t {
                #[inline]
                fn pool() -> &'static LocalKey<RefCell<Vec<Storage<Self>>>> {
                    &$pool
                }
            }
        )*
    };
}

impl_pooled!(f32 => POOL_F32, f64 => POOL_F64, Complex64 => POOL_C64);

/// Element types accepted by the factorizations and `ops`.
pub trait Element: Scalar + Pooled {}

impl<T: Scalar + Pooled> Element for T {}

/// A zeroed buffer of at least `len` elements, returned to the pool on drop.
pub struct Scratch<T: Pooled> {
    storage: Storage<T>,
    len: usize,
}

impl<T: Pooled> Scratch<T> {
    /// Take a pooled buffer holding at least `len` elements, or allocate one.
    ///
    /// The first `len` elements are zeroed.
    pub fn acquire(len: usize) -> Self {
        let reused = T::pool()
            .try_with(|pool| {
                let mut pool = pool.borrow_mut();
                let slot = pool.iter().position(|s| s.len() >= len)?;
                Some(pool.swap_remove(slot))
            })
            .ok()
            .flatten();

        let storage = match reused {
            Some(storage) => {
                trace!(len, capacity = storage.len(), "scratch reuse");
                for cell in &storage.cells()[..len] {
                    cell.set(T::default());
                }
                storage
            }
            None => Storage::new(len),
        };
        Self { storage, len }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub(crate) fn cells(&self) -> &[Cell<T>] {
        &self.storage.cells()[..self.len]
    }

    pub(crate) fn storage(&self) -> &Storage<T> {
        &self.storage
    }
}

impl<T: Element> Scratch<T> {
    /// Contiguous `len`-element vector view over the buffer.
    pub(crate) fn vector(&self, len: usize) -> Vector<T> {
        debug_assert!(len <= self.len);
        Vector::from_parts(self.storage.clone(), 0, len, 1)
    }

    /// Contiguous `rows × cols` matrix view over the buffer.
    pub(crate) fn matrix(&self, rows: usize, cols: usize) -> Matrix<T> {
        debug_assert!(rows * cols <= self.len);
        Matrix::from_parts(self.storage.clone(), 0, rows, cols, rows)
    }
}

impl<T: Pooled> Drop for Scratch<T> {
    fn drop(&mut self) {
        if !self.storage.is_unique() {
            return;
        }
        let storage = self.storage.clone();
        // The pool is gone during thread teardown; the buffer is simply freed then.
        let _ = T::pool().try_with(|pool| {
            if let Ok(mut pool) = pool.try_borrow_mut() {
                if pool.len() < MAX_POOLED {
                    pool.push(storage);
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pooled_count<T: Pooled>() -> usize {
        T::pool().with(|p| p.borrow().len())
    }

    #[test]
    fn buffers_are_reused_and_zeroed() {
        let before = pooled_count::<f64>();
        {
            let s = Scratch::<f64>::acquire(16);
            s.cells()[3].set(5.0);
        }
        assert_eq!(pooled_count::<f64>(), before + 1);

        let s = Scratch::<f64>::acquire(8);
        assert_eq!(s.len(), 8);
        assert!(s.cells().iter().all(|c| c.get() == 0.0));
        assert_eq!(pooled_count::<f64>(), before);
    }

    #[test]
    fn live_views_keep_the_buffer() {
        let before = pooled_count::<f32>();
        let v = {
            let s = Scratch::<f32>::acquire(4);
            s.vector(4)
        };
        assert_eq!(pooled_count::<f32>(), before);
        v.fill(1.0);
        assert_eq!(v.to_vec(), vec![1.0; 4]);
    }

    #[test]
    fn released_on_early_return() {
        fn fails() -> Result<(), ()> {
            let _s = Scratch::<Complex64>::acquire(3);
            Err(())
        }
        let before = pooled_count::<Complex64>();
        assert!(fails().is_err());
        assert_eq!(pooled_count::<Complex64>(), before + 1);
    }
}
