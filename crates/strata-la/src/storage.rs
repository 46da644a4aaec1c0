use core::cell::Cell;
use std::rc::Rc;

/// Shared, mutable, contiguous element buffer behind every view.
///
/// Cloning a `Storage` aliases the same buffer. Elements live in `Cell`s, so any number
/// of views may read and write them; the `Rc` handle keeps all of this on one thread.
pub struct Storage<T> {
    cells: Rc<[Cell<T>]>,
}

impl<T> Clone for Storage<T> {
    fn clone(&self) -> Self {
        Self { cells: Rc::clone(&self.cells) }
    }
}

impl<T: Copy + Default> Storage<T> {
    /// Buffer of `len` default (zero) elements.
    pub fn new(len: usize) -> Self {
        Self::filled(len, T::default())
    }

    pub fn filled(len: usize, value: T) -> Self {
        Self { cells: (0..len).map(|_| Cell::new(value)).collect() }
    }

    pub fn from_slice(values: &[T]) -> Self {
        Self { cells: values.iter().map(|&v| Cell::new(v)).collect() }
    }

    pub fn from_vec(values: Vec<T>) -> Self {
        Self { cells: values.into_iter().map(Cell::new).collect() }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Element `i`, or `None` past the end.
    pub fn get(&self, i: usize) -> Option<T> {
        self.cells.get(i).map(Cell::get)
    }

    pub fn to_vec(&self) -> Vec<T> {
        self.cells.iter().map(Cell::get).collect()
    }

    /// Whether both handles refer to the same buffer.
    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.cells, &other.cells)
    }

    #[inline]
    pub(crate) fn cells(&self) -> &[Cell<T>] {
        &self.cells
    }

    /// Whether this handle is the only one left.
    #[inline]
    pub(crate) fn is_unique(&self) -> bool {
        Rc::strong_count(&self.cells) == 1
    }
}

impl<T: Copy + Default + core::fmt::Debug> core::fmt::Debug for Storage<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_list().entries(self.cells.iter().map(Cell::get)).finish()
    }
}

/// The storage indices a view touches: `offset + i·inner + j·outer` for `i < rows`,
/// `j < cols`, with `rows·inner <= outer` so that every index has one (i, j).
#[derive(Debug, Clone, Copy)]
pub(crate) struct Span {
    base: *const (),
    offset: usize,
    rows: usize,
    cols: usize,
    inner: usize,
    outer: usize,
}

impl Span {
    /// Column-major block with leading dimension `ld`.
    pub(crate) fn block<T>(
        storage: &Storage<T>,
        offset: usize,
        rows: usize,
        cols: usize,
        ld: usize,
    ) -> Self {
        let base = Rc::as_ptr(&storage.cells) as *const ();
        Self { base, offset, rows, cols, inner: 1, outer: ld.max(rows) }
    }

    /// `len` elements `stride` apart.
    pub(crate) fn strided<T>(
        storage: &Storage<T>,
        offset: usize,
        len: usize,
        stride: usize,
    ) -> Self {
        let base = Rc::as_ptr(&storage.cells) as *const ();
        Self { base, offset, rows: len, cols: 1, inner: stride, outer: stride * len }
    }

    fn len(&self) -> usize {
        self.rows * self.cols
    }

    fn last(&self) -> usize {
        self.offset + (self.rows - 1) * self.inner + (self.cols - 1) * self.outer
    }

    fn contains(&self, index: usize) -> bool {
        if index < self.offset {
            return false;
        }
        let d = index - self.offset;
        let (j, rem) = (d / self.outer, d % self.outer);
        j < self.cols && rem % self.inner == 0 && rem / self.inner < self.rows
    }

    fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        let Span { offset, rows, inner, outer, .. } = *self;
        (0..self.cols).flat_map(move |j| (0..rows).map(move |i| offset + i * inner + j * outer))
    }

    /// Whether the two views share at least one element.
    pub(crate) fn intersects(&self, other: &Span) -> bool {
        if self.base != other.base || self.offset > other.last() || other.offset > self.last() {
            return false;
        }
        let (small, large) = if self.len() <= other.len() { (self, other) } else { (other, self) };
        small.indices().any(|i| large.contains(i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clone_aliases() {
        let a = Storage::<f64>::new(3);
        let b = a.clone();
        b.cells()[1].set(7.0);
        assert_eq!(a.get(1), Some(7.0));
        assert!(a.ptr_eq(&b));
        assert!(!a.is_unique());
        drop(b);
        assert!(a.is_unique());
    }

    #[test]
    fn spans() {
        let a = Storage::<f32>::from_slice(&[1.0, 2.0, 3.0, 4.0]);
        let b = Storage::<f32>::new(4);
        assert!(Span::strided(&a, 0, 2, 1).intersects(&Span::strided(&a, 1, 3, 1)));
        assert!(!Span::strided(&a, 0, 2, 1).intersects(&Span::strided(&a, 2, 2, 1)));
        assert!(!Span::strided(&a, 0, 4, 1).intersects(&Span::strided(&b, 0, 4, 1)));
        assert_eq!(a.get(4), None);
        assert_eq!(a.to_vec(), vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn interleaved_spans_are_disjoint() {
        let s = Storage::<f64>::new(16);
        // top and bottom halves of a 4x4 block share every column range
        let top = Span::block(&s, 0, 2, 4, 4);
        let bottom = Span::block(&s, 2, 2, 4, 4);
        assert!(!top.intersects(&bottom));
        assert!(top.intersects(&Span::block(&s, 1, 2, 2, 4)));

        // even and odd elements
        assert!(!Span::strided(&s, 0, 8, 2).intersects(&Span::strided(&s, 1, 8, 2)));
        // row 0 of the 4x4 block against the bottom half, then against column 0
        let row0 = Span::strided(&s, 0, 4, 4);
        assert!(!row0.intersects(&bottom));
        assert!(row0.intersects(&Span::block(&s, 0, 4, 1, 4)));
        // row 2 against the diagonal (stride 5), whole and left of it
        let diagonal = Span::strided(&s, 0, 4, 5);
        assert!(Span::strided(&s, 2, 4, 4).intersects(&diagonal));
        assert!(!Span::strided(&s, 2, 2, 4).intersects(&diagonal));
    }
}
