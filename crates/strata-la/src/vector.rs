use crate::storage::Span;
use crate::{Error, Result, Storage};
use core::cell::Cell;
use core::fmt;
use strata::Scalar;

/// Strided view of `len` elements over shared [`Storage`].
///
/// Element `i` lives at `storage[offset + stride * i]`. Cloning the view aliases the
/// same elements; use [`copy`](Self::copy) for an independent contiguous vector.
pub struct Vector<T> {
    storage: Storage<T>,
    offset: usize,
    len: usize,
    stride: usize,
}

impl<T> Clone for Vector<T> {
    fn clone(&self) -> Self {
        Self {
            storage: self.storage.clone(),
            offset: self.offset,
            len: self.len,
            stride: self.stride,
        }
    }
}

impl<T: Scalar> Vector<T> {
    /// Zero vector of length `len`.
    pub fn new(len: usize) -> Result<Self> {
        check_len(len)?;
        Ok(Self::from_parts(Storage::new(len), 0, len, 1))
    }

    /// Vector of length `len` with every element set to `value`.
    pub fn filled(len: usize, value: T) -> Result<Self> {
        check_len(len)?;
        Ok(Self::from_parts(Storage::filled(len, value), 0, len, 1))
    }

    pub fn from_slice(values: &[T]) -> Result<Self> {
        check_len(values.len())?;
        Ok(Self::from_parts(Storage::from_slice(values), 0, values.len(), 1))
    }

    pub fn from_vec(values: Vec<T>) -> Result<Self> {
        let len = values.len();
        check_len(len)?;
        Ok(Self::from_parts(Storage::from_vec(values), 0, len, 1))
    }

    /// Vector whose element `i` is `f(i)`.
    pub fn from_fn(len: usize, f: impl FnMut(usize) -> T) -> Result<Self> {
        check_len(len)?;
        Ok(Self::from_parts(Storage::from_vec((0..len).map(f).collect()), 0, len, 1))
    }

    /// View `len` elements of `storage`, `stride` apart, starting at index 0.
    ///
    /// The storage must hold exactly `stride * (len - 1) + 1` elements.
    pub fn from_storage(storage: Storage<T>, len: usize, stride: usize) -> Result<Self> {
        check_len(len)?;
        if stride == 0 {
            return Err(Error::InvalidArgument("vector stride must be positive".into()));
        }
        let required = stride * (len - 1) + 1;
        if storage.len() != required {
            return Err(Error::InvalidArgument(format!(
                "storage holds {} elements, a vector of length {len} with stride {stride} \
                 needs {required}",
                storage.len()
            )));
        }
        Ok(Self::from_parts(storage, 0, len, stride))
    }

    pub(crate) fn from_parts(
        storage: Storage<T>,
        offset: usize,
        len: usize,
        stride: usize,
    ) -> Self {
        Self { storage, offset, len, stride }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Always `false`: empty vectors cannot be constructed.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// The backing storage (shared with every view derived from it).
    pub fn storage(&self) -> &Storage<T> {
        &self.storage
    }

    pub fn get(&self, i: usize) -> Result<T> {
        self.check_index(i)?;
        Ok(self.at(i))
    }

    pub fn set(&self, i: usize, value: T) -> Result<()> {
        self.check_index(i)?;
        self.put(i, value);
        Ok(())
    }

    pub fn fill(&self, value: T) {
        for i in 0..self.len {
            self.put(i, value);
        }
    }

    /// Set every element to zero.
    pub fn clear(&self) {
        self.fill(T::ZERO);
    }

    /// Aliasing view of `len` elements starting at `start`.
    pub fn subvector(&self, start: usize, len: usize) -> Result<Self> {
        check_len(len)?;
        if start.checked_add(len).map_or(true, |end| end > self.len) {
            return Err(Error::OutOfRange(format!(
                "subvector {start}..{} of a vector of length {}",
                start.saturating_add(len),
                self.len
            )));
        }
        let offset = self.offset + start * self.stride;
        Ok(Self::from_parts(self.storage.clone(), offset, len, self.stride))
    }

    /// Copy every element into `dst`, which must have the same length.
    pub fn copy_to(&self, dst: &Vector<T>) -> Result<()> {
        if dst.len != self.len {
            return Err(Error::dims("copy_to", self.len, dst.len));
        }
        if self.overlaps(dst) {
            let values = self.to_vec();
            for (i, v) in values.into_iter().enumerate() {
                dst.put(i, v);
            }
        } else {
            for i in 0..self.len {
                dst.put(i, self.at(i));
            }
        }
        Ok(())
    }

    /// Independent contiguous copy.
    pub fn copy(&self) -> Self {
        Self::from_parts(Storage::from_vec(self.to_vec()), 0, self.len, 1)
    }

    pub fn to_vec(&self) -> Vec<T> {
        self.iter().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = T> + '_ {
        (0..self.len).map(move |i| self.at(i))
    }

    /// Whether the two views share an element of the same storage.
    pub fn overlaps(&self, other: &Vector<T>) -> bool {
        self.span().intersects(&other.span())
    }

    #[inline]
    pub(crate) fn at(&self, i: usize) -> T {
        self.storage.cells()[self.offset + self.stride * i].get()
    }

    #[inline]
    pub(crate) fn put(&self, i: usize, value: T) {
        self.storage.cells()[self.offset + self.stride * i].set(value)
    }

    /// Cells from the first element on, for kernels taking an increment.
    #[inline]
    pub(crate) fn cells(&self) -> &[Cell<T>] {
        &self.storage.cells()[self.offset..]
    }

    pub(crate) fn span(&self) -> Span {
        Span::strided(&self.storage, self.offset, self.len, self.stride)
    }

    fn check_index(&self, i: usize) -> Result<()> {
        if i >= self.len {
            return Err(Error::OutOfRange(format!("index {i} in a vector of length {}", self.len)));
        }
        Ok(())
    }
}

fn check_len(len: usize) -> Result<()> {
    if len == 0 {
        return Err(Error::InvalidArgument("vector length must be positive".into()));
    }
    Ok(())
}

impl<T: Scalar> fmt::Display for Vector<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, v) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            match f.precision() {
                Some(p) => write!(f, "{v:.p$}")?,
                None => write!(f, "{v}")?,
            }
        }
        write!(f, "]")
    }
}

impl<T: Scalar> fmt::Debug for Vector<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Vector")
            .field("len", &self.len)
            .field("stride", &self.stride)
            .field("offset", &self.offset)
            .field("values", &self.to_vec())
            .finish()
    }
}
