use crate::storage::Span;
use crate::{Error, Result, Storage, Vector};
use core::cell::Cell;
use core::fmt;
use strata::Scalar;

/// Column-major view of a `rows × cols` block of shared [`Storage`].
///
/// Element `(r, c)` lives at `storage[offset + stride * c + r]`, where `stride` is the
/// leading dimension (`>= rows`). Like [`Vector`], cloning aliases and
/// [`copy`](Self::copy) makes an independent contiguous matrix.
pub struct Matrix<T> {
    storage: Storage<T>,
    offset: usize,
    rows: usize,
    cols: usize,
    stride: usize,
}

impl<T> Clone for Matrix<T> {
    fn clone(&self) -> Self {
        Self {
            storage: self.storage.clone(),
            offset: self.offset,
            rows: self.rows,
            cols: self.cols,
            stride: self.stride,
        }
    }
}

impl<T: Scalar> Matrix<T> {
    /// Zero matrix.
    pub fn new(rows: usize, cols: usize) -> Result<Self> {
        check_dims(rows, cols)?;
        Ok(Self::from_parts(Storage::new(rows * cols), 0, rows, cols, rows))
    }

    /// Matrix from row-major literals: `Matrix::from_rows(&[[1.0, 2.0], [3.0, 4.0]])`.
    pub fn from_rows<const C: usize>(rows: &[[T; C]]) -> Result<Self> {
        Self::from_fn(rows.len(), C, |r, c| rows[r][c])
    }

    /// Matrix from column-major values; `values.len()` must be `rows * cols`.
    pub fn from_column_major(rows: usize, cols: usize, values: &[T]) -> Result<Self> {
        check_dims(rows, cols)?;
        if values.len() != rows * cols {
            return Err(Error::InvalidArgument(format!(
                "{} values cannot fill a {rows}x{cols} matrix",
                values.len()
            )));
        }
        Ok(Self::from_parts(Storage::from_slice(values), 0, rows, cols, rows))
    }

    /// Matrix whose element `(r, c)` is `f(r, c)`.
    pub fn from_fn(rows: usize, cols: usize, mut f: impl FnMut(usize, usize) -> T) -> Result<Self> {
        check_dims(rows, cols)?;
        let mut values = Vec::with_capacity(rows * cols);
        for c in 0..cols {
            for r in 0..rows {
                values.push(f(r, c));
            }
        }
        Ok(Self::from_parts(Storage::from_vec(values), 0, rows, cols, rows))
    }

    pub fn identity(n: usize) -> Result<Self> {
        Self::from_fn(n, n, |r, c| if r == c { T::ONE } else { T::ZERO })
    }

    /// Square matrix with `diagonal` on its diagonal and zeros elsewhere.
    pub fn from_diagonal(diagonal: &Vector<T>) -> Result<Self> {
        let n = diagonal.len();
        Self::from_fn(n, n, |r, c| if r == c { diagonal.at(r) } else { T::ZERO })
    }

    /// View `storage` as a `rows × cols` matrix with leading dimension `stride`.
    ///
    /// The storage must hold exactly `stride * (cols - 1) + rows` elements.
    pub fn from_storage(
        storage: Storage<T>,
        rows: usize,
        cols: usize,
        stride: usize,
    ) -> Result<Self> {
        check_dims(rows, cols)?;
        if stride < rows {
            return Err(Error::InvalidArgument(format!(
                "leading dimension {stride} is smaller than the row count {rows}"
            )));
        }
        let required = stride * (cols - 1) + rows;
        if storage.len() != required {
            return Err(Error::InvalidArgument(format!(
                "storage holds {} elements, a {rows}x{cols} matrix with stride {stride} \
                 needs {required}",
                storage.len()
            )));
        }
        Ok(Self::from_parts(storage, 0, rows, cols, stride))
    }

    pub(crate) fn from_parts(
        storage: Storage<T>,
        offset: usize,
        rows: usize,
        cols: usize,
        stride: usize,
    ) -> Self {
        Self { storage, offset, rows, cols, stride }
    }

    #[inline]
    pub fn nrows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn ncols(&self) -> usize {
        self.cols
    }

    /// `(rows, cols)`.
    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Leading dimension.
    #[inline]
    pub fn stride(&self) -> usize {
        self.stride
    }

    #[inline]
    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    pub fn storage(&self) -> &Storage<T> {
        &self.storage
    }

    pub fn get(&self, row: usize, col: usize) -> Result<T> {
        self.check_index(row, col)?;
        Ok(self.at(row, col))
    }

    pub fn set(&self, row: usize, col: usize, value: T) -> Result<()> {
        self.check_index(row, col)?;
        self.put(row, col, value);
        Ok(())
    }

    pub fn fill(&self, value: T) {
        for c in 0..self.cols {
            for r in 0..self.rows {
                self.put(r, c, value);
            }
        }
    }

    pub fn clear(&self) {
        self.fill(T::ZERO);
    }

    /// Aliasing view of row `i` (stride = leading dimension).
    pub fn row(&self, i: usize) -> Result<Vector<T>> {
        if i >= self.rows {
            return Err(Error::OutOfRange(format!("row {i} of a matrix with {} rows", self.rows)));
        }
        Ok(self.row_unchecked(i))
    }

    /// Aliasing view of column `j` (stride 1).
    pub fn col(&self, j: usize) -> Result<Vector<T>> {
        if j >= self.cols {
            return Err(Error::OutOfRange(format!(
                "column {j} of a matrix with {} columns",
                self.cols
            )));
        }
        Ok(self.col_unchecked(j))
    }

    /// All rows, as a list of aliasing vector views.
    pub fn rows(&self) -> Lines<'_, T> {
        Lines { matrix: self, axis: Axis::Row }
    }

    /// All columns, as a list of aliasing vector views.
    pub fn cols(&self) -> Lines<'_, T> {
        Lines { matrix: self, axis: Axis::Col }
    }

    /// Aliasing view of the main diagonal (`min(rows, cols)` elements).
    pub fn diagonal(&self) -> Vector<T> {
        let len = self.rows.min(self.cols);
        Vector::from_parts(self.storage.clone(), self.offset, len, self.stride + 1)
    }

    /// Aliasing `rows × cols` view whose top-left corner is `(row, col)`.
    pub fn submatrix(&self, row: usize, col: usize, rows: usize, cols: usize) -> Result<Self> {
        check_dims(rows, cols)?;
        let row_end = row.checked_add(rows);
        let col_end = col.checked_add(cols);
        if row_end.map_or(true, |e| e > self.rows) || col_end.map_or(true, |e| e > self.cols) {
            return Err(Error::OutOfRange(format!(
                "{rows}x{cols} block at ({row}, {col}) of a {}x{} matrix",
                self.rows, self.cols
            )));
        }
        Ok(Self::from_parts(
            self.storage.clone(),
            self.offset + col * self.stride + row,
            rows,
            cols,
            self.stride,
        ))
    }

    /// Copy every element into `dst`, which must have the same shape.
    pub fn copy_to(&self, dst: &Matrix<T>) -> Result<()> {
        if dst.shape() != self.shape() {
            return Err(Error::dims("copy_to", self.shape_str(), dst.shape_str()));
        }
        if self.overlaps(dst) {
            let tmp = self.copy();
            tmp.copy_to(dst)
        } else {
            for c in 0..self.cols {
                for r in 0..self.rows {
                    dst.put(r, c, self.at(r, c));
                }
            }
            Ok(())
        }
    }

    /// Independent contiguous copy.
    pub fn copy(&self) -> Self {
        let storage = Storage::from_vec(self.iter().collect());
        Self::from_parts(storage, 0, self.rows, self.cols, self.rows)
    }

    /// Elements in column-major order.
    pub fn iter(&self) -> impl Iterator<Item = T> + '_ {
        (0..self.cols).flat_map(move |c| (0..self.rows).map(move |r| self.at(r, c)))
    }

    /// Column-major values.
    pub fn to_vec(&self) -> Vec<T> {
        self.iter().collect()
    }

    /// Row-major nested values.
    pub fn to_rows(&self) -> Vec<Vec<T>> {
        (0..self.rows).map(|r| (0..self.cols).map(|c| self.at(r, c)).collect()).collect()
    }

    /// Whether the two views share an element of the same storage.
    pub fn overlaps(&self, other: &Matrix<T>) -> bool {
        self.span().intersects(&other.span())
    }

    /// Whether this matrix and `v` share an element of the same storage.
    pub fn overlaps_vector(&self, v: &Vector<T>) -> bool {
        self.span().intersects(&v.span())
    }

    #[inline]
    pub(crate) fn at(&self, row: usize, col: usize) -> T {
        self.storage.cells()[self.offset + self.stride * col + row].get()
    }

    #[inline]
    pub(crate) fn put(&self, row: usize, col: usize, value: T) {
        self.storage.cells()[self.offset + self.stride * col + row].set(value)
    }

    /// Cells from element `(0, 0)` on, for kernels taking a leading dimension.
    #[inline]
    pub(crate) fn cells(&self) -> &[Cell<T>] {
        &self.storage.cells()[self.offset..]
    }

    pub(crate) fn span(&self) -> Span {
        Span::block(&self.storage, self.offset, self.rows, self.cols, self.stride)
    }

    pub(crate) fn shape_str(&self) -> String {
        format!("{}x{}", self.rows, self.cols)
    }

    pub(crate) fn row_unchecked(&self, i: usize) -> Vector<T> {
        Vector::from_parts(self.storage.clone(), self.offset + i, self.cols, self.stride)
    }

    pub(crate) fn col_unchecked(&self, j: usize) -> Vector<T> {
        Vector::from_parts(self.storage.clone(), self.offset + j * self.stride, self.rows, 1)
    }

    fn check_index(&self, row: usize, col: usize) -> Result<()> {
        if row >= self.rows || col >= self.cols {
            return Err(Error::OutOfRange(format!(
                "index ({row}, {col}) in a {}x{} matrix",
                self.rows, self.cols
            )));
        }
        Ok(())
    }
}

fn check_dims(rows: usize, cols: usize) -> Result<()> {
    if rows == 0 || cols == 0 {
        return Err(Error::InvalidArgument(format!(
            "matrix dimensions must be positive, got {rows}x{cols}"
        )));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    Row,
    Col,
}

/// The rows or columns of a matrix, as returned by [`Matrix::rows`] / [`Matrix::cols`].
pub struct Lines<'a, T> {
    matrix: &'a Matrix<T>,
    axis: Axis,
}

impl<'a, T: Scalar> Lines<'a, T> {
    pub fn len(&self) -> usize {
        match self.axis {
            Axis::Row => self.matrix.rows,
            Axis::Col => self.matrix.cols,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, i: usize) -> Result<Vector<T>> {
        match self.axis {
            Axis::Row => self.matrix.row(i),
            Axis::Col => self.matrix.col(i),
        }
    }

    pub fn iter(&self) -> LineIter<'a, T> {
        LineIter { matrix: self.matrix, axis: self.axis, next: 0 }
    }
}

impl<'a, T: Scalar> IntoIterator for Lines<'a, T> {
    type Item = Vector<T>;
    type IntoIter = LineIter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Forward iterator over the rows or columns of a matrix.
pub struct LineIter<'a, T> {
    matrix: &'a Matrix<T>,
    axis: Axis,
    next: usize,
}

impl<T: Scalar> Iterator for LineIter<'_, T> {
    type Item = Vector<T>;

    fn next(&mut self) -> Option<Vector<T>> {
        let i = self.next;
        let line = match self.axis {
            Axis::Row if i < self.matrix.rows => self.matrix.row_unchecked(i),
            Axis::Col if i < self.matrix.cols => self.matrix.col_unchecked(i),
            _ => return None,
        };
        self.next += 1;
        Some(line)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let total = match self.axis {
            Axis::Row => self.matrix.rows,
            Axis::Col => self.matrix.cols,
        };
        let left = total.saturating_sub(self.next);
        (left, Some(left))
    }
}

impl<T: Scalar> ExactSizeIterator for LineIter<'_, T> {}

impl<T: Scalar> fmt::Display for Matrix<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cells: Vec<Vec<String>> = (0..self.rows)
            .map(|r| {
                (0..self.cols)
                    .map(|c| {
                        let v = self.at(r, c);
                        match f.precision() {
                            Some(p) => format!("{v:.p$}"),
                            None => format!("{v}"),
                        }
                    })
                    .collect()
            })
            .collect();
        let width = cells.iter().flatten().map(String::len).max().unwrap_or(0);
        for (r, row) in cells.iter().enumerate() {
            if r > 0 {
                writeln!(f)?;
            }
            write!(f, "[")?;
            for (c, s) in row.iter().enumerate() {
                if c > 0 {
                    write!(f, " ")?;
                }
                write!(f, "{s:>width$}")?;
            }
            write!(f, "]")?;
        }
        Ok(())
    }
}

impl<T: Scalar> fmt::Debug for Matrix<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Matrix")
            .field("rows", &self.rows)
            .field("cols", &self.cols)
            .field("stride", &self.stride)
            .field("offset", &self.offset)
            .field("values", &self.to_rows())
            .finish()
    }
}
