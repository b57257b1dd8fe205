//! Dense row-major matrix used for designs and responses.

use serde::{Deserialize, Serialize};

/// Two-dimensional matrix with a flat backing array.
///
/// Stores values in row-major order: row `i` occupies
/// `data[i * cols..(i + 1) * cols]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matrix {
    data: Vec<f64>,
    rows: usize,
    cols: usize,
}

impl Matrix {
    /// Create a matrix with the given shape, filled with `value`.
    pub fn new(rows: usize, cols: usize, value: f64) -> Self {
        Self {
            data: vec![value; rows * cols],
            rows,
            cols,
        }
    }

    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self::new(rows, cols, 0.0)
    }

    /// Create a matrix from existing data. Data must be in row-major order.
    pub fn from_data(rows: usize, cols: usize, data: Vec<f64>) -> Option<Self> {
        if data.len() != rows * cols {
            return None;
        }
        Some(Self { data, rows, cols })
    }

    /// Create a matrix from a list of equally sized rows.
    ///
    /// Returns `None` if the rows are ragged. An empty list yields a `0 x cols`
    /// matrix where `cols` is zero.
    pub fn from_rows<R: AsRef<[f64]>>(rows: &[R]) -> Option<Self> {
        let cols = rows.first().map_or(0, |r| r.as_ref().len());
        let mut data = Vec::with_capacity(rows.len() * cols);
        for row in rows {
            let row = row.as_ref();
            if row.len() != cols {
                return None;
            }
            data.extend_from_slice(row);
        }
        Some(Self {
            data,
            rows: rows.len(),
            cols,
        })
    }

    /// Create an empty matrix with a fixed column count, for incremental row pushes.
    pub fn with_cols(cols: usize) -> Self {
        Self {
            data: Vec::new(),
            rows: 0,
            cols,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        Some(self.data[row * self.cols + col])
    }

    /// Set the value at `(row, col)`. Returns `false` when out of range.
    pub fn set(&mut self, row: usize, col: usize, value: f64) -> bool {
        if row >= self.rows || col >= self.cols {
            return false;
        }
        self.data[row * self.cols + col] = value;
        true
    }

    /// Borrow a row.
    ///
    /// # Panics
    /// Panics if `i` is out of range.
    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.cols..(i + 1) * self.cols]
    }

    pub fn row_mut(&mut self, i: usize) -> &mut [f64] {
        &mut self.data[i * self.cols..(i + 1) * self.cols]
    }

    /// Copy out a column.
    pub fn column(&self, j: usize) -> Vec<f64> {
        (0..self.rows).map(|i| self.data[i * self.cols + j]).collect()
    }

    pub fn iter_rows(&self) -> impl Iterator<Item = &[f64]> {
        // `chunks_exact(0)` panics, and a zero-column matrix has no cells anyway
        let chunk = self.cols.max(1);
        self.data
            .chunks_exact(chunk)
            .take(if self.cols == 0 { 0 } else { self.rows })
    }

    /// Append a row. Returns `false` if the length does not match `cols`.
    pub fn push_row(&mut self, row: &[f64]) -> bool {
        if row.len() != self.cols {
            return false;
        }
        self.data.extend_from_slice(row);
        self.rows += 1;
        true
    }

    /// Stack `other` below `self`. Returns `None` on column mismatch.
    pub fn vstack(&self, other: &Matrix) -> Option<Matrix> {
        if self.cols != other.cols {
            return None;
        }
        let mut data = Vec::with_capacity(self.data.len() + other.data.len());
        data.extend_from_slice(&self.data);
        data.extend_from_slice(&other.data);
        Some(Matrix {
            data,
            rows: self.rows + other.rows,
            cols: self.cols,
        })
    }

    /// Build a new matrix from a subset of columns, in the given order.
    pub fn select_columns(&self, columns: &[usize]) -> Matrix {
        let mut data = Vec::with_capacity(self.rows * columns.len());
        for row in self.iter_rows() {
            data.extend(columns.iter().map(|&j| row[j]));
        }
        Matrix {
            data,
            rows: self.rows,
            cols: columns.len(),
        }
    }

    /// Build a new matrix from a subset of rows, in the given order (repeats allowed).
    pub fn select_rows(&self, rows: &[usize]) -> Matrix {
        let mut data = Vec::with_capacity(rows.len() * self.cols);
        for &i in rows {
            data.extend_from_slice(self.row(i));
        }
        Matrix {
            data,
            rows: rows.len(),
            cols: self.cols,
        }
    }

    /// True if every cell is a finite number.
    pub fn is_finite(&self) -> bool {
        self.data.iter().all(|v| v.is_finite())
    }

    pub fn data(&self) -> &[f64] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [f64] {
        &mut self.data
    }

    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.iter_rows().map(<[f64]>::to_vec).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rows_and_access() {
        let m = Matrix::from_rows(&[vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]]).unwrap();
        assert_eq!(m.shape(), (3, 2));
        assert_eq!(m.row(1), &[3.0, 4.0]);
        assert_eq!(m.column(1), vec![2.0, 4.0, 6.0]);
        assert_eq!(m.get(2, 0), Some(5.0));
        assert_eq!(m.get(3, 0), None);
    }

    #[test]
    fn test_ragged_rows_rejected() {
        assert!(Matrix::from_rows(&[vec![1.0, 2.0], vec![3.0]]).is_none());
    }

    #[test]
    fn test_select_and_stack() {
        let m = Matrix::from_rows(&[vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]).unwrap();
        let s = m.select_columns(&[2, 0]);
        assert_eq!(s.to_rows(), vec![vec![3.0, 1.0], vec![6.0, 4.0]]);

        let r = m.select_rows(&[1, 1]);
        assert_eq!(r.row(0), r.row(1));

        let stacked = m.vstack(&r).unwrap();
        assert_eq!(stacked.rows(), 4);
        assert!(m.vstack(&s).is_none());
    }

    #[test]
    fn test_push_row_and_iter() {
        let mut m = Matrix::with_cols(2);
        assert!(m.push_row(&[1.0, 2.0]));
        assert!(!m.push_row(&[1.0]));
        assert_eq!(m.iter_rows().count(), 1);

        let empty = Matrix::zeros(3, 0);
        assert_eq!(empty.iter_rows().count(), 0);
    }

    #[test]
    fn test_is_finite() {
        let mut m = Matrix::zeros(2, 2);
        assert!(m.is_finite());
        m.set(1, 1, f64::NAN);
        assert!(!m.is_finite());
    }
}
