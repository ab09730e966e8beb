//! Array-like facades over dense and sparse storage.
//!
//! Every accessor here is bound-checked; mutators additionally check a
//! structural template where one applies, then run a caller-supplied hook
//! (so the owning model can invalidate dependent caches) before assigning.
//! The hook is passed per-call rather than stored on the view, which keeps
//! the borrow checker happy when the hook needs to touch other fields of the
//! model the view itself does not own.

use crate::error::{GraphError, Result};
use crate::labels::LabelIndex;
use ndarray::Array2;
use std::collections::HashMap;
use std::rc::Rc;
use tracing::warn;

fn check_bounds(index: usize, size: usize, axis: &'static str) -> Result<()> {
    if index < size {
        Ok(())
    } else {
        Err(GraphError::OutOfBounds { index, size, axis })
    }
}

/// A read-only dense vector view, with optional label-based access.
#[derive(Debug, Clone)]
pub struct DenseVector<T> {
    data: Vec<T>,
    labels: Option<Rc<LabelIndex>>,
}

impl<T> DenseVector<T> {
    #[must_use]
    pub fn new(data: Vec<T>) -> Self {
        Self { data, labels: None }
    }

    #[must_use]
    pub fn with_labels(data: Vec<T>, labels: Rc<LabelIndex>) -> Self {
        Self { data, labels: Some(labels) }
    }

    #[must_use]
    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn get(&self, i: usize) -> Result<&T> {
        check_bounds(i, self.data.len(), "index")?;
        Ok(&self.data[i])
    }

    pub fn get_labelled(&self, label: &str) -> Result<&T> {
        let labels = self.labels.as_ref().ok_or_else(|| {
            GraphError::unknown_label(label, &[])
        })?;
        self.get(labels.index(label)?)
    }

    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn into_inner(self) -> Vec<T> {
        self.data
    }
}

/// A writable dense vector view. `set` checks bounds, runs `hook`, then
/// assigns.
#[derive(Debug)]
pub struct DenseVectorMut<'a, T> {
    data: &'a mut Vec<T>,
    labels: Option<Rc<LabelIndex>>,
}

impl<'a, T> DenseVectorMut<'a, T> {
    #[must_use]
    pub fn new(data: &'a mut Vec<T>) -> Self {
        Self { data, labels: None }
    }

    #[must_use]
    pub fn with_labels(data: &'a mut Vec<T>, labels: Rc<LabelIndex>) -> Self {
        Self { data, labels: Some(labels) }
    }

    #[must_use]
    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn get(&self, i: usize) -> Result<&T> {
        check_bounds(i, self.data.len(), "index")?;
        Ok(&self.data[i])
    }

    pub fn set(&mut self, i: usize, value: T, mut hook: impl FnMut(usize, &T)) -> Result<()> {
        check_bounds(i, self.data.len(), "index")?;
        hook(i, &value);
        self.data[i] = value;
        Ok(())
    }

    pub fn set_labelled(
        &mut self,
        label: &str,
        value: T,
        hook: impl FnMut(usize, &T),
    ) -> Result<()> {
        let idx = self
            .labels
            .clone()
            .ok_or_else(|| GraphError::unknown_label(label, &[]))?
            .index(label)?;
        self.set(idx, value, hook)
    }
}

/// A read-only view that unconditionally refuses writes. Used by the model
/// layer to expose a property it computes but never wants assigned to
/// directly (§ 4.4 "non-terminal" properties).
#[derive(Debug, Clone)]
pub struct ReadOnly<V> {
    inner: V,
    what: String,
}

impl<V> ReadOnly<V> {
    #[must_use]
    pub fn new(inner: V, what: impl Into<String>) -> Self {
        Self { inner, what: what.into() }
    }

    #[must_use]
    pub fn inner(&self) -> &V {
        &self.inner
    }

    pub fn refuse_write(&self) -> GraphError {
        GraphError::ReadOnly { what: self.what.clone() }
    }
}

/// A read-only dense matrix view.
#[derive(Debug, Clone)]
pub struct DenseMatrix<T> {
    data: Array2<T>,
}

impl<T> DenseMatrix<T> {
    #[must_use]
    pub fn new(data: Array2<T>) -> Self {
        Self { data }
    }

    #[must_use]
    pub fn shape(&self) -> (usize, usize) {
        (self.data.nrows(), self.data.ncols())
    }

    pub fn get(&self, i: usize, j: usize) -> Result<&T> {
        let (rows, cols) = self.shape();
        check_bounds(i, rows, "row")?;
        check_bounds(j, cols, "col")?;
        Ok(&self.data[[i, j]])
    }

    #[must_use]
    pub fn as_array(&self) -> &Array2<T> {
        &self.data
    }

    pub fn into_inner(self) -> Array2<T> {
        self.data
    }
}

/// A writable dense matrix view.
#[derive(Debug)]
pub struct DenseMatrixMut<'a, T> {
    data: &'a mut Array2<T>,
}

impl<'a, T> DenseMatrixMut<'a, T> {
    #[must_use]
    pub fn new(data: &'a mut Array2<T>) -> Self {
        Self { data }
    }

    #[must_use]
    pub fn shape(&self) -> (usize, usize) {
        (self.data.nrows(), self.data.ncols())
    }

    pub fn get(&self, i: usize, j: usize) -> Result<&T> {
        let (rows, cols) = self.shape();
        check_bounds(i, rows, "row")?;
        check_bounds(j, cols, "col")?;
        Ok(&self.data[[i, j]])
    }

    pub fn set(
        &mut self,
        i: usize,
        j: usize,
        value: T,
        mut hook: impl FnMut(usize, usize, &T),
    ) -> Result<()> {
        let (rows, cols) = self.shape();
        check_bounds(i, rows, "row")?;
        check_bounds(j, cols, "col")?;
        hook(i, j, &value);
        self.data[[i, j]] = value;
        Ok(())
    }
}

/// A sparse matrix restricted to a boolean **template**: the set of `(i, j)`
/// pairs a value may legally occupy (§ 4.5 "Template"). Reading an
/// off-template cell returns `T::default()`; writing one is a
/// [`GraphError::TemplateViolation`].
#[derive(Debug, Clone)]
pub struct SparseMatrix<T> {
    template: Array2<bool>,
    values: HashMap<(usize, usize), T>,
}

impl<T: Clone + Default> SparseMatrix<T> {
    #[must_use]
    pub fn new(template: Array2<bool>) -> Self {
        Self { template, values: HashMap::new() }
    }

    #[must_use]
    pub fn shape(&self) -> (usize, usize) {
        (self.template.nrows(), self.template.ncols())
    }

    #[must_use]
    pub fn template(&self) -> &Array2<bool> {
        &self.template
    }

    pub fn get(&self, i: usize, j: usize) -> Result<T> {
        let (rows, cols) = self.shape();
        check_bounds(i, rows, "row")?;
        check_bounds(j, cols, "col")?;
        Ok(self.values.get(&(i, j)).cloned().unwrap_or_default())
    }

    pub fn set(
        &mut self,
        i: usize,
        j: usize,
        value: T,
        mut hook: impl FnMut(usize, usize, &T),
    ) -> Result<()> {
        let (rows, cols) = self.shape();
        check_bounds(i, rows, "row")?;
        check_bounds(j, cols, "col")?;
        if !self.template[[i, j]] {
            warn!(i, j, "rejected write outside sparse matrix template");
            return Err(GraphError::TemplateViolation { i, j: Some(j) });
        }
        hook(i, j, &value);
        self.values.insert((i, j), value);
        Ok(())
    }

    /// Iterates the `(i, j)` pairs the template allows, regardless of
    /// whether a value has been assigned.
    pub fn nonzero_indices(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.template
            .indexed_iter()
            .filter(|(_, &present)| present)
            .map(|((i, j), _)| (i, j))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dense_vector_bounds_checked() {
        let v = DenseVector::new(vec![1.0, 2.0, 3.0]);
        assert_eq!(*v.get(1).unwrap(), 2.0);
        assert!(matches!(v.get(9), Err(GraphError::OutOfBounds { .. })));
    }

    #[test]
    fn dense_vector_mut_runs_hook_before_assign() {
        let mut backing = vec![0.0, 0.0];
        let mut hook_seen = None;
        {
            let mut view = DenseVectorMut::new(&mut backing);
            view.set(1, 5.0, |i, v| hook_seen = Some((i, *v))).unwrap();
        }
        assert_eq!(backing[1], 5.0);
        assert_eq!(hook_seen, Some((1, 5.0)));
    }

    #[test]
    fn sparse_matrix_rejects_off_template_write() {
        let template = Array2::from_elem((2, 2), false);
        let mut m: SparseMatrix<f64> = SparseMatrix::new(template);
        let err = m.set(0, 0, 1.0, |_, _, _| {}).unwrap_err();
        assert!(matches!(err, GraphError::TemplateViolation { .. }));
    }

    #[test]
    fn sparse_matrix_reads_zero_off_template() {
        let template = Array2::from_elem((2, 2), false);
        let m: SparseMatrix<f64> = SparseMatrix::new(template);
        assert_eq!(m.get(0, 0).unwrap(), 0.0);
    }

    #[test]
    fn read_only_refuses_write() {
        let ro = ReadOnly::new(DenseVector::new(vec![1, 2, 3]), "model.trophic.matrix");
        let err = ro.refuse_write();
        assert!(matches!(err, GraphError::ReadOnly { .. }));
    }
}
