//! Dense `f32` tensors attached to graphs as features and labels.

use crate::error::GraphError;

/// Row-major tensor of rank one or two.
///
/// The engine only inspects shapes and label ranges; values are otherwise
/// opaque and shared between split views.
///
/// # Examples
/// ```
/// use graphsplit_core::Tensor;
///
/// let features = Tensor::new(vec![3, 2], vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0])?;
/// assert_eq!(features.rows(), 3);
/// assert_eq!(features.columns(), 2);
///
/// let labels = Tensor::from_vec(vec![0.0, 2.0, 1.0]);
/// assert_eq!(labels.class_count(), 3);
/// # Ok::<(), graphsplit_core::GraphError>(())
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Tensor {
    shape: Vec<usize>,
    values: Vec<f32>,
}

impl Tensor {
    /// Creates a tensor, checking that `values` exactly fills `shape`.
    ///
    /// # Errors
    /// Returns [`GraphError::ShapeMismatch`] when the shape has a rank other
    /// than one or two, or its product differs from `values.len()`.
    pub fn new(shape: Vec<usize>, values: Vec<f32>) -> Result<Self, GraphError> {
        let expected = shape.iter().product::<usize>();
        if shape.is_empty() || shape.len() > 2 || expected != values.len() {
            return Err(GraphError::ShapeMismatch {
                expected,
                actual: values.len(),
                shape,
            });
        }
        Ok(Self { shape, values })
    }

    /// Creates a rank-one tensor.
    #[must_use]
    pub fn from_vec(values: Vec<f32>) -> Self {
        Self {
            shape: vec![values.len()],
            values,
        }
    }

    /// Creates a rank-two tensor from equally sized rows.
    ///
    /// # Errors
    /// Returns [`GraphError::ShapeMismatch`] when rows differ in length.
    pub fn from_rows(rows: &[Vec<f32>]) -> Result<Self, GraphError> {
        let columns = rows.first().map_or(0, Vec::len);
        let values: Vec<f32> = rows.iter().flatten().copied().collect();
        Self::new(vec![rows.len(), columns], values)
    }

    /// Declared shape.
    #[must_use]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Number of rows (the leading dimension).
    #[must_use]
    pub fn rows(&self) -> usize {
        self.shape.first().copied().unwrap_or(0)
    }

    /// Number of columns; rank-one tensors count as a single column.
    #[must_use]
    pub fn columns(&self) -> usize {
        self.shape.get(1).copied().unwrap_or(1)
    }

    /// Whether the tensor is rank one.
    #[must_use]
    pub fn is_vector(&self) -> bool {
        self.shape.len() == 1
    }

    /// Row-major values.
    #[must_use]
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Number of classes encoded by a label tensor.
    ///
    /// Rank-one tensors hold class ids, so the count is the largest id plus
    /// one. Rank-two tensors are one-hot or multi-label and report their
    /// column count.
    #[must_use]
    pub fn class_count(&self) -> usize {
        if !self.is_vector() {
            return self.columns();
        }
        self.values
            .iter()
            .copied()
            .filter(|value| value.is_finite() && *value >= 0.0)
            .fold(None, |acc: Option<f32>, value| {
                Some(acc.map_or(value, |best| best.max(value)))
            })
            .map_or(0, |max| max as usize + 1)
    }
}
