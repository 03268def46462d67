//! Flat observation tensors.

use serde::{Deserialize, Serialize};

/// Encoded observation as a flat tensor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EncodedState {
    /// Flattened tensor data (row-major order).
    pub tensor: Vec<f32>,

    /// Shape of the tensor.
    pub shape: Vec<usize>,
}

impl EncodedState {
    /// Create a new encoded state.
    pub fn new(tensor: Vec<f32>, shape: Vec<usize>) -> Self {
        debug_assert_eq!(
            tensor.len(),
            shape.iter().product::<usize>(),
            "Tensor length must match shape product"
        );
        Self { tensor, shape }
    }

    /// Create a zero-filled encoded state with the given shape.
    pub fn zeros(shape: Vec<usize>) -> Self {
        let size = shape.iter().product();
        Self {
            tensor: vec![0.0; size],
            shape,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tensor.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tensor.is_empty()
    }

    /// Get element at a flat index.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<f32> {
        self.tensor.get(index).copied()
    }

    /// Set element at a flat index. Out-of-range indices are ignored.
    pub fn set(&mut self, index: usize, value: f32) {
        if let Some(slot) = self.tensor.get_mut(index) {
            *slot = value;
        }
    }

    /// Number of non-zero elements.
    #[must_use]
    pub fn count_nonzero(&self) -> usize {
        self.tensor.iter().filter(|&&v| v != 0.0).count()
    }

    /// Borrow the data as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[f32] {
        &self.tensor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoded_state_new() {
        let state = EncodedState::new(vec![1.0, 2.0, 3.0, 4.0], vec![2, 2]);
        assert_eq!(state.len(), 4);
        assert_eq!(state.shape, vec![2, 2]);
        assert_eq!(state.get(0), Some(1.0));
        assert_eq!(state.get(4), None);
    }

    #[test]
    fn test_encoded_state_zeros() {
        let state = EncodedState::zeros(vec![3, 4]);
        assert_eq!(state.len(), 12);
        assert_eq!(state.count_nonzero(), 0);
    }

    #[test]
    fn test_encoded_state_set() {
        let mut state = EncodedState::zeros(vec![4]);
        state.set(2, 5.0);
        assert_eq!(state.as_slice(), &[0.0, 0.0, 5.0, 0.0]);
    }

    #[test]
    fn test_encoded_state_set_out_of_bounds() {
        let mut state = EncodedState::zeros(vec![3]);
        state.set(10, 5.0);
        assert_eq!(state.count_nonzero(), 0);
    }

    #[test]
    fn test_encoded_state_is_empty() {
        assert!(EncodedState::zeros(vec![0]).is_empty());
        assert!(!EncodedState::zeros(vec![3]).is_empty());
    }
}
