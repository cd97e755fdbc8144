// ============================================================
// Layer 4: Tensor Builder
// ============================================================
// Turns the three id columns of an EncodedBatch into the
// rank-2 tensors the ONNX graph expects.
//
// Shape:
//   Input:  one sequence of N ids
//   Output: Array2<i64> of shape [1, N]  (batch size fixed at 1)
//
//   [t1, t2, ..., tN] → [[t1, t2, ..., tN]]
//
// Reference: ndarray documentation (Array2, from_shape_vec)

use ndarray::Array2;

use crate::domain::tokens::EncodedBatch;

/// Build a `[1, dimension]` tensor whose row is `values` in order.
///
/// `dimension` is the token count of the request, which equals
/// `values.len()` by construction. Positions past the end of
/// `values` stay zero (padding).
pub fn to_tensor(values: &[i64], dimension: usize) -> Array2<i64> {
    let mut tensor = Array2::<i64>::zeros((1, dimension));
    for (i, &value) in values.iter().take(dimension).enumerate() {
        tensor[[0, i]] = value;
    }
    tensor
}

/// The three named inputs of one model run.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelInputs {
    /// Vocabulary ids, shape [1, N]
    pub input_ids: Array2<i64>,

    /// 1 = real token, 0 = padding, shape [1, N]
    pub attention_mask: Array2<i64>,

    /// Segment ids, shape [1, N]
    pub token_type_ids: Array2<i64>,
}

impl ModelInputs {
    pub fn from_batch(batch: &EncodedBatch) -> Self {
        let n = batch.len();
        Self {
            input_ids:      to_tensor(&batch.input_ids, n),
            attention_mask: to_tensor(&batch.attention_mask, n),
            token_type_ids: to_tensor(&batch.token_type_ids, n),
        }
    }

    /// Sequence length N of the batch.
    pub fn seq_len(&self) -> usize {
        self.input_ids.ncols()
    }
}
