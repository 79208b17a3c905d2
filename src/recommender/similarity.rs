use super::vectorize::{SparseVector, TermWeightMatrix};
use std::cmp::Ordering;

/// Cosine of the angle between `a` and `b`, 0 when either is a zero vector.
pub fn cosine_similarity(a: &SparseVector, b: &SparseVector) -> f64 {
    let mag_a = a.norm();
    let mag_b = b.norm();
    if mag_a == 0.0 || mag_b == 0.0 {
        return 0.0;
    }

    a.dot(b) / (mag_a * mag_b)
}

/// Dense symmetric n × n matrix, row-major.
#[derive(Clone, Debug)]
pub struct SimilarityMatrix {
    n: usize,
    data: Vec<f64>,
}

impl SimilarityMatrix {
    /// Full pairwise similarity. Only the upper triangle is computed and then
    /// mirrored, so `get(i, j) == get(j, i)` holds bit for bit.
    pub fn from_term_weights(matrix: &TermWeightMatrix) -> Self {
        let n = matrix.n_rows();
        let mut data = vec![0.0; n * n];
        for i in 0..n {
            for j in i..n {
                let similarity = cosine_similarity(matrix.row(i), matrix.row(j));
                data[i * n + j] = similarity;
                data[j * n + i] = similarity;
            }
        }
        Self { n, data }
    }

    /// Rows (and columns).
    pub fn size(&self) -> usize {
        self.n
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.data[i * self.n + j]
    }

    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.n..(i + 1) * self.n]
    }

    /// Bytes held by the dense matrix.
    pub fn footprint(&self) -> usize {
        self.data.len() * std::mem::size_of::<f64>()
    }
}

/// Ranks every other row against `index`, best first. Equal scores keep
/// catalog order. The row itself is never part of the result.
pub fn rank_similar(similarity: &SimilarityMatrix, index: usize, k: usize) -> Vec<(usize, f64)> {
    let mut scores = similarity
        .row(index)
        .iter()
        .copied()
        .enumerate()
        .collect::<Vec<_>>();
    // stable: ties stay in index order
    scores.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    scores
        .into_iter()
        .filter(|(i, _)| *i != index)
        .take(k)
        .collect()
}
