//! TF-IDF vectorization.
//!
//! Weights are raw term counts times a smoothed inverse document frequency,
//! `ln((1 + n) / (1 + df)) + 1`, and every row is scaled to unit length.

use super::error::RecommendError;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Sparse row: `indices` are strictly increasing term indices.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SparseVector {
    pub indices: Vec<usize>,
    pub values: Vec<f64>,
}

impl SparseVector {
    pub fn nnz(&self) -> usize {
        self.indices.len()
    }

    pub fn is_zero(&self) -> bool {
        self.values.iter().all(|v| *v == 0.0)
    }

    #[cfg(test)]
    pub fn get(&self, index: usize) -> f64 {
        match self.indices.binary_search(&index) {
            Ok(pos) => self.values[pos],
            Err(_) => 0.0,
        }
    }

    pub fn dot(&self, other: &SparseVector) -> f64 {
        let (mut i, mut j) = (0, 0);
        let mut sum = 0.0;
        while i < self.indices.len() && j < other.indices.len() {
            match self.indices[i].cmp(&other.indices[j]) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    sum += self.values[i] * other.values[j];
                    i += 1;
                    j += 1;
                }
            }
        }
        sum
    }

    pub fn norm(&self) -> f64 {
        self.values.iter().map(|x| x * x).sum::<f64>().sqrt()
    }

    fn normalize(&mut self) {
        let norm = self.norm();
        if norm > 0.0 {
            for x in self.values.iter_mut() {
                *x /= norm;
            }
        }
    }
}

/// Documents × vocabulary, one sparse row per document in input order.
#[derive(Clone, Debug, Default)]
pub struct TermWeightMatrix {
    pub n_terms: usize,
    pub rows: Vec<SparseVector>,
}

impl TermWeightMatrix {
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn row(&self, index: usize) -> &SparseVector {
        &self.rows[index]
    }
}

/// Lowercases and keeps runs of alphanumerics or `_` at least two characters
/// long.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|w| w.chars().count() >= 2)
        .map(|w| w.to_string())
        .collect()
}

#[derive(Clone, Debug, Default)]
pub struct TfidfVectorizer {
    /// term -> column, columns assigned in sorted term order
    vocabulary: BTreeMap<String, usize>,
    idf: Vec<f64>,
}

impl TfidfVectorizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_fitted(&self) -> bool {
        !self.idf.is_empty()
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn vocabulary(&self) -> &BTreeMap<String, usize> {
        &self.vocabulary
    }

    pub fn idf(&self, term: &str) -> Option<f64> {
        self.vocabulary.get(term).map(|&i| self.idf[i])
    }

    /// Learns the vocabulary and idf weights. Fails when no document yields a
    /// token.
    pub fn fit<S: AsRef<str>>(&mut self, documents: &[S]) -> Result<(), RecommendError> {
        let n_docs = documents.len();
        let mut doc_freq: HashMap<String, usize> = HashMap::new();
        for doc in documents {
            let unique = tokenize(doc.as_ref()).into_iter().collect::<BTreeSet<_>>();
            for term in unique {
                *doc_freq.entry(term).or_insert(0) += 1;
            }
        }
        if doc_freq.is_empty() {
            return Err(RecommendError::Configuration(
                "empty vocabulary, every document is blank".to_string(),
            ));
        }

        let mut terms = doc_freq.keys().cloned().collect::<Vec<_>>();
        terms.sort_unstable();
        let n = n_docs as f64;
        self.idf = terms
            .iter()
            .map(|t| ((1.0 + n) / (1.0 + doc_freq[t] as f64)).ln() + 1.0)
            .collect();
        self.vocabulary = terms
            .into_iter()
            .enumerate()
            .map(|(i, t)| (t, i))
            .collect();

        Ok(())
    }

    /// Weights documents with the fitted vocabulary. Unknown terms are
    /// dropped; a document with no known term becomes a zero row.
    pub fn transform<S: AsRef<str>>(
        &self,
        documents: &[S],
    ) -> Result<TermWeightMatrix, RecommendError> {
        if !self.is_fitted() {
            return Err(RecommendError::Configuration(
                "vectorizer used before fit".to_string(),
            ));
        }

        let rows = documents
            .iter()
            .map(|doc| {
                let mut counts: BTreeMap<usize, f64> = BTreeMap::new();
                for token in tokenize(doc.as_ref()) {
                    if let Some(&i) = self.vocabulary.get(&token) {
                        *counts.entry(i).or_insert(0.0) += 1.0;
                    }
                }
                let (indices, values): (Vec<usize>, Vec<f64>) = counts
                    .into_iter()
                    .map(|(i, tf)| (i, tf * self.idf[i]))
                    .unzip();
                let mut row = SparseVector { indices, values };
                row.normalize();
                row
            })
            .collect();

        Ok(TermWeightMatrix {
            n_terms: self.vocabulary.len(),
            rows,
        })
    }

    pub fn fit_transform<S: AsRef<str>>(
        &mut self,
        documents: &[S],
    ) -> Result<TermWeightMatrix, RecommendError> {
        self.fit(documents)?;
        self.transform(documents)
    }
}
