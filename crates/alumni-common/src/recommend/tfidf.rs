use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use super::feature::FeatureDocument;
use super::tokenizer::tokenize;

/// Sparse vector of `(term index, weight)` pairs sorted by term index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseVector {
    entries: Vec<(usize, f64)>,
}

impl SparseVector {
    fn from_sorted(entries: Vec<(usize, f64)>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[(usize, f64)] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn norm(&self) -> f64 {
        self.entries.iter().map(|(_, w)| w * w).sum::<f64>().sqrt()
    }

    /// Scales to unit length. A zero vector is left untouched.
    fn normalize(&mut self) {
        let norm = self.norm();
        if norm > 0.0 {
            for (_, w) in &mut self.entries {
                *w /= norm;
            }
        }
    }

    pub fn dot(&self, other: &SparseVector) -> f64 {
        let (mut i, mut j) = (0, 0);
        let mut sum = 0.0;

        while i < self.entries.len() && j < other.entries.len() {
            let (a_idx, a_w) = self.entries[i];
            let (b_idx, b_w) = other.entries[j];
            if a_idx == b_idx {
                sum += a_w * b_w;
                i += 1;
                j += 1;
            } else if a_idx < b_idx {
                i += 1;
            } else {
                j += 1;
            }
        }

        sum
    }
}

/// TF-IDF vector space fitted on one batch of feature documents.
///
/// ```text
/// tf(t, d)  = occurrences of t in d
/// idf(t)    = ln((1 + N) / (1 + df(t))) + 1
/// v(d)      = l2_normalize(tf(., d) * idf(.))
/// ```
///
/// Vocabulary indices follow lexical term order, so the space depends only on
/// the documents and never on hash iteration order.
#[derive(Debug, Clone)]
pub struct TfidfSpace {
    vocabulary: BTreeMap<String, usize>,
    idf: Vec<f64>,
    vectors: Vec<SparseVector>,
}

impl TfidfSpace {
    pub fn fit(documents: &[FeatureDocument]) -> Self {
        let tokenized: Vec<Vec<String>> = documents.iter().map(|d| tokenize(&d.text)).collect();

        let vocabulary: BTreeMap<String, usize> = tokenized
            .iter()
            .flatten()
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .enumerate()
            .map(|(idx, term)| (term, idx))
            .collect();

        let mut doc_freq = vec![0usize; vocabulary.len()];
        let mut term_counts = Vec::with_capacity(tokenized.len());
        for tokens in &tokenized {
            let mut counts: BTreeMap<usize, usize> = BTreeMap::new();
            for token in tokens {
                if let Some(&idx) = vocabulary.get(token) {
                    *counts.entry(idx).or_insert(0) += 1;
                }
            }
            for idx in counts.keys() {
                doc_freq[*idx] += 1;
            }
            term_counts.push(counts);
        }

        let n_docs = documents.len() as f64;
        let idf: Vec<f64> = doc_freq
            .iter()
            .map(|&df| ((1.0 + n_docs) / (1.0 + df as f64)).ln() + 1.0)
            .collect();

        let vectors = term_counts
            .into_iter()
            .map(|counts| {
                let mut vector = SparseVector::from_sorted(
                    counts
                        .into_iter()
                        .map(|(idx, tf)| (idx, tf as f64 * idf[idx]))
                        .collect(),
                );
                vector.normalize();
                vector
            })
            .collect::<Vec<_>>();

        debug!(
            documents = documents.len(),
            vocabulary = vocabulary.len(),
            "fitted tf-idf space"
        );

        Self {
            vocabulary,
            idf,
            vectors,
        }
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    pub fn vocabulary(&self) -> &BTreeMap<String, usize> {
        &self.vocabulary
    }

    pub fn idf(&self, term: &str) -> Option<f64> {
        self.vocabulary.get(term).map(|&idx| self.idf[idx])
    }

    pub fn vector(&self, index: usize) -> Option<&SparseVector> {
        self.vectors.get(index)
    }

    pub fn vectors(&self) -> &[SparseVector] {
        &self.vectors
    }
}
