use super::tfidf::TfidfSpace;

impl TfidfSpace {
    /// Cosine similarity of document `index` against every document in the
    /// batch, itself included. Vectors are unit length, so this is a dot
    /// product. Returns an empty row for an out-of-range index.
    pub fn similarities_to(&self, index: usize) -> Vec<f64> {
        let Some(target) = self.vector(index) else {
            return Vec::new();
        };

        self.vectors().iter().map(|other| target.dot(other)).collect()
    }
}

/// Pairwise cosine similarities, indexed by batch position.
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityMatrix {
    size: usize,
    scores: Vec<f64>,
}

impl SimilarityMatrix {
    pub fn from_space(space: &TfidfSpace) -> Self {
        let size = space.len();
        let mut scores = vec![0.0; size * size];

        for i in 0..size {
            for j in i..size {
                let (Some(a), Some(b)) = (space.vector(i), space.vector(j)) else {
                    continue;
                };
                let score = a.dot(b);
                scores[i * size + j] = score;
                scores[j * size + i] = score;
            }
        }

        Self { size, scores }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        (row < self.size && col < self.size).then(|| self.scores[row * self.size + col])
    }

    pub fn row(&self, row: usize) -> Option<&[f64]> {
        (row < self.size).then(|| &self.scores[row * self.size..(row + 1) * self.size])
    }
}
