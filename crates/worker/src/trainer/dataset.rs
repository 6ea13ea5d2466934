//! Seeded synthetic classification data.
//!
//! Each class is a random centre in `[-1, 1]^dim`; samples are the centre
//! plus uniform noise. Train and test splits share the same centres.

use rand::Rng;

/// Number of target classes (as for handwritten digits).
pub const NUM_CLASSES: usize = 10;

/// Dimensionality of each sample.
pub const NUM_FEATURES: usize = 16;

/// Half-width of the uniform noise added around each class centre.
const NOISE: f64 = 0.9;

/// A dense, row-major labelled dataset.
#[derive(Debug, Clone)]
pub struct Dataset {
    features: Vec<f64>,
    labels: Vec<usize>,
    dim: usize,
}

impl Dataset {
    /// Generate a train and a test split drawn from the same class centres.
    pub fn generate_split<R: Rng>(
        rng: &mut R,
        train_samples: usize,
        test_samples: usize,
    ) -> (Dataset, Dataset) {
        let centres: Vec<f64> = (0..NUM_CLASSES * NUM_FEATURES)
            .map(|_| rng.random_range(-1.0..1.0))
            .collect();
        let train = Self::sample(rng, &centres, train_samples);
        let test = Self::sample(rng, &centres, test_samples);
        (train, test)
    }

    fn sample<R: Rng>(rng: &mut R, centres: &[f64], count: usize) -> Dataset {
        let mut features = Vec::with_capacity(count * NUM_FEATURES);
        let mut labels = Vec::with_capacity(count);
        for i in 0..count {
            let class = i % NUM_CLASSES;
            let centre = &centres[class * NUM_FEATURES..(class + 1) * NUM_FEATURES];
            features.extend(centre.iter().map(|c| c + rng.random_range(-NOISE..NOISE)));
            labels.push(class);
        }
        Dataset {
            features,
            labels,
            dim: NUM_FEATURES,
        }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Feature vector and label of sample `index`.
    pub fn get(&self, index: usize) -> (&[f64], usize) {
        let start = index * self.dim;
        (&self.features[start..start + self.dim], self.labels[index])
    }
}
