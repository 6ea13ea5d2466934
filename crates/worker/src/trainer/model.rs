//! Multinomial logistic regression trained with mini-batch SGD.

use rand::seq::SliceRandom;
use rand::Rng;

use super::dataset::Dataset;

/// Linear softmax classifier: `logits = W x + b`.
#[derive(Debug, Clone)]
pub struct SoftmaxRegression {
    /// Row-major `classes x dim`.
    weights: Vec<f64>,
    bias: Vec<f64>,
    dim: usize,
    classes: usize,
}

impl SoftmaxRegression {
    /// A zero-initialised model.
    pub fn new(dim: usize, classes: usize) -> Self {
        Self {
            weights: vec![0.0; dim * classes],
            bias: vec![0.0; classes],
            dim,
            classes,
        }
    }

    /// One pass over `data` in shuffled mini-batches. Returns the mean
    /// cross-entropy loss over the epoch.
    pub fn train_epoch<R: Rng>(
        &mut self,
        data: &Dataset,
        batch_size: usize,
        lr: f64,
        rng: &mut R,
    ) -> f64 {
        if data.is_empty() {
            return 0.0;
        }
        let batch_size = batch_size.max(1);

        let mut order: Vec<usize> = (0..data.len()).collect();
        order.shuffle(rng);

        let mut grad_w = vec![0.0; self.weights.len()];
        let mut grad_b = vec![0.0; self.classes];
        let mut probs = vec![0.0; self.classes];
        let mut total_loss = 0.0;

        for batch in order.chunks(batch_size) {
            grad_w.iter_mut().for_each(|g| *g = 0.0);
            grad_b.iter_mut().for_each(|g| *g = 0.0);

            for &index in batch {
                let (x, label) = data.get(index);
                self.probabilities(x, &mut probs);
                let p = probs[label];
                // NaN must survive so the caller sees a diverged epoch.
                total_loss -= if p.is_nan() { p } else { p.max(f64::MIN_POSITIVE).ln() };

                for class in 0..self.classes {
                    let err = probs[class] - if class == label { 1.0 } else { 0.0 };
                    grad_b[class] += err;
                    let row = &mut grad_w[class * self.dim..(class + 1) * self.dim];
                    for (g, xi) in row.iter_mut().zip(x) {
                        *g += err * xi;
                    }
                }
            }

            let scale = lr / batch.len() as f64;
            for (w, g) in self.weights.iter_mut().zip(&grad_w) {
                *w -= scale * g;
            }
            for (b, g) in self.bias.iter_mut().zip(&grad_b) {
                *b -= scale * g;
            }
        }

        total_loss / data.len() as f64
    }

    /// Most likely class for `x`.
    pub fn predict(&self, x: &[f64]) -> usize {
        let mut probs = vec![0.0; self.classes];
        self.probabilities(x, &mut probs);
        probs
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(class, _)| class)
            .unwrap_or(0)
    }

    /// Fraction of `data` classified correctly.
    pub fn accuracy(&self, data: &Dataset) -> f64 {
        if data.is_empty() {
            return 0.0;
        }
        let correct = (0..data.len())
            .filter(|&i| {
                let (x, label) = data.get(i);
                self.predict(x) == label
            })
            .count();
        correct as f64 / data.len() as f64
    }

    /// Numerically stable softmax of the logits for `x`, written into `out`.
    fn probabilities(&self, x: &[f64], out: &mut [f64]) {
        for (class, logit) in out.iter_mut().enumerate() {
            let row = &self.weights[class * self.dim..(class + 1) * self.dim];
            *logit = self.bias[class] + row.iter().zip(x).map(|(w, xi)| w * xi).sum::<f64>();
        }
        let max = out.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let mut sum = 0.0;
        for p in out.iter_mut() {
            *p = (*p - max).exp();
            sum += *p;
        }
        for p in out.iter_mut() {
            *p /= sum;
        }
    }
}
