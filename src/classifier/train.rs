use rand::rngs::StdRng;
use rand::{Rng, SeedableRng, seq::SliceRandom};

use super::{LinearModel, MODEL_VERSION, softmax};

/// Training options for the linear classifier.
#[derive(Debug, Clone)]
pub struct TrainOptions {
    pub epochs: usize,
    pub learning_rate: f32,
    pub l2: f32,
    pub batch_size: usize,
    pub seed: u64,
}

impl Default for TrainOptions {
    fn default() -> Self {
        Self {
            epochs: 40,
            learning_rate: 0.1,
            l2: 1e-4,
            batch_size: 32,
            seed: 42,
        }
    }
}

/// In-memory training corpus: flattened pixel rows and class indices.
#[derive(Debug, Clone, Default)]
pub struct TrainDataset {
    pub n_classes: usize,
    pub x: Vec<Vec<f32>>,
    pub y: Vec<usize>,
}

impl TrainDataset {
    /// Number of distinct labels with at least one sample.
    pub fn distinct_labels(&self) -> usize {
        let mut seen = vec![false; self.n_classes];
        for &y in &self.y {
            if y < self.n_classes {
                seen[y] = true;
            }
        }
        seen.into_iter().filter(|&s| s).count()
    }
}

/// Fit a fresh linear model on the full corpus with mini-batch SGD.
pub fn train_linear(dataset: &TrainDataset, options: &TrainOptions) -> Result<LinearModel, String> {
    if dataset.x.is_empty() || dataset.y.is_empty() {
        return Err("Empty training set".to_string());
    }
    if dataset.x.len() != dataset.y.len() {
        return Err("Mismatched training inputs/labels".to_string());
    }
    let classes = dataset.n_classes;
    if classes == 0 {
        return Err("No classes available for training".to_string());
    }
    if let Some(&bad) = dataset.y.iter().find(|&&y| y >= classes) {
        return Err(format!("Label {bad} out of range for {classes} classes"));
    }
    let dim = dataset.x[0].len();
    if dim == 0 {
        return Err("Empty feature rows".to_string());
    }
    for row in &dataset.x {
        if row.len() != dim {
            return Err("Inconsistent feature row length".to_string());
        }
    }

    let mut rng = StdRng::seed_from_u64(options.seed);
    let mut weights = vec![0.0f32; classes * dim];
    let mut bias = vec![0.0f32; classes];
    for w in &mut weights {
        *w = (rng.random::<f32>() - 0.5) * 0.01;
    }

    let mut indices: Vec<usize> = (0..dataset.x.len()).collect();
    let batch_size = options.batch_size.max(1);
    let lr = options.learning_rate;
    let l2 = options.l2.max(0.0);

    for _epoch in 0..options.epochs {
        indices.shuffle(&mut rng);
        for chunk in indices.chunks(batch_size) {
            let mut grad_w = vec![0.0f32; weights.len()];
            let mut grad_b = vec![0.0f32; bias.len()];
            for &idx in chunk {
                let x = &dataset.x[idx];
                let y = dataset.y[idx];
                let mut logits = vec![0.0f32; classes];
                for c in 0..classes {
                    let base = c * dim;
                    let mut sum = bias[c];
                    for i in 0..dim {
                        sum += weights[base + i] * x[i];
                    }
                    logits[c] = sum;
                }
                let probs = softmax(&logits);
                for c in 0..classes {
                    let diff = probs[c] - if c == y { 1.0 } else { 0.0 };
                    let base = c * dim;
                    for i in 0..dim {
                        grad_w[base + i] += diff * x[i];
                    }
                    grad_b[c] += diff;
                }
            }
            let inv = 1.0 / chunk.len() as f32;
            for c in 0..classes {
                let base = c * dim;
                for i in 0..dim {
                    let idx = base + i;
                    let l2_term = l2 * weights[idx];
                    weights[idx] -= lr * (grad_w[idx] * inv + l2_term);
                }
                bias[c] -= lr * grad_b[c] * inv;
            }
        }
    }

    let model = LinearModel {
        model_version: MODEL_VERSION,
        input_dim: dim,
        n_classes: classes,
        weights,
        bias,
    };
    model.validate()?;
    Ok(model)
}
