//! Linear multi-class classifier over flattened grayscale samples.
//!
//! A softmax logistic-regression head trained with seeded mini-batch SGD.
//! Any linear multi-class model would satisfy the session contract; this one
//! is deterministic for a fixed seed, which is what makes retraining after a
//! snapshot restore reproduce the previous decision boundary.

use serde::{Deserialize, Serialize};

mod train;
pub use train::{TrainDataset, TrainOptions, train_linear};

/// Current serialized model schema version.
pub const MODEL_VERSION: i64 = 1;

/// Versioned linear model for flattened pixel vectors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    /// Serialized schema version.
    pub model_version: i64,
    /// Length of one flattened input row.
    pub input_dim: usize,
    /// Number of output classes.
    pub n_classes: usize,
    /// Row-major `n_classes x input_dim` weight matrix.
    pub weights: Vec<f32>,
    /// Per-class bias terms.
    pub bias: Vec<f32>,
}

impl LinearModel {
    /// Validate the model dimensions and schema version.
    pub fn validate(&self) -> Result<(), String> {
        if self.model_version != MODEL_VERSION {
            return Err(format!(
                "Unsupported model_version {} (expected {MODEL_VERSION})",
                self.model_version
            ));
        }
        if self.input_dim == 0 {
            return Err("input_dim must be positive".to_string());
        }
        if self.n_classes == 0 {
            return Err("No classes defined".to_string());
        }
        if self.weights.len() != self.n_classes * self.input_dim {
            return Err("weights length mismatch".to_string());
        }
        if self.bias.len() != self.n_classes {
            return Err("bias length mismatch".to_string());
        }
        Ok(())
    }

    /// Compute class probabilities for a single flattened sample.
    pub fn predict_proba(&self, input: &[f32]) -> Vec<f32> {
        if input.len() != self.input_dim || self.n_classes == 0 {
            return Vec::new();
        }
        let mut logits = vec![0.0f32; self.n_classes];
        for c in 0..self.n_classes {
            let mut sum = self.bias[c];
            let base = c * self.input_dim;
            for i in 0..self.input_dim {
                sum += self.weights[base + i] * input[i];
            }
            logits[c] = sum;
        }
        softmax(&logits)
    }

    /// Return the argmax class index for the given flattened sample.
    pub fn predict_class_index(&self, input: &[f32]) -> usize {
        let proba = self.predict_proba(input);
        let mut best = 0usize;
        let mut best_val = f32::NEG_INFINITY;
        for (idx, &p) in proba.iter().enumerate() {
            if p > best_val {
                best_val = p;
                best = idx;
            }
        }
        best
    }
}

/// Numerically stable softmax over raw logits.
pub fn softmax(logits: &[f32]) -> Vec<f32> {
    if logits.is_empty() {
        return Vec::new();
    }
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|&l| (l - max).exp()).collect();
    let total: f32 = exps.iter().sum();
    if total <= 0.0 {
        return vec![1.0 / logits.len() as f32; logits.len()];
    }
    exps.into_iter().map(|e| e / total).collect()
}
