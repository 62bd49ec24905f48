// ============================================================
// Layer 4 — Feature Preprocessor
// ============================================================
// Optional z-scoring of feature matrices before training or
// prediction.
//
// Why standardize?
//   Raw features can span very different ranges (k-mer counts
//   next to fractions). Large magnitudes push the projection
//   sigmoids into saturation where gradients vanish. Bringing
//   each attribute to zero mean and unit variance keeps the
//   latent projections in the sigmoid's responsive range.
//
// Each attribute (row) is standardized ACROSS entities:
//
//   x'[a, j] = (x[a, j] - mean_a) / std_a
//
//   std_a is the sample standard deviation (divisor N - 1). An
//   attribute that is constant over every entity has std 0, and
//   a single entity has no defined std; both are divided by 1
//   instead, which leaves them centred at zero.

use crate::domain::matrix::FeatureMatrix;

/// Per-attribute mean and standard deviation.
#[derive(Debug, Clone, PartialEq)]
pub struct Standardizer {
    pub means: Vec<f32>,
    pub stds:  Vec<f32>,
}

impl Standardizer {
    /// Measure every attribute of `matrix`.
    pub fn fit(matrix: &FeatureMatrix) -> Self {
        let entities = matrix.num_entities();
        let count    = entities.max(1) as f64;
        let mut means = Vec::with_capacity(matrix.num_attributes());
        let mut stds  = Vec::with_capacity(matrix.num_attributes());

        for a in 0..matrix.num_attributes() {
            // Accumulate in f64 so long rows don't lose precision
            let mean = matrix.attribute_row(a).map(f64::from).sum::<f64>() / count;
            let std = if entities > 1 {
                let squares = matrix
                    .attribute_row(a)
                    .map(|v| (f64::from(v) - mean).powi(2))
                    .sum::<f64>();
                (squares / (entities - 1) as f64).sqrt()
            } else {
                0.0
            };

            means.push(mean as f32);
            stds.push(if std == 0.0 || !std.is_finite() { 1.0 } else { std as f32 });
        }

        Self { means, stds }
    }

    /// Apply the measured transform in place.
    pub fn apply(&self, matrix: &mut FeatureMatrix) {
        matrix.map_values(|a, v| (v - self.means[a]) / self.stds[a]);
    }
}

/// Standardize `matrix` in place using its own statistics.
pub fn standardize(matrix: &mut FeatureMatrix) {
    let fitted = Standardizer::fit(matrix);
    fitted.apply(matrix);
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn matrix(rows: Vec<Vec<f32>>) -> FeatureMatrix {
        let attrs = (0..rows.len()).map(|i| format!("a{i}")).collect();
        let ids   = (0..rows[0].len()).map(|j| format!("e{j}")).collect();
        FeatureMatrix::from_rows(attrs, ids, rows).unwrap()
    }

    fn assert_close(actual: Vec<f32>, expected: &[f32]) {
        assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < 1e-4, "{actual:?} != {expected:?}");
        }
    }

    #[test]
    fn test_rows_become_zero_mean_unit_sample_variance() {
        let mut m = matrix(vec![vec![1.0, 2.0, 3.0, 4.0], vec![10.0, 10.0, 30.0, 30.0]]);
        standardize(&mut m);

        for a in 0..2 {
            let row: Vec<f32> = m.attribute_row(a).collect();
            let mean = row.iter().sum::<f32>() / 4.0;
            let var  = row.iter().map(|v| (v - mean).powi(2)).sum::<f32>() / 3.0;
            assert!(mean.abs() < 1e-6);
            assert!((var - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_std_uses_n_minus_one_divisor() {
        let mut m = matrix(vec![vec![1.0, 2.0, 3.0, 4.0], vec![10.0, 10.0, 30.0, 30.0]]);
        standardize(&mut m);

        assert_close(m.attribute_row(0).collect(), &[-1.161895, -0.387298, 0.387298, 1.161895]);
        assert_close(m.attribute_row(1).collect(), &[-0.866025, -0.866025, 0.866025, 0.866025]);
    }

    #[test]
    fn test_single_entity_is_centred_not_scaled() {
        let mut m = matrix(vec![vec![3.5], vec![-2.0]]);
        let fitted = Standardizer::fit(&m);
        assert_eq!(fitted.stds, vec![1.0, 1.0]);

        fitted.apply(&mut m);
        assert_eq!(m.attribute_row(0).collect::<Vec<_>>(), vec![0.0]);
        assert_eq!(m.attribute_row(1).collect::<Vec<_>>(), vec![0.0]);
    }

    #[test]
    fn test_constant_attribute_is_centred_not_scaled() {
        let mut m = matrix(vec![vec![5.0, 5.0, 5.0]]);
        let fitted = Standardizer::fit(&m);
        assert_eq!(fitted.stds, vec![1.0]);

        fitted.apply(&mut m);
        assert_eq!(m.attribute_row(0).collect::<Vec<_>>(), vec![0.0, 0.0, 0.0]);
    }
}
