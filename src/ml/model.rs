// ============================================================
// Layer 5 — Bilinear Factorization Model
// ============================================================
// Scores a (protein, RNA) pair from explicit features:
//
//   P  = σ(Fp · Apᵗ + bp)          protein latent   [k, sp]
//   R  = σ(Fr · Arᵗ + br)          RNA latent       [k, sr]
//   ŷ  = σ( Σ_j (P · B)_j · R_j )  score            [k]
//
// Cost of a batch:
//
//   cost = mean((ŷ - y)²) + λ · reg
//   reg  = ( (‖Ap‖+‖bp‖)/(|Ap|+|bp|)
//          + (‖Ar‖+‖br‖)/(|Ar|+|br|)
//          +  ‖B‖/|B| ) / 3
//
//   ‖·‖ is the Frobenius norm, |·| the element count.
//
// Gradients are written out by hand. The chain is fixed, so
// no autodiff backend is needed. With Q = P·B and s the score
// before the last sigmoid:
//
//   ∂s = 2(ŷ - y)/k ⊙ ŷ(1 - ŷ)
//   ∂Q = ∂s ⊙ R          ∂R = ∂s ⊙ Q
//   ∂B = Pᵗ · ∂Q         ∂P = ∂Q · Bᵗ
//   ∂Zp = ∂P ⊙ P(1-P)    ∂Ap = ∂Zpᵗ · Fp    ∂bp = Σ_rows ∂Zp
//   ∂Zr = ∂R ⊙ R(1-R)    ∂Ar = ∂Zrᵗ · Fr    ∂br = Σ_rows ∂Zr
//
//   plus λ/(3N) · X/‖X‖ for each tensor X of a group of size N.
//
// Update is plain SGD: X ← X - lr · ∂X, for all five tensors
// at once, after the full forward/backward pass.

use burn::{prelude::*, tensor::activation::sigmoid};
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::domain::error::{FactorError, FactorResult};
use crate::ml::params::{ModelParams, ParamArray};

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize.
#[derive(Config, Debug)]
pub struct FactorizationConfig {
    /// Size of the protein latent space (sp)
    pub protein_latent: usize,
    /// Size of the RNA latent space (sr)
    pub rna_latent:     usize,
    /// Weights start uniform in [-irange/2, irange/2]
    #[config(default = 0.01)]
    pub irange:         f64,
    #[config(default = 0.01)]
    pub learning_rate:  f64,
    #[config(default = 0.01)]
    pub lambda_reg:     f64,
    #[config(default = 1234)]
    pub seed:           u64,
}

impl FactorizationConfig {
    /// Build a model for `protein_dim` protein features and `rna_dim`
    /// RNA features, with weights drawn from a generator seeded by
    /// `self.seed`.
    pub fn init<B: Backend>(
        &self,
        protein_dim: usize,
        rna_dim:     usize,
        device:      &B::Device,
    ) -> FactorResult<FactorizationModel<B>> {
        self.validate()?;
        if protein_dim == 0 || rna_dim == 0 {
            return Err(FactorError::InvalidConfig(format!(
                "feature dimensions must be positive (n={protein_dim}, m={rna_dim})"
            )));
        }

        let (sp, sr) = (self.protein_latent, self.rna_latent);
        let mut rng  = StdRng::seed_from_u64(self.seed);
        let irange   = self.irange;
        let mut draw = |shape: Vec<usize>| {
            let len    = shape.iter().product::<usize>();
            let values = (0..len)
                .map(|_| ((0.5 - rng.gen::<f64>()) * irange) as f32)
                .collect();
            ParamArray::new(shape, values)
        };

        // Draw order is part of the seed contract
        let params = ModelParams {
            ap: draw(vec![sp, protein_dim]),
            bp: draw(vec![sp]),
            ar: draw(vec![sr, rna_dim]),
            br: draw(vec![sr]),
            b:  draw(vec![sp, sr]),
        };

        FactorizationModel::from_params(self.clone(), &params, device)
    }

    fn validate(&self) -> FactorResult<()> {
        if self.protein_latent == 0 || self.rna_latent == 0 {
            return Err(FactorError::InvalidConfig(format!(
                "latent sizes must be positive (sp={}, sr={})",
                self.protein_latent, self.rna_latent
            )));
        }
        let finite = [self.irange, self.learning_rate, self.lambda_reg];
        if finite.iter().any(|v| !v.is_finite()) {
            return Err(FactorError::InvalidConfig(
                "irange, learning_rate and lambda_reg must be finite".into(),
            ));
        }
        Ok(())
    }
}

/// Predictions for one batch and the cost they produced.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchOutput {
    pub predictions: Vec<f32>,
    /// MSE plus the scaled regularization term; zero for an empty batch
    pub cost:        f64,
}

impl BatchOutput {
    fn empty() -> Self {
        Self { predictions: Vec::new(), cost: 0.0 }
    }
}

struct Forward<B: Backend> {
    p:     Tensor<B, 2>,
    r:     Tensor<B, 2>,
    q:     Tensor<B, 2>,
    y_hat: Tensor<B, 1>,
}

struct Gradients<B: Backend> {
    ap: Tensor<B, 2>,
    bp: Tensor<B, 1>,
    ar: Tensor<B, 2>,
    br: Tensor<B, 1>,
    b:  Tensor<B, 2>,
}

/// The five parameter tensors and the configuration that owns them.
#[derive(Debug, Clone)]
pub struct FactorizationModel<B: Backend> {
    config:      FactorizationConfig,
    protein_dim: usize,
    rna_dim:     usize,
    ap:          Tensor<B, 2>,
    bp:          Tensor<B, 1>,
    ar:          Tensor<B, 2>,
    br:          Tensor<B, 1>,
    b:           Tensor<B, 2>,
    device:      B::Device,
}

impl<B: Backend> FactorizationModel<B> {
    /// Rebuild a model from a parameter snapshot. The feature dimensions
    /// are read from the projection shapes; everything else must agree
    /// with them and with the configured latent sizes.
    pub fn from_params(
        config: FactorizationConfig,
        params: &ModelParams,
        device: &B::Device,
    ) -> FactorResult<Self> {
        config.validate()?;
        let (sp, sr) = (config.protein_latent, config.rna_latent);

        let protein_dim = matrix_cols(&params.ap, "Ap", sp)?;
        let rna_dim     = matrix_cols(&params.ar, "Ar", sr)?;
        expect_shape(&params.bp, "bp", &[sp])?;
        expect_shape(&params.br, "br", &[sr])?;
        expect_shape(&params.b, "B", &[sp, sr])?;

        Ok(Self {
            ap: tensor2(&params.ap, device),
            bp: tensor1(&params.bp, device),
            ar: tensor2(&params.ar, device),
            br: tensor1(&params.br, device),
            b:  tensor2(&params.b, device),
            config,
            protein_dim,
            rna_dim,
            device: device.clone(),
        })
    }

    pub fn config(&self) -> &FactorizationConfig {
        &self.config
    }

    /// n, the number of protein features
    pub fn protein_dim(&self) -> usize {
        self.protein_dim
    }

    /// m, the number of RNA features
    pub fn rna_dim(&self) -> usize {
        self.rna_dim
    }

    /// One SGD step on a batch. Returns the predictions and cost
    /// computed BEFORE the update.
    pub fn train(
        &mut self,
        protein_features: &[f32],
        rna_features:     &[f32],
        labels:           &[f32],
    ) -> FactorResult<BatchOutput> {
        let k = self.check_inputs(protein_features, rna_features, Some(labels))?;
        if k == 0 {
            return Ok(BatchOutput::empty());
        }

        let (fp, fr) = self.inputs(protein_features, rna_features, k);
        let y        = Tensor::<B, 1>::from_data(TensorData::new(labels.to_vec(), [k]), &self.device);

        let fwd         = self.forward(fp.clone(), fr.clone());
        let predictions = read(fwd.y_hat.clone());
        let cost        = self.cost(&predictions, labels);
        let grads       = self.backward(fp, fr, y, &fwd);

        let lr  = self.config.learning_rate;
        self.ap = self.ap.clone() - grads.ap.mul_scalar(lr);
        self.bp = self.bp.clone() - grads.bp.mul_scalar(lr);
        self.ar = self.ar.clone() - grads.ar.mul_scalar(lr);
        self.br = self.br.clone() - grads.br.mul_scalar(lr);
        self.b  = self.b.clone() - grads.b.mul_scalar(lr);

        Ok(BatchOutput { predictions, cost })
    }

    /// Predictions and cost without touching the parameters.
    pub fn evaluate(
        &self,
        protein_features: &[f32],
        rna_features:     &[f32],
        labels:           &[f32],
    ) -> FactorResult<BatchOutput> {
        let k = self.check_inputs(protein_features, rna_features, Some(labels))?;
        if k == 0 {
            return Ok(BatchOutput::empty());
        }

        let (fp, fr)    = self.inputs(protein_features, rna_features, k);
        let predictions = read(self.forward(fp, fr).y_hat);
        let cost        = self.cost(&predictions, labels);
        Ok(BatchOutput { predictions, cost })
    }

    /// Scores in (0, 1), one per row.
    pub fn predict(&self, protein_features: &[f32], rna_features: &[f32]) -> FactorResult<Vec<f32>> {
        let k = self.check_inputs(protein_features, rna_features, None)?;
        if k == 0 {
            return Ok(Vec::new());
        }
        let (fp, fr) = self.inputs(protein_features, rna_features, k);
        Ok(read(self.forward(fp, fr).y_hat))
    }

    /// Independent copy of every parameter.
    pub fn get_params(&self) -> ModelParams {
        let (sp, sr) = (self.config.protein_latent, self.config.rna_latent);
        ModelParams {
            ap: ParamArray::new(vec![sp, self.protein_dim], read(self.ap.clone())),
            bp: ParamArray::new(vec![sp], read(self.bp.clone())),
            ar: ParamArray::new(vec![sr, self.rna_dim], read(self.ar.clone())),
            br: ParamArray::new(vec![sr], read(self.br.clone())),
            b:  ParamArray::new(vec![sp, sr], read(self.b.clone())),
        }
    }

    /// The unscaled regularization term (`reg` above).
    pub fn regularization(&self) -> f64 {
        let p = self.get_params();
        let [n_p, n_r, n_b] = self.group_sizes();
        let proteins = (p.ap.norm() + p.bp.norm()) / n_p;
        let rnas     = (p.ar.norm() + p.br.norm()) / n_r;
        let general  = p.b.norm() / n_b;
        (proteins + rnas + general) / 3.0
    }

    /// Gradient of the batch cost, laid out like the parameters.
    pub fn gradient(
        &self,
        protein_features: &[f32],
        rna_features:     &[f32],
        labels:           &[f32],
    ) -> FactorResult<ModelParams> {
        let k = self.check_inputs(protein_features, rna_features, Some(labels))?;
        if k == 0 {
            let mut zero = self.get_params();
            for name in ModelParams::NAMES {
                if let Some(array) = zero.get_mut(name) {
                    array.values.iter_mut().for_each(|v| *v = 0.0);
                }
            }
            return Ok(zero);
        }

        let (fp, fr) = self.inputs(protein_features, rna_features, k);
        let y        = Tensor::<B, 1>::from_data(TensorData::new(labels.to_vec(), [k]), &self.device);
        let fwd      = self.forward(fp.clone(), fr.clone());
        let grads    = self.backward(fp, fr, y, &fwd);

        let (sp, sr) = (self.config.protein_latent, self.config.rna_latent);
        Ok(ModelParams {
            ap: ParamArray::new(vec![sp, self.protein_dim], read(grads.ap)),
            bp: ParamArray::new(vec![sp], read(grads.bp)),
            ar: ParamArray::new(vec![sr, self.rna_dim], read(grads.ar)),
            br: ParamArray::new(vec![sr], read(grads.br)),
            b:  ParamArray::new(vec![sp, sr], read(grads.b)),
        })
    }

    // ── internals ─────────────────────────────────────────────────────────────

    /// Validates the flat row buffers and returns the row count k.
    fn check_inputs(
        &self,
        protein_features: &[f32],
        rna_features:     &[f32],
        labels:           Option<&[f32]>,
    ) -> FactorResult<usize> {
        let (n, m) = (self.protein_dim, self.rna_dim);
        if protein_features.len() % n != 0 {
            return Err(FactorError::shape(
                "protein features",
                format!("k x {n} values"),
                format!("{} values", protein_features.len()),
            ));
        }
        let k = protein_features.len() / n;
        if rna_features.len() != k * m {
            return Err(FactorError::shape(
                "RNA features",
                format!("{k} x {m} values"),
                format!("{} values", rna_features.len()),
            ));
        }
        if let Some(labels) = labels {
            if labels.len() != k {
                return Err(FactorError::shape("labels", k, labels.len()));
            }
        }
        Ok(k)
    }

    fn inputs(&self, protein_features: &[f32], rna_features: &[f32], k: usize) -> (Tensor<B, 2>, Tensor<B, 2>) {
        let fp = TensorData::new(protein_features.to_vec(), [k, self.protein_dim]);
        let fr = TensorData::new(rna_features.to_vec(), [k, self.rna_dim]);
        (
            Tensor::from_data(fp, &self.device),
            Tensor::from_data(fr, &self.device),
        )
    }

    fn forward(&self, fp: Tensor<B, 2>, fr: Tensor<B, 2>) -> Forward<B> {
        let [k, _] = fp.dims();
        let (sp, sr) = (self.config.protein_latent, self.config.rna_latent);

        let bp = self.bp.clone().unsqueeze::<2>().expand([k, sp]);
        let br = self.br.clone().unsqueeze::<2>().expand([k, sr]);

        let p = sigmoid(fp.matmul(self.ap.clone().transpose()) + bp);
        let r = sigmoid(fr.matmul(self.ar.clone().transpose()) + br);
        let q = p.clone().matmul(self.b.clone()); // [k, sr]

        let score = (q.clone() * r.clone()).sum_dim(1).reshape([k]);
        Forward { p, r, q, y_hat: sigmoid(score) }
    }

    fn backward(
        &self,
        fp:  Tensor<B, 2>,
        fr:  Tensor<B, 2>,
        y:   Tensor<B, 1>,
        fwd: &Forward<B>,
    ) -> Gradients<B> {
        let [k, _] = fp.dims();
        let (sp, sr) = (self.config.protein_latent, self.config.rna_latent);

        let y_hat  = fwd.y_hat.clone();
        let d_yhat = (y_hat.clone() - y).mul_scalar(2.0 / k as f64);
        let d_s    = d_yhat * y_hat.clone() * y_hat.neg().add_scalar(1.0);
        let d_s    = d_s.reshape([k, 1]).expand([k, sr]);

        let d_q = d_s.clone() * fwd.r.clone();
        let d_r = d_s * fwd.q.clone();

        let g_b = fwd.p.clone().transpose().matmul(d_q.clone());
        let d_p = d_q.matmul(self.b.clone().transpose());

        let d_zp = d_p * fwd.p.clone() * fwd.p.clone().neg().add_scalar(1.0);
        let d_zr = d_r * fwd.r.clone() * fwd.r.clone().neg().add_scalar(1.0);

        let g_ap = d_zp.clone().transpose().matmul(fp);
        let g_bp = d_zp.sum_dim(0).reshape([sp]);
        let g_ar = d_zr.clone().transpose().matmul(fr);
        let g_br = d_zr.sum_dim(0).reshape([sr]);

        let [n_p, n_r, n_b] = self.group_sizes();
        let scale = self.config.lambda_reg / 3.0;

        Gradients {
            ap: g_ap + norm_gradient(&self.ap, scale / n_p),
            bp: g_bp + norm_gradient(&self.bp, scale / n_p),
            ar: g_ar + norm_gradient(&self.ar, scale / n_r),
            br: g_br + norm_gradient(&self.br, scale / n_r),
            b:  g_b + norm_gradient(&self.b, scale / n_b),
        }
    }

    fn cost(&self, predictions: &[f32], labels: &[f32]) -> f64 {
        let k   = predictions.len() as f64;
        let mse = predictions
            .iter()
            .zip(labels)
            .map(|(&h, &y)| (f64::from(h) - f64::from(y)).powi(2))
            .sum::<f64>()
            / k;
        mse + self.config.lambda_reg * self.regularization()
    }

    /// Element counts of the three regularization groups.
    fn group_sizes(&self) -> [f64; 3] {
        let (sp, sr) = (self.config.protein_latent, self.config.rna_latent);
        [
            (sp * self.protein_dim + sp) as f64,
            (sr * self.rna_dim + sr) as f64,
            (sp * sr) as f64,
        ]
    }
}

// ─── Tensor helpers ───────────────────────────────────────────────────────────

fn tensor2<B: Backend>(array: &ParamArray, device: &B::Device) -> Tensor<B, 2> {
    let data = TensorData::new(array.values.clone(), [array.shape[0], array.shape[1]]);
    Tensor::from_data(data, device)
}

fn tensor1<B: Backend>(array: &ParamArray, device: &B::Device) -> Tensor<B, 1> {
    let data = TensorData::new(array.values.clone(), [array.shape[0]]);
    Tensor::from_data(data, device)
}

fn read<B: Backend, const D: usize>(tensor: Tensor<B, D>) -> Vec<f32> {
    tensor.into_data().iter::<f32>().collect()
}

fn norm<B: Backend, const D: usize>(tensor: &Tensor<B, D>) -> f64 {
    let squared = (tensor.clone() * tensor.clone()).sum().into_scalar().elem::<f64>();
    squared.sqrt()
}

/// `scale · X / ‖X‖`; the norm has no gradient at zero, so a zero
/// tensor contributes nothing.
fn norm_gradient<B: Backend, const D: usize>(tensor: &Tensor<B, D>, scale: f64) -> Tensor<B, D> {
    let n = norm(tensor);
    let factor = if n > 0.0 { scale / n } else { 0.0 };
    tensor.clone().mul_scalar(factor)
}

fn expect_shape(array: &ParamArray, name: &str, shape: &[usize]) -> FactorResult<()> {
    if array.shape != shape || array.len() != shape.iter().product::<usize>() {
        return Err(FactorError::shape(
            format!("parameter {name}"),
            format!("{shape:?}"),
            format!("{:?} with {} values", array.shape, array.len()),
        ));
    }
    Ok(())
}

/// Checks a projection is `rows × c` for some positive c and returns c.
fn matrix_cols(array: &ParamArray, name: &str, rows: usize) -> FactorResult<usize> {
    match array.shape.as_slice() {
        &[r, c] if r == rows && c > 0 && array.len() == r * c => Ok(c),
        _ => Err(FactorError::shape(
            format!("parameter {name}"),
            format!("[{rows}, n]"),
            format!("{:?} with {} values", array.shape, array.len()),
        )),
    }
}
