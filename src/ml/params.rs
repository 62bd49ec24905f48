use serde::{Deserialize, Serialize};

/// One named parameter tensor copied out of the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamArray {
    pub shape:  Vec<usize>,
    /// Row-major values
    pub values: Vec<f32>,
}

impl ParamArray {
    pub fn new(shape: Vec<usize>, values: Vec<f32>) -> Self {
        Self { shape, values }
    }

    pub fn zeros(shape: Vec<usize>) -> Self {
        let len = shape.iter().product();
        Self { shape, values: vec![0.0; len] }
    }

    pub(crate) fn len(&self) -> usize {
        self.values.len()
    }

    /// Frobenius norm, accumulated in f64.
    pub fn norm(&self) -> f64 {
        self.values
            .iter()
            .map(|&v| f64::from(v).powi(2))
            .sum::<f64>()
            .sqrt()
    }
}

/// Snapshot of all five model parameters, keyed by their
/// conventional names when serialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelParams {
    /// Protein projection, sp × n
    #[serde(rename = "Ap")]
    pub ap: ParamArray,
    /// Protein bias, sp
    #[serde(rename = "bp")]
    pub bp: ParamArray,
    /// RNA projection, sr × m
    #[serde(rename = "Ar")]
    pub ar: ParamArray,
    /// RNA bias, sr
    #[serde(rename = "br")]
    pub br: ParamArray,
    /// Generalization matrix, sp × sr
    #[serde(rename = "B")]
    pub b: ParamArray,
}

impl ModelParams {
    pub const NAMES: [&'static str; 5] = ["Ap", "bp", "Ar", "br", "B"];

    pub fn get(&self, name: &str) -> Option<&ParamArray> {
        match name {
            "Ap" => Some(&self.ap),
            "bp" => Some(&self.bp),
            "Ar" => Some(&self.ar),
            "br" => Some(&self.br),
            "B" => Some(&self.b),
            _ => None,
        }
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut ParamArray> {
        match name {
            "Ap" => Some(&mut self.ap),
            "bp" => Some(&mut self.bp),
            "Ar" => Some(&mut self.ar),
            "br" => Some(&mut self.br),
            "B" => Some(&mut self.b),
            _ => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &ParamArray)> {
        [&self.ap, &self.bp, &self.ar, &self.br, &self.b]
            .into_iter()
            .zip(Self::NAMES)
            .map(|(array, name)| (name, array))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ModelParams {
        ModelParams {
            ap: ParamArray::new(vec![1, 2], vec![3.0, 4.0]),
            bp: ParamArray::zeros(vec![1]),
            ar: ParamArray::new(vec![1, 1], vec![1.0]),
            br: ParamArray::zeros(vec![1]),
            b:  ParamArray::new(vec![1, 1], vec![-2.0]),
        }
    }

    #[test]
    fn test_norm() {
        assert_eq!(sample().ap.norm(), 5.0);
        assert_eq!(sample().bp.norm(), 0.0);
    }

    #[test]
    fn test_serialized_names() {
        let json = serde_json::to_value(sample()).unwrap();
        for name in ModelParams::NAMES {
            assert!(json.get(name).is_some(), "missing {name}");
        }
        assert_eq!(json["Ap"]["shape"], serde_json::json!([1, 2]));
    }

    #[test]
    fn test_lookup_by_name() {
        let mut p = sample();
        assert_eq!(p.get("B").unwrap().values, vec![-2.0]);
        p.get_mut("bp").unwrap().values[0] = 1.5;
        assert_eq!(p.bp.values, vec![1.5]);
        assert!(p.get("C").is_none());
        assert_eq!(p.iter().map(|(n, _)| n).collect::<Vec<_>>(), ModelParams::NAMES.to_vec());
    }
}
