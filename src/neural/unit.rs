use crate::prelude::*;
use crate::vector::{ensure_len, ops::Dot};
use rand::distributions::{Distribution, Uniform};
use rand::Rng;

use super::activations::{Activation, ReLU};

/// Trainable parameters of a single unit.
#[derive(Debug, Clone, PartialEq)]
pub struct Params {
    pub weights: Vec<f64>,
    pub bias: f64,
}

/// Gradient of the loss with respect to a unit's parameters.
///
/// `bias` is also the local gradient of the unit: the incoming error signal
/// scaled by the activation derivative.
#[derive(Debug, Clone, PartialEq)]
pub struct Gradient {
    pub weights: Vec<f64>,
    pub bias: f64,
}

impl Params {
    /// One gradient descent step, `p - rate * grad`.
    /// Returns a DimensionMismatch if the gradient has a different weight count.
    pub fn update(&self, grad: &Gradient, rate: f64) -> Result<Params> {
        ensure_len(&grad.weights, self.weights.len())?;
        Ok(Params {
            weights: self
                .weights
                .iter()
                .zip(&grad.weights)
                .map(|(w, g)| w - rate * g)
                .collect(),
            bias: self.bias - rate * grad.bias,
        })
    }
}

/// A single weighted-sum-plus-ReLU node.
#[derive(Debug, Clone, PartialEq)]
pub struct Unit {
    params: Params,
}

impl Unit {
    /// Creates a unit with the given weights and bias.
    pub fn new(weights: Vec<f64>, bias: f64) -> Self {
        Self {
            params: Params { weights, bias },
        }
    }

    /// Xavier initialization: weights uniform in `±sqrt(6 / n_inputs)`, bias 0.
    /// Returns an InvalidShape if `n_inputs` is 0.
    pub fn xavier<R: Rng + ?Sized>(n_inputs: usize, rng: &mut R) -> Result<Self> {
        if n_inputs == 0 {
            return Err(Error::InvalidShape("unit needs at least one input".into()));
        }

        let range = (6.0 / n_inputs as f64).sqrt();
        let die = Uniform::from(-range..=range);
        let weights = (0..n_inputs).map(|_| die.sample(rng)).collect();

        Ok(Self::new(weights, 0.0))
    }

    pub fn weights(&self) -> &[f64] {
        &self.params.weights
    }

    pub fn bias(&self) -> f64 {
        self.params.bias
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Returns the amount of inputs this unit accepts
    pub fn input_width(&self) -> usize {
        self.params.weights.len()
    }

    /// Pre-activation sum `bias + weights · input`.
    fn weighted_sum(&self, input: &[f64]) -> Result<f64> {
        Ok(self.params.bias + self.weights().dot(input)?)
    }

    pub fn feed_forward(&self, input: &[f64]) -> Result<f64> {
        Ok(ReLU.call(self.weighted_sum(input)?))
    }

    /// Computes the parameter gradient for `error_signal`, the gradient of the
    /// loss with respect to this unit's output, without changing the unit.
    pub fn gradient(&self, input: &[f64], error_signal: f64) -> Result<Gradient> {
        ensure_len(input, self.input_width())?;

        let local = error_signal * ReLU.derivative(self.weighted_sum(input)?);
        Ok(Gradient {
            weights: input.iter().map(|x| local * x).collect(),
            bias: local,
        })
    }

    /// Applies a gradient computed by [`Unit::gradient`].
    /// The unit is left unchanged if the gradient does not match its width.
    pub fn apply(&mut self, grad: &Gradient, rate: f64) -> Result<()> {
        self.params = self.params.update(grad, rate)?;
        Ok(())
    }

    /// Computes and applies one gradient descent step, returning the gradient
    /// that was applied. The gradient is evaluated with the parameters as
    /// they were before the step.
    pub fn backpropagate(
        &mut self,
        input: &[f64],
        error_signal: f64,
        rate: f64,
    ) -> Result<Gradient> {
        let grad = self.gradient(input, error_signal)?;
        self.apply(&grad, rate)?;
        Ok(grad)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    const EPS: f64 = 1e-3;

    #[test]
    fn feed_positive() {
        let unit = Unit::new(vec![0.2, 0.8, -0.5], 2.0);
        let out = unit.feed_forward(&[1.0, 2.0, 3.0]).unwrap();
        assert!((out - 2.3).abs() < EPS);
    }

    #[test]
    fn negative_output_relu() {
        let unit = Unit::new(vec![-0.2, -0.8, -0.5], -1.0);
        let out = unit.feed_forward(&[1.0, 2.0, 3.0]).unwrap();
        assert!(out.abs() < EPS);
    }

    #[test]
    fn zero_bias() {
        let unit = Unit::new(vec![0.5, 0.5], 0.0);
        let out = unit.feed_forward(&[1.0, 1.0]).unwrap();
        assert!((out - 1.0).abs() < EPS);
    }

    #[test]
    fn feed_wrong_width() {
        let unit = Unit::new(vec![0.5, 0.5], 0.0);
        assert_eq!(
            unit.feed_forward(&[1.0, 1.0, 1.0]),
            Err(Error::DimensionMismatch {
                expected: 2,
                actual: 3
            })
        );
    }

    #[test]
    fn params_update() {
        let params = Params {
            weights: vec![1.0, -1.0],
            bias: 0.5,
        };
        let grad = Gradient {
            weights: vec![2.0, 4.0],
            bias: -1.0,
        };

        let next = params.update(&grad, 0.5).unwrap();

        assert_eq!(next.weights, vec![0.0, -3.0]);
        assert_eq!(next.bias, 1.0);
        // The old parameters are untouched
        assert_eq!(params.weights, vec![1.0, -1.0]);
    }

    #[test]
    fn apply_wrong_width() {
        let mut unit = Unit::new(vec![1.0, 2.0, 3.0], 0.0);
        let before = unit.clone();
        let grad = Gradient {
            weights: vec![0.5],
            bias: 0.0,
        };

        assert_eq!(
            unit.apply(&grad, 1.0),
            Err(Error::DimensionMismatch {
                expected: 3,
                actual: 1
            })
        );
        assert_eq!(unit, before);
        assert_eq!(unit.input_width(), 3);
        assert!(unit.params().update(&grad, 1.0).is_err());
    }

    #[test]
    fn backpropagate_active() {
        let mut unit = Unit::new(vec![0.5, -0.25], 0.1);
        let input = [2.0, 1.0];

        let grad = unit.backpropagate(&input, 0.5, 0.1).unwrap();

        assert_eq!(grad.bias, 0.5);
        assert_eq!(grad.weights, vec![1.0, 0.5]);
        assert!((unit.weights()[0] - 0.4).abs() < 1e-12);
        assert!((unit.weights()[1] + 0.3).abs() < 1e-12);
        assert!((unit.bias() - 0.05).abs() < 1e-12);
    }

    #[test]
    fn backpropagate_inactive() {
        // Weighted sum is negative, so ReLU passes no gradient
        let mut unit = Unit::new(vec![-0.5, -0.25], 0.1);
        let before = unit.clone();

        let grad = unit.backpropagate(&[2.0, 1.0], 0.5, 0.1).unwrap();

        assert_eq!(grad.bias, 0.0);
        assert_eq!(grad.weights, vec![0.0, 0.0]);
        assert_eq!(unit, before);
    }

    #[test]
    fn backpropagate_wrong_width() {
        let mut unit = Unit::new(vec![0.5, 0.5], 0.0);
        let before = unit.clone();

        assert!(unit.backpropagate(&[1.0], 1.0, 0.1).is_err());
        assert_eq!(unit, before);
    }

    #[test]
    fn xavier_range() {
        let mut rng = StdRng::seed_from_u64(7);
        let unit = Unit::xavier(6, &mut rng).unwrap();

        assert_eq!(unit.input_width(), 6);
        assert_eq!(unit.bias(), 0.0);
        assert!(unit.weights().iter().all(|w| w.abs() <= 1.0));

        assert_eq!(
            Unit::xavier(0, &mut rng),
            Err(Error::InvalidShape("unit needs at least one input".into()))
        );
    }
}
