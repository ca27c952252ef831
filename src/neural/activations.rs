pub trait Activation {
    /// Returns activation function at x
    fn call(&self, x: f64) -> f64;
    /// Returns derivative of activation function with respect to the
    /// pre-activation sum x, not the activated output.
    fn derivative(&self, x: f64) -> f64;
}

/// Rectified linear unit, `max(0, x)`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ReLU;

impl Activation for ReLU {
    fn call(&self, x: f64) -> f64 {
        x.max(0.0)
    }

    fn derivative(&self, x: f64) -> f64 {
        if x > 0.0 {
            1.0
        } else {
            0.0
        }
    }
}
