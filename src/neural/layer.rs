use crate::prelude::*;
use crate::vector::ensure_len;
use rand::Rng;

use super::unit::Unit;

/// A fully connected layer of ReLU units sharing one input width.
#[derive(Debug, Clone, PartialEq)]
pub struct DenseLayer {
    units: Vec<Unit>,
}

impl DenseLayer {
    /// Initializes a layer given the number of inputs and neurons.
    /// Every unit is drawn with Xavier initialization from `rng`.
    pub fn new<R: Rng + ?Sized>(n_inputs: usize, n_neurons: usize, rng: &mut R) -> Result<Self> {
        if n_neurons == 0 {
            return Err(Error::InvalidShape("layer needs at least one neuron".into()));
        }

        let units = (0..n_neurons)
            .map(|_| Unit::xavier(n_inputs, rng))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { units })
    }

    /// Builds a layer from explicit units, which must all share one input width.
    pub fn from_units(units: Vec<Unit>) -> Result<Self> {
        let width = match units.first() {
            Some(unit) => unit.input_width(),
            None => return Err(Error::InvalidShape("layer needs at least one neuron".into())),
        };
        if width == 0 {
            return Err(Error::InvalidShape("unit needs at least one input".into()));
        }
        if let Some(n) = units.iter().position(|u| u.input_width() != width) {
            return Err(Error::InvalidShape(format!(
                "unit {n} takes {} inputs, expected {width}",
                units[n].input_width()
            )));
        }
        Ok(Self { units })
    }

    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    /// Returns the amount of neurons in the layer
    pub fn size(&self) -> usize {
        self.units.len()
    }

    /// Returns the amount of inputs this layer accepts
    pub fn input_width(&self) -> usize {
        self.units[0].input_width()
    }

    /// Propogates an input through every unit of the layer.
    pub fn feed_forward(&self, input: &[f64]) -> Result<Vec<f64>> {
        ensure_len(input, self.input_width())?;
        self.units.iter().map(|u| u.feed_forward(input)).collect()
    }

    /// Updates every unit from `error_signals`, the loss gradient with respect
    /// to this layer's outputs, and returns the loss gradient with respect to
    /// `input` for the layer before it.
    ///
    /// `input` must be the vector that fed this layer on the forward pass.
    /// Upstream error is accumulated from each unit's weights before that
    /// unit is updated.
    pub fn backpropagate(
        &mut self,
        input: &[f64],
        error_signals: &[f64],
        rate: f64,
    ) -> Result<Vec<f64>> {
        ensure_len(input, self.input_width())?;
        ensure_len(error_signals, self.size())?;

        let mut next_errors = vec![0.0; input.len()];
        for (unit, &error) in self.units.iter_mut().zip(error_signals) {
            let grad = unit.gradient(input, error)?;
            // grad.bias is the local gradient (error times ReLU derivative),
            // not the raw error signal, so the result is the exact gradient
            // with respect to `input`.
            for (next, w) in next_errors.iter_mut().zip(unit.weights()) {
                *next += w * grad.bias;
            }
            unit.apply(&grad, rate)?;
        }
        Ok(next_errors)
    }
}
