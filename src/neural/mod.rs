pub mod activations;
pub mod layer;
pub mod unit;
pub mod utils;

use crate::prelude::*;
use crate::vector::{argmax, cross_entropy, ensure_len, softmax};
use log::{debug, log_enabled, trace, Level};
use rand::{rngs::StdRng, Rng, SeedableRng};

use self::layer::DenseLayer;
use self::utils::Trace;

/// Shape descriptor of a network: the input width and the neuron count of
/// every layer, in order. The last entry is the number of classes.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    pub input_size: usize,
    pub layer_sizes: Vec<usize>,
}

impl Shape {
    pub fn new(input_size: usize, layer_sizes: &[usize]) -> Self {
        Self {
            input_size,
            layer_sizes: layer_sizes.to_vec(),
        }
    }

    /// Returns an InvalidShape if the input or any layer is empty, or there
    /// are no layers at all.
    pub fn validate(&self) -> Result<()> {
        if self.input_size == 0 {
            return Err(Error::InvalidShape("network needs at least one input".into()));
        }
        if self.layer_sizes.is_empty() {
            return Err(Error::InvalidShape("network needs at least one layer".into()));
        }
        if let Some(l) = self.layer_sizes.iter().position(|&n| n == 0) {
            return Err(Error::InvalidShape(format!("layer {l} has no neurons")));
        }
        Ok(())
    }

    pub fn output_size(&self) -> usize {
        self.layer_sizes.last().copied().unwrap_or(0)
    }
}

/// A feedforward classifier: dense ReLU layers followed by a softmax.
#[derive(Debug, Clone, PartialEq)]
pub struct NeuralNet {
    layers: Vec<DenseLayer>,
}

impl NeuralNet {
    /// Creates a network of the given shape with every parameter drawn from
    /// `rng`.
    pub fn new<R: Rng + ?Sized>(shape: &Shape, rng: &mut R) -> Result<Self> {
        shape.validate()?;

        let mut layers = Vec::with_capacity(shape.layer_sizes.len());
        let mut n_inputs = shape.input_size;
        for &n_neurons in &shape.layer_sizes {
            layers.push(DenseLayer::new(n_inputs, n_neurons, rng)?);
            n_inputs = n_neurons;
        }

        debug!(
            "initialized network: {} inputs, layers {:?}",
            shape.input_size, shape.layer_sizes
        );
        Ok(Self { layers })
    }

    /// Creates a network from a fixed seed. The same seed and shape always
    /// give the same parameters.
    pub fn seeded(shape: &Shape, seed: u64) -> Result<Self> {
        Self::new(shape, &mut StdRng::seed_from_u64(seed))
    }

    /// Builds a network from explicit layers, checking that each layer's
    /// input width matches the size of the layer before it.
    pub fn from_layers(input_size: usize, layers: Vec<DenseLayer>) -> Result<Self> {
        if layers.is_empty() {
            return Err(Error::InvalidShape("network needs at least one layer".into()));
        }

        let mut width = input_size;
        for (l, layer) in layers.iter().enumerate() {
            if layer.input_width() != width {
                return Err(Error::InvalidShape(format!(
                    "layer {l} takes {} inputs, previous width is {width}",
                    layer.input_width()
                )));
            }
            width = layer.size();
        }
        Ok(Self { layers })
    }

    /// Reset every parameter with a fresh Xavier draw from `rng`.
    pub fn randomize<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<()> {
        *self = Self::new(&self.shape(), rng)?;
        Ok(())
    }

    pub fn layers(&self) -> &[DenseLayer] {
        &self.layers
    }

    /// Returns the size of the input to the network.
    pub fn input_size(&self) -> usize {
        self.layers[0].input_width()
    }

    /// Returns the number of classes the network predicts.
    pub fn output_size(&self) -> usize {
        self.layers[self.layers.len() - 1].size()
    }

    pub fn shape(&self) -> Shape {
        Shape {
            input_size: self.input_size(),
            layer_sizes: self.layers.iter().map(|l| l.size()).collect(),
        }
    }

    /// Propogates an input through every layer, recording each layer's raw
    /// output.
    pub fn forward(&self, input: &[f64]) -> Result<Trace> {
        ensure_len(input, self.input_size())?;

        let mut trace = Trace::with_input(input, self.layers.len());
        for layer in &self.layers {
            let output = layer.feed_forward(trace.output())?;
            trace.push(output);
        }
        Ok(trace)
    }

    /// Returns the predicted probability of every class for `input`.
    pub fn feed_forward(&self, input: &[f64]) -> Result<Vec<f64>> {
        Ok(softmax(self.forward(input)?.output()))
    }

    /// Returns the most probable class for `input`.
    pub fn predict(&self, input: &[f64]) -> Result<usize> {
        let probs = self.feed_forward(input)?;
        // feed_forward never returns an empty distribution
        Ok(argmax(&probs).unwrap_or(0))
    }

    /// Runs one gradient descent step for a single labelled example.
    ///
    /// `predicted` is the output of `feed_forward(input)`. The output error is
    /// the softmax + cross-entropy gradient `predicted - one_hot(label)`; the
    /// layer activations are recomputed from `input` and the error is then
    /// fed from the last layer back to the first.
    pub fn backpropagate(
        &mut self,
        input: &[f64],
        predicted: &[f64],
        label: usize,
        rate: f64,
    ) -> Result<()> {
        ensure_len(predicted, self.output_size())?;
        if label >= predicted.len() {
            return Err(Error::LabelOutOfRange {
                label,
                outputs: predicted.len(),
            });
        }
        let trace = self.forward(input)?;

        let mut errors: Vec<f64> = predicted
            .iter()
            .enumerate()
            .map(|(i, &p)| if i == label { p - 1.0 } else { p })
            .collect();

        for (l, layer) in self.layers.iter_mut().enumerate().rev() {
            errors = layer.backpropagate(trace.input_of(l), &errors, rate)?;
        }

        if log_enabled!(Level::Trace) {
            trace!(
                "backpropagated label {label}, loss {:.6}",
                cross_entropy(predicted, label)?
            );
        }
        Ok(())
    }

    /// Predicts `input`, applies one backpropagation step towards `label` and
    /// returns the cross-entropy loss of the prediction made before the step.
    pub fn train_step(&mut self, input: &[f64], label: usize, rate: f64) -> Result<f64> {
        let predicted = self.feed_forward(input)?;
        let loss = cross_entropy(&predicted, label)?;
        self.backpropagate(input, &predicted, label, rate)?;
        Ok(loss)
    }
}
