/// Activations recorded by one forward pass.
///
/// Index 0 holds the network input, index `l + 1` the raw output of layer `l`
/// (before the final softmax). Layer `l` is therefore fed by `input_of(l)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Trace(Vec<Vec<f64>>);

impl Trace {
    pub fn with_input(input: &[f64], n_layers: usize) -> Self {
        let mut acts = Vec::with_capacity(n_layers + 1);
        acts.push(input.to_vec());
        Trace(acts)
    }

    pub fn push(&mut self, output: Vec<f64>) {
        self.0.push(output);
    }

    /// The vector that fed `layer` on the forward pass.
    pub fn input_of(&self, layer: usize) -> &[f64] {
        &self.0[layer]
    }

    /// Raw output of the last layer, or the input if no layer has run yet.
    pub fn output(&self) -> &[f64] {
        &self.0[self.0.len() - 1]
    }

    /// Every recorded vector, the input first.
    pub fn activations(&self) -> &[Vec<f64>] {
        &self.0
    }

    /// Number of layers recorded, not counting the input.
    pub fn layers(&self) -> usize {
        self.0.len() - 1
    }
}
