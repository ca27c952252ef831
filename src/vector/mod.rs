use crate::prelude::*;

pub mod ops;

/// Returns a `DimensionMismatch` unless `slice` holds exactly `expected` values.
pub fn ensure_len<T>(slice: &[T], expected: usize) -> Result<()> {
    if slice.len() != expected {
        return Err(Error::DimensionMismatch {
            expected,
            actual: slice.len(),
        });
    }
    Ok(())
}

/// Normalizes raw outputs into a probability distribution.
///
/// The largest value is subtracted before exponentiating, which leaves the
/// result unchanged but keeps `exp` from overflowing.
pub fn softmax(values: &[f64]) -> Vec<f64> {
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    let mut exps = Vec::with_capacity(values.len());
    let mut sum = 0.0;
    for &x in values {
        let e = (x - max).exp();
        sum += e;
        exps.push(e);
    }

    for e in exps.iter_mut() {
        *e /= sum;
    }
    exps
}

/// Categorical cross-entropy of a single prediction against a class label.
/// Returns a LabelOutOfRange if `label` does not index into `predicted`.
pub fn cross_entropy(predicted: &[f64], label: usize) -> Result<f64> {
    match predicted.get(label) {
        Some(&p) => Ok(-p.clamp(1e-7, 1.0).ln()),
        None => Err(Error::LabelOutOfRange {
            label,
            outputs: predicted.len(),
        }),
    }
}

/// Index of the largest value, first one wins on ties.
pub fn argmax(values: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &x) in values.iter().enumerate() {
        match best {
            Some((_, b)) if b >= x => {}
            _ => best = Some((i, x)),
        }
    }
    best.map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_len_err() {
        assert_eq!(ensure_len(&[1.0, 2.0], 2), Ok(()));
        assert_eq!(
            ensure_len(&[1.0, 2.0], 3),
            Err(Error::DimensionMismatch {
                expected: 3,
                actual: 2
            })
        );
    }

    #[test]
    fn softmax_sums_to_one() {
        let out = softmax(&[1.0, 2.0, 3.0]);

        let sum: f64 = out.iter().sum();
        assert!((sum - 1.0).abs() < 1e-9);
        assert!(out[0] < out[1] && out[1] < out[2]);
        assert!((out[2] - 0.665240955).abs() < 1e-6);
    }

    #[test]
    fn softmax_large_values() {
        let out = softmax(&[1000.0, 1000.0]);
        assert_eq!(out, vec![0.5, 0.5]);
    }

    #[test]
    fn softmax_single_value() {
        assert_eq!(softmax(&[-3.5]), vec![1.0]);
    }

    #[test]
    fn categorical_cross_entropy() {
        let loss = cross_entropy(&[0.25, 0.75], 1).unwrap();
        assert!((loss - 0.287682072).abs() < 1e-6);

        // Zero probabilities are clamped instead of producing infinity
        let loss = cross_entropy(&[1.0, 0.0], 1).unwrap();
        assert!(loss.is_finite() && loss > 16.0);

        assert_eq!(
            cross_entropy(&[0.7, 0.3], 2),
            Err(Error::LabelOutOfRange {
                label: 2,
                outputs: 2
            })
        );
    }

    #[test]
    fn argmax_picks_first_max() {
        assert_eq!(argmax(&[0.1, 0.6, 0.6, 0.2]), Some(1));
        assert_eq!(argmax(&[]), None);
    }
}
