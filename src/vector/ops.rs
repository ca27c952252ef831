use super::ensure_len;
use crate::prelude::*;

pub trait Dot<I> {
    type Output;
    fn dot(self, rhs: I) -> Result<Self::Output>;
}

/// Checked dot product of two equally long slices.
impl<'a> Dot<&[f64]> for &'a [f64] {
    type Output = f64;
    fn dot(self, rhs: &[f64]) -> Result<Self::Output> {
        ensure_len(rhs, self.len())?;

        let mut sum = 0.0;
        for i in 0..self.len() {
            sum += self[i] * rhs[i];
        }
        Ok(sum)
    }
}
