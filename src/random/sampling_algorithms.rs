//! Weighted (categorical) sampling over data-driven distributions.

use crate::rand::distr::weighted::{Error as WeightError, WeightedIndex};
use crate::rand::distr::Distribution;
use crate::rand::Rng;

/// Draws one outcome from a mapping of outcome to weight.
///
/// Weights need not sum to one, but they must be finite, non-negative and
/// not all zero. The outcomes are visited in the iteration order of `weights`,
/// so callers that need reproducible draws must pass an ordered mapping
/// (e.g. a `BTreeMap`). A distribution with a single non-zero weight always
/// returns that outcome.
pub fn sample_categorical<'a, K, I, R>(rng: &mut R, weights: I) -> Result<K, WeightError>
where
    K: Copy + 'a,
    I: IntoIterator<Item = (&'a K, &'a f64)>,
    R: Rng + ?Sized,
{
    let (outcomes, weights): (Vec<K>, Vec<f64>) = weights
        .into_iter()
        .map(|(outcome, weight)| (*outcome, *weight))
        .unzip();
    let index = WeightedIndex::new(&weights)?;
    Ok(outcomes[index.sample(rng)])
}
