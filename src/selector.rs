use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;

use crate::error::{Axis, SynthError, SynthResult};

/// Picks one value with probability `weight / sum(weights)`.
///
/// Negative, NaN and infinite weights are treated as zero. An empty list, or
/// one where every weight is zero, is an `EmptyCandidateSet` on `axis`.
pub fn select<'a, T, R>(axis: Axis, items: &'a [(T, f64)], rng: &mut R) -> SynthResult<&'a T>
where
    R: Rng + ?Sized,
{
    let weights = items.iter().map(|(_, weight)| sanitize(*weight));
    let dist =
        WeightedIndex::<f64>::new(weights).map_err(|_| SynthError::EmptyCandidateSet(axis))?;

    Ok(&items[dist.sample(rng)].0)
}

fn sanitize(weight: f64) -> f64 {
    if weight.is_finite() && weight > 0.0 {
        weight
    } else {
        0.0
    }
}

/// A named set of weighted candidates one choice is made from per generation.
#[derive(Debug, Clone)]
pub struct SelectionAxis<T> {
    axis: Axis,
    candidates: Vec<(T, f64)>,
}

impl<T> SelectionAxis<T> {
    pub fn new(axis: Axis) -> Self {
        Self {
            axis,
            candidates: Vec::new(),
        }
    }

    /// Every candidate gets the same weight.
    pub fn uniform<I>(axis: Axis, items: I) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        Self::weighted(axis, items, |_| 1.0)
    }

    pub fn weighted<I, F>(axis: Axis, items: I, weight: F) -> Self
    where
        I: IntoIterator<Item = T>,
        F: Fn(&T) -> f64,
    {
        let candidates = items
            .into_iter()
            .map(|item| {
                let w = weight(&item);
                (item, w)
            })
            .collect();

        Self { axis, candidates }
    }

    pub fn push(&mut self, item: T, weight: f64) {
        self.candidates.push((item, weight));
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn select<R>(&self, rng: &mut R) -> SynthResult<&T>
    where
        R: Rng + ?Sized,
    {
        select(self.axis, &self.candidates, rng)
    }
}
