//! Weighted selection from a single uniform draw

use crate::error::CatalogError;
use rand::Rng;

/// Cumulative weight boundaries over a fixed item order.
///
/// Selection draws one integer in `[0, total)` and walks the boundaries in
/// order, so long-run frequencies converge to `weight / total`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeightedTable {
    cumulative: Vec<u64>,
}

impl WeightedTable {
    /// Build a table from `(name, weight)` pairs. Names are used only for errors.
    pub fn new<'a, I>(weights: I) -> Result<Self, CatalogError>
    where
        I: IntoIterator<Item = (&'a str, u32)>,
    {
        let mut cumulative = Vec::new();
        let mut running = 0u64;

        for (name, weight) in weights {
            if weight == 0 {
                return Err(CatalogError::ZeroWeight(name.to_string()));
            }
            running += u64::from(weight);
            cumulative.push(running);
        }

        if cumulative.is_empty() {
            return Err(CatalogError::Empty);
        }

        Ok(Self { cumulative })
    }

    /// Sum of all weights
    pub fn total(&self) -> u64 {
        self.cumulative.last().copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.cumulative.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cumulative.is_empty()
    }

    /// Index of the item whose cumulative range contains `draw`.
    ///
    /// `draw` must be below [`total`](Self::total); larger values clamp to the last item.
    pub fn index_for(&self, draw: u64) -> usize {
        let index = self.cumulative.partition_point(|&bound| bound <= draw);
        index.min(self.cumulative.len() - 1)
    }

    /// Pick an index using one draw from `rng`
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        let draw = rng.random_range(0..self.total());
        self.index_for(draw)
    }
}
