use std::ops::Range;

use crate::model::Difficulty;

/// Contiguous, fixed-size range of slots in a category pool.
///
/// The size does not depend on how many records were actually loaded;
/// slots without a valid record are simply never selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DifficultyBand {
    difficulty: Difficulty,
    start: usize,
    size: usize,
}

impl DifficultyBand {
    #[must_use]
    pub fn new(difficulty: Difficulty, band_size: usize) -> Self {
        Self {
            difficulty,
            start: difficulty.band_number() * band_size,
            size: band_size,
        }
    }

    #[must_use]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    #[must_use]
    pub fn start(&self) -> usize {
        self.start
    }

    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Pool indices covered by this band, in original order.
    #[must_use]
    pub fn indices(&self) -> Range<usize> {
        self.start..self.start + self.size
    }

    #[must_use]
    pub fn contains(&self, index: usize) -> bool {
        self.indices().contains(&index)
    }
}
