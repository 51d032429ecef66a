use rand::Rng;
use std::collections::HashSet;

use quiz_core::model::{Difficulty, DifficultyBand};

use crate::bank::QuestionBank;

/// Fisher–Yates: walk from the last position down to 1, swapping each with a
/// uniformly chosen position in `[0, i]`.
pub(crate) fn fisher_yates<T, R: Rng>(items: &mut [T], rng: &mut R) {
    for i in (1..items.len()).rev() {
        let j = rng.random_range(0..=i);
        items.swap(i, j);
    }
}

/// Shuffled question order for one session plus the set of consumed indices.
///
/// An index is consumed once it is shown or taken by [`SessionPlan::substitute`];
/// consumed indices are never handed out again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionPlan {
    band: DifficultyBand,
    order: Vec<usize>,
    valid: HashSet<usize>,
    cursor: usize,
    used: HashSet<usize>,
}

impl SessionPlan {
    /// Next shuffled index that is valid and not yet consumed; marks it consumed.
    pub fn next_index(&mut self) -> Option<usize> {
        while let Some(&index) = self.order.get(self.cursor) {
            self.cursor += 1;
            if self.valid.contains(&index) && self.used.insert(index) {
                return Some(index);
            }
        }
        None
    }

    /// Replace lifeline: the first valid, unconsumed index in original band order.
    ///
    /// The index is marked consumed. Returns `None` once the band is exhausted.
    pub fn substitute(&mut self) -> Option<usize> {
        let found = self
            .band
            .indices()
            .find(|i| self.valid.contains(i) && !self.used.contains(i))?;
        self.used.insert(found);
        Some(found)
    }

    /// Valid indices not yet consumed.
    #[must_use]
    pub fn unused_count(&self) -> usize {
        self.valid.iter().filter(|i| !self.used.contains(i)).count()
    }

    #[must_use]
    pub fn is_used(&self, index: usize) -> bool {
        self.used.contains(&index)
    }

    #[must_use]
    pub fn used_count(&self) -> usize {
        self.used.len()
    }

    /// The shuffled band order, including invalid slots.
    #[must_use]
    pub fn order(&self) -> &[usize] {
        &self.order
    }

    #[must_use]
    pub fn band(&self) -> DifficultyBand {
        self.band
    }
}

/// Builds a [`SessionPlan`] for one band of a question bank.
pub struct QuestionPicker<'a> {
    bank: &'a QuestionBank,
    band: DifficultyBand,
    retired: Option<&'a HashSet<usize>>,
}

impl<'a> QuestionPicker<'a> {
    #[must_use]
    pub fn new(bank: &'a QuestionBank, difficulty: Difficulty) -> Self {
        Self {
            bank,
            band: bank.band(difficulty),
            retired: None,
        }
    }

    /// Indices excluded up front, e.g. questions discarded in earlier sessions.
    #[must_use]
    pub fn with_retired(mut self, retired: &'a HashSet<usize>) -> Self {
        self.retired = Some(retired);
        self
    }

    /// Shuffle the whole band range into a fresh plan.
    pub fn build<R: Rng>(self, rng: &mut R) -> SessionPlan {
        let mut order: Vec<usize> = self.band.indices().collect();
        fisher_yates(&mut order, rng);

        let valid = self
            .band
            .indices()
            .filter(|&i| self.bank.is_valid(i))
            .collect();

        let used = self
            .retired
            .map(|r| r.iter().copied().filter(|&i| self.band.contains(i)).collect())
            .unwrap_or_default();

        SessionPlan {
            band: self.band,
            order,
            valid,
            cursor: 0,
            used,
        }
    }
}
