use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::model::OPTION_COUNT;

/// Text shown in place of an option eliminated by 50/50.
pub const REMOVED_OPTION: &str = "[REMOVED]";

/// Raised when a spent lifeline is invoked again. Carries no state change.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("{0} already used")]
pub struct LifelineMisuse(pub Lifeline);

/// The four one-shot assistance actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Lifeline {
    FiftyFifty,
    Skip,
    Replace,
    ExtraTime,
}

impl Lifeline {
    pub const ALL: [Lifeline; 4] = [
        Lifeline::FiftyFifty,
        Lifeline::Skip,
        Lifeline::Replace,
        Lifeline::ExtraTime,
    ];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Lifeline::FiftyFifty => "50/50",
            Lifeline::Skip => "Skip Question",
            Lifeline::Replace => "Replace Question",
            Lifeline::ExtraTime => "Extra Time",
        }
    }

    /// Menu slot as typed by the player: options are 1-4, lifelines 5-8.
    #[must_use]
    pub fn menu_number(self) -> usize {
        match self {
            Lifeline::FiftyFifty => 5,
            Lifeline::Skip => 6,
            Lifeline::Replace => 7,
            Lifeline::ExtraTime => 8,
        }
    }

    #[must_use]
    pub fn from_menu_number(n: usize) -> Option<Self> {
        Self::ALL.into_iter().find(|l| l.menu_number() == n)
    }
}

impl fmt::Display for Lifeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Availability flags for the session's lifelines. All available at start;
/// each one flips to spent exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifelineState {
    fifty_fifty: bool,
    skip: bool,
    replace: bool,
    extra_time: bool,
}

impl Default for LifelineState {
    fn default() -> Self {
        Self {
            fifty_fifty: true,
            skip: true,
            replace: true,
            extra_time: true,
        }
    }
}

impl LifelineState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_available(&self, lifeline: Lifeline) -> bool {
        match lifeline {
            Lifeline::FiftyFifty => self.fifty_fifty,
            Lifeline::Skip => self.skip,
            Lifeline::Replace => self.replace,
            Lifeline::ExtraTime => self.extra_time,
        }
    }

    /// Lifelines still available, in menu order.
    pub fn available(&self) -> impl Iterator<Item = Lifeline> + '_ {
        Lifeline::ALL.into_iter().filter(|l| self.is_available(*l))
    }

    /// Spend a lifeline.
    ///
    /// # Errors
    ///
    /// Returns `LifelineMisuse` if it was already spent; the state is left untouched.
    pub fn take(&mut self, lifeline: Lifeline) -> Result<(), LifelineMisuse> {
        let flag = match lifeline {
            Lifeline::FiftyFifty => &mut self.fifty_fifty,
            Lifeline::Skip => &mut self.skip,
            Lifeline::Replace => &mut self.replace,
            Lifeline::ExtraTime => &mut self.extra_time,
        };
        if !*flag {
            return Err(LifelineMisuse(lifeline));
        }
        *flag = false;
        Ok(())
    }
}

/// Blank out the first two incorrect options, scanning left to right.
///
/// The correct option is never touched. Returns the positions that were removed.
pub fn apply_fifty_fifty(options: &mut [String; OPTION_COUNT], correct: usize) -> [usize; 2] {
    let mut removed = [0_usize; 2];
    let mut count = 0;
    for (i, option) in options.iter_mut().enumerate() {
        if count == removed.len() {
            break;
        }
        if i != correct {
            *option = REMOVED_OPTION.to_owned();
            removed[count] = i;
            count += 1;
        }
    }
    removed
}
