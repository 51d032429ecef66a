use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;

use quiz_core::model::{
    Category, Difficulty, DiscardPolicy, HighScoreEntry, SessionConfig, SessionStats,
    SessionSummary,
};
use storage::repository::{QuestionSource, SessionRecorder, Storage, StorageError};

use super::interaction::{ChoiceInput, InteractionSink, SessionNotice};
use super::service::QuestionSession;
use crate::Clock;
use crate::bank::QuestionBank;
use crate::error::{LoadError, SessionError};

/// Result of one finished run, handed back for review, replay and display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionReport {
    pub stats: SessionStats,
    pub summary: SessionSummary,
    /// Counted questions; lower than configured when the band was short.
    pub quota: usize,
}

/// Runs quiz sessions end to end: load, play, record.
///
/// Every run starts from fresh lifelines, streak and stats. Only the discard
/// policy carries state from one run to the next.
pub struct QuizService {
    clock: Clock,
    config: SessionConfig,
    questions: Arc<dyn QuestionSource>,
    recorder: Arc<dyn SessionRecorder>,
    rng: StdRng,
    retired: HashMap<(Category, Difficulty), HashSet<usize>>,
}

impl QuizService {
    #[must_use]
    pub fn new(
        clock: Clock,
        config: SessionConfig,
        questions: Arc<dyn QuestionSource>,
        recorder: Arc<dyn SessionRecorder>,
    ) -> Self {
        Self {
            clock,
            config,
            questions,
            recorder,
            rng: StdRng::from_os_rng(),
            retired: HashMap::new(),
        }
    }

    #[must_use]
    pub fn from_storage(clock: Clock, config: SessionConfig, storage: &Storage) -> Self {
        Self::new(
            clock,
            config,
            Arc::clone(&storage.questions),
            Arc::clone(&storage.recorder),
        )
    }

    /// Make question order and option shuffling reproducible.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Load the question bank for `category`.
    ///
    /// # Errors
    ///
    /// Returns `LoadError` if the source is missing or has no usable questions.
    pub async fn load_bank(&self, category: Category) -> Result<QuestionBank, LoadError> {
        QuestionBank::load(self.questions.as_ref(), category, &self.config).await
    }

    /// Play one session and record it.
    ///
    /// Recording is best effort: recorder failures are logged, not returned.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::EmptyPlayer` for a blank name, `SessionError::Load` if
    /// the questions cannot be loaded (nothing is presented), and
    /// `SessionError::InputClosed` if input ends mid-session.
    pub async fn run_session(
        &mut self,
        player: &str,
        category: Category,
        difficulty: Difficulty,
        input: &mut dyn ChoiceInput,
        sink: &mut dyn InteractionSink,
    ) -> Result<SessionReport, SessionError> {
        let player = player.trim();
        if player.is_empty() {
            return Err(SessionError::EmptyPlayer);
        }

        let bank = self.load_bank(category).await?;
        if !bank.skipped().is_empty() {
            sink.notice(&SessionNotice::RecordsSkipped {
                count: bank.skipped().len(),
            });
        }

        let started_at = self.clock.now();
        let retired = match self.config.discard_policy() {
            DiscardPolicy::Session => None,
            DiscardPolicy::Permanent => self.retired.get(&(category, difficulty)),
        };
        let session =
            QuestionSession::new(&bank, &self.config, difficulty, retired, &mut self.rng)?;
        let completed = session.run(input, sink).await?;
        let completed_at = self.clock.now();

        if self.config.discard_policy() == DiscardPolicy::Permanent
            && !completed.discarded.is_empty()
        {
            self.retired
                .entry((category, difficulty))
                .or_default()
                .extend(completed.discarded.iter().copied());
        }

        let quota = u32::try_from(completed.quota).unwrap_or(u32::MAX);
        let summary = SessionSummary::from_stats(
            player,
            category,
            difficulty,
            quota,
            &completed.stats,
            started_at,
            completed_at,
        )?;
        self.record(&summary).await;

        Ok(SessionReport {
            stats: completed.stats,
            summary,
            quota: completed.quota,
        })
    }

    /// Play again with the same player, category and difficulty.
    ///
    /// # Errors
    ///
    /// Same as [`QuizService::run_session`].
    pub async fn replay(
        &mut self,
        previous: &SessionReport,
        input: &mut dyn ChoiceInput,
        sink: &mut dyn InteractionSink,
    ) -> Result<SessionReport, SessionError> {
        let summary = &previous.summary;
        self.run_session(
            summary.player(),
            summary.category(),
            summary.difficulty(),
            input,
            sink,
        )
        .await
    }

    /// Walk through the questions answered wrongly, as they were displayed.
    pub fn review(stats: &SessionStats, sink: &mut dyn InteractionSink) {
        let total = stats.incorrect().len();
        for (i, record) in stats.incorrect().iter().enumerate() {
            sink.present_review(i + 1, total, record);
        }
    }

    /// Best recorded scores first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the recorder cannot be read.
    pub async fn leaderboard(&self, limit: u32) -> Result<Vec<HighScoreEntry>, StorageError> {
        self.recorder.top_scores(limit).await
    }

    /// Most recent session logs first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the recorder cannot be read.
    pub async fn history(&self, limit: u32) -> Result<Vec<SessionSummary>, StorageError> {
        self.recorder.recent_logs(limit).await
    }

    async fn record(&self, summary: &SessionSummary) {
        if let Err(err) = self.recorder.append_log(summary).await {
            tracing::warn!(error = %err, player = summary.player(), "failed to append session log");
        }
        if let Err(err) = self
            .recorder
            .append_high_score(&HighScoreEntry::from(summary))
            .await
        {
            tracing::warn!(error = %err, player = summary.player(), "failed to append high score");
        }
    }
}
