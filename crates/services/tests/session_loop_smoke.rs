use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use quiz_core::model::{
    Category, Difficulty, DiscardPolicy, HighScoreEntry, IncorrectRecord, OutcomeKind,
    SessionConfig, SessionSummary,
};
use quiz_core::time::fixed_now;
use services::{
    Clock, InteractionSink, LoadError, QuestionView, QuizService, SessionError, SessionNotice,
};
use storage::repository::{InMemoryRepository, SessionRecorder, StorageError};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// Plays from a script: one entry per presented question. `None` waits out the clock.
struct ScriptedPlayer {
    tx: UnboundedSender<String>,
    script: VecDeque<Option<&'static str>>,
    prompts: Vec<String>,
    notices: Vec<SessionNotice>,
    reviewed: Vec<(usize, usize, IncorrectRecord)>,
}

impl ScriptedPlayer {
    fn new(script: &[Option<&'static str>]) -> (Self, UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let player = Self {
            tx,
            script: script.iter().copied().collect(),
            prompts: Vec::new(),
            notices: Vec::new(),
            reviewed: Vec::new(),
        };
        (player, rx)
    }

    fn resolved_kinds(&self) -> Vec<OutcomeKind> {
        self.notices
            .iter()
            .filter_map(|n| match n {
                SessionNotice::Resolved { kind, .. } => Some(*kind),
                _ => None,
            })
            .collect()
    }
}

impl InteractionSink for ScriptedPlayer {
    fn present_question(&mut self, view: &QuestionView<'_>) {
        self.prompts.push(view.prompt.to_owned());
        match self.script.pop_front().flatten() {
            Some("right") => {
                let pos = view.options.iter().position(|o| o == "right").unwrap();
                self.tx.send((pos + 1).to_string()).unwrap();
            }
            Some(raw) => self.tx.send(raw.to_owned()).unwrap(),
            None => {}
        }
    }

    fn tick(&mut self, _time_left: Duration) {}

    fn notice(&mut self, notice: &SessionNotice) {
        self.notices.push(notice.clone());
    }

    fn present_review(&mut self, position: usize, total: usize, record: &IncorrectRecord) {
        self.reviewed.push((position, total, record.clone()));
    }
}

/// Easy band is filler; Medium band holds `medium` questions.
fn seeded_repo(category: Category, medium: usize) -> InMemoryRepository {
    let repo = InMemoryRepository::new();
    let mut lines: Vec<String> = (0..50)
        .map(|n| format!("Easy {n}?|right|w1|w2|w3|1"))
        .collect();
    lines.extend((0..medium).map(|n| format!("Medium {n}?|w1|right|w2|w3|2")));
    repo.put_questions(category, lines).unwrap();
    repo
}

fn service(repo: &InMemoryRepository, config: SessionConfig) -> QuizService {
    QuizService::new(
        Clock::fixed(fixed_now()),
        config,
        Arc::new(repo.clone()),
        Arc::new(repo.clone()),
    )
    .with_seed(7)
}

#[tokio::test(start_paused = true)]
async fn scripted_medium_session_scores_and_records() {
    let repo = seeded_repo(Category::Science, 50);
    let mut svc = service(&repo, SessionConfig::default());
    let (mut player, mut rx) = ScriptedPlayer::new(&[
        Some("right"),
        Some("right"),
        Some("right"),
        None,
        Some("6"),
        Some("right"),
        Some("right"),
        Some("right"),
        Some("right"),
        Some("right"),
    ]);

    let report = svc
        .run_session("ana", Category::Science, Difficulty::Medium, &mut rx, &mut player)
        .await
        .unwrap();

    assert_eq!(report.stats.score(), 30);
    assert_eq!(report.stats.correct(), 8);
    assert_eq!(report.stats.wrong(), 1);
    assert_eq!(report.stats.skipped(), 1);
    assert_eq!(report.stats.incorrect().len(), 1);
    assert!(player.prompts.iter().all(|p| p.starts_with("Medium")));

    let logs = repo.recent_logs(10).await.unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].player(), "ana");
    assert_eq!(logs[0].score(), 30);
    assert_eq!(logs[0].quota(), 10);

    let top = repo.top_scores(10).await.unwrap();
    assert_eq!(top.len(), 1);
    assert_eq!(top[0].score, 30);
    assert_eq!(top[0].difficulty, Difficulty::Medium);

    QuizService::review(&report.stats, &mut player);
    assert_eq!(player.reviewed.len(), 1);
    let (position, total, record) = &player.reviewed[0];
    assert_eq!((*position, *total), (1, 1));
    assert_eq!(record.options[record.correct], "right");
}

#[tokio::test(start_paused = true)]
async fn replace_does_not_count_towards_quota() {
    let repo = seeded_repo(Category::History, 50);
    let mut svc = service(&repo, SessionConfig::default());
    let mut script = vec![Some("7")];
    script.extend([Some("right"); 10]);
    let (mut player, mut rx) = ScriptedPlayer::new(&script);

    let report = svc
        .run_session("bo", Category::History, Difficulty::Medium, &mut rx, &mut player)
        .await
        .unwrap();

    let stats = &report.stats;
    assert_eq!(stats.correct() + stats.wrong() + stats.skipped(), 10);
    assert_eq!(player.prompts.len(), 11);
    assert_eq!(player.resolved_kinds().len(), 10);
    assert!(player.notices.contains(&SessionNotice::Replaced));

    let mut unique = player.prompts.clone();
    unique.sort();
    unique.dedup();
    assert_eq!(unique.len(), 11);
}

#[tokio::test(start_paused = true)]
async fn replay_starts_from_fresh_state() {
    let repo = seeded_repo(Category::Sports, 50);
    let config = SessionConfig::new(2, 50, Duration::from_secs(15)).unwrap();
    let mut svc = service(&repo, config);

    let (mut first, mut rx) = ScriptedPlayer::new(&[Some("5"), Some("right"), Some("right")]);
    let report = svc
        .run_session("cy", Category::Sports, Difficulty::Medium, &mut rx, &mut first)
        .await
        .unwrap();
    assert_eq!(report.stats.score(), 2);

    // 50/50 is available again after replay.
    let (mut second, mut rx) = ScriptedPlayer::new(&[Some("5"), Some("right"), Some("right")]);
    let again = svc.replay(&report, &mut rx, &mut second).await.unwrap();
    assert_eq!(again.stats.score(), 2);
    assert!(!second.notices.iter().any(|n| matches!(n, SessionNotice::LifelineMisuse(_))));
    assert_eq!(again.summary.player(), "cy");
    assert_eq!(repo.recent_logs(10).await.unwrap().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn history_lists_recent_sessions_first() {
    let repo = seeded_repo(Category::Science, 50);
    let config = SessionConfig::new(1, 50, Duration::from_secs(15)).unwrap();
    let mut svc = service(&repo, config);

    for (name, answer) in [("hal", "right"), ("ivy", "6")] {
        let (mut player, mut rx) = ScriptedPlayer::new(&[Some(answer)]);
        svc.run_session(name, Category::Science, Difficulty::Medium, &mut rx, &mut player)
            .await
            .unwrap();
    }

    let history = svc.history(10).await.unwrap();
    let players: Vec<_> = history.iter().map(|s| s.player()).collect();
    assert_eq!(players, vec!["ivy", "hal"]);
    assert_eq!(history[0].skipped(), 1);
    assert_eq!(history[1].correct(), 1);
    assert_eq!(svc.history(1).await.unwrap().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn permanent_discard_retires_replaced_question() {
    let repo = seeded_repo(Category::Computer, 2);
    let config = SessionConfig::new(1, 50, Duration::from_secs(15))
        .unwrap()
        .with_discard_policy(DiscardPolicy::Permanent);
    let mut svc = service(&repo, config);

    let (mut first, mut rx) = ScriptedPlayer::new(&[Some("7"), Some("right")]);
    svc.run_session("di", Category::Computer, Difficulty::Medium, &mut rx, &mut first)
        .await
        .unwrap();
    let discarded = first.prompts[0].clone();
    let kept = first.prompts[1].clone();
    assert_ne!(discarded, kept);

    for _ in 0..3 {
        let (mut next, mut rx) = ScriptedPlayer::new(&[Some("right")]);
        svc.run_session("di", Category::Computer, Difficulty::Medium, &mut rx, &mut next)
            .await
            .unwrap();
        assert_eq!(next.prompts, vec![kept.clone()]);
    }
}

#[tokio::test]
async fn missing_category_presents_nothing() {
    let repo = InMemoryRepository::new();
    let mut svc = service(&repo, SessionConfig::default());
    let (mut player, mut rx) = ScriptedPlayer::new(&[]);

    let err = svc
        .run_session("ed", Category::Iq, Difficulty::Easy, &mut rx, &mut player)
        .await
        .unwrap_err();
    assert!(matches!(err, SessionError::Load(LoadError::Missing(Category::Iq))));
    assert!(player.prompts.is_empty());
    assert!(repo.recent_logs(10).await.unwrap().is_empty());
}

#[tokio::test]
async fn empty_band_is_a_load_error() {
    let repo = seeded_repo(Category::Iq, 0);
    let mut svc = service(&repo, SessionConfig::default());
    let (mut player, mut rx) = ScriptedPlayer::new(&[]);

    let err = svc
        .run_session("ed", Category::Iq, Difficulty::Hard, &mut rx, &mut player)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        SessionError::Load(LoadError::EmptyBand {
            difficulty: Difficulty::Hard,
            ..
        })
    ));
    assert!(player.prompts.is_empty());
}

#[tokio::test]
async fn blank_player_is_rejected() {
    let repo = seeded_repo(Category::Iq, 50);
    let mut svc = service(&repo, SessionConfig::default());
    let (mut player, mut rx) = ScriptedPlayer::new(&[]);

    let err = svc
        .run_session("   ", Category::Iq, Difficulty::Easy, &mut rx, &mut player)
        .await
        .unwrap_err();
    assert!(matches!(err, SessionError::EmptyPlayer));
}

#[tokio::test(start_paused = true)]
async fn malformed_records_are_reported_and_skipped() {
    let repo = InMemoryRepository::new();
    repo.put_questions(
        Category::Science,
        ["Q1?|right|a|b|c|1", "Q2?|right|a|b|c", "Q3?|right|a|b|c|1"],
    )
    .unwrap();
    let config = SessionConfig::new(2, 50, Duration::from_secs(15)).unwrap();
    let mut svc = service(&repo, config);
    let (mut player, mut rx) = ScriptedPlayer::new(&[Some("right"), Some("right")]);

    let report = svc
        .run_session("fi", Category::Science, Difficulty::Easy, &mut rx, &mut player)
        .await
        .unwrap();
    assert_eq!(report.stats.correct(), 2);
    assert_eq!(player.notices[0], SessionNotice::RecordsSkipped { count: 1 });
    assert!(!player.prompts.contains(&"Q2?".to_owned()));
}

struct BrokenRecorder;

#[async_trait]
impl SessionRecorder for BrokenRecorder {
    async fn append_log(&self, _summary: &SessionSummary) -> Result<(), StorageError> {
        Err(StorageError::Io("disk full".into()))
    }

    async fn append_high_score(&self, _entry: &HighScoreEntry) -> Result<(), StorageError> {
        Err(StorageError::Io("disk full".into()))
    }

    async fn top_scores(&self, _limit: u32) -> Result<Vec<HighScoreEntry>, StorageError> {
        Ok(Vec::new())
    }

    async fn recent_logs(&self, _limit: u32) -> Result<Vec<SessionSummary>, StorageError> {
        Ok(Vec::new())
    }
}

#[tokio::test(start_paused = true)]
async fn recorder_failures_do_not_fail_the_session() {
    let repo = seeded_repo(Category::History, 50);
    let config = SessionConfig::new(1, 50, Duration::from_secs(15)).unwrap();
    let mut svc = QuizService::new(
        Clock::fixed(fixed_now()),
        config,
        Arc::new(repo),
        Arc::new(BrokenRecorder),
    )
    .with_seed(3);
    let (mut player, mut rx) = ScriptedPlayer::new(&[Some("right")]);

    let report = svc
        .run_session("gil", Category::History, Difficulty::Easy, &mut rx, &mut player)
        .await
        .unwrap();
    assert_eq!(report.stats.score(), 1);
}
