use std::time::Duration;

use tokio::time::{Instant, MissedTickBehavior, interval, sleep_until};

use super::interaction::{ChoiceInput, InteractionSink};

/// How a single wait for input ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaitOutcome {
    /// A line arrived before the deadline.
    Answered { raw: String, elapsed: Duration },
    /// The budget ran out. Late input has been discarded.
    TimedOut,
    /// Input closed.
    Closed,
}

/// Wait up to `budget` for one line of input, refreshing the countdown every `tick`.
///
/// Input wins over the deadline when both are ready in the same poll.
pub async fn await_answer(
    input: &mut dyn ChoiceInput,
    sink: &mut dyn InteractionSink,
    budget: Duration,
    tick: Duration,
) -> WaitOutcome {
    let started = Instant::now();
    let deadline = started + budget;

    let outcome = {
        let answer = input.next_choice();
        tokio::pin!(answer);
        let expiry = sleep_until(deadline);
        tokio::pin!(expiry);

        let mut ticker = interval(tick);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // The first tick completes immediately; the question was just drawn.
        ticker.tick().await;

        loop {
            tokio::select! {
                biased;

                line = &mut answer => {
                    break match line {
                        Some(raw) => WaitOutcome::Answered { raw, elapsed: started.elapsed() },
                        None => WaitOutcome::Closed,
                    };
                }
                () = &mut expiry => break WaitOutcome::TimedOut,
                _ = ticker.tick() => {
                    sink.tick(deadline.saturating_duration_since(Instant::now()));
                }
            }
        }
    };

    if outcome == WaitOutcome::TimedOut {
        input.discard_pending();
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sessions::interaction::{QuestionView, SessionNotice};
    use async_trait::async_trait;
    use quiz_core::model::IncorrectRecord;
    use tokio::sync::mpsc;

    #[derive(Default)]
    struct TickRecorder {
        ticks: Vec<Duration>,
    }

    impl InteractionSink for TickRecorder {
        fn present_question(&mut self, _view: &QuestionView<'_>) {}
        fn tick(&mut self, time_left: Duration) {
            self.ticks.push(time_left);
        }
        fn notice(&mut self, _notice: &SessionNotice) {}
        fn present_review(&mut self, _: usize, _: usize, _: &IncorrectRecord) {}
    }

    #[tokio::test(start_paused = true)]
    async fn answer_before_deadline() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut sink = TickRecorder::default();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(3)).await;
            tx.send("2".to_owned()).unwrap();
        });

        let outcome = await_answer(
            &mut rx,
            &mut sink,
            Duration::from_secs(15),
            Duration::from_secs(1),
        )
        .await;

        match outcome {
            WaitOutcome::Answered { raw, elapsed } => {
                assert_eq!(raw, "2");
                assert!(elapsed >= Duration::from_secs(3));
                assert!(elapsed < Duration::from_secs(4));
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(!sink.ticks.is_empty());
        assert!(sink.ticks.windows(2).all(|w| w[0] >= w[1]));
    }

    /// Never yields a line; holds typed-ahead lines until they are discarded.
    struct Buffered {
        held: Vec<String>,
        discards: usize,
    }

    #[async_trait]
    impl ChoiceInput for Buffered {
        async fn next_choice(&mut self) -> Option<String> {
            std::future::pending().await
        }

        fn discard_pending(&mut self) {
            self.discards += 1;
            self.held.clear();
        }
    }

    #[tokio::test(start_paused = true)]
    async fn silence_times_out() {
        let (_tx, mut rx) = mpsc::unbounded_channel::<String>();
        let mut sink = TickRecorder::default();

        let outcome = await_answer(
            &mut rx,
            &mut sink,
            Duration::from_secs(15),
            Duration::from_millis(100),
        )
        .await;
        assert_eq!(outcome, WaitOutcome::TimedOut);
        assert!(sink.ticks.iter().all(|t| *t <= Duration::from_secs(15)));
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_discards_late_input() {
        let mut input = Buffered {
            held: vec!["1".to_owned()],
            discards: 0,
        };
        let mut sink = TickRecorder::default();

        let outcome = await_answer(
            &mut input,
            &mut sink,
            Duration::from_secs(2),
            Duration::from_millis(500),
        )
        .await;
        assert_eq!(outcome, WaitOutcome::TimedOut);
        assert_eq!(input.discards, 1);
        assert!(input.held.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn answer_keeps_following_input() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        tx.send("2".to_owned()).unwrap();
        tx.send("3".to_owned()).unwrap();
        let mut sink = TickRecorder::default();

        let outcome = await_answer(
            &mut rx,
            &mut sink,
            Duration::from_secs(15),
            Duration::from_secs(1),
        )
        .await;
        assert!(matches!(outcome, WaitOutcome::Answered { ref raw, .. } if raw == "2"));
        assert_eq!(rx.next_choice().await.as_deref(), Some("3"));
    }

    #[tokio::test(start_paused = true)]
    async fn closed_input_is_reported() {
        let (tx, mut rx) = mpsc::unbounded_channel::<String>();
        drop(tx);
        let mut sink = TickRecorder::default();

        let outcome = await_answer(
            &mut rx,
            &mut sink,
            Duration::from_secs(15),
            Duration::from_millis(100),
        )
        .await;
        assert_eq!(outcome, WaitOutcome::Closed);
    }

    #[tokio::test(start_paused = true)]
    async fn queued_input_wins_over_expired_deadline() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        tx.send("4".to_owned()).unwrap();
        let mut sink = TickRecorder::default();

        let outcome = await_answer(
            &mut rx,
            &mut sink,
            Duration::from_millis(1),
            Duration::from_millis(10),
        )
        .await;
        assert!(matches!(outcome, WaitOutcome::Answered { ref raw, .. } if raw == "4"));
    }
}
