use std::io::{self, BufRead, Write};
use std::str::FromStr;
use std::time::Duration;

use quiz_core::model::{Category, Difficulty, IncorrectRecord, Lifeline, OutcomeKind};
use services::{InteractionSink, QuestionView, QuizService, SessionError, SessionNotice, SessionReport};
use tokio::sync::mpsc::{self, UnboundedReceiver};

const RULE: &str = "========================================";

/// Whether the player asked to leave (or input ended).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Feed stdin lines into a channel from a dedicated thread.
///
/// The same channel serves menus and question input, so nothing else reads stdin.
pub fn spawn_stdin_reader() -> UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

//
// ─── SINK ──────────────────────────────────────────────────────────────────────
//

/// Renders a session on stdout.
#[derive(Debug, Default)]
pub struct ConsoleSink {
    last_second: Option<u128>,
}

impl ConsoleSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn flush() {
    // A failed flush only delays output.
    let _ = io::stdout().flush();
}

impl InteractionSink for ConsoleSink {
    fn present_question(&mut self, view: &QuestionView<'_>) {
        self.last_second = None;
        println!("\n{RULE}");
        println!(
            "Question {} of {}    Score: {}    Time: {}s",
            view.number,
            view.quota,
            view.score,
            view.time_left.as_secs()
        );
        println!("{RULE}\n");
        println!("{}\n", view.prompt);
        for (i, option) in view.options.iter().enumerate() {
            println!("{}) {option}", i + 1);
        }

        println!("\n--- Lifelines Available ---");
        for lifeline in Lifeline::ALL {
            let state = if view.lifelines.is_available(lifeline) {
                "[AVAILABLE]"
            } else {
                "[USED]"
            };
            println!("{}) {lifeline} {state}", lifeline.menu_number());
        }
        print!("\nYour answer (1-4) or lifeline (5-8): ");
        flush();
    }

    fn tick(&mut self, time_left: Duration) {
        let second = time_left.as_millis().div_ceil(1000);
        if self.last_second != Some(second) {
            self.last_second = Some(second);
            print!("\x1b7\rTime: {second:>3}s \x1b8");
            flush();
        }
    }

    fn notice(&mut self, notice: &SessionNotice) {
        match notice {
            SessionNotice::ShortPool { available, quota } => {
                println!("\nOnly {available} questions available (wanted {quota}).");
            }
            SessionNotice::RecordsSkipped { count } => {
                println!("\n{count} malformed question(s) skipped.");
            }
            SessionNotice::LifelineUsed(lifeline) => {
                println!("\n[LIFELINE USED: {lifeline}]");
            }
            SessionNotice::LifelineMisuse(lifeline) => {
                println!("\n[!] {lifeline} already used!");
            }
            SessionNotice::ExhaustedPool => {
                println!("No replacement question left. Keep going with this one.");
            }
            SessionNotice::ExtraTimeAdded { time_left } => {
                println!("Extra time added! New time: {}s", time_left.as_secs());
            }
            SessionNotice::InvalidChoice { raw } => {
                println!("\n'{raw}' is not a valid choice.");
            }
            SessionNotice::Replaced => println!("Finding a new question..."),
            SessionNotice::TimedOut => println!("\n\nTime's up!"),
            SessionNotice::Resolved {
                kind,
                correct_answer,
                delta,
                score,
            } => {
                match kind {
                    OutcomeKind::Correct => {
                        println!("\nCorrect!");
                        if delta.bonus > 0 {
                            println!("Streak Bonus +{} points!", delta.bonus);
                        }
                    }
                    OutcomeKind::Incorrect => {
                        println!("\nWrong! Correct answer: {correct_answer}");
                    }
                    OutcomeKind::TimedOut => {
                        println!("You didn't answer in time! Correct answer: {correct_answer}");
                    }
                    OutcomeKind::Skipped => println!("Question skipped without penalty!"),
                }
                if delta.points < 0 {
                    println!("Negative Mark: {} points", delta.points);
                }
                println!("Current Score: {score}");
            }
        }
        flush();
    }

    fn present_review(&mut self, position: usize, total: usize, record: &IncorrectRecord) {
        println!("\n{RULE}");
        println!("Review Question {position} of {total}\n");
        println!("{}\n", record.prompt);
        for (i, option) in record.options.iter().enumerate() {
            println!("{}) {option}", i + 1);
        }
        println!("\n** Correct Answer: {} **", record.options[record.correct]);
    }
}

//
// ─── MENUS ─────────────────────────────────────────────────────────────────────
//

async fn prompt(input: &mut UnboundedReceiver<String>, label: &str) -> Option<String> {
    print!("{label}");
    flush();
    input.recv().await.map(|line| line.trim().to_owned())
}

async fn pick<T: FromStr>(
    input: &mut UnboundedReceiver<String>,
    title: &str,
    entries: &[String],
) -> Option<Option<T>> {
    println!("\n=== {title} ===");
    for (i, entry) in entries.iter().enumerate() {
        println!("{}. {entry}", i + 1);
    }
    let raw = prompt(input, "Enter choice: ").await?;
    let parsed = raw.parse().ok();
    if parsed.is_none() {
        println!("Invalid!");
    }
    Some(parsed)
}

/// Top-level menu: play, high scores, exit.
pub async fn main_menu(
    service: &mut QuizService,
    input: &mut UnboundedReceiver<String>,
    sink: &mut ConsoleSink,
) {
    loop {
        println!("\n{RULE}");
        println!("          CONSOLE-BASED QUIZ GAME");
        println!("{RULE}");
        println!("1. Start New Quiz");
        println!("2. View High Scores");
        println!("3. Exit");
        let Some(choice) = prompt(input, "Enter choice: ").await else {
            break;
        };

        match choice.as_str() {
            "1" => {
                if start_quiz(service, input, sink).await == Flow::Quit {
                    break;
                }
            }
            "2" => {
                print_high_scores(service, 10).await;
                print_recent_sessions(service, 10).await;
            }
            "3" => break,
            _ => println!("Invalid choice."),
        }
    }
    println!("\nThank you for playing!");
}

async fn start_quiz(
    service: &mut QuizService,
    input: &mut UnboundedReceiver<String>,
    sink: &mut ConsoleSink,
) -> Flow {
    let Some(player) = prompt(input, "Enter your name: ").await else {
        return Flow::Quit;
    };

    let categories: Vec<String> = Category::ALL.iter().map(ToString::to_string).collect();
    let Some(category) = pick::<Category>(input, "SELECT CATEGORY", &categories).await else {
        return Flow::Quit;
    };
    let Some(category) = category else {
        return Flow::Continue;
    };

    let difficulties: Vec<String> = Difficulty::ALL.iter().map(ToString::to_string).collect();
    let Some(difficulty) = pick::<Difficulty>(input, "SELECT DIFFICULTY", &difficulties).await
    else {
        return Flow::Quit;
    };
    let Some(difficulty) = difficulty else {
        return Flow::Continue;
    };

    let mut report = match service
        .run_session(&player, category, difficulty, input, sink)
        .await
    {
        Ok(report) => report,
        Err(err) => return report_failure(&err),
    };

    loop {
        print_completion(&report);
        println!("1. Review Incorrect Questions");
        println!("2. Replay Quiz (New Questions)");
        println!("3. Return to Main Menu");
        let Some(choice) = prompt(input, "Enter choice: ").await else {
            return Flow::Quit;
        };

        match choice.as_str() {
            "1" => review(&report, sink),
            "2" => match service.replay(&report, input, sink).await {
                Ok(next) => report = next,
                Err(err) => return report_failure(&err),
            },
            "3" => return Flow::Continue,
            _ => println!("Invalid choice."),
        }
    }
}

fn report_failure(err: &SessionError) -> Flow {
    match err {
        SessionError::InputClosed => Flow::Quit,
        other => {
            println!("\n{other}");
            Flow::Continue
        }
    }
}

fn print_completion(report: &SessionReport) {
    let stats = &report.stats;
    println!("\n{RULE}");
    println!("           QUIZ COMPLETE!");
    println!("{RULE}");
    println!("Your Final Score: {}/{}", stats.score(), report.quota);
    println!("Correct Answers: {}", stats.correct());
    println!("Wrong Answers: {}", stats.wrong());
    println!("Skipped: {}\n", stats.skipped());
}

fn review(report: &SessionReport, sink: &mut ConsoleSink) {
    let count = report.stats.incorrect().len();
    if count == 0 {
        println!("\nGreat job! You didn't answer any questions incorrectly!");
        return;
    }
    println!("\n{RULE}");
    println!("       REVIEWING INCORRECT ANSWERS");
    println!("{RULE}");
    println!("You answered {count} question(s) incorrectly.");
    QuizService::review(&report.stats, sink);
    println!("\nReview complete!");
}

/// Print the leaderboard.
pub async fn print_high_scores(service: &QuizService, limit: u32) {
    let entries = match service.leaderboard(limit).await {
        Ok(entries) => entries,
        Err(err) => {
            tracing::warn!(error = %err, "failed to read high scores");
            println!("Could not read high scores: {err}");
            return;
        }
    };

    if entries.is_empty() {
        println!("No high scores found!");
        return;
    }

    println!("\n{RULE}");
    println!("               HIGH SCORES");
    println!("{RULE}\n");
    println!("{:<16}{:>6}  {:<10}{:<8}", "Player", "Score", "Category", "Difficulty");
    for entry in entries {
        println!(
            "{:<16}{:>6}  {:<10}{:<8}",
            entry.player,
            entry.score,
            entry.category.to_string(),
            entry.difficulty.to_string()
        );
    }
}

/// Print the most recent session logs.
pub async fn print_recent_sessions(service: &QuizService, limit: u32) {
    let logs = match service.history(limit).await {
        Ok(logs) => logs,
        Err(err) => {
            tracing::warn!(error = %err, "failed to read session log");
            println!("Could not read session log: {err}");
            return;
        }
    };

    if logs.is_empty() {
        return;
    }

    println!("\n--- Recent Sessions ---");
    for log in logs {
        println!(
            "{}  {:<16}{:<10}{:<8}{:>6}  ({}/{}/{} of {})",
            log.completed_at().format("%Y-%m-%d %H:%M"),
            log.player(),
            log.category().to_string(),
            log.difficulty().to_string(),
            log.score(),
            log.correct(),
            log.wrong(),
            log.skipped(),
            log.quota()
        );
    }
}
