use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use judging::{
    DragSession, DropTarget, FlushOutcome, JudgingConfig, NavigationGate, NavigationOutcome,
    RankSlot, RankingEngine, Rating, RatingTier, ReviewSubmission, SaveController,
    store::{
        MemoryRankingStore, MemoryScoreStore, PgRankingStore, PgScoreStore, RankingStore,
        ScoreStore,
    },
};
use storage::{Database, repository::submission::SubmissionRepository};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "judge-session")]
#[command(about = "Review and rank the submissions of a category", long_about = None)]
#[command(version)]
struct Cli {
    #[arg(long, env = "DATABASE_URL")]
    database_url: String,

    #[arg(long)]
    category: Uuid,

    #[arg(long, env = "JUDGE_ID")]
    judge: Uuid,

    /// Read submissions from the database but keep every write in memory
    #[arg(long)]
    dry_run: bool,

    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Rate(Rating),
    Feedback(String),
    Blur,
    Next,
    Previous,
    Skip,
    Goto(String),
    Status,
    Tiers,
    Rank,
    Pool,
    Place(String, DropTarget),
    Remove(RankSlot),
    Save,
    Help,
    Quit,
}

fn parse_command(line: &str) -> Result<Command, String> {
    let line = line.trim();
    let (word, rest) = line.split_once(' ').unwrap_or((line, ""));
    let rest = rest.trim();

    let command = match word {
        "rate" | "r" => {
            let value: i16 = rest
                .parse()
                .map_err(|_| format!("'{}' is not a rating", rest))?;
            Command::Rate(Rating::try_from(value).map_err(|e| e.to_string())?)
        }
        "feedback" | "f" => Command::Feedback(rest.to_string()),
        "blur" => Command::Blur,
        "next" | "n" => Command::Next,
        "prev" | "p" => Command::Previous,
        "skip" => Command::Skip,
        "goto" if !rest.is_empty() => Command::Goto(rest.to_string()),
        "status" | "s" => Command::Status,
        "tiers" => Command::Tiers,
        "rank" => Command::Rank,
        "pool" => Command::Pool,
        "place" => {
            let (code, target) = rest
                .split_once(' ')
                .ok_or("usage: place <participant code> <1|2|3|pool>")?;
            Command::Place(code.to_string(), parse_target(target)?)
        }
        "remove" => match parse_target(rest)? {
            DropTarget::Slot(slot) => Command::Remove(slot),
            DropTarget::Pool => return Err("usage: remove <1|2|3>".to_string()),
        },
        "save" => Command::Save,
        "help" | "?" => Command::Help,
        "quit" | "q" | "exit" => Command::Quit,
        _ => return Err(format!("unknown command '{}', try 'help'", line)),
    };

    Ok(command)
}

fn parse_target(raw: &str) -> Result<DropTarget, String> {
    let raw = raw.trim();
    if raw.chars().all(|c| c.is_ascii_digit()) && !raw.is_empty() {
        format!("slot-{}", raw).parse()
    } else {
        raw.parse()
    }
}

const HELP: &str = "\
review:  rate <1-10> | feedback <text> | blur | next | prev | skip | goto <code> | status | tiers
ranking: rank | pool | place <code> <1|2|3|pool> | remove <1|2|3> | save
other:   help | quit";

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("judge_session={},judging={},storage={}", log_level, log_level, log_level)
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = JudgingConfig::from_env().context("Failed to load judging configuration")?;

    let db = Database::new(&cli.database_url)
        .await
        .context("Failed to connect to database")?;

    let submissions = SubmissionRepository::new(db.pool())
        .list_for_review(cli.category, cli.judge)
        .await
        .context("Failed to load submissions")?
        .into_iter()
        .map(ReviewSubmission::try_from)
        .collect::<Result<Vec<_>, _>>()
        .context("Stored review has an invalid rating")?;

    tracing::info!(
        category_id = %cli.category,
        judge_id = %cli.judge,
        submissions = submissions.len(),
        dry_run = cli.dry_run,
        "Starting review session"
    );

    let (score_store, ranking_store): (Arc<dyn ScoreStore>, Arc<dyn RankingStore>) = if cli.dry_run {
        (
            Arc::new(MemoryScoreStore::new()),
            Arc::new(MemoryRankingStore::new()),
        )
    } else {
        (
            Arc::new(PgScoreStore::new(db.clone(), cli.judge)),
            Arc::new(PgRankingStore::new(db.clone())),
        )
    };

    let controller = SaveController::new(score_store, config);
    let mut gate = NavigationGate::open(submissions, controller, None)
        .await
        .context("Nothing to review in this category")?;

    let mut session = Session {
        category_id: cli.category,
        judge_id: cli.judge,
        ranking_store,
        engine: None,
        drag: DragSession::new(),
    };

    print_current(&gate);
    println!("{HELP}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(message) => {
                println!("{message}");
                continue;
            }
        };

        if command == Command::Quit {
            break;
        }
        session.handle(&mut gate, command).await;
    }

    let outcome = gate.controller().flush().await;
    tracing::info!(?outcome, "Review session closed");

    Ok(())
}

struct Session {
    category_id: Uuid,
    judge_id: Uuid,
    ranking_store: Arc<dyn RankingStore>,
    engine: Option<RankingEngine>,
    drag: DragSession,
}

impl Session {
    async fn handle(&mut self, gate: &mut NavigationGate, command: Command) {
        match command {
            Command::Rate(rating) => {
                gate.rating_selected(rating);
                println!("rated {} ({})", rating, rating.tier().label());
                self.refresh_candidates(gate);
            }
            Command::Feedback(text) => gate.feedback_changed(text),
            Command::Blur => gate.feedback_blurred(),
            Command::Next => match gate.navigate_next().await {
                Ok(outcome) => report(gate, &outcome),
                Err(e) => println!("{e}"),
            },
            Command::Previous => {
                let outcome = gate.navigate_previous().await;
                report(gate, &outcome);
            }
            Command::Skip => match gate.navigate_next_unreviewed().await {
                Ok(outcome) => report(gate, &outcome),
                Err(e) => println!("{e}"),
            },
            Command::Goto(code) => {
                let Some(id) = find_by_code(gate, &code) else {
                    println!("no submission with code {code}");
                    return;
                };
                match gate.navigate_to(id).await {
                    Ok(outcome) => report(gate, &outcome),
                    Err(e) => println!("{e}"),
                }
            }
            Command::Status => {
                let (reviewed, total) = gate.progress();
                println!("{reviewed}/{total} reviewed, save status {:?}", gate.controller().status());
                if let Some(error) = gate.controller().last_error() {
                    println!("last save failed: {error}");
                }
                print_current(gate);
            }
            Command::Tiers => {
                for tier in RatingTier::ALL {
                    println!("  {tier}");
                }
            }
            Command::Rank => self.open_ranking(gate).await,
            Command::Pool => match &self.engine {
                Some(engine) => print_ranking(engine),
                None => println!("ranking is not open, use 'rank'"),
            },
            Command::Place(code, target) => {
                let Some(engine) = self.engine.as_mut() else {
                    println!("ranking is not open, use 'rank'");
                    return;
                };
                let Some(id) = find_by_code(gate, &code) else {
                    println!("no submission with code {code}");
                    return;
                };
                self.drag.begin_drag(id);
                match self.drag.drop_on_target(engine, target) {
                    Ok(_) => print_ranking(engine),
                    Err(e) => println!("{e}"),
                }
            }
            Command::Remove(slot) => {
                let Some(engine) = self.engine.as_mut() else {
                    println!("ranking is not open, use 'rank'");
                    return;
                };
                engine.remove(slot);
                print_ranking(engine);
            }
            Command::Save => {
                let Some(engine) = self.engine.as_mut() else {
                    println!("ranking is not open, use 'rank'");
                    return;
                };
                match engine.save().await {
                    Ok(entries) => println!("saved {} places", entries.len()),
                    Err(e) => println!("{e}"),
                }
            }
            Command::Help => println!("{HELP}"),
            Command::Quit => {}
        }
    }

    async fn open_ranking(&mut self, gate: &NavigationGate) {
        if !gate.all_reviewed() {
            let (reviewed, total) = gate.progress();
            println!("rate every submission first ({reviewed}/{total} reviewed)");
            return;
        }

        if let FlushOutcome::Failed(error) = gate.controller().flush().await {
            println!("last edit not saved: {error}");
        }

        if let Some(engine) = self.engine.as_mut() {
            let cleared = engine.update_candidates(gate.ranking_candidates());
            report_cleared(&cleared);
            print_ranking(engine);
            return;
        }

        let mut engine = RankingEngine::new(
            self.category_id,
            self.judge_id,
            gate.ranking_candidates(),
            Arc::clone(&self.ranking_store),
        );
        if let Err(e) = engine.hydrate().await {
            println!("could not load saved rankings: {e}");
        }
        print_ranking(&engine);
        self.engine = Some(engine);
    }

    /// Keeps an open ranking in step with rating changes made during review.
    fn refresh_candidates(&mut self, gate: &NavigationGate) {
        if let Some(engine) = self.engine.as_mut() {
            let cleared = engine.update_candidates(gate.ranking_candidates());
            report_cleared(&cleared);
        }
    }
}

fn report_cleared(cleared: &[RankSlot]) {
    for slot in cleared {
        println!("{slot} place cleared, its occupant no longer fits the order");
    }
}

fn find_by_code(gate: &NavigationGate, code: &str) -> Option<Uuid> {
    gate.ranking_candidates()
        .into_iter()
        .find(|c| c.participant_code.eq_ignore_ascii_case(code))
        .map(|c| c.submission_id)
}

fn report(gate: &NavigationGate, outcome: &NavigationOutcome) {
    match outcome {
        NavigationOutcome::Moved { .. } => print_current(gate),
        NavigationOutcome::ReachedEnd { .. } => println!("last submission reached"),
        NavigationOutcome::ReachedStart { .. } => println!("first submission reached"),
    }
    if let FlushOutcome::Failed(error) = outcome.flush() {
        println!("previous edit was not saved: {error}");
    }
}

fn print_current(gate: &NavigationGate) {
    let current = gate.current();
    let score = gate.controller().local();
    println!(
        "[{}/{}] {} {}",
        gate.current_index() + 1,
        gate.len(),
        current.participant_code,
        current.media_url
    );
    match score.rating {
        Some(rating) => println!("  rating {} ({})", rating, rating.tier()),
        None => println!("  not rated"),
    }
    if !score.feedback.is_empty() {
        println!("  feedback: {}", score.feedback);
    }
}

fn print_ranking(engine: &RankingEngine) {
    for slot in RankSlot::ALL {
        let occupant = engine
            .slot(slot)
            .and_then(|id| engine.candidate(id))
            .map(|c| format!("{} ({})", c.participant_code, rating_label(c.rating)))
            .unwrap_or_else(|| "-".to_string());
        println!("  {slot}: {occupant}");
        if let Some(id) = engine.slot(slot) {
            let peers: Vec<&str> = engine
                .comparable_with(id)
                .iter()
                .map(|c| c.participant_code.as_str())
                .collect();
            if !peers.is_empty() {
                println!("      same tier as: {}", peers.join(", "));
            }
        }
    }
    let pool: Vec<String> = engine
        .source_pool()
        .iter()
        .map(|c| format!("{} ({})", c.participant_code, rating_label(c.rating)))
        .collect();
    println!("  pool: {}", pool.join(", "));
    if engine.can_save() {
        println!("  all places filled, 'save' to submit");
    }
}

fn rating_label(rating: Option<Rating>) -> String {
    rating.map_or_else(|| "unrated".to_string(), |r| r.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_review_commands() {
        assert_eq!(
            parse_command("rate 7"),
            Ok(Command::Rate(Rating::new(7).unwrap()))
        );
        assert_eq!(
            parse_command("f  lovely light "),
            Ok(Command::Feedback("lovely light".to_string()))
        );
        assert_eq!(parse_command("n"), Ok(Command::Next));
        assert_eq!(parse_command("prev"), Ok(Command::Previous));
        assert!(parse_command("rate 11").is_err());
        assert!(parse_command("rate high").is_err());
        assert!(parse_command("goto").is_err());
    }

    #[test]
    fn test_parse_ranking_commands() {
        assert_eq!(
            parse_command("place P-003 2"),
            Ok(Command::Place(
                "P-003".to_string(),
                DropTarget::Slot(RankSlot::Second)
            ))
        );
        assert_eq!(
            parse_command("place P-003 pool"),
            Ok(Command::Place("P-003".to_string(), DropTarget::Pool))
        );
        assert_eq!(parse_command("remove 3"), Ok(Command::Remove(RankSlot::Third)));
        assert!(parse_command("remove pool").is_err());
        assert!(parse_command("place P-003").is_err());
    }
}
