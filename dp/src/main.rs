//! DraftPlan - calendar-aware draft planning
//!
//! CLI entry point: computes planning windows, shows curricula, and runs a
//! draft through generate → edit → commit against a fixture file.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{CommandFactory, FromArgMatches};
use colored::Colorize;
use eyre::{Context, Result};
use tracing::{debug, info};

use draftplan::cli::{Cli, Command, OutputFormat, ScopeArgs, generate_after_help, get_log_path};
use draftplan::config::Config;
use draftplan::source::{Fixture, JsonlLessonSink, PlanningSources};
use draftplan::{
    CurriculumReader, DraftManager, DraftProposal, Edit, PlanningWindow, RequesterContext, RiskSignalSet, Scope,
    SessionStore, Severity, TopicId, WindowCalculator,
};

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    let log_path = get_log_path();
    if let Some(log_dir) = log_path.parent() {
        fs::create_dir_all(log_dir).context("Failed to create log directory")?;
    }

    // Determine log level with priority: CLI --log-level > config file > default (INFO)
    let level = match cli_log_level.or(config_log_level) {
        Some(s) => match s.to_uppercase().as_str() {
            "TRACE" => tracing::Level::TRACE,
            "DEBUG" => tracing::Level::DEBUG,
            "INFO" => tracing::Level::INFO,
            "WARN" | "WARNING" => tracing::Level::WARN,
            "ERROR" => tracing::Level::ERROR,
            _ => {
                eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", s);
                tracing::Level::INFO
            }
        },
        None => tracing::Level::INFO,
    };

    let log_file = fs::File::create(&log_path).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Build command with after_help that shows where logs go
    let cmd = Cli::command().after_help(generate_after_help());
    let cli = Cli::from_arg_matches(&cmd.get_matches())?;

    // Load log level from config file early (before full config load)
    let config_log_level = Config::load_log_level(cli.config.as_ref());

    // Setup logging with priority: CLI > config > INFO default
    setup_logging(cli.log_level.as_deref(), config_log_level.as_deref()).context("Failed to setup logging")?;

    // Load configuration
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command {
        Command::Window {
            scope,
            start,
            end,
            format,
        } => cmd_window(&config, &scope, start, end, format).await,
        Command::Curriculum { scope, format } => cmd_curriculum(&config, &scope, format).await,
        Command::Plan {
            scope,
            start,
            end,
            teacher,
            class_id,
            exclude,
            moves,
            repace,
            commit,
            lessons,
            format,
        } => {
            let edits = collect_edits(exclude, moves, repace);
            let requester = RequesterContext::new(teacher, class_id);
            let options = PlanOptions {
                start,
                end,
                requester,
                edits,
                commit,
                lessons,
                format,
            };
            cmd_plan(&config, &scope, options).await
        }
    }
}

/// Load the fixture named on the command line or in config
fn load_fixture(config: &Config, args: &ScopeArgs) -> Result<(Fixture, Scope)> {
    let path = args
        .fixture
        .clone()
        .or_else(|| config.fixture.path.clone())
        .ok_or_else(|| eyre::eyre!("No fixture given: pass --fixture or set fixture.path in config"))?;

    let fixture = Fixture::load(&path)?;
    let scope = fixture.scope(&args.level, &args.subject);
    Ok((fixture, scope))
}

async fn cmd_window(
    config: &Config,
    args: &ScopeArgs,
    start: chrono::NaiveDate,
    end: chrono::NaiveDate,
    format: OutputFormat,
) -> Result<()> {
    debug!(%start, %end, "cmd_window: called");
    let (fixture, scope) = load_fixture(config, args)?;
    let calculator = WindowCalculator::new(Arc::new(fixture.into_source()), config.planning.days_per_week);
    let window = calculator.compute(&scope, start, end).await?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&window)?),
        OutputFormat::Text => print_window(&scope, &window),
    }
    Ok(())
}

async fn cmd_curriculum(config: &Config, args: &ScopeArgs, format: OutputFormat) -> Result<()> {
    debug!("cmd_curriculum: called");
    let (fixture, scope) = load_fixture(config, args)?;
    let reader = CurriculumReader::new(Arc::new(fixture.into_source()));
    let hierarchy = reader.get_hierarchy(&scope).await?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&hierarchy)?),
        OutputFormat::Text => {
            println!("{} {}", "Curriculum".bold(), scope.to_string().cyan());
            for unit in &hierarchy.units {
                println!("  {} {}", unit.id.as_str().dimmed(), unit.name.bold());
                for topic in &unit.topics {
                    println!(
                        "    {:<16} {} ({}w)",
                        topic.id.as_str().dimmed(),
                        topic.name,
                        topic.weeks()
                    );
                }
            }
        }
    }
    Ok(())
}

struct PlanOptions {
    start: chrono::NaiveDate,
    end: chrono::NaiveDate,
    requester: RequesterContext,
    edits: Vec<Edit>,
    commit: bool,
    lessons: Option<PathBuf>,
    format: OutputFormat,
}

fn collect_edits(exclude: Vec<String>, moves: Vec<(String, u32)>, repace: Vec<(String, u32)>) -> Vec<Edit> {
    let mut edits: Vec<Edit> = exclude
        .into_iter()
        .map(|id| Edit::SetIncluded {
            topic_id: TopicId::from(id),
            included: false,
        })
        .collect();
    edits.extend(moves.into_iter().map(|(id, position)| Edit::Move {
        topic_id: TopicId::from(id),
        position: position as usize,
    }));
    edits.extend(repace.into_iter().map(|(id, weeks)| Edit::Repace {
        topic_id: TopicId::from(id),
        weeks: Some(weeks),
    }));
    edits
}

async fn cmd_plan(config: &Config, args: &ScopeArgs, options: PlanOptions) -> Result<()> {
    debug!(edits = options.edits.len(), commit = options.commit, "cmd_plan: called");
    let (fixture, scope) = load_fixture(config, args)?;
    let source = Arc::new(fixture.into_source());
    let mut sources = PlanningSources::from_single(source);

    let sink = if options.commit {
        let path = options
            .lessons
            .clone()
            .unwrap_or_else(|| config.storage.lessons_path.clone());
        let sink = Arc::new(
            JsonlLessonSink::open(&path)
                .await
                .context(format!("Failed to open lessons file {}", path.display()))?,
        );
        sources = sources.with_lessons(sink.clone());
        Some(sink)
    } else {
        None
    };

    let manager = DraftManager::new(sources, &config.planning, Arc::new(SessionStore::new()));
    let mut proposal = manager
        .generate(options.requester, scope, options.start, options.end)
        .await?;

    for edit in options.edits {
        proposal = manager.modify(&proposal.session_token, edit).await?;
    }

    match options.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&proposal)?),
        OutputFormat::Text => print_proposal(&proposal),
    }

    match sink {
        Some(sink) => {
            let ids = match manager
                .commit(&proposal.session_token, &proposal.confirmation_token)
                .await
            {
                Ok(ids) => ids,
                Err(e) => {
                    let created = e.created_records();
                    if !created.is_empty() {
                        eprintln!(
                            "{} {} lesson record(s) were written before the failure:",
                            "Partial commit:".yellow().bold(),
                            created.len()
                        );
                        for id in created {
                            eprintln!("  {}", id);
                        }
                    }
                    return Err(e.into());
                }
            };
            if options.format == OutputFormat::Text {
                println!();
                println!(
                    "{} {} lesson record(s) to {}",
                    "Committed".green().bold(),
                    ids.len(),
                    sink.path().display()
                );
            }
        }
        None => {
            manager.discard(&proposal.session_token).await?;
            if options.format == OutputFormat::Text {
                println!();
                println!("{}", "Draft discarded; pass --commit to write lesson records".dimmed());
            }
        }
    }
    Ok(())
}

fn print_window(scope: &Scope, window: &PlanningWindow) {
    println!("{} {} {}", "Window".bold(), scope.to_string().cyan(), window.range);
    println!("  Teaching days: {}", window.available_teaching_days.to_string().bold());
    println!(
        "  Weeks:         {} ({} days/week)",
        window.available_weeks.to_string().bold(),
        window.days_per_week
    );
    if window.lost_days.is_empty() {
        return;
    }
    println!("  Lost days:");
    for lost in &window.lost_days {
        let description = lost.description.as_deref().unwrap_or("");
        println!("    {} {:<12} {}", lost.date, lost.reason.to_string().yellow(), description);
    }
}

fn print_proposal(proposal: &DraftProposal) {
    let session = &proposal.session;
    println!(
        "{} {} for {} ({})",
        "Draft".bold(),
        session.scope.to_string().cyan(),
        session.requester.teacher_id,
        session.requester.class_id
    );
    println!(
        "  {} teaching days, {} weeks available, {} weeks planned",
        session.window.available_teaching_days,
        session.window.available_weeks,
        session.schedule.max_week()
    );
    println!();

    for slot in &session.schedule.slots {
        let weeks = if slot.span_weeks > 1 {
            format!("Week {}-{}", slot.week, slot.last_week())
        } else {
            format!("Week {}", slot.week)
        };
        let span = session.window.week_span(slot.week, slot.span_weeks);
        let over = slot.last_week() > session.window.available_weeks;
        let label = if over { weeks.red().bold() } else { weeks.bold() };
        println!("  {:<12} {}", label, span.to_string().dimmed());
        for topic in &slot.topics {
            println!("    {} / {} ({}w)", topic.unit_name, topic.topic_name, topic.weeks);
        }
    }

    let excluded: Vec<_> = session.topics.iter().filter(|t| !t.included).collect();
    if !excluded.is_empty() {
        println!();
        println!("  {}", "Excluded:".dimmed());
        for topic in excluded {
            println!("    {}", topic.topic.topic_name.dimmed());
        }
    }

    print_risks(&session.risks);
    println!();
    println!("  Session:      {}", proposal.session_token.as_str().dimmed());
    println!("  Confirmation: {}", proposal.confirmation_token.as_str().dimmed());
}

fn print_risks(risks: &RiskSignalSet) {
    if risks.is_empty() {
        return;
    }
    println!();
    for signal in risks {
        let tag = format!("[{}]", signal.kind);
        let tag = match signal.severity {
            Severity::Info => tag.blue(),
            Severity::Warning => tag.yellow(),
            Severity::Critical => tag.red(),
        };
        println!("  {} {}", tag, signal.message);
        if let Some(detail) = &signal.detail {
            println!("      {}", detail.dimmed());
        }
    }
}
