//! CLI interface for lifebetter

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use serde_json::json;
use std::path::PathBuf;

use crate::config::{self, Config};
use crate::english::{ErrorLogManager, LogStart};
use crate::learning::{Experience, LearnerStore, MetaLearner, SharedMetaLearner};
use crate::project::{Priority, ProjectTracker, StatusReport, TaskStatus};

#[derive(Parser)]
#[command(name = "lifebetter")]
#[command(about = "Strategy meta-learner, English error log and project tracker", long_about = None)]
#[command(version)]
struct Cli {
    /// Override the data directory for all state files
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Track English writing errors
    English {
        #[command(subcommand)]
        command: EnglishCommands,
    },
    /// Record task outcomes and get strategy recommendations
    Learner {
        #[command(subcommand)]
        command: LearnerCommands,
    },
    /// Manage project tasks and milestones
    Project {
        #[command(subcommand)]
        command: ProjectCommands,
    },
    /// Show or reset configuration
    Config {
        /// Reset configuration to defaults
        #[arg(long)]
        reset: bool,
        /// Print the default configuration file
        #[arg(long)]
        default: bool,
    },
}

#[derive(Subcommand)]
enum EnglishCommands {
    /// Start or resume tracking
    Init,
    /// Record a corrected error
    Add {
        /// Text as originally written
        #[arg(short, long)]
        original: String,
        /// Corrected text
        #[arg(short, long)]
        corrected: String,
        /// Error category (e.g. grammar, spelling)
        #[arg(short = 'k', long)]
        category: String,
        /// Why the correction applies
        #[arg(short, long, default_value = "")]
        explanation: String,
    },
    /// Print the daily report
    Report {
        /// Date as YYYY-MM-DD (default: today)
        #[arg(short, long)]
        date: Option<NaiveDate>,
    },
}

#[derive(Subcommand)]
enum LearnerCommands {
    /// Record an experience
    Record {
        /// Task type (default: general)
        #[arg(short, long)]
        task_type: Option<String>,
        /// Strategy approach (default: default)
        #[arg(short, long)]
        approach: Option<String>,
        /// Outcome score (default: 0.0)
        #[arg(short, long)]
        score: Option<f64>,
        /// Full experience record as JSON; overrides the other flags
        #[arg(long, conflicts_with_all = ["task_type", "approach", "score"])]
        json: Option<String>,
    },
    /// Recommend the best known approach for a task type
    Recommend {
        /// Task type
        task_type: String,
    },
    /// Show ledger size, utilization and known task types
    Insights,
    /// Forget all recorded experiences
    Reset,
    /// Run an in-memory walkthrough
    Demo,
}

#[derive(Subcommand)]
enum ProjectCommands {
    /// Add a task
    TaskAdd {
        title: String,
        #[arg(short, long, default_value = "")]
        description: String,
        /// low, medium or high
        #[arg(short, long, default_value = "medium")]
        priority: Priority,
        /// todo, in_progress or done
        #[arg(short, long, default_value = "todo")]
        status: TaskStatus,
    },
    /// Change a task's status
    TaskStatus {
        id: u32,
        /// todo, in_progress or done
        status: TaskStatus,
    },
    /// Add a milestone
    MilestoneAdd {
        title: String,
        #[arg(short, long, default_value = "")]
        description: String,
        /// Target date, e.g. 2026-12-31
        #[arg(short, long)]
        target_date: Option<String>,
    },
    /// Mark a milestone complete
    MilestoneDone {
        id: u32,
    },
    /// Log a progress note
    Log {
        entry: String,
    },
    /// Print the status report
    Report,
    /// Populate the tracker with sample data and print the report
    Demo,
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load()?;
    if let Some(dir) = cli.data_dir {
        config.storage.data_dir = Some(dir);
    }

    match cli.command {
        Commands::English { command } => {
            let manager = ErrorLogManager::new(config.storage.error_log_path()?);
            run_english(&manager, command)?;
        }
        Commands::Learner { command } => {
            let store = LearnerStore::new(config.storage.learner_state_path()?, config.learner);
            run_learner(&store, command).await?;
        }
        Commands::Project { command } => {
            let mut tracker = ProjectTracker::open(config.storage.project_path()?)?;
            run_project(&mut tracker, command)?;
        }
        Commands::Config { reset, default } => {
            if reset {
                config::reset_config()?;
            } else if default {
                print!("{}", config::default_config_toml());
            } else {
                config::show_config(&config)?;
            }
        }
    }

    Ok(())
}

fn run_english(manager: &ErrorLogManager, command: EnglishCommands) -> Result<()> {
    match command {
        EnglishCommands::Init => {
            let (log, start) = manager.init_or_resume()?;
            match start {
                LogStart::Resumed => {
                    println!("Resumed English learning tracking. Current total errors: {}", log.total_errors);
                    println!("Learning since: {}", log.learning_start_date);
                    let today = chrono::Local::now().date_naive();
                    let today_count = log.entries_on(today).len();
                    if today_count > 0 {
                        println!("Errors recorded today: {}", today_count);
                    } else {
                        println!("No errors recorded yet today");
                    }
                }
                LogStart::Recreated => {
                    println!("Error reading log file, creating new one");
                    println!("Started new English learning tracking session");
                }
                LogStart::Created => {
                    println!("Started new English learning tracking session");
                }
            }
        }
        EnglishCommands::Add { original, corrected, category, explanation } => {
            let recorded = manager.add_error(&original, &corrected, &category, &explanation)?;
            println!(
                "Recorded error in category '{}'. Total errors now: {}",
                recorded.entry.category, recorded.total_errors
            );
        }
        EnglishCommands::Report { date } => {
            println!("{}", manager.daily_report(date)?);
        }
    }
    Ok(())
}

async fn run_learner(store: &LearnerStore, command: LearnerCommands) -> Result<()> {
    match command {
        LearnerCommands::Record { task_type, approach, score, json } => {
            let experience = experience_from_flags(task_type, approach, score, json)?;

            let mut learner = store.load()?;
            println!(
                "Recorded {} / {} with score {:.2}",
                experience.task_type,
                experience.approach(),
                experience.score()
            );
            learner.learn_from_experience(experience);
            store.save(&learner)?;
        }
        LearnerCommands::Recommend { task_type } => {
            let learner = store.load()?;
            let recommendation = learner.recommend(&task_type);
            println!("Recommended approach: {}", recommendation.approach);
            println!("Learning rate: {}", recommendation.learning_rate);
            for suggestion in &recommendation.suggestions {
                println!("  - {}", suggestion);
            }
        }
        LearnerCommands::Insights => {
            let learner = store.load()?;
            print_insights(&learner);
        }
        LearnerCommands::Reset => {
            store.reset()?;
            println!("Learner state cleared.");
        }
        LearnerCommands::Demo => run_learner_demo().await,
    }
    Ok(())
}

/// Build the record for `learner record`; absent flags fall back to the
/// learner's defaults.
fn experience_from_flags(
    task_type: Option<String>,
    approach: Option<String>,
    score: Option<f64>,
    json: Option<String>,
) -> Result<Experience> {
    if let Some(raw) = json {
        let value: serde_json::Value = serde_json::from_str(&raw)
            .map_err(|e| anyhow::anyhow!("--json is not valid JSON: {}", e))?;
        return Ok(Experience::from_value(value));
    }

    // json! turns a non-finite score into null, which reads as 0.0
    Ok(Experience::from_value(json!({
        "task_type": task_type,
        "strategy": {"approach": approach},
        "outcome": {"score": score},
    })))
}

fn print_insights(learner: &MetaLearner) {
    let insights = learner.insights();
    println!("Performance Insights:");
    println!("  total_experiences: {}", insights.total_experiences);
    println!("  memory_usage: {}", insights.memory_usage);
    println!("  meta_knowledge_size: {}", insights.meta_knowledge_size);

    for (task_type, strategies) in learner.meta_knowledge() {
        println!("  {}:", task_type);
        for (approach, stats) in strategies {
            println!("    {:<20} n={:<4} avg={:.2}", approach, stats.count, stats.avg_score);
        }
    }
}

/// In-memory walkthrough; nothing is persisted
async fn run_learner_demo() {
    println!("Initializing LifeBetter Meta-Learning System...");

    let learner = SharedMetaLearner::new(MetaLearner::new(50, 0.01));
    let snapshot = learner.snapshot().await;
    println!("Meta-learner initialized with memory size: {}", snapshot.memory_size());
    println!("Learning rate: {}", snapshot.learning_rate());

    // Loosely shaped records: no task_type, string outcomes
    let experiences = vec![
        json!({
            "task": "habit_formation",
            "input": {"habit": "morning_exercise", "duration": 30},
            "output": {"consistency": 0.7, "energy_level": 0.8},
            "outcome": "partial_success"
        }),
        json!({
            "task": "learning_new_skill",
            "input": {"skill": "python_programming", "hours_per_day": 2},
            "output": {"progress": 0.6, "retention": 0.85},
            "outcome": "success"
        }),
        json!({
            "task": "time_management",
            "input": {"technique": "pomodoro", "session_length": 25},
            "output": {"focus_score": 0.9, "tasks_completed": 8},
            "outcome": "success"
        }),
    ];

    println!("\nAdding experiences to the meta-learner...");
    for (i, value) in experiences.into_iter().enumerate() {
        let name = value["task"].as_str().unwrap_or("unknown").to_string();
        println!("Experience {}: {}", i + 1, name);
        learner.learn_from_experience(Experience::from_value(value)).await;
    }

    println!("\nPerformance Insights:");
    let insights = learner.insights().await;
    println!("  total_experiences: {}", insights.total_experiences);
    println!("  memory_usage: {}", insights.memory_usage);
    println!("  meta_knowledge_size: {}", insights.meta_knowledge_size);

    println!("\nAdapting learning strategy for new task...");
    let strategy = learner.recommend("improve_sleep_quality").await;
    println!("Recommended approach: {}", strategy.approach);
    println!("Suggested learning rate: {}", strategy.learning_rate);
    println!("Suggestions: {:?}", strategy.suggestions);

    println!("\nLifeBetter Meta-Learning System demo completed!");
}

fn run_project(tracker: &mut ProjectTracker, command: ProjectCommands) -> Result<()> {
    match command {
        ProjectCommands::TaskAdd { title, description, priority, status } => {
            let task = tracker.add_task(&title, &description, priority, status)?;
            println!("Added task #{}: {} [{}, {}]", task.id, task.title, task.priority, task.status);
        }
        ProjectCommands::TaskStatus { id, status } => {
            if tracker.update_task_status(id, status)? {
                println!("Task #{} is now {}", id, status);
            } else {
                anyhow::bail!("No task with id {}", id);
            }
        }
        ProjectCommands::MilestoneAdd { title, description, target_date } => {
            let milestone = tracker.add_milestone(&title, &description, target_date.as_deref())?;
            println!("Added milestone #{}: {}", milestone.id, milestone.title);
        }
        ProjectCommands::MilestoneDone { id } => {
            if tracker.mark_milestone_complete(id)? {
                println!("Milestone #{} completed", id);
            } else {
                anyhow::bail!("No milestone with id {}", id);
            }
        }
        ProjectCommands::Log { entry } => {
            let logged = tracker.log_progress(&entry)?;
            println!("Logged progress at {}", logged.date.format("%Y-%m-%d %H:%M"));
        }
        ProjectCommands::Report => print_status_report(&tracker.status_report()),
        ProjectCommands::Demo => {
            println!("LifeBetter Project Tracker");
            println!("{}", "=".repeat(30));

            tracker.add_task(
                "Implement core meta-learning algorithm",
                "Develop the primary meta-learning functionality",
                Priority::High,
                TaskStatus::InProgress,
            )?;
            tracker.add_task(
                "Write comprehensive documentation",
                "Document all major components and APIs",
                Priority::Medium,
                TaskStatus::Todo,
            )?;
            tracker.add_task(
                "Create unit tests",
                "Develop tests for all critical functions",
                Priority::High,
                TaskStatus::Todo,
            )?;
            tracker.add_milestone(
                "Alpha Release",
                "Initial working version of the meta-learning system",
                Some("2023-12-31"),
            )?;
            tracker.log_progress("Completed initial architecture design")?;
            tracker.log_progress("Implemented basic meta-learner class")?;
            tracker.log_progress("Created project documentation structure")?;

            print_status_report(&tracker.status_report());
        }
    }
    Ok(())
}

fn print_status_report(report: &StatusReport) {
    let tasks = &report.project_summary;
    println!("\nTask Summary:");
    println!("  Total: {}", tasks.total_tasks);
    println!("  Completed: {}", tasks.completed_tasks);
    println!("  In Progress: {}", tasks.in_progress_tasks);
    println!("  To Do: {}", tasks.todo_tasks);
    println!("  Completion: {:.1}%", tasks.completion_percentage);

    let milestones = &report.milestone_summary;
    println!("\nMilestone Summary:");
    println!("  Total: {}", milestones.total_milestones);
    println!("  Completed: {}", milestones.completed_milestones);
    println!("  Completion: {:.1}%", milestones.milestone_completion_percentage);

    println!("\nRecent Progress Entries:");
    for entry in &report.recent_progress {
        println!("  {}: {}", entry.date.format("%Y-%m-%d"), entry.entry);
    }
}
