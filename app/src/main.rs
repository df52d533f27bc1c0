//! Lootinyang - Main entry point

use anyhow::{bail, Context};
use chrono::{Local, NaiveDate, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use lootinyang_app::commands::{self, CheckOutcome};
use lootinyang_app::{AppState, NotificationConfig};
use lootinyang_core::{BoxTier, NewHabit, OpenBoxOutcome, Rarity};
use lootinyang_engine::{generate_items, ProgressionConfig, RngSource};
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Read;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "lootinyang", version, about = "Habit tracker with cat-themed reward boxes")]
struct Cli {
    /// Directory holding the database
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Local user id
    #[arg(long, global = true, default_value = "local")]
    user: String,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show level, experience and streaks
    Status,
    /// Add a habit
    HabitAdd {
        name: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, default_value = "🐾")]
        icon: String,
        /// Make it a weekly habit with this many checks per week
        #[arg(long)]
        weekly: Option<u32>,
    },
    /// List active habits
    Habits,
    /// Archive a habit; its history is kept
    HabitArchive { habit_id: i64 },
    /// Check a habit for today (or --date)
    Check {
        habit_id: i64,
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// List reward boxes
    Boxes {
        #[arg(long)]
        all: bool,
    },
    /// Open a reward box
    Open {
        box_id: i64,
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Grant a box directly
    Grant {
        #[arg(value_enum, default_value = "special")]
        tier: TierArg,
    },
    /// List achievements and their unlock state
    Achievements,
    /// Print a LOOT- backup string
    Export,
    /// Restore from a LOOT- backup string (stdin when omitted)
    Import { backup: Option<String> },
    /// Show progression and notification settings, optionally replacing them
    Config {
        /// New progression settings as JSON
        #[arg(long)]
        set_progression: Option<String>,
        /// New notification settings as JSON
        #[arg(long)]
        set_notifications: Option<String>,
    },
    /// Open boxes without touching the database and print rarity frequencies
    Simulate {
        #[arg(value_enum)]
        tier: TierArg,
        #[arg(long, default_value_t = 10_000)]
        count: u32,
        #[arg(long, default_value_t = 2024)]
        seed: u64,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum TierArg {
    Daily,
    Weekly,
    Monthly,
    Special,
}

impl From<TierArg> for BoxTier {
    fn from(tier: TierArg) -> Self {
        match tier {
            TierArg::Daily => BoxTier::Daily,
            TierArg::Weekly => BoxTier::Weekly,
            TierArg::Monthly => BoxTier::Monthly,
            TierArg::Special => BoxTier::Special,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "lootinyang=info,lootinyang_app=info,lootinyang_engine=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    if let Command::Simulate { tier, count, seed } = cli.command {
        return simulate(tier.into(), count, seed);
    }

    let data_dir = cli.data_dir.unwrap_or_else(|| {
        dirs_next::data_local_dir()
            .map(|p| p.join("Lootinyang"))
            .unwrap_or_else(|| PathBuf::from("."))
    });
    tracing::info!(data_dir = %data_dir.display(), "Starting Lootinyang");
    let state = AppState::open(data_dir.clone())
        .await
        .with_context(|| format!("opening database in {}", data_dir.display()))?;
    let user = cli.user.as_str();
    let json = cli.json;
    let now = Utc::now();
    let today = Local::now().date_naive();

    match cli.command {
        Command::Status => {
            let report = commands::progress_report(&state, user, today).await?;
            if json {
                return print_json(&report);
            }
            let p = &report.progress;
            println!("Level {} ({} exp)", p.level, p.experience);
            if report.level_span > 0 {
                println!("  {}/{} to next level", report.level_exp, report.level_span);
            }
            println!("Streak: {} days, weekly targets: {} weeks", p.current_streak, p.weekly_target_streak);
            println!("Habits: {}, boxes opened: {}", p.total_habits, p.total_boxes_opened);
        }
        Command::HabitAdd { name, description, icon, weekly } => {
            let mut habit = match weekly {
                Some(target) => NewHabit::weekly(&name, target),
                None => NewHabit::daily(&name),
            };
            habit.description = description;
            habit.icon = icon;

            let (created, unlocked) = commands::create_habit(&state, user, habit, now).await?;
            println!("Created habit #{} {} {}", created.id, created.icon, created.name);
            for a in unlocked {
                println!("🏅 {} {}", a.icon, a.name);
            }
        }
        Command::Habits => {
            let habits = commands::list_habits(&state, user).await?;
            if json {
                return print_json(&habits);
            }
            for h in habits {
                let schedule = match h.weekly_target {
                    0 => h.frequency.as_str().to_string(),
                    n => format!("{} x{}", h.frequency.as_str(), n),
                };
                println!("#{:<4} {} {:<24} {}", h.id, h.icon, h.name, schedule);
            }
        }
        Command::HabitArchive { habit_id } => {
            if commands::archive_habit(&state, user, habit_id).await? {
                println!("Archived habit #{}", habit_id);
            } else {
                println!("Habit #{} was already archived", habit_id);
            }
        }
        Command::Check { habit_id, date } => {
            let date = date.unwrap_or(today);
            let outcome = commands::check_habit(&state, user, habit_id, date, now).await?;
            if json {
                return print_json(&outcome);
            }
            match outcome {
                CheckOutcome::AlreadyChecked { .. } => println!("Already checked on {}", date),
                CheckOutcome::Checked(s) => {
                    println!(
                        "+{} exp (total {}), streak {} days",
                        s.gain.total_awarded, s.gain.new_exp, s.current_streak
                    );
                    if s.leveled_up() {
                        println!("⬆️ Level {}!", s.gain.new_level);
                    }
                    for b in &s.boxes_issued {
                        println!("🎁 New {} box #{}", b.tier, b.id);
                    }
                    for a in &s.achievements_unlocked {
                        println!("🏅 {} {}", a.icon, a.name);
                    }
                }
            }
        }
        Command::Boxes { all } => {
            let boxes = commands::list_boxes(&state, user, !all).await?;
            if json {
                return print_json(&boxes);
            }
            for b in boxes {
                let status = if b.opened { "opened" } else { "sealed" };
                println!("#{:<4} {:<8} {:<7} {}", b.id, b.tier, status, b.created_at.format("%Y-%m-%d"));
            }
        }
        Command::Open { box_id, seed } => {
            let outcome = match seed {
                Some(seed) => {
                    commands::open_box(&state, user, box_id, &mut RngSource::seeded(seed), now).await?
                }
                None => commands::open_box(&state, user, box_id, &mut RngSource::thread(), now).await?,
            };
            if json {
                return print_json(&outcome);
            }
            match outcome {
                OpenBoxOutcome::Opened(b) => {
                    for item in b.items {
                        println!("{} {} [{}]", item.icon, item.name, item.rarity);
                    }
                }
                OpenBoxOutcome::AlreadyOpened { .. } => println!("Box #{} is already open", box_id),
                OpenBoxOutcome::NotFound { .. } => bail!("no box #{}", box_id),
            }
        }
        Command::Grant { tier } => {
            let b = commands::grant_box(&state, user, tier.into(), now).await?;
            println!("🎁 Granted {} box #{}", b.tier, b.id);
        }
        Command::Achievements => {
            let achievements = commands::list_achievements(&state, user).await?;
            if json {
                return print_json(&achievements);
            }
            for s in achievements {
                let mark = if s.unlocked_at.is_some() { "✔" } else { " " };
                let a = &s.achievement;
                println!("[{}] {} {:<20} {:>3} pts  {}", mark, a.icon, a.name, a.points, a.description);
            }
        }
        Command::Export => println!("{}", commands::export_backup(&state, now).await?),
        Command::Import { backup } => {
            let text = match backup {
                Some(text) => text,
                None => {
                    let mut buf = String::new();
                    std::io::stdin().read_to_string(&mut buf)?;
                    buf
                }
            };
            let data = commands::import_backup(&state, &text).await?;
            println!(
                "Imported {} habits, {} checks, {} boxes",
                data.habits.len(),
                data.habit_checks.len(),
                data.reward_boxes.len()
            );
        }
        Command::Config { set_progression, set_notifications } => {
            if let Some(text) = set_progression {
                let config: ProgressionConfig =
                    serde_json::from_str(&text).context("parsing progression settings")?;
                commands::set_progression_config(&state, config).await?;
            }
            if let Some(text) = set_notifications {
                let config: NotificationConfig =
                    serde_json::from_str(&text).context("parsing notification settings")?;
                commands::set_notification_config(&state, config).await?;
            }
            print_json(&Settings {
                progression: commands::get_progression_config(&state).await,
                notifications: commands::get_notification_config(&state).await,
            })?;
        }
        Command::Simulate { tier, count, seed } => simulate(tier.into(), count, seed)?,
    }

    Ok(())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Settings {
    progression: ProgressionConfig,
    notifications: NotificationConfig,
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn simulate(tier: BoxTier, count: u32, seed: u64) -> anyhow::Result<()> {
    let mut rng = RngSource::seeded(seed);
    let mut by_rarity: BTreeMap<Rarity, u64> = BTreeMap::new();
    let mut items = 0u64;

    for _ in 0..count {
        for item in generate_items(tier, &mut rng)? {
            *by_rarity.entry(item.rarity).or_default() += 1;
            items += 1;
        }
    }

    println!("{} {} boxes, {} items", count, tier, items);
    for rarity in Rarity::ALL {
        let n = by_rarity.get(&rarity).copied().unwrap_or(0);
        let share = if items == 0 { 0.0 } else { n as f64 / items as f64 };
        println!("  {:<10} {:>8} {:>7.2}%", rarity, n, share * 100.0);
    }
    Ok(())
}
