use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime};
use weekmenu::{MemoryStore, Planner, Snapshot};
use weekmenu_shared::shopping::Bucket;
use weekmenu_shopping::{CategorizationService, display_item};

/// weekmenu - Weekly meal planning and shopping lists
#[derive(Parser)]
#[command(name = "weekmenu")]
#[command(about = "Plan a week of meals and build the shopping list", long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(long, global = true)]
    config: Option<String>,

    /// JSON snapshot holding recipes, config, history, pantry, plans and list
    #[arg(long, global = true, default_value = "weekmenu.json")]
    data: PathBuf,

    /// Current time (RFC 3339), defaults to the system clock
    #[arg(long, global = true, value_parser = parse_now)]
    now: Option<OffsetDateTime>,

    /// Print results without saving the snapshot
    #[arg(long, global = true)]
    dry_run: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the plan of the week containing WEEK
    Plan {
        #[arg(long, value_parser = parse_date)]
        week: Date,
        /// Category quota as name=count, repeatable; defaults to the configured selection
        #[arg(long = "quota", value_parser = parse_quota)]
        quotas: Vec<(String, u32)>,
        #[arg(long)]
        total_meals: Option<u32>,
        /// Keep recipes already marked as made
        #[arg(long)]
        preserve_made: bool,
    },
    /// Swap one planned recipe for another of the same category
    Swap {
        #[arg(long, value_parser = parse_date)]
        week: Date,
        recipe: String,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        exclude: Vec<String>,
    },
    /// Mark a planned recipe as made, or unmark it with --undo
    Made {
        #[arg(long, value_parser = parse_date)]
        week: Date,
        recipe: String,
        #[arg(long)]
        undo: bool,
    },
    /// Place a planned recipe on a day (0 = Sunday … 6 = Saturday)
    Move {
        #[arg(long, value_parser = parse_date)]
        week: Date,
        recipe: String,
        day: u8,
    },
    /// Build the shopping list from the plan of the week containing WEEK
    Shopping {
        #[arg(long, value_parser = parse_date)]
        week: Date,
        /// Keep checks and manual items of the current list
        #[arg(long)]
        keep: bool,
        /// Print one line per item instead of JSON
        #[arg(long)]
        text: bool,
    },
    /// Add manual shopping list entries
    Add { names: Vec<String> },
    /// Check off shopping list entries
    Check {
        keys: Vec<String>,
        #[arg(long)]
        undo: bool,
    },
    /// Add pantry items
    Pantry { items: Vec<String> },
    /// Add excluded ingredient keywords
    Exclude { keywords: Vec<String> },
    /// Set or clear the shopping category of an ingredient
    Category {
        item: String,
        /// Category key or name, clears the override when omitted
        category: Option<String>,
    },
}

fn parse_date(value: &str) -> Result<Date, String> {
    Date::parse(value, format_description!("[year]-[month]-[day]")).map_err(|e| e.to_string())
}

fn parse_now(value: &str) -> Result<OffsetDateTime, String> {
    OffsetDateTime::parse(value, &Rfc3339).map_err(|e| e.to_string())
}

fn parse_quota(value: &str) -> Result<(String, u32), String> {
    let (category, count) = value
        .split_once('=')
        .ok_or_else(|| format!("expected category=count, got {value}"))?;
    let count = count.trim().parse::<u32>().map_err(|e| e.to_string())?;

    Ok((category.trim().to_owned(), count))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = weekmenu::config::Config::load(cli.config.clone())?;
    config.validate().map_err(|e| anyhow::anyhow!(e))?;

    weekmenu::observability::init_observability(
        &config.observability.log_level,
        config.observability.json,
    )?;

    let snapshot = if cli.data.exists() {
        let content = std::fs::read_to_string(&cli.data)
            .with_context(|| format!("failed to read {}", cli.data.display()))?;
        serde_json::from_str::<Snapshot>(&content)
            .with_context(|| format!("failed to parse {}", cli.data.display()))?
    } else {
        Snapshot::default()
    };

    let planner = Planner::new(MemoryStore::new(snapshot))
        .with_seed(config.planner.seed)
        .with_default_scale(config.planner.default_scale);
    let now = cli.now.unwrap_or_else(OffsetDateTime::now_utc);

    run(&planner, cli.command, now).await?;

    if !cli.dry_run {
        let snapshot = planner.store().snapshot().await;
        std::fs::write(&cli.data, serde_json::to_string_pretty(&snapshot)?)
            .with_context(|| format!("failed to write {}", cli.data.display()))?;
        tracing::info!(path = %cli.data.display(), "snapshot saved");
    }

    Ok(())
}

async fn run(planner: &Planner<MemoryStore>, command: Commands, now: OffsetDateTime) -> Result<()> {
    match command {
        Commands::Plan {
            week,
            quotas,
            total_meals,
            preserve_made,
        } => {
            let quotas = (!quotas.is_empty())
                .then(|| quotas.into_iter().collect::<BTreeMap<_, _>>());

            let generation = planner
                .generate_plan(week, quotas, total_meals, preserve_made, now)
                .await?;

            for shortfall in &generation.shortfalls {
                tracing::info!(
                    category = shortfall.category,
                    requested = shortfall.requested,
                    selected = shortfall.selected,
                    "quota partially filled"
                );
            }

            print_json(&generation)
        }
        Commands::Swap {
            week,
            recipe,
            category,
            exclude,
        } => {
            let plan = planner
                .swap_recipe(week, &recipe, category.as_deref(), &exclude)
                .await?;
            print_json(&plan)
        }
        Commands::Made { week, recipe, undo } => {
            let plan = planner.mark_made(week, &recipe, !undo, None, now).await?;
            print_json(&plan)
        }
        Commands::Move { week, recipe, day } => {
            let plan = planner.move_to_day(week, &recipe, day).await?;
            print_json(&plan)
        }
        Commands::Shopping { week, keep, text } => {
            let list = planner.build_from_plan(week, keep, now).await?;

            if !text {
                return print_json(&list);
            }

            let config = planner.store().snapshot().await.config;
            let categories = CategorizationService::for_config(&config);

            for bucket in [Bucket::Items, Bucket::AlreadyHave, Bucket::Excluded] {
                let items = list.sorted_items(bucket);
                if items.is_empty() {
                    continue;
                }

                println!("# {bucket}");
                for item in items {
                    let category = categories
                        .get(item.category_order)
                        .map(|c| c.name.as_str())
                        .unwrap_or_default();
                    let mark = if item.checked { "x" } else { " " };
                    println!("[{mark}] {} ({category})", display_item(item));
                }
            }

            Ok(())
        }
        Commands::Add { names } => print_json(&planner.add_manual_items(&names, now).await?),
        Commands::Check { keys, undo } => {
            let updated = planner.set_checked(&keys, !undo).await?;
            tracing::info!(updated, "shopping items updated");
            Ok(())
        }
        Commands::Pantry { items } => print_json(&planner.add_pantry_items(&items).await?),
        Commands::Exclude { keywords } => {
            print_json(&planner.add_excluded_keywords(&keywords).await?)
        }
        Commands::Category { item, category } => {
            let key = planner
                .set_category_override(&item, category.as_deref())
                .await?;
            print_json(&key)
        }
    }
}
