//! KilnWatch - kiln firing scheduling and monitoring assistant
//!
//! # Usage
//!
//! ```bash
//! # Recommend a firing schedule
//! kilnwatch generate --stage glaze --sample thick --clay-kg 6.5
//!
//! # Recompute the calibration factor from the firing history
//! kilnwatch calibrate --db ./kilnwatch.db
//!
//! # Run a full monitored firing against an accelerated clock
//! kilnwatch demo --stage bisque
//! ```
//!
//! # Environment Variables
//!
//! - `KILNWATCH_CONFIG`: Path to a studio_config.toml (default: ./studio_config.toml)
//! - `RUST_LOG`: Logging level (default: info)

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::{Duration as ChronoDuration, Utc};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use kilnwatch::{
    calculate_calibration, complete_firing, config, evaluate_milestones, generate, notify,
    sample_firing, schedule_points, start_firing, FiringOutcome, FiringStage, FiringStore,
    MemoryStore, Notifier, NullNotifier, SampleType, SledStore, StudioConfig, WebhookNotifier,
};

#[derive(Parser)]
#[command(name = "kilnwatch", about = "Kiln firing scheduling and monitoring", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Recommend a firing schedule for a stage and ware type
    Generate {
        /// Firing stage: bisque or glaze
        #[arg(long)]
        stage: String,

        /// Ware type: standard, thick, thin, large_flat, sculpture
        #[arg(long, default_value = "standard")]
        sample: String,

        /// Clay load in kilograms
        #[arg(long, default_value_t = 0.0)]
        clay_kg: f64,

        /// Also print the temperature profile vertices
        #[arg(long)]
        points: bool,
    },

    /// Recompute the calibration factor from the stored firing history
    Calibrate {
        /// Path to the sled database
        #[arg(long, env = "KILNWATCH_DB", default_value = "kilnwatch.db")]
        db: PathBuf,
    },

    /// Run a monitored firing end to end against an accelerated clock
    Demo {
        /// Firing stage: bisque or glaze
        #[arg(long, default_value = "bisque")]
        stage: String,

        /// Ware type: standard, thick, thin, large_flat, sculpture
        #[arg(long, default_value = "standard")]
        sample: String,

        /// Clay load in kilograms
        #[arg(long, default_value_t = 4.0)]
        clay_kg: f64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    config::init(StudioConfig::load());

    let cli = Cli::parse();
    match cli.command {
        Command::Generate {
            stage,
            sample,
            clay_kg,
            points,
        } => cmd_generate(&stage, &sample, clay_kg, points),
        Command::Calibrate { db } => cmd_calibrate(&db),
        Command::Demo {
            stage,
            sample,
            clay_kg,
        } => cmd_demo(&stage, &sample, clay_kg).await,
    }
}

fn parse_stage(s: &str) -> Result<FiringStage> {
    FiringStage::parse(s)
        .with_context(|| format!("unknown firing stage '{s}' (expected bisque or glaze)"))
}

fn parse_sample(s: &str) -> Result<SampleType> {
    SampleType::parse(s).with_context(|| {
        format!("unknown ware type '{s}' (expected standard, thick, thin, large_flat, sculpture)")
    })
}

fn cmd_generate(stage: &str, sample: &str, clay_kg: f64, points: bool) -> Result<()> {
    let stage = parse_stage(stage)?;
    let sample = parse_sample(sample)?;

    let recommendation = generate(sample, stage, clay_kg);
    for warning in &recommendation.warnings {
        println!("warning: {warning}");
    }
    if recommendation.segments.is_empty() {
        bail!("no schedule could be generated");
    }

    println!(
        "{} firing for {} ware ({clay_kg:.1} kg load)",
        stage.display_name(),
        sample.display_name().to_lowercase(),
    );
    println!(
        "Estimated duration: {} min (time modifier {:.2})",
        recommendation.estimated_duration_minutes, recommendation.time_modifier,
    );
    println!();

    for (i, segment) in recommendation.segments.iter().enumerate() {
        println!("  {:>2}. {segment}", i + 1);
    }

    if !recommendation.advice.is_empty() {
        println!();
        for line in &recommendation.advice {
            println!("  - {line}");
        }
    }

    if points {
        println!();
        println!("Profile vertices (min, °C):");
        for point in schedule_points(&recommendation.segments) {
            println!("  {:>7.1}  {:>6.1}", point.minutes, point.temp_c);
        }
    }

    Ok(())
}

fn cmd_calibrate(db: &PathBuf) -> Result<()> {
    let store = SledStore::open(db)
        .with_context(|| format!("failed to open firing database at {}", db.display()))?;

    let logs = store.all_logs().context("failed to read firing logs")?;
    info!(log_count = logs.len(), "Loaded firing history");

    let result = calculate_calibration(&logs);
    store
        .save_calibration(&result)
        .context("failed to save calibration")?;

    println!("Calibration factor: {:.3}", result.factor);
    println!("Based on {} usable firing(s)", result.sample_count);
    println!("{}", result.advice);
    Ok(())
}

/// Drives a full firing lifecycle with synthetic timestamps: the "clock"
/// jumps forward a few minutes per iteration, so a nine-hour firing plays
/// out in well under a second of wall time.
async fn cmd_demo(stage: &str, sample: &str, clay_kg: f64) -> Result<()> {
    let stage = parse_stage(stage)?;
    let sample = parse_sample(sample)?;

    let store = MemoryStore::new();
    let notifier = build_notifier()?;

    let recommendation = generate(sample, stage, clay_kg);
    if recommendation.segments.is_empty() {
        bail!("no schedule could be generated for the demo");
    }
    let schedule = recommendation.into_schedule("demo firing", sample, stage, clay_kg);
    let estimated = schedule.estimated_duration_minutes;

    let started = Utc::now();
    let firing = start_firing(&store, notifier.as_ref(), "demo", schedule, started).await?;
    println!(
        "Started '{}' — estimated {estimated} min",
        firing.schedule.name,
    );

    // Sample every 5 simulated minutes, running slightly past the estimate
    // so the overdue milestone fires too.
    let mut elapsed = 0i64;
    let horizon = i64::from(estimated) + 20;
    while elapsed <= horizon {
        let now = started + ChronoDuration::minutes(elapsed);
        let current = store
            .active_firing("demo")?
            .context("active firing disappeared mid-demo")?;

        let sample_point = sample_firing(&current.schedule, current.started_at, now);
        if let Some(milestone) = evaluate_milestones(&sample_point, current.watermark) {
            let message = notify::milestone_reached(&current, &milestone, &sample_point);
            notifier.send(&message).await;
            store.update_watermark("demo", current.watermark, milestone.watermark)?;
            println!(
                "  [{elapsed:>4} min] {} — {:.0} °C, {:.0}% complete",
                milestone.kind, sample_point.current_temp, sample_point.progress_percent,
            );
        }
        elapsed += 5;
    }

    let finished = started + ChronoDuration::minutes(horizon);
    let log = complete_firing(
        &store,
        notifier.as_ref(),
        "demo",
        FiringOutcome::Perfect,
        "demo run",
        finished,
    )
    .await?
    .context("no active firing to complete")?;

    println!(
        "Completed after {:.0} min (predicted {:.0})",
        log.actual_duration, log.predicted_duration,
    );

    let calibration = calculate_calibration(&store.all_logs()?);
    println!("Calibration after this firing: {:.3}", calibration.factor);
    println!("{}", calibration.advice);
    if let Some(theoretical) = log.theoretical_duration {
        println!(
            "A rerun of this schedule would now be estimated at {} min",
            calibration.apply(theoretical),
        );
    }
    Ok(())
}

/// Webhook notifier when URLs are configured, otherwise the null channel.
fn build_notifier() -> Result<Arc<dyn Notifier>> {
    let urls = config::get().webhooks.urls.clone();
    if urls.is_empty() {
        return Ok(Arc::new(NullNotifier));
    }
    let webhook = WebhookNotifier::new(urls).context("failed to build webhook client")?;
    info!(targets = webhook.target_count(), "Webhook notifications enabled");
    Ok(Arc::new(webhook))
}
