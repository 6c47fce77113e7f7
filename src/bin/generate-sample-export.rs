//! Sample Export Generator
//!
//! Writes a synthetic call-center export in the same layout the analyzer reads,
//! so the report and export commands can be tried without real data.
//!
//! Usage:
//!   cargo run --bin generate-sample-export -- --days 30 --output calls.csv

use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use clap::Parser;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::PathBuf;

use call_analytics::constants;
use call_analytics::pipeline::processing::normalize::format_talk_time;

#[derive(Parser)]
#[command(name = "generate-sample-export")]
#[command(about = "Generate a synthetic call-center export")]
struct Cli {
    /// First day of generated calls
    #[arg(long, default_value = "2024-03-04")]
    start: NaiveDate,

    /// Number of consecutive days to generate
    #[arg(long, default_value_t = 14)]
    days: u32,

    /// Average number of calls per day
    #[arg(long, default_value_t = 40)]
    calls_per_day: u32,

    /// Probability that a call goes unanswered
    #[arg(long, default_value_t = 0.15)]
    missed_rate: f64,

    /// Seed for reproducible output
    #[arg(long, default_value_t = 7)]
    seed: u64,

    #[arg(long, short, default_value = "sample_calls.csv")]
    output: PathBuf,
}

const AGENT_CELLS: &[&str] = &[
    constants::JORGE_ALIAS,
    constants::MARIA_ALIAS,
    constants::JONATHAN_ALIAS,
    constants::MARIA_FULL_NAME,
    "",
];

fn main() -> Result<()> {
    let cli = Cli::parse();
    let missed_rate = cli.missed_rate.clamp(0.0, 1.0);
    let mut rng = StdRng::seed_from_u64(cli.seed);

    let mut writer = csv::Writer::from_path(&cli.output)
        .with_context(|| format!("Failed to create {}", cli.output.display()))?;
    writer.write_record([
        "Call ID",
        constants::AGENT_NAME_COLUMN,
        constants::CALL_START_COLUMN,
        constants::CALL_END_COLUMN,
        constants::TALK_TIME_COLUMN,
    ])?;

    let mut call_id = 0u64;
    for offset in 0..cli.days {
        let day = cli.start + Duration::days(i64::from(offset));
        // An occasional bad day keeps the missed-call alert interesting
        let day_missed_rate = if rng.gen_bool(0.1) {
            (missed_rate * 3.0).min(1.0)
        } else {
            missed_rate
        };
        let spread = cli.calls_per_day / 4;
        let calls = rng.gen_range(cli.calls_per_day - spread..=cli.calls_per_day + spread);

        for _ in 0..calls {
            call_id += 1;
            let Some(start) = random_start(&mut rng, day) else {
                continue;
            };
            let missed = rng.gen_bool(day_missed_rate);
            let talk = if missed {
                Duration::zero()
            } else {
                Duration::seconds(rng.gen_range(20..=1_200))
            };
            let agent = AGENT_CELLS[rng.gen_range(0..AGENT_CELLS.len())];

            writer.write_record([
                call_id.to_string(),
                agent.to_string(),
                start.format("%Y-%m-%d %H:%M:%S").to_string(),
                (start + talk + Duration::seconds(5)).format("%Y-%m-%d %H:%M:%S").to_string(),
                format_talk_time(talk),
            ])?;
        }
    }

    writer.flush()?;
    eprintln!("Wrote {} calls to {}", call_id, cli.output.display());
    Ok(())
}

/// Start times cluster in business hours with a thin tail outside them
fn random_start(rng: &mut StdRng, day: NaiveDate) -> Option<NaiveDateTime> {
    let hour = if rng.gen_bool(0.9) {
        rng.gen_range(8..20)
    } else {
        rng.gen_range(0..24)
    };
    let minute = rng.gen_range(0..60);
    let second = rng.gen_range(0..60);
    day.and_hms_opt(hour, minute, second)
}
