use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use clap::Args;
use dialoguer::Input;
use plclog_config::RuntimeConfig;
use plclog_core::{generate_vibration_csv, GeneratorSpec, GeneratorSummary};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Args)]
pub struct GenerateArgs {
    /// Output CSV path (default: upload.local_path from config)
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Number of rows
    #[arg(long)]
    pub records: Option<usize>,

    /// Minimum vibration reading (mm/s)
    #[arg(long)]
    pub min: Option<f64>,

    /// Maximum vibration reading (mm/s)
    #[arg(long)]
    pub max: Option<f64>,

    /// First timestamp, e.g. 2025-06-01T08:00:00
    #[arg(long, value_name = "DATETIME")]
    pub start: Option<NaiveDateTime>,

    /// Minutes between rows
    #[arg(long, value_name = "MINUTES")]
    pub interval: Option<i64>,

    /// RNG seed for reproducible output
    #[arg(long)]
    pub seed: Option<u64>,

    /// Prompt for values not given as flags
    #[arg(short, long)]
    pub interactive: bool,
}

impl GenerateArgs {
    fn spec(&self) -> Result<GeneratorSpec> {
        let defaults = GeneratorSpec::default();
        let start = match self.start {
            Some(start) => start,
            None if self.interactive => {
                let date: NaiveDate =
                    prompt_or(None, "Start date (YYYY-MM-DD)", defaults.start.date())?;
                let time: NaiveTime =
                    prompt_or(None, "Start time (HH:MM:SS)", defaults.start.time())?;
                date.and_time(time)
            }
            None => defaults.start,
        };

        Ok(GeneratorSpec {
            num_records: self.value(self.records, "Number of records", defaults.num_records)?,
            min_vibration: self.value(self.min, "Minimum vibration", defaults.min_vibration)?,
            max_vibration: self.value(self.max, "Maximum vibration", defaults.max_vibration)?,
            start,
            interval_minutes: self.value(
                self.interval,
                "Minutes between records",
                defaults.interval_minutes,
            )?,
        })
    }

    fn output_path(&self, config: &RuntimeConfig) -> Result<PathBuf> {
        let default = config.upload.local_path.clone();
        let path = match &self.output {
            Some(path) => path.clone(),
            None => PathBuf::from(self.value(None, "Output file", default)?),
        };
        Ok(path)
    }

    fn value<T>(&self, given: Option<T>, prompt: &str, default: T) -> Result<T>
    where
        T: Clone + ToString + std::str::FromStr,
        <T as std::str::FromStr>::Err: ToString,
    {
        if self.interactive {
            prompt_or(given, prompt, default)
        } else {
            Ok(given.unwrap_or(default))
        }
    }
}

fn prompt_or<T>(given: Option<T>, prompt: &str, default: T) -> Result<T>
where
    T: Clone + ToString + std::str::FromStr,
    <T as std::str::FromStr>::Err: ToString,
{
    match given {
        Some(value) => Ok(value),
        None => Ok(Input::new()
            .with_prompt(prompt)
            .default(default)
            .interact_text()?),
    }
}

/// Write a generated log to `path`
pub fn generate_to_file<R: Rng>(
    path: &Path,
    spec: &GeneratorSpec,
    rng: &mut R,
) -> Result<GeneratorSummary> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create '{}'", path.display()))?;
    let mut out = BufWriter::new(file);
    let summary = generate_vibration_csv(&mut out, spec, rng)?;
    out.flush()
        .with_context(|| format!("Failed to write '{}'", path.display()))?;
    Ok(summary)
}

pub(crate) fn execute(args: GenerateArgs, config: &RuntimeConfig) -> Result<()> {
    let path = args.output_path(config)?;
    let spec = args.spec()?;

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let summary = generate_to_file(&path, &spec, &mut rng)?;
    info!(
        path = %path.display(),
        records = summary.records,
        "Generated vibration log"
    );
    println!(
        "Wrote {} records to {} ({} .. {})",
        summary.records,
        path.display(),
        summary.first,
        summary.last
    );
    Ok(())
}
