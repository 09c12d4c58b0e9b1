//! ## hll-accuracy
//! Runs the configured experiment for every precision and prints exact vs estimated counts.

use hll_accuracy::experiment::{
    BatchRecord, Experiment, ExperimentConfig, Mode, ReportFormat, TrialRecord,
};
use hll_accuracy::stats::standard_error;
use hll_accuracy::Error;
use tabled::settings::{Settings, Style};
use tabled::{Table, Tabled};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Tabled)]
struct SingleRow {
    batch: usize,
    consumed: String,
    exact: usize,
    estimate: String,
    relative_error: String,
}

impl SingleRow {
    fn new(r: &BatchRecord) -> Self {
        Self {
            batch: r.batch,
            consumed: format!("{:.0}%", r.consumed_percent),
            exact: r.exact,
            estimate: format!("{:.0}", r.estimate),
            relative_error: format!("{:.4}", r.relative_error),
        }
    }
}

#[derive(Tabled)]
struct TrialRow {
    batch: usize,
    consumed: String,
    mean: String,
    std_dev: String,
    relative_std_dev: String,
}

impl TrialRow {
    fn new(r: &TrialRecord) -> Self {
        Self {
            batch: r.batch,
            consumed: format!("{:.0}%", r.consumed_percent),
            mean: format!("{:.1}", r.stats.mean),
            std_dev: format!("{:.1}", r.stats.std_dev),
            relative_std_dev: format!("{:.4}", r.stats.relative_std_dev()),
        }
    }
}

fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let config = ExperimentConfig::from_env()?;
    info!(?config, "starting experiment");
    let precisions = config.precisions.clone();
    let (mode, format) = (config.mode, config.format);
    let mut experiment = Experiment::new(config)?;

    for precision in precisions {
        match mode {
            Mode::Single => {
                let records = experiment.run_single(precision)?;
                report(precision, format, &records, SingleRow::new);
            }
            Mode::Trials => {
                let records = experiment.run_trials(precision)?;
                report(precision, format, &records, TrialRow::new);
            }
        }
    }
    Ok(())
}

#[cfg(feature = "with_serde")]
fn report<R, T>(precision: u8, format: ReportFormat, records: &[R], row: impl Fn(&R) -> T)
where
    R: serde::Serialize,
    T: Tabled,
{
    if format == ReportFormat::Json {
        for record in records {
            match serde_json::to_string(record) {
                Ok(line) => println!("{line}"),
                Err(e) => tracing::error!(%e, "failed to serialize record"),
            }
        }
        return;
    }
    print_table(precision, records, row);
}

#[cfg(not(feature = "with_serde"))]
fn report<R, T>(precision: u8, format: ReportFormat, records: &[R], row: impl Fn(&R) -> T)
where
    T: Tabled,
{
    // json is rejected by config validation without serde
    debug_assert_eq!(format, ReportFormat::Table);
    print_table(precision, records, row);
}

fn print_table<R, T: Tabled>(precision: u8, records: &[R], row: impl Fn(&R) -> T) {
    let m = 1usize << precision;
    println!(
        "B = {precision} (m = {m}, expected error {:.4})\n",
        standard_error(m)
    );
    let table_config = Settings::default().with(Style::markdown());
    let rows: Vec<T> = records.iter().map(row).collect();
    println!("{}\n", Table::new(rows).with(table_config));
}
