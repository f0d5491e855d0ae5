mod dashes;
mod output;
mod plot;

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process;

use atty::Stream;
use clap::Parser;
use colored::{Color, ColoredString, Colorize};
use env_logger::{Builder, Env};
use log::{error, Level};

use vmplaces_logs::config::{ENERGY_FILE, EVENTS_DIR, RUN_LOG_FILE};
use vmplaces_logs::energy::read_energy_table;
use vmplaces_logs::events::{read_events_dir, LogDiagnostics};
use vmplaces_logs::run_log::read_run_log;
use vmplaces_logs::summary::{format_table, save_summary, summarize};
use vmplaces_logs::{ExperimentStats, ReportError};

use crate::output::find_filename;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
/// Draws the energy, live host and running VM charts of a VM placement experiment
struct Args {
    /// Experiment directory containing run_all.log, energy.dat and events/
    experiment: PathBuf,
}

fn colored_level(level: Level) -> ColoredString {
    let color = match level {
        Level::Error => Color::Red,
        Level::Warn => Color::Yellow,
        Level::Info => Color::Green,
        Level::Debug => Color::Blue,
        Level::Trace => Color::Magenta,
    };
    let name = level.as_str();
    if atty::is(Stream::Stderr) {
        name.color(color)
    } else {
        name.normal()
    }
}

fn init_logger() {
    Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            writeln!(
                buf,
                "[{:<5} {}] {}",
                colored_level(record.level()),
                record.target(),
                record.args()
            )
        })
        .init();
}

/// Reads the experiment directory and writes the charts and the summary into `out_dir`.
fn run(experiment: &Path, out_dir: &Path) -> Result<(), ReportError> {
    let mut stats = ExperimentStats::new();
    read_run_log(&experiment.join(RUN_LOG_FILE), &mut stats)?;
    read_events_dir(&experiment.join(EVENTS_DIR), &mut stats, &mut LogDiagnostics::default())?;
    read_energy_table(&experiment.join(ENERGY_FILE), &mut stats)?;
    stats.close_host_population();

    plot::plot_energy(&stats, out_dir)?;
    plot::plot_host_population(&stats, out_dir)?;
    plot::plot_vm_population(&stats, out_dir)?;

    let records = summarize(&stats);
    print!("{}", format_table(&records));
    let load = stats.load_params();
    let path = find_filename(out_dir, &format!("summary_{}_{}", load.mean, load.std), "csv");
    save_summary(&records, &path)?;
    println!("Saved summary as {}", path.display());
    Ok(())
}

fn main() {
    let args = Args::parse();
    init_logger();

    // outputs go to the working directory
    if let Err(e) = run(&args.experiment, Path::new("")) {
        error!("{}", e);
        process::exit(e.exit_code());
    }
}
