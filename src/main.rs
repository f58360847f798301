use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use indicatif::ProgressBar;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use shp_segments::MapSession;
use shp_segments::config::UploadLimits;
use shp_segments::output::to_geojson;
use shp_segments::status::Status;

#[derive(Parser)]
#[command(about = "Load zipped shapefiles and split lines into colored segments")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Largest accepted upload, in megabytes
    #[arg(long, global = true, default_value_t = UploadLimits::default().max_file_size_mb())]
    max_size_mb: u64,

    /// How status messages are printed
    #[arg(long, global = true, value_enum, default_value_t = StatusFormat::Text)]
    status_format: StatusFormat,

    /// Hide a graphic (e.g. graphic-3) before export; repeatable
    #[arg(long, global = true)]
    hide: Vec<String>,
}

#[derive(Subcommand)]
enum Command {
    /// List the features found in a zipped shapefile
    Info {
        zip: PathBuf,

        /// Print the listing as JSON
        #[arg(long)]
        json: bool,
    },
    /// Convert a zipped shapefile to GeoJSON
    Convert {
        zip: PathBuf,

        /// Output GeoJSON path
        #[arg(short, long, default_value = "features.geojson")]
        output: PathBuf,
    },
    /// Split lines and polygon rings into two-vertex segments
    Split {
        zip: PathBuf,

        /// Output GeoJSON path
        #[arg(short, long, default_value = "segments.geojson")]
        output: PathBuf,

        /// Leave segments uncolored
        #[arg(long)]
        no_style: bool,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum StatusFormat {
    Text,
    Html,
}

impl StatusFormat {
    fn render(self, status: &Status) -> String {
        match self {
            Self::Text => status.to_string(),
            Self::Html => status.to_html(),
        }
    }
}

fn load(session: &mut MapSession, zip: &Path) -> Result<()> {
    let pb = ProgressBar::new_spinner();
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(format!("Loading {}...", zip.display()));
    let result = session.upload_file(zip);
    pb.finish_and_clear();
    result.with_context(|| format!("Failed to load {}", zip.display()))?;
    Ok(())
}

fn write_output(session: &MapSession, output: &Path) -> Result<()> {
    let geojson = to_geojson(session.graphics(), session.extent());
    let json = serde_json::to_string_pretty(&geojson)?;
    std::fs::write(output, json)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    eprintln!("Wrote {}", output.display());
    Ok(())
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let format = cli.status_format;

    let mut session = MapSession::new(UploadLimits::with_max_size_mb(cli.max_size_mb));
    session
        .service_mut()
        .upload_status
        .subscribe(move |status| eprintln!("{}", format.render(status)));

    let outcome = run(&mut session, &cli);
    if let Some(message) = session.upload_message() {
        eprintln!("{}", format.render(message));
    }
    outcome
}

fn run(session: &mut MapSession, cli: &Cli) -> Result<()> {
    match &cli.command {
        Command::Info { zip, json } => {
            load(session, zip)?;
            apply_hidden(session, &cli.hide);
            let info = session.graphics_info();
            if *json {
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                for row in &info {
                    let hidden = if row.visible { "" } else { " (hidden)" };
                    println!("{}\t{}\t{}{}", row.id, row.geometry_type, row.title, hidden);
                }
            }
            if let Some(wkt) = session.service().projection() {
                eprintln!("Spatial reference: {wkt}");
            }
            if let Some(extent) = session.extent() {
                eprintln!(
                    "Extent: ({}, {}) - ({}, {})",
                    extent.min().x,
                    extent.min().y,
                    extent.max().x,
                    extent.max().y
                );
            }
        }
        Command::Convert { zip, output } => {
            load(session, zip)?;
            apply_hidden(session, &cli.hide);
            eprintln!("{} features", session.graphics_count());
            write_output(session, output)?;
        }
        Command::Split {
            zip,
            output,
            no_style,
        } => {
            load(session, zip)?;
            let created = session.split_lines(!*no_style)?;
            apply_hidden(session, &cli.hide);
            eprintln!("Created {created} segments");
            write_output(session, output)?;
        }
    }
    Ok(())
}

fn apply_hidden(session: &mut MapSession, ids: &[String]) {
    for id in ids {
        session.toggle_graphic_visibility(id);
    }
}
