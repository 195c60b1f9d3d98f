use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use incidash::graph::render_chart;
use incidash::normalize::normalize;
use incidash::{render_dashboard, Dataset, OutputFormat, RenderOptions, Selection};
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "incidash")]
#[command(about = "Build incident dashboard charts from a CSV of attacks", long_about = None)]
struct Args {
    /// Incident data (CSV, or a JSON array of records); read from stdin when omitted
    #[arg(long)]
    data: Option<PathBuf>,

    /// "Global", a country name, or the "Select" placeholder
    #[arg(long, default_value = "Select")]
    country: String,

    /// Press the plot trigger
    #[arg(long)]
    plot: bool,

    #[arg(long, value_enum, default_value_t = Format::Json)]
    format: Format,

    /// Directory for rendered images
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// Renderer options as JSON, e.g. '{"width": 800, "frame": 2001}'
    #[arg(long)]
    options: Option<String>,

    /// Print the selector options and exit
    #[arg(long)]
    list_countries: bool,

    /// Print the canonical region names (of --country, if one is given) and exit
    #[arg(long)]
    list_regions: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Json,
    Png,
    Svg,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let dataset = load_dataset(args.data.as_deref())?;

    if args.list_countries {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        for option in Selection::options(&dataset.countries()) {
            writeln!(handle, "{option}").context("Failed to write to stdout")?;
        }
        return Ok(());
    }

    let selection = Selection::parse(&args.country);

    if args.list_regions {
        let clean = match &selection {
            Selection::Country(country) => {
                let records = dataset
                    .records
                    .iter()
                    .filter(|r| &r.country == country)
                    .cloned()
                    .collect();
                normalize(&Dataset::new(records))
            }
            Selection::Global | Selection::Placeholder => normalize(&dataset),
        };
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        for region in clean.regions() {
            writeln!(handle, "{region}").context("Failed to write to stdout")?;
        }
        return Ok(());
    }

    let dashboard = render_dashboard(&dataset, &selection, args.plot)
        .context("Failed to build dashboard")?;

    let format = match args.format {
        Format::Json => {
            let json = serde_json::to_string_pretty(&dashboard)
                .context("Failed to serialize dashboard")?;
            println!("{json}");
            return Ok(());
        }
        Format::Png => OutputFormat::Png,
        Format::Svg => OutputFormat::Svg,
    };

    let mut options: RenderOptions = match &args.options {
        Some(raw) => serde_json::from_str(raw).context("Invalid --options JSON")?,
        None => RenderOptions::default(),
    };
    options.format = format;

    fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("Failed to create {}", args.out_dir.display()))?;
    for (name, chart) in ["map", "bars", "weapons"].iter().zip(&dashboard.charts) {
        let bytes = render_chart(chart, &options)
            .with_context(|| format!("Failed to render {name} chart"))?;
        let path = args.out_dir.join(format!("{name}.{}", format.extension()));
        fs::write(&path, bytes).with_context(|| format!("Failed to write {}", path.display()))?;
        log::info!("wrote {}", path.display());
    }

    Ok(())
}

fn load_dataset(path: Option<&Path>) -> Result<Dataset> {
    let raw = match path {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read data from stdin")?;
            buffer
        }
    };

    let dataset = if raw.trim_start().starts_with('[') {
        let value: serde_json::Value = serde_json::from_str(&raw).context("Invalid JSON data")?;
        Dataset::from_json(&value)?
    } else {
        Dataset::from_reader(raw.as_bytes()).context("Failed to parse CSV data")?
    };
    log::info!("loaded {} incidents", dataset.len());
    Ok(dataset)
}
