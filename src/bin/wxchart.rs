use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use wxchart_rs::config::{LocationMode, WidgetConfig};
use wxchart_rs::panel::DEFAULT_SELECTION;
use wxchart_rs::viz::{ChartSurface, DEFAULT_HEIGHT, DEFAULT_WIDTH};
use wxchart_rs::{Client, LabelStyle, panel, stats, storage};

#[derive(Parser, Debug)]
#[command(
    name = "wxchart",
    version,
    about = "Fetch hourly Open-Meteo forecasts and chart them by unit"
)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch, draw a chart (and optionally save data and print stats).
    Plot(PlotArgs),
    /// Print the forecast request URL without fetching.
    Url(RequestArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum OutFormat {
    Csv,
    Json,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Location {
    /// Always use the built-in point (-37.814, 144.9633).
    Pinned,
    /// Use --latitude/--longitude (or the config file).
    Configured,
}

#[derive(Args, Debug)]
struct RequestArgs {
    /// Hourly parameters separated by comma or semicolon (default: temperature_2m,rain)
    #[arg(short = 'p', long)]
    hourly: Option<String>,
    /// Weather model (e.g., bom_access_global)
    #[arg(short, long)]
    model: Option<String>,
    /// Chart title
    #[arg(short, long)]
    title: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    latitude: Option<f64>,
    #[arg(long, allow_hyphen_values = true)]
    longitude: Option<f64>,
    /// Where the request coordinates come from.
    #[arg(long, value_enum)]
    location: Option<Location>,
    /// JSON widget config; command-line flags win over its keys.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Forecast endpoint override.
    #[arg(long)]
    endpoint: Option<String>,
}

#[derive(Args, Debug)]
struct PlotArgs {
    #[command(flatten)]
    request: RequestArgs,
    /// Chart path (.svg or .png).
    #[arg(long, default_value = "weather.svg")]
    plot: PathBuf,
    #[arg(long, default_value_t = DEFAULT_WIDTH)]
    width: u32,
    #[arg(long, default_value_t = DEFAULT_HEIGHT)]
    height: u32,
    /// Locale for tick labels and timestamps (en, de, fr, ...).
    #[arg(long, default_value = "en")]
    locale: String,
    /// Save the plotted series to file (format inferred by --format or extension).
    #[arg(long)]
    out: Option<PathBuf>,
    /// Output format (csv or json). If omitted, inferred from --out extension.
    #[arg(long, value_enum)]
    format: Option<OutFormat>,
    /// Print per-series statistics to stdout.
    #[arg(long, default_value_t = false)]
    stats: bool,
}

fn fmt_opt(v: Option<f64>) -> String {
    match v {
        Some(x) if x.is_finite() => {
            // Format up to 4 decimals, then trim trailing zeros and trailing dot.
            let s = format!("{:.4}", x);
            s.trim_end_matches('0').trim_end_matches('.').to_string()
        }
        _ => "NA".to_string(),
    }
}

fn parse_list(s: &str) -> Vec<String> {
    s.split([',', ';'])
        .map(|x| x.trim().to_string())
        .filter(|x| !x.is_empty())
        .collect()
}

fn load_config(args: &RequestArgs) -> Result<WidgetConfig> {
    let mut cfg = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            WidgetConfig::from_json_str(&text)
                .with_context(|| format!("parsing {}", path.display()))?
        }
        None => WidgetConfig::default(),
    };
    if let Some(h) = &args.hourly {
        cfg.hourly = parse_list(h);
    }
    if args.model.is_some() {
        cfg.models = args.model.clone();
    }
    if args.title.is_some() {
        cfg.title = args.title.clone();
    }
    if args.latitude.is_some() {
        cfg.latitude = args.latitude;
    }
    if args.longitude.is_some() {
        cfg.longitude = args.longitude;
    }
    match args.location {
        Some(Location::Pinned) => cfg.location = LocationMode::Pinned,
        Some(Location::Configured) => cfg.location = LocationMode::Configured,
        None => {}
    }
    // Same starting toggles as the interactive panel.
    if cfg.hourly.is_empty() {
        cfg.hourly = DEFAULT_SELECTION.iter().map(|p| p.to_string()).collect();
    }
    Ok(cfg)
}

fn request_builder(cfg: &WidgetConfig, args: &RequestArgs) -> wxchart_rs::RequestBuilder {
    let builder = cfg.request_builder();
    match &args.endpoint {
        Some(e) => builder.with_endpoint(e.clone()),
        None => builder,
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    match cli.cmd {
        Command::Plot(args) => cmd_plot(args),
        Command::Url(args) => cmd_url(args),
    }
}

fn cmd_url(args: RequestArgs) -> Result<()> {
    let cfg = load_config(&args)?;
    println!("{}", request_builder(&cfg, &args).build(&cfg.to_request_config()));
    Ok(())
}

fn cmd_plot(args: PlotArgs) -> Result<()> {
    let cfg = load_config(&args.request)?;
    let builder = request_builder(&cfg, &args.request);
    let request = cfg.to_request_config();

    let mut surface =
        ChartSurface::file(&args.plot, args.width, args.height).with_locale(&args.locale);
    let grouped = panel::run_once(
        &Client::default(),
        &builder,
        &request,
        &mut surface,
        LabelStyle::for_locale(&args.locale),
    )?;
    eprintln!(
        "Wrote chart with {} series on {} axes to {}",
        grouped.series.len(),
        grouped.axes.len(),
        args.plot.display()
    );

    if let Some(path) = args.out.as_ref() {
        let fmt = match args.format {
            Some(OutFormat::Csv) => "csv",
            Some(OutFormat::Json) => "json",
            None => path.extension().and_then(|e| e.to_str()).unwrap_or("csv"),
        }
        .to_ascii_lowercase();
        match fmt.as_str() {
            "csv" => storage::save_csv(&grouped, path)?,
            "json" => storage::save_json(&grouped, path)?,
            other => anyhow::bail!("unsupported format: {}", other),
        }
        eprintln!(
            "Saved {} series x {} rows to {}",
            grouped.series.len(),
            grouped.labels.len(),
            path.display()
        );
    }

    if args.stats {
        for s in stats::series_summary(&grouped.series) {
            println!(
                "{} [{}]  count={} missing={}  min={} max={} mean={} median={}",
                s.parameter,
                s.unit,
                s.count,
                s.missing,
                fmt_opt(s.min),
                fmt_opt(s.max),
                fmt_opt(s.mean),
                fmt_opt(s.median)
            );
        }
    }

    Ok(())
}
