//! CultureMap - cultural venue analytics
//!
//! A CLI tool that aggregates a dataset of cultural venues and their
//! events into dashboards, chart SVGs, region listings and reports.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (dataset, config, session, output, etc.)
//!   2 - Mean rating below the `report --fail-below` threshold

mod analysis;
mod chart;
mod cli;
mod config;
mod dataset;
mod detail;
mod models;
mod report;
mod session;

use analysis::{
    aggregate, available_kinds, available_segments, group_regions, map_markers, EventWindow,
    PlaceFilter, RegionQuery, ReportScope,
};
use anyhow::{bail, Context, Result};
use chart::{bar_geometry, line_geometry, pie_geometry, render_dashboard};
use cli::{Args, Command, ReportFormat, ShowTarget};
use config::{Config, CONFIG_FILE};
use dataset::{DatasetSource, LoadOptions};
use models::{Dashboard, PlaceRecord, Series};
use report::ReportOptions;
use session::{Session, SessionStore, User};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle init-config early (no logging needed)
    if matches!(args.command, Command::InitConfig) {
        return handle_init_config();
    }

    // Load configuration before logging so its verbose flag applies
    let (mut config, origin) = match load_config(&args) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    };
    config.merge_with_args(&args);

    // Initialize logging
    init_logging(args.log_level(config.general.verbose));

    info!("CultureMap v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);
    origin.log();

    match run(args, config).await {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Command failed: {}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle init-config: generate a default .culturemap.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(CONFIG_FILE);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            CONFIG_FILE
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).with_context(|| format!("Failed to write {}", CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE);
    println!("   Edit it to set the dataset, chart sizes, report options, and more.");
    Ok(())
}

/// Initialize logging at the given level.
fn init_logging(level: tracing::Level) {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Where the configuration came from. Logged once the subscriber is up.
#[derive(Debug)]
enum ConfigOrigin {
    Explicit(PathBuf),
    DefaultFile,
    Builtin,
    Broken(String),
}

impl ConfigOrigin {
    fn log(&self) {
        match self {
            ConfigOrigin::Explicit(path) => info!("Loaded config from: {}", path.display()),
            ConfigOrigin::DefaultFile => info!("Loaded default config from {}", CONFIG_FILE),
            ConfigOrigin::Builtin => debug!("No config file found, using defaults"),
            ConfigOrigin::Broken(e) => warn!("Failed to load config: {}", e),
        }
    }
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<(Config, ConfigOrigin)> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        let config = Config::load(config_path)?;
        return Ok((config, ConfigOrigin::Explicit(config_path.clone())));
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => Ok((config, ConfigOrigin::DefaultFile)),
        Ok(None) => Ok((Config::default(), ConfigOrigin::Builtin)),
        Err(e) => Ok((Config::default(), ConfigOrigin::Broken(e.to_string()))),
    }
}

/// Banner printed before loading the dataset, suppressed by `--quiet`.
fn loading_banner(source: &DatasetSource, quiet: bool) -> Option<String> {
    (!quiet).then(|| format!("📥 Loading dataset: {}", source))
}

/// Run the selected command. Returns the exit code (0 or 2).
async fn run(args: Args, config: Config) -> Result<i32> {
    let store = SessionStore::new(&config.session.path);

    if !args.needs_dataset() {
        return run_session_command(&args.command, &store);
    }

    let source = DatasetSource::parse(&config.general.dataset);
    let options = LoadOptions {
        show_progress: !args.quiet,
        timeout: Duration::from_secs(config.general.timeout_seconds),
    };

    let start_time = Instant::now();
    if let Some(banner) = loading_banner(&source, args.quiet) {
        println!("{}", banner);
    }
    let places = dataset::load_places(&source, &options).await?;
    debug!("Dataset loaded in {:.2}s", start_time.elapsed().as_secs_f64());

    match args.command {
        Command::Dashboard { export_csv, json } => {
            handle_dashboard(&places, export_csv.as_deref(), json)?;
            Ok(0)
        }
        Command::Charts { out, json } => {
            handle_charts(&places, &config, out, json)?;
            Ok(0)
        }
        Command::Map {
            kind,
            segment,
            min_rating,
            min_participants,
            json,
        } => {
            let filter = PlaceFilter {
                kind,
                segment,
                min_rating,
                min_participants,
            };
            handle_map(&places, &filter, json)?;
            Ok(0)
        }
        Command::Regions {
            search,
            kind,
            page,
            per_page,
            json,
        } => {
            let query = RegionQuery {
                search,
                kind,
                page,
                per_page: per_page.unwrap_or(config.regions.per_page),
            };
            handle_regions(&places, &query, json)?;
            Ok(0)
        }
        Command::Show { target } => {
            handle_show(&places, &target)?;
            Ok(0)
        }
        Command::Report {
            format,
            output,
            region,
            segment,
            from,
            to,
            top,
            fail_below,
        } => {
            let scope = ReportScope {
                region,
                segment,
                window: EventWindow { from, to },
            };
            let request = ReportRequest {
                format,
                output,
                scope,
                top: top.unwrap_or(config.report.top_places),
                fail_below,
            };
            handle_report(&places, &source, &config, &store, request)
        }
        Command::Login { .. } | Command::Logout | Command::Whoami | Command::InitConfig => Ok(0),
    }
}

/// Commands that only touch the session file.
fn run_session_command(command: &Command, store: &SessionStore) -> Result<i32> {
    match command {
        Command::Login {
            name,
            email,
            token,
            role,
        } => {
            let session = Session {
                token: token.clone(),
                user: User {
                    name: name.clone(),
                    email: email.clone(),
                    role: *role,
                },
            };
            store.save(&session)?;
            println!("✅ Signed in as {} <{}> ({})", name, email, role);
            println!("   Session stored in {}", store.path().display());
        }
        Command::Logout => {
            if store.clear()? {
                println!("👋 Signed out.");
            } else {
                println!("   Not signed in.");
            }
        }
        Command::Whoami => match store.load()? {
            Some(session) => println!(
                "👤 {} <{}> ({})",
                session.user.name, session.user.email, session.user.role
            ),
            None => println!("   Not signed in."),
        },
        _ => {}
    }

    Ok(0)
}

fn print_series(title: &str, series: &Series) {
    println!("\n{}", title);
    if series.is_empty() {
        println!("   No data available");
        return;
    }
    for entry in series {
        println!("   {:<30} {}", entry.label, chart::format_number(entry.value));
    }
}

fn print_dashboard(dashboard: &Dashboard) {
    let summary = &dashboard.summary;

    println!("\n📊 Dashboard:");
    println!("   Events: {}", summary.total_events);
    println!("   Participants: {}", summary.total_participants);
    println!("   Regions: {}", summary.total_regions);
    println!("   Mean rating: {}", summary.mean_rating_display());

    print_series("🎭 Events by segment:", &dashboard.by_segment);
    print_series("📅 Participants by month:", &dashboard.by_month);
    print_series("📍 Events by region:", &dashboard.by_region);
    print_series("👥 Participants by age bracket:", &dashboard.by_age_bracket);
}

fn handle_dashboard(places: &[PlaceRecord], export_csv: Option<&Path>, json: bool) -> Result<()> {
    let dashboard = aggregate(places);

    if json {
        println!("{}", serde_json::to_string_pretty(&dashboard)?);
    } else {
        print_dashboard(&dashboard);
    }

    if let Some(path) = export_csv {
        report::export_series_csv(&dashboard.by_segment, path)?;
        println!("\n✅ Segment series exported to: {}", path.display());
    }

    Ok(())
}

fn handle_charts(
    places: &[PlaceRecord],
    config: &Config,
    out: Option<PathBuf>,
    json: bool,
) -> Result<()> {
    let dashboard = aggregate(places);
    let frame = config.charts.frame();
    let pie = config.charts.pie_frame();

    if json {
        let geometry = serde_json::json!({
            "segments": pie_geometry(&dashboard.by_segment, pie),
            "participants_by_month": line_geometry(&dashboard.by_month, frame),
            "events_by_region": bar_geometry(&dashboard.by_region, None),
            "age_brackets": pie_geometry(&dashboard.by_age_bracket, pie),
        });
        println!("{}", serde_json::to_string_pretty(&geometry)?);
        return Ok(());
    }

    let out_dir = out.unwrap_or_else(|| PathBuf::from(&config.general.output_dir));
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;

    for chart in render_dashboard(&dashboard, frame, pie) {
        let path = out_dir.join(chart.file_name);
        std::fs::write(&path, &chart.svg)
            .with_context(|| format!("Failed to write chart to {}", path.display()))?;
        info!("Wrote {}", path.display());
        if chart.has_data {
            println!("   🖼️  {} -> {}", chart.title, path.display());
        } else {
            println!("   ⚪ {} -> {} (no data)", chart.title, path.display());
        }
    }

    println!("\n✅ Charts saved to: {}", out_dir.display());
    Ok(())
}

fn handle_map(places: &[PlaceRecord], filter: &PlaceFilter, json: bool) -> Result<()> {
    let matching: Vec<PlaceRecord> = filter.apply(places).into_iter().cloned().collect();
    let markers = map_markers(&matching);

    if json {
        println!("{}", serde_json::to_string_pretty(&markers)?);
        return Ok(());
    }

    if !filter.is_active() {
        println!("   Kinds: {}", available_kinds(places).join(", "));
        println!("   Segments: {}", available_segments(places).join(", "));
    }

    println!("\n🗺️  {} of {} places:", markers.len(), places.len());
    for marker in &markers {
        println!(
            "   [{}] {} ({}) at {:.4}, {:.4} - {} events, {} participants, rating {:.1}",
            marker.icon,
            marker.name,
            marker.kind,
            marker.latitude,
            marker.longitude,
            marker.total_events,
            marker.participants,
            marker.rating
        );
    }

    Ok(())
}

fn handle_regions(places: &[PlaceRecord], query: &RegionQuery, json: bool) -> Result<()> {
    let regions = group_regions(places);
    let page = query.run(&regions);

    if json {
        println!("{}", serde_json::to_string_pretty(&page.items)?);
        return Ok(());
    }

    println!(
        "\n📍 Regions: {} matches, {} events, population {}",
        page.total_matches, page.total_events, page.total_population
    );
    for region in &page.items {
        println!(
            "   #{:<3} {:<40} {:<7} {:<3} {:>10} {:>4} events",
            region.id, region.name, region.kind.key(), region.state, region.population, region.total_events
        );
    }
    if page.items.is_empty() {
        println!("   No regions on this page.");
    }
    println!("   Page {} of {}", page.page, page.total_pages);

    Ok(())
}

fn handle_show(places: &[PlaceRecord], target: &ShowTarget) -> Result<()> {
    let detail = match target {
        ShowTarget::Place { name } => detail::find_place(places, name),
        ShowTarget::Region { name } => detail::find_region(&group_regions(places), name),
    };

    match detail {
        Some(detail) => {
            debug!("Showing {}", detail.title());
            print!("{}", detail.render());
            Ok(())
        }
        None => match target {
            ShowTarget::Place { name } => bail!("No place named '{}'", name),
            ShowTarget::Region { name } => bail!("No region named '{}'", name),
        },
    }
}

/// Parameters of the report command after config defaults are applied.
struct ReportRequest {
    format: ReportFormat,
    output: Option<PathBuf>,
    scope: ReportScope,
    top: usize,
    fail_below: Option<f64>,
}

fn handle_report(
    places: &[PlaceRecord],
    source: &DatasetSource,
    config: &Config,
    store: &SessionStore,
    request: ReportRequest,
) -> Result<i32> {
    let session = if config.report.require_session || config.report.require_admin {
        let session = store.require()?;
        if config.report.require_admin {
            session.require_admin()?;
        }
        Some(session)
    } else {
        store.load()?
    };

    println!("\n📝 Generating report...");
    let report = report::build_report(
        places,
        &request.scope,
        &source.to_string(),
        session.map(|s| s.user.name),
        request.top,
    );

    let options = ReportOptions {
        include_charts: config.report.include_charts,
        frame: config.charts.frame(),
        pie: config.charts.pie_frame(),
    };

    let output = match request.format {
        ReportFormat::Markdown => report::generate_markdown_report(&report, &options),
        ReportFormat::Json => report::generate_json_report(&report)?,
        ReportFormat::Csv => report::generate_csv_report(&report)?,
        ReportFormat::Html => report::generate_html_report(&report, &options),
    };

    let path = request.output.unwrap_or_else(|| {
        Path::new(&config.general.output_dir)
            .join(format!("culturemap_report.{}", request.format.extension()))
    });
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    std::fs::write(&path, &output)
        .with_context(|| format!("Failed to write report to {}", path.display()))?;

    let summary = &report.dashboard.summary;
    println!("\n📊 Report Summary:");
    println!("   Scope: {}", report.metadata.scope);
    println!("   Places: {}", report.metadata.places_considered);
    println!("   Events: {}", summary.total_events);
    println!("   Participants: {}", summary.total_participants);
    println!("   Mean rating: {}", summary.mean_rating_display());
    println!("\n✅ Report saved to: {}", path.display());

    // Check --fail-below threshold
    if let Some(threshold) = request.fail_below {
        match summary.mean_rating {
            Some(rating) if rating < threshold => {
                eprintln!(
                    "\n⛔ Mean rating {:.1} is below {:.1}. Failing (exit code 2).",
                    rating, threshold
                );
                return Ok(2);
            }
            Some(_) => {}
            None => warn!("No places in scope, skipping --fail-below check"),
        }
    }

    Ok(0)
}
