use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use axum_prometheus::PrometheusMetricLayer;
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use clap::{Args, Parser, Subcommand};
use metrics_exporter_prometheus::PrometheusHandle;
use recruit_flow::config::AppConfig;
use recruit_flow::error::AppError;
use recruit_flow::infra::{InMemoryInterviewRepository, InMemoryRuleStore, LoggingNotifier};
use recruit_flow::telemetry;
use recruit_flow::workflows::roster::RosterImporter;
use recruit_flow::workflows::scheduling::{
    interview_router, AvailabilityQuery, AvailabilityResolver, InterviewSchedulingService,
    PartyRole, SchedulingConfig, TimeSlot,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::io::Cursor;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
struct AppState {
    readiness: Arc<AtomicBool>,
    metrics: PrometheusHandle,
}

#[derive(Parser, Debug)]
#[command(
    name = "Interview Scheduling Coordinator",
    about = "Run the interview scheduling service or inspect reviewer availability",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Work with reviewer availability from the command line
    Availability {
        #[command(subcommand)]
        command: AvailabilityCommand,
    },
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    port: Option<u16>,
    /// Roster CSV export used to seed reviewer availability rules
    #[arg(long)]
    roster_csv: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum AvailabilityCommand {
    /// Compute bookable slots from a roster export
    Preview(AvailabilityPreviewArgs),
}

#[derive(Args, Debug)]
struct AvailabilityPreviewArgs {
    /// Roster CSV export with the reviewer's recurring rules
    #[arg(long)]
    roster_csv: PathBuf,
    /// Reviewer whose calendar to preview
    #[arg(long)]
    owner: String,
    /// First day of the preview (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    from: NaiveDate,
    /// Last day of the preview, inclusive (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    to: NaiveDate,
    /// Slot length in minutes
    #[arg(long, default_value_t = 30)]
    slot_minutes: u32,
}

#[derive(Debug, Deserialize)]
struct AvailabilityPreviewRequest {
    roster_csv: String,
    owner_id: String,
    #[serde(deserialize_with = "deserialize_date")]
    from: NaiveDate,
    #[serde(deserialize_with = "deserialize_date")]
    to: NaiveDate,
    #[serde(default = "default_slot_minutes")]
    slot_minutes: u32,
    #[serde(default)]
    now: Option<DateTime<Utc>>,
}

const fn default_slot_minutes() -> u32 {
    30
}

#[derive(Debug, Serialize)]
struct AvailabilityPreviewResponse {
    owner_id: String,
    from: NaiveDate,
    to: NaiveDate,
    slot_minutes: u32,
    slots: Vec<TimeSlot>,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run_cli().await {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

async fn run_cli() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => run_server(args).await,
        Command::Availability {
            command: AvailabilityCommand::Preview(args),
        } => run_availability_preview(args),
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

fn deserialize_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_date(&raw).map_err(serde::de::Error::custom)
}

/// `[from 00:00, day-after-to 00:00)` so the last day stays inside the
/// queried range.
fn day_range(from: NaiveDate, to: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    (
        from.and_time(NaiveTime::MIN).and_utc(),
        (to + Duration::days(1)).and_time(NaiveTime::MIN).and_utc(),
    )
}

async fn run_server(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let state = AppState {
        readiness: readiness_flag.clone(),
        metrics: prometheus_handle,
    };

    let seeded_rules = match args.roster_csv.take() {
        Some(path) => RosterImporter::from_path(path)?,
        None => Vec::new(),
    };
    let rule_count = seeded_rules.len();

    let repository = Arc::new(InMemoryInterviewRepository::default());
    let rules = Arc::new(InMemoryRuleStore::with_rules(seeded_rules).backed_by(repository.clone()));
    let notifier = Arc::new(LoggingNotifier);
    let service = Arc::new(InterviewSchedulingService::new(
        repository,
        rules,
        notifier,
        SchedulingConfig {
            default_slot_minutes: config.scheduling.default_slot_minutes,
        },
    ));

    let app = Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route(
            "/api/v1/availability/preview",
            post(availability_preview_endpoint),
        )
        .with_state(state)
        .merge(interview_router(service))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, rule_count, "interview scheduling coordinator ready");

    axum::serve(listener, app).await?;
    Ok(())
}

fn run_availability_preview(args: AvailabilityPreviewArgs) -> Result<(), AppError> {
    let AvailabilityPreviewArgs {
        roster_csv,
        owner,
        from,
        to,
        slot_minutes,
    } = args;

    let rules = RosterImporter::from_path(roster_csv)?;
    let resolver = AvailabilityResolver::new(Arc::new(InMemoryRuleStore::with_rules(rules)));

    let (range_from, range_to) = day_range(from, to);
    let query = AvailabilityQuery {
        owner_id: owner.clone(),
        owner_role: PartyRole::Reviewer,
        from: range_from,
        to: range_to,
        slot_minutes,
    };
    let slots = resolver.free_slots(&query, Utc::now())?;

    render_availability_preview(&owner, from, to, slot_minutes, &slots);

    Ok(())
}

async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn readiness_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

async fn metrics_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

/// Stateless preview: slots are computed against the roster carried in the
/// request body, not the live rule store.
async fn availability_preview_endpoint(
    Json(payload): Json<AvailabilityPreviewRequest>,
) -> Result<Json<AvailabilityPreviewResponse>, AppError> {
    let AvailabilityPreviewRequest {
        roster_csv,
        owner_id,
        from,
        to,
        slot_minutes,
        now,
    } = payload;

    let rules = RosterImporter::from_reader(Cursor::new(roster_csv.into_bytes()))?;
    let resolver = AvailabilityResolver::new(Arc::new(InMemoryRuleStore::with_rules(rules)));

    let (range_from, range_to) = day_range(from, to);
    let query = AvailabilityQuery {
        owner_id: owner_id.clone(),
        owner_role: PartyRole::Reviewer,
        from: range_from,
        to: range_to,
        slot_minutes,
    };
    let slots = resolver.free_slots(&query, now.unwrap_or_else(Utc::now))?;

    Ok(Json(AvailabilityPreviewResponse {
        owner_id,
        from,
        to,
        slot_minutes,
        slots,
    }))
}

fn render_availability_preview(
    owner: &str,
    from: NaiveDate,
    to: NaiveDate,
    slot_minutes: u32,
    slots: &[TimeSlot],
) {
    println!("Availability preview for {owner}");
    println!("Window: {from} -> {to} ({slot_minutes}-minute slots)");

    if slots.is_empty() {
        println!("\nNo bookable slots in this window");
        return;
    }

    let mut current_day = None;
    for slot in slots {
        let day = slot.start.date_naive();
        if current_day != Some(day) {
            println!("\n{day}");
            current_day = Some(day);
        }
        println!(
            "- {} -> {}",
            slot.start.format("%H:%M"),
            slot.end.format("%H:%M")
        );
    }

    println!("\nTotal: {} bookable slots", slots.len());
}
