//! Referee console: single binary web server exposing the match engine over REST.
//! Run with: cargo run --bin console
//! Listens on 0.0.0.0:8080 by default. Override with env: HOST, PORT.
//! The authoritative scoring backend is reached via env: BACKEND_URL
//! (e.g. https://scores.example.org).

use actix_web::{
    delete, get, post, put,
    web::{Data, Json, Path, Query},
    App, HttpResponse, HttpServer, Responder,
};
use chrono::{DateTime, Utc};
use racket_score_console::{
    HttpScoreService, MatchError, MatchId, MatchRecord, ParticipantId, PushEvent, RulesConfig,
    ScoreSync, ServePatch, Side, Slot, SyncError,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use uuid::Uuid;

/// Per-match entry: synchronized aggregate + last activity time (for auto-cleanup).
struct MatchEntry {
    sync: ScoreSync<HttpScoreService>,
    last_activity: Instant,
}

/// In-memory state: tracked matches by id. Entries are removed after 12h inactivity.
struct ConsoleState {
    matches: RwLock<HashMap<MatchId, MatchEntry>>,
    service: Arc<HttpScoreService>,
}

type AppState = Data<ConsoleState>;

/// Inactivity threshold: matches not touched for this long are removed.
const INACTIVITY_TIMEOUT: Duration = Duration::from_secs(12 * 3600);

#[derive(serde::Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(serde::Deserialize)]
struct OpenMatchBody {
    /// Authoritative match id; a fresh id is generated when absent.
    id: Option<MatchId>,
    #[serde(default)]
    rules: RulesConfig,
    /// Side A participants in listed order (first → slot 1, second → slot 2).
    #[serde(default)]
    side_a: Vec<ParticipantId>,
    #[serde(default)]
    side_b: Vec<ParticipantId>,
    scheduled_at: Option<DateTime<Utc>>,
    #[serde(default)]
    auto_next: bool,
}

#[derive(serde::Deserialize)]
struct PointBody {
    side: Side,
    delta: i32,
}

#[derive(serde::Deserialize)]
struct GameScoreBody {
    a: u32,
    b: u32,
}

#[derive(serde::Deserialize)]
struct EarlyFinalizeBody {
    winner: Option<Side>,
    #[serde(default)]
    keep_current_score: bool,
}

#[derive(serde::Deserialize)]
struct WinnerBody {
    winner: Option<Side>,
}

#[derive(serde::Deserialize)]
struct CourtBody {
    court_id: Uuid,
}

#[derive(serde::Deserialize)]
struct ServeSlotQuery {
    participant: ParticipantId,
    side: Side,
}

#[derive(serde::Serialize)]
struct ServeSlotResponse {
    participant: ParticipantId,
    side: Side,
    slot: Option<Slot>,
}

/// Path segment: match id (e.g. /api/matches/{id}).
#[derive(serde::Deserialize)]
struct MatchPath {
    id: MatchId,
}

/// Path segments: match id and game index (e.g. /api/matches/{id}/games/{index}).
#[derive(serde::Deserialize)]
struct MatchGamePath {
    id: MatchId,
    index: usize,
}

fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(serde_json::json!({ "error": "No such match" }))
}

/// Map engine/sync failures to HTTP: validation → 400, conflict → 409, transport → 502.
fn error_response(e: &SyncError) -> HttpResponse {
    let body = serde_json::json!({ "error": e.to_string() });
    match e {
        SyncError::Local(MatchError::GameIncomplete) => HttpResponse::Conflict().json(body),
        SyncError::Local(_) => HttpResponse::BadRequest().json(body),
        SyncError::Remote(remote) if remote.is_conflict() => HttpResponse::Conflict().json(body),
        SyncError::Remote(_) => HttpResponse::BadGateway().json(body),
    }
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "racket-score-console",
    })
}

/// Open (start tracking) a match on this console. Responds 201 with the new
/// record. Re-opening an already-tracked id is idempotent: the existing entry
/// (its rules, slots, and live score) wins, the supplied body is ignored, and
/// the response is 200 with the current state.
#[post("/api/matches")]
async fn api_open_match(state: AppState, body: Json<OpenMatchBody>) -> HttpResponse {
    if let Err(e) = body.rules.validate() {
        return HttpResponse::BadRequest().json(serde_json::json!({ "error": e.to_string() }));
    }
    let mut matches = state.matches.write().await;
    if let Some(id) = body.id {
        if let Some(entry) = matches.get_mut(&id) {
            entry.last_activity = Instant::now();
            return HttpResponse::Ok().json(entry.sync.state());
        }
    }
    let mut record = MatchRecord::new(body.rules);
    if let Some(id) = body.id {
        record.id = id;
    }
    record.scheduled_at = body.scheduled_at;
    record.slots_base.assign(Side::A, &body.side_a);
    record.slots_base.assign(Side::B, &body.side_b);
    let id = record.id;
    let sync = ScoreSync::new(record, state.service.clone()).with_auto_next(body.auto_next);
    let entry = matches.entry(id).or_insert(MatchEntry {
        sync,
        last_activity: Instant::now(),
    });
    HttpResponse::Created().json(entry.sync.state())
}

/// Get a tracked match (404 if unknown). Touching it refreshes last_activity.
#[get("/api/matches/{id}")]
async fn api_get_match(state: AppState, path: Path<MatchPath>) -> HttpResponse {
    let mut matches = state.matches.write().await;
    match matches.get_mut(&path.id) {
        Some(entry) => {
            entry.last_activity = Instant::now();
            HttpResponse::Ok().json(entry.sync.state())
        }
        None => not_found(),
    }
}

/// Start the match (scheduled → live).
#[post("/api/matches/{id}/start")]
async fn api_start_match(state: AppState, path: Path<MatchPath>) -> HttpResponse {
    let mut matches = state.matches.write().await;
    let entry = match matches.get_mut(&path.id) {
        Some(e) => e,
        None => return not_found(),
    };
    entry.last_activity = Instant::now();
    match entry.sync.start().await {
        Ok(()) => HttpResponse::Ok().json(entry.sync.state()),
        Err(e) => error_response(&e),
    }
}

/// Point up/down on the current game.
#[post("/api/matches/{id}/points")]
async fn api_increment_point(
    state: AppState,
    path: Path<MatchPath>,
    body: Json<PointBody>,
) -> HttpResponse {
    let mut matches = state.matches.write().await;
    let entry = match matches.get_mut(&path.id) {
        Some(e) => e,
        None => return not_found(),
    };
    entry.last_activity = Instant::now();
    match entry.sync.increment_point(body.side, body.delta).await {
        Ok(()) => HttpResponse::Ok().json(entry.sync.state()),
        Err(e) => error_response(&e),
    }
}

/// Set a game's score directly (referee correction).
#[put("/api/matches/{id}/games/{index}")]
async fn api_set_game_score(
    state: AppState,
    path: Path<MatchGamePath>,
    body: Json<GameScoreBody>,
) -> HttpResponse {
    let mut matches = state.matches.write().await;
    let entry = match matches.get_mut(&path.id) {
        Some(e) => e,
        None => return not_found(),
    };
    entry.last_activity = Instant::now();
    match entry.sync.set_game_score(path.index, body.a, body.b).await {
        Ok(()) => HttpResponse::Ok().json(entry.sync.state()),
        Err(e) => error_response(&e),
    }
}

/// Open the next game (409 when the current game is incomplete and auto-next is off).
#[post("/api/matches/{id}/games/next")]
async fn api_next_game(state: AppState, path: Path<MatchPath>) -> HttpResponse {
    let mut matches = state.matches.write().await;
    let entry = match matches.get_mut(&path.id) {
        Some(e) => e,
        None => return not_found(),
    };
    entry.last_activity = Instant::now();
    match entry.sync.next_game().await {
        Ok(()) => HttpResponse::Ok().json(entry.sync.state()),
        Err(e) => error_response(&e),
    }
}

/// Administratively close the current game (400 with TieBreakRequired on a
/// tie with no explicit winner).
#[post("/api/matches/{id}/games/finalize-early")]
async fn api_early_finalize(
    state: AppState,
    path: Path<MatchPath>,
    body: Json<EarlyFinalizeBody>,
) -> HttpResponse {
    let mut matches = state.matches.write().await;
    let entry = match matches.get_mut(&path.id) {
        Some(e) => e,
        None => return not_found(),
    };
    entry.last_activity = Instant::now();
    match entry
        .sync
        .early_finalize_game(body.winner, body.keep_current_score)
        .await
    {
        Ok(_) => HttpResponse::Ok().json(entry.sync.state()),
        Err(e) => error_response(&e),
    }
}

/// Tally games, decide the winner, close the match.
#[post("/api/matches/{id}/finalize")]
async fn api_finalize_match(state: AppState, path: Path<MatchPath>) -> HttpResponse {
    let mut matches = state.matches.write().await;
    let entry = match matches.get_mut(&path.id) {
        Some(e) => e,
        None => return not_found(),
    };
    entry.last_activity = Instant::now();
    match entry.sync.finalize().await {
        Ok(()) => HttpResponse::Ok().json(entry.sync.state()),
        Err(e) => error_response(&e),
    }
}

/// Explicit winner override (null clears).
#[put("/api/matches/{id}/winner")]
async fn api_set_winner(
    state: AppState,
    path: Path<MatchPath>,
    body: Json<WinnerBody>,
) -> HttpResponse {
    let mut matches = state.matches.write().await;
    let entry = match matches.get_mut(&path.id) {
        Some(e) => e,
        None => return not_found(),
    };
    entry.last_activity = Instant::now();
    match entry.sync.set_winner(body.winner).await {
        Ok(()) => HttpResponse::Ok().json(entry.sync.state()),
        Err(e) => error_response(&e),
    }
}

/// Partial serve update (side and/or serving slot).
#[put("/api/matches/{id}/serve")]
async fn api_set_serve(
    state: AppState,
    path: Path<MatchPath>,
    body: Json<ServePatch>,
) -> HttpResponse {
    let mut matches = state.matches.write().await;
    let entry = match matches.get_mut(&path.id) {
        Some(e) => e,
        None => return not_found(),
    };
    entry.last_activity = Instant::now();
    match entry.sync.set_serve(*body).await {
        Ok(()) => HttpResponse::Ok().json(entry.sync.state()),
        Err(e) => error_response(&e),
    }
}

/// Current rotation slot of a participant, derived from score parity.
#[get("/api/matches/{id}/serve/slot")]
async fn api_serve_slot(
    state: AppState,
    path: Path<MatchPath>,
    query: Query<ServeSlotQuery>,
) -> HttpResponse {
    let matches = state.matches.read().await;
    let entry = match matches.get(&path.id) {
        Some(e) => e,
        None => return not_found(),
    };
    let record = entry.sync.state();
    let slot = racket_score_console::current_slot_of(
        query.participant,
        query.side,
        &record.slots_base,
        record.current_game(),
    );
    HttpResponse::Ok().json(ServeSlotResponse {
        participant: query.participant,
        side: query.side,
        slot,
    })
}

#[put("/api/matches/{id}/court")]
async fn api_assign_court(
    state: AppState,
    path: Path<MatchPath>,
    body: Json<CourtBody>,
) -> HttpResponse {
    let mut matches = state.matches.write().await;
    let entry = match matches.get_mut(&path.id) {
        Some(e) => e,
        None => return not_found(),
    };
    entry.last_activity = Instant::now();
    match entry.sync.assign_court(body.court_id).await {
        Ok(()) => HttpResponse::Ok().json(entry.sync.state()),
        Err(e) => error_response(&e),
    }
}

#[delete("/api/matches/{id}/court")]
async fn api_unassign_court(state: AppState, path: Path<MatchPath>) -> HttpResponse {
    let mut matches = state.matches.write().await;
    let entry = match matches.get_mut(&path.id) {
        Some(e) => e,
        None => return not_found(),
    };
    entry.last_activity = Instant::now();
    match entry.sync.unassign_court().await {
        Ok(()) => HttpResponse::Ok().json(entry.sync.state()),
        Err(e) => error_response(&e),
    }
}

/// Inbound push webhook from the authoritative service. Field-level merge;
/// safe to deliver more than once. Events for untracked matches are ignored.
#[post("/api/push")]
async fn api_push(state: AppState, body: Json<PushEvent>) -> HttpResponse {
    let event = body.into_inner();
    let mut matches = state.matches.write().await;
    match matches.get_mut(&event.match_id()) {
        Some(entry) => {
            entry.sync.apply_push(&event);
            log::debug!("Applied push event for match {}", event.match_id());
            HttpResponse::Ok().json(entry.sync.state())
        }
        None => {
            log::debug!("Ignoring push event for untracked match {}", event.match_id());
            HttpResponse::Ok().json(serde_json::json!({ "ignored": true }))
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_backend_url() -> String {
    "http://localhost:9090".to_string()
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let host = std::env::var("HOST").unwrap_or_else(|_| default_host());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or_else(default_port);
    let backend_url = std::env::var("BACKEND_URL").unwrap_or_else(|_| default_backend_url());
    let bind = (host.as_str(), port);
    log::info!(
        "Starting console at http://{}:{} (backend: {})",
        bind.0,
        bind.1,
        backend_url
    );

    let state = Data::new(ConsoleState {
        matches: RwLock::new(HashMap::new()),
        service: Arc::new(HttpScoreService::new(backend_url)),
    });

    // Background task: every 30 minutes, remove matches inactive for 12+ hours
    let state_cleanup = state.clone();
    actix_web::rt::spawn(async move {
        let mut interval = actix_web::rt::time::interval(Duration::from_secs(30 * 60));
        loop {
            interval.tick().await;
            let mut matches = state_cleanup.matches.write().await;
            let before = matches.len();
            matches.retain(|_, entry| entry.last_activity.elapsed() < INACTIVITY_TIMEOUT);
            let removed = before - matches.len();
            if removed > 0 {
                log::info!("Cleaned up {} inactive match(es) (no activity for 12h)", removed);
            }
        }
    });

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .service(api_health)
            .service(api_open_match)
            .service(api_get_match)
            .service(api_start_match)
            .service(api_increment_point)
            .service(api_set_game_score)
            .service(api_next_game)
            .service(api_early_finalize)
            .service(api_finalize_match)
            .service(api_set_winner)
            .service(api_set_serve)
            .service(api_serve_slot)
            .service(api_assign_court)
            .service(api_unassign_court)
            .service(api_push)
    })
    .bind(bind)?
    .run()
    .await
}
