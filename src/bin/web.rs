//! Single binary web server exposing the tournament engine over a JSON REST API.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default. Override with env: HOST, PORT.
//! Engine settings come from TOURNAMENT_CONFIG / TOURNAMENT_* (see `EngineConfig::from_env`).

use actix_web::{
    get, post, put,
    web::{Data, Json, Path, Query},
    App, HttpResponse, HttpServer, Responder,
};
use chrono::NaiveDate;
use serde::Deserialize;
use tournament_engine::{
    add_player, all_standings, bracket_state, compute_standings, create_team, create_tournament,
    head_to_head, list_matches, open_registration, register_team, start_tournament, submit_result,
    top_scorers, tournament_phase, try_advance_phase, CardDetail, EngineConfig, EngineError,
    ErrorKind, GoalDetail, MatchId, MatchPhase, MemoryStore, ResultSubmission, Store, TeamId,
    TournamentFormat, TournamentId,
};

type StoreState = Data<MemoryStore>;
type ConfigState = Data<EngineConfig>;

#[derive(serde::Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Deserialize)]
struct CreateTournamentBody {
    name: String,
    #[serde(default)]
    format: TournamentFormat,
    start_date: NaiveDate,
    end_date: NaiveDate,
}

#[derive(Deserialize)]
struct NameBody {
    name: String,
}

#[derive(Deserialize)]
struct RegisterBody {
    team_id: TeamId,
}

#[derive(Deserialize)]
struct SubmitResultBody {
    expected_version: u64,
    home_goals: u32,
    away_goals: u32,
    #[serde(default)]
    goals: Vec<GoalDetail>,
    #[serde(default)]
    cards: Vec<CardDetail>,
    #[serde(default)]
    home_penalties: Option<u32>,
    #[serde(default)]
    away_penalties: Option<u32>,
}

#[derive(Deserialize)]
struct MatchesQuery {
    phase: Option<MatchPhase>,
    played: Option<bool>,
}

/// Path segment: tournament id (e.g. /api/tournaments/{id})
#[derive(Deserialize)]
struct TournamentPath {
    id: TournamentId,
}

/// Path segments: tournament id and group label (e.g. /api/tournaments/{id}/standings/{group})
#[derive(Deserialize)]
struct GroupPath {
    id: TournamentId,
    group: String,
}

#[derive(Deserialize)]
struct TeamPath {
    id: TeamId,
}

#[derive(Deserialize)]
struct HeadToHeadPath {
    id: TeamId,
    opponent: TeamId,
}

#[derive(Deserialize)]
struct MatchPath {
    id: MatchId,
}

/// Conflicts are retryable (409); other client errors are 400/404.
fn error_response(e: EngineError) -> HttpResponse {
    let body = serde_json::json!({ "error": e.to_string() });
    match e.kind() {
        ErrorKind::NotFound => HttpResponse::NotFound().json(body),
        ErrorKind::Conflict => HttpResponse::Conflict().json(body),
        ErrorKind::Validation | ErrorKind::WrongPhase => HttpResponse::BadRequest().json(body),
        ErrorKind::Store => {
            log::error!("Store failure: {}", e);
            HttpResponse::InternalServerError().json(body)
        }
    }
}

fn respond<T: serde::Serialize>(result: Result<T, EngineError>) -> HttpResponse {
    match result {
        Ok(value) => HttpResponse::Ok().json(value),
        Err(e) => error_response(e),
    }
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "tournament-engine",
    })
}

/// Create a new tournament in Draft.
#[post("/api/tournaments")]
async fn api_create_tournament(store: StoreState, body: Json<CreateTournamentBody>) -> HttpResponse {
    respond(create_tournament(
        store.get_ref(),
        &body.name,
        body.format,
        body.start_date,
        body.end_date,
    ))
}

#[get("/api/tournaments/{id}")]
async fn api_get_tournament(store: StoreState, path: Path<TournamentPath>) -> HttpResponse {
    match store.tournament(path.id) {
        Ok(Some(t)) => HttpResponse::Ok().json(t),
        Ok(None) => error_response(EngineError::TournamentNotFound(path.id)),
        Err(e) => error_response(e.into()),
    }
}

#[get("/api/tournaments/{id}/phase")]
async fn api_tournament_phase(store: StoreState, path: Path<TournamentPath>) -> HttpResponse {
    respond(tournament_phase(store.get_ref(), path.id))
}

/// Open registration (Draft -> Open).
#[post("/api/tournaments/{id}/open")]
async fn api_open_registration(store: StoreState, path: Path<TournamentPath>) -> HttpResponse {
    respond(open_registration(store.get_ref(), path.id))
}

#[post("/api/teams")]
async fn api_create_team(store: StoreState, body: Json<NameBody>) -> HttpResponse {
    respond(create_team(store.get_ref(), &body.name))
}

#[post("/api/teams/{id}/players")]
async fn api_add_player(store: StoreState, path: Path<TeamPath>, body: Json<NameBody>) -> HttpResponse {
    respond(add_player(store.get_ref(), path.id, &body.name))
}

/// Register a team (tournament must be in Draft or Open).
#[post("/api/tournaments/{id}/registrations")]
async fn api_register_team(
    store: StoreState,
    path: Path<TournamentPath>,
    body: Json<RegisterBody>,
) -> HttpResponse {
    respond(register_team(store.get_ref(), path.id, body.team_id))
}

/// Start the tournament: generates the group stage (or the first cup round).
#[post("/api/tournaments/{id}/start")]
async fn api_start_tournament(
    store: StoreState,
    config: ConfigState,
    path: Path<TournamentPath>,
) -> HttpResponse {
    respond(start_tournament(store.get_ref(), config.get_ref(), path.id))
}

#[get("/api/tournaments/{id}/matches")]
async fn api_list_matches(
    store: StoreState,
    path: Path<TournamentPath>,
    query: Query<MatchesQuery>,
) -> HttpResponse {
    respond(list_matches(store.get_ref(), path.id, query.phase, query.played))
}

/// Submit a match result against the version last read.
#[put("/api/matches/{id}/result")]
async fn api_submit_result(
    store: StoreState,
    config: ConfigState,
    path: Path<MatchPath>,
    body: Json<SubmitResultBody>,
) -> HttpResponse {
    let body = body.into_inner();
    let submission = ResultSubmission {
        match_id: path.id,
        expected_version: body.expected_version,
        home_goals: body.home_goals,
        away_goals: body.away_goals,
        goals: body.goals,
        cards: body.cards,
        home_penalties: body.home_penalties,
        away_penalties: body.away_penalties,
    };
    respond(submit_result(store.get_ref(), config.get_ref(), submission))
}

#[get("/api/tournaments/{id}/standings")]
async fn api_all_standings(
    store: StoreState,
    config: ConfigState,
    path: Path<TournamentPath>,
) -> HttpResponse {
    respond(all_standings(store.get_ref(), config.get_ref(), path.id))
}

#[get("/api/tournaments/{id}/standings/{group}")]
async fn api_group_standings(
    store: StoreState,
    config: ConfigState,
    path: Path<GroupPath>,
) -> HttpResponse {
    respond(compute_standings(
        store.get_ref(),
        config.get_ref(),
        path.id,
        &path.group,
    ))
}

#[get("/api/tournaments/{id}/bracket")]
async fn api_bracket(store: StoreState, path: Path<TournamentPath>) -> HttpResponse {
    respond(bracket_state(store.get_ref(), path.id))
}

/// Re-run phase advancement (no-op unless the current round is complete).
#[post("/api/tournaments/{id}/advance")]
async fn api_advance(
    store: StoreState,
    config: ConfigState,
    path: Path<TournamentPath>,
) -> HttpResponse {
    respond(try_advance_phase(store.get_ref(), config.get_ref(), path.id))
}

#[get("/api/tournaments/{id}/scorers")]
async fn api_top_scorers(store: StoreState, path: Path<TournamentPath>) -> HttpResponse {
    respond(top_scorers(store.get_ref(), path.id))
}

#[get("/api/teams/{id}/head-to-head/{opponent}")]
async fn api_head_to_head(store: StoreState, path: Path<HeadToHeadPath>) -> HttpResponse {
    respond(head_to_head(store.get_ref(), path.id, path.opponent))
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = EngineConfig::from_env()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()))?;
    log::info!("Engine config: {:?}", config);

    let host = std::env::var("HOST").unwrap_or_else(|_| default_host());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or_else(default_port);
    let bind = (host.as_str(), port);
    log::info!("Starting server at http://{}:{}", bind.0, bind.1);

    let store = Data::new(MemoryStore::new());
    let config = Data::new(config);

    HttpServer::new(move || {
        App::new()
            .app_data(store.clone())
            .app_data(config.clone())
            .service(api_health)
            .service(api_create_tournament)
            .service(api_get_tournament)
            .service(api_tournament_phase)
            .service(api_open_registration)
            .service(api_create_team)
            .service(api_add_player)
            .service(api_register_team)
            .service(api_start_tournament)
            .service(api_list_matches)
            .service(api_submit_result)
            .service(api_all_standings)
            .service(api_group_standings)
            .service(api_bracket)
            .service(api_advance)
            .service(api_top_scorers)
            .service(api_head_to_head)
    })
    .bind(bind)?
    .run()
    .await
}
