//! Single binary web server: REST API over one scoreboard, persisted as JSON files.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default.
//! Override with env: HOST, PORT, DATA_DIR (where the JSON collections live).

use actix_web::{
    delete, get, post, put,
    web::{Data, Json, Path, Query},
    App, HttpResponse, HttpServer, Responder,
};
use chrono::{Local, Utc};
use domino_score_web::{
    achievement_summaries, aggregate_rankings, apply_delta, compare_head_to_head, confirm_result,
    correct_result, daily_player_summary, delete_game, edit_game, end_match,
    filter_games_by_period, leaderboard, load_scoreboard, recompute_all, reset_match, reset_today,
    save_scoreboard, start_match, undo,
    AppConfig, EntityKind, EntityRef, ErrorKind, GameEdit, GameId, GameRecord, JsonFileStore,
    LiveMatch, MatchSetup, Period, Player, PlayerId, ScoreError, Scoreboard, Side, Team, TeamId,
};
use serde::{Deserialize, Serialize};
use std::sync::{RwLock, RwLockWriteGuard};

/// Scoreboard in memory; every mutation is written through to the store.
struct AppState {
    board: RwLock<Scoreboard>,
    store: JsonFileStore,
}

type State = Data<AppState>;

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

/// Everything a client needs to render: roster, game log, views and the live match.
#[derive(Serialize)]
struct StateView<'a> {
    #[serde(flatten)]
    board: &'a Scoreboard,
    live: Option<&'a LiveMatch>,
}

/// A stored game plus display fields.
#[derive(Serialize)]
struct GameView {
    #[serde(flatten)]
    record: GameRecord,
    winner_name: String,
    loser_name: String,
    duration: String,
}

#[derive(Deserialize)]
struct AddPlayerBody {
    name: String,
}

#[derive(Deserialize)]
struct CreateTeamBody {
    player1: String,
    player2: String,
}

#[derive(Deserialize)]
struct DeltaBody {
    side: Side,
    points: i32,
}

#[derive(Deserialize)]
struct SideBody {
    side: Side,
}

#[derive(Deserialize)]
struct PeriodQuery {
    #[serde(default)]
    period: Period,
}

#[derive(Deserialize)]
struct RankingsQuery {
    #[serde(default)]
    period: Period,
    #[serde(default)]
    kind: EntityKind,
}

#[derive(Deserialize)]
struct CompareQuery {
    a: EntityRef,
    b: EntityRef,
    #[serde(default)]
    period: Period,
}

#[derive(Deserialize)]
struct PlayerPath {
    id: PlayerId,
}

#[derive(Deserialize)]
struct TeamPath {
    id: TeamId,
}

#[derive(Deserialize)]
struct GamePath {
    id: GameId,
}

fn error_response(e: &ScoreError) -> HttpResponse {
    let body = serde_json::json!({ "error": e.to_string() });
    match e.kind() {
        ErrorKind::Validation => HttpResponse::BadRequest().json(body),
        ErrorKind::NotFound => HttpResponse::NotFound().json(body),
        ErrorKind::State => HttpResponse::Conflict().json(body),
        ErrorKind::Store => HttpResponse::InternalServerError().json(body),
    }
}

fn lock_error() -> HttpResponse {
    HttpResponse::InternalServerError().body("lock error")
}

fn write_board(state: &State) -> Result<RwLockWriteGuard<'_, Scoreboard>, HttpResponse> {
    state.board.write().map_err(|_| lock_error())
}

/// Write every collection through to disk.
fn persist(state: &State, board: &Scoreboard) -> Result<(), HttpResponse> {
    save_scoreboard(&state.store, board).map_err(|e| {
        log::error!("Failed to save scoreboard: {}", e);
        error_response(&ScoreError::from(e))
    })
}

fn game_view(board: &Scoreboard, record: GameRecord) -> GameView {
    GameView {
        winner_name: board.entity_name(&record.winner),
        loser_name: board.entity_name(&record.loser),
        duration: record.duration_display(),
        record,
    }
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "domino-score-web",
    })
}

#[get("/api/state")]
async fn api_state(state: State) -> HttpResponse {
    let board = match state.board.read() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    HttpResponse::Ok().json(StateView {
        board: &*board,
        live: board.live.as_ref(),
    })
}

/// Register a player (name must be new, case-insensitive).
#[post("/api/players")]
async fn api_add_player(state: State, body: Json<AddPlayerBody>) -> HttpResponse {
    let mut board = match write_board(&state) {
        Ok(guard) => guard,
        Err(resp) => return resp,
    };
    let player: Player = match board.add_player(&body.name) {
        Ok(p) => p.clone(),
        Err(e) => return error_response(&e),
    };
    log::info!("Added player {}", player.name);
    match persist(&state, &board) {
        Ok(()) => HttpResponse::Ok().json(player),
        Err(resp) => resp,
    }
}

/// Delete a player and every team they belong to.
#[delete("/api/players/{id}")]
async fn api_delete_player(state: State, path: Path<PlayerPath>) -> HttpResponse {
    let mut board = match write_board(&state) {
        Ok(guard) => guard,
        Err(resp) => return resp,
    };
    let player = match board.delete_player(path.id) {
        Ok(p) => p,
        Err(e) => return error_response(&e),
    };
    match persist(&state, &board) {
        Ok(()) => HttpResponse::Ok().json(player),
        Err(resp) => resp,
    }
}

#[post("/api/teams")]
async fn api_create_team(state: State, body: Json<CreateTeamBody>) -> HttpResponse {
    let mut board = match write_board(&state) {
        Ok(guard) => guard,
        Err(resp) => return resp,
    };
    let team: Team = match board.create_team(&body.player1, &body.player2) {
        Ok(t) => t,
        Err(e) => return error_response(&e),
    };
    match persist(&state, &board) {
        Ok(()) => HttpResponse::Ok().json(team),
        Err(resp) => resp,
    }
}

#[delete("/api/teams/{id}")]
async fn api_delete_team(state: State, path: Path<TeamPath>) -> HttpResponse {
    let mut board = match write_board(&state) {
        Ok(guard) => guard,
        Err(resp) => return resp,
    };
    let team = match board.delete_team(path.id) {
        Ok(t) => t,
        Err(e) => return error_response(&e),
    };
    match persist(&state, &board) {
        Ok(()) => HttpResponse::Ok().json(team),
        Err(resp) => resp,
    }
}

/// Start a match (replaces any live one). New players and teams are registered.
#[post("/api/match")]
async fn api_start_match(state: State, body: Json<MatchSetup>) -> HttpResponse {
    let mut board = match write_board(&state) {
        Ok(guard) => guard,
        Err(resp) => return resp,
    };
    let live = match start_match(&mut board, &body, Utc::now()) {
        Ok(live) => live.clone(),
        Err(e) => return error_response(&e),
    };
    match persist(&state, &board) {
        Ok(()) => HttpResponse::Ok().json(live),
        Err(resp) => resp,
    }
}

#[post("/api/match/delta")]
async fn api_match_delta(state: State, body: Json<DeltaBody>) -> HttpResponse {
    let mut board = match write_board(&state) {
        Ok(guard) => guard,
        Err(resp) => return resp,
    };
    HttpResponse::Ok().json(apply_delta(&mut board, body.side, body.points))
}

/// Commit the pending terminal score as a game record.
#[post("/api/match/confirm")]
async fn api_match_confirm(state: State) -> HttpResponse {
    let mut board = match write_board(&state) {
        Ok(guard) => guard,
        Err(resp) => return resp,
    };
    let confirmed = match confirm_result(&mut board, Utc::now()) {
        Ok(c) => c,
        Err(e) => return error_response(&e),
    };
    match persist(&state, &board) {
        Ok(()) => HttpResponse::Ok().json(confirmed),
        Err(resp) => resp,
    }
}

#[post("/api/match/correct")]
async fn api_match_correct(state: State) -> HttpResponse {
    let mut board = match write_board(&state) {
        Ok(guard) => guard,
        Err(resp) => return resp,
    };
    match correct_result(&mut board) {
        Ok(()) => HttpResponse::Ok().json(&board.live),
        Err(e) => error_response(&e),
    }
}

#[post("/api/match/undo")]
async fn api_match_undo(state: State, body: Json<SideBody>) -> HttpResponse {
    let mut board = match write_board(&state) {
        Ok(guard) => guard,
        Err(resp) => return resp,
    };
    HttpResponse::Ok().json(undo(&mut board, body.side))
}

/// Next game of the series.
#[post("/api/match/reset")]
async fn api_match_reset(state: State) -> HttpResponse {
    let mut board = match write_board(&state) {
        Ok(guard) => guard,
        Err(resp) => return resp,
    };
    match reset_match(&mut board) {
        Ok(live) => HttpResponse::Ok().json(live),
        Err(e) => error_response(&e),
    }
}

#[post("/api/match/end")]
async fn api_match_end(state: State) -> HttpResponse {
    let mut board = match write_board(&state) {
        Ok(guard) => guard,
        Err(resp) => return resp,
    };
    HttpResponse::Ok().json(serde_json::json!({ "ended": end_match(&mut board).is_some() }))
}

/// Games in a period, newest first.
#[get("/api/games")]
async fn api_games(state: State, query: Query<PeriodQuery>) -> HttpResponse {
    let board = match state.board.read() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    let mut games = filter_games_by_period(&board.games, query.period, &Local::now());
    games.sort_by(|a, b| b.date.cmp(&a.date));
    let views: Vec<GameView> = games.into_iter().map(|g| game_view(&board, g)).collect();
    HttpResponse::Ok().json(views)
}

#[put("/api/games/{id}")]
async fn api_edit_game(state: State, path: Path<GamePath>, body: Json<GameEdit>) -> HttpResponse {
    let mut board = match write_board(&state) {
        Ok(guard) => guard,
        Err(resp) => return resp,
    };
    let record = match edit_game(&mut board, path.id, body.into_inner()) {
        Ok(g) => g.clone(),
        Err(e) => return error_response(&e),
    };
    match persist(&state, &board) {
        Ok(()) => HttpResponse::Ok().json(game_view(&board, record)),
        Err(resp) => resp,
    }
}

#[delete("/api/games/{id}")]
async fn api_delete_game(state: State, path: Path<GamePath>) -> HttpResponse {
    let mut board = match write_board(&state) {
        Ok(guard) => guard,
        Err(resp) => return resp,
    };
    let record = match delete_game(&mut board, path.id) {
        Ok(g) => g,
        Err(e) => return error_response(&e),
    };
    match persist(&state, &board) {
        Ok(()) => HttpResponse::Ok().json(record),
        Err(resp) => resp,
    }
}

/// Delete every game played today (server local time).
#[post("/api/games/reset-today")]
async fn api_reset_today(state: State) -> HttpResponse {
    let mut board = match write_board(&state) {
        Ok(guard) => guard,
        Err(resp) => return resp,
    };
    let removed = reset_today(&mut board, &Local::now());
    match persist(&state, &board) {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({ "removed": removed })),
        Err(resp) => resp,
    }
}

#[post("/api/recompute")]
async fn api_recompute(state: State) -> HttpResponse {
    let mut board = match write_board(&state) {
        Ok(guard) => guard,
        Err(resp) => return resp,
    };
    let summary = recompute_all(&mut board);
    match persist(&state, &board) {
        Ok(()) => HttpResponse::Ok().json(summary),
        Err(resp) => resp,
    }
}

/// Wipe roster, games, views and the live match.
#[post("/api/reset")]
async fn api_reset_all(state: State) -> HttpResponse {
    let mut board = match write_board(&state) {
        Ok(guard) => guard,
        Err(resp) => return resp,
    };
    board.reset_all();
    log::info!("All data reset");
    match persist(&state, &board) {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({ "ok": true })),
        Err(resp) => resp,
    }
}

#[get("/api/rankings")]
async fn api_rankings(state: State, query: Query<RankingsQuery>) -> HttpResponse {
    let board = match state.board.read() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    let games = filter_games_by_period(&board.games, query.period, &Local::now());
    HttpResponse::Ok().json(aggregate_rankings(&board, &games, query.kind))
}

#[get("/api/compare")]
async fn api_compare(state: State, query: Query<CompareQuery>) -> HttpResponse {
    let board = match state.board.read() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match compare_head_to_head(&board, &query.a, &query.b, query.period, &Local::now()) {
        Ok(h2h) => HttpResponse::Ok().json(h2h),
        Err(e) => error_response(&e),
    }
}

#[get("/api/leaderboard")]
async fn api_leaderboard(state: State, query: Query<PeriodQuery>) -> HttpResponse {
    let board = match state.board.read() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    HttpResponse::Ok().json(leaderboard(&board, query.period, &Local::now()))
}

#[get("/api/achievements")]
async fn api_achievements(state: State) -> HttpResponse {
    let board = match state.board.read() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    HttpResponse::Ok().json(achievement_summaries(&board))
}

/// Per-player recap of today's games (server local day).
#[get("/api/summary/today")]
async fn api_summary_today(state: State) -> HttpResponse {
    let board = match state.board.read() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    HttpResponse::Ok().json(daily_player_summary(&board, &Local::now()))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = AppConfig::from_env();
    let store = JsonFileStore::open(config.data_dir.clone()).map_err(std::io::Error::other)?;
    let board = load_scoreboard(&store, config.rules).map_err(std::io::Error::other)?;
    log::info!("Data directory: {}", store.dir().display());

    let bind = (config.host.clone(), config.port);
    log::info!("Starting server at http://{}:{}", bind.0, bind.1);

    let state = Data::new(AppState {
        board: RwLock::new(board),
        store,
    });

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .service(api_health)
            .service(api_state)
            .service(api_add_player)
            .service(api_delete_player)
            .service(api_create_team)
            .service(api_delete_team)
            .service(api_start_match)
            .service(api_match_delta)
            .service(api_match_confirm)
            .service(api_match_correct)
            .service(api_match_undo)
            .service(api_match_reset)
            .service(api_match_end)
            .service(api_games)
            .service(api_reset_today)
            .service(api_edit_game)
            .service(api_delete_game)
            .service(api_recompute)
            .service(api_reset_all)
            .service(api_rankings)
            .service(api_compare)
            .service(api_leaderboard)
            .service(api_achievements)
            .service(api_summary_today)
    })
    .bind(bind)?
    .run()
    .await
}
