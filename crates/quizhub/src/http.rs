//! The thin HTTP surface: room management and the quiz catalog.
//!
//! Request/response only — everything realtime goes over the websocket
//! channel. Quiz content leaves this API answer-stripped.

use std::convert::Infallible;

use quizhub_protocol::{CatalogEntry, ClientId, QuizView, RoomCode};
use quizhub_room::RoomError;
use serde::Deserialize;
use warp::Filter;
use warp::hyper::StatusCode;
use warp::reply::Reply;

use crate::SharedState;

type WarpResult<T> = Result<T, Infallible>;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateRoomRequest {
    host_id: Option<u64>,
    difficulty: Option<String>,
    quiz_title: Option<String>,
}

/// Builds the full route tree.
pub fn routes(
    state: SharedState,
) -> impl Filter<Extract = impl Reply, Error = warp::Rejection> + Clone {
    let json_body = warp::body::content_length_limit(16 * 1024).and(warp::body::json());

    // POST /api/rooms
    let create = warp::path!("api" / "rooms")
        .and(warp::post())
        .and(json_body)
        .and(with_state(state.clone()))
        .and_then(create_room);

    // GET /api/rooms/quizzes/available
    let catalog = warp::path!("api" / "rooms" / "quizzes" / "available")
        .and(warp::get())
        .and(with_state(state.clone()))
        .and_then(list_quizzes);

    // GET /api/rooms/quizzes/:difficulty
    let quiz = warp::path!("api" / "rooms" / "quizzes" / String)
        .and(warp::get())
        .and(with_state(state.clone()))
        .and_then(get_quiz);

    // GET /api/rooms/:roomId
    let get = warp::path!("api" / "rooms" / String)
        .and(warp::get())
        .and(with_state(state.clone()))
        .and_then(get_room);

    // DELETE /api/rooms/:roomId
    let delete = warp::path!("api" / "rooms" / String)
        .and(warp::delete())
        .and(with_state(state))
        .and_then(delete_room);

    create.or(catalog).or(quiz).or(get).or(delete)
}

fn with_state(
    state: SharedState,
) -> impl Filter<Extract = (SharedState,), Error = Infallible> + Clone {
    warp::any().map(move || state.clone())
}

fn json_reply<T: serde::Serialize>(
    status: StatusCode,
    value: &T,
) -> warp::reply::WithStatus<warp::reply::Json> {
    warp::reply::with_status(warp::reply::json(value), status)
}

fn error_reply(status: StatusCode, message: &str) -> warp::reply::WithStatus<warp::reply::Json> {
    json_reply(status, &serde_json::json!({ "error": message }))
}

async fn create_room(req: CreateRoomRequest, state: SharedState) -> WarpResult<impl Reply> {
    let Some(host) = req.host_id else {
        return Ok(error_reply(StatusCode::BAD_REQUEST, "Host ID is required"));
    };
    let difficulty = req.difficulty.as_deref().unwrap_or("easy");

    let result = state
        .registry
        .lock()
        .await
        .create_room(ClientId(host), difficulty, req.quiz_title);

    match result {
        Ok((code, summary)) => Ok(json_reply(
            StatusCode::OK,
            &serde_json::json!({ "roomId": code, "room": summary }),
        )),
        Err(e) => Ok(error_reply(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string())),
    }
}

async fn get_room(code: String, state: SharedState) -> WarpResult<impl Reply> {
    let code = RoomCode::new(code);
    let result = state.registry.lock().await.summary(&code).await;
    match result {
        Ok(summary) => Ok(json_reply(StatusCode::OK, &summary)),
        Err(RoomError::NotFound(_)) => Ok(error_reply(StatusCode::NOT_FOUND, "Room not found")),
        Err(e) => Ok(error_reply(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string())),
    }
}

async fn list_quizzes(state: SharedState) -> WarpResult<impl Reply> {
    let quizzes: Vec<CatalogEntry> = state.bank.catalog().iter().map(CatalogEntry::from).collect();
    Ok(json_reply(StatusCode::OK, &serde_json::json!({ "quizzes": quizzes })))
}

async fn get_quiz(difficulty: String, state: SharedState) -> WarpResult<impl Reply> {
    match state.bank.get(&difficulty) {
        Some(quiz) => Ok(json_reply(
            StatusCode::OK,
            &serde_json::json!({ "quiz": QuizView::from(quiz) }),
        )),
        None => Ok(error_reply(
            StatusCode::INTERNAL_SERVER_ERROR,
            &RoomError::UnknownDifficulty(difficulty).to_string(),
        )),
    }
}

async fn delete_room(code: String, state: SharedState) -> WarpResult<impl Reply> {
    let deleted = state.registry.lock().await.delete(&RoomCode::new(code)).await;
    if deleted {
        Ok(json_reply(
            StatusCode::OK,
            &serde_json::json!({ "message": "Room deleted successfully" }),
        ))
    } else {
        Ok(error_reply(StatusCode::NOT_FOUND, "Room not found"))
    }
}
