use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::info;
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Viewer,
    Editor,
    Admin,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
}

#[derive(Deserialize)]
pub struct CreateUser {
    pub name: String,
    pub email: String,
    pub role: Role,
}

#[derive(Deserialize)]
pub struct UpdateUser {
    pub name: String,
    pub role: Role,
}

#[derive(Deserialize)]
pub struct ApiQuery {
    pub api: Option<String>,
    pub id: Option<String>,
}

/// Shape of the `read` response body.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ListShape {
    /// `{ "success": true, "data": [...], "count": n }`
    #[default]
    Envelope,
    /// `[...]`
    Bare,
    /// `{ "success": false, "error": "..." }` with status 200.
    Unrecognized,
}

pub type Db = Arc<RwLock<Vec<User>>>;

#[derive(Clone)]
struct AppState {
    db: Db,
    shape: ListShape,
}

type Failure = (StatusCode, Json<Value>);

pub fn app() -> Router {
    app_with(ListShape::default())
}

pub fn app_with(shape: ListShape) -> Router {
    let state = AppState {
        db: Db::default(),
        shape,
    };
    let endpoint = get(read_users)
        .post(create_user)
        .put(update_user)
        .delete(delete_user);
    Router::new()
        .route("/", endpoint.clone())
        .route("/api", endpoint)
        .with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    run_with(listener, ListShape::default()).await
}

pub async fn run_with(listener: TcpListener, shape: ListShape) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with(shape)).await
}

fn failure(status: StatusCode, message: impl Into<String>) -> Failure {
    (
        status,
        Json(json!({ "success": false, "error": message.into() })),
    )
}

fn expect_api(query: &ApiQuery, expected: &str) -> Result<(), Failure> {
    match query.api.as_deref() {
        Some(api) if api == expected => Ok(()),
        Some(other) => Err(failure(
            StatusCode::BAD_REQUEST,
            format!("unsupported api `{other}` for this method"),
        )),
        None => Err(failure(StatusCode::BAD_REQUEST, "missing `api` parameter")),
    }
}

fn require_id(query: &ApiQuery) -> Result<&str, Failure> {
    query
        .id
        .as_deref()
        .filter(|id| !id.is_empty())
        .ok_or_else(|| failure(StatusCode::BAD_REQUEST, "missing `id` parameter"))
}

async fn read_users(
    State(state): State<AppState>,
    Query(query): Query<ApiQuery>,
) -> Result<Json<Value>, Failure> {
    expect_api(&query, "read")?;
    let users = state.db.read().await;
    let body = match state.shape {
        ListShape::Envelope => json!({ "success": true, "data": *users, "count": users.len() }),
        ListShape::Bare => json!(*users),
        ListShape::Unrecognized => json!({ "success": false, "error": "storage unavailable" }),
    };
    Ok(Json(body))
}

async fn create_user(
    State(state): State<AppState>,
    Query(query): Query<ApiQuery>,
    Json(input): Json<CreateUser>,
) -> Result<(StatusCode, Json<User>), Failure> {
    expect_api(&query, "create")?;
    let user = User {
        id: Uuid::new_v4().to_string(),
        name: input.name,
        email: input.email,
        role: input.role,
    };
    state.db.write().await.push(user.clone());
    info!(id = %user.id, "user created");
    Ok((StatusCode::CREATED, Json(user)))
}

async fn update_user(
    State(state): State<AppState>,
    Query(query): Query<ApiQuery>,
    Json(input): Json<UpdateUser>,
) -> Result<Json<User>, Failure> {
    expect_api(&query, "update")?;
    let id = require_id(&query)?;
    let mut users = state.db.write().await;
    let user = users
        .iter_mut()
        .find(|u| u.id == id)
        .ok_or_else(|| failure(StatusCode::NOT_FOUND, format!("no user with id `{id}`")))?;
    user.name = input.name;
    user.role = input.role;
    info!(id, "user updated");
    Ok(Json(user.clone()))
}

async fn delete_user(
    State(state): State<AppState>,
    Query(query): Query<ApiQuery>,
) -> Result<Json<Value>, Failure> {
    expect_api(&query, "delete")?;
    let id = require_id(&query)?;
    let mut users = state.db.write().await;
    let index = users
        .iter()
        .position(|u| u.id == id)
        .ok_or_else(|| failure(StatusCode::NOT_FOUND, format!("no user with id `{id}`")))?;
    users.remove(index);
    info!(id, "user deleted");
    Ok(Json(json!({ "success": true, "id": id })))
}
