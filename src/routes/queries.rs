//! Support query routes.

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::Deserialize;

use crate::domain::aggregates::SupportQuery;
use crate::error::{AppError, Enveloped, Result};
use crate::extract::FormBody;
use crate::middleware::AuthUser;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/", get(list_queries).post(create_query))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QueryForm {
    subject: Option<String>,
    describe_subject: Option<String>,
}

async fn list_queries(State(state): State<AppState>, user: AuthUser) -> Result<Json<Vec<SupportQuery>>> {
    Ok(Json(state.stores().queries.list_for_user(user.user_id).await?))
}

async fn create_query(
    State(state): State<AppState>,
    user: AuthUser,
    form: std::result::Result<FormBody<QueryForm>, AppError>,
) -> std::result::Result<(StatusCode, Json<SupportQuery>), Enveloped> {
    let FormBody(form) = form?;
    let query = SupportQuery::raise(user.user_id, form.subject, form.describe_subject)?;
    state.stores().queries.insert(&query).await?;
    Ok((StatusCode::CREATED, Json(query)))
}
