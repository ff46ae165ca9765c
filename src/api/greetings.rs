//! Greeting API endpoints.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    Json,
};

use super::{error, run_blocking, ApiResponse, ApiResult};
use crate::errors::AppError;
use crate::models::{parse_id, Greeting, GreetingFilter, GreetingQuery, GreetingRequest};
use crate::service::NOT_FOUND_MESSAGE;
use crate::AppState;

const CREATED_MESSAGE: &str = "Greeting created successfully";
const UPDATED_MESSAGE: &str = "Greeting updated successfully";
const DELETED_MESSAGE: &str = "Greeting deleted successfully";

/// GET /api/greetings - List greetings, optionally filtered by `language` and `formal`.
pub async fn list_greetings(
    State(state): State<AppState>,
    query: Result<Query<GreetingQuery>, QueryRejection>,
) -> ApiResult<Vec<Greeting>> {
    let filter = match query {
        Ok(Query(query)) => GreetingFilter::from(query),
        Err(rejection) => {
            return error(
                AppError::InvalidArgument(rejection.body_text()),
                &state,
            )
        }
    };

    match run_blocking(&state, move |service| service.list(&filter)).await {
        Ok(greetings) => Ok(ApiResponse::listing(greetings)),
        Err(e) => error(e, &state),
    }
}

/// GET /api/greetings/:id - Get a single greeting.
pub async fn get_greeting(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Greeting> {
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(e) => return error(e, &state),
    };

    match run_blocking(&state, move |service| service.get(id)).await {
        Ok(greeting) => Ok(ApiResponse::found(greeting)),
        Err(e) => error(e, &state),
    }
}

/// POST /api/greetings - Create a new greeting.
pub async fn create_greeting(
    State(state): State<AppState>,
    body: Result<Json<GreetingRequest>, JsonRejection>,
) -> ApiResult<Greeting> {
    let draft = match body.map_err(AppError::from).and_then(|Json(r)| r.validate()) {
        Ok(draft) => draft,
        Err(e) => return error(e, &state),
    };

    match run_blocking(&state, move |service| service.create(draft)).await {
        Ok(greeting) => Ok(ApiResponse::created(CREATED_MESSAGE, greeting)),
        Err(e) => error(e, &state),
    }
}

/// PUT /api/greetings/:id - Replace a greeting.
pub async fn update_greeting(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<GreetingRequest>, JsonRejection>,
) -> ApiResult<Greeting> {
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(e) => return error(e, &state),
    };
    let draft = match body.map_err(AppError::from).and_then(|Json(r)| r.validate()) {
        Ok(draft) => draft,
        Err(e) => return error(e, &state),
    };

    match run_blocking(&state, move |service| service.update(id, draft)).await {
        Ok(greeting) => Ok(ApiResponse::updated(UPDATED_MESSAGE, greeting)),
        Err(e) => error(e, &state),
    }
}

/// DELETE /api/greetings/:id - Delete a greeting.
pub async fn delete_greeting(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Greeting> {
    // A malformed id can never name a record.
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(_) => return error(AppError::NotFound(NOT_FOUND_MESSAGE.to_string()), &state),
    };

    match run_blocking(&state, move |service| service.delete(id)).await {
        Ok(greeting) => Ok(ApiResponse::deleted(DELETED_MESSAGE, greeting)),
        Err(e) => error(e, &state),
    }
}
