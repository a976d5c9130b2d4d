use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use sqlx::PgPool;

use crate::models::{CreateEventRequest, Event, UpdateEventRequest};
use crate::utils::error::AppError;
use crate::utils::extract::AppJson;
use crate::utils::response::{created, empty_success, success};

pub async fn create_event(
    State(pool): State<PgPool>,
    AppJson(payload): AppJson<CreateEventRequest>,
) -> Result<Response, AppError> {
    let new_event = payload.validate()?;

    let event = sqlx::query_as::<_, Event>(
        "INSERT INTO events (title, description, event_date, location) \
         VALUES ($1, $2, $3, $4) \
         RETURNING *",
    )
    .bind(&new_event.title)
    .bind(&new_event.description)
    .bind(new_event.event_date)
    .bind(&new_event.location)
    .fetch_one(&pool)
    .await?;

    tracing::info!(event_id = event.id, "Event created");

    Ok(created(event, "Event created successfully").into_response())
}

pub async fn list_events(State(pool): State<PgPool>) -> Result<Response, AppError> {
    let events = sqlx::query_as::<_, Event>("SELECT * FROM events ORDER BY id")
        .fetch_all(&pool)
        .await?;

    Ok(success(events, "Events retrieved successfully").into_response())
}

pub async fn get_event(
    State(pool): State<PgPool>,
    Path(event_id): Path<i32>,
) -> Result<Response, AppError> {
    let event = fetch_event(&pool, event_id).await?;

    Ok(success(event, "Event retrieved successfully").into_response())
}

pub async fn update_event(
    State(pool): State<PgPool>,
    Path(event_id): Path<i32>,
    AppJson(payload): AppJson<UpdateEventRequest>,
) -> Result<Response, AppError> {
    let mut event = fetch_event(&pool, event_id).await?;
    payload.apply_to(&mut event)?;

    let event = sqlx::query_as::<_, Event>(
        "UPDATE events \
         SET title = $1, description = $2, event_date = $3, location = $4 \
         WHERE id = $5 \
         RETURNING *",
    )
    .bind(&event.title)
    .bind(&event.description)
    .bind(event.event_date)
    .bind(&event.location)
    .bind(event_id)
    .fetch_one(&pool)
    .await?;

    tracing::info!(event_id = event.id, "Event updated");

    Ok(success(event, "Event updated successfully").into_response())
}

pub async fn delete_event(
    State(pool): State<PgPool>,
    Path(event_id): Path<i32>,
) -> Result<Response, AppError> {
    let deleted: Option<(i32,)> = sqlx::query_as("DELETE FROM events WHERE id = $1 RETURNING id")
        .bind(event_id)
        .fetch_optional(&pool)
        .await?;

    if deleted.is_none() {
        return Err(not_found(event_id));
    }

    tracing::info!(event_id, "Event deleted");

    Ok(empty_success("Event deleted successfully").into_response())
}

async fn fetch_event(pool: &PgPool, event_id: i32) -> Result<Event, AppError> {
    sqlx::query_as::<_, Event>("SELECT * FROM events WHERE id = $1")
        .bind(event_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| not_found(event_id))
}

fn not_found(event_id: i32) -> AppError {
    AppError::NotFound(format!("Event with id '{}' was not found", event_id))
}
