//! HTTP endpoint handlers

use std::{convert::Infallible, sync::Arc};
use axum::{
    extract::State,
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Json, Response,
    },
};
use futures::stream::{self, Stream};
use tokio::sync::broadcast::error::RecvError;
use tracing::{error, info, warn};

use crate::{
    engine::TimerSnapshot,
    state::{AppState, ScheduleDraft},
};
use super::{
    messages::Message,
    responses::{ApiResponse, HealthResponse, ScheduleResponse, StatusResponse, TimerStateResponse},
};

fn command_response(
    result: Result<TimerSnapshot, String>,
    action: &str,
    message: &str,
) -> Result<Json<ApiResponse>, StatusCode> {
    match result {
        Ok(timer) => {
            info!("{} endpoint called - {}", action, timer.current_time);
            Ok(Json(ApiResponse::new(message.to_string(), timer)))
        }
        Err(e) => {
            error!("Failed to {} timer: {}", action, e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle POST /timer/start - Start or continue the work interval
pub async fn start_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    command_response(state.start_timer(), "start", "Timer started")
}

/// Handle POST /timer/pause - Pause and keep elapsed time
pub async fn pause_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    command_response(state.pause_timer(), "pause", "Timer paused")
}

/// Handle POST /timer/resume - Continue a paused timer
pub async fn resume_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    command_response(state.resume_timer(), "resume", "Timer resumed")
}

/// Handle POST /timer/reset - Zero the timer
pub async fn reset_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    command_response(state.reset_timer(), "reset", "Timer reset")
}

/// Handle GET /timer/state - Current countdown
pub async fn timer_state_handler(State(state): State<Arc<AppState>>) -> Result<Json<TimerStateResponse>, StatusCode> {
    match state.get_timer_state() {
        Ok(timer) => Ok(Json(timer.into())),
        Err(e) => {
            error!("Failed to get timer state: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle GET /schedule - Stored window and whether now is inside it
pub async fn get_schedule_handler(State(state): State<Arc<AppState>>) -> Result<Json<ScheduleResponse>, StatusCode> {
    match state.get_schedule() {
        Ok((schedule, in_schedule)) => Ok(Json(ScheduleResponse::ok(schedule, in_schedule, None))),
        Err(e) => {
            error!("Failed to read schedule: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle POST /schedule - Save the window and evaluate it immediately
pub async fn update_schedule_handler(
    State(state): State<Arc<AppState>>,
    Json(draft): Json<ScheduleDraft>,
) -> Result<(StatusCode, Json<ScheduleResponse>), StatusCode> {
    let outcome = match state.update_schedule(&draft) {
        Ok(outcome) => outcome,
        Err(e) => {
            error!("Failed to update schedule: {}", e);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    let (schedule, in_schedule) = match state.get_schedule() {
        Ok(current) => current,
        Err(e) => {
            error!("Failed to read schedule: {}", e);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    match outcome {
        Ok(action) => {
            info!("Schedule endpoint called - {:?}", action);
            Ok((StatusCode::OK, Json(ScheduleResponse::ok(schedule, in_schedule, Some(action)))))
        }
        Err(message) => {
            warn!("Schedule not saved: {}", message);
            Ok((
                StatusCode::BAD_REQUEST,
                Json(ScheduleResponse::failed(message, schedule, in_schedule)),
            ))
        }
    }
}

/// Handle DELETE /schedule - Disable schedule gating
pub async fn clear_schedule_handler(State(state): State<Arc<AppState>>) -> Result<Json<ScheduleResponse>, StatusCode> {
    if let Err(e) = state.clear_schedule() {
        error!("Failed to clear schedule: {}", e);
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }
    Ok(Json(ScheduleResponse::ok(ScheduleDraft::default(), None, None)))
}

/// Handle POST /message - Dispatch a `{"type": ...}` command
pub async fn message_handler(
    State(state): State<Arc<AppState>>,
    Json(message): Json<Message>,
) -> Result<Response, StatusCode> {
    info!("Received message: {:?}", message);
    match message {
        Message::StartTimer => start_handler(State(state)).await.map(IntoResponse::into_response),
        Message::PauseTimer => pause_handler(State(state)).await.map(IntoResponse::into_response),
        Message::ResumeTimer => resume_handler(State(state)).await.map(IntoResponse::into_response),
        Message::ResetTimer => reset_handler(State(state)).await.map(IntoResponse::into_response),
        Message::GetTimerState => timer_state_handler(State(state)).await.map(IntoResponse::into_response),
        Message::UpdateSchedule { .. } => {
            let draft = message.schedule().unwrap_or_default();
            update_schedule_handler(State(state), Json(draft))
                .await
                .map(IntoResponse::into_response)
        }
    }
}

/// Handle GET /events - Server-sent stream of timer events
pub async fn events_handler(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    info!("Event stream client connected");

    let rx = state.subscribe_events();
    let events = stream::unfold(rx, |mut rx| async move {
        loop {
            match rx.recv().await {
                Ok(event) => match Event::default().event(event.kind()).json_data(&event) {
                    Ok(sse) => return Some((Ok::<_, Infallible>(sse), rx)),
                    Err(e) => warn!("Failed to encode event: {}", e),
                },
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Event stream lagged, skipped {} events", skipped);
                }
                Err(RecvError::Closed) => return None,
            }
        }
    });

    Sse::new(events).keep_alive(KeepAlive::default())
}

/// Handle GET /status - Return current daemon status
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Result<Json<StatusResponse>, StatusCode> {
    let timer = match state.get_timer_state() {
        Ok(t) => t,
        Err(e) => {
            error!("Failed to get timer state: {}", e);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    let (schedule, in_schedule) = match state.get_schedule() {
        Ok(s) => s,
        Err(e) => {
            error!("Failed to read schedule: {}", e);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    let (last_action, last_action_time) = state.get_last_action();

    Ok(Json(StatusResponse {
        timer: timer.into(),
        schedule,
        in_schedule,
        badge: state.badge(),
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    }))
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
