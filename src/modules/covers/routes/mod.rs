//! HTTP surface of the covers module. Form and presenter resources map 1:1
//! to the controls of the cover page.

use std::sync::Arc;

use amocover_http::error::AppError;
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, Semaphore};
use tracing::Instrument;

use super::form::{BookDraft, FormField, FormSession};
use super::generator::CoverGenerator;
use super::models::GenerationResult;
use super::presenter::{CopiedText, CopyTab, PresenterError, ResultSnapshot, ResultView};
use super::styles::BookStyle;

/// Shared state: the orchestrator, the single form session and the one
/// generation permit shared by form submissions and `/generate`.
#[derive(Clone)]
pub struct CoversState {
    generator: CoverGenerator,
    session: Arc<Mutex<FormSession>>,
    generation: Arc<Semaphore>,
}

impl CoversState {
    pub fn new(generator: CoverGenerator) -> Self {
        Self {
            generator,
            session: Arc::new(Mutex::new(FormSession::new())),
            generation: Arc::new(Semaphore::new(1)),
        }
    }
}

pub fn router(state: CoversState) -> Router {
    Router::new()
        .route("/styles", get(list_styles))
        .route("/form", get(get_form))
        .route("/form/submit", post(submit_form))
        .route("/form/{field}", put(update_field))
        .route("/result", get(get_result))
        .route("/result/selection", put(select_cover))
        .route("/result/tab", put(select_tab))
        .route("/result/copy", post(copy_active))
        .route("/result/covers/{index}", get(download_cover))
        .route("/generate", post(generate))
        .route("/health", get(health_check))
        .with_state(state)
}

#[derive(Debug, Serialize)]
pub struct FormSnapshot {
    pub input: BookDraft,
    pub valid: bool,
    pub missing: Vec<FormField>,
    pub phase: &'static str,
    pub error: Option<String>,
    pub result_available: bool,
}

impl FormSnapshot {
    fn of(session: &FormSession) -> Self {
        Self {
            input: session.draft().clone(),
            valid: session.is_valid(),
            missing: session.draft().missing_fields(),
            phase: session.phase().name(),
            error: session.error_message().map(str::to_string),
            result_available: session.result_view().is_some(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct FieldValue {
    pub value: String,
}

#[derive(Debug, Deserialize)]
pub struct CoverSelection {
    pub index: usize,
}

#[derive(Debug, Deserialize)]
pub struct TabSelection {
    pub tab: CopyTab,
}

async fn health_check() -> &'static str {
    "covers module is healthy"
}

async fn list_styles() -> Json<[BookStyle; 10]> {
    Json(BookStyle::ALL)
}

async fn get_form(State(state): State<CoversState>) -> Json<FormSnapshot> {
    let session = state.session.lock().await;
    Json(FormSnapshot::of(&session))
}

async fn update_field(
    State(state): State<CoversState>,
    Path(field): Path<String>,
    Json(body): Json<FieldValue>,
) -> Result<Json<FormSnapshot>, AppError> {
    let field: FormField = field.parse().map_err(AppError::not_found)?;
    let mut session = state.session.lock().await;

    if !session.update_field(field, body.value) {
        return Err(AppError::bad_request("form is locked while generating"));
    }
    Ok(Json(FormSnapshot::of(&session)))
}

/// 202 when a generation started; 200 with the unchanged form otherwise.
async fn submit_form(State(state): State<CoversState>) -> (StatusCode, Json<FormSnapshot>) {
    let mut session = state.session.lock().await;

    let Ok(permit) = state.generation.clone().try_acquire_owned() else {
        tracing::debug!("submit ignored: another generation is running");
        return (StatusCode::OK, Json(FormSnapshot::of(&session)));
    };
    let Some(input) = session.submit() else {
        return (StatusCode::OK, Json(FormSnapshot::of(&session)));
    };

    let generator = state.generator.clone();
    let shared = state.session.clone();
    let span = tracing::info_span!("generation", title = %input.title());
    tokio::spawn(
        async move {
            let outcome = generator.generate(&input).await;
            shared.lock().await.complete(outcome);
            drop(permit);
        }
        .instrument(span),
    );

    (StatusCode::ACCEPTED, Json(FormSnapshot::of(&session)))
}

fn no_result() -> AppError {
    AppError::not_found("no generation result to show")
}

impl From<PresenterError> for AppError {
    fn from(error: PresenterError) -> Self {
        match error {
            PresenterError::Io(e) => AppError::Internal(e.into()),
            other => AppError::bad_request(other.to_string()),
        }
    }
}

async fn with_view<T>(
    state: &CoversState,
    action: impl FnOnce(&mut ResultView) -> Result<T, PresenterError>,
) -> Result<T, AppError> {
    let mut session = state.session.lock().await;
    let view = session.result_view_mut().ok_or_else(no_result)?;
    Ok(action(view)?)
}

async fn get_result(State(state): State<CoversState>) -> Result<Json<ResultSnapshot>, AppError> {
    with_view(&state, |view| Ok(view.snapshot())).await.map(Json)
}

async fn select_cover(
    State(state): State<CoversState>,
    Json(body): Json<CoverSelection>,
) -> Result<Json<ResultSnapshot>, AppError> {
    with_view(&state, |view| {
        view.select_cover(body.index)?;
        Ok(view.snapshot())
    })
    .await
    .map(Json)
}

async fn select_tab(
    State(state): State<CoversState>,
    Json(body): Json<TabSelection>,
) -> Result<Json<ResultSnapshot>, AppError> {
    with_view(&state, |view| {
        view.select_tab(body.tab)?;
        Ok(view.snapshot())
    })
    .await
    .map(Json)
}

async fn copy_active(State(state): State<CoversState>) -> Result<Json<CopiedText>, AppError> {
    with_view(&state, |view| Ok(view.copy_active())).await.map(Json)
}

async fn download_cover(
    State(state): State<CoversState>,
    Path(index): Path<usize>,
) -> Result<impl IntoResponse, AppError> {
    let (mime_type, file_name, bytes) = with_view(&state, |view| {
        let cover = view.cover(index)?;
        Ok((
            cover.mime_type().to_string(),
            view.download_name(index)?,
            cover.bytes().to_vec(),
        ))
    })
    .await?;

    Ok((
        [
            (header::CONTENT_TYPE, mime_type),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file_name),
            ),
        ],
        bytes,
    ))
}

/// One-shot generation that leaves the form session untouched. Refused while
/// any other generation runs.
async fn generate(
    State(state): State<CoversState>,
    Json(draft): Json<BookDraft>,
) -> Result<Json<GenerationResult>, AppError> {
    let Some(input) = draft.to_input() else {
        let details: Vec<serde_json::Value> = draft
            .missing_fields()
            .into_iter()
            .map(|field| serde_json::json!({ "field": field.name(), "error": "required" }))
            .collect();
        return Err(AppError::validation(details, "Mohon lengkapi semua field."));
    };

    let _permit = state
        .generation
        .clone()
        .try_acquire_owned()
        .map_err(|_| AppError::conflict("a generation is already in progress"))?;

    state
        .generator
        .generate(&input)
        .await
        .map(Json)
        .map_err(|error| AppError::bad_gateway(error.user_message()))
}
