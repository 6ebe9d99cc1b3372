use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Json, Redirect, Response},
    Form,
};
use serde::{Deserialize, Serialize};
use sentiment_board::{
    render::{render_error_page, PAGE_TITLE},
    render_page, service,
    session::ResolvedSession,
    CommentRecord, PageView, SentimentSummary, SortOption,
};

use super::{cookie, AppState};

#[derive(Debug, Default, Deserialize)]
pub struct SortQuery {
    #[serde(default)]
    pub sort: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CommentForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub sort: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CommentsResponse {
    pub sort: SortOption,
    pub comments: Vec<CommentRecord>,
    pub summary: SentimentSummary,
}

/// Failures of an interaction. There is no recovery: the user gets a plain
/// error page and the store is left as it was.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("classification failed")]
    Classification(#[source] anyhow::Error),

    #[error("classification task failed")]
    Task(#[from] tokio::task::JoinError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::Classification(err) => {
                tracing::error!(error = %format!("{:#}", err), "comment submission failed")
            }
            AppError::Task(err) => tracing::error!(error = %err, "comment submission failed"),
        }
        let page = render_error_page(PAGE_TITLE, "Something went wrong while classifying your comment.");
        (StatusCode::INTERNAL_SERVER_ERROR, Html(page)).into_response()
    }
}

/// Unknown or missing values fall back to showing everything.
fn parse_sort(raw: Option<&str>) -> SortOption {
    raw.and_then(|s| s.parse().ok()).unwrap_or_default()
}

fn with_session_cookie(mut response: Response, session: &ResolvedSession) -> Response {
    if session.created {
        if let Some(value) = cookie::session_cookie(session.id) {
            response.headers_mut().append(header::SET_COOKIE, value);
        }
    }
    response
}

/// `GET /`: render the board for the caller's session.
pub async fn index(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<SortQuery>,
) -> Response {
    let session = state
        .sessions
        .resolve(cookie::session_from_headers(&headers));
    let sort = parse_sort(query.sort.as_deref());

    let html = {
        let store = session.store.lock();
        render_page(&PageView {
            records: store.records(),
            sort,
            settings: &state.page,
        })
    };
    with_session_cookie(Html(html).into_response(), &session)
}

/// `POST /comments`: classify and store, then redirect back to the page.
pub async fn submit_comment(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<CommentForm>,
) -> Result<Response, AppError> {
    let session = state
        .sessions
        .resolve(cookie::session_from_headers(&headers));
    let sort = parse_sort(form.sort.as_deref());
    let CommentForm {
        username, comment, ..
    } = form;

    // The model call is CPU-bound; keep it off the async workers.
    let classifier = Arc::clone(&state.classifier);
    let store = Arc::clone(&session.store);
    tokio::task::spawn_blocking(move || {
        let mut store = store.lock();
        service::add_comment(&mut store, classifier.as_ref(), &username, &comment).map(|_| ())
    })
    .await?
    .map_err(AppError::Classification)?;

    let location = format!("/?sort={}", sort.as_str());
    Ok(with_session_cookie(
        Redirect::to(&location).into_response(),
        &session,
    ))
}

/// `GET /api/comments`: the filtered list plus the summary as JSON.
pub async fn api_comments(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<SortQuery>,
) -> Response {
    let session = state
        .sessions
        .resolve(cookie::session_from_headers(&headers));
    let sort = parse_sort(query.sort.as_deref());

    let body = {
        let store = session.store.lock();
        CommentsResponse {
            sort,
            comments: service::filter(store.records(), sort)
                .into_iter()
                .cloned()
                .collect(),
            summary: SentimentSummary::from_records(store.records()),
        }
    };
    with_session_cookie(Json(body).into_response(), &session)
}

pub async fn healthz() -> &'static str {
    "ok"
}
