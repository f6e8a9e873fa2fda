use axum::{
    body::Body,
    extract::State,
    http::header::{CACHE_CONTROL, CONTENT_TYPE},
    response::IntoResponse,
    Form,
};
use bytes::Bytes;
use tokio_stream::StreamExt;
use tokio_util::sync::CancellationToken;

use crate::{
    model::{api::InfoRequest, profile::ProfileRecord},
    server::{model::app::AppState, util::eve::parse_names},
};

pub static INFO_TAG: &str = "info";

/// Stream profiles for a list of character names
///
/// Accepts newline-separated character names in the `characters` form field and streams
/// newline-delimited JSON back: a `{"_meta":"start","total":N}` line, one profile per
/// character in the order they complete, then `{"_meta":"done","sent":M,"total":N}`.
/// Characters that can't be resolved or fail to load are left out of the stream.
///
/// # Responses
/// - 200 (Success): NDJSON stream of profile records between start and done markers
#[utoipa::path(
    post,
    path = "/info",
    tag = INFO_TAG,
    request_body(content = InfoRequest, content_type = "application/x-www-form-urlencoded"),
    responses(
        (
            status = 200,
            description = "Stream of profile records",
            content_type = "application/x-ndjson",
            body = ProfileRecord
        )
    ),
)]
pub async fn info(
    State(state): State<AppState>,
    Form(request): Form<InfoRequest>,
) -> impl IntoResponse {
    let names = parse_names(&request.characters, state.pool.config().max_names);

    let lines = state
        .pool
        .stream(names, CancellationToken::new())
        .map(|message| message.to_line().map(Bytes::from));

    (
        [
            (CONTENT_TYPE, "application/x-ndjson"),
            (CACHE_CONTROL, "no-cache"),
        ],
        Body::from_stream(lines),
    )
}
