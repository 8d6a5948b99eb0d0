//! `GET /images/:filename` – gespeichertes Bild als Download ausliefern

use axum::{
    extract::{Path, State},
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
};

use crate::error::ApiResult;
use crate::state::AppState;

pub async fn get_image(
    State(state): State<AppState>,
    Path(dateiname): Path<String>,
) -> ApiResult<Response> {
    let bild = state.anhaenge.bild_laden(&dateiname).await?;

    let disposition =
        HeaderValue::from_str(&format!("attachment; filename=\"{}\"", bild.dateiname))
            .unwrap_or_else(|_| HeaderValue::from_static("attachment"));

    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(bild.content_type)),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bild.daten,
    )
        .into_response())
}
