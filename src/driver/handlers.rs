//! HTTP Handlers
//!
//! - `POST /api/upload`: マルチパートの `file` フィールド（複数可）を解析
//! - `GET /api/download/{session_id}`: 解析結果の CSV
//! - `GET /health`: ヘルスチェック

use axum::{
    extract::{multipart::MultipartRejection, Multipart, Path, State},
    http::header,
    response::IntoResponse,
    Json,
};
use log::{debug, info};

use crate::application::dto::upload_response::UploadResponse;
use crate::domain::entities::uploaded_file::UploadedFile;

use super::response::ApiError;
use super::state::AppState;

const FILE_FIELD: &str = "file";
const CSV_CONTENT_TYPE: &str = "text/csv; charset=utf-8";
const CSV_DISPOSITION: &str = "attachment; filename=\"eps_output.csv\"";

/// ファイルをアップロードして EPS を抽出する
pub async fn upload(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut multipart = multipart.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let mut files = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.body_text()))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let filename = field
            .file_name()
            .map(base_name)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("upload-{}", files.len() + 1));
        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(e.body_text()))?;

        debug!(
            "Received {} ({} bytes, {})",
            filename,
            bytes.len(),
            content_type.as_deref().unwrap_or("no content type")
        );
        files.push(UploadedFile::new(filename, bytes.to_vec()));
    }

    info!("Upload received: {} files", files.len());
    let batch = state.analyze.execute(files).await?;
    Ok(Json(UploadResponse::from(batch.as_ref())))
}

/// セッションの結果を CSV でダウンロードする
pub async fn download(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let csv = state.export.execute(&session_id).await?;
    Ok((
        [
            (header::CONTENT_TYPE, CSV_CONTENT_TYPE),
            (header::CONTENT_DISPOSITION, CSV_DISPOSITION),
        ],
        csv,
    ))
}

pub async fn health() -> &'static str {
    "ok"
}

/// クライアントが送ったパスからファイル名部分だけを取り出す
fn base_name(name: &str) -> &str {
    name.rsplit(['/', '\\']).next().unwrap_or(name).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_name() {
        assert_eq!(base_name("q1.html"), "q1.html");
        assert_eq!(base_name("dir/sub/q1.html"), "q1.html");
        assert_eq!(base_name("C:\\Users\\me\\q1.html"), "q1.html");
        assert_eq!(base_name("dir/"), "");
    }

    #[tokio::test]
    async fn test_health() {
        assert_eq!(health().await, "ok");
    }
}
