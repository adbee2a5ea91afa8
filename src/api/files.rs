use axum::body::{Body, Bytes};
use axum::extract::multipart::Field;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, Redirect, Response};
use axum::Json;
use bson::oid::ObjectId;
use bson::{doc, Bson};
use futures::{AsyncWriteExt, TryStreamExt};
use serde::Deserialize;
use tokio_util::compat::FuturesAsyncReadCompatExt;
use tokio_util::io::ReaderStream;

use crate::extract;
use crate::models::{parse_keywords, FileListing, FileMetadata, FileRecord};
use crate::render;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PageParams {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_page_size", rename = "pageSize")]
    pub page_size: u64,
}

fn default_page() -> u64 {
    1
}

fn default_page_size() -> u64 {
    20
}

impl PageParams {
    /// Both parameters are clamped to a minimum of 1.
    fn clamped(&self) -> (u64, u64) {
        (self.page.max(1), self.page_size.max(1))
    }
}

/// GET / - paginated HTML listing of stored files, newest first
pub async fn index(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> Result<Html<String>, (StatusCode, String)> {
    let (page, page_size) = params.clamped();
    let (files, total) = fetch_page(&state, page, page_size).await.map_err(|e| {
        tracing::error!("Listing failed: {e:#}");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to list files".to_string(),
        )
    })?;
    Ok(Html(render::listing_page(&files, page, page_size, total)))
}

/// GET /files - JSON paginated listing
pub async fn list_json(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> Result<Json<FileListing>, (StatusCode, String)> {
    let (page, page_size) = params.clamped();
    let (files, total) = fetch_page(&state, page, page_size).await.map_err(|e| {
        tracing::error!("Listing failed: {e:#}");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to list files".to_string(),
        )
    })?;
    Ok(Json(FileListing {
        page,
        page_size,
        total_docs: total,
        total_pages: render::total_pages(total, page_size),
        files,
    }))
}

async fn fetch_page(
    state: &AppState,
    page: u64,
    page_size: u64,
) -> anyhow::Result<(Vec<FileRecord>, u64)> {
    let total = state.files.count_documents(doc! {}).await?;
    let files = state
        .files
        .find(doc! {})
        .sort(doc! { "uploadDate": -1 })
        .skip((page - 1).saturating_mul(page_size))
        .limit(page_size as i64)
        .await?
        .try_collect()
        .await?;
    Ok((files, total))
}

/// POST /upload - multipart form: `file` plus optional metadata fields;
/// redirects to / on success
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Redirect, (StatusCode, String)> {
    let mut file: Option<(String, Option<String>, Bytes)> = None;
    let mut display_name = String::new();
    let mut kind = String::new();
    let mut keywords_raw = String::new();
    let mut briefing = String::new();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            format!("Malformed multipart body: {e}"),
        )
    })? {
        match field.name().unwrap_or("") {
            "file" => {
                let filename = field.file_name().unwrap_or("upload.bin").to_string();
                let declared = field.content_type().map(str::to_string);
                let bytes = field.bytes().await.map_err(|e| {
                    (
                        StatusCode::BAD_REQUEST,
                        format!("Failed to read uploaded file: {e}"),
                    )
                })?;
                file = Some((filename, declared, bytes));
            }
            "displayName" => display_name = text_field(field).await?,
            "type" => kind = text_field(field).await?,
            "keywords" => keywords_raw = text_field(field).await?,
            "briefing" => briefing = text_field(field).await?,
            _ => {}
        }
    }

    let (filename, declared_type, bytes) = file.ok_or((
        StatusCode::BAD_REQUEST,
        "Missing file in multipart form".to_string(),
    ))?;

    let content_type = detect_content_type(declared_type.as_deref(), &filename);

    // Extraction failure never fails the upload; the record simply carries
    // no extracted content.
    let content = match extract::try_extract(&content_type, &bytes) {
        Some(Ok(text)) => Some(text),
        Some(Err(e)) => {
            tracing::warn!("Text extraction failed for {filename}: {e}");
            None
        }
        None => None,
    };

    let metadata = FileMetadata {
        name: non_empty_or(&display_name, &filename),
        kind: non_empty_or(&kind, &content_type),
        keywords: parse_keywords(&keywords_raw),
        briefing: briefing.trim().to_string(),
        content,
        size_bytes: bytes.len() as i64,
        source_path: filename.clone(),
        content_type,
    };

    store_file(&state, &filename, &metadata, &bytes)
        .await
        .map_err(|e| {
            tracing::error!("Upload failed for {filename}: {e:#}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Upload failed".to_string(),
            )
        })?;

    tracing::info!(
        "Stored {filename} ({} bytes, extracted: {})",
        metadata.size_bytes,
        metadata.content.is_some()
    );
    Ok(Redirect::to("/"))
}

async fn text_field(field: Field<'_>) -> Result<String, (StatusCode, String)> {
    field.text().await.map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            format!("Malformed multipart field: {e}"),
        )
    })
}

fn non_empty_or(value: &str, fallback: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        fallback.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Multipart-declared type wins; otherwise guess from the filename.
fn detect_content_type(declared: Option<&str>, filename: &str) -> String {
    match declared {
        Some(t) if !t.trim().is_empty() => t.to_string(),
        _ => mime_guess::from_path(filename)
            .first_raw()
            .unwrap_or("application/octet-stream")
            .to_string(),
    }
}

/// Blob bytes and metadata go through the bucket as one logical write; a
/// failure here rejects the whole upload.
async fn store_file(
    state: &AppState,
    filename: &str,
    metadata: &FileMetadata,
    bytes: &[u8],
) -> anyhow::Result<()> {
    let metadata_doc = bson::to_document(metadata)?;
    let mut upload = state
        .bucket
        .open_upload_stream(filename)
        .metadata(metadata_doc)
        .await?;
    upload.write_all(bytes).await?;
    upload.close().await?;
    Ok(())
}

/// GET /files/{id} - stream a stored blob back to the client
pub async fn download(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, (StatusCode, String)> {
    stream_blob(&state, &id).await
}

/// Shared by /files/{id} and /search/download/{id}: 404 for unknown or
/// malformed identifiers, attachment headers from the stored record.
pub(crate) async fn stream_blob(
    state: &AppState,
    id: &str,
) -> Result<Response, (StatusCode, String)> {
    let not_found = || (StatusCode::NOT_FOUND, format!("No stored file with id {id}"));
    let oid = ObjectId::parse_str(id).map_err(|_| not_found())?;

    let record = state
        .files
        .find_one(doc! { "_id": oid })
        .await
        .map_err(|e| {
            tracing::error!("Lookup failed for {id}: {e:#}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Download failed".to_string(),
            )
        })?
        .ok_or_else(not_found)?;

    let stream = state
        .bucket
        .open_download_stream(Bson::ObjectId(oid))
        .await
        .map_err(|e| {
            tracing::error!("Download stream failed for {id}: {e:#}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Download failed".to_string(),
            )
        })?;

    let body = Body::from_stream(ReaderStream::new(stream.compat()));

    Response::builder()
        .header(header::CONTENT_TYPE, record.metadata.content_type.as_str())
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", sanitize_filename(&record.filename)),
        )
        .body(body)
        .map_err(|e| {
            tracing::error!("Response build failed for {id}: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Download failed".to_string(),
            )
        })
}

/// Stored filenames are client-supplied; strip the characters that would
/// break out of the quoted Content-Disposition parameter.
fn sanitize_filename(filename: &str) -> String {
    filename
        .chars()
        .filter(|c| *c != '"' && *c != '\r' && *c != '\n')
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_params_clamped_to_minimum_one() {
        let params = PageParams {
            page: 0,
            page_size: 0,
        };
        assert_eq!(params.clamped(), (1, 1));
        let params = PageParams {
            page: 2,
            page_size: 10,
        };
        assert_eq!(params.clamped(), (2, 10));
    }

    #[test]
    fn test_detect_content_type_prefers_declared() {
        assert_eq!(
            detect_content_type(Some("application/json"), "report.bin"),
            "application/json"
        );
    }

    #[test]
    fn test_detect_content_type_guesses_from_filename() {
        assert_eq!(
            detect_content_type(None, "report.json"),
            "application/json"
        );
        assert_eq!(detect_content_type(Some("  "), "notes.xml"), "text/xml");
    }

    #[test]
    fn test_detect_content_type_falls_back_to_octet_stream() {
        assert_eq!(
            detect_content_type(None, "mystery"),
            "application/octet-stream"
        );
    }

    #[test]
    fn test_sanitize_filename_strips_quote_and_newlines() {
        assert_eq!(sanitize_filename("a\"b\r\n.json"), "ab.json");
        assert_eq!(sanitize_filename("report.json"), "report.json");
    }

    #[test]
    fn test_non_empty_or_falls_back_on_whitespace() {
        assert_eq!(non_empty_or("  ", "fallback"), "fallback");
        assert_eq!(non_empty_or(" Q1 Report ", "fallback"), "Q1 Report");
    }
}
