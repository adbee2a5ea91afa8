use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// Metadata attached to every stored blob, persisted inside the GridFS
/// file document's `metadata` field.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMetadata {
    /// Display name; falls back to the stored filename at upload time
    pub name: String,
    /// Logical file type; falls back to the detected MIME type
    #[serde(rename = "type")]
    pub kind: String,
    /// User-supplied keywords, comma-split, trimmed, empties dropped
    pub keywords: Vec<String>,
    /// Free-text description, may be empty
    pub briefing: String,
    /// Extracted full text. Absent when the file was not extracted — never
    /// stored as an empty-string placeholder.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Byte length of the original upload
    pub size_bytes: i64,
    /// Original client-supplied filename
    pub source_path: String,
    /// Detected MIME type (multipart-declared, else guessed from the name)
    pub content_type: String,
}

/// One stored file, as persisted in the GridFS files collection.
///
/// `score` and `highlights` are populated only on documents coming back
/// from the search pipeline's `$project` stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileRecord {
    #[serde(
        rename = "_id",
        serialize_with = "bson::serde_helpers::serialize_object_id_as_hex_string"
    )]
    pub id: ObjectId,
    pub filename: String,
    pub length: i64,
    #[serde(
        rename = "uploadDate",
        serialize_with = "bson::serde_helpers::serialize_bson_datetime_as_rfc3339_string"
    )]
    pub upload_date: bson::DateTime,
    pub metadata: FileMetadata,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub highlights: Vec<SearchHighlight>,
}

/// A per-field highlight entry from the search service: a field path plus
/// an ordered sequence of tagged text segments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHighlight {
    pub path: String,
    pub texts: Vec<HighlightText>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

/// One highlight segment: matched term or surrounding context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HighlightText {
    pub value: String,
    #[serde(rename = "type")]
    pub kind: HighlightKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HighlightKind {
    Hit,
    Text,
}

/// JSON listing response for GET /files.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileListing {
    pub page: u64,
    pub page_size: u64,
    pub total_docs: u64,
    pub total_pages: u64,
    pub files: Vec<FileRecord>,
}

/// Split a comma-separated keyword string into the stored ordered sequence:
/// entries trimmed, empty/whitespace-only entries dropped.
pub fn parse_keywords(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect()
}

/// Display form of a stored keyword list.
pub fn join_keywords(keywords: &[String]) -> String {
    keywords.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_keywords_trims_and_drops_empties() {
        let parsed = parse_keywords(" finance , q1 ,, ,report");
        assert_eq!(parsed, vec!["finance", "q1", "report"]);
    }

    #[test]
    fn test_keywords_round_trip_through_display_form() {
        let stored = parse_keywords("finance, q1");
        let display = join_keywords(&stored);
        assert_eq!(display, "finance, q1");
        assert_eq!(parse_keywords(&display), stored);
    }

    #[test]
    fn test_metadata_without_content_serializes_no_content_field() {
        let metadata = FileMetadata {
            name: "Q1 Report".to_string(),
            kind: "application/json".to_string(),
            keywords: vec!["finance".to_string()],
            briefing: String::new(),
            content: None,
            size_bytes: 2048,
            source_path: "report.json".to_string(),
            content_type: "application/json".to_string(),
        };
        let doc = bson::to_document(&metadata).unwrap();
        assert!(!doc.contains_key("content"));
        assert_eq!(doc.get_str("type").unwrap(), "application/json");
        assert_eq!(doc.get_i64("sizeBytes").unwrap(), 2048);
        assert_eq!(doc.get_str("sourcePath").unwrap(), "report.json");
    }

    #[test]
    fn test_metadata_content_round_trips() {
        let metadata = FileMetadata {
            name: "notes".to_string(),
            kind: "text/xml".to_string(),
            keywords: vec![],
            briefing: "xml notes".to_string(),
            content: Some("<note>hi</note>".to_string()),
            size_bytes: 15,
            source_path: "notes.xml".to_string(),
            content_type: "text/xml".to_string(),
        };
        let doc = bson::to_document(&metadata).unwrap();
        let back: FileMetadata = bson::from_document(doc).unwrap();
        assert_eq!(back.content.as_deref(), Some("<note>hi</note>"));
    }

    #[test]
    fn test_highlight_kind_deserializes_from_service_payload() {
        let segment: HighlightText =
            serde_json::from_str(r#"{"value": "quarterly", "type": "hit"}"#).unwrap();
        assert_eq!(segment.kind, HighlightKind::Hit);
        let segment: HighlightText =
            serde_json::from_str(r#"{"value": "the ", "type": "text"}"#).unwrap();
        assert_eq!(segment.kind, HighlightKind::Text);
    }
}
