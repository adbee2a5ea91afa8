//! HTML rendering for the listing and search pages.
//!
//! Everything user- or document-derived (names, keywords, briefings,
//! filenames, snippets) passes through [`escape_html`] before it reaches
//! markup; stored file content is untrusted.

use crate::models::{join_keywords, FileRecord, SearchHighlight};
use crate::search::highlight::render_snippet;

/// Escape the characters that would let untrusted text inject markup.
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Number of pages needed for `total` documents at `page_size` per page.
pub fn total_pages(total: u64, page_size: u64) -> u64 {
    total.div_ceil(page_size)
}

fn format_date(date: bson::DateTime) -> String {
    date.to_chrono().format("%Y-%m-%d %H:%M").to_string()
}

fn page(title: &str, body: &str) -> String {
    format!(
        "<!doctype html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{title}</title>\n\
         <style>\n\
         body {{ font-family: sans-serif; margin: 2rem; }}\n\
         table {{ border-collapse: collapse; width: 100%; }}\n\
         th, td {{ border: 1px solid #ccc; padding: 0.4rem; text-align: left; vertical-align: top; }}\n\
         table.highlights {{ margin: 0; }}\n\
         em {{ background: #ff6; font-style: normal; }}\n\
         nav a {{ margin-right: 1rem; }}\n\
         </style>\n</head>\n<body>\n\
         <nav><a href=\"/\">Files</a><a href=\"/search\">Search</a></nav>\n\
         {body}\n</body>\n</html>\n"
    )
}

/// The paginated HTML listing at `GET /`, with the upload form on top.
pub fn listing_page(files: &[FileRecord], page_num: u64, page_size: u64, total_docs: u64) -> String {
    let mut body = String::from(
        "<h1>Stored files</h1>\n\
         <form action=\"/upload\" method=\"post\" enctype=\"multipart/form-data\">\n\
         <p><input type=\"file\" name=\"file\" required></p>\n\
         <p><input type=\"text\" name=\"displayName\" placeholder=\"Display name\"></p>\n\
         <p><input type=\"text\" name=\"type\" placeholder=\"Type\"></p>\n\
         <p><input type=\"text\" name=\"keywords\" placeholder=\"Keywords (comma-separated)\"></p>\n\
         <p><textarea name=\"briefing\" placeholder=\"Briefing\"></textarea></p>\n\
         <p><button type=\"submit\">Upload</button></p>\n\
         </form>\n",
    );

    body.push_str(
        "<table>\n<tr><th>Name</th><th>File</th><th>Type</th><th>Keywords</th>\
         <th>Briefing</th><th>Size</th><th>Uploaded</th><th></th></tr>\n",
    );
    for record in files {
        body.push_str(&listing_row(record, "/files"));
    }
    body.push_str("</table>\n");

    body.push_str(&pager(page_num, page_size, total_docs));
    page("filevault", &body)
}

fn listing_row(record: &FileRecord, download_prefix: &str) -> String {
    format!(
        "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td>\
         <td>{} bytes</td><td>{}</td>\
         <td><a href=\"{}/{}\">download</a></td></tr>\n",
        escape_html(&record.metadata.name),
        escape_html(&record.filename),
        escape_html(&record.metadata.kind),
        escape_html(&join_keywords(&record.metadata.keywords)),
        escape_html(&record.metadata.briefing),
        record.length,
        format_date(record.upload_date),
        download_prefix,
        record.id.to_hex(),
    )
}

fn pager(page_num: u64, page_size: u64, total_docs: u64) -> String {
    let pages = total_pages(total_docs, page_size);
    let mut nav = format!("<p>Page {page_num} of {pages} ({total_docs} files). ");
    if page_num > 1 {
        nav.push_str(&format!(
            "<a href=\"/?page={}&pageSize={page_size}\">previous</a> ",
            page_num - 1
        ));
    }
    if page_num < pages {
        nav.push_str(&format!(
            "<a href=\"/?page={}&pageSize={page_size}\">next</a>",
            page_num + 1
        ));
    }
    nav.push_str("</p>\n");
    nav
}

/// The HTML search page at `GET /search`.
///
/// `results` is `None` when no query was submitted (bare form), `Some` with
/// the ranked records otherwise.
pub fn search_page(query: &str, results: Option<&[FileRecord]>) -> String {
    let mut body = format!(
        "<h1>Search</h1>\n\
         <form action=\"/search\" method=\"get\">\n\
         <input type=\"text\" name=\"q\" value=\"{}\" placeholder=\"Search files\">\n\
         <button type=\"submit\">Search</button>\n\
         </form>\n",
        escape_html(query)
    );

    if let Some(records) = results {
        body.push_str(&format!(
            "<p>{} result(s) for \u{201c}{}\u{201d}.</p>\n",
            records.len(),
            escape_html(query)
        ));
        body.push_str(
            "<table>\n<tr><th>Name</th><th>File</th><th>Score</th>\
             <th>Matches</th><th>Uploaded</th><th></th></tr>\n",
        );
        for record in records {
            body.push_str(&result_row(record));
        }
        body.push_str("</table>\n");
    }

    page("filevault search", &body)
}

fn result_row(record: &FileRecord) -> String {
    let score = record
        .score
        .map(|s| format!("{s:.2}"))
        .unwrap_or_default();
    format!(
        "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td>\
         <td><a href=\"/search/download/{}\">download</a></td></tr>\n",
        escape_html(&record.metadata.name),
        escape_html(&record.filename),
        score,
        highlight_table(&record.highlights),
        format_date(record.upload_date),
        record.id.to_hex(),
    )
}

/// Sub-table of (field path, snippet) rows, one per highlighted field.
/// An empty highlight list renders nothing at all, not an empty table.
pub fn highlight_table(highlights: &[SearchHighlight]) -> String {
    if highlights.is_empty() {
        return String::new();
    }
    let mut table = String::from("<table class=\"highlights\">\n");
    for highlight in highlights {
        // The snippet is already escaped markup; only the path needs escaping.
        table.push_str(&format!(
            "<tr><td>{}</td><td>{}</td></tr>\n",
            escape_html(&highlight.path),
            render_snippet(highlight)
        ));
    }
    table.push_str("</table>");
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FileMetadata, HighlightKind, HighlightText};
    use bson::oid::ObjectId;

    fn record(name: &str, briefing: &str) -> FileRecord {
        FileRecord {
            id: ObjectId::new(),
            filename: "report.json".to_string(),
            length: 2048,
            upload_date: bson::DateTime::now(),
            metadata: FileMetadata {
                name: name.to_string(),
                kind: "application/json".to_string(),
                keywords: vec!["finance".to_string(), "q1".to_string()],
                briefing: briefing.to_string(),
                content: None,
                size_bytes: 2048,
                source_path: "report.json".to_string(),
                content_type: "application/json".to_string(),
            },
            score: None,
            highlights: vec![],
        }
    }

    #[test]
    fn test_escape_html_covers_markup_characters() {
        assert_eq!(
            escape_html(r#"<a href="x">&'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&amp;&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_total_pages_rounds_up() {
        assert_eq!(total_pages(15, 10), 2);
        assert_eq!(total_pages(20, 20), 1);
        assert_eq!(total_pages(21, 20), 2);
        assert_eq!(total_pages(0, 20), 0);
    }

    #[test]
    fn test_listing_row_escapes_untrusted_metadata() {
        let html = listing_page(&[record("<script>alert(1)</script>", "b")], 1, 20, 1);
        assert!(!html.contains("<script>alert(1)</script>"));
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
    }

    #[test]
    fn test_listing_shows_keywords_as_comma_space_join() {
        let html = listing_page(&[record("Q1 Report", "quarterly summary")], 1, 20, 1);
        assert!(html.contains("finance, q1"));
        assert!(html.contains("Q1 Report"));
        assert!(html.contains("quarterly summary"));
    }

    #[test]
    fn test_search_page_without_query_renders_bare_form() {
        let html = search_page("", None);
        assert!(html.contains("name=\"q\""));
        assert!(!html.contains("result(s)"));
    }

    #[test]
    fn test_search_page_escapes_query_echo() {
        let html = search_page("\"><img src=x>", None);
        assert!(!html.contains("\"><img src=x>"));
    }

    #[test]
    fn test_highlight_table_empty_is_empty_string() {
        assert_eq!(highlight_table(&[]), "");
    }

    #[test]
    fn test_highlight_table_lists_field_paths_with_snippets() {
        let highlights = vec![SearchHighlight {
            path: "metadata.briefing".to_string(),
            texts: vec![
                HighlightText {
                    value: "a ".to_string(),
                    kind: HighlightKind::Text,
                },
                HighlightText {
                    value: "quarterly".to_string(),
                    kind: HighlightKind::Hit,
                },
            ],
            score: Some(1.5),
        }];
        let table = highlight_table(&highlights);
        assert!(table.contains("metadata.briefing"));
        assert!(table.contains("a <em>quarterly</em>"));
    }
}
