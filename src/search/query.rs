//! Construction of the compound `$search` aggregation pipeline.
//!
//! One free-text string becomes three "should" clauses (any one suffices):
//!
//! 1. Autocomplete on the display name — favors exact-title recall with
//!    typo tolerance.
//! 2. Boosted fuzzy text over keywords, type, source path, and extracted
//!    content combined.
//! 3. Boosted fuzzy text over the briefing alone.
//!
//! The boosts let strong narrative matches outrank weak metadata-only
//! matches; `minimumShouldMatch: 1` keeps unrelated fields from acting as
//! an implicit AND. Ranking itself is the search service's job.

use bson::{doc, Document};

/// Maximum number of ranked results requested per search.
pub const RESULT_LIMIT: i64 = 50;

/// Maximum character edits tolerated by every fuzzy matcher.
const FUZZY_MAX_EDITS: i32 = 1;
/// Leading characters that must match exactly before fuzziness applies.
const FUZZY_PREFIX_LENGTH: i32 = 2;
/// Relevance boost on the free-text clauses.
const TEXT_BOOST: i32 = 2;

/// Fields highlight spans are requested for.
const HIGHLIGHT_PATHS: [&str; 6] = [
    "metadata.name",
    "metadata.type",
    "metadata.keywords",
    "metadata.briefing",
    "metadata.sourcePath",
    "metadata.content",
];

fn fuzzy() -> Document {
    doc! { "maxEdits": FUZZY_MAX_EDITS, "prefixLength": FUZZY_PREFIX_LENGTH }
}

fn boost() -> Document {
    doc! { "boost": { "value": TEXT_BOOST } }
}

/// Build the aggregation pipeline for a non-empty free-text search.
///
/// Handlers short-circuit empty queries before this is called; an empty
/// search string must never reach the external service.
pub fn build_search_pipeline(index: &str, query: &str) -> Vec<Document> {
    vec![
        doc! {
            "$search": {
                "index": index,
                "compound": {
                    "should": [
                        {
                            "autocomplete": {
                                "query": query,
                                "path": "metadata.name",
                                "fuzzy": fuzzy(),
                            }
                        },
                        {
                            "text": {
                                "query": query,
                                "path": [
                                    "metadata.keywords",
                                    "metadata.type",
                                    "metadata.sourcePath",
                                    "metadata.content",
                                ],
                                "fuzzy": fuzzy(),
                                "score": boost(),
                            }
                        },
                        {
                            "text": {
                                "query": query,
                                "path": "metadata.briefing",
                                "fuzzy": fuzzy(),
                                "score": boost(),
                            }
                        },
                    ],
                    "minimumShouldMatch": 1,
                },
                "highlight": { "path": HIGHLIGHT_PATHS.to_vec() },
            }
        },
        doc! { "$limit": RESULT_LIMIT },
        doc! {
            "$project": {
                "filename": 1,
                "length": 1,
                "uploadDate": 1,
                "metadata": 1,
                "score": { "$meta": "searchScore" },
                "highlights": { "$meta": "searchHighlights" },
            }
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_has_search_limit_project_stages() {
        let pipeline = build_search_pipeline("default", "quarterly");
        assert_eq!(pipeline.len(), 3);
        assert!(pipeline[0].contains_key("$search"));
        assert_eq!(pipeline[1].get_i64("$limit").unwrap(), 50);
        assert!(pipeline[2].contains_key("$project"));
    }

    #[test]
    fn test_compound_should_clauses() {
        let pipeline = build_search_pipeline("default", "quarterly");
        let search = pipeline[0].get_document("$search").unwrap();
        assert_eq!(search.get_str("index").unwrap(), "default");

        let compound = search.get_document("compound").unwrap();
        assert_eq!(compound.get_i32("minimumShouldMatch").unwrap(), 1);

        let should = compound.get_array("should").unwrap();
        assert_eq!(should.len(), 3);

        // Clause 1: autocomplete on the name, fuzzy
        let autocomplete = should[0]
            .as_document()
            .unwrap()
            .get_document("autocomplete")
            .unwrap();
        assert_eq!(autocomplete.get_str("query").unwrap(), "quarterly");
        assert_eq!(autocomplete.get_str("path").unwrap(), "metadata.name");
        let fuzzy = autocomplete.get_document("fuzzy").unwrap();
        assert_eq!(fuzzy.get_i32("maxEdits").unwrap(), 1);
        assert_eq!(fuzzy.get_i32("prefixLength").unwrap(), 2);

        // Clause 2: boosted text over the combined free-text fields
        let text = should[1]
            .as_document()
            .unwrap()
            .get_document("text")
            .unwrap();
        let paths = text.get_array("path").unwrap();
        assert_eq!(paths.len(), 4);
        let boost = text
            .get_document("score")
            .unwrap()
            .get_document("boost")
            .unwrap();
        assert_eq!(boost.get_i32("value").unwrap(), 2);

        // Clause 3: boosted text over the briefing alone
        let briefing = should[2]
            .as_document()
            .unwrap()
            .get_document("text")
            .unwrap();
        assert_eq!(briefing.get_str("path").unwrap(), "metadata.briefing");
        assert!(briefing.get_document("fuzzy").is_ok());
        assert!(briefing.get_document("score").is_ok());
    }

    #[test]
    fn test_highlights_requested_for_all_six_fields() {
        let pipeline = build_search_pipeline("default", "q");
        let highlight = pipeline[0]
            .get_document("$search")
            .unwrap()
            .get_document("highlight")
            .unwrap();
        let paths = highlight.get_array("path").unwrap();
        assert_eq!(paths.len(), 6);
        assert!(paths.iter().any(|p| p.as_str() == Some("metadata.briefing")));
        assert!(paths.iter().any(|p| p.as_str() == Some("metadata.content")));
    }

    #[test]
    fn test_projection_carries_score_and_highlights_metadata() {
        let pipeline = build_search_pipeline("default", "q");
        let project = pipeline[2].get_document("$project").unwrap();
        assert_eq!(
            project.get_document("score").unwrap().get_str("$meta").unwrap(),
            "searchScore"
        );
        assert_eq!(
            project
                .get_document("highlights")
                .unwrap()
                .get_str("$meta")
                .unwrap(),
            "searchHighlights"
        );
        assert!(project.contains_key("metadata"));
        assert!(project.contains_key("uploadDate"));
    }

    #[test]
    fn test_index_name_is_configurable() {
        let pipeline = build_search_pipeline("files_index", "q");
        let search = pipeline[0].get_document("$search").unwrap();
        assert_eq!(search.get_str("index").unwrap(), "files_index");
    }
}
