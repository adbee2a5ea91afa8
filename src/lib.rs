//! # filevault
//!
//! A small web application for uploading files into MongoDB GridFS with
//! structured metadata, and searching that metadata (including extracted
//! document text) through a pre-provisioned Atlas Search index.
//!
//! The app is a thin orchestration layer: indexing, ranking, tokenization,
//! and fuzzy matching all happen inside the managed search service. What
//! lives here is the construction of the compound search pipeline and the
//! reassembly of the service's highlight payload into display snippets.
//!
//! ```text
//!   POST /upload ──▶ extract ──▶ GridFS bucket (blob + metadata)
//!
//!   GET /search?q= ──▶ query builder ──▶ $search aggregation
//!                                             │
//!                      highlight assembler ◀──┘
//!                              │
//!                        HTML results page
//!
//!   GET /, /files ──▶ fs.files collection (paginated, uploadDate desc)
//!   GET /files/{id} ──▶ GridFS download stream
//! ```
//!
//! ## Module Overview
//!
//! - [`config`] - Environment-based configuration: connection string, database
//!   name, bind address, search index name, upload size cap
//! - [`models`] - Shared data types: `FileMetadata`, `FileRecord`, the
//!   highlight payload types, and keyword parsing
//! - [`extract`] - Content-extraction eligibility (closed `ExtractKind` enum)
//!   and text extraction for JSON, XML, and DOCX uploads
//! - [`search::query`] - Compound, boosted, fuzzy `$search` pipeline builder
//! - [`search::highlight`] - Snippet assembly from per-field highlight spans
//! - [`render`] - HTML escaping and the listing/search pages
//! - [`api`] - Axum HTTP handlers for upload, listing, download, and search
//! - [`state`] - Shared application state holding the database handles

pub mod api;
pub mod config;
pub mod extract;
pub mod models;
pub mod render;
pub mod search;
pub mod state;
