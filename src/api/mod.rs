pub mod files;
pub mod search;
