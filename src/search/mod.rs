pub mod highlight;
pub mod query;
