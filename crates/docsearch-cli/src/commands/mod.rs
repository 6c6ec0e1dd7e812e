pub mod convert;
pub mod extract;
pub mod ingest;
pub mod list;
pub mod remove;
pub mod search;
