//! Core data models for articles, classification outcomes and report rows.

mod article;
mod classification;
mod report;

pub use article::{Article, Author};
pub use classification::{Classification, DecisionReason};
pub use report::{ReportRow, REPORT_HEADERS};
