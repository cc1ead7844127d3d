#![forbid(unsafe_code)]

//! Content comparison engine (headless).
//!
//! Design goals:
//! - deterministic, testable comparison tables (stable row and column order)
//! - tolerance toward loosely-schematized CMS payloads
//! - runtime-agnostic async APIs (no specific executor required)

pub mod cms;
pub mod compare;
pub mod error;
pub mod item;
pub mod label;
pub mod select;
pub mod source;
pub mod text;

pub use compare::{
    CompareOptions, ComparisonResult, ComparisonRow, Criterion, LIST_SEPARATOR, MISSING_VALUE,
    RowKind, aggregate, criterion_options,
};
pub use error::{Error, Result};
pub use item::{AttrValue, Item, ItemId, Scalar};
pub use label::format_machine_name;
pub use select::{Phase, PickMode, SelectionState, Slot};
pub use source::{FetchedItems, ItemSource, StaticItemSource, sort_by_date_desc};
pub use text::{normalize_lines, plain_text};
