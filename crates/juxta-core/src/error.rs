use crate::item::ItemId;
use crate::select::PickMode;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Malformed CMS payload: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Fetching items failed: {message}")]
    FetchFailed { message: String },

    #[error("Not enough items selected to compare: need {required}, have {selected}")]
    SelectionTooSmall { required: usize, selected: usize },

    #[error("Unknown item: {id}")]
    UnknownItem { id: ItemId },

    #[error("`{operation}` is not available in {mode} mode")]
    PickModeMismatch {
        operation: &'static str,
        mode: PickMode,
    },
}
