//! Image editing module.

mod adapter;
mod transport;
mod types;
pub mod wire;

pub use adapter::EditAdapter;
pub use transport::{ContentGenerator, HttpGenerator};
pub use types::{
    strip_data_uri_prefix, to_data_uri, EditRequest, EditResult, HistoryItem, ImageFormat,
    ImagePayload, DEFAULT_RESULT_MIME_TYPE,
};
