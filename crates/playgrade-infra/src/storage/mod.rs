//! Uploaded image storage.

mod local;

pub use local::{LocalImageStore, UPLOADS_URL_PREFIX};
