//! HTTP protocol layer module
//!
//! Entity tags, HTTP dates, conditional request evaluation and cache headers,
//! decoupled from request routing.

pub mod accessor;
pub mod cache;
pub mod conditional;
pub mod date;
pub mod etag;
pub mod mime;
pub mod response;

// Re-export commonly used types
pub use accessor::{RequestAccessor, ResponseAccessor, ResponseHead};
pub use cache::{CacheHeaders, CachePolicy};
pub use conditional::{evaluate, ConditionalHeaders, Decision, ValidationState};
pub use etag::{EntityTag, EntityTagError};
pub use response::{build_404_response, build_405_response, build_options_response};
