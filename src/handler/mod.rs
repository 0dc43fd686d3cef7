//! Request handler module
//!
//! Request routing dispatch and static file serving with conditional
//! request support.

pub mod router;
pub mod static_files;

// Re-export main entry point
pub use router::handle_request;
