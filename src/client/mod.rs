//! Typed client for the back-office API.
//!
//! The HTTP layer wraps `reqwest` and maps failures into [`ClientError`];
//! the submodules hold the UI-independent state machines consumers drive:
//! list fetching with pagination/sort/search, image reconciliation, stock
//! adjustment, and map preparation.

pub mod http;
pub mod images;
pub mod list;
pub mod map;
pub mod session;
pub mod stock;

pub use http::{ApiClient, ClientError};
pub use session::Session;
