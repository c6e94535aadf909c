//! Client side of the API: an HTTP client that keeps its own session and
//! refreshes expired tokens, plus the permission gate used to decide which
//! controls to show.

mod api;
mod error;
mod gate;

pub use api::ApiClient;
pub use error::{ClientError, Result};
pub use gate::UiGate;
