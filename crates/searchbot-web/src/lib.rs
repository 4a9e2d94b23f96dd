//! SearchBot web chat: a single embedded page backed by a small JSON API.

pub mod routes;
pub mod server;
pub mod state;

mod assets;
mod error;

pub use error::{Result, WebError};
pub use server::{build_router, start_server};
pub use state::AppState;
