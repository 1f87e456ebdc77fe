//! JSON API over the pipeline.
//!
//! Exposes the two reads (latest snapshot, ranking) and the on-demand
//! ingestion trigger.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
