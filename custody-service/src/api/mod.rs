pub mod error;
mod handlers;
pub mod middleware;
mod router;
mod state;

pub use error::ApiError;
pub use router::{build_router, run_api_server};
pub use state::ApiState;

pub(crate) use router::serve;
