pub mod app_state;
pub mod config;
pub mod routes;

pub use app_state::AppState;
pub use routes::build_router;
