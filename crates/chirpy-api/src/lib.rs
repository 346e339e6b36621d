pub mod admin;
pub mod auth;
pub mod chirps;
pub mod convert;
pub mod error;
pub mod filter;
pub mod hits;
pub mod middleware;
pub mod polka;
pub mod router;
pub mod sessions;
pub mod state;
pub mod users;

pub use error::ApiError;
pub use router::router;
pub use state::{ApiConfig, AppState, AppStateInner, Platform};
