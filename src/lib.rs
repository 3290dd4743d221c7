pub mod api;
pub mod app;
pub mod config;
pub mod dashboard;
pub mod events;
mod redact;
pub mod refresh;
pub mod state;
pub mod types;

pub use api::{ApiClient, ApiError};
pub use app::App;
pub use config::Config;
pub use events::{InvalidationReason, SessionEvent, SessionEvents};
pub use refresh::{spawn_refresh_loop, RefreshCoordinator, RefreshError, RefreshLoopHandle};
pub use state::{MemoryStorage, SessionStorage, SessionStore};
pub use types::Session;
