pub mod app;
pub mod clock;
pub mod config;
pub mod error;
pub mod locks;
pub mod services;
pub mod startup;
pub mod util;

pub use app::{AppConfig, AppState};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::RangeParams;
pub use error::{ApiError, AppError, Result};
pub use locks::UserLocks;
pub use services::{
    ActionOutcome, AppServices, BreakSpan, ClosedDay, DeleteOutcome, ManualEntry, NewUser,
    ReconcileReport, StatusReport,
};
pub use startup::{AppPaths, DB_FILE_NAME, ensure_app_data_dir};
pub use util::time::resolve_offset;
pub use util::token::generate_token;
