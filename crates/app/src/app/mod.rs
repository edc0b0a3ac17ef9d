use std::path::PathBuf;
use std::sync::Arc;

use attendance_core::{LeaveOverlapPolicy, TzOffset};
use attendance_db::Db;

use crate::clock::{Clock, SystemClock};
use crate::error::{AppError, Result};
use crate::services::AppServices;
use crate::util::time::resolve_offset;

/// Paths and report settings needed to run the tracker.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub leave_overlap: LeaveOverlapPolicy,
}

impl AppConfig {
    pub fn new(db_path: PathBuf) -> Self {
        Self {
            db_path,
            leave_overlap: LeaveOverlapPolicy::default(),
        }
    }
}

/// Application state shared by the HTTP server and CLI commands.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub clock: Arc<dyn Clock>,
    pub services: AppServices,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: AppConfig, clock: Arc<dyn Clock>) -> Self {
        let services = AppServices::new(&config, clock.clone());
        Self {
            config,
            clock,
            services,
        }
    }

    pub fn is_fresh_db(&self) -> bool {
        !self.config.db_path.exists()
    }

    pub fn setup_db(&self) -> Result<()> {
        setup_db(&self.config.db_path)
    }

    pub fn initialize(&self) -> Result<()> {
        let is_fresh_db = self.is_fresh_db();
        self.setup_db()
            .map_err(|err| AppError::Message(format!("initialize db: {}", err)))?;
        if is_fresh_db {
            tracing::info!(path = %self.config.db_path.display(), "created database");
        }
        Ok(())
    }

    pub fn open_db(&self) -> Result<Db> {
        Ok(Db::open(&self.config.db_path)?)
    }

    /// Offset for one request, see [`resolve_offset`].
    pub fn resolve_offset(&self, client_minutes: Option<i32>) -> Result<TzOffset> {
        resolve_offset(self.clock.as_ref(), client_minutes)
    }
}

pub fn setup_db(path: &std::path::Path) -> Result<()> {
    let mut db = Db::open(path)?;
    db.migrate()?;
    Ok(())
}
