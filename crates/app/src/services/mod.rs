mod event_log;
mod reconcile;
mod reports;
mod tracker;
mod users;

use std::sync::Arc;

use crate::app::AppConfig;
use crate::clock::Clock;
use crate::error::Result;
use crate::locks::UserLocks;
use attendance_db::Db;

pub use event_log::EventLogService;
pub use reconcile::{ClosedDay, ReconcileReport, ReconcileService};
pub use reports::ReportsService;
pub use tracker::{
    ActionOutcome, BreakSpan, DeleteOutcome, ManualEntry, StatusReport, TrackerService,
    plan_manual_entry,
};
pub use users::{NewUser, UsersService};

/// Everything a service needs besides its own logic.
pub(crate) struct ServiceContext {
    pub(crate) config: AppConfig,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) locks: UserLocks,
}

type SharedContext = Arc<ServiceContext>;

/// Service registry for app-level operations.
#[derive(Clone)]
pub struct AppServices {
    pub event_log: EventLogService,
    pub tracker: TrackerService,
    pub reports: ReportsService,
    pub reconcile: ReconcileService,
    pub users: UsersService,
}

impl AppServices {
    pub fn new(config: &AppConfig, clock: Arc<dyn Clock>) -> Self {
        let shared = Arc::new(ServiceContext {
            config: config.clone(),
            clock,
            locks: UserLocks::new(),
        });
        let event_log = EventLogService::new(shared.clone());
        Self {
            tracker: TrackerService::new(shared.clone(), event_log.clone()),
            reports: ReportsService::new(shared.clone()),
            reconcile: ReconcileService::new(shared.clone(), event_log.clone()),
            users: UsersService::new(shared),
            event_log,
        }
    }
}

fn open_db(ctx: &SharedContext) -> Result<Db> {
    Ok(Db::open(&ctx.config.db_path)?)
}
