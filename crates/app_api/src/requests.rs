use attendance_app::{BreakSpan, ManualEntry};
use attendance_core::WorkMode;
use serde::Deserialize;

#[derive(Debug, Deserialize, Default)]
pub struct ClockInRequest {
    pub work_mode: Option<WorkMode>,
}

#[derive(Debug, Deserialize, Default)]
pub struct HistoryRequest {
    pub from: Option<String>,
    pub to: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct DaysRequest {
    pub days: Option<u32>,
}

#[derive(Debug, Deserialize, Default)]
pub struct ManualEntryRequest {
    pub date: Option<String>,
    pub clock_in: Option<String>,
    pub clock_out: Option<String>,
    #[serde(default)]
    pub breaks: Vec<BreakSpan>,
    pub work_mode: Option<WorkMode>,
    #[serde(rename = "timezoneOffset")]
    pub timezone_offset: Option<i32>,
}

impl ManualEntryRequest {
    pub fn into_entry(self) -> ManualEntry {
        ManualEntry {
            date: self.date.unwrap_or_default(),
            clock_in: self.clock_in.unwrap_or_default(),
            clock_out: self.clock_out,
            breaks: self.breaks,
            work_mode: self.work_mode,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
}

#[derive(Debug, Deserialize)]
pub struct AddLeaveRequest {
    pub user_id: i64,
    pub date: String,
    pub leave_type: String,
    pub reason: Option<String>,
}
