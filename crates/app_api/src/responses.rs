use attendance_core::WeeklyDay;
use serde::Serialize;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub time: String,
}

#[derive(Serialize)]
pub struct WeeklyResponse {
    pub days: Vec<WeeklyDay>,
}
