// libs/appointment-cell/src/services/lifecycle.rs
use chrono::{DateTime, Utc};
use tracing::debug;

use crate::models::{grace_period, AppointmentStatus};

#[derive(Debug, Clone, Copy, Default)]
pub struct AppointmentLifecycleService;

impl AppointmentLifecycleService {
    pub fn new() -> Self {
        Self
    }

    /// Whether `current_status` may move to `new_status`
    pub fn can_transition(&self, current_status: &AppointmentStatus, new_status: &AppointmentStatus) -> bool {
        let allowed = self.get_valid_transitions(current_status).contains(new_status);
        if !allowed {
            debug!("Status transition {} -> {} not allowed", current_status, new_status);
        }
        allowed
    }

    /// Get all valid next statuses for a given current status
    pub fn get_valid_transitions(&self, current_status: &AppointmentStatus) -> Vec<AppointmentStatus> {
        match current_status {
            AppointmentStatus::Scheduled => vec![
                AppointmentStatus::Missed,
                AppointmentStatus::Completed,
            ],
            AppointmentStatus::Missed => vec![AppointmentStatus::Scheduled],
            // Terminal
            AppointmentStatus::Completed => vec![],
        }
    }

    /// Latest start time that still counts as on time at `now`.
    pub fn missed_cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - grace_period()
    }

    /// Check if an appointment should be marked as missed
    pub fn should_mark_missed(
        &self,
        current_status: &AppointmentStatus,
        scheduled_time: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> bool {
        self.can_transition(current_status, &AppointmentStatus::Missed)
            && scheduled_time < self.missed_cutoff(now)
    }
}
