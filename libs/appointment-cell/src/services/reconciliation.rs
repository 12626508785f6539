// libs/appointment-cell/src/services/reconciliation.rs
use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Duration, Instant, MissedTickBehavior};
use tracing::{debug, error, info, instrument, warn};

use doctor_cell::ScheduleService;
use notification_cell::{NotificationGateway, NotificationOutcome, Recipient};

use crate::models::{Appointment, AppointmentError, AppointmentStatus, ReconciliationReport};
use crate::services::contacts::ContactDirectory;
use crate::services::lifecycle::AppointmentLifecycleService;
use crate::services::store::AppointmentStore;

pub const MISSED_APPOINTMENT_SUBJECT: &str = "Missed Appointment";

/// Message sent to a patient whose appointment was missed.
pub fn compose_missed_message(slots: &[DateTime<Utc>]) -> String {
    let rendered: Vec<String> = slots
        .iter()
        .map(|slot| slot.to_rfc3339_opts(SecondsFormat::Secs, true))
        .collect();

    format!(
        "Your appointment was missed. Available slots: {}",
        rendered.join(", ")
    )
}

/// Finds no-shows, marks them missed and tells the patient which slots the
/// doctor still offers.
pub struct ReconciliationService {
    appointments: Arc<dyn AppointmentStore>,
    schedules: Arc<ScheduleService>,
    contacts: Arc<dyn ContactDirectory>,
    notifications: Arc<NotificationGateway>,
    lifecycle: AppointmentLifecycleService,
}

impl ReconciliationService {
    pub fn new(
        appointments: Arc<dyn AppointmentStore>,
        schedules: Arc<ScheduleService>,
        contacts: Arc<dyn ContactDirectory>,
        notifications: Arc<NotificationGateway>,
    ) -> Self {
        Self {
            appointments,
            schedules,
            contacts,
            notifications,
            lifecycle: AppointmentLifecycleService::new(),
        }
    }

    /// One reconciliation tick. Only the initial scan can fail the tick;
    /// per-appointment problems are logged and counted.
    #[instrument(skip(self))]
    pub async fn run_tick(&self, now: DateTime<Utc>) -> Result<ReconciliationReport, AppointmentError> {
        let cutoff = self.lifecycle.missed_cutoff(now);
        let overdue = self.appointments.find_scheduled_before(cutoff).await?;

        let mut report = ReconciliationReport {
            scanned: overdue.len(),
            ..Default::default()
        };

        for appointment in overdue {
            self.reconcile_appointment(appointment, now, &mut report).await;
        }

        Ok(report)
    }

    async fn reconcile_appointment(
        &self,
        appointment: Appointment,
        now: DateTime<Utc>,
        report: &mut ReconciliationReport,
    ) {
        if !self
            .lifecycle
            .should_mark_missed(&appointment.status, appointment.scheduled_time, now)
        {
            report.skipped += 1;
            return;
        }

        let missed = Appointment {
            status: AppointmentStatus::Missed,
            ..appointment
        };

        match self
            .appointments
            .update_if_status(AppointmentStatus::Scheduled, &missed)
            .await
        {
            Ok(true) => {
                info!("Appointment {} marked as missed", missed.id);
                report.marked_missed += 1;
            }
            Ok(false) => {
                debug!("Appointment {} changed before it could be marked missed", missed.id);
                report.skipped += 1;
                return;
            }
            Err(e) => {
                error!("Failed to mark appointment {} as missed: {}", missed.id, e);
                report.skipped += 1;
                return;
            }
        }

        match self.notify_patient(&missed).await {
            Some(outcome) if outcome.any_delivered() => {
                report.notified += 1;
                self.record_notification_sent(missed).await;
            }
            Some(outcome) => {
                warn!(
                    "Notification for appointment {} failed on every channel (email: {}, sms: {})",
                    missed.id, outcome.email_response.message, outcome.sms_response.message
                );
                report.notification_failures += 1;
            }
            None => {}
        }
    }

    /// Returns None when there is nothing to offer the patient.
    async fn notify_patient(&self, appointment: &Appointment) -> Option<NotificationOutcome> {
        let schedule = match self.schedules.find_schedule(&appointment.doctor_id).await {
            Ok(Some(schedule)) if schedule.has_availability() => schedule,
            Ok(_) => {
                debug!(
                    "Doctor {} has no open slots, not notifying patient {}",
                    appointment.doctor_id, appointment.patient_id
                );
                return None;
            }
            Err(e) => {
                error!("Failed to load schedule for doctor {}: {}", appointment.doctor_id, e);
                return None;
            }
        };

        let recipient = match self.contacts.find_contact(&appointment.patient_id).await {
            Ok(Some(contact)) => Recipient::from(contact),
            Ok(None) => {
                warn!("No contact details on file for patient {}", appointment.patient_id);
                Recipient::default()
            }
            Err(e) => {
                error!("Failed to load contact for patient {}: {}", appointment.patient_id, e);
                Recipient::default()
            }
        };

        let message = compose_missed_message(&schedule.available_slots);
        Some(
            self.notifications
                .notify(&recipient, MISSED_APPOINTMENT_SUBJECT, &message)
                .await,
        )
    }

    async fn record_notification_sent(&self, missed: Appointment) {
        let notified = Appointment {
            notification_sent: true,
            ..missed
        };

        match self
            .appointments
            .update_if_status(AppointmentStatus::Missed, &notified)
            .await
        {
            Ok(true) => {}
            Ok(false) => debug!("Appointment {} moved on before notification flag was set", notified.id),
            Err(e) => warn!("Failed to flag notification for appointment {}: {}", notified.id, e),
        }
    }
}

/// Owns the periodic reconciliation task. Stopped by flipping the shutdown
/// channel to true; an in-flight tick finishes first.
pub struct ReconciliationWorker {
    service: Arc<ReconciliationService>,
    interval: Duration,
}

impl ReconciliationWorker {
    pub fn new(service: Arc<ReconciliationService>, interval: Duration) -> Self {
        Self { service, interval }
    }

    pub fn spawn(self, shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(self.run(shutdown))
    }

    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        info!("Starting reconciliation worker (every {:?})", self.interval);

        let mut ticker = interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            if *shutdown.borrow() {
                break;
            }

            tokio::select! {
                _ = ticker.tick() => {
                    match self.service.run_tick(Utc::now()).await {
                        Ok(report) if report.scanned > 0 => info!(
                            "Reconciliation tick: scanned={}, missed={}, notified={}, failed_notifications={}, skipped={}",
                            report.scanned,
                            report.marked_missed,
                            report.notified,
                            report.notification_failures,
                            report.skipped
                        ),
                        Ok(_) => debug!("Reconciliation tick: nothing overdue"),
                        Err(e) => error!("Reconciliation tick failed: {}", e),
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }

        info!("Reconciliation worker stopped");
    }
}
