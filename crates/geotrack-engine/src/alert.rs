//! Edge-triggered alerting
//!
//! An alert is raised on the transition into a condition and resolved on the
//! transition out of it. While a condition stays active, further reports are
//! absorbed unless a re-notification interval is configured.

use geotrack_core::config::NotificationConfig;
use geotrack_core::error::Result;
use geotrack_core::models::{Alert, AlertId, AlertKind, Fix, SystemEvent};
use geotrack_core::ports::Notifier;
use geotrack_store::LocationStore;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// An alert whose condition is still active
#[derive(Debug, Clone)]
pub struct ActiveAlert {
    pub alert: Alert,
    pub last_notified: Instant,
}

/// Active conditions, keyed by kind
#[derive(Debug, Default)]
pub struct AlertState {
    active: HashMap<AlertKind, ActiveAlert>,
}

impl AlertState {
    pub fn is_active(&self, kind: &AlertKind) -> bool {
        self.active.contains_key(kind)
    }

    pub fn get(&self, kind: &AlertKind) -> Option<&ActiveAlert> {
        self.active.get(kind)
    }

    pub fn active_kinds(&self) -> impl Iterator<Item = &AlertKind> {
        self.active.keys()
    }
}

/// Outcome of one notification round
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Delivery {
    pub attempts: u32,
    pub delivered: u32,
}

/// Decides when a condition becomes an alert, persists it and notifies
pub struct AlertManager {
    store: Arc<dyn LocationStore>,
    notifier: Arc<dyn Notifier>,
    destinations: Vec<String>,
    send_timeout: Duration,
    renotify_interval: Option<Duration>,
    state: AlertState,
}

impl AlertManager {
    pub fn new(
        store: Arc<dyn LocationStore>,
        notifier: Arc<dyn Notifier>,
        config: &NotificationConfig,
    ) -> Self {
        Self {
            store,
            notifier,
            destinations: config.destinations.clone(),
            send_timeout: config.send_timeout(),
            renotify_interval: config.renotify_interval(),
            state: AlertState::default(),
        }
    }

    pub fn state(&self) -> &AlertState {
        &self.state
    }

    /// Report that `kind` holds
    ///
    /// Returns the new alert if this call raised one. A report for a kind that
    /// is already active raises nothing; it re-notifies only when a
    /// re-notification interval is configured and has elapsed.
    pub async fn report_breach(
        &mut self,
        kind: AlertKind,
        message: &str,
        fix: Option<&Fix>,
    ) -> Option<Alert> {
        if self.state.is_active(&kind) {
            self.maybe_renotify(&kind).await;
            return None;
        }

        let mut alert = Alert::new(kind.clone(), message, fix);

        match self.store.append_alert(&alert).await {
            Ok(id) => alert.id = Some(id),
            Err(e) => {
                tracing::error!(kind = %kind, error = %e, "Failed to persist alert; notifying anyway");
            }
        }

        tracing::warn!(
            kind = %kind,
            id = ?alert.id.map(|id| id.0),
            message = %alert.message,
            "Alert raised"
        );

        let delivery = self.notify(&alert).await;
        alert.notification_attempts = delivery.attempts;
        alert.notification_success = delivery.delivered > 0;
        self.persist_delivery(&alert).await;

        self.record_event(SystemEvent::new(
            "ALERT",
            "RAISED",
            format!("{}: {}", kind, alert.message),
        ))
        .await;

        self.state.active.insert(
            kind,
            ActiveAlert { alert: alert.clone(), last_notified: Instant::now() },
        );

        Some(alert)
    }

    /// Report that `kind` no longer holds
    ///
    /// Returns `true` if an active condition was cleared.
    pub async fn report_clear(&mut self, kind: &AlertKind) -> bool {
        let Some(active) = self.state.active.remove(kind) else {
            return false;
        };

        let id = match active.alert.id {
            Some(id) => Some(id),
            None => self.latest_open_of_kind(kind).await,
        };

        if let Some(id) = id {
            if let Err(e) = self.store.resolve(id).await {
                tracing::error!(kind = %kind, id = id.0, error = %e, "Failed to resolve alert");
            }
        }

        tracing::info!(kind = %kind, id = ?id.map(|id| id.0), "Alert condition cleared");
        true
    }

    /// Operator resolution of a stored alert
    ///
    /// The in-memory condition state is left untouched: a condition that is
    /// still active will not raise a second alert until it clears.
    pub async fn resolve(&self, id: AlertId) -> Result<bool> {
        let resolved = self.store.resolve(id).await?;
        if resolved {
            tracing::info!(id = id.0, "Alert resolved by operator");
        }
        Ok(resolved)
    }

    /// Send the alert text to every destination in order
    async fn notify(&self, alert: &Alert) -> Delivery {
        let text = alert.notification_text();
        let mut delivery = Delivery::default();

        for destination in &self.destinations {
            delivery.attempts += 1;

            match tokio::time::timeout(self.send_timeout, self.notifier.send(destination, &text))
                .await
            {
                Ok(Ok(())) => {
                    delivery.delivered += 1;
                    tracing::info!(
                        transport = self.notifier.name(),
                        destination = %destination,
                        "Notification sent"
                    );
                }
                Ok(Err(e)) => {
                    tracing::warn!(
                        transport = self.notifier.name(),
                        destination = %destination,
                        error = %e,
                        "Notification failed"
                    );
                }
                Err(_) => {
                    tracing::warn!(
                        transport = self.notifier.name(),
                        destination = %destination,
                        timeout = ?self.send_timeout,
                        "Notification timed out"
                    );
                }
            }
        }

        if delivery.attempts > 0 && delivery.delivered == 0 {
            tracing::warn!(id = ?alert.id.map(|id| id.0), "No destination accepted the alert");
        }

        delivery
    }

    async fn maybe_renotify(&mut self, kind: &AlertKind) {
        let Some(interval) = self.renotify_interval else {
            return;
        };

        let due = self
            .state
            .get(kind)
            .map(|active| active.last_notified.elapsed() >= interval)
            .unwrap_or(false);
        if !due {
            return;
        }

        let Some(mut active) = self.state.active.remove(kind) else {
            return;
        };

        tracing::info!(kind = %kind, "Condition still active; re-sending notification");

        let delivery = self.notify(&active.alert).await;
        active.alert.notification_attempts += delivery.attempts;
        active.alert.notification_success |= delivery.delivered > 0;
        active.last_notified = Instant::now();
        self.persist_delivery(&active.alert).await;

        self.state.active.insert(kind.clone(), active);
    }

    async fn persist_delivery(&self, alert: &Alert) {
        let Some(id) = alert.id else {
            return;
        };

        if let Err(e) = self
            .store
            .record_delivery(id, alert.notification_attempts, alert.notification_success)
            .await
        {
            tracing::error!(id = id.0, error = %e, "Failed to record notification outcome");
        }
    }

    async fn latest_open_of_kind(&self, kind: &AlertKind) -> Option<AlertId> {
        match self.store.open_alerts().await {
            Ok(open) => open.iter().rev().find(|a| &a.kind == kind).and_then(|a| a.id),
            Err(e) => {
                tracing::error!(kind = %kind, error = %e, "Failed to look up open alerts");
                None
            }
        }
    }

    async fn record_event(&self, event: SystemEvent) {
        if let Err(e) = self.store.record_event(&event).await {
            tracing::debug!(error = %e, "Failed to record system event");
        }
    }
}
