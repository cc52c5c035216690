//! Due-set notification contract.
//!
//! Delivery is best-effort: the scheduler logs failures and keeps ticking.
//! A host without notification capability reports [`Delivery::Suppressed`]
//! rather than an error.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::NotifyError;

/// Outcome of a notification attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Delivered,
    Suppressed,
}

/// The actions a due alert offers the user.
///
/// `Start` transitions the set directly to active; `Dismiss` changes
/// nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertAction {
    Start,
    Dismiss,
}

/// A due-set alert payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub title: String,
    pub body: String,
    /// 0-based id of the set the alert is about.
    pub set_index: usize,
    pub actions: [AlertAction; 2],
}

impl Alert {
    /// Build the alert for a set that just came due. The body carries the
    /// 1-based ordinal.
    pub fn due_set(set_index: usize) -> Self {
        Self {
            title: "Time for squats!".to_string(),
            body: format!("Set {} is due - time to do your squats!", set_index + 1),
            set_index,
            actions: [AlertAction::Start, AlertAction::Dismiss],
        }
    }
}

/// Delivers a due-set alert to the user.
pub trait Notifier: Send {
    fn notify(&self, alert: &Alert) -> Result<Delivery, NotifyError>;
}

/// Emits alerts through `tracing`. Always counts as delivered.
#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, alert: &Alert) -> Result<Delivery, NotifyError> {
        info!(set_index = alert.set_index, "{}: {}", alert.title, alert.body);
        Ok(Delivery::Delivered)
    }
}

/// Discards alerts. Stands in when notifications are disabled or the host
/// has no notification capability.
#[derive(Debug, Default)]
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn notify(&self, _alert: &Alert) -> Result<Delivery, NotifyError> {
        Ok(Delivery::Suppressed)
    }
}
