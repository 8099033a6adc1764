//! HintScheduler - the transient on-screen queues.
//!
//! Holds the active hint queue and the achievement notification queue. Neither
//! is persisted; both are rebuilt each session from evaluator and tracker
//! output.
//!
//! # Timers
//!
//! Each notification expires after a fixed delay. When a tokio runtime is
//! available a cancellable task is spawned per notification; the task holds
//! only a weak reference to the queue, so it can never act on a torn-down
//! scheduler. Hosts without a runtime call [`HintScheduler::prune_expired`].
//! [`HintScheduler::teardown`] (also run on drop) aborts every pending timer.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use serde::Serialize;
use tokio::task::JoinHandle;

use crate::domain::achievements::AchievementDefinition;
use crate::domain::foundation::{AchievementId, HintId, Timestamp};
use crate::domain::hints::HintDefinition;

/// Why a hint is on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HintSource {
    /// Admitted by the trigger evaluator.
    Triggered,
    /// Requested directly by id.
    Requested,
}

/// A hint currently in the active queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveHint {
    pub definition: HintDefinition,
    pub source: HintSource,
    pub shown_at: Timestamp,
}

impl ActiveHint {
    pub fn id(&self) -> &HintId {
        &self.definition.id
    }
}

/// "Achievement unlocked" toast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AchievementNotification {
    pub achievement: AchievementDefinition,
    pub created_at: Timestamp,
    pub expires_at: Timestamp,
}

impl AchievementNotification {
    pub fn id(&self) -> &AchievementId {
        &self.achievement.id
    }

    pub fn is_expired(&self, now: Timestamp) -> bool {
        !now.is_before(&self.expires_at)
    }
}

#[derive(Debug, Default)]
struct Queues {
    hints: Vec<ActiveHint>,
    notifications: Vec<AchievementNotification>,
    timers: HashMap<AchievementId, JoinHandle<()>>,
}

impl Queues {
    fn remove_notification(&mut self, id: &AchievementId) -> bool {
        let before = self.notifications.len();
        self.notifications.retain(|n| &n.achievement.id != id);
        if let Some(timer) = self.timers.remove(id) {
            timer.abort();
        }
        self.notifications.len() != before
    }

    fn abort_timers(&mut self) {
        for (_, timer) in self.timers.drain() {
            timer.abort();
        }
    }
}

/// Owner of the on-screen hint and notification queues.
#[derive(Debug)]
pub struct HintScheduler {
    queues: Arc<Mutex<Queues>>,
    auto_dismiss: Duration,
}

impl HintScheduler {
    pub fn new(auto_dismiss: Duration) -> Self {
        Self {
            queues: Arc::new(Mutex::new(Queues::default())),
            auto_dismiss,
        }
    }

    pub fn auto_dismiss(&self) -> Duration {
        self.auto_dismiss
    }

    // === Hints ===

    /// Snapshot of the active hint queue, in admission order.
    pub fn active_hints(&self) -> Vec<ActiveHint> {
        self.lock().hints.clone()
    }

    pub fn active_hint_ids(&self) -> Vec<HintId> {
        self.lock().hints.iter().map(|h| h.id().clone()).collect()
    }

    pub fn is_active(&self, id: &str) -> bool {
        self.lock().hints.iter().any(|h| h.id().as_str() == id)
    }

    /// Appends a hint. Returns false if a hint with that id is already active.
    pub fn push_hint(&self, definition: HintDefinition, source: HintSource) -> bool {
        let mut queues = self.lock();
        if queues.hints.iter().any(|h| h.definition.id == definition.id) {
            return false;
        }
        queues.hints.push(ActiveHint {
            definition,
            source,
            shown_at: Timestamp::now(),
        });
        true
    }

    pub fn remove_hint(&self, id: &str) -> Option<ActiveHint> {
        let mut queues = self.lock();
        let index = queues.hints.iter().position(|h| h.id().as_str() == id)?;
        Some(queues.hints.remove(index))
    }

    /// Keeps the hints for which `keep` returns true. Returns the removed ids.
    pub fn retain_hints<F>(&self, mut keep: F) -> Vec<HintId>
    where
        F: FnMut(&ActiveHint) -> bool,
    {
        let mut queues = self.lock();
        let mut removed = Vec::new();
        queues.hints.retain(|hint| {
            let kept = keep(hint);
            if !kept {
                removed.push(hint.id().clone());
            }
            kept
        });
        removed
    }

    // === Achievement notifications ===

    /// Queues a notification and arms its expiry timer.
    pub fn notify_achievement(&self, achievement: AchievementDefinition) -> AchievementNotification {
        let created_at = Timestamp::now();
        let notification = AchievementNotification {
            expires_at: created_at.plus_millis(self.auto_dismiss.as_millis() as u64),
            created_at,
            achievement,
        };
        let id = notification.id().clone();

        let mut queues = self.lock();
        queues.remove_notification(&id);
        queues.notifications.push(notification.clone());

        if let Ok(runtime) = tokio::runtime::Handle::try_current() {
            let timer = runtime.spawn(expire_after(
                Arc::downgrade(&self.queues),
                id.clone(),
                self.auto_dismiss,
            ));
            queues.timers.insert(id, timer);
        }

        notification
    }

    pub fn notifications(&self) -> Vec<AchievementNotification> {
        self.lock().notifications.clone()
    }

    /// Removes a notification before it expires. Cancels its timer.
    pub fn dismiss_notification(&self, id: &str) -> bool {
        self.lock().remove_notification(&AchievementId::from(id))
    }

    /// Drops every notification whose expiry is at or before `now`.
    pub fn prune_expired(&self, now: Timestamp) -> Vec<AchievementId> {
        let mut queues = self.lock();
        let expired: Vec<AchievementId> = queues
            .notifications
            .iter()
            .filter(|n| n.is_expired(now))
            .map(|n| n.id().clone())
            .collect();
        for id in &expired {
            queues.remove_notification(id);
        }
        expired
    }

    /// Number of armed expiry timers.
    pub fn pending_timers(&self) -> usize {
        self.lock().timers.len()
    }

    /// Cancels every timer and empties both queues.
    pub fn teardown(&self) {
        let mut queues = self.lock();
        let timers = queues.timers.len();
        queues.abort_timers();
        queues.hints.clear();
        queues.notifications.clear();
        tracing::debug!(timers, "Hint scheduler torn down");
    }

    fn lock(&self) -> MutexGuard<'_, Queues> {
        self.queues.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for HintScheduler {
    fn drop(&mut self) {
        self.lock().abort_timers();
    }
}

async fn expire_after(queues: Weak<Mutex<Queues>>, id: AchievementId, delay: Duration) {
    tokio::time::sleep(delay).await;

    let Some(queues) = queues.upgrade() else {
        return;
    };
    let mut queues = queues.lock().unwrap_or_else(PoisonError::into_inner);
    // drop our own handle first so remove_notification does not abort us
    queues.timers.remove(&id);
    if queues.remove_notification(&id) {
        tracing::debug!(achievement = %id, "Achievement notification expired");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::achievements::catalog::FIRST_UPLOAD;
    use crate::domain::achievements::AchievementCatalog;
    use crate::domain::hints::catalog::{BATCH_PROCESSING_HINT, GPS_MAP_HINT};
    use crate::domain::hints::HintCatalog;

    fn hint(id: &str) -> HintDefinition {
        HintCatalog::builtin().get(id).unwrap().clone()
    }

    fn achievement(id: &str) -> AchievementDefinition {
        AchievementCatalog::builtin().get(id).unwrap().clone()
    }

    // ════════════════════════════════════════════════════════════════════════
    // Hint queue
    // ════════════════════════════════════════════════════════════════════════

    #[test]
    fn push_hint_dedups_by_id() {
        let scheduler = HintScheduler::new(Duration::from_secs(5));
        assert!(scheduler.push_hint(hint(BATCH_PROCESSING_HINT), HintSource::Triggered));
        assert!(!scheduler.push_hint(hint(BATCH_PROCESSING_HINT), HintSource::Requested));
        assert_eq!(scheduler.active_hints().len(), 1);
        assert_eq!(scheduler.active_hints()[0].source, HintSource::Triggered);
    }

    #[test]
    fn remove_and_retain() {
        let scheduler = HintScheduler::new(Duration::from_secs(5));
        scheduler.push_hint(hint(BATCH_PROCESSING_HINT), HintSource::Triggered);
        scheduler.push_hint(hint(GPS_MAP_HINT), HintSource::Requested);

        let removed = scheduler.retain_hints(|h| h.source == HintSource::Requested);
        assert_eq!(removed, vec![HintId::from(BATCH_PROCESSING_HINT)]);

        assert!(scheduler.remove_hint(GPS_MAP_HINT).is_some());
        assert!(scheduler.remove_hint(GPS_MAP_HINT).is_none());
        assert!(scheduler.active_hint_ids().is_empty());
    }

    // ════════════════════════════════════════════════════════════════════════
    // Notifications without a runtime
    // ════════════════════════════════════════════════════════════════════════

    #[test]
    fn notification_without_runtime_has_no_timer() {
        let scheduler = HintScheduler::new(Duration::from_millis(5000));
        let notification = scheduler.notify_achievement(achievement(FIRST_UPLOAD));

        assert_eq!(scheduler.pending_timers(), 0);
        assert_eq!(
            notification.expires_at,
            notification.created_at.plus_millis(5000)
        );
    }

    #[test]
    fn prune_expired_drops_only_due_notifications() {
        let scheduler = HintScheduler::new(Duration::from_millis(5000));
        let notification = scheduler.notify_achievement(achievement(FIRST_UPLOAD));

        assert!(scheduler
            .prune_expired(notification.created_at.plus_millis(4999))
            .is_empty());
        let expired = scheduler.prune_expired(notification.expires_at);
        assert_eq!(expired, vec![AchievementId::from(FIRST_UPLOAD)]);
        assert!(scheduler.notifications().is_empty());
    }

    #[test]
    fn manual_dismiss_removes_notification() {
        let scheduler = HintScheduler::new(Duration::from_secs(5));
        scheduler.notify_achievement(achievement(FIRST_UPLOAD));
        assert!(scheduler.dismiss_notification(FIRST_UPLOAD));
        assert!(!scheduler.dismiss_notification(FIRST_UPLOAD));
    }

    // ════════════════════════════════════════════════════════════════════════
    // Timers
    // ════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn notification_auto_expires() {
        let scheduler = HintScheduler::new(Duration::from_millis(20));
        scheduler.notify_achievement(achievement(FIRST_UPLOAD));
        assert_eq!(scheduler.pending_timers(), 1);

        tokio::time::sleep(Duration::from_millis(200)).await;

        assert!(scheduler.notifications().is_empty());
        assert_eq!(scheduler.pending_timers(), 0);
    }

    #[tokio::test]
    async fn dismiss_cancels_timer() {
        let scheduler = HintScheduler::new(Duration::from_millis(5000));
        scheduler.notify_achievement(achievement(FIRST_UPLOAD));
        scheduler.dismiss_notification(FIRST_UPLOAD);
        assert_eq!(scheduler.pending_timers(), 0);
    }

    #[tokio::test]
    async fn teardown_aborts_pending_timers() {
        let scheduler = HintScheduler::new(Duration::from_millis(20));
        scheduler.notify_achievement(achievement(FIRST_UPLOAD));
        scheduler.push_hint(hint(BATCH_PROCESSING_HINT), HintSource::Triggered);

        scheduler.teardown();

        assert_eq!(scheduler.pending_timers(), 0);
        assert!(scheduler.notifications().is_empty());
        assert!(scheduler.active_hints().is_empty());

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(scheduler.notifications().is_empty());
    }
}
