//! Live guard decision that follows the session.

use std::collections::HashSet;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

use shiphub_entity::session::AuthState;
use shiphub_entity::user::UserRole;

use super::guard::{GuardDecision, RoleGuard};

/// Re-evaluates a [`RoleGuard`] whenever the session or the allowed role
/// set changes, publishing the decision on a watch channel.
///
/// Dropping the watch stops the background task.
#[derive(Debug)]
pub struct GuardWatch {
    guard_tx: watch::Sender<RoleGuard>,
    decision_rx: watch::Receiver<GuardDecision>,
    task: JoinHandle<()>,
}

impl GuardWatch {
    /// Spawns the evaluation task. Must be called within a Tokio runtime.
    pub fn spawn(guard: RoleGuard, mut session: watch::Receiver<AuthState>) -> Self {
        let initial = guard.evaluate(&session.borrow_and_update());
        let (guard_tx, mut guard_rx) = watch::channel(guard);
        let (decision_tx, decision_rx) = watch::channel(initial);

        let task = tokio::spawn(async move {
            loop {
                tokio::select! {
                    changed = session.changed() => {
                        if changed.is_err() {
                            debug!("Session store dropped; guard watch stopping");
                            break;
                        }
                    }
                    changed = guard_rx.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    }
                }

                let decision = guard_rx.borrow_and_update().evaluate(&session.borrow_and_update());
                decision_tx.send_if_modified(|current| {
                    if *current == decision {
                        false
                    } else {
                        debug!(from = %current, to = %decision, "Guard decision changed");
                        *current = decision;
                        true
                    }
                });
            }
        });

        Self {
            guard_tx,
            decision_rx,
            task,
        }
    }

    /// Replaces the allowed role set; the decision is re-evaluated.
    pub fn set_allowed_roles(&self, roles: impl IntoIterator<Item = UserRole>) {
        let next = RoleGuard::new(roles);
        self.guard_tx.send_if_modified(|guard| {
            if *guard == next {
                false
            } else {
                *guard = next;
                true
            }
        });
    }

    /// The allowed role set currently in force.
    pub fn allowed_roles(&self) -> HashSet<UserRole> {
        self.guard_tx.borrow().allowed().clone()
    }

    /// The current decision.
    pub fn decision(&self) -> GuardDecision {
        *self.decision_rx.borrow()
    }

    /// Subscribes to decision changes.
    pub fn subscribe(&self) -> watch::Receiver<GuardDecision> {
        self.decision_rx.clone()
    }

    /// Waits until the decision leaves `Checking` and returns it.
    pub async fn resolved(&self) -> GuardDecision {
        let mut rx = self.decision_rx.clone();
        match rx.wait_for(GuardDecision::is_resolved).await {
            Ok(decision) => *decision,
            // The task is gone; report whatever was last published.
            Err(_) => *self.decision_rx.borrow(),
        }
    }
}

impl Drop for GuardWatch {
    fn drop(&mut self) {
        self.task.abort();
    }
}
