use callward_domain::{CallStatusUpdate, ReminderResult, ID};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

/// Messages pushed to a connected observer
#[derive(Debug, Clone, PartialEq)]
pub enum ObserverEvent {
    /// Full replacement snapshot of the latest polling cycle
    JobResult(Vec<ReminderResult>),
    /// Progress of a single dispatched call, forwarded from the telephony
    /// provider's status callback
    CallStatus(CallStatusUpdate),
}

struct Observer {
    user_id: ID,
    phone_number: Option<String>,
    sender: UnboundedSender<ObserverEvent>,
}

/// Owns the set of live observer connections and the last published result
/// snapshot. One instance is created at process start, carried by the
/// `Context` and shared between the reminder job, the connection layer and
/// the telephony status callback.
#[derive(Clone)]
pub struct Broadcaster {
    inner: Arc<BroadcasterInner>,
}

struct BroadcasterInner {
    // Keyed by connection order so that eligibility enumeration and result
    // ordering are deterministic for a given set of connections
    observers: Mutex<BTreeMap<u64, Observer>>,
    next_connection_id: AtomicU64,
    snapshot: RwLock<Vec<ReminderResult>>,
}

impl Broadcaster {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(BroadcasterInner {
                observers: Mutex::new(BTreeMap::new()),
                next_connection_id: AtomicU64::new(1),
                snapshot: RwLock::new(Vec::new()),
            }),
        }
    }

    /// Registers a live observer and immediately delivers the current
    /// snapshot, so late joiners never start from an empty screen. Returns
    /// the connection id used for `unregister`.
    pub fn register(
        &self,
        user_id: ID,
        phone_number: Option<String>,
        sender: UnboundedSender<ObserverEvent>,
    ) -> u64 {
        let connection_id = self.inner.next_connection_id.fetch_add(1, Ordering::SeqCst);
        let _ = sender.send(ObserverEvent::JobResult(self.snapshot()));
        self.inner.observers.lock().unwrap().insert(
            connection_id,
            Observer {
                user_id,
                phone_number,
                sender,
            },
        );
        connection_id
    }

    pub fn unregister(&self, connection_id: u64) {
        self.inner.observers.lock().unwrap().remove(&connection_id);
    }

    /// The users currently worth polling: those with at least one live
    /// observer connection, in connection order, deduplicated
    pub fn eligible_user_ids(&self) -> Vec<ID> {
        let observers = self.inner.observers.lock().unwrap();
        let mut user_ids: Vec<ID> = Vec::new();
        for observer in observers.values() {
            if !user_ids.contains(&observer.user_id) {
                user_ids.push(observer.user_id.clone());
            }
        }
        user_ids
    }

    /// Replaces the cached snapshot and fans it out to every live observer.
    /// Sends are fire-and-forget; a slow or gone observer never blocks the
    /// caller.
    pub fn publish(&self, results: Vec<ReminderResult>) {
        *self.inner.snapshot.write().unwrap() = results.clone();
        let observers = self.inner.observers.lock().unwrap();
        for (connection_id, observer) in observers.iter() {
            if observer
                .sender
                .send(ObserverEvent::JobResult(results.clone()))
                .is_err()
            {
                debug!("Observer connection {} is gone", connection_id);
            }
        }
    }

    /// The latest published results; empty before the first completed cycle
    pub fn snapshot(&self) -> Vec<ReminderResult> {
        self.inner.snapshot.read().unwrap().clone()
    }

    /// Forwards a call status update to every observer registered for the
    /// destination phone number. Returns how many observers were notified.
    pub fn notify_call_status(&self, update: CallStatusUpdate) -> usize {
        let observers = self.inner.observers.lock().unwrap();
        let mut notified = 0;
        for observer in observers.values() {
            if observer.phone_number.as_deref() == Some(update.to.as_str()) {
                if observer
                    .sender
                    .send(ObserverEvent::CallStatus(update.clone()))
                    .is_ok()
                {
                    notified += 1;
                }
            }
        }
        notified
    }
}

impl Default for Broadcaster {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};

    fn result_factory(user_id: &ID) -> ReminderResult {
        ReminderResult::user_failed(user_id.clone(), "ada@example.com".into(), "boom".into(), 0)
    }

    fn connect(
        broadcaster: &Broadcaster,
        user_id: &ID,
        phone_number: Option<&str>,
    ) -> (u64, UnboundedReceiver<ObserverEvent>) {
        let (tx, rx) = unbounded_channel();
        let connection_id =
            broadcaster.register(user_id.clone(), phone_number.map(|p| p.into()), tx);
        (connection_id, rx)
    }

    #[test]
    fn snapshot_is_empty_before_first_cycle() {
        let broadcaster = Broadcaster::new();
        assert!(broadcaster.snapshot().is_empty());
    }

    #[test]
    fn register_delivers_current_snapshot_immediately() {
        let broadcaster = Broadcaster::new();
        let user_id = ID::new();
        broadcaster.publish(vec![result_factory(&user_id)]);

        let (_, mut rx) = connect(&broadcaster, &user_id, None);
        match rx.try_recv().expect("Snapshot on connect") {
            ObserverEvent::JobResult(results) => assert_eq!(results.len(), 1),
            other => panic!("Unexpected event: {:?}", other),
        }
    }

    #[test]
    fn publish_replaces_snapshot_and_fans_out() {
        let broadcaster = Broadcaster::new();
        let user_id = ID::new();
        let (_, mut rx) = connect(&broadcaster, &user_id, None);
        // Drain the on-connect snapshot
        rx.try_recv().expect("Snapshot on connect");

        broadcaster.publish(vec![result_factory(&user_id)]);
        broadcaster.publish(vec![]);

        match rx.try_recv().expect("First publish") {
            ObserverEvent::JobResult(results) => assert_eq!(results.len(), 1),
            other => panic!("Unexpected event: {:?}", other),
        }
        match rx.try_recv().expect("Second publish") {
            ObserverEvent::JobResult(results) => assert!(results.is_empty()),
            other => panic!("Unexpected event: {:?}", other),
        }
        assert!(broadcaster.snapshot().is_empty());
    }

    #[test]
    fn eligible_user_ids_follow_connections() {
        let broadcaster = Broadcaster::new();
        assert!(broadcaster.eligible_user_ids().is_empty());

        let first = ID::new();
        let second = ID::new();
        let (first_conn, _rx1) = connect(&broadcaster, &first, None);
        let (_, _rx2) = connect(&broadcaster, &second, None);
        // A second connection for an already connected user must not
        // produce a duplicate
        let (_, _rx3) = connect(&broadcaster, &first, None);

        assert_eq!(
            broadcaster.eligible_user_ids(),
            vec![first.clone(), second.clone()]
        );

        // Dropping the first connection moves the user behind the earlier
        // remaining connection
        broadcaster.unregister(first_conn);
        assert_eq!(broadcaster.eligible_user_ids(), vec![second, first]);
    }

    #[test]
    fn call_status_targets_registered_phone_number() {
        let broadcaster = Broadcaster::new();
        let user_id = ID::new();
        let (_, mut with_phone) = connect(&broadcaster, &user_id, Some("+15551234567"));
        let (_, mut other_phone) = connect(&broadcaster, &user_id, Some("+15559999999"));
        with_phone.try_recv().expect("Snapshot on connect");
        other_phone.try_recv().expect("Snapshot on connect");

        let notified = broadcaster.notify_call_status(CallStatusUpdate {
            call_sid: "CA1".into(),
            call_status: "completed".into(),
            from: "+15550001111".into(),
            to: "+15551234567".into(),
            timestamp: 0,
        });

        assert_eq!(notified, 1);
        assert!(matches!(
            with_phone.try_recv().expect("Status update"),
            ObserverEvent::CallStatus(_)
        ));
        assert!(other_phone.try_recv().is_err());
    }
}
