use super::{
    CalendarError, CallHandle, CredentialError, ICalendarGateway, IVoiceGateway, ProviderEvent,
    ProviderEventSpec, VoiceError,
};
use callward_domain::ID;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

/// Calendar gateway double used by tests: upcoming events are seeded per
/// user, credential failures are injectable and every provider interaction
/// is counted.
pub struct InMemoryCalendarGateway {
    upcoming: Mutex<HashMap<ID, Vec<ProviderEvent>>>,
    broken_credentials: Mutex<HashSet<ID>>,
    list_calls: AtomicUsize,
    inserted: Mutex<Vec<(ID, ProviderEventSpec)>>,
}

impl InMemoryCalendarGateway {
    pub fn new() -> Self {
        Self {
            upcoming: Mutex::new(HashMap::new()),
            broken_credentials: Mutex::new(HashSet::new()),
            list_calls: AtomicUsize::new(0),
            inserted: Mutex::new(vec![]),
        }
    }

    pub fn set_upcoming(&self, user_id: ID, events: Vec<ProviderEvent>) {
        self.upcoming.lock().unwrap().insert(user_id, events);
    }

    /// Makes every credential lookup for the user fail from now on
    pub fn break_credentials(&self, user_id: ID) {
        self.broken_credentials.lock().unwrap().insert(user_id);
    }

    pub fn list_call_count(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn inserted(&self) -> Vec<(ID, ProviderEventSpec)> {
        self.inserted.lock().unwrap().clone()
    }

    fn check_credentials(&self, user_id: &ID) -> Result<(), CalendarError> {
        if self.broken_credentials.lock().unwrap().contains(user_id) {
            return Err(CalendarError::Credential(CredentialError::RefreshFailed(
                "injected credential failure".into(),
            )));
        }
        Ok(())
    }
}

impl Default for InMemoryCalendarGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ICalendarGateway for InMemoryCalendarGateway {
    async fn list_upcoming(&self, user_id: &ID) -> Result<Vec<ProviderEvent>, CalendarError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.check_credentials(user_id)?;
        Ok(self
            .upcoming
            .lock()
            .unwrap()
            .get(user_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn insert(
        &self,
        user_id: &ID,
        spec: &ProviderEventSpec,
    ) -> Result<ProviderEvent, CalendarError> {
        self.check_credentials(user_id)?;
        let mut inserted = self.inserted.lock().unwrap();
        inserted.push((user_id.clone(), spec.clone()));
        Ok(ProviderEvent {
            id: format!("gcal-{}", inserted.len()),
            summary: spec.summary.clone(),
            start_ts: spec.start_ts,
            end_ts: spec.end_ts,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlacedCall {
    pub to: String,
    pub message: String,
}

/// Voice gateway double recording every dispatched call
pub struct InMemoryVoiceGateway {
    calls: Mutex<Vec<PlacedCall>>,
    fail_dispatch: AtomicBool,
}

impl InMemoryVoiceGateway {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(vec![]),
            fail_dispatch: AtomicBool::new(false),
        }
    }

    pub fn fail_dispatch(&self, fail: bool) {
        self.fail_dispatch.store(fail, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<PlacedCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl Default for InMemoryVoiceGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl IVoiceGateway for InMemoryVoiceGateway {
    async fn place_call(&self, to: &str, message: &str) -> Result<CallHandle, VoiceError> {
        if self.fail_dispatch.load(Ordering::SeqCst) {
            return Err(VoiceError::DispatchFailed(
                "injected dispatch failure".into(),
            ));
        }
        let mut calls = self.calls.lock().unwrap();
        calls.push(PlacedCall {
            to: to.to_string(),
            message: message.to_string(),
        });
        Ok(CallHandle {
            sid: format!("CA{}", calls.len()),
            status: "queued".into(),
        })
    }
}
