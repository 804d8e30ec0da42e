//! Record stores.
//!
//! Opaque side-effect services invoked from flow `on_success` handlers,
//! never from inside the channel or the engine. The in-memory
//! implementations stand in for the real persistence backend.

use std::collections::HashMap;

use parking_lot::RwLock;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    /// Canonical `+91...` form.
    pub phone: String,
    pub name: String,
    pub age: u32,
}

pub trait ProfileStore: Send + Sync {
    fn find_by_phone(&self, phone: &str) -> Option<UserProfile>;
    fn upsert(&self, profile: UserProfile);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoseSchedule {
    pub medicine: String,
    /// 24h dose hours, sorted.
    pub hours: Vec<u8>,
}

pub trait ReminderStore: Send + Sync {
    fn schedule_for(&self, phone: &str) -> Option<DoseSchedule>;
    fn save_schedule(&self, phone: &str, schedule: DoseSchedule);
}

/// In-memory store backing both traits.
#[derive(Default)]
pub struct MemoryStore {
    profiles: RwLock<HashMap<String, UserProfile>>,
    schedules: RwLock<HashMap<String, DoseSchedule>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProfileStore for MemoryStore {
    fn find_by_phone(&self, phone: &str) -> Option<UserProfile> {
        self.profiles.read().get(phone).cloned()
    }

    fn upsert(&self, profile: UserProfile) {
        self.profiles.write().insert(profile.phone.clone(), profile);
    }
}

impl ReminderStore for MemoryStore {
    fn schedule_for(&self, phone: &str) -> Option<DoseSchedule> {
        self.schedules.read().get(phone).cloned()
    }

    fn save_schedule(&self, phone: &str, schedule: DoseSchedule) {
        self.schedules.write().insert(phone.to_string(), schedule);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upsert_then_find_round_trips() {
        let store = MemoryStore::new();
        let profile = UserProfile {
            phone: "+919876543210".into(),
            name: "आशा देवी".into(),
            age: 67,
        };
        store.upsert(profile.clone());
        assert_eq!(store.find_by_phone("+919876543210"), Some(profile));
        assert_eq!(store.find_by_phone("+910000000000"), None);
    }
}
