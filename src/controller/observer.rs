use super::state::StateChange;

/// Receives every change the controller makes to its state.
pub trait StateObserver {
    fn on_change(&mut self, change: &StateChange);
}

impl<F: FnMut(&StateChange)> StateObserver for F {
    fn on_change(&mut self, change: &StateChange) {
        self(change)
    }
}

/// Returned by `subscribe`; pass it to `unsubscribe` to stop notifications.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

#[derive(Default)]
pub(super) struct Observers {
    next_id: u64,
    entries: Vec<(SubscriptionId, Box<dyn StateObserver>)>,
}

impl Observers {
    pub(super) fn add(&mut self, observer: Box<dyn StateObserver>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, observer));
        id
    }

    pub(super) fn remove(&mut self, id: SubscriptionId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(i, _)| *i != id);
        self.entries.len() != before
    }

    pub(super) fn notify(&mut self, change: &StateChange) {
        for (_, observer) in &mut self.entries {
            observer.on_change(change);
        }
    }
}
