use indexmap::IndexMap;
use serde::Serialize;

/// Owned copy of a registry's event table.
///
/// Maps each known event name to the observers subscribed to it, in dispatch
/// order. Taken under the registry lock and detached from it afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Snapshot<O> {
    events: IndexMap<String, Vec<O>>,
}

impl<O> Snapshot<O> {
    pub(crate) fn new(events: IndexMap<String, Vec<O>>) -> Self {
        Self { events }
    }

    pub fn get(&self, event: &str) -> Option<&[O]> {
        self.events.get(event).map(Vec::as_slice)
    }

    pub fn event_names(&self) -> impl Iterator<Item = &str> {
        self.events.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[O])> {
        self.events.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn subscription_count(&self) -> usize {
        self.events.values().map(Vec::len).sum()
    }
}
