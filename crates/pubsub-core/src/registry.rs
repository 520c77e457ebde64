use crate::diagnostic::{Diagnostic, DiagnosticSink, Operation, TracingSink};
use crate::error::{RegistryError, Result};
use crate::snapshot::Snapshot;
use crate::subscription::{erase, CallbackOutcome, Subscription};
use indexmap::IndexMap;
use parking_lot::RwLock;
use std::any::Any;
use std::borrow::Borrow;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

/// Event name that every registry knows from construction.
pub const DEFAULT_EVENT: &str = "default";

type EventTable<T, O> = IndexMap<String, Vec<Subscription<T, O>>>;

/// Named events, each holding an ordered list of subscriptions.
///
/// `T` is the payload handed to callbacks on publish, `O` the observer
/// identity used to target a subscription for removal.
///
/// Publishing clones the event's subscription list before invoking anything,
/// so callbacks may subscribe or unsubscribe on the same registry. Such
/// changes take effect from the next publish onwards.
pub struct Registry<T, O = String> {
    events: RwLock<EventTable<T, O>>,
    sink: Arc<dyn DiagnosticSink>,
}

impl<T, O> Registry<T, O>
where
    T: 'static,
    O: PartialEq + Clone + fmt::Debug,
{
    pub fn new() -> Self {
        Self::with_sink(Arc::new(TracingSink))
    }

    pub fn with_sink(sink: Arc<dyn DiagnosticSink>) -> Self {
        let mut events = IndexMap::new();
        events.insert(DEFAULT_EVENT.to_string(), Vec::new());
        Self {
            events: RwLock::new(events),
            sink,
        }
    }

    /// Pre-seeds additional known event names. Empty names are skipped.
    pub fn with_events<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let events = self.events.get_mut();
        for name in names {
            let name = name.into();
            if !name.is_empty() {
                events.entry(name).or_default();
            }
        }
        self
    }

    /// Appends a subscription, reporting a diagnostic if `event` is empty.
    pub fn subscribe<F, R>(&self, event: &str, observer: O, callback: F)
    where
        F: Fn(&T) -> R + Send + Sync + 'static,
        R: CallbackOutcome,
    {
        if let Err(err) = self.try_subscribe(event, observer, callback) {
            self.sink.report(&err.into());
        }
    }

    pub fn try_subscribe<F, R>(&self, event: &str, observer: O, callback: F) -> Result<()>
    where
        F: Fn(&T) -> R + Send + Sync + 'static,
        R: CallbackOutcome,
    {
        if event.is_empty() {
            return Err(RegistryError::EmptyEventName {
                operation: Operation::Subscribe,
                known_events: self.event_names(),
            });
        }

        tracing::debug!(event, observer = ?observer, "subscribe");
        let subscription = Subscription::new(observer, erase(callback));
        self.events
            .write()
            .entry(event.to_string())
            .or_default()
            .push(subscription);
        Ok(())
    }

    /// Removes the earliest subscription of `observer` to `event`.
    ///
    /// Empty or unknown event names are reported as diagnostics. A known
    /// event without a matching observer is left untouched silently.
    pub fn unsubscribe<Q>(&self, event: &str, observer: &Q)
    where
        O: Borrow<Q>,
        Q: PartialEq + ?Sized,
    {
        if let Err(err) = self.try_unsubscribe(event, observer) {
            self.sink.report(&err.into());
        }
    }

    /// Returns whether a subscription was removed.
    pub fn try_unsubscribe<Q>(&self, event: &str, observer: &Q) -> Result<bool>
    where
        O: Borrow<Q>,
        Q: PartialEq + ?Sized,
    {
        if event.is_empty() {
            return Err(RegistryError::EmptyEventName {
                operation: Operation::Unsubscribe,
                known_events: self.event_names(),
            });
        }

        let mut events = self.events.write();
        let Some(slot) = events.get_index_of(event) else {
            return Err(RegistryError::UnknownEvent {
                event: event.to_string(),
                known_events: events.keys().cloned().collect(),
            });
        };
        let subscriptions = &mut events[slot];

        let position = subscriptions.iter().position(|s| {
            let candidate: &Q = s.observer().borrow();
            candidate == observer
        });

        match position {
            Some(index) => {
                let removed = subscriptions.remove(index);
                tracing::debug!(event, observer = ?removed.observer(), "unsubscribe");
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Invokes every callback subscribed to `event`, in subscription order.
    ///
    /// Unknown events are a no-op. A callback that returns an error or panics
    /// is reported to the diagnostic sink and the remaining callbacks still run.
    ///
    /// Panics are caught after the process panic hook has run, so the hook's
    /// own output (by default a `thread '..' panicked at ..` line on stderr)
    /// is not routed through the sink. Hosts that want it silenced install
    /// their own hook with [`std::panic::set_hook`].
    pub fn publish(&self, event: &str, data: &T) {
        let subscriptions = {
            let events = self.events.read();
            match events.get(event) {
                Some(subscriptions) if !subscriptions.is_empty() => subscriptions.clone(),
                _ => return,
            }
        };

        tracing::trace!(event, subscribers = subscriptions.len(), "publish");

        for (position, subscription) in subscriptions.iter().enumerate() {
            let message = match panic::catch_unwind(AssertUnwindSafe(|| subscription.invoke(data)))
            {
                Ok(Ok(())) => continue,
                Ok(Err(message)) => message,
                Err(payload) => format!("panicked: {}", panic_message(payload.as_ref())),
            };

            self.sink.report(&Diagnostic::CallbackFailure {
                event: event.to_string(),
                observer: format!("{:?}", subscription.observer()),
                position,
                message,
            });
        }
    }

    pub fn is_subscribed(&self, event: &str) -> bool {
        self.events
            .read()
            .get(event)
            .is_some_and(|subscriptions| !subscriptions.is_empty())
    }

    pub fn subscriber_count(&self, event: &str) -> usize {
        self.events.read().get(event).map_or(0, Vec::len)
    }

    pub fn is_known(&self, event: &str) -> bool {
        self.events.read().contains_key(event)
    }

    /// Known event names in first-subscription order.
    pub fn event_names(&self) -> Vec<String> {
        self.events.read().keys().cloned().collect()
    }

    /// Drops every subscription while keeping all known event names.
    pub fn reset(&self) {
        for subscriptions in self.events.write().values_mut() {
            subscriptions.clear();
        }
        tracing::debug!("registry reset");
    }

    pub fn snapshot(&self) -> Snapshot<O> {
        let events = self.events.read();
        Snapshot::new(
            events
                .iter()
                .map(|(name, subscriptions)| {
                    let observers = subscriptions.iter().map(|s| s.observer().clone()).collect();
                    (name.clone(), observers)
                })
                .collect(),
        )
    }

    pub fn add_event_listener<F, R>(&self, event: &str, observer: O, callback: F)
    where
        F: Fn(&T) -> R + Send + Sync + 'static,
        R: CallbackOutcome,
    {
        self.subscribe(event, observer, callback);
    }

    pub fn remove_event_listener<Q>(&self, event: &str, observer: &Q)
    where
        O: Borrow<Q>,
        Q: PartialEq + ?Sized,
    {
        self.unsubscribe(event, observer);
    }

    pub fn clear_event_listeners(&self) {
        self.reset();
    }
}

impl<T, O> Default for Registry<T, O>
where
    T: 'static,
    O: PartialEq + Clone + fmt::Debug,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T, O> fmt::Debug for Registry<T, O>
where
    T: 'static,
    O: PartialEq + Clone + fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("events", &self.snapshot())
            .finish_non_exhaustive()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "non-string panic payload"
    }
}
