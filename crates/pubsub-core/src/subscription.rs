use std::fmt;
use std::sync::Arc;

/// Type-erased callback stored by the registry.
pub type Callback<T> = Arc<dyn Fn(&T) -> Result<(), String> + Send + Sync>;

/// Return types a subscriber callback may produce.
///
/// Plain `()` callbacks always succeed. `Result` callbacks report their
/// error through the registry's diagnostic sink without aborting dispatch.
pub trait CallbackOutcome {
    fn into_outcome(self) -> Result<(), String>;
}

impl CallbackOutcome for () {
    fn into_outcome(self) -> Result<(), String> {
        Ok(())
    }
}

impl<E: fmt::Display> CallbackOutcome for Result<(), E> {
    fn into_outcome(self) -> Result<(), String> {
        self.map_err(|e| e.to_string())
    }
}

pub(crate) fn erase<T, F, R>(callback: F) -> Callback<T>
where
    T: 'static,
    F: Fn(&T) -> R + Send + Sync + 'static,
    R: CallbackOutcome,
{
    Arc::new(move |data: &T| callback(data).into_outcome())
}

/// An (observer, callback) pair registered against one event.
pub struct Subscription<T, O> {
    observer: O,
    callback: Callback<T>,
}

impl<T, O> Subscription<T, O> {
    pub(crate) fn new(observer: O, callback: Callback<T>) -> Self {
        Self { observer, callback }
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub(crate) fn invoke(&self, data: &T) -> Result<(), String> {
        (self.callback)(data)
    }
}

impl<T, O: Clone> Clone for Subscription<T, O> {
    fn clone(&self) -> Self {
        Self {
            observer: self.observer.clone(),
            callback: Arc::clone(&self.callback),
        }
    }
}

impl<T, O: fmt::Debug> fmt::Debug for Subscription<T, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("observer", &self.observer)
            .finish_non_exhaustive()
    }
}
