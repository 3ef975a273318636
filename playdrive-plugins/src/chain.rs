use crate::callback::{CallbackPlugin, EventType};
use log::error;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Ordered registry of callback plugins, keyed by the events they asked for.
///
/// Engines hold one chain per run and emit every lifecycle event through it.
/// Registration is the public extension point: anything implementing
/// [`CallbackPlugin`] can be attached before the run starts.
#[derive(Default)]
pub struct CallbackChain {
    callbacks: HashMap<EventType, Vec<Arc<dyn CallbackPlugin>>>,
}

impl CallbackChain {
    pub fn new() -> Self {
        Self {
            callbacks: HashMap::new(),
        }
    }

    pub fn register(&mut self, callback: Arc<dyn CallbackPlugin>) {
        for event in callback.get_interested_events() {
            self.callbacks
                .entry(event)
                .or_default()
                .push(callback.clone());
        }
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }

    /// Deliver one event to every plugin registered for it.
    ///
    /// Plugins run on spawned tasks; a panicking plugin is reported and
    /// skipped, it never aborts the run.
    pub async fn emit(&self, event: EventType, data: Option<Value>) {
        if let Some(callbacks) = self.callbacks.get(&event) {
            let tasks: Vec<_> = callbacks
                .iter()
                .map(|callback| {
                    let callback = callback.clone();
                    let event = event.clone();
                    let data = data.clone();
                    tokio::spawn(async move {
                        callback.on_event(&event, data.as_ref());
                    })
                })
                .collect();

            for task in tasks {
                if let Err(err) = task.await {
                    error!("callback task panicked: {err:?}");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicU64, Ordering};

    #[derive(Default)]
    struct Counter {
        failed: AtomicU64,
        ok: AtomicU64,
    }

    impl CallbackPlugin for Counter {
        fn get_interested_events(&self) -> Vec<EventType> {
            vec![EventType::RunnerOnFailed, EventType::RunnerOnOk]
        }

        fn on_event(&self, event: &EventType, _data: Option<&Value>) {
            match event {
                EventType::RunnerOnFailed => self.failed.fetch_add(1, Ordering::SeqCst),
                _ => self.ok.fetch_add(1, Ordering::SeqCst),
            };
        }
    }

    #[tokio::test]
    async fn emit_reaches_only_interested_plugins() {
        let counter = Arc::new(Counter::default());
        let mut chain = CallbackChain::new();
        chain.register(counter.clone());

        chain
            .emit(EventType::RunnerOnFailed, Some(json!({"host": "db1"})))
            .await;
        chain.emit(EventType::RunnerOnOk, None).await;
        // nobody registered for this one
        chain.emit(EventType::PlaybookOnPlayStart, None).await;

        assert_eq!(counter.failed.load(Ordering::SeqCst), 1);
        assert_eq!(counter.ok.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn emit_on_empty_chain_is_a_noop() {
        let chain = CallbackChain::new();
        assert!(chain.is_empty());
        chain.emit(EventType::PlaybookOnStats, None).await;
    }
}
