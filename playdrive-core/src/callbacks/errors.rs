use playdrive_plugins::callback::{CallbackPlugin, EventType};
use serde_json::Value;
use std::sync::Mutex;

/// Collects raw failure payloads in arrival order.
///
/// Payload read on `RunnerOnFailed`:
/// `{"task": str, "host": str, "ignore_errors": bool, "result": {...}}`.
/// Failures the playbook author marked `ignore_errors` are not real
/// failures and are discarded. Retried failures each land as their own
/// entry.
#[derive(Default)]
pub struct ErrorsCollector {
    failed_results: Mutex<Vec<Value>>,
}

impl ErrorsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// The failures collected so far, oldest first.
    pub fn failed_results(&self) -> Vec<Value> {
        self.failed_results.lock().unwrap().clone()
    }
}

impl CallbackPlugin for ErrorsCollector {
    fn get_interested_events(&self) -> Vec<EventType> {
        vec![EventType::RunnerOnFailed]
    }

    fn on_event(&self, _event: &EventType, data: Option<&Value>) {
        let Some(data) = data else {
            return;
        };
        if data["ignore_errors"].as_bool().unwrap_or(false) {
            return;
        }
        self.failed_results.lock().unwrap().push(data.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn failures_are_kept_in_arrival_order() {
        let collector = ErrorsCollector::new();
        collector.on_event(
            &EventType::RunnerOnFailed,
            Some(&json!({"task": "t1", "host": "h1", "result": {"msg": "boom"}})),
        );
        collector.on_event(
            &EventType::RunnerOnFailed,
            Some(&json!({"task": "t2", "host": "h2", "result": {"msg": "bang"}})),
        );

        let failed = collector.failed_results();
        assert_eq!(failed.len(), 2);
        assert_eq!(failed[0]["task"], "t1");
        assert_eq!(failed[1]["task"], "t2");
    }

    #[test]
    fn ignored_failures_are_discarded() {
        let collector = ErrorsCollector::new();
        collector.on_event(
            &EventType::RunnerOnFailed,
            Some(&json!({"task": "t1", "host": "h1", "ignore_errors": true})),
        );
        assert!(collector.failed_results().is_empty());
    }

    #[test]
    fn retries_each_produce_an_entry() {
        let collector = ErrorsCollector::new();
        let payload = json!({"task": "t1", "host": "h1", "result": {"msg": "boom"}});
        collector.on_event(&EventType::RunnerOnFailed, Some(&payload));
        collector.on_event(&EventType::RunnerOnFailed, Some(&payload));
        assert_eq!(collector.failed_results().len(), 2);
    }
}
