use serde_json::Value;

/// Run lifecycle events an engine emits while executing a playbook.
///
/// Payloads are JSON maps; each consumer documents the fields it reads.
#[derive(Hash, Eq, PartialEq, Debug, Clone)]
pub enum EventType {
    PlaybookOnStart,
    PlaybookOnPlayStart,
    PlaybookOnTaskStart,
    /// Final per-host statistics, emitted once when the run completes.
    PlaybookOnStats,
    RunnerOnOk,
    RunnerOnFailed,
    RunnerOnSkipped,
    RunnerOnUnreachable,
}

pub trait CallbackPlugin: Send + Sync {
    /// The list of events the plugin is interested in handling.
    fn get_interested_events(&self) -> Vec<EventType>;

    /// Called when an event triggers that the plugin has registered for.
    /// Plugins are passive observers; they must not panic the run.
    fn on_event(&self, event: &EventType, data: Option<&Value>);
}
