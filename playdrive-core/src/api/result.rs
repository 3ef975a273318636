use crate::executor::stats::AggregateStats;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The normalized outcome of one playbook run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunResult {
    /// Combined error text, one line per failure cause; empty on a clean run.
    pub error_msg: String,
    pub unreachable_hosts: Vec<String>,
    pub failed_hosts: Vec<String>,
    /// Failed task names in encounter order, one entry per failure event.
    pub failed_tasks: Vec<String>,
}

impl RunResult {
    pub fn is_clean(&self) -> bool {
        self.error_msg.is_empty()
            && self.unreachable_hosts.is_empty()
            && self.failed_hosts.is_empty()
            && self.failed_tasks.is_empty()
    }
}

/// Reduce the engine's final statistics and the collected failure payloads
/// into a [`RunResult`].
pub(crate) fn process_stats(stats: &AggregateStats, failed_results: &[Value]) -> RunResult {
    let unreachable_hosts = sorted_host_names(&stats.dark);
    let failed_hosts = sorted_host_names(&stats.failures);

    let mut fragments = Vec::new();
    if !unreachable_hosts.is_empty() {
        fragments.push(format!(
            "Following nodes were unreachable: {}",
            format_node_list(&unreachable_hosts)
        ));
    }

    let mut failed_tasks = Vec::new();
    for result in failed_results {
        let (task, msg, host) = process_task_result(result);
        fragments.push(format!(
            "Task \"{task}\" failed on host \"{host}\" with message: {msg}"
        ));
        failed_tasks.push(task);
    }

    RunResult {
        error_msg: fragments.join("\n"),
        unreachable_hosts,
        failed_hosts,
        failed_tasks,
    }
}

/// Pull (task name, error message, host name) out of a raw failure payload.
///
/// A direct `msg` field on the result wins; otherwise the messages of any
/// nested sub-results are joined with single spaces.
fn process_task_result(failure: &Value) -> (String, String, String) {
    let task = failure["task"].as_str().unwrap_or("").to_string();
    let host = failure["host"].as_str().unwrap_or("").to_string();
    let result = &failure["result"];

    let msg = match result.get("msg") {
        Some(Value::String(msg)) => msg.clone(),
        Some(other) if !other.is_null() => other.to_string(),
        _ => result
            .get("results")
            .and_then(Value::as_array)
            .map(|subresults| {
                subresults
                    .iter()
                    .filter_map(|sub| sub["msg"].as_str())
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .unwrap_or_default(),
    };

    (task, msg, host)
}

fn sorted_host_names(counters: &IndexMap<String, u64>) -> Vec<String> {
    let mut names: Vec<String> = counters.keys().cloned().collect();
    names.sort();
    names.dedup();
    names
}

/// Renders host names the way callers have always seen them:
/// `['h1', 'h2']`.
fn format_node_list(hosts: &[String]) -> String {
    let quoted: Vec<String> = hosts.iter().map(|host| format!("'{host}'")).collect();
    format!("[{}]", quoted.join(", "))
}
