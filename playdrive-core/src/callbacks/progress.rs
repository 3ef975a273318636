use log::debug;
use playdrive_plugins::callback::{CallbackPlugin, EventType};
use serde_json::Value;
use std::sync::Mutex;

#[derive(Default)]
struct ProgressState {
    total_plays: u64,
    finished_plays: u64,
    progress: f64,
}

/// Tallies play boundaries into a fractional progress value.
///
/// Payloads read:
/// - `PlaybookOnStart`: `{"playbook": str, "plays": int}`
/// - `PlaybookOnPlayStart` / `PlaybookOnTaskStart`: `{"name": str}`
///
/// State sits behind a mutex; engines are free to deliver events from
/// worker threads.
#[derive(Default)]
pub struct TrackProgress {
    state: Mutex<ProgressState>,
}

impl TrackProgress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current progress in `[0, 1]`; 0.0 before any play has started.
    pub fn progress(&self) -> f64 {
        self.state.lock().unwrap().progress
    }
}

fn payload_str<'a>(data: Option<&'a Value>, key: &str) -> &'a str {
    data.and_then(|d| d[key].as_str()).unwrap_or("")
}

impl CallbackPlugin for TrackProgress {
    fn get_interested_events(&self) -> Vec<EventType> {
        vec![
            EventType::PlaybookOnStart,
            EventType::PlaybookOnPlayStart,
            EventType::PlaybookOnTaskStart,
            EventType::PlaybookOnStats,
        ]
    }

    fn on_event(&self, event: &EventType, data: Option<&Value>) {
        match event {
            EventType::PlaybookOnStart => {
                let mut state = self.state.lock().unwrap();
                state.total_plays = data.and_then(|d| d["plays"].as_u64()).unwrap_or(0);
                state.finished_plays = 0;
                state.progress = 0.0;
                debug!(
                    "start progress for playbook [{}], {} plays to run",
                    payload_str(data, "playbook"),
                    state.total_plays
                );
            }
            EventType::PlaybookOnPlayStart => {
                debug!("started PLAY [{}]", payload_str(data, "name"));
                let mut state = self.state.lock().unwrap();
                // a playbook with no plays has nothing left to run
                state.progress = if state.total_plays == 0 {
                    1.0
                } else {
                    state.finished_plays as f64 / state.total_plays as f64
                };
                state.finished_plays += 1;
                debug!("playbook progress {}%", (state.progress * 100.0) as u64);
            }
            EventType::PlaybookOnTaskStart => {
                debug!("started TASK [{}]", payload_str(data, "name"));
            }
            EventType::PlaybookOnStats => {
                self.state.lock().unwrap().progress = 1.0;
            }
            _ => {}
        }
    }
}
