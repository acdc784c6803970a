//! Last-scene bookkeeping for scene switch suppression

use std::collections::HashMap;

use parking_lot::Mutex;

/// Remembers the last scene published for each court.
#[derive(Debug, Default)]
pub struct SceneTracker {
    last: Mutex<HashMap<String, String>>,
}

impl SceneTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `scene` for `court_id`. Returns `false` when it repeats the last
    /// recorded scene, in which case the switch must not be published.
    pub fn switch(&self, court_id: &str, scene: &str) -> bool {
        let mut last = self.last.lock();
        match last.get_mut(court_id) {
            Some(current) if current == scene => false,
            Some(current) => {
                *current = scene.to_string();
                true
            }
            None => {
                last.insert(court_id.to_string(), scene.to_string());
                true
            }
        }
    }

    pub fn current(&self, court_id: &str) -> Option<String> {
        self.last.lock().get(court_id).cloned()
    }
}
