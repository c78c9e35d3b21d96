//! Navigation Bridge.
//!
//! The single command slot shared by the titlebar and every content view.
//! Each issued command gets a fresh id; controllers detect new commands by id
//! identity, never by comparing actions. A short in-order log lets a
//! controller that fell behind replay every command issued after the last id
//! it processed.

use std::collections::VecDeque;

use uuid::Uuid;

use crate::types::navigation::{NavigationAction, NavigationSignal};

/// Maximum number of recent signals retained for replay.
pub const SIGNAL_LOG_CAPACITY: usize = 32;

pub struct NavigationBridge {
    latest: NavigationSignal,
    log: VecDeque<NavigationSignal>,
}

impl NavigationBridge {
    pub fn new() -> Self {
        Self {
            latest: NavigationSignal::default(),
            log: VecDeque::with_capacity(SIGNAL_LOG_CAPACITY),
        }
    }

    /// Issues a new signal with a fresh id, even if `action` repeats the last one.
    pub fn issue(&mut self, action: Option<NavigationAction>) -> NavigationSignal {
        let signal = NavigationSignal {
            action,
            id: Uuid::new_v4().to_string(),
        };
        if self.log.len() == SIGNAL_LOG_CAPACITY {
            self.log.pop_front();
        }
        self.log.push_back(signal.clone());
        self.latest = signal.clone();
        signal
    }

    pub fn latest(&self) -> &NavigationSignal {
        &self.latest
    }

    /// Returns, in issue order, every signal issued after `last_seen_id`.
    ///
    /// An id that is no longer in the log (never issued, or evicted) means
    /// everything still retained is unseen.
    pub fn signals_after(&self, last_seen_id: &str) -> Vec<NavigationSignal> {
        if last_seen_id == self.latest.id {
            return Vec::new();
        }
        match self.log.iter().position(|s| s.id == last_seen_id) {
            Some(pos) => self.log.iter().skip(pos + 1).cloned().collect(),
            None => self.log.iter().cloned().collect(),
        }
    }
}

impl Default for NavigationBridge {
    fn default() -> Self {
        Self::new()
    }
}
