//! Pending LED events, highest app id first.
//!
//! At most one entry per app id, so the queue never holds more than
//! [`MAX_APPS`] events and lives in a fixed-capacity vector.

use heapless::Vec;
use log::{debug, warn};

use super::led_info::{LedInfo, MAX_APPS};

/// What happened to an event handed to [`LedInfoQueue::enqueue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Enqueued {
    Added,
    /// An entry with the same app id was overwritten in place.
    Replaced,
    /// A one-shot event ranked below the current head; it is dropped.
    Rejected,
}

#[derive(Debug, Default)]
pub struct LedInfoQueue {
    infos: Vec<LedInfo, MAX_APPS>,
}

impl LedInfoQueue {
    pub fn new() -> Self {
        Self { infos: Vec::new() }
    }

    pub fn enqueue(&mut self, info: LedInfo) -> Enqueued {
        let app_id = info.app_id();
        if !info.is_periodic() && self.head().is_some_and(|h| h.app_id() > app_id) {
            debug!("Reject one-shot event id : {app_id}, head has higher priority");
            return Enqueued::Rejected;
        }

        let outcome = if let Some(slot) = self.infos.iter_mut().find(|i| i.app_id() == app_id) {
            debug!("Replace event [appId : {app_id}]");
            *slot = info;
            Enqueued::Replaced
        } else {
            debug!("Enqueue event [appId : {app_id}]");
            if self.infos.push(info).is_err() {
                // unreachable while app ids are validated
                warn!("LED queue full, dropping event {app_id}");
                return Enqueued::Rejected;
            }
            Enqueued::Added
        };
        self.infos.sort_by(|a, b| b.app_id().cmp(&a.app_id()));
        outcome
    }

    /// Remove the entry for `app_id`; `true` when one was queued.
    pub fn dequeue(&mut self, app_id: u8) -> bool {
        match self.infos.iter().position(|i| i.app_id() == app_id) {
            Some(index) => {
                debug!("Dequeue event [appId : {app_id}]");
                self.infos.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn pop_head(&mut self) -> Option<LedInfo> {
        if self.infos.is_empty() {
            None
        } else {
            Some(self.infos.remove(0))
        }
    }

    pub fn head(&self) -> Option<&LedInfo> {
        self.infos.first()
    }

    pub fn len(&self) -> usize {
        self.infos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.infos.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LedInfo> {
        self.infos.iter()
    }

    /// App ids in queue order.
    pub fn app_ids(&self) -> std::vec::Vec<u8> {
        self.infos.iter().map(LedInfo::app_id).collect()
    }
}
