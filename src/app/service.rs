//! LED manager service: arbitrates the LED bar between clients.
//!
//! Clients post [`LedInfo`] events through a [`LedClient`]. The service keeps
//! one event *current* (showing on the LED bar) and the rest in a
//! [`LedInfoQueue`] ordered by app id. Every change re-runs the scheduler:
//!
//! ```text
//!  post / remove / client death
//!            │
//!            ▼
//!   queue.pop_head() ──▶ schedule ──▶ periodic: LedPort::set_led
//!                                └──▶ one-shot: Playback thread
//!                                          │ done
//!                                          └──▶ finish + schedule
//! ```
//!
//! All state sits behind one mutex. A client's *death handler* ties its app
//! id to its [`ClientId`]; dropping the [`LedClient`] withdraws its events.

use std::fmt::Write as _;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use log::{debug, error, warn};

use crate::drivers::light_state::OemLightState;
use crate::error::Result;

use super::events::{ClientId, ServiceEvent};
use super::led_info::{LedInfo, MAX_APPS};
use super::playback::{Playback, PlaybackState};
use super::ports::{EventSink, LedPort};
use super::queue::{Enqueued, LedInfoQueue};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct DeathHandler {
    app_id: u8,
    client: ClientId,
}

struct ServiceState {
    queue: LedInfoQueue,
    current: Option<LedInfo>,
    handlers: heapless::Vec<DeathHandler, MAX_APPS>,
    playback: Option<Arc<Playback>>,
    sink: Box<dyn EventSink>,
}

struct ServiceInner {
    port: Arc<dyn LedPort>,
    state: Mutex<ServiceState>,
    next_client: AtomicU64,
}

// ───────────────────────────────────────────────────────────────
// LedManagerService
// ───────────────────────────────────────────────────────────────

pub struct LedManagerService {
    inner: Arc<ServiceInner>,
}

impl LedManagerService {
    pub fn new(port: impl LedPort + 'static, sink: impl EventSink + 'static) -> Self {
        Self {
            inner: Arc::new(ServiceInner {
                port: Arc::new(port),
                state: Mutex::new(ServiceState {
                    queue: LedInfoQueue::new(),
                    current: None,
                    handlers: heapless::Vec::new(),
                    playback: None,
                    sink: Box::new(sink),
                }),
                next_client: AtomicU64::new(1),
            }),
        }
    }

    /// Connect a new client.
    pub fn client(&self) -> LedClient {
        let id = ClientId(self.inner.next_client.fetch_add(1, Ordering::Relaxed));
        LedClient {
            id,
            service: Arc::downgrade(&self.inner),
        }
    }

    /// App id of the event on the LED bar.
    pub fn current_app_id(&self) -> Option<u8> {
        self.inner.lock().current.as_ref().map(LedInfo::app_id)
    }

    /// Queued app ids, highest first.
    pub fn queued_app_ids(&self) -> Vec<u8> {
        self.inner.lock().queue.app_ids()
    }

    /// App ids with a registered death handler.
    pub fn watched_app_ids(&self) -> Vec<u8> {
        self.inner.lock().handlers.iter().map(|h| h.app_id).collect()
    }

    /// Human-readable state: current event, queue, death handlers.
    pub fn dump(&self) -> String {
        let state = self.inner.lock();
        let mut out = String::from("Current Led info:\n");
        match &state.current {
            Some(info) => {
                let _ = writeln!(out, "{info}");
            }
            None => out.push_str("null\n"),
        }
        out.push_str("\nLedInfoQueue:\n");
        for info in state.queue.iter() {
            let _ = writeln!(out, "  - {info}");
        }
        out.push_str("\nDeathHandler List:\n");
        for h in &state.handlers {
            let _ = writeln!(out, "  - AppId : {} ({})", h.app_id, h.client);
        }
        out
    }
}

impl Drop for LedManagerService {
    fn drop(&mut self) {
        let mut state = self.inner.lock();
        if let Some(playback) = state.playback.take() {
            playback.stop();
        }
    }
}

// ───────────────────────────────────────────────────────────────
// LedClient
// ───────────────────────────────────────────────────────────────

/// A connection to the service. Dropping it withdraws every event it posted.
pub struct LedClient {
    id: ClientId,
    service: Weak<ServiceInner>,
}

impl LedClient {
    pub fn id(&self) -> ClientId {
        self.id
    }

    /// Post (or replace) this client's event for `info.app_id()`.
    pub fn post_event(&self, info: LedInfo) -> Result<()> {
        info.validate()?;
        if let Some(inner) = self.service.upgrade() {
            inner.post_event(info, self.id);
        }
        Ok(())
    }

    /// Withdraw the event for `app_id`, switching it off if it is showing.
    pub fn remove_event(&self, app_id: u8) {
        if let Some(inner) = self.service.upgrade() {
            inner.remove_event(app_id);
        }
    }
}

impl Drop for LedClient {
    fn drop(&mut self) {
        if let Some(inner) = self.service.upgrade() {
            inner.client_died(self.id);
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Scheduling
// ───────────────────────────────────────────────────────────────

impl ServiceInner {
    fn lock(&self) -> MutexGuard<'_, ServiceState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn post_event(self: &Arc<Self>, info: LedInfo, client: ClientId) {
        let mut state = self.lock();
        let app_id = info.app_id();
        state.add_death_handler(app_id, client);

        if state.queue.enqueue(info) == Enqueued::Rejected {
            state.remove_death_handler(app_id);
            state.sink.emit(&ServiceEvent::Rejected { app_id });
        }
        self.schedule_locked(&mut state);
    }

    fn remove_event(self: &Arc<Self>, app_id: u8) {
        let mut state = self.lock();
        if state.current.as_ref().is_some_and(|c| c.app_id() == app_id) {
            debug!("removeEvent: remove current");
            self.turn_off_locked(&mut state);
        }
        if state.queue.dequeue(app_id) {
            state.remove_death_handler(app_id);
        }
        self.schedule_locked(&mut state);
    }

    fn client_died(self: &Arc<Self>, client: ClientId) {
        let mut state = self.lock();
        let app_ids: Vec<u8> = state
            .handlers
            .iter()
            .filter(|h| h.client == client)
            .map(|h| h.app_id)
            .collect();
        if app_ids.is_empty() {
            return;
        }

        for app_id in app_ids {
            warn!("client died. appId : {app_id}");
            state.remove_death_handler(app_id);
            state.queue.dequeue(app_id);
            if state.current.as_ref().is_some_and(|c| c.app_id() == app_id) {
                self.turn_off_locked(&mut state);
            }
            state.sink.emit(&ServiceEvent::ClientDied { client, app_id });
        }
        self.schedule_locked(&mut state);
    }

    /// Pop the queue head and decide whether it takes over the LED bar.
    fn schedule_locked(self: &Arc<Self>, state: &mut ServiceState) {
        let head = state.queue.pop_head();
        debug!(
            "processLedEvent: [Current : {:?}], [Head: {:?}]",
            state.current.as_ref().map(LedInfo::app_id),
            head.as_ref().map(LedInfo::app_id)
        );

        match (state.current.clone(), head) {
            (None, None) => self.finish_locked(state),
            (Some(current), Some(head)) => {
                if head.app_id() >= current.app_id() {
                    // the same app re-posting replaces its own event
                    if current.is_periodic() && current.app_id() != head.app_id() {
                        state.queue.enqueue(current);
                    }
                    self.play_locked(state, head);
                } else if head.is_periodic() {
                    state.queue.enqueue(head);
                } else {
                    state.remove_death_handler(head.app_id());
                }
            }
            (None, Some(head)) => self.play_locked(state, head),
            (Some(_), None) => {}
        }
    }

    fn play_locked(self: &Arc<Self>, state: &mut ServiceState, head: LedInfo) {
        self.stop_playback_locked(state);

        if let Some(led) = head.periodic_state() {
            debug!("performPeriodicEvent: appId : {}", head.app_id());
            state.sink.emit(&ServiceEvent::PeriodicStarted {
                app_id: head.app_id(),
            });
            state.current = Some(head);
            self.port.set_led(&led);
            return;
        }

        debug!("performOneShotEvent: appId : {}", head.app_id());
        let playback = Arc::new(Playback::new());
        let worker = {
            let service = Arc::downgrade(self);
            let port = Arc::clone(&self.port);
            let playback = Arc::clone(&playback);
            let info = head.clone();
            std::thread::Builder::new()
                .name("led-oneshot".into())
                .spawn(move || {
                    if playback.run(&info, port.as_ref()) == PlaybackState::Completed {
                        if let Some(inner) = service.upgrade() {
                            inner.one_shot_completed(&playback);
                        }
                    }
                })
        };

        state.sink.emit(&ServiceEvent::OneShotStarted {
            app_id: head.app_id(),
            repeat: head.repeat_count(),
        });
        state.current = Some(head);
        match worker {
            Ok(_) => state.playback = Some(playback),
            Err(e) => {
                error!("failed to start one-shot playback: {e}");
                self.finish_locked(state);
            }
        }
    }

    fn one_shot_completed(self: &Arc<Self>, playback: &Arc<Playback>) {
        let mut state = self.lock();
        let still_current = state
            .playback
            .as_ref()
            .is_some_and(|p| Arc::ptr_eq(p, playback));
        if !still_current {
            return;
        }
        state.playback = None;
        self.finish_locked(&mut state);
        self.schedule_locked(&mut state);
    }

    fn turn_off_locked(&self, state: &mut ServiceState) {
        match state.current.as_ref().map(LedInfo::is_periodic) {
            Some(true) => self.finish_locked(state),
            Some(false) => self.stop_playback_locked(state),
            None => {}
        }
    }

    /// Interrupt a running one-shot; its event is finished.
    ///
    /// A worker that already completed but is still waiting for the service
    /// lock will find its playback gone and skip the finish, so it happens here.
    fn stop_playback_locked(&self, state: &mut ServiceState) {
        if let Some(playback) = state.playback.take() {
            if playback.stop() || playback.state() == PlaybackState::Completed {
                self.finish_locked(state);
            }
        }
    }

    /// Switch the LED bar off and clear the current event.
    fn finish_locked(&self, state: &mut ServiceState) {
        debug!("setFinishEvent");
        let app_id = state.current.take().map(|c| c.app_id());
        if let Some(app_id) = app_id {
            state.remove_death_handler(app_id);
        }
        self.port.set_led(&OemLightState::OFF);
        state.sink.emit(&ServiceEvent::Finished { app_id });
    }
}

impl ServiceState {
    fn add_death_handler(&mut self, app_id: u8, client: ClientId) {
        if self.handlers.iter().any(|h| h.app_id == app_id) {
            return;
        }
        debug!("add death handler id : {app_id}");
        if self.handlers.push(DeathHandler { app_id, client }).is_err() {
            warn!("death handler list full, app {app_id} unwatched");
        }
    }

    fn remove_death_handler(&mut self, app_id: u8) {
        if let Some(index) = self.handlers.iter().position(|h| h.app_id == app_id) {
            debug!("remove death handler id : {app_id}");
            self.handlers.remove(index);
        }
    }
}
