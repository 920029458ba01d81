//! Test doubles and common utilities for engine contract tests
//!
//! The doubles count every call and expose switches to make the backend
//! fail or refuse, so tests can assert both outcomes and side effects.

#![allow(dead_code)]

use async_trait::async_trait;
use cfgsync_core::backend::SettingsTable;
use cfgsync_core::traits::{BatchAck, RegeneratedId, SettingsMap};
use cfgsync_core::{Backend, EngineConfig, Error, Result, SettingsStore, SyncEngine, SyncEvent};
use cfgsync_core::{ThemeHost, ThemeMode};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

/// A scripted Backend that tracks calls
///
/// Storage is a [`SettingsTable`] without seeded defaults, so `get_all_settings`
/// returns exactly what the test put in. The week answer is scripted.
#[derive(Default)]
pub struct MockBackend {
    table: Mutex<SettingsTable>,
    week: Mutex<Option<u32>>,

    /// Every call fails with a transport error
    failing: AtomicBool,
    /// Batches and resets are answered with `success: false`
    refusing: AtomicBool,
    /// Only `get_calculated_week_number` fails
    week_failing: AtomicBool,

    get_all_calls: AtomicUsize,
    set_config_calls: AtomicUsize,
    update_calls: AtomicUsize,
    regenerate_calls: AtomicUsize,
    reset_calls: AtomicUsize,
    week_calls: AtomicUsize,

    last_update: Mutex<Option<SettingsMap>>,
    last_reset_exclude: Mutex<Option<Vec<String>>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a raw wire value
    pub fn with_setting(self, key: &str, value: &str) -> Self {
        self.table.lock().unwrap().set(key, value);
        self
    }

    /// Script the week number answer
    pub fn with_week(self, week: u32) -> Self {
        self.set_week(Some(week));
        self
    }

    pub fn set_week(&self, week: Option<u32>) {
        *self.week.lock().unwrap() = week;
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn set_refusing(&self, refusing: bool) {
        self.refusing.store(refusing, Ordering::SeqCst);
    }

    pub fn set_week_failing(&self, failing: bool) {
        self.week_failing.store(failing, Ordering::SeqCst);
    }

    /// Raw stored value
    pub fn stored(&self, key: &str) -> Option<String> {
        self.table.lock().unwrap().get(key).map(str::to_string)
    }

    pub fn get_all_calls(&self) -> usize {
        self.get_all_calls.load(Ordering::SeqCst)
    }

    pub fn set_config_calls(&self) -> usize {
        self.set_config_calls.load(Ordering::SeqCst)
    }

    pub fn update_calls(&self) -> usize {
        self.update_calls.load(Ordering::SeqCst)
    }

    pub fn regenerate_calls(&self) -> usize {
        self.regenerate_calls.load(Ordering::SeqCst)
    }

    pub fn reset_calls(&self) -> usize {
        self.reset_calls.load(Ordering::SeqCst)
    }

    pub fn week_calls(&self) -> usize {
        self.week_calls.load(Ordering::SeqCst)
    }

    /// Total number of backend calls of any kind
    pub fn total_calls(&self) -> usize {
        self.get_all_calls()
            + self.set_config_calls()
            + self.update_calls()
            + self.regenerate_calls()
            + self.reset_calls()
            + self.week_calls()
    }

    pub fn last_update(&self) -> Option<SettingsMap> {
        self.last_update.lock().unwrap().clone()
    }

    pub fn last_reset_exclude(&self) -> Option<Vec<String>> {
        self.last_reset_exclude.lock().unwrap().clone()
    }

    fn check_failing(&self) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(Error::transport("mock", "connection refused"));
        }
        Ok(())
    }

    fn refusing(&self) -> bool {
        self.refusing.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Backend for MockBackend {
    async fn get_all_settings(&self) -> Result<SettingsMap> {
        self.get_all_calls.fetch_add(1, Ordering::SeqCst);
        self.check_failing()?;
        Ok(self.table.lock().unwrap().values().clone())
    }

    async fn set_config(&self, key: &str, value: &str) -> Result<()> {
        self.set_config_calls.fetch_add(1, Ordering::SeqCst);
        self.check_failing()?;
        self.table.lock().unwrap().set(key, value);
        Ok(())
    }

    async fn update_settings(&self, settings: &SettingsMap) -> Result<BatchAck> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_update.lock().unwrap() = Some(settings.clone());
        self.check_failing()?;
        if self.refusing() {
            return Ok(BatchAck::refused());
        }
        Ok(self.table.lock().unwrap().update(settings))
    }

    async fn regenerate_uuid(&self) -> Result<RegeneratedId> {
        self.regenerate_calls.fetch_add(1, Ordering::SeqCst);
        self.check_failing()?;
        if self.refusing() {
            return Ok(RegeneratedId {
                success: false,
                uuid: String::new(),
            });
        }
        let uuid = self.table.lock().unwrap().regenerate_uuid();
        Ok(RegeneratedId {
            success: true,
            uuid,
        })
    }

    async fn reset_settings(&self, exclude: &[String]) -> Result<BatchAck> {
        self.reset_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_reset_exclude.lock().unwrap() = Some(exclude.to_vec());
        self.check_failing()?;
        if self.refusing() {
            return Ok(BatchAck::refused());
        }
        self.table.lock().unwrap().reset(exclude);
        Ok(BatchAck::accepted())
    }

    async fn get_calculated_week_number(&self) -> Result<Option<u32>> {
        self.week_calls.fetch_add(1, Ordering::SeqCst);
        self.check_failing()?;
        if self.week_failing.load(Ordering::SeqCst) {
            return Err(Error::transport("mock", "week service unavailable"));
        }
        Ok(*self.week.lock().unwrap())
    }

    fn backend_name(&self) -> &'static str {
        "mock"
    }
}

/// One call received by [`RecordingThemeHost`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThemeCall {
    Mode(ThemeMode),
    Color(String),
}

/// A ThemeHost that records every call in order
#[derive(Default)]
pub struct RecordingThemeHost {
    calls: Mutex<Vec<ThemeCall>>,
    failing: AtomicBool,
}

impl RecordingThemeHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call fail after being recorded
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<ThemeCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn mode_calls(&self) -> Vec<ThemeMode> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                ThemeCall::Mode(mode) => Some(mode),
                ThemeCall::Color(_) => None,
            })
            .collect()
    }

    pub fn color_calls(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                ThemeCall::Color(color) => Some(color),
                ThemeCall::Mode(_) => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn record(&self, call: ThemeCall) -> Result<()> {
        self.calls.lock().unwrap().push(call);
        if self.failing.load(Ordering::SeqCst) {
            return Err(Error::theme("renderer not ready"));
        }
        Ok(())
    }
}

impl ThemeHost for RecordingThemeHost {
    fn set_theme(&self, mode: ThemeMode) -> Result<()> {
        self.record(ThemeCall::Mode(mode))
    }

    fn set_color_scheme(&self, color: &str) -> Result<()> {
        self.record(ThemeCall::Color(color.to_string()))
    }

    fn host_name(&self) -> &'static str {
        "recording"
    }
}

/// Everything a contract test needs, wired together
pub struct Harness {
    pub backend: Arc<MockBackend>,
    pub host: Arc<RecordingThemeHost>,
    pub engine: SyncEngine,
    pub events: mpsc::Receiver<SyncEvent>,
}

impl Harness {
    pub fn new(backend: MockBackend) -> Self {
        let backend = Arc::new(backend);
        let host = Arc::new(RecordingThemeHost::new());
        let (engine, events) = SyncEngine::new(
            backend.clone(),
            Arc::new(SettingsStore::new()),
            host.clone(),
            &EngineConfig::default(),
        )
        .expect("engine construction succeeds");

        Self {
            backend,
            host,
            engine,
            events,
        }
    }

    /// Build, load, and forget the calls and events produced by the load
    pub async fn loaded(backend: MockBackend) -> Self {
        let mut harness = Self::new(backend);
        harness.engine.load().await.expect("initial load succeeds");
        harness.host.clear();
        harness.drain_events();
        harness
    }

    /// Collect every pending engine event
    pub fn drain_events(&mut self) -> Vec<SyncEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            events.push(event);
        }
        events
    }
}
