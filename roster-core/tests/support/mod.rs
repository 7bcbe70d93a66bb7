//! Shared harness for console integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use anyhow::Result;
use roster_core::testing::StubGateway;
use roster_core::{
    BufferedNotifier, Console, ManualClock, MemoryStore, NotificationLevel,
    RosterConfig,
};
use roster_model::{Credentials, UserPayload};

pub const TEST_EMAIL: &str = "eve.holt@reqres.in";
pub const TEST_PASSWORD: &str = "cityslicka";

/// A console wired to in-memory collaborators the test can inspect.
pub struct ConsoleHarness {
    pub console: Console,
    pub gateway: StubGateway,
    pub storage: Arc<MemoryStore>,
    pub clock: ManualClock,
    pub notifier: Arc<BufferedNotifier>,
}

impl ConsoleHarness {
    pub fn new() -> Self {
        Self::with_gateway(StubGateway::new())
    }

    pub fn with_gateway(gateway: StubGateway) -> Self {
        Self::assemble(
            gateway,
            Arc::new(MemoryStore::new()),
            ManualClock::starting_now(),
        )
    }

    /// Same gateway, storage and clock behind a fresh console, as after a
    /// process restart.
    pub fn restart(&self) -> Self {
        Self::assemble(
            self.gateway.clone(),
            Arc::clone(&self.storage),
            self.clock.clone(),
        )
    }

    pub fn assemble(
        gateway: StubGateway,
        storage: Arc<MemoryStore>,
        clock: ManualClock,
    ) -> Self {
        let notifier = Arc::new(BufferedNotifier::new());
        let console = Console::new(
            RosterConfig::default(),
            Arc::new(gateway.clone()),
            storage.clone(),
            Arc::new(clock.clone()),
            notifier.clone(),
        );
        Self {
            console,
            gateway,
            storage,
            clock,
            notifier,
        }
    }

    pub async fn logged_in() -> Result<Self> {
        let harness = Self::new();
        harness.login().await?;
        Ok(harness)
    }

    pub async fn login(&self) -> Result<()> {
        self.console.login(&credentials()).await?;
        Ok(())
    }

    pub fn error_toasts(&self) -> Vec<String> {
        self.toasts(NotificationLevel::Error)
    }

    pub fn success_toasts(&self) -> Vec<String> {
        self.toasts(NotificationLevel::Success)
    }

    fn toasts(&self, level: NotificationLevel) -> Vec<String> {
        self.notifier
            .snapshot()
            .into_iter()
            .filter(|n| n.level == level)
            .map(|n| n.message)
            .collect()
    }
}

pub fn credentials() -> Credentials {
    Credentials::new(TEST_EMAIL, TEST_PASSWORD)
}

pub fn payload(first_name: &str, last_name: &str) -> UserPayload {
    UserPayload::new(
        format!(
            "{}.{}@reqres.in",
            first_name.to_lowercase(),
            last_name.to_lowercase()
        ),
        first_name,
        last_name,
        "https://reqres.in/img/faces/3-image.jpg",
    )
}
