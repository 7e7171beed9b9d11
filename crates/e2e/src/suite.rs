//! Suite-scoped lifecycle around one shared [`TestDataApi`]

use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::info;

use practice_api::{ApiClient, ApiConfig};

use crate::cleanup::CleanupReport;
use crate::error::E2eResult;
use crate::fixtures::FixtureStore;
use crate::orchestrator::TestDataApi;
use crate::placeholder::PlaceholderReplacer;
use crate::provider::{TestDataProvider, UniquenessStrategy};

/// Handle every scenario in a suite shares. The lock may be held across awaits.
pub type SharedTestData = Arc<Mutex<TestDataApi>>;

/// Suite configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SuiteConfig {
    pub api: ApiConfig,
    pub fixtures_dir: PathBuf,
    pub uniqueness: UniquenessStrategy,
    /// Probe the health-check endpoint before the first scenario
    pub wait_for_api: bool,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            fixtures_dir: FixtureStore::default_dir(),
            uniqueness: UniquenessStrategy::default(),
            wait_for_api: true,
        }
    }
}

/// Owns the shared orchestrator for the lifetime of a suite
pub struct TestSuite {
    client: ApiClient,
    data: SharedTestData,
}

impl TestSuite {
    /// Build the client and orchestrator, probing readiness if configured.
    /// An unhealthy answer is only logged; no answer at all is an error.
    pub async fn before_suite(config: SuiteConfig) -> E2eResult<Self> {
        let client = ApiClient::new(config.api)?;

        if config.wait_for_api {
            client.wait_for_api_ready().await?;
        }

        let provider = TestDataProvider::new(
            PlaceholderReplacer::new(),
            FixtureStore::new(config.fixtures_dir),
        )
        .with_uniqueness(config.uniqueness);

        info!("Test suite ready against {}", client.api_root());
        Ok(Self {
            data: Arc::new(Mutex::new(TestDataApi::new(client.clone(), provider))),
            client,
        })
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn data(&self) -> SharedTestData {
        Arc::clone(&self.data)
    }

    /// Delete what the finished scenario created
    pub async fn after_scenario(&self) -> CleanupReport {
        self.data.lock().await.cleanup().await
    }

    /// Forget tracked data without deleting it and refresh placeholder timestamps
    pub async fn reset_scenario(&self) {
        let mut data = self.data.lock().await;
        data.reset();
        data.provider_mut().replacer_mut().regenerate();
    }

    /// Final cleanup. Outstanding [`SharedTestData`] handles stay usable but
    /// start from an empty ledger.
    pub async fn dispose(self) -> CleanupReport {
        let report = self.after_scenario().await;
        info!("Test suite disposed");
        report
    }
}
