//! Health Check System
//!
//! `/health` answers a static summary, `/health/live` answers while the process
//! runs, and `/health/ready` pings the backing store.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use stay_db::StoreHealth;
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// Health check status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        matches!(self, Self::Healthy | Self::Degraded)
    }
}

/// Individual component health
#[derive(Debug, Clone, Serialize)]
pub struct ComponentHealth {
    pub name: String,
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub response_time_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Readiness report
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub version: String,
    pub uptime_seconds: u64,
    pub components: Vec<ComponentHealth>,
    pub timestamp: DateTime<Utc>,
}

impl HealthReport {
    pub fn http_status(&self) -> StatusCode {
        if self.status.is_healthy() {
            StatusCode::OK
        } else {
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

/// Liveness summary served at `/health`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthSummary {
    pub status: &'static str,
    pub message: &'static str,
    /// Seconds since startup
    pub uptime: u64,
    pub started_at: DateTime<Utc>,
    pub timestamp: DateTime<Utc>,
    pub version: &'static str,
}

/// Health checker configuration
#[derive(Debug, Clone)]
pub struct HealthConfig {
    /// Timeout for the store ping
    pub check_timeout: Duration,
    /// Pings slower than this report degraded
    pub slow_threshold: Duration,
    /// Cache duration for readiness results
    pub cache_duration: Duration,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            check_timeout: Duration::from_secs(5),
            slow_threshold: Duration::from_secs(1),
            cache_duration: Duration::from_secs(10),
        }
    }
}

struct CachedHealth {
    report: HealthReport,
    cached_at: Instant,
}

/// Health checker service
pub struct HealthChecker {
    config: HealthConfig,
    store: Arc<dyn StoreHealth>,
    start_time: Instant,
    started_at: DateTime<Utc>,
    cache: RwLock<Option<CachedHealth>>,
}

impl HealthChecker {
    pub fn new(store: Arc<dyn StoreHealth>, config: HealthConfig) -> Self {
        Self {
            config,
            store,
            start_time: Instant::now(),
            started_at: Utc::now(),
            cache: RwLock::new(None),
        }
    }

    pub fn summary(&self) -> HealthSummary {
        HealthSummary {
            status: "ok",
            message: "Service is healthy",
            uptime: self.start_time.elapsed().as_secs(),
            started_at: self.started_at,
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION"),
        }
    }

    /// Get cached readiness or ping the store
    pub async fn check(&self) -> HealthReport {
        {
            let cache = self.cache.read().await;
            if let Some(ref cached) = *cache {
                if cached.cached_at.elapsed() < self.config.cache_duration {
                    debug!("Returning cached health report");
                    return cached.report.clone();
                }
            }
        }

        let report = self.perform_checks().await;

        {
            let mut cache = self.cache.write().await;
            *cache = Some(CachedHealth {
                report: report.clone(),
                cached_at: Instant::now(),
            });
        }

        report
    }

    async fn perform_checks(&self) -> HealthReport {
        let store = self.check_store().await;

        HealthReport {
            status: store.status,
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_seconds: self.start_time.elapsed().as_secs(),
            components: vec![store],
            timestamp: Utc::now(),
        }
    }

    async fn check_store(&self) -> ComponentHealth {
        let start = Instant::now();
        let outcome = tokio::time::timeout(self.config.check_timeout, self.store.ping()).await;
        let elapsed = start.elapsed();

        let (status, message) = match outcome {
            Ok(Ok(())) if elapsed > self.config.slow_threshold => {
                (HealthStatus::Degraded, "Store responding slowly".to_string())
            }
            Ok(Ok(())) => (HealthStatus::Healthy, "Connected".to_string()),
            Ok(Err(e)) => {
                warn!(error = %e, backend = self.store.backend(), "Store ping failed");
                (HealthStatus::Unhealthy, "Store unavailable".to_string())
            }
            Err(_) => {
                warn!(backend = self.store.backend(), "Store ping timed out");
                (HealthStatus::Unhealthy, "Store ping timed out".to_string())
            }
        };

        ComponentHealth {
            name: "store".to_string(),
            status,
            message: Some(message),
            response_time_ms: elapsed.as_millis() as u64,
            details: Some(serde_json::json!({ "backend": self.store.backend() })),
        }
    }
}

/// Summary health check
pub async fn health(State(checker): State<Arc<HealthChecker>>) -> Json<HealthSummary> {
    Json(checker.summary())
}

/// Liveness check
pub async fn liveness() -> &'static str {
    "OK"
}

/// Readiness check
pub async fn readiness(State(checker): State<Arc<HealthChecker>>) -> (StatusCode, Json<HealthReport>) {
    let report = checker.check().await;
    let status = report.http_status();
    (status, Json(report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use stay_db::{MemoryStore, RepositoryError, RepositoryResult};

    struct DownStore;

    #[async_trait]
    impl StoreHealth for DownStore {
        fn backend(&self) -> &'static str {
            "down"
        }

        async fn ping(&self) -> RepositoryResult<()> {
            Err(RepositoryError::Conflict("connection refused".to_string()))
        }
    }

    #[tokio::test]
    async fn test_memory_store_is_ready() {
        let checker = HealthChecker::new(Arc::new(MemoryStore::new()), HealthConfig::default());
        let report = checker.check().await;

        assert_eq!(report.status, HealthStatus::Healthy);
        assert_eq!(report.components[0].details, Some(serde_json::json!({ "backend": "memory" })));
        assert_eq!(report.http_status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_failed_ping_is_unavailable() {
        let checker = HealthChecker::new(Arc::new(DownStore), HealthConfig::default());
        let report = checker.check().await;

        assert_eq!(report.status, HealthStatus::Unhealthy);
        assert_eq!(report.http_status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_health_cache() {
        let checker = HealthChecker::new(
            Arc::new(MemoryStore::new()),
            HealthConfig {
                cache_duration: Duration::from_secs(60),
                ..Default::default()
            },
        );

        let report1 = checker.check().await;
        let report2 = checker.check().await;

        assert_eq!(report1.timestamp, report2.timestamp);
    }

    #[test]
    fn test_summary_shape() {
        let checker = HealthChecker::new(Arc::new(MemoryStore::new()), HealthConfig::default());
        let value = serde_json::to_value(checker.summary()).unwrap();

        assert_eq!(value["status"], "ok");
        assert_eq!(value["message"], "Service is healthy");
        assert!(value.get("startedAt").is_some());
        assert!(value.get("uptime").is_some());
    }
}
