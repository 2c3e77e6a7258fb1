// ── Session ──
//
// Owns every data-access service for one resource server. All services
// share one HTTP connection pool and one notification sink.

use std::sync::Arc;

use tracing::debug;

use reportly_api::transport::{TlsMode, TransportConfig};
use reportly_api::{Resource, ResourceClient};

use crate::config::{SessionConfig, TlsVerification};
use crate::error::CoreError;
use crate::model::{CoverType, Unit, UnitCategory};
use crate::notification::NotificationSink;
use crate::service::DataService;

/// Entry point for consumers.
///
/// Cheaply cloneable via `Arc<SessionInner>`. Each service starts with an
/// empty mirror; nothing is fetched until asked.
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    config: SessionConfig,
    notifications: NotificationSink,
    cover_types: DataService<CoverType>,
    unit_categories: DataService<UnitCategory>,
    units: DataService<Unit>,
}

impl Session {
    /// Build the shared HTTP client and one service per resource.
    pub fn new(config: SessionConfig) -> Result<Self, CoreError> {
        let transport = TransportConfig {
            tls: tls_to_transport(&config.tls),
            timeout: config.timeout,
            token: config.token.clone(),
        };
        let http = transport.build_client()?;
        let notifications = NotificationSink::new(config.notification_capacity);

        let cover_types = service(&config, &http, &notifications)?;
        let unit_categories = service(&config, &http, &notifications)?;
        let units = service(&config, &http, &notifications)?;

        debug!(base_url = %config.base_url, policy = %config.failure_policy, "session ready");

        Ok(Self {
            inner: Arc::new(SessionInner {
                config,
                notifications,
                cover_types,
                unit_categories,
                units,
            }),
        })
    }

    pub fn config(&self) -> &SessionConfig {
        &self.inner.config
    }

    /// The sink shared by every service of this session.
    pub fn notifications(&self) -> &NotificationSink {
        &self.inner.notifications
    }

    pub fn cover_types(&self) -> &DataService<CoverType> {
        &self.inner.cover_types
    }

    pub fn unit_categories(&self) -> &DataService<UnitCategory> {
        &self.inner.unit_categories
    }

    pub fn units(&self) -> &DataService<Unit> {
        &self.inner.units
    }
}

fn service<R: Resource>(
    config: &SessionConfig,
    http: &reqwest::Client,
    notifications: &NotificationSink,
) -> Result<DataService<R>, CoreError> {
    let client = ResourceClient::new(config.base_url.as_str(), http.clone())?;
    Ok(DataService::new(
        client,
        notifications.clone(),
        config.failure_policy,
    ))
}

fn tls_to_transport(tls: &TlsVerification) -> TlsMode {
    match tls {
        TlsVerification::SystemDefaults => TlsMode::System,
        TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
        TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::config::LogicalFailurePolicy;

    #[test]
    fn services_share_the_notification_sink() {
        let session =
            Session::new(SessionConfig::new("http://localhost:9".parse().unwrap())).unwrap();
        let _rx = session.notifications().subscribe();
        assert_eq!(session.notifications().receiver_count(), 1);
        assert!(session.units().is_empty());
        assert_eq!(
            session.cover_types().failure_policy(),
            LogicalFailurePolicy::Reject
        );
    }

    #[test]
    fn missing_ca_file_fails_construction() {
        let mut config = SessionConfig::new("https://localhost".parse().unwrap());
        config.tls = TlsVerification::CustomCa(PathBuf::from("/nonexistent/ca.pem"));
        assert!(matches!(
            Session::new(config),
            Err(CoreError::ConnectionFailed { .. })
        ));
    }
}
