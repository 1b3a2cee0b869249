use std::sync::Arc;

use storage::kv::KeyValueStore;
use storage::repository::Storage;

use crate::Clock;
use crate::dashboard_service::DashboardService;
use crate::error::AppServicesError;
use crate::guest_identity::GuestIdentityService;
use crate::timing_service::SessionTimingService;

/// Assembles app-facing services over one storage backend.
#[derive(Clone)]
pub struct AppServices {
    timing: Arc<SessionTimingService>,
    dashboard: Arc<DashboardService>,
    guest_identity: Arc<GuestIdentityService>,
}

impl AppServices {
    /// Build services over an existing storage bundle.
    #[must_use]
    pub fn new(storage: &Storage, clock: Clock, guest_store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            timing: Arc::new(SessionTimingService::new(
                clock,
                Arc::clone(&storage.sessions),
            )),
            dashboard: Arc::new(DashboardService::new(Arc::clone(&storage.sessions))),
            guest_identity: Arc::new(GuestIdentityService::new(guest_store)),
        }
    }

    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        guest_store: Arc<dyn KeyValueStore>,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::new(&storage, clock, guest_store))
    }

    #[must_use]
    pub fn timing(&self) -> Arc<SessionTimingService> {
        Arc::clone(&self.timing)
    }

    #[must_use]
    pub fn dashboard(&self) -> Arc<DashboardService> {
        Arc::clone(&self.dashboard)
    }

    #[must_use]
    pub fn guest_identity(&self) -> Arc<GuestIdentityService> {
        Arc::clone(&self.guest_identity)
    }
}
