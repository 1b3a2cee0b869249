#![forbid(unsafe_code)]

pub mod app_services;
pub mod dashboard_service;
pub mod error;
pub mod guest_identity;
pub mod timing_service;

pub use quizya_core::Clock;

pub use app_services::AppServices;
pub use dashboard_service::DashboardService;
pub use error::{AppServicesError, DashboardError, GuestIdentityError, TimingServiceError};
pub use guest_identity::GuestIdentityService;
pub use timing_service::{SessionTiming, SessionTimingService};
