use std::sync::Arc;

use rutero_accounts::AccountService;
use rutero_booking::intake::IntakeValidator;
use rutero_booking::repository::{BookingStore, CancellationStore};
use rutero_booking::transition::TransitionValidator;
use rutero_catalog::{LineService, RouteService, UnitService};

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
    pub expiration: u64,
}

/// Shared handler state. The validators own their collaborators; the raw
/// stores are also held for the read-side routes.
#[derive(Clone)]
pub struct AppState {
    pub intake: Arc<IntakeValidator>,
    pub transitions: Arc<TransitionValidator>,
    pub bookings: Arc<dyn BookingStore>,
    pub cancellations: Arc<dyn CancellationStore>,
    pub lines: Arc<LineService>,
    pub units: Arc<UnitService>,
    pub routes: Arc<RouteService>,
    pub accounts: Arc<AccountService>,
    pub auth: AuthConfig,
}
