use std::sync::Arc;

use tripsage_core::repository::{BookingRepository, SummaryRepository, UserRepository};
use tripsage_core::token::TokenService;

use crate::llm::SummaryGenerator;
use crate::mailer::Mailer;

/// Everything a handler needs, constructed once at startup and treated
/// as immutable thereafter. Tests substitute the in-memory store, the
/// logging mailer, and the fallback generator here.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub bookings: Arc<dyn BookingRepository>,
    pub summaries: Arc<dyn SummaryRepository>,
    pub tokens: Arc<TokenService>,
    pub mailer: Arc<dyn Mailer>,
    pub generator: Arc<dyn SummaryGenerator>,
}
