//! Shared handler state: the driving ports behind every endpoint.

use std::sync::Arc;

use crate::domain::ports::{
    AppointmentCommand, AppointmentQuery, CaseCommand, CaseQuery, ChatCommand, ChatQuery,
    FixtureAppointmentCommand, FixtureAppointmentQuery, FixtureCaseCommand, FixtureCaseQuery,
    FixtureChatCommand, FixtureChatQuery, FixtureIdentityService, FixtureLawyerQuery,
    IdentityService, LawyerQuery,
};

/// The driving ports every HTTP handler resolves against.
#[derive(Clone)]
pub struct HttpState {
    pub identity: Arc<dyn IdentityService>,
    pub case_command: Arc<dyn CaseCommand>,
    pub case_query: Arc<dyn CaseQuery>,
    pub appointment_command: Arc<dyn AppointmentCommand>,
    pub appointment_query: Arc<dyn AppointmentQuery>,
    pub chat_command: Arc<dyn ChatCommand>,
    pub chat_query: Arc<dyn ChatQuery>,
    pub lawyer_query: Arc<dyn LawyerQuery>,
}

impl HttpState {
    /// State backed entirely by fixture ports, for handler tests.
    #[must_use]
    pub fn fixture() -> Self {
        Self {
            identity: Arc::new(FixtureIdentityService),
            case_command: Arc::new(FixtureCaseCommand),
            case_query: Arc::new(FixtureCaseQuery),
            appointment_command: Arc::new(FixtureAppointmentCommand),
            appointment_query: Arc::new(FixtureAppointmentQuery),
            chat_command: Arc::new(FixtureChatCommand),
            chat_query: Arc::new(FixtureChatQuery),
            lawyer_query: Arc::new(FixtureLawyerQuery),
        }
    }
}
