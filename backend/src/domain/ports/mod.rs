//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod appointment_command;
mod appointment_query;
mod appointment_repository;
mod availability_repository;
mod case_command;
mod case_query;
mod case_repository;
mod chat_command;
mod chat_provider;
mod chat_query;
mod identity_service;
mod lawyer_directory;
mod lawyer_query;
mod mailer;
mod message_repository;
mod user_repository;

#[cfg(test)]
pub use appointment_command::MockAppointmentCommand;
pub use appointment_command::{
    AppointmentCommand, AppointmentPayload, AvailabilitySlotPayload, BookAppointmentRequest,
    CancelAppointmentRequest, FixtureAppointmentCommand, ReplaceAvailabilityRequest,
    RescheduleAppointmentRequest, WeekdayName,
};
#[cfg(test)]
pub use appointment_query::MockAppointmentQuery;
pub use appointment_query::{
    AppointmentQuery, CalendarWindowRequest, FixtureAppointmentQuery, ListAppointmentsRequest,
    RangePayload,
};
#[cfg(test)]
pub use appointment_repository::MockAppointmentRepository;
pub use appointment_repository::{
    AppointmentRepository, AppointmentRepositoryError, FixtureAppointmentRepository,
    NewAppointment,
};
#[cfg(test)]
pub use availability_repository::MockAvailabilityRepository;
pub use availability_repository::{
    AvailabilityRepository, AvailabilityRepositoryError, FixtureAvailabilityRepository,
};
#[cfg(test)]
pub use case_command::MockCaseCommand;
pub use case_command::{
    AssignLawyerRequest, AttachDocumentRequest, CaseActionRequest, CaseCommand, CasePayload,
    CreateCaseRequest, DocumentMetaPayload, FixtureCaseCommand,
};
#[cfg(test)]
pub use case_query::MockCaseQuery;
pub use case_query::{
    CasePage, CaseQuery, CaseStatsRequest, FixtureCaseQuery, GetCaseRequest, ListCasesRequest,
    ListDocumentsRequest,
};
#[cfg(test)]
pub use case_repository::MockCaseRepository;
pub use case_repository::{
    CaseCursorKey, CaseRepository, CaseRepositoryError, CaseScope, DocumentMeta,
    FixtureCaseRepository, NewCase,
};
#[cfg(test)]
pub use chat_command::MockChatCommand;
pub use chat_command::{ChatCommand, FixtureChatCommand, MessagePayload, SendMessageRequest};
#[cfg(test)]
pub use chat_provider::MockChatProvider;
pub use chat_provider::{ChatProvider, ChatProviderError, FixtureChatProvider};
#[cfg(test)]
pub use chat_query::MockChatQuery;
pub use chat_query::{ChatQuery, FixtureChatQuery, MessageHistoryRequest, MessagePage};
#[cfg(test)]
pub use identity_service::MockIdentityService;
pub use identity_service::{
    AuthenticateRequest, FixtureIdentityService, IdentityService, RegisterProfile,
    RegisterRequest, UserPayload,
};
#[cfg(test)]
pub use lawyer_directory::MockLawyerDirectory;
pub use lawyer_directory::{FixtureLawyerDirectory, LawyerDirectory, LawyerDirectoryError};
#[cfg(test)]
pub use lawyer_query::MockLawyerQuery;
pub use lawyer_query::{FixtureLawyerQuery, LawyerPayload, LawyerQuery, ListLawyersRequest};
#[cfg(test)]
pub use mailer::MockMailer;
pub use mailer::{EmailMessage, FixtureMailer, Mailer, MailerError};
#[cfg(test)]
pub use message_repository::MockMessageRepository;
pub use message_repository::{
    FixtureMessageRepository, MessageCursorKey, MessageRepository, MessageRepositoryError,
};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{
    FixtureUserRepository, NewAccount, ProfileDetails, StoredAccount, UserRepository,
    UserRepositoryError,
};
