//! Domain layer: validated entities, pure business rules, ports, and the
//! services that implement the driving ports.

pub mod appointment;
pub mod assignment;
pub mod auth;
pub mod case;
pub mod error;
pub mod lawyer;
pub mod message;
pub mod ports;
pub mod user;

mod appointment_service;
mod auth_service;
mod case_service;
mod chat_service;
mod directory_service;

pub use appointment_service::AppointmentService;
pub use auth_service::AuthService;
pub use case_service::CaseService;
pub use chat_service::ChatService;
pub use directory_service::DirectoryService;
pub use error::{Error, ErrorCode, TRACE_ID_HEADER};
pub use user::{DisplayName, EmailAddress, Role, User, UserId, UserValidationError};
