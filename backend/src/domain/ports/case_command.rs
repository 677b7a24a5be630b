//! Driving port for case mutations: creation, documents, assignment, and
//! lifecycle transitions.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::assignment::AssignmentStrategy;
use crate::domain::case::{Case, CaseStatus};
use crate::domain::lawyer::Specialty;
use crate::domain::user::UserId;
use crate::domain::Error;

use super::case_repository::DocumentMeta;

/// Serializable case representation for driving ports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CasePayload {
    pub id: Uuid,
    #[schema(value_type = String)]
    pub client_id: UserId,
    #[schema(value_type = Option<String>)]
    pub lawyer_id: Option<UserId>,
    pub title: String,
    pub description: String,
    pub specialty: Specialty,
    pub status: CaseStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Case> for CasePayload {
    fn from(value: Case) -> Self {
        Self {
            id: value.id,
            client_id: value.client_id,
            lawyer_id: value.lawyer_id,
            title: value.title.into(),
            description: value.description.into(),
            specialty: value.specialty,
            status: value.status,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

/// Serializable document metadata for driving ports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMetaPayload {
    pub id: Uuid,
    pub case_id: Uuid,
    pub file_name: String,
    pub content_type: String,
    pub size_bytes: i64,
    pub uploaded_at: DateTime<Utc>,
}

impl From<DocumentMeta> for DocumentMetaPayload {
    fn from(value: DocumentMeta) -> Self {
        Self {
            id: value.id,
            case_id: value.case_id,
            file_name: value.file_name,
            content_type: value.content_type,
            size_bytes: value.size_bytes,
            uploaded_at: value.uploaded_at,
        }
    }
}

/// Request to create a case on behalf of a client.
#[derive(Debug, Clone)]
pub struct CreateCaseRequest {
    pub client_id: UserId,
    pub title: String,
    pub description: String,
    pub specialty: Specialty,
    pub strategy: AssignmentStrategy,
}

/// Request to attach a decoded document to a case.
#[derive(Debug, Clone)]
pub struct AttachDocumentRequest {
    pub case_id: Uuid,
    pub actor: UserId,
    pub file_name: String,
    pub content_type: String,
    pub content: Vec<u8>,
}

/// Request to re-run assignment for an unassigned case.
#[derive(Debug, Clone)]
pub struct AssignLawyerRequest {
    pub case_id: Uuid,
    pub actor: UserId,
    pub strategy: AssignmentStrategy,
}

/// A lifecycle action (submit, approve, reject, close) on one case.
#[derive(Debug, Clone)]
pub struct CaseActionRequest {
    pub case_id: Uuid,
    pub actor: UserId,
}

/// Driving port for case write operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CaseCommand: Send + Sync {
    /// Create a case for the client and immediately attempt assignment.
    ///
    /// The returned case is `Open` with a lawyer when the candidate pool
    /// produced one, otherwise `Pending` and unassigned.
    async fn create_case(&self, request: CreateCaseRequest) -> Result<CasePayload, Error>;

    /// Attach a document; only a party to the case may upload.
    async fn attach_document(
        &self,
        request: AttachDocumentRequest,
    ) -> Result<DocumentMetaPayload, Error>;

    /// Re-run assignment for a case that has no lawyer yet.
    async fn assign_lawyer(&self, request: AssignLawyerRequest) -> Result<CasePayload, Error>;

    /// Client submits the case for a decision (`Open|Review -> Submitted`).
    async fn submit(&self, request: CaseActionRequest) -> Result<CasePayload, Error>;

    /// Assigned lawyer approves a submitted case; notifies the client.
    async fn approve(&self, request: CaseActionRequest) -> Result<CasePayload, Error>;

    /// Assigned lawyer rejects a submitted case; notifies the client.
    async fn reject(&self, request: CaseActionRequest) -> Result<CasePayload, Error>;

    /// Either party closes the case.
    async fn close(&self, request: CaseActionRequest) -> Result<CasePayload, Error>;
}

/// Fixture command implementation for tests that do not need case flows.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureCaseCommand;

#[async_trait]
impl CaseCommand for FixtureCaseCommand {
    async fn create_case(&self, request: CreateCaseRequest) -> Result<CasePayload, Error> {
        let now = Utc::now();
        Ok(CasePayload {
            id: Uuid::new_v4(),
            client_id: request.client_id,
            lawyer_id: None,
            title: request.title,
            description: request.description,
            specialty: request.specialty,
            status: CaseStatus::Pending,
            created_at: now,
            updated_at: now,
        })
    }

    async fn attach_document(
        &self,
        request: AttachDocumentRequest,
    ) -> Result<DocumentMetaPayload, Error> {
        Ok(DocumentMetaPayload {
            id: Uuid::new_v4(),
            case_id: request.case_id,
            file_name: request.file_name,
            content_type: request.content_type,
            size_bytes: request.content.len() as i64,
            uploaded_at: Utc::now(),
        })
    }

    async fn assign_lawyer(&self, _request: AssignLawyerRequest) -> Result<CasePayload, Error> {
        Err(Error::not_found("case not found"))
    }

    async fn submit(&self, _request: CaseActionRequest) -> Result<CasePayload, Error> {
        Err(Error::not_found("case not found"))
    }

    async fn approve(&self, _request: CaseActionRequest) -> Result<CasePayload, Error> {
        Err(Error::not_found("case not found"))
    }

    async fn reject(&self, _request: CaseActionRequest) -> Result<CasePayload, Error> {
        Err(Error::not_found("case not found"))
    }

    async fn close(&self, _request: CaseActionRequest) -> Result<CasePayload, Error> {
        Err(Error::not_found("case not found"))
    }
}
