//! Case service: lifecycle commands, assignment orchestration, and
//! cursor-paginated reads.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pagination::{Cursor, Page, PageLimits};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::case::{
    Case, CaseDescription, CaseStats, CaseStatus, CaseTitle, DocumentUpload,
};
use crate::domain::ports::{
    AssignLawyerRequest, AttachDocumentRequest, CaseActionRequest, CaseCommand, CaseCursorKey,
    CasePage, CasePayload, CaseQuery, CaseRepository, CaseRepositoryError, CaseScope,
    CaseStatsRequest, CreateCaseRequest, DocumentMetaPayload, EmailMessage, GetCaseRequest,
    ListCasesRequest, ListDocumentsRequest, Mailer, NewCase, UserRepository,
};
use crate::domain::user::{Role, UserId};
use crate::domain::Error;

/// Page size bounds for case listings.
const CASE_PAGE_LIMITS: PageLimits = PageLimits {
    default: 20,
    max: 100,
};

/// Wire form of the case listing cursor.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CaseCursor {
    created_at: DateTime<Utc>,
    id: Uuid,
}

/// [`CaseCommand`] and [`CaseQuery`] over the case repository, with the
/// mailer for best-effort decision notifications.
pub struct CaseService<C, U, M> {
    cases: Arc<C>,
    users: Arc<U>,
    mailer: Arc<M>,
}

impl<C, U, M> CaseService<C, U, M> {
    pub fn new(cases: Arc<C>, users: Arc<U>, mailer: Arc<M>) -> Self {
        Self {
            cases,
            users,
            mailer,
        }
    }
}

fn map_repository_error(error: CaseRepositoryError) -> Error {
    match error {
        CaseRepositoryError::NotFound => Error::not_found("case not found"),
        CaseRepositoryError::StaleStatus => {
            Error::conflict("case status changed concurrently")
        }
        CaseRepositoryError::AlreadyAssigned => {
            Error::conflict("case already has an assigned lawyer")
        }
        other => Error::internal(other.to_string()),
    }
}

fn scope_for(actor: &UserId, role: Role) -> CaseScope {
    match role {
        Role::Client => CaseScope::Client(actor.clone()),
        Role::Lawyer => CaseScope::Lawyer(actor.clone()),
    }
}

impl<C, U, M> CaseService<C, U, M>
where
    C: CaseRepository,
    U: UserRepository,
    M: Mailer,
{
    async fn load_case(&self, case_id: &Uuid) -> Result<Case, Error> {
        self.cases
            .find_by_id(case_id)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| Error::not_found("case not found"))
    }

    async fn load_case_for(&self, case_id: &Uuid, actor: &UserId) -> Result<Case, Error> {
        let case = self.load_case(case_id).await?;
        if !case.is_party(actor) {
            return Err(Error::forbidden("not a party to this case"));
        }
        Ok(case)
    }

    /// Apply a checked transition with compare-and-set semantics.
    async fn transition_checked(&self, case: &Case, to: CaseStatus) -> Result<Case, Error> {
        if !case.status.can_transition(to) {
            return Err(Error::conflict(format!(
                "cannot move a {} case to {to}",
                case.status
            )));
        }
        self.cases
            .transition(&case.id, case.status, to)
            .await
            .map_err(map_repository_error)
    }

    /// Decision notification; failures are logged, never retried.
    async fn notify_decision(&self, case: &Case, decision: CaseStatus) {
        let client = match self.users.find_by_id(&case.client_id).await {
            Ok(Some(client)) => client,
            Ok(None) => {
                tracing::warn!(case_id = %case.id, "decision email skipped: client missing");
                return;
            }
            Err(error) => {
                tracing::warn!(case_id = %case.id, %error, "decision email skipped");
                return;
            }
        };
        let message = EmailMessage {
            to: client.email().clone(),
            subject: format!("Your case was {decision}"),
            body: format!(
                "Hello {},\n\nYour case \"{}\" was {decision} by the assigned lawyer.\n",
                client.display_name(),
                case.title.as_ref()
            ),
        };
        if let Err(error) = self.mailer.send(message).await {
            tracing::warn!(case_id = %case.id, %error, "decision email failed");
        }
    }

    async fn decide(&self, request: CaseActionRequest, to: CaseStatus) -> Result<Case, Error> {
        let case = self.load_case(&request.case_id).await?;
        if case.lawyer_id.as_ref() != Some(&request.actor) {
            return Err(Error::forbidden("only the assigned lawyer may decide"));
        }
        let decided = self.transition_checked(&case, to).await?;
        self.notify_decision(&decided, to).await;
        Ok(decided)
    }
}

#[async_trait]
impl<C, U, M> CaseCommand for CaseService<C, U, M>
where
    C: CaseRepository,
    U: UserRepository,
    M: Mailer,
{
    async fn create_case(&self, request: CreateCaseRequest) -> Result<CasePayload, Error> {
        let title = CaseTitle::new(request.title)
            .map_err(|err| Error::invalid_request(err.to_string()))?;
        let description = CaseDescription::new(request.description)
            .map_err(|err| Error::invalid_request(err.to_string()))?;
        let created = self
            .cases
            .create(NewCase {
                id: Uuid::new_v4(),
                client_id: request.client_id,
                title,
                description,
                specialty: request.specialty,
            })
            .await
            .map_err(map_repository_error)?;

        let assigned = self
            .cases
            .assign_next(&created.id, request.strategy)
            .await
            .map_err(map_repository_error)?;
        if assigned.is_none() {
            tracing::info!(case_id = %created.id, "no lawyer available; case left pending");
            return Ok(created.into());
        }
        self.load_case(&created.id).await.map(Into::into)
    }

    async fn attach_document(
        &self,
        request: AttachDocumentRequest,
    ) -> Result<DocumentMetaPayload, Error> {
        let case = self.load_case_for(&request.case_id, &request.actor).await?;
        let upload = DocumentUpload::new(request.file_name, request.content_type, request.content)
            .map_err(|err| Error::invalid_request(err.to_string()))?;
        let meta = self
            .cases
            .add_document(&case.id, upload)
            .await
            .map_err(map_repository_error)?;
        Ok(meta.into())
    }

    async fn assign_lawyer(&self, request: AssignLawyerRequest) -> Result<CasePayload, Error> {
        let case = self.load_case(&request.case_id).await?;
        if case.client_id != request.actor {
            return Err(Error::forbidden("only the case owner may request assignment"));
        }
        if case.lawyer_id.is_some() {
            return Err(Error::conflict("case already has an assigned lawyer"));
        }
        self.cases
            .assign_next(&case.id, request.strategy)
            .await
            .map_err(map_repository_error)?;
        self.load_case(&case.id).await.map(Into::into)
    }

    async fn submit(&self, request: CaseActionRequest) -> Result<CasePayload, Error> {
        let case = self.load_case(&request.case_id).await?;
        if case.client_id != request.actor {
            return Err(Error::forbidden("only the case owner may submit"));
        }
        self.transition_checked(&case, CaseStatus::Submitted)
            .await
            .map(Into::into)
    }

    async fn approve(&self, request: CaseActionRequest) -> Result<CasePayload, Error> {
        self.decide(request, CaseStatus::Approved).await.map(Into::into)
    }

    async fn reject(&self, request: CaseActionRequest) -> Result<CasePayload, Error> {
        self.decide(request, CaseStatus::Rejected).await.map(Into::into)
    }

    async fn close(&self, request: CaseActionRequest) -> Result<CasePayload, Error> {
        let case = self.load_case_for(&request.case_id, &request.actor).await?;
        self.transition_checked(&case, CaseStatus::Closed)
            .await
            .map(Into::into)
    }
}

#[async_trait]
impl<C, U, M> CaseQuery for CaseService<C, U, M>
where
    C: CaseRepository,
    U: UserRepository,
    M: Mailer,
{
    async fn list_cases(&self, request: ListCasesRequest) -> Result<CasePage, Error> {
        let after = match request.cursor.as_deref() {
            Some(token) => {
                let cursor: CaseCursor = Cursor::decode(token)
                    .map_err(|_| Error::invalid_request("malformed cursor"))?;
                Some(CaseCursorKey {
                    created_at: cursor.created_at,
                    id: cursor.id,
                })
            }
            None => None,
        };
        let limit = CASE_PAGE_LIMITS.resolve(request.limit);
        let rows = self
            .cases
            .list(
                scope_for(&request.actor, request.role),
                after,
                i64::from(limit) + 1,
            )
            .await
            .map_err(map_repository_error)?;
        let page = Page::from_overfetch(rows, limit, |case: &Case| CaseCursor {
            created_at: case.created_at,
            id: case.id,
        })
        .map_err(|err| Error::internal(err.to_string()))?;
        Ok(CasePage {
            items: page.items.into_iter().map(Into::into).collect(),
            next_cursor: page.next_cursor,
        })
    }

    async fn get_case(&self, request: GetCaseRequest) -> Result<CasePayload, Error> {
        self.load_case_for(&request.case_id, &request.actor)
            .await
            .map(Into::into)
    }

    async fn list_documents(
        &self,
        request: ListDocumentsRequest,
    ) -> Result<Vec<DocumentMetaPayload>, Error> {
        let case = self.load_case_for(&request.case_id, &request.actor).await?;
        let documents = self
            .cases
            .list_documents(&case.id)
            .await
            .map_err(map_repository_error)?;
        Ok(documents.into_iter().map(Into::into).collect())
    }

    async fn stats(&self, request: CaseStatsRequest) -> Result<CaseStats, Error> {
        let counts = self
            .cases
            .stats(scope_for(&request.actor, request.role))
            .await
            .map_err(map_repository_error)?;
        let mut stats = CaseStats::default();
        for (status, count) in counts {
            stats.record(status, count);
        }
        Ok(stats)
    }
}
