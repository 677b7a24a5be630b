//! Driving port for case reads: listings, single cases, documents, stats.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::case::CaseStats;
use crate::domain::user::{Role, UserId};
use crate::domain::Error;

use super::case_command::{CasePayload, DocumentMetaPayload};

/// Request to page through the actor's own cases.
#[derive(Debug, Clone)]
pub struct ListCasesRequest {
    pub actor: UserId,
    pub role: Role,
    /// Opaque cursor from a previous page, if any.
    pub cursor: Option<String>,
    pub limit: Option<u32>,
}

/// One page of cases plus the cursor for the next page.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CasePage {
    pub items: Vec<CasePayload>,
    pub next_cursor: Option<String>,
}

/// Request for a single case.
#[derive(Debug, Clone)]
pub struct GetCaseRequest {
    pub case_id: Uuid,
    pub actor: UserId,
}

/// Request for the document listing of one case.
#[derive(Debug, Clone)]
pub struct ListDocumentsRequest {
    pub case_id: Uuid,
    pub actor: UserId,
}

/// Request for per-status counts scoped to the actor.
#[derive(Debug, Clone)]
pub struct CaseStatsRequest {
    pub actor: UserId,
    pub role: Role,
}

/// Driving port for case read operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CaseQuery: Send + Sync {
    /// The actor's cases, newest first, cursor-paginated.
    async fn list_cases(&self, request: ListCasesRequest) -> Result<CasePage, Error>;

    /// A single case; only a party to the case may read it.
    async fn get_case(&self, request: GetCaseRequest) -> Result<CasePayload, Error>;

    /// Document metadata for one case, oldest first.
    async fn list_documents(
        &self,
        request: ListDocumentsRequest,
    ) -> Result<Vec<DocumentMetaPayload>, Error>;

    /// Per-status counts for the actor's cases.
    async fn stats(&self, request: CaseStatsRequest) -> Result<CaseStats, Error>;
}

/// Fixture query implementation for tests that do not need case reads.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureCaseQuery;

#[async_trait]
impl CaseQuery for FixtureCaseQuery {
    async fn list_cases(&self, _request: ListCasesRequest) -> Result<CasePage, Error> {
        Ok(CasePage {
            items: Vec::new(),
            next_cursor: None,
        })
    }

    async fn get_case(&self, _request: GetCaseRequest) -> Result<CasePayload, Error> {
        Err(Error::not_found("case not found"))
    }

    async fn list_documents(
        &self,
        _request: ListDocumentsRequest,
    ) -> Result<Vec<DocumentMetaPayload>, Error> {
        Ok(Vec::new())
    }

    async fn stats(&self, _request: CaseStatsRequest) -> Result<CaseStats, Error> {
        Ok(CaseStats::default())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use rstest::rstest;

    use super::*;
    use crate::domain::error::ErrorCode;

    #[rstest]
    #[tokio::test]
    async fn fixture_list_returns_an_empty_page() {
        let query = FixtureCaseQuery;
        let page = query
            .list_cases(ListCasesRequest {
                actor: UserId::random(),
                role: Role::Client,
                cursor: None,
                limit: None,
            })
            .await
            .expect("fixture list succeeds");
        assert!(page.items.is_empty());
        assert!(page.next_cursor.is_none());
    }

    #[rstest]
    #[tokio::test]
    async fn fixture_get_reports_not_found() {
        let query = FixtureCaseQuery;
        let err = query
            .get_case(GetCaseRequest {
                case_id: Uuid::new_v4(),
                actor: UserId::random(),
            })
            .await
            .expect_err("fixture get fails");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }
}
