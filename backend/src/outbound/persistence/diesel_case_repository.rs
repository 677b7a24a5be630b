//! PostgreSQL-backed `CaseRepository` implementation using Diesel ORM.
//!
//! The two concurrency-sensitive operations are handled here: status
//! transitions are compare-and-set updates, and lawyer assignment runs in
//! a transaction that locks the candidate pool with `FOR UPDATE`.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use std::str::FromStr;
use uuid::Uuid;

use crate::domain::assignment::{select_lawyer, AssignmentStrategy};
use crate::domain::case::{Case, CaseDescription, CaseStatus, CaseTitle, DocumentUpload};
use crate::domain::lawyer::{LawyerCandidate, Specialty};
use crate::domain::ports::{
    CaseCursorKey, CaseRepository, CaseRepositoryError, CaseScope, DocumentMeta, NewCase,
};
use crate::domain::user::UserId;

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{CaseDocumentMetaRow, CaseRow, NewCaseDocumentRow, NewCaseRow};
use super::pool::{DbPool, PoolError};
use super::schema::{case_documents, cases, lawyer_profiles};

/// Diesel-backed implementation of the case repository port.
#[derive(Clone)]
pub struct DieselCaseRepository {
    pool: DbPool,
}

impl DieselCaseRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> CaseRepositoryError {
    map_basic_pool_error(error, CaseRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> CaseRepositoryError {
    map_basic_diesel_error(
        error,
        CaseRepositoryError::query,
        CaseRepositoryError::connection,
    )
}

/// Error type threaded through transactions so domain outcomes survive
/// the rollback machinery, which requires `From<diesel::result::Error>`.
enum TxError {
    Diesel(diesel::result::Error),
    Repo(CaseRepositoryError),
}

impl From<diesel::result::Error> for TxError {
    fn from(error: diesel::result::Error) -> Self {
        Self::Diesel(error)
    }
}

fn map_tx_error(error: TxError) -> CaseRepositoryError {
    match error {
        TxError::Diesel(error) => map_diesel_error(error),
        TxError::Repo(error) => error,
    }
}

fn row_to_case(row: &CaseRow) -> Result<Case, CaseRepositoryError> {
    let title = CaseTitle::new(row.title.as_str())
        .map_err(|err| CaseRepositoryError::query(err.to_string()))?;
    let description = CaseDescription::new(row.description.as_str())
        .map_err(|err| CaseRepositoryError::query(err.to_string()))?;
    let specialty = Specialty::from_str(row.specialty.as_str())
        .map_err(|err| CaseRepositoryError::query(err.to_string()))?;
    let status = CaseStatus::from_str(row.status.as_str())
        .map_err(|err| CaseRepositoryError::query(err.to_string()))?;
    Ok(Case {
        id: row.id,
        client_id: UserId::from_uuid(row.client_id),
        lawyer_id: row.lawyer_id.map(UserId::from_uuid),
        title,
        description,
        specialty,
        status,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

fn row_to_document_meta(row: CaseDocumentMetaRow) -> DocumentMeta {
    DocumentMeta {
        id: row.id,
        case_id: row.case_id,
        file_name: row.file_name,
        content_type: row.content_type,
        size_bytes: row.size_bytes,
        uploaded_at: row.uploaded_at,
    }
}

/// Load the assignment candidate pool for one specialty, in directory
/// order, with the profile rows locked for the rest of the transaction.
async fn load_candidates(
    conn: &mut AsyncPgConnection,
    specialty: Specialty,
) -> Result<Vec<LawyerCandidate>, diesel::result::Error> {
    let profiles: Vec<(Uuid, Option<chrono::DateTime<Utc>>)> = lawyer_profiles::table
        .filter(lawyer_profiles::verified.eq(true))
        .filter(lawyer_profiles::specialty.eq(specialty.as_str()))
        .order((
            lawyer_profiles::created_at.asc(),
            lawyer_profiles::user_id.asc(),
        ))
        .select((lawyer_profiles::user_id, lawyer_profiles::last_assigned_at))
        .for_update()
        .load(conn)
        .await?;

    if profiles.is_empty() {
        return Ok(Vec::new());
    }

    let candidate_ids: Vec<Uuid> = profiles.iter().map(|(id, _)| *id).collect();
    let terminal: Vec<&str> = CaseStatus::ALL
        .iter()
        .filter(|status| status.is_terminal())
        .map(|status| status.as_str())
        .collect();
    let counts: Vec<(Option<Uuid>, i64)> = cases::table
        .filter(cases::lawyer_id.eq_any(&candidate_ids))
        .filter(cases::status.ne_all(terminal))
        .group_by(cases::lawyer_id)
        .select((cases::lawyer_id, diesel::dsl::count_star()))
        .load(conn)
        .await?;

    Ok(profiles
        .into_iter()
        .map(|(user_id, last_assigned_at)| {
            let active_cases = counts
                .iter()
                .find(|(lawyer_id, _)| *lawyer_id == Some(user_id))
                .map_or(0, |(_, count)| *count);
            LawyerCandidate {
                user_id: UserId::from_uuid(user_id),
                active_cases,
                last_assigned_at,
            }
        })
        .collect())
}

#[async_trait]
impl CaseRepository for DieselCaseRepository {
    async fn create(&self, case: NewCase) -> Result<Case, CaseRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: CaseRow = diesel::insert_into(cases::table)
            .values(&NewCaseRow {
                id: case.id,
                client_id: *case.client_id.as_uuid(),
                title: case.title.as_ref(),
                description: case.description.as_ref(),
                specialty: case.specialty.as_str(),
                status: CaseStatus::Pending.as_str(),
            })
            .returning(CaseRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        row_to_case(&row)
    }

    async fn find_by_id(&self, case_id: &Uuid) -> Result<Option<Case>, CaseRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = cases::table
            .filter(cases::id.eq(case_id))
            .select(CaseRow::as_select())
            .first::<CaseRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.as_ref().map(row_to_case).transpose()
    }

    async fn transition(
        &self,
        case_id: &Uuid,
        from: CaseStatus,
        to: CaseStatus,
    ) -> Result<Case, CaseRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        // Single-statement compare-and-set; the WHERE clause loses to any
        // concurrent writer that moved the status first.
        let updated = diesel::update(
            cases::table
                .filter(cases::id.eq(case_id))
                .filter(cases::status.eq(from.as_str())),
        )
        .set((
            cases::status.eq(to.as_str()),
            cases::updated_at.eq(Utc::now()),
        ))
        .returning(CaseRow::as_returning())
        .get_result::<CaseRow>(&mut conn)
        .await
        .optional()
        .map_err(map_diesel_error)?;

        if let Some(row) = updated {
            return row_to_case(&row);
        }

        let exists: Option<Uuid> = cases::table
            .filter(cases::id.eq(case_id))
            .select(cases::id)
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        Err(if exists.is_some() {
            CaseRepositoryError::stale_status()
        } else {
            CaseRepositoryError::not_found()
        })
    }

    async fn assign_next(
        &self,
        case_id: &Uuid,
        strategy: AssignmentStrategy,
    ) -> Result<Option<UserId>, CaseRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let case_id = *case_id;

        conn.transaction(|conn| {
            async move {
                let row: CaseRow = cases::table
                    .filter(cases::id.eq(case_id))
                    .select(CaseRow::as_select())
                    .for_update()
                    .first(conn)
                    .await
                    .optional()?
                    .ok_or(TxError::Repo(CaseRepositoryError::not_found()))?;

                if row.lawyer_id.is_some() {
                    return Err(TxError::Repo(CaseRepositoryError::already_assigned()));
                }
                let case = row_to_case(&row).map_err(TxError::Repo)?;
                if case.status != CaseStatus::Pending {
                    return Err(TxError::Repo(CaseRepositoryError::stale_status()));
                }

                let candidates = load_candidates(conn, case.specialty).await?;
                let Some(winner) = select_lawyer(&candidates, strategy) else {
                    return Ok(None);
                };

                let now = Utc::now();
                diesel::update(cases::table.filter(cases::id.eq(case_id)))
                    .set((
                        cases::lawyer_id.eq(winner.as_uuid()),
                        cases::status.eq(CaseStatus::Open.as_str()),
                        cases::updated_at.eq(now),
                    ))
                    .execute(conn)
                    .await?;
                diesel::update(
                    lawyer_profiles::table
                        .filter(lawyer_profiles::user_id.eq(winner.as_uuid())),
                )
                .set(lawyer_profiles::last_assigned_at.eq(now))
                .execute(conn)
                .await?;

                Ok(Some(winner))
            }
            .scope_boxed()
        })
        .await
        .map_err(map_tx_error)
    }

    async fn list(
        &self,
        scope: CaseScope,
        after: Option<CaseCursorKey>,
        limit: i64,
    ) -> Result<Vec<Case>, CaseRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let mut query = cases::table.into_boxed();
        query = match &scope {
            CaseScope::Client(client_id) => {
                query.filter(cases::client_id.eq(*client_id.as_uuid()))
            }
            CaseScope::Lawyer(lawyer_id) => {
                query.filter(cases::lawyer_id.eq(*lawyer_id.as_uuid()))
            }
        };
        if let Some(key) = after {
            query = query.filter(
                cases::created_at.lt(key.created_at).or(cases::created_at
                    .eq(key.created_at)
                    .and(cases::id.lt(key.id))),
            );
        }

        let rows: Vec<CaseRow> = query
            .order((cases::created_at.desc(), cases::id.desc()))
            .limit(limit)
            .select(CaseRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.iter().map(row_to_case).collect()
    }

    async fn stats(&self, scope: CaseScope) -> Result<Vec<(CaseStatus, i64)>, CaseRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let mut query = cases::table
            .group_by(cases::status)
            .select((cases::status, diesel::dsl::count_star()))
            .into_boxed();
        query = match &scope {
            CaseScope::Client(client_id) => {
                query.filter(cases::client_id.eq(*client_id.as_uuid()))
            }
            CaseScope::Lawyer(lawyer_id) => {
                query.filter(cases::lawyer_id.eq(*lawyer_id.as_uuid()))
            }
        };

        let counts: Vec<(String, i64)> = query
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        counts
            .into_iter()
            .map(|(status, count)| {
                let status = CaseStatus::from_str(status.as_str())
                    .map_err(|err| CaseRepositoryError::query(err.to_string()))?;
                Ok((status, count))
            })
            .collect()
    }

    async fn add_document(
        &self,
        case_id: &Uuid,
        upload: DocumentUpload,
    ) -> Result<DocumentMeta, CaseRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let case_id = *case_id;

        let row: CaseDocumentMetaRow = conn
            .transaction(|conn| {
                async move {
                    let exists: Option<Uuid> = cases::table
                        .filter(cases::id.eq(case_id))
                        .select(cases::id)
                        .first(conn)
                        .await
                        .optional()?;
                    if exists.is_none() {
                        return Err(TxError::Repo(CaseRepositoryError::not_found()));
                    }

                    let size_bytes = upload.content.len() as i64;
                    let row = diesel::insert_into(case_documents::table)
                        .values(&NewCaseDocumentRow {
                            id: Uuid::new_v4(),
                            case_id,
                            file_name: upload.file_name.as_str(),
                            content_type: upload.content_type.as_str(),
                            content: upload.content.as_slice(),
                            size_bytes,
                        })
                        .returning(CaseDocumentMetaRow::as_returning())
                        .get_result(conn)
                        .await?;
                    Ok(row)
                }
                .scope_boxed()
            })
            .await
            .map_err(map_tx_error)?;

        Ok(row_to_document_meta(row))
    }

    async fn list_documents(
        &self,
        case_id: &Uuid,
    ) -> Result<Vec<DocumentMeta>, CaseRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<CaseDocumentMetaRow> = case_documents::table
            .filter(case_documents::case_id.eq(case_id))
            .order(case_documents::uploaded_at.asc())
            .select(CaseDocumentMetaRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(rows.into_iter().map(row_to_document_meta).collect())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for row conversion and error mapping.

    use chrono::Utc;
    use rstest::{fixture, rstest};

    use super::*;

    #[fixture]
    fn case_row() -> CaseRow {
        let now = Utc::now();
        CaseRow {
            id: Uuid::new_v4(),
            client_id: Uuid::new_v4(),
            lawyer_id: None,
            title: "Deposit dispute".into(),
            description: "Landlord withheld the deposit without cause.".into(),
            specialty: "property".into(),
            status: "pending".into(),
            created_at: now,
            updated_at: now,
        }
    }

    #[rstest]
    fn row_conversion_builds_a_pending_case(case_row: CaseRow) {
        let case = row_to_case(&case_row).expect("valid row converts");
        assert_eq!(case.status, CaseStatus::Pending);
        assert!(case.lawyer_id.is_none());
    }

    #[rstest]
    fn row_conversion_keeps_the_assigned_lawyer(mut case_row: CaseRow) {
        let lawyer = Uuid::new_v4();
        case_row.lawyer_id = Some(lawyer);
        case_row.status = "open".into();
        let case = row_to_case(&case_row).expect("valid row converts");
        assert_eq!(case.lawyer_id, Some(UserId::from_uuid(lawyer)));
    }

    #[rstest]
    fn row_conversion_rejects_an_unknown_status(mut case_row: CaseRow) {
        case_row.status = "archived".into();
        let error = row_to_case(&case_row).expect_err("unknown status must fail");
        assert!(matches!(error, CaseRepositoryError::Query { .. }));
    }

    #[rstest]
    fn tx_errors_keep_their_domain_outcome() {
        let mapped = map_tx_error(TxError::Repo(CaseRepositoryError::already_assigned()));
        assert_eq!(mapped, CaseRepositoryError::already_assigned());

        let mapped = map_tx_error(TxError::Diesel(diesel::result::Error::NotFound));
        assert!(matches!(mapped, CaseRepositoryError::Query { .. }));
    }

    #[rstest]
    fn pool_error_maps_to_connection_error() {
        let error = map_pool_error(PoolError::checkout("timed out"));
        assert!(matches!(error, CaseRepositoryError::Connection { .. }));
    }
}
