//! Directory service: the public verified-lawyer listing.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::ports::{
    LawyerDirectory, LawyerDirectoryError, LawyerPayload, LawyerQuery, ListLawyersRequest,
};
use crate::domain::Error;

/// [`LawyerQuery`] over the lawyer directory port.
pub struct DirectoryService<L> {
    directory: Arc<L>,
}

impl<L> DirectoryService<L> {
    pub fn new(directory: Arc<L>) -> Self {
        Self { directory }
    }
}

fn map_directory_error(error: LawyerDirectoryError) -> Error {
    Error::internal(error.to_string())
}

#[async_trait]
impl<L> LawyerQuery for DirectoryService<L>
where
    L: LawyerDirectory,
{
    async fn list_lawyers(
        &self,
        request: ListLawyersRequest,
    ) -> Result<Vec<LawyerPayload>, Error> {
        let profiles = self
            .directory
            .list_verified(request.specialty)
            .await
            .map_err(map_directory_error)?;
        Ok(profiles.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use chrono::Utc;
    use rstest::rstest;

    use crate::domain::lawyer::{LawyerProfile, LicenceNumber, Specialty};
    use crate::domain::ports::MockLawyerDirectory;
    use crate::domain::user::{DisplayName, UserId};

    use super::*;

    #[rstest]
    #[tokio::test]
    async fn listing_passes_the_specialty_filter_through() {
        let mut directory = MockLawyerDirectory::new();
        directory
            .expect_list_verified()
            .withf(|specialty| *specialty == Some(Specialty::Family))
            .returning(|_| {
                Ok(vec![LawyerProfile {
                    user_id: UserId::random(),
                    display_name: DisplayName::new("Asha Nair").expect("valid"),
                    specialty: Specialty::Family,
                    licence_number: LicenceNumber::new("SRA-204411").expect("valid"),
                    verified: true,
                    created_at: Utc::now(),
                }])
            });
        let service = DirectoryService::new(Arc::new(directory));
        let listed = service
            .list_lawyers(ListLawyersRequest {
                specialty: Some(Specialty::Family),
            })
            .await
            .expect("listing succeeds");
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].specialty, Specialty::Family);
    }
}
