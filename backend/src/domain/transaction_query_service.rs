//! Transaction listing service.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::ports::{
    TransactionListing, TransactionQuery, TransactionRepository, TransactionRepositoryError,
};
use crate::domain::{DoctorId, Error, PatientId};

/// Query service implementing [`TransactionQuery`].
#[derive(Clone)]
pub struct TransactionQueryService<T> {
    transactions: Arc<T>,
}

impl<T> TransactionQueryService<T> {
    /// Create a service over `transactions`.
    pub fn new(transactions: Arc<T>) -> Self {
        Self { transactions }
    }
}

fn map_repository_error(error: TransactionRepositoryError) -> Error {
    match error {
        TransactionRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("transaction repository unavailable: {message}"))
        }
        TransactionRepositoryError::Query { message } => {
            Error::internal(format!("transaction repository error: {message}"))
        }
    }
}

#[async_trait]
impl<T> TransactionQuery for TransactionQueryService<T>
where
    T: TransactionRepository,
{
    async fn patient_transactions(
        &self,
        patient_id: PatientId,
    ) -> Result<Vec<TransactionListing>, Error> {
        self.transactions
            .list_for_patient(&patient_id)
            .await
            .map_err(map_repository_error)
    }

    async fn doctor_transactions(
        &self,
        doctor_id: DoctorId,
    ) -> Result<Vec<TransactionListing>, Error> {
        self.transactions
            .list_for_doctor(&doctor_id)
            .await
            .map_err(map_repository_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::MockTransactionRepository;
    use rstest::rstest;

    #[rstest]
    #[case(TransactionRepositoryError::connection("refused"), ErrorCode::ServiceUnavailable)]
    #[case(TransactionRepositoryError::query("bad row"), ErrorCode::InternalError)]
    #[tokio::test]
    async fn repository_failures_are_classified(
        #[case] failure: TransactionRepositoryError,
        #[case] expected: ErrorCode,
    ) {
        let mut repo = MockTransactionRepository::new();
        repo.expect_list_for_doctor()
            .return_once(move |_| Err(failure));
        let service = TransactionQueryService::new(Arc::new(repo));

        let err = service
            .doctor_transactions(DoctorId::random())
            .await
            .expect_err("repository failed");
        assert_eq!(err.code(), expected);
    }

    #[tokio::test]
    async fn patient_view_is_scoped_to_the_caller() {
        let patient_id = PatientId::random();
        let mut repo = MockTransactionRepository::new();
        repo.expect_list_for_patient()
            .withf(move |id| *id == patient_id)
            .times(1)
            .return_once(|_| Ok(Vec::new()));
        let service = TransactionQueryService::new(Arc::new(repo));

        let listings = service
            .patient_transactions(patient_id)
            .await
            .expect("listing succeeds");
        assert!(listings.is_empty());
    }
}
