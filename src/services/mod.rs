//! Operations behind the HTTP handlers. Each call runs in exactly one storage
//! transaction.

pub mod catalog;
pub mod ledger;
pub mod listing;
pub mod scheduler;

use crate::error::CinemaError;
use crate::store::StoreResult;

pub(crate) fn found<T>(
    result: StoreResult<Option<T>>,
    entity: &'static str,
    id: i64,
) -> Result<T, CinemaError> {
    result?.ok_or_else(|| CinemaError::not_found(entity, id))
}
