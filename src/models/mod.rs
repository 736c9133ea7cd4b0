use rust_decimal::Decimal;

use crate::repository::errors::{RepositoryError, RepositoryResult};

pub mod catalog_item;
pub mod list;
pub mod list_entry;
pub mod purchase_request;
pub mod submission;

/// Serialize a quantity for storage in a TEXT column.
pub(crate) fn quantity_to_db(value: Decimal) -> String {
    value.normalize().to_string()
}

/// Parse a quantity read back from a TEXT column.
pub(crate) fn quantity_from_db(value: &str) -> RepositoryResult<Decimal> {
    value
        .parse::<Decimal>()
        .map_err(|err| RepositoryError::Conversion(format!("invalid quantity `{value}`: {err}")))
}
