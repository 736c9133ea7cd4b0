use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;

use crate::domain::list_entry::EntryEdit;

/// Result type returned by the submission form helpers.
pub type SubmissionFormResult<T> = Result<T, SubmissionFormError>;

/// Errors that can occur while processing a stock check-in payload.
#[derive(Debug, Error)]
pub enum SubmissionFormError {
    /// A quantity did not parse as a decimal number.
    #[error("invalid quantity `{value}` for item {item_id}")]
    InvalidQuantity { item_id: i32, value: String },
    /// A quantity was negative.
    #[error("quantity for item {item_id} must not be negative")]
    NegativeQuantity { item_id: i32 },
    /// The same item appeared more than once in the batch.
    #[error("item {item_id} appears more than once in the batch")]
    DuplicateItem { item_id: i32 },
}

/// One counted quantity in a stock check-in.
#[derive(Debug, Deserialize)]
pub struct StockEntryForm {
    /// Catalog item the count refers to.
    pub item_id: i32,
    /// Counted on-hand quantity, as entered.
    pub quantity: String,
}

/// Form payload for a collaborator's batch stock check-in on one list.
#[derive(Debug, Deserialize)]
pub struct SubmitStockForm {
    /// Counted quantities, one per item.
    pub entries: Vec<StockEntryForm>,
}

impl SubmitStockForm {
    /// Parses and validates the counted quantities into entry edits.
    ///
    /// An empty batch is allowed; it records the check-in without touching
    /// any entry.
    pub fn into_edits(self) -> SubmissionFormResult<Vec<EntryEdit>> {
        let mut edits: Vec<EntryEdit> = Vec::with_capacity(self.entries.len());

        for entry in self.entries {
            if edits.iter().any(|edit| edit.item_id == entry.item_id) {
                return Err(SubmissionFormError::DuplicateItem {
                    item_id: entry.item_id,
                });
            }

            let quantity = entry.quantity.trim().parse::<Decimal>().map_err(|_| {
                SubmissionFormError::InvalidQuantity {
                    item_id: entry.item_id,
                    value: entry.quantity.clone(),
                }
            })?;

            if quantity < Decimal::ZERO {
                return Err(SubmissionFormError::NegativeQuantity {
                    item_id: entry.item_id,
                });
            }

            edits.push(EntryEdit {
                item_id: entry.item_id,
                new_current_quantity: quantity,
            });
        }

        Ok(edits)
    }
}
