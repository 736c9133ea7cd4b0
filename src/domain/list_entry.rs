use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The quantity state of one catalog item within one list.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ListEntry {
    /// Unique identifier of the entry.
    pub id: i32,
    /// Owning list identifier.
    pub list_id: i32,
    /// Referenced catalog item identifier.
    pub item_id: i32,
    /// Stock currently on hand.
    pub current_quantity: Decimal,
    /// Stock level below which a reorder is generated.
    pub minimum_quantity: Decimal,
    /// When true, a deficit orders exactly one `batch_size` unit instead of
    /// the numeric shortfall.
    pub uses_batch_threshold: bool,
    /// Quantity per reorder unit (e.g. one case); set when
    /// `uses_batch_threshold` is true.
    pub batch_size: Option<Decimal>,
    /// When quantities were last checked in for this entry.
    pub last_submitted_at: Option<NaiveDateTime>,
    /// Who last checked in quantities for this entry.
    pub last_submitted_by: Option<String>,
    /// Timestamp for when the record was created.
    pub created_at: NaiveDateTime,
    /// Timestamp for the last update to the record.
    pub updated_at: NaiveDateTime,
}

impl ListEntry {
    /// Quantity to reorder for this entry.
    ///
    /// Below the minimum, batch-threshold entries always request a single
    /// batch unit ("order one more case") regardless of the deficit size;
    /// other entries request the exact shortfall. At or above the minimum
    /// nothing is requested. Comparisons are exact decimal comparisons.
    pub fn compute_reorder(&self) -> Decimal {
        if self.current_quantity >= self.minimum_quantity {
            return Decimal::ZERO;
        }

        if self.uses_batch_threshold {
            self.batch_size.unwrap_or_default()
        } else {
            self.minimum_quantity - self.current_quantity
        }
    }
}

/// Minimum/batch configuration applied when creating or updating an entry.
/// Never carries the current quantity; that is only mutated by submissions.
#[derive(Debug, Clone)]
pub struct UpsertListEntry {
    /// Stock level below which a reorder is generated.
    pub minimum_quantity: Decimal,
    /// Whether reorders use the fixed batch policy.
    pub uses_batch_threshold: bool,
    /// Quantity per reorder unit; required when `uses_batch_threshold`.
    pub batch_size: Option<Decimal>,
    /// Timestamp captured when the payload was created.
    pub updated_at: NaiveDateTime,
}

impl UpsertListEntry {
    /// Build a plain minimum-threshold configuration.
    pub fn new(minimum_quantity: Decimal) -> Self {
        Self {
            minimum_quantity,
            uses_batch_threshold: false,
            batch_size: None,
            updated_at: chrono::Local::now().naive_utc(),
        }
    }

    /// Switch the entry to the fixed-batch reorder policy.
    pub fn with_batch_size(mut self, batch_size: Decimal) -> Self {
        self.uses_batch_threshold = true;
        self.batch_size = Some(batch_size);
        self
    }
}

/// One quantity check-in for a single entry within a submission batch.
#[derive(Debug, Clone)]
pub struct EntryEdit {
    /// Catalog item the edit refers to; together with the list this
    /// identifies the entry.
    pub item_id: i32,
    /// New on-hand quantity reported by the collaborator.
    pub new_current_quantity: Decimal,
}
