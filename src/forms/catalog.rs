use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::domain::catalog_item::{NewCatalogItem, normalize_name};
use crate::domain::list_entry::UpsertListEntry;

/// Maximum allowed length for a catalog item name.
const NAME_MAX_LEN: u64 = 128;

/// Maximum allowed length for a unit of measure.
const UNIT_MAX_LEN: u64 = 32;

/// Result type returned by the catalog form helpers.
pub type CatalogFormResult<T> = Result<T, CatalogFormError>;

/// Errors that can occur while processing catalog forms.
#[derive(Debug, Error)]
pub enum CatalogFormError {
    /// Validation failures from the `validator` crate.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),
    /// The provided name is empty after normalization.
    #[error("catalog item name cannot be empty")]
    EmptyName,
    /// A quantity field did not parse as a decimal number.
    #[error("invalid quantity `{value}` for `{field}`")]
    InvalidQuantity { field: &'static str, value: String },
    /// A quantity field is out of range.
    #[error("{field} must not be negative")]
    NegativeQuantity { field: &'static str },
    /// Batch mode requires a positive batch size.
    #[error("batch size must be a positive quantity when batch mode is enabled")]
    MissingBatchSize,
}

fn parse_quantity(field: &'static str, value: &str) -> CatalogFormResult<Decimal> {
    value
        .trim()
        .parse::<Decimal>()
        .map_err(|_| CatalogFormError::InvalidQuantity {
            field,
            value: value.to_string(),
        })
}

/// Form payload emitted when creating a catalog item.
#[derive(Debug, Deserialize, Validate)]
pub struct AddCatalogItemForm {
    /// Name entered by the user.
    #[validate(length(min = 1, max = NAME_MAX_LEN))]
    pub name: String,
    /// Optional unit of measure (e.g. `kg`, `case`).
    #[validate(length(max = UNIT_MAX_LEN))]
    pub unit: Option<String>,
}

impl AddCatalogItemForm {
    /// Validates and sanitizes the payload into a domain `NewCatalogItem`.
    pub fn into_new_catalog_item(self, hub_id: i32) -> CatalogFormResult<NewCatalogItem> {
        self.validate()?;

        if normalize_name(&self.name).is_empty() {
            return Err(CatalogFormError::EmptyName);
        }

        let mut new_item = NewCatalogItem::new(hub_id, self.name.trim());

        if let Some(unit) = self
            .unit
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
        {
            new_item = new_item.with_unit(unit);
        }

        Ok(new_item)
    }
}

/// Form payload configuring an item's threshold on a list.
#[derive(Debug, Deserialize, Validate)]
pub struct UpsertEntryForm {
    /// Stock level below which a reorder is generated.
    #[validate(length(min = 1))]
    pub minimum_quantity: String,
    /// Whether the fixed-batch reorder policy is used.
    #[serde(default)]
    pub uses_batch_threshold: bool,
    /// Quantity per reorder unit; required when batch mode is enabled.
    pub batch_size: Option<String>,
}

impl UpsertEntryForm {
    /// Validates and parses the payload into an entry configuration.
    pub fn into_config(self) -> CatalogFormResult<UpsertListEntry> {
        self.validate()?;

        let minimum = parse_quantity("minimum_quantity", &self.minimum_quantity)?;
        if minimum < Decimal::ZERO {
            return Err(CatalogFormError::NegativeQuantity {
                field: "minimum_quantity",
            });
        }

        let mut config = UpsertListEntry::new(minimum);

        if self.uses_batch_threshold {
            let batch_size = self
                .batch_size
                .as_deref()
                .map(|value| parse_quantity("batch_size", value))
                .transpose()?
                .filter(|value| *value > Decimal::ZERO)
                .ok_or(CatalogFormError::MissingBatchSize)?;

            config = config.with_batch_size(batch_size);
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_form_trims_name_and_unit() {
        let form = AddCatalogItemForm {
            name: "  Olive   Oil ".to_string(),
            unit: Some(" litre ".to_string()),
        };

        let new_item = form.into_new_catalog_item(7).expect("expected success");
        assert_eq!(new_item.hub_id, 7);
        assert_eq!(new_item.name, "Olive   Oil");
        assert_eq!(new_item.normalized_name, "olive oil");
        assert_eq!(new_item.unit.as_deref(), Some("litre"));
    }

    #[test]
    fn add_form_rejects_blank_name() {
        let form = AddCatalogItemForm {
            name: " ".to_string(),
            unit: None,
        };

        assert!(form.into_new_catalog_item(7).is_err());
    }

    #[test]
    fn upsert_form_parses_decimal_quantities() {
        let form = UpsertEntryForm {
            minimum_quantity: "4.5".to_string(),
            uses_batch_threshold: false,
            batch_size: None,
        };

        let config = form.into_config().expect("expected success");
        assert_eq!(config.minimum_quantity, Decimal::new(45, 1));
        assert!(!config.uses_batch_threshold);
        assert!(config.batch_size.is_none());
    }

    #[test]
    fn upsert_form_requires_batch_size_in_batch_mode() {
        let form = UpsertEntryForm {
            minimum_quantity: "6".to_string(),
            uses_batch_threshold: true,
            batch_size: None,
        };
        assert!(matches!(
            form.into_config(),
            Err(CatalogFormError::MissingBatchSize)
        ));

        let form = UpsertEntryForm {
            minimum_quantity: "6".to_string(),
            uses_batch_threshold: true,
            batch_size: Some("0".to_string()),
        };
        assert!(matches!(
            form.into_config(),
            Err(CatalogFormError::MissingBatchSize)
        ));
    }

    #[test]
    fn upsert_form_rejects_negative_minimum() {
        let form = UpsertEntryForm {
            minimum_quantity: "-1".to_string(),
            uses_batch_threshold: false,
            batch_size: None,
        };
        assert!(matches!(
            form.into_config(),
            Err(CatalogFormError::NegativeQuantity { .. })
        ));
    }
}
