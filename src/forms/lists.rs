use serde::Deserialize;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::domain::list::NewList;

/// Maximum allowed length for a list name.
const NAME_MAX_LEN: u64 = 128;

/// Result type returned by the list form helpers.
pub type ListFormResult<T> = Result<T, ListFormError>;

/// Errors that can occur while processing list forms.
#[derive(Debug, Error)]
pub enum ListFormError {
    /// Validation failures from the `validator` crate.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),
    /// The provided name is empty after trimming.
    #[error("list name cannot be empty")]
    EmptyName,
    /// A collaborator email is not plausibly an email address.
    #[error("invalid collaborator email `{value}`")]
    InvalidEmail { value: String },
}

/// Form payload emitted when creating a list.
#[derive(Debug, Deserialize, Validate)]
pub struct AddListForm {
    /// Name entered by the user.
    #[validate(length(min = 1, max = NAME_MAX_LEN))]
    pub name: String,
}

impl AddListForm {
    /// Validates and sanitizes the payload into a domain `NewList`.
    pub fn into_new_list(self, hub_id: i32) -> ListFormResult<NewList> {
        self.validate()?;

        let name = self.name.trim();
        if name.is_empty() {
            return Err(ListFormError::EmptyName);
        }

        Ok(NewList::new(hub_id, name))
    }
}

/// Form payload replacing the collaborators assigned to a list.
#[derive(Debug, Deserialize)]
pub struct SetCollaboratorsForm {
    /// Emails of the assigned collaborators.
    pub emails: Vec<String>,
}

impl SetCollaboratorsForm {
    /// Trims and deduplicates the emails, rejecting obviously malformed ones.
    pub fn into_emails(self) -> ListFormResult<Vec<String>> {
        let mut emails = Vec::with_capacity(self.emails.len());

        for email in self.emails {
            let email = email.trim().to_lowercase();
            if email.is_empty() {
                continue;
            }
            if !email.contains('@') {
                return Err(ListFormError::InvalidEmail { value: email });
            }
            if !emails.contains(&email) {
                emails.push(email);
            }
        }

        Ok(emails)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collaborators_are_trimmed_and_deduplicated() {
        let form = SetCollaboratorsForm {
            emails: vec![
                " Cook@example.com ".to_string(),
                "cook@example.com".to_string(),
                "".to_string(),
                "sous@example.com".to_string(),
            ],
        };

        let emails = form.into_emails().expect("expected success");
        assert_eq!(emails, vec!["cook@example.com", "sous@example.com"]);
    }

    #[test]
    fn malformed_email_is_rejected() {
        let form = SetCollaboratorsForm {
            emails: vec!["not-an-email".to_string()],
        };
        assert!(matches!(
            form.into_emails(),
            Err(ListFormError::InvalidEmail { .. })
        ));
    }
}
