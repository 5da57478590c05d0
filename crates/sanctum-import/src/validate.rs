use std::sync::LazyLock;

use regex::Regex;
use sanctum_core::{is_blank, CanonicalField};

use crate::error::ImportError;
use crate::mapping::PartialContact;

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+(?:\.[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+)*@(?:[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?\.)+[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?$",
    )
    .expect("valid email regex")
});

const MAX_EMAIL_LEN: usize = 254;
const MAX_LOCAL_PART_LEN: usize = 64;

/// `local@domain.tld`: dot-atom local part, at least one dot in the domain.
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    if email.len() > MAX_EMAIL_LEN {
        return false;
    }
    match email.split_once('@') {
        Some((local, _)) if local.len() <= MAX_LOCAL_PART_LEN => EMAIL.is_match(email),
        _ => false,
    }
}

/// Checks one mapped row, stopping at the first failure.
///
/// 1. A non-empty e-mail must be well formed.
/// 2. `first_name` and `last_name` must both be present.
///
/// # Errors
///
/// Returns [`ImportError::Format`] or [`ImportError::Validation`].
pub fn validate_contact(contact: &PartialContact) -> Result<(), ImportError> {
    let email = contact.get(CanonicalField::Email);
    if let Some(email) = email.filter(|e| !e.is_empty()) {
        if !is_valid_email(email) {
            return Err(ImportError::Format(email.to_string()));
        }
    }

    let missing: Vec<&'static str> = [CanonicalField::FirstName, CanonicalField::LastName]
        .into_iter()
        .filter(|field| is_blank(contact.get(*field)))
        .map(CanonicalField::as_str)
        .collect();
    if !missing.is_empty() {
        return Err(ImportError::Validation(missing));
    }

    Ok(())
}
