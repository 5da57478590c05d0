//! Canonical contact schema shared by the import engine, the store, and the API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::CoreError;

/// Store-assigned identity of a persisted contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContactId(pub i64);

impl std::fmt::Display for ContactId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Mirrors the `contacts.contact_type` CHECK constraint. Imports only ever
/// create leads; the other values belong to contacts edited elsewhere in the CRM.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactType {
    #[default]
    Lead,
    Customer,
}

impl ContactType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ContactType::Lead => "lead",
            ContactType::Customer => "customer",
        }
    }
}

impl std::fmt::Display for ContactType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mirrors the `contacts.contact_status` CHECK constraint; imports start at `New`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactStatus {
    #[default]
    New,
    Qualified,
    Active,
    Inactive,
}

impl ContactStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ContactStatus::New => "new",
            ContactStatus::Qualified => "qualified",
            ContactStatus::Active => "active",
            ContactStatus::Inactive => "inactive",
        }
    }
}

impl std::fmt::Display for ContactStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A field of the canonical contact schema that a source column can be mapped onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CanonicalField {
    FirstName,
    LastName,
    Email,
    Phone,
    Company,
    Position,
    Address,
    City,
    State,
    ZipCode,
    Country,
    EvmAddress,
    TwitterHandle,
    LinkedinProfile,
    TelegramUsername,
    DiscordUsername,
    GithubUsername,
    Website,
    Source,
    Notes,
}

impl CanonicalField {
    pub const ALL: [CanonicalField; 20] = [
        CanonicalField::FirstName,
        CanonicalField::LastName,
        CanonicalField::Email,
        CanonicalField::Phone,
        CanonicalField::Company,
        CanonicalField::Position,
        CanonicalField::Address,
        CanonicalField::City,
        CanonicalField::State,
        CanonicalField::ZipCode,
        CanonicalField::Country,
        CanonicalField::EvmAddress,
        CanonicalField::TwitterHandle,
        CanonicalField::LinkedinProfile,
        CanonicalField::TelegramUsername,
        CanonicalField::DiscordUsername,
        CanonicalField::GithubUsername,
        CanonicalField::Website,
        CanonicalField::Source,
        CanonicalField::Notes,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            CanonicalField::FirstName => "first_name",
            CanonicalField::LastName => "last_name",
            CanonicalField::Email => "email",
            CanonicalField::Phone => "phone",
            CanonicalField::Company => "company",
            CanonicalField::Position => "position",
            CanonicalField::Address => "address",
            CanonicalField::City => "city",
            CanonicalField::State => "state",
            CanonicalField::ZipCode => "zip_code",
            CanonicalField::Country => "country",
            CanonicalField::EvmAddress => "evm_address",
            CanonicalField::TwitterHandle => "twitter_handle",
            CanonicalField::LinkedinProfile => "linkedin_profile",
            CanonicalField::TelegramUsername => "telegram_username",
            CanonicalField::DiscordUsername => "discord_username",
            CanonicalField::GithubUsername => "github_username",
            CanonicalField::Website => "website",
            CanonicalField::Source => "source",
            CanonicalField::Notes => "notes",
        }
    }
}

impl std::fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CanonicalField {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CanonicalField::ALL
            .into_iter()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| CoreError::UnknownField(s.to_string()))
    }
}

/// Returns `true` only for an absent value or the empty string.
///
/// `"0"` and other falsy-looking strings are legal data.
#[must_use]
pub fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(str::is_empty)
}

/// A contact ready to be handed to the store.
///
/// Built fresh per imported row; the import engine never reads it back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactRecord {
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub position: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub country: Option<String>,
    pub evm_address: Option<String>,
    pub twitter_handle: Option<String>,
    pub linkedin_profile: Option<String>,
    pub telegram_username: Option<String>,
    pub discord_username: Option<String>,
    pub github_username: Option<String>,
    pub website: Option<String>,
    pub source: Option<String>,
    pub notes: Option<String>,
    pub contact_type: ContactType,
    pub contact_status: ContactStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ContactRecord {
    /// A record with only the required names set and system defaults applied.
    #[must_use]
    pub fn new(first_name: String, last_name: String, now: DateTime<Utc>) -> Self {
        Self {
            first_name,
            last_name,
            email: None,
            phone: None,
            company: None,
            position: None,
            address: None,
            city: None,
            state: None,
            zip_code: None,
            country: None,
            evm_address: None,
            twitter_handle: None,
            linkedin_profile: None,
            telegram_username: None,
            discord_username: None,
            github_username: None,
            website: None,
            source: None,
            notes: None,
            contact_type: ContactType::default(),
            contact_status: ContactStatus::default(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Sets an optional canonical field. Names are required and set through
    /// [`ContactRecord::new`], so `first_name`/`last_name` are ignored here.
    pub fn set_optional(&mut self, field: CanonicalField, value: Option<String>) {
        let slot = match field {
            CanonicalField::FirstName | CanonicalField::LastName => return,
            CanonicalField::Email => &mut self.email,
            CanonicalField::Phone => &mut self.phone,
            CanonicalField::Company => &mut self.company,
            CanonicalField::Position => &mut self.position,
            CanonicalField::Address => &mut self.address,
            CanonicalField::City => &mut self.city,
            CanonicalField::State => &mut self.state,
            CanonicalField::ZipCode => &mut self.zip_code,
            CanonicalField::Country => &mut self.country,
            CanonicalField::EvmAddress => &mut self.evm_address,
            CanonicalField::TwitterHandle => &mut self.twitter_handle,
            CanonicalField::LinkedinProfile => &mut self.linkedin_profile,
            CanonicalField::TelegramUsername => &mut self.telegram_username,
            CanonicalField::DiscordUsername => &mut self.discord_username,
            CanonicalField::GithubUsername => &mut self.github_username,
            CanonicalField::Website => &mut self.website,
            CanonicalField::Source => &mut self.source,
            CanonicalField::Notes => &mut self.notes,
        };
        *slot = value;
    }
}
