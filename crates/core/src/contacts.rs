//! Contact directory
//!
//! In-memory mapping between phone-number-like addresses and display
//! names. Persisted as a JSON array of `[number, name]` pairs: read once
//! at startup, fully rewritten at shutdown. Lookups are linear,
//! case-sensitive, by either field.

use std::fs;
use std::path::Path;

use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Directory seeded with this contact when no file exists.
const DEFAULT_CONTACT: (&str, &str) = ("5551234", "Alice");

/// One directory entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contact {
    pub number: String,
    pub name: String,
}

/// Ordered contact list with lookups by number or name.
#[derive(Debug, Clone, Default)]
pub struct ContactDirectory {
    contacts: Vec<Contact>,
}

impl ContactDirectory {
    /// Directory containing only the seeded default contact.
    pub fn seeded() -> Self {
        Self {
            contacts: vec![Contact {
                number: DEFAULT_CONTACT.0.to_string(),
                name: DEFAULT_CONTACT.1.to_string(),
            }],
        }
    }

    /// Load from a JSON file of `[number, name]` pairs.
    ///
    /// A missing or unreadable file never fails startup: it falls back
    /// to the seeded defaults.
    pub fn load(path: &Path) -> Self {
        match Self::try_load(path) {
            Ok(dir) => {
                debug!(path = %path.display(), count = dir.len(), "Loaded contacts");
                dir
            }
            Err(Error::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No contact file, seeding defaults");
                Self::seeded()
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Contact file unreadable, seeding defaults");
                Self::seeded()
            }
        }
    }

    fn try_load(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)?;
        let pairs: Vec<(String, String)> = serde_json::from_str(&data)?;
        Ok(Self {
            contacts: pairs
                .into_iter()
                .map(|(number, name)| Contact { number, name })
                .collect(),
        })
    }

    /// Write the full ordered directory back out.
    pub fn save(&self, path: &Path) -> Result<()> {
        let pairs: Vec<(&str, &str)> = self
            .contacts
            .iter()
            .map(|c| (c.number.as_str(), c.name.as_str()))
            .collect();
        let data = serde_json::to_string_pretty(&pairs)?;
        fs::write(path, data)?;
        debug!(path = %path.display(), count = self.len(), "Saved contacts");
        Ok(())
    }

    /// Append a contact. The number must be non-empty digits.
    ///
    /// Duplicates are permitted; the directory never checked uniqueness
    /// and existing setups rely on first-match lookups.
    pub fn add(&mut self, number: &str, name: &str) -> Result<()> {
        if number.is_empty() || !number.chars().all(|c| c.is_ascii_digit()) {
            return Err(Error::InvalidAddress(number.to_string()));
        }
        self.contacts.push(Contact {
            number: number.to_string(),
            name: name.to_string(),
        });
        Ok(())
    }

    /// Remove the first contact matching the target by number or name.
    pub fn remove(&mut self, target: &str) -> Option<Contact> {
        let idx = self
            .contacts
            .iter()
            .position(|c| c.number == target || c.name == target)?;
        Some(self.contacts.remove(idx))
    }

    /// Display name for an address, if present.
    pub fn lookup_by_number(&self, number: &str) -> Option<&str> {
        self.contacts
            .iter()
            .find(|c| c.number == number)
            .map(|c| c.name.as_str())
    }

    /// Address for a display name, if present.
    pub fn lookup_by_name(&self, name: &str) -> Option<&str> {
        self.contacts
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.number.as_str())
    }

    pub fn first(&self) -> Option<&Contact> {
        self.contacts.first()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Contact> {
        self.contacts.iter()
    }

    pub fn len(&self) -> usize {
        self.contacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }
}
