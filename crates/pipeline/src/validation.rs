//! `MintConfig` validation, run before any ledger call.

use std::collections::HashSet;

use crate::error::ValidationError;
use crate::types::{Edition, MintConfig};

impl MintConfig {
    /// Checks the configuration.
    ///
    /// Name and description must be non-blank, royalties within `0..=100`,
    /// fixed editions positive, and attributes complete with unique names.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }
        if self.description.trim().is_empty() {
            return Err(ValidationError::EmptyDescription);
        }
        if !(0..=100).contains(&self.royalties) {
            return Err(ValidationError::RoyaltyOutOfRange(self.royalties));
        }
        if self.edition == Edition::Fixed(0) {
            return Err(ValidationError::ZeroEditions);
        }

        let mut seen = HashSet::new();
        for (i, attr) in self.attributes.iter().enumerate() {
            if attr.name.trim().is_empty() || attr.value.trim().is_empty() {
                return Err(ValidationError::IncompleteAttribute(i));
            }
            if !seen.insert(attr.name.as_str()) {
                return Err(ValidationError::DuplicateAttribute(attr.name.clone()));
            }
        }
        Ok(())
    }
}
