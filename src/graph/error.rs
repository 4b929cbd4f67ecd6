use std::fmt;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Device,
    Profile,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Device => "device",
            Self::Profile => "profile",
        })
    }
}

/// Failure of a store operation. The store is left untouched whenever one is
/// returned.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    #[error("{kind} `{id}` not found")]
    NotFound { kind: EntityKind, id: String },
    #[error("{kind} `{id}` already exists")]
    DuplicateId { kind: EntityKind, id: String },
    #[error("invalid input: {0}")]
    Validation(String),
}

impl StoreError {
    pub fn device_not_found(id: &str) -> Self {
        Self::NotFound {
            kind: EntityKind::Device,
            id: id.to_string(),
        }
    }

    pub fn profile_not_found(id: &str) -> Self {
        Self::NotFound {
            kind: EntityKind::Profile,
            id: id.to_string(),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message_names_kind_and_id() {
        let err = StoreError::device_not_found("wap-9");
        assert_eq!(err.to_string(), "device `wap-9` not found");
        let err = StoreError::profile_not_found("roof");
        assert_eq!(err.to_string(), "profile `roof` not found");
    }
}
