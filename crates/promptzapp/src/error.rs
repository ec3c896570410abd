use thiserror::Error;

/// Coarse classification of a [`PromptzError`], for callers that need to branch
/// on the failure without inspecting messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    DuplicateCategory,
    ReservedName,
    InvalidName,
    ProtectedCategory,
    ProtectedOperation,
    NotFound,
    InvalidTarget,
    Validation,
    Persistence,
}

#[derive(Error, Debug)]
pub enum PromptzError {
    #[error("Category already exists: {0}")]
    DuplicateCategory(String),

    #[error("Reserved category name: {0}")]
    ReservedName(String),

    #[error("Invalid name: {0}")]
    InvalidName(String),

    #[error("Category is protected: {0}")]
    ProtectedCategory(String),

    #[error("Operation not allowed: {0}")]
    ProtectedOperation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid target: {0}")]
    InvalidTarget(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl PromptzError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PromptzError::DuplicateCategory(_) => ErrorKind::DuplicateCategory,
            PromptzError::ReservedName(_) => ErrorKind::ReservedName,
            PromptzError::InvalidName(_) => ErrorKind::InvalidName,
            PromptzError::ProtectedCategory(_) => ErrorKind::ProtectedCategory,
            PromptzError::ProtectedOperation(_) => ErrorKind::ProtectedOperation,
            PromptzError::NotFound(_) => ErrorKind::NotFound,
            PromptzError::InvalidTarget(_) => ErrorKind::InvalidTarget,
            PromptzError::Validation(_) => ErrorKind::Validation,
            PromptzError::Persistence(_)
            | PromptzError::Io(_)
            | PromptzError::Serialization(_) => ErrorKind::Persistence,
        }
    }
}

pub type Result<T> = std::result::Result<T, PromptzError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_and_serialization_are_persistence_failures() {
        let io = PromptzError::from(std::io::Error::other("disk gone"));
        assert_eq!(io.kind(), ErrorKind::Persistence);

        let serde_err = serde_json::from_str::<u32>("nope").unwrap_err();
        assert_eq!(
            PromptzError::from(serde_err).kind(),
            ErrorKind::Persistence
        );
    }

    #[test]
    fn messages_name_the_offending_value() {
        let err = PromptzError::DuplicateCategory("art/sketch".into());
        assert_eq!(err.to_string(), "Category already exists: art/sketch");
    }
}
