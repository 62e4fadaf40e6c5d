use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Not found")]
    NotFound,

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Storage backend error: {0}")]
    Backend(String),

    #[error("Unknown stored value: {0}")]
    UnknownValue(String),
}

pub type Result<T> = std::result::Result<T, StorageError>;

impl StorageError {
    pub fn is_unique_violation(&self) -> bool {
        match self {
            StorageError::Database(sqlx::Error::Database(e)) => {
                e.code().as_deref() == Some("23505")
            }
            StorageError::ConstraintViolation(_) => true,
            _ => false,
        }
    }
}

/// Coarse classification of [`CoachingError`].
///
/// Callers use the kind to decide between a client-facing rejection and a
/// server-side failure without matching on every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidTarget,
    AlreadyApproved,
    UserMustReinitiate,
    UndefinedState,
    NoSuchRequest,
    NoActivePartnership,
    NoPartnershipRights,
    NoAccess,
    NotFound,
    InvalidWorkout,
    EmailTaken,
    Conflict,
    Internal,
}

impl ErrorKind {
    /// True when the caller can correct the request; false for server-side failures.
    pub fn is_client_error(self) -> bool {
        !matches!(
            self,
            ErrorKind::UndefinedState | ErrorKind::Conflict | ErrorKind::Internal
        )
    }
}

/// Business-rule and persistence failures raised by the coaching services.
#[derive(Debug, Error)]
pub enum CoachingError {
    #[error("Account {0} does not have the required role")]
    InvalidTarget(i64),

    #[error("There is already an approved partnership with this trainer")]
    AlreadyApproved,

    #[error("Partnership {partnership_id} was ended by the user and can only be resumed by a request from the user")]
    UserMustReinitiate { partnership_id: i64 },

    #[error("Undefined partnership status: {0}")]
    UndefinedState(String),

    #[error("No pending request to handle")]
    NoSuchRequest,

    #[error("No approved partnership")]
    NoActivePartnership,

    #[error("No rights to manage workouts of this user")]
    NoPartnershipRights,

    #[error("No access to this workout")]
    NoAccess,

    #[error("Not found")]
    NotFound,

    #[error("Invalid workout: {0}")]
    InvalidWorkout(&'static str),

    #[error("Email {0} has already been reserved")]
    EmailTaken(String),

    #[error("Partnership of trainer {trainer_id} and user {user_id} kept changing concurrently")]
    Conflict { trainer_id: i64, user_id: i64 },

    #[error(transparent)]
    Internal(StorageError),
}

impl CoachingError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidTarget(_) => ErrorKind::InvalidTarget,
            Self::AlreadyApproved => ErrorKind::AlreadyApproved,
            Self::UserMustReinitiate { .. } => ErrorKind::UserMustReinitiate,
            Self::UndefinedState(_) => ErrorKind::UndefinedState,
            Self::NoSuchRequest => ErrorKind::NoSuchRequest,
            Self::NoActivePartnership => ErrorKind::NoActivePartnership,
            Self::NoPartnershipRights => ErrorKind::NoPartnershipRights,
            Self::NoAccess => ErrorKind::NoAccess,
            Self::NotFound => ErrorKind::NotFound,
            Self::InvalidWorkout(_) => ErrorKind::InvalidWorkout,
            Self::EmailTaken(_) => ErrorKind::EmailTaken,
            Self::Conflict { .. } => ErrorKind::Conflict,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }

    pub fn is_client_error(&self) -> bool {
        self.kind().is_client_error()
    }

    /// Partnership id attached to the failure, if any.
    pub fn partnership_id(&self) -> Option<i64> {
        match self {
            Self::UserMustReinitiate { partnership_id } => Some(*partnership_id),
            _ => None,
        }
    }
}

impl From<StorageError> for CoachingError {
    fn from(error: StorageError) -> Self {
        match error {
            StorageError::NotFound => Self::NotFound,
            StorageError::UnknownValue(value) => Self::UndefinedState(value),
            other => Self::Internal(other),
        }
    }
}

pub type CoachingResult<T> = std::result::Result<T, CoachingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_business_rules_are_client_errors() {
        assert!(CoachingError::AlreadyApproved.is_client_error());
        assert!(CoachingError::NoSuchRequest.is_client_error());
        assert!(CoachingError::NoAccess.is_client_error());
        assert!(CoachingError::UserMustReinitiate { partnership_id: 3 }.is_client_error());
        assert!(CoachingError::InvalidTarget(7).is_client_error());
    }

    #[test]
    fn test_server_side_failures() {
        assert!(!CoachingError::UndefinedState("paused".into()).is_client_error());
        assert!(
            !CoachingError::Conflict {
                trainer_id: 1,
                user_id: 2
            }
            .is_client_error()
        );
        assert!(!CoachingError::from(StorageError::Backend("down".into())).is_client_error());
    }

    #[test]
    fn test_storage_not_found_maps_to_not_found_kind() {
        let err = CoachingError::from(StorageError::NotFound);
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_reinitiate_carries_partnership_id() {
        let err = CoachingError::UserMustReinitiate { partnership_id: 42 };
        assert_eq!(err.partnership_id(), Some(42));
        assert_eq!(CoachingError::NoAccess.partnership_id(), None);
    }
}
