use crate::workout::WorkoutId;

/// A submitted numeric field that cannot become part of a workout.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} must be a finite number")]
    NotFinite { field: &'static str },
    #[error("{field} must be a positive number")]
    NotPositive { field: &'static str },
    #[error("{field} must not be negative")]
    Negative { field: &'static str },
    #[error("{field} is out of range for these inputs")]
    OutOfRange { field: &'static str },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("no workout with id {0}")]
pub struct NotFoundError(pub WorkoutId);

#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("persistence unavailable: {0}")]
    Unavailable(String),
    #[error("persistence unavailable: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("stored workouts are unreadable: {0}")]
    Corrupt(#[from] serde_json::Error),
    #[error("could not encode workouts for saving: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("workout {0} holds a non-finite number and cannot be saved")]
    NonFinite(WorkoutId),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CrudError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    NotFound(#[from] NotFoundError),
    #[error("no workout form is open; click the map or pick a workout to edit")]
    NothingPending,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Crud(#[from] CrudError),
    #[error("the map has not been loaded yet")]
    MapNotReady,
}

impl From<NotFoundError> for AppError {
    fn from(err: NotFoundError) -> Self {
        Self::Crud(CrudError::NotFound(err))
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        Self::Crud(CrudError::Validation(err))
    }
}
