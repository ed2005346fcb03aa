use crate::error::ValidationError;
use crate::workout::{Activity, ActivityKind, Coords, Workout, pace, speed};

/// The type-specific input of the workout form.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ActivityInput {
    Running { cadence: f64 },
    Cycling { elevation_gain: f64 },
}

impl ActivityInput {
    pub const fn kind(&self) -> ActivityKind {
        match self {
            Self::Running { .. } => ActivityKind::Running,
            Self::Cycling { .. } => ActivityKind::Cycling,
        }
    }
}

/// Raw values as the user submitted them. Nothing is checked until
/// [`WorkoutForm::validate`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorkoutForm {
    pub distance: f64,
    pub duration: f64,
    pub activity: ActivityInput,
}

impl WorkoutForm {
    pub const fn running(distance: f64, duration: f64, cadence: f64) -> Self {
        Self {
            distance,
            duration,
            activity: ActivityInput::Running { cadence },
        }
    }

    pub const fn cycling(distance: f64, duration: f64, elevation_gain: f64) -> Self {
        Self {
            distance,
            duration,
            activity: ActivityInput::Cycling { elevation_gain },
        }
    }

    /// The form as it appears when editing `workout`.
    pub const fn prefilled(workout: &Workout) -> Self {
        let activity = match *workout.activity() {
            Activity::Running { cadence, .. } => ActivityInput::Running { cadence },
            Activity::Cycling { elevation_gain, .. } => ActivityInput::Cycling { elevation_gain },
        };
        Self {
            distance: workout.distance(),
            duration: workout.duration(),
            activity,
        }
    }

    pub const fn kind(&self) -> ActivityKind {
        self.activity.kind()
    }

    /// Every number must be finite. Distance, duration and cadence must be
    /// strictly positive; elevation gain may be zero. The derived pace or
    /// speed must come out finite too.
    pub fn validate(&self) -> Result<ValidForm, ValidationError> {
        positive("distance", self.distance)?;
        positive("duration", self.duration)?;
        match self.activity {
            ActivityInput::Running { cadence } => {
                positive("cadence", cadence)?;
                derived("pace", pace(self.distance, self.duration))?;
            }
            ActivityInput::Cycling { elevation_gain } => {
                finite("elevation gain", elevation_gain)?;
                if elevation_gain < 0.0 {
                    return Err(ValidationError::Negative {
                        field: "elevation gain",
                    });
                }
                derived("speed", speed(self.distance, self.duration))?;
            }
        }
        Ok(ValidForm(*self))
    }
}

fn finite(field: &'static str, v: f64) -> Result<(), ValidationError> {
    if v.is_finite() {
        Ok(())
    } else {
        Err(ValidationError::NotFinite { field })
    }
}

/// Extreme but finite inputs can still overflow the derived metric.
fn derived(field: &'static str, v: f64) -> Result<(), ValidationError> {
    if v.is_finite() {
        Ok(())
    } else {
        Err(ValidationError::OutOfRange { field })
    }
}

fn positive(field: &'static str, v: f64) -> Result<(), ValidationError> {
    finite(field, v)?;
    if v > 0.0 {
        Ok(())
    } else {
        Err(ValidationError::NotPositive { field })
    }
}

/// A form that passed validation. Only [`WorkoutForm::validate`] builds one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidForm(WorkoutForm);

impl ValidForm {
    pub const fn distance(&self) -> f64 {
        self.0.distance
    }

    pub const fn duration(&self) -> f64 {
        self.0.duration
    }

    pub const fn activity(&self) -> ActivityInput {
        self.0.activity
    }

    pub const fn kind(&self) -> ActivityKind {
        self.0.kind()
    }

    /// A brand-new workout at `coords` with a fresh id.
    pub fn build(&self, coords: Coords) -> Workout {
        match self.0.activity {
            ActivityInput::Running { cadence } => {
                Workout::running(coords, self.0.distance, self.0.duration, cadence)
            }
            ActivityInput::Cycling { elevation_gain } => {
                Workout::cycling(coords, self.0.distance, self.0.duration, elevation_gain)
            }
        }
    }
}
