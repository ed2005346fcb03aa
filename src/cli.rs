use crate::config::DEFAULT_ZOOM;
use crate::form::{ActivityInput, WorkoutForm};
use crate::workout::{ActivityKind, Coords};
use anyhow::{Result, bail};
use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "mapty",
    about = "Log running and cycling workouts on the map, edit or delete them later"
)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Option<Cmd>,

    /// SQLite file holding the saved workouts.
    ///
    /// Default: <data dir>/mapty/workouts.db
    #[arg(long, env = "MAPTY_DB", global = true)]
    pub db: Option<PathBuf>,

    /// Map zoom level used when centring on a workout.
    #[arg(long, env = "MAPTY_ZOOM", default_value_t = DEFAULT_ZOOM, global = true,
          value_parser = clap::value_parser!(u8).range(0..=19))]
    pub zoom: u8,

    /// Where the map opens, as LAT,LNG.
    #[arg(long, env = "MAPTY_ORIGIN", default_value = "0,0", global = true,
          allow_hyphen_values = true)]
    pub origin: Coords,

    /// Increase log verbosity (-v, -vv). Defaults to INFO.
    #[arg(short = 'v', long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Decrease log verbosity (-q, -qq). Defaults to INFO.
    #[arg(short = 'q', long, action = ArgAction::Count, global = true)]
    pub quiet: u8,
}

#[derive(Subcommand, Debug)]
pub enum Cmd {
    /// Print every workout (the default).
    List,
    /// Click the map and log a new workout there.
    Add {
        #[command(subcommand)]
        workout: NewWorkout,
    },
    /// Edit a workout. Omitted fields keep their current values.
    Edit(EditArgs),
    /// Centre the map on a workout.
    Show { id: String },
    /// Delete a workout after confirmation.
    Delete {
        id: String,
        /// Do not ask for confirmation.
        #[arg(short = 'y', long)]
        yes: bool,
    },
    /// Delete every workout. Cannot be undone.
    Reset {
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

#[derive(Args, Debug, Clone, Copy)]
pub struct Position {
    #[arg(long, allow_negative_numbers = true)]
    pub lat: f64,
    #[arg(long, allow_negative_numbers = true)]
    pub lng: f64,
}

#[derive(Subcommand, Debug)]
pub enum NewWorkout {
    Running {
        #[command(flatten)]
        at: Position,
        /// km
        #[arg(long, allow_negative_numbers = true)]
        distance: f64,
        /// min
        #[arg(long, allow_negative_numbers = true)]
        duration: f64,
        /// steps/min
        #[arg(long, allow_negative_numbers = true)]
        cadence: f64,
    },
    Cycling {
        #[command(flatten)]
        at: Position,
        /// km
        #[arg(long, allow_negative_numbers = true)]
        distance: f64,
        /// min
        #[arg(long, allow_negative_numbers = true)]
        duration: f64,
        /// metres climbed
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        elevation: f64,
    },
}

impl NewWorkout {
    /// Where the map was clicked and what was typed into the form.
    pub fn into_parts(self) -> (Coords, WorkoutForm) {
        match self {
            Self::Running {
                at,
                distance,
                duration,
                cadence,
            } => (
                Coords::new(at.lat, at.lng),
                WorkoutForm::running(distance, duration, cadence),
            ),
            Self::Cycling {
                at,
                distance,
                duration,
                elevation,
            } => (
                Coords::new(at.lat, at.lng),
                WorkoutForm::cycling(distance, duration, elevation),
            ),
        }
    }
}

#[derive(Args, Debug, Default)]
pub struct EditArgs {
    pub id: String,
    /// Switch the workout to another type (running|cycling).
    #[arg(long = "type")]
    pub kind: Option<ActivityKind>,
    #[arg(long, allow_negative_numbers = true)]
    pub distance: Option<f64>,
    #[arg(long, allow_negative_numbers = true)]
    pub duration: Option<f64>,
    #[arg(long, allow_negative_numbers = true)]
    pub cadence: Option<f64>,
    #[arg(long, allow_negative_numbers = true)]
    pub elevation: Option<f64>,
}

impl EditArgs {
    /// Lays the given flags over the pre-filled form.
    pub fn merge(&self, current: WorkoutForm) -> Result<WorkoutForm> {
        let kind = self.kind.unwrap_or_else(|| current.kind());
        let activity = match (kind, current.activity) {
            (ActivityKind::Running, ActivityInput::Running { cadence }) => ActivityInput::Running {
                cadence: self.cadence.unwrap_or(cadence),
            },
            (ActivityKind::Cycling, ActivityInput::Cycling { elevation_gain }) => {
                ActivityInput::Cycling {
                    elevation_gain: self.elevation.unwrap_or(elevation_gain),
                }
            }
            (ActivityKind::Running, ActivityInput::Cycling { .. }) => {
                let Some(cadence) = self.cadence else {
                    bail!("switching a workout to running needs --cadence");
                };
                ActivityInput::Running { cadence }
            }
            (ActivityKind::Cycling, ActivityInput::Running { .. }) => ActivityInput::Cycling {
                elevation_gain: self.elevation.unwrap_or(0.0),
            },
        };
        Ok(WorkoutForm {
            distance: self.distance.unwrap_or(current.distance),
            duration: self.duration.unwrap_or(current.duration),
            activity,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_add_with_negative_longitude() {
        let cli = Cli::try_parse_from([
            "mapty", "add", "running", "--lat", "41.0", "--lng", "-8.0", "--distance", "5.2",
            "--duration", "24", "--cadence", "178",
        ])
        .unwrap();
        let Some(Cmd::Add { workout }) = cli.cmd else {
            panic!("expected add");
        };
        let (coords, form) = workout.into_parts();
        assert_eq!(coords, Coords::new(41.0, -8.0));
        assert_eq!(form, WorkoutForm::running(5.2, 24.0, 178.0));
        assert_eq!(cli.zoom, DEFAULT_ZOOM);
    }

    #[test]
    fn parses_global_origin() {
        let cli = Cli::try_parse_from(["mapty", "--origin", "-33.9,18.4", "list"]).unwrap();
        assert_eq!(cli.origin, Coords::new(-33.9, 18.4));
    }

    #[test]
    fn edit_keeps_unspecified_fields() {
        let args = EditArgs {
            distance: Some(10.0),
            ..EditArgs::default()
        };
        let merged = args.merge(WorkoutForm::running(5.0, 25.0, 170.0)).unwrap();
        assert_eq!(merged, WorkoutForm::running(10.0, 25.0, 170.0));
    }

    #[test]
    fn switching_to_running_requires_cadence() {
        let args = EditArgs {
            kind: Some(ActivityKind::Running),
            ..EditArgs::default()
        };
        assert!(args.merge(WorkoutForm::cycling(20.0, 60.0, 5.0)).is_err());

        let args = EditArgs {
            kind: Some(ActivityKind::Cycling),
            ..EditArgs::default()
        };
        assert_eq!(
            args.merge(WorkoutForm::running(5.0, 25.0, 170.0)).unwrap(),
            WorkoutForm::cycling(5.0, 25.0, 0.0)
        );
    }
}
