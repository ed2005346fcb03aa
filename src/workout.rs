use crate::form::{ActivityInput, ValidForm};
use chrono::{DateTime, Datelike, Local, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicI64, Ordering};

/// Number of trailing timestamp digits kept in an id.
const ID_WIDTH: usize = 10;
const ID_MODULUS: i64 = 10_000_000_000;

/// Last millisecond value handed out as an id in this process.
static LAST_ID_MS: AtomicI64 = AtomicI64::new(i64::MIN);

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkoutId(String);

impl WorkoutId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Draws the id for a workout created at `at`: the creation time in
    /// milliseconds, cut to its last ten digits.
    ///
    /// Two workouts created within the same millisecond would collide, so the
    /// value is bumped past the last id issued by this process.
    fn issue(at: DateTime<Utc>) -> Self {
        let wanted = at.timestamp_millis();
        let prev = LAST_ID_MS
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |last| {
                Some(wanted.max(last.saturating_add(1)))
            })
            .unwrap_or_else(|last| last);
        let issued = wanted.max(prev.saturating_add(1));
        Self(format!(
            "{:0width$}",
            issued.rem_euclid(ID_MODULUS),
            width = ID_WIDTH
        ))
    }
}

impl fmt::Display for WorkoutId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for WorkoutId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for WorkoutId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A point on the map. Stored as a `[lat, lng]` pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Coords {
    pub lat: f64,
    pub lng: f64,
}

impl Coords {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn is_finite(self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }
}

impl From<[f64; 2]> for Coords {
    fn from([lat, lng]: [f64; 2]) -> Self {
        Self { lat, lng }
    }
}

impl From<Coords> for [f64; 2] {
    fn from(c: Coords) -> Self {
        [c.lat, c.lng]
    }
}

impl fmt::Display for Coords {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.5},{:.5}", self.lat, self.lng)
    }
}

impl FromStr for Coords {
    type Err = String;

    /// Parses `"lat,lng"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (lat, lng) = s
            .split_once(',')
            .ok_or_else(|| format!("expected LAT,LNG but got {s:?}"))?;
        let lat = lat
            .trim()
            .parse::<f64>()
            .map_err(|e| format!("bad latitude {lat:?}: {e}"))?;
        let lng = lng
            .trim()
            .parse::<f64>()
            .map_err(|e| format!("bad longitude {lng:?}: {e}"))?;
        Ok(Self { lat, lng })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    Running,
    Cycling,
}

impl ActivityKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Running => "Running",
            Self::Cycling => "Cycling",
        }
    }

    pub const fn icon(self) -> &'static str {
        match self {
            Self::Running => "🏃‍♂️",
            Self::Cycling => "🚴‍♀️",
        }
    }
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Running => f.write_str("running"),
            Self::Cycling => f.write_str("cycling"),
        }
    }
}

impl FromStr for ActivityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "running" | "run" => Ok(Self::Running),
            "cycling" | "ride" => Ok(Self::Cycling),
            other => Err(format!("unknown workout type {other:?} (running|cycling)")),
        }
    }
}

/// Variant-specific fields, each carrying its derived metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Activity {
    #[serde(rename_all = "camelCase")]
    Running {
        /// steps/min
        cadence: f64,
        /// min/km
        pace: f64,
    },
    #[serde(rename_all = "camelCase")]
    Cycling {
        /// metres
        elevation_gain: f64,
        /// km/h
        speed: f64,
    },
}

impl Activity {
    pub const fn kind(&self) -> ActivityKind {
        match self {
            Self::Running { .. } => ActivityKind::Running,
            Self::Cycling { .. } => ActivityKind::Cycling,
        }
    }
}

/// Derived performance figure of a workout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Metric {
    pub value: f64,
    pub unit: &'static str,
}

pub fn pace(distance: f64, duration: f64) -> f64 {
    duration / distance
}

pub fn speed(distance: f64, duration: f64) -> f64 {
    distance / (duration / 60.0)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workout {
    #[serde(rename = "date")]
    created_at: DateTime<Utc>,
    id: WorkoutId,
    #[serde(default)]
    clicks: u32,
    coords: Coords,
    /// km
    distance: f64,
    /// min
    duration: f64,
    description: String,
    #[serde(flatten)]
    activity: Activity,
}

impl Workout {
    pub fn running(coords: Coords, distance: f64, duration: f64, cadence: f64) -> Self {
        Self::running_at(Utc::now(), coords, distance, duration, cadence)
    }

    pub fn running_at(
        created_at: DateTime<Utc>,
        coords: Coords,
        distance: f64,
        duration: f64,
        cadence: f64,
    ) -> Self {
        let activity = Activity::Running {
            cadence,
            pace: pace(distance, duration),
        };
        Self::build(created_at, coords, distance, duration, activity)
    }

    pub fn cycling(coords: Coords, distance: f64, duration: f64, elevation_gain: f64) -> Self {
        Self::cycling_at(Utc::now(), coords, distance, duration, elevation_gain)
    }

    pub fn cycling_at(
        created_at: DateTime<Utc>,
        coords: Coords,
        distance: f64,
        duration: f64,
        elevation_gain: f64,
    ) -> Self {
        let activity = Activity::Cycling {
            elevation_gain,
            speed: speed(distance, duration),
        };
        Self::build(created_at, coords, distance, duration, activity)
    }

    fn build(
        created_at: DateTime<Utc>,
        coords: Coords,
        distance: f64,
        duration: f64,
        activity: Activity,
    ) -> Self {
        let description = describe(activity.kind(), created_at);
        Self {
            created_at,
            id: WorkoutId::issue(created_at),
            clicks: 0,
            coords,
            distance,
            duration,
            description,
            activity,
        }
    }

    pub const fn id(&self) -> &WorkoutId {
        &self.id
    }

    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub const fn coords(&self) -> Coords {
        self.coords
    }

    pub const fn distance(&self) -> f64 {
        self.distance
    }

    pub const fn duration(&self) -> f64 {
        self.duration
    }

    pub const fn clicks(&self) -> u32 {
        self.clicks
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub const fn activity(&self) -> &Activity {
        &self.activity
    }

    pub const fn kind(&self) -> ActivityKind {
        self.activity.kind()
    }

    pub const fn pace(&self) -> Option<f64> {
        match self.activity {
            Activity::Running { pace, .. } => Some(pace),
            Activity::Cycling { .. } => None,
        }
    }

    pub const fn speed(&self) -> Option<f64> {
        match self.activity {
            Activity::Cycling { speed, .. } => Some(speed),
            Activity::Running { .. } => None,
        }
    }

    pub const fn metric(&self) -> Metric {
        match self.activity {
            Activity::Running { pace, .. } => Metric {
                value: pace,
                unit: "min/km",
            },
            Activity::Cycling { speed, .. } => Metric {
                value: speed,
                unit: "km/h",
            },
        }
    }

    /// Whether every number in the record survives JSON, which has no
    /// encoding for NaN or infinity.
    pub fn is_finite(&self) -> bool {
        let (a, b) = match self.activity {
            Activity::Running { cadence, pace } => (cadence, pace),
            Activity::Cycling {
                elevation_gain,
                speed,
            } => (elevation_gain, speed),
        };
        self.coords.is_finite()
            && [self.distance, self.duration, a, b]
                .iter()
                .all(|v| v.is_finite())
    }

    /// Text shown in the marker popup.
    pub fn popup_label(&self) -> String {
        format!("{} {}", self.kind().icon(), self.description)
    }

    pub fn click(&mut self) {
        self.clicks = self.clicks.saturating_add(1);
    }

    /// Overwrites the numeric fields from an edit and recomputes the derived
    /// metric. `id`, `created_at`, `coords` and `description` stay put.
    ///
    /// Returns `false` without touching anything when `fields` belong to the
    /// other variant.
    pub(crate) fn apply(&mut self, fields: &ValidForm) -> bool {
        let distance = fields.distance();
        let duration = fields.duration();
        match (&mut self.activity, fields.activity()) {
            (Activity::Running { cadence, pace: p }, ActivityInput::Running { cadence: c }) => {
                *cadence = c;
                *p = pace(distance, duration);
            }
            (
                Activity::Cycling {
                    elevation_gain,
                    speed: s,
                },
                ActivityInput::Cycling { elevation_gain: e },
            ) => {
                *elevation_gain = e;
                *s = speed(distance, duration);
            }
            _ => return false,
        }
        self.distance = distance;
        self.duration = duration;
        true
    }
}

/// `"Running on May 2"`, in the local calendar.
fn describe(kind: ActivityKind, created_at: DateTime<Utc>) -> String {
    let local = created_at.with_timezone(&Local);
    format!("{} on {} {}", kind.label(), local.format("%B"), local.day())
}
