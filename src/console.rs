use crate::correlation::Renderer;
use crate::dlog;
use crate::workout::{Activity, Coords, Workout, WorkoutId};

/// Text surface for the CLI: markers become log lines, list rows become
/// printable strings.
#[derive(Debug, Default)]
pub struct ConsoleRenderer {
    next_marker: u64,
    open_popups: Vec<(u64, String)>,
    rows: Vec<String>,
    view: Option<(Coords, u8)>,
}

impl ConsoleRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows(&self) -> &[String] {
        &self.rows
    }

    pub const fn view(&self) -> Option<(Coords, u8)> {
        self.view
    }

    pub fn popups(&self) -> impl Iterator<Item = &str> {
        self.open_popups.iter().map(|(_, text)| text.as_str())
    }
}

impl Renderer for ConsoleRenderer {
    type Marker = u64;

    fn render_marker(&mut self, workout: &Workout) -> u64 {
        self.next_marker += 1;
        let label = workout.popup_label();
        dlog!(
            "marker {} at {} popup={label:?}",
            self.next_marker,
            workout.coords()
        );
        self.open_popups.push((self.next_marker, label));
        self.next_marker
    }

    fn refresh_popup(&mut self, marker: &mut u64, workout: &Workout) {
        if let Some(popup) = self.open_popups.iter_mut().find(|(m, _)| *m == *marker) {
            popup.1 = workout.popup_label();
        }
    }

    fn remove_marker(&mut self, marker: u64) {
        dlog!("marker {marker} removed");
        self.open_popups.retain(|(m, _)| *m != marker);
    }

    fn insert_row(&mut self, position: usize, workout: &Workout) {
        self.rows.insert(position, format_row(workout));
    }

    fn replace_row(&mut self, position: usize, workout: &Workout) {
        if let Some(row) = self.rows.get_mut(position) {
            *row = format_row(workout);
        }
    }

    fn remove_row(&mut self, position: usize, id: &WorkoutId) {
        if position < self.rows.len() {
            self.rows.remove(position);
        } else {
            tracing::warn!(position, id = %id, "no list row to remove");
        }
    }

    fn set_view(&mut self, center: Coords, zoom: u8) {
        dlog!("view centered on {center} zoom={zoom}");
        self.view = Some((center, zoom));
    }
}

/// One list row: id, title, then the detail fields with their units.
pub fn format_row(w: &Workout) -> String {
    let metric = w.metric();
    let extra = match *w.activity() {
        Activity::Running { cadence, .. } => format!("🦶🏼 {cadence} spm"),
        Activity::Cycling { elevation_gain, .. } => format!("⛰ {elevation_gain} m"),
    };
    format!(
        "{}  {:<20}  {} {} km  ⏱ {} min  ⚡️ {:.1} {}  {extra}",
        w.id(),
        w.description(),
        w.kind().icon(),
        w.distance(),
        w.duration(),
        metric.value,
        metric.unit,
    )
}
