//! Keeps the store, the map markers and the list rows in lockstep.
//!
//! The three sequences share one ordering: position `i` in each refers to the
//! same workout id. Every change arrives as a [`Mutation`] carrying the index
//! the store reported, and that index is used as-is on the visual side.

use crate::controller::Mutation;
use crate::workout::{Coords, Workout, WorkoutId};

/// Outbound drawing commands. Implemented by whatever shows the map and list.
pub trait Renderer {
    /// Handle for a marker that is on the map.
    type Marker;

    /// Places a marker at the workout's coords with its popup open.
    fn render_marker(&mut self, workout: &Workout) -> Self::Marker;
    fn refresh_popup(&mut self, marker: &mut Self::Marker, workout: &Workout);
    fn remove_marker(&mut self, marker: Self::Marker);

    fn insert_row(&mut self, position: usize, workout: &Workout);
    fn replace_row(&mut self, position: usize, workout: &Workout);
    fn remove_row(&mut self, position: usize, id: &WorkoutId);

    fn set_view(&mut self, center: Coords, zoom: u8);
}

struct MarkerEntry<M> {
    id: WorkoutId,
    handle: M,
}

pub struct Correlation<R: Renderer> {
    renderer: R,
    markers: Vec<MarkerEntry<R::Marker>>,
    rows: Vec<WorkoutId>,
    zoom: u8,
}

impl<R: Renderer> Correlation<R> {
    pub const fn new(renderer: R, zoom: u8) -> Self {
        Self {
            renderer,
            markers: Vec::new(),
            rows: Vec::new(),
            zoom,
        }
    }

    pub const fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn into_renderer(self) -> R {
        self.renderer
    }

    pub fn marker_ids(&self) -> impl Iterator<Item = &WorkoutId> {
        self.markers.iter().map(|m| &m.id)
    }

    pub fn row_ids(&self) -> &[WorkoutId] {
        &self.rows
    }

    /// Mirrors one store mutation. `all` is the store contents after it.
    pub fn apply(&mut self, mutation: &Mutation, all: &[Workout]) {
        match mutation {
            Mutation::Created { index } => {
                let Some(workout) = all.get(*index) else {
                    return self.drift("created index out of range", all);
                };
                let handle = self.renderer.render_marker(workout);
                self.markers.push(MarkerEntry {
                    id: workout.id().clone(),
                    handle,
                });
                self.renderer.insert_row(self.rows.len(), workout);
                self.rows.push(workout.id().clone());
            }
            Mutation::Updated { index } => {
                let (Some(workout), Some(entry)) = (all.get(*index), self.markers.get_mut(*index))
                else {
                    return self.drift("updated index out of range", all);
                };
                if entry.id != *workout.id() {
                    return self.drift("updated id does not match marker", all);
                }
                self.renderer.refresh_popup(&mut entry.handle, workout);
                self.renderer.replace_row(*index, workout);
            }
            Mutation::Replaced { index, previous } => {
                let Some(workout) = all.get(*index) else {
                    return self.drift("replaced index out of range", all);
                };
                if self.markers.get(*index).map(|m| &m.id) != Some(previous) {
                    return self.drift("replaced id does not match marker", all);
                }
                let handle = self.renderer.render_marker(workout);
                let old = std::mem::replace(
                    &mut self.markers[*index],
                    MarkerEntry {
                        id: workout.id().clone(),
                        handle,
                    },
                );
                self.renderer.remove_marker(old.handle);
                self.renderer.replace_row(*index, workout);
                self.rows[*index] = workout.id().clone();
            }
            Mutation::Removed { index, id } => {
                if self.markers.get(*index).map(|m| &m.id) != Some(id)
                    || self.rows.get(*index) != Some(id)
                {
                    return self.drift("removed id does not match marker", all);
                }
                let entry = self.markers.remove(*index);
                self.renderer.remove_marker(entry.handle);
                self.rows.remove(*index);
                self.renderer.remove_row(*index, id);
            }
        }
    }

    /// Tears every marker and row down, then re-adds them in store order.
    pub fn rebuild(&mut self, all: &[Workout]) {
        for entry in self.markers.drain(..) {
            self.renderer.remove_marker(entry.handle);
        }
        while let Some(id) = self.rows.pop() {
            self.renderer.remove_row(self.rows.len(), &id);
        }
        for (i, workout) in all.iter().enumerate() {
            let handle = self.renderer.render_marker(workout);
            self.markers.push(MarkerEntry {
                id: workout.id().clone(),
                handle,
            });
            self.renderer.insert_row(i, workout);
            self.rows.push(workout.id().clone());
        }
        tracing::debug!(workouts = all.len(), "map and list rebuilt");
    }

    /// Centres the map on `workout`.
    pub fn focus(&mut self, workout: &Workout) {
        self.renderer.set_view(workout.coords(), self.zoom);
    }

    pub fn center(&mut self, coords: Coords) {
        self.renderer.set_view(coords, self.zoom);
    }

    /// Same length and the same id at every position in all three sequences.
    pub fn is_aligned(&self, all: &[Workout]) -> bool {
        all.len() == self.markers.len()
            && all.len() == self.rows.len()
            && all
                .iter()
                .zip(&self.markers)
                .zip(&self.rows)
                .all(|((w, m), r)| w.id() == &m.id && w.id() == r)
    }

    fn drift(&mut self, what: &str, all: &[Workout]) {
        tracing::error!(what, "map/list out of step with the store; rebuilding");
        self.rebuild(all);
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Records the visible state the way a map and a list would hold it.
    #[derive(Default)]
    pub(crate) struct Recorder {
        pub next: u32,
        pub markers: Vec<(u32, WorkoutId, String)>,
        pub rows: Vec<WorkoutId>,
        pub view: Option<(Coords, u8)>,
        pub popup_refreshes: usize,
    }

    impl Renderer for Recorder {
        type Marker = u32;

        fn render_marker(&mut self, workout: &Workout) -> u32 {
            self.next += 1;
            self.markers
                .push((self.next, workout.id().clone(), workout.popup_label()));
            self.next
        }

        fn refresh_popup(&mut self, marker: &mut u32, workout: &Workout) {
            self.popup_refreshes += 1;
            if let Some(m) = self.markers.iter_mut().find(|m| m.0 == *marker) {
                m.2 = workout.popup_label();
            }
        }

        fn remove_marker(&mut self, marker: u32) {
            self.markers.retain(|m| m.0 != marker);
        }

        fn insert_row(&mut self, position: usize, workout: &Workout) {
            self.rows.insert(position, workout.id().clone());
        }

        fn replace_row(&mut self, position: usize, workout: &Workout) {
            self.rows[position] = workout.id().clone();
        }

        fn remove_row(&mut self, position: usize, id: &WorkoutId) {
            assert_eq!(&self.rows[position], id);
            self.rows.remove(position);
        }

        fn set_view(&mut self, center: Coords, zoom: u8) {
            self.view = Some((center, zoom));
        }
    }

    fn at(lat: f64) -> Workout {
        Workout::running(Coords::new(lat, 0.0), 5.0, 25.0, 170.0)
    }

    #[test]
    fn create_and_remove_use_the_reported_index() {
        let mut c = Correlation::new(Recorder::default(), 13);
        let mut all = vec![at(1.0), at(2.0), at(3.0)];
        for i in 0..all.len() {
            c.apply(&Mutation::Created { index: i }, &all[..=i]);
        }
        assert!(c.is_aligned(&all));

        let gone = all.remove(1);
        c.apply(
            &Mutation::Removed {
                index: 1,
                id: gone.id().clone(),
            },
            &all,
        );
        assert!(c.is_aligned(&all));
        assert_eq!(c.renderer().markers.len(), 2);
        assert_eq!(c.renderer().rows, vec![all[0].id().clone(), all[1].id().clone()]);
    }

    #[test]
    fn replace_swaps_marker_in_the_same_slot() {
        let mut c = Correlation::new(Recorder::default(), 13);
        let mut all = vec![at(1.0), at(2.0)];
        c.rebuild(&all);

        let previous = all[0].id().clone();
        all[0] = Workout::cycling(Coords::new(1.0, 0.0), 20.0, 60.0, 10.0);
        c.apply(&Mutation::Replaced { index: 0, previous: previous.clone() }, &all);

        assert!(c.is_aligned(&all));
        let r = c.renderer();
        assert!(r.markers.iter().all(|m| m.1 != previous));
        assert!(r.markers.iter().any(|m| m.1 == *all[0].id()));
        assert_eq!(r.rows[0], *all[0].id());
    }

    #[test]
    fn update_refreshes_row_and_popup() {
        let mut c = Correlation::new(Recorder::default(), 13);
        let all = vec![at(1.0)];
        c.rebuild(&all);
        c.apply(&Mutation::Updated { index: 0 }, &all);
        assert_eq!(c.renderer().popup_refreshes, 1);
        assert!(c.is_aligned(&all));
    }

    #[test]
    fn mismatched_index_falls_back_to_rebuild() {
        let mut c = Correlation::new(Recorder::default(), 13);
        let mut all = vec![at(1.0), at(2.0)];
        c.rebuild(&all);
        let gone = all.remove(0);
        // Wrong index for this id.
        c.apply(&Mutation::Removed { index: 1, id: gone.id().clone() }, &all);
        assert!(c.is_aligned(&all));
        assert_eq!(c.renderer().markers.len(), 1);
    }

    #[test]
    fn rebuild_replaces_everything() {
        let mut c = Correlation::new(Recorder::default(), 13);
        c.rebuild(&[at(1.0), at(2.0)]);
        let fresh = vec![at(3.0)];
        c.rebuild(&fresh);
        assert!(c.is_aligned(&fresh));
        assert_eq!(c.renderer().markers.len(), 1);
        assert_eq!(c.renderer().rows.len(), 1);
    }

    #[test]
    fn focus_uses_configured_zoom() {
        let mut c = Correlation::new(Recorder::default(), 15);
        let w = at(4.0);
        c.focus(&w);
        assert_eq!(c.renderer().view, Some((w.coords(), 15)));
    }
}
