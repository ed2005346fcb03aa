use crate::dlog;
use crate::error::NotFoundError;
use crate::form::ValidForm;
use crate::persistence::Persistence;
use crate::workout::{Workout, WorkoutId};

/// The ordered workout collection. Every mutation is written through to
/// [`Persistence`] before the call returns.
pub struct WorkoutStore {
    workouts: Vec<Workout>,
    persistence: Persistence,
}

impl WorkoutStore {
    /// Restores the saved collection. Unavailable or unreadable storage
    /// starts the session empty.
    pub fn open(persistence: Persistence) -> Self {
        let workouts = match persistence.load() {
            Ok(w) => w,
            Err(e) => {
                tracing::warn!(err = %e, "could not load saved workouts; starting empty");
                Vec::new()
            }
        };
        tracing::info!(workouts = workouts.len(), "workout store ready");
        Self {
            workouts,
            persistence,
        }
    }

    pub fn all(&self) -> &[Workout] {
        &self.workouts
    }

    pub fn len(&self) -> usize {
        self.workouts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workouts.is_empty()
    }

    pub fn position(&self, id: &WorkoutId) -> Option<usize> {
        self.workouts.iter().position(|w| w.id() == id)
    }

    pub fn get(&self, id: &WorkoutId) -> Option<&Workout> {
        self.workouts.iter().find(|w| w.id() == id)
    }

    pub fn at(&self, index: usize) -> Option<&Workout> {
        self.workouts.get(index)
    }

    /// Appends `workout` and returns its index.
    pub fn create(&mut self, workout: Workout) -> usize {
        dlog!("store create id={} kind={}", workout.id(), workout.kind());
        self.workouts.push(workout);
        self.persist();
        self.workouts.len() - 1
    }

    /// Puts `workout` in the slot at `index` and returns what was there.
    pub fn replace(&mut self, index: usize, workout: Workout) -> Option<Workout> {
        let slot = self.workouts.get_mut(index)?;
        dlog!(
            "store replace index={index} old={} new={}",
            slot.id(),
            workout.id()
        );
        let old = std::mem::replace(slot, workout);
        self.persist();
        Some(old)
    }

    /// Rewrites the numeric fields of the entry at `index`, keeping its id
    /// and creation time. `None` if the index is out of range or `fields`
    /// are for the other activity type.
    pub fn update_in_place(&mut self, index: usize, fields: &ValidForm) -> Option<&Workout> {
        let workout = self.workouts.get_mut(index)?;
        if !workout.apply(fields) {
            return None;
        }
        dlog!("store update index={index} id={}", workout.id());
        self.persist();
        self.workouts.get(index)
    }

    /// Removes the entry with `id`, reporting where it was.
    pub fn remove_by_id(&mut self, id: &WorkoutId) -> Result<(usize, Workout), NotFoundError> {
        let index = self
            .position(id)
            .ok_or_else(|| NotFoundError(id.clone()))?;
        let removed = self.workouts.remove(index);
        dlog!("store remove index={index} id={id}");
        self.persist();
        Ok((index, removed))
    }

    /// Counts one user interaction with the entry.
    pub fn click(&mut self, id: &WorkoutId) -> Result<usize, NotFoundError> {
        let index = self
            .position(id)
            .ok_or_else(|| NotFoundError(id.clone()))?;
        self.workouts[index].click();
        self.persist();
        Ok(index)
    }

    /// Drops the saved key and the in-memory collection. No undo.
    pub fn reset(&mut self) {
        if let Err(e) = self.persistence.clear() {
            tracing::warn!(err = %e, "could not clear saved workouts");
        }
        let dropped = self.workouts.len();
        self.workouts.clear();
        tracing::info!(dropped, "workouts reset");
    }

    fn persist(&mut self) {
        if let Err(e) = self.persistence.save(&self.workouts) {
            tracing::warn!(err = %e, "saving workouts failed; keeping them in memory only");
        }
    }
}
