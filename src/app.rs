use crate::controller::{CrudController, CrudState, Mutation};
use crate::correlation::{Correlation, Renderer};
use crate::error::{AppError, NotFoundError};
use crate::form::WorkoutForm;
use crate::store::WorkoutStore;
use crate::workout::{Coords, Workout, WorkoutId};

/// Wires the store, the CRUD controller and the map/list correlation together
/// and routes user events through them, one at a time.
pub struct App<R: Renderer> {
    store: WorkoutStore,
    controller: CrudController,
    correlation: Correlation<R>,
    map_ready: bool,
}

impl<R: Renderer> App<R> {
    pub const fn new(store: WorkoutStore, renderer: R, zoom: u8) -> Self {
        Self {
            store,
            controller: CrudController::new(),
            correlation: Correlation::new(renderer, zoom),
            map_ready: false,
        }
    }

    /// The map finished loading around `coords`: centre it and draw every
    /// stored workout. Later calls only recentre.
    pub fn map_ready(&mut self, coords: Coords) {
        self.correlation.center(coords);
        if self.map_ready {
            return;
        }
        self.map_ready = true;
        self.correlation.rebuild(self.store.all());
        tracing::info!(workouts = self.store.len(), "map ready");
    }

    pub const fn is_map_ready(&self) -> bool {
        self.map_ready
    }

    pub const fn store(&self) -> &WorkoutStore {
        &self.store
    }

    pub const fn state(&self) -> &CrudState {
        self.controller.state()
    }

    pub const fn correlation(&self) -> &Correlation<R> {
        &self.correlation
    }

    pub const fn renderer(&self) -> &R {
        self.correlation.renderer()
    }

    pub fn into_renderer(self) -> R {
        self.correlation.into_renderer()
    }

    pub fn map_clicked(&mut self, coords: Coords) -> Result<(), AppError> {
        self.require_map()?;
        self.controller.map_clicked(coords);
        Ok(())
    }

    pub fn submit(&mut self, form: &WorkoutForm) -> Result<Mutation, AppError> {
        self.require_map()?;
        let mutation = self.controller.submit(&mut self.store, form)?;
        self.sync(&mutation);
        Ok(mutation)
    }

    /// The user picked an entry in the list: move the map to it.
    pub fn select(&mut self, id: &WorkoutId) -> Result<&Workout, AppError> {
        self.require_map()?;
        let index = self.store.click(id).inspect_err(|e| {
            tracing::error!(err = %e, "selected workout is not in the store");
        })?;
        self.controller.cancel();
        let workout = self
            .store
            .at(index)
            .ok_or_else(|| NotFoundError(id.clone()))?;
        self.correlation.focus(workout);
        Ok(workout)
    }

    /// Opens the form on `id`, pre-filled with its current values.
    pub fn edit(&mut self, id: &WorkoutId) -> Result<WorkoutForm, AppError> {
        self.require_map()?;
        Ok(self.controller.begin_edit(&self.store, id)?)
    }

    pub fn cancel(&mut self) {
        self.controller.cancel();
    }

    /// Returns whether the workout was deleted.
    pub fn delete(
        &mut self,
        id: &WorkoutId,
        confirm: impl FnOnce(&Workout) -> bool,
    ) -> Result<bool, AppError> {
        self.require_map()?;
        match self.controller.delete(&mut self.store, id, confirm)? {
            Some(mutation) => {
                self.sync(&mutation);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Forgets every workout, saved or not.
    pub fn reset(&mut self) {
        self.store.reset();
        self.controller.cancel();
        self.correlation.rebuild(self.store.all());
    }

    fn require_map(&self) -> Result<(), AppError> {
        if self.map_ready {
            Ok(())
        } else {
            Err(AppError::MapNotReady)
        }
    }

    fn sync(&mut self, mutation: &Mutation) {
        self.correlation.apply(mutation, self.store.all());
        if !self.correlation.is_aligned(self.store.all()) {
            tracing::error!(?mutation, "map/list drifted from the store; rebuilding");
            self.correlation.rebuild(self.store.all());
        }
    }
}
