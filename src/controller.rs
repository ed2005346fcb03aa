use crate::error::{CrudError, NotFoundError, ValidationError};
use crate::form::WorkoutForm;
use crate::store::WorkoutStore;
use crate::workout::{Coords, Workout, WorkoutId};

/// What the workout form is currently for.
#[derive(Debug, Clone, PartialEq)]
pub enum CrudState {
    /// Form hidden.
    Idle,
    /// Map clicked at `coords`; a submit creates a workout there.
    PendingCreate { coords: Coords },
    /// Editing the workout with id `selected`.
    PendingUpdate { selected: WorkoutId },
}

/// A change applied to the store, with the index the store reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    Created { index: usize },
    /// Same activity type; id and marker kept.
    Updated { index: usize },
    /// Activity type changed; a new record with a new id sits at `index`.
    Replaced { index: usize, previous: WorkoutId },
    Removed { index: usize, id: WorkoutId },
}

impl Mutation {
    pub const fn index(&self) -> usize {
        match self {
            Self::Created { index }
            | Self::Updated { index }
            | Self::Replaced { index, .. }
            | Self::Removed { index, .. } => *index,
        }
    }
}

#[derive(Debug)]
pub struct CrudController {
    state: CrudState,
}

impl Default for CrudController {
    fn default() -> Self {
        Self::new()
    }
}

impl CrudController {
    pub const fn new() -> Self {
        Self {
            state: CrudState::Idle,
        }
    }

    pub const fn state(&self) -> &CrudState {
        &self.state
    }

    /// A click on the map always starts a fresh create, dropping any edit.
    pub fn map_clicked(&mut self, coords: Coords) {
        self.state = CrudState::PendingCreate { coords };
    }

    /// Selects `id` for editing and returns the form pre-filled from it.
    pub fn begin_edit(
        &mut self,
        store: &WorkoutStore,
        id: &WorkoutId,
    ) -> Result<WorkoutForm, CrudError> {
        let Some(workout) = store.get(id) else {
            tracing::error!(id = %id, "edit requested for unknown workout");
            return Err(NotFoundError(id.clone()).into());
        };
        let form = WorkoutForm::prefilled(workout);
        self.state = CrudState::PendingUpdate {
            selected: id.clone(),
        };
        Ok(form)
    }

    pub fn cancel(&mut self) {
        self.state = CrudState::Idle;
    }

    /// Creates or edits depending on the current state.
    ///
    /// A form that fails validation leaves both the state and the store
    /// untouched.
    pub fn submit(
        &mut self,
        store: &mut WorkoutStore,
        form: &WorkoutForm,
    ) -> Result<Mutation, CrudError> {
        let fields = match &self.state {
            CrudState::Idle => return Err(CrudError::NothingPending),
            CrudState::PendingCreate { coords } => {
                if !coords.is_finite() {
                    return Err(ValidationError::NotFinite {
                        field: "coordinates",
                    }
                    .into());
                }
                form.validate()?
            }
            CrudState::PendingUpdate { .. } => form.validate()?,
        };

        let mutation = match std::mem::replace(&mut self.state, CrudState::Idle) {
            CrudState::Idle => return Err(CrudError::NothingPending),
            CrudState::PendingCreate { coords } => {
                let workout = fields.build(coords);
                tracing::info!(id = %workout.id(), kind = %workout.kind(), "workout created");
                Mutation::Created {
                    index: store.create(workout),
                }
            }
            CrudState::PendingUpdate { selected } => {
                let Some((index, existing)) = store
                    .position(&selected)
                    .and_then(|i| store.at(i).map(|w| (i, w)))
                else {
                    tracing::error!(id = %selected, "selected workout vanished before the edit was saved");
                    return Err(NotFoundError(selected).into());
                };

                if existing.kind() == fields.kind() {
                    if store.update_in_place(index, &fields).is_none() {
                        tracing::error!(id = %selected, index, "in-place edit rejected by the store");
                        return Err(NotFoundError(selected).into());
                    }
                    tracing::info!(id = %selected, "workout updated");
                    Mutation::Updated { index }
                } else {
                    let replacement = fields.build(existing.coords());
                    tracing::info!(
                        old = %selected,
                        new = %replacement.id(),
                        kind = %replacement.kind(),
                        "workout type changed; record replaced"
                    );
                    if store.replace(index, replacement).is_none() {
                        return Err(NotFoundError(selected).into());
                    }
                    Mutation::Replaced {
                        index,
                        previous: selected,
                    }
                }
            }
        };
        Ok(mutation)
    }

    /// Deletes `id` once `confirm` agrees. Returns `Ok(None)` when the user
    /// declines, in which case nothing changes.
    pub fn delete(
        &mut self,
        store: &mut WorkoutStore,
        id: &WorkoutId,
        confirm: impl FnOnce(&Workout) -> bool,
    ) -> Result<Option<Mutation>, CrudError> {
        let Some(workout) = store.get(id) else {
            tracing::error!(id = %id, "delete requested for unknown workout");
            return Err(NotFoundError(id.clone()).into());
        };
        if !confirm(workout) {
            tracing::info!(id = %id, "delete cancelled");
            return Ok(None);
        }

        let (index, _removed) = store.remove_by_id(id)?;
        self.state = CrudState::Idle;
        tracing::info!(id = %id, index, "workout deleted");
        Ok(Some(Mutation::Removed {
            index,
            id: id.clone(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::{MemoryStore, Persistence};
    use crate::workout::ActivityKind;

    fn here() -> Coords {
        Coords::new(41.0, -8.0)
    }

    fn setup() -> (CrudController, WorkoutStore) {
        (
            CrudController::new(),
            WorkoutStore::open(Persistence::new(MemoryStore::new())),
        )
    }

    fn create(c: &mut CrudController, store: &mut WorkoutStore, form: WorkoutForm) -> WorkoutId {
        c.map_clicked(here());
        let m = c.submit(store, &form).unwrap();
        store.at(m.index()).unwrap().id().clone()
    }

    #[test]
    fn submit_without_open_form_is_rejected() {
        let (mut c, mut store) = setup();
        assert_eq!(
            c.submit(&mut store, &WorkoutForm::running(5.0, 25.0, 170.0)),
            Err(CrudError::NothingPending)
        );
        assert!(store.is_empty());
    }

    #[test]
    fn create_goes_back_to_idle() {
        let (mut c, mut store) = setup();
        c.map_clicked(here());
        assert_eq!(c.state(), &CrudState::PendingCreate { coords: here() });
        let m = c
            .submit(&mut store, &WorkoutForm::running(5.2, 24.0, 178.0))
            .unwrap();
        assert_eq!(m, Mutation::Created { index: 0 });
        assert_eq!(c.state(), &CrudState::Idle);
        assert_eq!(store.all()[0].coords(), here());
    }

    #[test]
    fn invalid_submit_keeps_state_and_store() {
        let (mut c, mut store) = setup();
        c.map_clicked(here());
        let err = c
            .submit(&mut store, &WorkoutForm::running(-3.0, 24.0, 178.0))
            .unwrap_err();
        assert_eq!(
            err,
            CrudError::Validation(ValidationError::NotPositive { field: "distance" })
        );
        assert!(store.is_empty());
        assert_eq!(c.state(), &CrudState::PendingCreate { coords: here() });
    }

    #[test]
    fn non_finite_map_click_is_rejected() {
        let (mut c, mut store) = setup();
        let nowhere = Coords::new(f64::NAN, 0.0);
        c.map_clicked(nowhere);
        assert_eq!(
            c.submit(&mut store, &WorkoutForm::running(5.0, 25.0, 170.0)),
            Err(CrudError::Validation(ValidationError::NotFinite {
                field: "coordinates"
            }))
        );
        assert!(store.is_empty());
        assert!(matches!(c.state(), CrudState::PendingCreate { .. }));
    }

    #[test]
    fn overflowing_speed_never_reaches_the_store() {
        let (mut c, mut store) = setup();
        c.map_clicked(here());
        assert_eq!(
            c.submit(&mut store, &WorkoutForm::cycling(1e308, 1e-10, 0.0)),
            Err(CrudError::Validation(ValidationError::OutOfRange {
                field: "speed"
            }))
        );
        assert!(store.is_empty());
        assert_eq!(c.state(), &CrudState::PendingCreate { coords: here() });
    }

    #[test]
    fn edit_same_type_updates_in_place() {
        let (mut c, mut store) = setup();
        let id = create(&mut c, &mut store, WorkoutForm::running(5.0, 25.0, 170.0));

        let form = c.begin_edit(&store, &id).unwrap();
        assert_eq!(form, WorkoutForm::running(5.0, 25.0, 170.0));
        assert_eq!(
            c.state(),
            &CrudState::PendingUpdate {
                selected: id.clone()
            }
        );

        let m = c
            .submit(&mut store, &WorkoutForm { distance: 10.0, ..form })
            .unwrap();
        assert_eq!(m, Mutation::Updated { index: 0 });
        assert_eq!(store.all()[0].id(), &id);
        assert_eq!(store.all()[0].pace(), Some(2.5));
        assert_eq!(c.state(), &CrudState::Idle);
    }

    #[test]
    fn edit_to_other_type_replaces_record_at_same_coords() {
        let (mut c, mut store) = setup();
        create(&mut c, &mut store, WorkoutForm::cycling(20.0, 60.0, 10.0));
        let id = create(&mut c, &mut store, WorkoutForm::running(5.0, 25.0, 170.0));

        c.begin_edit(&store, &id).unwrap();
        let m = c
            .submit(&mut store, &WorkoutForm::cycling(12.0, 40.0, 80.0))
            .unwrap();
        assert_eq!(
            m,
            Mutation::Replaced {
                index: 1,
                previous: id.clone()
            }
        );
        let replaced = &store.all()[1];
        assert_ne!(replaced.id(), &id);
        assert_eq!(replaced.kind(), ActivityKind::Cycling);
        assert_eq!(replaced.coords(), here());
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn invalid_edit_stays_pending() {
        let (mut c, mut store) = setup();
        let id = create(&mut c, &mut store, WorkoutForm::running(5.0, 25.0, 170.0));
        c.begin_edit(&store, &id).unwrap();
        assert!(c
            .submit(&mut store, &WorkoutForm::running(5.0, f64::NAN, 170.0))
            .is_err());
        assert_eq!(c.state(), &CrudState::PendingUpdate { selected: id });
        assert_eq!(store.all()[0].duration(), 25.0);
    }

    #[test]
    fn map_click_abandons_an_edit() {
        let (mut c, mut store) = setup();
        let id = create(&mut c, &mut store, WorkoutForm::running(5.0, 25.0, 170.0));
        c.begin_edit(&store, &id).unwrap();
        c.map_clicked(Coords::new(1.0, 2.0));
        let m = c
            .submit(&mut store, &WorkoutForm::running(1.0, 5.0, 160.0))
            .unwrap();
        assert_eq!(m, Mutation::Created { index: 1 });
    }

    #[test]
    fn declined_delete_changes_nothing() {
        let (mut c, mut store) = setup();
        let id = create(&mut c, &mut store, WorkoutForm::running(5.0, 25.0, 170.0));
        c.begin_edit(&store, &id).unwrap();
        assert_eq!(c.delete(&mut store, &id, |_| false), Ok(None));
        assert_eq!(store.len(), 1);
        assert_eq!(c.state(), &CrudState::PendingUpdate { selected: id });
    }

    #[test]
    fn confirmed_delete_cancels_pending_edit() {
        let (mut c, mut store) = setup();
        let first = create(&mut c, &mut store, WorkoutForm::running(5.0, 25.0, 170.0));
        create(&mut c, &mut store, WorkoutForm::cycling(20.0, 60.0, 10.0));
        c.begin_edit(&store, &first).unwrap();

        let m = c.delete(&mut store, &first, |_| true).unwrap();
        assert_eq!(
            m,
            Some(Mutation::Removed {
                index: 0,
                id: first.clone()
            })
        );
        assert_eq!(c.state(), &CrudState::Idle);
        assert_eq!(store.len(), 1);
        assert!(store.get(&first).is_none());
    }

    #[test]
    fn unknown_ids_are_not_found() {
        let (mut c, mut store) = setup();
        let ghost = WorkoutId::from("9999999999");
        assert!(matches!(
            c.begin_edit(&store, &ghost),
            Err(CrudError::NotFound(_))
        ));
        assert!(matches!(
            c.delete(&mut store, &ghost, |_| true),
            Err(CrudError::NotFound(_))
        ));
    }

    #[test]
    fn edit_of_vanished_workout_resets_to_idle() {
        let (mut c, mut store) = setup();
        let id = create(&mut c, &mut store, WorkoutForm::running(5.0, 25.0, 170.0));
        c.begin_edit(&store, &id).unwrap();
        store.remove_by_id(&id).unwrap();
        assert_eq!(
            c.submit(&mut store, &WorkoutForm::running(1.0, 5.0, 160.0)),
            Err(CrudError::NotFound(NotFoundError(id)))
        );
        assert_eq!(c.state(), &CrudState::Idle);
    }
}
