use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;

use crate::{
    BodyPartID, Exercise, ExerciseID, LoggedSet, Plan, PlanDetails, RPE, Reps, SetID, SetLog,
    Weight, WorkoutLog,
};

/// Exercises and logged sets of the workout in progress.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkoutSession {
    pub body_part: BodyPartID,
    exercises: Vec<Exercise>,
    set_logs: BTreeMap<ExerciseID, Vec<SetLog>>,
    completed: BTreeSet<ExerciseID>,
    details: Option<PlanDetails>,
}

impl WorkoutSession {
    #[must_use]
    pub fn new(body_part: BodyPartID, exercises: Vec<Exercise>) -> Self {
        Self {
            body_part,
            exercises,
            set_logs: BTreeMap::new(),
            completed: BTreeSet::new(),
            details: None,
        }
    }

    #[must_use]
    pub fn from_plan(body_part: BodyPartID, plan: Plan) -> Self {
        Self {
            body_part,
            exercises: plan.exercises,
            set_logs: plan.set_logs,
            completed: BTreeSet::new(),
            details: Some(plan.details),
        }
    }

    #[must_use]
    pub fn exercises(&self) -> &[Exercise] {
        &self.exercises
    }

    #[must_use]
    pub fn exercise(&self, id: &ExerciseID) -> Option<&Exercise> {
        self.exercises.iter().find(|e| &e.id == id)
    }

    #[must_use]
    pub fn details(&self) -> Option<&PlanDetails> {
        self.details.as_ref()
    }

    #[must_use]
    pub fn sets(&self, id: &ExerciseID) -> &[SetLog] {
        self.set_logs.get(id).map(Vec::as_slice).unwrap_or_default()
    }

    #[must_use]
    pub fn is_completed(&self, id: &ExerciseID) -> bool {
        self.completed.contains(id)
    }

    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.completed.len()
    }

    /// Adds an exercise unless one with the same id or name is already part of the workout.
    pub fn add_exercise(&mut self, exercise: Exercise) -> bool {
        if self
            .exercises
            .iter()
            .any(|e| e.id == exercise.id || e.name == exercise.name)
        {
            return false;
        }
        self.exercises.push(exercise);
        true
    }

    pub fn remove_exercise(&mut self, id: &ExerciseID) -> Option<Exercise> {
        let index = self.exercises.iter().position(|e| &e.id == id)?;
        self.set_logs.remove(id);
        self.completed.remove(id);
        Some(self.exercises.remove(index))
    }

    pub fn mark_completed(&mut self, id: &ExerciseID) {
        self.completed.insert(id.clone());
    }

    /// Starts editing the sets of an exercise. Warm-ups cannot be edited.
    #[must_use]
    pub fn open_editor(&self, id: &ExerciseID) -> Option<SetEditor> {
        let exercise = self.exercise(id).filter(|e| !e.is_warmup())?;
        let sets = match self.set_logs.get(id) {
            Some(sets) if !sets.is_empty() => sets.clone(),
            _ => vec![SetLog::empty()],
        };
        Some(SetEditor {
            exercise: exercise.clone(),
            sets,
        })
    }

    /// Stores the edited sets, replacing the previous ones.
    pub fn close_editor(&mut self, editor: SetEditor, exit: EditorExit) {
        let id = editor.exercise.id;
        if exit == EditorExit::Save {
            self.completed.insert(id.clone());
        }
        self.set_logs.insert(id, editor.sets);
    }

    /// Converts the performed sets into persistable records.
    ///
    /// Warm-ups and exercises without a performed set are omitted. Set numbers follow the
    /// current order of the performed sets.
    #[must_use]
    pub fn records(&self, date: NaiveDate) -> Vec<WorkoutLog> {
        let defined = self.exercises.iter().map(|e| &e.id);
        let orphaned = self
            .set_logs
            .keys()
            .filter(|id| self.exercise(id).is_none());

        defined
            .chain(orphaned)
            .filter_map(|id| {
                let exercise = self.exercise(id);
                if exercise.is_some_and(Exercise::is_warmup) {
                    return None;
                }
                let sets = self
                    .sets(id)
                    .iter()
                    .filter(|set| set.is_performed())
                    .zip(1..)
                    .map(|(set, number)| LoggedSet {
                        set: number,
                        reps: set.reps,
                        weight: set.weight,
                        rpe: set.rpe,
                        note: set.note.clone(),
                    })
                    .collect::<Vec<_>>();
                if sets.is_empty() {
                    return None;
                }
                Some(WorkoutLog {
                    body_part: self.body_part,
                    exercise: exercise.map_or_else(|| id.to_string(), |e| e.name.clone()),
                    sets,
                    date,
                })
            })
            .collect()
    }

    /// Drops all logged sets, completion marks and plan details.
    pub fn clear(&mut self) {
        self.set_logs.clear();
        self.completed.clear();
        self.details = None;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorExit {
    Back,
    Save,
}

/// Working copy of the sets of one exercise.
#[derive(Debug, Clone, PartialEq)]
pub struct SetEditor {
    exercise: Exercise,
    sets: Vec<SetLog>,
}

impl SetEditor {
    #[must_use]
    pub fn exercise(&self) -> &Exercise {
        &self.exercise
    }

    #[must_use]
    pub fn sets(&self) -> &[SetLog] {
        &self.sets
    }

    /// Appends a set with the weight and reps of the last set.
    pub fn add_set(&mut self) -> SetID {
        let set = match self.sets.last() {
            Some(last) => SetLog::new(last.weight, last.reps),
            None => SetLog::empty(),
        };
        let id = set.id.clone();
        self.sets.push(set);
        id
    }

    pub fn remove_set(&mut self, id: &SetID) -> bool {
        let len = self.sets.len();
        self.sets.retain(|set| &set.id != id);
        self.sets.len() != len
    }

    pub fn move_set(&mut self, from: usize, to: usize) -> bool {
        if from >= self.sets.len() || to >= self.sets.len() {
            return false;
        }
        let set = self.sets.remove(from);
        self.sets.insert(to, set);
        true
    }

    pub fn set_weight(&mut self, id: &SetID, weight: Weight) -> bool {
        self.update(id, |set| set.weight = weight)
    }

    pub fn adjust_weight(&mut self, id: &SetID, delta: f32) -> bool {
        self.update(id, |set| set.weight = set.weight.adjust(delta))
    }

    pub fn set_reps(&mut self, id: &SetID, reps: Reps) -> bool {
        self.update(id, |set| set.reps = reps)
    }

    pub fn set_rpe(&mut self, id: &SetID, rpe: Option<RPE>) -> bool {
        self.update(id, |set| set.rpe = rpe)
    }

    pub fn set_note(&mut self, id: &SetID, note: &str) -> bool {
        let note = note.trim();
        self.update(id, |set| {
            set.note = if note.is_empty() {
                None
            } else {
                Some(note.to_string())
            };
        })
    }

    fn update(&mut self, id: &SetID, f: impl FnOnce(&mut SetLog)) -> bool {
        match self.sets.iter_mut().find(|set| &set.id == id) {
            Some(set) => {
                f(set);
                true
            }
            None => false,
        }
    }
}
