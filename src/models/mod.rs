// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod accessory;
pub mod assignment;
pub mod athlete;
pub mod exercise;
pub mod program;
pub mod user;
pub mod workout;

pub use accessory::{AccessoryPlan, AccessoryPlanInput, DayGroup};
pub use assignment::{AssignedAthlete, Assignment};
pub use athlete::{Athlete, AthleteInput, Tier};
pub use exercise::{Equipment, EquipmentLink, EquipmentSplit, Exercise, ExerciseInput};
pub use program::{
    PrescribedSet, PrescribedSetInput, ProgramAssignment, ProgramTemplate, TemplateInput, WeekView,
};
pub use user::{NewUser, User};
pub use workout::{
    HistoryEntry, ReviewStatus, Workout, WorkoutReview, WorkoutSet, WorkoutSetInput,
    WorkoutSummary,
};
