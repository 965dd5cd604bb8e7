// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Program templates (week/day/set grids) and assigning them to athletes.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Response,
    routing::{get, post},
    Extension, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use validator::Validate;

use crate::authz::can_manage_athlete;
use crate::db::StoreError;
use crate::error::{AppError, Result};
use crate::middleware::CurrentUser;
use crate::models::program::{build_week_view, resolve_week, MAX_DAYS, MAX_WEEKS};
use crate::models::{PrescribedSetInput, ProgramTemplate, TemplateInput, User};
use crate::render::{page, page_with_status, redirect_success, Flash};
use crate::routes::support::{
    ensure, fetch_athlete, or_not_found, parse_date_or_today, parse_optional_f64,
    parse_optional_i64, validation_message, Form,
};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/programs", get(list_templates).post(create_template))
        .route("/programs/new", get(new_template))
        .route("/programs/{id}", get(show_template).post(update_template))
        .route("/programs/{id}/delete", post(delete_template))
        .route("/programs/{id}/sets", post(add_set))
        .route("/programs/{id}/sets/{set_id}/delete", post(delete_set))
        .route("/athletes/{id}/program", post(assign_program))
        .route(
            "/athletes/{id}/program/{assignment_id}/deactivate",
            post(deactivate_program),
        )
}

#[derive(Debug, Deserialize)]
pub struct WeekParams {
    week: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct TemplateForm {
    #[validate(length(min = 1, max = 100, message = "is required (at most 100 characters)"))]
    #[serde(default)]
    name: String,
    #[validate(length(max = 2000, message = "must be at most 2000 characters"))]
    #[serde(default)]
    description: String,
    #[validate(range(min = 1, max = 52, message = "must be between 1 and 52"))]
    num_weeks: i64,
    #[validate(range(min = 1, max = 7, message = "must be between 1 and 7"))]
    num_days: i64,
}

impl Default for TemplateForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            num_weeks: 4,
            num_days: 3,
        }
    }
}

impl TemplateForm {
    fn from_template(template: &ProgramTemplate) -> Self {
        Self {
            name: template.name.clone(),
            description: template.description.clone(),
            num_weeks: template.num_weeks,
            num_days: template.num_days,
        }
    }

    /// Runs before validation so a blank name counts as missing.
    fn trim_fields(&mut self) {
        self.name = self.name.trim().to_string();
        self.description = self.description.trim().to_string();
    }

    fn to_input(&self) -> TemplateInput {
        TemplateInput {
            name: self.name.clone(),
            description: self.description.clone(),
            num_weeks: self.num_weeks,
            num_days: self.num_days,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SetForm {
    week: i64,
    day: i64,
    set_number: i64,
    exercise_id: i64,
    #[serde(default)]
    reps: String,
    #[serde(default)]
    percentage: String,
    #[serde(default)]
    notes: String,
}

#[derive(Debug, Deserialize)]
pub struct DeleteSetForm {
    #[serde(default)]
    week: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct AssignProgramForm {
    template_id: i64,
    #[serde(default)]
    start_date: String,
}

fn error_flash(message: String) -> Flash {
    Flash {
        error: Some(message),
        ..Flash::default()
    }
}

fn render_form(
    state: &AppState,
    user: &User,
    status: StatusCode,
    flash: &Flash,
    action: String,
    form: &TemplateForm,
) -> Result<Response> {
    page_with_status(
        state,
        status,
        Some(user),
        flash,
        "programs/form",
        json!({
            "action": action,
            "form": form,
            "max_weeks": MAX_WEEKS,
            "max_days": MAX_DAYS,
        }),
    )
}

/// The week grid for one template.
async fn render_template(
    state: &AppState,
    user: &User,
    template: &ProgramTemplate,
    week: i64,
    flash: &Flash,
    status: StatusCode,
) -> Result<Response> {
    let sets = state.db.list_prescribed_sets(template.id).await?;
    let view = build_week_view(template, &sets, week);
    let exercises = state.db.list_all_exercises().await?;

    page_with_status(
        state,
        status,
        Some(user),
        flash,
        "programs/show",
        json!({
            "template": template,
            "week_view": view,
            "total_sets": sets.len(),
            "exercises": exercises,
            "form": TemplateForm::from_template(template),
        }),
    )
}

async fn fetch_template(state: &AppState, id: i64) -> Result<ProgramTemplate> {
    state
        .db
        .get_template(id)
        .await
        .map_err(or_not_found("Program template"))
}

async fn list_templates(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Query(flash): Query<Flash>,
) -> Result<Response> {
    ensure(can_manage_athlete(&user))?;
    let templates = state.db.list_templates().await?;
    page(
        &state,
        Some(&user),
        &flash,
        "programs/index",
        json!({ "templates": templates }),
    )
}

async fn new_template(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<Response> {
    ensure(can_manage_athlete(&user))?;
    render_form(
        &state,
        &user,
        StatusCode::OK,
        &Flash::default(),
        "/programs".to_string(),
        &TemplateForm::default(),
    )
}

async fn create_template(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Form(mut form): Form<TemplateForm>,
) -> Result<Response> {
    ensure(can_manage_athlete(&user))?;
    let action = "/programs".to_string();
    form.trim_fields();

    if let Err(errors) = form.validate() {
        let flash = error_flash(validation_message(&errors));
        return render_form(&state, &user, StatusCode::UNPROCESSABLE_ENTITY, &flash, action, &form);
    }

    match state.db.create_template(&form.to_input()).await {
        Ok(template) => Ok(redirect_success(
            &format!("/programs/{}", template.id),
            "Program template created",
        )),
        Err(StoreError::DuplicateName) => {
            let flash = error_flash("A template with that name already exists".to_string());
            render_form(&state, &user, StatusCode::UNPROCESSABLE_ENTITY, &flash, action, &form)
        }
        Err(e) => Err(e.into()),
    }
}

/// `?week=` selects the week; missing or invalid means week 1, and values
/// outside the template are clamped.
async fn show_template(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Query(params): Query<WeekParams>,
    Query(flash): Query<Flash>,
) -> Result<Response> {
    let template = fetch_template(&state, id).await?;
    ensure(can_manage_athlete(&user))?;

    let week = resolve_week(params.week.as_deref(), template.num_weeks);
    render_template(&state, &user, &template, week, &flash, StatusCode::OK).await
}

async fn update_template(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Form(mut form): Form<TemplateForm>,
) -> Result<Response> {
    fetch_template(&state, id).await?;
    ensure(can_manage_athlete(&user))?;
    let action = format!("/programs/{id}");
    form.trim_fields();

    if let Err(errors) = form.validate() {
        let flash = error_flash(validation_message(&errors));
        return render_form(&state, &user, StatusCode::UNPROCESSABLE_ENTITY, &flash, action, &form);
    }

    let message = match state.db.update_template(id, &form.to_input()).await {
        Ok(_) => return Ok(redirect_success(&action, "Program template updated")),
        Err(StoreError::DuplicateName) => "A template with that name already exists",
        Err(StoreError::InUse) => "Some sets fall outside the new weeks or days; delete them first",
        Err(e) => return Err(e.into()),
    };
    let flash = error_flash(message.to_string());
    render_form(&state, &user, StatusCode::UNPROCESSABLE_ENTITY, &flash, action, &form)
}

/// Refused with 409 while any athlete has the template active.
async fn delete_template(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> Result<Response> {
    let template = fetch_template(&state, id).await?;
    ensure(can_manage_athlete(&user))?;

    match state.db.delete_template(id).await {
        Ok(()) => Ok(redirect_success(
            "/programs",
            &format!("Deleted {}", template.name),
        )),
        Err(StoreError::TemplateInUse) => Err(AppError::Conflict(format!(
            "{} is assigned to an athlete and cannot be deleted",
            template.name
        ))),
        Err(e) => Err(e.into()),
    }
}

/// Add a prescribed set to the grid. Coordinates outside the template and
/// taken set numbers re-show the week with 422.
async fn add_set(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Form(form): Form<SetForm>,
) -> Result<Response> {
    let template = fetch_template(&state, id).await?;
    ensure(can_manage_athlete(&user))?;

    let input = PrescribedSetInput {
        week: form.week,
        day: form.day,
        set_number: form.set_number,
        exercise_id: form.exercise_id,
        reps: parse_optional_i64(&form.reps, "Reps")?,
        percentage: parse_optional_f64(&form.percentage, "Percentage")?,
        notes: form.notes.trim().to_string(),
    };
    let shown_week = input.week.clamp(1, template.num_weeks);

    let problem = if !(1..=template.num_weeks).contains(&input.week) {
        Some(format!("Week must be between 1 and {}", template.num_weeks))
    } else if !(1..=template.num_days).contains(&input.day) {
        Some(format!("Day must be between 1 and {}", template.num_days))
    } else if input.set_number < 1 {
        Some("Set number must be at least 1".to_string())
    } else if input.reps.is_some_and(|r| r < 0) {
        Some("Reps cannot be negative".to_string())
    } else if input.percentage.is_some_and(|p| !(0.0..=200.0).contains(&p)) {
        Some("Percentage must be between 0 and 200".to_string())
    } else {
        None
    };

    let problem = match problem {
        Some(problem) => problem,
        None => match state.db.add_prescribed_set(id, &input).await {
            Ok(_) => {
                return Ok(redirect_success(
                    &format!("/programs/{id}?week={}", input.week),
                    "Set added",
                ))
            }
            Err(StoreError::DuplicateName) => format!(
                "Set {} already exists on week {} day {}",
                input.set_number, input.week, input.day
            ),
            Err(StoreError::NotFound) => return Err(AppError::not_found("Exercise")),
            Err(e) => return Err(e.into()),
        },
    };

    render_template(
        &state,
        &user,
        &template,
        shown_week,
        &error_flash(problem),
        StatusCode::UNPROCESSABLE_ENTITY,
    )
    .await
}

async fn delete_set(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path((id, set_id)): Path<(i64, i64)>,
    Form(form): Form<DeleteSetForm>,
) -> Result<Response> {
    fetch_template(&state, id).await?;
    ensure(can_manage_athlete(&user))?;

    state
        .db
        .delete_prescribed_set(id, set_id)
        .await
        .map_err(or_not_found("Prescribed set"))?;

    let back = match form.week {
        Some(week) => format!("/programs/{id}?week={week}"),
        None => format!("/programs/{id}"),
    };
    Ok(redirect_success(&back, "Set deleted"))
}

/// Start a program for an athlete. A second active program is a 409 and
/// leaves the current one in place.
async fn assign_program(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Form(form): Form<AssignProgramForm>,
) -> Result<Response> {
    fetch_athlete(&state, id).await?;
    ensure(can_manage_athlete(&user))?;

    let start_date = parse_date_or_today(&form.start_date)?;

    match state.db.assign_program(id, form.template_id, start_date).await {
        Ok(_) => Ok(redirect_success(&format!("/athletes/{id}"), "Program assigned")),
        Err(StoreError::AlreadyActive) => Err(AppError::Conflict(
            "Athlete already has an active program; end it first".to_string(),
        )),
        Err(StoreError::NotFound) => Err(AppError::not_found("Program template")),
        Err(e) => Err(e.into()),
    }
}

async fn deactivate_program(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path((id, assignment_id)): Path<(i64, i64)>,
) -> Result<Response> {
    fetch_athlete(&state, id).await?;
    ensure(can_manage_athlete(&user))?;

    state
        .db
        .deactivate_program(id, assignment_id)
        .await
        .map_err(or_not_found("Program assignment"))?;
    Ok(redirect_success(&format!("/athletes/{id}"), "Program ended"))
}
