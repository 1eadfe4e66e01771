//! Task API endpoints
//!
//! RESTful API for task CRUD operations plus the dashboard preview.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Deserializer, Serialize};

use flow_core::employee::AccessLevel;
use flow_core::task::{
    Deadline, NewTask, Task, TaskFilter, TaskUpdate, TaskWithAssignee, DEFAULT_UPCOMING_LIMIT,
};

use super::error::{bad_request, forbidden, map_auth_error, map_core_error, required_text, RouteError};
use crate::auth::{ensure_access, Caller};
use crate::state::AppState;

const MAX_UPCOMING_LIMIT: usize = 50;

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Debug, Deserialize)]
struct CreateTaskRequest {
    #[serde(rename = "titulo")]
    title: String,
    #[serde(default, rename = "descricao")]
    description: Option<String>,
    #[serde(rename = "prazo")]
    deadline: String,
    #[serde(default, rename = "concluida")]
    completed: bool,
    #[serde(default, rename = "empregado_id")]
    assigned_employee_id: Option<i64>,
}

/// Partial update; `descricao` and `empregado_id` accept `null` to clear
#[derive(Debug, Deserialize)]
struct UpdateTaskRequest {
    #[serde(default, rename = "titulo")]
    title: Option<String>,
    #[serde(default, rename = "descricao", deserialize_with = "double_option")]
    description: Option<Option<String>>,
    #[serde(default, rename = "prazo")]
    deadline: Option<String>,
    #[serde(default, rename = "concluida")]
    completed: Option<bool>,
    #[serde(default, rename = "empregado_id", deserialize_with = "double_option")]
    assigned_employee_id: Option<Option<i64>>,
}

#[derive(Debug, Deserialize)]
struct ListTasksQuery {
    #[serde(default)]
    empregado_id: Option<i64>,
    #[serde(default)]
    concluida: Option<bool>,
    #[serde(default)]
    offset: Option<u32>,
    #[serde(default)]
    limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct UpcomingQuery {
    #[serde(default)]
    limite: Option<usize>,
}

#[derive(Debug, Serialize)]
struct TaskResponse {
    id: i64,
    #[serde(rename = "titulo")]
    title: String,
    #[serde(rename = "descricao")]
    description: Option<String>,
    #[serde(rename = "prazo")]
    deadline: Deadline,
    #[serde(rename = "concluida")]
    completed: bool,
    #[serde(rename = "empregado_id")]
    assigned_employee_id: Option<i64>,
}

#[derive(Debug, Serialize)]
struct TaskListItem {
    #[serde(flatten)]
    task: TaskResponse,
    #[serde(rename = "empregado_nome")]
    assignee_name: String,
}

impl From<Task> for TaskResponse {
    fn from(task: Task) -> Self {
        Self {
            id: task.id,
            title: task.title,
            description: task.description,
            deadline: task.deadline,
            completed: task.completed,
            assigned_employee_id: task.assigned_employee_id,
        }
    }
}

impl From<TaskWithAssignee> for TaskListItem {
    fn from(item: TaskWithAssignee) -> Self {
        let assignee_name = item.assignee_label().to_string();
        Self {
            task: TaskResponse::from(item.task),
            assignee_name,
        }
    }
}

fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn parse_deadline(raw: &str) -> Result<Deadline, RouteError> {
    Deadline::parse(raw).map_err(map_core_error)
}

fn list_items(tasks: Vec<TaskWithAssignee>) -> Json<Vec<TaskListItem>> {
    Json(tasks.into_iter().map(TaskListItem::from).collect())
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /tarefas/ - users only ever see their own tasks
async fn list_tasks(
    State(state): State<AppState>,
    caller: Caller,
    Query(query): Query<ListTasksQuery>,
) -> Result<Json<Vec<TaskListItem>>, RouteError> {
    let assignee = match (caller.restricted_to(), query.empregado_id) {
        (Some(own_id), Some(requested)) if requested != own_id => {
            return Err(forbidden("cannot list tasks of another employee"));
        }
        (Some(own_id), _) => Some(own_id),
        (None, requested) => requested,
    };

    let filter = TaskFilter {
        assigned_employee_id: assignee,
        completed: query.concluida,
        offset: query.offset,
        limit: query.limit,
    };
    let tasks = state.tasks().list(filter).await.map_err(map_core_error)?;
    Ok(list_items(tasks))
}

/// GET /tarefas/proximas - pending tasks with the nearest deadlines
async fn list_upcoming(
    State(state): State<AppState>,
    caller: Caller,
    Query(query): Query<UpcomingQuery>,
) -> Result<Json<Vec<TaskListItem>>, RouteError> {
    let limit = query
        .limite
        .unwrap_or(DEFAULT_UPCOMING_LIMIT)
        .min(MAX_UPCOMING_LIMIT);

    let tasks = match caller.restricted_to() {
        Some(own_id) => state.tasks().list_upcoming_pending_for(own_id, limit).await,
        None => state.tasks().list_upcoming_pending(limit).await,
    }
    .map_err(map_core_error)?;
    Ok(list_items(tasks))
}

/// GET /tarefas/empregado/:id
async fn list_tasks_by_employee(
    State(state): State<AppState>,
    caller: Caller,
    Path(employee_id): Path<i64>,
) -> Result<Json<Vec<TaskListItem>>, RouteError> {
    ensure_access(&caller, Some(employee_id), AccessLevel::User).map_err(map_auth_error)?;
    state
        .employees()
        .get(employee_id)
        .await
        .map_err(map_core_error)?;

    let tasks = state
        .tasks()
        .list(TaskFilter::assigned_to(employee_id))
        .await
        .map_err(map_core_error)?;
    Ok(list_items(tasks))
}

/// POST /tarefas/ - a user's tasks are always assigned to that user
async fn create_task(
    State(state): State<AppState>,
    caller: Caller,
    Json(req): Json<CreateTaskRequest>,
) -> Result<(StatusCode, Json<TaskResponse>), RouteError> {
    let title = required_text(&req.title, "Title")?;
    let deadline = parse_deadline(&req.deadline)?;

    let mut task = NewTask::new(title, deadline).with_completed(req.completed);
    if let Some(description) = req.description {
        task = task.with_description(description);
    }
    if let Some(employee_id) = caller.restricted_to().or(req.assigned_employee_id) {
        task = task.with_assignee(employee_id);
    }

    let created = state.tasks().create(task).await.map_err(map_core_error)?;
    Ok((StatusCode::CREATED, Json(TaskResponse::from(created))))
}

/// GET /tarefas/:id
async fn get_task(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<i64>,
) -> Result<Json<TaskResponse>, RouteError> {
    let task = state.tasks().get(id).await.map_err(map_core_error)?;
    ensure_access(&caller, task.assigned_employee_id, AccessLevel::User)
        .map_err(map_auth_error)?;

    Ok(Json(TaskResponse::from(task)))
}

/// PUT /tarefas/:id - partial update
async fn update_task(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<i64>,
    Json(req): Json<UpdateTaskRequest>,
) -> Result<Json<TaskResponse>, RouteError> {
    let current = state.tasks().get(id).await.map_err(map_core_error)?;
    ensure_access(&caller, current.assigned_employee_id, AccessLevel::User)
        .map_err(map_auth_error)?;

    if let (Some(own_id), Some(assignee)) = (caller.restricted_to(), req.assigned_employee_id) {
        if assignee != Some(own_id) {
            return Err(forbidden("cannot reassign a task to another employee"));
        }
    }

    let update = TaskUpdate {
        title: req
            .title
            .as_deref()
            .map(|title| required_text(title, "Title"))
            .transpose()?,
        description: req.description,
        deadline: req.deadline.as_deref().map(parse_deadline).transpose()?,
        completed: req.completed,
        assigned_employee_id: req.assigned_employee_id,
    };
    if update.is_empty() {
        return Err(bad_request("No fields to update"));
    }

    let updated = state
        .tasks()
        .update(id, update)
        .await
        .map_err(map_core_error)?;
    Ok(Json(TaskResponse::from(updated)))
}

/// DELETE /tarefas/:id
async fn delete_task(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<i64>,
) -> Result<StatusCode, RouteError> {
    let task = state.tasks().get(id).await.map_err(map_core_error)?;
    ensure_access(&caller, task.assigned_employee_id, AccessLevel::User)
        .map_err(map_auth_error)?;

    state.tasks().delete(id).await.map_err(map_core_error)?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/tarefas/", get(list_tasks).post(create_task))
        .route("/tarefas/proximas", get(list_upcoming))
        .route("/tarefas/empregado/{id}", get(list_tasks_by_employee))
        .route(
            "/tarefas/{id}",
            get(get_task).put(update_task).delete(delete_task),
        )
}
