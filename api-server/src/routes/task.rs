//! Task API endpoints
//!
//! The list, create, edit, delete and drag-reorder operations behind the task list UI.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use taskkit_core::filter::TaskView;
use taskkit_core::task::{NewTask, Task, TaskPriority};
use taskkit_core::Error;

use super::{api_error, ApiError, ApiJson};
use crate::state::AppState;

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct UpdateTaskRequest {
    pub title: String,
    pub description: String,
    pub priority: TaskPriority,
}

/// Either index positions, or the ids of the dragged task and the one it was dropped on
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ReorderRequest {
    #[serde(rename_all = "camelCase")]
    ByIndex { from_index: usize, to_index: usize },
    #[serde(rename_all = "camelCase")]
    ById { active_id: String, over_id: String },
}

#[derive(Debug, Serialize)]
pub struct ReorderResponse {
    pub moved: bool,
    pub tasks: Vec<Task>,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/tasks - Tasks passing the current priority filter
async fn list_tasks(State(state): State<AppState>) -> Json<TaskView> {
    let tasks = state.task_store().tasks().await;
    let priority = state.filter_store().priority();
    Json(TaskView::new(&tasks, priority))
}

/// POST /api/tasks - Create a task from the new-task dialog
async fn create_task(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<NewTask>,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    let task = req.into_task().map_err(api_error)?;
    let created = state.task_store().add_task(task).await.map_err(api_error)?;
    tracing::info!("Created task {}", created.id);

    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /api/tasks/{id} - Get a single task
async fn get_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Task>, ApiError> {
    match state.task_store().get(&id).await {
        Some(task) => Ok(Json(task)),
        None => Err(api_error(Error::TaskNotFound(id))),
    }
}

/// PUT /api/tasks/{id} - Save the edit dialog
async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<UpdateTaskRequest>,
) -> Result<Json<Task>, ApiError> {
    let task = NewTask::new(req.title, req.description)
        .with_priority(req.priority)
        .into_task_with_id(id.clone())
        .map_err(api_error)?;

    let updated = state
        .task_store()
        .update_task(task.clone())
        .await
        .map_err(api_error)?;
    if !updated {
        return Err(api_error(Error::TaskNotFound(id)));
    }

    Ok(Json(task))
}

/// DELETE /api/tasks/{id} - Delete a task; deleting an absent task succeeds
async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    if state
        .task_store()
        .delete_task(&id)
        .await
        .map_err(api_error)?
        .is_some()
    {
        tracing::info!("Deleted task {}", id);
    }
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/tasks/reorder - Drag end
async fn reorder_tasks(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<ReorderRequest>,
) -> Result<Json<ReorderResponse>, ApiError> {
    let store = state.task_store();
    let reordered = match req {
        ReorderRequest::ByIndex {
            from_index,
            to_index,
        } => store.reorder_tasks(from_index, to_index).await,
        ReorderRequest::ById { active_id, over_id } => {
            store.reorder_by_id(&active_id, &over_id).await
        }
    }
    .map_err(api_error)?;

    Ok(Json(ReorderResponse {
        moved: reordered.moved,
        tasks: reordered.tasks.into_vec(),
    }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/tasks", get(list_tasks).post(create_task))
        .route("/api/tasks/reorder", post(reorder_tasks))
        .route(
            "/api/tasks/{id}",
            get(get_task).put(update_task).delete(delete_task),
        )
}
