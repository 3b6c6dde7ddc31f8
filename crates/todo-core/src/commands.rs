use anyhow::{Context, anyhow};
use chrono::Local;
use todo_gui_shared::TaskId;
use tracing::{debug, info, instrument};

use crate::api::TaskApi;
use crate::cli::Command;
use crate::collection::{SharedTaskList, TaskCollection, TaskListHandle};
use crate::config::ClientConfig;
use crate::notify::Notifier;
use crate::render::Renderer;
use crate::row::{DeleteOutcome, RenameOutcome, RowActions, RowItem, RowScope, ToggleOutcome};

/// Fetches the list, then runs `command` through a row the same way the UI
/// does. Returns whether the command did what it was asked to.
#[instrument(skip(api, cfg, renderer, notifier))]
pub async fn dispatch<A, N>(
    api: A,
    cfg: &ClientConfig,
    renderer: &Renderer,
    notifier: N,
    command: Command,
) -> anyhow::Result<bool>
where
    A: TaskApi,
    N: Notifier,
{
    let tasks = api
        .list_tasks()
        .await
        .with_context(|| format!("failed to fetch tasks from {}", cfg.api_base_url))?;
    let list = SharedTaskList::new(TaskCollection::from_remote(tasks));
    debug!(total = list.snapshot().len(), "task list loaded");

    let actions = RowActions::new(
        api,
        list.clone(),
        notifier,
        RowScope::new(),
        cfg.toast_duration(),
    );

    match command {
        Command::List => {
            renderer.print_task_list(
                list.snapshot().tasks(),
                Local::now(),
                &cfg.invalid_date_label,
            )?;
            Ok(true)
        }
        Command::Toggle { id } => {
            let outcome = actions.toggle_completion(id).await;
            info!(id, ?outcome, "toggle finished");
            Ok(matches!(outcome, ToggleOutcome::Toggled { .. }))
        }
        Command::Rename { id, title } => {
            let mut row = row_for(&list, id)?;
            row.begin_edit();
            row.set_input(title.join(" "));
            let outcome = row.commit(&actions).await;
            info!(id, ?outcome, "rename finished");
            Ok(matches!(
                outcome,
                RenameOutcome::Renamed { .. } | RenameOutcome::Unchanged
            ))
        }
        Command::Delete { id } => {
            let mut row = row_for(&list, id)?;
            let outcome = row.delete(&actions).await;
            info!(id, ?outcome, "delete finished");
            Ok(outcome == DeleteOutcome::Deleted)
        }
    }
}

fn row_for(list: &SharedTaskList, id: TaskId) -> anyhow::Result<RowItem> {
    list.find(id)
        .map(|task| RowItem::new(&task))
        .ok_or_else(|| anyhow!("no task with id {id}"))
}
