use std::cell::Cell;
use std::io::{self, IsTerminal, Write};
use std::rc::Rc;

use chrono::{DateTime, Local};
use todo_gui_shared::TaskDto;
use unicode_width::UnicodeWidthStr;

use crate::datetime::{CreatedAt, format_created_at};
use crate::notify::{Notifier, Toast, ToastId, ToastKind};

#[derive(Debug, Clone)]
pub struct Renderer {
    color: bool,
}

impl Renderer {
    pub fn new() -> Self {
        Self {
            color: io::stdout().is_terminal(),
        }
    }

    pub fn plain() -> Self {
        Self { color: false }
    }

    #[tracing::instrument(skip_all)]
    pub fn print_task_list(
        &self,
        tasks: &[TaskDto],
        now: DateTime<Local>,
        invalid_date_label: &str,
    ) -> anyhow::Result<()> {
        let out = io::stdout().lock();
        self.write_task_list(out, tasks, now, invalid_date_label)
    }

    pub fn write_task_list<W: Write>(
        &self,
        mut out: W,
        tasks: &[TaskDto],
        now: DateTime<Local>,
        invalid_date_label: &str,
    ) -> anyhow::Result<()> {
        if tasks.is_empty() {
            writeln!(out, "no tasks")?;
            return Ok(());
        }

        let title_width = tasks
            .iter()
            .map(|task| UnicodeWidthStr::width(task.title.as_str()))
            .max()
            .unwrap_or(0);

        for task in tasks {
            let mark = if task.completed {
                self.paint("[x]", "32")
            } else {
                "[ ]".to_string()
            };
            let id = self.paint(&format!("#{}", task.id), "33");
            let created = format_created_at(
                &CreatedAt::from(task.created_at.as_str()),
                &now,
                invalid_date_label,
            );
            let padding =
                title_width.saturating_sub(UnicodeWidthStr::width(task.title.as_str()));
            writeln!(
                out,
                "{mark} {id} {}{}  created {created}",
                task.title,
                " ".repeat(padding)
            )?;
        }

        Ok(())
    }

    fn paint(&self, text: &str, code: &str) -> String {
        if !self.color {
            return text.to_string();
        }
        format!("\x1b[{code}m{text}\x1b[0m")
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Prints toasts as lines on stdout. Loading toasts print once; their
/// resolution prints as its own line.
#[derive(Debug, Clone, Default)]
pub struct TerminalNotifier {
    renderer: Renderer,
    next_id: Rc<Cell<ToastId>>,
}

impl TerminalNotifier {
    pub fn new(renderer: Renderer) -> Self {
        Self {
            renderer,
            next_id: Rc::new(Cell::new(0)),
        }
    }

    fn print(&self, toast: &Toast) {
        let line = match toast.kind {
            ToastKind::Loading => format!("… {}", toast.text()),
            ToastKind::Error => self.renderer.paint(&toast.text(), "31"),
            ToastKind::Success | ToastKind::Blank => toast.text(),
        };
        let _ = writeln!(io::stdout().lock(), "{line}");
    }
}

impl Notifier for TerminalNotifier {
    fn show(&self, toast: Toast) -> ToastId {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        self.print(&toast);
        id
    }

    fn resolve(&self, _id: ToastId, toast: Toast) {
        self.print(&toast);
    }

    fn dismiss(&self, _id: Option<ToastId>) {}
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn task_list_aligns_titles_and_marks_done() {
        let now = Local
            .with_ymd_and_hms(2024, 3, 10, 12, 0, 0)
            .single()
            .expect("valid now");
        let tasks = vec![
            TaskDto {
                id: 1,
                title: "Buy milk".to_string(),
                completed: true,
                created_at: "2024-03-10T09:00:00".to_string(),
            },
            TaskDto {
                id: 12,
                title: "Молоко".to_string(),
                completed: false,
                created_at: "garbage".to_string(),
            },
        ];

        let mut buf = Vec::new();
        Renderer::plain()
            .write_task_list(&mut buf, &tasks, now, "n/a")
            .expect("render list");
        let text = String::from_utf8(buf).expect("utf8 output");
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "[x] #1 Buy milk  created today at 9:00 AM");
        assert_eq!(lines[1], "[ ] #12 Молоко    created n/a");
    }

    #[test]
    fn empty_list_says_so() {
        let mut buf = Vec::new();
        Renderer::plain()
            .write_task_list(&mut buf, &[], Local::now(), "n/a")
            .expect("render list");
        assert_eq!(String::from_utf8(buf).expect("utf8"), "no tasks\n");
    }
}
