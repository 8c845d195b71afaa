use chrono::NaiveDateTime;
use ratatui::widgets::TableState;
use tracing::warn;

use crate::countdown::CountdownRegistry;
use crate::filter::Filters;
use crate::models::{normalize_deadline, NewTask, Priority};
use crate::storage::Storage;
use crate::store::TaskStore;
use crate::view::{rebuild, TaskListView, TaskView};

#[derive(Debug, PartialEq)]
pub enum InputMode {
    Normal,
    Adding,
}

/// Step of the "Add Task" form.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum AddStep {
    #[default]
    Name,
    Description,
    Deadline,
    Priority,
}

/// Values collected so far by the "Add Task" form.
#[derive(Debug, Default)]
pub struct AddState {
    pub name: String,
    pub description: String,
    pub deadline: String,
    pub step: AddStep,
}

pub struct App<S> {
    pub store: TaskStore<S>,
    pub filters: Filters,
    pub countdowns: CountdownRegistry,
    pub view: TaskListView,
    pub state: TableState,
    pub input_mode: InputMode,
    pub input_buffer: String,
    pub add_state: AddState,
    /// Last error or notice, shown in the help bar until the next action.
    pub message: Option<String>,
}

impl<S: Storage> App<S> {
    /// Creates a new App and renders the initial list.
    pub fn new(store: TaskStore<S>, now: NaiveDateTime) -> App<S> {
        let mut app = App {
            store,
            filters: Filters::default(),
            countdowns: CountdownRegistry::new(),
            view: TaskListView::default(),
            state: TableState::default(),
            input_mode: InputMode::Normal,
            input_buffer: String::new(),
            add_state: AddState::default(),
            message: None,
        };
        app.refresh(now);
        app
    }

    /// Rebuilds the list from storage, keeping the selected task when it is still visible.
    pub fn refresh(&mut self, now: NaiveDateTime) {
        let selected_id = self.selected().map(|t| t.id);
        self.view = rebuild(&mut self.store, &mut self.filters, &mut self.countdowns, now);

        let len = self.view.items.len();
        if len == 0 {
            self.state.select(None);
            return;
        }
        let pos = selected_id.and_then(|id| self.view.position(id));
        match (pos, self.state.selected()) {
            (Some(i), _) => self.state.select(Some(i)),
            (None, Some(i)) if i >= len => self.state.select(Some(len - 1)),
            (None, Some(_)) => {}
            (None, None) => self.state.select(Some(0)),
        }
    }

    /// Advances every countdown by one tick.
    pub fn tick(&mut self, now: NaiveDateTime) {
        let view = &self.view;
        self.countdowns.tick(now, |id| view.items.iter().any(|i| i.id == id && i.completed));
    }

    pub fn selected(&self) -> Option<&TaskView> {
        self.state.selected().and_then(|i| self.view.items.get(i))
    }

    /// Selects the next row, wrapping around.
    pub fn next(&mut self) {
        if self.view.items.is_empty() { return; }
        let i = match self.state.selected() {
            Some(i) if i + 1 < self.view.items.len() => i + 1,
            _ => 0,
        };
        self.state.select(Some(i));
    }

    /// Selects the previous row, wrapping around.
    pub fn previous(&mut self) {
        if self.view.items.is_empty() { return; }
        let i = match self.state.selected() {
            Some(0) | None => self.view.items.len() - 1,
            Some(i) => i - 1,
        };
        self.state.select(Some(i));
    }

    pub fn toggle_selected(&mut self, now: NaiveDateTime) {
        if let Some(id) = self.selected().map(|t| t.id) {
            if let Err(e) = self.store.toggle_completion(id) {
                self.report(e);
            }
            self.refresh(now);
        }
    }

    pub fn delete_selected(&mut self, now: NaiveDateTime) {
        if let Some(id) = self.selected().map(|t| t.id) {
            if let Err(e) = self.store.delete(id) {
                self.report(e);
            }
            self.refresh(now);
        }
    }

    pub fn cycle_status(&mut self, now: NaiveDateTime) {
        self.filters.status = self.filters.status.next();
        self.refresh(now);
    }

    pub fn cycle_category(&mut self, now: NaiveDateTime) {
        let categories: Vec<String> = self.view.category_options.iter().skip(1).cloned().collect();
        self.filters.category = self.filters.category.next(&categories);
        self.refresh(now);
    }

    pub fn cycle_date(&mut self, now: NaiveDateTime) {
        self.filters.date = self.filters.date.next();
        self.refresh(now);
    }

    /// Opens the "Add Task" form.
    pub fn start_add(&mut self) {
        self.input_mode = InputMode::Adding;
        self.add_state = AddState::default();
        self.input_buffer.clear();
        self.message = None;
    }

    pub fn cancel_input(&mut self) {
        self.input_mode = InputMode::Normal;
        self.input_buffer.clear();
    }

    /// Accepts the current field of the "Add Task" form.
    pub fn handle_input(&mut self, now: NaiveDateTime) {
        if self.input_mode != InputMode::Adding {
            return;
        }
        let input = std::mem::take(&mut self.input_buffer);
        match self.add_state.step {
            AddStep::Name => {
                self.add_state.name = input;
                self.add_state.step = AddStep::Description;
            }
            AddStep::Description => {
                self.add_state.description = input;
                self.add_state.step = AddStep::Deadline;
            }
            AddStep::Deadline => match normalize_deadline(&input) {
                Ok(deadline) => {
                    self.add_state.deadline = deadline;
                    self.add_state.step = AddStep::Priority;
                    self.message = None;
                }
                Err(e) => {
                    self.message = Some(e.to_string());
                    self.input_buffer = input;
                }
            },
            AddStep::Priority => match input.parse::<Priority>() {
                Ok(priority) => {
                    let fields = NewTask {
                        name: std::mem::take(&mut self.add_state.name),
                        description: std::mem::take(&mut self.add_state.description),
                        deadline: std::mem::take(&mut self.add_state.deadline),
                        priority,
                    };
                    match self.store.add(fields) {
                        Ok(task) => {
                            self.input_mode = InputMode::Normal;
                            self.refresh(now);
                            if let Some(i) = self.view.position(task.id) {
                                self.state.select(Some(i));
                            }
                        }
                        Err(e) => {
                            self.input_mode = InputMode::Normal;
                            self.report(e);
                        }
                    }
                }
                Err(e) => {
                    self.message = Some(e.to_string());
                    self.input_buffer = input;
                }
            },
        }
    }

    fn report(&mut self, e: crate::error::Error) {
        warn!(error = %e, "operation failed");
        self.message = Some(e.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::countdown::{CountdownState, COMPLETED_MESSAGE};
    use crate::filter::StatusFilter;
    use crate::storage::MemoryStorage;
    use crate::view::PriorityClass;
    use chrono::{Duration, NaiveDate};

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 11).unwrap().and_hms_opt(12, 0, 0).unwrap()
    }

    fn type_line(app: &mut App<MemoryStorage>, text: &str) {
        app.input_buffer = text.to_string();
        app.handle_input(now());
    }

    fn add_report(app: &mut App<MemoryStorage>) -> u64 {
        app.start_add();
        type_line(app, "Report");
        type_line(app, "quarterly numbers");
        type_line(app, "2025-06-12 10:00");
        type_line(app, "high");
        assert_eq!(app.input_mode, InputMode::Normal);
        app.selected().unwrap().id
    }

    #[test]
    fn add_form_creates_task() {
        let mut app = App::new(TaskStore::new(MemoryStorage::new()), now());
        let id = add_report(&mut app);
        let row = app.selected().unwrap();
        assert_eq!(row.name, "Report");
        assert_eq!(row.deadline, "2025-06-12T10:00");
        assert_eq!(row.priority, PriorityClass::High);
        assert!(matches!(app.countdowns.state(id), Some(CountdownState::Running(_))));
        assert_eq!(app.countdowns.label(id), "0d 22h 0m 0s");
    }

    #[test]
    fn add_form_rejects_bad_deadline() {
        let mut app = App::new(TaskStore::new(MemoryStorage::new()), now());
        app.start_add();
        type_line(&mut app, "x");
        type_line(&mut app, "");
        type_line(&mut app, "whenever");
        assert_eq!(app.add_state.step, AddStep::Deadline);
        assert!(app.message.is_some());
        assert_eq!(app.input_buffer, "whenever");
        app.cancel_input();
        assert!(app.store.tasks().is_empty());
    }

    #[test]
    fn toggling_moves_task_between_status_views() {
        let mut app = App::new(TaskStore::new(MemoryStorage::new()), now());
        let id = add_report(&mut app);

        app.cycle_status(now()); // completed
        assert_eq!(app.filters.status, StatusFilter::Completed);
        assert!(app.view.items.is_empty());
        app.cycle_status(now()); // pending
        assert_eq!(app.view.items.len(), 1);

        app.toggle_selected(now());
        assert!(app.view.items.is_empty());
        app.cycle_status(now()); // all
        assert_eq!(app.view.items.len(), 1);
        assert_eq!(app.countdowns.label(id), COMPLETED_MESSAGE);
    }

    #[test]
    fn delete_and_navigation() {
        let mut app = App::new(TaskStore::new(MemoryStorage::new()), now());
        add_report(&mut app);
        add_report(&mut app);
        app.next();
        assert_eq!(app.state.selected(), Some(0));
        app.previous();
        assert_eq!(app.state.selected(), Some(1));
        app.delete_selected(now());
        assert_eq!(app.view.items.len(), 1);
        assert_eq!(app.state.selected(), Some(0));
        app.delete_selected(now());
        assert_eq!(app.state.selected(), None);
        assert_eq!(app.countdowns.len(), 0);
    }

    #[test]
    fn tick_expires_countdown() {
        let mut app = App::new(TaskStore::new(MemoryStorage::new()), now());
        let id = add_report(&mut app);
        app.tick(now() + Duration::days(2));
        assert_eq!(app.countdowns.state(id), Some(CountdownState::Expired));
    }
}
