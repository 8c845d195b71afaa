use chrono::NaiveDateTime;
use tracing::debug;

use crate::countdown::CountdownRegistry;
use crate::filter::{CategoryFilter, Filters, ALL};
use crate::models::{Priority, Task};
use crate::storage::Storage;
use crate::store::TaskStore;

/// Visual emphasis of a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriorityClass {
    High,
    Medium,
    Plain,
}

impl From<&Priority> for PriorityClass {
    fn from(p: &Priority) -> Self {
        match p {
            Priority::High => PriorityClass::High,
            Priority::Medium => PriorityClass::Medium,
            Priority::None | Priority::Other(_) => PriorityClass::Plain,
        }
    }
}

/// One visible row.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskView {
    pub id: u64,
    pub name: String,
    pub description: String,
    pub deadline: String,
    pub priority: PriorityClass,
    pub completed: bool,
}

impl From<&Task> for TaskView {
    fn from(t: &Task) -> Self {
        TaskView {
            id: t.id,
            name: t.name.clone(),
            description: t.description.clone(),
            deadline: t.deadline.clone(),
            priority: PriorityClass::from(&t.priority),
            completed: t.completed,
        }
    }
}

/// Everything needed to draw the list and its filter controls.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskListView {
    pub items: Vec<TaskView>,
    /// `all` followed by every category present in storage.
    pub category_options: Vec<String>,
}

impl TaskListView {
    pub fn position(&self, id: u64) -> Option<usize> {
        self.items.iter().position(|i| i.id == id)
    }
}

/// Computes the visible list from the full task collection.
pub fn build_view(all_tasks: &[Task], filters: &Filters, now: NaiveDateTime) -> TaskListView {
    let items = filters.apply(all_tasks, now).iter().map(TaskView::from).collect();

    let mut category_options = vec![ALL.to_string()];
    for t in all_tasks {
        if !category_options.contains(&t.category) {
            category_options.push(t.category.clone());
        }
    }
    TaskListView { items, category_options }
}

/// Re-reads storage, rebuilds the view and restarts one countdown per row.
///
/// A selected category that no longer exists falls back to `all`.
pub fn rebuild<S: Storage>(
    store: &mut TaskStore<S>,
    filters: &mut Filters,
    countdowns: &mut CountdownRegistry,
    now: NaiveDateTime,
) -> TaskListView {
    store.reload();
    if let CategoryFilter::Named(c) = &filters.category {
        if !store.tasks().iter().any(|t| t.category == *c) {
            filters.category = CategoryFilter::All;
        }
    }
    let view = build_view(store.tasks(), filters, now);

    countdowns.reset();
    for item in &view.items {
        let deadline = store.get(item.id).and_then(|t| t.deadline_at());
        countdowns.start(item.id, deadline);
    }
    countdowns.tick(now, |id| view.items.iter().any(|i| i.id == id && i.completed));
    debug!(visible = view.items.len(), total = store.tasks().len(), "list rebuilt");
    view
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::countdown::{CountdownState, COMPLETED_MESSAGE};
    use crate::filter::StatusFilter;
    use crate::models::{NewTask, DEFAULT_CATEGORY};
    use crate::storage::MemoryStorage;
    use chrono::{Duration, NaiveDate};

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 11).unwrap().and_hms_opt(12, 0, 0).unwrap()
    }

    fn add(store: &mut TaskStore<MemoryStorage>, name: &str, priority: Priority) -> u64 {
        store
            .add(NewTask {
                name: name.into(),
                description: String::new(),
                deadline: (now() + Duration::days(1)).format("%Y-%m-%dT%H:%M").to_string(),
                priority,
            })
            .unwrap()
            .id
    }

    #[test]
    fn priority_classes() {
        assert_eq!(PriorityClass::from(&Priority::High), PriorityClass::High);
        assert_eq!(PriorityClass::from(&Priority::Medium), PriorityClass::Medium);
        assert_eq!(PriorityClass::from(&Priority::None), PriorityClass::Plain);
        assert_eq!(PriorityClass::from(&Priority::Other("urgent".into())), PriorityClass::Plain);
    }

    #[test]
    fn category_options_come_from_all_tasks() {
        let mut store = TaskStore::new(MemoryStorage::new());
        let id = add(&mut store, "a", Priority::None);
        store.toggle_completion(id).unwrap();
        let filters = Filters { status: StatusFilter::Pending, ..Filters::default() };
        let view = build_view(store.tasks(), &filters, now());
        assert!(view.items.is_empty());
        assert_eq!(view.category_options, vec![ALL.to_string(), DEFAULT_CATEGORY.to_string()]);
    }

    #[test]
    fn rebuild_restarts_countdowns_for_visible_rows_only() {
        let mut store = TaskStore::new(MemoryStorage::new());
        let a = add(&mut store, "a", Priority::High);
        let b = add(&mut store, "b", Priority::None);
        let mut filters = Filters::default();
        let mut countdowns = CountdownRegistry::new();

        let view = rebuild(&mut store, &mut filters, &mut countdowns, now());
        assert_eq!(view.items.len(), 2);
        assert_eq!(countdowns.len(), 2);
        assert_eq!(view.position(b), Some(1));

        store.toggle_completion(a).unwrap();
        filters.status = StatusFilter::Pending;
        let view = rebuild(&mut store, &mut filters, &mut countdowns, now());
        assert_eq!(view.items.len(), 1);
        assert_eq!(countdowns.len(), 1);
        assert_eq!(countdowns.state(a), None);
        assert!(matches!(countdowns.state(b), Some(CountdownState::Running(_))));
    }

    #[test]
    fn completed_rows_show_completed_message() {
        let mut store = TaskStore::new(MemoryStorage::new());
        let a = add(&mut store, "a", Priority::None);
        store.toggle_completion(a).unwrap();
        let mut countdowns = CountdownRegistry::new();
        rebuild(&mut store, &mut Filters::default(), &mut countdowns, now());
        assert_eq!(countdowns.label(a), COMPLETED_MESSAGE);
    }

    #[test]
    fn vanished_category_resets_to_all() {
        let mut store = TaskStore::new(MemoryStorage::new());
        add(&mut store, "a", Priority::None);
        let mut filters = Filters { category: CategoryFilter::Named("gone".into()), ..Filters::default() };
        let view = rebuild(&mut store, &mut filters, &mut CountdownRegistry::new(), now());
        assert_eq!(filters.category, CategoryFilter::All);
        assert_eq!(view.items.len(), 1);

        let mut filters = Filters { category: CategoryFilter::Named(DEFAULT_CATEGORY.into()), ..Filters::default() };
        rebuild(&mut store, &mut filters, &mut CountdownRegistry::new(), now());
        assert_eq!(filters.category, CategoryFilter::Named(DEFAULT_CATEGORY.into()));
    }
}
