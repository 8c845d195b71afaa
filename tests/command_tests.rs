use taskdue::commands::*;
use taskdue::countdown::CountdownRegistry;
use taskdue::filter::{DateFilter, Filters, StatusFilter};
use taskdue::models::Priority;
use taskdue::storage::{FileStorage, Storage, TASKS_KEY};
use taskdue::store::TaskStore;
use taskdue::view::rebuild;
use taskdue::Error;
use chrono::{Local, NaiveDate, NaiveDateTime};
use std::fs;
use std::path::Path;

fn with_test_store<F>(f: F)
where
    F: FnOnce(TaskStore<FileStorage>, &Path),
{
    let dir = tempfile::tempdir().unwrap();
    let store = TaskStore::new(FileStorage::new(dir.path()));
    f(store, dir.path());
}

fn noon(y: i32, m: u32, d: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(12, 0, 0).unwrap()
}

#[test]
fn test_add_persists_to_slot_file() {
    with_test_store(|mut store, dir| {
        let task = cmd_add(&mut store, "Test Task".into(), Some("details".into()), "2025-12-01 09:30", Priority::Medium).unwrap();
        assert_eq!(task.deadline, "2025-12-01T09:30");

        let raw = fs::read_to_string(dir.join("tasks.json")).unwrap();
        assert!(raw.contains("\"priority\": \"medium\""));
        assert!(raw.contains("\"category\": \"Uncategorized\""));

        let reopened = TaskStore::new(FileStorage::new(dir));
        assert_eq!(reopened.tasks(), store.tasks());
    });
}

#[test]
fn test_add_rejects_invalid_deadline() {
    with_test_store(|mut store, dir| {
        let res = cmd_add(&mut store, "Bad".into(), None, "not a date", Priority::None);
        assert!(matches!(res, Err(Error::InvalidDeadline(_))));
        assert!(store.tasks().is_empty());
        assert!(!dir.join("tasks.json").exists());
    });
}

#[test]
fn test_toggle_and_remove() {
    with_test_store(|mut store, _dir| {
        let id = cmd_add(&mut store, "Task".into(), None, "2025-12-01", Priority::None).unwrap().id;

        cmd_toggle(&mut store, id).unwrap();
        assert!(store.get(id).unwrap().completed);
        cmd_toggle(&mut store, id).unwrap();
        assert!(!store.get(id).unwrap().completed);

        cmd_remove(&mut store, id).unwrap();
        assert!(store.tasks().is_empty());
        cmd_remove(&mut store, id).unwrap();
        assert!(store.tasks().is_empty());
    });
}

#[test]
fn test_operations_pick_up_external_edits() {
    with_test_store(|mut store, dir| {
        let a = cmd_add(&mut store, "A".into(), None, "2025-12-01", Priority::None).unwrap().id;

        // another process adds a task behind our back
        let mut other = TaskStore::new(FileStorage::new(dir));
        let b = other.add(Default::default()).unwrap().id;

        store.toggle_completion(a).unwrap();
        let ids: Vec<u64> = store.tasks().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![a, b]);
        assert_eq!(store.storage().load(), store.tasks());
    });
}

#[test]
fn test_corrupt_storage_starts_empty() {
    with_test_store(|_store, dir| {
        let mut backend = FileStorage::new(dir);
        backend.set_item(TASKS_KEY, "[{\"id\": \"oops\"").unwrap();
        let mut store = TaskStore::new(backend);
        assert!(store.tasks().is_empty());

        let task = cmd_add(&mut store, "Fresh".into(), None, "2025-12-01", Priority::High).unwrap();
        assert_eq!(store.tasks(), &[task][..]);
    });
}

#[test]
fn test_reset_force() {
    with_test_store(|mut store, dir| {
        cmd_add(&mut store, "Task".into(), None, "2025-12-01", Priority::None).unwrap();
        cmd_reset(&mut store, true).unwrap();
        assert!(store.tasks().is_empty());
        assert!(!dir.join("tasks.json").exists());
    });
}

#[test]
fn test_list_table_shows_countdown() {
    with_test_store(|mut store, _dir| {
        // Wednesday
        let now = noon(2025, 6, 11);
        cmd_add(&mut store, "Soon".into(), None, "2025-06-12 13:01:01", Priority::High).unwrap();
        cmd_add(&mut store, "Late".into(), None, "2025-06-01 08:00", Priority::None).unwrap();

        let mut countdowns = CountdownRegistry::new();
        let view = rebuild(&mut store, &mut Filters::default(), &mut countdowns, now);
        let table = task_table(&view, &countdowns).to_string();
        assert!(table.contains("1d 1h 1m"));
        assert!(table.contains("Overdue!"));

        let mut filters = Filters { date: DateFilter::ThisWeek, ..Filters::default() };
        let view = rebuild(&mut store, &mut filters, &mut countdowns, now);
        assert_eq!(view.items.len(), 1);
        assert_eq!(view.items[0].name, "Soon");
        assert_eq!(countdowns.len(), 1);
    });
}

#[test]
fn test_report_scenario() {
    with_test_store(|mut store, _dir| {
        let now = Local::now().naive_local();
        let tomorrow = now.date().succ_opt().unwrap().format("%Y-%m-%d 10:00").to_string();
        let id = cmd_add(&mut store, "Report".into(), None, &tomorrow, Priority::High).unwrap().id;

        let mut countdowns = CountdownRegistry::new();
        let mut pending = Filters { status: StatusFilter::Pending, ..Filters::default() };
        let mut completed = Filters { status: StatusFilter::Completed, ..Filters::default() };

        let view = rebuild(&mut store, &mut pending, &mut countdowns, now);
        assert_eq!(view.items.len(), 1);
        assert_eq!(view.items[0].priority, taskdue::view::PriorityClass::High);
        assert!(countdowns.running() == 1);
        assert!(rebuild(&mut store, &mut completed, &mut countdowns, now).items.is_empty());

        cmd_toggle(&mut store, id).unwrap();
        assert!(rebuild(&mut store, &mut pending, &mut countdowns, now).items.is_empty());
        let view = rebuild(&mut store, &mut completed, &mut countdowns, now);
        assert_eq!(view.items.len(), 1);
        assert_eq!(countdowns.label(id), "Completed!");
        assert_eq!(countdowns.running(), 0);
    });
}
