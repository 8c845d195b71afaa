use std::io::{self, BufRead, Write};

use chrono::NaiveDateTime;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};

use crate::countdown::{CountdownRegistry, CountdownState};
use crate::error::Result;
use crate::filter::Filters;
use crate::models::{normalize_deadline, NewTask, Priority, Task};
use crate::storage::Storage;
use crate::store::TaskStore;
use crate::view::{rebuild, PriorityClass, TaskListView};

/// Adds a new task after validating its deadline.
pub fn cmd_add<S: Storage>(
    store: &mut TaskStore<S>,
    name: String,
    description: Option<String>,
    deadline: &str,
    priority: Priority,
) -> Result<Task> {
    let deadline = normalize_deadline(deadline)?;
    let task = store.add(NewTask {
        name,
        description: description.unwrap_or_default(),
        deadline,
        priority,
    })?;
    println!("Task added (id = {})", task.id);
    Ok(task)
}

/// Flips the completion flag of a task.
pub fn cmd_toggle<S: Storage>(store: &mut TaskStore<S>, id: u64) -> Result<()> {
    store.toggle_completion(id)?;
    match store.get(id) {
        Some(t) if t.completed => println!("Task {} marked as completed.", id),
        Some(_) => println!("Task {} marked as pending.", id),
        None => eprintln!("Task {} not found.", id),
    }
    Ok(())
}

/// Removes a task by ID.
pub fn cmd_remove<S: Storage>(store: &mut TaskStore<S>, id: u64) -> Result<()> {
    let existed = store.reload().iter().any(|t| t.id == id);
    store.delete(id)?;
    if existed {
        println!("Task {} removed.", id);
    } else {
        eprintln!("Task {} not found.", id);
    }
    Ok(())
}

/// Prints the filtered task list with a countdown snapshot per row.
pub fn cmd_list<S: Storage>(store: &mut TaskStore<S>, mut filters: Filters, now: NaiveDateTime) {
    let mut countdowns = CountdownRegistry::new();
    let view = rebuild(store, &mut filters, &mut countdowns, now);
    if view.items.is_empty() {
        println!("No tasks found.");
        return;
    }
    println!("{}", task_table(&view, &countdowns));
}

/// Lists the distinct categories of all stored tasks.
pub fn cmd_categories<S: Storage>(store: &mut TaskStore<S>) {
    store.reload();
    let categories = store.categories();
    if categories.is_empty() {
        println!("No categories found.");
        return;
    }
    for c in categories {
        println!("{}", c);
    }
}

/// Deletes every task, asking first unless `force` is set.
pub fn cmd_reset<S: Storage>(store: &mut TaskStore<S>, force: bool) -> Result<()> {
    if !force {
        print!("Are you sure you want to delete all tasks? This cannot be undone. [y/N] ");
        io::stdout().flush()?;
        let mut input = String::new();
        io::stdin().lock().read_line(&mut input)?;
        if input.trim().to_lowercase() != "y" {
            println!("Aborted.");
            return Ok(());
        }
    }
    store.clear()?;
    println!("Task list reset successfully.");
    Ok(())
}

/// Builds the table printed by `list`.
pub fn task_table(view: &TaskListView, countdowns: &CountdownRegistry) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("ID").add_attribute(Attribute::Bold),
            Cell::new("Name").add_attribute(Attribute::Bold),
            Cell::new("Description").add_attribute(Attribute::Bold),
            Cell::new("Deadline").add_attribute(Attribute::Bold),
            Cell::new("Time Left").add_attribute(Attribute::Bold),
            Cell::new("Status").add_attribute(Attribute::Bold),
        ]);

    for t in &view.items {
        let name_color = match t.priority {
            PriorityClass::High => Color::Red,
            PriorityClass::Medium => Color::Yellow,
            PriorityClass::Plain => Color::Reset,
        };
        let left_color = match countdowns.state(t.id) {
            Some(CountdownState::Expired) => Color::Red,
            Some(CountdownState::Done) => Color::Green,
            _ => Color::Reset,
        };
        let status = if t.completed { "Done" } else { "Pending" };
        let status_color = if t.completed { Color::Green } else { Color::Yellow };

        table.add_row(vec![
            Cell::new(t.id),
            Cell::new(&t.name).fg(name_color),
            Cell::new(&t.description),
            Cell::new(&t.deadline),
            Cell::new(countdowns.label(t.id)).fg(left_color),
            Cell::new(status).fg(status_color),
        ]);
    }
    table
}
