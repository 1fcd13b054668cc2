//! To-do list use-cases.
//!
//! # Responsibility
//! - Keep the in-memory to-do list ordered by due date.
//! - Push the sorted list to the view after every mutation.
//!
//! # Invariants
//! - Sorting is stable and in place; entries with equal or unparseable due
//!   dates keep their insertion order relative to each other.
//! - The list is never persisted.

use crate::model::todo::{compare_due_dates, TodoId, TodoItem};
use crate::view::TodoListView;
use log::{debug, info};

/// Owns the to-do entries and sorts them by parsed due date.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoSorter {
    items: Vec<TodoItem>,
}

impl TodoSorter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, item: TodoItem) {
        self.items.push(item);
    }

    /// Removes the entry with `id`, if present.
    pub fn remove(&mut self, id: TodoId) -> Option<TodoItem> {
        let index = self.items.iter().position(|item| item.id == id)?;
        Some(self.items.remove(index))
    }

    /// Sorts in place by due date and returns the ordered entries.
    pub fn sorted(&mut self) -> &[TodoItem] {
        self.items.sort_by(|left, right| {
            compare_due_dates(left.parsed_due_date(), right.parsed_due_date())
        });
        &self.items
    }

    /// Entries in their current order.
    pub fn items(&self) -> &[TodoItem] {
        &self.items
    }

    pub fn get(&self, id: TodoId) -> Option<&TodoItem> {
        self.items.iter().find(|item| item.id == id)
    }

    fn get_mut(&mut self, id: TodoId) -> Option<&mut TodoItem> {
        self.items.iter_mut().find(|item| item.id == id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

/// To-do facade that re-sorts and re-renders after each change.
pub struct TodoService<V: TodoListView> {
    sorter: TodoSorter,
    view: V,
}

impl<V: TodoListView> TodoService<V> {
    pub fn new(view: V) -> Self {
        Self {
            sorter: TodoSorter::new(),
            view,
        }
    }

    /// Adds an entry and returns its id. The due date may be unparseable.
    pub fn add(&mut self, description: impl Into<String>, due_date: impl Into<String>) -> TodoId {
        let item = TodoItem::new(description, due_date);
        let id = item.id;
        self.add_item(item);
        id
    }

    pub fn add_item(&mut self, item: TodoItem) {
        debug!(
            "event=todo_add module=service status=ok valid_due_date={}",
            item.parsed_due_date().is_some()
        );
        self.sorter.add(item);
        self.publish();
    }

    /// Removes an entry; the view is refreshed even when `id` is unknown.
    pub fn remove(&mut self, id: TodoId) -> bool {
        let removed = self.sorter.remove(id).is_some();
        if !removed {
            debug!("event=todo_remove module=service status=skip reason=not_found");
        }
        self.publish();
        removed
    }

    /// Flips the cosmetic done flag; returns false for an unknown id.
    pub fn set_done(&mut self, id: TodoId, done: bool) -> bool {
        self.update(id, |item| item.done = done)
    }

    pub fn set_due_date(&mut self, id: TodoId, due_date: impl Into<String>) -> bool {
        let due_date = due_date.into();
        self.update(id, move |item| item.due_date = due_date)
    }

    pub fn set_description(&mut self, id: TodoId, description: impl Into<String>) -> bool {
        let description = description.into();
        self.update(id, move |item| item.description = description)
    }

    pub fn clear(&mut self) {
        self.sorter.clear();
        info!("event=todo_clear module=service status=ok");
        self.publish();
    }

    /// Entries in the order last pushed to the view.
    pub fn items(&self) -> &[TodoItem] {
        self.sorter.items()
    }

    pub fn get(&self, id: TodoId) -> Option<&TodoItem> {
        self.sorter.get(id)
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    fn update(&mut self, id: TodoId, apply: impl FnOnce(&mut TodoItem)) -> bool {
        let Some(item) = self.sorter.get_mut(id) else {
            return false;
        };
        apply(item);
        self.publish();
        true
    }

    fn publish(&mut self) {
        let items = self.sorter.sorted();
        self.view.render_todo_list(items);
    }
}
