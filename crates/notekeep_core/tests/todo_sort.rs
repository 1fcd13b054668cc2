use notekeep_core::{
    compare_due_dates, parse_due_date, SnapshotView, TodoItem, TodoService, TodoSorter,
};
use std::cmp::Ordering;

fn descriptions(items: &[TodoItem]) -> Vec<String> {
    items.iter().map(|item| item.description.clone()).collect()
}

#[test]
fn invalid_due_dates_sort_last_keeping_relative_order() {
    let mut sorter = TodoSorter::new();
    sorter.add(TodoItem::new("A", "bad"));
    sorter.add(TodoItem::new("B", "01/01/2020"));
    sorter.add(TodoItem::new("C", "bad2"));
    assert_eq!(descriptions(sorter.sorted()), vec!["B", "A", "C"]);
}

#[test]
fn sorted_output_is_non_decreasing_for_mixed_input() {
    let dates = [
        "12/31/2024",
        "not a date",
        "01/15/2023",
        "13/01/2023",
        "01/15/2023",
        "",
        "07/04/1999",
        "02/29/2024",
        "02/29/2023",
    ];
    let mut sorter = TodoSorter::new();
    for (index, date) in dates.iter().enumerate() {
        sorter.add(TodoItem::new(format!("task-{index}"), *date));
    }

    let sorted = sorter.sorted().to_vec();
    assert_eq!(sorted.len(), dates.len());
    for pair in sorted.windows(2) {
        assert_ne!(
            compare_due_dates(pair[0].parsed_due_date(), pair[1].parsed_due_date()),
            Ordering::Greater
        );
    }

    let invalid = sorted
        .iter()
        .filter(|item| item.parsed_due_date().is_none())
        .map(|item| item.description.as_str())
        .collect::<Vec<_>>();
    assert_eq!(invalid, vec!["task-1", "task-3", "task-5", "task-8"]);
    assert!(parse_due_date("02/29/2024").is_some());
}

#[test]
fn loosely_shaped_dates_sort_with_invalid_ones() {
    let mut sorter = TodoSorter::new();
    sorter.add(TodoItem::new("signed-year", "03/01/-5"));
    sorter.add(TodoItem::new("plus-year", "03/01/+2020"));
    sorter.add(TodoItem::new("short-month", "1/5/2020"));
    sorter.add(TodoItem::new("valid", "12/31/2030"));
    assert_eq!(
        descriptions(sorter.sorted()),
        vec!["valid", "signed-year", "plus-year", "short-month"]
    );
}

#[test]
fn sorting_twice_is_stable() {
    let mut sorter = TodoSorter::new();
    for name in ["p", "q", "r"] {
        sorter.add(TodoItem::new(name, "03/03/2023"));
    }
    let first = descriptions(sorter.sorted());
    let second = descriptions(sorter.sorted());
    assert_eq!(first, vec!["p", "q", "r"]);
    assert_eq!(first, second);
}

#[test]
fn service_pushes_sorted_list_on_every_change() {
    let mut service = TodoService::new(SnapshotView::default());
    service.add("x", "03/01/2020");
    service.add("y", "01/01/2020");
    assert_eq!(descriptions(&service.view().todo_items), vec!["y", "x"]);

    let z = service.add("z", "");
    assert_eq!(descriptions(&service.view().todo_items), vec!["y", "x", "z"]);
    assert!(service.set_description(z, "z-renamed"));
    assert!(service.remove(z));
    assert_eq!(service.view().todo_items.len(), 2);

    service.clear();
    assert!(service.view().todo_items.is_empty());
    assert_eq!(service.view().renders, 6);
}

#[test]
fn todo_items_serialize_with_stable_field_names() {
    let item = TodoItem::new("write report", "05/06/2024");
    let value = serde_json::to_value(&item).unwrap();
    assert_eq!(value["description"], "write report");
    assert_eq!(value["due_date"], "05/06/2024");
    assert_eq!(value["done"], false);
    assert_eq!(value["id"], item.id.to_string());
}
