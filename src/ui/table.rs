use owo_colors::OwoColorize;
use tabled::{settings::Style, Table, Tabled};
use crate::item::TodoItem;
use crate::ui::{theme, Icons};

#[derive(Tabled)]
pub struct ItemRow {
    #[tabled(rename = "ID")]
    pub id: i64,
    #[tabled(rename = "")]
    pub mark: &'static str,
    #[tabled(rename = "Name")]
    pub name: String,
    #[tabled(rename = "Priority")]
    pub priority: String,
    #[tabled(rename = "Status")]
    pub status: String,
    #[tabled(rename = "Notes")]
    pub notes: String,
}

impl ItemRow {
    pub fn from_item(item: &TodoItem) -> Self {
        let theme = theme();
        Self {
            id: item.id,
            mark: Icons::status(item.status),
            name: item.name.style(theme.status(item.status)).to_string(),
            priority: item.priority.as_str().style(theme.priority(item.priority)).to_string(),
            status: item.status.as_str().to_string(),
            notes: item.notes.clone().unwrap_or_default(),
        }
    }
}

/// Render items as a rounded table; empty input renders as an empty string
pub fn items_table(items: &[TodoItem]) -> String {
    if items.is_empty() {
        return String::new();
    }

    let rows: Vec<ItemRow> = items.iter().map(ItemRow::from_item).collect();
    Table::new(rows).with(Style::rounded()).to_string()
}

/// Two-column key/value table for a single item
pub fn item_detail_table(item: &TodoItem) -> String {
    let rows = [
        ("ID", item.id.to_string()),
        ("Name", item.name.clone()),
        ("Notes", item.notes.clone().unwrap_or_default()),
        ("Priority", item.priority.to_string()),
        ("Status", item.status.to_string()),
    ];
    let mut builder = tabled::builder::Builder::default();
    for (label, value) in rows {
        builder.push_record([label.to_string(), value]);
    }
    builder.build().with(Style::rounded()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::{Priority, Status};

    fn item() -> TodoItem {
        TodoItem {
            id: 3,
            name: "Water plants".to_string(),
            notes: Some("balcony".to_string()),
            priority: Priority::High,
            status: Status::InProgress,
        }
    }

    #[test]
    fn test_empty_table() {
        assert!(items_table(&[]).is_empty());
    }

    #[test]
    fn test_table_contains_fields() {
        let table = items_table(&[item()]);
        assert!(table.contains("Water plants"));
        assert!(table.contains("balcony"));
        assert!(table.contains("in_progress"));
    }

    #[test]
    fn test_detail_table() {
        let table = item_detail_table(&item());
        assert!(table.contains("Priority"));
        assert!(table.contains("high"));
    }
}
