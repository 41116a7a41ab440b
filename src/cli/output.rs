//! Output formatting for CLI commands.
//!
//! Supports two modes: human-readable tables (default) and JSON (--json).

use serde::Serialize;
use tabled::{Table, Tabled};

/// Output mode for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Table,
    Json,
}

impl OutputMode {
    pub fn from_json_flag(json: bool) -> Self {
        if json {
            OutputMode::Json
        } else {
            OutputMode::Table
        }
    }
}

/// Render rows as a table, or a placeholder when there are none.
pub fn render_table<T: Tabled>(rows: &[T]) -> String {
    if rows.is_empty() {
        "(no results)".to_string()
    } else {
        Table::new(rows).to_string()
    }
}

/// Print a vec of Tabled + Serialize items in the chosen mode.
pub fn print_items<T: Tabled + Serialize>(items: &[T], mode: OutputMode) -> anyhow::Result<()> {
    match mode {
        OutputMode::Table => println!("{}", render_table(items)),
        OutputMode::Json => println!("{}", serde_json::to_string_pretty(items)?),
    }
    Ok(())
}

/// Print a single item as pretty JSON.
pub fn print_json<T: Serialize>(item: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(item)?);
    Ok(())
}

/// Print a section header.
pub fn print_section(title: &str) {
    println!("\n=== {} ===", title);
}

/// Print a simple key-value pair.
pub fn print_kv(key: &str, value: impl std::fmt::Display) {
    println!("{key}: {value}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Tabled, Serialize)]
    struct Row {
        name: &'static str,
        value: u32,
    }

    #[test]
    fn test_from_json_flag() {
        assert_eq!(OutputMode::from_json_flag(true), OutputMode::Json);
        assert_eq!(OutputMode::from_json_flag(false), OutputMode::Table);
    }

    #[test]
    fn test_render_table() {
        let empty: Vec<Row> = Vec::new();
        assert_eq!(render_table(&empty), "(no results)");
        let table = render_table(&[Row { name: "rsi", value: 14 }]);
        assert!(table.contains("name"));
        assert!(table.contains("rsi"));
        assert!(table.contains("14"));
    }
}
