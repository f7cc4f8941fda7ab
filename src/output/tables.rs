use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color as TableColor, ContentArrangement, Table};

use crate::circleci::format::format_rate;
use crate::circleci::status::{Status, StatusColor};

/// Table and cell creation helpers
pub fn create_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

pub fn cyan_header(labels: &[&str]) -> Vec<Cell> {
    labels
        .iter()
        .map(|label| Cell::new(*label).fg(TableColor::Cyan))
        .collect()
}

/// Renders a status through its badge so every table shows the same label,
/// icon and color for the same status.
pub fn status_cell(status: Status) -> Cell {
    let badge = status.badge();
    let color = match badge.color {
        StatusColor::Success => TableColor::Green,
        StatusColor::Failure => TableColor::Red,
        StatusColor::Warning => TableColor::Yellow,
        StatusColor::Info => TableColor::Blue,
        StatusColor::Neutral => TableColor::Grey,
    };
    Cell::new(format!("{} {}", badge.icon, badge.label)).fg(color)
}

pub fn optional_status_cell(status: Option<Status>) -> Cell {
    match status {
        Some(status) => status_cell(status),
        None => Cell::new("—").fg(TableColor::Grey),
    }
}

pub fn success_rate_cell(rate: f64) -> Cell {
    let text = format_rate(rate);
    if rate > 0.8 {
        Cell::new(text).fg(TableColor::Green)
    } else if rate >= 0.5 {
        Cell::new(text).fg(TableColor::Yellow)
    } else {
        Cell::new(text).fg(TableColor::Red)
    }
}

pub fn flake_count_cell(times_flaked: u64) -> Cell {
    let text = times_flaked.to_string();
    if times_flaked >= 10 {
        Cell::new(text).fg(TableColor::Red)
    } else if times_flaked >= 3 {
        Cell::new(text).fg(TableColor::Yellow)
    } else {
        Cell::new(text).fg(TableColor::Green)
    }
}
