//! Plain-text rendering of the grid view-models.

use std::fmt::Write;

use datagrid_lib::columns::Alignment;
use datagrid_lib::query::SortDirection;
use datagrid_lib::view::ContentView;
use datagrid_lib::view::ToolbarView;
use datagrid_lib::view::content::Cell;
use datagrid_lib::view::content::Footer;
use datagrid_lib::view::content::GridView;
use datagrid_lib::view::toolbar::FilterInput;

/// Longest cell text before truncation.
const MAX_CELL_WIDTH: usize = 40;

pub fn toolbar(view: &ToolbarView) -> String {
    let mut out = String::new();

    let search = if view.search.value.is_empty() {
        view.search.placeholder.to_string()
    } else {
        format!("\"{}\"", view.search.value)
    };
    let _ = write!(out, "Search: {}  |  {} records", search, view.record_count);

    if let Some(toggle) = &view.filter_toggle {
        match toggle.badge {
            Some(count) => {
                let _ = write!(out, "  |  Filters ({})", count);
            }
            None => out.push_str("  |  Filters"),
        }
    }
    if let Some(bulk) = &view.bulk_actions {
        let _ = write!(out, "  |  {} selected", bulk.selected);
    }
    if let Some(export) = &view.export_button {
        let _ = write!(out, "  |  [{}]", export.label);
    }

    let hidden: Vec<&str> = view
        .column_menu
        .iter()
        .filter(|item| !item.checked)
        .map(|item| item.label.as_str())
        .collect();
    if !hidden.is_empty() {
        let _ = write!(out, "\nHidden columns: {}", hidden.join(", "));
    }

    if let Some(panel) = &view.filter_panel {
        for field in panel {
            let value = match &field.input {
                FilterInput::Select { value, options } => options
                    .iter()
                    .find(|option| &option.value == value)
                    .map(|option| option.label.clone())
                    .unwrap_or_else(|| value.clone()),
                FilterInput::Input { value, .. } => value.clone(),
            };
            let _ = write!(out, "\n  {}: {}", field.label, value);
        }
    }

    out
}

pub fn content(view: &ContentView) -> String {
    match view {
        ContentView::Loading { text } => text.to_string(),
        ContentView::Empty { title, text } => format!("{}\n{}", title, text),
        ContentView::Grid(grid) => render_grid(grid),
    }
}

fn render_grid(grid: &GridView) -> String {
    let headers: Vec<String> = grid
        .headers
        .iter()
        .map(|header| match header.sorted {
            Some(SortDirection::Asc) => format!("{} ^", header.label),
            Some(SortDirection::Desc) => format!("{} v", header.label),
            None => header.label.clone(),
        })
        .collect();

    let rows: Vec<Vec<(String, Alignment)>> = grid
        .rows
        .iter()
        .map(|row| {
            row.cells
                .iter()
                .map(|cell| match cell {
                    Cell::Checkbox(true) => ("[x]".to_string(), Alignment::Center),
                    Cell::Checkbox(false) => ("[ ]".to_string(), Alignment::Center),
                    Cell::Text { text, align } => (truncate(text), *align),
                })
                .collect()
        })
        .collect();

    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (width, (text, _)) in widths.iter_mut().zip(row) {
            *width = (*width).max(text.chars().count());
        }
    }

    let mut lines = Vec::with_capacity(rows.len() + 3);
    lines.push(join(
        headers
            .iter()
            .zip(&grid.headers)
            .zip(&widths)
            .map(|((text, header), width)| pad(text, *width, header.align)),
    ));
    lines.push(join(widths.iter().map(|width| "-".repeat(*width))));
    for (row, view) in rows.iter().zip(&grid.rows) {
        lines.push(join(
            row.iter()
                .zip(&widths)
                .map(|((text, align), width)| pad(text, *width, *align)),
        ));
        if let Some(detail) = &view.detail {
            for line in detail.lines() {
                lines.push(format!("    {}", line));
            }
        }
    }

    match grid.footer {
        Footer::FetchingMore => lines.push("Loading more...".to_string()),
        Footer::Sentinel => lines.push("More rows available (use --pages)".to_string()),
        Footer::Summary { shown, total } => {
            lines.push(format!("Showing {} of {} records", shown, total))
        }
    }

    lines.join("\n")
}

fn join(cells: impl Iterator<Item = String>) -> String {
    cells.collect::<Vec<_>>().join(" | ").trim_end().to_string()
}

fn truncate(text: &str) -> String {
    let single_line = text.replace('\n', " ");
    if single_line.chars().count() <= MAX_CELL_WIDTH {
        return single_line;
    }
    let mut cut: String = single_line.chars().take(MAX_CELL_WIDTH - 3).collect();
    cut.push_str("...");
    cut
}

fn pad(text: &str, width: usize, align: Alignment) -> String {
    let fill = width.saturating_sub(text.chars().count());
    match align {
        Alignment::Left => format!("{}{}", text, " ".repeat(fill)),
        Alignment::Right => format!("{}{}", " ".repeat(fill), text),
        Alignment::Center => {
            let left = fill / 2;
            format!("{}{}{}", " ".repeat(left), text, " ".repeat(fill - left))
        }
    }
}
