//! Table insertion, deletion and cell navigation.
//!
//! Inserted tables are `contenteditable=false` at the container with every
//! cell editable on its own, so generic text editing cannot tear rows or
//! columns out of the structure.

use std::fmt::Write;

use crate::config::TableConfig;
use crate::dom::{Dom, NodeId};
use crate::error::EditorError;
use crate::range::{common_ancestor, delete_contents, insert_nodes, point_before};
use crate::style;
use crate::types::{BoundaryPoint, DomRange};

pub const TABLE_CLASS: &str = "editor-table";
/// Largest row or column count a single insert builds.
pub const MAX_TABLE_DIMENSION: usize = 100;
const CELL_NAMES: &[&str] = &["td", "th"];

/// Shape and border of a table to insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSpec {
    pub rows: usize,
    pub cols: usize,
    pub header: bool,
    pub border_color: String,
    pub border_size: u32,
}

impl TableSpec {
    pub fn new(rows: usize, cols: usize, header: bool, defaults: &TableConfig) -> Self {
        Self {
            rows: rows.clamp(1, MAX_TABLE_DIMENSION),
            cols: cols.clamp(1, MAX_TABLE_DIMENSION),
            header,
            border_color: defaults.border_color.clone(),
            border_size: defaults.border_size.max(1),
        }
    }

    /// Build from raw dialog fields.
    ///
    /// Row and column counts are read like an integer prefix (`"3 rows"` is
    /// 3); anything without leading digits is invalid. Counts are clamped
    /// to `1..=MAX_TABLE_DIMENSION`. An empty color or an unreadable or
    /// out-of-range border size falls back to `defaults`.
    pub fn from_input(
        rows: &str,
        cols: &str,
        header: bool,
        border_color: &str,
        border_size: &str,
        defaults: &TableConfig,
    ) -> Result<Self, EditorError> {
        let rows = parse_int_prefix(rows)
            .ok_or_else(|| EditorError::InvalidInput(format!("row count {rows:?}")))?;
        let cols = parse_int_prefix(cols)
            .ok_or_else(|| EditorError::InvalidInput(format!("column count {cols:?}")))?;
        let border_color = border_color.trim();
        let border_size = parse_int_prefix(border_size)
            .filter(|&n| n > 0)
            .and_then(|n| u32::try_from(n).ok())
            .unwrap_or(defaults.border_size);

        Ok(Self {
            rows: clamp_dimension(rows),
            cols: clamp_dimension(cols),
            header,
            border_color: if border_color.is_empty() {
                defaults.border_color.clone()
            } else {
                border_color.to_string()
            },
            border_size: border_size.max(1),
        })
    }

    /// Parse the quick-entry form `"3x2"` (or `3×2`) as rows by columns.
    pub fn parse_dimensions(input: &str, defaults: &TableConfig) -> Result<Self, EditorError> {
        let lower = input.trim().to_lowercase();
        let (rows, cols) = lower
            .split_once(['x', '×'])
            .ok_or_else(|| EditorError::InvalidInput(format!("table size {input:?}")))?;
        let parse = |s: &str| {
            let s = s.trim();
            if s.is_empty() || !s.chars().all(|c| c.is_ascii_digit()) {
                return None;
            }
            Some(s.parse::<usize>().unwrap_or(usize::MAX))
        };
        match (parse(rows), parse(cols)) {
            (Some(r), Some(c)) => Ok(Self::new(r, c, false, defaults)),
            _ => Err(EditorError::InvalidInput(format!("table size {input:?}"))),
        }
    }

    fn border(&self) -> String {
        format!("{}px solid {}", self.border_size, self.border_color)
    }

    pub fn table_style(&self) -> String {
        format!("border:{}; border-collapse: collapse;", self.border())
    }

    pub fn cell_style(&self) -> String {
        format!(
            "border:{}; padding:4px; vertical-align: top;",
            self.border()
        )
    }

    /// Markup for the whole table.
    pub fn to_html(&self) -> String {
        let cell_style = self.cell_style();
        let mut out = String::new();
        let _ = write!(
            out,
            r#"<table class="{TABLE_CLASS}" style="{}" contenteditable="false">"#,
            self.table_style()
        );
        if self.header {
            out.push_str("<thead><tr>");
            for _ in 0..self.cols {
                let _ = write!(
                    out,
                    r#"<th style="{cell_style}" contenteditable="true"><br></th>"#
                );
            }
            out.push_str("</tr></thead>");
        }
        out.push_str("<tbody>");
        for _ in 0..self.rows {
            out.push_str("<tr>");
            for _ in 0..self.cols {
                let _ = write!(
                    out,
                    r#"<td style="{cell_style}" contenteditable="true"><br></td>"#
                );
            }
            out.push_str("</tr>");
        }
        out.push_str("</tbody></table>");
        out
    }

    /// Build the table directly in `dom`, detached.
    pub fn build(&self, dom: &mut Dom) -> NodeId {
        let table = dom.create_element("table");
        dom.set_attr(table, "class", TABLE_CLASS);
        dom.set_attr(table, "style", &self.table_style());
        dom.set_attr(table, "contenteditable", "false");

        let cell_style = self.cell_style();
        if self.header {
            let thead = dom.create_element("thead");
            let tr = self.build_row(dom, "th", &cell_style);
            dom.append_child(thead, tr);
            dom.append_child(table, thead);
        }
        let tbody = dom.create_element("tbody");
        for _ in 0..self.rows {
            let tr = self.build_row(dom, "td", &cell_style);
            dom.append_child(tbody, tr);
        }
        dom.append_child(table, tbody);
        table
    }

    fn build_row(&self, dom: &mut Dom, cell_name: &str, cell_style: &str) -> NodeId {
        let tr = dom.create_element("tr");
        for _ in 0..self.cols {
            let cell = new_cell(dom, cell_name, cell_style);
            dom.append_child(tr, cell);
        }
        tr
    }
}

fn new_cell(dom: &mut Dom, name: &str, style: &str) -> NodeId {
    let cell = dom.create_element(name);
    if !style.is_empty() {
        dom.set_attr(cell, "style", style);
    }
    dom.set_attr(cell, "contenteditable", "true");
    let br = dom.create_element("br");
    dom.append_child(cell, br);
    cell
}

fn clamp_dimension(n: i64) -> usize {
    usize::try_from(n.max(1)).map_or(MAX_TABLE_DIMENSION, |n| n.min(MAX_TABLE_DIMENSION))
}

/// Integer prefix of a trimmed string, `parseInt` style.
fn parse_int_prefix(input: &str) -> Option<i64> {
    let s = input.trim();
    let (sign, digits) = match s.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, s.strip_prefix('+').unwrap_or(s)),
    };
    let end = digits
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map(|(i, _)| i)
        .unwrap_or(digits.len());
    // Saturate instead of failing on absurdly long digit runs.
    let value = digits[..end]
        .parse::<i64>()
        .ok()
        .or_else(|| (end > 0).then_some(i64::MAX))?;
    Some(sign * value)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsertedTable {
    pub table: NodeId,
    pub first_cell: NodeId,
    pub selection: DomRange,
}

/// Insert a table at the selection (replacing selected content) or at the
/// end of the surface, with the caret at the end of the table's first cell.
pub fn insert_table(
    dom: &mut Dom,
    surface: NodeId,
    selection: Option<DomRange>,
    spec: &TableSpec,
) -> Option<InsertedTable> {
    let table = spec.build(dom);

    let placed = match selection {
        Some(mut range) => {
            delete_contents(dom, &mut range);
            insert_nodes(dom, &mut range, &[table]).is_some()
        }
        None => false,
    };
    if !placed {
        dom.append_child(surface, table);
    }

    let first_cell = cells(dom, table).into_iter().next()?;
    let selection = DomRange::caret(BoundaryPoint::new(first_cell, dom.node_length(first_cell)));
    tracing::debug!(
        target: "consent_editor::ops",
        %table,
        rows = spec.rows,
        cols = spec.cols,
        header = spec.header,
        "inserted table"
    );
    Some(InsertedTable {
        table,
        first_cell,
        selection,
    })
}

/// Remove the table enclosing the selection and return the point where it
/// stood. `None` when there is no table.
pub fn delete_table(dom: &mut Dom, surface: NodeId, range: &DomRange) -> Option<BoundaryPoint> {
    let common = common_ancestor(dom, range);
    let table = dom
        .closest(common, &["table"])
        .filter(|&t| t != surface && dom.contains(surface, t))?;
    let at = point_before(dom, table)?;
    dom.detach(table);
    tracing::debug!(target: "consent_editor::ops", %table, "deleted table");
    Some(at)
}

/// The `td`/`th` inside the surface that contains `node`.
pub fn closest_cell(dom: &Dom, surface: NodeId, node: NodeId) -> Option<NodeId> {
    dom.closest(node, CELL_NAMES)
        .filter(|&c| c != surface && dom.contains(surface, c))
}

/// Cells of `table` in reading order, skipping those of nested tables.
fn cells(dom: &Dom, table: NodeId) -> Vec<NodeId> {
    dom.descendants(table)
        .filter(|&n| {
            dom.is_element_named(n, CELL_NAMES) && dom.closest(n, &["table"]) == Some(table)
        })
        .collect()
}

fn rows(dom: &Dom, table: NodeId) -> Vec<NodeId> {
    dom.descendants(table)
        .filter(|&n| dom.is_element_named(n, &["tr"]) && dom.closest(n, &["table"]) == Some(table))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellDirection {
    Forward,
    Backward,
}

/// Move from `cell` to the adjacent cell and return the caret at its start.
///
/// Going forward from the last cell appends a row shaped like the table's
/// first row; going back from the first cell stays on it.
pub fn navigate_cell(dom: &mut Dom, cell: NodeId, direction: CellDirection) -> Option<DomRange> {
    let table = dom.closest(cell, &["table"])?;
    let all = cells(dom, table);
    let idx = all.iter().position(|&c| c == cell)?;

    let target = match direction {
        CellDirection::Backward => all[idx.saturating_sub(1)],
        CellDirection::Forward if idx + 1 < all.len() => all[idx + 1],
        CellDirection::Forward => append_row(dom, table, cell)?,
    };
    Some(DomRange::caret(BoundaryPoint::new(target, 0)))
}

fn append_row(dom: &mut Dom, table: NodeId, current: NodeId) -> Option<NodeId> {
    let cols = rows(dom, table)
        .first()
        .map(|&tr| {
            dom.children(tr)
                .iter()
                .filter(|&&c| dom.is_element_named(c, CELL_NAMES))
                .count()
        })
        .unwrap_or(0)
        .max(1);

    let mut cell_style = String::new();
    if let Some(border) = dom.style_property(current, "border") {
        cell_style = style::set_property(&cell_style, "border", &border);
    }
    cell_style = style::set_property(&cell_style, "padding", "4px");

    let tr = dom.create_element("tr");
    for _ in 0..cols {
        let td = new_cell(dom, "td", &cell_style);
        dom.append_child(tr, td);
    }
    let body = dom
        .children(table)
        .iter()
        .copied()
        .find(|&c| dom.is_element_named(c, &["tbody"]))
        .unwrap_or(table);
    dom.append_child(body, tr);
    tracing::debug!(target: "consent_editor::ops", %table, cols, "appended table row");
    dom.first_child(tr)
}

/// Replace the selection with a `<br>` and put the caret after it.
pub fn insert_line_break(dom: &mut Dom, mut range: DomRange) -> Option<DomRange> {
    delete_contents(dom, &mut range);
    let br = dom.create_element("br");
    let (parent, index) = insert_nodes(dom, &mut range, &[br])?;
    Some(DomRange::caret(BoundaryPoint::new(parent, index + 1)))
}

/// Re-assert the editability split: cells editable, container not.
pub fn normalize_editability(dom: &mut Dom, table: NodeId) {
    for cell in cells(dom, table) {
        dom.set_attr(cell, "contenteditable", "true");
    }
    dom.set_attr(table, "contenteditable", "false");
}

/// The editor table enclosing `node`, if any.
pub fn closest_editor_table(dom: &Dom, node: NodeId) -> Option<NodeId> {
    std::iter::once(node)
        .chain(dom.ancestors(node))
        .find(|&n| dom.is_element_named(n, &["table"]) && dom.has_class(n, TABLE_CLASS))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_fragment;

    fn surface(markup: &str) -> (Dom, NodeId) {
        let mut dom = Dom::new();
        let root = dom.create_element("div");
        let doc = dom.document();
        dom.append_child(doc, root);
        dom.set_inner_html(root, markup);
        (dom, root)
    }

    fn defaults() -> TableConfig {
        TableConfig::default()
    }

    #[test]
    fn test_built_table_matches_markup() {
        let spec = TableSpec::new(2, 3, true, &defaults());
        let mut dom = Dom::new();
        let table = spec.build(&mut dom);
        let parsed = parse_fragment(&mut dom, &spec.to_html());
        assert_eq!(dom.outer_html(table), dom.outer_html(parsed[0]));
    }

    #[test]
    fn test_insert_table_shape() {
        let (mut dom, root) = surface("<p>before</p>");
        let spec = TableSpec::new(2, 3, true, &defaults());
        let inserted = insert_table(&mut dom, root, None, &spec).unwrap();
        let table = inserted.table;

        assert_eq!(dom.attr(table, "contenteditable"), Some("false"));
        let header_cells = dom
            .descendants(table)
            .filter(|&n| dom.tag_name(n) == Some("th"))
            .count();
        assert_eq!(header_cells, 3);
        let body_rows: Vec<_> = dom
            .descendants(table)
            .filter(|&n| dom.tag_name(n) == Some("tr"))
            .filter(|&tr| dom.closest(tr, &["tbody"]).is_some())
            .collect();
        assert_eq!(body_rows.len(), 2);
        for tr in body_rows {
            assert_eq!(dom.children(tr).len(), 3);
        }
        assert!(cells(&dom, table)
            .iter()
            .all(|&c| dom.attr(c, "contenteditable") == Some("true")));
        assert_eq!(
            inserted.selection,
            DomRange::caret(BoundaryPoint::new(inserted.first_cell, 1))
        );
    }

    #[test]
    fn test_insert_replaces_selection() {
        let (mut dom, root) = surface("<p>abcdef</p>");
        let text = dom.first_child(dom.first_child(root).unwrap()).unwrap();
        let range = DomRange::new(BoundaryPoint::new(text, 2), BoundaryPoint::new(text, 4));
        let spec = TableSpec::new(1, 1, false, &defaults());
        let inserted = insert_table(&mut dom, root, Some(range), &spec).unwrap();
        assert_eq!(dom.text_content(root), "abef");
        assert_eq!(dom.closest(inserted.table, &["p"]), dom.first_child(root));
    }

    #[test]
    fn test_from_input_coerces_counts() {
        let spec = TableSpec::from_input("0", "-4", false, "", "abc", &defaults()).unwrap();
        assert_eq!((spec.rows, spec.cols), (1, 1));
        assert_eq!(spec.border_color, "#000000");
        assert_eq!(spec.border_size, 1);

        let spec = TableSpec::from_input(" 3 rows", "2", true, "#ff0000", "2", &defaults()).unwrap();
        assert_eq!((spec.rows, spec.cols, spec.border_size), (3, 2, 2));
        assert_eq!(spec.cell_style(), "border:2px solid #ff0000; padding:4px; vertical-align: top;");

        assert!(matches!(
            TableSpec::from_input("many", "2", false, "", "", &defaults()),
            Err(EditorError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_oversized_input_is_bounded() {
        let spec =
            TableSpec::from_input("99999999", "12", false, "", "4294967297", &defaults()).unwrap();
        assert_eq!((spec.rows, spec.cols), (MAX_TABLE_DIMENSION, 12));
        assert_eq!(spec.border_size, defaults().border_size);

        let spec = TableSpec::from_input("1", "99999999999999999999999", false, "", "3", &defaults())
            .unwrap();
        assert_eq!((spec.cols, spec.border_size), (MAX_TABLE_DIMENSION, 3));

        let spec = TableSpec::parse_dimensions("500x2", &defaults()).unwrap();
        assert_eq!((spec.rows, spec.cols), (MAX_TABLE_DIMENSION, 2));
    }

    #[test]
    fn test_parse_dimensions() {
        let spec = TableSpec::parse_dimensions(" 3 X 2 ", &defaults()).unwrap();
        assert_eq!((spec.rows, spec.cols), (3, 2));
        assert!(TableSpec::parse_dimensions("3by2", &defaults()).is_err());
    }

    #[test]
    fn test_tab_past_last_cell_appends_row() {
        let (mut dom, root) = surface("");
        let spec = TableSpec::new(1, 2, true, &defaults());
        let inserted = insert_table(&mut dom, root, None, &spec).unwrap();
        let table = inserted.table;
        let last = *cells(&dom, table).last().unwrap();

        let caret = navigate_cell(&mut dom, last, CellDirection::Forward).unwrap();
        let all = cells(&dom, table);
        assert_eq!(all.len(), 6);
        assert_eq!(caret, DomRange::caret(BoundaryPoint::new(all[4], 0)));
        assert_eq!(
            dom.attr(all[4], "style"),
            Some("border: 1px solid #000000; padding: 4px;")
        );
    }

    #[test]
    fn test_shift_tab_stays_on_first_cell() {
        let (mut dom, root) = surface("");
        let spec = TableSpec::new(2, 2, false, &defaults());
        let inserted = insert_table(&mut dom, root, None, &spec).unwrap();
        let caret = navigate_cell(&mut dom, inserted.first_cell, CellDirection::Backward).unwrap();
        assert_eq!(caret, DomRange::caret(BoundaryPoint::new(inserted.first_cell, 0)));

        let second = cells(&dom, inserted.table)[1];
        let caret = navigate_cell(&mut dom, second, CellDirection::Backward).unwrap();
        assert_eq!(caret.start.node, inserted.first_cell);
    }

    #[test]
    fn test_delete_table() {
        let (mut dom, root) = surface(
            r#"<p>x</p><table class="editor-table"><tbody><tr><td>cell</td></tr></tbody></table>"#,
        );
        let td = dom
            .descendants(root)
            .find(|&n| dom.tag_name(n) == Some("td"))
            .unwrap();
        let text = dom.first_child(td).unwrap();
        let range = DomRange::caret(BoundaryPoint::new(text, 1));
        assert_eq!(
            delete_table(&mut dom, root, &range),
            Some(BoundaryPoint::new(root, 1))
        );
        assert_eq!(dom.inner_html(root), "<p>x</p>");

        let p_text = dom.first_child(dom.first_child(root).unwrap()).unwrap();
        let range = DomRange::caret(BoundaryPoint::new(p_text, 0));
        assert!(delete_table(&mut dom, root, &range).is_none());
        assert_eq!(dom.inner_html(root), "<p>x</p>");
    }

    #[test]
    fn test_line_break_in_cell() {
        let (mut dom, root) = surface("<p>ab</p>");
        let text = dom.first_child(dom.first_child(root).unwrap()).unwrap();
        let caret = insert_line_break(&mut dom, DomRange::caret(BoundaryPoint::new(text, 1))).unwrap();
        assert_eq!(dom.inner_html(root), "<p>a<br>b</p>");
        assert_eq!(caret.start.offset, 2);
    }
}
