//! Row and column model: array-shaped or map-shaped records, with the
//! comparison and matching rules used by filtering and sorting.

use std::borrow::Cow;
use std::cmp::Ordering;

use serde_json::{Map, Value};

/// One record of tabular data. A data set is homogeneous: every row shares
/// the shape of the first row.
#[derive(Clone, Debug, PartialEq)]
pub enum Row {
    /// Ordered list of string cells. Field keys are synthetic: `data1..dataN`.
    Cells(Vec<String>),
    /// Mapping from field name to JSON value (insertion order preserved).
    Fields(Map<String, Value>),
}

/// Column rendering hint. Carries no behavior.
#[derive(Clone, Debug, PartialEq)]
pub struct Column {
    pub name: String,
    pub label: String,
    pub sortable: Option<bool>,
    pub width: Option<u16>,
}

impl Column {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            label: name.clone(),
            name,
            sortable: None,
            width: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_width(mut self, width: u16) -> Self {
        self.width = Some(width);
        self
    }
}

/// Synthetic field key for cell index `i` (0-based), matching the `data1..dataN`
/// keys array-shaped rows expose to plugins and sorting.
pub fn cell_field_key(i: usize) -> String {
    format!("data{}", i + 1)
}

/// Resolve a field name to a cell index for array-shaped rows: either a
/// synthetic `dataN` key or the name of one of the column descriptors.
pub(crate) fn resolve_cell_index(field: &str, columns: &[Column]) -> Option<usize> {
    if let Some(n) = field.strip_prefix("data").and_then(|s| s.parse::<usize>().ok()) {
        if n >= 1 {
            return Some(n - 1);
        }
    }
    columns.iter().position(|c| c.name == field)
}

/// Display text for a JSON value. Null renders empty; strings render bare
/// (no quotes); everything else uses its JSON representation.
pub fn value_str(value: &Value) -> Cow<'_, str> {
    match value {
        Value::Null => Cow::Borrowed(""),
        Value::String(s) => Cow::Borrowed(s.as_str()),
        other => Cow::Owned(other.to_string()),
    }
}

impl Row {
    /// Number of cells/fields in this row.
    pub fn len(&self) -> usize {
        match self {
            Row::Cells(cells) => cells.len(),
            Row::Fields(fields) => fields.len(),
        }
    }

    /// Display text for the cell at `index`, in column order.
    pub fn display(&self, index: usize) -> Cow<'_, str> {
        match self {
            Row::Cells(cells) => cells
                .get(index)
                .map(|s| Cow::Borrowed(s.as_str()))
                .unwrap_or_default(),
            Row::Fields(fields) => fields
                .values()
                .nth(index)
                .map(value_str)
                .unwrap_or_default(),
        }
    }

    /// Field key for the cell at `index`: the field name for map-shaped rows,
    /// the synthetic `dataN` key for array-shaped rows.
    pub fn field_key(&self, index: usize) -> String {
        match self {
            Row::Cells(_) => cell_field_key(index),
            Row::Fields(fields) => fields
                .keys()
                .nth(index)
                .cloned()
                .unwrap_or_else(|| cell_field_key(index)),
        }
    }

    /// Case-insensitive substring match against this row. Array-shaped rows
    /// match on any cell; map-shaped rows match only on string-valued fields.
    /// `query_lower` must already be lower-cased.
    pub fn matches(&self, query_lower: &str) -> bool {
        match self {
            Row::Cells(cells) => cells
                .iter()
                .any(|cell| cell.to_lowercase().contains(query_lower)),
            Row::Fields(fields) => fields.values().any(|value| match value {
                Value::String(s) => s.to_lowercase().contains(query_lower),
                _ => false,
            }),
        }
    }
}

/// Compare two rows by `field`. Rows missing the field on either side compare
/// equal. Strings compare case-insensitively (upper-cased); numbers compare
/// numerically; booleans by native order; mixed types compare equal.
pub(crate) fn compare_rows(a: &Row, b: &Row, field: &str, columns: &[Column]) -> Ordering {
    match (a, b) {
        (Row::Fields(fa), Row::Fields(fb)) => match (fa.get(field), fb.get(field)) {
            (Some(va), Some(vb)) => compare_values(va, vb),
            _ => Ordering::Equal,
        },
        (Row::Cells(ca), Row::Cells(cb)) => {
            let Some(index) = resolve_cell_index(field, columns) else {
                return Ordering::Equal;
            };
            match (ca.get(index), cb.get(index)) {
                (Some(sa), Some(sb)) => compare_ci(sa, sb),
                _ => Ordering::Equal,
            }
        }
        // Mixed shapes never sort; acquisition rejects them anyway.
        _ => Ordering::Equal,
    }
}

fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::String(sa), Value::String(sb)) => compare_ci(sa, sb),
        (Value::Number(na), Value::Number(nb)) => {
            match (na.as_f64(), nb.as_f64()) {
                (Some(fa), Some(fb)) => fa.partial_cmp(&fb).unwrap_or(Ordering::Equal),
                _ => Ordering::Equal,
            }
        }
        (Value::Bool(ba), Value::Bool(bb)) => ba.cmp(bb),
        _ => Ordering::Equal,
    }
}

fn compare_ci(a: &str, b: &str) -> Ordering {
    a.to_uppercase().cmp(&b.to_uppercase())
}

/// Derive column descriptors from the first row: field names for map-shaped
/// rows, `data1..dataN` for array-shaped rows. Empty when there are no rows.
pub fn derive_columns(rows: &[Row]) -> Vec<Column> {
    match rows.first() {
        Some(Row::Fields(fields)) => fields.keys().map(Column::new).collect(),
        Some(Row::Cells(cells)) => (0..cells.len())
            .map(|i| Column::new(cell_field_key(i)))
            .collect(),
        None => Vec::new(),
    }
}
