use std::sync::Arc;

use crate::types::SqlValue;

/// A single row from a query result, with column names shared across the
/// whole result set.
#[derive(Debug, Clone)]
pub struct Row {
    pub column_names: Arc<Vec<String>>,
    pub values: Vec<SqlValue>,
}

impl Row {
    /// Get a value by column name, or None if the column is absent.
    #[must_use]
    pub fn get(&self, column_name: &str) -> Option<&SqlValue> {
        let idx = self
            .column_names
            .iter()
            .position(|name| name == column_name)?;
        self.values.get(idx)
    }

    #[must_use]
    pub fn get_by_index(&self, index: usize) -> Option<&SqlValue> {
        self.values.get(index)
    }
}

/// Materialized result of a query execution.
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    pub rows: Vec<Row>,
    /// Rows affected, for DML statements.
    pub rows_affected: usize,
    column_names: Option<Arc<Vec<String>>>,
}

impl ResultSet {
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            rows: Vec::with_capacity(capacity),
            rows_affected: 0,
            column_names: None,
        }
    }

    pub fn set_column_names(&mut self, names: Arc<Vec<String>>) {
        self.column_names = Some(names);
    }

    #[must_use]
    pub fn column_names(&self) -> Option<&Arc<Vec<String>>> {
        self.column_names.as_ref()
    }

    /// Append a row sharing this result set's column names.
    pub fn add_row_values(&mut self, values: Vec<SqlValue>) {
        let column_names = self
            .column_names
            .get_or_insert_with(|| Arc::new(Vec::new()))
            .clone();
        self.rows.push(Row {
            column_names,
            values,
        });
        self.rows_affected += 1;
    }

    #[must_use]
    pub fn first_row(&self) -> Option<&Row> {
        self.rows.first()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_share_column_names() {
        let mut rs = ResultSet::with_capacity(2);
        rs.set_column_names(Arc::new(vec!["id".into(), "name".into()]));
        rs.add_row_values(vec![SqlValue::Int(1), SqlValue::Text("a".into())]);
        rs.add_row_values(vec![SqlValue::Int(2), SqlValue::Text("b".into())]);
        assert_eq!(rs.rows_affected, 2);
        assert_eq!(rs.rows[1].get("name"), Some(&SqlValue::Text("b".into())));
        assert_eq!(rs.rows[0].get("missing"), None);
        assert!(Arc::ptr_eq(
            &rs.rows[0].column_names,
            &rs.rows[1].column_names
        ));
    }
}
