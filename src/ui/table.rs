use tabled::{settings::Style, Table, Tabled};

use crate::pipeline::PackageFailure;

#[derive(Tabled)]
pub struct TableRow {
    #[tabled(rename = "Metric")]
    pub metric: String,
    #[tabled(rename = "Value")]
    pub value: String,
}

#[derive(Tabled)]
struct FailureRow<'a> {
    #[tabled(rename = "Package")]
    name: &'a str,
    #[tabled(rename = "Reason")]
    reason: &'a str,
}

#[derive(Default)]
pub struct TableBuilder {
    rows: Vec<TableRow>,
}

impl TableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_row(&mut self, label: &str, value: impl ToString) {
        self.rows.push(TableRow {
            metric: label.to_string(),
            value: value.to_string(),
        });
    }

    pub fn build(&self) -> String {
        if self.rows.is_empty() {
            return String::new();
        }

        Table::new(&self.rows).with(Style::rounded()).to_string()
    }
}

pub fn failures_table(failures: &[PackageFailure]) -> String {
    if failures.is_empty() {
        return String::new();
    }
    let rows: Vec<FailureRow<'_>> = failures
        .iter()
        .map(|f| FailureRow { name: &f.name, reason: &f.reason })
        .collect();
    Table::new(rows).with(Style::rounded()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_tables_render_nothing() {
        assert!(TableBuilder::new().build().is_empty());
        assert!(failures_table(&[]).is_empty());
    }

    #[test]
    fn test_rows_render() {
        let mut builder = TableBuilder::new();
        builder.add_row("Packages", 12);
        let out = builder.build();
        assert!(out.contains("Packages"));
        assert!(out.contains("12"));

        let failures = vec![PackageFailure { name: "flask".into(), reason: "status 404".into() }];
        let out = failures_table(&failures);
        assert!(out.contains("flask"));
        assert!(out.contains("status 404"));
    }
}
