/// Plain-text table for terminal output, columns padded to the widest cell
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    col_widths: Vec<usize>,
}

impl Table {
    pub fn new(headers: &[&str]) -> Self {
        Table {
            col_widths: headers.iter().map(|h| h.chars().count()).collect(),
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    /// Add a row; cells beyond the header count are dropped
    pub fn add_row(&mut self, row: Vec<String>) {
        for (i, cell) in row.iter().enumerate() {
            if let Some(width) = self.col_widths.get_mut(i) {
                *width = (*width).max(cell.chars().count());
            }
        }
        self.rows.push(row);
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn render(&self) -> String {
        let mut output = self.render_row(&self.headers);
        output.push('\n');
        output.push_str(&self.render_separator());

        for row in &self.rows {
            output.push('\n');
            output.push_str(&self.render_row(row));
        }

        output
    }

    fn render_row(&self, row: &[String]) -> String {
        let cells: Vec<String> = self
            .col_widths
            .iter()
            .enumerate()
            .map(|(i, &width)| {
                let cell = row.get(i).map(String::as_str).unwrap_or("");
                format!("{:<width$}", cell, width = width)
            })
            .collect();
        cells.join(" | ").trim_end().to_string()
    }

    fn render_separator(&self) -> String {
        self.col_widths
            .iter()
            .map(|&width| "-".repeat(width))
            .collect::<Vec<_>>()
            .join("-+-")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_table() {
        let mut table = Table::new(&["Kind", "Amount"]);
        table.add_row(vec!["deposit".into(), "50".into()]);
        table.add_row(vec!["transfer".into(), "20".into()]);

        let rendered = table.render();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "Kind     | Amount");
        assert_eq!(lines[1], "---------+-------");
        assert_eq!(lines[3], "transfer | 20");
    }

    #[test]
    fn test_short_rows_are_padded() {
        let mut table = Table::new(&["A", "B"]);
        table.add_row(vec!["x".into()]);
        assert!(!table.is_empty());
        assert_eq!(table.render().lines().last(), Some("x |"));
    }
}
