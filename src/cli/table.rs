use crate::cli::style::UiStyle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Right,
}

/// Declarative description of a table column.
#[derive(Debug, Clone)]
pub struct TableColumn {
    pub header: String,
    pub min_width: usize,
    pub align: Align,
}

impl TableColumn {
    pub fn left(header: impl Into<String>, min_width: usize) -> Self {
        Self {
            header: header.into(),
            min_width,
            align: Align::Left,
        }
    }

    pub fn right(header: impl Into<String>, min_width: usize) -> Self {
        Self {
            header: header.into(),
            min_width,
            align: Align::Right,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TableRow {
    pub cells: Vec<String>,
    /// Rendered with the negative-balance style.
    pub negative: bool,
}

/// Simple table model used for rendering read-only overviews.
#[derive(Debug, Clone)]
pub struct Table {
    pub title: Option<String>,
    pub columns: Vec<TableColumn>,
    pub rows: Vec<TableRow>,
}

impl Table {
    pub fn new(title: Option<impl Into<String>>, columns: Vec<TableColumn>) -> Self {
        Self {
            title: title.map(Into::into),
            columns,
            rows: Vec::new(),
        }
    }

    pub fn add_row<S: Into<String>>(&mut self, cells: Vec<S>) {
        self.push_row(cells, false);
    }

    pub fn push_row<S: Into<String>>(&mut self, cells: Vec<S>, negative: bool) {
        self.rows.push(TableRow {
            cells: cells.into_iter().map(Into::into).collect(),
            negative,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn widths(&self) -> Vec<usize> {
        self.columns
            .iter()
            .enumerate()
            .map(|(idx, column)| {
                self.rows
                    .iter()
                    .filter_map(|row| row.cells.get(idx))
                    .map(|cell| cell.chars().count())
                    .chain([column.header.chars().count(), column.min_width])
                    .max()
                    .unwrap_or(column.min_width)
            })
            .collect()
    }
}

/// Renders [`Table`] instances using padded columns.
pub struct TableRenderer;

impl TableRenderer {
    pub fn render(table: &Table, style: &UiStyle) -> String {
        let widths = table.widths();
        let total_width = widths.iter().map(|width| width + 2).sum::<usize>();
        let mut lines = Vec::new();

        if let Some(title) = &table.title {
            lines.push(style.apply_header_style(title));
        }
        let header = Self::line(
            table.columns.iter().map(|column| column.header.as_str()),
            &table.columns,
            &widths,
        );
        lines.push(style.apply_header_style(&header));
        lines.push(style.horizontal_line(total_width));

        for row in &table.rows {
            let line = Self::line(
                row.cells.iter().map(String::as_str),
                &table.columns,
                &widths,
            );
            if row.negative {
                lines.push(style.apply_balance_style(&line, -1.0));
            } else {
                lines.push(line);
            }
        }
        lines.join("\n")
    }

    pub fn print(table: &Table, style: &UiStyle) {
        println!("{}", Self::render(table, style));
    }

    fn line<'a>(
        cells: impl Iterator<Item = &'a str>,
        columns: &[TableColumn],
        widths: &[usize],
    ) -> String {
        let padded: Vec<String> = cells
            .zip(columns.iter().zip(widths))
            .map(|(cell, (column, width))| match column.align {
                Align::Left => format!("{cell:<width$}"),
                Align::Right => format!("{cell:>width$}"),
            })
            .collect();
        padded.join("  ").trim_end().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn columns_grow_to_fit_cells_and_align() {
        let mut table = Table::new(
            None::<String>,
            vec![TableColumn::left("Day", 3), TableColumn::right("Amount", 4)],
        );
        table.add_row(vec!["Mon", "5.00"]);
        table.add_row(vec!["Tuesday", "1200.00"]);

        let rendered = TableRenderer::render(&table, &UiStyle::new(false));
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[0], "Day       Amount");
        assert_eq!(lines[2], "Mon         5.00");
        assert_eq!(lines[3], "Tuesday  1200.00");
    }
}
