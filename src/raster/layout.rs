//! Block and table layout of the report at a fixed page width.

use image::Rgb;

use super::{DisplayList, PaintOp, TextMetrics, TextStyle};
use crate::report::{ReportDocument, Section, Signatory, PLACEHOLDER};

/// Width of the report surface in CSS pixels (A4 at 96 dpi).
pub const SURFACE_WIDTH_PX: f32 = 794.0;

const PADDING: f32 = 24.0;
const CELL_PADDING: f32 = 8.0;
const TEXT_COLOR: Rgb<u8> = Rgb([0x1a, 0x1a, 0x1a]);
const RULE_COLOR: Rgb<u8> = Rgb([0, 0, 0]);
const BORDER_COLOR: Rgb<u8> = Rgb([0xd1, 0xd5, 0xdb]);
const NOTE_BORDER_COLOR: Rgb<u8> = Rgb([0x33, 0x33, 0x33]);
const HEADER_FILL: Rgb<u8> = Rgb([0xf3, 0xf4, 0xf6]);

const BODY: TextStyle = TextStyle::regular(14.0);
const SMALL: TextStyle = TextStyle::regular(12.0);
const HEADING: TextStyle = TextStyle::bold(14.0);

const GRADE_COLUMNS: [f32; 4] = [0.05, 0.45, 0.15, 0.35];
const ATTENDANCE_COLUMNS: [f32; 2] = [0.35, 0.65];
const PLACEHOLDER_COLUMNS: [f32; 4] = [0.05, 0.40, 0.30, 0.25];
const IDENTITY_LABEL_WIDTH: f32 = 180.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Align {
    Left,
    Center,
}

struct Cell {
    text: String,
    style: TextStyle,
    align: Align,
    /// Number of grid columns the cell covers.
    span: usize,
}

impl Cell {
    fn new(text: impl Into<String>, style: TextStyle, align: Align) -> Self {
        Self {
            text: text.into(),
            style,
            align,
            span: 1,
        }
    }

    fn spanning(mut self, span: usize) -> Self {
        self.span = span;
        self
    }
}

struct Row {
    cells: Vec<Cell>,
    fill: Option<Rgb<u8>>,
    min_height: f32,
}

impl Row {
    fn new(cells: Vec<Cell>) -> Self {
        Self {
            cells,
            fill: None,
            min_height: 0.0,
        }
    }

    fn filled(mut self, color: Rgb<u8>) -> Self {
        self.fill = Some(color);
        self
    }

    fn with_min_height(mut self, min_height: f32) -> Self {
        self.min_height = min_height;
        self
    }
}

struct Table<'a> {
    columns: &'a [f32],
    rows: Vec<Row>,
    border: Option<Rgb<u8>>,
    padding_x: f32,
    padding_y: f32,
}

struct Cursor<'m> {
    metrics: &'m dyn TextMetrics,
    list: DisplayList,
    x: f32,
    width: f32,
    y: f32,
}

impl<'m> Cursor<'m> {
    fn gap(&mut self, amount: f32) {
        self.y += amount;
    }

    fn rule(&mut self, thickness: f32, color: Rgb<u8>) {
        self.list.push(PaintOp::FillRect {
            x: self.x,
            y: self.y,
            width: self.width,
            height: thickness,
            color,
        });
        self.y += thickness;
    }

    fn stroke_box(&mut self, x: f32, y: f32, width: f32, height: f32, color: Rgb<u8>) {
        let edges = [
            (x, y, width, 1.0),
            (x, y + height - 1.0, width, 1.0),
            (x, y, 1.0, height),
            (x + width - 1.0, y, 1.0, height),
        ];
        for (x, y, width, height) in edges {
            self.list.push(PaintOp::FillRect {
                x,
                y,
                width,
                height,
                color,
            });
        }
    }

    /// Writes wrapped lines inside the horizontal band `[x, x + width)` starting
    /// at `y`; returns the height used.
    fn text_block(
        &mut self,
        text: &str,
        style: TextStyle,
        align: Align,
        x: f32,
        width: f32,
        y: f32,
    ) -> f32 {
        let lines = wrap_text(self.metrics, text, style, width);
        let line_height = style.line_height();
        for (index, line) in lines.iter().enumerate() {
            let offset = match align {
                Align::Left => 0.0,
                Align::Center => ((width - self.metrics.text_width(line, style)) / 2.0).max(0.0),
            };
            self.list.push(PaintOp::Text {
                x: x + offset,
                y: y + index as f32 * line_height,
                text: line.clone(),
                style,
                color: TEXT_COLOR,
            });
        }
        lines.len() as f32 * line_height
    }

    fn paragraph(&mut self, text: &str, style: TextStyle, align: Align) {
        let (x, width, y) = (self.x, self.width, self.y);
        self.y += self.text_block(text, style, align, x, width, y);
    }

    fn heading(&mut self, text: &str) {
        self.gap(16.0);
        self.paragraph(text, HEADING, Align::Left);
        self.gap(8.0);
    }

    fn table(&mut self, table: Table<'_>) {
        let column_widths: Vec<f32> = table.columns.iter().map(|f| f * self.width).collect();

        for row in table.rows {
            let top = self.y;
            let mut spans = Vec::with_capacity(row.cells.len());
            let mut column = 0;
            for cell in &row.cells {
                let end = (column + cell.span).min(column_widths.len());
                let x = self.x + column_widths[..column].iter().sum::<f32>();
                let width: f32 = column_widths[column..end].iter().sum();
                spans.push((x, width));
                column = end;
            }

            let content_height = row
                .cells
                .iter()
                .zip(&spans)
                .map(|(cell, (_, width))| {
                    let inner = (width - 2.0 * table.padding_x).max(1.0);
                    wrap_text(self.metrics, &cell.text, cell.style, inner).len() as f32
                        * cell.style.line_height()
                })
                .fold(0.0_f32, f32::max);
            let height = (content_height + 2.0 * table.padding_y).max(row.min_height);

            if let Some(fill) = row.fill {
                self.list.push(PaintOp::FillRect {
                    x: self.x,
                    y: top,
                    width: self.width,
                    height,
                    color: fill,
                });
            }

            for (cell, (x, width)) in row.cells.iter().zip(&spans) {
                let inner = (width - 2.0 * table.padding_x).max(1.0);
                self.text_block(
                    &cell.text,
                    cell.style,
                    cell.align,
                    x + table.padding_x,
                    inner,
                    top + table.padding_y,
                );
                if let Some(border) = table.border {
                    self.stroke_box(*x, top, *width, height, border);
                }
            }

            self.y = top + height;
        }
    }
}

/// Greedy word wrap; words wider than `max_width` are split between characters.
pub fn wrap_text(
    metrics: &dyn TextMetrics,
    text: &str,
    style: TextStyle,
    max_width: f32,
) -> Vec<String> {
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let mut line = String::new();
        for word in paragraph.split_whitespace() {
            let candidate = if line.is_empty() {
                word.to_string()
            } else {
                format!("{} {}", line, word)
            };
            if metrics.text_width(&candidate, style) <= max_width {
                line = candidate;
                continue;
            }

            if !line.is_empty() {
                lines.push(std::mem::take(&mut line));
            }
            if metrics.text_width(word, style) <= max_width {
                line = word.to_string();
                continue;
            }

            for ch in word.chars() {
                line.push(ch);
                if metrics.text_width(&line, style) > max_width && line.chars().count() > 1 {
                    line.pop();
                    lines.push(std::mem::replace(&mut line, ch.to_string()));
                }
            }
        }
        lines.push(line);
    }

    lines
}

/// Lays out `document` at [`SURFACE_WIDTH_PX`].
pub fn layout_document(document: &ReportDocument, metrics: &dyn TextMetrics) -> DisplayList {
    let mut cursor = Cursor {
        metrics,
        list: DisplayList::new(SURFACE_WIDTH_PX),
        x: PADDING,
        width: SURFACE_WIDTH_PX - 2.0 * PADDING,
        y: PADDING,
    };

    for section in document.sections() {
        layout_section(&mut cursor, section);
    }

    cursor.gap(PADDING);
    let height = cursor.y;
    let mut list = cursor.list;
    list.set_height(height);
    list
}

fn layout_section(cursor: &mut Cursor<'_>, section: &Section) {
    match section {
        Section::Header(header) => {
            cursor.paragraph(
                &header.school_name.to_uppercase(),
                TextStyle::bold(18.0),
                Align::Center,
            );
            cursor.gap(4.0);
            for line in [&header.address, &header.contact_line, &header.website]
                .into_iter()
                .flatten()
            {
                cursor.paragraph(line, SMALL, Align::Center);
                cursor.gap(2.0);
            }
            cursor.gap(10.0);
            // 3px double border
            cursor.rule(1.0, RULE_COLOR);
            cursor.gap(1.0);
            cursor.rule(1.0, RULE_COLOR);
            cursor.gap(24.0);
        }
        Section::Title(title) => {
            cursor.paragraph(
                &title.title.to_uppercase(),
                TextStyle::bold(16.0),
                Align::Center,
            );
            cursor.gap(8.0);
            cursor.paragraph(&title.period_line, BODY, Align::Center);
            cursor.gap(24.0);
        }
        Section::Identity(fields) => {
            let label_fraction = IDENTITY_LABEL_WIDTH / cursor.width;
            let columns = [label_fraction, 1.0 - label_fraction];
            let rows = fields
                .iter()
                .map(|field| {
                    Row::new(vec![
                        Cell::new(field.label, BODY, Align::Left),
                        Cell::new(format!(": {}", field.value), BODY, Align::Left),
                    ])
                })
                .collect();
            cursor.table(Table {
                columns: &columns,
                rows,
                border: None,
                padding_x: 0.0,
                padding_y: 4.0,
            });
            cursor.gap(16.0);
        }
        Section::Grades { heading, rows } => {
            cursor.heading(heading);
            let mut table_rows = vec![Row::new(vec![
                Cell::new("No", HEADING, Align::Center),
                Cell::new("Mata Pelajaran", HEADING, Align::Center),
                Cell::new("Nilai", HEADING, Align::Center),
                Cell::new("Capaian Kompetensi", HEADING, Align::Center),
            ])
            .filled(HEADER_FILL)];
            table_rows.extend(rows.iter().map(|row| {
                Row::new(vec![
                    Cell::new(row.number.to_string(), BODY, Align::Center),
                    Cell::new(row.subject.as_str(), BODY, Align::Left),
                    Cell::new(row.score.as_str(), TextStyle::bold(14.0), Align::Center),
                    Cell::new(row.competency.as_str(), BODY, Align::Left),
                ])
            }));
            cursor.table(Table {
                columns: &GRADE_COLUMNS,
                rows: table_rows,
                border: Some(BORDER_COLOR),
                padding_x: CELL_PADDING,
                padding_y: CELL_PADDING,
            });
            cursor.gap(16.0);
        }
        Section::Attendance { heading, summary } => {
            cursor.heading(heading);
            let rows = summary
                .rows()
                .iter()
                .map(|(label, days)| {
                    Row::new(vec![
                        Cell::new(*label, BODY, Align::Left),
                        Cell::new(format!("{} hari", days), BODY, Align::Left),
                    ])
                })
                .collect();
            cursor.table(Table {
                columns: &ATTENDANCE_COLUMNS,
                rows,
                border: Some(BORDER_COLOR),
                padding_x: CELL_PADDING,
                padding_y: CELL_PADDING,
            });
            cursor.gap(32.0);
        }
        Section::Placeholder(table) => {
            cursor.heading(table.heading);
            let header = Row::new(
                table
                    .columns
                    .iter()
                    .map(|column| Cell::new(*column, HEADING, Align::Center))
                    .collect(),
            )
            .filled(HEADER_FILL);
            let empty = Row::new(vec![Cell::new(PLACEHOLDER, BODY, Align::Center).spanning(4)])
                .with_min_height(40.0);
            cursor.table(Table {
                columns: &PLACEHOLDER_COLUMNS,
                rows: vec![header, empty],
                border: Some(BORDER_COLOR),
                padding_x: CELL_PADDING,
                padding_y: CELL_PADDING,
            });
            cursor.gap(16.0);
        }
        Section::NoteBox { heading } => {
            cursor.heading(heading);
            let (x, y, width) = (cursor.x, cursor.y, cursor.width);
            cursor.stroke_box(x, y, width, 80.0, NOTE_BORDER_COLOR);
            cursor.gap(80.0 + 16.0);
        }
        Section::Signatures(block) => {
            cursor.gap(64.0);
            let column_width = cursor.width / 3.0;
            let top = cursor.y;
            let mut bottom = top;
            for (index, signatory) in block.columns().into_iter().enumerate() {
                let x = cursor.x + index as f32 * column_width;
                let used = layout_signatory(cursor, signatory, x, column_width, top);
                bottom = bottom.max(top + used);
            }
            cursor.y = bottom;
        }
    }
}

fn layout_signatory(
    cursor: &mut Cursor<'_>,
    signatory: &Signatory,
    x: f32,
    width: f32,
    top: f32,
) -> f32 {
    let mut y = top;
    for line in &signatory.lines_above {
        y += cursor.text_block(line, BODY, Align::Center, x, width, y);
        y += 8.0;
    }
    y += 60.0;
    for line in &signatory.lines_below {
        if line.is_empty() {
            // signature line for a hand-written name
            let rule_width = width * 0.7;
            cursor.list.push(PaintOp::FillRect {
                x: x + (width - rule_width) / 2.0,
                y: y + 20.0,
                width: rule_width,
                height: 1.0,
                color: RULE_COLOR,
            });
            y += 21.0;
        } else {
            y += cursor.text_block(line, BODY, Align::Center, x, width, y);
        }
    }
    y - top
}
