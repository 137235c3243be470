//! HTML output: the report markup and the two documents opened in new
//! browsing contexts (native print and PDF viewer).

use std::fmt::{self, Write as _};
use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::report::{ReportDocument, Section, Signatory, PLACEHOLDER};

/// Title of the native print window.
pub const PRINT_WINDOW_TITLE: &str = "Preview Rapor - Print";

/// Title of the PDF viewer window.
pub const VIEWER_WINDOW_TITLE: &str = "Preview Rapor";

/// Stylesheet of the native print document.
///
/// Table columns use fixed widths so the layout does not depend on the fonts
/// and resets of the context the markup is rendered in.
pub const PRINT_STYLESHEET: &str = "\
body { font-family: 'Plus Jakarta Sans', Arial, sans-serif; margin: 0; color: #000; }
.print-report { padding: 15mm; background: #fff; color: #000; }
.print-report h1, .print-report h2, .print-report h3, .print-report h4 { color: #000; }
.kop-rapor { text-align: center; margin-bottom: 8px; padding-bottom: 6px; border-bottom: 3px double #000; }
table { width: 100%; border-collapse: collapse; table-layout: fixed; font-size: 10pt; }
col.no-col { width:5%; }
col.subject-col { width:45%; }
col.grade-col { width:15%; }
col.competency-col { width:35%; }
th, td { border: 1px solid #000; padding: 6px 6px; vertical-align: top; word-break: break-word; }
th { background: #f0f0f0; text-align: center; font-weight: 600; }
.student-info { display: block; margin-bottom: 8px; }
.student-info .row { display:flex; justify-content:space-between; }
.attendance_tbl td:first-child { width: 35%; font-weight: 600; }
table.borderless-table td { border: none; }
@page { size: A4; margin: 15mm; }
@media print { button { display: none; } }
";

/// Escapes text for HTML element content and attribute values.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Renders the inner markup of the report element.
pub fn report_markup(document: &ReportDocument) -> String {
    let mut out = String::new();
    for section in document.sections() {
        // Writing into a String cannot fail.
        let _ = write_section(&mut out, section);
    }
    out
}

fn write_section(out: &mut String, section: &Section) -> fmt::Result {
    match section {
        Section::Header(header) => {
            writeln!(
                out,
                "<div class=\"kop-rapor\"><h2>{}</h2>",
                escape(&header.school_name.to_uppercase())
            )?;
            for line in [&header.address, &header.contact_line, &header.website]
                .into_iter()
                .flatten()
            {
                writeln!(out, "<p>{}</p>", escape(line))?;
            }
            writeln!(out, "</div>")
        }
        Section::Title(title) => writeln!(
            out,
            "<div class=\"judul-rapor\"><h3>{}</h3><p>{}</p></div>",
            escape(&title.title.to_uppercase()),
            escape(&title.period_line)
        ),
        Section::Identity(fields) => {
            writeln!(out, "<table class=\"borderless-table student-info\"><tbody>")?;
            for field in fields {
                writeln!(
                    out,
                    "<tr><td style=\"width: 180px\">{}</td><td>: {}</td></tr>",
                    escape(field.label),
                    escape(&field.value)
                )?;
            }
            writeln!(out, "</tbody></table>")
        }
        Section::Grades { heading, rows } => {
            writeln!(out, "<h4>{}</h4>", escape(heading))?;
            writeln!(
                out,
                "<table class=\"grades_tbl\"><colgroup><col class=\"no-col\" />\
                 <col class=\"subject-col\" /><col class=\"grade-col\" />\
                 <col class=\"competency-col\" /></colgroup>"
            )?;
            writeln!(
                out,
                "<thead><tr><th class=\"no-col\">No</th><th class=\"subject-col\">Mata Pelajaran</th>\
                 <th class=\"grade-col\">Nilai</th><th class=\"competency-col\">Capaian Kompetensi</th></tr></thead>"
            )?;
            writeln!(out, "<tbody>")?;
            for row in rows {
                writeln!(
                    out,
                    "<tr><td class=\"no-col\">{}</td><td class=\"subject-col\">{}</td>\
                     <td class=\"grade-col\">{}</td><td class=\"competency-col\">{}</td></tr>",
                    row.number,
                    escape(&row.subject),
                    escape(&row.score),
                    escape(&row.competency)
                )?;
            }
            writeln!(out, "</tbody></table>")
        }
        Section::Attendance { heading, summary } => {
            writeln!(out, "<h4>{}</h4>", escape(heading))?;
            writeln!(out, "<table class=\"attendance_tbl\"><tbody>")?;
            for (label, days) in summary.rows() {
                writeln!(out, "<tr><td>{}</td><td>{} hari</td></tr>", label, days)?;
            }
            writeln!(out, "</tbody></table>")
        }
        Section::Placeholder(table) => {
            writeln!(out, "<h4>{}</h4>", escape(table.heading))?;
            write!(out, "<table><thead><tr>")?;
            for (column, width) in table.columns.iter().zip(["5%", "40%", "30%", "25%"]) {
                write!(out, "<th style=\"width: {}\">{}</th>", width, escape(column))?;
            }
            writeln!(out, "</tr></thead>")?;
            writeln!(
                out,
                "<tbody><tr><td colspan=\"4\" style=\"height: 40px\">{}</td></tr></tbody></table>",
                PLACEHOLDER
            )
        }
        Section::NoteBox { heading } => {
            writeln!(out, "<h4>{}</h4>", escape(heading))?;
            writeln!(
                out,
                "<div class=\"catatan\" style=\"border: 1px solid #333; padding: 12px; min-height: 80px\"></div>"
            )
        }
        Section::Signatures(block) => {
            writeln!(out, "<table class=\"borderless-table ttd\"><tbody><tr>")?;
            for column in block.columns() {
                write_signatory(out, column)?;
            }
            writeln!(out, "</tr></tbody></table>")
        }
    }
}

fn write_signatory(out: &mut String, signatory: &Signatory) -> fmt::Result {
    write!(out, "<td style=\"width: 33%; text-align: center\">")?;
    for line in &signatory.lines_above {
        write!(out, "<div>{}</div>", escape(line))?;
    }
    write!(out, "<div style=\"height: 60px\"></div>")?;
    for line in &signatory.lines_below {
        write!(out, "<div>{}</div>", escape(line))?;
    }
    writeln!(out, "</td>")
}

/// Wraps cloned report markup into the standalone native print document.
///
/// The document triggers the print dialog `print_delay` after it finished
/// loading, giving the browser time to lay it out.
pub fn print_document(report_markup: &str, print_delay: Duration) -> String {
    format!(
        "<html>\n<head>\n<title>{title}</title>\n<style>{style}</style>\n</head>\n<body>\n\
         <div class=\"print-report\">{markup}</div>\n\
         <script>window.onload = function(){{ setTimeout(()=>window.print(), {delay}); }};</script>\n\
         </body>\n</html>\n",
        title = PRINT_WINDOW_TITLE,
        style = PRINT_STYLESHEET,
        markup = report_markup,
        delay = print_delay.as_millis(),
    )
}

/// Returns the `data:` URI carrying `pdf_bytes`.
///
/// The file name is percent-encoded, so commas and semicolons in a student's
/// name cannot end the media type early.
pub fn pdf_data_uri(pdf_bytes: &[u8], file_name: &str) -> String {
    format!(
        "data:application/pdf;filename={};base64,{}",
        urlencoding::encode(file_name),
        STANDARD.encode(pdf_bytes)
    )
}

/// Builds the viewer document that shows the PDF in a full-viewport frame and
/// prints it once loaded.
pub fn pdf_viewer_document(pdf_bytes: &[u8], file_name: &str) -> String {
    format!(
        "<html>\n<head>\n<title>{title}</title>\n</head>\n<body style=\"margin:0; padding:0;\">\n\
         <iframe src=\"{src}\" style=\"width:100%; height:100vh; border:none;\" onload=\"window.print();\"></iframe>\n\
         </body>\n</html>\n",
        title = VIEWER_WINDOW_TITLE,
        src = pdf_data_uri(pdf_bytes, file_name),
    )
}
