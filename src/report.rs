//! Report renderer: turns the loaded records into a structured document.
//!
//! The renderer is a pure function of its inputs.  The school settings (and
//! with them the active reporting period) and the signing date are passed in
//! explicitly; nothing is read from ambient state.  The resulting
//! [`ReportDocument`] is a fixed sequence of [`Section`]s that both the HTML
//! writer in [`crate::html`] and the raster layout in [`crate::raster`]
//! consume.

use chrono::{Datelike, NaiveDate};

use crate::model::{Attendance, Period, ReportData, SchoolSettings, Student};

/// Text shown for any value the records do not provide.
pub const PLACEHOLDER: &str = "-";

/// Title printed under the school header.
pub const REPORT_TITLE: &str = "Laporan Hasil Belajar Peserta Didik";

const MONTHS_ID: [&str; 12] = [
    "Januari",
    "Februari",
    "Maret",
    "April",
    "Mei",
    "Juni",
    "Juli",
    "Agustus",
    "September",
    "Oktober",
    "November",
    "Desember",
];

/// Letterhead of the report.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SchoolHeader {
    pub school_name: String,
    pub address: Option<String>,
    /// `Telp: ... | Email: ...`, present when either part is configured.
    pub contact_line: Option<String>,
    pub website: Option<String>,
}

/// Report title together with the human readable period line.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ReportTitle {
    pub title: String,
    pub period_line: String,
}

/// A label/value pair of the student identity block.
#[derive(Clone, Debug, PartialEq)]
pub struct IdentityField {
    pub label: &'static str,
    pub value: String,
}

/// One row of the academic grade table.
#[derive(Clone, Debug, PartialEq)]
pub struct GradeRow {
    /// 1-based position in the subject list.
    pub number: usize,
    pub subject: String,
    pub score: String,
    pub competency: String,
}

/// Absence counters rendered in the attendance table.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AttendanceSummary {
    pub sick: u32,
    pub permitted: u32,
    pub unexcused: u32,
}

impl AttendanceSummary {
    /// Builds the summary from an optional record; missing counters are zero.
    pub fn from_record(record: Option<&Attendance>) -> Self {
        match record {
            Some(record) => Self {
                sick: record.sick.unwrap_or(0),
                permitted: record.permitted.unwrap_or(0),
                unexcused: record.unexcused.unwrap_or(0),
            },
            None => Self::default(),
        }
    }

    /// Returns the labelled rows in display order.
    pub fn rows(&self) -> [(&'static str, u32); 3] {
        [
            ("Sakit", self.sick),
            ("Izin", self.permitted),
            ("Tanpa Keterangan", self.unexcused),
        ]
    }
}

/// Empty table kept on the report for entries filled in by hand.
#[derive(Clone, Debug, PartialEq)]
pub struct PlaceholderTable {
    pub heading: &'static str,
    pub columns: [&'static str; 4],
}

/// A signature column: greeting lines, the space for the signature, then the
/// signer lines.
#[derive(Clone, Debug, PartialEq)]
pub struct Signatory {
    pub lines_above: Vec<String>,
    pub lines_below: Vec<String>,
}

/// Three signature columns: parent, homeroom teacher, principal.
#[derive(Clone, Debug, PartialEq)]
pub struct SignatureBlock {
    pub parent: Signatory,
    pub homeroom_teacher: Signatory,
    pub principal: Signatory,
}

impl SignatureBlock {
    /// Returns the columns from left to right.
    pub fn columns(&self) -> [&Signatory; 3] {
        [&self.parent, &self.homeroom_teacher, &self.principal]
    }
}

/// Fixed sections of the report, in the order they are emitted.
#[derive(Clone, Debug, PartialEq)]
pub enum Section {
    Header(SchoolHeader),
    Title(ReportTitle),
    Identity(Vec<IdentityField>),
    Grades {
        heading: &'static str,
        rows: Vec<GradeRow>,
    },
    Attendance {
        heading: &'static str,
        summary: AttendanceSummary,
    },
    Placeholder(PlaceholderTable),
    /// Bordered box left blank for handwritten remarks.
    NoteBox {
        heading: &'static str,
    },
    Signatures(SignatureBlock),
}

/// The rendered report of one student.
#[derive(Clone, Debug, PartialEq)]
pub struct ReportDocument {
    student_name: String,
    sections: Vec<Section>,
}

impl ReportDocument {
    /// Returns the display name of the student the report belongs to.
    pub fn student_name(&self) -> &str {
        &self.student_name
    }

    /// Returns the sections in display order.
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Returns the grade table rows.
    pub fn grade_rows(&self) -> &[GradeRow] {
        self.sections
            .iter()
            .find_map(|section| match section {
                Section::Grades { rows, .. } => Some(rows.as_slice()),
                _ => None,
            })
            .unwrap_or(&[])
    }

    /// Returns the attendance counters.
    pub fn attendance(&self) -> AttendanceSummary {
        self.sections
            .iter()
            .find_map(|section| match section {
                Section::Attendance { summary, .. } => Some(*summary),
                _ => None,
            })
            .unwrap_or_default()
    }
}

/// Renders the report of `student_id`.
///
/// Grades and attendance are restricted to the period configured in
/// `settings`.  Every subject of `data.subjects` yields exactly one grade row;
/// subjects without a grade show [`PLACEHOLDER`].  Returns `None` when the
/// student does not exist, which is a no-op rather than an error.
pub fn render_report(
    data: &ReportData,
    settings: &SchoolSettings,
    student_id: &str,
    signed_on: NaiveDate,
) -> Option<ReportDocument> {
    let student = data.student(student_id)?;
    let period = settings.period();

    let sections = vec![
        Section::Header(school_header(settings)),
        Section::Title(report_title(&period)),
        Section::Identity(identity_fields(student)),
        Section::Grades {
            heading: "A. Nilai Akademik",
            rows: grade_rows(data, student_id, &period),
        },
        Section::Attendance {
            heading: "B. Ketidakhadiran",
            summary: AttendanceSummary::from_record(data.attendance_for(student_id, &period)),
        },
        Section::Placeholder(PlaceholderTable {
            heading: "C. Ekstrakurikuler",
            columns: ["No", "Kegiatan Ekstrakurikuler", "Predikat", "Keterangan"],
        }),
        Section::Placeholder(PlaceholderTable {
            heading: "D. Prestasi",
            columns: ["No", "Jenis Prestasi", "Tingkat", "Keterangan"],
        }),
        Section::NoteBox {
            heading: "F. Catatan Wali Kelas",
        },
        Section::NoteBox {
            heading: "G. Tanggapan Orang Tua/Wali",
        },
        Section::Signatures(signature_block(settings, signed_on)),
    ];

    Some(ReportDocument {
        student_name: student.full_name.clone(),
        sections,
    })
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

fn school_header(settings: &SchoolSettings) -> SchoolHeader {
    let phone = non_empty(&settings.phone).map(|phone| format!("Telp: {}", phone));
    let email = non_empty(&settings.email).map(|email| format!("Email: {}", email));
    let contact_line = match (phone, email) {
        (Some(phone), Some(email)) => Some(format!("{} | {}", phone, email)),
        (Some(single), None) | (None, Some(single)) => Some(single),
        (None, None) => None,
    };

    SchoolHeader {
        school_name: non_empty(&settings.school_name)
            .unwrap_or_default()
            .to_string(),
        address: non_empty(&settings.address).map(str::to_string),
        contact_line,
        website: non_empty(&settings.website).map(str::to_string),
    }
}

fn report_title(period: &Period) -> ReportTitle {
    let year = if period.academic_year().trim().is_empty() {
        PLACEHOLDER
    } else {
        period.academic_year()
    };

    ReportTitle {
        title: REPORT_TITLE.to_string(),
        period_line: format!(
            "Semester {} Tahun Pelajaran {}",
            period.semester_name(),
            year
        ),
    }
}

fn identity_fields(student: &Student) -> Vec<IdentityField> {
    let birth_place = non_empty(&student.birth_place).unwrap_or(PLACEHOLDER);
    let birth_date = non_empty(&student.birth_date)
        .and_then(parse_record_date)
        .map(format_short_date)
        .unwrap_or_else(|| PLACEHOLDER.to_string());

    vec![
        IdentityField {
            label: "Nama Peserta Didik",
            value: student.full_name.clone(),
        },
        IdentityField {
            label: "Nomor Induk",
            value: student.registration_number.clone(),
        },
        IdentityField {
            label: "Tempat, Tanggal Lahir",
            value: format!("{}, {}", birth_place, birth_date),
        },
        IdentityField {
            label: "Kelas",
            value: student.class_name.clone(),
        },
    ]
}

fn grade_rows(data: &ReportData, student_id: &str, period: &Period) -> Vec<GradeRow> {
    let grades: Vec<_> = data.grades_for(student_id, period).collect();

    data.subjects
        .iter()
        .enumerate()
        .map(|(index, subject)| {
            let grade = grades.iter().find(|grade| grade.subject_id == subject.id);
            let score = grade
                .and_then(|grade| grade.final_score)
                .map(format_score)
                .unwrap_or_else(|| PLACEHOLDER.to_string());
            let competency = grade
                .and_then(|grade| non_empty(&grade.competency))
                .unwrap_or(PLACEHOLDER)
                .to_string();

            GradeRow {
                number: index + 1,
                subject: subject.name.clone(),
                score,
                competency,
            }
        })
        .collect()
}

fn signature_block(settings: &SchoolSettings, signed_on: NaiveDate) -> SignatureBlock {
    let dated = match non_empty(&settings.city) {
        Some(city) => format!("{}, {}", city, format_long_date(signed_on)),
        None => format_long_date(signed_on),
    };
    let name_or_blank = |value: &Option<String>| non_empty(value).unwrap_or("").to_string();

    let mut principal_below = vec![name_or_blank(&settings.principal)];
    if let Some(staff_number) = non_empty(&settings.principal_staff_number) {
        principal_below.push(format!("NIP. {}", staff_number));
    }

    SignatureBlock {
        parent: Signatory {
            lines_above: vec!["Mengetahui,".to_string(), "Orang Tua/Wali".to_string()],
            lines_below: vec![String::new()],
        },
        homeroom_teacher: Signatory {
            lines_above: vec![dated, "Wali Kelas".to_string()],
            lines_below: vec![name_or_blank(&settings.homeroom_teacher)],
        },
        principal: Signatory {
            lines_above: vec!["Mengetahui,".to_string(), "Kepala Sekolah".to_string()],
            lines_below: principal_below,
        },
    }
}

/// Parses the date part of a record date (`YYYY-MM-DD`, optionally followed by
/// a time component).
pub fn parse_record_date(value: &str) -> Option<NaiveDate> {
    let date_part = value.get(..10).unwrap_or(value);
    match NaiveDate::parse_from_str(date_part, "%Y-%m-%d") {
        Ok(date) => Some(date),
        Err(err) => {
            log::warn!("Ignoring unparseable record date '{}': {}", value, err);
            None
        }
    }
}

/// Formats a date as `d/m/yyyy` without zero padding.
pub fn format_short_date(date: NaiveDate) -> String {
    format!("{}/{}/{}", date.day(), date.month(), date.year())
}

/// Formats a date in Indonesian long form, e.g. `3 Desember 2025`.
pub fn format_long_date(date: NaiveDate) -> String {
    format!(
        "{} {} {}",
        date.day(),
        MONTHS_ID[date.month0() as usize],
        date.year()
    )
}

/// Formats a precomputed score as stored, without trailing zeros.
pub fn format_score(score: f64) -> String {
    score.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Grade, Subject};

    fn signing_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 12, 3).expect("valid date")
    }

    fn settings() -> SchoolSettings {
        SchoolSettings {
            school_name: Some("SMP Nusantara".to_string()),
            phone: Some("021-555".to_string()),
            semester: "1".to_string(),
            academic_year: "2024/2025".to_string(),
            city: Some("Jakarta".to_string()),
            homeroom_teacher: Some("Bu Siti Aminah".to_string()),
            principal: Some("Dr. Budi Santoso, M.Pd".to_string()),
            principal_staff_number: Some("196501011990011001".to_string()),
            ..SchoolSettings::default()
        }
    }

    fn grade(subject_id: &str, semester: &str, score: Option<f64>, competency: &str) -> Grade {
        Grade {
            student_id: "s1".to_string(),
            subject_id: subject_id.to_string(),
            semester: semester.to_string(),
            academic_year: "2024/2025".to_string(),
            final_score: score,
            competency: Some(competency.to_string()),
        }
    }

    fn data() -> ReportData {
        ReportData {
            students: vec![Student {
                id: "s1".to_string(),
                full_name: "Budi Santoso".to_string(),
                registration_number: "1001".to_string(),
                birth_place: Some("Bandung".to_string()),
                birth_date: Some("2011-04-09T00:00:00".to_string()),
                class_name: "7A".to_string(),
            }],
            subjects: ["Matematika", "IPA", "Bahasa Indonesia", "Seni Budaya"]
                .iter()
                .enumerate()
                .map(|(index, name)| Subject {
                    id: format!("m{}", index),
                    name: name.to_string(),
                })
                .collect(),
            grades: vec![
                grade("m0", "1", Some(88.0), "Sangat baik"),
                grade("m2", "1", Some(87.5), ""),
                grade("m1", "2", Some(70.0), "Other semester"),
            ],
            ..ReportData::default()
        }
    }

    #[test]
    fn sections_are_emitted_in_fixed_order() {
        let document = render_report(&data(), &settings(), "s1", signing_date()).expect("doc");
        let kinds: Vec<_> = document
            .sections()
            .iter()
            .map(|section| match section {
                Section::Header(_) => "header",
                Section::Title(_) => "title",
                Section::Identity(_) => "identity",
                Section::Grades { .. } => "grades",
                Section::Attendance { .. } => "attendance",
                Section::Placeholder(_) => "placeholder",
                Section::NoteBox { .. } => "note",
                Section::Signatures(_) => "signatures",
            })
            .collect();
        assert_eq!(
            kinds,
            vec![
                "header",
                "title",
                "identity",
                "grades",
                "attendance",
                "placeholder",
                "placeholder",
                "note",
                "note",
                "signatures"
            ]
        );
    }

    #[test]
    fn every_subject_gets_a_row() {
        let document = render_report(&data(), &settings(), "s1", signing_date()).expect("doc");
        let rows = document.grade_rows();
        assert_eq!(rows.len(), 4);

        assert_eq!(rows[0].score, "88");
        assert_eq!(rows[0].competency, "Sangat baik");
        // graded in another semester only
        assert_eq!(rows[1].score, PLACEHOLDER);
        assert_eq!(rows[1].competency, PLACEHOLDER);
        assert_eq!(rows[2].score, "87.5");
        assert_eq!(rows[2].competency, PLACEHOLDER);
        assert_eq!(rows[3].number, 4);
        assert_eq!(rows[3].score, PLACEHOLDER);
    }

    #[test]
    fn missing_attendance_renders_zero() {
        let document = render_report(&data(), &settings(), "s1", signing_date()).expect("doc");
        assert_eq!(document.attendance(), AttendanceSummary::default());
        assert_eq!(
            document.attendance().rows(),
            [("Sakit", 0), ("Izin", 0), ("Tanpa Keterangan", 0)]
        );
    }

    #[test]
    fn identity_formats_birth_data() {
        let document = render_report(&data(), &settings(), "s1", signing_date()).expect("doc");
        let Some(Section::Identity(fields)) = document.sections().get(2) else {
            panic!("identity section expected");
        };
        assert_eq!(fields[2].value, "Bandung, 9/4/2011");

        let mut without_birth = data();
        without_birth.students[0].birth_place = None;
        without_birth.students[0].birth_date = Some("not a date".to_string());
        let document =
            render_report(&without_birth, &settings(), "s1", signing_date()).expect("doc");
        let Some(Section::Identity(fields)) = document.sections().get(2) else {
            panic!("identity section expected");
        };
        assert_eq!(fields[2].value, "-, -");
    }

    #[test]
    fn signature_block_uses_configured_signatories() {
        let document = render_report(&data(), &settings(), "s1", signing_date()).expect("doc");
        let Some(Section::Signatures(block)) = document.sections().last() else {
            panic!("signature section expected");
        };
        assert_eq!(block.homeroom_teacher.lines_above[0], "Jakarta, 3 Desember 2025");
        assert_eq!(block.homeroom_teacher.lines_below, vec!["Bu Siti Aminah"]);
        assert_eq!(
            block.principal.lines_below,
            vec!["Dr. Budi Santoso, M.Pd", "NIP. 196501011990011001"]
        );
    }

    #[test]
    fn header_and_title() {
        let document = render_report(&data(), &settings(), "s1", signing_date()).expect("doc");
        let Some(Section::Header(header)) = document.sections().first() else {
            panic!("header expected");
        };
        assert_eq!(header.contact_line.as_deref(), Some("Telp: 021-555"));
        assert_eq!(header.website, None);

        let Some(Section::Title(title)) = document.sections().get(1) else {
            panic!("title expected");
        };
        assert_eq!(
            title.period_line,
            "Semester Ganjil Tahun Pelajaran 2024/2025"
        );
    }

    #[test]
    fn unknown_student_renders_nothing() {
        assert!(render_report(&data(), &settings(), "nobody", signing_date()).is_none());
    }

    #[test]
    fn score_formatting() {
        assert_eq!(format_score(90.0), "90");
        assert_eq!(format_score(78.25), "78.25");
        assert_eq!(format_score(0.0), "0");
        assert_eq!(format_score(85.0), "85");
        assert_eq!(format_score(87.5), "87.5");
    }

    #[test]
    fn scores_keep_every_stored_digit() {
        assert_eq!(format_score(87.456), "87.456");
        assert_eq!(format_score(66.666), "66.666");
    }
}
