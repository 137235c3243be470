//! Records consumed by the report renderer.
//!
//! The types in this module mirror the rows supplied by the surrounding data
//! layer.  They are read-only snapshots: nothing in this crate creates or
//! mutates them, records are only looked up by identifier equality.  Field
//! names on the wire follow the school database columns, so the serde
//! attributes rename them while the Rust API uses descriptive English names.

use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

use serde::Deserialize;

/// The (semester, academic year) pair that scopes which grade and attendance
/// records apply to a report.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Period {
    semester: String,
    academic_year: String,
}

impl Period {
    /// Creates a period from a semester code (`"1"` or `"2"`) and an academic
    /// year label such as `2024/2025`.
    pub fn new(semester: impl Into<String>, academic_year: impl Into<String>) -> Self {
        Self {
            semester: semester.into(),
            academic_year: academic_year.into(),
        }
    }

    /// Returns the semester code.
    pub fn semester(&self) -> &str {
        &self.semester
    }

    /// Returns the academic year label.
    pub fn academic_year(&self) -> &str {
        &self.academic_year
    }

    /// Returns whether the given raw period fields equal this period.
    pub fn matches(&self, semester: &str, academic_year: &str) -> bool {
        self.semester == semester && self.academic_year == academic_year
    }

    /// Returns the Indonesian semester name: `Ganjil` for the first semester,
    /// `Genap` for anything else.
    pub fn semester_name(&self) -> &'static str {
        if self.semester == "1" {
            "Ganjil"
        } else {
            "Genap"
        }
    }
}

/// A student enrolled in a class.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct Student {
    pub id: String,
    #[serde(rename = "nama_lengkap")]
    pub full_name: String,
    #[serde(rename = "nis", default)]
    pub registration_number: String,
    #[serde(rename = "tempat_lahir", default)]
    pub birth_place: Option<String>,
    /// ISO date (`YYYY-MM-DD`), optionally followed by a time component.
    #[serde(rename = "tanggal_lahir", default)]
    pub birth_date: Option<String>,
    #[serde(rename = "kelas", default)]
    pub class_name: String,
}

/// A subject taught in the school; the order of the subject list is the
/// display order of the grade table.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct Subject {
    pub id: String,
    #[serde(rename = "nama")]
    pub name: String,
}

/// Final grade of a student for one subject in one period.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct Grade {
    pub student_id: String,
    pub subject_id: String,
    #[serde(default)]
    pub semester: String,
    #[serde(rename = "tahun_pelajaran", default)]
    pub academic_year: String,
    /// Precomputed upstream; this crate never aggregates scores.
    #[serde(rename = "nilai_akhir", default)]
    pub final_score: Option<f64>,
    #[serde(rename = "capaian_kompetensi", default)]
    pub competency: Option<String>,
}

impl Grade {
    /// Returns whether the grade belongs to the given student and period.
    pub fn applies_to(&self, student_id: &str, period: &Period) -> bool {
        self.student_id == student_id && period.matches(&self.semester, &self.academic_year)
    }
}

/// Absence counters of a student for one period.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct Attendance {
    pub student_id: String,
    #[serde(default)]
    pub semester: String,
    #[serde(rename = "tahun_pelajaran", default)]
    pub academic_year: String,
    #[serde(rename = "sakit", default)]
    pub sick: Option<u32>,
    #[serde(rename = "izin", default)]
    pub permitted: Option<u32>,
    #[serde(rename = "tanpa_keterangan", default)]
    pub unexcused: Option<u32>,
}

impl Attendance {
    /// Returns whether the record belongs to the given student and period.
    pub fn applies_to(&self, student_id: &str, period: &Period) -> bool {
        self.student_id == student_id && period.matches(&self.semester, &self.academic_year)
    }
}

/// School identity, signatories and the active reporting period.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct SchoolSettings {
    #[serde(rename = "nama_sekolah", default)]
    pub school_name: Option<String>,
    #[serde(rename = "alamat", default)]
    pub address: Option<String>,
    #[serde(rename = "telepon", default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub semester: String,
    #[serde(rename = "tahun_pelajaran", default)]
    pub academic_year: String,
    /// City printed in front of the signing date.
    #[serde(rename = "kota", default)]
    pub city: Option<String>,
    #[serde(rename = "nama_wali_kelas", default)]
    pub homeroom_teacher: Option<String>,
    #[serde(rename = "nama_kepala_sekolah", default)]
    pub principal: Option<String>,
    #[serde(rename = "nip_kepala_sekolah", default)]
    pub principal_staff_number: Option<String>,
}

impl SchoolSettings {
    /// Returns the active reporting period.
    pub fn period(&self) -> Period {
        Period::new(self.semester.clone(), self.academic_year.clone())
    }
}

/// Errors raised while loading a [`ReportData`] snapshot.
#[derive(Debug)]
pub enum DataError {
    /// The data file could not be read.
    Io(io::Error),
    /// The data file is not a valid report data document.
    Parse(serde_json::Error),
}

impl From<io::Error> for DataError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_json::Error> for DataError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err)
    }
}

impl fmt::Display for DataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(_) => write!(f, "Failed to read report data"),
            Self::Parse(_) => write!(f, "Failed to parse report data"),
        }
    }
}

impl std::error::Error for DataError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Parse(err) => Some(err),
        }
    }
}

/// Read-only snapshot of every collection the report page works with.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct ReportData {
    #[serde(default)]
    pub students: Vec<Student>,
    #[serde(default)]
    pub subjects: Vec<Subject>,
    #[serde(default)]
    pub grades: Vec<Grade>,
    #[serde(default)]
    pub attendance: Vec<Attendance>,
    #[serde(default)]
    pub school_settings: Option<SchoolSettings>,
}

impl ReportData {
    /// Parses a snapshot from a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, DataError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses a snapshot from the JSON file at `path`.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, DataError> {
        let contents = fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&contents)
    }

    /// Looks up a student by identifier.
    pub fn student(&self, student_id: &str) -> Option<&Student> {
        self.students.iter().find(|student| student.id == student_id)
    }

    /// Returns the grades of `student_id` recorded for `period`.
    pub fn grades_for<'a>(
        &'a self,
        student_id: &'a str,
        period: &'a Period,
    ) -> impl Iterator<Item = &'a Grade> + 'a {
        self.grades
            .iter()
            .filter(move |grade| grade.applies_to(student_id, period))
    }

    /// Returns the attendance record of `student_id` for `period`, if any.
    pub fn attendance_for(&self, student_id: &str, period: &Period) -> Option<&Attendance> {
        self.attendance
            .iter()
            .find(|record| record.applies_to(student_id, period))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "students": [
            {"id": "s1", "nama_lengkap": "Budi Santoso", "nis": "1001", "kelas": "7A",
             "tempat_lahir": "Bandung", "tanggal_lahir": "2011-04-09", "alamat": "ignored"}
        ],
        "subjects": [{"id": "m1", "nama": "Matematika"}],
        "grades": [
            {"student_id": "s1", "subject_id": "m1", "semester": "1",
             "tahun_pelajaran": "2024/2025", "nilai_akhir": 88, "capaian_kompetensi": "Baik"},
            {"student_id": "s1", "subject_id": "m1", "semester": "2",
             "tahun_pelajaran": "2024/2025", "nilai_akhir": 90}
        ],
        "attendance": [
            {"student_id": "s1", "semester": "1", "tahun_pelajaran": "2024/2025", "sakit": 2}
        ],
        "school_settings": {"nama_sekolah": "SMP Nusantara", "semester": "1",
                            "tahun_pelajaran": "2024/2025"}
    }"#;

    #[test]
    fn parses_database_field_names() {
        let data = ReportData::from_json_str(SAMPLE).expect("parse sample");
        let student = data.student("s1").expect("student present");
        assert_eq!(student.full_name, "Budi Santoso");
        assert_eq!(student.class_name, "7A");
        assert_eq!(student.birth_date.as_deref(), Some("2011-04-09"));
        assert_eq!(data.grades[0].final_score, Some(88.0));
        assert_eq!(data.attendance[0].permitted, None);
    }

    #[test]
    fn period_filters_grades_and_attendance() {
        let data = ReportData::from_json_str(SAMPLE).expect("parse sample");
        let period = data.school_settings.as_ref().expect("settings").period();

        let grades: Vec<_> = data.grades_for("s1", &period).collect();
        assert_eq!(grades.len(), 1);
        assert_eq!(grades[0].final_score, Some(88.0));

        assert!(data.attendance_for("s1", &period).is_some());
        assert!(data
            .attendance_for("s1", &Period::new("2", "2024/2025"))
            .is_none());
    }

    #[test]
    fn semester_names() {
        assert_eq!(Period::new("1", "2024/2025").semester_name(), "Ganjil");
        assert_eq!(Period::new("2", "2024/2025").semester_name(), "Genap");
    }

    #[test]
    fn malformed_document_is_a_parse_error() {
        let err = ReportData::from_json_str("{\"students\": 3}").unwrap_err();
        assert!(matches!(err, DataError::Parse(_)));
    }
}
