//! Class and student selection feeding the report renderer.

use std::fmt;

use crate::model::{ReportData, Student};

/// Returns the distinct class names of `students` in first-appearance order.
pub fn class_list(students: &[Student]) -> Vec<&str> {
    let mut classes: Vec<&str> = Vec::new();
    for student in students {
        if !classes.contains(&student.class_name.as_str()) {
            classes.push(&student.class_name);
        }
    }
    classes
}

/// Returns exactly the students whose class equals `class_name`, in input order.
pub fn students_in_class<'a>(students: &'a [Student], class_name: &str) -> Vec<&'a Student> {
    students
        .iter()
        .filter(|student| student.class_name == class_name)
        .collect()
}

/// Reasons a student selection is rejected.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SelectionError {
    /// Student selection stays disabled until a class is chosen.
    NoClassSelected,
    /// The student is unknown or belongs to another class.
    NotInClass {
        /// Requested student identifier.
        student_id: String,
        /// Currently selected class.
        class_name: String,
    },
}

impl fmt::Display for SelectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoClassSelected => write!(f, "Select a class before selecting a student"),
            Self::NotInClass {
                student_id,
                class_name,
            } => write!(
                f,
                "Student '{}' is not enrolled in class '{}'",
                student_id, class_name
            ),
        }
    }
}

impl std::error::Error for SelectionError {}

/// The class and student currently picked for preview.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReportSelection {
    class_name: Option<String>,
    student_id: Option<String>,
}

impl ReportSelection {
    /// Creates an empty selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the selected class, if any.
    pub fn class_name(&self) -> Option<&str> {
        self.class_name.as_deref()
    }

    /// Returns the selected student identifier, if any.
    pub fn student_id(&self) -> Option<&str> {
        self.student_id.as_deref()
    }

    /// Returns whether the student picker accepts input.
    pub fn student_selection_enabled(&self) -> bool {
        self.class_name.is_some()
    }

    /// Selects a class and clears the downstream student selection.
    pub fn select_class(&mut self, class_name: impl Into<String>) {
        self.class_name = Some(class_name.into());
        self.student_id = None;
    }

    /// Selects a student from the currently selected class.
    pub fn select_student(
        &mut self,
        data: &ReportData,
        student_id: impl Into<String>,
    ) -> Result<(), SelectionError> {
        let class_name = self
            .class_name
            .as_deref()
            .ok_or(SelectionError::NoClassSelected)?;
        let student_id = student_id.into();

        let enrolled = students_in_class(&data.students, class_name)
            .iter()
            .any(|student| student.id == student_id);
        if !enrolled {
            return Err(SelectionError::NotInClass {
                student_id,
                class_name: class_name.to_string(),
            });
        }

        self.student_id = Some(student_id);
        Ok(())
    }

    /// Resolves the selected student; the report renders only when this is `Some`.
    pub fn current_student<'a>(&self, data: &'a ReportData) -> Option<&'a Student> {
        self.student_id
            .as_deref()
            .and_then(|student_id| data.student(student_id))
    }
}

/// Snapshot of the selection state for troubleshooting a preview that does
/// not render.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostics {
    pub students_loaded: usize,
    pub classes: Vec<String>,
    pub selected_class: Option<String>,
    pub filtered_students: usize,
    pub selected_student: Option<String>,
    pub current_student: Option<String>,
    pub settings_loaded: bool,
    pub grades_loaded: usize,
    pub student_grades: usize,
    pub subjects: usize,
    pub render_condition: bool,
}

impl Diagnostics {
    /// Collects the diagnostics for `selection` against `data`.
    pub fn collect(data: &ReportData, selection: &ReportSelection) -> Self {
        let current = selection.current_student(data);
        let filtered_students = selection
            .class_name()
            .map(|class_name| students_in_class(&data.students, class_name).len())
            .unwrap_or(0);
        let student_grades = match (&data.school_settings, selection.student_id()) {
            (Some(settings), Some(student_id)) => {
                let period = settings.period();
                data.grades_for(student_id, &period).count()
            }
            _ => 0,
        };

        Self {
            students_loaded: data.students.len(),
            classes: class_list(&data.students)
                .into_iter()
                .map(str::to_string)
                .collect(),
            selected_class: selection.class_name().map(str::to_string),
            filtered_students,
            selected_student: selection.student_id().map(str::to_string),
            current_student: current.map(|student| student.full_name.clone()),
            settings_loaded: data.school_settings.is_some(),
            grades_loaded: data.grades.len(),
            student_grades,
            subjects: data.subjects.len(),
            render_condition: selection.student_id().is_some() && current.is_some(),
        }
    }

    /// Emits the snapshot through the `log` facade at debug level.
    pub fn log(&self) {
        for line in self.to_string().lines() {
            log::debug!("{}", line);
        }
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn or_none(value: &Option<String>) -> &str {
            value.as_deref().unwrap_or("none")
        }

        let classes = if self.classes.is_empty() {
            "none".to_string()
        } else {
            self.classes.join(", ")
        };

        writeln!(f, "Students loaded: {}", self.students_loaded)?;
        writeln!(f, "Class list: {}", classes)?;
        writeln!(f, "Selected class: {}", or_none(&self.selected_class))?;
        writeln!(f, "Filtered students: {}", self.filtered_students)?;
        writeln!(f, "Selected student ID: {}", or_none(&self.selected_student))?;
        writeln!(
            f,
            "Current student found: {}",
            self.current_student.as_deref().unwrap_or("NOT FOUND")
        )?;
        writeln!(
            f,
            "School settings: {}",
            if self.settings_loaded {
                "loaded"
            } else {
                "NOT LOADED"
            }
        )?;
        writeln!(f, "Grades loaded: {}", self.grades_loaded)?;
        writeln!(f, "Student grades: {}", self.student_grades)?;
        writeln!(f, "Subjects: {}", self.subjects)?;
        write!(f, "Render condition: {}", self.render_condition)
    }
}
