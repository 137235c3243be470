//! Font loading for the raster capture of the report.
//!
//! Fonts are searched in this order:
//!
//! 1. the directory named by `RAPOR_FONTS_DIR`,
//! 2. `assets/fonts` next to the running executable,
//! 3. `assets/fonts` inside the crate.
//!
//! Each candidate must contain the regular and bold faces listed in
//! [`FONT_FILES`].  When none qualifies, the system DejaVu Sans family is used
//! as a fallback (`RAPOR_SYSTEM_FONTS_DIR` or the usual Linux locations).

use std::env;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::warn;
use rusttype::Font;

/// Name of the bundled font family.
pub const DEFAULT_FONT_FAMILY_NAME: &str = "Roboto";

/// Environment variable overriding the bundled font directory.
pub const FONTS_DIR_ENV: &str = "RAPOR_FONTS_DIR";

/// Environment variable overriding the system fallback directory.
pub const SYSTEM_FONTS_DIR_ENV: &str = "RAPOR_SYSTEM_FONTS_DIR";

/// Regular and bold face of the bundled family.
pub const FONT_FILES: [&str; 2] = ["Roboto-Regular.ttf", "Roboto-Bold.ttf"];

const SYSTEM_FALLBACK_FAMILY_NAME: &str = "DejaVu Sans";

const SYSTEM_FONT_FILES: [&str; 2] = ["DejaVuSans.ttf", "DejaVuSans-Bold.ttf"];

const SYSTEM_FONT_DIRECTORIES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu",
    "/usr/share/fonts/dejavu",
    "/usr/share/fonts/TTF",
    "/usr/local/share/fonts",
];

/// Errors raised while locating or parsing fonts.
#[derive(Debug)]
pub enum FontError {
    /// No candidate directory holds the required files.
    NotFound {
        /// Human readable summary of the directories that were checked.
        searched: String,
    },
    /// A font file could not be read.
    Io {
        path: PathBuf,
        source: io::Error,
    },
    /// A font file is not a TrueType/OpenType font.
    Parse { path: PathBuf },
}

impl FontError {
    /// Returns whether the error means the fonts are absent rather than broken.
    pub fn is_missing(&self) -> bool {
        match self {
            Self::NotFound { .. } => true,
            Self::Io { source, .. } => matches!(
                source.kind(),
                io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied
            ),
            Self::Parse { .. } => false,
        }
    }
}

impl fmt::Display for FontError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { searched } => write!(
                f,
                "Unable to locate report fonts. Checked: {}. Set {} to a directory with {}.",
                searched,
                FONTS_DIR_ENV,
                FONT_FILES.join(" and ")
            ),
            Self::Io { path, .. } => write!(f, "Failed to read font file {}", path.display()),
            Self::Parse { path } => write!(f, "Font file {} is not a valid font", path.display()),
        }
    }
}

impl std::error::Error for FontError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::NotFound { .. } | Self::Parse { .. } => None,
        }
    }
}

/// The faces used to paint the report.
#[derive(Clone)]
pub struct FontSet {
    family: String,
    regular: Font<'static>,
    bold: Font<'static>,
}

impl fmt::Debug for FontSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FontSet")
            .field("family", &self.family)
            .finish_non_exhaustive()
    }
}

impl FontSet {
    /// Builds a font set from in-memory font data.
    pub fn from_bytes(
        family: impl Into<String>,
        regular: Vec<u8>,
        bold: Vec<u8>,
    ) -> Option<Self> {
        Some(Self {
            family: family.into(),
            regular: Font::try_from_vec(regular)?,
            bold: Font::try_from_vec(bold)?,
        })
    }

    /// Returns the family name.
    pub fn family(&self) -> &str {
        &self.family
    }

    /// Returns the regular or bold face.
    pub fn face(&self, bold: bool) -> &Font<'static> {
        if bold {
            &self.bold
        } else {
            &self.regular
        }
    }
}

fn env_path(var: &str) -> Option<PathBuf> {
    env::var_os(var).and_then(|value| {
        let path = PathBuf::from(value);
        if path.as_os_str().is_empty() {
            None
        } else {
            Some(path)
        }
    })
}

fn font_directory_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    if let Some(path) = env_path(FONTS_DIR_ENV) {
        candidates.push(path);
    }

    if let Ok(current_exe) = env::current_exe() {
        if let Some(bin_dir) = current_exe.parent() {
            let candidate = bin_dir.join("assets/fonts");
            if !candidates.contains(&candidate) {
                candidates.push(candidate);
            }
        }
    }

    let manifest_candidate = bundled_fonts_source_dir();
    if !candidates.contains(&manifest_candidate) {
        candidates.push(manifest_candidate);
    }

    candidates
}

/// Directory holding the fonts shipped with the crate sources.
pub fn bundled_fonts_source_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets/fonts")
}

fn missing_files(directory: &Path, files: &[&str]) -> Vec<String> {
    files
        .iter()
        .filter(|name| !directory.join(name).is_file())
        .map(|name| name.to_string())
        .collect()
}

fn resolve_directory(candidates: &[PathBuf], files: &[&str]) -> Result<PathBuf, String> {
    let mut attempts = Vec::new();

    for candidate in candidates {
        if !candidate.is_dir() {
            attempts.push(format!("{} (directory missing)", candidate.display()));
            continue;
        }

        let missing = missing_files(candidate, files);
        if missing.is_empty() {
            return Ok(candidate.clone());
        }
        attempts.push(format!(
            "{} (missing files [{}])",
            candidate.display(),
            missing.join(", ")
        ));
    }

    if attempts.is_empty() {
        Err("no search paths were available".to_owned())
    } else {
        Err(attempts.join(", "))
    }
}

fn load_face(path: &Path) -> Result<Vec<u8>, FontError> {
    fs::read(path).map_err(|source| FontError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn load_family(directory: &Path, family: &str, files: [&str; 2]) -> Result<FontSet, FontError> {
    let regular_path = directory.join(files[0]);
    let bold_path = directory.join(files[1]);
    let regular = load_face(&regular_path)?;
    let bold = load_face(&bold_path)?;

    let regular = Font::try_from_vec(regular).ok_or(FontError::Parse { path: regular_path })?;
    let bold = Font::try_from_vec(bold).ok_or(FontError::Parse { path: bold_path })?;

    Ok(FontSet {
        family: family.to_string(),
        regular,
        bold,
    })
}

fn load_bundled_font_set() -> Result<FontSet, FontError> {
    let directory = resolve_directory(&font_directory_candidates(), &FONT_FILES)
        .map_err(|searched| FontError::NotFound { searched })?;
    load_family(&directory, DEFAULT_FONT_FAMILY_NAME, FONT_FILES)
}

fn system_font_candidates() -> Vec<PathBuf> {
    let mut candidates: Vec<PathBuf> = env_path(SYSTEM_FONTS_DIR_ENV).into_iter().collect();
    candidates.extend(SYSTEM_FONT_DIRECTORIES.iter().map(PathBuf::from));
    candidates
}

fn system_fallback_font_set() -> Result<FontSet, FontError> {
    let directory = resolve_directory(&system_font_candidates(), &SYSTEM_FONT_FILES)
        .map_err(|searched| FontError::NotFound { searched })?;
    load_family(&directory, SYSTEM_FALLBACK_FAMILY_NAME, SYSTEM_FONT_FILES)
}

/// Returns the bundled Roboto faces, falling back to the system DejaVu Sans
/// family when the bundled fonts are missing.
pub fn default_font_set() -> Result<FontSet, FontError> {
    match load_bundled_font_set() {
        Ok(set) => Ok(set),
        Err(err) if err.is_missing() => match system_fallback_font_set() {
            Ok(fallback) => {
                warn!(
                    "Bundled fonts unavailable ({}); falling back to system '{}' family.",
                    err, SYSTEM_FALLBACK_FAMILY_NAME
                );
                Ok(fallback)
            }
            Err(fallback_err) => {
                warn!(
                    "Bundled fonts unavailable ({}); system fallback failed: {}",
                    err, fallback_err
                );
                Err(fallback_err)
            }
        },
        Err(err) => Err(err),
    }
}

/// Indicates whether [`default_font_set`] can find a usable font family.
pub fn default_fonts_available() -> bool {
    resolve_directory(&font_directory_candidates(), &FONT_FILES).is_ok()
        || resolve_directory(&system_font_candidates(), &SYSTEM_FONT_FILES).is_ok()
}
