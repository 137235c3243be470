use std::error::Error;
use std::path::PathBuf;

use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use flexi_logger::{FlexiLoggerError, Logger, LoggerHandle};
use log::{info, warn};

use rapor::export::{self, ExportOptions, ExportOutcome};
use rapor::fonts;
use rapor::host::FileSystemHost;
use rapor::html;
use rapor::model::{ReportData, SchoolSettings};
use rapor::report::{render_report, ReportDocument};
use rapor::selection::{class_list, students_in_class, Diagnostics, ReportSelection};
use rapor::surface::{Display, LayoutStyle, Length, Overflow, ReportSurface, Visibility};

/// Renders student reports and exports them as PDF or print documents.
///
/// The raster exports need a regular and a bold TrueType face. Provide them
/// under `assets/fonts` next to the binary or through `RAPOR_FONTS_DIR`;
/// DejaVu Sans is used when neither is available.
#[derive(Parser)]
#[command(author, version, about = "Student report (rapor) renderer")]
struct Cli {
    /// JSON file holding students, subjects, grades, attendance and settings.
    #[arg(long, value_name = "FILE")]
    data: PathBuf,

    /// Directory receiving saved PDFs and opened windows.
    #[arg(long, value_name = "DIR", default_value = ".")]
    out: PathBuf,

    /// Print the diagnostics panel and log at debug level.
    #[arg(long)]
    debug: bool,

    /// Signing date printed above the signatures (defaults to today).
    #[arg(long, value_name = "YYYY-MM-DD")]
    date: Option<NaiveDate>,

    /// Supersampling factor of the raster capture.
    #[arg(long, default_value_t = 4.0)]
    scale: f32,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the classes in first-appearance order.
    Classes,

    /// List the students of a class.
    Students {
        #[arg(long)]
        class: String,
    },

    /// Print the report markup of a student.
    Preview(StudentArgs),

    /// Save the report as `Rapor_<name>.pdf`.
    Download(StudentArgs),

    /// Open the report PDF in a viewer window that prints it.
    #[command(name = "print-pdf", aliases = ["print_pdf"])]
    PrintPdf(StudentArgs),

    /// Open the report in a print window styled for A4.
    #[command(name = "print-html", aliases = ["print_html"])]
    PrintHtml(StudentArgs),

    /// Print the preview page directly.
    Print(StudentArgs),
}

#[derive(Args)]
struct StudentArgs {
    /// Class the student belongs to.
    #[arg(long)]
    class: String,

    /// Student identifier.
    #[arg(long)]
    student: String,
}

/// Inline style of the preview panel before any export touches it.
const PREVIEW_PANEL_STYLE: LayoutStyle = LayoutStyle {
    display: Display::Block,
    visibility: Visibility::Unset,
    overflow: Overflow::Auto,
    height: Length::Unset,
    max_height: Length::Px(800.0),
};

fn main() {
    let cli = Cli::parse();

    let _logger = match init_logging(cli.debug) {
        Ok(handle) => Some(handle),
        Err(err) => {
            eprintln!("Warning: logging disabled: {}", err);
            None
        }
    };

    if let Err(err) = run(cli) {
        eprintln!("Error: {}", err);
        print_error_sources(err.as_ref());
        std::process::exit(1);
    }
}

fn init_logging(debug: bool) -> Result<LoggerHandle, FlexiLoggerError> {
    let level = if debug { "debug" } else { "info" };
    Logger::try_with_env_or_str(level)?
        .log_to_stderr()
        .format(flexi_logger::default_format)
        .start()
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let data = ReportData::from_path(&cli.data)?;
    info!(
        "Loaded {} students, {} subjects and {} grades from {}",
        data.students.len(),
        data.subjects.len(),
        data.grades.len(),
        cli.data.display()
    );

    let options = ExportOptions::new().with_scale(cli.scale);
    let signed_on = cli.date.unwrap_or_else(|| Local::now().date_naive());

    match &cli.command {
        Commands::Classes => {
            for class_name in class_list(&data.students) {
                println!("{}", class_name);
            }
        }
        Commands::Students { class } => {
            for student in students_in_class(&data.students, class) {
                println!("{}\t{}", student.id, student.full_name);
            }
        }
        Commands::Preview(args) => {
            if let Some(document) = render(&data, args, signed_on, cli.debug)? {
                print!("{}", html::report_markup(&document));
            }
        }
        Commands::Download(args) => {
            let Some(mut surface) = load_surface(&data, args, signed_on, cli.debug)? else {
                return Ok(());
            };
            let name = surface.document().student_name().to_string();
            let mut host = FileSystemHost::new(&cli.out);
            finish(export::download_pdf(&mut surface, &mut host, &options, &name))?;
        }
        Commands::PrintPdf(args) => {
            let Some(mut surface) = load_surface(&data, args, signed_on, cli.debug)? else {
                return Ok(());
            };
            let name = surface.document().student_name().to_string();
            let mut host = FileSystemHost::new(&cli.out);
            finish(export::open_pdf_for_print(&mut surface, &mut host, &options, &name))?;
        }
        Commands::PrintHtml(args) => {
            let Some(surface) = load_surface(&data, args, signed_on, cli.debug)? else {
                return Ok(());
            };
            let mut host = FileSystemHost::new(&cli.out);
            finish(export::print_html(&surface, &mut host, &options))?;
        }
        Commands::Print(args) => {
            let Some(mut surface) = load_surface(&data, args, signed_on, cli.debug)? else {
                return Ok(());
            };
            let mut host = FileSystemHost::new(&cli.out);
            finish(export::print_direct(&mut surface, &mut host, &options))?;
        }
    }

    Ok(())
}

/// Selects the requested student and renders their report.
///
/// Returns `Ok(None)` when the student record cannot be resolved, in which
/// case nothing is rendered.
fn render(
    data: &ReportData,
    args: &StudentArgs,
    signed_on: NaiveDate,
    debug: bool,
) -> Result<Option<ReportDocument>, Box<dyn Error>> {
    let mut selection = ReportSelection::new();
    selection.select_class(&args.class);
    let selected = selection.select_student(data, &args.student);

    if debug {
        let diagnostics = Diagnostics::collect(data, &selection);
        diagnostics.log();
        eprintln!("{}", diagnostics);
    }
    selected?;

    let settings = match &data.school_settings {
        Some(settings) => settings.clone(),
        None => {
            warn!("No school settings in the data file, using empty settings");
            SchoolSettings::default()
        }
    };

    let document = render_report(data, &settings, &args.student, signed_on);
    if document.is_none() {
        warn!("Student {} not found, nothing to render", args.student);
    }
    Ok(document)
}

fn load_surface(
    data: &ReportData,
    args: &StudentArgs,
    signed_on: NaiveDate,
    debug: bool,
) -> Result<Option<ReportSurface>, Box<dyn Error>> {
    let Some(document) = render(data, args, signed_on, debug)? else {
        return Ok(None);
    };
    let fonts = fonts::default_font_set()?;
    Ok(Some(
        ReportSurface::new(document, fonts).with_style(PREVIEW_PANEL_STYLE),
    ))
}

fn finish(outcome: ExportOutcome) -> Result<(), Box<dyn Error>> {
    match outcome {
        ExportOutcome::Saved { file_name } => println!("Saved {}", file_name),
        ExportOutcome::ViewerOpened => println!("Opened PDF viewer"),
        ExportOutcome::PrintWindowOpened => println!("Opened print window"),
        ExportOutcome::Printed => println!("Printed"),
        ExportOutcome::WindowBlocked => warn!("The window was blocked, nothing was opened"),
        ExportOutcome::FellBackToPrint(err) => {
            eprintln!("Warning: {}", err);
            print_error_sources(&err);
            println!("Printed the page instead");
        }
        ExportOutcome::Alerted(err) => return Err(Box::new(err)),
    }
    Ok(())
}

fn print_error_sources(mut error: &(dyn Error + 'static)) {
    while let Some(source) = error.source() {
        eprintln!("  caused by: {}", source);
        error = source;
    }
}
