//! Export paths of the report surface.
//!
//! * [`export_raster_pdf`] captures the surface, paginates the capture onto A4
//!   pages and either saves the PDF ([`PdfTarget::Download`]) or opens it in a
//!   viewer window that prints on load ([`PdfTarget::PrintViewer`]).
//! * [`print_html`] opens the report markup in a print window with its own
//!   stylesheet and lets the browser paginate.
//! * [`print_direct`] prints the page the surface lives in.
//!
//! Every path takes the surface by exclusive borrow and restores any style it
//! changes before returning.

use std::fmt;
use std::io::{self, BufWriter};
use std::time::Duration;

use image::{DynamicImage, GenericImageView, Rgb, RgbImage};
use log::{debug, error, info, warn};
use lopdf::{Dictionary, Document, Object, ObjectId};
use printpdf::{Image, Mm, PdfDocument};

use crate::host::Host;
use crate::html;
use crate::paginate::{PageGeometry, Pagination};
use crate::surface::{CaptureError, CaptureOptions, StyleGuard, Surface};

/// Message shown when the PDF download fails.
pub const DOWNLOAD_FAILED_MESSAGE: &str = "Terjadi kesalahan saat membuat PDF. Silakan coba lagi.";

/// File name stem used when the student has no name.
pub const FALLBACK_FILE_STEM: &str = "siswa";

/// Title embedded in generated PDFs.
pub const PDF_TITLE: &str = "Rapor";

/// Tunables of the export paths.
#[derive(Clone, Debug, PartialEq)]
pub struct ExportOptions {
    capture: CaptureOptions,
    geometry: PageGeometry,
    print_delay: Duration,
    html_print_delay: Duration,
}

impl ExportOptions {
    /// Creates options with the crate defaults: 4x supersampling on white,
    /// A4 pages, 100ms before direct print and 200ms before HTML print.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the supersampling factor of the capture.
    pub fn with_scale(mut self, scale: f32) -> Self {
        self.capture.scale = scale;
        self
    }

    /// Sets the background the capture is painted over.
    pub fn with_background(mut self, background: Rgb<u8>) -> Self {
        self.capture.background = background;
        self
    }

    /// Sets the page geometry of generated PDFs.
    pub fn with_geometry(mut self, geometry: PageGeometry) -> Self {
        self.geometry = geometry;
        self
    }

    /// Sets the settle delay before direct print.
    pub fn with_print_delay(mut self, delay: Duration) -> Self {
        self.print_delay = delay;
        self
    }

    /// Sets the delay between loading the print window and printing it.
    pub fn with_html_print_delay(mut self, delay: Duration) -> Self {
        self.html_print_delay = delay;
        self
    }

    pub fn capture(&self) -> &CaptureOptions {
        &self.capture
    }

    pub fn geometry(&self) -> PageGeometry {
        self.geometry
    }

    pub fn print_delay(&self) -> Duration {
        self.print_delay
    }

    pub fn html_print_delay(&self) -> Duration {
        self.html_print_delay
    }
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            capture: CaptureOptions::default(),
            geometry: PageGeometry::A4,
            print_delay: Duration::from_millis(100),
            html_print_delay: Duration::from_millis(200),
        }
    }
}

/// Errors raised while producing a PDF.
#[derive(Debug)]
pub enum ExportError {
    /// The surface could not be rasterized.
    Capture(CaptureError),
    /// The PDF could not be assembled from the capture.
    Assembly(String),
    /// The assembled PDF could not be rewritten to share the page image.
    Rewrite(lopdf::Error),
    /// The PDF could not be saved.
    Save { file_name: String, source: io::Error },
}

impl From<CaptureError> for ExportError {
    fn from(err: CaptureError) -> Self {
        Self::Capture(err)
    }
}

impl From<lopdf::Error> for ExportError {
    fn from(err: lopdf::Error) -> Self {
        Self::Rewrite(err)
    }
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Capture(_) => write!(f, "Failed to capture the report"),
            Self::Assembly(message) => write!(f, "Failed to assemble the PDF: {}", message),
            Self::Rewrite(_) => write!(f, "Failed to rewrite the assembled PDF"),
            Self::Save { file_name, .. } => write!(f, "Failed to save {}", file_name),
        }
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Capture(err) => Some(err),
            Self::Assembly(_) => None,
            Self::Rewrite(err) => Some(err),
            Self::Save { source, .. } => Some(source),
        }
    }
}

/// Where a rasterized PDF goes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PdfTarget {
    /// Saved as `Rapor_<name>.pdf`.
    Download,
    /// Shown in a new window that opens the print dialog once loaded.
    PrintViewer,
}

/// How an export ended.
#[derive(Debug)]
pub enum ExportOutcome {
    /// The PDF was saved under `file_name`.
    Saved { file_name: String },
    /// The PDF viewer window was opened.
    ViewerOpened,
    /// The HTML print window was opened.
    PrintWindowOpened,
    /// The host refused to open a window; nothing else happened.
    WindowBlocked,
    /// The download failed and the user was alerted.
    Alerted(ExportError),
    /// Building the PDF failed and the page's print dialog was opened instead.
    FellBackToPrint(ExportError),
    /// The page's print dialog was opened.
    Printed,
}

impl ExportOutcome {
    /// Returns the error that ended the export, if any.
    pub fn error(&self) -> Option<&ExportError> {
        match self {
            Self::Alerted(err) | Self::FellBackToPrint(err) => Some(err),
            _ => None,
        }
    }
}

/// Returns the download name of the report of `student_name`.
///
/// Runs of whitespace and path separators become single underscores, so the
/// name always stays one path component; an empty name falls back to
/// [`FALLBACK_FILE_STEM`].
pub fn file_name_for(student_name: &str) -> String {
    if student_name.is_empty() {
        return format!("Rapor_{}.pdf", FALLBACK_FILE_STEM);
    }

    let mut stem = String::with_capacity(student_name.len());
    let mut in_whitespace = false;
    for ch in student_name.chars() {
        if ch.is_whitespace() || matches!(ch, '/' | '\\') {
            if !in_whitespace {
                stem.push('_');
            }
            in_whitespace = true;
        } else {
            stem.push(ch);
            in_whitespace = false;
        }
    }
    format!("Rapor_{}.pdf", stem)
}

/// Captures `surface` at its full height and assembles the paginated PDF.
///
/// The surface is expanded for the capture and restored afterwards, whether
/// the capture succeeds or not.
pub fn build_raster_pdf<S>(
    surface: &mut S,
    options: &ExportOptions,
    title: &str,
) -> Result<Vec<u8>, ExportError>
where
    S: Surface + ?Sized,
{
    let image = {
        let mut expanded = StyleGuard::expand(surface);
        expanded.capture(options.capture())?
    };
    assemble_pdf(&image, options.geometry(), title)
}

/// Lays `image` onto pages of `geometry`, scaled to the page width.
///
/// Every page draws the whole image, shifted up by one page height per page,
/// so that page `n` shows the `n`-th page sized window of the image. The image
/// is embedded once and shared by all pages.
pub fn assemble_pdf(
    image: &DynamicImage,
    geometry: PageGeometry,
    title: &str,
) -> Result<Vec<u8>, ExportError> {
    let (px_width, px_height) = image.dimensions();
    if px_width == 0 || px_height == 0 {
        return Err(ExportError::Assembly(format!(
            "capture has no pixels ({}x{})",
            px_width, px_height
        )));
    }

    let page_width = geometry.width_mm();
    let page_height = geometry.height_mm();
    let image_height = geometry.image_height_mm(px_width, px_height);
    let pagination = Pagination::paginate(image_height, page_height);
    let dpi = f64::from(px_width) * 25.4 / page_width;
    info!(
        "Assembling {} page PDF from a {}x{} px capture ({:.1} mm tall)",
        pagination.page_count(),
        px_width,
        px_height,
        image_height
    );

    let rgb = DynamicImage::ImageRgb8(image.to_rgb8());
    // Stretched to the capture size, so the page draws with the same matrix.
    let placeholder = DynamicImage::ImageRgb8(RgbImage::new(1, 1));
    let (document, first_page, first_layer) =
        PdfDocument::new(title, Mm(page_width), Mm(page_height), "Layer 1");

    for (index, offset) in pagination.offsets().iter().enumerate() {
        let (page, layer) = if index == 0 {
            (first_page, first_layer)
        } else {
            document.add_page(
                Mm(page_width),
                Mm(page_height),
                format!("Layer {}", index + 1),
            )
        };
        let layer = document.get_page(page).get_layer(layer);

        // PDF space grows upwards from the page bottom.
        let bottom = page_height + offset - image_height;
        let (source, scale_x, scale_y) = if index == 0 {
            (&rgb, None, None)
        } else {
            (
                &placeholder,
                Some(f64::from(px_width)),
                Some(f64::from(px_height)),
            )
        };
        Image::from_dynamic_image(source).add_to_layer(
            layer,
            Some(Mm(0.0)),
            Some(Mm(bottom)),
            None,
            scale_x,
            scale_y,
            Some(dpi),
        );
    }

    let mut writer = BufWriter::new(Vec::new());
    document
        .save(&mut writer)
        .map_err(|err| ExportError::Assembly(format!("{:?}", err)))?;
    let bytes = writer
        .into_inner()
        .map_err(|err| ExportError::Assembly(err.to_string()))?;

    if pagination.page_count() > 1 {
        share_first_page_image(&bytes)
    } else {
        Ok(bytes)
    }
}

/// Points the image resources of every page at the image of the first page
/// and drops the images nothing refers to anymore.
fn share_first_page_image(bytes: &[u8]) -> Result<Vec<u8>, ExportError> {
    let mut document = Document::load_mem(bytes)?;
    let pages: Vec<ObjectId> = document.get_pages().into_values().collect();
    let Some((&first, rest)) = pages.split_first() else {
        return Ok(bytes.to_vec());
    };

    let shared = page_xobjects_mut(&mut document, first)?
        .iter()
        .find_map(|(_, object)| object.as_reference().ok())
        .ok_or(lopdf::Error::ObjectNotFound)?;
    for &page in rest {
        for (_, object) in page_xobjects_mut(&mut document, page)?.iter_mut() {
            *object = Object::Reference(shared);
        }
    }

    let pruned = document.prune_objects();
    debug!("Shared page image {:?}, pruned {} objects", shared, pruned.len());

    let mut output = Vec::new();
    document.save_to(&mut output).map_err(lopdf::Error::from)?;
    Ok(output)
}

/// Returns the `/XObject` resources of `page`, following references.
fn page_xobjects_mut(document: &mut Document, page: ObjectId) -> lopdf::Result<&mut Dictionary> {
    let resources_ref = document
        .get_object(page)?
        .as_dict()?
        .get(b"Resources")?
        .as_reference();
    let (owner, inline) = match resources_ref {
        Ok(id) => (id, false),
        Err(_) => (page, true),
    };

    let referenced = {
        let owner_dict = document.get_object(owner)?.as_dict()?;
        let resources = if inline {
            owner_dict.get(b"Resources")?.as_dict()?
        } else {
            owner_dict
        };
        resources.get(b"XObject")?.as_reference().ok()
    };
    if let Some(id) = referenced {
        return document.get_object_mut(id)?.as_dict_mut();
    }

    let owner_dict = document.get_object_mut(owner)?.as_dict_mut()?;
    let resources = if inline {
        owner_dict.get_mut(b"Resources")?.as_dict_mut()?
    } else {
        owner_dict
    };
    resources.get_mut(b"XObject")?.as_dict_mut()
}

/// Builds the rasterized PDF of `surface` and hands it to `target`.
///
/// A failing download alerts the user with [`DOWNLOAD_FAILED_MESSAGE`]; a
/// failing print viewer falls back to the page's own print dialog.
pub fn export_raster_pdf<S, H>(
    surface: &mut S,
    host: &mut H,
    options: &ExportOptions,
    student_name: &str,
    target: PdfTarget,
) -> ExportOutcome
where
    S: Surface + ?Sized,
    H: Host + ?Sized,
{
    let file_name = file_name_for(student_name);
    let result = build_raster_pdf(surface, options, PDF_TITLE).and_then(|bytes| match target {
        PdfTarget::Download => host
            .save_file(&file_name, &bytes)
            .map(|()| ExportOutcome::Saved {
                file_name: file_name.clone(),
            })
            .map_err(|source| ExportError::Save {
                file_name: file_name.clone(),
                source,
            }),
        PdfTarget::PrintViewer => {
            if host.open_window(&html::pdf_viewer_document(&bytes, &file_name)) {
                Ok(ExportOutcome::ViewerOpened)
            } else {
                warn!("PDF viewer window was blocked");
                Ok(ExportOutcome::WindowBlocked)
            }
        }
    });

    match (result, target) {
        (Ok(outcome), _) => outcome,
        (Err(err), PdfTarget::Download) => {
            error!("PDF download failed: {}", err);
            host.alert(DOWNLOAD_FAILED_MESSAGE);
            ExportOutcome::Alerted(err)
        }
        (Err(err), PdfTarget::PrintViewer) => {
            error!("PDF print preview failed, printing the page instead: {}", err);
            host.print();
            ExportOutcome::FellBackToPrint(err)
        }
    }
}

/// Saves the rasterized PDF of `surface`.
pub fn download_pdf<S, H>(
    surface: &mut S,
    host: &mut H,
    options: &ExportOptions,
    student_name: &str,
) -> ExportOutcome
where
    S: Surface + ?Sized,
    H: Host + ?Sized,
{
    export_raster_pdf(surface, host, options, student_name, PdfTarget::Download)
}

/// Opens the rasterized PDF of `surface` in a viewer window that prints it.
pub fn open_pdf_for_print<S, H>(
    surface: &mut S,
    host: &mut H,
    options: &ExportOptions,
    student_name: &str,
) -> ExportOutcome
where
    S: Surface + ?Sized,
    H: Host + ?Sized,
{
    export_raster_pdf(surface, host, options, student_name, PdfTarget::PrintViewer)
}

/// Opens the report markup in a print window styled for A4.
pub fn print_html<S, H>(surface: &S, host: &mut H, options: &ExportOptions) -> ExportOutcome
where
    S: Surface + ?Sized,
    H: Host + ?Sized,
{
    let document = html::print_document(&surface.markup(), options.html_print_delay());
    if host.open_window(&document) {
        ExportOutcome::PrintWindowOpened
    } else {
        warn!("Print window was blocked");
        ExportOutcome::WindowBlocked
    }
}

/// Shows the surface, lets the layout settle and prints the current page.
pub fn print_direct<S, H>(surface: &mut S, host: &mut H, options: &ExportOptions) -> ExportOutcome
where
    S: Surface + ?Sized,
    H: Host + ?Sized,
{
    let _shown = StyleGuard::show(surface);
    host.wait(options.print_delay());
    host.print();
    ExportOutcome::Printed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{Display, LayoutStyle, Length, Overflow, Visibility};
    use image::RgbImage;

    #[derive(Default)]
    struct Recorder {
        saved: Vec<(String, Vec<u8>)>,
        windows: Vec<String>,
        alerts: Vec<String>,
        prints: usize,
        waits: Vec<Duration>,
        block_windows: bool,
    }

    impl Host for Recorder {
        fn save_file(&mut self, file_name: &str, bytes: &[u8]) -> io::Result<()> {
            self.saved.push((file_name.to_string(), bytes.to_vec()));
            Ok(())
        }

        fn open_window(&mut self, document: &str) -> bool {
            if self.block_windows {
                return false;
            }
            self.windows.push(document.to_string());
            true
        }

        fn alert(&mut self, message: &str) {
            self.alerts.push(message.to_string());
        }

        fn print(&mut self) {
            self.prints += 1;
        }

        fn wait(&mut self, delay: Duration) {
            self.waits.push(delay);
        }
    }

    /// Surface whose capture is a blank image of a fixed size.
    struct Blank {
        style: LayoutStyle,
        size: (u32, u32),
        style_at_capture: Option<LayoutStyle>,
    }

    impl Blank {
        fn new(width: u32, height: u32) -> Self {
            Self {
                style: panel_style(),
                size: (width, height),
                style_at_capture: None,
            }
        }
    }

    impl Surface for Blank {
        fn style(&self) -> LayoutStyle {
            self.style
        }

        fn set_style(&mut self, style: LayoutStyle) {
            self.style = style;
        }

        fn markup(&self) -> String {
            "<h4>A. Nilai Akademik</h4>".to_string()
        }

        fn capture(&mut self, options: &CaptureOptions) -> Result<DynamicImage, CaptureError> {
            self.style_at_capture = Some(self.style);
            let (width, height) = self.size;
            if width == 0 || height == 0 {
                return Err(CaptureError::Empty { width, height });
            }
            Ok(DynamicImage::ImageRgb8(RgbImage::from_pixel(
                width,
                height,
                options.background,
            )))
        }
    }

    fn panel_style() -> LayoutStyle {
        LayoutStyle {
            display: Display::Unset,
            visibility: Visibility::Hidden,
            overflow: Overflow::Auto,
            height: Length::Unset,
            max_height: Length::Px(640.0),
        }
    }

    #[test]
    fn file_names_collapse_whitespace_runs() {
        assert_eq!(file_name_for("Budi Santoso"), "Rapor_Budi_Santoso.pdf");
        assert_eq!(file_name_for("Siti  Nur\tAini"), "Rapor_Siti_Nur_Aini.pdf");
        assert_eq!(file_name_for(""), "Rapor_siswa.pdf");
    }

    #[test]
    fn file_names_drop_path_separators() {
        assert_eq!(file_name_for("A/B\\C"), "Rapor_A_B_C.pdf");
        assert_eq!(file_name_for("Budi / Santoso"), "Rapor_Budi_Santoso.pdf");
        assert_eq!(file_name_for("../etc"), "Rapor_.._etc.pdf");
    }

    #[test]
    fn download_saves_the_pdf_and_restores_the_style() {
        let mut surface = Blank::new(40, 60);
        let mut host = Recorder::default();

        let outcome = download_pdf(&mut surface, &mut host, &ExportOptions::new(), "Budi Santoso");

        assert!(matches!(outcome, ExportOutcome::Saved { ref file_name } if file_name == "Rapor_Budi_Santoso.pdf"));
        assert_eq!(host.saved.len(), 1);
        assert!(host.saved[0].1.starts_with(b"%PDF"));
        assert_eq!(surface.style, panel_style());
        assert_eq!(surface.style_at_capture, Some(panel_style().expanded()));
    }

    #[test]
    fn failed_download_alerts_and_restores_the_style() {
        let mut surface = Blank::new(0, 0);
        let mut host = Recorder::default();

        let outcome = download_pdf(&mut surface, &mut host, &ExportOptions::new(), "Ani");

        assert!(matches!(
            outcome,
            ExportOutcome::Alerted(ExportError::Capture(CaptureError::Empty { .. }))
        ));
        assert_eq!(host.alerts, vec![DOWNLOAD_FAILED_MESSAGE.to_string()]);
        assert!(host.saved.is_empty());
        assert_eq!(host.prints, 0);
        assert_eq!(surface.style, panel_style());
    }

    #[test]
    fn failed_print_preview_falls_back_to_print() {
        let mut surface = Blank::new(0, 10);
        let mut host = Recorder::default();

        let outcome = open_pdf_for_print(&mut surface, &mut host, &ExportOptions::new(), "Ani");

        assert!(matches!(outcome, ExportOutcome::FellBackToPrint(_)));
        assert_eq!(host.prints, 1);
        assert!(host.alerts.is_empty());
        assert!(host.windows.is_empty());
        assert_eq!(surface.style, panel_style());
    }

    #[test]
    fn print_preview_embeds_the_pdf() {
        let mut surface = Blank::new(40, 60);
        let mut host = Recorder::default();

        let outcome = open_pdf_for_print(&mut surface, &mut host, &ExportOptions::new(), "Ani");

        assert!(matches!(outcome, ExportOutcome::ViewerOpened));
        assert_eq!(host.windows.len(), 1);
        assert!(host.windows[0].contains("data:application/pdf;filename=Rapor_Ani.pdf;base64,JVBER"));
        assert_eq!(host.prints, 0);
    }

    #[test]
    fn blocked_viewer_is_not_retried() {
        let mut surface = Blank::new(40, 60);
        let mut host = Recorder {
            block_windows: true,
            ..Recorder::default()
        };

        let outcome = open_pdf_for_print(&mut surface, &mut host, &ExportOptions::new(), "Ani");

        assert!(matches!(outcome, ExportOutcome::WindowBlocked));
        assert_eq!(host.prints, 0);
        assert!(host.alerts.is_empty());
    }

    #[test]
    fn html_print_uses_the_surface_markup() {
        let surface = Blank::new(1, 1);
        let mut host = Recorder::default();

        let outcome = print_html(&surface, &mut host, &ExportOptions::new());

        assert!(matches!(outcome, ExportOutcome::PrintWindowOpened));
        assert!(host.windows[0].contains("<div class=\"print-report\"><h4>A. Nilai Akademik</h4></div>"));
        assert!(host.windows[0].contains("setTimeout(()=>window.print(), 200)"));
    }

    #[test]
    fn direct_print_shows_then_restores() {
        struct Watch {
            inner: Blank,
            seen: Vec<LayoutStyle>,
        }

        impl Surface for Watch {
            fn style(&self) -> LayoutStyle {
                self.inner.style()
            }

            fn set_style(&mut self, style: LayoutStyle) {
                self.seen.push(style);
                self.inner.set_style(style);
            }

            fn markup(&self) -> String {
                self.inner.markup()
            }

            fn capture(&mut self, options: &CaptureOptions) -> Result<DynamicImage, CaptureError> {
                self.inner.capture(options)
            }
        }

        let mut surface = Watch {
            inner: Blank::new(1, 1),
            seen: Vec::new(),
        };
        let mut host = Recorder::default();

        let outcome = print_direct(&mut surface, &mut host, &ExportOptions::new());

        assert!(matches!(outcome, ExportOutcome::Printed));
        assert_eq!(host.waits, vec![Duration::from_millis(100)]);
        assert_eq!(host.prints, 1);
        assert_eq!(surface.seen, vec![panel_style().shown(), panel_style()]);
    }

    fn image_streams(document: &Document) -> Vec<ObjectId> {
        document
            .objects
            .iter()
            .filter(|(_, object)| match object {
                Object::Stream(stream) => stream
                    .dict
                    .get(b"Subtype")
                    .and_then(Object::as_name)
                    .map_or(false, |name| name == b"Image"),
                _ => false,
            })
            .map(|(id, _)| *id)
            .collect()
    }

    #[test]
    fn pages_share_one_embedded_image() {
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(210, 900, Rgb([200, 10, 10])));

        let bytes = assemble_pdf(&image, PageGeometry::A4, PDF_TITLE).expect("assemble pdf");
        let mut document = Document::load_mem(&bytes).expect("parse assembled pdf");

        let images = image_streams(&document);
        assert_eq!(images.len(), 1);
        let shared = images[0];
        let Object::Stream(stream) = document.get_object(shared).expect("image") else {
            panic!("image is not a stream");
        };
        assert_eq!(stream.dict.get(b"Width").and_then(Object::as_i64).ok(), Some(210));
        assert_eq!(stream.dict.get(b"Height").and_then(Object::as_i64).ok(), Some(900));

        let pages: Vec<ObjectId> = document.get_pages().into_values().collect();
        assert_eq!(pages.len(), 4);
        for page in pages {
            let xobjects = page_xobjects_mut(&mut document, page).expect("page images");
            assert_eq!(xobjects.len(), 1);
            for (_, object) in xobjects.iter() {
                assert_eq!(object.as_reference().ok(), Some(shared));
            }
        }
    }

    #[test]
    fn single_page_keeps_its_image() {
        let image = DynamicImage::ImageRgb8(RgbImage::new(210, 120));

        let bytes = assemble_pdf(&image, PageGeometry::A4, PDF_TITLE).expect("assemble pdf");
        let document = Document::load_mem(&bytes).expect("parse assembled pdf");

        assert_eq!(document.get_pages().len(), 1);
        assert_eq!(image_streams(&document).len(), 1);
    }

    #[test]
    fn assembly_rejects_empty_images() {
        let image = DynamicImage::ImageRgb8(RgbImage::new(0, 0));
        assert!(matches!(
            assemble_pdf(&image, PageGeometry::A4, PDF_TITLE),
            Err(ExportError::Assembly(_))
        ));
    }
}
