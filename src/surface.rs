//! The report surface: rendered report plus the mutable layout style that the
//! export paths temporarily override.
//!
//! Exports never leave a style change behind.  Every override goes through a
//! [`StyleGuard`], which restores the style it found when it is dropped, on
//! success, on error returns and while unwinding alike.

use std::fmt;
use std::ops::{Deref, DerefMut};

use image::{DynamicImage, Rgb};

use crate::fonts::FontSet;
use crate::html;
use crate::raster::{self, DisplayList};
use crate::report::ReportDocument;

/// Largest raster the capture is willing to allocate, in pixels.
pub const MAX_CAPTURE_PIXELS: u64 = 400_000_000;

/// The `display` property.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Display {
    #[default]
    Unset,
    Block,
    None,
}

/// The `visibility` property.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Visibility {
    #[default]
    Unset,
    Visible,
    Hidden,
}

/// The `overflow` property.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Overflow {
    #[default]
    Unset,
    Visible,
    Hidden,
    Auto,
    Scroll,
}

/// A length used by `height` and `max-height`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Length {
    /// No inline value.
    #[default]
    Unset,
    /// `auto` for `height`, `none` for `max-height`.
    Auto,
    /// Fixed length in CSS pixels.
    Px(f32),
}

impl Length {
    fn limit(self) -> Option<f32> {
        match self {
            Self::Px(value) => Some(value),
            Self::Unset | Self::Auto => None,
        }
    }
}

/// Inline layout style of the report element.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LayoutStyle {
    pub display: Display,
    pub visibility: Visibility,
    pub overflow: Overflow,
    pub height: Length,
    pub max_height: Length,
}

impl LayoutStyle {
    /// Returns this style forced to its natural, fully expanded height.
    pub fn expanded(self) -> Self {
        Self {
            display: Display::Block,
            overflow: Overflow::Visible,
            height: Length::Auto,
            max_height: Length::Auto,
            ..self
        }
    }

    /// Returns this style forced visible.
    pub fn shown(self) -> Self {
        Self {
            display: Display::Block,
            visibility: Visibility::Visible,
            ..self
        }
    }

    /// Height of the element box for content of `natural_height`.
    pub fn box_height(&self, natural_height: f32) -> f32 {
        let mut height = self.height.limit().unwrap_or(natural_height);
        if let Some(max) = self.max_height.limit() {
            height = height.min(max);
        }
        height
    }

    /// Height that a capture samples: content overflowing a non-visible box
    /// is clipped.
    pub fn captured_height(&self, natural_height: f32) -> f32 {
        match self.overflow {
            Overflow::Visible => natural_height.max(self.box_height(natural_height)),
            Overflow::Unset | Overflow::Hidden | Overflow::Auto | Overflow::Scroll => {
                self.box_height(natural_height)
            }
        }
    }
}

/// Parameters of a raster capture.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CaptureOptions {
    /// Supersampling factor relative to CSS pixels.
    pub scale: f32,
    pub background: Rgb<u8>,
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self {
            scale: 4.0,
            background: Rgb([255, 255, 255]),
        }
    }
}

/// Reasons a capture fails.
#[derive(Debug, Clone, PartialEq)]
pub enum CaptureError {
    /// The element is not displayed.
    NotDisplayed,
    /// The sampled area has no pixels.
    Empty { width: u32, height: u32 },
    /// The sampled area is too large to allocate.
    TooLarge { width: u32, height: u32 },
    /// The supersampling factor is not a positive finite number.
    InvalidScale(f32),
    /// Backend specific failure.
    Backend(String),
}

impl fmt::Display for CaptureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotDisplayed => write!(f, "Report element is not displayed"),
            Self::Empty { width, height } => {
                write!(f, "Report element has an empty area ({}x{})", width, height)
            }
            Self::TooLarge { width, height } => write!(
                f,
                "Capture of {}x{} pixels exceeds the raster limit",
                width, height
            ),
            Self::InvalidScale(scale) => write!(f, "Invalid capture scale {}", scale),
            Self::Backend(message) => write!(f, "Capture failed: {}", message),
        }
    }
}

impl std::error::Error for CaptureError {}

/// A rendered report element that can be restyled and rasterized.
pub trait Surface {
    /// Returns the current inline style.
    fn style(&self) -> LayoutStyle;

    /// Replaces the inline style.
    fn set_style(&mut self, style: LayoutStyle);

    /// Returns the inner markup of the element.
    fn markup(&self) -> String;

    /// Rasterizes the element as currently styled.
    fn capture(&mut self, options: &CaptureOptions) -> Result<DynamicImage, CaptureError>;
}

/// Scoped style override that restores the previous style on drop.
pub struct StyleGuard<'a, S: Surface + ?Sized> {
    surface: &'a mut S,
    saved: LayoutStyle,
}

impl<'a, S: Surface + ?Sized> StyleGuard<'a, S> {
    /// Applies `change` to the current style of `surface`.
    pub fn apply(surface: &'a mut S, change: impl FnOnce(LayoutStyle) -> LayoutStyle) -> Self {
        let saved = surface.style();
        surface.set_style(change(saved));
        Self { surface, saved }
    }

    /// Forces the surface to its natural, fully expanded height.
    pub fn expand(surface: &'a mut S) -> Self {
        Self::apply(surface, LayoutStyle::expanded)
    }

    /// Forces the surface visible.
    pub fn show(surface: &'a mut S) -> Self {
        Self::apply(surface, LayoutStyle::shown)
    }

    /// Returns the style that will be restored.
    pub fn saved(&self) -> LayoutStyle {
        self.saved
    }
}

impl<S: Surface + ?Sized> Deref for StyleGuard<'_, S> {
    type Target = S;

    fn deref(&self) -> &S {
        self.surface
    }
}

impl<S: Surface + ?Sized> DerefMut for StyleGuard<'_, S> {
    fn deref_mut(&mut self) -> &mut S {
        self.surface
    }
}

impl<S: Surface + ?Sized> Drop for StyleGuard<'_, S> {
    fn drop(&mut self) {
        self.surface.set_style(self.saved);
    }
}

/// The report element of the preview page.
#[derive(Debug)]
pub struct ReportSurface {
    document: ReportDocument,
    markup: String,
    fonts: FontSet,
    style: LayoutStyle,
}

impl ReportSurface {
    /// Creates a surface for `document`, painted with `fonts`.
    pub fn new(document: ReportDocument, fonts: FontSet) -> Self {
        let markup = html::report_markup(&document);
        Self {
            document,
            markup,
            fonts,
            style: LayoutStyle::default(),
        }
    }

    /// Sets the initial inline style and returns the updated surface.
    pub fn with_style(mut self, style: LayoutStyle) -> Self {
        self.style = style;
        self
    }

    /// Returns the rendered document.
    pub fn document(&self) -> &ReportDocument {
        &self.document
    }

    /// Lays out the document at its natural height.
    pub fn layout(&self) -> DisplayList {
        raster::layout_document(&self.document, &self.fonts)
    }
}

impl Surface for ReportSurface {
    fn style(&self) -> LayoutStyle {
        self.style
    }

    fn set_style(&mut self, style: LayoutStyle) {
        self.style = style;
    }

    fn markup(&self) -> String {
        self.markup.clone()
    }

    fn capture(&mut self, options: &CaptureOptions) -> Result<DynamicImage, CaptureError> {
        if self.style.display == Display::None {
            return Err(CaptureError::NotDisplayed);
        }
        if !(options.scale.is_finite() && options.scale > 0.0) {
            return Err(CaptureError::InvalidScale(options.scale));
        }

        let mut list = self.layout();
        let natural_height = list.height();
        list.clip_height(self.style.captured_height(natural_height));

        let (width, height) = list.pixel_size(options.scale);
        if width == 0 || height == 0 {
            return Err(CaptureError::Empty { width, height });
        }
        if u64::from(width) * u64::from(height) > MAX_CAPTURE_PIXELS {
            return Err(CaptureError::TooLarge { width, height });
        }

        log::debug!(
            "Capturing report surface at {}x ({}x{} px, natural height {:.1})",
            options.scale,
            width,
            height,
            natural_height
        );
        let image = raster::paint(&list, &self.fonts, options.scale, options.background);
        Ok(DynamicImage::ImageRgb8(image))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Probe {
        style: LayoutStyle,
        styles_seen: Vec<LayoutStyle>,
    }

    impl Surface for Probe {
        fn style(&self) -> LayoutStyle {
            self.style
        }

        fn set_style(&mut self, style: LayoutStyle) {
            self.styles_seen.push(style);
            self.style = style;
        }

        fn markup(&self) -> String {
            String::new()
        }

        fn capture(&mut self, _options: &CaptureOptions) -> Result<DynamicImage, CaptureError> {
            Err(CaptureError::Backend("probe".to_string()))
        }
    }

    fn scrolling_panel() -> LayoutStyle {
        LayoutStyle {
            display: Display::None,
            visibility: Visibility::Unset,
            overflow: Overflow::Auto,
            height: Length::Px(600.0),
            max_height: Length::Px(500.0),
        }
    }

    #[test]
    fn guard_restores_style_on_drop() {
        let mut probe = Probe {
            style: scrolling_panel(),
            ..Probe::default()
        };

        {
            let guard = StyleGuard::expand(&mut probe);
            assert_eq!(guard.style(), scrolling_panel().expanded());
            assert_eq!(guard.saved(), scrolling_panel());
        }

        assert_eq!(probe.style(), scrolling_panel());
    }

    #[test]
    fn guard_restores_style_after_failed_capture() {
        let mut probe = Probe {
            style: scrolling_panel(),
            ..Probe::default()
        };

        let result = {
            let mut guard = StyleGuard::expand(&mut probe);
            guard.capture(&CaptureOptions::default())
        };

        assert!(result.is_err());
        assert_eq!(probe.style(), scrolling_panel());
        assert_eq!(probe.styles_seen.len(), 2);
    }

    #[test]
    fn expanded_style_keeps_visibility() {
        let style = LayoutStyle {
            visibility: Visibility::Hidden,
            ..scrolling_panel()
        };
        let expanded = style.expanded();
        assert_eq!(expanded.display, Display::Block);
        assert_eq!(expanded.overflow, Overflow::Visible);
        assert_eq!(expanded.height, Length::Auto);
        assert_eq!(expanded.max_height, Length::Auto);
        assert_eq!(expanded.visibility, Visibility::Hidden);

        let shown = style.shown();
        assert_eq!(shown.visibility, Visibility::Visible);
        assert_eq!(shown.overflow, Overflow::Auto);
    }

    #[test]
    fn captured_height_clips_only_non_visible_overflow() {
        let panel = scrolling_panel();
        assert_eq!(panel.captured_height(1200.0), 500.0);
        assert_eq!(panel.expanded().captured_height(1200.0), 1200.0);

        let visible_but_fixed = LayoutStyle {
            overflow: Overflow::Visible,
            ..panel
        };
        assert_eq!(visible_but_fixed.captured_height(1200.0), 1200.0);
        assert_eq!(LayoutStyle::default().captured_height(900.0), 900.0);
    }
}
