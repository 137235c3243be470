//! Splitting one tall raster into fixed height page windows.

/// Tolerance used when comparing lengths in millimeters.
///
/// The image height is derived from a pixel ratio, so an image meant to be
/// exactly two pages tall can come out a few ULPs above that.
pub const PAGE_EPSILON_MM: f64 = 1e-6;

/// Page size in millimeters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PageGeometry {
    width_mm: f64,
    height_mm: f64,
}

impl PageGeometry {
    /// ISO A4 portrait.
    pub const A4: Self = Self {
        width_mm: 210.0,
        height_mm: 297.0,
    };

    pub fn new(width_mm: f64, height_mm: f64) -> Self {
        Self {
            width_mm,
            height_mm,
        }
    }

    pub fn width_mm(&self) -> f64 {
        self.width_mm
    }

    pub fn height_mm(&self) -> f64 {
        self.height_mm
    }

    /// Height in millimeters of an image of `px_width` x `px_height` pixels
    /// scaled to the page width.
    pub fn image_height_mm(&self, px_width: u32, px_height: u32) -> f64 {
        image_height_mm(px_width, px_height, self.width_mm)
    }
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::A4
    }
}

/// Height in millimeters of an image scaled to `width_mm`, keeping its
/// aspect ratio. A zero width image has no height.
pub fn image_height_mm(px_width: u32, px_height: u32, width_mm: f64) -> f64 {
    if px_width == 0 {
        return 0.0;
    }
    f64::from(px_height) * width_mm / f64::from(px_width)
}

/// Vertical offsets of the image on each page.
///
/// Offsets are in millimeters relative to the page top: the first page shows
/// the image at `0.0`, page `n` shifts it up by `n` page heights.
#[derive(Clone, Debug, PartialEq)]
pub struct Pagination {
    offsets: Vec<f64>,
}

impl Pagination {
    /// Paginates an image of `image_height` mm onto pages of `page_height` mm.
    ///
    /// Always yields at least one page. A further page is added only while
    /// some image height is still unshown, so an image of exactly `n` page
    /// heights takes `n` pages.
    pub fn paginate(image_height: f64, page_height: f64) -> Self {
        let mut offsets = vec![0.0];
        if !(page_height > 0.0) || !image_height.is_finite() {
            return Self { offsets };
        }

        let mut remaining = image_height - page_height;
        while remaining > PAGE_EPSILON_MM {
            offsets.push(-(offsets.len() as f64) * page_height);
            remaining -= page_height;
        }
        Self { offsets }
    }

    pub fn offsets(&self) -> &[f64] {
        &self.offsets
    }

    pub fn page_count(&self) -> usize {
        self.offsets.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_pages_for_a_partially_filled_second_page() {
        let pagination = Pagination::paginate(500.0, 297.0);
        assert_eq!(pagination.page_count(), 2);
        assert_eq!(pagination.offsets(), &[0.0, -297.0]);
    }

    #[test]
    fn exact_multiples_do_not_add_a_blank_page() {
        assert_eq!(Pagination::paginate(297.0, 297.0).page_count(), 1);
        assert_eq!(Pagination::paginate(594.0, 297.0).page_count(), 2);
        assert_eq!(Pagination::paginate(891.0, 297.0).offsets(), &[0.0, -297.0, -594.0]);
    }

    #[test]
    fn short_and_empty_images_take_one_page() {
        assert_eq!(Pagination::paginate(120.0, 297.0).page_count(), 1);
        assert_eq!(Pagination::paginate(0.0, 297.0).page_count(), 1);
        assert_eq!(Pagination::paginate(f64::NAN, 297.0).page_count(), 1);
        assert_eq!(Pagination::paginate(500.0, 0.0).page_count(), 1);
    }

    #[test]
    fn rounding_above_a_page_boundary_is_tolerated() {
        // 794 x 1123 px is A4 at 96 dpi.
        let height = PageGeometry::A4.image_height_mm(794, 2 * 1123);
        assert!((height - 594.0).abs() < 0.5);
        assert_eq!(Pagination::paginate(594.0 + 1e-9, 297.0).page_count(), 2);
        assert_eq!(Pagination::paginate(594.01, 297.0).page_count(), 3);
    }

    #[test]
    fn image_height_follows_the_aspect_ratio() {
        assert_eq!(image_height_mm(3176, 3176, 210.0), 210.0);
        assert_eq!(image_height_mm(1000, 2000, 210.0), 420.0);
        assert_eq!(image_height_mm(0, 2000, 210.0), 0.0);
    }
}
