use std::ops::Range;

pub(crate) struct PixelMapper;

impl PixelMapper {
    /// Map a continuous bound pair onto a half-open pixel index range.
    ///
    /// `None` bounds extend to the corresponding edge, and numeric bounds
    /// outside the coordinate range clamp to `0`/`len` (the clamp-to-extent
    /// policy). Descending coordinate arrays are searched in ascending order
    /// and the range is flipped back.
    pub(crate) fn bound_range(coords: &[f64], low: Option<f64>, high: Option<f64>) -> Range<usize> {
        let len = coords.len();
        if len >= 2 && coords[len - 1] < coords[0] {
            // On a descending axis the low coordinate bound sits at the
            // upper index end.
            let reversed: Vec<f64> = coords.iter().rev().copied().collect();
            let range = Self::ascending_range(&reversed, low, high);
            (len - range.end)..(len - range.start)
        } else {
            Self::ascending_range(coords, low, high)
        }
    }

    fn ascending_range(coords: &[f64], low: Option<f64>, high: Option<f64>) -> Range<usize> {
        let lo = low.map_or(0, |bound| Self::searchsorted(coords, bound));
        let hi = high.map_or(coords.len(), |bound| Self::searchsorted(coords, bound));
        lo..hi.max(lo)
    }

    #[inline]
    fn searchsorted(coords: &[f64], value: f64) -> usize {
        coords.partition_point(|&c| c < value)
    }

    /// Convert a line endpoint coordinate to a pixel index using the axis
    /// step size `(coords[len - 1] - coords[0]) / len`.
    ///
    /// A missing coordinate maps to pixel 0, as does a value equal to
    /// `coords[0]`. The result may fall outside `[0, len)`; line ROIs
    /// discard such pixels after rasterization.
    pub(crate) fn coord_to_pixel(coords: &[f64], value: Option<f64>) -> i64 {
        let Some(value) = value else {
            return 0;
        };
        let len = coords.len();
        let step = (coords[len - 1] - coords[0]) / len as f64;
        if step == 0.0 {
            return 0;
        }
        ((value - coords[0]) / step) as i64
    }
}
