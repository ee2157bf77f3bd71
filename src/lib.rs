//! # xrd-volume library
//!
//! This crate serves a high-level API for analyzing 3D X-ray diffraction
//! image data as labeled volumes.
//!
//! A [`LabeledVolume`] pairs a 3D intensity array with named, ordered,
//! monotonic coordinate arrays for its three axes. Volumes come from two
//! kinds of upstream collaborators: a detector-frame source that stacks
//! per-point 2D frames into a raw volume with `t`/`x`/`y` index coordinates
//! (see [`Scan`] and [`ScanSource`]), or a reciprocal-space gridder that
//! maps scattered HKL-tagged intensities onto a regular `H`/`K`/`L` grid
//! (see [`RsmGridder`]).
//!
//! Two region-of-interest controllers extract reduced data from a volume:
//!  - [`RectRoi`] is an axis-aligned box; bounds clamp to the volume's edges
//!    and the clipped sub-volume collapses over selected axes via average or
//!    max.
//!  - [`LineRoi`] is a 3D line segment; the segment is rasterized into a
//!    discrete pixel path, out-of-bounds samples are discarded, each sample
//!    is optionally smoothed over a cube or sphere neighborhood, and the
//!    sampled sequence is emitted raw or collapsed.
//!
//! Both produce a [`RoiOutput`]: reduced data of rank 0 to 2 plus a
//! coordinate dictionary whose key text records which original axes each
//! column represents. Everything is synchronous and in-memory; `apply` is a
//! pure function of the ROI's current state and the input volume, safe to
//! call repeatedly as bounds change.
//!
//! # Examples
//!
//! ## Averaging a box region down to one axis
//!
//! ```
//! use ndarray::Array3;
//! use xrd_volume::{BoundPair, LabeledVolume, RectRoi, ReduceOp};
//!
//! let data = Array3::from_shape_fn((4, 4, 4), |(i, _, _)| i as f64);
//! let coords: Vec<f64> = (0..4).map(f64::from).collect();
//! let volume = LabeledVolume::new(
//!     data,
//!     [
//!         ("H", coords.clone()),
//!         ("K", coords.clone()),
//!         ("L", coords),
//!     ],
//! )?;
//!
//! let mut roi = RectRoi::with_dims(["H", "K", "L"]);
//! roi.set_bounds(&[
//!     ("H", BoundPair::FULL),
//!     ("K", BoundPair::new(Some(1.0), None)),
//!     ("L", BoundPair::FULL),
//! ])?;
//! roi.set_reduction(ReduceOp::Average, &["K", "L"])?;
//!
//! let output = roi.apply(&volume)?;
//! assert_eq!(output.data.shape(), &[4]);
//! assert_eq!(output.coords[0].0, "H");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Sampling along a smoothed line segment
//!
//! ```
//! use ndarray::Array3;
//! use xrd_volume::{LabeledVolume, LineReduceOp, LineRoi, SmoothingShape};
//!
//! let data = Array3::from_elem((10, 10, 10), 2.5);
//! let coords: Vec<f64> = (0..10).map(f64::from).collect();
//! let volume = LabeledVolume::new(
//!     data,
//!     [
//!         ("H", coords.clone()),
//!         ("K", coords.clone()),
//!         ("L", coords),
//!     ],
//! )?;
//!
//! let mut roi = LineRoi::with_dims(["H", "K", "L"]);
//! roi.set_endpoints(
//!     &[("H", Some(0.0)), ("K", Some(5.0)), ("L", Some(5.0))],
//!     &[("H", Some(9.0)), ("K", Some(5.0)), ("L", Some(5.0))],
//! )?;
//! roi.set_smoothing(1, SmoothingShape::Sphere)?;
//! roi.set_reduction(LineReduceOp::Values, None)?;
//!
//! let output = roi.apply(&volume)?;
//! assert_eq!(output.data.shape(), &[10]);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod enums;
mod mapper;
pub mod output;
mod rasterize;
pub mod roi;
pub mod scan;
pub mod volume;

pub use enums::{LineReduceOp, ReduceOp, SmoothingShape};
pub use output::{CoordValue, RoiOutput, join_labels, split_key};
pub use roi::{BoundPair, LineRoi, MAX_SMOOTHING_RADIUS, RectRoi, RoiError};
pub use scan::{HKL_LABELS, MIN_GRID_EXTENT, RsmGridder, Scan, ScanError, ScanSource};
pub use volume::{LabeledVolume, VolumeError};
