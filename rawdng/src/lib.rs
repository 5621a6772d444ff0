//! Library to encode in-memory RAW sensor data into Digital Negative (DNG)
//! files. Given a rectangular raster of integer or floating point samples and
//! a set of metadata tags you get a complete, uncompressed DNG byte stream.
//!
//! # Example
//! ```rust
//! use rawdng::tags::TiffCommonTag;
//! use rawdng::{Directory, DngEncoder, Raster};
//!
//! fn main() -> rawdng::Result<()> {
//!   // A 64x32 frame of 12-bit samples, stored as u16.
//!   let raster = Raster::new(64, 32, vec![0_u16; 64 * 32])?;
//!
//!   let mut tags = Directory::new();
//!   tags.add_tag(TiffCommonTag::ImageWidth, 64_u32);
//!   tags.add_tag(TiffCommonTag::ImageLength, 32_u32);
//!   tags.add_tag(TiffCommonTag::BitsPerSample, 12_u16);
//!
//!   let mut encoder = DngEncoder::new();
//!   encoder.set_tags(tags);
//!   let dng = encoder.convert_to_vec(&raster)?;
//!   assert_eq!(&dng[0..4], [0x49, 0x49, 42, 0]);
//!   Ok(())
//! }
//! ```

#![deny(unstable_features)]

use std::io;
use thiserror::Error;

pub mod dng;
pub mod packed;
pub mod raster;
pub mod tags;
pub mod tiff;

pub use dng::DngEncoder;
pub use raster::Raster;
pub use raster::Samples;
pub use tiff::Directory;
pub use tiff::Entry;
pub use tiff::Rational;
pub use tiff::SRational;
pub use tiff::Value;

#[derive(Error, Debug)]
pub enum DngError {
  /// Raster shape or declared tags are inconsistent, the caller must fix the inputs.
  #[error("validation failed: {}", _0)]
  Validation(String),

  /// A sample or tag value does not fit its declared encoding.
  #[error("encoding failed: {}", _0)]
  Encoding(String),

  /// A directory layout invariant was violated, this is a bug in the calling code.
  #[error("layout failed: {}", _0)]
  Layout(String),

  /// Sink failure, propagated verbatim.
  #[error("I/O error while writing DNG: {}", _0)]
  Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, DngError>;
