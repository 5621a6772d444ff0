use rayon::prelude::*;

use crate::{DngError, Result};

/// Two dimensional sensor raster in row-major order.
///
/// The buffer length is validated against the dimensions at construction,
/// so every `Raster` handed around inside the crate is known to be
/// rectangular.
#[derive(Debug, Clone, PartialEq)]
pub struct Raster<T> {
  pub width: usize,
  pub height: usize,
  pub data: Vec<T>,
}

pub type RasterU16 = Raster<u16>;
pub type RasterF32 = Raster<f32>;

impl<T> Raster<T>
where
  T: Copy + Default + Send,
{
  /// Wrap an existing row-major buffer, checking it matches the dimensions.
  pub fn new(width: usize, height: usize, data: Vec<T>) -> Result<Self> {
    if data.len() != height * width {
      return Err(DngError::Validation(format!(
        "sample buffer holds {} values, but {}x{} needs {}",
        data.len(),
        width,
        height,
        height * width
      )));
    }
    Ok(Self { data, width, height })
  }

  /// Allocate a raster filled with the default sample value.
  pub fn new_filled(width: usize, height: usize) -> Self {
    let data = vec![T::default(); width * height];
    Self { data, width, height }
  }

  pub fn into_inner(self) -> Vec<T> {
    self.data
  }

  pub fn pixels(&self) -> &[T] {
    &self.data
  }

  pub fn pixels_mut(&mut self) -> &mut [T] {
    &mut self.data
  }

  pub fn pixel_rows(&self) -> std::slice::ChunksExact<T> {
    self.data.chunks_exact(self.width)
  }

  pub fn pixel_rows_mut(&mut self) -> std::slice::ChunksExactMut<T> {
    self.data.chunks_exact_mut(self.width)
  }

  #[inline(always)]
  pub fn for_each<F>(&mut self, op: F)
  where
    F: Fn(T) -> T + Send + Sync,
  {
    self.data.par_iter_mut().for_each(|v| *v = op(*v));
  }
}

/// Borrowed view over either sample domain the encoder accepts.
#[derive(Debug, Clone, Copy)]
pub enum Samples<'a> {
  Integer(&'a Raster<u16>),
  Float(&'a Raster<f32>),
}

impl Samples<'_> {
  pub fn width(&self) -> usize {
    match self {
      Self::Integer(raster) => raster.width,
      Self::Float(raster) => raster.width,
    }
  }

  pub fn height(&self) -> usize {
    match self {
      Self::Integer(raster) => raster.height,
      Self::Float(raster) => raster.height,
    }
  }

  pub fn is_float(&self) -> bool {
    matches!(self, Self::Float(_))
  }
}

impl<'a> From<&'a Raster<u16>> for Samples<'a> {
  fn from(raster: &'a Raster<u16>) -> Self {
    Self::Integer(raster)
  }
}

impl<'a> From<&'a Raster<f32>> for Samples<'a> {
  fn from(raster: &'a Raster<f32>) -> Self {
    Self::Float(raster)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn new_checks_buffer_length() {
    assert!(Raster::new(4, 3, vec![0u16; 12]).is_ok());
    let err = Raster::new(4, 3, vec![0u16; 11]).unwrap_err();
    assert!(matches!(err, DngError::Validation(_)));
  }

  #[test]
  fn rows_iterate_in_row_major_order() {
    let raster = Raster::new(3, 2, vec![1u16, 2, 3, 4, 5, 6]).unwrap();
    let rows: Vec<&[u16]> = raster.pixel_rows().collect();
    assert_eq!(rows, vec![&[1u16, 2, 3][..], &[4u16, 5, 6][..]]);
  }

  #[test]
  fn for_each_maps_all_pixels() {
    let mut raster = Raster::new_filled(8, 8);
    raster.for_each(|v: u16| v + 7);
    assert!(raster.pixels().iter().all(|p| *p == 7));
  }

  #[test]
  fn samples_view_reports_dimensions() {
    let ints = Raster::new(5, 4, vec![0u16; 20]).unwrap();
    let floats = Raster::new(2, 2, vec![0f32; 4]).unwrap();
    assert_eq!(Samples::from(&ints).width(), 5);
    assert_eq!(Samples::from(&ints).height(), 4);
    assert!(!Samples::from(&ints).is_float());
    assert!(Samples::from(&floats).is_float());
  }
}
