//! Bit packing for 10, 12 and 14 bit sample depths.
//!
//! Samples are packed MSB-first: conceptually all samples of a row are
//! concatenated big-endian into one bitstream which is then split into
//! bytes. Each row starts on a fresh byte boundary. A trailing partial
//! group is packed as a zero-padded full group and the row is truncated
//! to `packed_row_len()` bytes, so the encoding of a row never depends
//! on the sample count of its neighbours.

use rayon::prelude::*;

use crate::raster::Raster;
use crate::{DngError, Result};

/// Packed byte length of a single row: `ceil(width * bits / 8)`.
pub fn packed_row_len(width: usize, bits: u16) -> usize {
  (width * bits as usize + 7) / 8
}

/// Pack all rows of a raster into a contiguous strip buffer.
///
/// Every sample must fit into `bits`, otherwise the strip is rejected
/// instead of letting stray high bits corrupt neighbour samples.
pub fn pack_strip(raster: &Raster<u16>, bits: u16) -> Result<Vec<u8>> {
  let pack_row: fn(&mut [u8], &[u16]) = match bits {
    10 => pack_10be,
    12 => pack_12be,
    14 => pack_14be,
    _ => return Err(DngError::Encoding(format!("no bit packing for {} bits per sample", bits))),
  };
  check_depth(raster.pixels(), bits)?;
  let row_len = packed_row_len(raster.width, bits);
  if row_len == 0 {
    return Ok(Vec::new());
  }
  let mut out = vec![0u8; row_len * raster.height];
  out
    .par_chunks_exact_mut(row_len)
    .zip(raster.pixels().par_chunks_exact(raster.width))
    .for_each(|(outb, row)| pack_row(outb, row));
  Ok(out)
}

/// Fail on the first sample which has bits set above the declared depth.
pub(crate) fn check_depth(samples: &[u16], bits: u16) -> Result<()> {
  let limit = (1u32 << bits) - 1;
  if let Some(bad) = samples.iter().find(|&&v| u32::from(v) > limit) {
    return Err(DngError::Encoding(format!(
      "sample value {} exceeds the {} bit range 0..={}",
      bad, bits, limit
    )));
  }
  Ok(())
}

fn pack_10be(out: &mut [u8], row: &[u16]) {
  for (o, i) in out.chunks_exact_mut(5).zip(row.chunks_exact(4)) {
    pack10_group(o, i);
  }
  let rem = row.chunks_exact(4).remainder();
  if !rem.is_empty() {
    let mut grp = [0u16; 4];
    grp[..rem.len()].copy_from_slice(rem);
    let mut packed = [0u8; 5];
    pack10_group(&mut packed, &grp);
    let tail = &mut out[row.len() / 4 * 5..];
    tail.copy_from_slice(&packed[..tail.len()]);
  }
}

fn pack_12be(out: &mut [u8], row: &[u16]) {
  for (o, i) in out.chunks_exact_mut(3).zip(row.chunks_exact(2)) {
    pack12_group(o, i);
  }
  let rem = row.chunks_exact(2).remainder();
  if !rem.is_empty() {
    let grp = [rem[0], 0];
    let mut packed = [0u8; 3];
    pack12_group(&mut packed, &grp);
    let tail = &mut out[row.len() / 2 * 3..];
    tail.copy_from_slice(&packed[..tail.len()]);
  }
}

fn pack_14be(out: &mut [u8], row: &[u16]) {
  for (o, i) in out.chunks_exact_mut(7).zip(row.chunks_exact(4)) {
    pack14_group(o, i);
  }
  let rem = row.chunks_exact(4).remainder();
  if !rem.is_empty() {
    let mut grp = [0u16; 4];
    grp[..rem.len()].copy_from_slice(rem);
    let mut packed = [0u8; 7];
    pack14_group(&mut packed, &grp);
    let tail = &mut out[row.len() / 4 * 7..];
    tail.copy_from_slice(&packed[..tail.len()]);
  }
}

#[inline(always)]
fn pack10_group(o: &mut [u8], i: &[u16]) {
  let d1 = i[0];
  let d2 = i[1];
  let d3 = i[2];
  let d4 = i[3];

  o[0] = (d1 >> 2) as u8;
  o[1] = ((d1 & 0x03) << 6 | d2 >> 4) as u8;
  o[2] = ((d2 & 0x0f) << 4 | d3 >> 6) as u8;
  o[3] = ((d3 & 0x3f) << 2 | d4 >> 8) as u8;
  o[4] = (d4 & 0xff) as u8;
}

#[inline(always)]
fn pack12_group(o: &mut [u8], i: &[u16]) {
  let d1 = i[0];
  let d2 = i[1];

  o[0] = (d1 >> 4) as u8;
  o[1] = ((d1 & 0x0f) << 4 | d2 >> 8) as u8;
  o[2] = (d2 & 0xff) as u8;
}

#[inline(always)]
fn pack14_group(o: &mut [u8], i: &[u16]) {
  let d1 = i[0];
  let d2 = i[1];
  let d3 = i[2];
  let d4 = i[3];

  o[0] = (d1 >> 6) as u8;
  o[1] = ((d1 & 0x3f) << 2 | d2 >> 12) as u8;
  o[2] = (d2 >> 4 & 0xff) as u8;
  o[3] = ((d2 & 0x0f) << 4 | d3 >> 10) as u8;
  o[4] = (d3 >> 2 & 0xff) as u8;
  o[5] = ((d3 & 0x03) << 6 | d4 >> 8) as u8;
  o[6] = (d4 & 0xff) as u8;
}
