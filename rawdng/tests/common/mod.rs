// SPDX-License-Identifier: LGPL-2.1
// Copyright 2021 Daniel Vogelbacher <daniel@chaospixel.com>

//! Shared helpers: a deliberately naive, bit level TIFF reader used to
//! verify encoder output without sharing any code with the encoder.

use byteorder::{ByteOrder, LittleEndian};
use rawdng::tags::TiffCommonTag;
use rawdng::{Directory, Raster};

pub(crate) fn init_test_logger() {
  let _ = env_logger::builder().is_test(true).try_init();
}

pub(crate) fn check_md5_equal(data: &[u8], expected: &str) {
  assert_eq!(format!("{:x}", md5::compute(data)), expected);
}

/// Caller directory with just the three mandatory tags.
pub(crate) fn base_tags(width: u32, height: u32, bits: u16) -> Directory {
  let mut tags = Directory::new();
  tags.add_tag(TiffCommonTag::ImageWidth, width);
  tags.add_tag(TiffCommonTag::ImageLength, height);
  tags.add_tag(TiffCommonTag::BitsPerSample, bits);
  tags
}

/// Deterministic test frame covering the full value range of `bits`,
/// with the maximum value pinned to the first sample.
pub(crate) fn gradient(width: usize, height: usize, bits: u16) -> Raster<u16> {
  let limit = (1_u64 << bits) - 1;
  let mut data: Vec<u16> = (0..width * height).map(|i| (i as u64 * 2654435761 % (limit + 1)) as u16).collect();
  if let Some(first) = data.first_mut() {
    *first = limit as u16;
  }
  Raster::new(width, height, data).expect("gradient raster must be rectangular")
}

/// Read `width` samples of `bits` each from a packed row, MSB first.
///
/// A plain bit by bit loop on purpose, so it cannot share a bug with the
/// shift based packer in the crate.
pub(crate) fn unpack_row(row: &[u8], width: usize, bits: u16) -> Vec<u16> {
  let mut samples = Vec::with_capacity(width);
  for i in 0..width {
    let mut value = 0_u16;
    for j in 0..bits as usize {
      let pos = i * bits as usize + j;
      let bit = row[pos / 8] >> (7 - pos % 8) & 1;
      value = value << 1 | bit as u16;
    }
    samples.push(value);
  }
  samples
}

pub(crate) struct RawEntry {
  pub tag: u16,
  pub value_type: u16,
  pub count: u32,
  pub cell: [u8; 4],
}

pub(crate) struct ParsedDng {
  pub file: Vec<u8>,
  pub entries: Vec<RawEntry>,
}

impl ParsedDng {
  /// Split a little-endian TIFF with a single IFD into raw entries.
  pub(crate) fn parse(file: Vec<u8>) -> Self {
    assert_eq!(&file[0..4], [0x49, 0x49, 0x2a, 0x00], "not a little endian TIFF");
    assert_eq!(LittleEndian::read_u32(&file[4..8]), 8, "IFD must start right after the header");

    let count = LittleEndian::read_u16(&file[8..10]) as usize;
    let mut entries = Vec::with_capacity(count);
    for i in 0..count {
      let pos = 10 + 12 * i;
      entries.push(RawEntry {
        tag: LittleEndian::read_u16(&file[pos..pos + 2]),
        value_type: LittleEndian::read_u16(&file[pos + 2..pos + 4]),
        count: LittleEndian::read_u32(&file[pos + 4..pos + 8]),
        cell: file[pos + 8..pos + 12].try_into().expect("12 byte entry"),
      });
    }
    let next_ifd = 10 + 12 * count;
    assert_eq!(LittleEndian::read_u32(&file[next_ifd..next_ifd + 4]), 0, "there must be no second IFD");
    Self { file, entries }
  }

  pub(crate) fn entry(&self, tag: impl Into<u16>) -> &RawEntry {
    let tag = tag.into();
    self
      .entries
      .iter()
      .find(|entry| entry.tag == tag)
      .unwrap_or_else(|| panic!("tag {} missing from IFD", tag))
  }

  fn type_size(value_type: u16) -> usize {
    match value_type {
      1 | 2 | 6 | 7 => 1,
      3 | 8 => 2,
      4 | 9 | 11 => 4,
      5 | 10 | 12 => 8,
      _ => panic!("unknown value type {}", value_type),
    }
  }

  /// Raw payload bytes of a tag, embedded or read from the overflow region.
  pub(crate) fn payload(&self, tag: impl Into<u16>) -> &[u8] {
    let entry = self.entry(tag);
    let len = entry.count as usize * Self::type_size(entry.value_type);
    if len <= 4 {
      &entry.cell[0..len]
    } else {
      let offset = LittleEndian::read_u32(&entry.cell) as usize;
      assert_eq!(offset % 2, 0, "value of tag {} sits on an odd offset", entry.tag);
      &self.file[offset..offset + len]
    }
  }

  /// Scalar SHORT or LONG value of a tag.
  pub(crate) fn u32_value(&self, tag: impl Into<u16>) -> u32 {
    let entry = self.entry(tag);
    match entry.value_type {
      3 => LittleEndian::read_u16(&entry.cell[0..2]) as u32,
      4 => LittleEndian::read_u32(&entry.cell),
      other => panic!("tag {} is not an integer scalar, type {}", entry.tag, other),
    }
  }

  pub(crate) fn ascii_value(&self, tag: impl Into<u16>) -> String {
    let payload = self.payload(tag);
    assert_eq!(payload.last(), Some(&0), "ASCII value must end with NUL");
    String::from_utf8(payload[..payload.len() - 1].to_vec()).expect("ASCII payload must be valid UTF-8")
  }

  /// Strip bytes located through StripOffsets and StripByteCounts.
  pub(crate) fn strip(&self) -> &[u8] {
    let offset = self.u32_value(TiffCommonTag::StripOffsets) as usize;
    let len = self.u32_value(TiffCommonTag::StripByteCounts) as usize;
    assert_eq!(offset % 2, 0, "strip sits on an odd offset");
    &self.file[offset..offset + len]
  }
}
