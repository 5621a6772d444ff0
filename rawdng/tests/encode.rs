// SPDX-License-Identifier: LGPL-2.1
// Copyright 2021 Daniel Vogelbacher <daniel@chaospixel.com>

//! End to end checks: encode a raster, then take the file apart with the
//! independent reader from `common` and compare against hand computed bytes.

mod common;

use byteorder::{ByteOrder, LittleEndian};
use rawdng::tags::{DngTag, TiffCommonTag};
use rawdng::{Directory, DngEncoder, Raster, Rational};

use crate::common::{ParsedDng, base_tags, check_md5_equal, gradient, init_test_logger, unpack_row};

#[test]
fn file_layout_follows_the_tiff_baseline() {
  init_test_logger();
  let raster = gradient(101, 3, 12);
  let mut enc = DngEncoder::new();
  enc.set_tags(base_tags(101, 3, 12));
  let parsed = ParsedDng::parse(enc.convert_to_vec(&raster).unwrap());

  // tag ids strictly ascending, no duplicates
  let ids: Vec<u16> = parsed.entries.iter().map(|entry| entry.tag).collect();
  let mut sorted = ids.clone();
  sorted.sort_unstable();
  sorted.dedup();
  assert_eq!(ids, sorted, "IFD entries must be sorted by tag id");

  // strip geometry is derived from the raster and closes the file
  assert_eq!(parsed.u32_value(TiffCommonTag::ImageWidth), 101);
  assert_eq!(parsed.u32_value(TiffCommonTag::ImageLength), 3);
  assert_eq!(parsed.u32_value(TiffCommonTag::RowsPerStrip), 3);
  let strip_offset = parsed.u32_value(TiffCommonTag::StripOffsets) as usize;
  let strip_len = parsed.u32_value(TiffCommonTag::StripByteCounts) as usize;
  assert_eq!(strip_offset % 2, 0);
  assert_eq!(strip_len, 3 * ((101 * 12 + 7) / 8));
  assert_eq!(strip_offset + strip_len, parsed.file.len());

  // baseline tags for an uncompressed linear raw
  assert_eq!(parsed.u32_value(TiffCommonTag::NewSubFileType), 0);
  assert_eq!(parsed.u32_value(TiffCommonTag::Compression), 1);
  assert_eq!(parsed.u32_value(TiffCommonTag::PhotometricInt), 34892);
  assert!(parsed.ascii_value(TiffCommonTag::Software).starts_with("rawdng "));
}

#[test]
fn eight_bit_strips_keep_one_byte_per_sample() {
  let raster = Raster::new(4, 1, vec![0_u16, 1, 128, 255]).unwrap();
  let mut enc = DngEncoder::new();
  enc.set_tags(base_tags(4, 1, 8));
  let parsed = ParsedDng::parse(enc.convert_to_vec(&raster).unwrap());
  assert_eq!(parsed.strip(), [0, 1, 128, 255]);
}

#[test]
fn sixteen_bit_strips_are_little_endian() {
  let raster = Raster::new(3, 2, vec![0x0102_u16, 0x0304, 0xffff, 0x0000, 0x0001, 0x0002]).unwrap();
  let mut enc = DngEncoder::new();
  enc.set_tags(base_tags(3, 2, 16));
  let parsed = ParsedDng::parse(enc.convert_to_vec(&raster).unwrap());

  let strip = parsed.strip();
  assert_eq!(strip.len(), 12);
  assert_eq!(&strip[0..4], [0x02, 0x01, 0x04, 0x03]);
  let mut back = vec![0_u16; 6];
  LittleEndian::read_u16_into(strip, &mut back);
  assert_eq!(back, raster.pixels());
}

#[test]
fn packed_strips_roundtrip_across_widths() {
  init_test_logger();
  for bits in [10_u16, 12, 14] {
    for width in [1_usize, 2, 3, 4, 5, 100, 101, 102, 103] {
      let height = 3;
      let raster = gradient(width, height, bits);
      let mut enc = DngEncoder::new();
      enc.set_tags(base_tags(width as u32, height as u32, bits));
      let parsed = ParsedDng::parse(enc.convert_to_vec(&raster).unwrap());

      let row_len = (width * bits as usize + 7) / 8;
      let strip = parsed.strip();
      assert_eq!(strip.len(), row_len * height, "strip size at {} bits, width {}", bits, width);

      for (y, row) in strip.chunks_exact(row_len).enumerate() {
        let expected = &raster.pixels()[y * width..(y + 1) * width];
        assert_eq!(unpack_row(row, width, bits), expected, "row {} at {} bits, width {}", y, bits, width);
        // everything after the last sample of a row must be zero bits
        for pos in width * bits as usize..row_len * 8 {
          assert_eq!(row[pos / 8] >> (7 - pos % 8) & 1, 0, "padding bit {} at {} bits, width {}", pos, bits, width);
        }
      }
    }
  }
}

#[test]
fn twelve_bit_rows_match_the_documented_bytes() {
  // two samples spanning three bytes, high nibble first
  let raster = Raster::new(2, 2, vec![0x000_u16, 0xfff, 0x001, 0x800]).unwrap();
  let mut enc = DngEncoder::new();
  enc.set_tags(base_tags(2, 2, 12));
  let parsed = ParsedDng::parse(enc.convert_to_vec(&raster).unwrap());
  assert_eq!(parsed.strip(), [0x00, 0x0f, 0xff, 0x00, 0x18, 0x00]);
}

#[test]
fn sample_format_and_versions_follow_the_sample_domain() {
  let ints = gradient(4, 4, 16);
  let mut enc = DngEncoder::new();
  enc.set_tags(base_tags(4, 4, 16));
  let parsed = ParsedDng::parse(enc.convert_to_vec(&ints).unwrap());
  assert_eq!(parsed.u32_value(TiffCommonTag::SampleFormat), 1);
  assert_eq!(parsed.payload(DngTag::DNGVersion), [1, 4, 0, 0]);
  assert_eq!(parsed.payload(DngTag::DNGBackwardVersion), [1, 0, 0, 0]);

  let floats = Raster::new(2, 2, vec![0.0_f32, -1.5, 3.25e7, f32::MIN_POSITIVE]).unwrap();
  enc.set_tags(base_tags(2, 2, 32));
  let parsed = ParsedDng::parse(enc.convert_to_vec(&floats).unwrap());
  assert_eq!(parsed.u32_value(TiffCommonTag::SampleFormat), 3);
  assert_eq!(parsed.u32_value(TiffCommonTag::BitsPerSample), 32);
  assert_eq!(parsed.payload(DngTag::DNGVersion), [1, 4, 0, 0]);
  assert_eq!(parsed.payload(DngTag::DNGBackwardVersion), [1, 4, 0, 0]);

  let mut back = [0_f32; 4];
  LittleEndian::read_f32_into(parsed.strip(), &mut back);
  assert_eq!(back, [0.0, -1.5, 3.25e7, f32::MIN_POSITIVE]);
}

#[test]
fn caller_tags_override_and_extend_the_defaults() {
  let raster = gradient(6, 2, 10);
  let mut tags = base_tags(6, 2, 10);
  tags.add_tag(TiffCommonTag::Make, "SomeVendor");
  tags.add_tag(TiffCommonTag::Model, "ACME Frame Grabber");
  tags.add_tag(TiffCommonTag::Software, "grabd 2.4.1");
  tags.add_tag(TiffCommonTag::Orientation, 1_u16);
  tags.add_tag(TiffCommonTag::XResolution, Rational::new(300, 1));
  tags.add_tag(TiffCommonTag::CFARepeatPatternDim, [2_u16, 2]);
  tags.add_tag(TiffCommonTag::CFAPattern, [0_u8, 1, 1, 2]);
  tags.add_tag(DngTag::UniqueCameraModel, "ACME Frame Grabber");
  tags.add_tag(DngTag::WhiteLevel, 1023_u16);
  let mut enc = DngEncoder::new();
  enc.set_tags(tags);
  let parsed = ParsedDng::parse(enc.convert_to_vec(&raster).unwrap());

  assert_eq!(parsed.ascii_value(TiffCommonTag::Make), "SomeVendor");
  assert_eq!(parsed.ascii_value(TiffCommonTag::Model), "ACME Frame Grabber");
  assert_eq!(parsed.ascii_value(DngTag::UniqueCameraModel), "ACME Frame Grabber");
  // the caller wins over the baseline software tag
  assert_eq!(parsed.ascii_value(TiffCommonTag::Software), "grabd 2.4.1");
  assert_eq!(parsed.u32_value(TiffCommonTag::Orientation), 1);
  assert_eq!(parsed.u32_value(DngTag::WhiteLevel), 1023);
  // 300/1, stored as two little-endian u32
  assert_eq!(parsed.payload(TiffCommonTag::XResolution), [44, 1, 0, 0, 1, 0, 0, 0]);
  assert_eq!(parsed.payload(TiffCommonTag::CFARepeatPatternDim), [2, 0, 2, 0]);
  assert_eq!(parsed.payload(TiffCommonTag::CFAPattern), [0, 1, 1, 2]);
}

#[test]
fn encoded_file_digest_is_stable() {
  init_test_logger();
  // 4x2 frame at 12 bit, every output byte is pinned down by hand
  let raster = Raster::new(4, 2, vec![0x000_u16, 0xfff, 0x123, 0xabc, 0x001, 0x800, 0x555, 0xaaa]).unwrap();
  let mut tags = Directory::new();
  tags.add_tag(TiffCommonTag::ImageWidth, 4_u16);
  tags.add_tag(TiffCommonTag::ImageLength, 2_u16);
  tags.add_tag(TiffCommonTag::BitsPerSample, 12_u16);
  // fixed software string, the digest must not move with the crate version
  tags.add_tag(TiffCommonTag::Software, "rawdng test");
  let mut enc = DngEncoder::new();
  enc.set_tags(tags);
  let dng = enc.convert_to_vec(&raster).unwrap();

  assert_eq!(dng.len(), 194);
  let parsed = ParsedDng::parse(dng);
  assert_eq!(parsed.u32_value(TiffCommonTag::StripOffsets), 182);
  assert_eq!(parsed.strip(), [0x00, 0x0f, 0xff, 0x12, 0x3a, 0xbc, 0x00, 0x18, 0x00, 0x55, 0x5a, 0xaa]);
  check_md5_equal(&parsed.file, "c17207fc431ca7572024cf63888e1b6f");
}

#[test]
fn convert_to_path_appends_the_dng_suffix() -> std::result::Result<(), Box<dyn std::error::Error>> {
  let dir = std::env::temp_dir().join(format!("rawdng-suffix-{}", std::process::id()));
  std::fs::create_dir_all(&dir)?;

  let raster = Raster::new(2, 1, vec![1_u16, 2]).unwrap();
  let mut enc = DngEncoder::new();
  enc.set_tags(base_tags(2, 1, 16));

  let written = enc.convert_to_path(&raster, dir.join("frame.raw"))?;
  assert_eq!(written, dir.join("frame.raw.dng"));
  let kept = enc.convert_to_path(&raster, dir.join("frame.DNG"))?;
  assert_eq!(kept, dir.join("frame.DNG"));

  let parsed = ParsedDng::parse(std::fs::read(&written)?);
  assert_eq!(parsed.u32_value(TiffCommonTag::ImageWidth), 2);
  assert_eq!(parsed.strip(), [1, 0, 2, 0]);

  std::fs::remove_dir_all(&dir)?;
  Ok(())
}
