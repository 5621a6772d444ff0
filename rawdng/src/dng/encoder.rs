// SPDX-License-Identifier: LGPL-2.1
// Copyright by image-tiff authors (see https://github.com/image-rs/image-tiff)
// Copyright 2021 Daniel Vogelbacher <daniel@chaospixel.com>

//! Encoder turning a raster plus caller tags into a finished DNG file.
//!
//! The caller describes the image with a tag [`Directory`] (ImageWidth,
//! ImageLength and BitsPerSample are mandatory), hands over the samples
//! and picks an output. The encoder validates, produces the strip,
//! merges baseline tags, plans the byte layout and writes the file in
//! one linear pass.

use std::borrow::Cow;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use byteorder::{ByteOrder, LittleEndian};
use log::{debug, warn};

use crate::dng::{DNG_VERSION_V1_0, DNG_VERSION_V1_4};
use crate::packed::{check_depth, pack_strip};
use crate::raster::{Raster, Samples};
use crate::tags::{CompressionMethod, DngTag, PhotometricInterpretation, SampleFormat, TiffCommonTag};
use crate::tiff::{Directory, LayoutPlan, TiffWriter};
use crate::{DngError, Result};

const SOFTWARE: &str = concat!("rawdng ", env!("CARGO_PKG_VERSION"));

/// Strip geometry is derived from the raster, caller values are ignored.
const RESERVED_TAGS: [u16; 3] = [
  TiffCommonTag::StripOffsets as u16,
  TiffCommonTag::RowsPerStrip as u16,
  TiffCommonTag::StripByteCounts as u16,
];

/// Hook to postprocess integer frames right before they are packed.
pub type FrameFilter = Box<dyn Fn(&mut Raster<u16>) + Send + Sync>;

pub struct DngEncoder {
  tags: Directory,
  frame_filter: Option<FrameFilter>,
}

impl Default for DngEncoder {
  fn default() -> Self {
    Self::new()
  }
}

impl DngEncoder {
  pub fn new() -> Self {
    Self {
      tags: Directory::new(),
      frame_filter: None,
    }
  }

  /// Set the caller tag directory used for all following conversions.
  pub fn set_tags(&mut self, tags: Directory) {
    self.tags = tags;
  }

  /// Install a filter applied to a copy of each integer frame before
  /// packing. Float frames bypass the filter.
  pub fn set_frame_filter<F>(&mut self, filter: F)
  where
    F: Fn(&mut Raster<u16>) + Send + Sync + 'static,
  {
    self.frame_filter = Some(Box::new(filter));
  }

  /// Encode the samples as a DNG into any byte sink.
  pub fn convert<'a, S, W>(&self, samples: S, writer: W) -> Result<()>
  where
    S: Into<Samples<'a>>,
    W: Write,
  {
    let samples = samples.into();
    let bits = self.validate(&samples)?;
    let strip = self.make_strip(&samples, bits)?;
    let ifd = self.assemble_ifd(&samples, strip.len());

    let mut plan = LayoutPlan::new(&ifd, strip.len())?;
    let strip_offset = plan.strip_offset;
    plan.patch_inline(TiffCommonTag::StripOffsets as u16, strip_offset)?;

    let mut tiff = TiffWriter::new(writer);
    tiff.write_plan(&plan)?;
    tiff.write_bytes(&strip)?;
    debug!(
      "encoded {}x{} raster at {} bits: {} entries, strip at {}, {} bytes total",
      samples.width(),
      samples.height(),
      bits,
      plan.entries.len(),
      plan.strip_offset,
      plan.total_len
    );
    Ok(())
  }

  /// Encode into a fresh buffer.
  pub fn convert_to_vec<'a, S: Into<Samples<'a>>>(&self, samples: S) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    self.convert(samples, &mut out)?;
    Ok(out)
  }

  /// Encode into a file, appending a `.dng` suffix when missing.
  ///
  /// Returns the path actually written.
  pub fn convert_to_path<'a, S, P>(&self, samples: S, path: P) -> Result<PathBuf>
  where
    S: Into<Samples<'a>>,
    P: AsRef<Path>,
  {
    let path = path.as_ref();
    let path = if path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("dng")) {
      path.to_path_buf()
    } else {
      let mut with_suffix = path.as_os_str().to_os_string();
      with_suffix.push(".dng");
      PathBuf::from(with_suffix)
    };
    let file = File::create(&path)?;
    let mut writer = BufWriter::new(file);
    self.convert(samples, &mut writer)?;
    writer.flush()?;
    Ok(path)
  }

  /// Check the caller directory against the raster.
  fn validate(&self, samples: &Samples<'_>) -> Result<u16> {
    let width = self.declared(TiffCommonTag::ImageWidth)?;
    let height = self.declared(TiffCommonTag::ImageLength)?;
    let bits = self.declared(TiffCommonTag::BitsPerSample)? as u16;

    if width as usize != samples.width() || height as usize != samples.height() {
      return Err(DngError::Validation(format!(
        "declared size {}x{} does not match the {}x{} raster",
        width,
        height,
        samples.width(),
        samples.height()
      )));
    }
    match samples {
      Samples::Integer(_) => {
        if !matches!(bits, 8 | 10 | 12 | 14 | 16) {
          return Err(DngError::Validation(format!("{} bits per sample is not supported for integer data", bits)));
        }
      }
      Samples::Float(_) => {
        if bits != 32 {
          return Err(DngError::Validation(format!("float data requires 32 bits per sample, got {}", bits)));
        }
      }
    }
    Ok(bits)
  }

  fn declared(&self, tag: TiffCommonTag) -> Result<u32> {
    self
      .tags
      .get_tag(tag)
      .ok_or_else(|| DngError::Validation(format!("required tag {:?} is not set", tag)))?
      .get_u32(0)?
      .ok_or_else(|| DngError::Validation(format!("tag {:?} holds no value", tag)))
  }

  /// Produce the strip bytes for the requested depth.
  fn make_strip(&self, samples: &Samples<'_>, bits: u16) -> Result<Vec<u8>> {
    match samples {
      Samples::Integer(raster) => {
        let raster: Cow<'_, Raster<u16>> = match &self.frame_filter {
          Some(filter) => {
            let mut frame = (*raster).clone();
            filter(&mut frame);
            Cow::Owned(frame)
          }
          None => Cow::Borrowed(*raster),
        };
        match bits {
          8 => {
            check_depth(raster.pixels(), 8)?;
            Ok(raster.pixels().iter().map(|&v| v as u8).collect())
          }
          10 | 12 | 14 => pack_strip(&raster, bits),
          16 => {
            let mut out = vec![0u8; raster.pixels().len() * 2];
            LittleEndian::write_u16_into(raster.pixels(), &mut out);
            Ok(out)
          }
          _ => Err(DngError::Validation(format!("{} bits per sample is not supported for integer data", bits))),
        }
      }
      Samples::Float(raster) => {
        let mut out = vec![0u8; raster.pixels().len() * 4];
        LittleEndian::write_f32_into(raster.pixels(), &mut out);
        Ok(out)
      }
    }
  }

  /// Merge baseline tags, caller tags and the computed strip geometry.
  fn assemble_ifd(&self, samples: &Samples<'_>, strip_len: usize) -> Directory {
    let mut ifd = Directory::new();
    ifd.add_tag(TiffCommonTag::NewSubFileType, 0_u32);
    ifd.add_tag(TiffCommonTag::Compression, CompressionMethod::Uncompressed);
    ifd.add_tag(TiffCommonTag::PhotometricInt, PhotometricInterpretation::LinearRaw);
    ifd.add_tag(TiffCommonTag::Software, SOFTWARE);
    ifd.add_tag(DngTag::DNGVersion, DNG_VERSION_V1_4);
    match samples {
      Samples::Integer(_) => {
        ifd.add_tag(TiffCommonTag::SampleFormat, SampleFormat::Uint);
        ifd.add_tag(DngTag::DNGBackwardVersion, DNG_VERSION_V1_0);
      }
      Samples::Float(_) => {
        ifd.add_tag(TiffCommonTag::SampleFormat, SampleFormat::Ieeefp);
        ifd.add_tag(DngTag::DNGBackwardVersion, DNG_VERSION_V1_4);
      }
    }
    // caller tags override the defaults
    for entry in self.tags.iter() {
      if RESERVED_TAGS.contains(&entry.tag) {
        warn!("tag {:#06x} is managed by the encoder, ignoring the caller value", entry.tag);
        continue;
      }
      ifd.add_untyped_tag(entry.tag, entry.value.clone());
    }
    // strip geometry is always derived from the raster
    ifd.add_tag(TiffCommonTag::RowsPerStrip, samples.height() as u32);
    ifd.add_tag(TiffCommonTag::StripByteCounts, strip_len as u32);
    // patched to the real offset once the layout exists
    ifd.add_tag(TiffCommonTag::StripOffsets, 0_u32);
    ifd
  }
}
