// SPDX-License-Identifier: MIT
// Copyright 2021 Daniel Vogelbacher <daniel@chaospixel.com>

use std::io::{self, Write};

use byteorder::{LittleEndian, WriteBytesExt};

use super::layout::Placement;
use super::{LayoutPlan, IFD_OFFSET, TIFF_MAGIC};

/// Forward-only byte sink with a tracked offset.
///
/// Works on any `Write`, no seeking needed. All multi-byte values go out
/// little-endian to match the "II" byte order mark, independent of the
/// host byte order.
pub struct TiffWriter<W> {
  writer: W,
  offset: u64,
}

impl<W: Write> TiffWriter<W> {
  pub fn new(writer: W) -> Self {
    Self { writer, offset: 0 }
  }

  pub fn offset(&self) -> u64 {
    self.offset
  }

  pub fn into_inner(self) -> W {
    self.writer
  }

  pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), io::Error> {
    self.writer.write_all(bytes)?;
    self.offset += bytes.len() as u64;
    Ok(())
  }

  pub fn write_u8(&mut self, n: u8) -> Result<(), io::Error> {
    self.writer.write_u8(n)?;
    self.offset += 1;
    Ok(())
  }

  pub fn write_u16(&mut self, n: u16) -> Result<(), io::Error> {
    self.writer.write_u16::<LittleEndian>(n)?;
    self.offset += 2;
    Ok(())
  }

  pub fn write_u32(&mut self, n: u32) -> Result<(), io::Error> {
    self.writer.write_u32::<LittleEndian>(n)?;
    self.offset += 4;
    Ok(())
  }

  pub fn pad_even(&mut self) -> Result<(), io::Error> {
    if self.offset % 2 != 0 {
      self.writer.write_all(&[0])?;
      self.offset += 1;
    }
    Ok(())
  }

  /// TIFF header: "II" byte order mark, magic 42 and first IFD offset.
  pub fn write_header(&mut self) -> Result<(), io::Error> {
    self.write_bytes(b"II")?;
    self.write_u16(TIFF_MAGIC)?;
    self.write_u32(IFD_OFFSET)?;
    Ok(())
  }

  /// Emit header, IFD and overflow region of a resolved plan.
  ///
  /// On return the stream position equals `plan.strip_offset`, the strip
  /// bytes are appended directly afterwards.
  pub fn write_plan(&mut self, plan: &LayoutPlan) -> crate::Result<()> {
    self.write_header()?;
    debug_assert_eq!(self.offset, plan.ifd_offset as u64);

    self.write_u16(plan.entries.len() as u16)?;
    for entry in &plan.entries {
      self.write_u16(entry.tag)?;
      self.write_u16(entry.value_type)?;
      self.write_u32(entry.count)?;
      match &entry.placement {
        Placement::Inline(cell) => self.write_bytes(cell)?,
        Placement::Overflow { offset, .. } => self.write_u32(*offset)?,
      }
    }
    // no further IFDs
    self.write_u32(0)?;

    for entry in &plan.entries {
      if let Placement::Overflow { offset, data } = &entry.placement {
        self.pad_even()?;
        debug_assert_eq!(self.offset, *offset as u64);
        self.write_bytes(data)?;
      }
    }
    self.pad_even()?;
    debug_assert_eq!(self.offset, plan.strip_offset as u64);
    Ok(())
  }
}
