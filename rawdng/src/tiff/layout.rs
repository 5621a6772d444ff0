// SPDX-License-Identifier: MIT
// Copyright 2021 Daniel Vogelbacher <daniel@chaospixel.com>

//! Precomputed byte layout of the output file.
//!
//! All offsets are resolved before a single byte is written. The writer
//! can then emit header, IFD, overflow values and strip in one strictly
//! linear pass without ever seeking back.

use log::debug;

use crate::{DngError, Result};

use super::{Directory, IFD_OFFSET};

/// Byte placement of one entry value.
#[derive(Debug, Clone, PartialEq)]
pub enum Placement {
  /// Value fits into the 4 byte entry cell, left-justified and zero-padded
  Inline([u8; 4]),
  /// Value lives in the overflow region, the entry cell holds its offset
  Overflow { offset: u32, data: Vec<u8> },
}

/// Planned IFD entry with its value already serialized.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryPlan {
  pub tag: u16,
  pub value_type: u16,
  pub count: u32,
  pub placement: Placement,
}

/// Resolved layout: IFD position, planned entries, overflow and strip.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutPlan {
  pub ifd_offset: u32,
  pub entries: Vec<EntryPlan>,
  pub strip_offset: u32,
  pub strip_len: u32,
  pub total_len: u32,
}

impl LayoutPlan {
  /// Plan the layout for a directory followed by a strip of `strip_len` bytes.
  ///
  /// Entries come out of the directory sorted ascending by tag id. Overflow
  /// values and the strip start on even offsets, odd gaps are padded with a
  /// single zero byte.
  pub fn new(ifd: &Directory, strip_len: usize) -> Result<Self> {
    if ifd.is_empty() {
      return Err(DngError::Layout("IFD is empty, not allowed by TIFF specification".to_string()));
    }
    // 2 byte entry count, 12 bytes per entry, 4 byte next-IFD offset
    let ifd_len = 2 + 12 * ifd.entry_count() as usize + 4;
    let mut cursor = IFD_OFFSET as usize + ifd_len;
    let mut entries = Vec::with_capacity(ifd.entry_count() as usize);

    for entry in ifd.iter() {
      let data = entry.value.encode()?;
      let placement = if data.len() <= 4 {
        let mut cell = [0u8; 4];
        cell[..data.len()].copy_from_slice(&data);
        Placement::Inline(cell)
      } else {
        cursor = pad_even(cursor);
        let offset = as_offset(cursor)?;
        cursor += data.len();
        Placement::Overflow { offset, data }
      };
      match &placement {
        Placement::Inline(_) => debug!("Tag: {:#x}, Typ: {}, count: {}, embedded", entry.tag, entry.type_name(), entry.count()),
        Placement::Overflow { offset, .. } => debug!("Tag: {:#x}, Typ: {}, count: {}, offset: {}", entry.tag, entry.type_name(), entry.count(), offset),
      }
      entries.push(EntryPlan {
        tag: entry.tag,
        value_type: entry.value_type(),
        count: entry.count(),
        placement,
      });
    }

    let strip_offset = pad_even(cursor);
    let total_len = as_offset(strip_offset + strip_len)?;
    debug!("layout: {} entries, strip at {}, {} bytes total", entries.len(), strip_offset, total_len);

    Ok(Self {
      ifd_offset: IFD_OFFSET,
      entries,
      strip_offset: strip_offset as u32,
      strip_len: strip_len as u32,
      total_len,
    })
  }

  /// Replace the embedded cell of a planned entry.
  ///
  /// Values which encode a position inside the plan, like StripOffsets,
  /// are inserted as placeholders and patched here once the plan exists.
  pub fn patch_inline(&mut self, tag: u16, value: u32) -> Result<()> {
    let entry = self
      .entries
      .iter_mut()
      .find(|e| e.tag == tag)
      .ok_or_else(|| DngError::Layout(format!("no entry for tag {:#06x} to patch", tag)))?;
    match &mut entry.placement {
      Placement::Inline(cell) => {
        *cell = value.to_le_bytes();
        Ok(())
      }
      Placement::Overflow { .. } => Err(DngError::Layout(format!("tag {:#06x} is not embedded, can not patch", tag))),
    }
  }
}

fn pad_even(offset: usize) -> usize {
  offset + (offset & 1)
}

fn as_offset(pos: usize) -> Result<u32> {
  u32::try_from(pos).map_err(|_| DngError::Layout(format!("file position {} exceeds the 32 bit TIFF offset range", pos)))
}
