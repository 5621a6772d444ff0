// SPDX-License-Identifier: MIT
// Copyright 2021 Daniel Vogelbacher <daniel@chaospixel.com>

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::tags::TiffTag;

use super::{Entry, Value};

/// Collection of IFD entries, keyed by tag id.
///
/// We use a BTreeMap to make sure tags are written in correct order,
/// ascending by tag id as the TIFF specification requires. Adding a tag
/// twice replaces the previous value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Directory {
  entries: BTreeMap<u16, Entry>,
}

impl Directory {
  pub fn new() -> Self {
    Self { entries: BTreeMap::new() }
  }

  pub fn entry_count(&self) -> u16 {
    self.entries.len() as u16
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  pub fn add_tag<T: TiffTag, V: Into<Value>>(&mut self, tag: T, value: V) {
    let tag: u16 = tag.into();
    self.entries.insert(tag, Entry::new(tag, value.into()));
  }

  /// Add a tag the catalog does not know about, by plain numeric id.
  pub fn add_untyped_tag<V: Into<Value>>(&mut self, tag: u16, value: V) {
    self.entries.insert(tag, Entry::new(tag, value.into()));
  }

  pub fn add_tag_undefined<T: TiffTag>(&mut self, tag: T, data: Vec<u8>) {
    let tag: u16 = tag.into();
    self.entries.insert(tag, Entry::new(tag, Value::Undefined(data)));
  }

  pub fn add_value<T: TiffTag>(&mut self, tag: T, value: Value) {
    let tag: u16 = tag.into();
    self.entries.insert(tag, Entry::new(tag, value));
  }

  pub fn get_tag<T: TiffTag>(&self, tag: T) -> Option<&Entry> {
    self.entries.get(&tag.into())
  }

  pub fn get_untyped_tag(&self, tag: u16) -> Option<&Entry> {
    self.entries.get(&tag)
  }

  pub fn contains_tag<T: TiffTag>(&self, tag: T) -> bool {
    self.entries.contains_key(&tag.into())
  }

  /// Entries in ascending tag order.
  pub fn iter(&self) -> impl Iterator<Item = &Entry> {
    self.entries.values()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::tags::TiffCommonTag;

  #[test]
  fn entries_iterate_sorted_by_tag_id() {
    let mut dir = Directory::new();
    dir.add_tag(TiffCommonTag::Software, "unit");
    dir.add_tag(TiffCommonTag::ImageWidth, 1024_u32);
    dir.add_untyped_tag(0xc000, 1_u16);
    dir.add_tag(TiffCommonTag::NewSubFileType, 0_u32);
    let ids: Vec<u16> = dir.iter().map(|e| e.tag).collect();
    assert_eq!(ids, vec![254, 256, 305, 0xc000]);
  }

  #[test]
  fn adding_a_tag_twice_replaces_it() {
    let mut dir = Directory::new();
    dir.add_tag(TiffCommonTag::ImageWidth, 100_u32);
    dir.add_tag(TiffCommonTag::ImageWidth, 200_u32);
    assert_eq!(dir.entry_count(), 1);
    let entry = dir.get_tag(TiffCommonTag::ImageWidth).unwrap();
    assert_eq!(entry.value.get_u32(0).unwrap(), Some(200));
  }

  #[test]
  fn typed_and_untyped_access_agree() {
    let mut dir = Directory::new();
    dir.add_tag(TiffCommonTag::BitsPerSample, 12_u16);
    assert_eq!(dir.get_tag(TiffCommonTag::BitsPerSample), dir.get_untyped_tag(258));
    assert!(dir.contains_tag(TiffCommonTag::BitsPerSample));
    assert!(dir.get_untyped_tag(0xbeef).is_none());
  }
}
