// SPDX-License-Identifier: MIT
// Copyright 2021 Daniel Vogelbacher <daniel@chaospixel.com>

pub mod directory;
pub mod entry;
pub mod layout;
pub mod value;
pub mod writer;

pub use directory::Directory;
pub use entry::Entry;
pub use layout::LayoutPlan;
pub use value::{Rational, SRational, Value};
pub use writer::TiffWriter;

const TIFF_MAGIC: u16 = 42;

/// The first and only IFD starts right after the 8 byte header.
const IFD_OFFSET: u32 = 8;
