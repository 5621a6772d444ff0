// SPDX-License-Identifier: LGPL-2.1
// Copyright 2021 Daniel Vogelbacher <daniel@chaospixel.com>

//! Tag catalog: identifiers and well-known values for TIFF baseline and DNG tags.
//!
//! The encoder itself operates on plain `u16` identifiers; the enums here are
//! a convenience layer so callers never have to spell out numeric ids.

use std::collections::HashMap;

use lazy_static::lazy_static;

use crate::tiff::Value;

/// Marker for enums which are usable as tag identifiers in a directory.
pub trait TiffTag: Into<u16> + Copy + Clone + std::fmt::Debug {}

macro_rules! tiff_tag_enum {
  ($e:ty) => {
    impl TiffTag for $e {}

    impl From<$e> for u16 {
      fn from(v: $e) -> Self {
        v as u16
      }
    }

    impl TryFrom<u16> for $e {
      type Error = String;

      fn try_from(value: u16) -> std::result::Result<Self, Self::Error> {
        Self::n(value).ok_or(format!("Unknown tag id: {}", value))
      }
    }
  };
}

tiff_tag_enum!(TiffCommonTag);
tiff_tag_enum!(DngTag);

/// Baseline TIFF tags used in DNG files
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, enumn::N)]
#[repr(u16)]
pub enum TiffCommonTag {
  NewSubFileType = 254,
  ImageWidth = 256,
  ImageLength = 257,
  BitsPerSample = 258,
  Compression = 259,
  PhotometricInt = 262,
  Make = 271,
  Model = 272,
  StripOffsets = 273,
  Orientation = 274,
  SamplesPerPixel = 277,
  RowsPerStrip = 278,
  StripByteCounts = 279,
  XResolution = 282,
  YResolution = 283,
  ResolutionUnit = 296,
  Software = 305,
  DateTime = 306,
  Artist = 315,
  SampleFormat = 339,
  CFARepeatPatternDim = 33421,
  CFAPattern = 33422,
}

/// DNG specific tags
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, enumn::N)]
#[repr(u16)]
pub enum DngTag {
  DNGVersion = 50706,
  DNGBackwardVersion = 50707,
  UniqueCameraModel = 50708,
  BlackLevelRepeatDim = 50713,
  BlackLevel = 50714,
  WhiteLevel = 50717,
  ColorMatrix1 = 50721,
  ColorMatrix2 = 50722,
  AnalogBalance = 50727,
  AsShotNeutral = 50728,
  BaselineExposure = 50730,
  CalibrationIlluminant1 = 50778,
  CalibrationIlluminant2 = 50779,
  ActiveArea = 50829,
}

/// TIFF compression schemes
#[derive(Debug, Copy, Clone, PartialEq, Eq, enumn::N)]
#[repr(u16)]
pub enum CompressionMethod {
  Uncompressed = 1,
  LosslessJpeg = 7,
  Deflate = 8,
}

impl From<CompressionMethod> for Value {
  fn from(value: CompressionMethod) -> Self {
    Value::Short(vec![value as u16])
  }
}

/// Color space interpretation of the strip data
#[derive(Debug, Copy, Clone, PartialEq, Eq, enumn::N)]
#[repr(u16)]
pub enum PhotometricInterpretation {
  BlackIsZero = 1,
  Rgb = 2,
  YCbCr = 6,
  Cfa = 32803,
  LinearRaw = 34892,
}

impl From<PhotometricInterpretation> for Value {
  fn from(value: PhotometricInterpretation) -> Self {
    Value::Short(vec![value as u16])
  }
}

/// Numeric interpretation of each sample
#[derive(Debug, Copy, Clone, PartialEq, Eq, enumn::N)]
#[repr(u16)]
pub enum SampleFormat {
  Uint = 1,
  Int = 2,
  Ieeefp = 3,
}

impl From<SampleFormat> for Value {
  fn from(value: SampleFormat) -> Self {
    Value::Short(vec![value as u16])
  }
}

/// Light sources for CalibrationIlluminant tags (EXIF LightSource values)
#[derive(Debug, Copy, Clone, PartialEq, Eq, enumn::N)]
#[repr(u16)]
pub enum Illuminant {
  Unknown = 0,
  Daylight = 1,
  Fluorescent = 2,
  Tungsten = 3,
  Flash = 4,
  FineWeather = 9,
  CloudyWeather = 10,
  Shade = 11,
  DaylightFluorescent = 12,
  DayWhiteFluorescent = 13,
  CoolWhiteFluorescent = 14,
  WhiteFluorescent = 15,
  StandardLightA = 17,
  StandardLightB = 18,
  StandardLightC = 19,
  D55 = 20,
  D65 = 21,
  D75 = 22,
  D50 = 23,
  IsoStudioTungsten = 24,
}

impl Illuminant {
  /// Parse an illuminant from its EXIF LightSource name.
  pub fn new_from_str(s: &str) -> std::result::Result<Self, String> {
    match s {
      "Unknown" => Ok(Self::Unknown),
      "Daylight" => Ok(Self::Daylight),
      "Fluorescent" => Ok(Self::Fluorescent),
      "Tungsten" => Ok(Self::Tungsten),
      "Flash" => Ok(Self::Flash),
      "FineWeather" => Ok(Self::FineWeather),
      "CloudyWeather" => Ok(Self::CloudyWeather),
      "Shade" => Ok(Self::Shade),
      "DaylightFluorescent" => Ok(Self::DaylightFluorescent),
      "DayWhiteFluorescent" => Ok(Self::DayWhiteFluorescent),
      "CoolWhiteFluorescent" => Ok(Self::CoolWhiteFluorescent),
      "WhiteFluorescent" => Ok(Self::WhiteFluorescent),
      "A" => Ok(Self::StandardLightA),
      "B" => Ok(Self::StandardLightB),
      "C" => Ok(Self::StandardLightC),
      "D55" => Ok(Self::D55),
      "D65" => Ok(Self::D65),
      "D75" => Ok(Self::D75),
      "D50" => Ok(Self::D50),
      "IsoStudioTungsten" => Ok(Self::IsoStudioTungsten),
      _ => Err(format!("Unknown illuminant name: '{}'", s)),
    }
  }
}

impl From<Illuminant> for Value {
  fn from(value: Illuminant) -> Self {
    Value::Short(vec![value as u16])
  }
}

/// Expected value count for a cataloged tag
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TagCount {
  Fixed(u32),
  Variable,
}

/// Catalog entry describing name, canonical TIFF type and expected count of a tag
#[derive(Debug, Copy, Clone)]
pub struct TagInfo {
  pub name: &'static str,
  pub value_type: u16,
  pub count: TagCount,
}

const BYTE: u16 = 1;
const ASCII: u16 = 2;
const SHORT: u16 = 3;
const LONG: u16 = 4;
const RATIONAL: u16 = 5;
const SRATIONAL: u16 = 10;

lazy_static! {
  static ref TAG_CATALOG: HashMap<u16, TagInfo> = {
    use TagCount::*;
    fn info(name: &'static str, value_type: u16, count: TagCount) -> TagInfo {
      TagInfo { name, value_type, count }
    }
    [
      (TiffCommonTag::NewSubFileType as u16, info("NewSubfileType", LONG, Fixed(1))),
      (TiffCommonTag::ImageWidth as u16, info("ImageWidth", LONG, Fixed(1))),
      (TiffCommonTag::ImageLength as u16, info("ImageLength", LONG, Fixed(1))),
      (TiffCommonTag::BitsPerSample as u16, info("BitsPerSample", SHORT, Variable)),
      (TiffCommonTag::Compression as u16, info("Compression", SHORT, Fixed(1))),
      (TiffCommonTag::PhotometricInt as u16, info("PhotometricInterpretation", SHORT, Fixed(1))),
      (TiffCommonTag::Make as u16, info("Make", ASCII, Variable)),
      (TiffCommonTag::Model as u16, info("Model", ASCII, Variable)),
      (TiffCommonTag::StripOffsets as u16, info("StripOffsets", LONG, Variable)),
      (TiffCommonTag::Orientation as u16, info("Orientation", SHORT, Fixed(1))),
      (TiffCommonTag::SamplesPerPixel as u16, info("SamplesPerPixel", SHORT, Fixed(1))),
      (TiffCommonTag::RowsPerStrip as u16, info("RowsPerStrip", LONG, Fixed(1))),
      (TiffCommonTag::StripByteCounts as u16, info("StripByteCounts", LONG, Variable)),
      (TiffCommonTag::XResolution as u16, info("XResolution", RATIONAL, Fixed(1))),
      (TiffCommonTag::YResolution as u16, info("YResolution", RATIONAL, Fixed(1))),
      (TiffCommonTag::ResolutionUnit as u16, info("ResolutionUnit", SHORT, Fixed(1))),
      (TiffCommonTag::Software as u16, info("Software", ASCII, Variable)),
      (TiffCommonTag::DateTime as u16, info("DateTime", ASCII, Fixed(20))),
      (TiffCommonTag::Artist as u16, info("Artist", ASCII, Variable)),
      (TiffCommonTag::SampleFormat as u16, info("SampleFormat", SHORT, Variable)),
      (TiffCommonTag::CFARepeatPatternDim as u16, info("CFARepeatPatternDim", SHORT, Fixed(2))),
      (TiffCommonTag::CFAPattern as u16, info("CFAPattern", BYTE, Variable)),
      (DngTag::DNGVersion as u16, info("DNGVersion", BYTE, Fixed(4))),
      (DngTag::DNGBackwardVersion as u16, info("DNGBackwardVersion", BYTE, Fixed(4))),
      (DngTag::UniqueCameraModel as u16, info("UniqueCameraModel", ASCII, Variable)),
      (DngTag::BlackLevelRepeatDim as u16, info("BlackLevelRepeatDim", SHORT, Fixed(2))),
      (DngTag::BlackLevel as u16, info("BlackLevel", LONG, Variable)),
      (DngTag::WhiteLevel as u16, info("WhiteLevel", LONG, Variable)),
      (DngTag::ColorMatrix1 as u16, info("ColorMatrix1", SRATIONAL, Variable)),
      (DngTag::ColorMatrix2 as u16, info("ColorMatrix2", SRATIONAL, Variable)),
      (DngTag::AnalogBalance as u16, info("AnalogBalance", RATIONAL, Variable)),
      (DngTag::AsShotNeutral as u16, info("AsShotNeutral", RATIONAL, Variable)),
      (DngTag::BaselineExposure as u16, info("BaselineExposure", SRATIONAL, Fixed(1))),
      (DngTag::CalibrationIlluminant1 as u16, info("CalibrationIlluminant1", SHORT, Fixed(1))),
      (DngTag::CalibrationIlluminant2 as u16, info("CalibrationIlluminant2", SHORT, Fixed(1))),
      (DngTag::ActiveArea as u16, info("ActiveArea", LONG, Fixed(4))),
    ]
    .into_iter()
    .collect()
  };
}

/// Lookup catalog information for a numeric tag id.
///
/// The encoder core never needs this, it works on resolved (id, value)
/// pairs. The catalog exists for callers which want to present or validate
/// directories.
pub fn tag_info(tag: u16) -> Option<&'static TagInfo> {
  TAG_CATALOG.get(&tag)
}
