// SPDX-License-Identifier: LGPL-2.1
// Copyright 2021 Daniel Vogelbacher <daniel@chaospixel.com>

//! Converter turning a headerless sample dump into a DNG file.

use clap::ArgMatches;
use clap::builder::{NonEmptyStringValueParser, TypedValueParser};

use log::debug;
use rawdng::tags::{DngTag, Illuminant, PhotometricInterpretation, TiffCommonTag};
use rawdng::{Directory, DngEncoder, Raster, Rational, SRational, Value};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::{AppError, PKG_NAME, PKG_VERSION};

/// Entry point for the conversion.
pub fn convert(options: &ArgMatches) -> crate::Result<()> {
  let width = *options.get_one::<u32>("width").expect("width is required") as usize;
  let height = *options.get_one::<u32>("height").expect("height is required") as usize;
  let bits = *options.get_one::<u16>("bits").expect("bits has a default value");
  let output: &PathBuf = options.get_one("OUTPUT").expect("Output path is required");

  if !matches!(bits, 8 | 10 | 12 | 14 | 16 | 32) {
    return Err(AppError::InvalidCmdSwitch(format!("{} bits per sample is not supported", bits)));
  }

  let dest_path = dng_suffixed(output);
  if dest_path.exists() && !options.get_flag("override") {
    return Err(AppError::AlreadyExists(dest_path));
  }

  if options.get_flag("verbose") {
    println!("Frame: {}x{} pixels at {} bits per sample", width, height, bits);
  }

  let tags = assemble_tags(options, width, height, bits)?;
  if options.get_flag("dump_tags") {
    println!("{}", serde_json::to_string_pretty(&tags)?);
  }

  let mut encoder = DngEncoder::new();
  encoder.set_tags(tags);

  let result = if bits == 32 {
    encoder.convert_to_path(&load_f32_frame(options, width, height)?, &dest_path)
  } else {
    encoder.convert_to_path(&load_u16_frame(options, width, height, bits)?, &dest_path)
  };

  match result {
    Ok(written) => {
      println!("File saved to: {}", written.display());
      Ok(())
    }
    Err(err) => {
      if let Err(err) = fs::remove_file(&dest_path) {
        log::error!("Failed to delete DNG file after an encoder error: {:?}", err);
      }
      Err(err.into())
    }
  }
}

/// Mirror of the encoder suffix rule, so the existence check runs on
/// the path that actually gets written.
fn dng_suffixed(path: &Path) -> PathBuf {
  if path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("dng")) {
    path.to_path_buf()
  } else {
    let mut with_suffix = path.as_os_str().to_os_string();
    with_suffix.push(".dng");
    PathBuf::from(with_suffix)
  }
}

fn input_path(options: &ArgMatches) -> crate::Result<PathBuf> {
  let input: &PathBuf = options.get_one("input").expect("input is required without --pattern");
  if !input.exists() {
    return Err(AppError::NotFound(input.to_owned()));
  }
  Ok(input.to_owned())
}

/// Synthesize or load the integer frame.
fn load_u16_frame(options: &ArgMatches, width: usize, height: usize, bits: u16) -> crate::Result<Raster<u16>> {
  if options.get_flag("pattern") {
    debug!("Synthesizing a {} bit gradient pattern", bits);
    let limit = (1_u32 << bits) - 1;
    let data = (0..width * height).map(|i| (i as u64 % (limit as u64 + 1)) as u16).collect();
    return Ok(Raster::new(width, height, data)?);
  }
  let input = input_path(options)?;
  let buf = fs::read(&input)?;
  if buf.len() != width * height * 2 {
    return Err(AppError::InvalidFormat(format!(
      "{} holds {} bytes, but a {}x{} frame of 16 bit samples needs {}",
      input.display(),
      buf.len(),
      width,
      height,
      width * height * 2
    )));
  }
  let data = buf.chunks_exact(2).map(|bytes| u16::from_le_bytes([bytes[0], bytes[1]])).collect();
  Ok(Raster::new(width, height, data)?)
}

/// Synthesize or load the floating point frame.
fn load_f32_frame(options: &ArgMatches, width: usize, height: usize) -> crate::Result<Raster<f32>> {
  if options.get_flag("pattern") {
    debug!("Synthesizing a floating point gradient pattern");
    let data = (0..width * height).map(|i| (i % 1024) as f32 / 1023.0).collect();
    return Ok(Raster::new(width, height, data)?);
  }
  let input = input_path(options)?;
  let buf = fs::read(&input)?;
  if buf.len() != width * height * 4 {
    return Err(AppError::InvalidFormat(format!(
      "{} holds {} bytes, but a {}x{} frame of 32 bit float samples needs {}",
      input.display(),
      buf.len(),
      width,
      height,
      width * height * 4
    )));
  }
  let data = buf
    .chunks_exact(4)
    .map(|bytes| f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    .collect();
  Ok(Raster::new(width, height, data)?)
}

/// Build the caller tag directory from the command line switches.
fn assemble_tags(options: &ArgMatches, width: usize, height: usize, bits: u16) -> crate::Result<Directory> {
  let mut tags = Directory::new();
  tags.add_tag(TiffCommonTag::ImageWidth, width as u32);
  tags.add_tag(TiffCommonTag::ImageLength, height as u32);
  tags.add_tag(TiffCommonTag::BitsPerSample, bits);
  tags.add_tag(TiffCommonTag::Software, format!("{} {}", PKG_NAME, PKG_VERSION));
  tags.add_tag(TiffCommonTag::DateTime, chrono::Local::now().format("%Y:%m:%d %H:%M:%S").to_string());

  if let Some(artist) = options.get_one::<String>("artist") {
    tags.add_tag(TiffCommonTag::Artist, artist);
  }

  if let Some(make) = options.get_one::<String>("make") {
    tags.add_tag(TiffCommonTag::Make, make);
  }

  if let Some(model) = options.get_one::<String>("model") {
    tags.add_tag(TiffCommonTag::Model, model);
    let make = options.get_one::<String>("make").map(String::as_str).unwrap_or_default();
    tags.add_tag(DngTag::UniqueCameraModel, format!("{} {}", make, model).trim());
  }

  if let Some(cfa) = options.get_one::<CfaLayout>("cfa") {
    tags.add_tag(TiffCommonTag::PhotometricInt, PhotometricInterpretation::Cfa);
    tags.add_tag(TiffCommonTag::CFARepeatPatternDim, [2_u16, 2]);
    tags.add_tag(TiffCommonTag::CFAPattern, cfa.as_pattern());
  }

  if let Some(black_level) = options.get_one::<u32>("black_level") {
    tags.add_tag(DngTag::BlackLevel, *black_level);
  }

  if let Some(white_level) = options.get_one::<u32>("white_level") {
    tags.add_tag(DngTag::WhiteLevel, *white_level);
  }

  if let Some(wb) = options.get_one::<WhiteBalanceInput>("wb") {
    tags.add_tag(DngTag::AsShotNeutral, wb.as_tiff_value());
  }

  if let Some(matrix) = options.get_one::<ColorMatrixArg>("matrix1") {
    let illuminant = options
      .get_one::<CalibrationIlluminantArg>("illuminant1")
      .expect("illuminant1 is required when matrix1 is set");
    tags.add_tag(DngTag::ColorMatrix1, matrix.as_tiff_value());
    tags.add_tag(DngTag::CalibrationIlluminant1, illuminant.as_tiff_value());
  }

  debug!("Caller directory holds {} tags", tags.entry_count());
  Ok(tags)
}

#[derive(Clone, Debug)]
pub struct WhiteBalanceInput {
  values: Vec<f32>,
}

impl FromStr for WhiteBalanceInput {
  type Err = String;

  fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
    let values = s
      .split(',')
      .map(str::trim)
      .map(str::parse::<f32>)
      .collect::<std::result::Result<Vec<_>, _>>()
      .map_err(|err| err.to_string())?;
    if values.len() != 3 {
      return Err(format!("expected three comma separated values, got {}", values.len()));
    }
    Ok(Self { values })
  }
}

impl WhiteBalanceInput {
  fn as_tiff_value(&self) -> Value {
    Value::Rational(self.values.iter().map(|x| Rational::new((x * 10_000.0) as u32, 10_000)).collect())
  }
}

#[derive(Clone)]
pub struct ColorMatrixArg {
  matrix: Vec<f32>,
}

impl ColorMatrixArg {
  fn as_tiff_value(&self) -> Value {
    Value::SRational(self.matrix.iter().map(|x| SRational::new((x * 10_000.0) as i32, 10_000)).collect())
  }
}

#[derive(Clone)]
pub struct ColorMatrixArgParser;

impl clap::builder::TypedValueParser for ColorMatrixArgParser {
  type Value = ColorMatrixArg;

  fn parse_ref(&self, cmd: &clap::Command, arg: Option<&clap::Arg>, value: &std::ffi::OsStr) -> std::result::Result<Self::Value, clap::Error> {
    let inner = NonEmptyStringValueParser::new();
    let val = inner.parse_ref(cmd, arg, value)?;

    match val.split(',').map(str::trim).map(str::parse::<f32>).collect::<std::result::Result<Vec<_>, _>>() {
      Ok(matrix) if matrix.len() == 9 => Ok(ColorMatrixArg { matrix }),
      Ok(matrix) => {
        let fail = format!("expected a 3x3 matrix with nine values, got {}", matrix.len());
        let mut err = clap::Error::new(clap::error::ErrorKind::ValueValidation).with_cmd(cmd);
        if let Some(arg) = arg {
          err.insert(clap::error::ContextKind::InvalidArg, clap::error::ContextValue::String(arg.to_string()));
        }
        err.insert(clap::error::ContextKind::InvalidValue, clap::error::ContextValue::String(val));
        err.insert(clap::error::ContextKind::Suggested, clap::error::ContextValue::String(fail));
        Err(err)
      }
      Err(fail) => {
        let mut err = clap::Error::new(clap::error::ErrorKind::ValueValidation).with_cmd(cmd);
        if let Some(arg) = arg {
          err.insert(clap::error::ContextKind::InvalidArg, clap::error::ContextValue::String(arg.to_string()));
        }
        err.insert(clap::error::ContextKind::InvalidValue, clap::error::ContextValue::String(val));
        err.insert(clap::error::ContextKind::Suggested, clap::error::ContextValue::String(fail.to_string()));
        Err(err)
      }
    }
  }
}

#[derive(Clone, Debug)]
pub struct CalibrationIlluminantArg(Illuminant);

impl CalibrationIlluminantArg {
  fn as_tiff_value(&self) -> Value {
    Value::from(self.0)
  }
}

#[derive(Clone)]
pub struct CalibrationIlluminantArgParser;

impl clap::builder::TypedValueParser for CalibrationIlluminantArgParser {
  type Value = CalibrationIlluminantArg;

  fn parse_ref(&self, cmd: &clap::Command, arg: Option<&clap::Arg>, value: &std::ffi::OsStr) -> std::result::Result<Self::Value, clap::Error> {
    let inner = NonEmptyStringValueParser::new();
    let val = inner.parse_ref(cmd, arg, value)?;

    match Illuminant::new_from_str(&val) {
      Ok(illu) => Ok(CalibrationIlluminantArg(illu)),
      Err(fail) => {
        let mut err = clap::Error::new(clap::error::ErrorKind::ValueValidation).with_cmd(cmd);
        if let Some(arg) = arg {
          err.insert(clap::error::ContextKind::InvalidArg, clap::error::ContextValue::String(arg.to_string()));
        }
        err.insert(clap::error::ContextKind::InvalidValue, clap::error::ContextValue::String(val));
        err.insert(clap::error::ContextKind::Suggested, clap::error::ContextValue::String(fail));
        Err(err)
      }
    }
  }

  fn possible_values(&self) -> Option<Box<dyn Iterator<Item = clap::builder::PossibleValue> + '_>> {
    Some(Box::new(
      ["Unknown", "A", "B", "C", "D50", "D55", "D65", "D75"]
        .into_iter()
        .map(clap::builder::PossibleValue::from),
    ))
  }
}

#[derive(Clone, Debug)]
pub enum CfaLayout {
  Rggb,
  Bggr,
  Grbg,
  Gbrg,
}

impl CfaLayout {
  /// 2x2 pattern as CFAPattern bytes (0 = red, 1 = green, 2 = blue).
  fn as_pattern(&self) -> [u8; 4] {
    match self {
      Self::Rggb => [0, 1, 1, 2],
      Self::Bggr => [2, 1, 1, 0],
      Self::Grbg => [1, 0, 2, 1],
      Self::Gbrg => [1, 2, 0, 1],
    }
  }
}

impl clap::ValueEnum for CfaLayout {
  fn value_variants<'a>() -> &'a [Self] {
    &[Self::Rggb, Self::Bggr, Self::Grbg, Self::Gbrg]
  }

  fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
    Some(match self {
      Self::Rggb => clap::builder::PossibleValue::new("RGGB"),
      Self::Bggr => clap::builder::PossibleValue::new("BGGR"),
      Self::Grbg => clap::builder::PossibleValue::new("GRBG"),
      Self::Gbrg => clap::builder::PossibleValue::new("GBRG"),
    })
  }
}
