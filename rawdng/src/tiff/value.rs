// SPDX-License-Identifier: MIT
// Copyright 2021 Daniel Vogelbacher <daniel@chaospixel.com>

use std::{ffi::CString, fmt::Display};

use byteorder::{LittleEndian, WriteBytesExt};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{DngError, Result};

/// Type to represent tiff values of type `RATIONAL`
#[derive(Clone, Debug, Default, PartialEq, Copy)]
pub struct Rational {
  pub n: u32,
  pub d: u32,
}

impl Rational {
  pub fn new(n: u32, d: u32) -> Self {
    Self { n, d }
  }

  pub fn new_f32(n: f32, d: u32) -> Self {
    Self { n: (n * d as f32) as u32, d }
  }
}

impl Display for Rational {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_fmt(format_args!("{}/{}", self.n, self.d))
  }
}

impl From<Rational> for f32 {
  fn from(v: Rational) -> Self {
    (v.n as f32) / (v.d as f32)
  }
}

impl Serialize for Rational {
  fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
  where
    S: Serializer,
  {
    let s = format!("{}/{}", self.n, self.d);
    serializer.serialize_str(&s)
  }
}

impl<'de> Deserialize<'de> for Rational {
  fn deserialize<D>(deserializer: D) -> std::result::Result<Rational, D::Error>
  where
    D: Deserializer<'de>,
  {
    use serde::de::Error;
    let s = String::deserialize(deserializer)?;
    let values: Vec<&str> = s.split("/").collect();
    if values.len() != 2 {
      Err(D::Error::custom(format!("Invalid rational value: {}", s)))
    } else {
      Ok(Rational::new(
        values[0].parse::<u32>().map_err(D::Error::custom)?,
        values[1].parse::<u32>().map_err(D::Error::custom)?,
      ))
    }
  }
}

/// Type to represent tiff values of type `SRATIONAL`
#[derive(Clone, Debug, Default, PartialEq, Copy)]
pub struct SRational {
  pub n: i32,
  pub d: i32,
}

impl SRational {
  pub fn new(n: i32, d: i32) -> Self {
    Self { n, d }
  }
}

impl Display for SRational {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_fmt(format_args!("{}/{}", self.n, self.d))
  }
}

impl From<SRational> for f32 {
  fn from(v: SRational) -> Self {
    (v.n as f32) / (v.d as f32)
  }
}

impl Serialize for SRational {
  fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
  where
    S: Serializer,
  {
    let s = format!("{}/{}", self.n, self.d);
    serializer.serialize_str(&s)
  }
}

impl<'de> Deserialize<'de> for SRational {
  fn deserialize<D>(deserializer: D) -> std::result::Result<SRational, D::Error>
  where
    D: Deserializer<'de>,
  {
    use serde::de::Error;
    let s = String::deserialize(deserializer)?;
    let values: Vec<&str> = s.split("/").collect();
    if values.len() != 2 {
      Err(D::Error::custom(format!("Invalid srational value: {}", s)))
    } else {
      Ok(SRational::new(
        values[0].parse::<i32>().map_err(D::Error::custom)?,
        values[1].parse::<i32>().map_err(D::Error::custom)?,
      ))
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
  /// 8-bit unsigned integer
  Byte(Vec<u8>),
  /// 8-bit byte that contains a 7-bit ASCII code; the last byte must be zero
  Ascii(TiffAscii),
  /// 16-bit unsigned integer
  Short(Vec<u16>),
  /// 32-bit unsigned integer
  Long(Vec<u32>),
  /// Fraction stored as two 32-bit unsigned integers
  Rational(Vec<Rational>),
  /// 8-bit signed integer
  SByte(Vec<i8>),
  /// 8-bit byte that may contain anything, depending on the field
  Undefined(Vec<u8>),
  /// 16-bit signed integer
  SShort(Vec<i16>),
  /// 32-bit signed integer
  SLong(Vec<i32>),
  /// Fraction stored as two 32-bit signed integers
  SRational(Vec<SRational>),
  /// 32-bit IEEE floating point
  Float(Vec<f32>),
  /// 64-bit IEEE floating point
  Double(Vec<f64>),
}

impl Value {
  pub fn count(&self) -> usize {
    match self {
      Self::Byte(v) => v.len(),
      Self::Ascii(v) => v.count(),
      Self::Short(v) => v.len(),
      Self::Long(v) => v.len(),
      Self::Rational(v) => v.len(),
      Self::SByte(v) => v.len(),
      Self::Undefined(v) => v.len(),
      Self::SShort(v) => v.len(),
      Self::SLong(v) => v.len(),
      Self::SRational(v) => v.len(),
      Self::Float(v) => v.len(),
      Self::Double(v) => v.len(),
    }
  }

  pub fn byte_size(&self) -> usize {
    match self {
      Self::Byte(v) => v.len() * std::mem::size_of::<u8>(),
      Self::Ascii(v) => v.count(),
      Self::Short(v) => v.len() * std::mem::size_of::<u16>(),
      Self::Long(v) => v.len() * std::mem::size_of::<u32>(),
      Self::Rational(v) => v.len() * 8,
      Self::SByte(v) => v.len() * std::mem::size_of::<i8>(),
      Self::Undefined(v) => v.len() * std::mem::size_of::<u8>(),
      Self::SShort(v) => v.len() * std::mem::size_of::<i16>(),
      Self::SLong(v) => v.len() * std::mem::size_of::<i32>(),
      Self::SRational(v) => v.len() * 8,
      Self::Float(v) => v.len() * std::mem::size_of::<f32>(),
      Self::Double(v) => v.len() * std::mem::size_of::<f64>(),
    }
  }

  /// Numeric TIFF field type of this value
  pub fn value_type(&self) -> u16 {
    match self {
      Self::Byte(_) => 1,
      Self::Ascii(_) => 2,
      Self::Short(_) => 3,
      Self::Long(_) => 4,
      Self::Rational(_) => 5,
      Self::SByte(_) => 6,
      Self::Undefined(_) => 7,
      Self::SShort(_) => 8,
      Self::SLong(_) => 9,
      Self::SRational(_) => 10,
      Self::Float(_) => 11,
      Self::Double(_) => 12,
    }
  }

  pub fn value_type_name(&self) -> String {
    match self {
      Self::Byte(_) => "BYTE".into(),
      Self::Ascii(_) => "ASCII".into(),
      Self::Short(_) => "SHORT".into(),
      Self::Long(_) => "LONG".into(),
      Self::Rational(_) => "RATIONAL".into(),
      Self::SByte(_) => "SBYTE".into(),
      Self::Undefined(_) => "UNDEF".into(),
      Self::SShort(_) => "SSHORT".into(),
      Self::SLong(_) => "SLONG".into(),
      Self::SRational(_) => "SRATIONAL".into(),
      Self::Float(_) => "FLOAT".into(),
      Self::Double(_) => "DOUBLE".into(),
    }
  }

  pub fn get_u16(&self, idx: usize) -> Result<Option<u16>> {
    match self {
      Value::Byte(v) => Ok(v.get(idx).map(ToOwned::to_owned).map(Into::into)),
      Value::Short(v) => Ok(v.get(idx).map(ToOwned::to_owned)),
      Value::Long(v) => Ok(v.get(idx).map(ToOwned::to_owned).map(|v| v as u16)),
      Value::SByte(v) => Ok(v.get(idx).map(ToOwned::to_owned).map(|v| v as u16)),
      Value::SShort(v) => Ok(v.get(idx).map(ToOwned::to_owned).map(|v| v as u16)),
      Value::SLong(v) => Ok(v.get(idx).map(ToOwned::to_owned).map(|v| v as u16)),
      _ => Err(DngError::Validation(format!("can not use get_u16() for tiff entry value {:?}", self))),
    }
  }

  pub fn get_u32(&self, idx: usize) -> Result<Option<u32>> {
    match self {
      Value::Byte(v) => Ok(v.get(idx).map(ToOwned::to_owned).map(Into::into)),
      Value::Short(v) => Ok(v.get(idx).map(ToOwned::to_owned).map(Into::into)),
      Value::Long(v) => Ok(v.get(idx).map(ToOwned::to_owned)),
      Value::SByte(v) => Ok(v.get(idx).map(ToOwned::to_owned).map(|v| v as u32)),
      Value::SShort(v) => Ok(v.get(idx).map(ToOwned::to_owned).map(|v| v as u32)),
      Value::SLong(v) => Ok(v.get(idx).map(ToOwned::to_owned).map(|v| v as u32)),
      _ => Err(DngError::Validation(format!("can not use get_u32() for tiff entry value {:?}", self))),
    }
  }

  /// Serialize the value into its little-endian byte representation.
  ///
  /// This is the only place values turn into bytes. The layout stage uses
  /// it both for embedded entry cells and for the overflow region.
  pub fn encode(&self) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(self.byte_size());
    match self {
      Self::Byte(val) => {
        out.extend_from_slice(val);
      }
      Self::Ascii(val) => {
        out.extend_from_slice(&val.as_vec_with_nul()?);
      }
      Self::Short(val) => {
        for x in val {
          out.write_u16::<LittleEndian>(*x)?;
        }
      }
      Self::Long(val) => {
        for x in val {
          out.write_u32::<LittleEndian>(*x)?;
        }
      }
      Self::Rational(val) => {
        for x in val {
          out.write_u32::<LittleEndian>(x.n)?;
          out.write_u32::<LittleEndian>(x.d)?;
        }
      }
      Self::SByte(val) => {
        for x in val {
          out.write_i8(*x)?;
        }
      }
      Self::Undefined(val) => {
        out.extend_from_slice(val);
      }
      Self::SShort(val) => {
        for x in val {
          out.write_i16::<LittleEndian>(*x)?;
        }
      }
      Self::SLong(val) => {
        for x in val {
          out.write_i32::<LittleEndian>(*x)?;
        }
      }
      Self::SRational(val) => {
        for x in val {
          out.write_i32::<LittleEndian>(x.n)?;
          out.write_i32::<LittleEndian>(x.d)?;
        }
      }
      Self::Float(val) => {
        for x in val {
          out.write_f32::<LittleEndian>(*x)?;
        }
      }
      Self::Double(val) => {
        for x in val {
          out.write_f64::<LittleEndian>(*x)?;
        }
      }
    }
    Ok(out)
  }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TiffAscii {
  strings: Vec<String>,
}

impl TiffAscii {
  pub fn new<T: AsRef<str>>(value: T) -> Self {
    Self {
      strings: vec![String::from(value.as_ref())],
    }
  }

  pub fn new_from_vec(values: Vec<String>) -> Self {
    Self { strings: values }
  }

  pub fn strings(&self) -> &Vec<String> {
    &self.strings
  }

  pub fn first(&self) -> &String {
    &self.strings[0]
  }

  /// Total byte count of all strings, each with its NUL terminator
  pub fn count(&self) -> usize {
    self.strings.iter().map(|s| s.len() + 1).sum::<usize>()
  }

  pub fn as_vec_with_nul(&self) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    for s in &self.strings {
      let cstr = CString::new(s.as_bytes()).map_err(|_| DngError::Encoding(format!("ASCII value {:?} contains an interior NUL byte", s)))?;
      out.extend_from_slice(cstr.to_bytes_with_nul());
    }
    Ok(out)
  }
}

impl From<Rational> for Value {
  fn from(value: Rational) -> Self {
    Value::Rational(vec![value])
  }
}

impl From<&[Rational]> for Value {
  fn from(value: &[Rational]) -> Self {
    Value::Rational(value.into())
  }
}

impl<const N: usize> From<[Rational; N]> for Value {
  fn from(value: [Rational; N]) -> Self {
    Value::Rational(value.into())
  }
}

impl From<SRational> for Value {
  fn from(value: SRational) -> Self {
    Value::SRational(vec![value])
  }
}

impl From<&[SRational]> for Value {
  fn from(value: &[SRational]) -> Self {
    Value::SRational(value.into())
  }
}

impl<const N: usize> From<[SRational; N]> for Value {
  fn from(value: [SRational; N]) -> Self {
    Value::SRational(value.into())
  }
}

impl From<&str> for Value {
  fn from(value: &str) -> Self {
    Value::Ascii(TiffAscii::new(value))
  }
}

impl From<&String> for Value {
  fn from(value: &String) -> Self {
    Value::Ascii(TiffAscii::new(value))
  }
}

impl From<String> for Value {
  fn from(value: String) -> Self {
    Value::Ascii(TiffAscii::new(&value))
  }
}

impl From<f32> for Value {
  fn from(value: f32) -> Self {
    Value::Float(vec![value])
  }
}

impl From<&[f32]> for Value {
  fn from(value: &[f32]) -> Self {
    Value::Float(value.into())
  }
}

impl<const N: usize> From<[f32; N]> for Value {
  fn from(value: [f32; N]) -> Self {
    Value::Float(value.into())
  }
}

impl From<f64> for Value {
  fn from(value: f64) -> Self {
    Value::Double(vec![value])
  }
}

impl From<&[f64]> for Value {
  fn from(value: &[f64]) -> Self {
    Value::Double(value.into())
  }
}

impl<const N: usize> From<[f64; N]> for Value {
  fn from(value: [f64; N]) -> Self {
    Value::Double(value.into())
  }
}

impl From<u8> for Value {
  fn from(value: u8) -> Self {
    Value::Byte(vec![value])
  }
}

impl From<&[u8]> for Value {
  fn from(value: &[u8]) -> Self {
    Value::Byte(value.into())
  }
}

impl<const N: usize> From<[u8; N]> for Value {
  fn from(value: [u8; N]) -> Self {
    Value::Byte(value.into())
  }
}

impl From<u16> for Value {
  fn from(value: u16) -> Self {
    Value::Short(vec![value])
  }
}

impl From<&[u16]> for Value {
  fn from(value: &[u16]) -> Self {
    Value::Short(value.into())
  }
}

impl From<&Vec<u16>> for Value {
  fn from(value: &Vec<u16>) -> Self {
    Value::Short(value.clone())
  }
}

impl<const N: usize> From<[u16; N]> for Value {
  fn from(value: [u16; N]) -> Self {
    Value::Short(value.into())
  }
}

impl From<u32> for Value {
  fn from(value: u32) -> Self {
    Value::Long(vec![value])
  }
}

impl From<&[u32]> for Value {
  fn from(value: &[u32]) -> Self {
    Value::Long(value.into())
  }
}

impl From<&Vec<u32>> for Value {
  fn from(value: &Vec<u32>) -> Self {
    Value::Long(value.clone())
  }
}

impl<const N: usize> From<[u32; N]> for Value {
  fn from(value: [u32; N]) -> Self {
    Value::Long(value.into())
  }
}

impl From<i8> for Value {
  fn from(value: i8) -> Self {
    Value::SByte(vec![value])
  }
}

impl From<&[i8]> for Value {
  fn from(value: &[i8]) -> Self {
    Value::SByte(value.into())
  }
}

impl<const N: usize> From<[i8; N]> for Value {
  fn from(value: [i8; N]) -> Self {
    Value::SByte(value.into())
  }
}

impl From<i16> for Value {
  fn from(value: i16) -> Self {
    Value::SShort(vec![value])
  }
}

impl From<&[i16]> for Value {
  fn from(value: &[i16]) -> Self {
    Value::SShort(value.into())
  }
}

impl<const N: usize> From<[i16; N]> for Value {
  fn from(value: [i16; N]) -> Self {
    Value::SShort(value.into())
  }
}

impl From<i32> for Value {
  fn from(value: i32) -> Self {
    Value::SLong(vec![value])
  }
}

impl From<&[i32]> for Value {
  fn from(value: &[i32]) -> Self {
    Value::SLong(value.into())
  }
}

impl<const N: usize> From<[i32; N]> for Value {
  fn from(value: [i32; N]) -> Self {
    Value::SLong(value.into())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn encode_is_little_endian() {
    assert_eq!(Value::Short(vec![0x1234]).encode().unwrap(), vec![0x34, 0x12]);
    assert_eq!(Value::Long(vec![0x01020304]).encode().unwrap(), vec![0x04, 0x03, 0x02, 0x01]);
    assert_eq!(Value::from(Rational::new(1, 2)).encode().unwrap(), vec![1, 0, 0, 0, 2, 0, 0, 0]);
    assert_eq!(Value::from(-1i32).encode().unwrap(), vec![0xff, 0xff, 0xff, 0xff]);
    assert_eq!(Value::from(1.0f32).encode().unwrap(), vec![0x00, 0x00, 0x80, 0x3f]);
  }

  #[test]
  fn ascii_gets_nul_terminated() {
    let value = Value::from("Canon");
    assert_eq!(value.count(), 6);
    assert_eq!(value.byte_size(), 6);
    assert_eq!(value.encode().unwrap(), b"Canon\0");
  }

  #[test]
  fn ascii_with_interior_nul_is_rejected() {
    let value = Value::from("bad\0string");
    assert!(matches!(value.encode(), Err(DngError::Encoding(_))));
  }

  #[test]
  fn multi_string_ascii_counts_each_terminator() {
    let value = Value::Ascii(TiffAscii::new_from_vec(vec!["ab".into(), "c".into()]));
    assert_eq!(value.count(), 5);
    assert_eq!(value.encode().unwrap(), b"ab\0c\0");
  }

  #[test]
  fn counts_and_sizes() {
    assert_eq!(Value::from([1u16, 2, 3]).count(), 3);
    assert_eq!(Value::from([1u16, 2, 3]).byte_size(), 6);
    assert_eq!(Value::from([Rational::new(1, 1)]).byte_size(), 8);
    assert_eq!(Value::from([1.0f64, 2.0]).byte_size(), 16);
    assert_eq!(Value::Undefined(vec![0, 1, 2]).value_type(), 7);
  }

  #[test]
  fn scalar_getters_widen_and_narrow() {
    assert_eq!(Value::from(42u16).get_u32(0).unwrap(), Some(42));
    assert_eq!(Value::from(70000u32).get_u32(0).unwrap(), Some(70000));
    assert_eq!(Value::from(12u8).get_u16(0).unwrap(), Some(12));
    assert_eq!(Value::from(1u32).get_u16(5).unwrap(), None);
    assert!(Value::from(1.0f32).get_u32(0).is_err());
  }
}
