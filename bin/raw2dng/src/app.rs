// SPDX-License-Identifier: LGPL-2.1
// Copyright 2021 Daniel Vogelbacher <daniel@chaospixel.com>

use clap::{Arg, ArgAction, Command, crate_version, value_parser};
use log::debug;
use std::path::PathBuf;

use crate::convert::{CalibrationIlluminantArgParser, CfaLayout, ColorMatrixArgParser, WhiteBalanceInput};

/// Create the clap configuration for the command line
pub fn create_app() -> Command {
  debug!("Creating CLAP app configuration");
  Command::new("raw2dng")
    .version(crate_version!())
    .author("Daniel V. <daniel@chaospixel.com>")
    .about("raw2dng - Convert headerless RAW sample dumps into DNG format")
    .arg(
      Arg::new("debug")
        .short('d')
        .action(ArgAction::Count)
        .help("Sets the level of debugging information"),
    )
    .arg(
      Arg::new("verbose")
        .short('v')
        .long("verbose")
        .action(ArgAction::SetTrue)
        .help("Print more messages"),
    )
    .arg(
      Arg::new("input")
        .short('i')
        .long("input")
        .value_name("FILE")
        .value_parser(value_parser!(PathBuf))
        .required_unless_present("pattern")
        .help("Input sample dump, little-endian u16 (f32 for --bits 32)"),
    )
    .arg(
      Arg::new("pattern")
        .long("pattern")
        .action(ArgAction::SetTrue)
        .conflicts_with("input")
        .help("Synthesize a gradient test frame instead of reading an input"),
    )
    .arg(
      Arg::new("width")
        .long("width")
        .required(true)
        .value_parser(value_parser!(u32))
        .help("Frame width in pixels"),
    )
    .arg(
      Arg::new("height")
        .long("height")
        .required(true)
        .value_parser(value_parser!(u32))
        .help("Frame height in pixels"),
    )
    .arg(
      Arg::new("bits")
        .long("bits")
        .default_value("16")
        .value_parser(value_parser!(u16))
        .help("Bits per sample: 8, 10, 12, 14, 16 or 32 (float)"),
    )
    .arg(
      Arg::new("override")
        .short('f')
        .long("override")
        .action(ArgAction::SetTrue)
        .help("Override existing files"),
    )
    .arg(
      Arg::new("dump_tags")
        .long("dump-tags")
        .action(ArgAction::SetTrue)
        .help("Print the tag directory as JSON before writing"),
    )
    .arg(Arg::new("artist").long("artist").help("Set the artist tag"))
    .arg(Arg::new("make").long("make").help("Set the camera make tag"))
    .arg(Arg::new("model").long("model").help("Set the camera model tag"))
    .arg(
      Arg::new("cfa")
        .long("cfa")
        .value_parser(value_parser!(CfaLayout))
        .help("Mark the frame as a CFA mosaic with the given 2x2 layout"),
    )
    .arg(
      Arg::new("black_level")
        .long("black-level")
        .value_parser(value_parser!(u32))
        .help("Set the BlackLevel tag"),
    )
    .arg(
      Arg::new("white_level")
        .long("white-level")
        .value_parser(value_parser!(u32))
        .help("Set the WhiteLevel tag"),
    )
    .arg(
      Arg::new("wb")
        .long("wb")
        .value_name("R,G,B")
        .value_parser(value_parser!(WhiteBalanceInput))
        .help("Set the as-shot neutral white balance"),
    )
    .arg(
      Arg::new("matrix1")
        .long("matrix1")
        .value_name("MATRIX")
        .value_parser(ColorMatrixArgParser)
        .requires("illuminant1")
        .help("Set the XYZ to camera color matrix (nine comma separated values)"),
    )
    .arg(
      Arg::new("illuminant1")
        .long("illuminant1")
        .value_parser(CalibrationIlluminantArgParser)
        .help("Set the calibration illuminant for --matrix1"),
    )
    .arg(
      Arg::new("OUTPUT")
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .help("Output DNG file"),
    )
}
