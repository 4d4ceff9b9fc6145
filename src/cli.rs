use crate::constants::DEFAULT_TARGET_SIZE_KB;
use crate::formats::OutputFormat;
use crate::settings::{ConversionSettings, TargetSize};
use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "img-fit",
    about = "Convert images to JPEG, WebP or PNG under a target file size",
    long_about = "img-fit converts images to JPEG, WebP or PNG and searches for the highest \
                  encoder quality (95% down to 5% in 5% steps) whose output fits a target size. \
                  Images can be written one by one or bundled into converted_images.zip.",
    version,
    after_help = "EXAMPLES:\n  \
    img-fit compress photo.png -o out -f webp -s 150\n  \
    img-fit convert ./pictures -o out -r -s 300\n  \
    img-fit archive \"./shots/*.png\" -o out -f jpeg --exclude draft.png"
)]
pub struct Args {
    #[arg(short = 'q', long, global = true, help = "Only print errors")]
    pub quiet: bool,

    #[arg(short = 'v', long, global = true, help = "Print every quality attempt")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct ConversionArgs {
    #[arg(
        short = 'f',
        long,
        default_value = "jpeg",
        value_parser = parse_output_format,
        help = "Output format (jpeg, webp, png)",
        long_help = "Output format, by name or MIME type: jpeg/jpg/image/jpeg, webp/image/webp, \
                     png/image/png. PNG is lossless, so it is encoded once without a quality search."
    )]
    pub format: OutputFormat,

    #[arg(
        short = 's',
        long = "target-size",
        default_value_t = DEFAULT_TARGET_SIZE_KB.to_string(),
        allow_hyphen_values = true,
        help = "Desired maximum size per image in KB",
        long_help = "Desired maximum size per image in kilobytes (1 KB = 1024 bytes). \
                     The leading integer is used; a value that is not a number, zero or negative \
                     makes every image come out at the minimum quality."
    )]
    pub target_size: String,
}

impl ConversionArgs {
    pub fn settings(&self) -> ConversionSettings {
        ConversionSettings::new(self.format, TargetSize::parse_lenient(&self.target_size))
    }
}

#[derive(ClapArgs, Debug, Clone)]
pub struct BatchArgs {
    #[arg(
        required = true,
        help = "Input files, directories or glob patterns",
        long_help = "Inputs can be files, directories or glob expressions. \
                     Examples: './images', '*.png', '/path/to/images/*.{jpg,png}'"
    )]
    pub inputs: Vec<String>,

    #[arg(short = 'o', long, help = "Output directory path")]
    pub output: PathBuf,

    #[command(flatten)]
    pub conversion: ConversionArgs,

    #[arg(short = 'r', long, help = "Process subdirectories recursively")]
    pub recursive: bool,

    #[arg(
        long,
        value_name = "NAME",
        help = "Leave out images with this file name (repeatable)"
    )]
    pub exclude: Vec<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(
        about = "Convert a single image",
        long_about = "Convert one image to the target format and size, write it to the output \
                      directory and report the quality that was used."
    )]
    Compress {
        #[arg(help = "Input image file path")]
        input: PathBuf,

        #[arg(short = 'o', long, help = "Output directory path")]
        output: PathBuf,

        #[command(flatten)]
        conversion: ConversionArgs,
    },

    #[command(
        about = "Convert images one by one into a directory",
        long_about = "Convert every input image, one after another, writing each result into \
                      the output directory under its original name with the new extension."
    )]
    Convert(BatchArgs),

    #[command(
        about = "Convert images into a single zip archive",
        long_about = "Convert every input image, one after another, and bundle the results into \
                      converted_images.zip in the output directory."
    )]
    Archive(BatchArgs),
}

fn parse_output_format(value: &str) -> Result<OutputFormat, String> {
    value.parse::<OutputFormat>().map_err(|e| e.to_string())
}
