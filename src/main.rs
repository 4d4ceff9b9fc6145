use anyhow::{bail, Context, Result};
use clap::Parser;
use img_fit::cli::{Args, BatchArgs, Commands, ConversionArgs};
use img_fit::input::{collect_inputs, load_source_image};
use img_fit::logger::{self, Verbosity};
use img_fit::utils::{calculate_compression_ratio, create_progress_spinner, format_file_size};
use img_fit::{error, info, warn};
use img_fit::{Batch, ConversionSettings, DirectorySink, DownloadSink, Session};
use std::path::Path;

fn main() {
    let args = Args::parse();
    logger::set_verbosity(Verbosity::from_flags(args.quiet, args.verbose));

    if let Err(e) = run(args.command) {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Compress {
            input,
            output,
            conversion,
        } => compress_one(&input, &output, &conversion),
        Commands::Convert(batch) => run_batch(&batch, false),
        Commands::Archive(batch) => run_batch(&batch, true),
    }
}

fn announce(settings: &ConversionSettings) {
    info!("🖼️  Image to {} Converter", settings.output_format.label());
    if !settings.target_size.is_valid() {
        warn!(
            "Target size {} can never be met; images will use the minimum quality",
            settings.target_size
        );
    }
}

fn compress_one(input: &Path, output: &Path, conversion: &ConversionArgs) -> Result<()> {
    let settings = conversion.settings();
    announce(&settings);

    let source = load_source_image(input).with_context(|| format!("reading {:?}", input))?;
    let original_size = source.bytes.len() as u64;

    let mut session = Session::new();
    let Some(&id) = session.ingest([source]).first() else {
        bail!("{:?} is not a supported image", input);
    };

    let pb = create_progress_spinner("Searching for quality...");
    let artifact = session.convert_one(id, &settings)?;
    pb.finish_and_clear();

    let mut sink = DirectorySink::new(output);
    sink.deliver(&artifact.derived_name, &artifact.encoded_bytes)
        .with_context(|| format!("writing into {:?}", output))?;

    let compressed_size = artifact.encoded_bytes.len() as u64;
    info!("✅ {}", artifact.download_label());
    info!(
        "📈 {} -> {} ({:.1}%)",
        format_file_size(original_size),
        format_file_size(compressed_size),
        calculate_compression_ratio(original_size, compressed_size)
    );
    if !artifact.fits_target {
        warn!(
            "Still above {} at the lowest quality tried",
            settings.target_size
        );
    }
    Ok(())
}

fn run_batch(args: &BatchArgs, archived: bool) -> Result<()> {
    let settings = args.conversion.settings();
    announce(&settings);

    let files = collect_inputs(&args.inputs, args.recursive)?;
    if files.is_empty() {
        warn!("No image files found in the input path");
        return Ok(());
    }

    let mut session = Session::new();
    for path in &files {
        match load_source_image(path) {
            Ok(source) => {
                session.ingest([source]);
            }
            Err(e) => warn!("Skipping {:?}: {}", path, e),
        }
    }

    for name in &args.exclude {
        let ids = session.ids_named(name);
        if ids.is_empty() {
            warn!("--exclude {}: no such image", name);
        }
        for id in ids {
            session.remove(id);
        }
    }

    if session.is_empty() {
        warn!("Nothing left to convert");
        return Ok(());
    }

    let mut sink = DirectorySink::new(&args.output);
    let batch = Batch::new(&session, settings);
    let summary = if archived {
        batch.run_archived(&mut sink)?
    } else {
        batch.run_individual(&mut sink)?
    };
    summary.print();

    if summary.converted == 0 {
        bail!("no image could be converted");
    }
    Ok(())
}
