use crate::codec::{decode_image, encoder_for};
use crate::compressor::{compress_to_target, Quality};
use crate::constants::SourceFormat;
use crate::error::{ConvertError, Result};
use crate::formats::OutputFormat;
use crate::naming::derive_output_name;
use crate::settings::ConversionSettings;
use image::GenericImageView;
use std::fmt;
use std::sync::Arc;

/// A file handed to the converter: original name, raw bytes and the MIME
/// type it advertises.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceImage {
    pub name: String,
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl SourceImage {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bytes,
            mime_type: mime_type.into(),
        }
    }

    pub fn is_supported(&self) -> bool {
        SourceFormat::from_mime_type(&self.mime_type).is_some()
    }
}

/// Identifier assigned to each ingested image, unique within a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntryId(u64);

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone)]
pub struct PreviewEntry {
    pub id: EntryId,
    pub source: Arc<SourceImage>,
    pub width: u32,
    pub height: u32,
}

/// Encoded output for one entry. Built fresh by every convert action.
#[derive(Debug, Clone)]
pub struct CompressedArtifact {
    pub entry: EntryId,
    pub derived_name: String,
    pub encoded_bytes: Vec<u8>,
    pub quality_used: Quality,
    pub format: OutputFormat,
    pub fits_target: bool,
}

impl CompressedArtifact {
    pub fn size_kb(&self) -> f64 {
        self.encoded_bytes.len() as f64 / 1024.0
    }

    /// Label of the per-image download action
    pub fn download_label(&self) -> String {
        format!(
            "Download {} (Q: {}%)",
            self.derived_name,
            self.quality_used.percent()
        )
    }
}

/// One unit of batch work: an entry captured at the moment the batch started
#[derive(Debug, Clone)]
pub struct PendingTask {
    pub id: EntryId,
    pub source: Arc<SourceImage>,
}

impl PendingTask {
    /// Decode, run the quality search and name the result
    pub fn convert(&self, settings: &ConversionSettings) -> Result<CompressedArtifact> {
        let image = decode_image(&self.source.bytes)?;
        let encoder = encoder_for(settings.output_format);
        let outcome = compress_to_target(&image, encoder.as_ref(), settings.target_size)?;

        Ok(CompressedArtifact {
            entry: self.id,
            derived_name: derive_output_name(&self.source.name, settings.output_format),
            encoded_bytes: outcome.bytes,
            quality_used: outcome.quality,
            format: settings.output_format,
            fits_target: outcome.fits_target,
        })
    }
}

/// The set of images currently waiting for conversion.
#[derive(Debug, Default)]
pub struct Session {
    entries: Vec<PreviewEntry>,
    next_id: u64,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accepts the supported files and registers a preview entry for each
    /// one that decodes. Unsupported and undecodable files are skipped with
    /// a warning. Returns the ids of the new entries in input order.
    pub fn ingest<I>(&mut self, files: I) -> Vec<EntryId>
    where
        I: IntoIterator<Item = SourceImage>,
    {
        let mut accepted = Vec::new();

        for file in files {
            if !file.is_supported() {
                crate::warn!("Skipping {} (unsupported type {})", file.name, file.mime_type);
                continue;
            }

            let (width, height) = match decode_image(&file.bytes) {
                Ok(img) => img.dimensions(),
                Err(e) => {
                    crate::warn!("Skipping {}: {}", file.name, e);
                    continue;
                }
            };

            let id = EntryId(self.next_id);
            self.next_id += 1;
            crate::verbose!("Added {} as {} ({}x{})", file.name, id, width, height);

            self.entries.push(PreviewEntry {
                id,
                source: Arc::new(file),
                width,
                height,
            });
            accepted.push(id);
        }

        accepted
    }

    pub fn remove(&mut self, id: EntryId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.id != id);
        self.entries.len() != before
    }

    /// Drops every entry; ids keep increasing across resets
    pub fn reset(&mut self) {
        self.entries.clear();
    }

    pub fn entries(&self) -> &[PreviewEntry] {
        &self.entries
    }

    pub fn get(&self, id: EntryId) -> Option<&PreviewEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    pub fn ids_named(&self, name: &str) -> Vec<EntryId> {
        self.entries
            .iter()
            .filter(|entry| entry.source.name == name)
            .map(|entry| entry.id)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Captures the current entries, in display order, as batch work
    pub fn snapshot(&self) -> Vec<PendingTask> {
        self.entries
            .iter()
            .map(|entry| PendingTask {
                id: entry.id,
                source: Arc::clone(&entry.source),
            })
            .collect()
    }

    pub fn convert_one(
        &self,
        id: EntryId,
        settings: &ConversionSettings,
    ) -> Result<CompressedArtifact> {
        let entry = self.get(id).ok_or(ConvertError::UnknownEntry(id))?;
        PendingTask {
            id,
            source: Arc::clone(&entry.source),
        }
        .convert(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::TargetSize;
    use image::{DynamicImage, ImageFormat, RgbImage};
    use std::io::Cursor;

    fn png_source(name: &str, width: u32, height: u32) -> SourceImage {
        let img = DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
            image::Rgb([(x * 5) as u8, (y * 3) as u8, 128])
        }));
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        SourceImage::new(name, bytes, "image/png")
    }

    #[test]
    fn test_ingest_assigns_increasing_ids() {
        let mut session = Session::new();
        let ids = session.ingest(vec![png_source("a.png", 8, 8), png_source("b.png", 4, 2)]);
        assert_eq!(ids.len(), 2);
        assert!(ids[0] < ids[1]);
        assert_eq!(session.get(ids[1]).map(|e| (e.width, e.height)), Some((4, 2)));
    }

    #[test]
    fn test_ingest_drops_unsupported_mime_types() {
        let mut session = Session::new();
        let text = SourceImage::new("notes.txt", b"hello".to_vec(), "text/plain");
        let tiff = SourceImage::new("scan.tiff", b"II*\0".to_vec(), "image/tiff");

        let ids = session.ingest(vec![text, tiff]);
        assert!(ids.is_empty());
        assert!(session.is_empty());
    }

    #[test]
    fn test_ingest_drops_undecodable_files() {
        let mut session = Session::new();
        let broken = SourceImage::new("broken.png", b"fake png data".to_vec(), "image/png");
        let ids = session.ingest(vec![broken, png_source("ok.png", 2, 2)]);
        assert_eq!(ids.len(), 1);
        assert_eq!(session.entries()[0].source.name, "ok.png");
    }

    #[test]
    fn test_remove_and_reset() {
        let mut session = Session::new();
        let ids = session.ingest(vec![png_source("a.png", 2, 2), png_source("b.png", 2, 2)]);

        assert!(session.remove(ids[0]));
        assert!(!session.remove(ids[0]));
        assert_eq!(session.len(), 1);
        assert!(session.get(ids[0]).is_none());

        session.reset();
        assert!(session.is_empty());

        // Fresh ids after a reset never collide with old ones
        let new_ids = session.ingest(vec![png_source("c.png", 2, 2)]);
        assert!(new_ids[0] > ids[1]);
    }

    #[test]
    fn test_convert_one_names_and_labels_artifact() {
        let mut session = Session::new();
        let ids = session.ingest(vec![png_source("photo.vacation.png", 16, 16)]);
        let settings = ConversionSettings::new(OutputFormat::WebP, TargetSize::from_kb(500));

        let artifact = session.convert_one(ids[0], &settings).unwrap();
        assert_eq!(artifact.entry, ids[0]);
        assert_eq!(artifact.derived_name, "photo.vacation.webp");
        assert_eq!(artifact.quality_used, Quality::MAX);
        assert!(artifact.fits_target);
        assert_eq!(artifact.download_label(), "Download photo.vacation.webp (Q: 95%)");
    }

    #[test]
    fn test_convert_one_unknown_entry() {
        let mut session = Session::new();
        let ids = session.ingest(vec![png_source("a.png", 2, 2)]);
        session.remove(ids[0]);

        let result = session.convert_one(ids[0], &ConversionSettings::default());
        assert!(matches!(result, Err(ConvertError::UnknownEntry(id)) if id == ids[0]));
    }

    #[test]
    fn test_snapshot_is_independent_of_later_changes() {
        let mut session = Session::new();
        session.ingest(vec![png_source("a.png", 2, 2)]);
        let snapshot = session.snapshot();

        session.ingest(vec![png_source("b.png", 2, 2)]);
        assert_eq!(snapshot.len(), 1);
        assert_eq!(session.len(), 2);
    }

    #[test]
    fn test_ids_named() {
        let mut session = Session::new();
        let ids = session.ingest(vec![
            png_source("a.png", 2, 2),
            png_source("b.png", 2, 2),
            png_source("a.png", 2, 2),
        ]);
        assert_eq!(session.ids_named("a.png"), vec![ids[0], ids[2]]);
        assert!(session.ids_named("missing.png").is_empty());
    }
}
