pub mod archive;
pub mod batch;
pub mod cli;
pub mod codec;
pub mod compressor;
pub mod constants;
pub mod delivery;
pub mod error;
pub mod formats;
pub mod input;
pub mod logger;
pub mod naming;
pub mod session;
pub mod settings;
pub mod utils;

pub use batch::{Batch, BatchSummary, CancelFlag};
pub use codec::{decode_image, encoder_for, ImageEncoder};
pub use compressor::{compress_to_target, CompressionOutcome, Quality};
pub use delivery::{DirectorySink, DownloadSink, MemorySink};
pub use error::{ConvertError, Result};
pub use formats::OutputFormat;
pub use naming::derive_output_name;
pub use session::{CompressedArtifact, EntryId, PreviewEntry, Session, SourceImage};
pub use settings::{ConversionSettings, TargetSize};
