use crate::formats::OutputFormat;
use std::collections::HashSet;

/// Derives the output file name for a source name.
///
/// A trailing `.` followed by one or more word characters (`[A-Za-z0-9_]`)
/// is treated as the extension and replaced; everything before it is kept
/// as-is. Names without such a suffix get the extension appended.
///
/// # Example
/// ```
/// use img_fit::formats::OutputFormat;
/// use img_fit::naming::derive_output_name;
///
/// assert_eq!(derive_output_name("photo.vacation.png", OutputFormat::WebP), "photo.vacation.webp");
/// assert_eq!(derive_output_name("scan", OutputFormat::Jpeg), "scan.jpeg");
/// ```
pub fn derive_output_name(original_name: &str, format: OutputFormat) -> String {
    let stem = match original_name.rfind('.') {
        Some(dot) if is_word_suffix(&original_name[dot + 1..]) => &original_name[..dot],
        _ => original_name,
    };
    format!("{}.{}", stem, format.extension())
}

fn is_word_suffix(suffix: &str) -> bool {
    !suffix.is_empty()
        && suffix
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Hands out unique names within one batch: the second `a.webp` becomes
/// `a-2.webp`, the third `a-3.webp`, and so on.
#[derive(Debug, Default)]
pub struct UniqueNames {
    taken: HashSet<String>,
}

impl UniqueNames {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn claim(&mut self, name: &str) -> String {
        if self.taken.insert(name.to_string()) {
            return name.to_string();
        }

        let (stem, extension) = match name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => (stem, Some(ext)),
            _ => (name, None),
        };

        let mut counter = 2;
        loop {
            let candidate = match extension {
                Some(ext) => format!("{}-{}.{}", stem, counter, ext),
                None => format!("{}-{}", stem, counter),
            };
            if self.taken.insert(candidate.clone()) {
                return candidate;
            }
            counter += 1;
        }
    }
}
