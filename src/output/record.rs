//! Page record formatting
//!
//! A `PageRecord` is everything saved for one page. It is turned into the
//! plain text file format and a filename, then dropped.

use chrono::{DateTime, Local};

/// Maximum length, in characters, of a sanitized filename base
pub const MAX_FILENAME_LEN: usize = 100;

/// Maximum length, in bytes, of a sanitized filename base
///
/// Leaves room for `_<timestamp>.txt` (24 bytes) within the 255-byte name
/// limit of common filesystems.
pub const MAX_FILENAME_BYTES: usize = 231;

/// Timestamp layout used in file headers and filenames
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// Text recovered from one image by OCR
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageText {
    /// Absolute image URL
    pub source: String,

    /// Trimmed, non-empty OCR output
    pub text: String,
}

/// One scraped page, ready to be written
#[derive(Debug, Clone)]
pub struct PageRecord {
    pub title: String,
    pub url: String,
    pub timestamp: String,
    pub body_text: String,

    /// `None` when OCR was disabled for the crawl
    pub image_texts: Option<Vec<ImageText>>,
}

impl PageRecord {
    /// Creates a record stamped with the current local time
    pub fn new(title: String, url: String, body_text: String) -> Self {
        Self::with_timestamp(title, url, body_text, format_timestamp(&Local::now()))
    }

    /// Creates a record with an explicit timestamp
    pub fn with_timestamp(title: String, url: String, body_text: String, timestamp: String) -> Self {
        Self {
            title,
            url,
            timestamp,
            body_text,
            image_texts: None,
        }
    }

    /// Attaches OCR results; an empty list still marks OCR as enabled
    pub fn with_image_texts(mut self, image_texts: Vec<ImageText>) -> Self {
        self.image_texts = Some(image_texts);
        self
    }

    /// Filename for this record: `<sanitized title>_<timestamp>.txt`
    pub fn filename(&self) -> String {
        format!("{}_{}.txt", safe_filename(&self.title), self.timestamp)
    }

    /// Renders the text file contents
    ///
    /// The `IMAGE TEXTS:` block is only present when OCR ran and recovered
    /// text from at least one image.
    pub fn to_text(&self) -> String {
        let mut text = format!(
            "Title: {}\nURL: {}\nTimestamp: {}\n\nARTICLE TEXT:\n{}\n\n",
            self.title, self.url, self.timestamp, self.body_text
        );

        if let Some(images) = self.image_texts.as_ref().filter(|i| !i.is_empty()) {
            text.push_str("IMAGE TEXTS:\n");
            let blocks: Vec<String> = images
                .iter()
                .map(|image| format!("Image text from {}:\n{}\n", image.source, image.text))
                .collect();
            text.push_str(&blocks.join("\n"));
        }

        text
    }
}

/// Formats a time the way output files are stamped
pub fn format_timestamp(time: &DateTime<Local>) -> String {
    time.format(TIMESTAMP_FORMAT).to_string()
}

/// Sanitizes a page title into a filename base
///
/// Alphanumerics, spaces, `-`, `_` and `.` are kept; every other character
/// becomes `_`. The result is cut to 100 characters, and further at a
/// character boundary if it would exceed `MAX_FILENAME_BYTES`.
///
/// # Example
///
/// ```
/// use pagescribe::safe_filename;
///
/// assert_eq!(safe_filename("Hello, World! <Test>"), "Hello_ World_ _Test_");
/// ```
pub fn safe_filename(name: &str) -> String {
    let mut safe = String::new();

    for c in name.chars().take(MAX_FILENAME_LEN) {
        let c = if c.is_alphanumeric() || matches!(c, ' ' | '-' | '_' | '.') {
            c
        } else {
            '_'
        };
        if safe.len() + c.len_utf8() > MAX_FILENAME_BYTES {
            break;
        }
        safe.push(c);
    }

    safe
}
