//! The set of images waiting to be sent with the next turn.

use std::fs;
use std::path::Path;

use crate::codec::to_data_url;
use crate::error::{Error, Result};

/// Hard cap on the number of images sent with one turn.
pub const MAX_ATTACHMENTS: usize = 4;

/// Ordered list of not-yet-sent images, held as data URLs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingAttachments {
    images: Vec<String>,
}

impl PendingAttachments {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an image data URL.
    ///
    /// Returns false, leaving the set untouched, when the set is full or the
    /// URL does not carry an image media type.
    pub fn add(&mut self, data_url: impl Into<String>) -> bool {
        let data_url = data_url.into();
        if self.is_full() || !data_url.starts_with("data:image/") {
            return false;
        }
        self.images.push(data_url);
        true
    }

    /// Adds each data URL in turn until the set is full.  Returns how many were added.
    pub fn extend<I, S>(&mut self, data_urls: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut added = 0;
        for url in data_urls {
            if self.add(url) {
                added += 1;
            }
        }
        added
    }

    /// Reads an image file and adds it.
    ///
    /// Returns `Ok(false)` without touching the file system when the set is
    /// full or the file is not an image.
    pub fn add_path<P: AsRef<Path>>(&mut self, path: P) -> Result<bool> {
        let path = path.as_ref();
        if self.is_full() {
            return Ok(false);
        }
        let Some(mime_type) = image_mime_type(path) else {
            return Ok(false);
        };
        let data = fs::read(path)
            .map_err(|err| Error::io(format!("failed to read {}", path.display()), err))?;
        Ok(self.add(to_data_url(&mime_type, &data)))
    }

    /// Removes the image at `index`, keeping the order of the rest.
    pub fn remove(&mut self, index: usize) -> Option<String> {
        if index < self.images.len() {
            Some(self.images.remove(index))
        } else {
            None
        }
    }

    /// Removes every image, returning them in order.
    pub fn take(&mut self) -> Vec<String> {
        std::mem::take(&mut self.images)
    }

    /// Removes every image.
    pub fn clear(&mut self) {
        self.images.clear();
    }

    /// The pending images, in attachment order.
    pub fn as_slice(&self) -> &[String] {
        &self.images
    }

    /// Number of pending images.
    pub fn len(&self) -> usize {
        self.images.len()
    }

    /// True when nothing is attached.
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// True when no further image can be attached.
    pub fn is_full(&self) -> bool {
        self.images.len() >= MAX_ATTACHMENTS
    }
}

/// Media type of an image file, judged by its extension.
///
/// Any `image/*` type is accepted; everything else is `None`.
pub fn image_mime_type(path: &Path) -> Option<String> {
    let mime = mime_guess::from_path(path).first()?;
    (mime.type_() == mime_guess::mime::IMAGE).then(|| mime.essence_str().to_string())
}
