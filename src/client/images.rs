//! Multi-image form state: previously persisted URLs plus newly selected
//! local files, reconciled into one ordered list on save.

use thiserror::Error;

/// Hard cap on persisted + newly selected images per product.
pub const MAX_PRODUCT_IMAGES: usize = 5;

/// A locally selected file awaiting upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingImage {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error(
    "A product can have at most {MAX_PRODUCT_IMAGES} images; {selected} selected with {existing} already attached"
)]
pub struct ImageLimitExceeded {
    pub existing: usize,
    pub selected: usize,
}

/// The two image lists of a product form. Persisted URLs can only be
/// removed; pending files can be added (within the cap) and removed before
/// submit.
#[derive(Debug, Default)]
pub struct ImageSet {
    persisted: Vec<String>,
    pending: Vec<PendingImage>,
}

impl ImageSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_persisted(urls: Vec<String>) -> Self {
        Self {
            persisted: urls,
            pending: Vec::new(),
        }
    }

    pub fn persisted(&self) -> &[String] {
        &self.persisted
    }

    pub fn pending(&self) -> &[PendingImage] {
        &self.pending
    }

    pub fn total(&self) -> usize {
        self.persisted.len() + self.pending.len()
    }

    /// Add newly selected files. A selection that would push the total over
    /// the cap is rejected whole; neither list changes.
    pub fn add_pending(&mut self, images: Vec<PendingImage>) -> Result<(), ImageLimitExceeded> {
        let selected = images.len();
        if self.total() + selected > MAX_PRODUCT_IMAGES {
            return Err(ImageLimitExceeded {
                existing: self.total(),
                selected,
            });
        }
        self.pending.extend(images);
        Ok(())
    }

    pub fn remove_persisted(&mut self, index: usize) {
        if index < self.persisted.len() {
            self.persisted.remove(index);
        }
    }

    pub fn remove_pending(&mut self, index: usize) {
        if index < self.pending.len() {
            self.pending.remove(index);
        }
    }

    /// The image list sent to the entity save: remaining persisted URLs
    /// followed by the freshly uploaded ones, in order.
    pub fn final_urls(&self, uploaded: Vec<String>) -> Vec<String> {
        let mut urls = self.persisted.clone();
        urls.extend(uploaded);
        urls
    }
}
