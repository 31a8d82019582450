//! Item presentation
//!
//! Stateless view of one pony: asset lookup by color and a delete affordance
//! that hands the pony back to the owning list.

use crate::types::{Pony, PonyColor, PonyId};

/// Asset path for a color tag
#[must_use]
pub fn image_url(color: PonyColor) -> String {
    format!("/images/pony-{color}.gif")
}

/// Event emitted by an item toward its list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemAction {
    /// Delete button clicked
    Delete(Pony),
}

/// One rendered row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PonyItem {
    pony: Pony,
}

impl PonyItem {
    /// Wrap a pony
    #[inline]
    #[must_use]
    pub fn new(pony: Pony) -> Self {
        Self { pony }
    }

    /// Render key
    #[inline]
    #[must_use]
    pub fn id(&self) -> &PonyId {
        &self.pony.id
    }

    /// Display name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.pony.name
    }

    /// The wrapped record
    #[inline]
    #[must_use]
    pub fn pony(&self) -> &Pony {
        &self.pony
    }

    /// Asset shown next to the name
    #[inline]
    #[must_use]
    pub fn image_url(&self) -> String {
        image_url(self.pony.color)
    }

    /// Delete button
    #[must_use]
    pub fn click_delete(&self) -> ItemAction {
        ItemAction::Delete(self.pony.clone())
    }
}
