use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::api::host::AtlasProvider;
use crate::error::BeamError;

/// Pixel size of a loaded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AtlasSize {
    pub width: u32,
    pub height: u32,
}

/// Source rectangle within the atlas, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Beam atlas sliced into equal-height rows, one beam type per row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AtlasLayout {
    pub width: u32,
    pub row_height: u32,
}

impl AtlasLayout {
    /// Slice an atlas into `rows` rows. The height must divide evenly.
    pub fn resolve(size: AtlasSize, rows: u32) -> Result<Self, BeamError> {
        if rows == 0 || size.height % rows != 0 {
            return Err(BeamError::InvalidAtlasGeometry {
                height: size.height,
                rows,
            });
        }
        Ok(Self {
            width: size.width,
            row_height: size.height / rows,
        })
    }

    /// Frame for one beam row.
    pub fn frame(&self, row: u32) -> FrameRect {
        FrameRect {
            x: 0,
            y: row * self.row_height,
            width: self.width,
            height: self.row_height,
        }
    }
}

/// What the subsystem knows about the beam atlas this frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtlasView {
    pub filename: String,
    pub size: Option<AtlasSize>,
    pub rows: u32,
}

impl AtlasView {
    pub fn layout(&self) -> Result<AtlasLayout, BeamError> {
        let size = self
            .size
            .ok_or_else(|| BeamError::AtlasNotLoaded(self.filename.clone()))?;
        AtlasLayout::resolve(size, self.rows)
    }
}

/// Image sizes keyed by filename, as reported by the host once images load.
#[derive(Debug, Clone, Default)]
pub struct AtlasSizes {
    sizes: HashMap<String, AtlasSize>,
}

impl AtlasSizes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, filename: impl Into<String>, size: AtlasSize) {
        self.sizes.insert(filename.into(), size);
    }

    pub fn with(mut self, filename: impl Into<String>, width: u32, height: u32) -> Self {
        self.insert(filename, AtlasSize { width, height });
        self
    }
}

impl AtlasProvider for AtlasSizes {
    fn get(&self, filename: &str) -> Option<AtlasSize> {
        self.sizes.get(filename).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_slice_the_height() {
        let layout = AtlasLayout::resolve(AtlasSize { width: 64, height: 48 }, 3).unwrap();
        assert_eq!(layout.row_height, 16);
        assert_eq!(
            layout.frame(2),
            FrameRect { x: 0, y: 32, width: 64, height: 16 }
        );
    }

    #[test]
    fn uneven_rows_are_a_configuration_error() {
        let err = AtlasLayout::resolve(AtlasSize { width: 64, height: 33 }, 2).unwrap_err();
        assert!(matches!(err, BeamError::InvalidAtlasGeometry { height: 33, rows: 2 }));
        assert!(AtlasLayout::resolve(AtlasSize { width: 64, height: 32 }, 0).is_err());
    }

    #[test]
    fn view_without_image_is_not_loaded() {
        let view = AtlasView { filename: "Beams".into(), size: None, rows: 2 };
        assert!(matches!(view.layout(), Err(BeamError::AtlasNotLoaded(name)) if name == "Beams"));
    }

    #[test]
    fn provider_looks_up_by_filename() {
        let sizes = AtlasSizes::new().with("Beams", 128, 64);
        assert_eq!(sizes.get("Beams"), Some(AtlasSize { width: 128, height: 64 }));
        assert_eq!(sizes.get("Other"), None);
    }
}
