use std::path::Path;

use base64::Engine;
use image::imageops::FilterType;

use crate::description::IconSource;

/// Edge length, in logical units, menu icons are normalized to.
pub const DEFAULT_ICON_SIZE: u32 = 16;

/// A decoded icon, stored as straight RGBA8 pixels.
#[derive(Clone, PartialEq, Eq)]
pub struct MenuIcon {
    rgba: Vec<u8>,
    width: u32,
    height: u32,
}

impl MenuIcon {
    pub fn rgba(&self) -> &[u8] {
        &self.rgba
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn into_rgba(self) -> Vec<u8> {
        self.rgba
    }
}

impl std::fmt::Debug for MenuIcon {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MenuIcon")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

/// Turns an item's icon fields into a size-normalized bitmap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IconResolver {
    size: u32,
}

impl Default for IconResolver {
    fn default() -> Self {
        Self::new(DEFAULT_ICON_SIZE)
    }
}

impl IconResolver {
    pub fn new(size: u32) -> Self {
        Self { size: size.max(1) }
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    /// Resolves an icon, inline bytes first, then the file path.
    ///
    /// Every failure falls through to the next source and finally to `None`.
    pub fn resolve(&self, source: &IconSource) -> Option<MenuIcon> {
        if let Some(encoded) = source.base64.as_deref() {
            match self.decode_inline(encoded) {
                Ok(icon) => return Some(icon),
                Err(e) => tracing::debug!("Ignoring inline menu icon: {e}"),
            }
        }

        let path = source.path.as_deref()?;
        if path.as_os_str().is_empty() {
            return None;
        }

        match self.load_file(path) {
            Ok(icon) => Some(icon),
            Err(e) => {
                tracing::debug!("Ignoring menu icon at {}: {e}", path.display());
                None
            }
        }
    }

    fn decode_inline(&self, encoded: &str) -> anyhow::Result<MenuIcon> {
        let bytes = base64::engine::general_purpose::STANDARD.decode(encoded)?;
        self.decode(&bytes)
    }

    fn load_file(&self, path: &Path) -> anyhow::Result<MenuIcon> {
        if !path.is_file() {
            anyhow::bail!("file does not exist");
        }

        let bytes = std::fs::read(path)?;
        self.decode(&bytes)
    }

    fn decode(&self, bytes: &[u8]) -> anyhow::Result<MenuIcon> {
        let image = image::load_from_memory(bytes)?
            .resize_exact(self.size, self.size, FilterType::Triangle)
            .into_rgba8();

        let (width, height) = image.dimensions();
        Ok(MenuIcon {
            rgba: image.into_raw(),
            width,
            height,
        })
    }
}
