use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use state::InitCell;

use crate::coords::Vec2;

static GLOBAL: InitCell<Mutex<FontCache>> = InitCell::new();

/// Error returned by [`FontCache::load`].
#[derive(Debug, Clone)]
pub struct FontLoadError(pub String);

impl fmt::Display for FontLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "font load error: {}", self.0)
    }
}

impl std::error::Error for FontLoadError {}

/// Handle to a font in a [`FontCache`].
///
/// Ids issued before [`FontCache::clear`] no longer resolve.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct FontId {
    index: usize,
    generation: u64,
}

/// Loaded fonts, addressable by id or by the name they were loaded under.
#[derive(Default)]
pub struct FontCache {
    fonts: Vec<Arc<fontdue::Font>>,
    names: HashMap<String, FontId>,
    generation: u64,
}

impl FontCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Locks the process-wide cache, creating it on first use.
    pub fn global() -> MutexGuard<'static, FontCache> {
        GLOBAL
            .get_or_init(|| Mutex::new(FontCache::new()))
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Clears the process-wide cache if it was ever created.
    pub fn clear_global() {
        if let Some(cache) = GLOBAL.try_get() {
            cache.lock().unwrap_or_else(PoisonError::into_inner).clear();
        }
    }

    /// Parses a TrueType or OpenType font and stores it under `name`.
    ///
    /// Loading a name that is already present returns the existing id
    /// without parsing `bytes`.
    pub fn load(&mut self, name: &str, bytes: &[u8]) -> Result<FontId, FontLoadError> {
        if let Some(id) = self.names.get(name) {
            return Ok(*id);
        }

        let font = fontdue::Font::from_bytes(bytes, fontdue::FontSettings::default())
            .map_err(|e| FontLoadError(format!("{name}: {e}")))?;

        let id = FontId {
            index: self.fonts.len(),
            generation: self.generation,
        };
        self.fonts.push(Arc::new(font));
        self.names.insert(name.to_owned(), id);
        log::debug!("font \"{name}\" loaded as #{}", id.index);
        Ok(id)
    }

    pub fn find(&self, name: &str) -> Option<FontId> {
        self.names.get(name).copied()
    }

    pub fn get(&self, id: FontId) -> Option<Arc<fontdue::Font>> {
        if id.generation != self.generation {
            return None;
        }
        self.fonts.get(id.index).cloned()
    }

    /// Size of `text` laid out at `size` px, in logical pixels.
    ///
    /// An unknown id or empty text measures as zero wide and one line high.
    #[must_use]
    pub fn measure_text(&self, text: &str, id: FontId, size: f32, max_width: Option<f32>) -> Vec2 {
        use fontdue::layout::{CoordinateSystem, Layout, LayoutSettings, TextStyle};

        let line = size * 1.2;
        let Some(font) = self.get(id) else {
            return Vec2::new(0.0, line);
        };

        let mut layout: Layout<()> = Layout::new(CoordinateSystem::PositiveYDown);
        layout.reset(&LayoutSettings {
            max_width,
            ..LayoutSettings::default()
        });
        layout.append(&[font.as_ref()], &TextStyle::new(text, size, 0));

        let glyphs = layout.glyphs();
        if glyphs.is_empty() {
            return Vec2::new(0.0, line);
        }

        // Pen position after each glyph, not the bitmap edge, so the result
        // can be fed back as `max_width` without wrapping.
        let w = glyphs
            .iter()
            .map(|g| {
                let m = font.metrics_indexed(g.key.glyph_index, size);
                (g.x - m.xmin as f32 + m.advance_width).max(0.0)
            })
            .fold(0.0f32, f32::max);
        let h = glyphs
            .iter()
            .map(|g| g.y + g.height as f32)
            .fold(size, f32::max);
        Vec2::new(w, h)
    }

    pub fn len(&self) -> usize {
        self.fonts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Drops every font and invalidates all ids handed out so far.
    pub fn clear(&mut self) {
        let count = self.fonts.len();
        self.fonts.clear();
        self.names.clear();
        self.generation += 1;
        log::debug!("font cache cleared ({count} fonts, generation {})", self.generation);
    }
}

impl fmt::Debug for FontCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FontCache")
            .field("fonts", &self.fonts.len())
            .field("names", &self.names.keys().collect::<Vec<_>>())
            .field("generation", &self.generation)
            .finish()
    }
}
