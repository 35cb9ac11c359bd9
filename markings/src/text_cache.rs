//! Shared registry of text textures. Identical texts reuse the same texture,
//! which is destroyed when the last user releases it.

use common::FastMap;
use ordered_float::OrderedFloat;
use slotmapd::{new_key_type, SlotMap};
use std::cmp::Ordering;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Mutex, MutexGuard};

new_key_type! {
    pub struct TextureID;
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TextKey {
    pub font: String,
    pub text: String,
    pub scale: OrderedFloat<f32>,
    pub spacing: OrderedFloat<f32>,
}

impl TextKey {
    pub fn new(font: &str, text: &str, scale: f32, spacing: f32) -> Self {
        Self {
            font: font.to_string(),
            text: text.to_string(),
            scale: OrderedFloat(scale),
            spacing: OrderedFloat(spacing),
        }
    }
}

/// Size of a rendered text bitmap, in pixels
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TextExtent {
    pub width: u32,
    pub height: u32,
}

/// Rasterizes texts. The bitmap itself stays with the implementor.
pub trait TextRenderer: Send + Sync {
    fn render(&self, key: &TextKey) -> TextExtent;
    fn destroy(&self, _key: &TextKey) {}
}

/// Monospace approximation, every glyph is `advance` pixels wide
pub struct FixedAdvanceRenderer {
    pub advance: u32,
    pub line_height: u32,
}

impl Default for FixedAdvanceRenderer {
    fn default() -> Self {
        Self {
            advance: 40,
            line_height: 64,
        }
    }
}

impl TextRenderer for FixedAdvanceRenderer {
    fn render(&self, key: &TextKey) -> TextExtent {
        let n = key.text.chars().count() as u32;
        let spacing = key.spacing.0.max(0.0).round() as u32;
        TextExtent {
            width: n * self.advance + n.saturating_sub(1) * spacing,
            height: self.line_height,
        }
    }
}

struct TextTexture {
    key: TextKey,
    extent: TextExtent,
    refs: u32,
}

#[derive(Default)]
struct Registry {
    textures: SlotMap<TextureID, TextTexture>,
    by_key: FastMap<TextKey, TextureID>,
}

struct Shared {
    registry: Mutex<Registry>,
    renderer: Box<dyn TextRenderer>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Registry> {
        // a panic while holding the lock leaves the maps consistent
        self.registry
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn add_ref(&self, id: TextureID) {
        if let Some(t) = self.lock().textures.get_mut(id) {
            t.refs += 1;
        }
    }

    fn release(&self, id: TextureID) -> bool {
        let mut reg = self.lock();
        let Some(t) = reg.textures.get_mut(id) else {
            log::warn!("releasing unknown text texture {:?}", id);
            return false;
        };
        t.refs = t.refs.saturating_sub(1);
        if t.refs > 0 {
            return true;
        }
        // Unwrap ok: just checked above
        let t = reg.textures.remove(id).unwrap();
        reg.by_key.remove(&t.key);
        drop(reg);
        log::debug!("destroying text texture {:?} for {:?}", id, t.key.text);
        self.renderer.destroy(&t.key);
        true
    }
}

/// Reference counted text texture registry.
/// Cloning it gives another handle to the same registry.
#[derive(Clone)]
pub struct TextCache {
    shared: Arc<Shared>,
}

impl Default for TextCache {
    fn default() -> Self {
        Self::new(FixedAdvanceRenderer::default())
    }
}

impl TextCache {
    pub fn new(renderer: impl TextRenderer + 'static) -> Self {
        Self {
            shared: Arc::new(Shared {
                registry: Mutex::new(Registry::default()),
                renderer: Box::new(renderer),
            }),
        }
    }

    /// Returns a handle to the texture for this key, creating it on first use
    pub fn acquire(&self, key: TextKey) -> TextureHandle {
        let (id, extent) = self.acquire_id(key);
        TextureHandle {
            id,
            extent,
            shared: self.shared.clone(),
        }
    }

    /// Like `acquire` but the caller must call `release` itself
    pub fn acquire_id(&self, key: TextKey) -> (TextureID, TextExtent) {
        let mut reg = self.shared.lock();
        if let Some(&id) = reg.by_key.get(&key) {
            if let Some(t) = reg.textures.get_mut(id) {
                t.refs += 1;
                return (id, t.extent);
            }
        }
        let extent = self.shared.renderer.render(&key);
        let id = reg.textures.insert(TextTexture {
            key: key.clone(),
            extent,
            refs: 1,
        });
        reg.by_key.insert(key, id);
        (id, extent)
    }

    /// Releases one reference. Unknown or already destroyed ids are ignored and return false.
    pub fn release(&self, id: TextureID) -> bool {
        self.shared.release(id)
    }

    pub fn ref_count(&self, id: TextureID) -> u32 {
        self.shared.lock().textures.get(id).map(|t| t.refs).unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.shared.lock().textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Owned reference to a text texture
pub struct TextureHandle {
    id: TextureID,
    extent: TextExtent,
    shared: Arc<Shared>,
}

impl TextureHandle {
    pub fn id(&self) -> TextureID {
        self.id
    }

    pub fn extent(&self) -> TextExtent {
        self.extent
    }
}

impl Clone for TextureHandle {
    fn clone(&self) -> Self {
        self.shared.add_ref(self.id);
        Self {
            id: self.id,
            extent: self.extent,
            shared: self.shared.clone(),
        }
    }
}

impl Drop for TextureHandle {
    fn drop(&mut self) {
        self.shared.release(self.id);
    }
}

impl std::fmt::Debug for TextureHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextureHandle")
            .field("id", &self.id)
            .field("extent", &self.extent)
            .finish()
    }
}

impl PartialEq for TextureHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TextureHandle {}

impl PartialOrd for TextureHandle {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TextureHandle {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

impl Hash for TextureHandle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_and_released() {
        let cache = TextCache::default();
        let key = TextKey::new("Arial", "STOP", 1.0, 0.0);

        let a = cache.acquire(key.clone());
        let b = cache.acquire(key.clone());
        assert_eq!(a.id(), b.id());
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.ref_count(a.id()), 2);
        assert_eq!(a.extent().width, 160);

        let c = b.clone();
        assert_eq!(cache.ref_count(a.id()), 3);
        drop(b);
        drop(c);
        assert_eq!(cache.ref_count(a.id()), 1);

        let id = a.id();
        drop(a);
        assert!(cache.is_empty());
        assert!(!cache.release(id));
    }

    #[test]
    fn test_release_never_acquired() {
        let cache = TextCache::default();
        assert!(!cache.release(TextureID::default()));

        let (id, _) = cache.acquire_id(TextKey::new("Arial", "BUS", 1.0, 2.0));
        assert!(cache.release(id));
        assert!(!cache.release(id));
        assert!(cache.is_empty());
    }
}
