//! Texture loading and procedural placeholders
//!
//! Loading never fails from the game's point of view: any asset that cannot
//! be produced is replaced by a placeholder shape keyed by its logical name.

use std::collections::{BTreeMap, HashMap};
use std::f32::consts::TAU;
use std::path::{Path, PathBuf};

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::AssetError;

/// Static name -> URL list of the game's textures
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetManifest {
    entries: BTreeMap<String, String>,
}

impl Default for AssetManifest {
    fn default() -> Self {
        let entries = [
            ("rocket", "assets/rocket1.png"),
            ("ufo1", "assets/ufo1.png"),
            ("ufo2", "assets/ufo2.png"),
            ("bullet", "assets/bullet.png"),
            ("explosion", "assets/explosion.png"),
            ("bang", "assets/bang.jpg"),
        ]
        .into_iter()
        .map(|(name, url)| (name.to_string(), url.to_string()))
        .collect();
        Self { entries }
    }
}

impl AssetManifest {
    pub fn empty() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Add or replace an entry
    pub fn add(&mut self, name: impl Into<String>, url: impl Into<String>) {
        self.entries.insert(name.into(), url.into());
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, u)| (n.as_str(), u.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A decoded texture as far as the core cares: where it came from and how big it is
#[derive(Debug, Clone, PartialEq)]
pub struct Texture {
    pub url: String,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderShape {
    Triangle,
    Ellipse,
    Circle,
    Rect,
}

/// Procedural stand-in for a missing texture
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placeholder {
    pub shape: PlaceholderShape,
    /// 0xRRGGBB
    pub color: u32,
    pub size: Vec2,
}

impl Placeholder {
    /// Deterministic placeholder for a logical asset name
    pub fn for_name(name: &str) -> Self {
        let (shape, color, w, h) = match name {
            "rocket" => (PlaceholderShape::Triangle, 0x00ff00, 40.0, 40.0),
            "ufo1" | "ufo2" => (PlaceholderShape::Ellipse, 0xff0000, 40.0, 20.0),
            "bullet" => (PlaceholderShape::Circle, 0xffff00, 6.0, 6.0),
            "explosion" | "bang" => (PlaceholderShape::Circle, 0xff6600, 30.0, 30.0),
            "particle" => (PlaceholderShape::Circle, 0xffffff, 4.0, 4.0),
            _ => (PlaceholderShape::Rect, 0xff00ff, 32.0, 32.0),
        };
        Self {
            shape,
            color,
            size: Vec2::new(w, h),
        }
    }

    /// Outline polygon in local coordinates (origin at the top-left).
    /// `segments` only applies to round shapes.
    pub fn outline(&self, segments: usize) -> Vec<Vec2> {
        let Vec2 { x: w, y: h } = self.size;
        match self.shape {
            // Nose up
            PlaceholderShape::Triangle => vec![Vec2::new(w / 2.0, 0.0), Vec2::new(w, h), Vec2::new(0.0, h)],
            PlaceholderShape::Rect => vec![Vec2::ZERO, Vec2::new(w, 0.0), Vec2::new(w, h), Vec2::new(0.0, h)],
            PlaceholderShape::Ellipse | PlaceholderShape::Circle => {
                let segments = segments.max(3);
                let centre = self.size / 2.0;
                (0..segments)
                    .map(|i| {
                        let angle = i as f32 / segments as f32 * TAU;
                        centre + Vec2::new(angle.cos() * w / 2.0, angle.sin() * h / 2.0)
                    })
                    .collect()
            }
        }
    }

    /// Colour as normalized RGBA
    pub fn rgba(&self) -> [f32; 4] {
        let channel = |shift: u32| ((self.color >> shift) & 0xff) as f32 / 255.0;
        [channel(16), channel(8), channel(0), 1.0]
    }
}

/// What the renderer is asked to draw
#[derive(Debug, Clone, PartialEq)]
pub enum Drawable {
    Texture(Texture),
    Placeholder(Placeholder),
}

impl Drawable {
    /// Native pixel size
    pub fn size(&self) -> Vec2 {
        match self {
            Drawable::Texture(t) => Vec2::new(t.width as f32, t.height as f32),
            Drawable::Placeholder(p) => p.size,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, Drawable::Placeholder(_))
    }
}

/// Never fails: unknown or broken names yield a placeholder
pub trait TextureProvider {
    fn get(&self, name: &str) -> Drawable;
}

/// Where textures come from
pub trait AssetSource {
    fn fetch(&mut self, name: &str, url: &str) -> Result<Texture, AssetError>;
}

/// Reads image headers from disk, relative to a root directory
#[derive(Debug, Clone)]
pub struct FileSource {
    root: PathBuf,
}

impl FileSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl AssetSource for FileSource {
    fn fetch(&mut self, name: &str, url: &str) -> Result<Texture, AssetError> {
        let path = self.root.join(url);
        if !path.is_file() {
            return Err(AssetError::NotFound {
                name: name.to_string(),
                url: url.to_string(),
            });
        }
        let (width, height) = image::image_dimensions(&path).map_err(|e| AssetError::Decode {
            name: name.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Texture {
            url: url.to_string(),
            width,
            height,
        })
    }
}

/// Source with nothing in it; everything ends up as a placeholder
#[derive(Debug, Clone, Copy, Default)]
pub struct MissingSource;

impl AssetSource for MissingSource {
    fn fetch(&mut self, name: &str, url: &str) -> Result<Texture, AssetError> {
        Err(AssetError::NotFound {
            name: name.to_string(),
            url: url.to_string(),
        })
    }
}

type ProgressCallback = Box<dyn FnMut(usize, usize)>;
type CompleteCallback = Box<dyn FnOnce()>;

/// Loaded textures keyed by logical name
#[derive(Default)]
pub struct AssetLibrary {
    manifest: AssetManifest,
    textures: HashMap<String, Drawable>,
    loaded: usize,
    on_progress: Option<ProgressCallback>,
    on_complete: Option<CompleteCallback>,
}

impl AssetLibrary {
    pub fn new(manifest: AssetManifest) -> Self {
        Self {
            manifest,
            ..Default::default()
        }
    }

    /// Called with `(loaded, total)` after each asset, success or not
    pub fn on_progress(&mut self, callback: impl FnMut(usize, usize) + 'static) {
        self.on_progress = Some(Box::new(callback));
    }

    /// Called once, when every asset has been accounted for
    pub fn on_complete(&mut self, callback: impl FnOnce() + 'static) {
        self.on_complete = Some(Box::new(callback));
    }

    /// Load every manifest entry, substituting placeholders for failures
    pub fn load_all(&mut self, source: &mut dyn AssetSource) {
        let total = self.manifest.len();
        log::info!("Loading {} assets", total);
        self.loaded = 0;

        let entries: Vec<(String, String)> = self
            .manifest
            .iter()
            .map(|(n, u)| (n.to_string(), u.to_string()))
            .collect();

        for (name, url) in entries {
            let drawable = match source.fetch(&name, &url) {
                Ok(texture) => {
                    log::debug!("Loaded '{}' ({}x{})", name, texture.width, texture.height);
                    Drawable::Texture(texture)
                }
                Err(err) => {
                    log::warn!("{}, using placeholder", err);
                    Drawable::Placeholder(Placeholder::for_name(&name))
                }
            };
            self.textures.insert(name, drawable);
            self.loaded += 1;
            if let Some(progress) = self.on_progress.as_mut() {
                progress(self.loaded, total);
            }
        }

        self.finish();
    }

    fn finish(&mut self) {
        if let Some(complete) = self.on_complete.take() {
            log::info!("Assets ready");
            complete();
        }
    }

    /// Fraction of the manifest accounted for; 1.0 for an empty manifest
    pub fn progress(&self) -> f32 {
        let total = self.manifest.len();
        if total == 0 {
            1.0
        } else {
            (self.loaded.min(total)) as f32 / total as f32
        }
    }

    pub fn is_complete(&self) -> bool {
        self.loaded >= self.manifest.len()
    }

    pub fn manifest(&self) -> &AssetManifest {
        &self.manifest
    }
}

impl TextureProvider for AssetLibrary {
    fn get(&self, name: &str) -> Drawable {
        self.textures
            .get(name)
            .cloned()
            .unwrap_or_else(|| Drawable::Placeholder(Placeholder::for_name(name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Serves a fixed set of names
    struct FakeSource(Vec<&'static str>);

    impl AssetSource for FakeSource {
        fn fetch(&mut self, name: &str, url: &str) -> Result<Texture, AssetError> {
            if self.0.contains(&name) {
                Ok(Texture {
                    url: url.to_string(),
                    width: 64,
                    height: 32,
                })
            } else {
                Err(AssetError::Decode {
                    name: name.to_string(),
                    reason: "corrupt".to_string(),
                })
            }
        }
    }

    #[test]
    fn test_placeholder_table() {
        let rocket = Placeholder::for_name("rocket");
        assert_eq!(rocket.shape, PlaceholderShape::Triangle);
        assert_eq!(rocket.color, 0x00ff00);
        assert_eq!(rocket.size, Vec2::new(40.0, 40.0));

        assert_eq!(Placeholder::for_name("ufo2").size, Vec2::new(40.0, 20.0));
        assert_eq!(Placeholder::for_name("bang").color, 0xff6600);
        assert_eq!(Placeholder::for_name("bullet").shape, PlaceholderShape::Circle);

        let unknown = Placeholder::for_name("nope");
        assert_eq!(unknown.shape, PlaceholderShape::Rect);
        assert_eq!(unknown.color, 0xff00ff);
        assert_eq!(unknown.size, Vec2::new(32.0, 32.0));
    }

    #[test]
    fn test_outline_stays_in_box() {
        let ufo = Placeholder::for_name("ufo1");
        let points = ufo.outline(16);
        assert_eq!(points.len(), 16);
        for p in points {
            assert!(p.x >= -1e-4 && p.x <= 40.0 + 1e-4);
            assert!(p.y >= -1e-4 && p.y <= 20.0 + 1e-4);
        }
        assert_eq!(Placeholder::for_name("rocket").outline(16).len(), 3);
    }

    #[test]
    fn test_rgba() {
        assert_eq!(Placeholder::for_name("ufo1").rgba(), [1.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_load_all_substitutes_failures() {
        let mut library = AssetLibrary::new(AssetManifest::default());
        let mut source = FakeSource(vec!["rocket", "bullet"]);
        library.load_all(&mut source);

        assert!(library.is_complete());
        assert_eq!(library.progress(), 1.0);
        assert!(!library.get("rocket").is_placeholder());
        assert_eq!(library.get("rocket").size(), Vec2::new(64.0, 32.0));
        assert_eq!(
            library.get("bang"),
            Drawable::Placeholder(Placeholder::for_name("bang"))
        );
        // Never registered at all
        assert_eq!(library.get("particle").size(), Vec2::new(4.0, 4.0));
    }

    #[test]
    fn test_progress_and_completion_callbacks() {
        let progress = Rc::new(RefCell::new(Vec::new()));
        let completions = Rc::new(RefCell::new(0));

        let mut library = AssetLibrary::new(AssetManifest::default());
        let p = Rc::clone(&progress);
        library.on_progress(move |loaded, total| p.borrow_mut().push((loaded, total)));
        let c = Rc::clone(&completions);
        library.on_complete(move || *c.borrow_mut() += 1);

        assert_eq!(library.progress(), 0.0);
        library.load_all(&mut MissingSource);
        library.load_all(&mut MissingSource);

        assert_eq!(progress.borrow().len(), 12);
        assert_eq!(progress.borrow()[..6], [(1, 6), (2, 6), (3, 6), (4, 6), (5, 6), (6, 6)]);
        assert_eq!(*completions.borrow(), 1);
        assert_eq!(library.progress(), 1.0);
    }

    #[test]
    fn test_empty_manifest() {
        let completions = Rc::new(RefCell::new(0));
        let mut library = AssetLibrary::new(AssetManifest::empty());
        let c = Rc::clone(&completions);
        library.on_complete(move || *c.borrow_mut() += 1);

        assert_eq!(library.progress(), 1.0);
        library.load_all(&mut MissingSource);
        assert_eq!(*completions.borrow(), 1);
    }

    #[test]
    fn test_file_source_missing_file() {
        let mut source = FileSource::new("/nonexistent-kosmos-assets");
        let err = source.fetch("rocket", "assets/rocket1.png").unwrap_err();
        assert!(matches!(err, AssetError::NotFound { .. }));
    }

    #[test]
    fn test_manifest_json() {
        let manifest: AssetManifest =
            serde_json::from_str(r#"{"rocket": "ships/r.png"}"#).unwrap();
        assert_eq!(manifest.len(), 1);
        assert_eq!(manifest.iter().next(), Some(("rocket", "ships/r.png")));
    }
}
