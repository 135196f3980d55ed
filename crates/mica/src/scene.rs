//! Retained SVG scene graph
//!
//! The scene is the single live document every widget renders into. It is an
//! arena of elements addressed by [`ElementId`]; widgets own their ids and
//! mutate the scene directly from event handlers. Ordering is guaranteed by
//! synchronous call order only - the toolkit is single-threaded and handlers
//! run to completion (no locking, no preemption).

use std::collections::HashMap;

use glam::Vec2;

use crate::primitives::{Point, Rect};

/// Index of an element in the scene arena
///
/// Ids are never reused within a scene's lifetime; removed elements leave
/// tombstoned slots behind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementId(pub(crate) usize);

/// Paint/hit-test switch for an element subtree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Display {
    /// Painted and hit-testable
    Inline,
    /// Removed from paint and hit-testing entirely
    None,
}

struct Element {
    tag: String,
    attrs: HashMap<String, String>,
    text: Option<String>,
    children: Vec<ElementId>,
    parent: Option<ElementId>,
    display: Display,
    /// Local transform: translate then uniform scale
    translation: Vec2,
    scale: f32,
}

impl Element {
    fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attrs: HashMap::new(),
            text: None,
            children: Vec::new(),
            parent: None,
            display: Display::Inline,
            translation: Vec2::ZERO,
            scale: 1.0,
        }
    }
}

/// The live scene graph plus ambient viewport state (pan, zoom)
pub struct Scene {
    slots: Vec<Option<Element>>,
    root: ElementId,
    /// Camera-style pan offset applied to the whole scene
    pan: Vec2,
    /// Scene-wide zoom factor (1.0 = 100%)
    zoom: f32,
}

impl Scene {
    /// Create a scene with a single root `svg` element
    pub fn new() -> Self {
        let mut scene = Self {
            slots: Vec::new(),
            root: ElementId(0),
            pan: Vec2::ZERO,
            zoom: 1.0,
        };
        let root = scene.create("svg");
        scene.root = root;
        scene
    }

    /// The root element
    pub fn root(&self) -> ElementId {
        self.root
    }

    /// Create a detached element with the given tag
    pub fn create(&mut self, tag: impl Into<String>) -> ElementId {
        let id = ElementId(self.slots.len());
        self.slots.push(Some(Element::new(tag)));
        id
    }

    /// Create an element and append it under `parent`
    pub fn create_under(&mut self, parent: ElementId, tag: impl Into<String>) -> ElementId {
        let id = self.create(tag);
        self.append_child(parent, id);
        id
    }

    fn get(&self, id: ElementId) -> &Element {
        self.slots[id.0]
            .as_ref()
            .expect("element was removed from the scene")
    }

    fn get_mut(&mut self, id: ElementId) -> &mut Element {
        self.slots[id.0]
            .as_mut()
            .expect("element was removed from the scene")
    }

    /// Whether the id still refers to a live element
    pub fn is_alive(&self, id: ElementId) -> bool {
        self.slots.get(id.0).map(|s| s.is_some()).unwrap_or(false)
    }

    /// Tag name of an element
    pub fn tag(&self, id: ElementId) -> &str {
        &self.get(id).tag
    }

    /// Parent of an element, if attached
    pub fn parent(&self, id: ElementId) -> Option<ElementId> {
        self.get(id).parent
    }

    /// Child ids of an element, in paint order
    pub fn children(&self, id: ElementId) -> &[ElementId] {
        &self.get(id).children
    }

    /// Append `child` as the last child of `parent`, detaching it from any
    /// previous parent first
    pub fn append_child(&mut self, parent: ElementId, child: ElementId) {
        self.detach(child);
        self.get_mut(parent).children.push(child);
        self.get_mut(child).parent = Some(parent);
    }

    /// Move an element to the end of its parent's child list so it paints
    /// above all of its siblings (z-order via reinsertion)
    pub fn raise(&mut self, id: ElementId) {
        if let Some(parent) = self.get(id).parent {
            let children = &mut self.get_mut(parent).children;
            if let Some(pos) = children.iter().position(|c| *c == id) {
                children.remove(pos);
                children.push(id);
            }
        }
    }

    fn detach(&mut self, id: ElementId) {
        if let Some(parent) = self.get(id).parent {
            let children = &mut self.get_mut(parent).children;
            if let Some(pos) = children.iter().position(|c| *c == id) {
                children.remove(pos);
            }
            self.get_mut(id).parent = None;
        }
    }

    /// Detach an element and tombstone its entire subtree
    pub fn remove(&mut self, id: ElementId) {
        self.detach(id);
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            if let Some(Some(element)) = self.slots.get(next.0) {
                stack.extend(element.children.iter().copied());
            }
            self.slots[next.0] = None;
        }
    }

    // Attributes

    /// Set a string attribute
    pub fn set_attr(&mut self, id: ElementId, name: impl Into<String>, value: impl Into<String>) {
        self.get_mut(id).attrs.insert(name.into(), value.into());
    }

    /// Set a numeric attribute
    pub fn set_attr_f32(&mut self, id: ElementId, name: impl Into<String>, value: f32) {
        self.set_attr(id, name, format_number(value));
    }

    /// Get an attribute value, if present
    pub fn attr(&self, id: ElementId, name: &str) -> Option<&str> {
        self.get(id).attrs.get(name).map(String::as_str)
    }

    /// Get an attribute parsed as f32, if present and numeric
    pub fn attr_f32(&self, id: ElementId, name: &str) -> Option<f32> {
        self.attr(id, name).and_then(|v| v.trim().parse().ok())
    }

    /// Set the text content (for `text` elements)
    pub fn set_text(&mut self, id: ElementId, text: impl Into<String>) {
        self.get_mut(id).text = Some(text.into());
    }

    /// Text content, if any
    pub fn text(&self, id: ElementId) -> Option<&str> {
        self.get(id).text.as_deref()
    }

    // Display

    /// Flip the paint/hit-test switch for a subtree
    pub fn set_display(&mut self, id: ElementId, display: Display) {
        self.get_mut(id).display = display;
    }

    /// Current display state of an element
    pub fn display(&self, id: ElementId) -> Display {
        self.get(id).display
    }

    // Transforms

    /// Set the local translation
    pub fn set_translation(&mut self, id: ElementId, translation: Vec2) {
        self.get_mut(id).translation = translation;
    }

    /// Local translation of an element
    pub fn translation(&self, id: ElementId) -> Vec2 {
        self.get(id).translation
    }

    /// Set the local uniform scale
    pub fn set_scale(&mut self, id: ElementId, scale: f32) {
        self.get_mut(id).scale = scale;
    }

    /// Local uniform scale of an element
    pub fn scale(&self, id: ElementId) -> f32 {
        self.get(id).scale
    }

    // Viewport

    /// Set the camera-style pan offset
    pub fn set_pan(&mut self, pan: Vec2) {
        self.pan = pan;
    }

    /// Current pan offset
    pub fn pan(&self) -> Vec2 {
        self.pan
    }

    /// Set the scene-wide zoom factor
    pub fn set_zoom(&mut self, zoom: f32) {
        self.zoom = zoom.max(f32::EPSILON);
    }

    /// Current zoom factor
    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    /// Convert a global pointer coordinate into the local coordinate space
    /// of `id`
    ///
    /// Inverts the full chain: pan, zoom, and every ancestor's local
    /// transform from the root down to (and including) `id` itself.
    pub fn global_to_local(&self, id: ElementId, global: Point) -> Point {
        // Undo the viewport first
        let mut p = (global.to_vec2() - self.pan) / self.zoom;

        // Collect the ancestor chain root -> id
        let mut chain = vec![id];
        let mut current = id;
        while let Some(parent) = self.get(current).parent {
            chain.push(parent);
            current = parent;
        }

        // Walk it top-down, peeling one local transform per link
        for link in chain.into_iter().rev() {
            let element = self.get(link);
            p = (p - element.translation) / element.scale;
        }

        Point::from(p)
    }

    /// Bounding box of an element subtree in the element's own local space
    ///
    /// Unions the geometry of the element and all descendants with inline
    /// display, mapping each child box through the child's local transform.
    /// Returns `None` when the subtree carries no geometry.
    pub fn bounding_box(&self, id: ElementId) -> Option<Rect> {
        let element = self.get(id);
        let mut bbox = self.own_geometry(element);

        for &child in &element.children {
            let child_element = self.get(child);
            if child_element.display == Display::None {
                continue;
            }
            if let Some(child_box) = self.bounding_box(child) {
                let mapped = map_rect(child_box, child_element.translation, child_element.scale);
                bbox = Some(match bbox {
                    Some(b) => b.union(&mapped),
                    None => mapped,
                });
            }
        }

        bbox
    }

    /// Geometry contributed by the element itself, from its tag and attrs
    fn own_geometry(&self, element: &Element) -> Option<Rect> {
        let f = |name: &str| -> f32 {
            element
                .attrs
                .get(name)
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(0.0)
        };
        match element.tag.as_str() {
            "rect" | "image" => Some(Rect::from_min_size(
                [f("x"), f("y")],
                [f("width"), f("height")],
            )),
            "circle" => {
                let (cx, cy, r) = (f("cx"), f("cy"), f("r"));
                Some(Rect::new([cx - r, cy - r], [cx + r, cy + r]))
            }
            "ellipse" => {
                let (cx, cy, rx, ry) = (f("cx"), f("cy"), f("rx"), f("ry"));
                Some(Rect::new([cx - rx, cy - ry], [cx + rx, cy + ry]))
            }
            "line" => {
                let (x1, y1, x2, y2) = (f("x1"), f("y1"), f("x2"), f("y2"));
                Some(Rect::new(
                    [x1.min(x2), y1.min(y2)],
                    [x1.max(x2), y1.max(y2)],
                ))
            }
            "text" => {
                // No text shaping in the core: approximate with glyph-count
                // metrics, which is what hit regions and resize tweens need
                let font_size = element
                    .attrs
                    .get("font-size")
                    .and_then(|v| v.trim().parse().ok())
                    .unwrap_or(12.0);
                let len = element.text.as_deref().map(str::len).unwrap_or(0) as f32;
                let (x, y) = (f("x"), f("y"));
                Some(Rect::new(
                    [x, y - font_size],
                    [x + len * font_size * 0.6, y],
                ))
            }
            _ => None,
        }
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

/// Map a rect through a translate+scale transform
fn map_rect(rect: Rect, translation: Vec2, scale: f32) -> Rect {
    Rect {
        min: [
            rect.min[0] * scale + translation.x,
            rect.min[1] * scale + translation.y,
        ],
        max: [
            rect.max[0] * scale + translation.x,
            rect.max[1] * scale + translation.y,
        ],
    }
}

/// Format a number the way SVG attributes expect (no trailing `.0`)
pub(crate) fn format_number(value: f32) -> String {
    if value.fract() == 0.0 && value.abs() < 1e7 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}
