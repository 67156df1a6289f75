//! Watermark compositor for stacking overlays onto PDF pages.
//!
//! The compositor registers the shared objects once per document (font,
//! transparency state and the `q`/`Q` bracket streams) and then, page by
//! page:
//!
//! 1. copies the page's effective `Resources` (inherited ones included) onto
//!    the page and adds the watermark font and graphics state under names
//!    that do not collide with existing entries;
//! 2. rewrites `Contents` as `[q, original..., Q, overlay]`, so the original
//!    content keeps its look and the overlay is drawn on top of it with a
//!    clean graphics state.
//!
//! # Example
//!
//! ```ignore
//! let compositor = Compositor::install(&mut doc, &style);
//! let names = compositor.prepare_page(&mut doc, page_id)?;
//! let overlay = render_text(&options_using(&names), &page, &positions)?;
//! compositor.attach_overlay(&mut doc, page_id, overlay)?;
//! ```

use super::position::{PageDimensions, MAX_PAGE_EXTENT};
use super::StyleConfig;
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};

/// Guard against cyclic `Parent` chains in malformed documents.
const MAX_INHERITANCE_DEPTH: usize = 64;

const FONT_PREFIX: &str = "DmF";
const GRAPHICS_STATE_PREFIX: &str = "DmGS";

/// Resource names chosen for one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageResources {
    pub font: String,
    pub graphics_state: String,
}

/// Document-wide objects shared by every page overlay.
#[derive(Debug, Clone, Copy)]
pub struct Compositor {
    font_id: ObjectId,
    graphics_state_id: ObjectId,
    save_id: ObjectId,
    restore_id: ObjectId,
}

impl Compositor {
    /// Register the shared overlay objects in `doc`.
    pub fn install(doc: &mut Document, style: &StyleConfig) -> Self {
        let mut font = dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => Object::Name(style.font.as_bytes().to_vec()),
        };
        // Symbolic fonts carry their own built-in encoding.
        if style.font != "Symbol" && style.font != "ZapfDingbats" {
            font.set("Encoding", "WinAnsiEncoding");
        }
        let font_id = doc.add_object(font);

        let graphics_state_id = doc.add_object(dictionary! {
            "Type" => "ExtGState",
            "ca" => Object::Real(style.opacity),
            "CA" => Object::Real(style.opacity),
        });

        let save_id = doc.add_object(Stream::new(Dictionary::new(), b"q\n".to_vec()));
        let restore_id = doc.add_object(Stream::new(Dictionary::new(), b"\nQ\n".to_vec()));

        Self {
            font_id,
            graphics_state_id,
            save_id,
            restore_id,
        }
    }

    /// Give the page its own resource dictionary containing the watermark
    /// font and graphics state, and return the names they were bound to.
    pub fn prepare_page(
        &self,
        doc: &mut Document,
        page_id: ObjectId,
    ) -> Result<PageResources, String> {
        let mut resources = match inherited_attribute(doc, page_id, b"Resources")? {
            Some(obj) => resolve(doc, &obj)?
                .as_dict()
                .map_err(|e| format!("Resources is not a dictionary: {}", e))?
                .clone(),
            None => Dictionary::new(),
        };

        let mut fonts = sub_dictionary(doc, &resources, b"Font")?;
        let font = unique_name(&fonts, FONT_PREFIX);
        fonts.set(font.clone(), Object::Reference(self.font_id));
        resources.set("Font", Object::Dictionary(fonts));

        let mut states = sub_dictionary(doc, &resources, b"ExtGState")?;
        let graphics_state = unique_name(&states, GRAPHICS_STATE_PREFIX);
        states.set(
            graphics_state.clone(),
            Object::Reference(self.graphics_state_id),
        );
        resources.set("ExtGState", Object::Dictionary(states));

        page_dictionary_mut(doc, page_id)?.set("Resources", Object::Dictionary(resources));

        Ok(PageResources {
            font,
            graphics_state,
        })
    }

    /// Append `overlay` on top of the page's existing content.
    pub fn attach_overlay(
        &self,
        doc: &mut Document,
        page_id: ObjectId,
        overlay: Vec<u8>,
    ) -> Result<(), String> {
        let original = original_contents(doc, page_id)?;
        let overlay_id = doc.add_object(Stream::new(Dictionary::new(), overlay));

        let mut contents = Vec::with_capacity(original.len() + 3);
        contents.push(Object::Reference(self.save_id));
        contents.extend(original);
        contents.push(Object::Reference(self.restore_id));
        contents.push(Object::Reference(overlay_id));

        page_dictionary_mut(doc, page_id)?.set("Contents", Object::Array(contents));
        Ok(())
    }
}

/// Read the page size from its (possibly inherited) MediaBox.
pub fn page_dimensions(doc: &Document, page_id: ObjectId) -> Result<PageDimensions, String> {
    let media_box = inherited_attribute(doc, page_id, b"MediaBox")?
        .ok_or_else(|| "page has no MediaBox".to_string())?;
    let values = resolve(doc, &media_box)?
        .as_array()
        .map_err(|e| format!("MediaBox is not an array: {}", e))?;

    if values.len() != 4 {
        return Err(format!(
            "MediaBox must have 4 entries, got {}",
            values.len()
        ));
    }

    let mut corners = [0.0f64; 4];
    for (slot, value) in corners.iter_mut().zip(values) {
        *slot = number(resolve(doc, value)?)
            .ok_or_else(|| "MediaBox contains a non-numeric entry".to_string())?;
    }

    let dims = PageDimensions::from_media_box(corners);
    if !dims.is_valid() {
        return Err(format!(
            "page has degenerate size {} x {}",
            dims.width, dims.height
        ));
    }
    if dims.width > MAX_PAGE_EXTENT || dims.height > MAX_PAGE_EXTENT {
        return Err(format!(
            "page size {} x {} exceeds the {}pt limit",
            dims.width, dims.height, MAX_PAGE_EXTENT
        ));
    }
    Ok(dims)
}

/// Look up `key` on the page, walking up the `Parent` chain for inheritable
/// attributes.
fn inherited_attribute(
    doc: &Document,
    page_id: ObjectId,
    key: &[u8],
) -> Result<Option<Object>, String> {
    let mut current = doc.get_dictionary(page_id).map_err(|e| e.to_string())?;

    for _ in 0..MAX_INHERITANCE_DEPTH {
        if let Ok(value) = current.get(key) {
            return Ok(Some(value.clone()));
        }
        match current.get(b"Parent").and_then(Object::as_reference) {
            Ok(parent) => current = doc.get_dictionary(parent).map_err(|e| e.to_string())?,
            Err(_) => return Ok(None),
        }
    }

    Err("page tree is nested too deeply".to_string())
}

fn resolve<'a>(doc: &'a Document, object: &'a Object) -> Result<&'a Object, String> {
    match object {
        Object::Reference(id) => doc.get_object(*id).map_err(|e| e.to_string()),
        other => Ok(other),
    }
}

fn number(object: &Object) -> Option<f64> {
    match object {
        Object::Integer(v) => Some(*v as f64),
        Object::Real(v) => Some(*v as f64),
        _ => None,
    }
}

fn sub_dictionary(doc: &Document, parent: &Dictionary, key: &[u8]) -> Result<Dictionary, String> {
    match parent.get(key) {
        Ok(obj) => resolve(doc, obj)?
            .as_dict()
            .cloned()
            .map_err(|e| format!("{} is not a dictionary: {}", String::from_utf8_lossy(key), e)),
        Err(_) => Ok(Dictionary::new()),
    }
}

fn unique_name(existing: &Dictionary, prefix: &str) -> String {
    (1..)
        .map(|n| format!("{}{}", prefix, n))
        .find(|name| !existing.has(name.as_bytes()))
        .unwrap_or_else(|| prefix.to_string())
}

fn original_contents(doc: &Document, page_id: ObjectId) -> Result<Vec<Object>, String> {
    let page = doc.get_dictionary(page_id).map_err(|e| e.to_string())?;

    match page.get(b"Contents") {
        Err(_) => Ok(Vec::new()),
        Ok(Object::Array(items)) => Ok(items.clone()),
        Ok(Object::Reference(id)) => match doc.get_object(*id).map_err(|e| e.to_string())? {
            // An indirect array of streams
            Object::Array(items) => Ok(items.clone()),
            Object::Stream(_) => Ok(vec![Object::Reference(*id)]),
            _ => Err("Contents reference does not point to a stream".to_string()),
        },
        Ok(_) => Err("Contents must be a stream reference or an array".to_string()),
    }
}

fn page_dictionary_mut(doc: &mut Document, page_id: ObjectId) -> Result<&mut Dictionary, String> {
    doc.get_object_mut(page_id)
        .and_then(Object::as_dict_mut)
        .map_err(|e| e.to_string())
}
