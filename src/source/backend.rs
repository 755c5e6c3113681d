//! [`TextSource`] backed by `lopdf`.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

use lopdf::{Dictionary, Document as LopdfDocument, Object, ObjectId};

use super::content::ContentScanner;
use super::text::decode_pdf_string;
use super::{Destination, OutlineNode, TextSource};
use crate::detect;
use crate::error::{Error, Result};
use crate::model::TextRun;

/// Name trees deeper than this are treated as malformed.
const MAX_NAME_TREE_DEPTH: usize = 32;

/// A loaded PDF document.
pub struct LopdfSource {
    doc: LopdfDocument,
    pages: BTreeMap<u32, ObjectId>,
}

impl LopdfSource {
    /// Load from a file path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        detect::check_file(path)?;
        let doc = LopdfDocument::load(path)?;
        Self::from_document(doc)
    }

    /// Load from an in-memory byte slice.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        detect::check_bytes(data)?;
        let doc = LopdfDocument::load_mem(data)?;
        Self::from_document(doc)
    }

    /// Wrap an already loaded document.
    pub fn from_document(doc: LopdfDocument) -> Result<Self> {
        if doc.is_encrypted() {
            return Err(Error::Encrypted);
        }
        let pages = doc.get_pages();
        Ok(Self { doc, pages })
    }

    /// PDF version string from the header.
    pub fn version(&self) -> String {
        self.doc.version.to_string()
    }

    fn page_id(&self, page: u32) -> Result<ObjectId> {
        self.pages
            .get(&page)
            .copied()
            .ok_or(Error::PageOutOfRange(page, self.pages.len() as u32))
    }

    /// Follow an indirect reference, if any.
    fn resolve<'a>(&'a self, obj: &'a Object) -> Result<&'a Object> {
        match obj {
            Object::Reference(id) => Ok(self.doc.get_object(*id)?),
            other => Ok(other),
        }
    }

    fn resolve_dict<'a>(&'a self, obj: &'a Object) -> Option<&'a Dictionary> {
        self.resolve(obj).ok().and_then(|o| o.as_dict().ok())
    }

    /// Decompressed content stream of a page, concatenating arrays.
    fn page_content(&self, page_id: ObjectId) -> Result<Vec<u8>> {
        let page_dict = self.doc.get_dictionary(page_id)?;
        let contents = match page_dict.get(b"Contents") {
            Ok(contents) => contents,
            // A page without content is blank, not broken
            Err(_) => return Ok(Vec::new()),
        };

        let stream_data = |obj: &Object| -> Result<Vec<u8>> {
            let stream = match self.resolve(obj)? {
                Object::Stream(s) => s,
                _ => return Err(Error::TextExtract("content is not a stream".to_string())),
            };
            if stream.dict.get(b"Filter").is_err() {
                return Ok(stream.content.clone());
            }

            let decoded = stream.decompressed_content().map_err(|e| {
                Error::TextExtract(format!("cannot decode content stream: {}", e))
            })?;
            // lopdf reports corrupt flate data as an empty result
            if decoded.is_empty() && !stream.content.is_empty() {
                return Err(Error::TextExtract(format!(
                    "content stream of {} bytes decoded to nothing",
                    stream.content.len()
                )));
            }
            Ok(decoded)
        };

        match self.resolve(contents)? {
            Object::Array(parts) => {
                let mut content = Vec::new();
                for part in parts {
                    content.extend_from_slice(&stream_data(part)?);
                    content.push(b'\n');
                }
                Ok(content)
            }
            _ => stream_data(contents),
        }
    }

    fn read_outline_items(
        &self,
        first: &Object,
        visited: &mut HashSet<ObjectId>,
    ) -> Vec<OutlineNode> {
        let mut items = Vec::new();
        let mut next = first.as_reference().ok();

        while let Some(id) = next {
            if !visited.insert(id) {
                log::warn!("Outline item {:?} visited twice, stopping", id);
                break;
            }
            let Ok(dict) = self.doc.get_dictionary(id) else {
                break;
            };

            let title = dict
                .get(b"Title")
                .ok()
                .and_then(|t| self.resolve(t).ok())
                .and_then(|t| t.as_str().ok())
                .map(decode_pdf_string)
                .unwrap_or_default();

            let children = match dict.get(b"First") {
                Ok(first_child) => self.read_outline_items(first_child, visited),
                Err(_) => Vec::new(),
            };

            let destination = self.item_destination(dict);
            items.push(OutlineNode::new(title, destination).with_children(children));
            next = dict.get(b"Next").ok().and_then(|n| n.as_reference().ok());
        }

        items
    }

    /// Destination of an outline item: `/Dest`, or the `/D` of a GoTo action.
    fn item_destination(&self, item: &Dictionary) -> Option<Destination> {
        if let Ok(dest) = item.get(b"Dest") {
            return self.parse_destination(dest);
        }
        let action = item.get(b"A").ok().and_then(|a| self.resolve_dict(a))?;
        let is_goto = action
            .get(b"S")
            .ok()
            .and_then(|s| s.as_name().ok())
            .map_or(true, |s| s == b"GoTo");
        if !is_goto {
            return None;
        }
        self.parse_destination(action.get(b"D").ok()?)
    }

    fn parse_destination(&self, obj: &Object) -> Option<Destination> {
        match self.resolve(obj).ok()? {
            Object::Array(parts) => match parts.first()? {
                Object::Reference((num, generation)) => {
                    Some(Destination::PageRef(*num, *generation))
                }
                Object::Integer(index) => u32::try_from(*index).ok().map(Destination::PageIndex),
                _ => None,
            },
            Object::Name(name) => Some(Destination::Named(name.clone())),
            Object::String(bytes, _) => Some(Destination::Named(bytes.clone())),
            // Destination dictionaries wrap the array in /D
            Object::Dictionary(dict) => self.parse_destination(dict.get(b"D").ok()?),
            _ => None,
        }
    }

    /// Look up a named destination in `/Dests` or the `/Names /Dests` tree.
    fn lookup_named(&self, name: &[u8]) -> Option<&Object> {
        let catalog = self.doc.catalog().ok()?;

        if let Some(dests) = catalog.get(b"Dests").ok().and_then(|d| self.resolve_dict(d)) {
            if let Ok(found) = dests.get(name) {
                return Some(found);
            }
        }

        let names = catalog
            .get(b"Names")
            .ok()
            .and_then(|n| self.resolve_dict(n))?;
        let tree = names.get(b"Dests").ok().and_then(|d| self.resolve_dict(d))?;
        self.search_name_tree(tree, name, 0)
    }

    fn search_name_tree<'a>(
        &'a self,
        node: &'a Dictionary,
        name: &[u8],
        depth: usize,
    ) -> Option<&'a Object> {
        if depth > MAX_NAME_TREE_DEPTH {
            return None;
        }

        if let Some(pairs) = node
            .get(b"Names")
            .ok()
            .and_then(|n| self.resolve(n).ok())
            .and_then(|n| n.as_array().ok())
        {
            for pair in pairs.chunks_exact(2) {
                if let Some(key) = self.resolve(&pair[0]).ok().and_then(|k| k.as_str().ok()) {
                    if key == name {
                        return Some(&pair[1]);
                    }
                }
            }
        }

        let kids = node
            .get(b"Kids")
            .ok()
            .and_then(|k| self.resolve(k).ok())
            .and_then(|k| k.as_array().ok())?;
        kids.iter()
            .filter_map(|kid| self.resolve_dict(kid))
            .find_map(|kid| self.search_name_tree(kid, name, depth + 1))
    }
}

impl TextSource for LopdfSource {
    fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    fn page_runs(&self, page: u32) -> Result<Vec<TextRun>> {
        let page_id = self.page_id(page)?;
        let content = self.page_content(page_id)?;
        if content.is_empty() {
            return Ok(Vec::new());
        }

        let operations = lopdf::content::Content::decode(&content)
            .map_err(|e| Error::TextExtract(format!("page {}: {}", page, e)))?
            .operations;

        let fonts = self.doc.get_page_fonts(page_id).unwrap_or_default();
        let mut encodings = HashMap::new();
        for (name, font) in &fonts {
            match font.get_font_encoding(&self.doc) {
                Ok(encoding) => {
                    encodings.insert(name.clone(), encoding);
                }
                Err(e) => log::debug!("No encoding for font {:?}: {}", name, e),
            }
        }

        let runs = ContentScanner::new(page).scan(&operations, |font, bytes| {
            encodings
                .get(font)
                .and_then(|enc| LopdfDocument::decode_text(enc, bytes).ok())
                .unwrap_or_else(|| decode_pdf_string(bytes))
        });
        Ok(runs)
    }

    fn outline(&self) -> Result<Vec<OutlineNode>> {
        let catalog = self.doc.catalog()?;
        let Some(root) = catalog.get(b"Outlines").ok().and_then(|o| self.resolve_dict(o)) else {
            return Ok(Vec::new());
        };
        let Ok(first) = root.get(b"First") else {
            return Ok(Vec::new());
        };
        let mut visited = HashSet::new();
        Ok(self.read_outline_items(first, &mut visited))
    }

    fn resolve_destination(&self, destination: &Destination) -> Result<u32> {
        match destination {
            Destination::PageRef(num, generation) => self
                .pages
                .iter()
                .find(|(_, id)| **id == (*num, *generation))
                .map(|(page, _)| *page)
                .ok_or_else(|| {
                    Error::PdfParse(format!(
                        "{} {} R is not a page of this document",
                        num, generation
                    ))
                }),
            Destination::PageIndex(index) => {
                let page = index + 1;
                if self.pages.contains_key(&page) {
                    Ok(page)
                } else {
                    Err(Error::PageOutOfRange(page, self.page_count()))
                }
            }
            Destination::Named(name) => {
                let target = self.lookup_named(name).ok_or_else(|| {
                    Error::PdfParse(format!(
                        "named destination '{}' not found",
                        String::from_utf8_lossy(name)
                    ))
                })?;
                match self.parse_destination(target) {
                    Some(Destination::Named(_)) | None => Err(Error::PdfParse(format!(
                        "named destination '{}' does not point to a page",
                        String::from_utf8_lossy(name)
                    ))),
                    Some(explicit) => self.resolve_destination(&explicit),
                }
            }
        }
    }
}
