//! [`DocumentEngine`] backed by lopdf
//!
//! Pages are copied into a fresh document rather than deleting the unwanted
//! ones from a clone of the source, so nothing unreachable from the selected
//! pages (outlines, form trees, other pages) survives into the output.

use crate::engine::DocumentEngine;
use crate::error::EngineError;
use crate::page_info::DocumentDetails;
use lopdf::{Dictionary, Document, Object, ObjectId};
use std::collections::{BTreeSet, HashMap};
use std::rc::Rc;

/// Page attributes a page may inherit from its ancestors in the page tree
const INHERITABLE_KEYS: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Guard against cyclic `Parent` chains in malformed files
const MAX_TREE_DEPTH: usize = 64;

#[derive(Debug, Clone)]
pub struct LopdfEngine {
    compress: bool,
}

impl LopdfEngine {
    pub fn new(compress: bool) -> Self {
        Self { compress }
    }
}

impl Default for LopdfEngine {
    fn default() -> Self {
        Self::new(true)
    }
}

/// Parsed source with its page objects in page order
pub struct SourceDocument {
    doc: Rc<Document>,
    page_ids: Rc<Vec<ObjectId>>,
}

/// A page dictionary detached from its source page tree
pub struct CopiedPage {
    source_id: ObjectId,
    dictionary: Dictionary,
    source: Rc<Document>,
    source_pages: Rc<BTreeSet<ObjectId>>,
    /// Source pages that will all end up in the same output
    selected: Rc<BTreeSet<ObjectId>>,
}

/// Destination document under construction
pub struct OutputDocument {
    doc: Document,
    pages_id: ObjectId,
    kids: Vec<Object>,
    /// Source object id -> destination object id
    imported: HashMap<ObjectId, ObjectId>,
}

impl OutputDocument {
    /// Re-home `obj` into this document, queueing any newly referenced
    /// source objects on `pending`
    fn remap(&mut self, obj: &Object, page: &CopiedPage, pending: &mut Vec<ObjectId>) -> Object {
        match obj {
            Object::Reference(id) => {
                if let Some(&new_id) = self.imported.get(id) {
                    return Object::Reference(new_id);
                }
                // A selected page not appended yet; append_page fills the slot
                if page.selected.contains(id) {
                    let new_id = self.doc.new_object_id();
                    self.imported.insert(*id, new_id);
                    return Object::Reference(new_id);
                }
                // Links to pages that are not part of the output
                if page.source_pages.contains(id) || !page.source.objects.contains_key(id) {
                    return Object::Null;
                }
                let new_id = self.doc.new_object_id();
                self.imported.insert(*id, new_id);
                pending.push(*id);
                Object::Reference(new_id)
            }
            Object::Array(items) => Object::Array(
                items
                    .iter()
                    .map(|item| self.remap(item, page, pending))
                    .collect(),
            ),
            Object::Dictionary(dict) => Object::Dictionary(self.remap_dict(dict, page, pending)),
            Object::Stream(stream) => {
                let mut stream = stream.clone();
                stream.dict = self.remap_dict(&stream.dict, page, pending);
                Object::Stream(stream)
            }
            other => other.clone(),
        }
    }

    fn remap_dict(
        &mut self,
        dict: &Dictionary,
        page: &CopiedPage,
        pending: &mut Vec<ObjectId>,
    ) -> Dictionary {
        let mut remapped = Dictionary::new();
        for (key, value) in dict.iter() {
            remapped.set(key.clone(), self.remap(value, page, pending));
        }
        remapped
    }
}

impl DocumentEngine for LopdfEngine {
    type Source = SourceDocument;
    type Page = CopiedPage;
    type Output = OutputDocument;

    fn open(&self, bytes: &[u8]) -> Result<SourceDocument, EngineError> {
        let doc = Document::load_mem(bytes).map_err(|e| EngineError::Parse(e.to_string()))?;
        let page_ids = doc.get_pages().values().copied().collect();
        Ok(SourceDocument {
            doc: Rc::new(doc),
            page_ids: Rc::new(page_ids),
        })
    }

    fn page_count(&self, source: &SourceDocument) -> u32 {
        source.page_ids.len() as u32
    }

    fn details(&self, source: &SourceDocument) -> DocumentDetails {
        DocumentDetails::from_document(&source.doc)
    }

    fn create(&self) -> OutputDocument {
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();
        OutputDocument {
            doc,
            pages_id,
            kids: Vec::new(),
            imported: HashMap::new(),
        }
    }

    fn copy_pages(
        &self,
        source: &SourceDocument,
        indices: &[u32],
    ) -> Result<Vec<CopiedPage>, EngineError> {
        let source_pages: Rc<BTreeSet<ObjectId>> =
            Rc::new(source.page_ids.iter().copied().collect());

        let selected_ids = indices
            .iter()
            .map(|&index| {
                source.page_ids.get(index as usize).copied().ok_or(
                    EngineError::PageOutOfRange {
                        index,
                        page_count: source.page_ids.len() as u32,
                    },
                )
            })
            .collect::<Result<Vec<ObjectId>, EngineError>>()?;
        let selected: Rc<BTreeSet<ObjectId>> = Rc::new(selected_ids.iter().copied().collect());

        selected_ids
            .into_iter()
            .map(|source_id| -> Result<CopiedPage, EngineError> {
                Ok(CopiedPage {
                    source_id,
                    dictionary: detached_page_dictionary(&source.doc, source_id)?,
                    source: Rc::clone(&source.doc),
                    source_pages: Rc::clone(&source_pages),
                    selected: Rc::clone(&selected),
                })
            })
            .collect()
    }

    fn append_page(&self, output: &mut OutputDocument, page: CopiedPage) -> Result<(), EngineError> {
        // Reuse the id reserved by an earlier page linking here
        let page_id = match output.imported.get(&page.source_id) {
            Some(&reserved) => reserved,
            None => output.doc.new_object_id(),
        };
        // Registered first so annotations pointing back at their page resolve
        output.imported.insert(page.source_id, page_id);

        let mut pending = Vec::new();
        let mut dictionary = output.remap_dict(&page.dictionary, &page, &mut pending);
        dictionary.set("Parent", Object::Reference(output.pages_id));

        while let Some(source_id) = pending.pop() {
            let new_id = output.imported[&source_id];
            let object = match page.source.objects.get(&source_id) {
                Some(object) => output.remap(object, &page, &mut pending),
                None => Object::Null,
            };
            output.doc.objects.insert(new_id, object);
        }

        output
            .doc
            .objects
            .insert(page_id, Object::Dictionary(dictionary));
        output.kids.push(Object::Reference(page_id));
        Ok(())
    }

    fn serialize(&self, output: OutputDocument) -> Result<Vec<u8>, EngineError> {
        let OutputDocument {
            mut doc,
            pages_id,
            kids,
            ..
        } = output;

        let pages = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Pages".to_vec())),
            ("Count", Object::Integer(kids.len() as i64)),
            ("Kids", Object::Array(kids)),
        ]);
        doc.objects.insert(pages_id, Object::Dictionary(pages));

        let catalog = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Catalog".to_vec())),
            ("Pages", Object::Reference(pages_id)),
        ]);
        let catalog_id = doc.add_object(catalog);
        doc.trailer.set("Root", Object::Reference(catalog_id));

        if self.compress {
            doc.compress();
        }

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer)
            .map_err(|e| EngineError::Serialization(format!("Save failed: {}", e)))?;

        Ok(buffer)
    }
}

/// Clone a page dictionary, pull down inherited attributes and drop `Parent`
fn detached_page_dictionary(doc: &Document, page_id: ObjectId) -> Result<Dictionary, EngineError> {
    let mut dictionary = doc.get_dictionary(page_id)?.clone();

    let mut parent = dictionary
        .get(b"Parent")
        .and_then(|p| p.as_reference())
        .ok();
    let mut depth = 0;

    while let Some(parent_id) = parent {
        depth += 1;
        if depth > MAX_TREE_DEPTH {
            break;
        }
        let Ok(parent_dict) = doc.get_dictionary(parent_id) else {
            break;
        };
        for key in INHERITABLE_KEYS {
            if !dictionary.has(key) {
                if let Ok(value) = parent_dict.get(key) {
                    dictionary.set(key.to_vec(), value.clone());
                }
            }
        }
        parent = parent_dict
            .get(b"Parent")
            .and_then(|p| p.as_reference())
            .ok();
    }

    dictionary.remove(b"Parent");
    Ok(dictionary)
}
