//! Test fixtures shared by the unit tests in this crate

use crate::engine::DocumentEngine;
use crate::error::EngineError;
use crate::page_info::{DocumentDetails, PageInfo, PageOrientation};
use lopdf::{content::Content, content::Operation, Dictionary, Document, Object, Stream};
use std::cell::RefCell;

/// Create a valid test PDF with the specified number of pages.
///
/// Page `n` draws the literal string `(Page n)`. `MediaBox` and a shared
/// `Resources` dictionary (one Helvetica font object) live on the page tree
/// root, so every page inherits them.
pub(crate) fn create_test_pdf(num_pages: u32) -> Vec<u8> {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Font".to_vec())),
        ("Subtype", Object::Name(b"Type1".to_vec())),
        ("BaseFont", Object::Name(b"Helvetica".to_vec())),
    ]));
    let resources_id = doc.add_object(Dictionary::from_iter(vec![(
        "Font",
        Object::Dictionary(Dictionary::from_iter(vec![("F1", Object::Reference(font_id))])),
    )]));

    let mut page_ids = Vec::new();

    for i in 0..num_pages {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new(
                    "Tf",
                    vec![Object::Name(b"F1".to_vec()), Object::Integer(12)],
                ),
                Operation::new("Td", vec![Object::Integer(100), Object::Integer(700)]),
                Operation::new(
                    "Tj",
                    vec![Object::String(
                        format!("Page {}", i + 1).into_bytes(),
                        lopdf::StringFormat::Literal,
                    )],
                ),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(Dictionary::new(), content.encode().unwrap()));

        let page = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(pages_id)),
            ("Contents", Object::Reference(content_id)),
        ]);
        page_ids.push(doc.add_object(page));
    }

    let pages = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Count", Object::Integer(num_pages as i64)),
        (
            "Kids",
            Object::Array(page_ids.iter().map(|id| Object::Reference(*id)).collect()),
        ),
        (
            "MediaBox",
            Object::Array(vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(612),
                Object::Integer(792),
            ]),
        ),
        ("Resources", Object::Reference(resources_id)),
    ]);
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]);
    let catalog_id = doc.add_object(catalog);
    doc.trailer.set("Root", Object::Reference(catalog_id));

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).unwrap();
    buffer
}

/// The `(Page n)` labels drawn on each page of `bytes`, in page order
pub(crate) fn page_labels(bytes: &[u8]) -> Vec<u32> {
    let doc = Document::load_mem(bytes).unwrap();
    doc.get_pages()
        .values()
        .map(|&page_id| {
            let content = doc.get_page_content(page_id).unwrap();
            let text = String::from_utf8_lossy(&content);
            let start = text.find("(Page ").unwrap() + "(Page ".len();
            let end = start + text[start..].find(')').unwrap();
            text[start..end].parse().unwrap()
        })
        .collect()
}

/// Engine double that records every call and can be told where to fail
#[derive(Default)]
pub(crate) struct FakeEngine {
    pub page_count: u32,
    pub fail_open: bool,
    pub fail_copy: bool,
    pub fail_serialize: bool,
    pub calls: RefCell<Vec<String>>,
}

impl FakeEngine {
    pub fn with_pages(page_count: u32) -> Self {
        Self {
            page_count,
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.borrow_mut().push(call.into());
    }
}

impl DocumentEngine for FakeEngine {
    type Source = u32;
    type Page = u32;
    type Output = Vec<u32>;

    fn open(&self, _bytes: &[u8]) -> Result<u32, EngineError> {
        self.record("open");
        if self.fail_open {
            return Err(EngineError::Parse("corrupt xref".into()));
        }
        Ok(self.page_count)
    }

    fn page_count(&self, source: &u32) -> u32 {
        *source
    }

    fn details(&self, source: &u32) -> DocumentDetails {
        self.record("details");
        DocumentDetails {
            version: "1.7".into(),
            encrypted: false,
            title: None,
            author: None,
            pages: (1..=*source)
                .map(|page_num| PageInfo {
                    page_num,
                    width: 612.0,
                    height: 792.0,
                    rotation: 0,
                    orientation: PageOrientation::Portrait,
                })
                .collect(),
        }
    }

    fn create(&self) -> Vec<u32> {
        self.record("create");
        Vec::new()
    }

    fn copy_pages(&self, source: &u32, indices: &[u32]) -> Result<Vec<u32>, EngineError> {
        self.record(format!("copy {:?}", indices));
        if self.fail_copy {
            return Err(EngineError::Operation("copy failed".into()));
        }
        if let Some(&index) = indices.iter().find(|&&i| i >= *source) {
            return Err(EngineError::PageOutOfRange {
                index,
                page_count: *source,
            });
        }
        Ok(indices.to_vec())
    }

    fn append_page(&self, output: &mut Vec<u32>, page: u32) -> Result<(), EngineError> {
        self.record(format!("append {}", page));
        output.push(page);
        Ok(())
    }

    fn serialize(&self, output: Vec<u32>) -> Result<Vec<u8>, EngineError> {
        self.record("serialize");
        if self.fail_serialize {
            return Err(EngineError::Serialization("disk full".into()));
        }
        Ok(output.iter().map(|&p| p as u8).collect())
    }
}
