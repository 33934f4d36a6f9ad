//! Page geometry and document metadata for the preview strip
//!
//! The preview lays out one placeholder per page before any thumbnail is
//! rendered, so it needs each page's size and rotation up front.

use lopdf::{Dictionary, Document, Object};
use serde::Serialize;

/// US Letter, used when no MediaBox is found anywhere in the page tree
const DEFAULT_MEDIA_BOX: [f64; 4] = [0.0, 0.0, 612.0, 792.0];

const MAX_TREE_DEPTH: usize = 64;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PageInfo {
    /// Page number (1-indexed)
    pub page_num: u32,
    /// Width in points, before rotation
    pub width: f32,
    /// Height in points, before rotation
    pub height: f32,
    /// 0, 90, 180 or 270
    pub rotation: i32,
    pub orientation: PageOrientation,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub enum PageOrientation {
    Portrait,
    Landscape,
    Square,
}

/// Header-level facts about the loaded file plus every page's geometry
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DocumentDetails {
    /// PDF version from the header (e.g. "1.7")
    pub version: String,
    pub encrypted: bool,
    pub title: Option<String>,
    pub author: Option<String>,
    pub pages: Vec<PageInfo>,
}

impl DocumentDetails {
    pub fn from_document(doc: &Document) -> Self {
        let pages = doc
            .get_pages()
            .into_iter()
            .filter_map(|(page_num, page_id)| {
                let dict = doc.get_dictionary(page_id).ok()?;
                Some(PageInfo::from_dictionary(doc, dict, page_num))
            })
            .collect();

        Self {
            version: doc.version.clone(),
            encrypted: doc.is_encrypted(),
            title: info_string(doc, b"Title"),
            author: info_string(doc, b"Author"),
            pages,
        }
    }
}

impl PageInfo {
    fn from_dictionary(doc: &Document, page: &Dictionary, page_num: u32) -> Self {
        let media_box = inherited(doc, page, b"MediaBox")
            .and_then(|obj| obj.as_array().ok())
            .and_then(|array| parse_box_array(array))
            .unwrap_or(DEFAULT_MEDIA_BOX);
        let width = (media_box[2] - media_box[0]).abs();
        let height = (media_box[3] - media_box[1]).abs();

        let rotation = inherited(doc, page, b"Rotate")
            .and_then(|obj| obj.as_i64().ok())
            .map(|angle| normalize_rotation(angle as i32))
            .unwrap_or(0);

        let (effective_width, effective_height) = if rotation == 90 || rotation == 270 {
            (height, width)
        } else {
            (width, height)
        };

        let orientation = if (effective_width - effective_height).abs() < 1.0 {
            PageOrientation::Square
        } else if effective_width > effective_height {
            PageOrientation::Landscape
        } else {
            PageOrientation::Portrait
        };

        Self {
            page_num,
            width: width as f32,
            height: height as f32,
            rotation,
            orientation,
        }
    }
}

/// Look `key` up on the page, then on each ancestor in turn
fn inherited<'a>(doc: &'a Document, page: &'a Dictionary, key: &[u8]) -> Option<&'a Object> {
    let mut current = page;
    for _ in 0..MAX_TREE_DEPTH {
        if let Ok(value) = current.get(key) {
            return match value {
                Object::Reference(id) => doc.get_object(*id).ok(),
                other => Some(other),
            };
        }
        let parent_id = current.get(b"Parent").and_then(|p| p.as_reference()).ok()?;
        current = doc.get_dictionary(parent_id).ok()?;
    }
    None
}

/// Parse a box array [x1, y1, x2, y2]
fn parse_box_array(array: &[Object]) -> Option<[f64; 4]> {
    if array.len() != 4 {
        return None;
    }
    let mut result = [0.0; 4];
    for (slot, obj) in result.iter_mut().zip(array) {
        *slot = match obj {
            Object::Integer(n) => *n as f64,
            Object::Real(n) => f64::from(*n),
            _ => return None,
        };
    }
    Some(result)
}

fn normalize_rotation(angle: i32) -> i32 {
    angle.rem_euclid(360)
}

fn info_string(doc: &Document, key: &[u8]) -> Option<String> {
    let info_id = doc.trailer.get(b"Info").ok()?.as_reference().ok()?;
    let bytes = doc.get_dictionary(info_id).ok()?.get(key).ok()?.as_str().ok()?;
    let decoded = decode_text_string(bytes);
    (!decoded.is_empty()).then_some(decoded)
}

/// UTF-16BE with BOM, otherwise treated as Latin-1
fn decode_text_string(bytes: &[u8]) -> String {
    match bytes {
        [0xFE, 0xFF, rest @ ..] => {
            let units: Vec<u16> = rest
                .chunks_exact(2)
                .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                .collect();
            String::from_utf16_lossy(&units)
        }
        _ => bytes.iter().map(|&b| b as char).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::create_test_pdf;
    use lopdf::StringFormat;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_normalize_rotation() {
        assert_eq!(normalize_rotation(0), 0);
        assert_eq!(normalize_rotation(270), 270);
        assert_eq!(normalize_rotation(360), 0);
        assert_eq!(normalize_rotation(450), 90);
        assert_eq!(normalize_rotation(-90), 270);
    }

    #[test]
    fn test_parse_box_array() {
        let array = vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Real(612.0),
            Object::Real(792.0),
        ];
        assert_eq!(parse_box_array(&array), Some([0.0, 0.0, 612.0, 792.0]));
        assert_eq!(parse_box_array(&array[..3]), None);
    }

    #[test]
    fn test_details_use_inherited_media_box() {
        let doc = Document::load_mem(&create_test_pdf(3)).unwrap();
        let details = DocumentDetails::from_document(&doc);
        assert_eq!(details.version, "1.7");
        assert!(!details.encrypted);
        assert_eq!(details.pages.len(), 3);
        let first = &details.pages[0];
        assert_eq!(first.page_num, 1);
        assert_eq!((first.width, first.height), (612.0, 792.0));
        assert_eq!(first.orientation, PageOrientation::Portrait);
    }

    #[test]
    fn test_rotated_page_is_landscape() {
        let mut doc = Document::load_mem(&create_test_pdf(2)).unwrap();
        let page_id = doc.get_pages()[&2];
        doc.get_dictionary_mut(page_id)
            .unwrap()
            .set("Rotate", Object::Integer(-270));

        let details = DocumentDetails::from_document(&doc);
        assert_eq!(details.pages[1].rotation, 90);
        assert_eq!(details.pages[1].orientation, PageOrientation::Landscape);
        assert_eq!(details.pages[0].orientation, PageOrientation::Portrait);
    }

    #[test]
    fn test_metadata_strings() {
        let mut doc = Document::load_mem(&create_test_pdf(1)).unwrap();
        let info_id = doc.add_object(Dictionary::from_iter(vec![
            (
                "Title",
                Object::String(b"Quarterly".to_vec(), StringFormat::Literal),
            ),
            (
                "Author",
                Object::String(
                    vec![0xFE, 0xFF, 0x00, 0x41, 0x00, 0x6E, 0x00, 0x6E],
                    StringFormat::Hexadecimal,
                ),
            ),
        ]));
        doc.trailer.set("Info", Object::Reference(info_id));

        let details = DocumentDetails::from_document(&doc);
        assert_eq!(details.title.as_deref(), Some("Quarterly"));
        assert_eq!(details.author.as_deref(), Some("Ann"));
    }
}
