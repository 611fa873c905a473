//! Page composition on top of lopdf
//!
//! Source pages are imported into the destination document as Form XObjects
//! and drawn onto freshly sized pages through a clip rectangle and a `cm`
//! transform. The algorithm:
//! 1. Load the source and capture every page's box, content and resources
//! 2. Move all source objects into the destination with offset object IDs
//! 3. Wrap each source page in a Form XObject referencing the moved resources
//! 4. Draw forms and lines on new pages, then build the page tree
//! 5. Prune what no page uses, compress and serialize

use crate::error::ReflowError;
use crate::geometry::{normalize_rotation, Matrix, PageBox, Placement, Point, Rect};
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use tracing::{debug, warn};

/// A page of the source document, captured before its objects are moved
#[derive(Debug, Clone)]
pub struct SourcePage {
    /// 1-indexed page number
    pub number: u32,
    /// CropBox or MediaBox as stored, before rotation
    pub page_box: PageBox,
    /// Clockwise `/Rotate`: 0, 90, 180 or 270
    pub rotation: u16,
    content: Vec<u8>,
    resources: Option<Object>,
}

/// A loaded source document with its pages in order
#[derive(Debug)]
pub struct SourceDocument {
    doc: Document,
    pages: Vec<SourcePage>,
}

impl SourceDocument {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ReflowError> {
        let doc =
            Document::load_mem(bytes).map_err(|e| ReflowError::ParseError(e.to_string()))?;
        Self::from_document(doc)
    }

    pub fn from_document(doc: Document) -> Result<Self, ReflowError> {
        let mut pages = Vec::new();

        for (number, page_id) in doc.get_pages() {
            let page_box = page_box(&doc, page_id)?;
            let rotation = page_rotation(&doc, page_id, number);
            let content = page_content(&doc, page_id, number)?;
            let resources = inherited_attribute(&doc, page_id, b"Resources");

            pages.push(SourcePage {
                number,
                page_box,
                rotation,
                content,
                resources,
            });
        }

        Ok(Self { doc, pages })
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

/// A source page wrapped as a Form XObject in the destination document
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FormXObject {
    pub id: ObjectId,
    pub number: u32,
    /// Box of the form as drawn, upright when the page was rotated
    pub page_box: PageBox,
}

impl FormXObject {
    /// The source page rectangle in page space, as the reader sees it
    pub fn rect(&self) -> Rect {
        self.page_box.rect()
    }
}

/// Stroke settings for ruled lines
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineStyle {
    pub width: f64,
    pub rgb: (f64, f64, f64),
}

impl Default for LineStyle {
    fn default() -> Self {
        Self {
            width: 0.5,
            rgb: (0.0, 0.0, 0.0),
        }
    }
}

/// Content and resources of one destination page under construction
#[derive(Debug)]
pub struct PageCanvas {
    width: f64,
    height: f64,
    operations: Vec<Operation>,
    xobjects: Vec<(String, ObjectId)>,
}

impl PageCanvas {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            operations: Vec::new(),
            xobjects: Vec::new(),
        }
    }

    /// Draw `placement.clip` of the form's page into `placement.dest`
    pub fn show_form(&mut self, form: &FormXObject, placement: Placement) {
        let name = self.xobject_name(form.id);
        let target = placement.target();
        let m = placement.matrix(&form.page_box, &self.bounds());

        debug!(
            "Page {}: ({:.2}, {:.2})-({:.2}, {:.2}) -> ({:.2}, {:.2})-({:.2}, {:.2})",
            form.number,
            placement.clip.x0,
            placement.clip.y0,
            placement.clip.x1,
            placement.clip.y1,
            target.x0,
            target.y0,
            target.x1,
            target.y1
        );

        self.operations.push(Operation::new("q", vec![]));
        self.operations.push(Operation::new(
            "re",
            vec![
                real(target.x0),
                real(self.height - target.y1),
                real(target.width()),
                real(target.height()),
            ],
        ));
        self.operations.push(Operation::new("W", vec![]));
        self.operations.push(Operation::new("n", vec![]));
        self.operations.push(Operation::new("cm", matrix_operands(&m)));
        self.operations.push(Operation::new(
            "Do",
            vec![Object::Name(name.into_bytes())],
        ));
        self.operations.push(Operation::new("Q", vec![]));
    }

    /// Stroke a straight line between two page-space points
    pub fn draw_line(&mut self, from: Point, to: Point, style: &LineStyle) {
        let (r, g, b) = style.rgb;
        self.operations.push(Operation::new("q", vec![]));
        self.operations
            .push(Operation::new("RG", vec![real(r), real(g), real(b)]));
        self.operations
            .push(Operation::new("w", vec![real(style.width)]));
        self.operations.push(Operation::new(
            "m",
            vec![real(from.x), real(self.height - from.y)],
        ));
        self.operations.push(Operation::new(
            "l",
            vec![real(to.x), real(self.height - to.y)],
        ));
        self.operations.push(Operation::new("S", vec![]));
        self.operations.push(Operation::new("Q", vec![]));
    }

    fn bounds(&self) -> PageBox {
        PageBox::new(0.0, 0.0, self.width, self.height)
    }

    fn xobject_name(&mut self, id: ObjectId) -> String {
        if let Some((name, _)) = self.xobjects.iter().find(|(_, x)| *x == id) {
            return name.clone();
        }
        let name = format!("Fm{}", self.xobjects.len());
        self.xobjects.push((name.clone(), id));
        name
    }
}

/// Destination document builder
pub struct PdfComposer {
    doc: Document,
    pages_id: ObjectId,
    page_ids: Vec<ObjectId>,
}

impl Default for PdfComposer {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfComposer {
    pub fn new() -> Self {
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();
        Self {
            doc,
            pages_id,
            page_ids: Vec::new(),
        }
    }

    /// Move every object of `source` into this document and wrap each of
    /// its pages as a Form XObject. Forms come back in page order.
    pub fn import(&mut self, source: SourceDocument) -> Vec<FormXObject> {
        let SourceDocument { doc, pages } = source;

        let id_offset = self.doc.max_id;
        for (old_id, object) in doc.objects.into_iter() {
            let new_id = (old_id.0 + id_offset, old_id.1);
            self.doc
                .objects
                .insert(new_id, remap_object_refs(object, id_offset));
        }
        self.doc.max_id = (doc.max_id + id_offset).max(self.doc.max_id);

        pages
            .into_iter()
            .map(|page| {
                let resources = page
                    .resources
                    .map(|r| remap_object_refs(r, id_offset))
                    .unwrap_or_else(|| Object::Dictionary(Dictionary::new()));

                let b = page.page_box;
                let mut dict = Dictionary::new();
                dict.set("Type", Object::Name(b"XObject".to_vec()));
                dict.set("Subtype", Object::Name(b"Form".to_vec()));
                dict.set(
                    "BBox",
                    Object::Array(vec![real(b.llx), real(b.lly), real(b.urx), real(b.ury)]),
                );
                dict.set("Resources", resources);

                // A rotated page is drawn upright at the origin of its form
                let page_box = if page.rotation == 0 {
                    b
                } else {
                    let m = b.rotation_matrix(page.rotation);
                    dict.set("Matrix", Object::Array(matrix_operands(&m)));
                    b.transformed(&m)
                };

                let id = self.doc.add_object(Stream::new(dict, page.content));
                FormXObject {
                    id,
                    number: page.number,
                    page_box,
                }
            })
            .collect()
    }

    /// Append a finished canvas as the next page
    pub fn add_page(&mut self, canvas: PageCanvas) -> Result<ObjectId, ReflowError> {
        let content = Content {
            operations: canvas.operations,
        };
        let bytes = content
            .encode()
            .map_err(|e| ReflowError::OperationError(format!("Content encoding: {}", e)))?;
        let content_id = self.doc.add_object(Stream::new(Dictionary::new(), bytes));

        let mut xobjects = Dictionary::new();
        for (name, id) in canvas.xobjects {
            xobjects.set(name.into_bytes(), Object::Reference(id));
        }
        let mut resources = Dictionary::new();
        resources.set("XObject", Object::Dictionary(xobjects));

        let page = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(self.pages_id)),
            (
                "MediaBox",
                Object::Array(vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    real(canvas.width),
                    real(canvas.height),
                ]),
            ),
            ("Contents", Object::Reference(content_id)),
            ("Resources", Object::Dictionary(resources)),
        ]);
        let page_id = self.doc.add_object(page);
        self.page_ids.push(page_id);
        Ok(page_id)
    }

    /// Build the page tree, drop unused imported objects and serialize
    pub fn finish(mut self) -> Result<Vec<u8>, ReflowError> {
        let pages = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Pages".to_vec())),
            ("Count", Object::Integer(self.page_ids.len() as i64)),
            (
                "Kids",
                Object::Array(
                    self.page_ids
                        .iter()
                        .map(|id| Object::Reference(*id))
                        .collect(),
                ),
            ),
        ]);
        self.doc
            .objects
            .insert(self.pages_id, Object::Dictionary(pages));

        let catalog = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Catalog".to_vec())),
            ("Pages", Object::Reference(self.pages_id)),
        ]);
        let catalog_id = self.doc.add_object(catalog);
        self.doc.trailer.set("Root", Object::Reference(catalog_id));

        let pruned = self.doc.prune_objects();
        debug!("Pruned {} unreferenced objects", pruned.len());
        self.doc.renumber_objects();
        self.doc.compress();

        let mut buffer = Vec::new();
        self.doc
            .save_to(&mut buffer)
            .map_err(|e| ReflowError::OperationError(format!("Save failed: {}", e)))?;

        Ok(buffer)
    }
}

fn real(value: f64) -> Object {
    Object::Real(value as f32)
}

fn matrix_operands(m: &Matrix) -> Vec<Object> {
    vec![real(m.a), real(m.b), real(m.c), real(m.d), real(m.e), real(m.f)]
}

fn as_number(doc: &Document, obj: &Object) -> Option<f64> {
    match obj {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(r) => Some(*r as f64),
        Object::Reference(id) => as_number(doc, doc.get_object(*id).ok()?),
        _ => None,
    }
}

/// Look up a page attribute, following the Parent chain for inheritable keys
fn inherited_attribute(doc: &Document, page_id: ObjectId, key: &[u8]) -> Option<Object> {
    let mut current = doc.get_object(page_id).ok()?.as_dict().ok()?;
    // Bounded walk in case of a cyclic page tree
    for _ in 0..64 {
        if let Ok(value) = current.get(key) {
            return Some(value.clone());
        }
        let parent = current.get(b"Parent").ok()?.as_reference().ok()?;
        current = doc.get_object(parent).ok()?.as_dict().ok()?;
    }
    None
}

fn parse_box(doc: &Document, obj: &Object) -> Option<PageBox> {
    let array = match obj {
        Object::Array(a) => a,
        Object::Reference(id) => doc.get_object(*id).ok()?.as_array().ok()?,
        _ => return None,
    };
    if array.len() != 4 {
        return None;
    }
    let n: Vec<f64> = array
        .iter()
        .map(|o| as_number(doc, o))
        .collect::<Option<_>>()?;
    Some(PageBox::new(n[0], n[1], n[2], n[3]))
}

/// Visible page box: CropBox when present, otherwise MediaBox
fn page_box(doc: &Document, page_id: ObjectId) -> Result<PageBox, ReflowError> {
    let found = [b"CropBox".as_slice(), b"MediaBox".as_slice()]
        .into_iter()
        .filter_map(|key| inherited_attribute(doc, page_id, key))
        .find_map(|obj| parse_box(doc, &obj));

    match found {
        Some(b) if b.width() > 0.0 && b.height() > 0.0 => Ok(b),
        Some(b) => Err(ReflowError::ParseError(format!(
            "Degenerate page box {:?}",
            b
        ))),
        None => Err(ReflowError::ParseError(format!(
            "Page object {} {} has no MediaBox",
            page_id.0, page_id.1
        ))),
    }
}

/// Clockwise page rotation, inherited through the page tree
fn page_rotation(doc: &Document, page_id: ObjectId, number: u32) -> u16 {
    let degrees = match inherited_attribute(doc, page_id, b"Rotate") {
        Some(obj) => as_number(doc, &obj).unwrap_or(0.0) as i64,
        None => return 0,
    };
    normalize_rotation(degrees).unwrap_or_else(|| {
        warn!("Page {}: ignoring /Rotate {}, not a multiple of 90", number, degrees);
        0
    })
}

/// Stream bytes with filters removed
fn decoded_stream(stream: &Stream) -> lopdf::Result<Vec<u8>> {
    if stream.dict.has(b"Filter") {
        stream.decompressed_content()
    } else {
        Ok(stream.content.clone())
    }
}

/// All content streams of a page joined in order. Each stream is followed by
/// a newline so operators at stream boundaries stay separate.
fn page_content(doc: &Document, page_id: ObjectId, number: u32) -> Result<Vec<u8>, ReflowError> {
    let mut content = Vec::new();
    for id in doc.get_page_contents(page_id) {
        // A dangling reference is a null object and draws nothing
        let stream = match doc.get_object(id).and_then(Object::as_stream) {
            Ok(stream) => stream,
            Err(e) => {
                warn!("Page {}: skipping content {} {}: {}", number, id.0, id.1, e);
                continue;
            }
        };
        let bytes = decoded_stream(stream).map_err(|e| {
            ReflowError::ParseError(format!(
                "Page {} content stream {} {}: {}",
                number, id.0, id.1, e
            ))
        })?;
        content.extend_from_slice(&bytes);
        content.push(b'\n');
    }
    Ok(content)
}

/// Recursively shift object references by `offset`
fn remap_object_refs(obj: Object, offset: u32) -> Object {
    match obj {
        Object::Reference(id) => Object::Reference((id.0 + offset, id.1)),
        Object::Array(arr) => Object::Array(
            arr.into_iter()
                .map(|o| remap_object_refs(o, offset))
                .collect(),
        ),
        Object::Dictionary(mut dict) => {
            for (_, value) in dict.iter_mut() {
                *value = remap_object_refs(std::mem::replace(value, Object::Null), offset);
            }
            Object::Dictionary(dict)
        }
        Object::Stream(mut stream) => {
            for (_, value) in stream.dict.iter_mut() {
                *value = remap_object_refs(std::mem::replace(value, Object::Null), offset);
            }
            Object::Stream(stream)
        }
        other => other,
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use lopdf::{content::Content, content::Operation, Dictionary, Document, Object, Stream};

    /// Build a PDF whose pages have the given sizes. Each page draws its own
    /// number with a shared Helvetica font held in the page tree resources.
    pub fn create_test_pdf(sizes: &[(i64, i64)]) -> Vec<u8> {
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();

        let font_id = doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Font".to_vec())),
            ("Subtype", Object::Name(b"Type1".to_vec())),
            ("BaseFont", Object::Name(b"Helvetica".to_vec())),
        ]));

        let mut page_ids = Vec::new();
        for (i, (w, h)) in sizes.iter().enumerate() {
            let content = Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new(
                        "Tf",
                        vec![Object::Name(b"F1".to_vec()), Object::Integer(12)],
                    ),
                    Operation::new("Td", vec![Object::Integer(20), Object::Integer(h - 40)]),
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
            let content_id =
                doc.add_object(Stream::new(Dictionary::new(), content.encode().unwrap()));

            let page = Dictionary::from_iter(vec![
                ("Type", Object::Name(b"Page".to_vec())),
                ("Parent", Object::Reference(pages_id)),
                (
                    "MediaBox",
                    Object::Array(vec![
                        Object::Integer(0),
                        Object::Integer(0),
                        Object::Integer(*w),
                        Object::Integer(*h),
                    ]),
                ),
                ("Contents", Object::Reference(content_id)),
            ]);
            page_ids.push(doc.add_object(page));
        }

        let font_dict = Dictionary::from_iter(vec![("F1", Object::Reference(font_id))]);
        let resources = Dictionary::from_iter(vec![("Font", Object::Dictionary(font_dict))]);
        let pages = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Pages".to_vec())),
            ("Count", Object::Integer(sizes.len() as i64)),
            (
                "Kids",
                Object::Array(page_ids.iter().map(|id| Object::Reference(*id)).collect()),
            ),
            ("Resources", Object::Dictionary(resources)),
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

    /// Width and height of every page's MediaBox, in page order
    pub fn page_sizes(bytes: &[u8]) -> Vec<(f64, f64)> {
        let doc = Document::load_mem(bytes).unwrap();
        doc.get_pages()
            .values()
            .map(|id| {
                let page = doc.get_object(*id).unwrap().as_dict().unwrap();
                let mb = page.get(b"MediaBox").unwrap().as_array().unwrap();
                let n: Vec<f64> = mb
                    .iter()
                    .map(|o| match o {
                        Object::Integer(i) => *i as f64,
                        Object::Real(r) => *r as f64,
                        other => panic!("unexpected MediaBox entry {:?}", other),
                    })
                    .collect();
                (n[2] - n[0], n[3] - n[1])
            })
            .collect()
    }

    /// Build a one-page PDF. `page` and `tree` are extra entries for the
    /// page and the /Pages node, `contents` become separate content streams.
    pub fn create_custom_pdf(
        page: Vec<(&str, Object)>,
        tree: Vec<(&str, Object)>,
        contents: &[&[u8]],
    ) -> Vec<u8> {
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();

        let content_refs = contents
            .iter()
            .map(|c| Object::Reference(doc.add_object(Stream::new(Dictionary::new(), c.to_vec()))))
            .collect();

        let mut page_dict = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(pages_id)),
            ("Contents", Object::Array(content_refs)),
        ]);
        for (key, value) in page {
            page_dict.set(key, value);
        }
        let page_id = doc.add_object(page_dict);

        let mut pages = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Pages".to_vec())),
            ("Count", Object::Integer(1)),
            ("Kids", Object::Array(vec![Object::Reference(page_id)])),
        ]);
        for (key, value) in tree {
            pages.set(key, value);
        }
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

    pub fn pdf_box(values: [i64; 4]) -> Object {
        Object::Array(values.iter().map(|v| Object::Integer(*v)).collect())
    }

    /// Decoded content operations of a page (1-indexed)
    pub fn page_operations(bytes: &[u8], page: u32) -> Vec<Operation> {
        let doc = Document::load_mem(bytes).unwrap();
        let id = doc.get_pages()[&page];
        let content = super::page_content(&doc, id, page).unwrap();
        Content::decode(&content).unwrap().operations
    }

    /// The Form XObject a page draws under `name`
    pub fn page_form(bytes: &[u8], page: u32, name: &str) -> Stream {
        let doc = Document::load_mem(bytes).unwrap();
        let id = doc.get_pages()[&page];
        let page = doc.get_object(id).unwrap().as_dict().unwrap();
        let resources = page.get(b"Resources").unwrap().as_dict().unwrap();
        let xobjects = resources.get(b"XObject").unwrap().as_dict().unwrap();
        let form_id = xobjects.get(name.as_bytes()).unwrap().as_reference().unwrap();
        doc.get_object(form_id).unwrap().as_stream().unwrap().clone()
    }

    /// Decoded operator names of a form
    pub fn form_operators(form: &Stream) -> Vec<String> {
        let content = super::decoded_stream(form).unwrap();
        Content::decode(&content)
            .unwrap()
            .operations
            .into_iter()
            .map(|o| o.operator)
            .collect()
    }

    pub fn operand_f64(obj: &Object) -> f64 {
        match obj {
            Object::Integer(i) => *i as f64,
            Object::Real(r) => *r as f64,
            other => panic!("not a number: {:?}", other),
        }
    }
}
