//! In-memory PDF fixtures built with lopdf's object API.

#![allow(dead_code)]

use std::path::Path;

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};

/// One line of page text, drawn in its own text object.
pub struct Line {
    pub text: String,
    pub size: f32,
    pub bold: bool,
}

impl Line {
    pub fn body(text: &str) -> Self {
        Self {
            text: text.to_string(),
            size: 10.0,
            bold: false,
        }
    }

    pub fn heading(text: &str, size: f32) -> Self {
        Self {
            text: text.to_string(),
            size,
            bold: true,
        }
    }
}

/// Where a bookmark points.
pub enum Target {
    /// Explicit `[page /Fit]` destination, 1-based page
    Page(usize),
    /// Named destination looked up in the name tree
    Named(&'static str),
    /// GoTo action with an explicit destination, 1-based page
    Action(usize),
    /// No destination at all
    Missing,
}

pub struct Node {
    pub title: String,
    pub target: Target,
    pub children: Vec<Node>,
}

impl Node {
    pub fn new(title: &str, target: Target) -> Self {
        Self {
            title: title.to_string(),
            target,
            children: Vec::new(),
        }
    }

    pub fn child(mut self, node: Node) -> Self {
        self.children.push(node);
        self
    }
}

#[derive(Default)]
pub struct PdfBuilder {
    title: Option<String>,
    pages: Vec<Vec<Line>>,
    outline: Vec<Node>,
    named: Vec<(String, usize)>,
}

impl PdfBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `/Info /Title`.
    pub fn title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    pub fn page(mut self, lines: Vec<Line>) -> Self {
        self.pages.push(lines);
        self
    }

    /// A page of 10pt regular body lines.
    pub fn text_page(self, lines: &[&str]) -> Self {
        self.page(lines.iter().map(|l| Line::body(l)).collect())
    }

    pub fn bookmark(mut self, node: Node) -> Self {
        self.outline.push(node);
        self
    }

    /// Register a named destination pointing at a 1-based page.
    pub fn named_dest(mut self, name: &str, page: usize) -> Self {
        self.named.push((name.to_string(), page));
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let regular = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        let bold = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica-Bold",
            "Encoding" => "WinAnsiEncoding",
        });

        let mut page_ids = Vec::new();
        for lines in &self.pages {
            let content_id = doc.add_object(Stream::new(dictionary! {}, page_content(lines)));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "Resources" => dictionary! {
                    "Font" => dictionary! { "F1" => regular, "F2" => bold },
                },
            });
            page_ids.push(page_id);
        }

        let kids: Vec<Object> = page_ids.iter().map(|&id| Object::Reference(id)).collect();
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => page_ids.len() as i64,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            }),
        );

        let mut catalog = dictionary! { "Type" => "Catalog", "Pages" => pages_id };

        if !self.outline.is_empty() {
            let outlines_id = doc.new_object_id();
            let (first, last) = add_outline_items(&mut doc, &self.outline, outlines_id, &page_ids);
            doc.objects.insert(
                outlines_id,
                Object::Dictionary(dictionary! {
                    "Type" => "Outlines",
                    "First" => first,
                    "Last" => last,
                    "Count" => self.outline.len() as i64,
                }),
            );
            catalog.set("Outlines", outlines_id);
        }

        if !self.named.is_empty() {
            let mut named = self.named;
            named.sort();
            let names: Vec<Object> = named
                .iter()
                .flat_map(|(name, page)| {
                    [
                        Object::string_literal(name.as_str()),
                        fit(page_ids[page - 1]),
                    ]
                })
                .collect();
            let limits = vec![
                Object::string_literal(named[0].0.as_str()),
                Object::string_literal(named[named.len() - 1].0.as_str()),
            ];
            let leaf = doc.add_object(dictionary! { "Names" => names, "Limits" => limits });
            let root = doc.add_object(dictionary! { "Kids" => vec![Object::Reference(leaf)] });
            catalog.set("Names", dictionary! { "Dests" => root });
        }

        let catalog_id = doc.add_object(catalog);
        doc.trailer.set("Root", catalog_id);
        if let Some(title) = &self.title {
            let info_id = doc.add_object(dictionary! {
                "Title" => Object::string_literal(title.as_str()),
                "Producer" => Object::string_literal("fixture"),
            });
            doc.trailer.set("Info", info_id);
        }

        let mut buf = Vec::new();
        doc.save_to(&mut buf).unwrap();
        buf
    }

    /// Build and write to `path`.
    pub fn write_to(self, path: &Path) {
        std::fs::write(path, self.build()).unwrap();
    }
}

fn page_content(lines: &[Line]) -> Vec<u8> {
    let mut operations = Vec::new();
    let mut y = 750.0f32;
    for line in lines {
        let font = if line.bold { "F2" } else { "F1" };
        operations.extend([
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec![font.into(), line.size.into()]),
            Operation::new("Td", vec![72.into(), y.into()]),
            Operation::new("Tj", vec![Object::string_literal(line.text.as_str())]),
            Operation::new("ET", vec![]),
        ]);
        y -= line.size * 2.0;
    }
    Content { operations }.encode().unwrap()
}

fn fit(page: ObjectId) -> Object {
    Object::Array(vec![Object::Reference(page), Object::Name(b"Fit".to_vec())])
}

fn add_outline_items(
    doc: &mut Document,
    nodes: &[Node],
    parent: ObjectId,
    pages: &[ObjectId],
) -> (ObjectId, ObjectId) {
    let ids: Vec<ObjectId> = nodes.iter().map(|_| doc.new_object_id()).collect();

    for (i, node) in nodes.iter().enumerate() {
        let mut item = dictionary! {
            "Title" => Object::string_literal(node.title.as_str()),
            "Parent" => parent,
        };
        match node.target {
            Target::Page(page) => item.set("Dest", fit(pages[page - 1])),
            Target::Named(name) => item.set("Dest", Object::string_literal(name)),
            Target::Action(page) => item.set(
                "A",
                dictionary! { "S" => "GoTo", "D" => fit(pages[page - 1]) },
            ),
            Target::Missing => {}
        }
        if i > 0 {
            item.set("Prev", ids[i - 1]);
        }
        if i + 1 < ids.len() {
            item.set("Next", ids[i + 1]);
        }
        if !node.children.is_empty() {
            let (first, last) = add_outline_items(doc, &node.children, ids[i], pages);
            item.set("First", first);
            item.set("Last", last);
            item.set("Count", node.children.len() as i64);
        }
        doc.objects.insert(ids[i], Object::Dictionary(item));
    }

    (ids[0], ids[ids.len() - 1])
}

/// A three-page report with a nested embedded outline.
pub fn bookmarked_report() -> PdfBuilder {
    PdfBuilder::new()
        .title("Understanding AI")
        .text_page(&["Understanding AI", "Introduction", "Some opening words"])
        .text_page(&["Background", "History of the field"])
        .text_page(&["Methods", "how the work was done"])
        .bookmark(
            Node::new("Introduction", Target::Page(1)).child(
                Node::new("Background", Target::Page(2))
                    .child(Node::new("History", Target::Page(2))),
            ),
        )
        .bookmark(Node::new("Methods", Target::Page(3)))
}

/// A three-page report without bookmarks, headings found from text.
pub fn plain_report() -> PdfBuilder {
    PdfBuilder::new()
        .text_page(&[
            "Understanding AI",
            "Introduction",
            "Machine learning systems learn from data.",
        ])
        .text_page(&[
            "1 Background",
            "2.1 Data Collection",
            "2.1.3 Sampling",
            "we gathered many samples",
        ])
        .text_page(&["REFERENCES", "Smith and Jones wrote about this"])
}
