//! Integration tests for the lopdf-backed text source, using PDFs built in
//! memory.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};

use pdfrank::error::Error;
use pdfrank::extract::{extract_sections, ExtractionMethod};
use pdfrank::source::{LopdfSource, TextSource};
use pdfrank::{ErrorMode, Level, Section};

/// A line of text: content, font size, baseline.
type Line = (&'static str, i64, i64);

struct TestPdf {
    doc: Document,
    catalog_id: ObjectId,
    page_ids: Vec<ObjectId>,
}

impl TestPdf {
    fn new(pages: &[Vec<Line>]) -> Self {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut page_ids = Vec::new();
        for lines in pages {
            let mut operations = Vec::new();
            for (text, size, y) in lines {
                operations.push(Operation::new("BT", vec![]));
                operations.push(Operation::new(
                    "Tf",
                    vec![Object::Name(b"F1".to_vec()), Object::Integer(*size)],
                ));
                operations.push(Operation::new(
                    "Td",
                    vec![Object::Integer(72), Object::Integer(*y)],
                ));
                operations.push(Operation::new("Tj", vec![Object::string_literal(*text)]));
                operations.push(Operation::new("ET", vec![]));
            }
            let content = Content { operations };
            let content_id = doc.add_object(Stream::new(
                dictionary! {},
                content.encode().unwrap(),
            ));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            page_ids.push(page_id);
        }

        let kids: Vec<Object> = page_ids.iter().map(|id| Object::Reference(*id)).collect();
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => Object::Integer(page_ids.len() as i64),
                "Resources" => resources_id,
                "MediaBox" => vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(612),
                    Object::Integer(792),
                ],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        Self {
            doc,
            catalog_id,
            page_ids,
        }
    }

    fn catalog_set(&mut self, key: &str, value: impl Into<Object>) {
        self.doc
            .get_object_mut(self.catalog_id)
            .and_then(Object::as_dict_mut)
            .unwrap()
            .set(key, value);
    }

    /// Page destination array `[page /Fit]`.
    fn page_dest(&self, page: usize) -> Object {
        Object::Array(vec![
            Object::Reference(self.page_ids[page - 1]),
            Object::Name(b"Fit".to_vec()),
        ])
    }

    /// Install a flat chain of outline items with the given destinations.
    fn set_outline(&mut self, items: Vec<(&str, Object)>) -> Vec<ObjectId> {
        let outlines_id = self.doc.new_object_id();
        let ids: Vec<ObjectId> = items.iter().map(|_| self.doc.new_object_id()).collect();
        self.insert_items(outlines_id, &ids, items);

        self.doc.objects.insert(
            outlines_id,
            Object::Dictionary(dictionary! {
                "Type" => "Outlines",
                "First" => ids[0],
                "Last" => ids[ids.len() - 1],
                "Count" => Object::Integer(ids.len() as i64),
            }),
        );
        self.catalog_set("Outlines", outlines_id);
        ids
    }

    fn insert_items(&mut self, parent: ObjectId, ids: &[ObjectId], items: Vec<(&str, Object)>) {
        for (i, (title, dest)) in items.into_iter().enumerate() {
            let mut item = dictionary! {
                "Title" => Object::string_literal(title),
                "Parent" => parent,
                "Dest" => dest,
            };
            if let Some(next) = ids.get(i + 1) {
                item.set("Next", *next);
            }
            self.doc.objects.insert(ids[i], Object::Dictionary(item));
        }
    }

    /// Attach children under an existing outline item.
    fn add_children(&mut self, parent: ObjectId, items: Vec<(&str, Object)>) -> Vec<ObjectId> {
        let ids: Vec<ObjectId> = items.iter().map(|_| self.doc.new_object_id()).collect();
        self.insert_items(parent, &ids, items);
        let parent_dict = self
            .doc
            .get_object_mut(parent)
            .and_then(Object::as_dict_mut)
            .unwrap();
        parent_dict.set("First", ids[0]);
        parent_dict.set("Last", ids[ids.len() - 1]);
        ids
    }

    /// Replace the content stream of a page.
    fn set_page_stream(&mut self, page: usize, stream: Stream) {
        let content_id = self.doc.add_object(stream);
        self.doc
            .get_object_mut(self.page_ids[page - 1])
            .and_then(Object::as_dict_mut)
            .unwrap()
            .set("Contents", content_id);
    }

    fn into_bytes(mut self) -> Vec<u8> {
        let mut buffer = Vec::new();
        self.doc.save_to(&mut buffer).unwrap();
        buffer
    }

    fn into_source(self) -> LopdfSource {
        LopdfSource::from_bytes(&self.into_bytes()).unwrap()
    }
}

fn two_page_report() -> TestPdf {
    TestPdf::new(&[
        vec![
            ("Overview", 18, 750),
            ("Body line one", 11, 700),
            ("Body line two", 11, 686),
        ],
        vec![("Details", 18, 750), ("More body", 11, 700)],
    ])
}

#[test]
fn test_page_runs_positions() {
    let source = two_page_report().into_source();
    assert_eq!(source.page_count(), 2);

    let runs = source.page_runs(1).unwrap();
    let texts: Vec<&str> = runs.iter().map(|r| r.text.as_str()).collect();
    assert_eq!(texts, vec!["Overview", "Body line one", "Body line two"]);
    assert!(runs.iter().all(|r| r.page == 1));
    assert!((runs[0].y - 750.0).abs() < 1e-3);
    assert!(runs[0].size > runs[1].size);
    assert!((runs[1].size - runs[2].size).abs() < 1e-3);
}

#[test]
fn test_page_out_of_range() {
    let source = two_page_report().into_source();
    assert!(matches!(
        source.page_runs(3),
        Err(Error::PageOutOfRange(3, 2))
    ));
}

#[test]
fn test_font_metrics_without_outline() {
    let source = two_page_report().into_source();
    assert!(source.outline().unwrap().is_empty());

    let extraction = extract_sections(&source, "report.pdf", ErrorMode::Strict).unwrap();
    assert_eq!(extraction.method, ExtractionMethod::FontMetrics);
    assert_eq!(
        extraction.sections,
        vec![
            Section::new(Level::H2, "Overview", Some(1), "report.pdf"),
            Section::new(Level::H1, "Body line one Body line two", Some(1), "report.pdf"),
            Section::new(Level::H2, "Details", Some(2), "report.pdf"),
            Section::new(Level::H1, "More body", Some(2), "report.pdf"),
        ]
    );
}

#[test]
fn test_outline_preferred_over_fonts() {
    let mut pdf = two_page_report();
    let dest1 = pdf.page_dest(1);
    let dest2 = pdf.page_dest(2);
    let top = pdf.set_outline(vec![("Introduction", dest1), ("Appendix", dest2)]);
    let dest2 = pdf.page_dest(2);
    let child = pdf.add_children(top[0], vec![("Scope", dest2)]);
    let dest1 = pdf.page_dest(1);
    let grandchild = pdf.add_children(child[0], vec![("Terms", dest1)]);
    let dest1 = pdf.page_dest(1);
    pdf.add_children(grandchild[0], vec![("Deep note", dest1)]);

    let source = pdf.into_source();
    let extraction = extract_sections(&source, "book.pdf", ErrorMode::Strict).unwrap();
    assert_eq!(extraction.method, ExtractionMethod::Outline);

    let flat: Vec<(Level, &str, Option<u32>)> = extraction
        .sections
        .iter()
        .map(|s| (s.level, s.text.as_str(), s.page))
        .collect();
    assert_eq!(
        flat,
        vec![
            (Level::H1, "Introduction", Some(1)),
            (Level::H2, "Scope", Some(2)),
            (Level::H3, "Terms", Some(1)),
            (Level::H3, "Deep note", Some(1)),
            (Level::H1, "Appendix", Some(2)),
        ]
    );
}

#[test]
fn test_named_destinations() {
    let mut pdf = two_page_report();
    let dest2 = pdf.page_dest(2);
    let dest1 = pdf.page_dest(1);
    pdf.catalog_set("Dests", dictionary! { "details" => dest2 });
    pdf.catalog_set(
        "Names",
        dictionary! {
            "Dests" => dictionary! {
                "Names" => vec![Object::string_literal("overview"), dest1],
            },
        },
    );
    pdf.set_outline(vec![
        ("From tree", Object::string_literal("overview")),
        ("From catalog", Object::Name(b"details".to_vec())),
        ("Dangling", Object::Name(b"missing".to_vec())),
    ]);

    let source = pdf.into_source();
    let extraction = extract_sections(&source, "named.pdf", ErrorMode::Strict).unwrap();
    let pages: Vec<(&str, Option<u32>)> = extraction
        .sections
        .iter()
        .map(|s| (s.text.as_str(), s.page))
        .collect();
    assert_eq!(
        pages,
        vec![
            ("From tree", Some(1)),
            ("From catalog", Some(2)),
            ("Dangling", None),
        ]
    );
}

#[test]
fn test_outline_cycle_terminates() {
    let mut pdf = two_page_report();
    let dest1 = pdf.page_dest(1);
    let dest2 = pdf.page_dest(2);
    let ids = pdf.set_outline(vec![("First", dest1), ("Second", dest2)]);
    pdf.doc
        .get_object_mut(ids[1])
        .and_then(Object::as_dict_mut)
        .unwrap()
        .set("Next", ids[0]);

    let source = pdf.into_source();
    let titles: Vec<String> = source.outline().unwrap().into_iter().map(|n| n.title).collect();
    assert_eq!(titles, vec!["First", "Second"]);
}

#[test]
fn test_blank_page_yields_no_sections() {
    let source = TestPdf::new(&[vec![]]).into_source();
    let extraction = extract_sections(&source, "blank.pdf", ErrorMode::Strict).unwrap();
    assert_eq!(extraction.method, ExtractionMethod::FontMetrics);
    assert!(extraction.sections.is_empty());
}

fn corrupt_flate_stream() -> Stream {
    Stream::new(
        dictionary! { "Filter" => "FlateDecode" },
        b"BT /F1 11 Tf (not zlib) Tj ET".to_vec(),
    )
}

#[test]
fn test_compressed_page_decodes() {
    let mut pdf = two_page_report();
    let mut operations = vec![
        Operation::new("BT", vec![]),
        Operation::new(
            "Tf",
            vec![Object::Name(b"F1".to_vec()), Object::Integer(11)],
        ),
        Operation::new("Td", vec![Object::Integer(72), Object::Integer(700)]),
        Operation::new("Tj", vec![Object::string_literal("Packed body")]),
        Operation::new("ET", vec![]),
    ];
    // lopdf only keeps the compressed form when it is smaller
    for _ in 0..100 {
        operations.push(Operation::new("q", vec![]));
        operations.push(Operation::new("Q", vec![]));
    }
    let content = Content { operations };
    let mut stream = Stream::new(dictionary! {}, content.encode().unwrap());
    stream.compress().unwrap();
    assert!(stream.dict.get(b"Filter").is_ok());
    pdf.set_page_stream(2, stream);

    let runs = pdf.into_source().page_runs(2).unwrap();
    let texts: Vec<&str> = runs.iter().map(|r| r.text.as_str()).collect();
    assert_eq!(texts, vec!["Packed body"]);
}

#[test]
fn test_corrupt_stream_fails_strict() {
    let mut pdf = two_page_report();
    pdf.set_page_stream(2, corrupt_flate_stream());
    let source = pdf.into_source();

    assert!(matches!(source.page_runs(2), Err(Error::TextExtract(_))));
    assert!(matches!(
        extract_sections(&source, "broken.pdf", ErrorMode::Strict),
        Err(Error::TextExtract(_))
    ));
}

#[test]
fn test_corrupt_stream_skipped_lenient() {
    let mut pdf = two_page_report();
    pdf.set_page_stream(2, corrupt_flate_stream());
    let source = pdf.into_source();

    let extraction = extract_sections(&source, "broken.pdf", ErrorMode::Lenient).unwrap();
    assert_eq!(
        extraction.sections,
        vec![
            Section::new(Level::H2, "Overview", Some(1), "broken.pdf"),
            Section::new(Level::H1, "Body line one Body line two", Some(1), "broken.pdf"),
        ]
    );
}

#[test]
fn test_not_a_pdf() {
    assert!(matches!(
        LopdfSource::from_bytes(b"plain text, not a document"),
        Err(Error::UnknownFormat)
    ));
}

#[test]
fn test_open_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.pdf");
    std::fs::write(&path, two_page_report().into_bytes()).unwrap();

    let extraction = pdfrank::sections_from_file(&path).unwrap();
    assert_eq!(extraction.sections[0].source_document, "report.pdf");
    assert_eq!(extraction.sections.len(), 4);
}
