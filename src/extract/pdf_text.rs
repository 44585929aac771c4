use std::path::Path;
use std::process::Command;

use anyhow::{Context, Result, bail};
use lopdf::Document;

use crate::cli::TextBackend;

/// Text of one physical page. `blocks` holds the page split into disjoint
/// text blocks when the backend can provide them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageText {
    pub number: usize,
    pub text: String,
    pub blocks: Option<Vec<String>>,
}

impl PageText {
    pub fn new(number: usize, text: impl Into<String>) -> Self {
        Self {
            number,
            text: text.into(),
            blocks: None,
        }
    }

    pub fn with_blocks(number: usize, text: impl Into<String>) -> Self {
        let text = text.into();
        let blocks = split_blocks(&text);
        Self {
            number,
            text,
            blocks: Some(blocks),
        }
    }

    /// Blocks to scan; the whole page counts as one block when none were provided.
    pub fn scan_blocks(&self) -> Vec<&str> {
        match &self.blocks {
            Some(blocks) => blocks.iter().map(String::as_str).collect(),
            None => vec![self.text.as_str()],
        }
    }
}

/// Reads the text layer of a PDF page by page. Implementations must release
/// the document before returning.
pub trait PageSource {
    fn name(&self) -> &'static str;

    fn read_pages(&self, pdf_path: &Path, max_pages: Option<usize>) -> Result<Vec<PageText>>;
}

pub fn page_source_for(backend: TextBackend) -> Box<dyn PageSource> {
    match backend {
        TextBackend::Pdftotext => Box::new(PdftotextSource),
        TextBackend::Lopdf => Box::new(LopdfSource),
    }
}

/// Poppler's `pdftotext`, one form feed per page break.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdftotextSource;

impl PageSource for PdftotextSource {
    fn name(&self) -> &'static str {
        "pdftotext"
    }

    fn read_pages(&self, pdf_path: &Path, max_pages: Option<usize>) -> Result<Vec<PageText>> {
        let mut command = Command::new("pdftotext");
        command.arg("-enc").arg("UTF-8").arg("-f").arg("1");
        if let Some(max_pages) = max_pages {
            command.arg("-l").arg(max_pages.to_string());
        }
        command.arg(pdf_path).arg("-");

        let output = command
            .output()
            .with_context(|| format!("failed to execute pdftotext for {}", pdf_path.display()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!(
                "pdftotext returned non-zero exit status for {}: {}",
                pdf_path.display(),
                stderr.trim()
            );
        }

        let raw = String::from_utf8_lossy(&output.stdout);
        Ok(split_form_feed_pages(&raw))
    }
}

/// Pure Rust text extraction through `lopdf`. Its text carries no paragraph
/// breaks, so each page is scanned as a single block.
#[derive(Debug, Clone, Copy, Default)]
pub struct LopdfSource;

impl PageSource for LopdfSource {
    fn name(&self) -> &'static str {
        "lopdf"
    }

    fn read_pages(&self, pdf_path: &Path, max_pages: Option<usize>) -> Result<Vec<PageText>> {
        let document = Document::load(pdf_path)
            .with_context(|| format!("failed to load {}", pdf_path.display()))?;

        let page_numbers: Vec<u32> = document
            .get_pages()
            .keys()
            .copied()
            .take(max_pages.unwrap_or(usize::MAX))
            .collect();

        let mut pages = Vec::with_capacity(page_numbers.len());
        for (index, page_number) in page_numbers.into_iter().enumerate() {
            let text = document.extract_text(&[page_number]).with_context(|| {
                format!(
                    "failed to extract text from {} page {}",
                    pdf_path.display(),
                    page_number
                )
            })?;
            pages.push(PageText::new(index + 1, text.replace('\u{0000}', "")));
        }

        Ok(pages)
    }
}

fn split_form_feed_pages(raw: &str) -> Vec<PageText> {
    let mut pages: Vec<String> = raw
        .split('\u{000C}')
        .map(|chunk| chunk.replace('\u{0000}', ""))
        .collect();

    while let Some(last_page) = pages.last() {
        if last_page.trim().is_empty() {
            pages.pop();
            continue;
        }
        break;
    }

    pages
        .into_iter()
        .enumerate()
        .map(|(index, text)| PageText::with_blocks(index + 1, text))
        .collect()
}

/// Groups consecutive non-blank lines into blocks.
pub fn split_blocks(text: &str) -> Vec<String> {
    let mut blocks = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in text.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                blocks.push(current.join("\n"));
                current.clear();
            }
            continue;
        }
        current.push(line);
    }

    if !current.is_empty() {
        blocks.push(current.join("\n"));
    }

    blocks
}

#[cfg(test)]
mod tests {
    use lopdf::content::{Content, Operation};
    use lopdf::{Object, Stream, dictionary};

    use super::*;
    use crate::extract::{ExtractionOptions, Recognizers, process_batch_folder};

    /// Writes a PDF with one line of Courier text per page.
    fn write_text_pdf(path: &Path, pages: &[&str]) {
        let mut document = Document::with_version("1.5");
        let pages_id = document.new_object_id();
        let font_id = document.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = document.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut kids: Vec<Object> = Vec::new();
        for text in pages {
            let content = Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 12.into()]),
                    Operation::new("Td", vec![50.into(), 700.into()]),
                    Operation::new("Tj", vec![Object::string_literal(*text)]),
                    Operation::new("ET", vec![]),
                ],
            };
            let content_id = document.add_object(Stream::new(
                dictionary! {},
                content.encode().expect("content should encode"),
            ));
            let page_id = document.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        let page_count = kids.len() as i64;
        document.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => page_count,
                "Resources" => resources_id,
                "MediaBox" => vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(595),
                    Object::Integer(842),
                ],
            }),
        );
        let catalog_id = document.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        document.trailer.set("Root", catalog_id);
        document.save(path).expect("pdf should be saved");
    }

    const LOPDF_PAGES: [&str; 3] = [
        "2024_SOC-X1-ARC0-00012 C03 P01 2024.05.01",
        "2024_SOC-X1-ARC0-00012 C09 P09",
        "1111_SOC-A-ARC0-00001",
    ];

    #[test]
    fn lopdf_source_reads_pages_in_order_and_honors_page_limit() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let pdf_path = dir.path().join("2024_SOC-X1-ARC0-00012.pdf");
        write_text_pdf(&pdf_path, &LOPDF_PAGES);

        let pages = LopdfSource
            .read_pages(&pdf_path, None)
            .expect("pages should be read");
        assert_eq!(pages.len(), 3);
        assert_eq!(
            pages.iter().map(|page| page.number).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
        assert!(pages[0].text.contains("C03 P01"));
        assert!(pages[2].text.contains("1111_SOC-A-ARC0-00001"));
        assert!(pages.iter().all(|page| !page.text.contains('\u{0000}')));
        assert!(pages.iter().all(|page| page.blocks.is_none()));

        let limited = LopdfSource
            .read_pages(&pdf_path, Some(2))
            .expect("pages should be read");
        assert_eq!(limited.len(), 2);
        assert!(limited[1].text.contains("C09 P09"));
    }

    #[test]
    fn lopdf_source_feeds_batch_extraction() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let folder = dir.path().join("2024.06.10");
        std::fs::create_dir_all(&folder).expect("batch folder should be created");
        write_text_pdf(&folder.join("2024_SOC-X1-ARC0-00012.pdf"), &LOPDF_PAGES);

        let recognizers = Recognizers::new().expect("recognizers should compile");
        let outcome = process_batch_folder(
            &LopdfSource,
            &recognizers,
            &folder,
            &ExtractionOptions::default(),
        );

        assert!(outcome.diagnostics.is_empty());
        assert_eq!(outcome.batch_date.as_deref(), Some("2024/06/10"));
        assert_eq!(outcome.pdf_count, 1);
        assert_eq!(outcome.page_count, 3);
        assert_eq!(outcome.records.len(), 2);

        let first = &outcome.records[0];
        assert_eq!(first.drawing_number, "2024_SOC-X1-ARC0-00012");
        assert_eq!(first.c_revision, "C03");
        assert_eq!(first.p_revision, "P01");
        assert_eq!(first.c_revision_date, "2024/05/01");
        assert_eq!(first.source_page, 1);

        let second = &outcome.records[1];
        assert_eq!(second.drawing_number, "1111_SOC-A-ARC0-00001");
        assert_eq!(second.c_revision, "X");
        assert_eq!(second.p_revision, "X");
        assert_eq!(second.p_revision_date, "2024/06/10");
        assert_eq!(second.source_page, 3);
    }

    #[test]
    fn split_form_feed_pages_drops_trailing_empty_pages() {
        let pages = split_form_feed_pages("first page\n\u{000C}second\u{0000} page\n\u{000C}\n");
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].number, 1);
        assert_eq!(pages[1].number, 2);
        assert_eq!(pages[1].text, "second page\n");
    }

    #[test]
    fn split_blocks_groups_lines_between_blank_lines() {
        let blocks = split_blocks("TITLE\nline two\n\n\n  \nREV C01\nP02\n");
        assert_eq!(blocks, vec!["TITLE\nline two", "REV C01\nP02"]);
    }

    #[test]
    fn scan_blocks_falls_back_to_whole_page() {
        let page = PageText::new(1, "only text");
        assert_eq!(page.scan_blocks(), vec!["only text"]);

        let page = PageText::with_blocks(1, "a\n\nb");
        assert_eq!(page.scan_blocks(), vec!["a", "b"]);
    }
}
