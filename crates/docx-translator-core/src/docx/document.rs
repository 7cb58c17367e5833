use std::io::{Cursor, Read, Write};
use std::path::Path;

use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use super::xml::{XmlDocument, XmlElement, XmlNode};
use crate::error::{Error, Result};

/// Package part holding the main document body
pub const DOCUMENT_PART: &str = "word/document.xml";

/// WordprocessingML main namespace
const W_NAMESPACE: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

/// One zip entry, kept verbatim unless it is the document part
struct PackageEntry {
    name: String,
    data: Vec<u8>,
    compression: CompressionMethod,
    is_dir: bool,
}

/// A Word document opened for paragraph-level text editing.
///
/// Only `word/document.xml` is parsed; every other part of the package is
/// carried through untouched. Paragraphs are addressed in a fixed order:
/// body paragraphs first, then the paragraphs of each table cell.
pub struct DocxDocument {
    entries: Vec<PackageEntry>,
    document_index: usize,
    body: XmlDocument,
    /// Prefix bound to the WordprocessingML namespace (usually `w`)
    prefix: String,
}

impl DocxDocument {
    /// Open a DOCX package from bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))?;

        let mut entries = Vec::with_capacity(archive.len());
        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            let mut data = Vec::new();
            if !file.is_dir() {
                file.read_to_end(&mut data)?;
            }
            entries.push(PackageEntry {
                name: file.name().to_string(),
                data,
                compression: file.compression(),
                is_dir: file.is_dir(),
            });
        }

        let document_index = entries
            .iter()
            .position(|e| e.name == DOCUMENT_PART)
            .ok_or_else(|| Error::DocxMissingPart(DOCUMENT_PART.to_string()))?;

        let xml = std::str::from_utf8(&entries[document_index].data)
            .map_err(|e| Error::Docx(format!("{DOCUMENT_PART} is not UTF-8: {e}")))?;
        let body = XmlDocument::parse(xml)?;
        let prefix = namespace_prefix(&body.root);

        debug!(
            "Opened DOCX package with {} parts (namespace prefix '{}')",
            entries.len(),
            prefix
        );

        Ok(Self {
            entries,
            document_index,
            body,
            prefix,
        })
    }

    /// Open a DOCX package from a file path
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = std::fs::read(path.as_ref())?;
        Self::from_bytes(&bytes)
    }

    /// Number of addressable paragraphs
    pub fn paragraph_count(&self) -> usize {
        self.paragraph_paths().len()
    }

    /// Text of every paragraph, in traversal order
    pub fn paragraph_texts(&self) -> Vec<String> {
        self.paragraph_paths()
            .iter()
            .filter_map(|path| self.body.root.descendant(path))
            .map(|p| self.paragraph_text(p))
            .collect()
    }

    /// Replace paragraph texts, in traversal order.
    ///
    /// Paragraphs whose text is unchanged keep their runs as they are.
    /// Returns how many paragraphs were rewritten.
    pub fn set_paragraph_texts(&mut self, texts: &[String]) -> Result<usize> {
        let paths = self.paragraph_paths();
        if paths.len() != texts.len() {
            return Err(Error::Docx(format!(
                "expected {} paragraph texts, got {}",
                paths.len(),
                texts.len()
            )));
        }

        let w = self.prefix.clone();
        let mut rewritten = 0;
        for (path, text) in paths.iter().zip(texts) {
            let current = self
                .body
                .root
                .descendant(path)
                .map(|p| self.paragraph_text(p));
            if current.as_deref() == Some(text.as_str()) {
                continue;
            }
            let paragraph = self
                .body
                .root
                .descendant_mut(path)
                .ok_or_else(|| Error::Docx("paragraph moved while editing".to_string()))?;
            set_paragraph_text(paragraph, &w, text);
            rewritten += 1;
        }

        Ok(rewritten)
    }

    /// Serialize the package
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let document_xml = self.body.to_bytes()?;
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));

        for (i, entry) in self.entries.iter().enumerate() {
            let options = SimpleFileOptions::default().compression_method(entry.compression);
            if entry.is_dir {
                writer.add_directory(entry.name.as_str(), options)?;
                continue;
            }
            writer.start_file(entry.name.as_str(), options)?;
            if i == self.document_index {
                writer.write_all(&document_xml)?;
            } else {
                writer.write_all(&entry.data)?;
            }
        }

        Ok(writer.finish()?.into_inner())
    }

    /// Write the package to a file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path.as_ref(), self.to_bytes()?)?;
        Ok(())
    }

    fn tag(&self, local: &str) -> String {
        qualified(&self.prefix, local)
    }

    /// Child-index paths from the root to each paragraph.
    ///
    /// Body-level paragraphs come first, then each body-level table's cell
    /// paragraphs row by row, recursing into nested tables.
    fn paragraph_paths(&self) -> Vec<Vec<usize>> {
        let body_tag = self.tag("body");
        let p_tag = self.tag("p");
        let tbl_tag = self.tag("tbl");

        let Some((body_idx, body)) = self
            .body
            .root
            .children
            .iter()
            .enumerate()
            .find_map(|(i, n)| match n {
                XmlNode::Element(e) if e.name == body_tag => Some((i, e)),
                _ => None,
            })
        else {
            return Vec::new();
        };

        let mut paths = Vec::new();
        for (i, child) in element_children(body) {
            if child.name == p_tag {
                paths.push(vec![body_idx, i]);
            }
        }
        for (i, child) in element_children(body) {
            if child.name == tbl_tag {
                self.collect_table(child, &[body_idx, i], &mut paths);
            }
        }
        paths
    }

    fn collect_table(&self, table: &XmlElement, base: &[usize], out: &mut Vec<Vec<usize>>) {
        let tr_tag = self.tag("tr");
        let tc_tag = self.tag("tc");
        let p_tag = self.tag("p");
        let tbl_tag = self.tag("tbl");

        for (ri, row) in element_children(table).filter(|(_, e)| e.name == tr_tag) {
            for (ci, cell) in element_children(row).filter(|(_, e)| e.name == tc_tag) {
                let cell_path = [base, &[ri, ci]].concat();
                for (pi, child) in element_children(cell) {
                    if child.name == p_tag {
                        out.push([cell_path.as_slice(), &[pi]].concat());
                    } else if child.name == tbl_tag {
                        self.collect_table(child, &[cell_path.as_slice(), &[pi]].concat(), out);
                    }
                }
            }
        }
    }

    /// Visible text of a paragraph: its runs, including hyperlinked runs.
    fn paragraph_text(&self, paragraph: &XmlElement) -> String {
        let r_tag = self.tag("r");
        let hyperlink_tag = self.tag("hyperlink");

        let mut text = String::new();
        for child in paragraph.elements() {
            if child.name == r_tag {
                self.push_run_text(child, &mut text);
            } else if child.name == hyperlink_tag {
                for run in child.elements().filter(|e| e.name == r_tag) {
                    self.push_run_text(run, &mut text);
                }
            }
        }
        text
    }

    fn push_run_text(&self, run: &XmlElement, out: &mut String) {
        let local = |e: &XmlElement| {
            e.name
                .strip_prefix(self.prefix.as_str())
                .and_then(|rest| rest.strip_prefix(':'))
                .map(str::to_string)
                .unwrap_or_else(|| e.name.clone())
        };

        for child in run.elements() {
            match local(child).as_str() {
                "t" => out.push_str(&child.text()),
                "tab" | "ptab" => out.push('\t'),
                "cr" => out.push('\n'),
                "br" => {
                    let kind = child.attribute(&self.tag("type"));
                    if kind.is_none_or(|k| k == "textWrapping") {
                        out.push('\n');
                    }
                }
                "noBreakHyphen" => out.push('-'),
                _ => {}
            }
        }
    }
}

impl std::fmt::Debug for DocxDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocxDocument")
            .field("parts", &self.entries.len())
            .field("prefix", &self.prefix)
            .finish_non_exhaustive()
    }
}

fn qualified(prefix: &str, local: &str) -> String {
    if prefix.is_empty() {
        local.to_string()
    } else {
        format!("{prefix}:{local}")
    }
}

fn element_children(parent: &XmlElement) -> impl Iterator<Item = (usize, &XmlElement)> {
    parent
        .children
        .iter()
        .enumerate()
        .filter_map(|(i, n)| match n {
            XmlNode::Element(e) => Some((i, e)),
            _ => None,
        })
}

/// Prefix declared for the WordprocessingML namespace on the root element.
fn namespace_prefix(root: &XmlElement) -> String {
    root.attributes
        .iter()
        .find_map(|(k, v)| {
            if v != W_NAMESPACE {
                return None;
            }
            if k == "xmlns" {
                Some(String::new())
            } else {
                k.strip_prefix("xmlns:").map(str::to_string)
            }
        })
        .unwrap_or_else(|| "w".to_string())
}

/// Replace a paragraph's content with a single run holding `text`.
///
/// Paragraph properties stay; the first run's character properties are
/// carried over to the new run.
fn set_paragraph_text(paragraph: &mut XmlElement, w: &str, text: &str) {
    let ppr_tag = qualified(w, "pPr");
    let r_tag = qualified(w, "r");
    let rpr_tag = qualified(w, "rPr");

    let run_props = paragraph
        .elements()
        .find(|e| e.name == r_tag)
        .and_then(|run| run.elements().find(|e| e.name == rpr_tag))
        .cloned();

    paragraph
        .children
        .retain(|n| matches!(n, XmlNode::Element(e) if e.name == ppr_tag));

    let mut run = XmlElement::new(r_tag);
    if let Some(props) = run_props {
        run.children.push(XmlNode::Element(props));
    }
    append_run_content(&mut run, w, text);
    paragraph.children.push(XmlNode::Element(run));
}

/// Split text into `w:t`, `w:tab` and `w:br` children.
fn append_run_content(run: &mut XmlElement, w: &str, text: &str) {
    let mut pending = String::new();

    let flush = |run: &mut XmlElement, pending: &mut String| {
        if pending.is_empty() {
            return;
        }
        let mut t = XmlElement::new(qualified(w, "t"));
        if pending.trim() != pending.as_str() {
            t = t.with_attribute("xml:space", "preserve");
        }
        run.children
            .push(XmlNode::Element(t.with_text(std::mem::take(pending))));
    };

    for ch in text.chars() {
        match ch {
            '\t' => {
                flush(run, &mut pending);
                run.children
                    .push(XmlNode::Element(XmlElement::new(qualified(w, "tab"))));
            }
            '\n' | '\r' => {
                flush(run, &mut pending);
                run.children
                    .push(XmlNode::Element(XmlElement::new(qualified(w, "br"))));
            }
            c => pending.push(c),
        }
    }
    flush(run, &mut pending);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn package(document_xml: &str) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();
        writer.start_file("[Content_Types].xml", options).unwrap();
        writer.write_all(b"<Types/>").unwrap();
        writer.start_file(DOCUMENT_PART, options).unwrap();
        writer.write_all(document_xml.as_bytes()).unwrap();
        writer.finish().unwrap().into_inner()
    }

    fn body(inner: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="{W_NAMESPACE}"><w:body>{inner}<w:sectPr/></w:body></w:document>"#
        )
    }

    #[test]
    fn test_run_text_semantics() {
        let xml = body(
            r#"<w:p><w:r><w:t>a</w:t><w:tab/><w:t>b</w:t><w:br/><w:t>c</w:t><w:br w:type="page"/><w:noBreakHyphen/></w:r><w:hyperlink><w:r><w:t>link</w:t></w:r></w:hyperlink></w:p>"#,
        );
        let doc = DocxDocument::from_bytes(&package(&xml)).unwrap();
        assert_eq!(doc.paragraph_texts(), ["a\tb\nc-link"]);
    }

    #[test]
    fn test_tables_come_after_body_paragraphs() {
        let xml = body(
            r"<w:p><w:r><w:t>first</w:t></w:r></w:p><w:tbl><w:tr><w:tc><w:p><w:r><w:t>cell</w:t></w:r></w:p></w:tc></w:tr></w:tbl><w:p><w:r><w:t>last</w:t></w:r></w:p>",
        );
        let doc = DocxDocument::from_bytes(&package(&xml)).unwrap();
        assert_eq!(doc.paragraph_texts(), ["first", "last", "cell"]);
    }

    #[test]
    fn test_nested_tables_are_visited() {
        let xml = body(
            r"<w:tbl><w:tr><w:tc><w:p/><w:tbl><w:tr><w:tc><w:p><w:r><w:t>inner</w:t></w:r></w:p></w:tc></w:tr></w:tbl></w:tc></w:tr></w:tbl>",
        );
        let doc = DocxDocument::from_bytes(&package(&xml)).unwrap();
        assert_eq!(doc.paragraph_texts(), ["", "inner"]);
    }

    #[test]
    fn test_set_text_keeps_paragraph_and_run_properties() {
        let xml = body(
            r#"<w:p><w:pPr><w:pStyle w:val="Heading1"/></w:pPr><w:r><w:rPr><w:b/></w:rPr><w:t>Hel</w:t></w:r><w:r><w:t>lo</w:t></w:r></w:p>"#,
        );
        let mut doc = DocxDocument::from_bytes(&package(&xml)).unwrap();
        let changed = doc.set_paragraph_texts(&[" Bonjour\tmonde ".to_string()]).unwrap();
        assert_eq!(changed, 1);

        let reopened = DocxDocument::from_bytes(&doc.to_bytes().unwrap()).unwrap();
        assert_eq!(reopened.paragraph_texts(), [" Bonjour\tmonde "]);

        let out = String::from_utf8(reopened.body.to_bytes().unwrap()).unwrap();
        assert!(out.contains(r#"<w:pStyle w:val="Heading1"/>"#));
        assert!(out.contains("<w:rPr><w:b/></w:rPr>"));
        assert!(out.contains(r#"<w:t xml:space="preserve"> Bonjour</w:t><w:tab/>"#));
    }

    #[test]
    fn test_unchanged_paragraphs_are_not_rewritten() {
        let xml = body(r"<w:p><w:r><w:t>Hel</w:t></w:r><w:r><w:t>lo</w:t></w:r></w:p><w:p/>");
        let mut doc = DocxDocument::from_bytes(&package(&xml)).unwrap();
        let changed = doc
            .set_paragraph_texts(&["Hello".to_string(), String::new()])
            .unwrap();
        assert_eq!(changed, 0);
    }

    #[test]
    fn test_text_count_mismatch() {
        let xml = body(r"<w:p/>");
        let mut doc = DocxDocument::from_bytes(&package(&xml)).unwrap();
        assert!(matches!(doc.set_paragraph_texts(&[]), Err(Error::Docx(_))));
    }

    #[test]
    fn test_missing_document_part() {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file("[Content_Types].xml", SimpleFileOptions::default())
            .unwrap();
        writer.write_all(b"<Types/>").unwrap();
        let bytes = writer.finish().unwrap().into_inner();

        assert!(matches!(
            DocxDocument::from_bytes(&bytes),
            Err(Error::DocxMissingPart(_))
        ));
    }

    #[test]
    fn test_not_a_zip() {
        assert!(matches!(DocxDocument::from_bytes(b"plain text"), Err(Error::Zip(_))));
    }

    #[test]
    fn test_custom_namespace_prefix() {
        let xml = format!(
            r#"<ns0:document xmlns:ns0="{W_NAMESPACE}"><ns0:body><ns0:p><ns0:r><ns0:t>x</ns0:t></ns0:r></ns0:p></ns0:body></ns0:document>"#
        );
        let mut doc = DocxDocument::from_bytes(&package(&xml)).unwrap();
        assert_eq!(doc.paragraph_texts(), ["x"]);
        doc.set_paragraph_texts(&["y".to_string()]).unwrap();
        assert_eq!(doc.paragraph_texts(), ["y"]);
    }
}
