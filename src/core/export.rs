//! Spreadsheet export. The workbook is a minimal Office Open XML package
//! (one worksheet, shared strings, a bold header style) built in memory and
//! handed to storage in a single write.

use crate::domain::model::Listing;
use crate::domain::ports::Storage;
use crate::utils::error::ExportError;
use std::collections::HashMap;
use std::io::Write;
use zip::result::ZipError;
use zip::write::{SimpleFileOptions, ZipWriter};
use zip::CompressionMethod;

pub const HEADER: [&str; 4] = ["Name", "Brand", "Price", "Availability"];
pub const DEFAULT_SHEET_NAME: &str = "Sheet1";

const COLUMNS: [char; 4] = ['A', 'B', 'C', 'D'];
const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;
const NS_MAIN: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
const NS_REL: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

pub struct XlsxExporter<S: Storage> {
    storage: S,
    sheet_name: String,
}

impl<S: Storage> XlsxExporter<S> {
    pub fn new(storage: S, sheet_name: impl Into<String>) -> Self {
        Self {
            storage,
            sheet_name: sheet_name.into(),
        }
    }

    /// Writes one row per listing to `path`, replacing any existing file.
    pub async fn export(&self, listings: &[Listing], path: &str) -> Result<(), ExportError> {
        let workbook = build_workbook(listings, &self.sheet_name)?;
        tracing::debug!(
            "Writing workbook ({} bytes, {} rows) to {}",
            workbook.len(),
            listings.len(),
            path
        );
        self.storage.write_file(path, &workbook).await
    }
}

enum Cell {
    Text(usize),
    Number(f64),
}

#[derive(Default)]
struct SharedStrings {
    index: HashMap<String, usize>,
    strings: Vec<String>,
    references: usize,
}

impl SharedStrings {
    fn intern(&mut self, value: &str) -> Cell {
        self.references += 1;
        if let Some(&idx) = self.index.get(value) {
            return Cell::Text(idx);
        }
        let idx = self.strings.len();
        self.strings.push(value.to_string());
        self.index.insert(value.to_string(), idx);
        Cell::Text(idx)
    }

    fn to_xml(&self) -> String {
        let mut xml = format!(
            r#"{XML_DECL}<sst xmlns="{NS_MAIN}" count="{}" uniqueCount="{}">"#,
            self.references,
            self.strings.len()
        );
        for s in &self.strings {
            xml.push_str(r#"<si><t xml:space="preserve">"#);
            xml.push_str(&xml_text(s));
            xml.push_str("</t></si>");
        }
        xml.push_str("</sst>");
        xml
    }
}

/// Escapes markup characters and drops control characters XML 1.0 cannot carry.
fn xml_text(value: &str) -> String {
    let cleaned: String = value
        .chars()
        .filter(|c| !c.is_control() || matches!(c, '\t' | '\n' | '\r'))
        .collect();
    quick_xml::escape::escape(cleaned.as_str()).into_owned()
}

fn sheet_xml(rows: &[Vec<Cell>]) -> String {
    let mut xml = format!(r#"{XML_DECL}<worksheet xmlns="{NS_MAIN}"><sheetData>"#);
    for (i, row) in rows.iter().enumerate() {
        let r = i + 1;
        // Style 1 is the bold header font.
        let style = if r == 1 { r#" s="1""# } else { "" };
        xml.push_str(&format!(r#"<row r="{r}">"#));
        for (col, cell) in COLUMNS.iter().zip(row) {
            match cell {
                Cell::Text(idx) => {
                    xml.push_str(&format!(r#"<c r="{col}{r}" t="s"{style}><v>{idx}</v></c>"#))
                }
                Cell::Number(n) => {
                    xml.push_str(&format!(r#"<c r="{col}{r}"{style}><v>{n}</v></c>"#))
                }
            }
        }
        xml.push_str("</row>");
    }
    xml.push_str("</sheetData></worksheet>");
    xml
}

fn content_types_xml() -> String {
    format!(
        concat!(
            "{}",
            r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
            r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#,
            r#"<Default Extension="xml" ContentType="application/xml"/>"#,
            r#"<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>"#,
            r#"<Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#,
            r#"<Override PartName="/xl/sharedStrings.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sharedStrings+xml"/>"#,
            r#"<Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/>"#,
            r#"<Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/>"#,
            "</Types>"
        ),
        XML_DECL
    )
}

fn root_rels_xml() -> String {
    format!(
        concat!(
            "{}",
            r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
            r#"<Relationship Id="rId1" Type="{}/officeDocument" Target="xl/workbook.xml"/>"#,
            r#"<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/>"#,
            "</Relationships>"
        ),
        XML_DECL, NS_REL
    )
}

fn workbook_xml(sheet_name: &str) -> String {
    format!(
        r#"{XML_DECL}<workbook xmlns="{NS_MAIN}" xmlns:r="{NS_REL}"><sheets><sheet name="{}" sheetId="1" r:id="rId1"/></sheets></workbook>"#,
        xml_text(sheet_name)
    )
}

fn workbook_rels_xml() -> String {
    format!(
        concat!(
            "{}",
            r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
            r#"<Relationship Id="rId1" Type="{rel}/worksheet" Target="worksheets/sheet1.xml"/>"#,
            r#"<Relationship Id="rId2" Type="{rel}/sharedStrings" Target="sharedStrings.xml"/>"#,
            r#"<Relationship Id="rId3" Type="{rel}/styles" Target="styles.xml"/>"#,
            "</Relationships>"
        ),
        XML_DECL,
        rel = NS_REL
    )
}

fn styles_xml() -> String {
    format!(
        concat!(
            "{}",
            r#"<styleSheet xmlns="{}">"#,
            r#"<fonts count="2"><font><sz val="11"/><name val="Calibri"/></font><font><b/><sz val="11"/><name val="Calibri"/></font></fonts>"#,
            r#"<fills count="2"><fill><patternFill patternType="none"/></fill><fill><patternFill patternType="gray125"/></fill></fills>"#,
            r#"<borders count="1"><border><left/><right/><top/><bottom/><diagonal/></border></borders>"#,
            r#"<cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs>"#,
            r#"<cellXfs count="2"><xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/><xf numFmtId="0" fontId="1" fillId="0" borderId="0" xfId="0" applyFont="1"/></cellXfs>"#,
            r#"<cellStyles count="1"><cellStyle name="Normal" xfId="0" builtinId="0"/></cellStyles>"#,
            "</styleSheet>"
        ),
        XML_DECL, NS_MAIN
    )
}

fn core_props_xml() -> String {
    let created = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
    format!(
        concat!(
            "{}",
            r#"<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">"#,
            "<dc:creator>{}</dc:creator>",
            r#"<dcterms:created xsi:type="dcterms:W3CDTF">{}</dcterms:created>"#,
            "</cp:coreProperties>"
        ),
        XML_DECL,
        env!("CARGO_PKG_NAME"),
        created
    )
}

/// Encodes `listings` as an `.xlsx` package with a header row.
pub fn build_workbook(listings: &[Listing], sheet_name: &str) -> Result<Vec<u8>, ExportError> {
    let mut strings = SharedStrings::default();
    let mut rows = Vec::with_capacity(listings.len() + 1);
    rows.push(HEADER.iter().map(|h| strings.intern(h)).collect::<Vec<_>>());
    for listing in listings {
        rows.push(vec![
            strings.intern(&listing.name),
            strings.intern(listing.brand_label()),
            Cell::Number(listing.price),
            strings.intern(listing.availability.label()),
        ]);
    }

    let parts = [
        ("[Content_Types].xml", content_types_xml()),
        ("_rels/.rels", root_rels_xml()),
        ("docProps/core.xml", core_props_xml()),
        ("xl/workbook.xml", workbook_xml(sheet_name)),
        ("xl/_rels/workbook.xml.rels", workbook_rels_xml()),
        ("xl/styles.xml", styles_xml()),
        ("xl/sharedStrings.xml", strings.to_xml()),
        ("xl/worksheets/sheet1.xml", sheet_xml(&rows)),
    ];

    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
    for (name, body) in parts {
        zip.start_file(name, options)?;
        zip.write_all(body.as_bytes()).map_err(ZipError::from)?;
    }

    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}
