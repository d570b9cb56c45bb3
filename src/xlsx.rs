//! Excel Workbook Generator Module
//! Serializes the filtered view as a minimal .xlsx package.
//!
//! Uses direct ZIP/XML generation: the workbook is a handful of
//! SpreadsheetML parts with inline strings, which keeps the export free of
//! a heavyweight spreadsheet dependency.

use crate::data::codebook::IDENTIFIER_COLUMNS;
use crate::data::date_from_days;
use polars::prelude::*;
use std::io::{Cursor, Write};
use thiserror::Error;
use ::zip::write::FileOptions;
use ::zip::ZipWriter;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Failed to build workbook archive: {0}")]
    ZipError(#[from] ::zip::result::ZipError),
    #[error("Failed to write workbook part: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to read exported rows: {0}")]
    ColumnError(#[from] PolarsError),
}

/// Xlsx generator for the filtered view.
pub struct XlsxGenerator;

impl XlsxGenerator {
    /// Serialize a DataFrame into xlsx bytes. Patient identifier columns are
    /// removed first; an empty view still produces a header-only sheet.
    pub fn workbook_from_dataframe(
        df: &DataFrame,
        sheet_name: &str,
    ) -> Result<Vec<u8>, ExportError> {
        let export_df = df.drop_many(IDENTIFIER_COLUMNS);

        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = FileOptions::default();

        zip.start_file("[Content_Types].xml", options)?;
        zip.write_all(Self::content_types_xml().as_bytes())?;

        zip.start_file("_rels/.rels", options)?;
        zip.write_all(Self::rels_xml().as_bytes())?;

        zip.start_file("docProps/core.xml", options)?;
        zip.write_all(Self::core_props_xml().as_bytes())?;

        zip.start_file("docProps/app.xml", options)?;
        zip.write_all(Self::app_props_xml().as_bytes())?;

        zip.start_file("xl/workbook.xml", options)?;
        zip.write_all(Self::workbook_xml(sheet_name).as_bytes())?;

        zip.start_file("xl/_rels/workbook.xml.rels", options)?;
        zip.write_all(Self::workbook_rels_xml().as_bytes())?;

        zip.start_file("xl/styles.xml", options)?;
        zip.write_all(Self::styles_xml().as_bytes())?;

        zip.start_file("xl/worksheets/sheet1.xml", options)?;
        zip.write_all(Self::worksheet_xml(&export_df)?.as_bytes())?;

        let cursor = zip.finish()?;
        Ok(cursor.into_inner())
    }

    fn content_types_xml() -> &'static str {
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
<Default Extension="xml" ContentType="application/xml"/>
<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
<Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>
<Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/>
<Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/>
<Override PartName="/docProps/app.xml" ContentType="application/vnd.openxmlformats-officedocument.extended-properties+xml"/>
</Types>"#
    }

    fn rels_xml() -> &'static str {
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/>
<Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties" Target="docProps/app.xml"/>
</Relationships>"#
    }

    fn workbook_xml(sheet_name: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
<sheets><sheet name="{}" sheetId="1" r:id="rId1"/></sheets>
</workbook>"#,
            Self::escape_xml(sheet_name)
        )
    }

    fn workbook_rels_xml() -> &'static str {
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>
<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>
</Relationships>"#
    }

    fn styles_xml() -> &'static str {
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
<fonts count="1"><font><sz val="11"/><name val="Calibri"/></font></fonts>
<fills count="2"><fill><patternFill patternType="none"/></fill><fill><patternFill patternType="gray125"/></fill></fills>
<borders count="1"><border/></borders>
<cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs>
<cellXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/></cellXfs>
</styleSheet>"#
    }

    fn core_props_xml() -> &'static str {
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:dcmitype="http://purl.org/dc/dcmitype/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
<dc:title>Dados filtrados</dc:title>
<dc:creator>fisiodash</dc:creator>
<cp:lastModifiedBy>fisiodash</cp:lastModifiedBy>
<cp:revision>1</cp:revision>
</cp:coreProperties>"#
    }

    fn app_props_xml() -> &'static str {
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties" xmlns:vt="http://schemas.openxmlformats.org/officeDocument/2006/docPropsVTypes">
<Application>fisiodash</Application>
<ScaleCrop>false</ScaleCrop>
<LinksUpToDate>false</LinksUpToDate>
<SharedDoc>false</SharedDoc>
<HyperlinksChanged>false</HyperlinksChanged>
<AppVersion>16.0000</AppVersion>
</Properties>"#
    }

    fn worksheet_xml(df: &DataFrame) -> Result<String, ExportError> {
        let mut xml = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>"#,
        );

        xml.push_str(r#"<row r="1">"#);
        for (col_idx, name) in df.get_column_names().iter().enumerate() {
            xml.push_str(&Self::inline_string_cell(1, col_idx, name));
        }
        xml.push_str("</row>");

        for row_idx in 0..df.height() {
            let row_num = row_idx + 2;
            xml.push_str(&format!(r#"<row r="{}">"#, row_num));
            for (col_idx, column) in df.get_columns().iter().enumerate() {
                let value = column.get(row_idx)?;
                xml.push_str(&Self::cell_xml(row_num, col_idx, &value));
            }
            xml.push_str("</row>");
        }

        xml.push_str("</sheetData></worksheet>");
        Ok(xml)
    }

    /// One cell. Numbers stay numeric, dates render as ISO text, nulls are
    /// omitted entirely, everything else becomes an inline string.
    fn cell_xml(row: usize, col_idx: usize, value: &AnyValue) -> String {
        match value {
            AnyValue::Null => String::new(),
            AnyValue::Int8(_)
            | AnyValue::Int16(_)
            | AnyValue::Int32(_)
            | AnyValue::Int64(_)
            | AnyValue::UInt8(_)
            | AnyValue::UInt16(_)
            | AnyValue::UInt32(_)
            | AnyValue::UInt64(_)
            | AnyValue::Float32(_)
            | AnyValue::Float64(_) => format!(
                r#"<c r="{}{}"><v>{}</v></c>"#,
                Self::column_letter(col_idx),
                row,
                value
            ),
            AnyValue::Boolean(b) => format!(
                r#"<c r="{}{}" t="b"><v>{}</v></c>"#,
                Self::column_letter(col_idx),
                row,
                u8::from(*b)
            ),
            AnyValue::Date(days) => {
                let text = date_from_days(*days)
                    .map(|d| d.to_string())
                    .unwrap_or_default();
                Self::inline_string_cell(row, col_idx, &text)
            }
            other => {
                let text = other.to_string();
                Self::inline_string_cell(row, col_idx, text.trim_matches('"'))
            }
        }
    }

    fn inline_string_cell(row: usize, col_idx: usize, text: &str) -> String {
        format!(
            r#"<c r="{}{}" t="inlineStr"><is><t>{}</t></is></c>"#,
            Self::column_letter(col_idx),
            row,
            Self::escape_xml(text)
        )
    }

    /// Spreadsheet column name for a zero-based index (A, B, ..., Z, AA, ...).
    fn column_letter(mut idx: usize) -> String {
        let mut letters = Vec::new();
        loop {
            letters.push(b'A' + (idx % 26) as u8);
            if idx < 26 {
                break;
            }
            idx = idx / 26 - 1;
        }
        letters.reverse();
        String::from_utf8_lossy(&letters).into_owned()
    }

    fn escape_xml(text: &str) -> String {
        text.replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;")
            .replace('"', "&quot;")
            .replace('\'', "&apos;")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Read;

    fn sheet_xml(bytes: &[u8]) -> String {
        let mut archive = ::zip::ZipArchive::new(Cursor::new(bytes.to_vec())).unwrap();
        let mut part = archive.by_name("xl/worksheets/sheet1.xml").unwrap();
        let mut xml = String::new();
        part.read_to_string(&mut xml).unwrap();
        xml
    }

    fn sample_df() -> DataFrame {
        DataFrame::new(vec![
            Series::new("record_id".into(), vec![1i64, 2]).into(),
            Series::new("nome_paciente".into(), vec!["A", "B"]).into(),
            Series::new("tipo".into(), vec!["Admissão", "Alta"]).into(),
            Series::new("sexo".into(), vec![Some("Feminino"), None]).into(),
            Series::new("ano_inicio".into(), vec![2023i32, 2024]).into(),
        ])
        .unwrap()
    }

    #[test]
    fn identifier_columns_are_stripped() {
        let bytes = XlsxGenerator::workbook_from_dataframe(&sample_df(), "dados").unwrap();
        let xml = sheet_xml(&bytes);
        assert!(!xml.contains("record_id"));
        assert!(!xml.contains("nome_paciente"));
        assert!(xml.contains("tipo"));
        assert!(xml.contains("ano_inicio"));
    }

    #[test]
    fn row_count_round_trips() {
        let df = sample_df();
        let bytes = XlsxGenerator::workbook_from_dataframe(&df, "dados").unwrap();
        let xml = sheet_xml(&bytes);
        // Header row plus one row per record
        assert_eq!(xml.matches("<row ").count(), df.height() + 1);
        assert!(xml.contains("Admissão"));
        assert!(xml.contains("<v>2023</v>"));
    }

    #[test]
    fn empty_view_exports_header_only() {
        let df = sample_df().head(Some(0));
        let bytes = XlsxGenerator::workbook_from_dataframe(&df, "dados").unwrap();
        let xml = sheet_xml(&bytes);
        assert_eq!(xml.matches("<row ").count(), 1);
    }

    #[test]
    fn workbook_parts_are_present() {
        let bytes = XlsxGenerator::workbook_from_dataframe(&sample_df(), "dados").unwrap();
        let mut archive = ::zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        for part in [
            "[Content_Types].xml",
            "_rels/.rels",
            "xl/workbook.xml",
            "xl/_rels/workbook.xml.rels",
            "xl/styles.xml",
            "xl/worksheets/sheet1.xml",
        ] {
            assert!(archive.by_name(part).is_ok(), "missing part {}", part);
        }
    }

    #[test]
    fn column_letters_follow_spreadsheet_order() {
        assert_eq!(XlsxGenerator::column_letter(0), "A");
        assert_eq!(XlsxGenerator::column_letter(25), "Z");
        assert_eq!(XlsxGenerator::column_letter(26), "AA");
        assert_eq!(XlsxGenerator::column_letter(701), "ZZ");
        assert_eq!(XlsxGenerator::column_letter(702), "AAA");
    }

    #[test]
    fn xml_specials_are_escaped() {
        assert_eq!(
            XlsxGenerator::escape_xml(r#"<Dor & "rigidez">"#),
            "&lt;Dor &amp; &quot;rigidez&quot;&gt;"
        );
    }
}
