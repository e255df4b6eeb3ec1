// ==========================================
// 合同定价引擎 - 文件解析器
// ==========================================
// 支持: Excel (.xlsx/.xls) / CSV (.csv)
// 输出: 表头 → 单元格文本,附源文件行号
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use calamine::{open_workbook_auto, Reader};
use csv::ReaderBuilder;
use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

/// 源文件中的一行（row_number 从 1 开始,表头为第 1 行）
#[derive(Debug, Clone, PartialEq)]
pub struct SourceRow {
    pub row_number: usize,
    pub fields: HashMap<String, String>,
}

/// 文件解析接口
pub trait FileParser {
    fn parse_rows(&self, file_path: &Path) -> ImportResult<Vec<SourceRow>>;
}

fn ensure_exists(path: &Path) -> ImportResult<()> {
    if !path.exists() {
        return Err(ImportError::FileNotFound(path.display().to_string()));
    }
    Ok(())
}

fn build_row(
    headers: &[String],
    cells: impl Iterator<Item = String>,
    row_number: usize,
) -> Option<SourceRow> {
    let mut fields = HashMap::new();
    for (col_idx, value) in cells.enumerate() {
        if let Some(header) = headers.get(col_idx) {
            fields.insert(header.clone(), value.trim().to_string());
        }
    }

    // 跳过完全空白的行
    if fields.values().all(|v| v.is_empty()) {
        return None;
    }
    Some(SourceRow { row_number, fields })
}

// ==========================================
// CSV Parser
// ==========================================
pub struct CsvParser;

impl FileParser for CsvParser {
    fn parse_rows(&self, file_path: &Path) -> ImportResult<Vec<SourceRow>> {
        ensure_exists(file_path)?;

        let file = File::open(file_path)?;
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true) // 允许行长度不一致
            .from_reader(file);

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().trim_start_matches('\u{feff}').to_string())
            .collect();

        let mut rows = Vec::new();
        for (row_idx, result) in reader.records().enumerate() {
            let record = result?;
            let cells = record.iter().map(|v| v.to_string());
            if let Some(row) = build_row(&headers, cells, row_idx + 2) {
                rows.push(row);
            }
        }

        Ok(rows)
    }
}

// ==========================================
// Excel Parser（读取第一个工作表,按扩展名选择 xlsx/xls 读取器）
// ==========================================
pub struct ExcelParser;

impl FileParser for ExcelParser {
    fn parse_rows(&self, file_path: &Path) -> ImportResult<Vec<SourceRow>> {
        ensure_exists(file_path)?;

        let mut workbook = open_workbook_auto(file_path)?;

        let sheet_name = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| ImportError::ExcelParseError("Excel 文件无工作表".to_string()))?;
        let range = workbook.worksheet_range(&sheet_name)?;

        let mut sheet_rows = range.rows();
        let header_row = sheet_rows
            .next()
            .ok_or_else(|| ImportError::ExcelParseError("Excel 文件无数据行".to_string()))?;
        let headers: Vec<String> = header_row
            .iter()
            .map(|cell| cell.to_string().trim().to_string())
            .collect();

        let mut rows = Vec::new();
        for (row_idx, data_row) in sheet_rows.enumerate() {
            let cells = data_row.iter().map(|cell| cell.to_string());
            if let Some(row) = build_row(&headers, cells, row_idx + 2) {
                rows.push(row);
            }
        }

        Ok(rows)
    }
}

// ==========================================
// 通用文件解析器（根据扩展名自动选择）
// ==========================================
pub struct UniversalFileParser;

impl FileParser for UniversalFileParser {
    fn parse_rows(&self, file_path: &Path) -> ImportResult<Vec<SourceRow>> {
        let ext = file_path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match ext.as_str() {
            "csv" => CsvParser.parse_rows(file_path),
            "xlsx" | "xls" => ExcelParser.parse_rows(file_path),
            _ => Err(ImportError::UnsupportedFormat(ext)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn csv_file(lines: &[&str]) -> NamedTempFile {
        let mut temp_file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        for line in lines {
            writeln!(temp_file, "{}", line).unwrap();
        }
        temp_file
    }

    #[test]
    fn test_csv_parser_row_numbers_skip_blank() {
        let file = csv_file(&["material_id,contract_rate", "M1,8.0", ",", "M2, 9.5 "]);

        let rows = CsvParser.parse_rows(file.path()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].row_number, 2);
        assert_eq!(rows[1].row_number, 4);
        assert_eq!(rows[1].fields.get("contract_rate"), Some(&"9.5".to_string()));
    }

    #[test]
    fn test_file_not_found() {
        let err = CsvParser
            .parse_rows(Path::new("no_such_contracts.csv"))
            .unwrap_err();
        assert!(matches!(err, ImportError::FileNotFound(_)));
    }

    #[test]
    fn test_excel_parser_reads_first_sheet() {
        let file = tempfile::Builder::new().suffix(".xlsx").tempfile().unwrap();
        let mut workbook = rust_xlsxwriter::Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 0, "material_id").unwrap();
        sheet.write_string(0, 1, "contract_rate").unwrap();
        sheet.write_string(1, 0, "M1").unwrap();
        sheet.write_number(1, 1, 8.5).unwrap();
        sheet.write_string(3, 0, "M2").unwrap();
        sheet.write_number(3, 1, 12.0).unwrap();
        workbook.save(file.path()).unwrap();

        let rows = UniversalFileParser.parse_rows(file.path()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].row_number, 2);
        assert_eq!(rows[0].fields.get("contract_rate"), Some(&"8.5".to_string()));
        assert_eq!(rows[1].row_number, 4);
        assert_eq!(rows[1].fields.get("material_id"), Some(&"M2".to_string()));
    }

    #[test]
    fn test_corrupt_xls_is_excel_error() {
        let mut file = tempfile::Builder::new().suffix(".xls").tempfile().unwrap();
        writeln!(file, "not a workbook").unwrap();
        assert!(matches!(
            UniversalFileParser.parse_rows(file.path()),
            Err(ImportError::ExcelParseError(_))
        ));
    }

    #[test]
    fn test_universal_parser_rejects_unknown_extension() {
        let file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        assert!(matches!(
            UniversalFileParser.parse_rows(file.path()),
            Err(ImportError::UnsupportedFormat(_))
        ));
    }
}
