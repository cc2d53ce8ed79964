//! Bulk knowledge import from CSV
//!
//! The header row must name `category`, `question` and `answer`; `source`
//! is optional. Rows are numbered as a spreadsheet would show them, so the
//! first data row is row 2.

use serde::Serialize;

use crate::store::{NewKnowledge, CSV_SOURCE};

pub const REQUIRED_COLUMNS: [&str; 3] = ["category", "question", "answer"];

/// Template offered by `GET /download_sample_csv`
pub const SAMPLE_CSV: &str = "category,question,answer,source
admissions,What are the application deadlines?,Applications for undergraduate courses close on February 1st. Postgraduate applications are accepted year-round.,NCIRL Admissions
fees,How much are the tuition fees?,Undergraduate EU students pay approximately €3000 per year. Non-EU and postgraduate fees vary by program.,NCIRL Finance Office
library,Can I borrow books from the library?,Yes! Students can borrow up to 10 books for 2 weeks. Late returns incur fines of €1 per day.,NCIRL Library
courses,What programs does NCIRL offer?,NCIRL offers programs in Business Computing IT Accounting Marketing Psychology and more. Visit ncirl.ie for full list.,NCIRL Website
";

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("CSV must contain columns: {}. Optional: source", REQUIRED_COLUMNS.join(", "))]
    MissingColumns,

    #[error("File is not valid UTF-8")]
    NotUtf8,

    #[error("Invalid CSV: {0}")]
    Csv(#[from] csv::Error),
}

/// Rows accepted for insertion plus a record of what was skipped
#[derive(Debug, Default)]
pub struct ParsedImport {
    pub entries: Vec<NewKnowledge>,
    pub skipped: usize,
    pub errors: Vec<String>,
}

/// Response body of `POST /upload_csv`
#[derive(Debug, Clone, Serialize)]
pub struct ImportReport {
    pub message: String,
    pub added: u64,
    pub skipped: usize,
    pub errors: Vec<String>,
}

impl ImportReport {
    pub fn new(added: u64, parsed: ParsedImport) -> Self {
        Self {
            message: format!("Successfully imported {} entries", added),
            added,
            skipped: parsed.skipped,
            errors: parsed.errors,
        }
    }
}

struct Columns {
    category: usize,
    question: usize,
    answer: usize,
    source: Option<usize>,
}

/// Parse an uploaded file into knowledge entries
///
/// Rows missing a required value are skipped and reported, never fatal.
pub fn parse_knowledge_csv(data: &[u8]) -> Result<ParsedImport, ImportError> {
    let text = std::str::from_utf8(data).map_err(|_| ImportError::NotUtf8)?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());

    let columns = {
        let headers = reader.headers()?;
        let find = |name: &str| headers.iter().position(|h| h.trim() == name);
        match (find("category"), find("question"), find("answer")) {
            (Some(category), Some(question), Some(answer)) => Columns {
                category,
                question,
                answer,
                source: find("source"),
            },
            _ => return Err(ImportError::MissingColumns),
        }
    };

    let mut parsed = ParsedImport::default();
    for (offset, record) in reader.records().enumerate() {
        let row_num = offset + 2;
        let record = match record {
            Ok(record) => record,
            Err(e) => {
                parsed.skipped += 1;
                parsed.errors.push(format!("Row {}: {}", row_num, e));
                continue;
            }
        };

        let field = |idx: usize| record.get(idx).unwrap_or("").trim().to_string();
        let category = field(columns.category);
        let question = field(columns.question);
        let answer = field(columns.answer);

        if category.is_empty() || question.is_empty() || answer.is_empty() {
            parsed.skipped += 1;
            parsed
                .errors
                .push(format!("Row {}: Missing required fields", row_num));
            continue;
        }

        let source = columns
            .source
            .map(field)
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| CSV_SOURCE.to_string());

        parsed
            .entries
            .push(NewKnowledge::new(category, question, answer).with_source(source));
    }

    Ok(parsed)
}

/// Whether an upload's file name looks like CSV
pub fn is_csv_filename(filename: &str) -> bool {
    filename.to_ascii_lowercase().ends_with(".csv")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_csv_parses_cleanly() {
        let parsed = parse_knowledge_csv(SAMPLE_CSV.as_bytes()).unwrap();
        assert_eq!(parsed.entries.len(), 4);
        assert_eq!(parsed.skipped, 0);
        assert_eq!(parsed.entries[1].category, "fees");
        assert_eq!(parsed.entries[1].source, "NCIRL Finance Office");
    }

    #[test]
    fn test_missing_required_column() {
        let result = parse_knowledge_csv(b"category,question\nlibrary,Hours?\n");
        let err = result.unwrap_err();
        assert!(matches!(err, ImportError::MissingColumns));
        assert_eq!(
            err.to_string(),
            "CSV must contain columns: category, question, answer. Optional: source"
        );
    }

    #[test]
    fn test_rows_with_blank_fields_are_skipped_with_row_numbers() {
        let data = b"category,question,answer\nlibrary,Hours?,9-5\nfees, ,3000\n,Where?,Here\n";
        let parsed = parse_knowledge_csv(data).unwrap();

        assert_eq!(parsed.entries.len(), 1);
        assert_eq!(parsed.skipped, 2);
        assert_eq!(
            parsed.errors,
            vec![
                "Row 3: Missing required fields".to_string(),
                "Row 4: Missing required fields".to_string(),
            ]
        );
    }

    #[test]
    fn test_source_defaults_to_csv_import() {
        let data = b"category,question,answer,source\nlibrary,Hours?,9-5,\n";
        let parsed = parse_knowledge_csv(data).unwrap();
        assert_eq!(parsed.entries[0].source, CSV_SOURCE);

        let parsed = parse_knowledge_csv(b"answer,question,category\n9-5,Hours?,library\n").unwrap();
        assert_eq!(parsed.entries[0].category, "library");
        assert_eq!(parsed.entries[0].answer, "9-5");
        assert_eq!(parsed.entries[0].source, CSV_SOURCE);
    }

    #[test]
    fn test_quoted_fields_and_bom() {
        let data = "\u{feff}category,question,answer\n\"admissions\",\"How, exactly?\",\"Line one\nline two\"\n";
        let parsed = parse_knowledge_csv(data.as_bytes()).unwrap();
        assert_eq!(parsed.entries.len(), 1);
        assert_eq!(parsed.entries[0].question, "How, exactly?");
        assert_eq!(parsed.entries[0].answer, "Line one\nline two");
    }

    #[test]
    fn test_short_rows_are_reported_missing_fields() {
        let parsed = parse_knowledge_csv(b"category,question,answer\nlibrary,Hours?\n").unwrap();
        assert!(parsed.entries.is_empty());
        assert_eq!(parsed.errors, vec!["Row 2: Missing required fields".to_string()]);
    }

    #[test]
    fn test_invalid_utf8() {
        assert!(matches!(
            parse_knowledge_csv(&[0xff, 0xfe, 0x00]),
            Err(ImportError::NotUtf8)
        ));
    }

    #[test]
    fn test_import_report_message() {
        let report = ImportReport::new(3, ParsedImport::default());
        assert_eq!(report.message, "Successfully imported 3 entries");
        assert_eq!(report.added, 3);
    }

    #[test]
    fn test_is_csv_filename() {
        assert!(is_csv_filename("kb.csv"));
        assert!(is_csv_filename("KB.CSV"));
        assert!(!is_csv_filename("kb.xlsx"));
        assert!(!is_csv_filename(""));
    }
}
