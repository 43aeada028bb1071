// ********* Input data structures ***********

use std::borrow::Cow;
use std::collections::HashMap;
use std::error::Error;
use std::fmt::Display;

use log::warn;
use serde::Serialize;

/// The content of one cell of the export.
///
/// Readers keep numbers numeric when the source format has types (Excel).
/// Comma-separated inputs only produce text or empty cells.
#[derive(PartialEq, Debug, Clone)]
pub enum CellValue {
    Text(String),
    Int(i64),
    Float(f64),
    /// A missing value: empty cell, null marker, NaN.
    Empty,
}

impl CellValue {
    pub fn is_absent(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Float(f) => f.is_nan(),
            _ => false,
        }
    }

    /// The string form of the value, if there is one.
    ///
    /// Whole floats are printed without their fractional part: `1.0` reads `1`.
    pub fn render(&self) -> Option<String> {
        match self {
            CellValue::Text(s) => Some(s.clone()),
            CellValue::Int(i) => Some(i.to_string()),
            CellValue::Float(f) if f.is_nan() => None,
            CellValue::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => {
                Some(format!("{}", *f as i64))
            }
            CellValue::Float(f) => Some(f.to_string()),
            CellValue::Empty => None,
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<i64> for CellValue {
    fn from(i: i64) -> Self {
        CellValue::Int(i)
    }
}

impl From<i32> for CellValue {
    fn from(i: i32) -> Self {
        CellValue::Int(i as i64)
    }
}

impl From<f64> for CellValue {
    fn from(f: f64) -> Self {
        CellValue::Float(f)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(o: Option<T>) -> Self {
        o.map(|x| x.into()).unwrap_or(CellValue::Empty)
    }
}

/// One question/answer row. The values are aligned with the columns of the
/// record set that owns the row.
#[derive(PartialEq, Debug, Clone)]
pub struct Record {
    values: Vec<CellValue>,
}

impl Record {
    pub fn values(&self) -> &[CellValue] {
        &self.values
    }
}

/// An ordered collection of rows with the header they were read with.
///
/// The order of the records is the order of the export and is never changed.
#[derive(PartialEq, Debug, Clone)]
pub struct RecordSet {
    columns: Vec<String>,
    column_index: HashMap<String, usize>,
    records: Vec<Record>,
}

impl RecordSet {
    /// Short rows are padded with empty cells, long rows are truncated to the
    /// width of the header.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<CellValue>>) -> RecordSet {
        let width = columns.len();
        let mut column_index: HashMap<String, usize> = HashMap::new();
        for (idx, c) in columns.iter().enumerate() {
            // The first occurrence wins for duplicated header names.
            column_index.entry(c.clone()).or_insert(idx);
        }
        let records = rows
            .into_iter()
            .enumerate()
            .map(|(lineno, mut values)| {
                if values.len() > width {
                    warn!(
                        "RecordSet::new: row {} has {} values for {} columns, dropping the extra values",
                        lineno,
                        values.len(),
                        width
                    );
                }
                values.resize(width, CellValue::Empty);
                Record { values }
            })
            .collect();
        RecordSet {
            columns,
            column_index,
            records,
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index.contains_key(name)
    }

    pub fn column_position(&self, name: &str) -> Option<usize> {
        self.column_index.get(name).cloned()
    }

    /// The raw cell at the given row for the given column.
    pub fn value(&self, row_index: usize, column: &str) -> Option<&CellValue> {
        let col = self.column_position(column)?;
        self.records.get(row_index)?.values.get(col)
    }
}

/// The logical fields of a survey row.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum Field {
    Section,
    QuestionNumber,
    QuestionText,
    Response,
    ReviewerNames,
}

impl Field {
    pub const ALL: [Field; 5] = [
        Field::Section,
        Field::QuestionNumber,
        Field::QuestionText,
        Field::Response,
        Field::ReviewerNames,
    ];

    /// The physical column names of this field: (primary, secondary).
    ///
    /// The exports come in Portuguese (primary) and English (secondary).
    pub fn column_names(&self) -> (&'static str, &'static str) {
        match self {
            Field::Section => ("Seção", "Section"),
            Field::QuestionNumber => ("Número da pergunta", "Question Number"),
            Field::QuestionText => ("Pergunta", "Question"),
            Field::Response => ("Opção (s) de resposta", "Response Option(s)"),
            Field::ReviewerNames => ("Nomes dos revisores", "Reviewer Names"),
        }
    }

    pub fn column_name(&self, schema: Schema) -> &'static str {
        let (primary, secondary) = self.column_names();
        match schema {
            Schema::Primary => primary,
            Schema::Secondary => secondary,
        }
    }
}

/// The two language variants of the export header.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum Schema {
    Primary,
    Secondary,
}

// ******** Output data structures *********

/// One drawing step of the compiled document.
#[derive(Eq, PartialEq, Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Instruction {
    SectionHeader {
        title: String,
    },
    QuestionBlock {
        number: String,
        question: String,
        response: String,
    },
}

/// The metadata and the ordered drawing steps of a report.
#[derive(Eq, PartialEq, Debug, Clone, Serialize)]
pub struct CompiledDocument {
    #[serde(rename = "generatedAt")]
    generation_date: String,
    reviewer: String,
    content: Vec<Instruction>,
}

impl CompiledDocument {
    pub(crate) fn new(
        generation_date: String,
        reviewer: String,
        content: Vec<Instruction>,
    ) -> CompiledDocument {
        CompiledDocument {
            generation_date,
            reviewer,
            content,
        }
    }

    pub fn generation_date(&self) -> &str {
        &self.generation_date
    }

    pub fn reviewer(&self) -> &str {
        &self.reviewer
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.content
    }

    pub fn section_titles(&self) -> Vec<&str> {
        self.content
            .iter()
            .filter_map(|i| match i {
                Instruction::SectionHeader { title } => Some(title.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn question_count(&self) -> usize {
        self.content
            .iter()
            .filter(|i| matches!(i, Instruction::QuestionBlock { .. }))
            .count()
    }
}

/// Errors that prevent the compiler from producing a document.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum CompileError {
    /// The record set has no rows: there is no first row to read the reviewer from.
    EmptyInput,
}

impl Error for CompileError {}

impl Display for CompileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompileError::EmptyInput => {
                write!(f, "the input contains no rows, cannot build a report")
            }
        }
    }
}

// ********* Configuration **********

/// The rules that control how values are filled in by the compiler.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ReportRules {
    /// Shown in place of a missing response.
    pub no_response: Cow<'static, str>,
    /// Used for the other fields when they are missing.
    pub missing_value: Cow<'static, str>,
    /// Fixed offset applied to UTC for the generation date. Not tied to a timezone database.
    pub utc_offset_hours: i32,
    /// chrono format string of the generation date.
    pub date_format: Cow<'static, str>,
}

impl ReportRules {
    pub const PORTUGUESE: ReportRules = ReportRules {
        no_response: Cow::Borrowed("Sem resposta"),
        missing_value: Cow::Borrowed(""),
        utc_offset_hours: -3,
        date_format: Cow::Borrowed("%d/%m/%Y - %H:%M"),
    };

    pub const ENGLISH: ReportRules = ReportRules {
        no_response: Cow::Borrowed("No response"),
        missing_value: Cow::Borrowed(""),
        utc_offset_hours: -3,
        date_format: Cow::Borrowed("%d/%m/%Y - %H:%M"),
    };

    pub const DEFAULT_RULES: ReportRules = ReportRules::PORTUGUESE;
}

/// The fixed labels printed by the document backends.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Labels {
    pub section_prefix: Cow<'static, str>,
    pub generation_date: Cow<'static, str>,
    pub reviewer: Cow<'static, str>,
}

impl Labels {
    pub const PORTUGUESE: Labels = Labels {
        section_prefix: Cow::Borrowed("Sessão: "),
        generation_date: Cow::Borrowed("Data de Geração: "),
        reviewer: Cow::Borrowed("Responsável pela Revisão: "),
    };

    pub const ENGLISH: Labels = Labels {
        section_prefix: Cow::Borrowed("Section: "),
        generation_date: Cow::Borrowed("Generation Date: "),
        reviewer: Cow::Borrowed("Reviewer: "),
    };

    pub const DEFAULT_LABELS: Labels = Labels::PORTUGUESE;
}
