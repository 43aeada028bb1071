mod config;
mod resolver;
mod sanitize;

pub mod builder;
pub mod manual;
pub mod render;

use chrono::{DateTime, Duration, Utc};
use log::{debug, info};

pub use crate::config::*;
pub use crate::resolver::{resolve, resolve_field};
pub use crate::sanitize::{sanitize, RESERVED_FILENAME_CHARS};

/// The stem used when the first row carries no response to name the file after.
pub const DEFAULT_OUTPUT_STEM: &str = "output";

/// The extension of the produced documents.
pub const DOCUMENT_EXTENSION: &str = "pdf";

/// Compiles a record set into a document, stamped with the current time and
/// the default rules.
pub fn compile(records: &RecordSet) -> Result<CompiledDocument, CompileError> {
    compile_at(records, &ReportRules::DEFAULT_RULES, Utc::now())
}

/// Compiles a record set into a document.
///
/// Arguments:
/// * `records` the rows of the export, in their original order
/// * `rules` the fallback values and the date settings
/// * `now` the instant of generation, before the fixed offset is applied
///
/// One section header is emitted every time the section changes from the
/// previous row. Rows are never regrouped: a section that shows up again later
/// gets a second header.
pub fn compile_at(
    records: &RecordSet,
    rules: &ReportRules,
    now: DateTime<Utc>,
) -> Result<CompiledDocument, CompileError> {
    if records.is_empty() {
        return Err(CompileError::EmptyInput);
    }
    info!(
        "compile: processing {} rows, columns: {:?}",
        records.len(),
        records.columns()
    );

    let local = now.naive_utc() + Duration::hours(rules.utc_offset_hours as i64);
    let generation_date = local.format(&rules.date_format).to_string();

    let reviewer = resolve_field(records, Field::ReviewerNames, 0, &rules.missing_value);

    // None never equals a resolved value, so the first row always opens a section.
    let mut current_section: Option<String> = None;
    let mut content: Vec<Instruction> = Vec::new();
    for row in 0..records.len() {
        let section = resolve_field(records, Field::Section, row, &rules.missing_value);
        if current_section.as_ref() != Some(&section) {
            debug!("compile: row {}: new section {:?}", row, section);
            content.push(Instruction::SectionHeader {
                title: section.clone(),
            });
            current_section = Some(section);
        }

        content.push(Instruction::QuestionBlock {
            number: resolve_field(records, Field::QuestionNumber, row, &rules.missing_value),
            question: resolve_field(records, Field::QuestionText, row, &rules.missing_value),
            response: resolve_field(records, Field::Response, row, &rules.no_response),
        });
    }

    let doc = CompiledDocument::new(generation_date, reviewer, content);
    info!(
        "compile: {} sections, {} questions, reviewer {:?}, generated {}",
        doc.section_titles().len(),
        doc.question_count(),
        doc.reviewer(),
        doc.generation_date()
    );
    Ok(doc)
}

/// The file stem of the document: the response of the first row, with the
/// reserved characters removed.
///
/// The stem may be empty if the response only holds reserved characters.
pub fn output_stem(records: &RecordSet) -> String {
    sanitize(&resolve_field(
        records,
        Field::Response,
        0,
        DEFAULT_OUTPUT_STEM,
    ))
}

pub fn output_file_name(records: &RecordSet) -> String {
    format!("{}.{}", output_stem(records), DOCUMENT_EXTENSION)
}
