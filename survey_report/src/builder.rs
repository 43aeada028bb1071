pub use crate::config::*;

/// A builder for assembling record sets without going through a file.
///
/// ```
/// use survey_report::builder::RecordSetBuilder;
/// use survey_report::{compile, Schema};
/// # use survey_report::CompileError;
///
/// let mut builder = RecordSetBuilder::for_schema(Schema::Secondary);
/// builder
///     .add_entry("Intro", 1, "Name?", None, "Ana")
///     .add_entry("Intro", 2, "Role?", Some("Analyst"), "Ana");
///
/// let doc = compile(&builder.build())?;
/// assert_eq!(doc.question_count(), 2);
///
/// # Ok::<(), CompileError>(())
/// ```
pub struct RecordSetBuilder {
    pub(crate) _columns: Vec<String>,
    pub(crate) _rows: Vec<Vec<CellValue>>,
}

impl RecordSetBuilder {
    /// A builder with an arbitrary header.
    pub fn new(columns: &[&str]) -> RecordSetBuilder {
        RecordSetBuilder {
            _columns: columns.iter().map(|s| s.to_string()).collect(),
            _rows: Vec::new(),
        }
    }

    /// A builder whose header holds all the logical fields, named after the
    /// given language variant.
    pub fn for_schema(schema: Schema) -> RecordSetBuilder {
        RecordSetBuilder {
            _columns: Field::ALL
                .iter()
                .map(|f| f.column_name(schema).to_string())
                .collect(),
            _rows: Vec::new(),
        }
    }

    /// Adds a raw row. The values must follow the order of the header.
    pub fn add_row(&mut self, values: Vec<CellValue>) -> &mut RecordSetBuilder {
        self._rows.push(values);
        self
    }

    /// Adds a row to a builder created with `for_schema`.
    pub fn add_entry(
        &mut self,
        section: &str,
        number: impl Into<CellValue>,
        question: &str,
        response: Option<&str>,
        reviewers: &str,
    ) -> &mut RecordSetBuilder {
        self.add_row(vec![
            section.into(),
            number.into(),
            question.into(),
            response.into(),
            reviewers.into(),
        ])
    }

    pub fn build(&self) -> RecordSet {
        RecordSet::new(self._columns.clone(), self._rows.clone())
    }
}
