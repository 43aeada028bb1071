use std::convert::Infallible;

use log::debug;

pub use crate::config::*;

/// The drawing capabilities needed to materialize a compiled document.
///
/// Implementations decide fonts, spacing and pagination. They must keep the
/// order of the calls and the grouping of number, question and response.
pub trait DocumentBackend {
    type Error;

    /// Starts the document. Called once, before anything else.
    fn draw_header(&mut self) -> Result<(), Self::Error>;

    fn draw_metadata(&mut self, generation_date: &str, reviewer: &str) -> Result<(), Self::Error>;

    fn draw_section_title(&mut self, title: &str) -> Result<(), Self::Error>;

    fn draw_question_block(
        &mut self,
        number: &str,
        question: &str,
        response: &str,
    ) -> Result<(), Self::Error>;
}

/// Replays a compiled document onto a backend, in order.
pub fn render<B: DocumentBackend>(doc: &CompiledDocument, backend: &mut B) -> Result<(), B::Error> {
    backend.draw_header()?;
    backend.draw_metadata(doc.generation_date(), doc.reviewer())?;
    for instruction in doc.instructions() {
        match instruction {
            Instruction::SectionHeader { title } => backend.draw_section_title(title)?,
            Instruction::QuestionBlock {
                number,
                question,
                response,
            } => backend.draw_question_block(number, question, response)?,
        }
    }
    debug!(
        "render: replayed {} instructions",
        doc.instructions().len()
    );
    Ok(())
}

/// A backend that lays the document out as plain text lines.
///
/// Useful to review a report in a terminal and to compare two layouts.
pub struct OutlineBackend {
    labels: Labels,
    lines: Vec<String>,
}

impl OutlineBackend {
    pub fn new(labels: &Labels) -> OutlineBackend {
        OutlineBackend {
            labels: labels.clone(),
            lines: Vec::new(),
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn into_text(self) -> String {
        let mut s = self.lines.join("\n");
        s.push('\n');
        s
    }
}

impl DocumentBackend for OutlineBackend {
    type Error = Infallible;

    fn draw_header(&mut self) -> Result<(), Infallible> {
        self.lines.clear();
        Ok(())
    }

    fn draw_metadata(&mut self, generation_date: &str, reviewer: &str) -> Result<(), Infallible> {
        self.lines
            .push(format!("{}{}", self.labels.generation_date, generation_date));
        self.lines.push(format!("{}{}", self.labels.reviewer, reviewer));
        self.lines.push(String::new());
        Ok(())
    }

    fn draw_section_title(&mut self, title: &str) -> Result<(), Infallible> {
        self.lines.push(format!("{}{}", self.labels.section_prefix, title));
        Ok(())
    }

    fn draw_question_block(
        &mut self,
        number: &str,
        question: &str,
        response: &str,
    ) -> Result<(), Infallible> {
        self.lines.push(format!("{} - {}", number, question));
        self.lines.push(response.to_string());
        self.lines.push(String::new());
        Ok(())
    }
}
