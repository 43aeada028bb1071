// Primitives for reading CSV files.

use std::fs::File;
use std::io::Read;

use crate::report::{
    io_common::{clean_header, NullMarkers},
    *,
};

pub fn read_csv_records(path: &str, null_markers: &NullMarkers) -> BReportResult<RecordSet> {
    let file = File::open(path).context(CsvOpenSnafu { path })?;
    parse_csv(file, null_markers)
}

/// Reads an export with a header row. Every cell is kept as text, except the
/// null markers which become empty cells.
pub fn parse_csv<R: Read>(rdr: R, null_markers: &NullMarkers) -> BReportResult<RecordSet> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(rdr);

    let header: Vec<String> = reader
        .headers()
        .context(CsvLineParseSnafu { lineno: 1_usize })?
        .iter()
        .map(clean_header)
        .collect();
    debug!("parse_csv: header: {:?}", header);

    let mut rows: Vec<Vec<CellValue>> = Vec::new();
    for (idx, line_r) in reader.records().enumerate() {
        // The header is line 1.
        let lineno = idx + 2;
        let line = line_r.context(CsvLineParseSnafu { lineno })?;
        let row: Vec<CellValue> = line.iter().map(|s| null_markers.cell(s)).collect();
        debug!("parse_csv: lineno: {:?} row: {:?}", lineno, &row);
        rows.push(row);
    }
    Ok(RecordSet::new(header, rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> RecordSet {
        parse_csv(s.as_bytes(), &NullMarkers::default()).unwrap()
    }

    #[test]
    fn english_export() {
        let rs = parse(
            "Section,Question Number,Question,Response Option(s),Reviewer Names\n\
             Intro,1,Name?,,Ana\n\
             Intro,2,\"Role, team\",Analyst,\n",
        );
        assert_eq!(rs.len(), 2);
        assert_eq!(resolve_field(&rs, Field::Section, 0, "-"), "Intro");
        assert_eq!(resolve_field(&rs, Field::Response, 0, "-"), "-");
        assert_eq!(resolve_field(&rs, Field::QuestionText, 1, "-"), "Role, team");
        assert_eq!(resolve_field(&rs, Field::ReviewerNames, 0, "-"), "Ana");
    }

    #[test]
    fn portuguese_export_with_bom() {
        let rs = parse(
            "\u{feff}Seção,Número da pergunta,Pergunta,Opção (s) de resposta,Nomes dos revisores\n\
             Dados,1,Finalidade?,Marketing,Ana\n",
        );
        assert_eq!(resolve_field(&rs, Field::Section, 0, "-"), "Dados");
        assert_eq!(resolve_field(&rs, Field::Response, 0, "-"), "Marketing");
    }

    #[test]
    fn null_markers_are_absent() {
        let rs = parse("Section,Response Option(s)\nA,NA\nB,N/A\nC,n/a yes\n");
        assert_eq!(resolve_field(&rs, Field::Response, 0, "none"), "none");
        assert_eq!(resolve_field(&rs, Field::Response, 1, "none"), "none");
        assert_eq!(resolve_field(&rs, Field::Response, 2, "none"), "n/a yes");
    }

    #[test]
    fn short_rows_are_padded() {
        let rs = parse("Section,Question,Response Option(s)\nA,Q1\n");
        assert_eq!(resolve_field(&rs, Field::QuestionText, 0, "-"), "Q1");
        assert_eq!(resolve_field(&rs, Field::Response, 0, "-"), "-");
    }

    #[test]
    fn header_only() {
        let rs = parse("Section,Question\n");
        assert!(rs.is_empty());
    }

    #[test]
    fn missing_file() {
        let res = read_csv_records("/nonexistent/export.csv", &NullMarkers::default());
        assert!(matches!(res.map_err(|e| *e), Err(ReportError::CsvOpen { .. })));
    }
}
