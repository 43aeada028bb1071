use calamine::DataType;
use chrono::{Duration, NaiveDate, NaiveDateTime, Timelike};

use crate::report::{
    io_common::{clean_header, NullMarkers},
    *,
};

pub fn read_excel_records(
    path: &str,
    worksheet_name: Option<&str>,
    null_markers: &NullMarkers,
) -> BReportResult<RecordSet> {
    let wrange = get_range(path, worksheet_name)?;
    let mut iter = wrange.rows();
    let header: Vec<String> = iter
        .next()
        .context(EmptyExcelSnafu { path })?
        .iter()
        .map(|c| clean_header(&header_name(c)))
        .collect();
    debug!("read_excel_records: header: {:?}", header);

    let mut rows: Vec<Vec<CellValue>> = Vec::new();
    for (idx, row) in iter.enumerate() {
        let values: Vec<CellValue> = row.iter().map(|c| read_cell(c, null_markers)).collect();
        debug!("read_excel_records: idx: {:?} row: {:?}", idx, &values);
        rows.push(values);
    }
    Ok(RecordSet::new(header, rows))
}

fn header_name(cell: &DataType) -> String {
    match cell {
        DataType::String(s) => s.clone(),
        DataType::Int(i) => i.to_string(),
        DataType::Float(f) => CellValue::Float(*f).render().unwrap_or_default(),
        _ => String::new(),
    }
}

fn read_cell(cell: &DataType, null_markers: &NullMarkers) -> CellValue {
    match cell {
        DataType::String(s) => null_markers.cell(s),
        DataType::Int(i) => CellValue::Int(*i),
        DataType::Float(f) => CellValue::Float(*f),
        DataType::Bool(b) => CellValue::Text(if *b { "True" } else { "False" }.to_string()),
        DataType::DateTime(serial) => match excel_datetime(*serial) {
            Some(dt) if dt.num_seconds_from_midnight() == 0 => {
                CellValue::Text(dt.format("%d/%m/%Y").to_string())
            }
            Some(dt) => CellValue::Text(dt.format("%d/%m/%Y %H:%M").to_string()),
            None => {
                warn!("read_cell: date serial {} out of range, kept as a number", serial);
                CellValue::Float(*serial)
            }
        },
        DataType::Empty => CellValue::Empty,
        other => {
            warn!("read_cell: unsupported cell {:?}, treated as empty", other);
            CellValue::Empty
        }
    }
}

// Dates are stored as days since 1899-12-30, the fraction being the time of day.
fn excel_datetime(serial: f64) -> Option<NaiveDateTime> {
    // 2958466 is 9999-12-31.
    if !(0.0..2_958_466.0).contains(&serial) {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let seconds = (serial * 86_400.0).round() as i64;
    epoch.checked_add_signed(Duration::seconds(seconds))
}

fn get_range(path: &str, worksheet_name: Option<&str>) -> BReportResult<calamine::Range<DataType>> {
    debug!(
        "get_range: path: {:?} worksheet: {:?}",
        &path, &worksheet_name
    );
    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu { path })?;

    // A worksheet name was provided, use it.
    if let Some(name) = worksheet_name {
        let wrange = workbook
            .worksheet_range(name)
            .context(MissingWorksheetSnafu { name })?
            .context(OpeningExcelSnafu { path })?;
        Ok(wrange)
    } else {
        let all_worksheets = workbook.worksheets();
        match all_worksheets.as_slice() {
            [] => Err(Box::new(ReportError::EmptyExcel {
                path: path.to_string(),
            })),
            [(worksheet_name, wrange)] => {
                debug!(
                    "get_range: path: {:?} using the only worksheet: {:?}",
                    &path, &worksheet_name
                );
                Ok(wrange.clone())
            }
            [(worksheet_name, wrange), ..] => {
                warn!(
                    "get_range: {} worksheets in {:?}, using the first one: {:?}",
                    all_worksheets.len(),
                    &path,
                    worksheet_name
                );
                Ok(wrange.clone())
            }
        }
    }
}
