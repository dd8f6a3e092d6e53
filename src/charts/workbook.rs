//! Embedded chart workbook, so "Edit Data" in PowerPoint opens the numbers.

use super::data::CategoryChartData;
use rust_xlsxwriter::{Workbook, XlsxError};

/// XLSX bytes laid out the way the chart formulas expect:
///
/// ```text
///     |    A     |    B     |    C     |
///   1 |          | Series 1 | Series 2 |
///   2 | Cat 1    |   10.0   |   15.0   |
/// ```
pub fn chart_workbook(data: &CategoryChartData) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name("Sheet1")?;

    for (i, category) in data.categories.iter().enumerate() {
        worksheet.write_string(i as u32 + 1, 0, category)?;
    }

    for (col, series) in data.series.iter().enumerate() {
        let col = col as u16 + 1;
        worksheet.write_string(0, col, &series.name)?;
        for (i, value) in series.values.iter().enumerate() {
            worksheet.write_number(i as u32 + 1, col, *value)?;
        }
    }

    workbook.save_to_buffer()
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::{Data, Reader, Xlsx};
    use std::io::Cursor;

    #[test]
    fn workbook_matches_chart_layout() {
        let mut data = CategoryChartData::new(vec!["Homepage".into(), "Sidebar".into()]);
        data.add_series("Planned CPM", vec![10.0, 8.0])
            .add_series("Actual CPM", vec![12.5, 0.0]);

        let bytes = chart_workbook(&data).unwrap();
        let mut xlsx: Xlsx<_> = Xlsx::new(Cursor::new(bytes)).unwrap();
        let range = xlsx.worksheet_range("Sheet1").unwrap();

        assert_eq!(range.get_value((0, 1)), Some(&Data::String("Planned CPM".into())));
        assert_eq!(range.get_value((2, 0)), Some(&Data::String("Sidebar".into())));
        assert_eq!(range.get_value((1, 2)), Some(&Data::Float(12.5)));
    }
}
