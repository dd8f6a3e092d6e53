//! Chart part XML (`ppt/charts/chartN.xml`).
//!
//! Series reference the embedded workbook laid out as: categories in column A
//! from row 2, one series per column from B with its name in row 1.

use super::data::{CategoryChartData, ChartKind};
use quick_xml::escape::escape;
use std::io::Write;

/// Fill colours for successive series / pie slices.
pub const PALETTE: [&str; 10] = [
    "3498DB", "E74C3C", "2ECC71", "9B59B6", "F39C12", "1ABC9C", "E91E63", "00BCD4", "FF5722",
    "795548",
];

const CATEGORY_AXIS_ID: u32 = 2094734552;
const VALUE_AXIS_ID: u32 = 2094734553;

/// Spreadsheet column letter for a zero-based index (0 = A).
pub fn column_letter(mut index: usize) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push(b'A' + (index % 26) as u8);
        if index < 26 {
            break;
        }
        index = index / 26 - 1;
    }
    letters.reverse();
    String::from_utf8_lossy(&letters).into_owned()
}

/// Serialize a complete chart part. The workbook relationship must be `rId1`.
pub fn write_chart<W: Write>(
    writer: &mut W,
    kind: ChartKind,
    data: &CategoryChartData,
) -> std::io::Result<()> {
    write!(
        writer,
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#
    )?;
    write!(
        writer,
        r#"<c:chartSpace xmlns:c="http://schemas.openxmlformats.org/drawingml/2006/chart" xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">"#
    )?;
    write!(writer, r#"<c:date1904 val="0"/>"#)?;
    write!(writer, r#"<c:roundedCorners val="0"/>"#)?;
    write!(writer, "<c:chart>")?;
    write!(writer, r#"<c:autoTitleDeleted val="0"/>"#)?;
    write!(writer, "<c:plotArea><c:layout/>")?;

    match kind {
        ChartKind::Pie => write_pie_chart(writer, data)?,
        ChartKind::ClusteredColumn => {
            write_bar_chart(writer, data)?;
            write_category_axis(writer)?;
            write_value_axis(writer)?;
        }
    }

    write!(writer, "</c:plotArea>")?;
    write!(
        writer,
        r#"<c:legend><c:legendPos val="r"/><c:overlay val="0"/></c:legend>"#
    )?;
    write!(writer, r#"<c:plotVisOnly val="1"/>"#)?;
    write!(writer, r#"<c:dispBlanksAs val="gap"/>"#)?;
    write!(writer, "</c:chart>")?;
    write!(
        writer,
        r#"<c:externalData r:id="rId1"><c:autoUpdate val="0"/></c:externalData>"#
    )?;
    write!(writer, "</c:chartSpace>")?;

    Ok(())
}

fn write_pie_chart<W: Write>(writer: &mut W, data: &CategoryChartData) -> std::io::Result<()> {
    write!(writer, "<c:pieChart>")?;
    write!(writer, r#"<c:varyColors val="1"/>"#)?;

    for (i, _) in data.series.iter().enumerate() {
        write_series(writer, data, i, true)?;
    }

    write!(writer, r#"<c:firstSliceAng val="0"/>"#)?;
    write!(writer, "</c:pieChart>")?;
    Ok(())
}

fn write_bar_chart<W: Write>(writer: &mut W, data: &CategoryChartData) -> std::io::Result<()> {
    write!(writer, "<c:barChart>")?;
    write!(writer, r#"<c:barDir val="col"/>"#)?;
    write!(writer, r#"<c:grouping val="clustered"/>"#)?;
    write!(writer, r#"<c:varyColors val="0"/>"#)?;

    for (i, _) in data.series.iter().enumerate() {
        write_series(writer, data, i, false)?;
    }

    write!(writer, r#"<c:gapWidth val="150"/>"#)?;
    write!(
        writer,
        r#"<c:axId val="{}"/><c:axId val="{}"/>"#,
        CATEGORY_AXIS_ID, VALUE_AXIS_ID
    )?;
    write!(writer, "</c:barChart>")?;
    Ok(())
}

fn write_solid_fill<W: Write>(writer: &mut W, color: &str) -> std::io::Result<()> {
    write!(
        writer,
        r#"<c:spPr><a:solidFill><a:srgbClr val="{}"/></a:solidFill></c:spPr>"#,
        color
    )
}

fn write_series<W: Write>(
    writer: &mut W,
    data: &CategoryChartData,
    index: usize,
    is_pie: bool,
) -> std::io::Result<()> {
    let series = &data.series[index];
    let column = column_letter(index + 1);
    let last_row = data.len() + 1;

    write!(writer, "<c:ser>")?;
    write!(writer, r#"<c:idx val="{}"/>"#, index)?;
    write!(writer, r#"<c:order val="{}"/>"#, index)?;

    write!(writer, "<c:tx><c:strRef>")?;
    write!(writer, "<c:f>Sheet1!${}$1</c:f>", column)?;
    write!(
        writer,
        r#"<c:strCache><c:ptCount val="1"/><c:pt idx="0"><c:v>{}</c:v></c:pt></c:strCache>"#,
        escape(&series.name)
    )?;
    write!(writer, "</c:strRef></c:tx>")?;

    if is_pie {
        write!(writer, r#"<c:explosion val="0"/>"#)?;
        for i in 0..data.len() {
            write!(writer, r#"<c:dPt><c:idx val="{}"/><c:bubble3D val="0"/>"#, i)?;
            write_solid_fill(writer, PALETTE[i % PALETTE.len()])?;
            write!(writer, "</c:dPt>")?;
        }
    } else {
        write_solid_fill(writer, PALETTE[index % PALETTE.len()])?;
        write!(writer, r#"<c:invertIfNegative val="0"/>"#)?;
    }

    write!(writer, "<c:cat><c:strRef>")?;
    write!(writer, "<c:f>Sheet1!$A$2:$A${}</c:f>", last_row)?;
    write!(writer, "<c:strCache>")?;
    write!(writer, r#"<c:ptCount val="{}"/>"#, data.len())?;
    for (i, category) in data.categories.iter().enumerate() {
        write!(
            writer,
            r#"<c:pt idx="{}"><c:v>{}</c:v></c:pt>"#,
            i,
            escape(category)
        )?;
    }
    write!(writer, "</c:strCache></c:strRef></c:cat>")?;

    write!(writer, "<c:val><c:numRef>")?;
    write!(
        writer,
        "<c:f>Sheet1!${col}$2:${col}${}</c:f>",
        last_row,
        col = column
    )?;
    write!(writer, "<c:numCache>")?;
    write!(writer, "<c:formatCode>General</c:formatCode>")?;
    write!(writer, r#"<c:ptCount val="{}"/>"#, series.values.len())?;
    for (i, value) in series.values.iter().enumerate() {
        write!(writer, r#"<c:pt idx="{}"><c:v>{}</c:v></c:pt>"#, i, value)?;
    }
    write!(writer, "</c:numCache></c:numRef></c:val>")?;

    write!(writer, "</c:ser>")?;
    Ok(())
}

fn write_category_axis<W: Write>(writer: &mut W) -> std::io::Result<()> {
    write!(writer, "<c:catAx>")?;
    write!(writer, r#"<c:axId val="{}"/>"#, CATEGORY_AXIS_ID)?;
    write!(writer, r#"<c:scaling><c:orientation val="minMax"/></c:scaling>"#)?;
    write!(writer, r#"<c:delete val="0"/>"#)?;
    write!(writer, r#"<c:axPos val="b"/>"#)?;
    write!(writer, r#"<c:majorTickMark val="out"/><c:minorTickMark val="none"/>"#)?;
    write!(writer, r#"<c:tickLblPos val="nextTo"/>"#)?;
    write!(writer, r#"<c:crossAx val="{}"/>"#, VALUE_AXIS_ID)?;
    write!(writer, r#"<c:crosses val="autoZero"/>"#)?;
    write!(writer, r#"<c:auto val="1"/>"#)?;
    write!(writer, r#"<c:lblAlgn val="ctr"/>"#)?;
    write!(writer, r#"<c:lblOffset val="100"/>"#)?;
    write!(writer, r#"<c:noMultiLvlLbl val="0"/>"#)?;
    write!(writer, "</c:catAx>")?;
    Ok(())
}

fn write_value_axis<W: Write>(writer: &mut W) -> std::io::Result<()> {
    write!(writer, "<c:valAx>")?;
    write!(writer, r#"<c:axId val="{}"/>"#, VALUE_AXIS_ID)?;
    write!(writer, r#"<c:scaling><c:orientation val="minMax"/></c:scaling>"#)?;
    write!(writer, r#"<c:delete val="0"/>"#)?;
    write!(writer, r#"<c:axPos val="l"/>"#)?;
    write!(writer, "<c:majorGridlines/>")?;
    write!(
        writer,
        r#"<c:numFmt formatCode="General" sourceLinked="1"/>"#
    )?;
    write!(writer, r#"<c:majorTickMark val="out"/><c:minorTickMark val="none"/>"#)?;
    write!(writer, r#"<c:tickLblPos val="nextTo"/>"#)?;
    write!(writer, r#"<c:crossAx val="{}"/>"#, CATEGORY_AXIS_ID)?;
    write!(writer, r#"<c:crosses val="autoZero"/>"#)?;
    write!(writer, r#"<c:crossBetween val="between"/>"#)?;
    write!(writer, "</c:valAx>")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(kind: ChartKind, data: &CategoryChartData) -> String {
        let mut out = Vec::new();
        write_chart(&mut out, kind, data).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn column_letters() {
        assert_eq!(column_letter(0), "A");
        assert_eq!(column_letter(2), "C");
        assert_eq!(column_letter(25), "Z");
        assert_eq!(column_letter(26), "AA");
        assert_eq!(column_letter(27), "AB");
    }

    #[test]
    fn pie_chart_caches_categories_and_values() {
        let mut data = CategoryChartData::new(vec!["Slide 1".into(), "Slide 2".into()]);
        data.add_series("Cost", vec![100.0, 50.5]);
        let xml = render(ChartKind::Pie, &data);

        assert!(xml.contains(r#"<c:pieChart><c:varyColors val="1"/>"#));
        assert!(xml.contains("<c:f>Sheet1!$B$1</c:f>"));
        assert!(xml.contains("<c:f>Sheet1!$A$2:$A$3</c:f>"));
        assert!(xml.contains("<c:f>Sheet1!$B$2:$B$3</c:f>"));
        assert!(xml.contains(r#"<c:pt idx="1"><c:v>Slide 2</c:v></c:pt>"#));
        assert!(xml.contains(r#"<c:pt idx="1"><c:v>50.5</c:v></c:pt>"#));
        assert!(xml.contains(r#"<c:externalData r:id="rId1">"#));
        assert!(!xml.contains("c:catAx"));
    }

    #[test]
    fn clustered_column_chart_has_axes_and_escaped_labels() {
        let mut data = CategoryChartData::new(vec!["News & Sport".into()]);
        data.add_series("Planned CPM", vec![10.0])
            .add_series("Actual CPM", vec![12.0]);
        let xml = render(ChartKind::ClusteredColumn, &data);

        assert!(xml.contains(r#"<c:barDir val="col"/><c:grouping val="clustered"/>"#));
        assert!(xml.contains("News &amp; Sport"));
        assert!(xml.contains("<c:f>Sheet1!$C$2:$C$2</c:f>"));
        assert_eq!(xml.matches("<c:ser>").count(), 2);
        assert!(xml.contains("<c:catAx>") && xml.contains("<c:valAx>"));
    }
}
