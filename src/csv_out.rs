use std::io::Write;

use csv::WriterBuilder;

use crate::aggregate::{plain_list, quoted_list};
use crate::error::NormalizeError;
use crate::model::StudentRecord;

pub const RECORD_HEADERS: [&str; 13] = [
    "S.No.",
    "Batch",
    "Programme_Name",
    "Sem",
    "Examination",
    "Name",
    "Enrollment No.",
    "PaperID",
    "Credits",
    "Int_Marks",
    "Ext_Marks",
    "Total",
    "CGPA",
];

fn record_row(record: &StudentRecord) -> [String; 13] {
    let text = |value: &Option<String>| value.clone().unwrap_or_default();
    [
        text(&record.serial_no),
        text(&record.batch),
        text(&record.programme_name),
        text(&record.semester),
        text(&record.examination),
        record.name.clone(),
        text(&record.enrollment_no),
        quoted_list(&record.paper_ids),
        plain_list(&record.credits),
        quoted_list(&record.internal_marks),
        quoted_list(&record.external_marks),
        plain_list(&record.totals),
        record.cgpa.map(|cgpa| cgpa.to_string()).unwrap_or_default(),
    ]
}

/// One row per student, sequences rendered as list text.
pub fn write_records_csv<W: Write>(
    writer: W,
    records: &[StudentRecord],
) -> Result<(), NormalizeError> {
    let mut writer = WriterBuilder::new().from_writer(writer);
    writer.write_record(RECORD_HEADERS)?;
    for record in records {
        writer.write_record(record_row(record))?;
    }
    writer.flush()?;
    Ok(())
}

pub fn records_to_csv_string(records: &[StudentRecord]) -> Result<String, NormalizeError> {
    let mut buffer = Vec::new();
    write_records_csv(&mut buffer, records)?;
    Ok(String::from_utf8(buffer)?)
}

#[cfg(test)]
mod tests {
    use super::records_to_csv_string;
    use crate::model::{StudentRecord, TotalMark};

    #[test]
    fn writes_header_and_one_row_per_student() {
        let record = StudentRecord {
            serial_no: Some("7".to_string()),
            batch: Some("2021".to_string()),
            programme_name: Some("B.TECH".to_string()),
            semester: Some("03".to_string()),
            examination: Some("REAPPEAR".to_string()),
            name: "A B".to_string(),
            enrollment_no: Some("123".to_string()),
            paper_ids: vec!["CS101".to_string()],
            credits: vec![4],
            internal_marks: vec!["20".to_string()],
            external_marks: vec!["45".to_string()],
            totals: vec![TotalMark::Scored(65)],
            cgpa: None,
        };

        let csv = records_to_csv_string(&[record]).expect("csv should render");
        let mut lines = csv.lines();
        assert_eq!(
            lines.next(),
            Some(
                "S.No.,Batch,Programme_Name,Sem,Examination,Name,Enrollment No.,PaperID,Credits,Int_Marks,Ext_Marks,Total,CGPA"
            )
        );
        assert_eq!(
            lines.next(),
            Some("7,2021,B.TECH,03,REAPPEAR,A B,123,['CS101'],[4],['20'],['45'],[65],")
        );
        assert_eq!(lines.next(), None);
    }
}
