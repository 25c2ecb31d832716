//! Payload encoding and result decoding for each job content type.
//!
//! Uploads carry the job's content type; ingest result downloads come back
//! in that same format and are normalized here into the four-column
//! Id/Success/Created/Error table. Query result pages are CSV.

use serde::Deserialize;

use hopper_sf_client::security::field;
use hopper_sf_client::security::xml::escape;

use crate::error::{Error, ErrorKind, Result};
use crate::types::{ContentType, Table};
use crate::xml;

/// Column names of a normalized ingest result table.
pub(crate) const RESULT_COLUMNS: [&str; 4] = ["Id", "Success", "Created", "Error"];

/// Serialize one chunk of rows into a batch payload.
pub(crate) fn encode_chunk(
    content_type: ContentType,
    columns: &[String],
    rows: &[Vec<String>],
) -> Result<String> {
    match content_type {
        ContentType::Csv => encode_csv(columns, rows),
        ContentType::Json => encode_json(columns, rows),
        ContentType::Xml => encode_xml(columns, rows),
    }
}

fn encode_csv(columns: &[String], rows: &[Vec<String>]) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::CRLF)
        .from_writer(Vec::new());
    writer.write_record(columns)?;
    for row in rows {
        writer.write_record(row)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|err| Error::new(ErrorKind::Csv(err.to_string())))?;
    String::from_utf8(bytes).map_err(|err| Error::new(ErrorKind::Csv(err.to_string())))
}

fn encode_json(columns: &[String], rows: &[Vec<String>]) -> Result<String> {
    let records: Vec<serde_json::Value> = rows
        .iter()
        .map(|row| {
            let mut record = serde_json::Map::new();
            for (column, value) in columns.iter().zip(row) {
                record.insert(column.clone(), serde_json::Value::String(value.clone()));
            }
            serde_json::Value::Object(record)
        })
        .collect();
    Ok(serde_json::to_string(&records)?)
}

fn encode_xml(columns: &[String], rows: &[Vec<String>]) -> Result<String> {
    // Column names become element names, so they cannot be escaped into
    // safety. Reject anything that is not a plain field identifier.
    for column in columns {
        if !field::is_safe_field_name(column) {
            return Err(Error::new(ErrorKind::InvalidOperation(format!(
                "Column {column:?} is not usable as an XML element name"
            ))));
        }
    }

    let mut doc = format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<sObjects xmlns=\"{}\">\n",
        xml::ASYNC_API_XMLNS
    );
    for row in rows {
        doc.push_str(" <sObject>\n");
        for (column, value) in columns.iter().zip(row) {
            doc.push_str(&format!("  <{column}>{}</{column}>\n", escape(value)));
        }
        doc.push_str(" </sObject>\n");
    }
    doc.push_str("</sObjects>");
    Ok(doc)
}

/// Decode a CSV body into a table. An empty body decodes to an empty table.
pub(crate) fn decode_csv_table(body: &str) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_reader(body.as_bytes());
    let mut records = reader.records();

    let Some(header) = records.next() else {
        return Ok(Table::default());
    };
    let columns: Vec<String> = header?.iter().map(str::to_string).collect();

    let mut table = Table::new(columns);
    for record in records {
        let record = record?;
        table.push_row(record.iter().map(str::to_string).collect());
    }
    Ok(table)
}

/// Decode an ingest result download into the normalized four-column table.
///
/// Row order matches the order of the rows in the batch that produced them.
pub(crate) fn decode_ingest_results(content_type: ContentType, body: &str) -> Result<Table> {
    match content_type {
        ContentType::Csv => decode_csv_table(body),
        ContentType::Json => decode_json_results(body),
        ContentType::Xml => decode_xml_results(body),
    }
}

fn result_table() -> Table {
    Table::new(RESULT_COLUMNS.iter().map(|c| c.to_string()).collect())
}

#[derive(Debug, Deserialize)]
struct JsonRowResult {
    #[serde(default)]
    id: Option<String>,
    success: bool,
    created: bool,
    #[serde(default)]
    errors: Vec<JsonRowError>,
}

#[derive(Debug, Deserialize)]
struct JsonRowError {
    #[serde(rename = "statusCode", default)]
    status_code: Option<String>,
    message: String,
}

fn decode_json_results(body: &str) -> Result<Table> {
    let records: Vec<JsonRowResult> = serde_json::from_str(body)?;
    let mut table = result_table();
    for record in records {
        let error = record
            .errors
            .iter()
            .map(|err| match &err.status_code {
                Some(code) => format!("{code}: {}", err.message),
                None => err.message.clone(),
            })
            .collect::<Vec<_>>()
            .join("; ");
        table.push_row(vec![
            record.id.unwrap_or_default(),
            record.success.to_string(),
            record.created.to_string(),
            error,
        ]);
    }
    Ok(table)
}

fn decode_xml_results(body: &str) -> Result<Table> {
    let mut table = result_table();
    for block in xml::extract_blocks(body, "result") {
        let id = xml::extract_element(block, "id").unwrap_or_default();
        let success = xml::extract_element(block, "success")
            .map(|v| v == "true")
            .unwrap_or(false);
        let created = xml::extract_element(block, "created")
            .map(|v| v == "true")
            .unwrap_or(false);
        let error = xml::extract_blocks(block, "errors")
            .into_iter()
            .filter_map(|errors| {
                let message = xml::extract_element(errors, "message")?;
                Some(match xml::extract_element(errors, "statusCode") {
                    Some(code) => format!("{code}: {message}"),
                    None => message,
                })
            })
            .collect::<Vec<_>>()
            .join("; ");
        table.push_row(vec![id, success.to_string(), created.to_string(), error]);
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_encode_csv_quotes_and_crlf() {
        let payload = encode_csv(
            &columns(&["Name", "Industry"]),
            &[row(&["Acme, Inc.", "Retail"]), row(&["Plain", "Tech"])],
        )
        .unwrap();
        assert_eq!(
            payload,
            "Name,Industry\r\n\"Acme, Inc.\",Retail\r\nPlain,Tech\r\n"
        );
    }

    #[test]
    fn test_csv_decode_reads_encoded_chunk() {
        let payload = encode_csv(
            &columns(&["Name", "Note"]),
            &[row(&["Quote \"Q\"", "multi\nline"])],
        )
        .unwrap();
        let table = decode_csv_table(&payload).unwrap();
        assert_eq!(table.columns(), ["Name", "Note"]);
        assert_eq!(table.rows()[0], row(&["Quote \"Q\"", "multi\nline"]));
    }

    #[test]
    fn test_decode_csv_empty_body() {
        let table = decode_csv_table("").unwrap();
        assert!(table.is_empty());
        assert!(table.columns().is_empty());
    }

    #[test]
    fn test_encode_json_records() {
        let payload = encode_json(
            &columns(&["Name", "AccountNumber"]),
            &[row(&["Acme", "CD355118"])],
        )
        .unwrap();
        // serde_json object keys come out sorted.
        assert_eq!(payload, r#"[{"AccountNumber":"CD355118","Name":"Acme"}]"#);
    }

    #[test]
    fn test_encode_xml_rows() {
        let payload = encode_xml(&columns(&["Name"]), &[row(&["Tom & Co"])]).unwrap();
        assert!(payload.contains("<sObjects xmlns=\"http://www.force.com/2009/06/asyncapi/dataload\">"));
        assert!(payload.contains("<sObject>"));
        assert!(payload.contains("<Name>Tom &amp; Co</Name>"));
        assert!(payload.ends_with("</sObjects>"));
    }

    #[test]
    fn test_encode_xml_rejects_unsafe_column() {
        let err = encode_xml(&columns(&["Name><injected"]), &[]).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::InvalidOperation(_)));
    }

    #[test]
    fn test_decode_ingest_results_csv() {
        let body = "\"Id\",\"Success\",\"Created\",\"Error\"\n\
                    \"001xx000003DHP0AAO\",\"true\",\"true\",\"\"\n\
                    \"\",\"false\",\"false\",\"REQUIRED_FIELD_MISSING:Name--\"\n";
        let table = decode_ingest_results(ContentType::Csv, body).unwrap();
        assert_eq!(table.row_count(), 2);

        let outcomes = table.outcomes().unwrap();
        assert!(outcomes[0].success);
        assert!(!outcomes[1].success);
        assert!(outcomes[1].error.as_deref().unwrap().contains("REQUIRED_FIELD_MISSING"));
    }

    #[test]
    fn test_decode_ingest_results_json() {
        let body = r#"[
            {"success":true,"created":true,"id":"001xx000003DHP0AAO","errors":[]},
            {"success":false,"created":false,"id":null,"errors":[{"statusCode":"DUPLICATES_DETECTED","message":"Use one of these records?","fields":[]}]}
        ]"#;
        let table = decode_ingest_results(ContentType::Json, body).unwrap();
        assert_eq!(table.columns(), RESULT_COLUMNS);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.rows()[0][0], "001xx000003DHP0AAO");
        assert_eq!(table.rows()[1][1], "false");
        assert_eq!(
            table.rows()[1][3],
            "DUPLICATES_DETECTED: Use one of these records?"
        );
    }

    #[test]
    fn test_decode_ingest_results_xml() {
        let body = r#"<?xml version="1.0" encoding="UTF-8"?>
<results xmlns="http://www.force.com/2009/06/asyncapi/dataload">
 <result>
  <id>001xx000003DHP0AAO</id>
  <success>true</success>
  <created>true</created>
 </result>
 <result>
  <errors>
   <fields>Name</fields>
   <message>Required fields are missing: [Name]</message>
   <statusCode>REQUIRED_FIELD_MISSING</statusCode>
  </errors>
  <success>false</success>
  <created>false</created>
 </result>
</results>"#;
        let table = decode_ingest_results(ContentType::Xml, body).unwrap();
        assert_eq!(table.row_count(), 2);

        let outcomes = table.outcomes().unwrap();
        assert_eq!(outcomes[0].id.as_deref(), Some("001xx000003DHP0AAO"));
        assert!(outcomes[0].created);
        assert!(outcomes[1].id.is_none());
        assert_eq!(
            outcomes[1].error.as_deref(),
            Some("REQUIRED_FIELD_MISSING: Required fields are missing: [Name]")
        );
    }

    #[test]
    fn test_decode_ingest_results_row_order_matches_input_order() {
        let body = "Id,Success,Created,Error\n\
                    001xx000000000001,true,true,\n\
                    001xx000000000002,true,false,\n\
                    001xx000000000003,true,true,\n";
        let table = decode_ingest_results(ContentType::Csv, body).unwrap();
        let ids: Vec<&str> = table.rows().iter().map(|r| r[0].as_str()).collect();
        assert_eq!(
            ids,
            ["001xx000000000001", "001xx000000000002", "001xx000000000003"]
        );
    }
}
