//! CSV conversion between JSON arrays and rows

use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use serde_json::{Map, Value};

use super::{CodecError, Parsed};

fn cell(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

fn to_rows(items: &[Value]) -> Result<Vec<Vec<String>>, CodecError> {
    let Some(Value::Object(first)) = items.first() else {
        return Ok(items.iter().map(|item| vec![cell(item)]).collect());
    };

    let headers: Vec<String> = first.keys().cloned().collect();
    let mut rows = Vec::with_capacity(items.len() + 1);
    rows.push(headers.clone());

    for (index, item) in items.iter().enumerate() {
        let Value::Object(obj) = item else {
            return Err(CodecError::NonUniformRows { index });
        };
        rows.push(
            headers
                .iter()
                .map(|key| obj.get(key).map(cell).unwrap_or_default())
                .collect(),
        );
    }
    Ok(rows)
}

/// Writes a JSON array as CSV, or the raw text as a single cell
///
/// Arrays of objects get a header row from the first object's keys; every
/// row follows that key order.
pub fn encode(parsed: &Parsed<Vec<Value>>) -> Result<String, CodecError> {
    let rows = match parsed {
        Parsed::Structured(items) => to_rows(items)?,
        Parsed::Raw(text) => vec![vec![text.clone()]],
    };

    let mut writer = WriterBuilder::new().from_writer(Vec::new());
    for row in rows {
        writer.write_record(&row)?;
    }
    writer.flush()?;

    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Key holding the cells of a row that is wider than the header
const OVERFLOW_KEY: &str = "null";

fn record_object(headers: &StringRecord, record: &StringRecord) -> Value {
    let mut obj: Map<String, Value> = headers
        .iter()
        .enumerate()
        .map(|(i, key)| {
            let value = record
                .get(i)
                .map(|field| Value::String(field.to_string()))
                .unwrap_or(Value::Null);
            (key.to_string(), value)
        })
        .collect();

    if record.len() > headers.len() {
        let extra: Vec<Value> = record
            .iter()
            .skip(headers.len())
            .map(|field| Value::String(field.to_string()))
            .collect();
        tracing::debug!(cells = extra.len(), "Row is wider than the header");
        obj.insert(OVERFLOW_KEY.to_string(), Value::Array(extra));
    }
    Value::Object(obj)
}

/// Reads CSV into JSON, using the first row as the header
///
/// Without any data rows the result is the plain list of rows (a lone header
/// comes back as one row).
pub fn decode(content: &str) -> Result<Value, CodecError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let rows = reader.records().collect::<Result<Vec<StringRecord>, _>>()?;

    let value = match rows.split_first() {
        Some((headers, records)) if !records.is_empty() => Value::Array(
            records
                .iter()
                .map(|record| record_object(headers, record))
                .collect(),
        ),
        _ => Value::Array(
            rows.iter()
                .map(|row| Value::Array(row.iter().map(|f| Value::String(f.to_string())).collect()))
                .collect(),
        ),
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn structured(value: Value) -> Parsed<Vec<Value>> {
        match value {
            Value::Array(items) => Parsed::Structured(items),
            other => panic!("expected array, got {}", other),
        }
    }

    #[test]
    fn encodes_objects_with_header() {
        let csv = encode(&structured(json!([
            {"name": "intro", "frames": 24},
            {"frames": 48, "name": "outro"}
        ])))
        .unwrap();
        assert_eq!(csv, "name,frames\r\nintro,24\r\noutro,48\r\n");
    }

    #[test]
    fn missing_keys_become_empty_cells() {
        let csv = encode(&structured(json!([{"a": "1", "b": "2"}, {"a": "3"}]))).unwrap();
        assert_eq!(csv, "a,b\r\n1,2\r\n3,\r\n");
    }

    #[test]
    fn encodes_scalars_one_per_row() {
        let csv = encode(&structured(json!(["x", 2, true, [1, 2]]))).unwrap();
        assert_eq!(csv, "x\r\n2\r\ntrue\r\n\"[1,2]\"\r\n");
    }

    #[test]
    fn mixed_object_array_is_rejected() {
        let err = encode(&structured(json!([{"a": 1}, 5]))).unwrap_err();
        assert!(matches!(err, CodecError::NonUniformRows { index: 1 }));
    }

    #[test]
    fn raw_text_is_single_cell() {
        let csv = encode(&Parsed::Raw("hello, world".to_string())).unwrap();
        assert_eq!(csv, "\"hello, world\"\r\n");
    }

    #[test]
    fn decodes_with_header() {
        let value = decode("name,frames\nintro,24\noutro\n").unwrap();
        assert_eq!(
            value,
            json!([
                {"name": "intro", "frames": "24"},
                {"name": "outro", "frames": null}
            ])
        );
    }

    #[test]
    fn extra_cells_are_kept() {
        let value = decode("a,b\n1,2,3,4\n5,6\n").unwrap();
        assert_eq!(
            value,
            json!([
                {"a": "1", "b": "2", "null": ["3", "4"]},
                {"a": "5", "b": "6"}
            ])
        );
    }

    #[test]
    fn header_only_falls_back_to_rows() {
        assert_eq!(decode("a,b\n").unwrap(), json!([["a", "b"]]));
        assert_eq!(decode("").unwrap(), json!([]));
    }
}
