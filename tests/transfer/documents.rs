//! Integration tests for the document backend

use scenery_foundation::ErrorKind;
use scenery_transfer::{Direction, Document, DocumentWriter, Node, Serializer, SerializerExt};

fn sample_document() -> Document {
    let mut writer = DocumentWriter::new();
    let mut title = String::from("Level 1");
    let mut counts = vec![3u32, 1, 4];
    let mut gravity = -9.5f64;

    writer.push_object("Scene").unwrap();
    writer.field(&mut title, "title").unwrap();
    writer.field(&mut counts, "counts").unwrap();
    writer.field(&mut gravity, "gravity").unwrap();
    writer.pop_object().unwrap();
    writer.finish().unwrap()
}

#[test]
fn directions() {
    let writer = DocumentWriter::new();
    assert_eq!(writer.direction(), Direction::Read);

    let doc = Document::default();
    assert_eq!(doc.reader().direction(), Direction::Write);
}

#[test]
fn msgpack_round_trip() {
    let doc = sample_document();
    let bytes = doc.to_msgpack().unwrap();
    let decoded = Document::from_msgpack(&bytes).unwrap();
    assert_eq!(decoded, doc);
    assert_eq!(decoded.root.pointer("Scene/counts/2"), Some(&Node::UInt(4)));
}

#[test]
fn garbage_bytes_fail_to_decode() {
    let err = Document::from_msgpack(&[0xc1, 0x00, 0xff]).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::SerializationError(_)));
}

#[test]
fn file_round_trip() {
    let path = std::env::temp_dir().join(format!("scenery-doc-{}.msgpack", std::process::id()));
    let doc = sample_document();
    doc.save_to_file(&path).unwrap();
    let loaded = Document::load_from_file(&path).unwrap();
    std::fs::remove_file(&path).ok();
    assert_eq!(loaded, doc);
}

#[test]
fn missing_file_is_serialization_error() {
    let err = Document::load_from_file("/definitely/not/here.msgpack").unwrap_err();
    assert!(matches!(err.kind, ErrorKind::SerializationError(_)));
}

#[test]
fn reader_walks_arrays() {
    let doc = sample_document();
    let mut reader = doc.reader();
    assert!(reader.push_object("Scene").unwrap());
    assert!(reader.push_array("counts").unwrap());

    let mut seen = Vec::new();
    while reader.begin_element().unwrap() {
        let mut n = 0u32;
        reader.field(&mut n, "").unwrap();
        reader.end_element().unwrap();
        seen.push(n);
    }
    reader.pop_array().unwrap();
    reader.pop_object().unwrap();
    assert_eq!(seen, vec![3, 1, 4]);
}

#[test]
fn reader_rejects_object_as_array() {
    let doc = sample_document();
    let mut reader = doc.reader();
    let err = reader.push_array("Scene").unwrap_err();
    assert!(matches!(
        err.kind,
        ErrorKind::TypeMismatch { expected: "array", found: "object", .. }
    ));
}

#[test]
fn begin_element_outside_array_fails() {
    let mut writer = DocumentWriter::new();
    writer.push_object("Scene").unwrap();
    let err = writer.begin_element().unwrap_err();
    assert!(matches!(err.kind, ErrorKind::ScopeMismatch { expected: "array", .. }));
}

#[test]
fn contains_reports_presence() {
    let doc = sample_document();
    let mut reader = doc.reader();
    assert!(reader.contains("Scene"));
    assert!(!reader.contains("Other"));
    reader.push_object("Scene").unwrap();
    assert!(reader.contains("gravity"));
}
