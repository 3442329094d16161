//! Integration tests for scanning a TabState directory

use std::path::Path;

use tempfile::TempDir;

use tabstate::config::Config;
use tabstate::report::{render_json, render_text};
use tabstate::scan::{ScanFailure, Scanner};
use tabstate::{decode, DecodedRecord, Field, ReadError};

fn varint(mut value: u64, out: &mut Vec<u8>) {
    while value >= 0x80 {
        out.push((value as u8) | 0x80);
        value >>= 7;
    }
    out.push(value as u8);
}

fn text(s: &str, out: &mut Vec<u8>) {
    let units: Vec<u16> = s.encode_utf16().collect();
    varint(units.len() as u64, out);
    for unit in units {
        out.extend_from_slice(&unit.to_le_bytes());
    }
}

fn view_tail(content: &str, out: &mut Vec<u8>) {
    varint(0, out); // selection start
    varint(content.encode_utf16().count() as u64, out); // selection end
    out.extend_from_slice(&[1, 0, 0]);
    varint(0, out); // option count
    text(content, out);
}

/// Untitled note as the editor writes it
fn untitled_note(sequence: u64, content: &str) -> Vec<u8> {
    let mut out = b"NP".to_vec();
    varint(sequence, &mut out);
    varint(0, &mut out);
    out.push(0x01);
    view_tail(content, &mut out);
    out
}

/// Saved-file record as the editor writes it
fn saved_file(sequence: u64, path: &str, content: &str) -> Vec<u8> {
    let mut out = b"NP".to_vec();
    varint(sequence, &mut out);
    varint(1, &mut out);
    text(path, &mut out);
    varint(content.encode_utf16().count() as u64, &mut out);
    out.extend_from_slice(&[0x05, 0x01]);
    varint(133_590_402_005_000_000, &mut out);
    out.extend_from_slice(&[0x11; 32]);
    out.extend_from_slice(&[0x00, 0x01]);
    view_tail(content, &mut out);
    out
}

fn write(dir: &Path, name: &str, data: &[u8]) {
    std::fs::write(dir.join(name), data).unwrap();
}

#[tokio::test]
async fn test_scan_mixed_directory() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "1-untitled.bin", &untitled_note(1, "shopping list\rmilk"));
    write(dir.path(), "2-saved.bin", &saved_file(2, r"C:\notes\todo.txt", "edit"));
    write(dir.path(), "3-unknown.bin", b"NP\x03\x02");
    write(dir.path(), "4-garbage.bin", b"\x00\x01\x02\x03");
    write(dir.path(), "5-truncated.bin", &untitled_note(5, "cut here")[..12]);
    write(dir.path(), "1-untitled.0.bin", b"ignored");
    write(dir.path(), "1-untitled.1.bin", b"ignored");
    write(dir.path(), "settings.dat", b"ignored");

    let scanner = Scanner::new(Config::default());
    let entries = scanner.scan(dir.path()).await.unwrap();

    let names: Vec<&str> = entries.iter().map(|e| e.file_name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "1-untitled.bin",
            "2-saved.bin",
            "3-unknown.bin",
            "4-garbage.bin",
            "5-truncated.bin"
        ]
    );

    match entries[0].outcome.as_ref().unwrap() {
        DecodedRecord::UntitledNote(note) => {
            assert_eq!(note.sequence, 1);
            assert_eq!(note.content, "shopping list\nmilk");
            assert!(note.word_wrap);
        }
        other => panic!("expected untitled note, got {other:?}"),
    }

    match entries[1].outcome.as_ref().unwrap() {
        DecodedRecord::SavedFile(file) => {
            assert_eq!(file.path, r"C:\notes\todo.txt");
            assert_eq!(file.content, "edit");
            assert_eq!(file.file_hash, [0x11; 32]);
            assert!(file.file_time_utc.is_some());
        }
        other => panic!("expected saved file, got {other:?}"),
    }

    assert_eq!(
        entries[2].outcome.as_ref().unwrap(),
        &DecodedRecord::Unrecognized { flag: 2 }
    );

    assert!(matches!(
        entries[3].outcome,
        Err(ScanFailure::Decode(tabstate::DecodeError::BadSignature { .. }))
    ));

    match &entries[4].outcome {
        Err(ScanFailure::Decode(e)) => {
            assert!(matches!(e.root_cause(), Some(ReadError::UnexpectedEof { .. })));
        }
        other => panic!("expected decode failure, got {other:?}"),
    }

    for entry in &entries {
        assert_eq!(entry.sha256.as_ref().map(String::len), Some(64));
    }
}

#[tokio::test]
async fn test_scan_report_round_trip() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "a.bin", &untitled_note(7, "report me"));
    write(dir.path(), "b.bin", b"NP\x00");

    let entries = Scanner::new(Config::default())
        .scan(dir.path())
        .await
        .unwrap();

    let text = render_text(&entries[0]);
    assert!(text.contains("[*] Processing File: a.bin"));
    assert!(text.contains("report me"));

    let json: serde_json::Value = serde_json::from_str(&render_json(&entries).unwrap()).unwrap();
    assert_eq!(json.as_array().unwrap().len(), 2);
    assert_eq!(json[0]["record"]["content"], "report me");
    assert_eq!(json[1]["error"]["field"], "flag");
}

#[tokio::test]
async fn test_scan_custom_selection_policy() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "tab.state", &untitled_note(1, "custom"));
    write(dir.path(), "tab.bin", &untitled_note(2, "default"));

    let config: Config = toml::from_str(
        r#"
            extension = "state"
            skip_suffixes = []
        "#,
    )
    .unwrap();
    let entries = Scanner::new(config).scan(dir.path()).await.unwrap();

    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].file_name, "tab.state");
}

#[tokio::test]
async fn test_scan_missing_directory_fails() {
    let dir = TempDir::new().unwrap();
    let result = Scanner::new(Config::default())
        .scan(&dir.path().join("nope"))
        .await;
    assert!(result.is_err());
}

#[test]
fn test_every_truncation_fails_with_field() {
    let full = saved_file(3, r"E:\x.txt", "abc\r\ndef");
    assert!(decode(&full).is_ok());

    for cut in 2..full.len() {
        let err = decode(&full[..cut]).unwrap_err();
        assert!(err.field().is_some(), "cut {cut}: {err}");
        assert!(
            matches!(err.root_cause(), Some(ReadError::UnexpectedEof { .. })),
            "cut {cut}: {err}"
        );
    }
}

#[test]
fn test_decode_errors_name_each_saved_file_field() {
    let full = saved_file(3, "p", "c");
    // magic(2) seq(1) flag(1) path_len(1) path(2) declared(1) enc(1) eol(1)
    let cases = [
        (4, Field::PathLength),
        (5, Field::Path),
        (7, Field::ContentLengthDeclared),
        (8, Field::TextEncoding),
        (9, Field::LineEnding),
        (10, Field::FileTime),
    ];

    for (cut, field) in cases {
        assert_eq!(decode(&full[..cut]).unwrap_err().field(), Some(field));
    }
}
