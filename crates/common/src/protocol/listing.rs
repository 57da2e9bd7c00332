//! Byte encoding of directory listings for embedders that cannot take
//! structured values.
//!
//! ```text
//! name ??? created ??? modified !!! name ??? created ??? modified
//! ```
//!
//! Rows are joined with [`ROW_SEPARATOR`] and fields with
//! [`FIELD_SEPARATOR`]; there is no trailing separator. Times are rendered
//! as `YYYY-MM-DD HH:MM:SS UTC`. Names that could not be split back out
//! unambiguously are refused at encoding time.

use chrono::DateTime;

use crate::mount::{Entry, MountError};

pub const ROW_SEPARATOR: &[u8] = b"!!!";
pub const FIELD_SEPARATOR: &[u8] = b"???";
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

/// One decoded listing row. Missing fields decode as empty strings.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ListingRow {
    pub name: String,
    pub created: String,
    pub modified: String,
}

pub fn format_timestamp(timestamp: i64) -> String {
    DateTime::from_timestamp(timestamp, 0)
        .map(|time| time.format(TIMESTAMP_FORMAT).to_string())
        .unwrap_or_default()
}

/// Why `name` cannot be carried by a listing, if it cannot
pub fn listing_conflict(name: &str) -> Option<&'static str> {
    let bytes = name.as_bytes();
    if bytes.is_empty() {
        Some("empty name")
    } else if contains(bytes, ROW_SEPARATOR) || contains(bytes, FIELD_SEPARATOR) {
        Some("name contains a listing separator")
    } else if bytes.ends_with(b"?") {
        Some("name ends with a separator byte")
    } else {
        None
    }
}

fn check_name(name: &str) -> Result<(), MountError> {
    match listing_conflict(name) {
        None => Ok(()),
        Some(reason) => Err(MountError::Malformed(format!(
            "cannot encode {:?} in a listing: {}",
            name, reason
        ))),
    }
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|window| window == needle)
}

pub fn encode_listing(entries: &[Entry]) -> Result<Vec<u8>, MountError> {
    let mut out = Vec::new();
    for (i, entry) in entries.iter().enumerate() {
        check_name(&entry.name)?;
        if i > 0 {
            out.extend_from_slice(ROW_SEPARATOR);
        }
        out.extend_from_slice(entry.name.as_bytes());
        out.extend_from_slice(FIELD_SEPARATOR);
        out.extend_from_slice(format_timestamp(entry.created).as_bytes());
        out.extend_from_slice(FIELD_SEPARATOR);
        out.extend_from_slice(format_timestamp(entry.modified).as_bytes());
    }
    Ok(out)
}

pub fn decode_listing(bytes: &[u8]) -> Vec<ListingRow> {
    split_on(bytes, ROW_SEPARATOR)
        .into_iter()
        .filter_map(|row| {
            let mut fields = split_on(row, FIELD_SEPARATOR)
                .into_iter()
                .map(|field| String::from_utf8_lossy(field).into_owned());
            let name = fields.next().unwrap_or_default();
            if name.is_empty() {
                return None;
            }
            Some(ListingRow {
                name,
                created: fields.next().unwrap_or_default(),
                modified: fields.next().unwrap_or_default(),
            })
        })
        .collect()
}

/// Split on every non-overlapping occurrence of `separator`, scanning left to
///  right. Adjacent separators yield empty pieces.
pub fn split_on<'a>(bytes: &'a [u8], separator: &[u8]) -> Vec<&'a [u8]> {
    let mut pieces = Vec::new();
    let mut start = 0;
    let mut i = 0;
    while i + separator.len() <= bytes.len() {
        if &bytes[i..i + separator.len()] == separator {
            pieces.push(&bytes[start..i]);
            i += separator.len();
            start = i;
        } else {
            i += 1;
        }
    }
    pieces.push(&bytes[start..]);
    pieces
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::mount::EntryKind;

    fn entry(name: &str, created: i64, modified: i64) -> Entry {
        Entry {
            name: name.to_string(),
            kind: EntryKind::File,
            created,
            modified,
            size: 0,
            mime: None,
        }
    }

    #[test]
    fn test_encoding_layout() {
        let bytes = encode_listing(&[entry("a.txt", 0, 86_400)]).unwrap();
        assert_eq!(
            bytes,
            b"a.txt???1970-01-01 00:00:00 UTC???1970-01-02 00:00:00 UTC".to_vec()
        );
    }

    #[test]
    fn test_reversible() {
        let entries = vec![
            entry("notes", 1_700_000_000, 1_700_000_100),
            entry("?odd!name!", 1, 2),
            entry("hello world.txt", 3, 4),
        ];
        let rows = decode_listing(&encode_listing(&entries).unwrap());
        assert_eq!(rows.len(), 3);
        for (row, entry) in rows.iter().zip(&entries) {
            assert_eq!(row.name, entry.name);
            assert_eq!(row.created, format_timestamp(entry.created));
            assert_eq!(row.modified, format_timestamp(entry.modified));
        }
    }

    #[test]
    fn test_refuses_ambiguous_names() {
        for name in ["", "a!!!b", "a???b", "why?"] {
            assert!(matches!(
                encode_listing(&[entry(name, 0, 0)]),
                Err(MountError::Malformed(_))
            ));
        }
    }

    #[test]
    fn test_empty_listing() {
        assert!(encode_listing(&[]).unwrap().is_empty());
        assert!(decode_listing(b"").is_empty());
    }

    #[test]
    fn test_decode_is_lenient() {
        let rows = decode_listing(b"only-name!!!!!!???2020!!!x???c");
        assert_eq!(
            rows,
            vec![
                ListingRow {
                    name: "only-name".into(),
                    ..Default::default()
                },
                ListingRow {
                    name: "x".into(),
                    created: "c".into(),
                    modified: String::new(),
                },
            ]
        );
    }

    #[test]
    fn test_split_keeps_adjacent_empty_pieces() {
        assert_eq!(
            split_on(b"a??????b", FIELD_SEPARATOR),
            vec![&b"a"[..], &b""[..], &b"b"[..]]
        );
        assert_eq!(split_on(b"abc", FIELD_SEPARATOR), vec![&b"abc"[..]]);
        assert_eq!(split_on(b"???", FIELD_SEPARATOR), vec![&b""[..], &b""[..]]);
    }
}
