//! Property-list parsing
//!
//! Profiles (`.mobileconfig`) come as XML or binary (`bplist00`) property
//! lists. Both are read with the `plist` crate and converted into
//! `serde_json::Value` so payload extraction runs over the same closed value
//! type as the JSON extractors. `<date>` and `<data>` values have no scalar
//! form in a setting and become `null`. CMS-signed profiles are rejected
//! before parsing.

use serde_json::{Map, Number, Value};
use std::io::Cursor;
use thiserror::Error;

pub const BINARY_MAGIC: &[u8] = b"bplist00";
// DER SEQUENCE with a two-byte length, the envelope of a CMS-signed profile
const DER_SEQUENCE: [u8; 2] = [0x30, 0x82];

#[derive(Debug, Error)]
pub enum PlistError {
    #[error(transparent)]
    Parse(#[from] ::plist::Error),

    #[error("{0}")]
    Malformed(String),
}

/// Encodings this parser refuses, identified from the leading bytes.
pub fn unsupported_encoding(head: &[u8]) -> Option<&'static str> {
    if head.starts_with(&DER_SEQUENCE) {
        Some("signed profile")
    } else {
        None
    }
}

/// Parses an XML or binary plist document into its root value.
pub fn parse_plist(content: &[u8]) -> Result<Value, PlistError> {
    let content = content.strip_prefix(b"\xef\xbb\xbf").unwrap_or(content);
    let value = ::plist::Value::from_reader(Cursor::new(content))?;
    convert(value)
}

fn convert(value: ::plist::Value) -> Result<Value, PlistError> {
    use ::plist::Value as P;

    match value {
        P::Dictionary(dict) => {
            let mut map = Map::new();
            for (key, value) in dict {
                map.insert(key, convert(value)?);
            }
            Ok(Value::Object(map))
        }
        P::Array(items) => items
            .into_iter()
            .map(convert)
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        P::String(s) => Ok(Value::String(s)),
        P::Boolean(b) => Ok(Value::Bool(b)),
        P::Integer(n) => n
            .as_signed()
            .map(Value::from)
            .or_else(|| n.as_unsigned().map(Value::from))
            .ok_or_else(|| PlistError::Malformed(format!("integer {} out of range", n))),
        P::Real(r) => Number::from_f64(r)
            .map(Value::Number)
            .ok_or_else(|| PlistError::Malformed(format!("non-finite real {}", r))),
        _ => Ok(Value::Null),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const PROFILE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
<dict>
    <key>PayloadContent</key>
    <array>
        <dict>
            <key>PayloadType</key>
            <string>com.apple.screensaver</string>
            <key>idleTime</key>
            <integer>600</integer>
            <key>askForPasswordDelay</key>
            <real>5.5</real>
            <key>askForPassword</key>
            <true/>
            <key>modulePath</key>
            <string>/System/Library/Screen Savers/Flurry.saver</string>
        </dict>
    </array>
    <key>PayloadDisplayName</key>
    <string>Screensaver</string>
    <key>PayloadRemovalDisallowed</key>
    <false/>
</dict>
</plist>"#;

    fn binary(value: &::plist::Value) -> Vec<u8> {
        let mut out = Vec::new();
        value.to_writer_binary(&mut out).unwrap();
        out
    }

    #[test]
    fn test_parse_profile() {
        let value = parse_plist(PROFILE.as_bytes()).unwrap();
        assert_eq!(value["PayloadDisplayName"], "Screensaver");
        assert_eq!(value["PayloadRemovalDisallowed"], false);

        let payload = &value["PayloadContent"][0];
        assert_eq!(payload["PayloadType"], "com.apple.screensaver");
        assert_eq!(payload["idleTime"], 600);
        assert_eq!(payload["askForPasswordDelay"], 5.5);
        assert_eq!(payload["askForPassword"], true);
    }

    #[test]
    fn test_dict_preserves_document_order() {
        let value = parse_plist(PROFILE.as_bytes()).unwrap();
        let keys: Vec<&String> = value["PayloadContent"][0]
            .as_object()
            .unwrap()
            .keys()
            .collect();
        assert_eq!(
            keys,
            vec![
                "PayloadType",
                "idleTime",
                "askForPasswordDelay",
                "askForPassword",
                "modulePath"
            ]
        );
    }

    #[test]
    fn test_binary_encoding() {
        let xml = ::plist::Value::from_reader_xml(PROFILE.as_bytes()).unwrap();
        let bytes = binary(&xml);
        assert!(bytes.starts_with(b"bplist00"));

        let value = parse_plist(&bytes).unwrap();
        assert_eq!(value, parse_plist(PROFILE.as_bytes()).unwrap());
    }

    #[test]
    fn test_data_and_date_become_null() {
        let value = parse_plist(
            b"<plist><dict><key>Cert</key><data>AAECAwQ=</data>\
              <key>Expiry</key><date>2030-01-01T00:00:00Z</date>\
              <key>Name</key><string>root</string></dict></plist>",
        )
        .unwrap();
        assert_eq!(
            value,
            json!({"Cert": null, "Expiry": null, "Name": "root"})
        );
    }

    #[test]
    fn test_byte_order_mark_is_skipped() {
        let mut content = b"\xef\xbb\xbf".to_vec();
        content.extend_from_slice(b"<plist><array><string></string><integer>-3</integer></array></plist>");
        assert_eq!(parse_plist(&content).unwrap(), json!(["", -3]));
    }

    #[test]
    fn test_malformed_documents() {
        assert!(parse_plist(b"<plist><dict><key>a</key></dict></plist>").is_err());
        assert!(parse_plist(b"<plist><integer>ten</integer></plist>").is_err());
        assert!(parse_plist(b"<plist>").is_err());
        assert!(parse_plist(b"bplist00\x01\x02").is_err());
    }

    #[test]
    fn test_unsupported_encoding() {
        assert_eq!(
            unsupported_encoding(&[0x30, 0x82, 0x1f, 0x00]),
            Some("signed profile")
        );
        assert_eq!(unsupported_encoding(b"bplist00\x01"), None);
        assert_eq!(unsupported_encoding(b"<?xml"), None);
    }
}
