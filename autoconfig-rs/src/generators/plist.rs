//! Property list serialization of a [`Payload`] tree

use std::fmt::{self, Write};

use quick_xml::escape::escape;

use crate::error::{AutoconfigError, Result};
use crate::generators::payload::{Payload, PayloadValue};

const XML_DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>";
const PLIST_DOCTYPE: &str = "<!DOCTYPE plist PUBLIC \"-//Apple//DTD PLIST 1.0//EN\" \"http://www.apple.com/DTDs/PropertyList-1.0.dtd\">";

/// Serialize `root` as a version 1.0 plist document
///
/// Fails with [`AutoconfigError::PayloadIntegrity`] if any key is unset.
pub fn to_plist(root: &Payload) -> Result<String> {
    let missing = root.missing_keys();
    if !missing.is_empty() {
        return Err(AutoconfigError::PayloadIntegrity(missing));
    }

    let mut out = String::with_capacity(2048);
    out.push_str(XML_DECLARATION);
    out.push('\n');
    out.push_str(PLIST_DOCTYPE);
    out.push('\n');
    out.push_str("<plist version=\"1.0\">");
    write_dict(&mut out, root)?;
    out.push_str("</plist>\n");

    Ok(out)
}

fn write_dict<W: Write>(out: &mut W, dict: &Payload) -> fmt::Result {
    out.write_str("<dict>")?;
    for (key, value) in dict.entries() {
        if let Some(value) = value {
            write_value(out, key, value)?;
        }
    }
    out.write_str("</dict>")
}

fn write_value<W: Write>(out: &mut W, key: &str, value: &PayloadValue) -> fmt::Result {
    write!(out, "<key>{}</key>", escape(key))?;
    match value {
        PayloadValue::Bool(true) => out.write_str("<true/>"),
        PayloadValue::Bool(false) => out.write_str("<false/>"),
        PayloadValue::Int(n) => write!(out, "<integer>{}</integer>", n),
        PayloadValue::Str(s) => write!(out, "<string>{}</string>", escape(s.as_str())),
        PayloadValue::Dict(dict) => write_dict(out, dict),
        PayloadValue::Array(items) => {
            out.write_str("<array>")?;
            for item in items {
                write_dict(out, item)?;
            }
            out.write_str("</array>")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_envelope() {
        let xml = to_plist(&Payload::new()).unwrap();

        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<!DOCTYPE plist"));
        assert!(xml.ends_with("<plist version=\"1.0\"><dict></dict></plist>\n"));
    }

    #[test]
    fn test_leaf_elements() {
        let payload = Payload::new()
            .with("Enabled", true)
            .with("Disabled", false)
            .with("Port", 993u16)
            .with("Negative", -1i64)
            .with("Host", "mail.example.com");

        let xml = to_plist(&payload).unwrap();

        assert!(xml.contains(
            "<dict><key>Enabled</key><true/>\
             <key>Disabled</key><false/>\
             <key>Port</key><integer>993</integer>\
             <key>Negative</key><integer>-1</integer>\
             <key>Host</key><string>mail.example.com</string></dict>"
        ));
    }

    #[test]
    fn test_known_shape_is_complete_and_ordered() {
        let payload = Payload::new()
            .with("Flag", true)
            .with("Count", 2i64)
            .with("Name", "root")
            .with(
                "Items",
                vec![
                    Payload::new().with("A", "first"),
                    Payload::new().with("B", "second"),
                ],
            );

        let xml = to_plist(&payload).unwrap();

        // One key per leaf plus the array key; array elements carry no key
        assert_eq!(xml.matches("<key>").count(), 6);
        assert_eq!(xml.matches("<true/>").count(), 1);
        assert_eq!(xml.matches("<integer>").count(), 1);
        assert_eq!(xml.matches("<string>").count(), 3);
        assert_eq!(xml.matches("<array>").count(), 1);
        assert_eq!(xml.matches("<dict>").count(), 3);

        let order: Vec<usize> = ["Flag", "Count", "Name", "Items", "first", "second"]
            .iter()
            .map(|needle| xml.find(needle).unwrap())
            .collect();
        assert!(order.windows(2).all(|w| w[0] < w[1]));

        assert!(xml.contains(
            "<key>Items</key><array><dict><key>A</key><string>first</string></dict>\
             <dict><key>B</key><string>second</string></dict></array>"
        ));
    }

    #[test]
    fn test_nested_dict_carries_key() {
        let payload = Payload::new().with("Inner", Payload::new().with("X", 1i64));
        let xml = to_plist(&payload).unwrap();
        assert!(xml.contains("<key>Inner</key><dict><key>X</key><integer>1</integer></dict>"));
    }

    #[test]
    fn test_strings_are_escaped() {
        let payload = Payload::new().with("Name", "Smith & <Sons>");
        let xml = to_plist(&payload).unwrap();
        assert!(xml.contains("<string>Smith &amp; &lt;Sons&gt;</string>"));
    }

    #[test]
    fn test_unset_key_is_rejected() {
        let payload = Payload::new()
            .with("Content", vec![Payload::new().with_unset("EmailAccountName")]);

        match to_plist(&payload) {
            Err(AutoconfigError::PayloadIntegrity(keys)) => {
                assert_eq!(keys, vec!["Content[0].EmailAccountName"]);
            }
            other => panic!("expected payload integrity error, got {:?}", other),
        }
    }

    struct FullBuffer {
        capacity: usize,
        written: String,
    }

    impl Write for FullBuffer {
        fn write_str(&mut self, s: &str) -> fmt::Result {
            if self.written.len() + s.len() > self.capacity {
                return Err(fmt::Error);
            }
            self.written.push_str(s);
            Ok(())
        }
    }

    #[test]
    fn test_write_errors_propagate() {
        let payload = Payload::new().with("Host", "mail.example.com");
        let mut out = FullBuffer {
            capacity: 6,
            written: String::new(),
        };

        assert!(write_dict(&mut out, &payload).is_err());
        assert_eq!(out.written, "<dict>");
    }
}
