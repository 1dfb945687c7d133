use quick_xml::events::Event;
use quick_xml::Reader;
use serde::de::DeserializeOwned;
use crate::errors::ScanGateError;

/// Local name of the first element in `xml`, if the document has one.
pub fn root_element(xml: &str) -> Option<String> {
    let mut reader = Reader::from_str(xml);
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                return Some(String::from_utf8_lossy(e.local_name().as_ref()).into_owned());
            }
            Ok(Event::Eof) | Err(_) => return None,
            Ok(_) => continue,
        }
    }
}

/// Deserialize a service document, insisting that its root element is `root`.
///
/// The service answers with an `<error>` document when a resource is not
/// available yet, and serde would happily map that onto any struct whose
/// fields all have defaults. Checking the root first keeps those apart.
pub fn parse_document<T: DeserializeOwned>(xml: &str, root: &'static str) -> Result<T, ScanGateError> {
    match root_element(xml) {
        Some(name) if name == root => {}
        Some(name) => {
            return Err(ScanGateError::Xml {
                document: root,
                message: format!("expected <{}> but found <{}>", root, name),
            });
        }
        None => {
            return Err(ScanGateError::Xml {
                document: root,
                message: "document has no root element".into(),
            });
        }
    }

    quick_xml::de::from_str(xml).map_err(|e| ScanGateError::Xml {
        document: root,
        message: e.to_string(),
    })
}

/// Text of an `<error>` document, or `None` for any other document.
pub fn error_message(xml: &str) -> Option<String> {
    if root_element(xml).as_deref() != Some("error") {
        return None;
    }
    let mut reader = Reader::from_str(xml);
    let mut text = String::new();
    loop {
        match reader.read_event() {
            Ok(Event::Text(t)) => {
                if let Ok(unescaped) = t.unescape() {
                    text.push_str(unescaped.trim());
                }
            }
            Ok(Event::CData(c)) => text.push_str(String::from_utf8_lossy(&c).trim()),
            Ok(Event::Eof) | Err(_) => break,
            Ok(_) => {}
        }
    }
    Some(text)
}
