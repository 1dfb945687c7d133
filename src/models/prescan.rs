use serde::{Deserialize, Serialize};

/// `<prescanresults>` document. Only present once the prescan has finished.
#[derive(Debug, Clone, Deserialize)]
pub struct PrescanResults {
    #[serde(rename = "module", default)]
    pub modules: Vec<PrescanModule>,
}

/// A module enumerated by the prescan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrescanModule {
    #[serde(rename = "@id")]
    pub id: String,
    #[serde(rename = "@name", default)]
    pub name: String,
    #[serde(rename = "@platform", default)]
    pub platform: String,
    #[serde(rename = "@has_fatal_errors", default)]
    pub has_fatal_errors: bool,
}

impl PrescanModule {
    pub fn new(id: &str, platform: &str, has_fatal_errors: bool) -> Self {
        Self {
            id: id.to_string(),
            name: format!("module-{}", id),
            platform: platform.to_string(),
            has_fatal_errors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::xml::parse_document;

    #[test]
    fn test_parse_prescan_results() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<prescanresults xmlns="https://analysiscenter.veracode.com/schema/2.0/prescanresults" app_id="101" build_id="55">
   <module id="7" name="billing.jar" app_id="101" checksum="ab" platform="JVM / Java J2SE 6 / JAVAC_6" size="10KB" status="OK" has_fatal_errors="false">
      <file_issue filename="x.class" details="Missing debug information"/>
   </module>
   <module id="8" name="native.dll" platform="Windows / Win32 / MSVC" has_fatal_errors="true"/>
</prescanresults>"#;
        let results: PrescanResults = parse_document(xml, "prescanresults").unwrap();
        assert_eq!(results.modules.len(), 2);
        assert_eq!(results.modules[0].id, "7");
        assert_eq!(results.modules[0].name, "billing.jar");
        assert!(!results.modules[0].has_fatal_errors);
        assert!(results.modules[1].platform.contains("Win32"));
        assert!(results.modules[1].has_fatal_errors);
    }

    #[test]
    fn test_error_document_is_not_results() {
        let xml = "<error>Prescan results not available for build</error>";
        assert!(parse_document::<PrescanResults>(xml, "prescanresults").is_err());
    }

    #[test]
    fn test_results_without_modules() {
        let results: PrescanResults = parse_document("<prescanresults app_id=\"1\"/>", "prescanresults").unwrap();
        assert!(results.modules.is_empty());
    }
}
