use crate::assets;
use crate::config::ArtifactNames;

const ASSET_LABEL: &str = "{{ASSET_LABEL}}";
const SOURCE_SIZE: &str = "{{SOURCE_SIZE}}";
const GLOBAL_NAME: &str = "{{GLOBAL_NAME}}";
const LOADER_NAME: &str = "{{LOADER_NAME}}";
const PAYLOAD: &str = "{{PAYLOAD}}";

/// Render the artifact text for an encoded payload.
///
/// The payload is substituted last, so nothing inside it is ever treated as a
/// placeholder.
pub fn render(names: &ArtifactNames, source_len: u64, payload: &str) -> String {
    assets::loader_template()
        .replace(ASSET_LABEL, &names.asset_label)
        .replace(SOURCE_SIZE, &group_thousands(source_len))
        .replace(GLOBAL_NAME, &names.global_name)
        .replace(LOADER_NAME, &names.loader_name)
        .replace(PAYLOAD, payload)
}

/// The line prefix that opens the payload assignment for `global_name`.
pub fn assignment_prefix(global_name: &str) -> String {
    format!("window.{global_name} = `")
}

/// Format a count with comma thousands separators, e.g. `1,234,567`.
pub fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1000), "1,000");
        assert_eq!(group_thousands(884_736), "884,736");
        assert_eq!(group_thousands(1_179_648), "1,179,648");
    }

    #[test]
    fn test_render_default_names() {
        let names = ArtifactNames::default();
        let text = render(&names, 4, "U1FMaQ==");

        assert!(text.starts_with("// Embedded Chinook Database\n"));
        assert!(text.contains("// Database size: 4 bytes\n"));
        assert!(text.contains("window.CHINOOK_DATABASE = `U1FMaQ==`;\n"));
        assert!(text.contains("function loadEmbeddedChinookDirect() {"));
        assert!(text.contains("atob(window.CHINOOK_DATABASE)"));
        assert!(text.contains("window.loadEmbeddedChinookDirect = loadEmbeddedChinookDirect;"));
        assert!(!text.contains("{{"));
    }

    #[test]
    fn test_render_custom_names() {
        let names = ArtifactNames {
            global_name: "NORTHWIND_DB".to_string(),
            loader_name: "loadNorthwind".to_string(),
            asset_label: "Northwind".to_string(),
        };
        let text = render(&names, 1500, "");

        assert!(text.contains("// Embedded Northwind Database"));
        assert!(text.contains("// Database size: 1,500 bytes"));
        assert!(text.contains(&format!("{}`;", assignment_prefix("NORTHWIND_DB"))));
        assert!(text.contains("window.loadNorthwind = loadNorthwind;"));
        assert!(!text.contains("CHINOOK"));
    }

    #[test]
    fn test_payload_is_not_rescanned() {
        let names = ArtifactNames::default();
        let text = render(&names, 0, "{{GLOBAL_NAME}}");
        assert!(text.contains("window.CHINOOK_DATABASE = `{{GLOBAL_NAME}}`;"));
    }
}
