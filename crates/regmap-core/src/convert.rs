//! Whole-document conversion entry points.

use std::fs;
use std::path::Path;

use ipxact_xml::{DEFAULT_INDENT, SPIRIT_1685_2009};
use tracing::{debug, info};

use crate::flatten::{flatten, FlattenStats};
use crate::RegMapError;

/// Options controlling one conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertOptions {
    /// Namespace URI register and field elements must be bound to.
    pub namespace: String,
    /// Spaces per nesting level in the output document.
    pub indent: usize,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        ConvertOptions {
            namespace: SPIRIT_1685_2009.to_string(),
            indent: DEFAULT_INDENT,
        }
    }
}

/// Convert an IP-XACT document held in memory and return the register map text.
pub fn convert_str(
    xml: &str,
    options: &ConvertOptions,
) -> Result<(String, FlattenStats), RegMapError> {
    let document = ipxact_xml::parse(xml)?;
    debug!(root = document.name(), "parsed source document");
    let (root, stats) = flatten(&document, &options.namespace)?;
    let text = root.to_xml_string(options.indent)?;
    Ok((text, stats))
}

/// Convert the document at `input` and write the register map to `output`.
///
/// The output file is only created once the whole document has been
/// converted, so a failed conversion never leaves a partial file behind.
pub fn convert_file(
    input: &Path,
    output: &Path,
    options: &ConvertOptions,
) -> Result<FlattenStats, RegMapError> {
    if !input.exists() {
        return Err(RegMapError::InputNotFound(input.to_path_buf()));
    }
    let xml = fs::read_to_string(input).map_err(|source| RegMapError::Io {
        path: input.to_path_buf(),
        source,
    })?;
    let (text, stats) = convert_str(&xml, options)?;
    fs::write(output, text).map_err(|source| RegMapError::Io {
        path: output.to_path_buf(),
        source,
    })?;
    info!(
        input = %input.display(),
        output = %output.display(),
        registers = stats.registers,
        nodes = stats.nodes,
        "wrote register map"
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const CTRL: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<spirit:component xmlns:spirit="http://www.spiritconsortium.org/XMLSchema/SPIRIT/1685-2009">
  <spirit:memoryMaps>
    <spirit:memoryMap>
      <spirit:name>map</spirit:name>
      <spirit:addressBlock>
        <spirit:name>block</spirit:name>
        <spirit:register>
          <spirit:name>CTRL</spirit:name>
          <spirit:addressOffset>0x10</spirit:addressOffset>
          <spirit:access>read-write</spirit:access>
          <spirit:field>
            <spirit:bitWidth>4</spirit:bitWidth>
            <spirit:bitOffset>0</spirit:bitOffset>
          </spirit:field>
        </spirit:register>
        <spirit:register>
          <spirit:name>CNT_MSB</spirit:name>
          <spirit:addressOffset>0x20</spirit:addressOffset>
          <spirit:access>read-only</spirit:access>
          <spirit:description>Counter
high half</spirit:description>
          <spirit:field>
            <spirit:name>value</spirit:name>
            <spirit:bitWidth>16</spirit:bitWidth>
            <spirit:bitOffset>0</spirit:bitOffset>
          </spirit:field>
        </spirit:register>
        <spirit:register>
          <spirit:name>CNT_LSB</spirit:name>
          <spirit:addressOffset>0x24</spirit:addressOffset>
          <spirit:access>read-only</spirit:access>
          <spirit:field>
            <spirit:name>value</spirit:name>
            <spirit:bitWidth>32</spirit:bitWidth>
            <spirit:bitOffset>0</spirit:bitOffset>
          </spirit:field>
        </spirit:register>
      </spirit:addressBlock>
    </spirit:memoryMap>
  </spirit:memoryMaps>
</spirit:component>
"#;

    fn scratch_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("regmap-core-{}-{name}", std::process::id()))
    }

    #[test]
    fn converts_document_to_node_map() {
        let (text, stats) = convert_str(CTRL, &ConvertOptions::default()).expect("convert");
        let expected = concat!(
            "<node>\n",
            "  <node id=\"CTRL\" address=\"0x10\" permission=\"rw\" mask=\"0x0000000f\"/>\n",
            "  <node id=\"CNT\" address=\"0x20\" permission=\"r\" description=\"Counterhigh half\">\n",
            "    <node id=\"MSB\" address=\"0x20\" permission=\"r\" description=\"Counterhigh half\" mask=\"0x0000ffff\"/>\n",
            "    <node id=\"LSB\" address=\"0x24\" permission=\"r\" mask=\"0xffffffff\"/>\n",
            "  </node>\n",
            "</node>\n",
        );
        assert_eq!(text, expected);
        assert_eq!(stats.registers, 3);
        assert_eq!(stats.split_registers, 2);
        assert_eq!(stats.nodes, 4);
    }

    #[test]
    fn conversion_is_deterministic() {
        let options = ConvertOptions::default();
        let (first, _) = convert_str(CTRL, &options).expect("convert");
        let (second, _) = convert_str(CTRL, &options).expect("convert");
        assert_eq!(first, second);
    }

    #[test]
    fn indent_is_configurable() {
        let options = ConvertOptions {
            indent: 4,
            ..ConvertOptions::default()
        };
        let (text, _) = convert_str(CTRL, &options).expect("convert");
        assert!(text.contains("\n    <node id=\"CTRL\""));
        assert!(text.contains("\n        <node id=\"MSB\""));
    }

    #[test]
    fn document_without_registers_is_empty_root() {
        let (text, stats) = convert_str("<component/>", &ConvertOptions::default()).expect("convert");
        assert_eq!(text, "<node/>\n");
        assert_eq!(stats, FlattenStats::default());
    }

    #[test]
    fn file_round_trip() {
        let input = scratch_path("in.xml");
        let output = scratch_path("out.xml");
        fs::write(&input, CTRL).expect("write input");
        let stats =
            convert_file(&input, &output, &ConvertOptions::default()).expect("convert file");
        let written = fs::read_to_string(&output).expect("read output");
        assert!(written.starts_with("<node>\n  <node id=\"CTRL\""));
        assert_eq!(stats.nodes, 4);
        let _ = fs::remove_file(&input);
        let _ = fs::remove_file(&output);
    }

    #[test]
    fn missing_input_is_reported() {
        let input = scratch_path("does-not-exist.xml");
        let output = scratch_path("never-written.xml");
        let err = convert_file(&input, &output, &ConvertOptions::default()).unwrap_err();
        assert!(matches!(err, RegMapError::InputNotFound(ref path) if *path == input));
        assert!(!output.exists());
    }

    #[test]
    fn failed_conversion_writes_nothing() {
        let input = scratch_path("bad-access.xml");
        let output = scratch_path("bad-access-out.xml");
        let xml = CTRL.replace("read-write", "writeOnce");
        fs::write(&input, xml).expect("write input");
        let err = convert_file(&input, &output, &ConvertOptions::default()).unwrap_err();
        assert!(matches!(err, RegMapError::UnrecognizedAccessKind(ref kind) if kind == "writeOnce"));
        assert!(!output.exists());
        let _ = fs::remove_file(&input);
    }
}
