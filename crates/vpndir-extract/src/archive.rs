//! ZIP archives of OpenVPN configuration files.

use crate::error::OpenVpnError;
use crate::openvpn::{self, ParsedConfig};
use std::collections::BTreeMap;
use std::io::{Cursor, Read};
use zip::result::ZipError;
use zip::ZipArchive;

/// Unpack an in-memory archive into path to contents. Directories are skipped.
pub fn unzip(bytes: &[u8]) -> Result<BTreeMap<String, Vec<u8>>, ZipError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;
    let mut files = BTreeMap::new();

    for index in 0..archive.len() {
        let mut file = archive.by_index(index)?;
        if file.is_dir() {
            continue;
        }
        let mut contents = Vec::with_capacity(usize::try_from(file.size()).unwrap_or_default());
        file.read_to_end(&mut contents)?;
        files.insert(file.name().to_string(), contents);
    }

    tracing::debug!(files = files.len(), "unpacked archive");
    Ok(files)
}

/// True for `.ovpn` file paths, case-insensitively.
#[must_use]
pub fn is_openvpn_file(path: &str) -> bool {
    path.rsplit_once('.')
        .is_some_and(|(_, extension)| extension.eq_ignore_ascii_case("ovpn"))
}

/// A parsed configuration with the file name it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    /// File name without its directory
    pub file_name: String,
    /// Parsed connection facts
    pub parsed: ParsedConfig,
}

/// Parse every `.ovpn` file of an unpacked archive.
///
/// A file that fails to parse is skipped with a warning naming it; the
/// per-file warnings of parsed files are carried over with the same prefix.
pub fn parse_openvpn_files(
    files: &BTreeMap<String, Vec<u8>>,
    warnings: &mut Vec<String>,
) -> Vec<ConfigFile> {
    let mut configs = Vec::new();

    for (path, contents) in files.iter().filter(|(path, _)| is_openvpn_file(path)) {
        let file_name = path.rsplit('/').next().unwrap_or(path).to_string();

        let parsed = std::str::from_utf8(contents)
            .map_err(|_| OpenVpnError::NotText)
            .and_then(openvpn::parse_connection);

        match parsed {
            Ok(parsed) => {
                warnings.extend(
                    parsed
                        .warnings
                        .iter()
                        .map(|warning| format!("{file_name}: {warning}")),
                );
                configs.push(ConfigFile { file_name, parsed });
            }
            Err(error) => warnings.push(format!("{file_name}: {error}")),
        }
    }

    configs
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;
    use zip::{CompressionMethod, ZipWriter};

    fn archive(entries: &[(&str, &str)]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
        writer.add_directory("configs/", options).unwrap();
        for (name, contents) in entries {
            writer.start_file(*name, options).unwrap();
            writer.write_all(contents.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_unzip_skips_directories() {
        let bytes = archive(&[("configs/a.ovpn", "remote a.example.net\n"), ("README", "hi")]);
        let files = unzip(&bytes).expect("valid archive");

        assert_eq!(files.len(), 2);
        assert_eq!(files["README"], b"hi");
        assert!(files.contains_key("configs/a.ovpn"));
    }

    #[test]
    fn test_unzip_rejects_garbage() {
        assert!(unzip(b"not a zip file").is_err());
    }

    #[test]
    fn test_is_openvpn_file() {
        assert!(is_openvpn_file("configs/Server.OVPN"));
        assert!(is_openvpn_file("a.ovpn"));
        assert!(!is_openvpn_file("ca.crt"));
        assert!(!is_openvpn_file("ovpn"));
    }

    #[test]
    fn test_parse_openvpn_files_keeps_going() {
        let bytes = archive(&[
            ("configs/good.ovpn", "remote good.example.net 443 tcp\n"),
            ("configs/bad.ovpn", "proto sctp\nremote bad.example.net\n"),
            ("configs/ca.crt", "-----BEGIN CERTIFICATE-----"),
        ]);
        let files = unzip(&bytes).expect("valid archive");
        let mut warnings = Vec::new();

        let configs = parse_openvpn_files(&files, &mut warnings);

        assert_eq!(configs.len(), 1);
        assert_eq!(configs[0].file_name, "good.ovpn");
        assert_eq!(configs[0].parsed.connection.port, 443);
        assert_eq!(warnings, vec!["bad.ovpn: protocol not supported: sctp"]);
    }
}
