//! Utilities for creating `rodio` sinks from source locators.

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use rodio::{Decoder, OutputStream, Sink};

/// Map a locator to a local path. Plain paths and `file://` URIs are
/// supported; any other scheme is an error.
pub(super) fn locator_path(locator: &str) -> Result<PathBuf, String> {
    let locator = locator.trim();
    if let Some(rest) = locator.strip_prefix("file://") {
        return Ok(PathBuf::from(rest));
    }
    if let Some((scheme, _)) = locator.split_once("://") {
        return Err(format!("unsupported source scheme {scheme:?}"));
    }
    if locator.is_empty() {
        return Err("empty source locator".to_string());
    }
    Ok(PathBuf::from(locator))
}

/// Create a paused `Sink` playing `locator`.
pub(super) fn create_sink(stream: &OutputStream, locator: &str) -> Result<Sink, String> {
    let path = locator_path(locator)?;
    let file = File::open(&path).map_err(|e| format!("failed to open {}: {e}", path.display()))?;

    let source = Decoder::new(BufReader::new(file))
        .map_err(|e| format!("failed to decode {}: {e}", path.display()))?;

    let sink = Sink::connect_new(stream.mixer());
    sink.append(source);
    sink.pause();
    Ok(sink)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locator_path_accepts_plain_paths_and_file_uris() {
        assert_eq!(locator_path("/music/a.ogg").unwrap(), PathBuf::from("/music/a.ogg"));
        assert_eq!(
            locator_path("file:///music/a.ogg").unwrap(),
            PathBuf::from("/music/a.ogg")
        );
    }

    #[test]
    fn locator_path_rejects_remote_schemes_and_blanks() {
        assert!(locator_path("https://example.com/a.ogg").is_err());
        assert!(locator_path("   ").is_err());
    }
}
