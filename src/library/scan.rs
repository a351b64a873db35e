use std::path::Path;

use lofty::prelude::*;
use tracing::debug;
use walkdir::WalkDir;

use crate::config::LibrarySettings;

use super::model::Track;

fn is_audio_file(path: &Path, settings: &LibrarySettings) -> bool {
    let exts: Vec<String> = settings
        .extensions
        .iter()
        .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .collect();

    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            exts.iter().any(|e| e == &ext)
        })
        .unwrap_or(false)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

/// Probe `path` for a track, falling back to the file stem as title and an
/// unknown (zero) duration when tags can't be read.
pub(crate) fn probe(path: &Path) -> Track {
    let mut title = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("UNKNOWN")
        .to_string();
    let mut artist = String::new();
    let mut duration_secs = 0;

    match lofty::read_from_path(path) {
        Ok(tagged) => {
            duration_secs = tagged.properties().duration().as_secs();

            if let Some(tag) = tagged.primary_tag().or_else(|| tagged.first_tag()) {
                if let Some(v) = tag.title() {
                    if !v.trim().is_empty() {
                        title = v.trim().to_string();
                    }
                }
                if let Some(v) = tag.artist() {
                    artist = v.trim().to_string();
                }
            }
        }
        Err(e) => debug!(path = %path.display(), error = %e, "no readable tags"),
    }

    Track::new(title, path.display().to_string())
        .with_artist(artist)
        .with_duration_secs(duration_secs)
}

/// Import every audio file under `dir` as a new track, sorted by display name.
pub fn scan(dir: &Path, settings: &LibrarySettings) -> Vec<Track> {
    let mut tracks: Vec<Track> = Vec::new();

    let mut walker = WalkDir::new(dir).follow_links(settings.follow_links);

    // Non-recursive = only the root directory.
    let depth_cap = if settings.recursive {
        settings.max_depth
    } else {
        Some(1)
    };
    if let Some(d) = depth_cap {
        walker = walker.max_depth(d);
    }

    for entry in walker
        .into_iter()
        .filter_entry(|e| settings.include_hidden || e.depth() == 0 || !is_hidden(e.path()))
        .filter_map(Result::ok)
    {
        let path = entry.path();
        if path.is_file()
            && (settings.include_hidden || !is_hidden(path))
            && is_audio_file(path, settings)
        {
            tracks.push(probe(path).added_by("import"));
        }
    }

    tracks.sort_by(|a, b| a.display().to_lowercase().cmp(&b.display().to_lowercase()));
    tracks
}
