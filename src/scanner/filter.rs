//! Binary extension denylist
//!
//! Paths with these extensions are dropped from the file list before their
//! content is ever read.

use once_cell::sync::Lazy;
use std::collections::HashSet;
use std::path::Path;

/// Audio, archive, executable, font, image, office and video formats
const BINARY_EXTENSIONS: &[&str] = &[
    // audio
    "aac", "aiff", "ape", "au", "flac", "gsm", "it", "m3u", "m4a", "mid", "mod", "mp3", "mpa",
    "pls", "ra", "s3m", "sid", "wav", "wma", "xm",
    // archives and packages
    "7z", "a", "ar", "bz2", "cab", "cpio", "deb", "dmg", "egg", "gz", "iso", "lha", "mar", "pea",
    "rar", "rpm", "s7z", "shar", "tar", "tbz2", "tgz", "tlz", "whl", "xpi", "xz", "pak", "crx",
    // executables
    "exe", "msi", "bin",
    // fonts
    "eot", "otf", "ttf", "woff", "woff2",
    // 3d and images
    "3dm", "3ds", "max", "bmp", "dds", "gif", "jpg", "jpeg", "png", "psd", "xcf", "tga", "thm",
    "tif", "tiff", "yuv", "ai", "eps", "ps", "svg", "dwg", "dxf",
    // geo
    "gpx", "kml", "kmz",
    // office and data documents
    "ods", "xls", "xlsx", "csv", "ics", "vcf", "ppt", "odp",
    // video
    "3g2", "3gp", "aaf", "asf", "avchd", "avi", "drc", "flv", "m2v", "m4p", "m4v", "mkv", "mng",
    "mov", "mp2", "mp4", "mpe", "mpeg", "mpg", "mpv", "mxf", "nsv", "ogg", "ogv", "ogm", "qt",
    "rm", "rmvb", "roq", "srt", "svi", "vob", "webm", "wmv",
];

static DENYLIST: Lazy<HashSet<&'static str>> =
    Lazy::new(|| BINARY_EXTENSIONS.iter().copied().collect());

/// True when the path ends in a denylisted extension (case-insensitive)
///
/// A bare dotfile such as `.mp3` counts as ending in its extension.
pub fn is_denylisted(path: impl AsRef<Path>) -> bool {
    path.as_ref()
        .file_name()
        .and_then(|name| name.to_str())
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| DENYLIST.contains(ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}
