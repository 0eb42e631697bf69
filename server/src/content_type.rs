pub const HTML: &str = "text/html";
pub const IMAGE: &str = "image";
pub const ICON: &str = "icon";
pub const OCTET_STREAM: &str = "application/octet-stream";
pub const MESSAGE_HTTP: &str = "message/http";

const SUFFIXES: &[(&str, &str)] = &[
    (".html", HTML),
    (".bmp", IMAGE),
    (".gif", IMAGE),
    (".png", IMAGE),
    (".jpg", IMAGE),
    (".ico", ICON),
];

/// Content type by file-name suffix, ignoring case.
pub fn for_file_name(file_name: &str) -> &'static str {
    let file_name = file_name.to_lowercase();
    SUFFIXES
        .iter()
        .find(|(suffix, _)| file_name.ends_with(suffix))
        .map_or(OCTET_STREAM, |&(_, content_type)| content_type)
}
