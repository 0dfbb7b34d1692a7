//! Turns raw `url(...)` property values into absolute source strings.
//!
//! Values come straight out of a declaration block and are resolved against the
//! directory (or domain) of the stylesheet that declared them.

/// Protocols recognised when splitting a stylesheet URL into domain and path.
const DOMAIN_PROTOCOLS: &[&str] = &["http://", "https://", "ftp://", "file://"];

/// Directory part of `path`, including the trailing `/`.
///
/// Returns `path` unchanged when it has no `/` at all.
pub fn file_directory(path: &str) -> &str {
    match path.rfind('/') {
        Some(idx) => &path[..=idx],
        None => path,
    }
}

/// Protocol plus host of `path`, e.g. `http://h` for `http://h/css/a.css`.
pub fn file_domain(path: &str) -> &str {
    let protocol_len = DOMAIN_PROTOCOLS
        .iter()
        .find(|protocol| starts_with_ignore_case(path, protocol))
        .map_or(0, |protocol| protocol.len());

    match path[protocol_len..].find('/') {
        Some(idx) => &path[..protocol_len + idx],
        None => path,
    }
}

/// Bare file name of a `url(...)` value, used for user image matching.
///
/// `data:` URIs are returned whole. Query strings and fragments are kept.
pub fn file_name(raw: &str) -> String {
    let value = unwrap_url(raw);
    if is_data_uri(&value) {
        return value;
    }
    match value.rfind('/') {
        Some(idx) => value[idx + 1..].to_string(),
        None => value,
    }
}

/// Absolute form of a `url(...)` value relative to `file_root`.
pub fn full_path(raw: &str, file_root: &str) -> String {
    let value = unwrap_url(raw);

    if value.starts_with(file_root) {
        value
    } else if value.starts_with('/') && !value.starts_with("//") {
        format!("{}{}", file_domain(file_root), value)
    } else if !has_protocol(&value) {
        format!("{}{}", file_root, value)
    } else {
        value
    }
}

/// Every well-formed `url(...)` token in a single property value, wrapper included.
///
/// A token without its closing parenthesis ends the scan; it is not an error.
pub fn url_tokens(value: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut rest = value;
    let mut offset = 0;

    while let Some(start) = find_ignore_case(rest, "url(") {
        let open = start + "url(".len();
        let Some(len) = closing_paren(&rest[open..]) else {
            break;
        };
        let end = open + len + 1;
        tokens.push(&value[offset + start..offset + end]);
        offset += end;
        rest = &value[offset..];
    }
    tokens
}

/// True when the whole value is one `url(...)` token.
pub fn is_url_value(value: &str) -> bool {
    let value = value.trim();
    starts_with_ignore_case(value, "url(") && value.ends_with(')')
}

pub fn is_data_uri(value: &str) -> bool {
    starts_with_ignore_case(value, "data:")
}

/// Strips the `url(` / `)` wrapper, surrounding whitespace and quotes.
fn unwrap_url(raw: &str) -> String {
    let mut value = raw.trim();
    if starts_with_ignore_case(value, "url(") && value.ends_with(')') {
        value = value["url(".len()..value.len() - 1].trim();
    }
    value
        .trim_matches(|c| c == '"' || c == '\'')
        .trim()
        .to_string()
}

/// Index of the `)` closing a `url(` whose body starts at `body`, honouring quotes.
fn closing_paren(body: &str) -> Option<usize> {
    let mut quote: Option<char> = None;
    for (idx, ch) in body.char_indices() {
        match (quote, ch) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"') | (None, '\'') => quote = Some(ch),
            (None, ')') => return Some(idx),
            (None, _) => {}
        }
    }
    None
}

/// `scheme:` per RFC 3986, or a protocol-relative `//`.
fn has_protocol(value: &str) -> bool {
    if value.starts_with("//") {
        return true;
    }
    let Some(colon) = value.find(':') else {
        return false;
    };
    let scheme = &value[..colon];
    let mut chars = scheme.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {
            chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        _ => false,
    }
}

fn starts_with_ignore_case(value: &str, prefix: &str) -> bool {
    value
        .get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

fn find_ignore_case(haystack: &str, needle: &str) -> Option<usize> {
    haystack
        .char_indices()
        .map(|(idx, _)| idx)
        .find(|&idx| starts_with_ignore_case(&haystack[idx..], needle))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directory_keeps_trailing_slash() {
        assert_eq!(file_directory("http://h/css/styles.css"), "http://h/css/");
        assert_eq!(file_directory("styles.css"), "styles.css");
    }

    #[test]
    fn domain_of_absolute_paths() {
        assert_eq!(file_domain("http://h/css/"), "http://h");
        assert_eq!(
            file_domain("https://cdn.example.com:8080/a/b/"),
            "https://cdn.example.com:8080"
        );
        assert_eq!(file_domain("ftp://files/x"), "ftp://files");
        assert_eq!(file_domain("host/css/"), "host");
        assert_eq!(file_domain("http://bare"), "http://bare");
        assert_eq!(file_domain("file:///srv/css/"), "file://");
    }

    #[test]
    fn name_strips_wrapper_and_quotes() {
        assert_eq!(file_name("url(\"img/image-1.png\")"), "image-1.png");
        assert_eq!(file_name("url('image-2.png')"), "image-2.png");
        assert_eq!(file_name("url(  /abs/image-3.png )"), "image-3.png");
        assert_eq!(file_name("url(image-4.png?v=2#frag)"), "image-4.png?v=2#frag");
    }

    #[test]
    fn name_keeps_data_uris_whole() {
        let raw = "url(data:image/png;base64,iVBORw0KGgo/AAAA)";
        assert_eq!(file_name(raw), "data:image/png;base64,iVBORw0KGgo/AAAA");
    }

    #[test]
    fn relative_paths_use_sheet_directory() {
        assert_eq!(
            full_path("url(\"img1.png\")", "http://h/css/"),
            "http://h/css/img1.png"
        );
        assert_eq!(
            full_path("url(../img/img2.png)", "http://h/css/"),
            "http://h/css/../img/img2.png"
        );
    }

    #[test]
    fn root_relative_paths_use_sheet_domain() {
        assert_eq!(
            full_path("url(/img/a.png)", "http://h/css/"),
            "http://h/img/a.png"
        );
    }

    #[test]
    fn root_relative_file_urls_stay_on_disk() {
        assert_eq!(
            full_path("url(/srv/img/a.png)", "file:///srv/css/"),
            "file:///srv/img/a.png"
        );
    }

    #[test]
    fn absolute_and_protocol_relative_pass_through() {
        assert_eq!(
            full_path("url(https://cdn.x/a.png)", "http://h/css/"),
            "https://cdn.x/a.png"
        );
        assert_eq!(full_path("url(//cdn.x/a.png)", "http://h/css/"), "//cdn.x/a.png");
        assert_eq!(
            full_path("url('http://h/css/a.png')", "http://h/css/"),
            "http://h/css/a.png"
        );
    }

    #[test]
    fn data_uris_are_never_prefixed() {
        assert_eq!(
            full_path("url(data:image/gif;base64,R0lGOD)", "http://h/css/"),
            "data:image/gif;base64,R0lGOD"
        );
    }

    #[test]
    fn finds_every_url_token() {
        let value = "url(\"a.png\"), linear-gradient(red, blue), URL('b (1).png')";
        assert_eq!(url_tokens(value), vec!["url(\"a.png\")", "URL('b (1).png')"]);
    }

    #[test]
    fn malformed_url_tokens_are_skipped() {
        assert_eq!(url_tokens("url(a.png), url(b.png"), vec!["url(a.png)"]);
        assert!(url_tokens("none").is_empty());
    }

    #[test]
    fn url_value_shape() {
        assert!(is_url_value("url(a.png)"));
        assert!(!is_url_value("url(a.png) no-repeat"));
        assert!(!is_url_value("red"));
    }
}
