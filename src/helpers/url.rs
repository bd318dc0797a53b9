//! URL helper functions

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

/// Characters escaped inside a single path segment
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Encode a value for use as one URL path segment
pub fn encode_segment(segment: &str) -> String {
    utf8_percent_encode(segment, SEGMENT).to_string()
}

/// Route of a post page
///
/// # Examples
/// ```ignore
/// post_path("como-utilizar-hooks") // -> "/post/como-utilizar-hooks"
/// ```
pub fn post_path(uid: &str) -> String {
    format!("/post/{}", encode_segment(uid))
}

/// Route of the listing after `pages` pages have been loaded
pub fn listing_path(pages: usize) -> String {
    if pages <= 1 {
        "/".to_string()
    } else {
        format!("/?pages={}", pages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_path() {
        assert_eq!(post_path("como-utilizar-hooks"), "/post/como-utilizar-hooks");
        assert_eq!(post_path("a/b c"), "/post/a%2Fb%20c");
        assert_eq!(post_path("ação"), "/post/a%C3%A7%C3%A3o");
    }

    #[test]
    fn test_listing_path() {
        assert_eq!(listing_path(0), "/");
        assert_eq!(listing_path(1), "/");
        assert_eq!(listing_path(3), "/?pages=3");
    }
}
