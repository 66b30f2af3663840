//! Mapping of render target names to `require` paths.
//!
//! Target names are slash-delimited logical paths. They are cleaned lexically
//! (no filesystem access) and a name whose last segment is empty resolves to
//! the directory's `index` module:
//!
//! | Target            | Module path       |
//! |-------------------|-------------------|
//! | `simple`          | `simple`          |
//! | `blog//post/./x`  | `blog/post/x`     |
//! | `blog/`           | `blog/index`      |
//! | `blog/../about`   | `about`           |
//! | `""`, `.`, `./`   | `index`           |
//! | `/`               | `/index`          |

/// Name of the module used when a target ends in a separator.
pub const INDEX_MODULE: &str = "index";

/// Resolves a target name to the module path handed to `require`.
///
/// ```rust
/// use luaweave::resolve;
///
/// assert_eq!(resolve("optional/"), "optional/index");
/// assert_eq!(resolve("optional/"), resolve("optional/index"));
/// assert_eq!(resolve("a//b/../c"), "a/c");
/// ```
pub fn resolve(name: &str) -> String {
    let cleaned = clean_path(name);
    let empty_leaf = name.is_empty() || name.ends_with('/') || cleaned == "." || cleaned == "/";
    if !empty_leaf {
        return cleaned;
    }

    match cleaned.as_str() {
        "." => INDEX_MODULE.to_string(),
        "/" => format!("/{INDEX_MODULE}"),
        dir => format!("{dir}/{INDEX_MODULE}"),
    }
}

/// Lexically cleans a slash-delimited path.
///
/// Repeated separators collapse, `.` segments vanish, `dir/..` pairs cancel,
/// `..` above the root of an absolute path is dropped and leading `..` of a
/// relative path is kept. The empty path cleans to `.`; a trailing separator
/// is removed unless the path is the root.
pub fn clean_path(path: &str) -> String {
    if path.is_empty() {
        return ".".to_string();
    }

    let rooted = path.starts_with('/');
    let mut segments: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => match segments.last() {
                Some(&last) if last != ".." => {
                    segments.pop();
                }
                _ if rooted => {}
                _ => segments.push(".."),
            },
            other => segments.push(other),
        }
    }

    let joined = segments.join("/");
    match (rooted, joined.is_empty()) {
        (true, _) => format!("/{joined}"),
        (false, true) => ".".to_string(),
        (false, false) => joined,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_plain_names_pass_through() {
        assert_eq!(resolve("simple"), "simple");
        assert_eq!(resolve("blog/post"), "blog/post");
    }

    #[test]
    fn test_trailing_separator_resolves_index() {
        assert_eq!(resolve("optional/"), "optional/index");
        assert_eq!(resolve("a/b//"), "a/b/index");
        assert_eq!(resolve("optional/"), resolve("optional/index"));
    }

    #[test]
    fn test_empty_and_root() {
        assert_eq!(resolve(""), "index");
        assert_eq!(resolve("."), "index");
        assert_eq!(resolve("./"), "index");
        assert_eq!(resolve("/"), "/index");
        assert_eq!(resolve("a/.."), "index");
    }

    #[test]
    fn test_dot_segments_are_cleaned() {
        assert_eq!(resolve("a/./b"), "a/b");
        assert_eq!(resolve("a/b/../c"), "a/c");
        assert_eq!(resolve("../shared"), "../shared");
        assert_eq!(resolve("/../x"), "/x");
    }

    #[test]
    fn test_clean_path_cases() {
        let cases = [
            ("", "."),
            ("abc", "abc"),
            ("abc/", "abc"),
            ("a//b", "a/b"),
            ("/a/b/", "/a/b"),
            ("a/../..", ".."),
            ("../../a", "../../a"),
            ("/..", "/"),
            ("a/b/../../..", ".."),
            ("./a/./b/.", "a/b"),
        ];
        for (input, expected) in cases {
            assert_eq!(clean_path(input), expected, "clean_path({input:?})");
        }
    }

    proptest! {
        #[test]
        fn separator_terminated_names_match_explicit_index(
            segments in prop::collection::vec("[a-z]{1,4}|\\.|\\.\\.", 0..5),
            rooted in any::<bool>(),
        ) {
            let mut name = segments.join("/");
            if rooted {
                name.insert(0, '/');
            }
            if !name.ends_with('/') {
                name.push('/');
            }
            prop_assert_eq!(resolve(&name), resolve(&format!("{name}index")));
        }

        #[test]
        fn cleaning_is_idempotent(path in "[a-z./]{0,16}") {
            let once = clean_path(&path);
            prop_assert_eq!(clean_path(&once), once.clone());
        }
    }
}
