//! Shared naming and path helpers for templates and the model builder.

/// Convert an identifier to PascalCase (e.g., "hello_world" -> "HelloWorld").
///
/// An underscore is dropped only when it is followed by a lowercase letter,
/// so `foo_1` keeps its separator and leading underscores survive.
pub fn to_pascal_case(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut out = String::with_capacity(s.len());
    let mut upper_next = false;
    let mut started = false;

    for (i, &c) in chars.iter().enumerate() {
        let mut c = c;
        if !started && c.is_ascii_uppercase() {
            started = true;
        }
        if c.is_ascii_lowercase() && (upper_next || !started) {
            c = c.to_ascii_uppercase();
            upper_next = false;
            started = true;
        }
        if started && c == '_' && chars.get(i + 1).is_some_and(|n| n.is_ascii_lowercase()) {
            upper_next = true;
            continue;
        }
        out.push(c);
    }
    out
}

/// Convert an identifier to lowerCamelCase (e.g., "user_name" -> "userName").
pub fn to_lower_camel_case(s: &str) -> String {
    let pascal = to_pascal_case(s);
    let mut chars = pascal.chars();
    match chars.next() {
        None => String::new(),
        Some(c) => c.to_lowercase().chain(chars).collect(),
    }
}

/// Convert an identifier to snake_case (e.g., "HelloWorld" -> "hello_world").
///
/// Runs of capitals stay together: "HTTPCode" -> "httpcode".
pub fn to_snake_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len() * 2);
    let mut after_word = false;
    for c in s.chars() {
        if c.is_ascii_uppercase() {
            if after_word {
                out.push('_');
                after_word = false;
            }
        } else if c != '_' {
            after_word = true;
        }
        out.push(c);
    }
    out.to_lowercase()
}

/// Last path segment of `path` with `ext` removed (`"a/widget.proto"` -> `"widget"`).
pub fn base_name<'a>(path: &'a str, ext: &str) -> &'a str {
    let base = path.rsplit(['/', '\\']).next().unwrap_or(path);
    if ext.is_empty() {
        base
    } else {
        base.strip_suffix(ext).unwrap_or(base)
    }
}

/// Last dot-separated segment of a qualified name (`".pkg.Outer.Inner"` -> `"Inner"`).
pub fn split_package_name(name: &str) -> &str {
    name.rsplit('.').next().unwrap_or(name)
}

/// Join a sub-directory below `root`, tolerating stray separators.
pub fn sub_dir(root: &str, sub: &str) -> String {
    let root = root.trim_end_matches(['/', '\\']);
    let sub = sub.trim_matches(['/', '\\']);
    match (root.is_empty(), sub.is_empty()) {
        (true, _) => sub.to_string(),
        (_, true) => root.to_string(),
        _ => format!("{root}/{sub}"),
    }
}

/// Build an import path for `dir` below the `base` package.
pub fn sub_package(base: &str, dir: &str) -> String {
    sub_dir(base, &dir.replace('\\', "/"))
}
