//! Helpers available to every template, both as functions
//! (`{{ ToSnakeCase(Name) }}`) and as filters (`{{ Name | ToSnakeCase }}`).

use kiln_core::{to_lower_camel_case, to_pascal_case, to_snake_case};
use minijinja::Environment;

pub fn register(env: &mut Environment<'static>) {
    macro_rules! both {
        ($name:literal, $f:expr) => {
            env.add_function($name, $f);
            env.add_filter($name, $f);
        };
    }

    both!("ToLowerCamelCase", |s: String| to_lower_camel_case(&s));
    both!("ToSnakeCase", |s: String| to_snake_case(&s));
    both!("ToCamelCase", |s: String| to_pascal_case(&s));
    both!("TrimSuffix", trim_suffix);
    both!("Split", split);
    both!("Trim", trim);
    both!("EqualFold", equal_fold);
    both!("ToUpper", |s: String| s.to_uppercase());
    both!("ToLower", |s: String| s.to_lowercase());
    both!("HasPrefix", |s: String, prefix: String| s.starts_with(&prefix));
    both!("HasSuffix", |s: String, suffix: String| s.ends_with(&suffix));
    both!("Join", |parts: Vec<String>, sep: String| parts.join(&sep));
    both!("Replace", replace);
}

fn trim_suffix(s: String, suffix: String) -> String {
    match s.strip_suffix(&suffix) {
        Some(trimmed) => trimmed.to_string(),
        None => s,
    }
}

fn split(s: String, sep: String) -> Vec<String> {
    s.split(&sep).map(str::to_string).collect()
}

/// Strip any of the characters in `cutset` from both ends.
fn trim(s: String, cutset: String) -> String {
    s.trim_matches(|c| cutset.contains(c)).to_string()
}

/// Case-insensitive equality.
fn equal_fold(a: String, b: String) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

/// Replace the first `n` occurrences, or all of them when `n` is absent or
/// negative.
fn replace(s: String, from: String, to: String, n: Option<i64>) -> String {
    match n.and_then(|n| usize::try_from(n).ok()) {
        Some(n) => s.replacen(&from, &to, n),
        None => s.replace(&from, &to),
    }
}

#[cfg(test)]
mod tests {
    use minijinja::context;

    use super::*;

    fn render(source: &str) -> String {
        let mut env = Environment::new();
        register(&mut env);
        env.render_str(source, context! { name => "user_service" })
            .unwrap()
    }

    #[test]
    fn test_case_helpers() {
        assert_eq!(render("{{ ToCamelCase(name) }}"), "UserService");
        assert_eq!(render("{{ name | ToLowerCamelCase }}"), "userService");
        assert_eq!(render("{{ ToSnakeCase('UserService') }}"), "user_service");
        assert_eq!(render("{{ ToUpper(name) }}"), "USER_SERVICE");
    }

    #[test]
    fn test_string_helpers() {
        assert_eq!(render("{{ TrimSuffix(name, '_service') }}"), "user");
        assert_eq!(render("{{ Join(Split(name, '_'), '-') }}"), "user-service");
        assert_eq!(render("{{ Trim('--a--', '-') }}"), "a");
        assert_eq!(render("{{ Replace('a.b.c', '.', '/') }}"), "a/b/c");
        assert_eq!(render("{{ Replace('a.b.c', '.', '/', 1) }}"), "a/b.c");
    }

    #[test]
    fn test_predicates() {
        assert_eq!(render("{{ HasPrefix(name, 'user') }}"), "true");
        assert_eq!(render("{{ HasSuffix(name, 'user') }}"), "false");
        assert_eq!(render("{{ EqualFold('Pay', 'PAY') }}"), "true");
    }
}
