//! Name normalization: path segments, plurals and Rust identifiers.
//!
//! Schema names arrive in whatever case the backend uses (`Customer`,
//! `order-item`, `firstName`). Paths keep them close to verbatim; Rust code
//! needs `PascalCase` types and `snake_case` members.

use proc_macro2::{Ident, Span};

/// Words that cannot be used as identifiers even in raw form.
const NON_RAW_KEYWORDS: &[&str] = &["self", "Self", "super", "crate", "_"];

const KEYWORDS: &[&str] = &[
    "as", "async", "await", "break", "const", "continue", "dyn", "else", "enum", "extern", "false",
    "fn", "for", "gen", "if", "impl", "in", "let", "loop", "match", "mod", "move", "mut", "pub",
    "ref", "return", "static", "struct", "trait", "true", "type", "unsafe", "use", "where",
    "while", "abstract", "become", "box", "do", "final", "macro", "override", "priv", "try",
    "typeof", "unsized", "virtual", "yield",
];

/// Splits a name into words at case changes and separators.
///
/// - `"OrderItem"` → `["Order", "Item"]`
/// - `"HTTPClient"` → `["HTTP", "Client"]`
/// - `"first_name"` / `"first-name"` → `["first", "name"]`
/// - `"address2"` → `["address2"]`
pub fn split_words(s: &str) -> Vec<&str> {
    let mut words = Vec::new();

    for part in s.split(|c: char| !c.is_ascii_alphanumeric()) {
        let chars: Vec<(usize, char)> = part.char_indices().collect();
        let mut word_start = 0;

        for i in 1..chars.len() {
            let (pos, current) = chars[i];
            let prev = chars[i - 1].1;
            let next_is_lower = chars.get(i + 1).is_some_and(|(_, c)| c.is_ascii_lowercase());

            let is_new_word = current.is_ascii_uppercase()
                && (prev.is_ascii_lowercase()
                    || prev.is_ascii_digit()
                    || (prev.is_ascii_uppercase() && next_is_lower));

            if is_new_word {
                words.push(&part[word_start..pos]);
                word_start = pos;
            }
        }

        if word_start < part.len() {
            words.push(&part[word_start..]);
        }
    }

    words
}

/// `order-item` → `OrderItem`.
pub fn to_pascal_case(s: &str) -> String {
    split_words(s)
        .into_iter()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_ascii_uppercase().to_string() + &chars.as_str().to_ascii_lowercase()
                }
                None => String::new(),
            }
        })
        .collect()
}

/// `OrderItem` → `order_item`.
pub fn to_snake_case(s: &str) -> String {
    split_words(s)
        .into_iter()
        .map(str::to_ascii_lowercase)
        .collect::<Vec<_>>()
        .join("_")
}

/// Pluralizes the last word of a name with English suffix rules.
///
/// ```
/// use sdkgen_gen::naming::pluralize;
///
/// assert_eq!(pluralize("Customer"), "Customers");
/// assert_eq!(pluralize("Category"), "Categories");
/// assert_eq!(pluralize("Box"), "Boxes");
/// assert_eq!(pluralize("Day"), "Days");
/// ```
pub fn pluralize(s: &str) -> String {
    let lower = s.to_ascii_lowercase();
    if let Some(stem) = s.strip_suffix(['y', 'Y']) {
        let before = stem.chars().last().map(|c| c.to_ascii_lowercase());
        if before.is_some_and(|c| c.is_ascii_alphabetic() && !"aeiou".contains(c)) {
            return format!("{stem}ies");
        }
    }
    if ["s", "x", "z", "ch", "sh"].iter().any(|suffix| lower.ends_with(suffix)) {
        return format!("{s}es");
    }
    format!("{s}s")
}

/// Whether `s` can be used as a collection or relation segment.
///
/// Legal segments start with an ASCII letter and contain only ASCII
/// alphanumerics, `_` and `-`.
pub fn is_legal_segment(s: &str) -> bool {
    let mut chars = s.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Whether `s` can be a literal segment of a custom method path.
pub fn is_legal_path_segment(s: &str) -> bool {
    !s.is_empty()
        && s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | '~'))
}

/// Snake-case identifier text for a wire name, escaped for Rust.
///
/// Returns the text and whether it needs the raw (`r#`) prefix.
fn snake_ident_text(name: &str) -> (String, bool) {
    let mut text = to_snake_case(name);
    if text.is_empty() {
        text = "field".to_string();
    }
    if text.starts_with(|c: char| c.is_ascii_digit()) {
        text.insert(0, '_');
    }
    if NON_RAW_KEYWORDS.contains(&text.as_str()) {
        text.push('_');
        return (text, false);
    }
    let raw = KEYWORDS.contains(&text.as_str());
    (text, raw)
}

/// A `snake_case` identifier for a field, argument or method name.
///
/// ```
/// use sdkgen_gen::naming::snake_ident;
///
/// assert_eq!(snake_ident("firstName").to_string(), "first_name");
/// assert_eq!(snake_ident("type").to_string(), "r#type");
/// assert_eq!(snake_ident("self").to_string(), "self_");
/// ```
pub fn snake_ident(name: &str) -> Ident {
    let (text, raw) = snake_ident_text(name);
    if raw {
        Ident::new_raw(&text, Span::call_site())
    } else {
        Ident::new(&text, Span::call_site())
    }
}

/// The unescaped form of [`snake_ident`], used for collision checks and docs.
pub fn snake_name(name: &str) -> String {
    snake_ident_text(name).0
}

/// A `PascalCase` type identifier.
pub fn pascal_ident(name: &str) -> Ident {
    let mut text = to_pascal_case(name);
    if text.is_empty() || text.starts_with(|c: char| c.is_ascii_digit()) {
        text.insert(0, 'T');
    }
    if text == "Self" {
        text.push('_');
    }
    Ident::new(&text, Span::call_site())
}

/// A `SCREAMING_SNAKE_CASE` identifier for a constant.
pub fn const_ident(name: &str) -> Ident {
    let mut text = to_snake_case(name).to_ascii_uppercase();
    if text.is_empty() || text.starts_with(|c: char| c.is_ascii_digit()) {
        text.insert(0, 'R');
    }
    Ident::new(&text, Span::call_site())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_words_on_case_and_separators() {
        assert_eq!(split_words("OrderItem"), vec!["Order", "Item"]);
        assert_eq!(split_words("HTTPClient"), vec!["HTTP", "Client"]);
        assert_eq!(split_words("first_name"), vec!["first", "name"]);
        assert_eq!(split_words("order-item"), vec!["order", "item"]);
        assert_eq!(split_words("address2"), vec!["address2"]);
        assert_eq!(split_words("userID"), vec!["user", "ID"]);
        assert_eq!(split_words("$ref"), vec!["ref"]);
        assert!(split_words("--").is_empty());
    }

    #[test]
    fn case_conversions() {
        assert_eq!(to_pascal_case("order-item"), "OrderItem");
        assert_eq!(to_pascal_case("Customer"), "Customer");
        assert_eq!(to_snake_case("OrderItem"), "order_item");
        assert_eq!(to_snake_case("customerId"), "customer_id");
    }

    #[test]
    fn plural_rules() {
        assert_eq!(pluralize("Order"), "Orders");
        assert_eq!(pluralize("Category"), "Categories");
        assert_eq!(pluralize("Key"), "Keys");
        assert_eq!(pluralize("Address"), "Addresses");
        assert_eq!(pluralize("Match"), "Matches");
        assert_eq!(pluralize("Wish"), "Wishes");
        assert_eq!(pluralize("Quiz"), "Quizes");
    }

    #[test]
    fn legal_segments() {
        assert!(is_legal_segment("Customers"));
        assert!(is_legal_segment("order-items_2"));
        assert!(!is_legal_segment("2fast"));
        assert!(!is_legal_segment("Café"));
        assert!(!is_legal_segment("a b"));
        assert!(!is_legal_segment(""));
        assert!(is_legal_path_segment("by-email.v2"));
        assert!(!is_legal_path_segment("a?b"));
    }

    #[test]
    fn identifiers_are_escaped() {
        assert_eq!(snake_ident("2ndAddress").to_string(), "_2nd_address");
        assert_eq!(snake_ident("$$").to_string(), "field");
        assert_eq!(snake_ident("Self").to_string(), "self_");
        assert_eq!(snake_ident("async").to_string(), "r#async");
        assert_eq!(pascal_ident("order-item").to_string(), "OrderItem");
        assert_eq!(const_ident("ordersGet").to_string(), "ORDERS_GET");
    }
}
