use indexmap::IndexMap;

/// Human label for a machine attribute key.
///
/// An override entry wins verbatim before any transformation. Otherwise every
/// `_` and `-` becomes a space and each word gets its first letter uppercased;
/// the remaining letters are left untouched.
pub fn format_machine_name(key: &str, overrides: &IndexMap<String, String>) -> String {
    if let Some(label) = overrides.get(key) {
        return label.clone();
    }
    key.replace(['_', '-'], " ")
        .split(' ')
        .map(capitalize_first)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize_first(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
