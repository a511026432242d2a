//! Name derivations shared by the readers

/// Convert a Pascal case name to upper snake case (`ProductLine` → `PRODUCT_LINE`)
pub fn to_upper_snake(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);

    for (i, c) in chars.iter().enumerate() {
        if !c.is_alphanumeric() {
            if !out.ends_with('_') && !out.is_empty() {
                out.push('_');
            }
            continue;
        }

        if c.is_uppercase() && i > 0 && !out.ends_with('_') {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).map_or(false, |n| n.is_lowercase());
            if prev.is_lowercase() || prev.is_ascii_digit() || (prev.is_uppercase() && next_is_lower) {
                out.push('_');
            }
        }

        out.extend(c.to_uppercase());
    }

    out.trim_end_matches('_').to_string()
}

/// Code a modeling tool generates from a display name
///
/// Upper case, every run of non-alphanumeric characters collapsed to `_`.
pub fn generated_code(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.trim().chars() {
        if c.is_alphanumeric() {
            out.extend(c.to_uppercase());
        } else if !out.ends_with('_') {
            out.push('_');
        }
    }
    out.trim_matches('_').to_string()
}

/// Column name of a primitive property: `TRI_UPPER_SNAKE`, or bare upper snake without trigram
pub fn column_name(trigram: Option<&str>, property: &str) -> String {
    match trigram {
        Some(t) if !t.is_empty() => format!("{}_{}", t, to_upper_snake(property)),
        _ => to_upper_snake(property),
    }
}
