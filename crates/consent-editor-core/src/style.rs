//! Inline `style` attribute handling.
//!
//! Declarations are kept in source order and written back as
//! `prop: value;` pairs separated by a space, matching how browsers
//! serialize `element.style` edits.

/// Split a style attribute into `(property, value)` pairs.
pub fn parse_declarations(style: &str) -> Vec<(String, String)> {
    style
        .split(';')
        .filter_map(|decl| {
            let (prop, value) = decl.split_once(':')?;
            let prop = prop.trim();
            let value = value.trim();
            if prop.is_empty() || value.is_empty() {
                return None;
            }
            Some((prop.to_ascii_lowercase(), value.to_string()))
        })
        .collect()
}

pub fn serialize_declarations(decls: &[(String, String)]) -> String {
    decls
        .iter()
        .map(|(p, v)| format!("{p}: {v};"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Set (or replace in place) one property and return the new attribute value.
pub fn set_property(style: &str, property: &str, value: &str) -> String {
    let property = property.to_ascii_lowercase();
    let mut decls = parse_declarations(style);
    match decls.iter_mut().find(|(p, _)| *p == property) {
        Some(decl) => decl.1 = value.to_string(),
        None => decls.push((property, value.to_string())),
    }
    serialize_declarations(&decls)
}

/// Format a pixel length without a trailing `.0` for whole numbers.
pub fn format_px(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}px", value as i64)
    } else {
        format!("{value}px")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_property_replaces_in_place() {
        let style = "max-width: 100%; height: auto;";
        let style = set_property(style, "display", "inline-block");
        let style = set_property(&style, "width", "140px");
        let style = set_property(&style, "Height", "auto");
        assert_eq!(
            style,
            "max-width: 100%; height: auto; display: inline-block; width: 140px;"
        );
    }

    #[test]
    fn test_parse_tolerates_junk() {
        let decls = parse_declarations(" color:red;;bogus; : x ;border : 1px solid #000 ");
        assert_eq!(
            decls,
            vec![
                ("color".to_string(), "red".to_string()),
                ("border".to_string(), "1px solid #000".to_string()),
            ]
        );
    }

    #[test]
    fn test_format_px() {
        assert_eq!(format_px(140.0), "140px");
        assert_eq!(format_px(40.5), "40.5px");
    }
}
