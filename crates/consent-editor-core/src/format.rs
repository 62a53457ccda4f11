//! Toolbar formatting commands.
//!
//! Commands arrive by name, as a toolbar would issue them. Browser hosts
//! hand them to the native editing engine; everywhere else the built-in
//! formatter below covers the inline and alignment commands.

use smol_str::SmolStr;

use crate::dom::{Dom, NodeId};
use crate::ops::wrap_selection;
use crate::range::{common_ancestor, is_within, unwrap_preserving};
use crate::types::DomRange;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    Left,
    Center,
    Right,
    Full,
}

impl Alignment {
    pub fn css_value(self) -> &'static str {
        match self {
            Alignment::Left => "left",
            Alignment::Center => "center",
            Alignment::Right => "right",
            Alignment::Full => "justify",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatCommand {
    Bold,
    Italic,
    Underline,
    StrikeThrough,
    Superscript,
    Subscript,
    ForeColor(String),
    Justify(Alignment),
    InsertOrderedList,
    InsertUnorderedList,
    Indent,
    Outdent,
    RemoveFormat,
    /// Anything else, passed through by name.
    Other { name: SmolStr, value: Option<String> },
}

impl FormatCommand {
    /// Parse a toolbar command name (case-insensitive) and its argument.
    pub fn parse(name: &str, value: Option<&str>) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "bold" => FormatCommand::Bold,
            "italic" => FormatCommand::Italic,
            "underline" => FormatCommand::Underline,
            "strikethrough" => FormatCommand::StrikeThrough,
            "superscript" => FormatCommand::Superscript,
            "subscript" => FormatCommand::Subscript,
            "forecolor" => match value {
                Some(color) if !color.trim().is_empty() => {
                    FormatCommand::ForeColor(color.trim().to_string())
                }
                _ => FormatCommand::Other {
                    name: SmolStr::new(name),
                    value: None,
                },
            },
            "justifyleft" => FormatCommand::Justify(Alignment::Left),
            "justifycenter" => FormatCommand::Justify(Alignment::Center),
            "justifyright" => FormatCommand::Justify(Alignment::Right),
            "justifyfull" => FormatCommand::Justify(Alignment::Full),
            "insertorderedlist" => FormatCommand::InsertOrderedList,
            "insertunorderedlist" => FormatCommand::InsertUnorderedList,
            "indent" => FormatCommand::Indent,
            "outdent" => FormatCommand::Outdent,
            "removeformat" => FormatCommand::RemoveFormat,
            _ => FormatCommand::Other {
                name: SmolStr::new(name),
                value: value.map(str::to_string),
            },
        }
    }

    /// The command name a browser editing engine understands.
    pub fn name(&self) -> &str {
        match self {
            FormatCommand::Bold => "bold",
            FormatCommand::Italic => "italic",
            FormatCommand::Underline => "underline",
            FormatCommand::StrikeThrough => "strikeThrough",
            FormatCommand::Superscript => "superscript",
            FormatCommand::Subscript => "subscript",
            FormatCommand::ForeColor(_) => "foreColor",
            FormatCommand::Justify(Alignment::Left) => "justifyLeft",
            FormatCommand::Justify(Alignment::Center) => "justifyCenter",
            FormatCommand::Justify(Alignment::Right) => "justifyRight",
            FormatCommand::Justify(Alignment::Full) => "justifyFull",
            FormatCommand::InsertOrderedList => "insertOrderedList",
            FormatCommand::InsertUnorderedList => "insertUnorderedList",
            FormatCommand::Indent => "indent",
            FormatCommand::Outdent => "outdent",
            FormatCommand::RemoveFormat => "removeFormat",
            FormatCommand::Other { name, .. } => name.as_str(),
        }
    }

    /// Inline wrapper element for wrap/unwrap style commands.
    fn inline_tag(&self) -> Option<&'static str> {
        match self {
            FormatCommand::Bold => Some("b"),
            FormatCommand::Italic => Some("i"),
            FormatCommand::Underline => Some("u"),
            FormatCommand::StrikeThrough => Some("strike"),
            FormatCommand::Superscript => Some("sup"),
            FormatCommand::Subscript => Some("sub"),
            FormatCommand::ForeColor(_) => Some("font"),
            _ => None,
        }
    }
}

/// What running a format command did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatOutcome {
    /// The tree changed; carries the selection to keep.
    Applied(Option<DomRange>),
    /// Understood, but there was nothing to do.
    Unchanged,
    /// The formatter does not implement this command.
    NotHandled,
}

impl FormatOutcome {
    pub fn changed(&self) -> bool {
        matches!(self, FormatOutcome::Applied(_))
    }
}

const BLOCKS: &[&str] = &[
    "p",
    "div",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "li",
    "blockquote",
    "pre",
    "td",
    "th",
];

/// Tree-level fallback implementation of the common commands.
pub fn apply_builtin(
    dom: &mut Dom,
    surface: NodeId,
    selection: Option<DomRange>,
    command: &FormatCommand,
) -> FormatOutcome {
    let Some(mut range) = selection.filter(|r| is_within(dom, r, surface)) else {
        return match command.inline_tag() {
            Some(_) => FormatOutcome::Unchanged,
            None if matches!(command, FormatCommand::Justify(_)) => FormatOutcome::Unchanged,
            None => FormatOutcome::NotHandled,
        };
    };

    if let Some(tag) = command.inline_tag() {
        if range.is_collapsed() {
            return FormatOutcome::Unchanged;
        }
        let common = common_ancestor(dom, &range);
        let existing = dom
            .closest(common, &[tag])
            .filter(|&el| el != surface && dom.contains(surface, el));

        if let (FormatCommand::ForeColor(color), Some(font)) = (command, existing) {
            dom.set_attr(font, "color", color);
            return FormatOutcome::Applied(Some(range));
        }
        if let Some(el) = existing {
            unwrap_preserving(dom, el, &mut range);
            return FormatOutcome::Applied(Some(range));
        }

        let wrapper = dom.create_element(tag);
        if let FormatCommand::ForeColor(color) = command {
            dom.set_attr(wrapper, "color", color);
        }
        let inner = wrap_selection(dom, &mut range, wrapper, |dom, n| dom.is_element_named(n, &[tag]));
        return FormatOutcome::Applied(Some(inner));
    }

    if let FormatCommand::Justify(alignment) = command {
        let block = dom
            .closest(range.start.node, BLOCKS)
            .filter(|&b| b != surface && dom.contains(surface, b));
        let block = match block {
            Some(block) => block,
            None => {
                let div = dom.create_element("div");
                wrap_selection(dom, &mut range, div, |_, _| false);
                div
            }
        };
        dom.set_style_property(block, "text-align", alignment.css_value());
        return FormatOutcome::Applied(Some(range));
    }

    tracing::debug!(target: "consent_editor::format", command = command.name(), "no built-in formatter");
    FormatOutcome::NotHandled
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::range::select_node_contents;
    use crate::types::BoundaryPoint;

    fn surface(markup: &str) -> (Dom, NodeId) {
        let mut dom = Dom::new();
        let root = dom.create_element("div");
        let doc = dom.document();
        dom.append_child(doc, root);
        dom.set_inner_html(root, markup);
        (dom, root)
    }

    #[test]
    fn test_parse_names() {
        assert_eq!(FormatCommand::parse("strikeThrough", None), FormatCommand::StrikeThrough);
        assert_eq!(
            FormatCommand::parse("foreColor", Some("#ff2929")),
            FormatCommand::ForeColor("#ff2929".into())
        );
        assert_eq!(
            FormatCommand::parse("justifyCenter", None),
            FormatCommand::Justify(Alignment::Center)
        );
        let other = FormatCommand::parse("createLink", Some("x"));
        assert_eq!(other.name(), "createLink");
    }

    #[test]
    fn test_bold_toggles() {
        let (mut dom, root) = surface("<p>make bold</p>");
        let text = dom.first_child(dom.first_child(root).unwrap()).unwrap();
        let range = DomRange::new(BoundaryPoint::new(text, 5), BoundaryPoint::new(text, 9));

        let FormatOutcome::Applied(Some(range)) =
            apply_builtin(&mut dom, root, Some(range), &FormatCommand::Bold)
        else {
            panic!("bold not applied");
        };
        assert_eq!(dom.inner_html(root), "<p>make <b>bold</b></p>");

        apply_builtin(&mut dom, root, Some(range), &FormatCommand::Bold);
        assert_eq!(dom.inner_html(root), "<p>make bold</p>");
    }

    #[test]
    fn test_fore_color_recolors_existing_font() {
        let (mut dom, root) = surface(r##"<p><font color="#000">x</font></p>"##);
        let font = dom.first_child(dom.first_child(root).unwrap()).unwrap();
        let range = select_node_contents(&dom, font);
        let outcome = apply_builtin(
            &mut dom,
            root,
            Some(range),
            &FormatCommand::ForeColor("#ff0000".into()),
        );
        assert!(outcome.changed());
        assert_eq!(dom.inner_html(root), r##"<p><font color="#ff0000">x</font></p>"##);
    }

    #[test]
    fn test_justify_sets_block_alignment() {
        let (mut dom, root) = surface("<p>title</p>");
        let text = dom.first_child(dom.first_child(root).unwrap()).unwrap();
        let caret = DomRange::caret(BoundaryPoint::new(text, 2));
        apply_builtin(
            &mut dom,
            root,
            Some(caret),
            &FormatCommand::Justify(Alignment::Center),
        );
        assert_eq!(dom.inner_html(root), r#"<p style="text-align: center;">title</p>"#);
    }

    #[test]
    fn test_lists_are_not_builtin() {
        let (mut dom, root) = surface("<p>x</p>");
        let range = select_node_contents(&dom, root);
        assert_eq!(
            apply_builtin(&mut dom, root, Some(range), &FormatCommand::InsertOrderedList),
            FormatOutcome::NotHandled
        );
    }
}
