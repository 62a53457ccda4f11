//! Action dispatch for editor sessions.
//!
//! [`execute_action`] is the single entry point toolbars, dialogs and
//! pointer handlers go through. User-visible failures have already been
//! routed to the platform by the session by the time it returns.

use crate::actions::{EditorAction, Key, KeyCombo, KeydownResult};
use crate::ops::CellDirection;
use crate::platform::EditorPlatform;
use crate::session::EditorSession;

/// Execute an editor action on a session.
///
/// Returns true if the action changed the surface content.
pub fn execute_action<P: EditorPlatform>(
    session: &mut EditorSession<P>,
    action: &EditorAction,
) -> bool {
    tracing::trace!(target: "consent_editor::execute", ?action, "executing");
    match action {
        EditorAction::Format { name, value } => {
            session.format(name, value.as_deref()).unwrap_or(false)
        }
        EditorAction::ApplySize(class) => session.apply_size(*class),
        EditorAction::RemoveLink => session.remove_link(),
        EditorAction::DeleteTable => session.delete_table().is_ok(),
        EditorAction::OpenDialog(kind) => {
            let _ = session.open_dialog(*kind);
            false
        }
        EditorAction::ConfirmLink { url } => session.confirm_link(url).is_ok(),
        EditorAction::ConfirmImage { url } => session.confirm_image(url).is_ok(),
        EditorAction::ConfirmTable(input) => session.confirm_table(input).is_ok(),
        EditorAction::CancelDialog => {
            session.cancel_dialog();
            false
        }
        EditorAction::NavigateCell(direction) => {
            let before = session.artifacts().fragment.len();
            session.navigate_cell(*direction) && session.artifacts().fragment.len() != before
        }
        EditorAction::InsertLineBreak => session.insert_line_break(),
        EditorAction::Refresh => {
            session.sync_now();
            false
        }
        EditorAction::Click { target } => {
            session.click(*target);
            false
        }
        EditorAction::ViewportChanged => {
            session.viewport_changed();
            false
        }
        EditorAction::ResizePointerDown { handle, x, y } => {
            session.resize_pointer_down(*handle, *x, *y);
            false
        }
        EditorAction::ResizePointerMove { x, y } => {
            session.resize_pointer_move(*x, *y);
            false
        }
        EditorAction::ResizePointerUp => session.resize_pointer_up().is_some(),
    }
}

/// Handle a keydown on the surface.
///
/// Only table cells bind keys: Tab and Shift+Tab move between cells and
/// Enter (without Shift) adds a soft line break instead of splitting the
/// cell. Everything else is left to the platform.
pub fn handle_keydown<P: EditorPlatform>(
    session: &mut EditorSession<P>,
    combo: &KeyCombo,
) -> KeydownResult {
    if combo.key.is_navigation() || combo.key.is_modifier() {
        return KeydownResult::PassThrough;
    }
    if session.current_cell().is_none() {
        return KeydownResult::NotHandled;
    }

    let action = match combo.key {
        Key::Tab if combo.modifiers.shift => EditorAction::NavigateCell(CellDirection::Backward),
        Key::Tab => EditorAction::NavigateCell(CellDirection::Forward),
        Key::Enter if !combo.modifiers.shift => EditorAction::InsertLineBreak,
        _ => return KeydownResult::NotHandled,
    };
    execute_action(session, &action);
    KeydownResult::Handled
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::{DialogKind, TableInput};
    use crate::config::EditorConfig;
    use crate::platform::{HeadlessPlatform, Notice};
    use crate::types::{BoundaryPoint, DomRange, SizeClass};

    fn session(markup: &str) -> EditorSession {
        EditorSession::with_content(EditorConfig::default(), HeadlessPlatform::new(), markup)
    }

    fn table_input(rows: &str, cols: &str) -> TableInput {
        TableInput {
            rows: rows.into(),
            cols: cols.into(),
            header: false,
            border_color: "#000000".into(),
            border_size: "1".into(),
        }
    }

    #[test]
    fn test_size_class_twice_leaves_one() {
        let mut s = session("<p>hello</p>");
        let p = s.dom().first_child(s.surface()).unwrap();
        let text = s.dom().first_child(p).unwrap();
        s.select(DomRange::new(BoundaryPoint::new(text, 0), BoundaryPoint::new(text, 5)));

        assert!(execute_action(&mut s, &EditorAction::ApplySize(SizeClass::Smallest)));
        assert!(execute_action(&mut s, &EditorAction::ApplySize(SizeClass::Larger)));
        assert_eq!(
            s.artifacts().fragment,
            r#"<p><span class="size-larger">hello</span></p>"#
        );
    }

    #[test]
    fn test_format_action_reports_change() {
        let mut s = session("<p>make bold</p>");
        let p = s.dom().first_child(s.surface()).unwrap();
        let text = s.dom().first_child(p).unwrap();
        s.select(DomRange::new(BoundaryPoint::new(text, 5), BoundaryPoint::new(text, 9)));

        let bold = EditorAction::Format {
            name: "bold".into(),
            value: None,
        };
        assert!(execute_action(&mut s, &bold));
        assert_eq!(s.artifacts().fragment, "<p>make <b>bold</b></p>");

        let unknown = EditorAction::Format {
            name: "insertHorizontalRule".into(),
            value: None,
        };
        assert!(!execute_action(&mut s, &unknown));
    }

    #[test]
    fn test_table_keys() {
        let mut s = session("");
        s.place_caret_at_end();
        execute_action(&mut s, &EditorAction::OpenDialog(DialogKind::Table));
        assert!(execute_action(&mut s, &EditorAction::ConfirmTable(table_input("1", "2"))));

        let shift_tab = KeyCombo::shift(Key::Tab);
        assert_eq!(handle_keydown(&mut s, &shift_tab), KeydownResult::Handled);

        let tab = KeyCombo::new(Key::Tab);
        assert_eq!(handle_keydown(&mut s, &tab), KeydownResult::Handled);
        assert_eq!(handle_keydown(&mut s, &tab), KeydownResult::Handled);
        assert_eq!(s.artifacts().fragment.matches("<tr>").count(), 2);

        assert_eq!(
            handle_keydown(&mut s, &KeyCombo::new(Key::Enter)),
            KeydownResult::Handled
        );
        assert_eq!(
            handle_keydown(&mut s, &KeyCombo::shift(Key::Enter)),
            KeydownResult::NotHandled
        );
        assert_eq!(
            handle_keydown(&mut s, &KeyCombo::new(Key::ArrowDown)),
            KeydownResult::PassThrough
        );
    }

    #[test]
    fn test_keys_outside_tables_are_not_handled() {
        let mut s = session("<p>x</p>");
        s.place_caret_at_end();
        assert_eq!(
            handle_keydown(&mut s, &KeyCombo::new(Key::Tab)),
            KeydownResult::NotHandled
        );
    }

    #[test]
    fn test_bad_table_input_is_silent() {
        let mut s = session("<p>x</p>");
        execute_action(&mut s, &EditorAction::OpenDialog(DialogKind::Table));
        assert!(!execute_action(&mut s, &EditorAction::ConfirmTable(table_input("abc", "2"))));
        assert!(s.platform().notices.is_empty());
        assert_eq!(s.content(), "<p>x</p>");
    }

    #[test]
    fn test_delete_table_action() {
        let mut s = session("<p>x</p>");
        s.place_caret_at_end();
        assert!(!execute_action(&mut s, &EditorAction::DeleteTable));
        assert_eq!(s.platform().last_notice(), Some(&Notice::NoTableSelected));
    }
}
