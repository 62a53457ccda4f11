//! One editing session: the surface tree, its selection and overlay state,
//! the open dialog and the sync pipeline, owned together.
//!
//! Every operation that changes surface content re-runs the sync pipeline
//! and repositions the resize overlay before returning. Failures the user
//! should see are sent to the platform as notices; silent cancels are only
//! logged.

use web_time::Instant;

use crate::actions::{DialogKind, TableInput};
use crate::clipboard::{ClipboardPlatform, CopyMethod, copy_fragment};
use crate::config::EditorConfig;
use crate::dom::{Dom, NodeId};
use crate::error::EditorError;
use crate::format::{FormatCommand, FormatOutcome};
use crate::import::{ImportFile, Importer};
use crate::ops::table::{closest_cell, closest_editor_table, insert_line_break, normalize_editability};
use crate::ops::{
    CellDirection, TableSpec, apply_size_class, create_link, delete_table, insert_image,
    insert_table, navigate_cell, normalize_image_url, normalize_link_url, remove_link,
};
use crate::platform::{EditorPlatform, HeadlessPlatform, Notice};
use crate::preview::export_document;
use crate::range::insert_text;
use crate::resize::{Handle, ResizeCommit, ResizeOverlay};
use crate::selection::SelectionTracker;
use crate::sync::{Artifacts, SyncPipeline};
use crate::types::{DomRange, SizeClass, Size};

pub struct EditorSession<P: EditorPlatform = HeadlessPlatform> {
    dom: Dom,
    surface: NodeId,
    selection: SelectionTracker,
    overlay: ResizeOverlay,
    sync: SyncPipeline,
    dialog: Option<DialogKind>,
    config: EditorConfig,
    platform: P,
}

impl<P: EditorPlatform> EditorSession<P> {
    /// Create a session with an empty surface.
    pub fn new(config: EditorConfig, platform: P) -> Self {
        let mut dom = Dom::new();
        let surface = dom.create_element("div");
        dom.set_attr(surface, "id", &config.surface_id);
        dom.set_attr(surface, "contenteditable", "true");
        let doc = dom.document();
        dom.append_child(doc, surface);

        Self {
            selection: SelectionTracker::new(surface),
            overlay: ResizeOverlay::new(config.min_image_width),
            sync: SyncPipeline::new(config.sync_debounce()),
            dom,
            surface,
            dialog: None,
            config,
            platform,
        }
    }

    /// Create a session seeded with `markup`, already synced.
    pub fn with_content(config: EditorConfig, platform: P, markup: &str) -> Self {
        let mut session = Self::new(config, platform);
        session.load_markup(markup);
        session
    }

    pub fn dom(&self) -> &Dom {
        &self.dom
    }

    /// Direct tree access for hosts that edit the surface themselves.
    /// Follow up with [`notify_input`](Self::notify_input).
    pub fn dom_mut(&mut self) -> &mut Dom {
        &mut self.dom
    }

    pub fn surface(&self) -> NodeId {
        self.surface
    }

    pub fn selection(&self) -> &SelectionTracker {
        &self.selection
    }

    pub fn overlay(&self) -> &ResizeOverlay {
        &self.overlay
    }

    pub fn artifacts(&self) -> &Artifacts {
        self.sync.artifacts()
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn platform_mut(&mut self) -> &mut P {
        &mut self.platform
    }

    pub fn dialog(&self) -> Option<DialogKind> {
        self.dialog
    }

    /// Current (unsanitized) surface markup.
    pub fn content(&self) -> String {
        self.dom.inner_html(self.surface)
    }

    /// Whether a debounced sync is waiting to run.
    pub fn sync_pending(&self) -> bool {
        self.sync.is_pending()
    }

    // === Selection and focus ===

    /// Focus the surface and make `range` the live selection.
    pub fn select(&mut self, range: DomRange) {
        self.selection.focus_surface();
        self.selection.set_live(&self.dom, Some(range));
    }

    /// Focus leaves the surface.
    pub fn blur(&mut self) {
        self.selection.blur();
    }

    pub fn place_caret_at_end(&mut self) {
        self.selection.focus_surface();
        self.selection.place_caret_at_end(&self.dom, self.surface);
    }

    // === Content and sync ===

    /// Replace the surface content. The surface element itself is kept.
    pub fn load_markup(&mut self, markup: &str) {
        self.dom.set_inner_html(self.surface, markup);
        self.overlay.hide();
        self.selection.clear_saved();
        self.selection.set_live(&self.dom, None);
        tracing::debug!(target: "consent_editor::session", bytes = markup.len(), "loaded markup");
        self.sync_now();
    }

    /// Import a file through `importer`. On failure the surface is left as
    /// it was and the user is told why.
    pub fn import(&mut self, importer: &Importer, file: &ImportFile) -> Result<(), EditorError> {
        match importer.to_markup(file) {
            Ok(markup) => {
                self.load_markup(&markup);
                Ok(())
            }
            Err(err) => Err(self.report(err.into())),
        }
    }

    /// Sanitize and publish now, superseding any pending debounced run.
    pub fn sync_now(&mut self) -> &Artifacts {
        let markup = self.dom.inner_html(self.surface);
        self.sync.sync_now(&markup)
    }

    /// The host changed the surface (typing, paste, native commands).
    pub fn notify_input(&mut self, now: Instant) {
        self.sync.schedule(now);
        self.reposition_overlay();
    }

    /// Run the debounced sync if it is due. Returns whether it ran.
    pub fn tick(&mut self, now: Instant) -> bool {
        let dom = &self.dom;
        let surface = self.surface;
        self.sync.tick(now, || dom.inner_html(surface))
    }

    /// Type `text` at the caret, replacing any selected content.
    pub fn type_text(&mut self, text: &str, now: Instant) -> bool {
        let Some(mut range) = self.focused_range() else {
            tracing::debug!(target: "consent_editor::session", "typing without a caret in the surface, ignored");
            return false;
        };
        if insert_text(&mut self.dom, &mut range, text).is_none() {
            return false;
        }
        self.selection.set_live(&self.dom, Some(range));
        self.notify_input(now);
        true
    }

    /// The standalone download document for the current fragment.
    pub fn export_document(&self) -> String {
        export_document(&self.config.export_title, &self.artifacts().fragment)
    }

    /// Copy the published fragment to the clipboard.
    pub fn copy_fragment(
        &mut self,
        clipboard: &mut impl ClipboardPlatform,
    ) -> Result<CopyMethod, EditorError> {
        match copy_fragment(clipboard, &self.sync.artifacts().fragment) {
            Ok(method) => {
                self.platform.notify(Notice::Copied);
                Ok(method)
            }
            Err(err) => Err(self.report(err)),
        }
    }

    // === Toolbar ===

    /// Run a named formatting command on the live selection.
    ///
    /// Returns whether the surface changed. The pipeline re-syncs either
    /// way, since a native engine may have touched the tree.
    pub fn format(&mut self, name: &str, value: Option<&str>) -> Result<bool, EditorError> {
        let command = FormatCommand::parse(name, value);
        let selection = self.selection.live_in_surface(&self.dom);
        let outcome = match self
            .platform
            .exec_format(&mut self.dom, self.surface, selection, &command)
        {
            Ok(outcome) => outcome,
            Err(err) => return Err(self.report(err.into())),
        };
        match outcome {
            FormatOutcome::Applied(Some(range)) => self.select(range),
            FormatOutcome::Applied(None) => {}
            FormatOutcome::Unchanged | FormatOutcome::NotHandled => {
                tracing::debug!(
                    target: "consent_editor::session",
                    command = command.name(),
                    ?outcome,
                    "format command left the surface unchanged"
                );
            }
        }
        self.content_changed();
        Ok(outcome.changed())
    }

    pub fn apply_size(&mut self, class: SizeClass) -> bool {
        let Some(range) = self.selection.live_in_surface(&self.dom) else {
            return false;
        };
        match apply_size_class(&mut self.dom, self.surface, range, class) {
            Some(inner) => {
                self.select(inner);
                self.content_changed();
                true
            }
            None => {
                tracing::debug!(target: "consent_editor::session", "size class needs a selection, ignored");
                false
            }
        }
    }

    pub fn remove_link(&mut self) -> bool {
        let Some(range) = self.selection.live_in_surface(&self.dom) else {
            return false;
        };
        let range = remove_link(&mut self.dom, self.surface, range);
        self.select(range);
        self.content_changed();
        true
    }

    /// Remove the table around the selection, or tell the user there is
    /// none.
    pub fn delete_table(&mut self) -> Result<(), EditorError> {
        let removed = self
            .selection
            .live_in_surface(&self.dom)
            .and_then(|range| delete_table(&mut self.dom, self.surface, &range));
        match removed {
            Some(at) => {
                self.select(DomRange::caret(at));
                self.content_changed();
                Ok(())
            }
            None => Err(self.report(EditorError::NoTableSelected)),
        }
    }

    // === Dialogs ===

    /// Open a dialog, saving the selection before focus moves to it.
    ///
    /// The link dialog needs selected text; without it the user is told to
    /// select some and no dialog opens.
    pub fn open_dialog(&mut self, kind: DialogKind) -> Result<(), EditorError> {
        if kind == DialogKind::Link {
            let selected = self
                .selection
                .live_in_surface(&self.dom)
                .is_some_and(|r| !r.is_collapsed());
            if !selected {
                return Err(self.report(EditorError::InvalidSelection));
            }
        }
        self.selection.save(&self.dom);
        self.selection.blur();
        self.dialog = Some(kind);
        tracing::debug!(target: "consent_editor::session", ?kind, "opened dialog");
        Ok(())
    }

    /// Close the dialog without applying it. Focus returns to the surface;
    /// the saved selection is dropped, not restored.
    pub fn cancel_dialog(&mut self) {
        if let Some(kind) = self.dialog.take() {
            tracing::debug!(target: "consent_editor::session", ?kind, "dialog cancelled");
        }
        self.selection.clear_saved();
        self.selection.focus_surface();
    }

    /// Link the pre-dialog selection to `url`.
    pub fn confirm_link(&mut self, url: &str) -> Result<DomRange, EditorError> {
        self.dialog = None;
        let Some(href) = normalize_link_url(url) else {
            self.cancel_dialog();
            return Err(self.report(EditorError::InvalidInput("empty link url".into())));
        };

        let restored = self.selection.restore(&self.dom);
        let range = self
            .selection
            .live_in_surface(&self.dom)
            .filter(|r| restored && !r.is_collapsed());
        let Some(linked) = range.and_then(|r| create_link(&mut self.dom, self.surface, r, &href))
        else {
            return Err(self.report(EditorError::InvalidSelection));
        };

        self.select(linked);
        self.content_changed();
        Ok(linked)
    }

    /// Insert an image at the pre-dialog caret and bind the overlay to it.
    pub fn confirm_image(&mut self, url: &str) -> Result<NodeId, EditorError> {
        self.dialog = None;
        if normalize_image_url(url).is_none() {
            self.cancel_dialog();
            return Err(self.report(EditorError::InvalidInput("empty image url".into())));
        }

        self.selection.restore(&self.dom);
        let at = self.selection.live_in_surface(&self.dom);
        let inserted = insert_image(&mut self.dom, self.surface, at, url)
            .ok_or_else(|| EditorError::InvalidInput("empty image url".into()))?;

        self.select(inserted.selection);
        let rect = self.platform.client_rect(&self.dom, inserted.image);
        self.overlay.bind(inserted.image, rect);
        self.platform.scroll_into_view(&self.dom, inserted.image);
        self.content_changed();
        Ok(inserted.image)
    }

    /// Insert a table built from the dialog fields.
    pub fn confirm_table(&mut self, input: &TableInput) -> Result<NodeId, EditorError> {
        self.dialog = None;
        let spec = match TableSpec::from_input(
            &input.rows,
            &input.cols,
            input.header,
            &input.border_color,
            &input.border_size,
            &self.config.table,
        ) {
            Ok(spec) => spec,
            Err(err) => {
                self.cancel_dialog();
                return Err(self.report(err));
            }
        };
        self.selection.restore(&self.dom);
        self.insert_table(&spec)
    }

    /// Insert a table at the live selection, or at the end of the surface.
    pub fn insert_table(&mut self, spec: &TableSpec) -> Result<NodeId, EditorError> {
        let at = self.selection.live_in_surface(&self.dom);
        let inserted = insert_table(&mut self.dom, self.surface, at, spec)
            .ok_or_else(|| EditorError::InvalidInput("table without cells".into()))?;
        self.select(inserted.selection);
        self.content_changed();
        Ok(inserted.table)
    }

    // === Tables ===

    /// The table cell holding the caret, if any.
    pub fn current_cell(&self) -> Option<NodeId> {
        let range = self.selection.live_in_surface(&self.dom)?;
        closest_cell(&self.dom, self.surface, range.start.node)
    }

    /// Move the caret to the adjacent cell. Forward from the last cell adds
    /// a row.
    pub fn navigate_cell(&mut self, direction: CellDirection) -> bool {
        let Some(cell) = self.current_cell() else {
            return false;
        };
        let table = self.dom.closest(cell, &["table"]);
        let size_before = table.map(|t| self.dom.descendants(t).count());
        let Some(caret) = navigate_cell(&mut self.dom, cell, direction) else {
            return false;
        };
        self.select(caret);
        if table.map(|t| self.dom.descendants(t).count()) != size_before {
            self.content_changed();
        }
        true
    }

    /// Soft line break at the caret.
    pub fn insert_line_break(&mut self) -> bool {
        let Some(range) = self.focused_range() else {
            return false;
        };
        match insert_line_break(&mut self.dom, range) {
            Some(caret) => {
                self.select(caret);
                self.content_changed();
                true
            }
            None => false,
        }
    }

    // === Pointer and viewport ===

    /// A click landed on `target`.
    ///
    /// Images bind the resize overlay; anything else in the surface hides
    /// it. Clicking into an editor table re-asserts its editability split.
    pub fn click(&mut self, target: NodeId) {
        if !self.dom.contains(self.surface, target) {
            return;
        }
        self.selection.focus_surface();

        if let Some(table) = closest_editor_table(&self.dom, target) {
            normalize_editability(&mut self.dom, table);
        }

        match self.dom.closest(target, &["img"]) {
            Some(image) => {
                let rect = self.platform.client_rect(&self.dom, image);
                self.overlay.bind(image, rect);
            }
            None => self.overlay.hide(),
        }
    }

    /// Scroll or resize: the overlay follows its image.
    pub fn viewport_changed(&mut self) {
        self.reposition_overlay();
    }

    pub fn resize_pointer_down(&mut self, handle: Handle, x: f64, y: f64) -> bool {
        let natural = self
            .overlay
            .image()
            .and_then(|image| self.platform.natural_size(&self.dom, image));
        self.overlay.pointer_down(handle, x, y, natural)
    }

    pub fn resize_pointer_move(&mut self, x: f64, y: f64) -> Option<Size> {
        self.overlay.pointer_move(x, y)
    }

    /// Commit the drag onto the image.
    pub fn resize_pointer_up(&mut self) -> Option<ResizeCommit> {
        let commit = self.overlay.pointer_up(&mut self.dom, self.surface)?;
        self.content_changed();
        Some(commit)
    }

    // === Internals ===

    /// Live selection inside a focused surface.
    fn focused_range(&self) -> Option<DomRange> {
        if !self.selection.has_focus() {
            return None;
        }
        self.selection.live_in_surface(&self.dom)
    }

    fn content_changed(&mut self) {
        self.sync_now();
        self.reposition_overlay();
    }

    fn reposition_overlay(&mut self) {
        let dom = &self.dom;
        let platform = &self.platform;
        self.overlay
            .reposition(dom, self.surface, |image| platform.client_rect(dom, image));
    }

    /// Tell the user about `err` if it is user-visible, and hand it back.
    fn report(&mut self, err: EditorError) -> EditorError {
        match err.notice() {
            Some(notice) => {
                tracing::info!(target: "consent_editor::session", error = %err, "operation failed");
                self.platform.notify(notice);
            }
            None if matches!(err, EditorError::Platform(_)) => {
                tracing::warn!(target: "consent_editor::session", error = %err, "platform call failed");
            }
            None => {
                tracing::debug!(target: "consent_editor::session", error = %err, "cancelled");
            }
        }
        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::range::select_node_contents;
    use crate::types::{BoundaryPoint, Rect};

    fn session(markup: &str) -> EditorSession {
        EditorSession::with_content(EditorConfig::default(), HeadlessPlatform::new(), markup)
    }

    fn text_of(session: &EditorSession, needle: &str) -> NodeId {
        let dom = session.dom();
        dom.descendants(session.surface())
            .find(|&n| dom.is_text(n) && dom.character_data(n).is_some_and(|d| d.contains(needle)))
            .unwrap()
    }

    #[test]
    fn test_new_surface_and_initial_sync() {
        let s = session("<p>Hi<script>x()</script></p>");
        assert_eq!(s.dom().attr(s.surface(), "id"), Some("editable"));
        assert_eq!(s.dom().attr(s.surface(), "contenteditable"), Some("true"));
        assert_eq!(s.artifacts().fragment, "<p>Hi</p>");
    }

    #[test]
    fn test_link_dialog_requires_selection() {
        let mut s = session("<p>text</p>");
        let err = s.open_dialog(DialogKind::Link).unwrap_err();
        assert!(matches!(err, EditorError::InvalidSelection));
        assert_eq!(s.platform().last_notice(), Some(&Notice::SelectTextToLink));
        assert_eq!(s.dialog(), None);
    }

    #[test]
    fn test_link_round_trip_through_dialog() {
        let mut s = session("<p>see docs here</p>");
        let text = text_of(&s, "docs");
        s.select(DomRange::new(BoundaryPoint::new(text, 4), BoundaryPoint::new(text, 8)));

        s.open_dialog(DialogKind::Link).unwrap();
        assert!(s.selection().live().is_none());
        s.confirm_link("example.com").unwrap();

        assert_eq!(
            s.artifacts().fragment,
            r#"<p>see <a href="https://example.com" target="_blank" rel="noopener noreferrer">docs</a> here</p>"#
        );
    }

    #[test]
    fn test_empty_url_is_a_silent_cancel() {
        let mut s = session("<p>x</p>");
        s.open_dialog(DialogKind::Image).unwrap();
        let err = s.confirm_image("   ").unwrap_err();
        assert!(err.is_silent());
        assert!(s.platform().notices.is_empty());
        assert!(s.selection().has_focus());
        assert_eq!(s.selection().saved(), None);
        assert_eq!(s.content(), "<p>x</p>");
    }

    #[test]
    fn test_cancel_drops_saved_selection() {
        let mut s = session("<p>x</p>");
        s.place_caret_at_end();
        s.open_dialog(DialogKind::Table).unwrap();
        assert!(s.selection().saved().is_some());
        s.cancel_dialog();
        assert_eq!(s.selection().saved(), None);
        assert!(s.selection().has_focus());
    }

    #[test]
    fn test_image_binds_overlay_and_scrolls() {
        let mut s = session("<p>a</p>");
        s.open_dialog(DialogKind::Image).unwrap();
        let image = s.confirm_image("example.com/a.png").unwrap();
        assert_eq!(s.dom().attr(image, "src"), Some("https://example.com/a.png"));
        assert_eq!(s.overlay().image(), Some(image));
        assert_eq!(s.platform().scrolled, vec![image]);
        assert!(s.artifacts().fragment.ends_with(
            r#"<p><img src="https://example.com/a.png" alt="" style="max-width: 100%; height: auto;"></p>"#
        ));
    }

    #[test]
    fn test_click_binds_and_hides_overlay() {
        let mut s = session(r#"<p>a<img src="https://x/y.png"></p>"#);
        let image = s
            .dom()
            .descendants(s.surface())
            .find(|&n| s.dom().tag_name(n) == Some("img"))
            .unwrap();
        s.platform_mut().set_rect(image, Rect::new(10.0, 20.0, 100.0, 50.0));
        s.click(image);
        assert_eq!(s.overlay().rect(), Some(Rect::new(10.0, 20.0, 100.0, 50.0)));

        let text = text_of(&s, "a");
        s.click(text);
        assert!(!s.overlay().is_visible());
    }

    #[test]
    fn test_resize_commit_resyncs() {
        let mut s = session(r#"<p><img src="https://x/y.png"></p>"#);
        let image = s
            .dom()
            .descendants(s.surface())
            .find(|&n| s.dom().tag_name(n) == Some("img"))
            .unwrap();
        s.platform_mut().set_rect(image, Rect::new(0.0, 0.0, 100.0, 50.0));
        s.click(image);
        assert!(s.resize_pointer_down(Handle::Se, 100.0, 50.0));
        s.resize_pointer_move(140.0, 60.0);
        let commit = s.resize_pointer_up().unwrap();
        assert_eq!((commit.width, commit.height), (140.0, 70.0));
        assert!(s
            .artifacts()
            .fragment
            .contains("display: inline-block; width: 140px; height: auto;"));
    }

    #[test]
    fn test_delete_table_without_table_notifies() {
        let mut s = session("<p>x</p>");
        let p = s.dom().first_child(s.surface()).unwrap();
        s.select(select_node_contents(s.dom(), p));
        let before = s.content();
        assert!(matches!(s.delete_table(), Err(EditorError::NoTableSelected)));
        assert_eq!(s.content(), before);
        assert_eq!(s.platform().last_notice(), Some(&Notice::NoTableSelected));
    }

    #[test]
    fn test_typing_debounces_sync() {
        let mut s = session("<p>ab</p>");
        let text = text_of(&s, "ab");
        s.select(DomRange::caret(BoundaryPoint::new(text, 2)));
        let start = Instant::now();
        assert!(s.type_text("c", start));
        assert!(s.sync_pending());
        assert_eq!(s.artifacts().fragment, "<p>ab</p>");

        assert!(!s.tick(start + std::time::Duration::from_millis(50)));
        assert!(s.tick(start + std::time::Duration::from_millis(120)));
        assert_eq!(s.artifacts().fragment, "<p>abc</p>");
    }
}
