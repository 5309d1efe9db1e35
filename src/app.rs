use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::models::{NONE_CHOICE, PickMode, TemplateKind};
use crate::registry::{CatalogStatus, TemplateRegistry};

#[derive(Debug, PartialEq)]
pub enum InputMode {
    Normal,
    Editing,
}

/// Picker state and selection logic.
pub struct App {
    pub kind: TemplateKind,
    pub mode: PickMode,
    /// Names from the latest registry snapshot.
    pub templates: Vec<String>,
    /// Names matching the current search query.
    pub filtered_templates: Vec<String>,
    /// Chosen names, in the order they were picked.
    pub selected_templates: Vec<String>,
    /// Current index in the filtered templates list.
    pub highlighted_index: usize,
    pub search_query: String,
    pub input_mode: InputMode,
    /// Remote catalog state as of the latest snapshot.
    pub catalog_status: CatalogStatus,
    /// Registry generation the snapshot was taken at.
    seen_generation: Option<u64>,
    pub error: Option<String>,
}

impl App {
    pub fn new(kind: TemplateKind) -> Self {
        Self {
            kind,
            mode: kind.pick_mode(),
            templates: Vec::new(),
            filtered_templates: Vec::new(),
            selected_templates: Vec::new(),
            highlighted_index: 0,
            search_query: String::new(),
            input_mode: InputMode::Editing,
            catalog_status: CatalogStatus::NotRequested,
            seen_generation: None,
            error: None,
        }
    }

    /// Re-snapshots the registry if it changed since the last call.
    pub fn refresh(&mut self, registry: &TemplateRegistry) {
        let generation = registry.generation();
        if self.seen_generation == Some(generation) {
            return;
        }
        self.seen_generation = Some(generation);
        self.catalog_status = registry.status();
        let snapshot = registry.snapshot();
        self.set_templates(snapshot);
    }

    pub fn set_templates(&mut self, templates: Vec<String>) {
        let highlighted = self.get_current_highlighted();
        self.templates = match self.mode {
            PickMode::Single => std::iter::once(NONE_CHOICE.to_string())
                .chain(templates.into_iter().filter(|t| t != NONE_CHOICE))
                .collect(),
            PickMode::Multi => templates,
        };
        self.apply_filter();
        if let Some(name) = highlighted {
            if let Some(index) = self.filtered_templates.iter().position(|t| *t == name) {
                self.highlighted_index = index;
            }
        }
    }

    /// Case-insensitive substring filter over the template names.
    pub fn apply_filter(&mut self) {
        if self.search_query.is_empty() {
            self.filtered_templates = self.templates.clone();
        } else {
            let query = self.search_query.to_lowercase();
            self.filtered_templates = self
                .templates
                .iter()
                .filter(|t| t.to_lowercase().contains(&query))
                .cloned()
                .collect();
        }

        if self.highlighted_index >= self.filtered_templates.len()
            && !self.filtered_templates.is_empty()
        {
            self.highlighted_index = self.filtered_templates.len() - 1;
        } else if self.filtered_templates.is_empty() {
            self.highlighted_index = 0;
        }
    }

    pub fn next(&mut self) {
        if !self.filtered_templates.is_empty() {
            self.highlighted_index = (self.highlighted_index + 1) % self.filtered_templates.len();
        }
    }

    pub fn previous(&mut self) {
        if !self.filtered_templates.is_empty() {
            if self.highlighted_index > 0 {
                self.highlighted_index -= 1;
            } else {
                self.highlighted_index = self.filtered_templates.len() - 1;
            }
        }
    }

    /// Toggles the highlighted template. In single mode it replaces the choice.
    pub fn toggle_selection(&mut self) {
        if let Some(template) = self.get_current_highlighted() {
            match self.mode {
                PickMode::Multi => {
                    if let Some(pos) = self.selected_templates.iter().position(|t| *t == template) {
                        self.selected_templates.remove(pos);
                    } else {
                        self.selected_templates.push(template);
                    }
                }
                PickMode::Single => {
                    if self.selected_templates.first() == Some(&template) {
                        self.selected_templates.clear();
                    } else {
                        self.selected_templates = vec![template];
                    }
                }
            }
        }
        self.error = None;
    }

    /// The names to materialize when the user confirms.
    ///
    /// A single-select picker with nothing toggled takes the highlighted entry.
    pub fn confirm(&self) -> Vec<String> {
        match self.mode {
            PickMode::Multi => self.selected_templates.clone(),
            PickMode::Single => self
                .selected_templates
                .first()
                .cloned()
                .or_else(|| self.get_current_highlighted())
                .filter(|t| t != NONE_CHOICE)
                .into_iter()
                .collect(),
        }
    }

    /// Applies one key press. `Some` closes the picker with those names;
    /// an empty list means the user skipped.
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<Vec<String>> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Some(Vec::new());
        }
        match self.input_mode {
            InputMode::Editing => match key.code {
                KeyCode::Char(c) => {
                    self.error = None;
                    self.search_query.push(c);
                    self.apply_filter();
                }
                KeyCode::Backspace => {
                    self.error = None;
                    self.search_query.pop();
                    self.apply_filter();
                }
                KeyCode::Esc | KeyCode::Enter | KeyCode::Tab => {
                    self.input_mode = InputMode::Normal;
                }
                KeyCode::Down => self.next(),
                KeyCode::Up => self.previous(),
                _ => {}
            },
            InputMode::Normal => match key.code {
                KeyCode::Char('i') | KeyCode::Char('/') => {
                    self.error = None;
                    self.input_mode = InputMode::Editing;
                }
                KeyCode::Char('q') | KeyCode::Esc => return Some(Vec::new()),
                KeyCode::Down | KeyCode::Char('j') => self.next(),
                KeyCode::Up | KeyCode::Char('k') => self.previous(),
                KeyCode::Char(' ') => self.toggle_selection(),
                KeyCode::Enter => {
                    let chosen = self.confirm();
                    if chosen.is_empty() && self.mode == PickMode::Multi {
                        self.error = Some("No templates selected! Press Q to skip.".to_string());
                    } else {
                        return Some(chosen);
                    }
                }
                _ => {}
            },
        }
        None
    }

    pub fn get_current_highlighted(&self) -> Option<String> {
        self.filtered_templates.get(self.highlighted_index).cloned()
    }

    pub fn is_selected(&self, template: &str) -> bool {
        self.selected_templates.iter().any(|t| t == template)
    }

    pub fn get_selected_names_summary(&self) -> String {
        self.selected_templates.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    fn multi(templates: &[&str]) -> App {
        let mut app = App::new(TemplateKind::Gitignore);
        app.set_templates(names(templates));
        app
    }

    fn press(app: &mut App, code: KeyCode) -> Option<Vec<String>> {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn type_str(app: &mut App, text: &str) {
        for c in text.chars() {
            assert_eq!(press(app, KeyCode::Char(c)), None);
        }
    }

    #[test]
    fn search_is_case_insensitive_substring() {
        let mut app = multi(&["Go", "Godot", "Node", "Rust"]);
        app.search_query = "OD".to_string();
        app.apply_filter();

        assert_eq!(app.filtered_templates, names(&["Godot", "Node"]));
    }

    #[test]
    fn multi_select_keeps_pick_order() {
        let mut app = multi(&["Go", "Node", "Rust"]);
        app.highlighted_index = 2;
        app.toggle_selection();
        app.highlighted_index = 0;
        app.toggle_selection();
        app.highlighted_index = 1;
        app.toggle_selection();
        app.highlighted_index = 0;
        app.toggle_selection();

        assert_eq!(app.confirm(), names(&["Rust", "Node"]));
        assert_eq!(app.get_selected_names_summary(), "Rust, Node");
    }

    #[test]
    fn single_select_offers_none_first() {
        let mut app = App::new(TemplateKind::License);
        app.set_templates(names(&["apache-2.0", "mit"]));

        assert_eq!(app.templates, names(&[NONE_CHOICE, "apache-2.0", "mit"]));
        assert!(app.confirm().is_empty());

        app.next();
        assert_eq!(app.confirm(), names(&["apache-2.0"]));

        app.next();
        app.toggle_selection();
        app.previous();
        assert_eq!(app.confirm(), names(&["mit"]));
    }

    #[test]
    fn refresh_follows_registry_growth() {
        let registry = TemplateRegistry::new();
        registry.seed(names(&["Local"]));
        let mut app = App::new(TemplateKind::Gitignore);
        app.refresh(&registry);
        app.next();
        assert_eq!(app.get_current_highlighted().as_deref(), Some("Local"));

        registry.begin_remote();
        registry.merge_remote(names(&["Alpha", "Zulu"]));
        app.refresh(&registry);

        assert_eq!(app.templates, names(&["Alpha", "Local", "Zulu"]));
        assert_eq!(app.get_current_highlighted().as_deref(), Some("Local"));
        assert!(matches!(app.catalog_status, CatalogStatus::Merged { .. }));
    }

    #[test]
    fn empty_filter_resets_highlight() {
        let mut app = multi(&["Go", "Node"]);
        app.highlighted_index = 1;
        app.search_query = "zzz".to_string();
        app.apply_filter();

        assert!(app.filtered_templates.is_empty());
        assert_eq!(app.highlighted_index, 0);
        app.toggle_selection();
        assert!(app.confirm().is_empty());
    }

    #[test]
    fn typing_filters_and_backspace_widens() {
        let mut app = multi(&["Go", "Godot", "Node", "Rust"]);
        assert_eq!(app.input_mode, InputMode::Editing);

        type_str(&mut app, "od");
        assert_eq!(app.filtered_templates, names(&["Godot", "Node"]));

        press(&mut app, KeyCode::Backspace);
        press(&mut app, KeyCode::Backspace);
        assert_eq!(app.search_query, "");
        assert_eq!(app.filtered_templates.len(), 4);
    }

    #[test]
    fn esc_and_slash_switch_input_modes() {
        let mut app = multi(&["Go", "Node"]);

        assert_eq!(press(&mut app, KeyCode::Esc), None);
        assert_eq!(app.input_mode, InputMode::Normal);

        // Letters are commands in normal mode, not search input.
        press(&mut app, KeyCode::Char('j'));
        assert_eq!(app.search_query, "");
        assert_eq!(app.get_current_highlighted().as_deref(), Some("Node"));

        press(&mut app, KeyCode::Char('/'));
        assert_eq!(app.input_mode, InputMode::Editing);
        type_str(&mut app, "q");
        assert_eq!(app.search_query, "q");
    }

    #[test]
    fn enter_without_selection_warns_and_stays_open() {
        let mut app = multi(&["Go", "Node"]);
        press(&mut app, KeyCode::Esc);

        assert_eq!(press(&mut app, KeyCode::Enter), None);
        assert!(app.error.is_some());

        press(&mut app, KeyCode::Char(' '));
        assert_eq!(app.error, None);
        press(&mut app, KeyCode::Char('j'));
        press(&mut app, KeyCode::Char(' '));
        assert_eq!(press(&mut app, KeyCode::Enter), Some(names(&["Go", "Node"])));
    }

    #[test]
    fn q_in_normal_mode_skips() {
        let mut app = multi(&["Go", "Node"]);
        press(&mut app, KeyCode::Esc);
        press(&mut app, KeyCode::Char(' '));

        assert_eq!(press(&mut app, KeyCode::Char('q')), Some(Vec::new()));
    }

    #[test]
    fn ctrl_c_cancels_while_editing() {
        let mut app = multi(&["Go"]);
        let key = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);

        assert_eq!(app.handle_key(key), Some(Vec::new()));
        assert_eq!(app.search_query, "");
    }

    #[test]
    fn single_select_enter_takes_highlighted_entry() {
        let mut app = App::new(TemplateKind::License);
        app.set_templates(names(&["apache-2.0", "mit"]));
        type_str(&mut app, "mit");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.input_mode, InputMode::Normal);

        assert_eq!(press(&mut app, KeyCode::Enter), Some(names(&["mit"])));
    }

    #[test]
    fn single_select_enter_on_none_returns_empty() {
        let mut app = App::new(TemplateKind::License);
        app.set_templates(names(&["mit"]));
        press(&mut app, KeyCode::Esc);

        assert_eq!(press(&mut app, KeyCode::Enter), Some(Vec::new()));
    }
}
