use std::io::stdout;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tokio::runtime::Runtime;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info};
use tui_input::backend::crossterm::EventHandler;
use tui_input::Input;
use tui_widgets::popup::PopupState;

use crate::api::ContactApi;
use crate::config::{Config, UiColors};
use crate::state::{Action, AppState, Completion, Dialog, Request};

use super::draw;
use super::edit::{FormEditor, FormSlot};
use super::panes::Pane;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Default)]
pub struct HelpModal {
    pub scroll: usize,
    pub total_lines: usize,
    pub viewport_height: usize,
}

impl HelpModal {
    pub fn scroll_down(&mut self, lines: usize) {
        let max_scroll = self.total_lines.saturating_sub(self.viewport_height);
        self.scroll = (self.scroll + lines).min(max_scroll);
    }

    pub fn scroll_up(&mut self, lines: usize) {
        self.scroll = self.scroll.saturating_sub(lines);
    }

    pub fn can_scroll_up(&self) -> bool {
        self.scroll > 0
    }

    pub fn can_scroll_down(&self) -> bool {
        self.scroll + self.viewport_height < self.total_lines
    }
}

#[derive(Debug, Clone)]
pub struct HelpSection {
    pub title: &'static str,
    pub entries: Vec<HelpEntry>,
}

#[derive(Debug, Clone)]
pub struct HelpEntry {
    pub action: &'static str,
    pub keys: String,
}

pub struct App<'a> {
    config: &'a Config,
    pub state: AppState,
    pub focused_pane: Pane,
    pub search_input: Input,
    pub editor: FormEditor,
    // Popup state for the delete confirmation (tui-widgets popup)
    pub modal_popup: PopupState,
    pub help_modal: HelpModal,
    api: ContactApi,
    runtime: Runtime,
    completions_tx: UnboundedSender<Completion>,
    completions_rx: UnboundedReceiver<Completion>,
}

impl<'a> App<'a> {
    pub fn new(config: &'a Config) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("contactr-net")
            .enable_all()
            .build()
            .context("failed to start network runtime")?;
        let api = ContactApi::new(&config.api_base_url, config.request_timeout)
            .context("failed to build HTTP client")?;
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();

        Ok(Self {
            config,
            state: AppState::new(config.page_size),
            focused_pane: Pane::List,
            search_input: Input::default(),
            editor: FormEditor::default(),
            modal_popup: PopupState::default(),
            help_modal: HelpModal::default(),
            api,
            runtime,
            completions_tx,
            completions_rx,
        })
    }

    pub fn run(&mut self) -> Result<()> {
        enable_raw_mode()?;
        let mut stdout = stdout();
        stdout.execute(EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        terminal.clear()?;

        info!(base_url = %self.api.base_url(), "starting");
        self.dispatch(Action::Reload);
        let result = self.event_loop(&mut terminal);

        disable_raw_mode()?;
        terminal.backend_mut().execute(LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    fn event_loop<B>(&mut self, terminal: &mut Terminal<B>) -> Result<()>
    where
        B: ratatui::backend::Backend,
    {
        loop {
            self.drain_completions();
            draw::render(terminal, self)?;

            if event::poll(POLL_INTERVAL)? {
                match event::read()? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => {
                        if self.handle_key(key) {
                            break;
                        }
                    }
                    _ => {}
                }
            }
        }
        Ok(())
    }

    fn dispatch(&mut self, action: Action) {
        debug!(?action, "dispatch");
        if let Some(request) = self.state.update(action) {
            self.spawn(request);
        }
    }

    fn spawn(&self, request: Request) {
        let api = self.api.clone();
        let tx = self.completions_tx.clone();
        self.runtime.spawn(async move {
            let result = api.execute(request.call).await;
            // The receiver only goes away when the app is shutting down.
            let _ = tx.send(Completion {
                ticket: request.ticket,
                result,
            });
        });
    }

    fn drain_completions(&mut self) {
        while let Ok(completion) = self.completions_rx.try_recv() {
            if let Some(request) = self.state.complete(completion) {
                self.spawn(request);
            }
        }
    }

    /// Returns true when the app should exit.
    fn handle_key(&mut self, key: KeyEvent) -> bool {
        // Ctrl+C always quits
        if key.modifiers.contains(KeyModifiers::CONTROL)
            && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('C'))
        {
            return true;
        }

        match self.state.dialog() {
            Some(Dialog::Help) => self.handle_help_key(key),
            Some(Dialog::Form(_)) => self.handle_form_key(key),
            Some(Dialog::ConfirmDelete { .. }) => self.handle_confirm_key(key),
            Some(Dialog::Detail(_)) => self.handle_detail_key(key),
            None => match self.focused_pane {
                Pane::Search => self.handle_search_key(key),
                Pane::List => return self.handle_list_key(key),
            },
        }
        false
    }

    fn handle_search_key(&mut self, key: KeyEvent) {
        let keys = &self.config.keys.search;
        if key_matches_any(&key, &keys.cancel) || key_matches_any(&key, &keys.confirm) {
            self.focused_pane = Pane::List;
            return;
        }

        if let Some(change) = self.search_input.handle_event(&Event::Key(key)) {
            if change.value {
                let term = self.search_input.value().to_string();
                self.dispatch(Action::SetSearch(term));
            }
        }
    }

    fn handle_list_key(&mut self, key: KeyEvent) -> bool {
        let config = self.config;
        let global = &config.keys.global;
        let list = &config.keys.list;

        if key_matches_any(&key, &global.quit) {
            return true;
        }
        if key_matches_any(&key, &global.search) {
            self.focused_pane = Pane::Search;
        } else if key_matches_any(&key, &global.help) {
            self.show_help();
        } else if key_matches_any(&key, &global.new) {
            self.dispatch(Action::OpenCreate);
            self.sync_editor();
        } else if key_matches_any(&key, &global.reload) {
            self.dispatch(Action::Reload);
        } else if key_matches_any(&key, &list.next) {
            self.dispatch(Action::SelectNext);
        } else if key_matches_any(&key, &list.prev) {
            self.dispatch(Action::SelectPrev);
        } else if key_matches_any(&key, &list.next_page) {
            self.dispatch(Action::NextPage);
        } else if key_matches_any(&key, &list.prev_page) {
            self.dispatch(Action::PrevPage);
        } else if key_matches_any(&key, &list.view) {
            self.dispatch(Action::View);
        } else if key_matches_any(&key, &list.edit) {
            self.dispatch(Action::OpenEdit);
            self.sync_editor();
        } else if key_matches_any(&key, &list.delete) {
            self.modal_popup = PopupState::default();
            self.dispatch(Action::RequestDelete);
        } else if key_matches_any(&key, &config.keys.modal.cancel) && self.state.error().is_some()
        {
            self.dispatch(Action::DismissError);
        }
        false
    }

    fn handle_form_key(&mut self, key: KeyEvent) {
        let config = self.config;
        let keys = &config.keys.form;

        if key_matches_any(&key, &keys.cancel) {
            self.dispatch(Action::CloseDialog);
            return;
        }
        if key_matches_any(&key, &keys.submit) {
            self.dispatch(Action::Submit);
            return;
        }

        let Some(form) = self.state.form() else {
            return;
        };
        if key_matches_any(&key, &keys.next_field) {
            self.editor.next(form);
            return;
        }
        if key_matches_any(&key, &keys.prev_field) {
            self.editor.prev(form);
            return;
        }
        if form.is_submitting() {
            return;
        }

        if let Some(value) = self.editor.handle_key_event(key) {
            let action = match self.editor.slot() {
                FormSlot::Field(field) => Action::EditField(field, value),
                FormSlot::Photo => Action::SetPhoto(value),
            };
            self.dispatch(action);
        }
    }

    fn handle_confirm_key(&mut self, key: KeyEvent) {
        let config = self.config;
        let keys = &config.keys.modal;
        if key_matches_any(&key, &keys.confirm) {
            self.dispatch(Action::ConfirmDelete);
        } else if key_matches_any(&key, &keys.cancel) {
            self.dispatch(Action::CloseDialog);
        }
    }

    fn handle_detail_key(&mut self, key: KeyEvent) {
        let config = self.config;
        let list = &config.keys.list;
        if key_matches_any(&key, &config.keys.modal.cancel) || key_matches_any(&key, &list.view)
        {
            self.dispatch(Action::CloseDialog);
        } else if key_matches_any(&key, &list.edit) {
            self.dispatch(Action::OpenEdit);
            self.sync_editor();
        } else if key_matches_any(&key, &list.delete) {
            self.modal_popup = PopupState::default();
            self.dispatch(Action::RequestDelete);
        }
    }

    /// Point the editor at the form that was just opened.
    fn sync_editor(&mut self) {
        if let Some(form) = self.state.form() {
            self.editor.open(form);
        }
    }

    // =========================================================================
    // Help Modal
    // =========================================================================

    /// Generate help content from current keybindings configuration
    pub fn help_entries(&self) -> Vec<HelpSection> {
        let keys = &self.config.keys;

        vec![
            HelpSection {
                title: "Global",
                entries: vec![
                    entry("Quit", &keys.global.quit),
                    entry("Search", &keys.global.search),
                    entry("Help", &keys.global.help),
                    entry("New Contact", &keys.global.new),
                    entry("Reload", &keys.global.reload),
                ],
            },
            HelpSection {
                title: "Search",
                entries: vec![
                    entry("Back to List", &keys.search.cancel),
                    entry("Done", &keys.search.confirm),
                ],
            },
            HelpSection {
                title: "Contacts",
                entries: vec![
                    entry("Next", &keys.list.next),
                    entry("Previous", &keys.list.prev),
                    entry("View", &keys.list.view),
                    entry("Edit", &keys.list.edit),
                    entry("Delete", &keys.list.delete),
                    entry("Next Page", &keys.list.next_page),
                    entry("Previous Page", &keys.list.prev_page),
                ],
            },
            HelpSection {
                title: "Form",
                entries: vec![
                    entry("Next Field", &keys.form.next_field),
                    entry("Previous Field", &keys.form.prev_field),
                    entry("Save", &keys.form.submit),
                    entry("Cancel", &keys.form.cancel),
                ],
            },
            HelpSection {
                title: "Dialogs",
                entries: vec![
                    entry("Confirm", &keys.modal.confirm),
                    entry("Cancel / Dismiss", &keys.modal.cancel),
                ],
            },
        ]
    }

    pub fn show_help(&mut self) {
        self.help_modal = HelpModal::default();
        self.dispatch(Action::ToggleHelp);
    }

    fn handle_help_key(&mut self, key: KeyEvent) {
        if key_matches_any(&key, &self.config.keys.modal.cancel)
            || key_matches_any(&key, &self.config.keys.global.help)
        {
            self.dispatch(Action::ToggleHelp);
            return;
        }

        let modal = &mut self.help_modal;
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => modal.scroll_down(1),
            KeyCode::Char('k') | KeyCode::Up => modal.scroll_up(1),
            KeyCode::PageDown => {
                let page = modal.viewport_height.saturating_sub(1).max(1);
                modal.scroll_down(page);
            }
            KeyCode::PageUp => {
                let page = modal.viewport_height.saturating_sub(1).max(1);
                modal.scroll_up(page);
            }
            _ => {}
        }
    }

    pub fn ui_colors(&self) -> &UiColors {
        &self.config.ui.colors
    }
}

fn entry(action: &'static str, bindings: &[String]) -> HelpEntry {
    HelpEntry {
        action,
        keys: bindings.join(", "),
    }
}

/// Check if the key event matches any of the bindings in the list
fn key_matches_any(event: &KeyEvent, bindings: &[String]) -> bool {
    bindings.iter().any(|b| key_matches_single(event, b))
}

/// Check if the key event matches a single binding string
fn key_matches_single(event: &KeyEvent, binding: &str) -> bool {
    let trimmed = binding.trim();
    if trimmed.is_empty() {
        return false;
    }

    // Ctrl/Alt/Super chords are not bindable
    let disallowed = KeyModifiers::CONTROL | KeyModifiers::ALT | KeyModifiers::SUPER;
    if event.modifiers.intersects(disallowed) {
        return false;
    }

    match trimmed.to_ascii_lowercase().as_str() {
        "enter" => matches!(event.code, KeyCode::Enter),
        "tab" => matches!(event.code, KeyCode::Tab),
        "backtab" | "shift+tab" => matches!(event.code, KeyCode::BackTab),
        "backspace" => matches!(event.code, KeyCode::Backspace),
        "esc" | "escape" => matches!(event.code, KeyCode::Esc),
        "space" => matches!(event.code, KeyCode::Char(' ')),
        "up" => matches!(event.code, KeyCode::Up),
        "down" => matches!(event.code, KeyCode::Down),
        "left" => matches!(event.code, KeyCode::Left),
        "right" => matches!(event.code, KeyCode::Right),
        "pageup" | "page_up" => matches!(event.code, KeyCode::PageUp),
        "pagedown" | "page_down" => matches!(event.code, KeyCode::PageDown),
        "home" => matches!(event.code, KeyCode::Home),
        "end" => matches!(event.code, KeyCode::End),
        name => {
            if let Some(number) = name.strip_prefix('f').and_then(|n| n.parse::<u8>().ok()) {
                return matches!(event.code, KeyCode::F(n) if n == number);
            }
            // Single character - case-sensitive (m != M, since M requires Shift)
            let mut chars = trimmed.chars();
            match (chars.next(), chars.next()) {
                (Some(first), None) => matches!(event.code, KeyCode::Char(c) if c == first),
                _ => false,
            }
        }
    }
}
