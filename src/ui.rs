use std::env;
use std::io::{self, Stdout};
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Result;
use chrono::Utc;
use crossbeam_channel::{unbounded, Receiver, Sender};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{
    Block, Borders, Clear, List, ListItem, ListState, Padding, Paragraph, Row, Table, Wrap,
};
use ratatui::{Frame, Terminal};
use textwrap::{wrap, Options as WrapOptions};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::browser::{CollectionSelection, LinkBrowser};
use crate::collection::{self, Collection, Link, LoadError};
use crate::config;
use crate::domain;
use crate::freshness::{self, Freshness};
use crate::nav::{NavEffect, NavKey};
use crate::pipeline;
use crate::prefs::{self, Appearance, PreferencesBridge};
use crate::preview::PreviewTimer;
use crate::share::{self, ShareTarget};
use crate::toast::{Toast, ToastKind};

const SPINNER_FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
const GRID_CARD_HEIGHT: u16 = 7;
const GRID_MIN_CARD_WIDTH: u16 = 34;
const GRID_MAX_COLUMNS: usize = 3;

struct Palette {
    bg: Color,
    panel_bg: Color,
    selected_bg: Color,
    border_idle: Color,
    border_focused: Color,
    text_primary: Color,
    text_secondary: Color,
    accent: Color,
    success: Color,
    warning: Color,
    caution: Color,
    error: Color,
}

const DARK: Palette = Palette {
    bg: Color::Rgb(30, 30, 46),
    panel_bg: Color::Rgb(24, 24, 36),
    selected_bg: Color::Rgb(69, 71, 90),
    border_idle: Color::Rgb(49, 50, 68),
    border_focused: Color::Rgb(137, 180, 250),
    text_primary: Color::Rgb(205, 214, 244),
    text_secondary: Color::Rgb(166, 173, 200),
    accent: Color::Rgb(137, 180, 250),
    success: Color::Rgb(166, 227, 161),
    warning: Color::Rgb(249, 226, 175),
    caution: Color::Rgb(250, 179, 135),
    error: Color::Rgb(243, 139, 168),
};

const LIGHT: Palette = Palette {
    bg: Color::Rgb(239, 241, 245),
    panel_bg: Color::Rgb(230, 233, 239),
    selected_bg: Color::Rgb(204, 208, 218),
    border_idle: Color::Rgb(188, 192, 204),
    border_focused: Color::Rgb(30, 102, 245),
    text_primary: Color::Rgb(76, 79, 105),
    text_secondary: Color::Rgb(108, 111, 133),
    accent: Color::Rgb(30, 102, 245),
    success: Color::Rgb(64, 160, 43),
    warning: Color::Rgb(223, 142, 29),
    caution: Color::Rgb(254, 100, 11),
    error: Color::Rgb(210, 15, 57),
};

const SHORTCUTS: [(&str, &str); 16] = [
    ("Ctrl+P, /", "Focus search"),
    ("Enter, Esc", "Leave search"),
    ("Ctrl+U", "Clear search"),
    ("k, Down", "Focus next link"),
    ("j, Up", "Focus previous link"),
    ("Enter", "Open focused link"),
    ("Esc", "Unfocus and close menus"),
    ("Tab, ]", "Next collection"),
    ("Shift+Tab, [", "Previous collection"),
    ("n, p", "Next / previous page"),
    ("s", "Toggle sort order"),
    ("f", "Filter by domain"),
    ("v, t, w", "Cycle layout / theme / preview"),
    ("y", "Share focused link"),
    (",", "Settings"),
    ("?, q", "This help / quit"),
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Overlay {
    None,
    Settings,
    Shortcuts,
    Domains,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SettingsRow {
    Theme,
    Layout,
    Preview,
}

const SETTINGS_ROWS: [SettingsRow; 3] = [
    SettingsRow::Theme,
    SettingsRow::Layout,
    SettingsRow::Preview,
];

pub struct Options {
    pub collections_dir: Option<PathBuf>,
    pub page_size: usize,
    pub ui: config::UIConfig,
    pub prefs: PreferencesBridge,
    pub prefs_path: String,
}

enum AsyncResponse {
    Collections {
        result: Result<Vec<Collection>, LoadError>,
    },
}

struct Spinner {
    index: usize,
    last_tick: Instant,
}

impl Spinner {
    fn new() -> Self {
        Self {
            index: 0,
            last_tick: Instant::now(),
        }
    }

    fn frame(&self) -> &'static str {
        SPINNER_FRAMES[self.index % SPINNER_FRAMES.len()]
    }

    fn advance(&mut self) -> bool {
        let now = Instant::now();
        if now.duration_since(self.last_tick) >= Duration::from_millis(120) {
            self.index = (self.index + 1) % SPINNER_FRAMES.len();
            self.last_tick = now;
            true
        } else {
            false
        }
    }

    fn reset(&mut self) {
        self.index = 0;
        self.last_tick = Instant::now();
    }
}

pub struct Model {
    browser: LinkBrowser,
    page_size: usize,
    prefs: PreferencesBridge,
    prefs_path: String,
    colorfgbg: Option<String>,
    loading: bool,
    status_message: String,
    search_active: bool,
    overlay: Overlay,
    settings_index: usize,
    domain_index: usize,
    preview: PreviewTimer<String>,
    toast: Option<Toast>,
    toast_duration: Duration,
    share_targets: Vec<Box<dyn ShareTarget>>,
    spinner: Spinner,
    needs_redraw: bool,
    response_tx: Sender<AsyncResponse>,
    response_rx: Receiver<AsyncResponse>,
}

impl Model {
    pub fn new(opts: Options) -> Self {
        let (response_tx, response_rx) = unbounded();
        let mut model = Self {
            browser: LinkBrowser::new(Vec::new(), opts.page_size),
            page_size: opts.page_size,
            prefs: opts.prefs,
            prefs_path: opts.prefs_path,
            colorfgbg: env::var("COLORFGBG").ok(),
            loading: true,
            status_message: "Loading links…".to_string(),
            search_active: false,
            overlay: Overlay::None,
            settings_index: 0,
            domain_index: 0,
            preview: PreviewTimer::new(opts.ui.preview_delays()),
            toast: None,
            toast_duration: opts.ui.toast_duration,
            share_targets: share::default_targets(),
            spinner: Spinner::new(),
            needs_redraw: true,
            response_tx,
            response_rx,
        };
        model.apply_preferences();
        model.spawn_load(opts.collections_dir);
        model
    }

    fn spawn_load(&self, dir: Option<PathBuf>) {
        let tx = self.response_tx.clone();
        thread::spawn(move || {
            let result = collection::load(dir.as_deref());
            let _ = tx.send(AsyncResponse::Collections { result });
        });
    }

    fn apply_preferences(&mut self) {
        self.browser.set_layout(self.prefs.layout());
        self.browser.set_preview_enabled(self.prefs.preview_enabled());
    }

    fn mark_dirty(&mut self) {
        self.needs_redraw = true;
    }

    pub fn run(&mut self) -> Result<()> {
        let mut stdout = io::stdout();
        enable_raw_mode()?;
        stdout.execute(EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        terminal.clear()?;

        let result = self.event_loop(&mut terminal);

        disable_raw_mode()?;
        terminal.backend_mut().execute(LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    fn event_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
        let mut last_tick = Instant::now();
        let tick_rate = Duration::from_millis(50);

        loop {
            if self.poll_async() {
                self.mark_dirty();
            }

            if self.needs_redraw {
                terminal.draw(|frame| self.draw(frame))?;
                self.needs_redraw = false;
            }

            let timeout = tick_rate
                .checked_sub(last_tick.elapsed())
                .unwrap_or_else(|| Duration::from_millis(16));

            if event::poll(timeout)? {
                match event::read()? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => {
                        match self.handle_key(key, Instant::now()) {
                            Ok(true) => break,
                            Ok(false) => {}
                            Err(err) => {
                                self.status_message = format!("Error: {}", err);
                                self.mark_dirty();
                            }
                        }
                    }
                    Event::Resize(_, _) => self.mark_dirty(),
                    _ => {}
                }
            }

            if last_tick.elapsed() >= tick_rate {
                last_tick = Instant::now();
                if self.tick(last_tick) {
                    self.mark_dirty();
                }
            }
        }

        Ok(())
    }

    fn tick(&mut self, now: Instant) -> bool {
        let mut ticked = false;
        if self.loading {
            ticked |= self.spinner.advance();
        } else {
            self.spinner.reset();
        }
        ticked |= self.preview.tick(now);
        if self.toast.as_ref().is_some_and(|toast| toast.is_expired(now)) {
            self.toast = None;
            ticked = true;
        }
        ticked
    }

    fn poll_async(&mut self) -> bool {
        let mut changed = false;
        while let Ok(message) = self.response_rx.try_recv() {
            self.handle_async_response(message);
            changed = true;
        }
        changed
    }

    fn handle_async_response(&mut self, message: AsyncResponse) {
        match message {
            AsyncResponse::Collections { result } => {
                self.loading = false;
                match result {
                    Ok(collections) => {
                        tracing::info!(collections = collections.len(), "collections loaded");
                        self.browser = LinkBrowser::new(collections, self.page_size);
                        self.apply_preferences();
                        self.status_message = format!(
                            "{} links in {} collections.",
                            self.browser.total_links(),
                            self.browser.collections().len()
                        );
                    }
                    Err(err) => {
                        tracing::error!(error = %err, "failed to load collections");
                        self.status_message = format!("Failed to load links: {}", err);
                    }
                }
                self.mark_dirty();
            }
        }
    }

    fn handle_key(&mut self, key: KeyEvent, now: Instant) -> Result<bool> {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('c') => return Ok(true),
                KeyCode::Char('p') => {
                    self.open_search();
                    return Ok(false);
                }
                KeyCode::Char('u') if self.search_active => {
                    self.browser.set_search("");
                    self.after_browse(now);
                    return Ok(false);
                }
                _ => return Ok(false),
            }
        }

        if self.search_active {
            self.handle_search_key(key.code, now);
            return Ok(false);
        }

        match self.overlay {
            Overlay::Settings => return self.handle_settings_key(key.code, now),
            Overlay::Shortcuts => return self.handle_shortcuts_key(key.code, now),
            Overlay::Domains => return self.handle_domains_key(key.code, now),
            Overlay::None => {}
        }

        match key.code {
            KeyCode::Char('q') => return Ok(true),
            KeyCode::Char('/') => self.open_search(),
            KeyCode::Char(ch @ ('j' | 'k')) => {
                if let Some(nav) = NavKey::from_char(ch) {
                    self.navigate(nav, now)?;
                }
            }
            KeyCode::Down => self.navigate(NavKey::Forward, now)?,
            KeyCode::Up => self.navigate(NavKey::Backward, now)?,
            KeyCode::Enter => self.navigate(NavKey::Open, now)?,
            KeyCode::Esc => self.navigate(NavKey::Escape, now)?,
            KeyCode::Tab | KeyCode::Char(']') => {
                self.browser.shift_collection(1);
                self.after_browse(now);
            }
            KeyCode::BackTab | KeyCode::Char('[') => {
                self.browser.shift_collection(-1);
                self.after_browse(now);
            }
            KeyCode::Char('n') | KeyCode::PageDown | KeyCode::Right => {
                self.browser.next_page();
                self.after_browse(now);
            }
            KeyCode::Char('p') | KeyCode::PageUp | KeyCode::Left => {
                self.browser.prev_page();
                self.after_browse(now);
            }
            KeyCode::Char('s') => {
                self.browser.toggle_sort();
                self.status_message = format!("Sorted {}.", self.browser.state().sort.label());
                self.after_browse(now);
            }
            KeyCode::Char('f') => {
                self.overlay = Overlay::Domains;
                self.domain_index = 0;
                self.mark_dirty();
            }
            KeyCode::Char('v') => self.cycle_layout()?,
            KeyCode::Char('t') => self.cycle_theme()?,
            KeyCode::Char('w') => self.toggle_preview(now)?,
            KeyCode::Char('y') => self.share_focused(now),
            KeyCode::Char(',') => {
                self.overlay = Overlay::Settings;
                self.settings_index = 0;
                self.mark_dirty();
            }
            KeyCode::Char('?') => {
                self.overlay = Overlay::Shortcuts;
                self.mark_dirty();
            }
            _ => {}
        }
        Ok(false)
    }

    fn open_search(&mut self) {
        self.search_active = true;
        self.overlay = Overlay::None;
        self.mark_dirty();
    }

    fn handle_search_key(&mut self, code: KeyCode, now: Instant) {
        match code {
            KeyCode::Esc | KeyCode::Enter => {
                self.search_active = false;
                self.mark_dirty();
            }
            KeyCode::Backspace => {
                self.browser.pop_search_char();
                self.after_browse(now);
            }
            KeyCode::Char(ch) => {
                self.browser.push_search_char(ch);
                self.after_browse(now);
            }
            _ => {}
        }
    }

    fn handle_settings_key(&mut self, code: KeyCode, now: Instant) -> Result<bool> {
        match code {
            KeyCode::Esc => self.navigate(NavKey::Escape, now)?,
            KeyCode::Char(',') | KeyCode::Char('q') => {
                self.overlay = Overlay::None;
                self.mark_dirty();
            }
            KeyCode::Char('k') | KeyCode::Down => {
                self.settings_index = (self.settings_index + 1) % SETTINGS_ROWS.len();
                self.mark_dirty();
            }
            KeyCode::Char('j') | KeyCode::Up => {
                self.settings_index =
                    (self.settings_index + SETTINGS_ROWS.len() - 1) % SETTINGS_ROWS.len();
                self.mark_dirty();
            }
            KeyCode::Enter | KeyCode::Char(' ') | KeyCode::Char('l') | KeyCode::Right => {
                match SETTINGS_ROWS[self.settings_index % SETTINGS_ROWS.len()] {
                    SettingsRow::Theme => self.cycle_theme()?,
                    SettingsRow::Layout => self.cycle_layout()?,
                    SettingsRow::Preview => self.toggle_preview(now)?,
                }
            }
            _ => {}
        }
        Ok(false)
    }

    fn handle_shortcuts_key(&mut self, code: KeyCode, now: Instant) -> Result<bool> {
        match code {
            KeyCode::Esc => self.navigate(NavKey::Escape, now)?,
            KeyCode::Char('?') | KeyCode::Char('q') | KeyCode::Enter => {
                self.overlay = Overlay::None;
                self.mark_dirty();
            }
            _ => {}
        }
        Ok(false)
    }

    // Row 0 is "All Domains"; rows 1.. map to the facet.
    fn handle_domains_key(&mut self, code: KeyCode, now: Instant) -> Result<bool> {
        let domains = self.browser.domains();
        let rows = domains.len() + 1;
        match code {
            KeyCode::Esc => self.navigate(NavKey::Escape, now)?,
            KeyCode::Char('f') | KeyCode::Char('q') => {
                self.overlay = Overlay::None;
                self.mark_dirty();
            }
            KeyCode::Char('k') | KeyCode::Down => {
                self.domain_index = (self.domain_index + 1) % rows;
                self.mark_dirty();
            }
            KeyCode::Char('j') | KeyCode::Up => {
                self.domain_index = (self.domain_index + rows - 1) % rows;
                self.mark_dirty();
            }
            KeyCode::Char('a') => {
                self.browser.clear_domains();
                self.after_browse(now);
            }
            KeyCode::Char(' ') => {
                match self.domain_index.checked_sub(1).and_then(|i| domains.get(i)) {
                    Some(domain) => {
                        self.browser.toggle_domain(domain);
                    }
                    None => self.browser.clear_domains(),
                }
                self.after_browse(now);
            }
            KeyCode::Enter => {
                match self.domain_index.checked_sub(1).and_then(|i| domains.get(i)) {
                    Some(domain) => self.browser.select_domain(domain),
                    None => self.browser.clear_domains(),
                }
                self.overlay = Overlay::None;
                self.after_browse(now);
            }
            _ => {}
        }
        Ok(false)
    }

    fn navigate(&mut self, key: NavKey, now: Instant) -> Result<()> {
        match self.browser.navigate(key) {
            Some(NavEffect::Open(index)) => self.open_link(index),
            Some(NavEffect::Dismiss) => {
                self.overlay = Overlay::None;
                self.preview.dismiss();
            }
            None => {}
        }
        self.sync_preview(now);
        self.mark_dirty();
        Ok(())
    }

    fn after_browse(&mut self, now: Instant) {
        self.sync_preview(now);
        self.mark_dirty();
    }

    fn sync_preview(&mut self, now: Instant) {
        if !self.browser.state().preview_enabled {
            self.preview.dismiss();
            return;
        }
        match self.browser.focused_link().map(|link| link.key().to_string()) {
            Some(key) => self.preview.hover(key, now),
            None => self.preview.leave(now),
        }
    }

    fn open_link(&mut self, index: usize) {
        let Some(link) = self.browser.page().items.get(index).map(|link| (*link).clone()) else {
            return;
        };
        match webbrowser::open(&link.url) {
            Ok(_) => {
                self.status_message = format!("Opened {} in your browser.", link.title);
            }
            Err(err) => {
                tracing::warn!(url = %link.url, error = %err, "failed to open browser");
                self.status_message =
                    format!("Failed to open {}: {} (URL: {})", link.title, err, link.url);
            }
        }
    }

    fn share_focused(&mut self, now: Instant) {
        let Some(link) = self.browser.focused_link().cloned() else {
            self.status_message = "Focus a link with j/k to share it.".to_string();
            self.mark_dirty();
            return;
        };
        let toast = match share::share(&link, &mut self.share_targets) {
            Ok(method) => {
                tracing::debug!(method, url = %link.url, "link shared");
                Toast::success("Link copied to clipboard!", now, self.toast_duration)
            }
            Err(err) => {
                tracing::warn!(error = %err, "share failed");
                Toast::error(format!("Could not share link: {}", err), now, self.toast_duration)
            }
        };
        self.toast = Some(toast);
        self.mark_dirty();
    }

    fn cycle_layout(&mut self) -> Result<()> {
        let layout = self.prefs.layout().next();
        self.browser.set_layout(layout);
        self.status_message = format!("{} layout.", layout.label());
        self.mark_dirty();
        self.prefs.set_layout(layout)
    }

    fn cycle_theme(&mut self) -> Result<()> {
        let theme = self.prefs.theme().next();
        self.status_message = format!("{} theme.", theme.label());
        self.mark_dirty();
        self.prefs.set_theme(theme)
    }

    fn toggle_preview(&mut self, now: Instant) -> Result<()> {
        let enabled = !self.prefs.preview_enabled();
        self.browser.set_preview_enabled(enabled);
        self.sync_preview(now);
        self.status_message = if enabled {
            "Link previews on.".to_string()
        } else {
            "Link previews off.".to_string()
        };
        self.mark_dirty();
        self.prefs.set_preview_enabled(enabled)
    }

    fn palette(&self) -> &'static Palette {
        match self.prefs.theme().resolve(self.colorfgbg.as_deref()) {
            Appearance::Light => &LIGHT,
            Appearance::Dark => &DARK,
        }
    }

    fn draw(&self, frame: &mut Frame<'_>) {
        let palette = self.palette();
        let full = frame.size();
        frame.render_widget(
            Block::default().style(Style::default().bg(palette.bg).fg(palette.text_primary)),
            full,
        );

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(3),
                Constraint::Length(1),
                Constraint::Min(0),
                Constraint::Length(1),
                Constraint::Length(1),
            ])
            .split(full);

        self.draw_header(frame, chunks[0]);
        if self.loading {
            self.draw_loading(frame, chunks[4]);
        } else {
            self.draw_tabs(frame, chunks[1]);
            self.draw_search(frame, chunks[2]);
            self.draw_toolbar(frame, chunks[3]);
            self.draw_cards(frame, chunks[4]);
            self.draw_pagination(frame, chunks[5]);
            self.draw_preview(frame, chunks[4]);
        }
        self.draw_footer(frame, chunks[6]);

        match self.overlay {
            Overlay::Settings => self.draw_settings(frame, full),
            Overlay::Shortcuts => self.draw_shortcuts(frame, full),
            Overlay::Domains => self.draw_domain_picker(frame, full),
            Overlay::None => {}
        }
        self.draw_toast(frame, full);
    }

    fn draw_header(&self, frame: &mut Frame<'_>, area: Rect) {
        let palette = self.palette();
        let badge = self
            .browser
            .newest_date()
            .map(|updated| freshness::badge(updated, Utc::now()));
        let badge_width = badge
            .as_ref()
            .map(|(label, _)| UnicodeWidthStr::width(label.as_str()) as u16 + 2)
            .unwrap_or(0);
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(0), Constraint::Length(badge_width)])
            .split(area);

        let title = Line::from(vec![
            Span::styled(
                " Links",
                Style::default()
                    .fg(palette.accent)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!(" · {} curated links", self.browser.total_links()),
                Style::default().fg(palette.text_secondary),
            ),
        ]);
        frame.render_widget(Paragraph::new(title), columns[0]);

        if let Some((label, tier)) = badge {
            let color = match tier {
                Freshness::Fresh => palette.success,
                Freshness::Aging => palette.warning,
                Freshness::Stale => palette.caution,
                Freshness::Expired => palette.error,
            };
            let span = Span::styled(
                format!("{label} "),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            );
            frame.render_widget(
                Paragraph::new(Line::from(span)).alignment(Alignment::Right),
                columns[1],
            );
        }
    }

    fn draw_loading(&self, frame: &mut Frame<'_>, area: Rect) {
        let palette = self.palette();
        let text = format!("{} Loading links…", self.spinner.frame());
        let paragraph = Paragraph::new(Line::from(Span::styled(
            text,
            Style::default().fg(palette.accent),
        )))
        .alignment(Alignment::Center);
        frame.render_widget(paragraph, centered_rect(60, 20, area));
    }

    fn draw_tabs(&self, frame: &mut Frame<'_>, area: Rect) {
        let palette = self.palette();
        let active = self.browser.state().collection;
        let mut spans = vec![Span::raw(" ")];
        let mut push_tab = |label: String, selected: bool| {
            let style = if selected {
                Style::default()
                    .fg(palette.bg)
                    .bg(palette.accent)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(palette.text_secondary)
            };
            spans.push(Span::styled(format!(" {label} "), style));
            spans.push(Span::raw(" "));
        };
        push_tab(
            format!("All {}", self.browser.total_links()),
            active == CollectionSelection::All,
        );
        for (index, collection) in self.browser.collections().iter().enumerate() {
            push_tab(
                format!("{} {}", collection.title, collection.links.len()),
                active == CollectionSelection::Index(index),
            );
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn draw_search(&self, frame: &mut Frame<'_>, area: Rect) {
        let palette = self.palette();
        let border_color = if self.search_active {
            palette.border_focused
        } else {
            palette.border_idle
        };
        let block = Block::default()
            .title(Span::styled(" Search ", Style::default().fg(palette.text_secondary)))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border_color))
            .style(Style::default().bg(palette.panel_bg))
            .padding(Padding::horizontal(1));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let search = &self.browser.state().search;
        let hint = if search.is_empty() { "Ctrl+P" } else { "Ctrl+U clear" };
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Min(0),
                Constraint::Length(UnicodeWidthStr::width(hint) as u16),
            ])
            .split(inner);

        let line = if search.is_empty() && !self.search_active {
            Line::from(Span::styled(
                "Search links…",
                Style::default()
                    .fg(palette.text_secondary)
                    .add_modifier(Modifier::ITALIC),
            ))
        } else {
            let mut spans = vec![Span::styled(
                search.clone(),
                Style::default().fg(palette.text_primary),
            )];
            if self.search_active {
                spans.push(Span::styled("▏", Style::default().fg(palette.accent)));
            }
            Line::from(spans)
        };
        frame.render_widget(Paragraph::new(line), columns[0]);
        frame.render_widget(
            Paragraph::new(Span::styled(hint, Style::default().fg(palette.border_idle))),
            columns[1],
        );
    }

    fn draw_toolbar(&self, frame: &mut Frame<'_>, area: Rect) {
        let palette = self.palette();
        let state = self.browser.state();
        let page = self.browser.page();
        let noun = if page.total == 1 { "result" } else { "results" };
        let left = Span::styled(
            format!(" {} {} in {}", page.total, noun, self.browser.active_title()),
            Style::default().fg(palette.text_secondary),
        );
        let right = format!(
            "Domains: {} · {} · {} ",
            domain_summary(&state.domains),
            state.sort.label(),
            state.layout.label()
        );
        let right_width = UnicodeWidthStr::width(right.as_str()) as u16;
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(0), Constraint::Length(right_width)])
            .split(area);
        frame.render_widget(Paragraph::new(Line::from(left)), columns[0]);
        frame.render_widget(
            Paragraph::new(Span::styled(right, Style::default().fg(palette.text_secondary)))
                .alignment(Alignment::Right),
            columns[1],
        );
    }

    fn draw_cards(&self, frame: &mut Frame<'_>, area: Rect) {
        let palette = self.palette();
        let page = self.browser.page();
        if page.is_empty() {
            let message = if self.browser.total_links() == 0 {
                "No links yet."
            } else {
                "No links match your filters."
            };
            let paragraph = Paragraph::new(Span::styled(
                message,
                Style::default()
                    .fg(palette.text_secondary)
                    .add_modifier(Modifier::ITALIC),
            ))
            .alignment(Alignment::Center);
            frame.render_widget(paragraph, centered_rect(80, 20, area));
            return;
        }

        let focus = self.browser.state().focus.index();
        match self.browser.state().layout {
            prefs::Layout::List => self.draw_list(frame, area, &page.items, focus),
            prefs::Layout::Compact => self.draw_compact(frame, area, &page.items, focus),
            prefs::Layout::Grid => self.draw_grid(frame, area, &page.items, focus),
        }
    }

    fn draw_list(&self, frame: &mut Frame<'_>, area: Rect, links: &[&Link], focus: Option<usize>) {
        let palette = self.palette();
        let width = area.width.saturating_sub(4) as usize;
        let items: Vec<ListItem> = links
            .iter()
            .map(|link| {
                let mut lines = vec![Line::from(Span::styled(
                    truncate_to_width(&link.title, width),
                    Style::default()
                        .fg(palette.text_primary)
                        .add_modifier(Modifier::BOLD),
                ))];
                let mut description =
                    wrap_plain(&link.description, width, Style::default().fg(palette.text_secondary));
                description.truncate(2);
                lines.extend(description);
                lines.push(Line::from(Span::styled(
                    meta_line(link),
                    Style::default().fg(palette.accent),
                )));
                lines.push(Line::default());
                ListItem::new(Text::from(lines))
            })
            .collect();
        self.render_link_list(frame, area, items, focus);
    }

    fn draw_compact(
        &self,
        frame: &mut Frame<'_>,
        area: Rect,
        links: &[&Link],
        focus: Option<usize>,
    ) {
        let palette = self.palette();
        let meta_width = 34usize;
        let title_width = (area.width as usize).saturating_sub(meta_width + 4);
        let items: Vec<ListItem> = links
            .iter()
            .map(|link| {
                let title = truncate_to_width(&link.title, title_width);
                let padding = title_width.saturating_sub(UnicodeWidthStr::width(title.as_str()));
                ListItem::new(Line::from(vec![
                    Span::styled(title, Style::default().fg(palette.text_primary)),
                    Span::raw(" ".repeat(padding + 2)),
                    Span::styled(
                        truncate_to_width(&meta_line(link), meta_width),
                        Style::default().fg(palette.text_secondary),
                    ),
                ]))
            })
            .collect();
        self.render_link_list(frame, area, items, focus);
    }

    fn render_link_list(
        &self,
        frame: &mut Frame<'_>,
        area: Rect,
        items: Vec<ListItem<'_>>,
        focus: Option<usize>,
    ) {
        let palette = self.palette();
        let list = List::new(items)
            .block(Block::default().padding(Padding::horizontal(1)))
            .highlight_style(Style::default().bg(palette.selected_bg))
            .highlight_symbol("▶ ");
        let mut state = ListState::default();
        state.select(focus);
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_grid(&self, frame: &mut Frame<'_>, area: Rect, links: &[&Link], focus: Option<usize>) {
        let palette = self.palette();
        let columns = grid_columns(area.width);
        let visible_rows = (area.height / GRID_CARD_HEIGHT).max(1) as usize;
        let focused_row = focus.map(|index| index / columns).unwrap_or(0);
        let first_row = (focused_row + 1).saturating_sub(visible_rows);

        let row_constraints = vec![Constraint::Length(GRID_CARD_HEIGHT); visible_rows];
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints(row_constraints)
            .split(area);
        let column_constraints = vec![Constraint::Ratio(1, columns as u32); columns];

        for (row_offset, row_area) in rows.iter().enumerate() {
            let cells = Layout::default()
                .direction(Direction::Horizontal)
                .constraints(column_constraints.clone())
                .split(*row_area);
            for (column, cell) in cells.iter().enumerate() {
                let index = (first_row + row_offset) * columns + column;
                let Some(link) = links.get(index) else {
                    return;
                };
                let focused = focus == Some(index);
                let block = Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(if focused {
                        palette.border_focused
                    } else {
                        palette.border_idle
                    }))
                    .style(Style::default().bg(if focused {
                        palette.selected_bg
                    } else {
                        palette.panel_bg
                    }))
                    .padding(Padding::horizontal(1));
                let inner = block.inner(*cell);
                frame.render_widget(block, *cell);

                let width = inner.width as usize;
                let mut lines = vec![Line::from(Span::styled(
                    truncate_to_width(&link.title, width),
                    Style::default()
                        .fg(palette.text_primary)
                        .add_modifier(Modifier::BOLD),
                ))];
                let budget = inner.height.saturating_sub(2) as usize;
                let mut description =
                    wrap_plain(&link.description, width, Style::default().fg(palette.text_secondary));
                description.truncate(budget);
                lines.extend(description);
                lines.push(Line::from(Span::styled(
                    truncate_to_width(&meta_line(link), width),
                    Style::default().fg(palette.accent),
                )));
                frame.render_widget(Paragraph::new(lines), inner);
            }
        }
    }

    fn draw_pagination(&self, frame: &mut Frame<'_>, area: Rect) {
        let palette = self.palette();
        let page = self.browser.page();
        if page.total_pages <= 1 {
            return;
        }
        let enabled = Style::default().fg(palette.accent);
        let disabled = Style::default().fg(palette.border_idle);
        let line = Line::from(vec![
            Span::styled(
                "‹ Prev (p)",
                if page.page > 1 { enabled } else { disabled },
            ),
            Span::styled(
                format!("   {} / {}   ", page.page, page.total_pages),
                Style::default().fg(palette.text_primary),
            ),
            Span::styled(
                "Next (n) ›",
                if page.page < page.total_pages {
                    enabled
                } else {
                    disabled
                },
            ),
        ]);
        frame.render_widget(Paragraph::new(line).alignment(Alignment::Center), area);
    }

    fn draw_preview(&self, frame: &mut Frame<'_>, cards: Rect) {
        if !self.browser.state().preview_enabled || !self.preview.is_rendered() {
            return;
        }
        let Some(link) = self
            .preview
            .target()
            .and_then(|key| self.browser.page().items.into_iter().find(|link| link.key() == key))
            .cloned()
        else {
            return;
        };
        let palette = self.palette();
        let fade = if self.preview.is_fading() {
            Modifier::DIM
        } else {
            Modifier::empty()
        };

        let width = (cards.width / 2).max(30).min(cards.width);
        let height = 12.min(cards.height);
        let area = Rect {
            x: cards.x + cards.width - width,
            y: cards.y + cards.height - height,
            width,
            height,
        };
        frame.render_widget(Clear, area);
        let block = Block::default()
            .title(Span::styled(
                " Preview ",
                Style::default().fg(palette.accent).add_modifier(Modifier::BOLD),
            ))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(palette.border_focused))
            .style(Style::default().bg(palette.panel_bg).add_modifier(fade))
            .padding(Padding::horizontal(1));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let text_width = inner.width as usize;
        let mut lines = vec![
            Line::from(Span::styled(
                truncate_to_width(&link.title, text_width),
                Style::default()
                    .fg(palette.text_primary)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                truncate_to_width(&link.url, text_width),
                Style::default().fg(palette.accent),
            )),
        ];
        if let Some(host) = domain::extract(&link.url) {
            lines.push(Line::from(Span::styled(
                truncate_to_width(&host, text_width),
                Style::default().fg(palette.text_secondary),
            )));
        }
        if let Some(image) = link.image.as_deref().filter(|image| !image.is_empty()) {
            lines.push(Line::from(Span::styled(
                truncate_to_width(&format!("Image: {image}"), text_width),
                Style::default().fg(palette.text_secondary),
            )));
        }
        lines.push(Line::default());
        lines.extend(wrap_plain(
            &link.description,
            text_width,
            Style::default().fg(palette.text_secondary),
        ));
        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true });

        let body = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(inner);
        frame.render_widget(paragraph, body[0]);
        frame.render_widget(
            Paragraph::new(Span::styled(
                "Enter to open full site",
                Style::default().fg(palette.text_secondary).add_modifier(Modifier::ITALIC),
            )),
            body[1],
        );
    }

    fn draw_footer(&self, frame: &mut Frame<'_>, area: Rect) {
        let palette = self.palette();
        frame.render_widget(
            Paragraph::new(Span::styled(
                self.footer_text(),
                Style::default().fg(palette.text_secondary),
            )),
            area,
        );
    }

    fn footer_text(&self) -> String {
        let mut parts: Vec<String> = Vec::new();
        if self.search_active {
            parts.push("Search: type to filter".to_string());
            parts.push("Enter/Esc done".to_string());
            parts.push("Ctrl+U clear".to_string());
            return format!(" {}", parts.join(" · "));
        }
        match self.overlay {
            Overlay::Settings => parts.push("Settings: j/k move, Enter change, Esc close".to_string()),
            Overlay::Domains => parts.push(
                "Domains: j/k move, Space toggle, Enter only, a all, Esc close".to_string(),
            ),
            Overlay::Shortcuts => parts.push("Esc or ? to close".to_string()),
            Overlay::None => {
                if !self.status_message.is_empty() {
                    parts.push(self.status_message.clone());
                }
                if self.browser.state().focus.is_focused() {
                    parts.push("Enter open · y share".to_string());
                }
                parts.push("? shortcuts".to_string());
            }
        }
        format!(" {}", parts.join(" · "))
    }

    fn overlay_block(&self, title: &str) -> Block<'static> {
        let palette = self.palette();
        Block::default()
            .title(Span::styled(
                format!(" {title} "),
                Style::default()
                    .fg(palette.accent)
                    .add_modifier(Modifier::BOLD),
            ))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(palette.border_focused))
            .style(Style::default().bg(palette.panel_bg).fg(palette.text_primary))
            .padding(Padding::uniform(1))
    }

    fn draw_settings(&self, frame: &mut Frame<'_>, full: Rect) {
        let palette = self.palette();
        let width = (full.width * 2 / 5).max(40).min(full.width);
        let area = Rect {
            x: full.x + full.width - width,
            y: full.y,
            width,
            height: full.height,
        };
        frame.render_widget(Clear, area);
        let block = self.overlay_block("Settings");
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let prefs = self.prefs.current();
        let mut lines = vec![
            Line::from(Span::styled(
                "Customize your viewing experience",
                Style::default().fg(palette.text_secondary),
            )),
            Line::default(),
        ];
        for (index, row) in SETTINGS_ROWS.iter().enumerate() {
            let (label, options): (&str, Vec<(&str, bool)>) = match row {
                SettingsRow::Theme => (
                    "Theme",
                    [prefs::Theme::Light, prefs::Theme::Dark, prefs::Theme::System]
                        .into_iter()
                        .map(|theme| (theme.label(), theme == prefs.theme))
                        .collect(),
                ),
                SettingsRow::Layout => (
                    "Layout",
                    [prefs::Layout::List, prefs::Layout::Grid, prefs::Layout::Compact]
                        .into_iter()
                        .map(|layout| (layout.label(), layout == prefs.layout))
                        .collect(),
                ),
                SettingsRow::Preview => (
                    "Link previews",
                    vec![("On", prefs.preview_enabled), ("Off", !prefs.preview_enabled)],
                ),
            };
            let selected = index == self.settings_index;
            let row_style = if selected {
                Style::default().bg(palette.selected_bg)
            } else {
                Style::default()
            };
            let mut spans = vec![Span::styled(
                format!("{}{:<14}", if selected { "▶ " } else { "  " }, label),
                row_style.add_modifier(Modifier::BOLD),
            )];
            for (name, active) in options {
                let marker = if active { "●" } else { "○" };
                let style = if active {
                    row_style.fg(palette.accent)
                } else {
                    row_style.fg(palette.text_secondary)
                };
                spans.push(Span::styled(format!("{marker} {name}  "), style));
            }
            let mut line = vec![Line::from(spans)];
            pad_lines_to_width(&mut line, inner.width);
            lines.extend(line);
            lines.push(Line::default());
        }
        lines.push(Line::from(Span::styled(
            format!("Saved to {}", self.prefs_path),
            Style::default().fg(palette.text_secondary).add_modifier(Modifier::ITALIC),
        )));
        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
    }

    fn draw_shortcuts(&self, frame: &mut Frame<'_>, full: Rect) {
        let palette = self.palette();
        let area = centered_rect(70, 80, full);
        frame.render_widget(Clear, area);
        let block = self.overlay_block("Keyboard Shortcuts");
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let rows: Vec<Row> = SHORTCUTS
            .iter()
            .map(|(keys, action)| {
                Row::new(vec![
                    Span::styled(*keys, Style::default().fg(palette.accent)),
                    Span::styled(*action, Style::default().fg(palette.text_primary)),
                ])
            })
            .collect();
        let table = Table::new(rows, [Constraint::Length(16), Constraint::Min(10)]).header(
            Row::new(vec!["Keys", "Action"]).style(
                Style::default()
                    .fg(palette.text_secondary)
                    .add_modifier(Modifier::BOLD),
            ),
        );
        frame.render_widget(table, inner);
    }

    fn draw_domain_picker(&self, frame: &mut Frame<'_>, full: Rect) {
        let palette = self.palette();
        let area = centered_rect(50, 70, full);
        frame.render_widget(Clear, area);
        let block = self.overlay_block("Filter by Domain");
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let filter = &self.browser.state().domains;
        let checkbox = |checked: bool| if checked { "[x]" } else { "[ ]" };
        let mut items = vec![ListItem::new(Line::from(vec![
            Span::styled(
                format!("{} ", checkbox(filter.is_all())),
                Style::default().fg(palette.accent),
            ),
            Span::styled(
                "All Domains",
                Style::default().add_modifier(Modifier::BOLD),
            ),
        ]))];
        items.extend(self.browser.domains().into_iter().map(|domain| {
            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("{} ", checkbox(filter.contains(&domain))),
                    Style::default().fg(palette.accent),
                ),
                Span::raw(domain),
            ]))
        }));

        let list = List::new(items)
            .highlight_style(Style::default().bg(palette.selected_bg))
            .highlight_symbol("▶ ");
        let mut state = ListState::default();
        state.select(Some(self.domain_index));
        frame.render_stateful_widget(list, inner, &mut state);
    }

    fn draw_toast(&self, frame: &mut Frame<'_>, full: Rect) {
        let Some(toast) = &self.toast else {
            return;
        };
        let palette = self.palette();
        let color = match toast.kind {
            ToastKind::Success => palette.success,
            ToastKind::Error => palette.error,
        };
        let width = (UnicodeWidthStr::width(toast.message.as_str()) as u16 + 4).min(full.width);
        let height = 3.min(full.height);
        let area = Rect {
            x: full.x + full.width - width,
            y: full.y + full.height.saturating_sub(height + 1),
            width,
            height,
        };
        frame.render_widget(Clear, area);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(color))
            .style(Style::default().bg(palette.panel_bg));
        let paragraph = Paragraph::new(Span::styled(
            toast.message.clone(),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ))
        .block(block)
        .alignment(Alignment::Center);
        frame.render_widget(paragraph, area);
    }
}

fn domain_summary(filter: &pipeline::DomainFilter) -> String {
    let mut domains = filter.iter();
    match (domains.next(), filter.len()) {
        (None, _) => "All".to_string(),
        (Some(first), 1) => first.to_string(),
        (Some(first), count) => format!("{} +{}", first, count - 1),
    }
}

fn meta_line(link: &Link) -> String {
    let host = domain::extract(&link.url).unwrap_or_else(|| link.url.clone());
    match pipeline::try_parse_date(&link.date) {
        Some(date) => format!("{} · {}", host, date.format("%b %-d, %Y")),
        None => host,
    }
}

fn grid_columns(width: u16) -> usize {
    ((width / GRID_MIN_CARD_WIDTH) as usize).clamp(1, GRID_MAX_COLUMNS)
}

fn truncate_to_width(text: &str, width: usize) -> String {
    if UnicodeWidthStr::width(text) <= width {
        return text.to_string();
    }
    if width == 0 {
        return String::new();
    }
    let mut out = String::new();
    let mut used = 0usize;
    for ch in text.chars() {
        let ch_width = UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + ch_width + 1 > width {
            break;
        }
        out.push(ch);
        used += ch_width;
    }
    out.push('…');
    out
}

fn wrap_plain(text: &str, width: usize, style: Style) -> Vec<Line<'static>> {
    if text.trim().is_empty() {
        return Vec::new();
    }
    if width == 0 {
        return vec![Line::from(Span::styled(text.to_string(), style))];
    }
    let options = WrapOptions::new(width.max(2)).break_words(true);
    wrap(text, options)
        .into_iter()
        .map(|cow| Line::from(Span::styled(cow.into_owned(), style)))
        .collect()
}

fn pad_lines_to_width(lines: &mut [Line<'static>], width: u16) {
    let width = width as usize;
    if width == 0 {
        return;
    }

    for line in lines {
        let mut current_width = 0usize;
        for span in &line.spans {
            current_width =
                current_width.saturating_add(UnicodeWidthStr::width(span.content.as_ref()));
        }
        if current_width >= width {
            continue;
        }
        let pad_style = line.spans.last().map(|span| span.style).unwrap_or_default();
        let padding = " ".repeat(width - current_width);
        line.spans.push(Span::styled(padding, pad_style));
    }
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let percent_x = percent_x.min(100);
    let percent_y = percent_y.min(100);
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage(100 - percent_x - (100 - percent_x) / 2),
        ])
        .split(area);
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage(100 - percent_y - (100 - percent_y) / 2),
        ])
        .split(horizontal[1]);
    vertical[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nav::Focus;
    use crate::prefs::{Layout as CardLayout, MemoryStore, Preferences, Theme};
    use ratatui::backend::TestBackend;
    use std::sync::Arc;

    fn link(title: &str, url: &str, date: &str) -> Link {
        Link {
            title: title.to_string(),
            url: url.to_string(),
            description: format!("About {title}"),
            date: date.to_string(),
            ..Link::default()
        }
    }

    fn sample() -> Vec<Collection> {
        vec![
            Collection {
                title: "Tools".into(),
                source: "tools".into(),
                links: vec![
                    link("Ripgrep", "https://github.com/BurntSushi/ripgrep", "2024-05-01"),
                    link("Helix", "https://helix-editor.com", "2024-03-01"),
                ],
            },
            Collection {
                title: "Reading".into(),
                source: "reading".into(),
                links: vec![link("Essay", "https://www.paulgraham.com/x.html", "2023-01-01")],
            },
        ]
    }

    fn model_with(store: Arc<MemoryStore>) -> Model {
        let mut model = Model::new(Options {
            collections_dir: None,
            page_size: 12,
            ui: config::UIConfig::default(),
            prefs: PreferencesBridge::open(store),
            prefs_path: "~/.config/linkvault/preferences.yaml".into(),
        });
        model.share_targets = Vec::new();
        model.handle_async_response(AsyncResponse::Collections {
            result: Ok(sample()),
        });
        model
    }

    fn model() -> Model {
        model_with(Arc::new(MemoryStore::default()))
    }

    fn press(model: &mut Model, code: KeyCode, now: Instant) -> bool {
        model
            .handle_key(KeyEvent::new(code, KeyModifiers::NONE), now)
            .unwrap()
    }

    fn render(model: &Model) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 40)).unwrap();
        terminal.draw(|frame| model.draw(frame)).unwrap();
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn search_mode_captures_navigation_keys() {
        let mut model = model();
        let now = Instant::now();
        model
            .handle_key(KeyEvent::new(KeyCode::Char('p'), KeyModifiers::CONTROL), now)
            .unwrap();
        assert!(model.search_active);
        for ch in "kjq".chars() {
            assert!(!press(&mut model, KeyCode::Char(ch), now));
        }
        assert_eq!(model.browser.state().search, "kjq");
        assert_eq!(model.browser.state().focus, Focus::Unfocused);
        press(&mut model, KeyCode::Esc, now);
        assert!(!model.search_active);
        assert!(press(&mut model, KeyCode::Char('q'), now));
    }

    #[test]
    fn focus_drives_preview_timer() {
        let mut model = model();
        let now = Instant::now();
        press(&mut model, KeyCode::Char('k'), now);
        assert_eq!(model.browser.state().focus, Focus::Focused(0));
        assert!(!model.preview.is_rendered());
        model.tick(now + Duration::from_millis(400));
        assert!(model.preview.is_rendered());

        press(&mut model, KeyCode::Esc, now + Duration::from_millis(500));
        assert!(!model.preview.is_rendered());
        assert_eq!(model.browser.state().focus, Focus::Unfocused);
    }

    #[test]
    fn disabled_previews_never_show() {
        let store = Arc::new(MemoryStore::with(Preferences {
            preview_enabled: false,
            ..Preferences::default()
        }));
        let mut model = model_with(store);
        let now = Instant::now();
        press(&mut model, KeyCode::Char('k'), now);
        model.tick(now + Duration::from_secs(1));
        assert!(!model.preview.is_rendered());
    }

    #[test]
    fn preference_changes_are_saved() {
        let store = Arc::new(MemoryStore::default());
        let mut model = model_with(store.clone());
        let now = Instant::now();
        press(&mut model, KeyCode::Char('v'), now);
        press(&mut model, KeyCode::Char('t'), now);
        press(&mut model, KeyCode::Char('w'), now);
        let saved = store.saved().unwrap();
        assert_eq!(saved.layout, CardLayout::Grid);
        assert_eq!(saved.theme, Theme::Light);
        assert!(!saved.preview_enabled);
        assert_eq!(model.browser.state().layout, CardLayout::Grid);
    }

    #[test]
    fn collection_tabs_reset_focus() {
        let mut model = model();
        let now = Instant::now();
        press(&mut model, KeyCode::Char('k'), now);
        press(&mut model, KeyCode::Tab, now);
        assert_eq!(
            model.browser.state().collection,
            CollectionSelection::Index(0)
        );
        assert_eq!(model.browser.state().focus, Focus::Unfocused);
        assert_eq!(model.browser.page().total, 2);
    }

    #[test]
    fn domain_picker_selects_only_one_domain() {
        let mut model = model();
        let now = Instant::now();
        press(&mut model, KeyCode::Char('f'), now);
        assert_eq!(model.overlay, Overlay::Domains);
        press(&mut model, KeyCode::Char('k'), now);
        press(&mut model, KeyCode::Enter, now);
        assert_eq!(model.overlay, Overlay::None);
        assert_eq!(model.browser.state().domains.len(), 1);
        assert_eq!(model.browser.page().total, 1);

        press(&mut model, KeyCode::Char('f'), now);
        press(&mut model, KeyCode::Char('a'), now);
        assert!(model.browser.state().domains.is_all());
        press(&mut model, KeyCode::Esc, now);
        assert_eq!(model.overlay, Overlay::None);
    }

    #[test]
    fn share_without_targets_shows_error_toast() {
        let mut model = model();
        let now = Instant::now();
        press(&mut model, KeyCode::Char('k'), now);
        press(&mut model, KeyCode::Char('y'), now);
        let toast = model.toast.clone().unwrap();
        assert_eq!(toast.kind, ToastKind::Error);
        assert!(model.tick(now + Duration::from_secs(3)));
        assert!(model.toast.is_none());
    }

    #[test]
    fn renders_every_layout() {
        let mut model = model();
        let now = Instant::now();
        for _ in 0..3 {
            press(&mut model, KeyCode::Char('k'), now);
            let screen = render(&model);
            assert!(screen.contains("3 results in All"), "{screen}");
            assert!(screen.contains("Ripgrep"));
            press(&mut model, KeyCode::Char('v'), now);
        }
    }

    #[test]
    fn renders_overlays_without_panicking() {
        let mut model = model();
        let now = Instant::now();
        press(&mut model, KeyCode::Char('?'), now);
        assert!(render(&model).contains("Keyboard Shortcuts"));
        press(&mut model, KeyCode::Char('?'), now);
        press(&mut model, KeyCode::Char(','), now);
        assert!(render(&model).contains("Customize your viewing experience"));
        press(&mut model, KeyCode::Esc, now);
        press(&mut model, KeyCode::Char('f'), now);
        assert!(render(&model).contains("All Domains"));
    }

    #[test]
    fn truncates_by_display_width() {
        assert_eq!(truncate_to_width("short", 10), "short");
        assert_eq!(truncate_to_width("abcdefgh", 5), "abcd…");
        assert_eq!(truncate_to_width("日本語テキスト", 7), "日本語…");
        assert_eq!(truncate_to_width("anything", 0), "");
    }

    #[test]
    fn domain_summary_lists_first_selection() {
        let mut filter = pipeline::DomainFilter::all();
        assert_eq!(domain_summary(&filter), "All");
        filter.toggle("a.io");
        assert_eq!(domain_summary(&filter), "a.io");
        filter.toggle("b.io");
        assert_eq!(domain_summary(&filter), "a.io +1");
    }

    #[test]
    fn grid_columns_follow_width() {
        assert_eq!(grid_columns(20), 1);
        assert_eq!(grid_columns(80), 2);
        assert_eq!(grid_columns(200), 3);
    }

    #[test]
    fn pad_lines_to_width_extends_lines() {
        let mut lines = vec![Line::from("abc"), Line::from("")];
        pad_lines_to_width(&mut lines, 5);
        assert_eq!(UnicodeWidthStr::width(lines[0].spans[1].content.as_ref()), 2);
        assert_eq!(UnicodeWidthStr::width(lines[1].spans[0].content.as_ref()), 5);
    }

    #[test]
    fn centered_rect_stays_inside_area() {
        let area = Rect::new(0, 0, 100, 40);
        let rect = centered_rect(50, 50, area);
        assert_eq!(rect.width, 50);
        assert_eq!(rect.height, 20);
        assert!(rect.x >= area.x && rect.y >= area.y);
    }
}
