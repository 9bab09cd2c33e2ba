use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Position},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};
use std::{
    env,
    io::stdout,
    path::PathBuf,
    process,
    time::{Duration, Instant},
};
use storydeck_config::Config;
use storydeck_engine::{Deck, FollowSync, SyncTiming, io, sync};

struct App {
    deck_path: PathBuf,
    buffer: String,
    cursor: usize,
    sync: FollowSync,
    dirty: bool,
    status: String,
    should_quit: bool,
}

impl App {
    fn new(deck_path: PathBuf, timing: SyncTiming) -> Result<Self> {
        let buffer = io::load_text(&deck_path)?;
        let sync = FollowSync::new(buffer.as_str(), timing);

        Ok(Self {
            deck_path,
            buffer,
            cursor: 0,
            sync,
            dirty: false,
            status: String::from("follow: on"),
            should_quit: false,
        })
    }

    fn insert(&mut self, c: char, now: Instant) {
        self.buffer.insert(self.cursor, c);
        self.cursor += c.len_utf8();
        self.dirty = true;
        self.sync.notify_text_changed(self.buffer.as_str(), now);
        self.sync.notify_cursor_moved(self.cursor, now);
    }

    fn backspace(&mut self, now: Instant) {
        if let Some((start, _)) = self.buffer[..self.cursor].char_indices().next_back() {
            self.buffer.remove(start);
            self.cursor = start;
            self.dirty = true;
            self.sync.notify_text_changed(self.buffer.as_str(), now);
            self.sync.notify_cursor_moved(self.cursor, now);
        }
    }

    fn move_cursor_left(&mut self, now: Instant) {
        if let Some((start, _)) = self.buffer[..self.cursor].char_indices().next_back() {
            self.cursor = start;
            self.sync.notify_cursor_moved(self.cursor, now);
        }
    }

    fn move_cursor_right(&mut self, now: Instant) {
        if let Some(c) = self.buffer[self.cursor..].chars().next() {
            self.cursor += c.len_utf8();
            self.sync.notify_cursor_moved(self.cursor, now);
        }
    }

    fn move_cursor_line(&mut self, down: bool, now: Instant) {
        let (line, col) = cursor_line_col(&self.buffer, self.cursor);
        if !down && line == 0 {
            return;
        }
        let target_line = if down { line + 1 } else { line - 1 };
        if let Some(offset) = offset_at_line_col(&self.buffer, target_line, col) {
            self.cursor = offset;
            self.sync.notify_cursor_moved(self.cursor, now);
        }
    }

    fn navigate(&mut self, direction: sync::Direction) {
        let index = self.sync.navigate(direction);
        self.status = format!("page {} (follow: off)", index + 1);
    }

    fn enable_follow(&mut self) {
        self.sync.set_follow(true);
        self.status = String::from("follow: on");
    }

    fn save(&mut self) {
        match io::save_text(&self.deck_path, &self.buffer) {
            Ok(()) => {
                self.dirty = false;
                self.status = format!("saved {}", self.deck_path.display());
            }
            Err(e) => self.status = format!("save failed: {e}"),
        }
    }
}

/// Line and column (in characters) of a byte offset in `text`.
fn cursor_line_col(text: &str, offset: usize) -> (usize, usize) {
    let before = &text[..offset];
    let line = before.matches('\n').count();
    let col = before
        .rsplit_once('\n')
        .map_or(before, |(_, tail)| tail)
        .chars()
        .count();
    (line, col)
}

/// Byte offset of character column `col` on `line`, clamped to line end.
/// `None` when the line does not exist.
fn offset_at_line_col(text: &str, line: usize, col: usize) -> Option<usize> {
    let mut start = 0;
    for _ in 0..line {
        start += text[start..].find('\n')? + 1;
    }
    let line_text = &text[start..];
    let line_end = line_text.find('\n').unwrap_or(line_text.len());
    let within = &line_text[..line_end];
    let byte_col = within
        .char_indices()
        .nth(col)
        .map_or(line_end, |(i, _)| i);
    Some(start + byte_col)
}

fn main() -> Result<()> {
    // Determine deck path from CLI args or config file
    let args: Vec<String> = env::args().collect();
    let config_path = Config::config_path();

    let deck_path;
    let timing;

    if args.len() == 2 {
        deck_path = PathBuf::from(&args[1]);
        timing = SyncTiming::default();
    } else if args.len() == 1 {
        match Config::load() {
            Ok(Some(config)) => {
                timing = config.sync_timing();
                deck_path = config.deck_path;
            }
            Ok(None) => {
                eprintln!("Error: No deck path provided and no config file found");
                eprintln!("Usage: {} <deck-file.json>", args[0]);
                eprintln!("Or create a config file at {}", config_path.display());
                process::exit(1);
            }
            Err(e) => {
                eprintln!("Error: Failed to load config file: {e}");
                eprintln!("Usage: {} <deck-file.json>", args[0]);
                process::exit(1);
            }
        }
    } else {
        eprintln!("Usage: {} [deck-file.json]", args[0]);
        process::exit(1);
    };

    // Create app before touching the terminal so load errors print cleanly
    let mut app = match App::new(deck_path, timing) {
        Ok(app) => app,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    };

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{err:?}");
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()>
where
    B::Error: Send + Sync + 'static,
{
    loop {
        terminal.draw(|f| ui(f, app))?;

        // Sleep until the next debounce deadline so fires are timely
        // without busy-waiting.
        let timeout = app
            .sync
            .next_deadline()
            .map(|at| at.saturating_duration_since(Instant::now()))
            .unwrap_or(Duration::from_millis(250));

        if event::poll(timeout)?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            let now = Instant::now();
            let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
            match key.code {
                KeyCode::Esc => app.should_quit = true,
                KeyCode::Char('s') if ctrl => app.save(),
                KeyCode::Char('n') if ctrl => app.navigate(sync::Direction::Next),
                KeyCode::Char('p') if ctrl => app.navigate(sync::Direction::Prev),
                KeyCode::Char('f') if ctrl => app.enable_follow(),
                KeyCode::Char(c) if !ctrl => app.insert(c, now),
                KeyCode::Enter => app.insert('\n', now),
                KeyCode::Backspace => app.backspace(now),
                KeyCode::Left => app.move_cursor_left(now),
                KeyCode::Right => app.move_cursor_right(now),
                KeyCode::Up => app.move_cursor_line(false, now),
                KeyCode::Down => app.move_cursor_line(true, now),
                _ => {}
            }
        }

        app.sync.poll(Instant::now());

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let outer = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)].as_ref())
        .split(f.area());

    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)].as_ref())
        .split(outer[0]);

    // Editor pane: raw deck JSON with the terminal cursor on the edit point
    let (line, col) = cursor_line_col(&app.buffer, app.cursor);
    let inner_height = panes[0].height.saturating_sub(2) as usize;
    let scroll = line.saturating_sub(inner_height.saturating_sub(1)) as u16;

    let title = if app.dirty {
        format!("{} *", app.deck_path.display())
    } else {
        app.deck_path.display().to_string()
    };
    let editor = Paragraph::new(app.buffer.as_str())
        .block(Block::default().borders(Borders::ALL).title(title))
        .scroll((scroll, 0));
    f.render_widget(editor, panes[0]);
    f.set_cursor_position(Position::new(
        panes[0].x + 1 + col as u16,
        panes[0].y + 1 + (line as u16 - scroll),
    ));

    // Preview pane: page list with the active page highlighted, plus a
    // best-effort render of the active page when the buffer parses.
    let preview_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)].as_ref())
        .split(panes[1]);

    let deck = Deck::from_json(&app.buffer).ok();
    let active = app.sync.active_index();

    let page_items: Vec<ListItem> = (0..app.sync.spans().len())
        .map(|i| {
            let name = deck
                .as_ref()
                .and_then(|d| d.page(i))
                .map(|p| p.display_name().to_string())
                .unwrap_or_else(|| format!("page {}", i + 1));
            ListItem::new(vec![Line::from(format!("{:>2}. {}", i + 1, name))])
        })
        .collect();

    let mut list_state = ListState::default();
    if !page_items.is_empty() {
        list_state.select(Some(active.min(page_items.len() - 1)));
    }
    let pages_list = List::new(page_items)
        .block(Block::default().borders(Borders::ALL).title("Pages"))
        .highlight_style(Style::default().bg(Color::Yellow).fg(Color::Black));
    f.render_stateful_widget(pages_list, preview_chunks[0], &mut list_state);

    let preview_lines = match deck.as_ref().and_then(|d| d.page(active)) {
        Some(page) => {
            let mut lines = vec![Line::from(vec![
                Span::raw("id: "),
                Span::styled(page.id.clone(), Style::default().fg(Color::Cyan)),
            ])];
            if let Some(title) = &page.title {
                lines.push(Line::from(format!("title: {title}")));
            }
            if let Some(theme) = &page.theme {
                lines.push(Line::from(format!(
                    "theme: bg {} / accent {}",
                    theme.background.as_deref().unwrap_or("-"),
                    theme.accent.as_deref().unwrap_or("-"),
                )));
            }
            if let Some(body) = &page.body {
                lines.push(Line::from(String::new()));
                lines.extend(body.lines().map(|l| Line::from(l.to_string())));
            }
            lines
        }
        None => vec![Line::from("Preview unavailable while editing")],
    };
    let preview = Paragraph::new(preview_lines)
        .block(Block::default().borders(Borders::ALL).title("Preview"))
        .wrap(ratatui::widgets::Wrap { trim: true });
    f.render_widget(preview, preview_chunks[1]);

    // Status line
    let help = Line::from(vec![
        Span::raw(format!("{} | ", app.status)),
        Span::raw("Esc: Quit | ^S: Save | ^N/^P: Next/Prev page | ^F: Follow cursor"),
    ]);
    f.render_widget(Paragraph::new(vec![help]), outer[1]);
}
