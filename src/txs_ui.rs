use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use rand::SeedableRng;
use rand::rngs::StdRng;
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Span, Spans, Text};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::{Frame, Terminal};
use std::error::Error;
use std::io;
use std::time::Duration;
use tracing::{debug, info, warn};
use unicode_width::UnicodeWidthStr;

use crate::txs_board::{Board, PlayStatus};
use crate::txs_color::{Depth, Palette};
use crate::txs_game::{Config, GameSettings};
use crate::txs_input::{
    MenuChoice, Mode, SettingField, SquareChoice, check_console_width, column_letter, parse_menu,
    parse_mode, parse_setting, parse_square,
};
use crate::txs_lang::{Lang, fill};

// Longest line the prompt accepts
const MAX_INPUT: usize = 32;

/// Which prompt the console is showing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Screen {
    Menu,
    Settings(SettingField),
    ChooseSquare,
    ChooseMode { row: isize, col: isize },
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NoticeKind {
    Info,
    Warn,
    Error,
}

/// Console controller state: the current board, prompt and typed line
pub struct App {
    lang: Lang,
    palette: Palette,
    defaults: GameSettings,       // settings for "Create new game"
    draft: GameSettings,          // values typed on the settings prompts
    rng: Option<StdRng>, // seeded games only, otherwise thread_rng
    board: Option<Board>,
    screen: Screen,
    input: String,
    notice: Option<(NoticeKind, String)>,
    chosen: Option<(usize, usize)>, // last square picked, highlighted on the board
    scroll: usize,                  // first board row on screen
    exit: bool,
}

impl App {
    pub fn new(cfg: &Config, lang: Lang, palette: Palette) -> Self {
        let rng = cfg.seed.map(StdRng::seed_from_u64);
        App {
            lang,
            palette,
            defaults: cfg.game,
            draft: cfg.game,
            rng,
            board: None,
            screen: Screen::Menu,
            input: String::new(),
            notice: None,
            chosen: None,
            scroll: 0,
            exit: false,
        }
    }

    fn error(&mut self, msg: String) {
        self.notice = Some((NoticeKind::Error, msg));
    }

    // malformed input, as opposed to a move the board refused
    fn warn(&mut self, msg: String) {
        self.notice = Some((NoticeKind::Warn, msg));
    }

    fn back_to_menu(&mut self) {
        self.board = None;
        self.chosen = None;
        self.scroll = 0;
        self.screen = Screen::Menu;
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        // any key leaves the result screen
        if self.screen == Screen::Finished {
            self.notice = None;
            self.back_to_menu();
            return;
        }
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => self.exit = true,
            KeyCode::Char(c) => {
                if self.input.chars().count() < MAX_INPUT {
                    self.input.push(c);
                }
            }
            KeyCode::Backspace => {
                self.input.pop();
            }
            KeyCode::Enter => {
                let line = std::mem::take(&mut self.input);
                self.submit_line(&line);
            }
            KeyCode::Esc => self.escape(),
            _ => {}
        }
    }

    // Esc steps back one prompt; on the main menu it exits
    fn escape(&mut self) {
        self.input.clear();
        self.notice = None;
        match self.screen {
            Screen::Menu => self.exit = true,
            Screen::Settings(_) | Screen::ChooseSquare | Screen::Finished => self.back_to_menu(),
            Screen::ChooseMode { .. } => self.screen = Screen::ChooseSquare,
        }
    }

    /// Handle one submitted prompt line
    pub fn submit_line(&mut self, line: &str) {
        self.notice = None;
        match self.screen {
            Screen::Menu => self.on_menu(line),
            Screen::Settings(field) => self.on_setting(field, line),
            Screen::ChooseSquare => self.on_square(line),
            Screen::ChooseMode { row, col } => self.on_mode(row, col, line),
            Screen::Finished => self.back_to_menu(),
        }
    }

    fn on_menu(&mut self, line: &str) {
        match parse_menu(line) {
            Ok(MenuChoice::Exit) => self.exit = true,
            Ok(MenuChoice::NewGame) => {
                self.start_game(self.defaults);
            }
            Ok(MenuChoice::Settings) => {
                self.draft = self.defaults;
                self.screen = Screen::Settings(SettingField::Height);
            }
            Err(e) => {
                debug!(error = %e, "menu input rejected");
                self.warn(self.lang.menu_error(&e));
            }
        }
    }

    fn on_setting(&mut self, field: SettingField, line: &str) {
        let value = match parse_setting(line) {
            Ok(v) => v,
            Err(e) => {
                debug!(error = %e, ?field, "setting rejected");
                self.warn(self.lang.setting_error(&e, field));
                return;
            }
        };
        match field {
            SettingField::Height => self.draft.height = value,
            SettingField::Width => {
                self.draft.width = value;
                if let Err(e) = check_console_width(&self.draft) {
                    self.error(self.lang.setting_error(&e, field));
                    return;
                }
            }
            SettingField::Mines => self.draft.mine_count = value,
        }
        match field.next() {
            Some(next) => self.screen = Screen::Settings(next),
            None => {
                // start over on a rejected board so every value can be corrected
                if !self.start_game(self.draft) {
                    self.screen = Screen::Settings(SettingField::Height);
                }
            }
        }
    }

    fn start_game(&mut self, settings: GameSettings) -> bool {
        if let Err(e) = check_console_width(&settings) {
            warn!(error = %e, "settings rejected");
            self.error(self.lang.setting_error(&e, SettingField::Width));
            return false;
        }
        let built = match self.rng.as_mut() {
            Some(rng) => settings.build_board(rng),
            None => Board::new(settings.height, settings.width, settings.mine_count),
        };
        match built {
            Ok(board) => {
                info!(?settings, "game started");
                self.board = Some(board);
                self.chosen = None;
                self.scroll = 0;
                self.screen = Screen::ChooseSquare;
                true
            }
            Err(e) => {
                warn!(error = %e, ?settings, "board rejected");
                self.error(self.lang.board_error(&e));
                false
            }
        }
    }

    fn on_square(&mut self, line: &str) {
        let (row, col) = match parse_square(line) {
            Ok(SquareChoice::Back) => {
                self.back_to_menu();
                return;
            }
            Ok(SquareChoice::At { row, col }) => (row, col),
            Err(e) => {
                debug!(error = %e, "square rejected");
                self.warn(self.lang.play_error(&e, false));
                return;
            }
        };
        let checked = match self.board.as_ref() {
            Some(board) => board.square(row, col).map(|_| ()),
            None => {
                self.back_to_menu();
                return;
            }
        };
        match checked {
            Ok(()) => {
                self.chosen = Some((row as usize, col as usize));
                self.screen = Screen::ChooseMode { row, col };
            }
            Err(e) => self.error(self.lang.board_error(&e)),
        }
    }

    fn on_mode(&mut self, row: isize, col: isize, line: &str) {
        let mode = match parse_mode(line) {
            Ok(m) => m,
            Err(e) => {
                self.warn(self.lang.play_error(&e, true));
                return;
            }
        };
        let Some(board) = self.board.as_mut() else {
            self.back_to_menu();
            return;
        };
        let outcome = match mode {
            Mode::Open => board.open_square(row, col),
            // flags can only change while the game is running
            Mode::ToggleFlag => board.toggle_flag(row, col).map(|_| PlayStatus::Normal),
        };
        match outcome {
            Ok(PlayStatus::Normal) => self.screen = Screen::ChooseSquare,
            Ok(_) => self.finish(),
            Err(e) => {
                debug!(error = %e, row, col, ?mode, "move rejected");
                self.error(self.lang.board_error(&e));
                self.screen = Screen::ChooseSquare;
            }
        }
    }

    fn finish(&mut self) {
        let Some(board) = self.board.as_mut() else {
            self.back_to_menu();
            return;
        };
        let a = &self.lang.assets;
        let notice = match board.status() {
            PlayStatus::Lose => {
                board.reveal_mines();
                (NoticeKind::Error, a.loss_message.to_string())
            }
            PlayStatus::Win => (NoticeKind::Info, a.win_message.to_string()),
            PlayStatus::Normal => return,
        };
        info!(status = ?board.status(), "game finished");
        self.notice = Some(notice);
        self.screen = Screen::Finished;
    }

    fn prompt(&self) -> String {
        let a = &self.lang.assets;
        match self.screen {
            Screen::Menu => a.menu_prompt.to_string(),
            Screen::Settings(field) => fill(a.setting_prompt_fmt, &[&self.lang.field_name(field)]),
            Screen::ChooseSquare => a.square_prompt.to_string(),
            Screen::ChooseMode { .. } => a.mode_prompt.to_string(),
            Screen::Finished => a.any_key.to_string(),
        }
    }
}

/// Keep `row` inside a window of `visible` rows starting at `scroll`
fn follow_row(scroll: usize, row: usize, visible: usize) -> usize {
    if visible == 0 || row < scroll {
        row
    } else if row >= scroll + visible {
        row + 1 - visible
    } else {
        scroll
    }
}

/// Width of the row-number column
fn label_width(h: usize) -> usize {
    h.saturating_sub(1).to_string().len()
}

/// Column letters, then one line per visible row
fn board_lines(
    board: &Board,
    palette: &Palette,
    chosen: Option<(usize, usize)>,
    scroll: usize,
    visible: usize,
) -> Vec<Spans<'static>> {
    let (h, w) = board.size();
    let lw = label_width(h);
    let label_style = Style::default().fg(palette.label_fg).add_modifier(Modifier::BOLD);

    let mut header = vec![Span::raw(" ".repeat(lw + 1))];
    for c in 0..w {
        let letter = column_letter(c).unwrap_or(' ');
        header.push(Span::styled(format!(" {}", letter), label_style));
    }
    let mut lines = vec![Spans::from(header)];

    for r in scroll..(scroll + visible).min(h) {
        let mut spans = vec![Span::styled(format!("{:>lw$} ", r, lw = lw), label_style)];
        for c in 0..w {
            let Ok(sq) = board.square(r as isize, c as isize) else {
                continue;
            };
            let (s, fg) = palette.glyph(sq);
            let bg = if chosen == Some((r, c)) {
                palette.highlight_bg
            } else {
                palette.board_bg
            };
            spans.push(Span::styled(format!(" {}", s), Style::default().fg(fg).bg(bg)));
        }
        // right-side padding in the board background
        spans.push(Span::styled(" ", Style::default().bg(palette.board_bg)));
        lines.push(Spans::from(spans));
    }
    lines
}

fn draw<B: Backend>(f: &mut Frame<B>, app: &mut App) {
    let size = f.size();
    let board_w = app
        .board
        .as_ref()
        .map(|b| (label_width(b.size().0) + 2 + b.size().1 * 2 + 3) as u16)
        .unwrap_or(0);
    let min_twidth = board_w.max(64);
    let min_theight = 14u16;
    let a = app.lang.assets.clone();

    // If terminal too small, render a centered warning and skip normal UI
    if size.width < min_twidth || size.height < min_theight {
        let warn_lines = vec![
            Spans::from(Span::raw(a.tsmsg_line1)),
            Spans::from(Span::raw(fill(a.tsmsg_line2, &[&min_twidth, &min_theight]))),
        ];
        let warn = Paragraph::new(Text::from(warn_lines))
            .block(Block::default().borders(Borders::ALL).title(a.tsmsg_title))
            .alignment(Alignment::Center);
        f.render_widget(Clear, size);
        let w = 40u16.min(size.width);
        let h = 4u16.min(size.height);
        f.render_widget(warn, center_rect(w, h, size));
        return;
    }

    // layout: title/status row, center board or menu, bottom prompt
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(0)
        .constraints([Constraint::Length(3), Constraint::Min(6), Constraint::Length(5)].as_ref())
        .split(size);

    // status row
    let status_text = match app.board.as_ref() {
        Some(b) => {
            let (h, w) = b.size();
            fill(
                a.status_fmt,
                &[&b.mines_left(), &b.opened_count(), &(h * w - b.mine_count())],
            )
        }
        None => String::new(),
    };
    let status = Paragraph::new(Spans::from(Span::raw(status_text)))
        .block(Block::default().borders(Borders::ALL).title(a.title))
        .alignment(Alignment::Left);
    f.render_widget(status, chunks[0]);

    // board or menu
    match app.board.as_ref() {
        Some(board) => {
            let (h, w) = board.size();
            let visible = (chunks[1].height.saturating_sub(3) as usize).max(1);
            if let Some((row, _)) = app.chosen {
                app.scroll = follow_row(app.scroll, row, visible);
            }
            let lines = board_lines(board, &app.palette, app.chosen, app.scroll, visible);
            let shown = lines.len() as u16;
            let title = fill(a.board_title_fmt, &[&h, &w, &board.mine_count()]);
            let area = center_rect(board_w, shown + 2, chunks[1]);
            let paragraph = Paragraph::new(Text::from(lines))
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .title(title)
                        .title_alignment(Alignment::Center),
                )
                .alignment(Alignment::Left);
            f.render_widget(paragraph, area);
        }
        None => {
            let mut items: Vec<String> = vec![
                a.menu_exit.to_string(),
                a.menu_new.to_string(),
                a.menu_settings.to_string(),
            ];
            if let Screen::Settings(current) = app.screen {
                items.push(String::new());
                let draft = app.draft;
                let mut field = Some(SettingField::Height);
                while let Some(fld) = field {
                    if fld == current {
                        break;
                    }
                    let value = match fld {
                        SettingField::Height => draft.height,
                        SettingField::Width => draft.width,
                        SettingField::Mines => draft.mine_count,
                    };
                    items.push(format!("{}: {}", app.lang.field_name(fld), value));
                    field = fld.next();
                }
            }
            let inner_w = items.iter().map(|s| s.as_str().width()).max().unwrap_or(0) as u16;
            let area = center_rect(inner_w + 4, items.len() as u16 + 2, chunks[1]);
            let lines: Vec<Spans> = items
                .into_iter()
                .map(|s| Spans::from(Span::raw(format!(" {}", s))))
                .collect();
            let menu = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
            f.render_widget(menu, area);
        }
    }

    // notice, prompt and the typed line
    let mut lines = vec![];
    match &app.notice {
        Some((kind, msg)) => {
            let fg = match kind {
                NoticeKind::Info => app.palette.label_fg,
                NoticeKind::Warn => app.palette.warn_fg,
                NoticeKind::Error => app.palette.error_fg,
            };
            lines.push(Spans::from(Span::styled(
                msg.clone(),
                Style::default().fg(fg).add_modifier(Modifier::BOLD),
            )));
        }
        None => lines.push(Spans::from(Span::raw(""))),
    }
    lines.push(Spans::from(Span::raw(app.prompt())));
    let input_line = format!("> {}", app.input);
    let cursor_x = chunks[2].x + 1 + input_line.as_str().width() as u16;
    lines.push(Spans::from(Span::raw(input_line)));
    let prompt = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
    f.render_widget(prompt, chunks[2]);
    if app.screen != Screen::Finished {
        f.set_cursor(cursor_x, chunks[2].y + 3);
    }
}

fn event_loop<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let tick_rate = Duration::from_millis(200);
    while !app.exit {
        terminal.draw(|f| draw(f, app))?;
        if event::poll(tick_rate)? {
            if let Event::Key(key) = event::read()? {
                app.handle_key(key);
            }
        }
    }
    Ok(())
}

pub fn run(cfg: &Config, lang: Lang) -> Result<(), Box<dyn Error>> {
    let palette = Palette::new(cfg.ascii_icons, Depth::detect());
    let mut app = App::new(cfg, lang, palette);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = event_loop(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), terminal::LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    info!("exit");
    res
}

fn center_rect(width: u16, height: u16, r: Rect) -> Rect {
    let width = width.min(r.width);
    let height = height.min(r.height);
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}
