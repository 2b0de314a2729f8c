use std::{io, thread, time::Duration};

use anyhow::{Context, Result};
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        MouseButton, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use pairmatch_core::{
    CardKind, CardStatus, CardView, GameEvent, GameSnapshot, LessonTab, MatchGame, TimerEvent,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Wrap},
    Frame, Terminal,
};
use tokio::sync::mpsc;
use tracing::{error, info};

const POLL_RATE: Duration = Duration::from_millis(250);

#[derive(Debug, Clone)]
struct Theme {
    primary_fg: Color,
    accent: Color,
    accent_alt: Color,
    muted: Color,
    success: Color,
    danger: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            primary_fg: Color::White,
            accent: Color::Cyan,
            accent_alt: Color::Magenta,
            muted: Color::DarkGray,
            success: Color::Green,
            danger: Color::Red,
        }
    }
}

enum AppEvent {
    Input(Event),
    Tick,
}

/// Terminal frontend for the matching game.
pub struct PairMatchApp {
    game: MatchGame,
    columns: usize,
    cursor: usize,
    status: String,
    should_quit: bool,
    card_areas: Vec<Rect>,
    timer_rx: Option<mpsc::Receiver<TimerEvent>>,
    theme: Theme,
}

impl PairMatchApp {
    pub fn new(game: MatchGame, columns: usize) -> Self {
        Self {
            game,
            columns: columns.max(1),
            cursor: 0,
            status: "Pick two cards that belong together".to_string(),
            should_quit: false,
            card_areas: Vec::new(),
            timer_rx: None,
            theme: Theme::default(),
        }
    }

    pub fn attach_timers(&mut self, receiver: mpsc::Receiver<TimerEvent>) {
        self.timer_rx = Some(receiver);
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut stdout = io::stdout();
        enable_raw_mode().context("failed to enter raw mode")?;
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)
            .context("failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).context("failed to create terminal")?;
        terminal.hide_cursor()?;
        terminal.clear()?;

        let (event_tx, mut event_rx) = mpsc::channel::<AppEvent>(128);
        spawn_input_thread(event_tx);

        let mut timer_rx = self.timer_rx.take();
        info!(lesson = %self.game.snapshot().lesson_title, "Game started");

        loop {
            terminal.draw(|frame| self.draw(frame))?;
            if self.should_quit {
                break;
            }

            if let Some(rx) = timer_rx.as_mut() {
                let mut timers_closed = false;
                tokio::select! {
                    maybe_event = event_rx.recv() => {
                        if !self.process_app_event(maybe_event) {
                            break;
                        }
                    }
                    maybe_timer = rx.recv() => {
                        match maybe_timer {
                            Some(event) => self.game.handle_timer(event),
                            None => timers_closed = true,
                        }
                    }
                }
                if timers_closed {
                    timer_rx = None;
                }
            } else {
                let maybe_event = event_rx.recv().await;
                if !self.process_app_event(maybe_event) {
                    break;
                }
            }

            if self.should_quit {
                break;
            }
        }

        restore_terminal(&mut terminal)?;
        Ok(())
    }

    fn process_app_event(&mut self, maybe_event: Option<AppEvent>) -> bool {
        match maybe_event {
            Some(AppEvent::Input(event)) => {
                self.handle_input(event);
                true
            }
            Some(AppEvent::Tick) => true,
            None => false,
        }
    }

    fn handle_input(&mut self, event: Event) {
        match event {
            Event::Key(key) => self.handle_key(key),
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            _ => {}
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        let card_count = self.game.engine().session().deck().len();
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => {
                self.should_quit = true;
            }
            KeyCode::Left | KeyCode::Char('h') => {
                self.cursor = move_cursor(self.cursor, card_count, self.columns, -1, 0);
            }
            KeyCode::Right | KeyCode::Char('l') => {
                self.cursor = move_cursor(self.cursor, card_count, self.columns, 1, 0);
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.cursor = move_cursor(self.cursor, card_count, self.columns, 0, -1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.cursor = move_cursor(self.cursor, card_count, self.columns, 0, 1);
            }
            KeyCode::Enter | KeyCode::Char(' ') => self.click_cursor(),
            KeyCode::Char('r') | KeyCode::Char('R') => {
                self.dispatch(GameEvent::ResetRequested);
                self.status = "Cards reshuffled".to_string();
            }
            KeyCode::Char('n') | KeyCode::Char('N') => {
                if self.game.engine().is_lesson_complete() {
                    self.dispatch(GameEvent::NextLesson);
                } else {
                    self.status = "Finish this lesson first".to_string();
                }
            }
            KeyCode::Char(ch) if ch.is_ascii_digit() && ch != '0' => {
                let index = (ch as u8 - b'1') as usize;
                self.dispatch(GameEvent::LessonSelected(index));
            }
            _ => {}
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
            return;
        }
        if let Some(index) = card_at(&self.card_areas, mouse.column, mouse.row) {
            self.cursor = index;
            self.click_cursor();
        }
    }

    fn click_cursor(&mut self) {
        let card_id = self
            .game
            .engine()
            .session()
            .deck()
            .cards()
            .get(self.cursor)
            .map(|card| card.id.clone());
        if let Some(card_id) = card_id {
            self.dispatch(GameEvent::CardClicked(card_id));
        }
    }

    fn dispatch(&mut self, event: GameEvent) {
        let lesson_before = self.game.engine().session().lesson_index();
        if let Err(err) = self.game.handle(event) {
            error!(?err, "Game event rejected");
            self.status = format!("Error: {err}");
            return;
        }

        let session = self.game.engine().session();
        if session.lesson_index() != lesson_before {
            self.status = format!("Now playing: {}", self.game.engine().active_lesson().title);
        }
        let len = session.deck().len();
        if self.cursor >= len {
            self.cursor = len.saturating_sub(1);
        }
    }

    fn draw(&mut self, frame: &mut Frame) {
        let snapshot = self.game.snapshot();
        let area = frame.size();
        let banner_height = if snapshot.is_lesson_complete { 5 } else { 0 };
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Min(6),
                Constraint::Length(banner_height),
                Constraint::Length(4),
            ])
            .split(area);

        self.render_lessons(frame, chunks[0], &snapshot);
        self.render_stats(frame, chunks[1], &snapshot);
        self.render_board(frame, chunks[2], &snapshot);
        if snapshot.is_lesson_complete {
            self.render_completion(frame, chunks[3], &snapshot);
        }
        self.render_status(frame, chunks[4]);
    }

    fn render_lessons(&self, frame: &mut Frame, area: Rect, snapshot: &GameSnapshot) {
        let mut spans = Vec::new();
        for tab in &snapshot.lessons {
            let label = format!(" {} ", lesson_label(tab));
            let style = if tab.active {
                Style::default()
                    .fg(Color::Black)
                    .bg(self.theme.accent)
                    .add_modifier(Modifier::BOLD)
            } else if tab.completed {
                Style::default().fg(self.theme.success)
            } else {
                Style::default().fg(self.theme.primary_fg)
            };
            spans.push(Span::styled(label, style));
            spans.push(Span::raw(" "));
        }

        let paragraph = Paragraph::new(Line::from(spans))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(snapshot.lesson_title.clone()),
            )
            .alignment(Alignment::Center);
        frame.render_widget(paragraph, area);
    }

    fn render_stats(&self, frame: &mut Frame, area: Rect, snapshot: &GameSnapshot) {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Ratio(1, 3),
                Constraint::Ratio(1, 3),
                Constraint::Ratio(1, 3),
            ])
            .split(area);

        let stats = [
            ("Time", snapshot.formatted_elapsed.clone()),
            (
                "Pairs",
                format!("{} / {}", snapshot.matched_pairs, snapshot.total_pairs),
            ),
            ("Moves", snapshot.move_count.to_string()),
        ];
        for ((title, value), chunk) in stats.into_iter().zip(columns.iter()) {
            let paragraph = Paragraph::new(Line::from(Span::styled(
                value,
                Style::default()
                    .fg(self.theme.primary_fg)
                    .add_modifier(Modifier::BOLD),
            )))
            .block(Block::default().borders(Borders::ALL).title(title))
            .alignment(Alignment::Center);
            frame.render_widget(paragraph, *chunk);
        }
    }

    fn render_board(&mut self, frame: &mut Frame, area: Rect, snapshot: &GameSnapshot) {
        self.card_areas = grid_cells(area, snapshot.cards.len(), self.columns);

        for (index, (rect, card)) in self
            .card_areas
            .iter()
            .zip(snapshot.cards.iter())
            .enumerate()
        {
            let focused = index == self.cursor;
            let paragraph = self.card_widget(card, focused, snapshot.checking);
            frame.render_widget(paragraph, *rect);
        }
    }

    fn card_widget(&self, card: &CardView, focused: bool, checking: bool) -> Paragraph<'static> {
        let border_color = match card.status {
            CardStatus::Matched => self.theme.success,
            CardStatus::Mismatched => self.theme.danger,
            CardStatus::Selected => self.theme.accent_alt,
            CardStatus::Neutral if checking => self.theme.muted,
            CardStatus::Neutral => self.theme.primary_fg,
        };

        let mut text_style = match card.kind {
            CardKind::Term => Style::default()
                .fg(self.theme.accent)
                .add_modifier(Modifier::BOLD),
            CardKind::Definition => Style::default().fg(self.theme.primary_fg),
        };
        match card.status {
            CardStatus::Matched => text_style = text_style.fg(self.theme.success),
            CardStatus::Mismatched => text_style = text_style.fg(self.theme.danger),
            _ => {}
        }

        let mut block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border_color));
        if focused {
            block = block.border_type(BorderType::Thick);
        }
        if card.status == CardStatus::Selected {
            block = block.border_type(BorderType::Double);
        }

        Paragraph::new(Line::from(Span::styled(card.content.clone(), text_style)))
            .block(block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
    }

    fn render_completion(&self, frame: &mut Frame, area: Rect, snapshot: &GameSnapshot) {
        let mut lines = vec![
            Line::from(Span::styled(
                format!("Congratulations! You've completed {}!", snapshot.lesson_title),
                Style::default()
                    .fg(self.theme.success)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(format!(
                "Time: {} | Moves: {}",
                snapshot.formatted_elapsed, snapshot.move_count
            )),
        ];
        if snapshot.has_next_lesson {
            lines.push(Line::from(Span::styled(
                format!("Press n to continue to Lesson {}", snapshot.lesson_index + 2),
                Style::default().fg(self.theme.accent),
            )));
        }

        let paragraph = Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(self.theme.success)),
            )
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }

    fn render_status(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::ALL).title("Status");
        let help = Line::from(Span::styled(
            "arrows/hjkl move  enter/space pick  1-9 lesson  r reset  n next  q quit",
            Style::default().fg(self.theme.muted),
        ));
        let paragraph = Paragraph::new(vec![Line::from(self.status.clone()), help])
            .block(block)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )
    .context("failed to leave alternate screen")?;
    terminal.show_cursor()?;
    Ok(())
}

fn spawn_input_thread(sender: mpsc::Sender<AppEvent>) {
    thread::spawn(move || loop {
        match event::poll(POLL_RATE) {
            Ok(true) => match event::read() {
                Ok(evt) => {
                    if sender.blocking_send(AppEvent::Input(evt)).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            },
            Ok(false) => {
                if sender.blocking_send(AppEvent::Tick).is_err() {
                    break;
                }
            }
            Err(_) => break,
        }
    });
}

/// Move a grid cursor by `dx` columns and `dy` rows, staying on the board.
fn move_cursor(cursor: usize, len: usize, columns: usize, dx: isize, dy: isize) -> usize {
    if len == 0 {
        return 0;
    }
    let columns = columns.max(1) as isize;
    let len = len as isize;
    let current = (cursor as isize).min(len - 1);
    let row = current / columns;
    let col = current % columns;
    let rows = (len + columns - 1) / columns;

    let next_row = (row + dy).clamp(0, rows - 1);
    let next_col = (col + dx).clamp(0, columns - 1);
    let next = (next_row * columns + next_col).min(len - 1);
    next as usize
}

/// Split `area` into `count` equally sized cells laid out row by row.
fn grid_cells(area: Rect, count: usize, columns: usize) -> Vec<Rect> {
    if count == 0 {
        return Vec::new();
    }
    let columns = columns.max(1);
    let rows = (count + columns - 1) / columns;

    let row_areas = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Ratio(1, rows as u32); rows])
        .split(area);

    let mut cells = Vec::with_capacity(count);
    for row_area in row_areas.iter() {
        let col_areas = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(vec![Constraint::Ratio(1, columns as u32); columns])
            .split(*row_area);
        for cell in col_areas.iter() {
            if cells.len() == count {
                break;
            }
            cells.push(*cell);
        }
    }
    cells
}

/// Tab caption. The hotkey number is only shown when it differs from the lesson id.
fn lesson_label(tab: &LessonTab) -> String {
    let mark = if tab.completed { "✓ " } else { "" };
    let hotkey = tab.index + 1;
    if u32::try_from(hotkey).ok() == Some(tab.id) {
        format!("{mark}Lesson {}", tab.id)
    } else {
        format!("{mark}{hotkey}. Lesson {}", tab.id)
    }
}

/// Index of the card drawn under terminal position (`column`, `row`).
fn card_at(areas: &[Rect], column: u16, row: u16) -> Option<usize> {
    areas.iter().position(|rect| {
        column >= rect.x
            && column < rect.x.saturating_add(rect.width)
            && row >= rect.y
            && row < rect.y.saturating_add(rect.height)
    })
}
