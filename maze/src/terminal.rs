use dotmaze::{Cell, RenderSink, Snapshot};

use std::io::{self, Stdout};
use std::time::{Duration, Instant};

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Paragraph},
    Terminal,
};
use tracing::error;

const WALL: char = '#';
const AGENT: char = 'o';
const TRAIL: char = '.';
const LEADER: char = '@';
const GOAL: char = 'G';

/// Draws each tick on the alternate screen and waits
/// between frames for `q`, `Esc` or Ctrl-C.
///
/// The terminal is restored when the sink is dropped.
pub struct TerminalSink {
    delay: Duration,
    terminal: Terminal<CrosstermBackend<Stdout>>,
    healthy: bool,
}

impl TerminalSink {
    /// Switches the terminal to raw mode on the alternate screen.
    pub fn new(delay: Duration) -> io::Result<TerminalSink> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        let terminal = execute!(stdout, EnterAlternateScreen)
            .and_then(|()| Terminal::new(CrosstermBackend::new(stdout)));
        let mut terminal = match terminal {
            Ok(terminal) => terminal,
            Err(err) => {
                disable_raw_mode().ok();
                return Err(err);
            }
        };
        terminal.hide_cursor().ok();
        Ok(TerminalSink {
            delay,
            terminal,
            healthy: true,
        })
    }

    /// Waits out the frame delay, returning `true`
    /// as soon as a quit key is pressed.
    fn quit_requested(&self) -> io::Result<bool> {
        let deadline = Instant::now() + self.delay;
        loop {
            let timeout = deadline.saturating_duration_since(Instant::now());
            if !event::poll(timeout)? {
                return Ok(false);
            }
            if let Event::Key(key) = event::read()? {
                if is_quit(key) {
                    return Ok(true);
                }
            }
        }
    }
}

impl RenderSink for TerminalSink {
    fn render(&mut self, snapshot: &Snapshot) {
        let frame = styled(&layers(snapshot));
        let title = format!(" generation {} (q to quit) ", snapshot.generation);
        let drawn = self.terminal.draw(|f| {
            let area = f.area();
            f.render_widget(Paragraph::new(frame).block(Block::bordered().title(title)), area);
        });
        if let Err(err) = drawn {
            error!(?err, "terminal output failed");
            self.healthy = false;
        }
    }

    fn keep_running(&mut self) -> bool {
        if !self.healthy {
            return false;
        }
        match self.quit_requested() {
            Ok(quit) => !quit,
            Err(err) => {
                error!(?err, "terminal input failed");
                false
            }
        }
    }
}

impl Drop for TerminalSink {
    fn drop(&mut self) {
        self.terminal.show_cursor().ok();
        if let Err(err) = disable_raw_mode() {
            error!(?err, "failed to disable raw mode");
        }
        if let Err(err) = execute!(self.terminal.backend_mut(), LeaveAlternateScreen) {
            error!(?err, "failed to leave alternate screen");
        }
    }
}

fn is_quit(key: KeyEvent) -> bool {
    if key.kind != KeyEventKind::Press {
        return false;
    }
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => true,
        KeyCode::Char('c') => key.modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}

/// Lays a snapshot out as one character per cell.
/// Later layers overwrite earlier ones: walls, agents,
/// trail, leader, goal.
pub fn layers(snapshot: &Snapshot) -> Vec<Vec<char>> {
    let (width, height) = snapshot.bounds;
    let mut grid = vec![vec![' '; width as usize]; height as usize];
    let mut put = |cell: Cell, c: char| {
        if cell.within(width, height) {
            grid[cell.y as usize][cell.x as usize] = c;
        }
    };

    for y in 0..height {
        for x in 0..width {
            let cell = Cell::new(x, y);
            if dotmaze::first_collision(cell, snapshot.offset, &snapshot.walls).is_some() {
                put(cell, WALL);
            }
        }
    }
    for &cell in &snapshot.agent_positions {
        put(cell, AGENT);
    }
    for &cell in &snapshot.best_path {
        put(cell, TRAIL);
    }
    put(snapshot.leader_position, LEADER);
    put(snapshot.goal, GOAL);
    grid
}

fn style_of(c: char) -> Style {
    match c {
        WALL => Style::default().fg(Color::DarkGray),
        TRAIL => Style::default().fg(Color::Red),
        LEADER => Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        GOAL => Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        _ => Style::default(),
    }
}

/// Colours a laid-out grid, one line per row.
fn styled(grid: &[Vec<char>]) -> Text<'static> {
    grid.iter()
        .map(|row| {
            Line::from(
                row.iter()
                    .map(|&c| Span::styled(c.to_string(), style_of(c)))
                    .collect::<Vec<_>>(),
            )
        })
        .collect::<Vec<_>>()
        .into()
}
