use anyhow::Result;
use chrono::NaiveDate;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame, Terminal,
};
use std::io;

use expense_tracker::{
    Category, Dashboard, ExpenseRecord, FilterCriteria, KeyValueStore, RecordStore, NO_DESCRIPTION,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Search,
}

pub struct App<S: KeyValueStore> {
    pub store: RecordStore<S>,
    pub records: Vec<ExpenseRecord>,
    pub criteria: FilterCriteria,
    pub dashboard: Dashboard,
    pub visible_ids: Vec<String>,
    pub state: TableState,
    pub today: NaiveDate,
    pub show_detail: bool,
    pub input_mode: InputMode,
    pub message: Option<String>,
}

impl<S: KeyValueStore> App<S> {
    pub fn new(store: RecordStore<S>, today: NaiveDate) -> Self {
        let records = store.load();
        let criteria = FilterCriteria::default();
        let dashboard = Dashboard::build(&records, &criteria, today);

        let mut app = Self {
            store,
            records,
            criteria,
            dashboard,
            visible_ids: Vec::new(),
            state: TableState::default(),
            today,
            show_detail: false,
            input_mode: InputMode::Normal,
            message: None,
        };
        app.refresh();
        app
    }

    /// Recompute the visible rows and stats, then clamp the selection
    pub fn refresh(&mut self) {
        self.dashboard = Dashboard::build(&self.records, &self.criteria, self.today);
        self.visible_ids = self.dashboard.rows.iter().map(|r| r.id.clone()).collect();

        let len = self.visible_ids.len();
        let selected = match self.state.selected() {
            _ if len == 0 => None,
            Some(i) if i >= len => Some(len - 1),
            Some(i) => Some(i),
            None => Some(0),
        };
        self.state.select(selected);
    }

    /// Re-read the store (another process may have written)
    pub fn reload(&mut self) {
        self.records = self.store.load();
        self.refresh();
    }

    pub fn selected_record(&self) -> Option<&ExpenseRecord> {
        let id = self.state.selected().and_then(|i| self.visible_ids.get(i))?;
        self.records.iter().find(|r| &r.id == id)
    }

    pub fn delete_selected(&mut self) -> Result<()> {
        let Some(id) = self.selected_record().map(|r| r.id.clone()) else {
            return Ok(());
        };

        if self.store.remove(&id)? {
            self.message = Some("Expense deleted".to_string());
        }
        self.reload();
        Ok(())
    }

    pub fn push_search_char(&mut self, c: char) {
        self.criteria.search_text.push(c);
        self.refresh();
    }

    pub fn pop_search_char(&mut self) {
        self.criteria.search_text.pop();
        self.refresh();
    }

    /// "" → food → transport → ... → other → ""
    pub fn cycle_category(&mut self) {
        self.criteria.category = if self.criteria.category.is_empty() {
            Category::ALL[0].key().to_string()
        } else {
            match Category::from_key(&self.criteria.category) {
                Category::Other => String::new(),
                current => current.next().key().to_string(),
            }
        };
        self.refresh();
    }

    pub fn cycle_period(&mut self) {
        self.criteria.period = self.criteria.period.next();
        self.refresh();
    }

    pub fn clear_filters(&mut self) {
        self.criteria.clear();
        self.refresh();
    }

    pub fn toggle_detail(&mut self) {
        self.show_detail = !self.show_detail;
    }

    pub fn next(&mut self) {
        let len = self.visible_ids.len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) if i >= len - 1 => 0,
            Some(i) => i + 1,
            None => 0,
        };
        self.state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let len = self.visible_ids.len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.state.select(Some(i));
    }

    pub fn page_down(&mut self) {
        let len = self.visible_ids.len();
        if len == 0 {
            return;
        }
        let i = self.state.selected().map_or(0, |i| (i + 20).min(len - 1));
        self.state.select(Some(i));
    }

    pub fn page_up(&mut self) {
        if self.visible_ids.is_empty() {
            return;
        }
        let i = self.state.selected().map_or(0, |i| i.saturating_sub(20));
        self.state.select(Some(i));
    }
}

pub fn run_ui<S: KeyValueStore>(app: &mut App<S>) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}

fn run_app<B: ratatui::backend::Backend, S: KeyValueStore>(
    terminal: &mut Terminal<B>,
    app: &mut App<S>,
) -> Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        app.message = None;

        match app.input_mode {
            InputMode::Search => match key.code {
                KeyCode::Enter | KeyCode::Esc => app.input_mode = InputMode::Normal,
                KeyCode::Backspace => app.pop_search_char(),
                KeyCode::Char(c) => app.push_search_char(c),
                _ => {}
            },
            InputMode::Normal => match key.code {
                KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                KeyCode::Char('/') => app.input_mode = InputMode::Search,
                KeyCode::Char('c') => app.cycle_category(),
                KeyCode::Char('p') => app.cycle_period(),
                KeyCode::Char('x') => app.clear_filters(),
                KeyCode::Char('r') => app.reload(),
                KeyCode::Char('d') | KeyCode::Delete => app.delete_selected()?,
                KeyCode::Enter => app.toggle_detail(),
                KeyCode::Down | KeyCode::Char('j') => app.next(),
                KeyCode::Up | KeyCode::Char('k') => app.previous(),
                KeyCode::PageDown => app.page_down(),
                KeyCode::PageUp => app.page_up(),
                KeyCode::Home => {
                    if !app.visible_ids.is_empty() {
                        app.state.select(Some(0));
                    }
                }
                KeyCode::End => {
                    if !app.visible_ids.is_empty() {
                        app.state.select(Some(app.visible_ids.len() - 1));
                    }
                }
                _ => {}
            },
        }
    }
}

fn ui<S: KeyValueStore>(f: &mut Frame, app: &mut App<S>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Stats header
            Constraint::Length(3), // Filter bar
            Constraint::Min(0),    // Content area
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0], app);
    render_filters(f, chunks[1], app);

    let content_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(62), Constraint::Percentage(38)])
        .split(chunks[2]);

    if app.dashboard.is_empty() {
        render_empty_state(f, content_chunks[0], app);
    } else {
        render_table(f, content_chunks[0], app);
    }

    if app.show_detail {
        render_detail_panel(f, content_chunks[1], app);
    } else {
        render_breakdown(f, content_chunks[1], app);
    }

    render_status_bar(f, chunks[3], app);
}

fn render_header<S: KeyValueStore>(f: &mut Frame, area: Rect, app: &App<S>) {
    let dashboard = &app.dashboard;
    let label = Style::default().fg(Color::DarkGray);
    let value = Style::default().fg(Color::White).add_modifier(Modifier::BOLD);

    let spans = vec![
        Span::styled(" Total ", label),
        Span::styled(dashboard.total_display.clone(), value),
        Span::raw("  │  "),
        Span::styled("This week ", label),
        Span::styled(dashboard.week_display.clone(), value.fg(Color::Yellow)),
        Span::raw("  │  "),
        Span::styled("This month ", label),
        Span::styled(dashboard.month_display.clone(), value.fg(Color::Green)),
        Span::raw("  │  "),
        Span::styled("Expenses ", label),
        Span::styled(dashboard.count_display.clone(), value.fg(Color::Cyan)),
    ];

    let header = Paragraph::new(vec![Line::from(spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(" Expense Tracker "),
    );

    f.render_widget(header, area);
}

fn render_filters<S: KeyValueStore>(f: &mut Frame, area: Rect, app: &App<S>) {
    let criteria = &app.criteria;
    let key = Style::default().fg(Color::Yellow);
    let active = Style::default().fg(Color::Green).add_modifier(Modifier::BOLD);
    let idle = Style::default().fg(Color::DarkGray);

    let search = if app.input_mode == InputMode::Search {
        Span::styled(format!("{}▏", criteria.search_text), active)
    } else if criteria.search_text.is_empty() {
        Span::styled("(none)", idle)
    } else {
        Span::styled(criteria.search_text.clone(), active)
    };

    let category = if criteria.category.is_empty() {
        Span::styled("All categories", idle)
    } else {
        Span::styled(Category::from_key(&criteria.category).label(), active)
    };

    let period_style = if criteria.period == Default::default() { idle } else { active };

    let spans = vec![
        Span::styled(" /", key),
        Span::raw(" Search: "),
        search,
        Span::raw("   "),
        Span::styled("c", key),
        Span::raw(" Category: "),
        category,
        Span::raw("   "),
        Span::styled("p", key),
        Span::raw(" Period: "),
        Span::styled(criteria.period.label(), period_style),
        Span::raw("   "),
        Span::styled("x", key),
        Span::raw(" Clear"),
    ];

    let bar = Paragraph::new(vec![Line::from(spans)])
        .block(Block::default().borders(Borders::ALL).title(" Filters "));

    f.render_widget(bar, area);
}

fn render_table<S: KeyValueStore>(f: &mut Frame, area: Rect, app: &mut App<S>) {
    let header_cells = ["Description", "Category", "Date", "Amount"].iter().map(|h| {
        Cell::from(*h).style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
    });

    let header = Row::new(header_cells)
        .style(Style::default().bg(Color::DarkGray))
        .height(1);

    let rows = app.dashboard.rows.iter().map(|row| {
        let description_style = if row.description == NO_DESCRIPTION {
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC)
        } else {
            Style::default()
        };

        let cells = vec![
            Cell::from(truncate(&row.description, 32)).style(description_style),
            Cell::from(row.category.clone()).style(Style::default().fg(Color::Gray)),
            Cell::from(row.date.clone()).style(Style::default().fg(Color::Gray)),
            Cell::from(row.amount.clone()).style(Style::default().add_modifier(Modifier::BOLD)),
        ];

        Row::new(cells).height(1)
    });

    let table = Table::new(
        rows,
        [
            Constraint::Min(20),
            Constraint::Length(18),
            Constraint::Length(11),
            Constraint::Length(12),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" Expenses "),
    )
    .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.state);
}

fn render_empty_state<S: KeyValueStore>(f: &mut Frame, area: Rect, app: &App<S>) {
    let hint = if app.records.is_empty() {
        "  No expenses yet. Add one with: expense-tracker add --description ... --amount ..."
    } else {
        "  No expenses match the current filters (x to clear)"
    };

    let content = vec![
        Line::from(""),
        Line::from(Span::styled(
            hint,
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )),
    ];

    let empty = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" Expenses "),
    );

    f.render_widget(empty, area);
}

fn render_breakdown<S: KeyValueStore>(f: &mut Frame, area: Rect, app: &App<S>) {
    // Leave room for label, amount and borders
    let bar_width = area.width.saturating_sub(36) as f64;

    let mut content = vec![Line::from("")];
    for slice in app.dashboard.category_slices() {
        let filled = (slice.share.clamp(0.0, 1.0) * bar_width).round() as usize;
        content.push(Line::from(vec![
            Span::styled(format!("  {:<18}", slice.label), Style::default().fg(Color::Cyan)),
            Span::styled("█".repeat(filled), Style::default().fg(Color::Green)),
            Span::raw(" "),
            Span::raw(expense_tracker::format_currency(slice.amount)),
        ]));
    }

    if content.len() == 1 {
        content.push(Line::from(Span::styled(
            "  Nothing to chart",
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )));
    }

    let panel = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" By Category "),
    );

    f.render_widget(panel, area);
}

fn render_detail_panel<S: KeyValueStore>(f: &mut Frame, area: Rect, app: &App<S>) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" Expense Details ");

    let Some(record) = app.selected_record() else {
        f.render_widget(Paragraph::new("No expense selected").block(block), area);
        return;
    };

    let field = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
    let description = if record.description.is_empty() {
        NO_DESCRIPTION.to_string()
    } else {
        wrap_text(&record.description, 30)
    };

    let content = vec![
        Line::from(""),
        Line::from(vec![Span::styled("  Description: ", field), Span::raw(description)]),
        Line::from(""),
        Line::from(vec![
            Span::styled("  Amount: ", field),
            Span::raw(expense_tracker::format_currency(record.amount)),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("  Category: ", field),
            Span::raw(record.category().label()),
            Span::styled(format!(" ({})", record.category), Style::default().fg(Color::DarkGray)),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("  Date: ", field),
            Span::raw(expense_tracker::format_display_date(&record.date)),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("  ID: ", field),
            Span::styled(record.id.clone(), Style::default().fg(Color::DarkGray)),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            "  Press Enter to close, d to delete",
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )),
    ];

    f.render_widget(Paragraph::new(content).block(block), area);
}

fn render_status_bar<S: KeyValueStore>(f: &mut Frame, area: Rect, app: &App<S>) {
    let selected = app.state.selected().map(|i| i + 1).unwrap_or(0);
    let total = app.visible_ids.len();

    let mut status_spans = vec![Span::styled(
        format!(" Row: {}/{} ", selected, total),
        Style::default().fg(Color::Cyan),
    )];

    if let Some(message) = &app.message {
        status_spans.push(Span::raw(" | "));
        status_spans.push(Span::styled(message.clone(), Style::default().fg(Color::Green)));
    }

    if app.input_mode == InputMode::Search {
        status_spans.push(Span::raw(" | Typing search, "));
        status_spans.push(Span::styled("Enter", Style::default().fg(Color::Yellow)));
        status_spans.push(Span::raw(" done"));
    } else {
        status_spans.push(Span::raw(" | "));
        status_spans.push(Span::styled("Enter", Style::default().fg(Color::Yellow)));
        status_spans.push(Span::raw(" Details | "));
        status_spans.push(Span::styled("d", Style::default().fg(Color::Yellow)));
        status_spans.push(Span::raw(" Delete | "));
        status_spans.push(Span::styled("r", Style::default().fg(Color::Yellow)));
        status_spans.push(Span::raw(" Reload | "));
        status_spans.push(Span::styled("↑/↓", Style::default().fg(Color::Yellow)));
        status_spans.push(Span::raw(" Nav | "));
        status_spans.push(Span::styled("q", Style::default().fg(Color::Red)));
        status_spans.push(Span::raw(" Quit"));
    }

    let status_bar = Paragraph::new(vec![Line::from(status_spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );

    f.render_widget(status_bar, area);
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}

fn wrap_text(text: &str, width: usize) -> String {
    let mut result = String::new();
    let mut current_line = String::new();

    for word in text.split_whitespace() {
        if !current_line.is_empty() && current_line.len() + word.len() + 1 > width {
            if !result.is_empty() {
                result.push_str("\n  ");
            }
            result.push_str(&current_line);
            current_line.clear();
        }
        if !current_line.is_empty() {
            current_line.push(' ');
        }
        current_line.push_str(word);
    }

    if !current_line.is_empty() {
        if !result.is_empty() {
            result.push_str("\n  ");
        }
        result.push_str(&current_line);
    }

    result
}
