use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
};
use std::io::stdout;

use crate::fetch::FeedClient;
use crate::filter::{self, FilterCriteria};
use crate::format;
use crate::models::{Job, TriageStatus};
use crate::store::StateStore;
use crate::theme::{Palette, Theme};

struct AppState {
    jobs: Vec<Job>,
    filtered: Vec<Job>,
    criteria: FilterCriteria,
    store: StateStore,
    theme: Theme,
    selected: usize,
    last_updated: String,
    feed_error: bool,
    search_terms: Vec<String>,
    config_error: bool,
    editing_search: bool,
    show_buckets: bool,
}

impl AppState {
    fn new(store: StateStore, theme: Theme) -> Self {
        Self {
            jobs: Vec::new(),
            filtered: Vec::new(),
            criteria: FilterCriteria::default(),
            store,
            theme,
            selected: 0,
            last_updated: String::new(),
            feed_error: false,
            search_terms: Vec::new(),
            config_error: false,
            editing_search: false,
            show_buckets: false,
        }
    }

    fn load_config(&mut self, client: &FeedClient) {
        match client.load_config() {
            Ok(cfg) => {
                self.config_error = false;
                self.search_terms = cfg.search_terms;
            }
            Err(err) => {
                log::warn!("Config fetch failed: {:#}", err);
                self.config_error = true;
                self.search_terms.clear();
            }
        }
    }

    // Single attempt, binary outcome: replace the list wholesale or clear it.
    fn load_feed(&mut self, client: &FeedClient) {
        match client.load_jobs() {
            Ok(jobs) => {
                self.feed_error = false;
                self.last_updated = last_updated_label(&jobs);
                self.jobs = jobs;
            }
            Err(err) => {
                log::warn!("Jobs fetch failed: {:#}", err);
                self.feed_error = true;
                self.last_updated = "Feed error".to_string();
                self.jobs.clear();
            }
        }
        self.refresh();
    }

    fn refresh(&mut self) {
        self.filtered = filter::apply(&self.jobs, &self.criteria, self.store.triage());
        if self.selected >= self.filtered.len() {
            self.selected = self.filtered.len().saturating_sub(1);
        }
    }

    fn current_job(&self) -> Option<&Job> {
        self.filtered.get(self.selected)
    }

    fn next(&mut self) {
        if !self.filtered.is_empty() && self.selected < self.filtered.len() - 1 {
            self.selected += 1;
        }
    }

    fn prev(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
        }
    }

    fn toggle_todo_selected(&mut self) {
        let Some(url) = self.current_job().map(|job| job.url.clone()) else {
            return;
        };
        if let Err(err) = self.store.toggle_todo(&url) {
            log::warn!("Failed to persist triage state: {:#}", err);
        }
        self.refresh();
    }

    fn mark_selected(&mut self, status: TriageStatus) {
        let Some(url) = self.current_job().map(|job| job.url.clone()) else {
            return;
        };
        if let Err(err) = self.store.mark(&url, status) {
            log::warn!("Failed to persist triage state: {:#}", err);
        }
        self.refresh();
    }

    fn toggle_theme(&mut self) {
        self.theme = self.theme.toggle();
        if let Err(err) = self.store.set_theme(self.theme) {
            log::warn!("Failed to persist theme: {:#}", err);
        }
    }

    // Bucket entries show the feed title when the URL is still present,
    // otherwise the bare URL.
    fn bucket(&self, status: TriageStatus) -> Vec<String> {
        let mut entries: Vec<String> = self
            .store
            .triage()
            .iter()
            .filter(|(_, s)| **s == status)
            .map(|(url, _)| {
                self.jobs
                    .iter()
                    .find(|job| &job.url == url)
                    .map(|job| job.title.clone())
                    .unwrap_or_else(|| url.clone())
            })
            .collect();
        entries.sort();
        entries
    }
}

fn last_updated_label(jobs: &[Job]) -> String {
    match jobs.first() {
        None => "No hits yet".to_string(),
        Some(job) => {
            let formatted = format::short_datetime_opt(job.fetched_at.as_deref());
            if formatted.is_empty() {
                "Last updated: unknown".to_string()
            } else {
                format!("Last updated: {}", formatted)
            }
        }
    }
}

pub fn run_browse(client: &FeedClient, store: StateStore) -> Result<()> {
    let theme = Theme::resolve(store.theme());
    let mut state = AppState::new(store, theme);
    state.load_config(client);
    state.load_feed(client);

    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let result = run_loop(&mut terminal, &mut state, client);

    // Restore terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
}

fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    state: &mut AppState,
    client: &FeedClient,
) -> Result<()> {
    let mut list_state = ListState::default();
    list_state.select(Some(0));

    loop {
        terminal.draw(|frame| draw(frame, state, &mut list_state))?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }

            if state.editing_search {
                match key.code {
                    KeyCode::Esc | KeyCode::Enter => state.editing_search = false,
                    KeyCode::Backspace => {
                        state.criteria.term.pop();
                        state.refresh();
                    }
                    KeyCode::Char(c) => {
                        state.criteria.term.push(c);
                        state.refresh();
                    }
                    _ => {}
                }
                list_state.select(Some(state.selected));
                continue;
            }

            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => break,
                KeyCode::Down | KeyCode::Char('j') => state.next(),
                KeyCode::Up | KeyCode::Char('k') => state.prev(),
                KeyCode::Char('/') => state.editing_search = true,
                KeyCode::Char('p') => {
                    state.criteria.priority = state.criteria.priority.cycle();
                    state.refresh();
                }
                KeyCode::Char('t') => state.toggle_todo_selected(),
                KeyCode::Char('d') => state.mark_selected(TriageStatus::Done),
                KeyCode::Char('s') => state.mark_selected(TriageStatus::Skip),
                KeyCode::Char('T') => state.toggle_theme(),
                KeyCode::Tab => state.show_buckets = !state.show_buckets,
                KeyCode::Char('r') => state.load_feed(client),
                _ => {}
            }
            list_state.select(Some(state.selected));
        }
    }
    Ok(())
}

fn draw(frame: &mut Frame, state: &AppState, list_state: &mut ListState) {
    let palette = state.theme.palette();
    frame.render_widget(
        Block::default().style(Style::default().bg(palette.bg).fg(palette.fg)),
        frame.area(),
    );

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(frame.area());

    draw_header(frame, state, &palette, chunks[0]);
    draw_filter_bar(frame, state, &palette, chunks[1]);

    if state.show_buckets {
        draw_buckets(frame, state, &palette, chunks[2]);
    } else {
        draw_jobs(frame, state, &palette, chunks[2], list_state);
    }

    let help = if state.editing_search {
        " type to search  Enter/Esc:done"
    } else {
        " j/k:navigate  /:search  p:priority  t:todo d:done s:skip  Tab:buckets  T:theme  r:reload  q:quit"
    };
    frame.render_widget(
        Paragraph::new(help).style(Style::default().fg(palette.dim)),
        chunks[3],
    );
}

fn draw_header(frame: &mut Frame, state: &AppState, palette: &Palette, area: Rect) {
    let header = Line::from(vec![
        Span::styled(" geier ", Style::default().fg(palette.accent).add_modifier(Modifier::BOLD)),
        Span::raw(format!(" {} hits  ", state.filtered.len())),
        Span::styled(state.last_updated.clone(), Style::default().fg(palette.dim)),
        Span::styled(
            format!("  [{}]", state.theme.label()),
            Style::default().fg(palette.dim),
        ),
    ]);
    frame.render_widget(Paragraph::new(header), area);
}

fn draw_filter_bar(frame: &mut Frame, state: &AppState, palette: &Palette, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(40),
            Constraint::Length(16),
            Constraint::Min(0),
        ])
        .split(area);

    let term = if state.editing_search {
        format!("{}_", state.criteria.term)
    } else {
        state.criteria.term.clone()
    };
    frame.render_widget(
        Paragraph::new(term).block(Block::default().borders(Borders::ALL).title(" Search (/) ")),
        columns[0],
    );

    frame.render_widget(
        Paragraph::new(state.criteria.priority.label())
            .block(Block::default().borders(Borders::ALL).title(" Priority (p) ")),
        columns[1],
    );

    let terms_line = if state.config_error {
        Line::from(Span::styled("Could not load config", Style::default().fg(palette.dim)))
    } else if state.search_terms.is_empty() {
        Line::from(Span::styled("No search terms defined", Style::default().fg(palette.dim)))
    } else {
        Line::from(Span::raw(state.search_terms.join(", ")))
    };
    frame.render_widget(
        Paragraph::new(terms_line)
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL).title(" Search terms ")),
        columns[2],
    );
}

fn draw_jobs(
    frame: &mut Frame,
    state: &AppState,
    palette: &Palette,
    area: Rect,
    list_state: &mut ListState,
) {
    if state.filtered.is_empty() {
        let (title, hint) = if state.feed_error {
            ("Failed to load jobs", "Check the feed and press r to reload.")
        } else {
            ("No hits for these filters", "Try other keywords or another priority.")
        };
        let empty = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(title, Style::default().add_modifier(Modifier::BOLD))),
            Line::from(Span::styled(hint, Style::default().fg(palette.dim))),
        ])
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title(" Jobs "));
        frame.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem> = state
        .filtered
        .iter()
        .map(|job| {
            let mut top = Vec::new();
            match state.store.status_of(&job.url) {
                Some(TriageStatus::Todo) => {
                    top.push(Span::styled("[todo] ", Style::default().fg(palette.accent)));
                }
                Some(TriageStatus::Done) => {
                    top.push(Span::styled("[done] ", Style::default().fg(palette.done)));
                }
                _ => {}
            }
            let title = if job.title.is_empty() { "Untitled" } else { &job.title };
            top.push(Span::styled(
                title.to_string(),
                Style::default().add_modifier(Modifier::BOLD),
            ));
            if job.priority == 2 {
                top.push(Span::styled("  High priority", Style::default().fg(palette.high)));
            } else {
                top.push(Span::styled("  Normal", Style::default().fg(palette.dim)));
            }

            let source = job.source.as_deref().unwrap_or("unknown source");
            let fetched = format::short_datetime_opt(job.fetched_at.as_deref());
            let meta = if fetched.is_empty() {
                format!("  {} | {}", source, job.url)
            } else {
                format!("  {} | found {} | {}", source, fetched, job.url)
            };

            ListItem::new(vec![
                Line::from(top),
                Line::from(Span::styled(meta, Style::default().fg(palette.dim))),
            ])
        })
        .collect();

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(format!(
            " Jobs ({}) ",
            state.filtered.len()
        )))
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, area, list_state);
}

fn draw_buckets(frame: &mut Frame, state: &AppState, palette: &Palette, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(34),
            Constraint::Percentage(33),
            Constraint::Percentage(33),
        ])
        .split(area);

    let buckets = [
        (TriageStatus::Todo, palette.accent),
        (TriageStatus::Done, palette.done),
        (TriageStatus::Skip, palette.dim),
    ];

    for (i, (status, color)) in buckets.iter().enumerate() {
        let entries = state.bucket(*status);
        let items: Vec<ListItem> = entries
            .iter()
            .map(|entry| ListItem::new(entry.clone()))
            .collect();
        let list = List::new(items).block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" {} ({}) ", status.label(), entries.len()))
                .title_style(Style::default().fg(*color)),
        );
        frame.render_widget(list, columns[i]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(url: &str, fetched_at: Option<&str>) -> Job {
        Job {
            title: "Dev".to_string(),
            url: url.to_string(),
            source: None,
            priority: 1,
            fetched_at: fetched_at.map(str::to_string),
        }
    }

    #[test]
    fn last_updated_from_first_job() {
        let jobs = vec![
            job("a", Some("2024-03-05T14:30:00+00:00")),
            job("b", Some("2023-01-01T00:00:00+00:00")),
        ];
        let label = last_updated_label(&jobs);
        assert!(label.starts_with("Last updated: "));
        assert_ne!(label, "Last updated: unknown");
    }

    #[test]
    fn last_updated_unknown_without_timestamp() {
        assert_eq!(last_updated_label(&[job("a", None)]), "Last updated: unknown");
    }

    #[test]
    fn last_updated_empty_feed() {
        assert_eq!(last_updated_label(&[]), "No hits yet");
    }
}
