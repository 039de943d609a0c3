//! Interactive kanban board.
//!
//! Four status columns with card selection, within-column reordering, and
//! cross-column moves routed through the board controller so the dependency
//! gate and role checks apply exactly as they do on the CLI path. Rejections
//! surface in the status bar with the blocking task titles.

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyModifiers};
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame, Terminal,
};

use crate::board::{Board, MoveIntent};
use crate::deps;
use crate::fields::{Role, Status};
use crate::ordering;
use crate::store::{format_due_relative, format_priority, format_role, format_status, today, Store};
use crate::task::Task;
use crate::tui::colors::{DARK_GREEN, DARK_RED, GOLD, NAVY, SLATE};

const COLUMN_COUNT: usize = Status::ALL.len();

/// Main board application state.
pub struct BoardApp {
    store: Store,
    db_path: PathBuf,
    project_id: String,
    user_id: String,
    role: Option<Role>,
    selected_column: usize,
    selected_card: usize,
    column_scroll_offsets: [usize; COLUMN_COUNT],
    status_message: String,
    show_task_detail: bool,
    filter_active: bool,
    filter_text: String,

    // Task ids per column, in display order
    columns: [Vec<String>; COLUMN_COUNT],
}

impl BoardApp {
    /// Create a new board app for one project and acting user.
    pub fn new(db_path: &Path, project_id: &str, user_id: &str) -> io::Result<Self> {
        let store = Store::load(db_path);
        let role = store
            .project(project_id)
            .and_then(|p| p.role_of(user_id));

        let mut app = BoardApp {
            store,
            db_path: db_path.to_path_buf(),
            project_id: project_id.to_string(),
            user_id: user_id.to_string(),
            role,
            selected_column: 0,
            selected_card: 0,
            column_scroll_offsets: [0; COLUMN_COUNT],
            status_message: String::new(),
            show_task_detail: false,
            filter_active: false,
            filter_text: String::new(),
            columns: Default::default(),
        };
        app.update_columns();
        Ok(app)
    }

    fn can_edit(&self) -> bool {
        self.role.is_some_and(|r| r.can_edit())
    }

    fn accent(column_index: usize) -> Color {
        match column_index {
            0 => SLATE,
            1 => NAVY,
            2 => GOLD,
            _ => DARK_GREEN,
        }
    }

    /// Rebuild the per-column card lists from the store, applying the filter.
    fn update_columns(&mut self) {
        for (i, column) in self.columns.iter_mut().enumerate() {
            column.clear();
            self.column_scroll_offsets[i] = 0;
        }

        let tasks = match self.store.get_tasks(&self.project_id) {
            Ok(t) => t,
            Err(_) => return,
        };
        let filter = self.filter_text.to_lowercase();
        for (i, &status) in Status::ALL.iter().enumerate() {
            for task in ordering::column(tasks, status) {
                if !filter.is_empty() {
                    let title_matches = task.title.to_lowercase().contains(&filter);
                    let assignee_matches = task
                        .assignee_id
                        .as_deref()
                        .and_then(|id| self.store.user(id))
                        .is_some_and(|u| u.name.to_lowercase().contains(&filter));
                    if !title_matches && !assignee_matches {
                        continue;
                    }
                }
                self.columns[i].push(task.id.clone());
            }
        }

        self.clamp_selection();
    }

    /// Ensure selected column and card indices are valid.
    fn clamp_selection(&mut self) {
        if self.selected_column >= COLUMN_COUNT {
            self.selected_column = 0;
        }
        let column_len = self.columns[self.selected_column].len();
        if column_len == 0 {
            self.selected_card = 0;
            self.column_scroll_offsets[self.selected_column] = 0;
        } else if self.selected_card >= column_len {
            self.selected_card = column_len - 1;
        }
    }

    fn selected_task_id(&self) -> Option<String> {
        self.columns[self.selected_column]
            .get(self.selected_card)
            .cloned()
    }

    fn set_status_message(&mut self, msg: String) {
        self.status_message = msg;
    }

    fn clear_status_message(&mut self) {
        self.status_message.clear();
    }

    /// Persist the store and rebuild the columns.
    fn save_store(&mut self) -> io::Result<()> {
        self.store.save(&self.db_path)?;
        self.update_columns();
        Ok(())
    }

    /// Position of a task within its unfiltered column.
    fn column_position(&self, task_id: &str) -> Option<(Status, usize)> {
        let tasks = self.store.get_tasks(&self.project_id).ok()?;
        let task = tasks.iter().find(|t| t.id == task_id)?;
        let index = ordering::column(tasks, task.status)
            .iter()
            .position(|t| t.id == task_id)?;
        Some((task.status, index))
    }

    /// Move the selected card one column left or right, through the gate.
    fn move_card(&mut self, delta: isize) {
        if !self.can_edit() {
            self.set_status_message(format!(
                "Read-only: your role here is {}",
                self.role.map_or("non-member", format_role)
            ));
            return;
        }
        if !self.filter_text.is_empty() {
            self.set_status_message("Clear the filter before moving cards".to_string());
            return;
        }
        let Some(task_id) = self.selected_task_id() else {
            return;
        };
        let target_column = self.selected_column as isize + delta;
        if !(0..COLUMN_COUNT as isize).contains(&target_column) {
            return;
        }
        let dest = Status::ALL[target_column as usize];
        let Some((source, source_index)) = self.column_position(&task_id) else {
            return;
        };

        let intent = MoveIntent {
            task_id: task_id.clone(),
            source,
            source_index,
            dest,
            dest_index: self.selected_card,
        };
        let result = Board::new(&mut self.store).move_task(&self.project_id, &self.user_id, &intent);
        match result {
            Ok(()) => {
                if let Err(e) = self.save_store() {
                    self.set_status_message(format!("Error saving: {e}"));
                    return;
                }
                self.selected_column = target_column as usize;
                if let Some(pos) = self.columns[self.selected_column]
                    .iter()
                    .position(|id| *id == task_id)
                {
                    self.selected_card = pos;
                } else {
                    self.clamp_selection();
                }
                self.set_status_message(format!("Moved card to {}", format_status(dest)));
            }
            Err(e) => self.set_status_message(e.to_string()),
        }
    }

    /// Reorder the selected card one slot up or down within its column.
    fn reorder_card(&mut self, delta: isize) {
        if !self.can_edit() {
            self.set_status_message(format!(
                "Read-only: your role here is {}",
                self.role.map_or("non-member", format_role)
            ));
            return;
        }
        if !self.filter_text.is_empty() {
            self.set_status_message("Clear the filter before reordering".to_string());
            return;
        }
        let Some(task_id) = self.selected_task_id() else {
            return;
        };
        let Some((status, from)) = self.column_position(&task_id) else {
            return;
        };
        let to = from as isize + delta;
        if to < 0 {
            return;
        }

        let intent = MoveIntent {
            task_id: task_id.clone(),
            source: status,
            source_index: from,
            dest: status,
            dest_index: to as usize,
        };
        let result = Board::new(&mut self.store).move_task(&self.project_id, &self.user_id, &intent);
        match result {
            Ok(()) => {
                if let Err(e) = self.save_store() {
                    self.set_status_message(format!("Error saving: {e}"));
                    return;
                }
                if let Some(pos) = self.columns[self.selected_column]
                    .iter()
                    .position(|id| *id == task_id)
                {
                    self.selected_card = pos;
                }
                self.clear_status_message();
            }
            Err(e) => self.set_status_message(e.to_string()),
        }
    }

    /// Handle keyboard input. Returns true when the app should exit.
    fn handle_input(&mut self) -> io::Result<bool> {
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                // Filter entry mode captures most keys
                if self.filter_active {
                    match key.code {
                        KeyCode::Esc => {
                            self.filter_active = false;
                            self.filter_text.clear();
                            self.update_columns();
                            self.clear_status_message();
                        }
                        KeyCode::Enter => {
                            self.filter_active = false;
                            let shown: usize = self.columns.iter().map(|c| c.len()).sum();
                            self.set_status_message(format!(
                                "Filter: '{}' ({} cards shown)",
                                self.filter_text, shown
                            ));
                        }
                        KeyCode::Backspace => {
                            self.filter_text.pop();
                            self.update_columns();
                        }
                        KeyCode::Char(c) => {
                            self.filter_text.push(c);
                            self.update_columns();
                        }
                        _ => {}
                    }
                    return Ok(false);
                }

                self.clear_status_message();

                match key.code {
                    KeyCode::Char('q') => return Ok(true),
                    KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                        return Ok(true)
                    }
                    KeyCode::Esc => {
                        if self.show_task_detail {
                            self.show_task_detail = false;
                        } else {
                            return Ok(true);
                        }
                    }

                    KeyCode::Enter => {
                        self.show_task_detail = !self.show_task_detail;
                    }

                    // Card movement (checked before plain navigation)
                    KeyCode::Left if key.modifiers.contains(KeyModifiers::CONTROL) => {
                        self.move_card(-1);
                    }
                    KeyCode::Right if key.modifiers.contains(KeyModifiers::CONTROL) => {
                        self.move_card(1);
                    }
                    KeyCode::Up if key.modifiers.contains(KeyModifiers::CONTROL) => {
                        self.reorder_card(-1);
                    }
                    KeyCode::Down if key.modifiers.contains(KeyModifiers::CONTROL) => {
                        self.reorder_card(1);
                    }

                    // Column / card navigation
                    KeyCode::Left => {
                        if self.selected_column > 0 {
                            self.selected_column -= 1;
                            self.clamp_selection();
                        }
                    }
                    KeyCode::Right => {
                        if self.selected_column < COLUMN_COUNT - 1 {
                            self.selected_column += 1;
                            self.clamp_selection();
                        }
                    }
                    KeyCode::Up => {
                        if self.selected_card > 0 {
                            self.selected_card -= 1;
                        }
                    }
                    KeyCode::Down => {
                        let column_len = self.columns[self.selected_column].len();
                        if column_len > 0 && self.selected_card < column_len - 1 {
                            self.selected_card += 1;
                        }
                    }

                    // Complete the selected card (gated like any move)
                    KeyCode::Char('d') => {
                        if let Some(task_id) = self.selected_task_id() {
                            let result = Board::new(&mut self.store).change_status(
                                &self.project_id,
                                &self.user_id,
                                &task_id,
                                Status::Done,
                            );
                            match result {
                                Ok(()) => {
                                    if let Err(e) = self.save_store() {
                                        self.set_status_message(format!("Error saving: {e}"));
                                    } else {
                                        self.set_status_message("Card marked Done".to_string());
                                    }
                                }
                                Err(e) => self.set_status_message(e.to_string()),
                            }
                        }
                    }

                    KeyCode::Char('/') => {
                        self.filter_active = true;
                        self.set_status_message(
                            "Filter: type to search title/assignee, Enter to apply, Esc to cancel"
                                .to_string(),
                        );
                    }

                    KeyCode::Char('h') => {
                        self.set_status_message(
                            "Help: Enter: Details | Ctrl+←/→: Move | Ctrl+↑/↓: Reorder | d: Done | /: Filter | q: Quit"
                                .to_string(),
                        );
                    }

                    _ => {}
                }
            }
        }
        Ok(false)
    }

    /// Render the board.
    fn render(&mut self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Min(0),    // Board
                Constraint::Length(1), // Status bar
            ])
            .split(f.area());

        self.render_header(f, chunks[0]);
        self.render_board(f, chunks[1]);
        self.render_status_bar(f, chunks[2]);

        if self.show_task_detail {
            self.render_task_detail_popup(f);
        }
    }

    fn render_header(&self, f: &mut Frame, area: Rect) {
        let (name, description) = self
            .store
            .project(&self.project_id)
            .map_or(("?".to_string(), String::new()), |p| {
                (p.name.clone(), p.description.clone())
            });
        let role = self.role.map_or("non-member", format_role);
        let user = self
            .store
            .user(&self.user_id)
            .map_or("?", |u| u.name.as_str());

        let header_text = vec![Line::from(vec![
            Span::styled(name, Style::default().add_modifier(Modifier::BOLD)),
            Span::raw("  "),
            Span::styled(
                format!("{description}  [{user} | {role}]"),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::ITALIC),
            ),
        ])];

        let header_block = Paragraph::new(header_text)
            .block(Block::default().borders(Borders::ALL))
            .alignment(Alignment::Center);
        f.render_widget(header_block, area);
    }

    fn render_board(&mut self, f: &mut Frame, area: Rect) {
        let constraints: Vec<Constraint> = (0..COLUMN_COUNT)
            .map(|_| Constraint::Percentage(100 / COLUMN_COUNT as u16))
            .collect();

        let columns_layout = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(constraints)
            .split(area);

        for (i, &column_area) in columns_layout.iter().enumerate() {
            self.render_column(f, column_area, i);
        }
    }

    fn render_column(&mut self, f: &mut Frame, area: Rect, column_index: usize) {
        let is_selected = column_index == self.selected_column;
        let accent = Self::accent(column_index);
        let title = format!(
            "{} ({})",
            format_status(Status::ALL[column_index]),
            self.columns[column_index].len()
        );

        let border_style = if is_selected {
            Style::default().fg(accent).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .title(title)
            .border_style(border_style);

        let inner = block.inner(area);
        f.render_widget(block, area);

        let cards: Vec<String> = self.columns[column_index].clone();
        if cards.is_empty() {
            return;
        }

        let card_height = 5;
        let available_height = inner.height as usize;
        let visible_cards = available_height / card_height;

        // Keep the selected card visible
        let scroll_offset = if is_selected {
            let start_visible = self.column_scroll_offsets[column_index];
            let end_visible = start_visible + visible_cards;
            if self.selected_card < start_visible {
                self.column_scroll_offsets[column_index] = self.selected_card;
                self.selected_card
            } else if self.selected_card >= end_visible && end_visible > 0 {
                let new_offset = self.selected_card - visible_cards + 1;
                self.column_scroll_offsets[column_index] = new_offset;
                new_offset
            } else {
                start_visible
            }
        } else {
            self.column_scroll_offsets[column_index]
        };

        let mut current_y = 0;
        let mut rendered_cards = 0;

        for (card_index, task_id) in cards.iter().enumerate().skip(scroll_offset) {
            let Some(task) = self
                .store
                .get_tasks(&self.project_id)
                .ok()
                .and_then(|tasks| tasks.iter().find(|t| &t.id == task_id).cloned())
            else {
                continue;
            };
            if current_y + card_height > available_height {
                break;
            }

            let is_this_card_selected = is_selected && card_index == self.selected_card;
            let card_area = Rect {
                x: inner.x,
                y: inner.y + current_y as u16,
                width: inner.width,
                height: card_height as u16,
            };
            self.render_card(f, card_area, &task, is_this_card_selected, accent);

            current_y += card_height;
            rendered_cards += 1;
        }

        if scroll_offset > 0 {
            let indicator = Paragraph::new(format!("▲ +{scroll_offset} above"))
                .style(Style::default().fg(Color::Cyan));
            f.render_widget(
                indicator,
                Rect {
                    x: inner.x,
                    y: inner.y,
                    width: inner.width,
                    height: 1,
                },
            );
        }

        let remaining = cards.len() - scroll_offset - rendered_cards;
        if remaining > 0 && inner.height > 0 {
            let indicator = Paragraph::new(format!("▼ +{remaining} below"))
                .style(Style::default().fg(Color::Cyan));
            f.render_widget(
                indicator,
                Rect {
                    x: inner.x,
                    y: inner.y + inner.height - 1,
                    width: inner.width,
                    height: 1,
                },
            );
        }
    }

    fn render_card(&self, f: &mut Frame, area: Rect, task: &Task, is_selected: bool, accent: Color) {
        let all_tasks = self.store.get_tasks(&self.project_id).unwrap_or(&[]);
        let blocked = deps::is_blocked(task, all_tasks).blocked;

        let style = if is_selected {
            Style::default().bg(accent).fg(Color::Black).add_modifier(Modifier::BOLD)
        } else if blocked {
            Style::default().bg(Color::DarkGray).fg(DARK_RED)
        } else {
            Style::default().bg(Color::DarkGray)
        };

        let mut card_text = vec![Line::from(format!(
            "{}  {}",
            task.id,
            format_priority(task.priority)
        ))];

        // Word-wrap the title into at most two lines
        let available_width = area.width.saturating_sub(2) as usize;
        let mut current_line = String::new();
        let mut lines = Vec::new();
        for word in task.title.split_whitespace() {
            if current_line.is_empty() {
                current_line = word.to_string();
            } else if current_line.len() + 1 + word.len() <= available_width {
                current_line.push(' ');
                current_line.push_str(word);
            } else {
                lines.push(current_line.clone());
                current_line = word.to_string();
                if lines.len() >= 2 {
                    break;
                }
            }
        }
        if !current_line.is_empty() && lines.len() < 2 {
            lines.push(current_line);
        }
        for line in lines {
            card_text.push(Line::from(line));
        }

        let footer = if blocked {
            "⛔ blocked".to_string()
        } else {
            let assignee = task
                .assignee_id
                .as_deref()
                .and_then(|id| self.store.user(id))
                .map_or("-", |u| u.name.as_str());
            let (done, total) = task.subtask_progress();
            if total > 0 {
                format!("{assignee} | {done}/{total}")
            } else {
                assignee.to_string()
            }
        };
        card_text.push(Line::from(footer));

        let card_block = Paragraph::new(card_text)
            .block(Block::default().borders(Borders::ALL))
            .style(style)
            .wrap(Wrap { trim: true });

        f.render_widget(card_block, area);
    }

    fn render_status_bar(&self, f: &mut Frame, area: Rect) {
        let status_text = if self.filter_active {
            format!(
                "Filter: {} | Type to search, Enter to apply, Esc to cancel",
                self.filter_text
            )
        } else if !self.status_message.is_empty() {
            self.status_message.clone()
        } else {
            let total: usize = self.columns.iter().map(|col| col.len()).sum();
            let filter_indicator = if self.filter_text.is_empty() {
                String::new()
            } else {
                format!(" [Filter: {}]", self.filter_text)
            };
            format!(
                "Cards: {total}{filter_indicator} | Ctrl+←/→: Move | Ctrl+↑/↓: Reorder | d: Done | /: Filter | h: Help"
            )
        };

        let accent = Self::accent(self.selected_column);
        let text_color = match accent {
            GOLD | SLATE => Color::Rgb(20, 20, 20),
            _ => Color::White,
        };

        let status = Paragraph::new(status_text)
            .style(Style::default().bg(accent).fg(text_color))
            .alignment(Alignment::Left);
        f.render_widget(status, area);
    }

    fn render_task_detail_popup(&self, f: &mut Frame) {
        let Some(task_id) = self.selected_task_id() else {
            return;
        };
        let Some(tasks) = self.store.get_tasks(&self.project_id).ok() else {
            return;
        };
        let Some(task) = tasks.iter().find(|t| t.id == task_id) else {
            return;
        };

        let popup_area = {
            let area = f.area();
            let popup_width = (area.width * 80) / 100;
            let popup_height = (area.height * 80) / 100;
            let x = (area.width - popup_width) / 2;
            let y = (area.height - popup_height) / 2;
            Rect::new(x, y, popup_width, popup_height)
        };
        f.render_widget(Clear, popup_area);

        let assignee = task
            .assignee_id
            .as_deref()
            .and_then(|id| self.store.user(id))
            .map_or("-".to_string(), |u| u.name.clone());
        let dep_line = if task.dependencies.is_empty() {
            "-".to_string()
        } else {
            task.dependencies.join(", ")
        };

        let mut detail_lines = vec![
            Line::from(vec![Span::styled(
                format!("Task {}: {}", task.id, task.title),
                Style::default().add_modifier(Modifier::BOLD),
            )]),
            Line::from(""),
            Line::from(format!("Status:     {}", format_status(task.status))),
            Line::from(format!("Priority:   {}", format_priority(task.priority))),
            Line::from(format!("Assignee:   {assignee}")),
            Line::from(format!(
                "Due:        {}",
                format_due_relative(task.due, today())
            )),
            Line::from(format!("Depends on: {dep_line}")),
        ];

        let dep_status = deps::is_blocked(task, tasks);
        if dep_status.blocked {
            detail_lines.push(Line::from(Span::styled(
                format!(
                    "Blocked by: {}",
                    deps::blocking_titles(task, tasks).join(", ")
                ),
                Style::default().fg(DARK_RED),
            )));
        }

        if !task.description.is_empty() {
            detail_lines.push(Line::from(""));
            detail_lines.push(Line::from("Description:"));
            detail_lines.push(Line::from(task.description.clone()));
        }

        if !task.subtasks.is_empty() {
            detail_lines.push(Line::from(""));
            detail_lines.push(Line::from("Subtasks:"));
            for st in &task.subtasks {
                let tick = if st.completed { "x" } else { " " };
                detail_lines.push(Line::from(format!("  [{tick}] {}", st.title)));
            }
        }

        if !task.comments.is_empty() {
            detail_lines.push(Line::from(""));
            detail_lines.push(Line::from("Comments:"));
            for c in &task.comments {
                let author = self.store.user(&c.user_id).map_or("?", |u| u.name.as_str());
                detail_lines.push(Line::from(format!("  {author}: {}", c.content)));
            }
        }

        let popup_block = Block::default()
            .borders(Borders::ALL)
            .title("Task Details (Press Enter to close)")
            .title_alignment(Alignment::Center)
            .border_style(
                Style::default()
                    .fg(Self::accent(self.selected_column))
                    .add_modifier(Modifier::BOLD),
            );

        let popup_paragraph = Paragraph::new(detail_lines)
            .block(popup_block)
            .wrap(Wrap { trim: true })
            .style(Style::default().bg(Color::Black));

        f.render_widget(popup_paragraph, popup_area);
    }

    /// Main event loop.
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            terminal.draw(|f| self.render(f))?;
            if self.handle_input()? {
                break;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app() -> (tempfile::TempDir, BoardApp) {
        let dir = tempfile::tempdir().unwrap();
        let app = BoardApp::new(&dir.path().join("workspace.json"), "p1", "u1").unwrap();
        (dir, app)
    }

    #[test]
    fn test_cross_column_move_refused_while_filtered() {
        let (_dir, mut app) = app();
        // Only t2 matches, so visible indices no longer line up with the
        // unfiltered Todo column.
        app.filter_text = "pipeline".into();
        app.update_columns();
        app.selected_column = 0;
        app.selected_card = 0;

        app.move_card(1);

        assert_eq!(
            app.store.project("p1").unwrap().task("t2").unwrap().status,
            Status::Todo
        );
        assert!(app.status_message.contains("filter"));
    }

    #[test]
    fn test_cross_column_move_allowed_after_clearing_filter() {
        let (_dir, mut app) = app();
        app.filter_text.clear();
        app.update_columns();
        app.selected_column = 0;
        app.selected_card = app.columns[0].iter().position(|id| id == "t2").unwrap();

        app.move_card(1);

        assert_eq!(
            app.store.project("p1").unwrap().task("t2").unwrap().status,
            Status::InProgress
        );
        assert_eq!(app.selected_column, 1);
    }
}
