use ratatui::{
    Frame,
    layout::{Constraint, Flex, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    symbols::border,
    text::{Line, Span, Text},
    widgets::{Block, Clear, Gauge, Paragraph, Wrap},
};

use crate::domain::{APP_TITLE, CMDMode, HELP_TEXT};
use crate::model::{
    BANNER_HEIGHT, CARD_BORDER, HEADER_HEIGHT, Model, PROGRESS_HEIGHT, ResultCard, ResultsView,
    SEARCH_HEIGHT, STATUSLINE_HEIGHT,
};
use crate::notify::{Notice, NoticeKind};

const TOAST_HEIGHT: u16 = 3;
const TOAST_WIDTH: u16 = 60;
const PROMPT_WIDTH: u16 = 70;

const QUERY_HINT: &str = "Search for text in your CSV data...";

#[derive(Debug, Default)]
pub struct TableUI {}

impl TableUI {
    pub fn new() -> Self {
        Self {}
    }

    pub fn draw(&self, model: &Model, frame: &mut Frame) {
        let banner = model.notifications().banner();
        let [header, banner_area, progress, search, results, statusline] = Layout::vertical([
            Constraint::Length(HEADER_HEIGHT),
            Constraint::Length(if banner.is_some() { BANNER_HEIGHT } else { 0 }),
            Constraint::Length(PROGRESS_HEIGHT),
            Constraint::Length(SEARCH_HEIGHT),
            Constraint::Min(0),
            Constraint::Length(STATUSLINE_HEIGHT),
        ])
        .areas(frame.area());

        self.render_header(model, frame, header);
        self.render_progress(model, frame, progress);
        self.render_search(model, frame, search);
        self.render_results(model, frame, results);
        self.render_statusline(model, frame, statusline);

        if let Some(banner) = banner {
            self.render_banner(banner, frame, banner_area);
        }
        self.render_toasts(model.notifications().toasts(), frame, results);

        if model.cmd_mode() == Some(CMDMode::UploadPath) {
            self.render_path_prompt(model, frame);
        }
        if model.show_help() {
            self.render_help(frame);
        }
    }

    fn render_header(&self, model: &Model, frame: &mut Frame, area: Rect) {
        let title = Line::from(Span::styled(
            format!(" {APP_TITLE} "),
            Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
        ));
        let delete = if model.delete_enabled() {
            Line::from(vec!["<D>".blue().bold(), " Delete File ".into()])
        } else {
            Line::from(vec!["<D>".dark_gray(), " Delete File ".dark_gray()])
        };
        let mut actions = vec!["<U>".blue().bold(), " Upload CSV ".into()];
        actions.extend(delete.spans);
        actions.extend([
            "</>".blue().bold(),
            " Search ".into(),
            "<?>".blue().bold(),
            " Help ".into(),
            "<Q>".blue().bold(),
            " Quit".into(),
        ]);

        let block = Block::bordered()
            .title(title.centered())
            .border_set(border::THICK);
        frame.render_widget(
            Paragraph::new(Line::from(actions)).centered().block(block),
            area,
        );
    }

    fn render_progress(&self, model: &Model, frame: &mut Frame, area: Rect) {
        let Some(progress) = model.progress() else {
            return;
        };
        let label = format!(
            "{}% {}",
            progress.percent(),
            progress.path().to_string_lossy()
        );
        let gauge = Gauge::default()
            .gauge_style(Style::default().fg(Color::Blue))
            .percent(progress.percent())
            .label(label);
        frame.render_widget(gauge, area);
    }

    fn render_search(&self, model: &Model, frame: &mut Frame, area: Rect) {
        let input = model.query_input();
        let active = model.cmd_mode() == Some(CMDMode::SearchQuery);

        let block = Block::bordered()
            .title(" Enter search query ")
            .border_style(if active {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default()
            });
        let text = if input.input.is_empty() && !active {
            Line::from(QUERY_HINT.dark_gray())
        } else {
            Line::from(input.input.clone())
        };
        let inner = block.inner(area);
        frame.render_widget(Paragraph::new(text).block(block), area);

        if active {
            frame.set_cursor_position((inner.x + input.curser_pos as u16, inner.y));
        }
    }

    fn render_results(&self, model: &Model, frame: &mut Frame, area: Rect) {
        let title = match model.results() {
            ResultsView::Matches(set) => {
                format!(" Results for \"{}\" ", set.query().as_str())
            }
            _ => " Results ".to_string(),
        };
        let block = Block::bordered().title(title);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        match model.results() {
            ResultsView::Cleared => {
                if model.dataset().is_none() {
                    frame.render_widget(
                        Paragraph::new("Upload a CSV file to start searching.".dark_gray()),
                        inner,
                    );
                }
            }
            ResultsView::NoResults => {
                frame.render_widget(
                    Paragraph::new("No results found!".red().bold()),
                    inner,
                );
            }
            ResultsView::Matches(_) => self.render_cards(model, frame, inner),
        }
    }

    fn render_cards(&self, model: &Model, frame: &mut Frame, area: Rect) {
        let ncols = model.dataset().map(|d| d.ncols()).unwrap_or(0);
        let card_height = (ncols as u16).saturating_add(CARD_BORDER);
        let mut y = area.y;
        let mut idx = model.offset();

        // The last card may be cut off at the bottom
        while y < area.bottom() {
            let Some(card) = model.result_card(idx) else {
                break;
            };
            let card_area = Rect {
                x: area.x,
                y,
                width: area.width,
                height: std::cmp::min(card_height, area.bottom() - y),
            };
            self.render_card(&card, idx == model.selected(), frame, card_area);
            y = y.saturating_add(card_height);
            idx += 1;
        }
    }

    fn render_card(&self, card: &ResultCard, selected: bool, frame: &mut Frame, area: Rect) {
        let lines: Vec<Line> = card
            .fields
            .iter()
            .map(|(name, value)| {
                Line::from(vec![
                    Span::styled(
                        format!("{name}: "),
                        Style::default()
                            .fg(Color::Blue)
                            .add_modifier(Modifier::BOLD),
                    ),
                    Span::raw(value.replace("\r\n", " ↵ ").replace('\n', " ↵ ")),
                ])
            })
            .collect();

        let mut block = Block::bordered()
            .title(format!(" #{} ", card.row + 1))
            .border_style(Style::default().fg(Color::Green));
        if selected {
            block = block
                .border_set(border::THICK)
                .border_style(Style::default().fg(Color::Yellow));
        }
        frame.render_widget(Paragraph::new(Text::from(lines)).block(block), area);
    }

    fn render_statusline(&self, model: &Model, frame: &mut Frame, area: Rect) {
        let left = match model.dataset() {
            Some(ds) => format!(" {} | {} rows × {} columns", ds.name(), ds.nrows(), ds.ncols()),
            None => " No file loaded".to_string(),
        };
        let right = match model.results() {
            ResultsView::Matches(set) => format!(
                "result {}/{} ",
                model.selected() + 1,
                set.len()
            ),
            ResultsView::NoResults => "0 results ".to_string(),
            ResultsView::Cleared => String::new(),
        };
        let [left_area, right_area] =
            Layout::horizontal([Constraint::Min(0), Constraint::Length(right.len() as u16)])
                .areas(area);
        let style = Style::default().bg(Color::DarkGray).fg(Color::White);
        frame.render_widget(Paragraph::new(left).style(style), left_area);
        frame.render_widget(Paragraph::new(right).style(style), right_area);
    }

    fn render_banner(&self, banner: &Notice, frame: &mut Frame, area: Rect) {
        let (color, icon) = match banner.kind {
            NoticeKind::Success => (Color::Green, "✔"),
            NoticeKind::Info => (Color::Yellow, "ℹ"),
            NoticeKind::Error => (Color::Red, "✖"),
        };
        let line = Line::from(vec![
            Span::styled(
                format!(" {icon} "),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ),
            Span::raw(banner.message.clone()),
            "  <Esc> Close".dark_gray(),
        ]);
        let block = Block::bordered().border_style(Style::default().fg(color));
        frame.render_widget(Paragraph::new(line).block(block), area);
    }

    fn render_toasts(&self, toasts: &[Notice], frame: &mut Frame, area: Rect) {
        let width = std::cmp::min(TOAST_WIDTH, area.width);
        let mut bottom = area.bottom();
        for toast in toasts.iter().rev() {
            if bottom < area.y + TOAST_HEIGHT {
                break;
            }
            let toast_area = Rect {
                x: area.right().saturating_sub(width),
                y: bottom - TOAST_HEIGHT,
                width,
                height: TOAST_HEIGHT,
            };
            let block = Block::bordered().border_style(Style::default().fg(Color::Red));
            frame.render_widget(Clear, toast_area);
            frame.render_widget(
                Paragraph::new(toast.message.as_str())
                    .style(Style::default().fg(Color::Red))
                    .wrap(Wrap { trim: true })
                    .block(block),
                toast_area,
            );
            bottom -= TOAST_HEIGHT;
        }
    }

    fn render_path_prompt(&self, model: &Model, frame: &mut Frame) {
        let input = model.path_input();
        let area = centered_rect(frame.area(), PROMPT_WIDTH, 4);
        let block = Block::bordered()
            .title(" Upload CSV ")
            .title_bottom(Line::from(" <Enter> Upload  <Esc> Cancel ").centered())
            .border_style(Style::default().fg(Color::Cyan));
        let inner = block.inner(area);
        frame.render_widget(Clear, area);
        frame.render_widget(
            Paragraph::new(vec![
                Line::from("Path of the CSV file:".dark_gray()),
                Line::from(input.input.clone()),
            ])
            .block(block),
            area,
        );
        frame.set_cursor_position((inner.x + input.curser_pos as u16, inner.y + 1));
    }

    fn render_help(&self, frame: &mut Frame) {
        let height = HELP_TEXT.lines().count() as u16 + 2;
        let area = centered_rect(frame.area(), 50, height);
        let block = Block::bordered()
            .title(" Help ")
            .title_bottom(Line::from(" <Esc> Close ").centered())
            .border_set(border::THICK);
        frame.render_widget(Clear, area);
        frame.render_widget(Paragraph::new(HELP_TEXT).block(block), area);
    }
}

fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let [area] = Layout::horizontal([Constraint::Length(width)])
        .flex(Flex::Center)
        .areas(area);
    let [area] = Layout::vertical([Constraint::Length(height)])
        .flex(Flex::Center)
        .areas(area);
    area
}
