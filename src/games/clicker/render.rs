//! Idle Clicker rendering: balance panel, upgrade list, bonus field, log.

use std::cell::RefCell;
use std::rc::Rc;

use ratzilla::ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratzilla::ratatui::style::{Color, Modifier, Style};
use ratzilla::ratatui::text::{Line, Span};
use ratzilla::ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratzilla::ratatui::Frame;

use crate::input::{is_wide_layout, ClickState};
use crate::widgets::ClickableList;

use super::actions::{
    BONUS_SLOT_SPAN, BUY_UPGRADE_BASE, COLLECT_BONUS_BASE, PRIMARY_ACTION, RESET_PROGRESS,
};
use super::display::{Display, UpgradeControl};
use super::state::{BonusItem, ClickerState, UpgradeKind};

/// Text drawn for each bonus coin.
const BONUS_LABEL: &str = "+5";

pub fn render(
    state: &ClickerState,
    f: &mut Frame,
    area: Rect,
    click_state: &Rc<RefCell<ClickState>>,
) {
    let display = Display::project(state);

    let (main_area, log_area) = if is_wide_layout(area.width) {
        let h_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(area);
        (h_chunks[0], Some(h_chunks[1]))
    } else {
        (area, None)
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(7),
            Constraint::Length(display.controls.len() as u16 + 2),
            Constraint::Min(5),
        ])
        .split(main_area);

    render_balance(&display, f, chunks[0], click_state);
    render_upgrades(&display, f, chunks[1], click_state);
    render_bonus_field(state, &display, f, chunks[2], click_state);

    if let Some(log_area) = log_area {
        render_log(state, f, log_area);
    }
}

fn render_balance(
    display: &Display,
    f: &mut Frame,
    area: Rect,
    click_state: &Rc<RefCell<ClickState>>,
) {
    let mut cl = ClickableList::new();
    cl.push(Line::from(vec![
        Span::styled(" 💰 ", Style::default().fg(Color::Yellow)),
        Span::styled(
            format!("{} コイン", display.currency),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
    ]));

    let mut rates = vec![Span::styled(
        format!(" クリック +{}", display.per_action),
        Style::default().fg(Color::White),
    )];
    if let Some(per_second) = &display.per_second {
        rates.push(Span::styled(
            format!("  自動 +{}/秒 (Lv {})", per_second, display.generator_level),
            Style::default().fg(Color::Green),
        ));
    }
    cl.push(Line::from(rates));
    cl.push(Line::from(Span::styled(
        format!(
            " 累計 {} コイン / {} 回クリック",
            display.currency_all_time, display.total_actions
        ),
        Style::default().fg(Color::DarkGray),
    )));

    cl.push_clickable(
        Line::from(Span::styled(
            " [c] コインを稼ぐ (Space)",
            Style::default()
                .fg(Color::Black)
                .bg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )),
        PRIMARY_ACTION,
    );
    cl.push_clickable(
        Line::from(Span::styled(" [R] 最初からやり直す", Style::default().fg(Color::DarkGray))),
        RESET_PROGRESS,
    );

    let mut cs = click_state.borrow_mut();
    cl.register_targets(area, &mut cs, 1, 1);

    let widget = Paragraph::new(cl.into_lines()).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow))
            .title(" Idle Clicker "),
    );
    f.render_widget(widget, area);
}

fn upgrade_line(control: &UpgradeControl) -> Line<'static> {
    let (key_style, text_style) = if control.enabled {
        (
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
            Style::default().fg(Color::White),
        )
    } else {
        (
            Style::default().fg(Color::DarkGray),
            Style::default().fg(Color::DarkGray),
        )
    };

    let mut spans = vec![
        Span::styled(format!(" [{}] ", control.kind.key()), key_style),
        Span::styled(control.label.clone(), text_style),
    ];
    if let Some(level) = &control.level {
        spans.push(Span::styled(format!(" Lv{}", level), text_style));
    }
    spans.push(Span::styled(
        format!("  {} コイン", control.cost),
        text_style,
    ));
    spans.push(Span::styled(
        format!("  {}", control.description),
        Style::default().fg(Color::DarkGray),
    ));
    if let Some(secs) = control.running_secs {
        spans.push(Span::styled(
            format!("  残り{}秒", secs),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ));
    }
    Line::from(spans)
}

fn render_upgrades(
    display: &Display,
    f: &mut Frame,
    area: Rect,
    click_state: &Rc<RefCell<ClickState>>,
) {
    let mut cl = ClickableList::new();
    for control in &display.controls {
        if control.enabled {
            cl.push_clickable(
                upgrade_line(control),
                BUY_UPGRADE_BASE + control.kind.index() as u16,
            );
        } else {
            cl.push(upgrade_line(control));
        }
    }

    let mut cs = click_state.borrow_mut();
    cl.register_targets(area, &mut cs, 1, 1);

    let widget = Paragraph::new(cl.into_lines()).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Magenta))
            .title(" アップグレード "),
    );
    f.render_widget(widget, area);
}

/// Cell a bonus coin occupies inside the field's inner area.
pub fn bonus_cell(inner: Rect, item: &BonusItem) -> Rect {
    let width = (BONUS_LABEL.len() as u16).min(inner.width);
    let free_cols = inner.width.saturating_sub(width) as u32;
    let free_rows = inner.height.saturating_sub(1) as u32;
    let x = inner.x + (free_cols * item.x_pct.min(100) as u32 / 100) as u16;
    let y = inner.y + (free_rows * item.y_pct.min(100) as u32 / 100) as u16;
    Rect::new(x, y, width, inner.height.min(1))
}

/// Action id a bonus coin dispatches when tapped.
pub fn bonus_action(item: &BonusItem) -> u16 {
    COLLECT_BONUS_BASE + (item.id % BONUS_SLOT_SPAN as u32) as u16
}

fn render_bonus_field(
    state: &ClickerState,
    display: &Display,
    f: &mut Frame,
    area: Rect,
    click_state: &Rc<RefCell<ClickState>>,
) {
    let title = match state.remaining_ms(UpgradeKind::Magnet) {
        Some(ms) => format!(
            " ボーナス {}枚 残り{}秒 ",
            display.bonus_count,
            ms.div_ceil(1000)
        ),
        None => " ボーナス ".to_string(),
    };
    let border_color = if state.magnet_active { Color::Cyan } else { Color::DarkGray };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(title);
    let inner = block.inner(area);
    f.render_widget(block, area);

    if state.bonus_items.is_empty() {
        let hint = Paragraph::new(Line::from(Span::styled(
            "マグネットを使うとコインが現れます",
            Style::default().fg(Color::DarkGray),
        )))
        .wrap(Wrap { trim: false });
        f.render_widget(hint, inner);
        return;
    }

    let coin_style = Style::default()
        .fg(Color::Black)
        .bg(Color::Yellow)
        .add_modifier(Modifier::BOLD);
    let mut cs = click_state.borrow_mut();
    for item in &state.bonus_items {
        let cell = bonus_cell(inner, item);
        if cell.width == 0 || cell.height == 0 {
            continue;
        }
        f.render_widget(
            Paragraph::new(Line::from(Span::styled(BONUS_LABEL, coin_style))),
            cell,
        );
        cs.add_click_target(cell, bonus_action(item));
    }
}

fn render_log(state: &ClickerState, f: &mut Frame, area: Rect) {
    let visible_height = area.height.saturating_sub(2) as usize;

    // Newest first
    let log_lines: Vec<Line> = state
        .log
        .iter()
        .rev()
        .take(visible_height)
        .enumerate()
        .map(|(i, entry)| {
            let is_recent = i < 3;
            let style = match (entry.is_important, is_recent) {
                (true, true) => Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
                (true, false) => Style::default().fg(Color::Yellow),
                (false, true) => Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
                (false, false) => Style::default().fg(Color::DarkGray),
            };
            Line::from(Span::styled(entry.text.as_str(), style))
        })
        .collect();

    let widget = Paragraph::new(log_lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Blue))
                .title(" Log "),
        )
        .wrap(Wrap { trim: false });
    f.render_widget(widget, area);
}
