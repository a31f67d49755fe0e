use crate::{
    actions::HELP,
    app::{App, Focus},
    forms::Form,
    logo,
};
use nameboard::controller::{Slot, Tab, Tone};
use nameboard::view::{self, Node};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Tabs, Wrap},
};

pub fn draw(f: &mut Frame, app: &App) {
    let size = f.size();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(6),
            Constraint::Length(3),
            Constraint::Length(1),
        ])
        .split(size);

    f.render_widget(logo::nameboard_logo(), chunks[0]);
    render_identity(f, app, chunks[1]);
    render_tabs(f, app, chunks[2]);
    match app.controller.state().active_tab {
        Tab::Board => render_board_tab(f, app, chunks[3]),
        Tab::Mentions => render_mentions_tab(f, app, chunks[3]),
    }
    render_notices(f, app, chunks[4]);

    let (text, color) = if let Some(status) = &app.status {
        (status.msg.clone(), status.color)
    } else {
        let help = HELP.iter().map(|(k, v)| format!("{k}: {v}")).collect::<Vec<_>>().join("  ");
        (help, Color::DarkGray)
    };
    f.render_widget(Paragraph::new(text).style(Style::default().fg(color)), chunks[5]);

    if let Some(form) = &app.form {
        render_form(f, form);
    }
}

fn panel_block(title: &str, focused: bool) -> Block {
    let mut block = Block::default().title(title).borders(Borders::ALL);
    if focused {
        block = block.border_style(Style::default().fg(Color::Yellow));
    }
    block
}

fn render_identity(f: &mut Frame, app: &App, area: Rect) {
    let state = app.controller.state();
    let mut spans = vec![Span::styled(view::whoami(&state.identity), Style::default().add_modifier(Modifier::BOLD))];
    if !state.auth_hidden {
        spans.push(Span::styled("   g: register  b: bind existing user_id", Style::default().fg(Color::Cyan)));
    }
    if !state.viewer_name.is_empty() {
        spans.push(Span::styled(format!("   viewing as {}", state.viewer_name), Style::default().fg(Color::DarkGray)));
    }
    f.render_widget(Paragraph::new(Line::from(spans)).block(panel_block("Who am I", false)), area);
}

fn render_tabs(f: &mut Frame, app: &App, area: Rect) {
    let tabs = [Tab::Board, Tab::Mentions];
    let active = tabs.iter().position(|t| *t == app.controller.state().active_tab).unwrap_or(0);
    let widget = Tabs::new(tabs.iter().map(|t| t.title()).collect::<Vec<_>>())
        .select(active)
        .block(Block::default().borders(Borders::ALL))
        .highlight_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));
    f.render_widget(widget, area);
}

fn render_board_tab(f: &mut Frame, app: &App, area: Rect) {
    let state = app.controller.state();
    let search = view::render_show_panel(&state.search, &state.comments, true);
    if search.is_empty() {
        let board = view::render_show_panel(&state.board, &state.comments, false);
        render_fragment(f, "Board", &board, app.focus == Focus::Board, app.selection, area);
        return;
    }
    let halves = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(area);
    let board = view::render_show_panel(&state.board, &state.comments, false);
    render_fragment(f, "Search results", &search, app.focus == Focus::Search, app.selection, halves[0]);
    render_fragment(f, "Board", &board, app.focus == Focus::Board, app.selection, halves[1]);
}

fn render_mentions_tab(f: &mut Frame, app: &App, area: Rect) {
    let fragment = view::render_mentions(&app.controller.state().mentions);
    render_fragment(f, "Comments on your shows", &fragment, false, 0, area);
}

fn render_fragment(f: &mut Frame, title: &str, fragment: &[Node], focused: bool, selection: usize, area: Rect) {
    let items: Vec<ListItem> = fragment.iter().map(node_item).collect();
    let has_cards = fragment.iter().any(|n| matches!(n, Node::Card(_)));
    let mut state = ListState::default();
    if focused && has_cards {
        state.select(Some(selection));
    }
    let list = List::new(items)
        .block(panel_block(title, focused))
        .highlight_style(Style::default().bg(Color::Blue));
    f.render_stateful_widget(list, area, &mut state);
}

fn node_lines(node: &Node, indent: usize) -> Vec<Line<'static>> {
    let pad = " ".repeat(indent);
    match node {
        Node::Empty(text) => {
            vec![Line::styled(format!("{pad}{text}"), Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC))]
        }
        Node::Muted(text) => vec![Line::styled(format!("{pad}{text}"), Style::default().fg(Color::DarkGray))],
        Node::Error(text) => vec![Line::styled(format!("{pad}{text}"), Style::default().fg(Color::Red))],
        Node::Comment(line) => vec![Line::from(vec![
            Span::raw(pad),
            Span::styled(format!("[{}]", line.visibility), Style::default().fg(Color::Magenta)),
            Span::raw(" "),
            Span::styled(line.author.clone(), Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(format!(": {}", line.content)),
        ])],
        Node::Card(card) => {
            let mut lines = vec![Line::from(vec![
                Span::raw(pad.clone()),
                Span::styled(card.id_line(), Style::default().fg(Color::DarkGray)),
                Span::raw(" "),
                Span::styled(card.title.clone(), Style::default().add_modifier(Modifier::BOLD)),
            ])];
            lines.extend(card.details.iter().map(|d| Line::raw(format!("{pad}  {d}"))));
            if let Some(h) = &card.highlight {
                lines.push(Line::styled(format!("{pad}  {h}"), Style::default().fg(Color::Green)));
            }
            lines.push(Line::styled(format!("{pad}  Comments:"), Style::default().fg(Color::DarkGray)));
            for c in &card.comments {
                lines.extend(node_lines(c, indent + 4));
            }
            if card.comment_form {
                lines.push(Line::styled(format!("{pad}  c: leave a comment"), Style::default().fg(Color::Cyan)));
            }
            lines.push(Line::raw(""));
            lines
        }
    }
}

fn node_item(node: &Node) -> ListItem<'static> {
    ListItem::new(Text::from(node_lines(node, 0)))
}

fn render_notices(f: &mut Frame, app: &App, area: Rect) {
    let state = app.controller.state();
    let order = [Slot::Register, Slot::Bind, Slot::Logout, Slot::CreateShow, Slot::Comment];
    let lines: Vec<Line> = order
        .iter()
        .filter_map(|slot| state.notice(*slot))
        .map(|n| {
            let color = match n.tone {
                Tone::Ok => Color::Green,
                Tone::Err => Color::Red,
            };
            Line::styled(n.text.clone(), Style::default().fg(color))
        })
        .collect();
    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }).block(panel_block("Messages", false)), area);
}

fn render_form(f: &mut Frame, form: &Form) {
    let area = centered_rect(60, 40, f.size());
    f.render_widget(Clear, area);
    let block = Block::default().title(form.title()).borders(Borders::ALL);
    let mut lines: Vec<Line> = form
        .fields
        .iter()
        .enumerate()
        .map(|(i, field)| {
            let style =
                if i == form.focused { Style::default().fg(Color::Yellow) } else { Style::default() };
            Line::styled(format!("{}: {}", field.label, field.display()), style)
        })
        .collect();
    lines.push(Line::raw(""));
    lines.push(Line::styled("enter: submit  esc: cancel  tab: next field  space/←→: change option", Style::default().fg(Color::DarkGray)));
    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use nameboard::models::Visibility;
    use nameboard::view::{Card, CommentLine};

    #[test]
    fn card_lines_nest_comments_and_form_hint() {
        let card = Node::Card(Card {
            show_id: 3,
            title: "Spring Tour".into(),
            details: vec!["Owner: Alice".into()],
            highlight: None,
            comments: vec![Node::Comment(CommentLine {
                visibility: Visibility::Public,
                author: "Bob".into(),
                content: "hi".into(),
            })],
            comment_form: true,
        });
        let lines = node_lines(&card, 0);
        let text: Vec<String> =
            lines.iter().map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect::<String>()).collect();
        assert_eq!(text[0], "#3 Spring Tour");
        assert_eq!(text[1], "  Owner: Alice");
        assert_eq!(text[3], "    [public] Bob: hi");
        assert_eq!(text[4], "  c: leave a comment");
    }
}
