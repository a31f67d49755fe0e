use ratatui::{prelude::*, widgets::Paragraph};

pub fn nameboard_logo() -> Paragraph<'static> {
    const NAME: [&str; 5] = [
        "█   █  ███  █   █ █████",
        "██  █ █   █ ██ ██ █",
        "█ █ █ █████ █ █ █ ████",
        "█  ██ █   █ █   █ █",
        "█   █ █   █ █   █ █████",
    ];

    const BOARD: [&str; 5] = [
        "████   ███   ███  ████  ████",
        "█   █ █   █ █   █ █   █ █   █",
        "████  █   █ █████ ████  █   █",
        "█   █ █   █ █   █ █  █  █   █",
        "████   ███  █   █ █   █ ████",
    ];

    // block glyphs are multi-byte, so pad by chars rather than `{:<width$}`
    let left_width = NAME.iter().map(|l| l.chars().count()).max().unwrap_or(0) + 2;
    let lines: Vec<Line> = NAME
        .iter()
        .zip(BOARD.iter())
        .map(|(n, b)| {
            let padding = " ".repeat(left_width - n.chars().count());
            Line::from(vec![
                Span::styled(format!("{n}{padding}"), Style::default().fg(Color::White).add_modifier(Modifier::BOLD)),
                Span::styled(*b, Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD)),
            ])
        })
        .collect();

    Paragraph::new(lines).alignment(Alignment::Center)
}
