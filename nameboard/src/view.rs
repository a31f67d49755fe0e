//! Rendering: board data in, a `Fragment` view tree out. Nothing here keeps
//! state; front ends rebuild fragments on every draw and replace what they
//! showed before.

use std::collections::HashMap;

use itertools::Itertools;

use crate::identity::Identity;
use crate::mentions::{Mentions, PREVIEW_LIMIT};
use crate::models::{Comment, Show, Visibility};

pub const EMPTY_BOARD: &str = "No shows yet. Check back later.";
pub const EMPTY_COMMENTS: &str = "No comments visible to you.";
pub const NO_OWNED_SHOWS: &str = "You have not registered any shows.";
pub const NO_MENTIONS: &str = "Nobody else has commented on your shows yet.";
pub const LOADING: &str = "Loading…";

/// Load state of one panel of the board.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Panel<T> {
    #[default]
    Idle,
    Loading,
    Ready(T),
    /// Holds the full message to display.
    Failed(String),
}

impl<T> Panel<T> {
    pub fn ready(&self) -> Option<&T> {
        match self {
            Panel::Ready(value) => Some(value),
            _ => None,
        }
    }
}

pub type Fragment = Vec<Node>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Explicit "no data" state.
    Empty(String),
    Muted(String),
    Error(String),
    Card(Card),
    Comment(CommentLine),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    pub show_id: u64,
    pub title: String,
    pub details: Vec<String>,
    pub highlight: Option<String>,
    pub comments: Vec<Node>,
    /// Whether the card offers a comment form.
    pub comment_form: bool,
}

impl Card {
    pub fn id_line(&self) -> String {
        format!("#{}", self.show_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentLine {
    pub visibility: Visibility,
    pub author: String,
    pub content: String,
}

impl CommentLine {
    pub fn to_text(&self) -> String {
        format!("[{}] {}: {}", self.visibility, self.author, self.content)
    }
}

pub fn whoami(identity: &Identity) -> String {
    match identity.user_id.as_deref() {
        Some(id) => format!("{} · {id}", identity.user_name.as_deref().unwrap_or("(unnamed)")),
        None => "Nobody signed in".to_string(),
    }
}

pub fn comment_line(comment: &Comment) -> Node {
    Node::Comment(CommentLine {
        visibility: comment.visibility,
        author: comment.author_name.clone(),
        content: comment.content.clone(),
    })
}

pub fn render_comments(panel: &Panel<Vec<Comment>>) -> Fragment {
    match panel {
        Panel::Idle | Panel::Loading => vec![Node::Muted(LOADING.to_string())],
        Panel::Ready(list) if list.is_empty() => vec![Node::Empty(EMPTY_COMMENTS.to_string())],
        Panel::Ready(list) => list.iter().map(comment_line).collect(),
        Panel::Failed(msg) => vec![Node::Error(msg.clone())],
    }
}

fn show_card(show: &Show, comments: &HashMap<u64, Panel<Vec<Comment>>>, compact: bool) -> Card {
    let loaded = comments.get(&show.id).cloned().unwrap_or_default();
    Card {
        show_id: show.id,
        title: show.show_name.clone(),
        details: vec![format!("Owner: {}", show.user_name), format!("Ticket name: {}", show.tix_name)],
        highlight: None,
        comments: render_comments(&loaded),
        comment_form: !compact,
    }
}

/// One card per show, or a single empty-state node for an empty list.
pub fn render_shows(list: &[Show], comments: &HashMap<u64, Panel<Vec<Comment>>>, compact: bool) -> Fragment {
    if list.is_empty() {
        return vec![Node::Empty(EMPTY_BOARD.to_string())];
    }
    list.iter().map(|s| Node::Card(show_card(s, comments, compact))).collect()
}

pub fn render_show_panel(
    panel: &Panel<Vec<Show>>,
    comments: &HashMap<u64, Panel<Vec<Comment>>>,
    compact: bool,
) -> Fragment {
    match panel {
        Panel::Idle => Vec::new(),
        Panel::Loading => vec![Node::Muted(LOADING.to_string())],
        Panel::Ready(list) => render_shows(list, comments, compact),
        Panel::Failed(msg) => vec![Node::Error(msg.clone())],
    }
}

pub fn render_mentions(panel: &Panel<Mentions>) -> Fragment {
    let mentions = match panel {
        Panel::Idle => return Vec::new(),
        Panel::Loading => return vec![Node::Muted(LOADING.to_string())],
        Panel::Failed(msg) => return vec![Node::Error(msg.clone())],
        Panel::Ready(m) => m,
    };
    match mentions {
        Mentions::NoShows => vec![Node::Empty(NO_OWNED_SHOWS.to_string())],
        Mentions::Quiet => vec![Node::Empty(NO_MENTIONS.to_string())],
        Mentions::Found(groups) => groups
            .iter()
            .map(|g| {
                Node::Card(Card {
                    show_id: g.show.id,
                    title: g.show.show_name.clone(),
                    details: vec![
                        format!("Owner: {} ({})", g.show.user_name, g.show.user_id),
                        format!("Ticket name: {}", g.show.tix_name),
                    ],
                    highlight: Some(format!("{} comment(s) from others", g.comments.len())),
                    comments: g.comments.iter().take(PREVIEW_LIMIT).map(comment_line).collect(),
                    comment_form: false,
                })
            })
            .collect(),
    }
}

/// Plain text rendering for non-interactive output.
pub fn to_plain(fragment: &[Node]) -> String {
    fragment.iter().map(|node| node_plain(node, "")).join("\n")
}

fn node_plain(node: &Node, indent: &str) -> String {
    match node {
        Node::Empty(text) | Node::Muted(text) => format!("{indent}{text}"),
        Node::Error(text) => format!("{indent}error: {text}"),
        Node::Comment(line) => format!("{indent}{}", line.to_text()),
        Node::Card(card) => {
            let mut out = vec![format!("{indent}{} {}", card.id_line(), card.title)];
            out.extend(card.details.iter().map(|d| format!("{indent}  {d}")));
            if let Some(h) = &card.highlight {
                out.push(format!("{indent}  {h}"));
            }
            out.push(format!("{indent}  Comments:"));
            let nested = format!("{indent}    ");
            out.extend(card.comments.iter().map(|c| node_plain(c, &nested)));
            out.join("\n")
        }
    }
}
