//! The "mentions" view: comments other people left on shows owned by the
//! bound identity.

use futures_util::future::join_all;
use log::{debug, warn};

use crate::client::{BoardClient, ClientError};
use crate::models::{Comment, CommentQuery, Show};

/// Comments shown per card; the tally still counts all of them.
pub const PREVIEW_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MentionGroup {
    pub show: Show,
    pub comments: Vec<Comment>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mentions {
    /// The identity owns no shows.
    NoShows,
    /// Owned shows exist but nobody else has commented.
    Quiet,
    Found(Vec<MentionGroup>),
}

/// Whether `comment` on `show` came from someone other than `me`.
pub fn is_external(comment: &Comment, show: &Show, me: &str) -> bool {
    match comment.author_user_id.as_deref().filter(|a| !a.is_empty()) {
        Some(author) => author != me,
        None => comment.author_name != show.user_name,
    }
}

pub fn owned_by<'a>(shows: &'a [Show], me: &'a str) -> impl Iterator<Item = &'a Show> + 'a {
    shows.iter().filter(move |s| s.user_id == me)
}

/// Fold per-show comment lists into the mentions view. Shows whose comments
/// are all the owner's own drop out.
pub fn summarize(me: &str, fetched: Vec<(Show, Vec<Comment>)>) -> Mentions {
    if fetched.is_empty() {
        return Mentions::NoShows;
    }
    let groups: Vec<MentionGroup> = fetched
        .into_iter()
        .filter_map(|(show, comments)| {
            let external: Vec<Comment> = comments.into_iter().filter(|c| is_external(c, &show, me)).collect();
            if external.is_empty() {
                None
            } else {
                Some(MentionGroup { show, comments: external })
            }
        })
        .collect();
    if groups.is_empty() {
        Mentions::Quiet
    } else {
        Mentions::Found(groups)
    }
}

/// List shows, then fetch comments for every show `me` owns concurrently.
/// A failed comment fetch counts as no comments for that show.
pub async fn collect(client: &BoardClient, me: &str) -> Result<Mentions, ClientError> {
    let shows = client.list_shows().await?;
    let mine: Vec<Show> = owned_by(&shows, me).cloned().collect();
    debug!("mentions: {} of {} shows owned by {me}", mine.len(), shows.len());

    let fetches = mine.into_iter().map(|show| async move {
        let viewer = CommentQuery { viewer_name: Some(show.user_name.clone()), viewer_user_id: None };
        match client.list_comments(show.id, &viewer).await {
            Ok(comments) => (show, comments),
            Err(e) => {
                warn!("mentions: comments for show #{} failed: {e}", show.id);
                (show, Vec::new())
            }
        }
    });
    let fetched = join_all(fetches).await;
    Ok(summarize(me, fetched))
}
