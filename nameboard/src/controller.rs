//! Command dispatch and view state for the board.
//!
//! A [`Command`] is validated locally by [`Controller::begin`], which either
//! records an inline notice (no request is made) or returns [`Job`]s. Jobs
//! run against the [`BoardClient`] anywhere, concurrently if the caller
//! likes, and come back as [`Completed`] values for [`Controller::apply`].
//! Every job holds a ticket for the panel it writes; a result is applied only
//! while its ticket is still the latest for that panel, so a slow response
//! never overwrites a newer one.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use futures_util::future::join_all;
use log::{debug, info, warn};
use thiserror::Error;

use crate::client::{BoardClient, ClientError};
use crate::identity::{Identity, IdentityHandle, StoreError};
use crate::mentions::{self, Mentions};
use crate::models::{Comment, CommentQuery, NewComment, NewShow, SearchField, SearchQuery, Show, UserRecord, Visibility};
use crate::utils::tickets::{Ticket, Tickets};
use crate::view::Panel;

/// How long the sign-out confirmation stays up.
pub const LOGOUT_NOTICE_TTL: Duration = Duration::from_secs(2);

/// Local validation failures. Nothing is sent to the backend when one occurs.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Invalid {
    #[error("Enter a name to continue.")]
    MissingUserName,
    #[error("Enter your user_id to continue.")]
    MissingUserId,
    #[error("Bind or register a user_id first.")]
    NotBound,
    #[error("Fill in every field.")]
    IncompleteShow,
    #[error("Enter a name to search for.")]
    MissingSearchName,
    #[error("Author and content are required.")]
    IncompleteComment,
    #[error("Sign in or register above to bind a user_id.")]
    MentionsNeedIdentity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tab {
    Board,
    Mentions,
}

impl Tab {
    pub fn title(&self) -> &'static str {
        match self {
            Tab::Board => "Board",
            Tab::Mentions => "Mentions",
        }
    }
}

/// Inline message slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Register,
    Bind,
    Logout,
    CreateShow,
    Comment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Ok,
    Err,
}

#[derive(Debug, Clone)]
pub struct Notice {
    pub text: String,
    pub tone: Tone,
    posted: Instant,
    ttl: Option<Duration>,
}

impl Notice {
    fn new(text: impl Into<String>, tone: Tone) -> Self {
        Self { text: text.into(), tone, posted: Instant::now(), ttl: None }
    }

    fn transient(text: impl Into<String>, tone: Tone, ttl: Duration) -> Self {
        Self { ttl: Some(ttl), ..Self::new(text, tone) }
    }

    fn expired(&self, now: Instant) -> bool {
        self.ttl.is_some_and(|ttl| now.duration_since(self.posted) >= ttl)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ShowForm {
    pub user_name: String,
    pub tix_name: String,
    pub show_name: String,
}

#[derive(Debug, Clone, Default)]
pub struct SearchForm {
    pub name: String,
    pub field: SearchField,
    pub exact: bool,
}

#[derive(Debug, Clone, Default)]
pub struct CommentForm {
    /// Empty means "post as the bound identity's name".
    pub author: String,
    pub content: String,
    pub visibility: Visibility,
}

/// Everything a user can ask the board to do.
#[derive(Debug, Clone)]
pub enum Command {
    Register { user_name: String },
    Bind { user_id: String },
    Logout,
    CreateShow(ShowForm),
    Search(SearchForm),
    ResetSearch,
    SwitchTab(Tab),
    RefreshCurrentTab,
    LoadComments { show_id: u64 },
    SubmitComment { show_id: u64, form: CommentForm },
    SetViewerName(String),
}

/// What a job's result is written into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    Notice(Slot),
    Board,
    Search,
    Mentions,
    Comments(u64),
}

impl Target {
    /// Whether a newer job for this target makes an older result obsolete.
    /// Submissions never do: each one reports its own outcome.
    fn supersedes(&self) -> bool {
        !matches!(self, Target::Notice(Slot::CreateShow | Slot::Comment))
    }
}

#[derive(Debug, Clone)]
enum Request {
    Register { user_name: String },
    Bind { user_id: String },
    CreateShow(NewShow),
    Search(SearchQuery),
    Board,
    Mentions { me: String },
    Comments { show_id: u64, viewer: CommentQuery },
    PostComment { show_id: u64, comment: NewComment },
}

/// A backend round trip waiting to be run.
#[derive(Debug, Clone)]
pub struct Job {
    ticket: Ticket<Target>,
    request: Request,
}

#[derive(Debug)]
pub enum Outcome {
    Registered(Result<UserRecord, ClientError>),
    Bound(Result<UserRecord, ClientError>),
    ShowCreated(Result<Show, ClientError>),
    Searched(Result<Vec<Show>, ClientError>),
    Board(Result<Vec<Show>, ClientError>),
    Mentions(Result<Mentions, ClientError>),
    Comments { show_id: u64, result: Result<Vec<Comment>, ClientError> },
    CommentPosted { show_id: u64, result: Result<(), ClientError> },
}

#[derive(Debug)]
pub struct Completed {
    ticket: Ticket<Target>,
    pub outcome: Outcome,
}

impl Job {
    pub fn target(&self) -> Target {
        self.ticket.target
    }

    pub async fn run(self, client: &BoardClient) -> Completed {
        let outcome = match self.request {
            Request::Register { user_name } => Outcome::Registered(client.register(&user_name).await),
            Request::Bind { user_id } => Outcome::Bound(client.user(&user_id).await),
            Request::CreateShow(show) => Outcome::ShowCreated(client.create_show(&show).await),
            Request::Search(query) => Outcome::Searched(client.search_shows(&query).await),
            Request::Board => Outcome::Board(client.list_shows().await),
            Request::Mentions { me } => Outcome::Mentions(mentions::collect(client, &me).await),
            Request::Comments { show_id, viewer } => {
                Outcome::Comments { show_id, result: client.list_comments(show_id, &viewer).await }
            }
            Request::PostComment { show_id, comment } => {
                Outcome::CommentPosted { show_id, result: client.post_comment(show_id, &comment).await.map(|_| ()) }
            }
        };
        Completed { ticket: self.ticket, outcome }
    }
}

/// The session context: where identity lives and how the backend is reached.
#[derive(Clone)]
pub struct Session {
    identity: IdentityHandle,
    client: BoardClient,
}

impl Session {
    pub fn new(identity: IdentityHandle, client: BoardClient) -> Self {
        Self { identity, client }
    }

    pub fn client(&self) -> &BoardClient {
        &self.client
    }

    pub fn identity(&self) -> Result<Identity, StoreError> {
        self.identity.get()
    }
}

/// Everything a front end needs to draw the board.
#[derive(Debug, Clone)]
pub struct ViewState {
    pub active_tab: Tab,
    pub identity: Identity,
    /// The register/bind section is hidden while an identity is bound.
    pub auth_hidden: bool,
    /// Name sent as `viewer_name` when loading comments; follows the identity.
    pub viewer_name: String,
    pub notices: HashMap<Slot, Notice>,
    pub board: Panel<Vec<Show>>,
    pub search: Panel<Vec<Show>>,
    pub mentions: Panel<Mentions>,
    pub comments: HashMap<u64, Panel<Vec<Comment>>>,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            active_tab: Tab::Board,
            identity: Identity::default(),
            auth_hidden: false,
            viewer_name: String::new(),
            notices: HashMap::new(),
            board: Panel::Idle,
            search: Panel::Idle,
            mentions: Panel::Idle,
            comments: HashMap::new(),
        }
    }
}

impl ViewState {
    pub fn notice(&self, slot: Slot) -> Option<&Notice> {
        self.notices.get(&slot)
    }

    fn clear_auth_notices(&mut self) {
        for slot in [Slot::Register, Slot::Bind, Slot::Logout, Slot::CreateShow] {
            self.notices.remove(&slot);
        }
    }
}

pub struct Controller {
    session: Session,
    state: ViewState,
    tickets: Tickets<Target>,
}

impl Controller {
    pub fn new(session: Session) -> Self {
        let mut controller = Self { session, state: ViewState::default(), tickets: Tickets::new() };
        controller.sync_identity();
        controller
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn identity(&self) -> &Identity {
        &self.state.identity
    }

    /// Re-read the stored identity into the view.
    fn sync_identity(&mut self) {
        let identity = match self.session.identity() {
            Ok(identity) => identity,
            Err(e) => {
                warn!("reading identity failed: {e}");
                Identity::default()
            }
        };
        self.state.auth_hidden = identity.is_bound();
        self.state.viewer_name = identity.user_name.clone().unwrap_or_default();
        self.state.identity = identity;
    }

    fn note(&mut self, slot: Slot, text: impl Into<String>, tone: Tone) {
        self.state.notices.insert(slot, Notice::new(text, tone));
    }

    fn job(&mut self, target: Target, request: Request) -> Job {
        Job { ticket: self.tickets.issue(target), request }
    }

    fn viewer(&self) -> CommentQuery {
        let name = self.state.viewer_name.trim();
        let viewer_name = if name.is_empty() { self.state.identity.user_name.clone() } else { Some(name.to_string()) };
        CommentQuery { viewer_name, viewer_user_id: self.state.identity.user_id.clone() }
    }

    fn load_tab(&mut self, tab: Tab) -> Vec<Job> {
        match tab {
            Tab::Board => {
                self.state.board = Panel::Loading;
                vec![self.job(Target::Board, Request::Board)]
            }
            Tab::Mentions => match self.state.identity.user_id.clone() {
                Some(me) => {
                    self.state.mentions = Panel::Loading;
                    vec![self.job(Target::Mentions, Request::Mentions { me })]
                }
                None => {
                    self.state.mentions = Panel::Failed(Invalid::MentionsNeedIdentity.to_string());
                    Vec::new()
                }
            },
        }
    }

    fn load_comments(&mut self, show_id: u64) -> Job {
        self.state.comments.insert(show_id, Panel::Loading);
        let viewer = self.viewer();
        self.job(Target::Comments(show_id), Request::Comments { show_id, viewer })
    }

    /// Validate `cmd` and turn it into backend jobs. Validation failures are
    /// recorded in the view and yield no jobs.
    pub fn begin(&mut self, cmd: Command) -> Vec<Job> {
        match cmd {
            Command::Register { user_name } => {
                let user_name = user_name.trim().to_string();
                if user_name.is_empty() {
                    self.note(Slot::Register, Invalid::MissingUserName.to_string(), Tone::Err);
                    return Vec::new();
                }
                vec![self.job(Target::Notice(Slot::Register), Request::Register { user_name })]
            }
            Command::Bind { user_id } => {
                let user_id = user_id.trim().to_string();
                if user_id.is_empty() {
                    self.note(Slot::Bind, Invalid::MissingUserId.to_string(), Tone::Err);
                    return Vec::new();
                }
                vec![self.job(Target::Notice(Slot::Bind), Request::Bind { user_id })]
            }
            Command::Logout => {
                self.logout();
                Vec::new()
            }
            Command::CreateShow(form) => {
                let Some(user_id) = self.state.identity.user_id.clone() else {
                    self.note(Slot::CreateShow, Invalid::NotBound.to_string(), Tone::Err);
                    return Vec::new();
                };
                let show = NewShow {
                    user_id,
                    user_name: form.user_name.trim().to_string(),
                    tix_name: form.tix_name.trim().to_string(),
                    show_name: form.show_name.trim().to_string(),
                };
                if show.user_name.is_empty() || show.tix_name.is_empty() || show.show_name.is_empty() {
                    self.note(Slot::CreateShow, Invalid::IncompleteShow.to_string(), Tone::Err);
                    return Vec::new();
                }
                vec![self.job(Target::Notice(Slot::CreateShow), Request::CreateShow(show))]
            }
            Command::Search(form) => {
                let name = form.name.trim().to_string();
                if name.is_empty() {
                    // bump the ticket so an in-flight search cannot land afterwards
                    self.tickets.issue(Target::Search);
                    self.state.search = Panel::Failed(Invalid::MissingSearchName.to_string());
                    return Vec::new();
                }
                self.state.search = Panel::Loading;
                let query = SearchQuery { name, field: form.field, exact: form.exact };
                vec![self.job(Target::Search, Request::Search(query))]
            }
            Command::ResetSearch => {
                self.tickets.issue(Target::Search);
                self.state.search = Panel::Idle;
                Vec::new()
            }
            Command::SwitchTab(tab) => {
                self.state.active_tab = tab;
                self.load_tab(tab)
            }
            Command::RefreshCurrentTab => self.load_tab(self.state.active_tab),
            Command::LoadComments { show_id } => vec![self.load_comments(show_id)],
            Command::SubmitComment { show_id, form } => {
                let typed = form.author.trim();
                let author_name = if typed.is_empty() {
                    self.state.identity.user_name.clone().unwrap_or_default()
                } else {
                    typed.to_string()
                };
                let content = form.content.trim().to_string();
                if author_name.is_empty() || content.is_empty() {
                    self.note(Slot::Comment, Invalid::IncompleteComment.to_string(), Tone::Err);
                    return Vec::new();
                }
                let comment = NewComment {
                    author_user_id: self.state.identity.user_id.clone(),
                    author_name,
                    content,
                    visibility: form.visibility,
                };
                vec![self.job(Target::Notice(Slot::Comment), Request::PostComment { show_id, comment })]
            }
            Command::SetViewerName(name) => {
                self.state.viewer_name = name;
                Vec::new()
            }
        }
    }

    fn logout(&mut self) {
        if let Err(e) = self.session.identity.clear() {
            self.note(Slot::Logout, format!("Could not sign out: {e}"), Tone::Err);
            return;
        }
        info!("identity cleared");
        self.sync_identity();
        self.state.clear_auth_notices();
        self.state.notices.insert(Slot::Logout, Notice::transient("Signed out", Tone::Ok, LOGOUT_NOTICE_TTL));
    }

    /// Store a user the backend vouched for and resync the view.
    fn adopt(&mut self, user: &UserRecord) -> Result<(), StoreError> {
        self.session.identity.set(Some(&user.user_id), Some(&user.user_name))?;
        self.sync_identity();
        self.state.clear_auth_notices();
        Ok(())
    }

    /// Write a finished job into the view. Returns follow-up jobs; stale
    /// results are dropped.
    pub fn apply(&mut self, done: Completed) -> Vec<Job> {
        if done.ticket.target.supersedes() && !self.tickets.is_current(&done.ticket) {
            debug!("dropping stale result for {:?} (seq {})", done.ticket.target, done.ticket.seq);
            return Vec::new();
        }
        match done.outcome {
            Outcome::Registered(Ok(user)) => {
                if let Err(e) = self.adopt(&user) {
                    self.note(Slot::Register, format!("Registered, but saving the identity failed: {e}"), Tone::Err);
                    return Vec::new();
                }
                info!("registered {} as {}", user.user_name, user.user_id);
                self.note(
                    Slot::Register,
                    format!("Registered! Keep your user_id somewhere safe: {}", user.user_id),
                    Tone::Ok,
                );
                Vec::new()
            }
            Outcome::Registered(Err(e)) => {
                self.note(Slot::Register, format!("Registration failed: {e}"), Tone::Err);
                Vec::new()
            }
            Outcome::Bound(Ok(user)) => {
                if let Err(e) = self.adopt(&user) {
                    self.note(Slot::Bind, format!("Saving the identity failed: {e}"), Tone::Err);
                    return Vec::new();
                }
                info!("bound to {}", user.user_id);
                self.note(Slot::Bind, format!("Bound to {}", user.user_name), Tone::Ok);
                Vec::new()
            }
            Outcome::Bound(Err(e)) => {
                self.note(Slot::Bind, format!("Bind failed: {e}"), Tone::Err);
                Vec::new()
            }
            Outcome::ShowCreated(Ok(show)) => {
                info!("created show #{}", show.id);
                self.note(Slot::CreateShow, "Show created", Tone::Ok);
                self.load_tab(Tab::Board)
            }
            Outcome::ShowCreated(Err(e)) => {
                self.note(Slot::CreateShow, format!("Create failed: {e}"), Tone::Err);
                Vec::new()
            }
            Outcome::Searched(Ok(shows)) => {
                let follow: Vec<Job> = shows.iter().map(|s| self.load_comments(s.id)).collect();
                self.state.search = Panel::Ready(shows);
                follow
            }
            Outcome::Searched(Err(e)) => {
                self.state.search = Panel::Failed(format!("Search failed: {e}"));
                Vec::new()
            }
            Outcome::Board(Ok(shows)) => {
                let follow: Vec<Job> = shows.iter().map(|s| self.load_comments(s.id)).collect();
                self.state.board = Panel::Ready(shows);
                follow
            }
            Outcome::Board(Err(e)) => {
                self.state.board = Panel::Failed(format!("Could not load shows: {e}"));
                Vec::new()
            }
            Outcome::Mentions(Ok(mentions)) => {
                self.state.mentions = Panel::Ready(mentions);
                Vec::new()
            }
            Outcome::Mentions(Err(e)) => {
                self.state.mentions = Panel::Failed(format!("Could not load shows: {e}"));
                Vec::new()
            }
            Outcome::Comments { show_id, result } => {
                let panel = match result {
                    Ok(comments) => Panel::Ready(comments),
                    Err(e) => Panel::Failed(format!("Could not load comments: {e}")),
                };
                self.state.comments.insert(show_id, panel);
                Vec::new()
            }
            Outcome::CommentPosted { show_id, result: Ok(()) } => {
                self.state.notices.remove(&Slot::Comment);
                vec![self.load_comments(show_id)]
            }
            Outcome::CommentPosted { result: Err(e), .. } => {
                self.note(Slot::Comment, format!("Comment failed; check that you are signed in ({e})"), Tone::Err);
                Vec::new()
            }
        }
    }

    /// Run `cmd` to completion, follow-ups included. Independent jobs of one
    /// round run concurrently.
    pub async fn dispatch(&mut self, cmd: Command) {
        let mut pending = self.begin(cmd);
        while !pending.is_empty() {
            let client = self.session.client.clone();
            let done = join_all(pending.into_iter().map(|job| job.run(&client))).await;
            pending = done.into_iter().flat_map(|d| self.apply(d)).collect();
        }
    }

    /// Drop notices whose time is up.
    pub fn tick(&mut self, now: Instant) {
        self.state.notices.retain(|_, n| !n.expired(now));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::{IdentityStore, MemoryStore};
    use std::sync::Arc;

    // nothing listens here; jobs must never be run by these tests
    fn offline_controller(store: Arc<MemoryStore>) -> Controller {
        let client = BoardClient::new("http://127.0.0.1:9/api").unwrap();
        Controller::new(Session::new(store, client))
    }

    fn bound_store() -> Arc<MemoryStore> {
        let store = Arc::new(MemoryStore::new());
        store.set(Some("u1"), Some("Alice")).unwrap();
        store
    }

    fn completed(job: Job, outcome: Outcome) -> Completed {
        Completed { ticket: job.ticket, outcome }
    }

    fn show(id: u64) -> Show {
        Show {
            id,
            user_id: "u1".into(),
            user_name: "Alice".into(),
            tix_name: "A".into(),
            show_name: "S".into(),
            created_at: None,
        }
    }

    #[test]
    fn create_show_without_identity_is_local_error() {
        let mut c = offline_controller(Arc::new(MemoryStore::new()));
        let jobs = c.begin(Command::CreateShow(ShowForm {
            user_name: "Alice".into(),
            tix_name: "A".into(),
            show_name: "S".into(),
        }));
        assert!(jobs.is_empty());
        let notice = c.state().notice(Slot::CreateShow).expect("notice");
        assert_eq!(notice.tone, Tone::Err);
        assert_eq!(notice.text, Invalid::NotBound.to_string());
    }

    #[test]
    fn blank_inputs_never_reach_the_backend() {
        let mut c = offline_controller(bound_store());
        assert!(c.begin(Command::Register { user_name: "   ".into() }).is_empty());
        assert!(c.begin(Command::Bind { user_id: "".into() }).is_empty());
        assert!(c.begin(Command::CreateShow(ShowForm { user_name: "A".into(), ..Default::default() })).is_empty());
        assert!(c.begin(Command::Search(SearchForm { name: " ".into(), ..Default::default() })).is_empty());
        assert_eq!(c.state().search, Panel::Failed(Invalid::MissingSearchName.to_string()));
        let form = CommentForm { author: "Bob".into(), content: "  ".into(), visibility: Visibility::Public };
        assert!(c.begin(Command::SubmitComment { show_id: 1, form }).is_empty());
        assert_eq!(c.state().notice(Slot::Comment).unwrap().text, Invalid::IncompleteComment.to_string());
    }

    #[test]
    fn comment_author_defaults_to_identity_name() {
        let mut c = offline_controller(bound_store());
        let form = CommentForm { author: " ".into(), content: "hello".into(), visibility: Visibility::Private };
        let jobs = c.begin(Command::SubmitComment { show_id: 3, form });
        assert_eq!(jobs.len(), 1);
        match &jobs[0].request {
            Request::PostComment { show_id, comment } => {
                assert_eq!(*show_id, 3);
                assert_eq!(comment.author_name, "Alice");
                assert_eq!(comment.author_user_id.as_deref(), Some("u1"));
                assert_eq!(comment.visibility, Visibility::Private);
            }
            other => panic!("unexpected request {other:?}"),
        }
    }

    #[test]
    fn anonymous_comment_needs_an_author() {
        let mut c = offline_controller(Arc::new(MemoryStore::new()));
        let form = CommentForm { author: String::new(), content: "hello".into(), visibility: Visibility::Public };
        assert!(c.begin(Command::SubmitComment { show_id: 3, form }).is_empty());
    }

    #[test]
    fn registration_persists_identity_and_hides_auth() {
        let store = Arc::new(MemoryStore::new());
        let mut c = offline_controller(store.clone());
        assert!(!c.state().auth_hidden);
        let job = c.begin(Command::Register { user_name: " Alice ".into() }).remove(0);
        match &job.request {
            Request::Register { user_name } => assert_eq!(user_name, "Alice"),
            other => panic!("unexpected request {other:?}"),
        }
        let user = UserRecord { user_id: "u1".into(), user_name: "Alice".into() };
        assert!(c.apply(completed(job, Outcome::Registered(Ok(user)))).is_empty());

        let stored = store.get().unwrap();
        assert_eq!(stored.user_id.as_deref(), Some("u1"));
        assert_eq!(stored.user_name.as_deref(), Some("Alice"));
        assert!(c.state().auth_hidden);
        assert_eq!(c.state().viewer_name, "Alice");
        let notice = c.state().notice(Slot::Register).unwrap();
        assert_eq!(notice.tone, Tone::Ok);
        assert!(notice.text.contains("u1"));
    }

    #[test]
    fn logout_clears_both_fields_and_shows_auth() {
        let store = bound_store();
        let mut c = offline_controller(store.clone());
        assert!(c.state().auth_hidden);
        assert!(c.begin(Command::Logout).is_empty());
        let stored = store.get().unwrap();
        assert!(stored.user_id.is_none() && stored.user_name.is_none());
        assert!(!c.state().auth_hidden);
        assert_eq!(c.state().notice(Slot::Logout).unwrap().text, "Signed out");

        c.tick(Instant::now() + LOGOUT_NOTICE_TTL);
        assert!(c.state().notice(Slot::Logout).is_none());
    }

    #[test]
    fn mentions_without_identity_fails_locally() {
        let mut c = offline_controller(Arc::new(MemoryStore::new()));
        assert!(c.begin(Command::SwitchTab(Tab::Mentions)).is_empty());
        assert_eq!(c.state().active_tab, Tab::Mentions);
        assert_eq!(c.state().mentions, Panel::Failed(Invalid::MentionsNeedIdentity.to_string()));
    }

    #[test]
    fn stale_board_result_is_dropped() {
        let mut c = offline_controller(bound_store());
        let slow = c.begin(Command::SwitchTab(Tab::Board)).remove(0);
        let fast = c.begin(Command::RefreshCurrentTab).remove(0);

        let follow = c.apply(completed(fast, Outcome::Board(Ok(vec![show(2)]))));
        assert_eq!(follow.len(), 1);
        assert_eq!(follow[0].target(), Target::Comments(2));

        assert!(c.apply(completed(slow, Outcome::Board(Ok(vec![show(1)])))).is_empty());
        assert_eq!(c.state().board.ready().map(|s| s[0].id), Some(2));
    }

    #[test]
    fn board_load_requests_comments_with_viewer_context() {
        let mut c = offline_controller(bound_store());
        c.begin(Command::SetViewerName("Guest".into()));
        let job = c.begin(Command::SwitchTab(Tab::Board)).remove(0);
        let follow = c.apply(completed(job, Outcome::Board(Ok(vec![show(7)]))));
        match &follow[0].request {
            Request::Comments { show_id, viewer } => {
                assert_eq!(*show_id, 7);
                assert_eq!(viewer.viewer_name.as_deref(), Some("Guest"));
                assert_eq!(viewer.viewer_user_id.as_deref(), Some("u1"));
            }
            other => panic!("unexpected request {other:?}"),
        }
        assert_eq!(c.state().comments.get(&7), Some(&Panel::Loading));
    }

    #[test]
    fn posted_comment_reloads_that_show() {
        let mut c = offline_controller(bound_store());
        let form = CommentForm { author: String::new(), content: "hi".into(), visibility: Visibility::Public };
        let job = c.begin(Command::SubmitComment { show_id: 4, form }).remove(0);
        let follow = c.apply(completed(job, Outcome::CommentPosted { show_id: 4, result: Ok(()) }));
        assert_eq!(follow.len(), 1);
        assert_eq!(follow[0].target(), Target::Comments(4));
    }

    #[test]
    fn overlapping_posts_each_report_back() {
        let mut c = offline_controller(bound_store());
        let form = |content: &str| CommentForm { content: content.into(), ..Default::default() };
        let first = c.begin(Command::SubmitComment { show_id: 1, form: form("one") }).remove(0);
        let second = c.begin(Command::SubmitComment { show_id: 2, form: form("two") }).remove(0);
        let third = c.begin(Command::SubmitComment { show_id: 3, form: form("three") }).remove(0);

        let follow = c.apply(completed(first, Outcome::CommentPosted { show_id: 1, result: Ok(()) }));
        assert_eq!(follow.len(), 1);
        assert_eq!(follow[0].target(), Target::Comments(1));

        let follow = c.apply(completed(third, Outcome::CommentPosted { show_id: 3, result: Ok(()) }));
        assert_eq!(follow[0].target(), Target::Comments(3));

        let err = ClientError::Status { code: 404, reason: "Not Found".into(), body: "show_not_found".into() };
        assert!(c.apply(completed(second, Outcome::CommentPosted { show_id: 2, result: Err(err) })).is_empty());
        let notice = c.state().notice(Slot::Comment).unwrap();
        assert_eq!(notice.tone, Tone::Err);
        assert!(notice.text.contains("404 Not Found - show_not_found"));
    }

    #[test]
    fn overlapping_creates_each_report_back() {
        let mut c = offline_controller(bound_store());
        let form = || ShowForm { user_name: "Alice".into(), tix_name: "A".into(), show_name: "S".into() };
        let first = c.begin(Command::CreateShow(form())).remove(0);
        let second = c.begin(Command::CreateShow(form())).remove(0);

        let follow = c.apply(completed(second, Outcome::ShowCreated(Ok(show(2)))));
        assert_eq!(follow[0].target(), Target::Board);

        let err = ClientError::Status { code: 422, reason: "Unprocessable Entity".into(), body: "bad".into() };
        c.apply(completed(first, Outcome::ShowCreated(Err(err))));
        let notice = c.state().notice(Slot::CreateShow).unwrap();
        assert_eq!(notice.tone, Tone::Err);
        assert_eq!(notice.text, "Create failed: 422 Unprocessable Entity - bad");
    }

    #[test]
    fn failed_board_load_keeps_error_text() {
        let mut c = offline_controller(bound_store());
        let job = c.begin(Command::RefreshCurrentTab).remove(0);
        let err = ClientError::Status { code: 500, reason: "Internal Server Error".into(), body: "oops".into() };
        c.apply(completed(job, Outcome::Board(Err(err))));
        assert_eq!(
            c.state().board,
            Panel::Failed("Could not load shows: 500 Internal Server Error - oops".to_string())
        );
    }

    #[test]
    fn reset_search_discards_in_flight_results() {
        let mut c = offline_controller(bound_store());
        let job = c.begin(Command::Search(SearchForm { name: "Alice".into(), ..Default::default() })).remove(0);
        c.begin(Command::ResetSearch);
        assert!(c.apply(completed(job, Outcome::Searched(Ok(vec![show(1)])))).is_empty());
        assert_eq!(c.state().search, Panel::Idle);
    }
}
