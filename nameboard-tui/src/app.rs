use crate::actions::Action;
use crate::forms::{Form, FormKind};
use crossterm::event::{KeyCode, KeyEvent};
use log::debug;
use nameboard::controller::{Command, Completed, Controller, Job, Tab};
use nameboard::models::Show;
use ratatui::style::Color;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Board,
    Search,
}

pub struct StatusMessage {
    pub msg: String,
    pub color: Color,
    time: Instant,
}

pub struct App {
    pub controller: Controller,
    pub focus: Focus,
    pub selection: usize,
    pub status: Option<StatusMessage>,
    pub form: Option<Form>,
    tx: mpsc::UnboundedSender<Completed>,
}

impl App {
    pub fn new(controller: Controller, tx: mpsc::UnboundedSender<Completed>) -> Self {
        Self { controller, focus: Focus::Board, selection: 0, status: None, form: None, tx }
    }

    /// Start a command; its requests run as background tasks and report back
    /// through the completion channel.
    pub fn submit(&mut self, cmd: Command) {
        let jobs = self.controller.begin(cmd);
        self.spawn(jobs);
    }

    pub fn complete(&mut self, done: Completed) {
        let follow = self.controller.apply(done);
        self.spawn(follow);
        self.clamp_selection();
    }

    fn spawn(&self, jobs: Vec<Job>) {
        for job in jobs {
            debug!("spawning job for {:?}", job.target());
            let client = self.controller.session().client().clone();
            let tx = self.tx.clone();
            tokio::spawn(async move {
                let done = job.run(&client).await;
                // receiver is gone only when the UI has exited
                let _ = tx.send(done);
            });
        }
    }

    pub fn tick(&mut self) {
        self.controller.tick(Instant::now());
        if let Some(status) = &self.status {
            if status.time.elapsed() > Duration::from_secs(3) {
                self.status = None;
            }
        }
    }

    pub fn set_status(&mut self, msg: String, color: Color) {
        self.status = Some(StatusMessage { msg, color, time: Instant::now() });
    }

    pub fn perform(&mut self, action: Action) {
        match action {
            Action::Quit | Action::None => {}
            Action::Refresh => self.submit(Command::RefreshCurrentTab),
            Action::NextTab => {
                let next = match self.controller.state().active_tab {
                    Tab::Board => Tab::Mentions,
                    Tab::Mentions => Tab::Board,
                };
                self.switch_tab(next);
            }
            Action::ShowBoard => self.switch_tab(Tab::Board),
            Action::ShowMentions => self.switch_tab(Tab::Mentions),
            Action::FocusNext | Action::FocusPrev => self.toggle_focus(),
            Action::SelectNext => self.select_next(),
            Action::SelectPrev => self.select_prev(),
            Action::Register => self.open_form(FormKind::Register),
            Action::Bind => self.open_form(FormKind::Bind),
            Action::Logout => self.submit(Command::Logout),
            Action::NewShow => self.open_form(FormKind::NewShow),
            Action::Search => self.open_form(FormKind::Search),
            Action::ResetSearch => {
                self.submit(Command::ResetSearch);
                self.focus = Focus::Board;
                self.selection = 0;
            }
            Action::Comment => match self.selected_show().map(|s| s.id) {
                Some(show_id) => self.open_form(FormKind::Comment { show_id }),
                None => self.set_status("select a show on the board first".into(), Color::Yellow),
            },
            Action::Viewer => self.open_form(FormKind::Viewer),
        }
    }

    fn switch_tab(&mut self, tab: Tab) {
        self.selection = 0;
        self.submit(Command::SwitchTab(tab));
    }

    fn toggle_focus(&mut self) {
        if self.controller.state().active_tab != Tab::Board {
            return;
        }
        self.focus = match self.focus {
            Focus::Board if self.controller.state().search.ready().is_some() => Focus::Search,
            _ => Focus::Board,
        };
        self.selection = 0;
    }

    /// Shows listed in the focused panel, if it has loaded.
    fn focused_shows(&self) -> &[Show] {
        let state = self.controller.state();
        let panel = match self.focus {
            Focus::Board => &state.board,
            Focus::Search => &state.search,
        };
        panel.ready().map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn selected_show(&self) -> Option<&Show> {
        if self.controller.state().active_tab != Tab::Board {
            return None;
        }
        self.focused_shows().get(self.selection)
    }

    fn select_next(&mut self) {
        let len = self.focused_shows().len();
        if len > 0 {
            self.selection = (self.selection + 1).min(len - 1);
        }
    }

    fn select_prev(&mut self) {
        self.selection = self.selection.saturating_sub(1);
    }

    fn clamp_selection(&mut self) {
        let len = self.focused_shows().len();
        self.selection = self.selection.min(len.saturating_sub(1));
    }

    fn open_form(&mut self, kind: FormKind) {
        let state = self.controller.state();
        let user_name = state.identity.user_name.clone().unwrap_or_default();
        self.form = Some(Form::new(kind, &user_name, &state.viewer_name));
    }

    pub fn handle_form_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.form = None;
                return;
            }
            KeyCode::Enter => {
                if let Some(form) = self.form.take() {
                    let kind = form.kind;
                    self.submit(form.into_command());
                    if kind == FormKind::Search {
                        self.focus = Focus::Search;
                        self.selection = 0;
                    }
                }
                return;
            }
            _ => {}
        }
        let Some(form) = self.form.as_mut() else { return };
        match key.code {
            KeyCode::Tab | KeyCode::Down => form.next_field(),
            KeyCode::BackTab | KeyCode::Up => form.prev_field(),
            KeyCode::Left | KeyCode::Right => form.cycle(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Char(c) => form.input_char(c),
            _ => {}
        }
    }
}
