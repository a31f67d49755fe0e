use clap::{Parser, Subcommand, ValueEnum};
use nameboard::config::ClientConfig;
use nameboard::controller::{CommentForm, SearchForm, ShowForm, Slot, Tone};
use nameboard::models::{SearchField, Visibility};
use nameboard::view;
use nameboard::{client::Payload, Command, Controller, Tab};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "nameboard", about = "Client for the name-match ticket board", version)]
pub struct Cli {
    /// Backend base URL, e.g. http://127.0.0.1:9943/api
    #[arg(long)]
    pub api_base: Option<String>,
    /// Directory holding the stored identity
    #[arg(long)]
    pub data_dir: Option<PathBuf>,
    /// Keep the identity in memory for this run only
    #[arg(long, default_value_t = false)]
    pub ephemeral: bool,
    /// TOML config file
    #[arg(long)]
    pub config: Option<PathBuf>,
    #[arg(long)]
    pub loglevel: Option<String>,
    /// Load comments as this viewer instead of the stored user name
    #[arg(long)]
    pub viewer: Option<String>,
    #[command(subcommand)]
    pub command: Option<Sub>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Sub {
    /// Interactive terminal UI (the default)
    Tui,
    /// Print the stored identity
    Whoami,
    /// Register a new user and store its id
    Register { name: String },
    /// Bind an existing user_id
    Bind { user_id: String },
    /// Forget the stored identity
    Logout,
    /// List every show with its visible comments
    Shows,
    /// Register a show under the stored identity
    Create {
        #[arg(long)]
        tix_name: String,
        #[arg(long)]
        show_name: String,
        /// Owner name; defaults to the stored user name
        #[arg(long)]
        user_name: Option<String>,
    },
    /// Search shows by owner or ticket name
    Search {
        name: String,
        #[arg(long, value_enum, default_value_t = FieldArg::Owner)]
        field: FieldArg,
        /// Substring match instead of exact
        #[arg(long, default_value_t = false)]
        partial: bool,
    },
    /// Comments on one show, as the current viewer sees them
    Comments { show_id: u64 },
    /// Post a comment on a show
    Comment {
        show_id: u64,
        content: String,
        #[arg(long)]
        author: Option<String>,
        #[arg(long, default_value_t = false)]
        private: bool,
    },
    /// Comments others left on your shows
    Mentions,
    /// Look up users registered under a name
    Users { name: String },
    /// Backend health check
    Health,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldArg {
    Owner,
    Tix,
}

impl From<FieldArg> for SearchField {
    fn from(f: FieldArg) -> Self {
        match f {
            FieldArg::Owner => SearchField::Owner,
            FieldArg::Tix => SearchField::Tix,
        }
    }
}

impl Cli {
    /// Load the config file (if any), apply the environment, then the flags.
    pub fn load_config(&self) -> Result<ClientConfig, nameboard::config::ConfigError> {
        let base = match &self.config {
            Some(path) => ClientConfig::load(path)?,
            None => ClientConfig::default(),
        };
        Ok(self.merge_into_config(base.apply_env()))
    }

    pub fn merge_into_config(&self, mut cfg: ClientConfig) -> ClientConfig {
        if let Some(v) = &self.api_base {
            cfg.api_base = v.clone();
        }
        if let Some(v) = &self.data_dir {
            cfg.data_dir = v.clone();
        }
        if self.ephemeral {
            cfg.ephemeral = true;
        }
        if let Some(v) = &self.loglevel {
            cfg.log_level = v.clone();
        }
        cfg
    }

    pub fn is_tui(&self) -> bool {
        matches!(self.command, None | Some(Sub::Tui))
    }
}

fn print_notice(controller: &Controller, slot: Slot) -> ExitCode {
    match controller.state().notice(slot) {
        Some(n) if n.tone == Tone::Err => {
            eprintln!("{}", n.text);
            ExitCode::FAILURE
        }
        Some(n) => {
            println!("{}", n.text);
            ExitCode::SUCCESS
        }
        None => ExitCode::SUCCESS,
    }
}

fn print_fragment(fragment: &[view::Node]) -> ExitCode {
    println!("{}", view::to_plain(fragment));
    if fragment.iter().any(|n| matches!(n, view::Node::Error(_))) {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

/// Run one subcommand to completion and print its result.
pub async fn run_command(controller: &mut Controller, sub: Sub) -> ExitCode {
    match sub {
        Sub::Tui => ExitCode::SUCCESS,
        Sub::Whoami => {
            println!("{}", view::whoami(controller.identity()));
            ExitCode::SUCCESS
        }
        Sub::Register { name } => {
            controller.dispatch(Command::Register { user_name: name }).await;
            print_notice(controller, Slot::Register)
        }
        Sub::Bind { user_id } => {
            controller.dispatch(Command::Bind { user_id }).await;
            print_notice(controller, Slot::Bind)
        }
        Sub::Logout => {
            controller.dispatch(Command::Logout).await;
            print_notice(controller, Slot::Logout)
        }
        Sub::Shows => {
            controller.dispatch(Command::SwitchTab(Tab::Board)).await;
            let state = controller.state();
            print_fragment(&view::render_show_panel(&state.board, &state.comments, false))
        }
        Sub::Create { tix_name, show_name, user_name } => {
            let user_name = user_name.or_else(|| controller.identity().user_name.clone()).unwrap_or_default();
            controller.dispatch(Command::CreateShow(ShowForm { user_name, tix_name, show_name })).await;
            print_notice(controller, Slot::CreateShow)
        }
        Sub::Search { name, field, partial } => {
            let form = SearchForm { name, field: field.into(), exact: !partial };
            controller.dispatch(Command::Search(form)).await;
            let state = controller.state();
            print_fragment(&view::render_show_panel(&state.search, &state.comments, true))
        }
        Sub::Comments { show_id } => {
            controller.dispatch(Command::LoadComments { show_id }).await;
            let panel = controller.state().comments.get(&show_id).cloned().unwrap_or_default();
            print_fragment(&view::render_comments(&panel))
        }
        Sub::Comment { show_id, content, author, private } => {
            let form = CommentForm {
                author: author.unwrap_or_default(),
                content,
                visibility: if private { Visibility::Private } else { Visibility::Public },
            };
            controller.dispatch(Command::SubmitComment { show_id, form }).await;
            let code = print_notice(controller, Slot::Comment);
            if let Some(panel) = controller.state().comments.get(&show_id) {
                println!("{}", view::to_plain(&view::render_comments(panel)));
            }
            code
        }
        Sub::Mentions => {
            controller.dispatch(Command::SwitchTab(Tab::Mentions)).await;
            print_fragment(&view::render_mentions(&controller.state().mentions))
        }
        Sub::Users { name } => match controller.session().client().users_by_name(&name).await {
            Ok(users) if users.is_empty() => {
                println!("No users named {name}");
                ExitCode::SUCCESS
            }
            Ok(users) => {
                users.iter().for_each(|u| println!("{}  {}", u.user_id, u.user_name));
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("Lookup failed: {e}");
                ExitCode::FAILURE
            }
        },
        Sub::Health => match controller.session().client().health().await {
            Ok(Payload::Json(v)) => {
                println!("{v}");
                ExitCode::SUCCESS
            }
            Ok(Payload::Text(t)) => {
                println!("{t}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("Backend unreachable: {e}");
                ExitCode::FAILURE
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn flags_override_config() {
        let cli = Cli::parse_from(["nameboard", "--api-base", "http://board.test/api", "--ephemeral", "whoami"]);
        let cfg = cli.merge_into_config(ClientConfig::default());
        assert_eq!(cfg.api_base, "http://board.test/api");
        assert!(cfg.ephemeral);
        assert_eq!(cfg.identity_path(), None);
        assert!(!cli.is_tui());
    }

    #[test]
    fn bare_invocation_is_tui() {
        let cli = Cli::parse_from(["nameboard", "--data-dir", "/tmp/nb"]);
        assert!(cli.is_tui());
        let cfg = cli.merge_into_config(ClientConfig::default());
        assert_eq!(cfg.identity_path().as_deref(), Some(Path::new("/tmp/nb/identity")));
    }

    #[test]
    fn search_defaults_to_exact_owner() {
        let cli = Cli::parse_from(["nameboard", "search", "Alice"]);
        match cli.command {
            Some(Sub::Search { name, field, partial }) => {
                assert_eq!(name, "Alice");
                assert_eq!(SearchField::from(field), SearchField::Owner);
                assert!(!partial);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn comment_takes_private_flag() {
        let cli = Cli::parse_from(["nameboard", "comment", "4", "see you", "--private"]);
        match cli.command {
            Some(Sub::Comment { show_id, content, private, author }) => {
                assert_eq!(show_id, 4);
                assert_eq!(content, "see you");
                assert!(private);
                assert!(author.is_none());
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
