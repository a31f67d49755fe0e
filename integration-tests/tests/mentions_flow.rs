use std::sync::Arc;

use integration_tests::support::spawn_board;
use nameboard::controller::{CommentForm, ShowForm};
use nameboard::identity::MemoryStore;
use nameboard::mentions::{self, Mentions, PREVIEW_LIMIT};
use nameboard::models::Visibility;
use nameboard::view::{self, Panel};
use nameboard::{BoardClient, Command, Controller, Session, Tab};

async fn signed_in(base: &str, name: &str) -> Controller {
    let client = BoardClient::new(base).unwrap();
    let mut c = Controller::new(Session::new(Arc::new(MemoryStore::new()), client));
    c.dispatch(Command::Register { user_name: name.into() }).await;
    c
}

async fn new_show(c: &mut Controller, show_name: &str) -> u64 {
    let user_name = c.identity().user_name.clone().unwrap_or_default();
    c.dispatch(Command::CreateShow(ShowForm { user_name, tix_name: "T".into(), show_name: show_name.into() }))
        .await;
    let board = c.state().board.ready().unwrap();
    board.iter().find(|s| s.show_name == show_name).map(|s| s.id).unwrap()
}

async fn say(c: &mut Controller, show_id: u64, content: &str, visibility: Visibility) {
    let form = CommentForm { author: String::new(), content: content.into(), visibility };
    c.dispatch(Command::SubmitComment { show_id, form }).await;
}

fn mentions_of(c: &Controller) -> &Mentions {
    match &c.state().mentions {
        Panel::Ready(m) => m,
        other => panic!("mentions not ready: {other:?}"),
    }
}

#[tokio::test]
async fn mentions_require_identity() {
    let (board, base) = spawn_board().await;
    let client = BoardClient::new(&base).unwrap();
    let mut c = Controller::new(Session::new(Arc::new(MemoryStore::new()), client));
    c.dispatch(Command::SwitchTab(Tab::Mentions)).await;
    assert!(matches!(c.state().mentions, Panel::Failed(_)));
    assert_eq!(board.requests(), 0);
}

#[tokio::test]
async fn no_owned_shows_then_quiet_then_found() {
    let (_board, base) = spawn_board().await;
    let mut alice = signed_in(&base, "Alice").await;

    alice.dispatch(Command::SwitchTab(Tab::Mentions)).await;
    assert_eq!(mentions_of(&alice), &Mentions::NoShows);
    assert_eq!(view::to_plain(&view::render_mentions(&alice.state().mentions)), view::NO_OWNED_SHOWS);

    let spring = new_show(&mut alice, "Spring Tour").await;
    let summer = new_show(&mut alice, "Summer Tour").await;
    say(&mut alice, spring, "my own note", Visibility::Public).await;

    alice.dispatch(Command::SwitchTab(Tab::Mentions)).await;
    assert_eq!(mentions_of(&alice), &Mentions::Quiet);

    let mut bob = signed_in(&base, "Bob").await;
    new_show(&mut bob, "Bob's Gig").await;
    say(&mut bob, summer, "trade?", Visibility::Private).await;

    alice.dispatch(Command::RefreshCurrentTab).await;
    match mentions_of(&alice) {
        Mentions::Found(groups) => {
            assert_eq!(groups.len(), 1);
            assert_eq!(groups[0].show.id, summer);
            let contents: Vec<&str> = groups[0].comments.iter().map(|c| c.content.as_str()).collect();
            assert_eq!(contents, ["trade?"]);
        }
        other => panic!("expected mentions, got {other:?}"),
    }
    let text = view::to_plain(&view::render_mentions(&alice.state().mentions));
    assert!(text.contains("1 comment(s) from others"));
    assert!(!text.contains("Bob's Gig"));
}

#[tokio::test]
async fn preview_is_capped() {
    let (_board, base) = spawn_board().await;
    let mut alice = signed_in(&base, "Alice").await;
    let show = new_show(&mut alice, "Big Show").await;
    let mut bob = signed_in(&base, "Bob").await;
    for i in 0..PREVIEW_LIMIT + 2 {
        say(&mut bob, show, &format!("message {i}"), Visibility::Public).await;
    }

    let me = alice.identity().user_id.clone().unwrap();
    let found = mentions::collect(alice.session().client(), &me).await.unwrap();
    let Mentions::Found(groups) = &found else { panic!("expected mentions, got {found:?}") };
    assert_eq!(groups[0].comments.len(), PREVIEW_LIMIT + 2);

    let fragment = view::render_mentions(&Panel::Ready(found.clone()));
    let text = view::to_plain(&fragment);
    assert!(text.contains(&format!("{} comment(s) from others", PREVIEW_LIMIT + 2)));
    assert_eq!(text.matches("message").count(), PREVIEW_LIMIT);
}

#[tokio::test]
async fn one_failing_show_does_not_sink_mentions() {
    let (board, base) = spawn_board().await;
    let mut alice = signed_in(&base, "Alice").await;
    let spring = new_show(&mut alice, "Spring Tour").await;
    let summer = new_show(&mut alice, "Summer Tour").await;
    let mut bob = signed_in(&base, "Bob").await;
    say(&mut bob, spring, "front row?", Visibility::Public).await;
    say(&mut bob, summer, "still selling?", Visibility::Public).await;

    board.fail_comments_for(spring);
    let me = alice.identity().user_id.clone().unwrap();
    let found = mentions::collect(alice.session().client(), &me).await.unwrap();
    match &found {
        Mentions::Found(groups) => {
            let ids: Vec<u64> = groups.iter().map(|g| g.show.id).collect();
            assert_eq!(ids, [summer]);
            assert_eq!(groups[0].comments[0].content, "still selling?");
        }
        other => panic!("expected mentions, got {other:?}"),
    }

    alice.dispatch(Command::SwitchTab(Tab::Mentions)).await;
    assert_eq!(mentions_of(&alice), &found);
}
