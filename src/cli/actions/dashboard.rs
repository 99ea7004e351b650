use crate::api::Gateway;
use crate::cli::actions::Action;
use crate::dashboard::{
    types::{Post, SortKey},
    Dashboard, PostsRequest,
};
use anyhow::Result;
use std::io::Write;
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::mpsc,
};
use tracing::{debug, info};

/// One finished posts fetch, tagged with the ticket it was issued for
type PostsOutcome = (PostsRequest, Result<Vec<Post>>);

#[derive(Debug, PartialEq)]
enum UiCommand {
    Filter(String),
    Sort(SortKey),
    Select(u64),
    Users,
    Posts,
    Help,
    Quit,
}

/// Handle the dashboard action: load the user list once, then multiplex
/// stdin commands and posts-fetch completions on a single loop. Every state
/// transition happens here, on one task.
pub async fn handle(action: Action) -> Result<()> {
    let Action::Dashboard { api_url } = action;

    let gateway = Gateway::new(&api_url)?;
    let mut state = Dashboard::new();

    info!("loading users from {api_url}");

    match gateway.fetch_users().await {
        Ok(users) => state.users_resolved(users),
        Err(err) => state.users_failed(format!("Failed to load users: {err}")),
    }

    render_users(&state);
    print_help();

    let (tx, mut rx) = mpsc::channel::<PostsOutcome>(8);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    prompt()?;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };

                match parse_command(&line) {
                    Ok(Some(command)) => {
                        if !apply(&mut state, command, &gateway, &tx) {
                            break;
                        }
                    }
                    Ok(None) => {}
                    Err(message) => println!("{message}"),
                }

                prompt()?;
            }
            Some((request, result)) = rx.recv() => {
                let applied = match result {
                    Ok(posts) => state.posts_resolved(request, posts),
                    Err(err) => {
                        state.posts_failed(request, format!("Failed to load posts: {err}"))
                    }
                };

                // stale completions belong to a superseded selection and
                // were dropped by the state machine
                if applied {
                    println!();
                    render_posts(&state);
                    prompt()?;
                }
            }
        }
    }

    Ok(())
}

/// Apply one command to the state. Returns `false` when the loop should end.
fn apply(
    state: &mut Dashboard,
    command: UiCommand,
    gateway: &Gateway,
    tx: &mpsc::Sender<PostsOutcome>,
) -> bool {
    match command {
        UiCommand::Filter(query) => {
            state.apply_filter(&query);
            render_users(state);
        }
        UiCommand::Sort(key) => {
            state.apply_sort(key);
            render_users(state);
        }
        UiCommand::Select(user_id) => match state.select(user_id) {
            Some(request) => {
                println!("Loading posts...");
                spawn_posts_fetch(gateway.clone(), request, tx.clone());
            }
            None => println!("unknown user id: {user_id}"),
        },
        UiCommand::Users => render_users(state),
        UiCommand::Posts => render_posts(state),
        UiCommand::Help => print_help(),
        UiCommand::Quit => return false,
    }

    true
}

/// Fire-and-forget posts fetch; the completion flows back over the channel
/// and is validated against the current selection before it is applied
fn spawn_posts_fetch(gateway: Gateway, request: PostsRequest, tx: mpsc::Sender<PostsOutcome>) {
    tokio::spawn(async move {
        let result = gateway.fetch_posts_by_user(request.user_id).await;

        if tx.send((request, result)).await.is_err() {
            debug!("dashboard loop is gone, dropping posts result");
        }
    });
}

fn parse_command(line: &str) -> std::result::Result<Option<UiCommand>, String> {
    let mut parts = line.trim().splitn(2, char::is_whitespace);

    let Some(head) = parts.next().filter(|head| !head.is_empty()) else {
        return Ok(None);
    };

    let rest = parts.next().map_or("", str::trim);

    match head {
        "filter" => Ok(Some(UiCommand::Filter(rest.to_string()))),
        "sort" => rest
            .parse::<SortKey>()
            .map(|key| Some(UiCommand::Sort(key)))
            .map_err(|_| "usage: sort name|company.name".to_string()),
        "select" => rest
            .parse::<u64>()
            .map(|id| Some(UiCommand::Select(id)))
            .map_err(|_| "usage: select <id>".to_string()),
        "users" => Ok(Some(UiCommand::Users)),
        "posts" => Ok(Some(UiCommand::Posts)),
        "help" => Ok(Some(UiCommand::Help)),
        "quit" | "exit" => Ok(Some(UiCommand::Quit)),
        _ => Err(format!("unknown command: {head} (try \"help\")")),
    }
}

fn prompt() -> Result<()> {
    print!("> ");
    std::io::stdout().flush()?;

    Ok(())
}

fn render_users(state: &Dashboard) {
    println!();
    println!("Users");

    if state.users_loading() {
        println!("Loading users...");
        return;
    }

    if let Some(error) = state.users_error() {
        println!("{error}");
        return;
    }

    if let Some(key) = state.sort_key() {
        println!("(sorted by {})", key.as_str());
    }

    if state.visible_users().is_empty() {
        if state.query().is_empty() {
            println!("No users found.");
        } else {
            println!("No users match \"{}\".", state.query());
        }
        return;
    }

    for user in state.visible_users() {
        println!(
            "[{:>2}] {} <{}>",
            user.id,
            user.name.as_deref().unwrap_or("-"),
            user.email.as_deref().unwrap_or("-"),
        );

        match &user.address {
            Some(address) => println!(
                "     {}, {}, {}, {}",
                address.street, address.suite, address.city, address.zipcode
            ),
            None => println!("     Address not available"),
        }

        match user.company.as_ref().and_then(|company| company.name.as_deref()) {
            Some(company) => println!("     {company}"),
            None => println!("     Company not available"),
        }
    }
}

fn render_posts(state: &Dashboard) {
    println!("Posts");

    if state.posts_loading() {
        println!("Loading posts...");
        return;
    }

    if let Some(error) = state.posts_error() {
        println!("{error}");
        return;
    }

    let Some(user) = state.selected_user() else {
        println!("Select a user to see posts.");
        return;
    };

    println!(
        "Showing posts for: {}",
        user.name.as_deref().unwrap_or("-")
    );

    if state.posts().is_empty() {
        println!("No posts available.");
        return;
    }

    for post in state.posts() {
        println!("- {}", post.title);
        println!("  {}", post.body);
    }
}

fn print_help() {
    println!();
    println!("Commands:");
    println!("  filter [text]            search users by name or email");
    println!("  sort name|company.name   sort the user list");
    println!("  select <id>              show posts for a user");
    println!("  users                    print the user list");
    println!("  posts                    print the posts panel");
    println!("  help                     print this help");
    println!("  quit                     exit");
}
