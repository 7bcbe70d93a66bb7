use anyhow::Context;
use roster_core::Console;
use roster_model::{Credentials, UserId, UserPayload};

use crate::cli::{Command, UserFields, UserUpdate, UsersCommand};
use crate::render;

pub async fn execute(console: &Console, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Login { email, password } => {
            console.login(&Credentials::new(email, password)).await?;
            println!("{}", render::session(&console.session_state().await?));
        }
        Command::Logout => {
            console.logout().await?;
            println!("signed out");
        }
        Command::Status => {
            println!("{}", render::session(&console.session_state().await?));
            let preferences = console.current_preferences();
            println!(
                "theme: {}, view: {}",
                preferences.theme, preferences.view_mode
            );
        }
        Command::Users(users) => execute_users(console, users).await?,
        Command::Theme => {
            let theme = console.toggle_theme().await?;
            println!("theme: {theme}");
        }
        Command::View { mode } => {
            console.set_view_mode(mode).await?;
            println!("view: {mode}");
        }
    }
    Ok(())
}

async fn execute_users(console: &Console, command: UsersCommand) -> anyhow::Result<()> {
    match command {
        UsersCommand::List { page, search } => {
            console.load_page(page).await?;
            let users = match search.as_deref() {
                Some(query) => console.search(query),
                None => console.users(),
            };
            let snapshot = console.snapshot();
            let view_mode = console.current_preferences().view_mode;

            print!("{}", render::users(&users, view_mode));
            println!(
                "{}",
                render::page_footer(
                    snapshot.page(),
                    console.total_pages(),
                    snapshot.total()
                )
            );
        }
        UsersCommand::Show { id } => {
            let user = fetch(console, &id).await?;
            print!("{}", render::card(&user));
        }
        UsersCommand::Create(fields) => {
            let created = console.create(&new_payload(fields)).await?;
            print!("{}", render::card(&created));
        }
        UsersCommand::Update { id, fields } => {
            let payload = update_payload(console, &id, fields).await?;
            console.update(&id, &payload).await?;
        }
        UsersCommand::Delete { id } => {
            console.remove(&id).await?;
        }
    }
    Ok(())
}

async fn fetch(console: &Console, id: &UserId) -> anyhow::Result<roster_model::User> {
    console.load_one(id).await?;
    console
        .selected()
        .with_context(|| format!("user {id} was not loaded"))
}

fn new_payload(fields: UserFields) -> UserPayload {
    UserPayload::new(
        fields.email,
        fields.first_name,
        fields.last_name,
        fields.avatar,
    )
}

/// Missing fields are filled from the user's current record.
async fn update_payload(
    console: &Console,
    id: &UserId,
    fields: UserUpdate,
) -> anyhow::Result<UserPayload> {
    let mut payload = if fields.is_complete() {
        UserPayload::default()
    } else {
        fetch(console, id).await?.to_payload()
    };

    if let Some(email) = fields.email {
        payload.email = email;
    }
    if let Some(first_name) = fields.first_name {
        payload.first_name = first_name;
    }
    if let Some(last_name) = fields.last_name {
        payload.last_name = last_name;
    }
    if let Some(avatar) = fields.avatar {
        payload.avatar = avatar;
    }
    Ok(payload)
}
