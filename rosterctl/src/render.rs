//! Terminal output

use roster_core::{BufferedNotifier, NotificationLevel, SessionState};
use roster_model::{User, ViewMode};
use std::fmt::Write as _;

/// Print buffered toasts. Returns whether any of them was an error.
pub fn flush_notifications(notifier: &BufferedNotifier) -> bool {
    let mut saw_error = false;
    for notification in notifier.drain() {
        match notification.level {
            NotificationLevel::Success => println!("{}", notification.message),
            NotificationLevel::Error => {
                saw_error = true;
                eprintln!("error: {}", notification.message);
            }
        }
    }
    saw_error
}

pub fn users(users: &[User], mode: ViewMode) -> String {
    match mode {
        ViewMode::Table => table(users),
        ViewMode::Card => users
            .iter()
            .map(card)
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

fn table(users: &[User]) -> String {
    let id_width = users
        .iter()
        .map(|user| user.id.as_str().len())
        .chain(std::iter::once(2))
        .max()
        .unwrap_or(2);
    let name_width = users
        .iter()
        .map(|user| user.full_name().chars().count())
        .chain(std::iter::once(4))
        .max()
        .unwrap_or(4);

    let mut out = format!("{:<id_width$}  {:<name_width$}  EMAIL\n", "ID", "NAME");
    for user in users {
        let _ = writeln!(
            out,
            "{:<id_width$}  {:<name_width$}  {}",
            user.id,
            user.full_name(),
            user.email
        );
    }
    out
}

pub fn card(user: &User) -> String {
    let mut out = format!("#{} {}\n", user.id, user.full_name());
    let _ = writeln!(out, "  email:  {}", user.email);
    if let Some(avatar) = &user.avatar {
        let _ = writeln!(out, "  avatar: {avatar}");
    }
    out
}

pub fn page_footer(page: u32, total_pages: u32, total: u64) -> String {
    format!("page {page} of {total_pages} ({total} users)")
}

pub fn session(state: &SessionState) -> String {
    match state {
        SessionState::LoggedIn(session) => format!(
            "signed in as {} until {}",
            session.user.email,
            session.expiry.format("%Y-%m-%d %H:%M:%S UTC")
        ),
        SessionState::LoggingIn { email } => format!("signing in as {email}"),
        SessionState::LoggedOut => "not signed in".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roster_model::UserId;

    fn janet() -> User {
        User {
            id: UserId::from(2u64),
            email: "janet.weaver@reqres.in".into(),
            first_name: "Janet".into(),
            last_name: "Weaver".into(),
            avatar: Some("https://reqres.in/img/faces/2-image.jpg".into()),
        }
    }

    #[test]
    fn table_aligns_columns() {
        let rendered = users(&[janet()], ViewMode::Table);
        let lines: Vec<_> = rendered.lines().collect();
        assert_eq!(lines[0], "ID  NAME          EMAIL");
        assert_eq!(lines[1], "2   Janet Weaver  janet.weaver@reqres.in");
    }

    #[test]
    fn card_lists_avatar_when_present() {
        let rendered = users(&[janet()], ViewMode::Card);
        assert!(rendered.starts_with("#2 Janet Weaver\n"));
        assert!(rendered.contains("avatar: https://reqres.in/img/faces/2-image.jpg"));
    }

    #[test]
    fn logged_out_session_is_described() {
        assert_eq!(session(&SessionState::LoggedOut), "not signed in");
    }
}
