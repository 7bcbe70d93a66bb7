//! Derived views over a [`UserCollection`] snapshot
//!
//! Kept as free functions so list views and the CLI compute search results
//! and pagination the same way.

use roster_model::{User, page};

use super::state::UserCollection;

/// Pagination controls show at most this many page buttons.
pub const DEFAULT_PAGE_BUTTONS: u32 = 5;

/// Cached users in display order
pub fn users(collection: &UserCollection) -> Vec<User> {
    collection.users().cloned().collect()
}

/// Case-insensitive substring match over email, first and last name.
/// An empty or whitespace-only query matches everyone.
pub fn search(collection: &UserCollection, query: &str) -> Vec<User> {
    let needle = query.trim().to_lowercase();
    collection
        .users()
        .filter(|user| {
            needle.is_empty()
                || user.email.to_lowercase().contains(&needle)
                || user.first_name.to_lowercase().contains(&needle)
                || user.last_name.to_lowercase().contains(&needle)
        })
        .cloned()
        .collect()
}

pub fn total_pages(collection: &UserCollection) -> u32 {
    page::total_pages(collection.total(), collection.per_page())
}

/// Page numbers around the cursor, at most [`DEFAULT_PAGE_BUTTONS`] wide
pub fn page_window(collection: &UserCollection) -> Vec<u32> {
    page::page_window(
        collection.page(),
        total_pages(collection),
        DEFAULT_PAGE_BUTTONS,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use roster_model::{UserId, UserPage};

    fn collection() -> UserCollection {
        let people = [
            (1u64, "george.bluth@reqres.in", "George", "Bluth"),
            (2, "janet.weaver@reqres.in", "Janet", "Weaver"),
            (3, "emma.wong@reqres.in", "Emma", "Wong"),
        ];
        let mut collection = UserCollection::default();
        collection.replace_page(UserPage {
            data: people
                .into_iter()
                .map(|(id, email, first, last)| User {
                    id: UserId::from(id),
                    email: email.into(),
                    first_name: first.into(),
                    last_name: last.into(),
                    avatar: None,
                })
                .collect(),
            page: 1,
            per_page: 3,
            total: 12,
            total_pages: None,
        });
        collection
    }

    #[test]
    fn search_is_case_insensitive_across_fields() {
        let collection = collection();
        let hits = search(&collection, "WEAVER");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].first_name, "Janet");

        assert_eq!(search(&collection, "reqres.in").len(), 3);
        assert_eq!(search(&collection, "  ").len(), 3);
        assert!(search(&collection, "tobias").is_empty());
    }

    #[test]
    fn pagination_helpers_follow_metadata() {
        let collection = collection();
        assert_eq!(total_pages(&collection), 4);
        assert_eq!(page_window(&collection), vec![1, 2, 3, 4]);
        assert_eq!(users(&collection).len(), 3);
    }
}
