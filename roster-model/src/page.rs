use serde::{Deserialize, Serialize};

use crate::user::User;

/// One page of the users collection, as returned by `GET /users?page=N`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPage {
    pub data: Vec<User>,
    pub page: u32,
    pub per_page: u32,
    pub total: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_pages: Option<u32>,
}

/// Envelope around a single user, as returned by `GET /users/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserEnvelope {
    pub data: User,
}

/// Number of pages needed for `total` records. A zero page size is treated
/// as a single page.
pub fn total_pages(total: u64, per_page: u32) -> u32 {
    if per_page == 0 {
        return 1;
    }
    let pages = total.div_ceil(u64::from(per_page));
    u32::try_from(pages).unwrap_or(u32::MAX)
}

/// Page numbers to show in pagination controls: up to `max_buttons` pages
/// starting half a window before `current`, clipped to `1..=total_pages`.
pub fn page_window(current: u32, total_pages: u32, max_buttons: u32) -> Vec<u32> {
    if total_pages == 0 || max_buttons == 0 {
        return Vec::new();
    }
    let start = current.saturating_sub(max_buttons / 2).max(1);
    let end = total_pages.min(start.saturating_add(max_buttons - 1));
    (start..=end).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_reqres_listing() {
        let page: UserPage = serde_json::from_str(
            r#"{
                "page": 2, "per_page": 6, "total": 12, "total_pages": 2,
                "data": [{"id": 7, "email": "michael.lawson@reqres.in",
                          "first_name": "Michael", "last_name": "Lawson",
                          "avatar": "https://reqres.in/img/faces/7-image.jpg"}],
                "support": {"url": "https://reqres.in"}
            }"#,
        )
        .unwrap();
        assert_eq!(page.page, 2);
        assert_eq!(page.data.len(), 1);
        assert_eq!(page.total_pages, Some(2));
    }

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(total_pages(12, 6), 2);
        assert_eq!(total_pages(13, 6), 3);
        assert_eq!(total_pages(0, 6), 0);
        assert_eq!(total_pages(10, 0), 1);
    }

    #[test]
    fn window_is_centered_then_clipped() {
        assert_eq!(page_window(1, 10, 5), vec![1, 2, 3, 4, 5]);
        assert_eq!(page_window(6, 10, 5), vec![4, 5, 6, 7, 8]);
        assert_eq!(page_window(10, 10, 5), vec![8, 9, 10]);
        assert_eq!(page_window(1, 2, 5), vec![1, 2]);
        assert!(page_window(1, 0, 5).is_empty());
    }
}
