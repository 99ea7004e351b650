pub mod types;

use crate::dashboard::types::{Post, SortKey, User};
use std::cmp::Ordering;
use tracing::debug;

/// Ticket tagging one in-flight posts fetch. Issued by [`Dashboard::select`]
/// and handed back with the result; a ticket whose epoch is no longer current
/// is stale and its result is dropped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PostsRequest {
    pub user_id: u64,
    epoch: u64,
}

/// The whole dashboard state: the fetched user set, the filtered/sorted view
/// over it, the current selection, and the posts panel. All transitions are
/// synchronous; the network lives outside and feeds results back in through
/// `users_resolved`/`users_failed` and `posts_resolved`/`posts_failed`.
#[derive(Debug, Default)]
pub struct Dashboard {
    users: Vec<User>,
    users_loading: bool,
    users_error: Option<String>,
    query: String,
    sort_key: Option<SortKey>,
    visible: Vec<User>,
    selected: Option<u64>,
    posts: Vec<Post>,
    posts_loading: bool,
    posts_error: Option<String>,
    epoch: u64,
}

/// Caseless lexicographic ordering, the closest portable analogue of the
/// locale comparison the view contract asks for
fn caseless_cmp(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

impl Dashboard {
    #[must_use]
    pub fn new() -> Self {
        Self {
            users_loading: true,
            ..Self::default()
        }
    }

    /// The full user set arrived. Stores it and initializes the view to the
    /// full set in API order. Called once, at startup.
    pub fn users_resolved(&mut self, users: Vec<User>) {
        self.visible = users.clone();
        self.users = users;
        self.users_loading = false;
        self.users_error = None;
    }

    /// The initial user fetch failed. The list stays empty and the error is
    /// persistent; there is no automatic retry.
    pub fn users_failed(&mut self, message: impl Into<String>) {
        self.users = Vec::new();
        self.visible = Vec::new();
        self.users_loading = false;
        self.users_error = Some(message.into());
    }

    /// Recompute the view from the FULL fetched set by case-insensitive
    /// substring match on name or email. An empty query matches everything.
    /// A user missing a field simply does not match on that field. The view
    /// returns to API order; sorting is re-applied only by the next
    /// [`Self::apply_sort`].
    pub fn apply_filter(&mut self, query: &str) {
        self.query = query.to_string();
        let needle = query.to_lowercase();

        self.visible = self
            .users
            .iter()
            .filter(|user| {
                let matches = |field: &Option<String>| {
                    field
                        .as_deref()
                        .is_some_and(|value| value.to_lowercase().contains(&needle))
                };
                matches(&user.name) || matches(&user.email)
            })
            .cloned()
            .collect();
    }

    /// Sort the CURRENT view by the named field. Missing fields order as the
    /// empty string. `sort_by` is stable, so equal keys keep their relative
    /// order.
    pub fn apply_sort(&mut self, key: SortKey) {
        self.sort_key = Some(key);
        self.visible
            .sort_by(|a, b| caseless_cmp(key.field_of(a), key.field_of(b)));
    }

    /// Select a user and open a fresh posts fetch. Returns `None` if the id
    /// does not belong to the fetched set; otherwise clears the posts panel,
    /// raises the loading flag, and returns the ticket the driver must pass
    /// back with the fetch result. Re-selecting the same user issues a new
    /// ticket: every selection is a fresh round trip.
    pub fn select(&mut self, user_id: u64) -> Option<PostsRequest> {
        if !self.users.iter().any(|user| user.id == user_id) {
            return None;
        }

        self.selected = Some(user_id);
        self.posts = Vec::new();
        self.posts_error = None;
        self.posts_loading = true;
        self.epoch += 1;

        Some(PostsRequest {
            user_id,
            epoch: self.epoch,
        })
    }

    /// Apply a successful posts fetch. Returns `false` (and changes nothing)
    /// if the ticket is stale, i.e. a later selection already superseded it.
    pub fn posts_resolved(&mut self, request: PostsRequest, posts: Vec<Post>) -> bool {
        if request.epoch != self.epoch {
            debug!("dropping stale posts response for user {}", request.user_id);
            return false;
        }

        self.posts = posts;
        self.posts_loading = false;
        true
    }

    /// Apply a failed posts fetch. Same staleness guard as
    /// [`Self::posts_resolved`]. Only the posts panel is affected; the user
    /// list and the selection are untouched.
    pub fn posts_failed(&mut self, request: PostsRequest, message: impl Into<String>) -> bool {
        if request.epoch != self.epoch {
            debug!("dropping stale posts error for user {}", request.user_id);
            return false;
        }

        self.posts = Vec::new();
        self.posts_loading = false;
        self.posts_error = Some(message.into());
        true
    }

    #[must_use]
    pub fn visible_users(&self) -> &[User] {
        &self.visible
    }

    #[must_use]
    pub fn selected_user(&self) -> Option<&User> {
        self.selected
            .and_then(|id| self.users.iter().find(|user| user.id == id))
    }

    #[must_use]
    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    #[must_use]
    pub const fn users_loading(&self) -> bool {
        self.users_loading
    }

    #[must_use]
    pub fn users_error(&self) -> Option<&str> {
        self.users_error.as_deref()
    }

    #[must_use]
    pub const fn posts_loading(&self) -> bool {
        self.posts_loading
    }

    #[must_use]
    pub fn posts_error(&self) -> Option<&str> {
        self.posts_error.as_deref()
    }

    #[must_use]
    pub const fn sort_key(&self) -> Option<SortKey> {
        self.sort_key
    }

    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: u64, name: Option<&str>, email: Option<&str>, company: Option<&str>) -> User {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "name": name,
            "email": email,
            "company": company.map(|name| serde_json::json!({ "name": name })),
        }))
        .unwrap()
    }

    fn post(id: u64, user_id: u64) -> Post {
        Post {
            id,
            user_id,
            title: "t".to_string(),
            body: "b".to_string(),
        }
    }

    fn loaded() -> Dashboard {
        let mut state = Dashboard::new();
        state.users_resolved(vec![
            user(1, Some("Bret"), Some("Sincere@april.biz"), Some("Romaguera-Crona")),
            user(2, Some("Antonette"), Some("Shanna@melissa.tv"), Some("Deckow-Crist")),
            user(3, Some("Samantha"), None, None),
            user(4, None, Some("nathan@yesenia.net"), Some("Robel-Corkery")),
        ]);
        state
    }

    fn visible_ids(state: &Dashboard) -> Vec<u64> {
        state.visible_users().iter().map(|user| user.id).collect()
    }

    #[test]
    fn test_load_initializes_view_in_api_order() {
        let state = loaded();

        assert!(!state.users_loading());
        assert!(state.users_error().is_none());
        assert_eq!(visible_ids(&state), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_load_failure_leaves_empty_list_with_error() {
        let mut state = Dashboard::new();
        state.users_failed("Failed to load users");

        assert!(!state.users_loading());
        assert_eq!(state.users_error(), Some("Failed to load users"));
        assert!(state.visible_users().is_empty());
    }

    #[test]
    fn test_filter_matches_name_case_insensitive() {
        let mut state = loaded();
        state.apply_filter("bret");

        assert_eq!(visible_ids(&state), vec![1]);
    }

    #[test]
    fn test_filter_matches_email() {
        let mut state = loaded();
        state.apply_filter("MELISSA.TV");

        assert_eq!(visible_ids(&state), vec![2]);
    }

    #[test]
    fn test_filter_empty_query_returns_full_set() {
        let mut state = loaded();
        state.apply_filter("bret");
        state.apply_filter("");

        assert_eq!(visible_ids(&state), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_filter_recomputes_from_full_set() {
        let mut state = loaded();
        state.apply_filter("bret");
        state.apply_filter("an");

        // "an" lives in Antonette, Samantha and nathan@, none of which match
        // "bret": the filter must not narrow the previous view
        assert_eq!(visible_ids(&state), vec![2, 3, 4]);
    }

    #[test]
    fn test_filter_skips_missing_fields_without_error() {
        let mut state = loaded();
        state.apply_filter("samantha");

        // user 3 has no email, user 4 has no name; matching still works on
        // the field that is present
        assert_eq!(visible_ids(&state), vec![3]);

        state.apply_filter("yesenia");
        assert_eq!(visible_ids(&state), vec![4]);
    }

    #[test]
    fn test_filter_no_match_yields_empty_view() {
        let mut state = loaded();
        state.apply_filter("zzz");

        assert!(state.visible_users().is_empty());
    }

    #[test]
    fn test_sort_by_name_is_caseless_and_missing_sorts_first() {
        let mut state = loaded();
        state.apply_sort(SortKey::Name);

        // user 4 has no name and orders as the empty string, first
        assert_eq!(visible_ids(&state), vec![4, 2, 1, 3]);
        assert_eq!(state.sort_key(), Some(SortKey::Name));
    }

    #[test]
    fn test_sort_by_company_name() {
        let mut state = loaded();
        state.apply_sort(SortKey::CompanyName);

        // user 3 has no company, then Deckow-Crist, Robel-Corkery,
        // Romaguera-Crona
        assert_eq!(visible_ids(&state), vec![3, 2, 4, 1]);
    }

    #[test]
    fn test_sort_applies_to_current_view_only() {
        let mut state = loaded();
        state.apply_filter("an");
        state.apply_sort(SortKey::Name);

        // only the filtered view is sorted; user 4 (no name) first
        assert_eq!(visible_ids(&state), vec![4, 2, 3]);
    }

    #[test]
    fn test_sort_is_non_decreasing() {
        let mut state = loaded();
        state.apply_sort(SortKey::Name);

        let names: Vec<String> = state
            .visible_users()
            .iter()
            .map(|user| user.name.as_deref().unwrap_or("").to_lowercase())
            .collect();
        let mut sorted = names.clone();
        sorted.sort();

        assert_eq!(names, sorted);
    }

    #[test]
    fn test_filter_resets_view_to_api_order() {
        let mut state = loaded();
        state.apply_sort(SortKey::Name);
        state.apply_filter("");

        // filtering recomputes from the fetched set; the sort is not
        // re-applied until the next sort command
        assert_eq!(visible_ids(&state), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_select_unknown_id_is_rejected() {
        let mut state = loaded();

        assert!(state.select(99).is_none());
        assert!(state.selected_user().is_none());
        assert!(!state.posts_loading());
    }

    #[test]
    fn test_select_sets_loading_and_clears_posts() {
        let mut state = loaded();
        let request = state.select(2).unwrap();
        state.posts_resolved(request, vec![post(10, 2)]);

        let request = state.select(1).unwrap();

        assert_eq!(request.user_id, 1);
        assert!(state.posts().is_empty());
        assert!(state.posts_loading());
        assert!(state.posts_error().is_none());
        assert_eq!(state.selected_user().map(|user| user.id), Some(1));
    }

    #[test]
    fn test_selection_survives_filtering_out_of_view() {
        let mut state = loaded();
        state.select(1).unwrap();
        state.apply_filter("antonette");

        assert_eq!(visible_ids(&state), vec![2]);
        assert_eq!(state.selected_user().map(|user| user.id), Some(1));
    }

    #[test]
    fn test_posts_resolved_binds_selected_user() {
        let mut state = loaded();
        let request = state.select(2).unwrap();

        assert!(state.posts_resolved(request, vec![post(10, 2)]));
        assert!(!state.posts_loading());
        assert_eq!(state.posts().len(), 1);
        assert!(state.posts().iter().all(|post| post.user_id == 2));
    }

    #[test]
    fn test_stale_response_is_dropped() {
        let mut state = loaded();
        let first = state.select(1).unwrap();
        let second = state.select(2).unwrap();

        // first's fetch resolves after second was selected
        assert!(!state.posts_resolved(first, vec![post(1, 1)]));
        assert!(state.posts().is_empty());
        assert!(state.posts_loading());

        assert!(state.posts_resolved(second, vec![post(10, 2)]));
        assert_eq!(state.posts()[0].user_id, 2);
    }

    #[test]
    fn test_stale_response_dropped_in_either_order() {
        let mut state = loaded();
        let first = state.select(1).unwrap();
        let second = state.select(2).unwrap();

        assert!(state.posts_resolved(second, vec![post(10, 2)]));
        assert!(!state.posts_resolved(first, vec![post(1, 1)]));

        assert_eq!(state.posts().len(), 1);
        assert_eq!(state.posts()[0].user_id, 2);
    }

    #[test]
    fn test_reselecting_same_user_issues_fresh_request() {
        let mut state = loaded();
        let first = state.select(1).unwrap();
        let second = state.select(1).unwrap();

        assert_ne!(first, second);
        // the older fetch for the same user is still stale
        assert!(!state.posts_resolved(first, vec![post(1, 1)]));
        assert!(state.posts_resolved(second, vec![post(2, 1)]));
        assert_eq!(state.posts()[0].id, 2);
    }

    #[test]
    fn test_stale_error_is_dropped() {
        let mut state = loaded();
        let first = state.select(1).unwrap();
        let second = state.select(2).unwrap();

        assert!(!state.posts_failed(first, "Failed to load posts"));
        assert!(state.posts_error().is_none());

        assert!(state.posts_resolved(second, vec![post(10, 2)]));
        assert_eq!(state.posts().len(), 1);
    }

    #[test]
    fn test_posts_failure_is_isolated() {
        let mut state = loaded();
        let request = state.select(2).unwrap();

        assert!(state.posts_failed(request, "Failed to load posts"));
        assert!(!state.posts_loading());
        assert!(state.posts().is_empty());
        assert_eq!(state.posts_error(), Some("Failed to load posts"));

        // the user list and the selection are untouched
        assert_eq!(visible_ids(&state), vec![1, 2, 3, 4]);
        assert_eq!(state.selected_user().map(|user| user.id), Some(2));
    }

    #[test]
    fn test_selection_clears_previous_posts_error() {
        let mut state = loaded();
        let request = state.select(2).unwrap();
        state.posts_failed(request, "Failed to load posts");

        let request = state.select(2).unwrap();

        assert!(state.posts_error().is_none());
        assert!(state.posts_loading());
        assert!(state.posts_resolved(request, vec![post(10, 2)]));
    }
}
