//! API route definitions.

use axum::{Router, middleware};
use serde::{Deserialize, Deserializer};

use crate::{AppState, middleware::auth::auth_middleware};
use rentora_shared::types::PageRequest;

pub mod buildings;
pub mod consumption;
pub mod contracts;
pub mod dashboard;
pub mod documents;
pub mod health;
pub mod invitations;
pub mod organizations;
pub mod tickets;
pub mod users;

/// Creates the API router with public and protected routes.
#[allow(clippy::needless_pass_by_value)]
pub fn api_routes_with_state(state: AppState) -> Router<AppState> {
    // Protected routes that require authentication
    let protected_routes = Router::new()
        .merge(organizations::routes())
        .merge(users::routes())
        .merge(buildings::routes())
        .merge(contracts::routes())
        .merge(tickets::routes())
        .merge(consumption::routes())
        .merge(documents::routes())
        .merge(invitations::routes())
        .merge(dashboard::routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    // Public routes: health, organization sign-up, invitation acceptance.
    Router::new()
        .merge(health::routes())
        .merge(organizations::public_routes())
        .merge(invitations::public_routes())
        .merge(protected_routes)
}

/// Pagination query parameters shared by list endpoints.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageQuery {
    /// Page number (1-indexed).
    pub page: Option<u32>,
    /// Items per page.
    pub per_page: Option<u32>,
}

impl PageQuery {
    /// Builds a `PageRequest`, falling back to the defaults.
    #[must_use]
    pub fn page_request(self) -> PageRequest {
        let defaults = PageRequest::default();
        PageRequest {
            page: self.page.unwrap_or(defaults.page),
            per_page: self.per_page.unwrap_or(defaults.per_page),
        }
    }
}

/// Deserializes a field that distinguishes "absent" from "explicitly null".
///
/// With `#[serde(default, deserialize_with = "double_option")]` a missing
/// field becomes `None` and `"field": null` becomes `Some(None)`, which the
/// repository inputs interpret as "clear the value".
pub(crate) fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Patch {
        #[serde(default, deserialize_with = "double_option")]
        end_date: Option<Option<String>>,
    }

    #[test]
    fn test_double_option_distinguishes_null_from_absent() {
        let absent: Patch = serde_json::from_str("{}").unwrap();
        assert_eq!(absent.end_date, None);

        let cleared: Patch = serde_json::from_str(r#"{"end_date": null}"#).unwrap();
        assert_eq!(cleared.end_date, Some(None));

        let set: Patch = serde_json::from_str(r#"{"end_date": "2026-08-31"}"#).unwrap();
        assert_eq!(set.end_date, Some(Some("2026-08-31".to_string())));
    }

    #[test]
    fn test_page_query_defaults() {
        let q = PageQuery::default();
        let req = q.page_request();
        assert_eq!(req.page, 1);
        assert_eq!(req.per_page, 25);

        let q = PageQuery {
            page: Some(3),
            per_page: Some(50),
        };
        let req = q.page_request();
        assert_eq!(req.page, 3);
        assert_eq!(req.per_page, 50);
    }
}
