//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/api/finance/categories/{category_id}', use [format_endpoint].

/// The route for registering a new user.
pub const USERS: &str = "/api/users";
/// The route for deleting the logged in user's account.
pub const CURRENT_USER: &str = "/api/users/me";
/// The route for logging in a user.
pub const LOG_IN: &str = "/api/log_in";
/// The route for the client to log out the current user.
pub const LOG_OUT: &str = "/api/log_out";
/// The route to list and create categories.
pub const CATEGORIES: &str = "/api/finance/categories";
/// The route to access a single category.
pub const CATEGORY: &str = "/api/finance/categories/{category_id}";
/// The route to list and create transactions.
pub const TRANSACTIONS: &str = "/api/finance/transactions";
/// The route to access a single transaction.
pub const TRANSACTION: &str = "/api/finance/transactions/{transaction_id}";
/// The route to list and create budgets.
pub const BUDGETS: &str = "/api/finance/budgets";
/// The route to access a single budget.
pub const BUDGET: &str = "/api/finance/budgets/{budget_id}";
/// The route for the user's financial summary.
pub const SUMMARY: &str = "/api/finance/summary";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is the first substring that starts with a left brace and ends
/// with a right brace, e.g. '{category_id}' in '/api/finance/categories/{category_id}'.
/// An unterminated parameter runs to the end of the path.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// original `endpoint_path`.
#[cfg(test)]
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let Some(param_start) = endpoint_path.find('{') else {
        return endpoint_path.to_owned();
    };

    let param_end = endpoint_path[param_start..]
        .find('}')
        .map_or(endpoint_path.len(), |offset| param_start + offset + 1);

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}

// These tests are here so that we know when we call `Uri::from_shared` it will not panic.
#[cfg(test)]
mod endpoints_tests {
    use axum::http::Uri;

    use crate::endpoints;

    use super::format_endpoint;

    fn assert_endpoint_is_valid_uri(uri: &str) {
        assert!(uri.parse::<Uri>().is_ok());
    }

    #[test]
    fn endpoints_are_valid_uris() {
        assert_endpoint_is_valid_uri(endpoints::USERS);
        assert_endpoint_is_valid_uri(endpoints::CURRENT_USER);
        assert_endpoint_is_valid_uri(endpoints::LOG_IN);
        assert_endpoint_is_valid_uri(endpoints::LOG_OUT);
        assert_endpoint_is_valid_uri(endpoints::CATEGORIES);
        assert_endpoint_is_valid_uri(endpoints::TRANSACTIONS);
        assert_endpoint_is_valid_uri(endpoints::BUDGETS);
        assert_endpoint_is_valid_uri(endpoints::SUMMARY);
    }

    #[test]
    fn parameterised_endpoints_format_to_valid_uris() {
        for endpoint in [endpoints::CATEGORY, endpoints::TRANSACTION, endpoints::BUDGET] {
            let formatted_path = format_endpoint(endpoint, 42);

            assert!(formatted_path.ends_with("/42"), "got {formatted_path}");
            assert_endpoint_is_valid_uri(&formatted_path);
        }
    }

    #[test]
    fn produces_valid_uri() {
        let formatted_path = format_endpoint("/hello/{world_id}", 1);

        assert_eq!(formatted_path, "/hello/1");
        assert!(formatted_path.parse::<Uri>().is_ok());

        // Parameter with single word should also work.
        let formatted_path = format_endpoint("/hello/{world}", 1);

        assert_eq!(formatted_path, "/hello/1");
        assert!(formatted_path.parse::<Uri>().is_ok());
    }

    #[test]
    fn returns_original_path_with_no_parameter() {
        let formatted_path = format_endpoint("/hello/world", 1);

        assert_eq!(formatted_path, "/hello/world");
        assert!(formatted_path.parse::<Uri>().is_ok());
    }

    #[test]
    fn parameter_in_middle() {
        let formatted_path = format_endpoint("/hello/{world}/bye", 1);

        assert_eq!(formatted_path, "/hello/1/bye");
        assert!(formatted_path.parse::<Uri>().is_ok());
    }
}
