//! The recognised transaction categories.
//!
//! Categories are free-form text on a transaction. These lists are only
//! suggestions offered to clients.

use serde::Serialize;

use crate::response::ApiResponse;

/// The suggested categories for income.
pub const INCOME_CATEGORIES: [&str; 6] = [
    "Salary",
    "Freelance",
    "Investment",
    "Business",
    "Gift",
    "Other Income",
];

/// The suggested categories for expenses.
pub const EXPENSE_CATEGORIES: [&str; 9] = [
    "Food & Dining",
    "Transportation",
    "Shopping",
    "Entertainment",
    "Bills & Utilities",
    "Healthcare",
    "Travel",
    "Education",
    "Other Expense",
];

/// The suggested categories grouped by transaction type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub struct CategoriesByType {
    income: Vec<&'static str>,
    expense: Vec<&'static str>,
}

/// The `data` of a categories response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoriesResponse {
    categories: CategoriesByType,
    all_categories: Vec<&'static str>,
}

/// A route handler listing the suggested categories.
pub async fn get_categories_endpoint() -> ApiResponse<CategoriesResponse> {
    ApiResponse::ok(categories())
}

fn categories() -> CategoriesResponse {
    CategoriesResponse {
        categories: CategoriesByType {
            income: INCOME_CATEGORIES.to_vec(),
            expense: EXPENSE_CATEGORIES.to_vec(),
        },
        all_categories: INCOME_CATEGORIES
            .iter()
            .chain(EXPENSE_CATEGORIES.iter())
            .copied()
            .collect(),
    }
}
