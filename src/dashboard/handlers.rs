//! Dashboard HTTP handler and view rendering.

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use time::{OffsetDateTime, macros::format_description};

use crate::{
    AppState, Error,
    calendar::{format_month, month_bounds, month_grid},
    dashboard::{cards::summary_cards_view, tables::category_table},
    endpoints,
    html::{base, link},
    pagination::PaginationParams,
    summary::summarize,
    timezone::local_now,
    transaction::{
        SQLiteTransactionStore, TransactionFilter, TransactionStore, transactions_table,
    },
};

/// The number of transactions listed under "Recent Transactions".
const RECENT_TRANSACTION_COUNT: u64 = 5;

/// The state needed for displaying the dashboard page.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// The store to read transactions from.
    pub store: SQLiteTransactionStore,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            store: SQLiteTransactionStore::from_ref(state),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Display a page with an overview of the current month.
pub async fn get_dashboard_page(State(state): State<DashboardState>) -> Result<Response, Error> {
    let now = local_now(&state.local_timezone)?;

    dashboard_view(&state.store, now).map(IntoResponse::into_response)
}

fn dashboard_view(store: &impl TransactionStore, now: OffsetDateTime) -> Result<Markup, Error> {
    let today = now.date();
    let offset = now.offset();

    let (month_start, month_end) = month_bounds(today, offset);
    let month_transactions = store
        .find_many(&TransactionFilter::created_between(month_start, month_end), None)
        .inspect_err(|error| tracing::error!("could not get this month's transactions: {error}"))?;
    let recent_transactions = store
        .find_many(
            &TransactionFilter::default(),
            Some(PaginationParams {
                page: 1,
                limit: RECENT_TRANSACTION_COUNT,
            }),
        )
        .inspect_err(|error| tracing::error!("could not get recent transactions: {error}"))?;

    let summary = summarize(&month_transactions);
    let calendar = month_grid(today, &month_transactions, offset);
    let month_title = today
        .format(format_description!("[month repr:long] [year]"))
        .unwrap_or_else(|_| format_month(today));
    let day_url = |date: time::Date| {
        format!(
            "{}?month={}&day={date}",
            endpoints::TRANSACTIONS_VIEW,
            format_month(date)
        )
    };

    let content = html! {
        h1 { "Dashboard" }
        p { (month_title) }

        (summary_cards_view(&summary))

        div class="cards"
        {
            (category_table("Expenses by Category", &summary.expense_by_category))
            (category_table("Income by Category", &summary.income_by_category))
        }

        section
        {
            h2 { "Calendar" }
            (calendar.render(Some(today), day_url))
        }

        section
        {
            h2 { "Recent Transactions" }
            (transactions_table(&recent_transactions, offset, "No transactions yet."))
            p { (link(endpoints::TRANSACTIONS_VIEW, "View all transactions")) }
        }
    };

    Ok(base("Dashboard", endpoints::DASHBOARD_VIEW, &content))
}
