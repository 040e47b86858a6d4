//! Defines the route handler for the page that shows transactions on a month calendar.

use axum::{
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use serde::Deserialize;
use time::{Date, UtcOffset, macros::format_description};

use crate::{
    AppState, Error,
    calendar::{format_month, month_bounds, month_grid, next_month, parse_month, previous_month},
    endpoints,
    html::{base, link},
    timezone::{local_now, to_local},
    transaction::{
        Transaction, TransactionFilter, TransactionStore, SQLiteTransactionStore,
        table::transactions_table,
    },
};

/// The query string for the transactions page.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CalendarQuery {
    /// The month to show as "YYYY-MM", defaults to the current month.
    pub month: Option<String>,
    /// A day in the month to list transactions for as "YYYY-MM-DD".
    pub day: Option<String>,
}

/// The state needed for the transactions page.
#[derive(Debug, Clone)]
pub struct TransactionsViewState {
    /// The store to read transactions from.
    store: SQLiteTransactionStore,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    local_timezone: String,
}

impl FromRef<AppState> for TransactionsViewState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            store: SQLiteTransactionStore::from_ref(state),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Render a month calendar of the user's transactions.
///
/// Days with income or expenses are highlighted. Selecting a day lists the
/// transactions on that day, otherwise the whole month is listed.
pub async fn get_transactions_page(
    State(state): State<TransactionsViewState>,
    Query(query): Query<CalendarQuery>,
) -> Result<Response, Error> {
    let now = local_now(&state.local_timezone)?;

    render_transactions_page(&state.store, &query, now.date(), now.offset())
        .map(IntoResponse::into_response)
}

fn render_transactions_page(
    store: &impl TransactionStore,
    query: &CalendarQuery,
    today: Date,
    offset: UtcOffset,
) -> Result<Markup, Error> {
    let selected_day = query.day.as_deref().and_then(parse_day);
    let month = query
        .month
        .as_deref()
        .and_then(parse_month)
        .or(selected_day)
        .unwrap_or(today);
    let selected_day = selected_day.filter(|day| day.month() == month.month() && day.year() == month.year());

    let (start, end) = month_bounds(month, offset);
    let transactions = store
        .find_many(&TransactionFilter::created_between(start, end), None)
        .inspect_err(|error| tracing::error!("could not get transactions for {month}: {error}"))?;

    let grid = month_grid(month, &transactions, offset);
    let month_param = format_month(month);
    let day_url =
        |date: Date| format!("{}?month={}&day={date}", endpoints::TRANSACTIONS_VIEW, format_month(date));

    let (list_title, listed): (String, Vec<Transaction>) = match selected_day {
        Some(day) => (
            format!("Transactions on {day}"),
            transactions
                .iter()
                .filter(|transaction| to_local(transaction.created_at, offset).date() == day)
                .cloned()
                .collect(),
        ),
        None => (format!("Transactions in {month_param}"), transactions),
    };

    let content = html! {
        h1 { "Transactions" }

        nav class="month-navigation"
        {
            @if let Some(previous) = previous_month(month) {
                (link(&month_url(previous), "Previous month"))
                " "
            }
            (link(&month_url(today), "This month"))
            @if let Some(next) = next_month(month) {
                " "
                (link(&month_url(next), "Next month"))
            }
        }

        (grid.render(selected_day, day_url))

        section
        {
            h2 { (list_title) }
            (transactions_table(&listed, offset, "No transactions for this period."))
        }
    };

    Ok(base("Transactions", endpoints::TRANSACTIONS_VIEW, &content))
}

fn month_url(month: Date) -> String {
    format!("{}?month={}", endpoints::TRANSACTIONS_VIEW, format_month(month))
}

fn parse_day(text: &str) -> Option<Date> {
    Date::parse(text.trim(), format_description!("[year]-[month]-[day]")).ok()
}

#[cfg(test)]
mod tests {
    use axum::extract::{Query, State};
    use scraper::{Html, Selector};
    use time::{
        UtcOffset,
        macros::{date, datetime},
    };

    use crate::{
        test_utils::{
            assert_status_ok, assert_valid_html, get_test_store, insert_transaction,
            parse_html_document,
        },
        transaction::TransactionType,
    };

    use super::{CalendarQuery, TransactionsViewState, get_transactions_page, render_transactions_page};

    fn query(month: Option<&str>, day: Option<&str>) -> CalendarQuery {
        CalendarQuery {
            month: month.map(ToOwned::to_owned),
            day: day.map(ToOwned::to_owned),
        }
    }

    fn render(query: &CalendarQuery, store: &impl crate::transaction::TransactionStore) -> Html {
        let markup = render_transactions_page(store, query, date!(2025 - 03 - 20), UtcOffset::UTC)
            .expect("could not render page");

        Html::parse_document(&markup.into_string())
    }

    fn select_text(html: &Html, selector: &str) -> Vec<String> {
        let selector = Selector::parse(selector).unwrap();

        html.select(&selector)
            .map(|element| element.text().collect::<String>().trim().to_owned())
            .collect()
    }

    #[tokio::test]
    async fn page_renders_current_month() {
        let state = TransactionsViewState {
            store: get_test_store(),
            local_timezone: "Etc/UTC".to_owned(),
        };

        let response = get_transactions_page(State(state), Query(CalendarQuery::default()))
            .await
            .expect("could not get page");

        assert_status_ok(&response);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        assert_eq!(select_text(&html, "table.calendar").len(), 1);
    }

    #[test]
    fn highlights_days_with_transactions() {
        let store = get_test_store();
        insert_transaction(&store, TransactionType::Income, 50.0, "Salary", datetime!(2025-03-03 09:00 UTC));
        insert_transaction(&store, TransactionType::Expense, 20.0, "Food", datetime!(2025-03-04 09:00 UTC));
        insert_transaction(&store, TransactionType::Expense, 20.0, "Food", datetime!(2025-04-04 09:00 UTC));

        let html = render(&query(None, None), &store);

        assert_valid_html(&html);
        let income_selector = Selector::parse("td.income-day").unwrap();
        let income_days: Vec<_> = html
            .select(&income_selector)
            .filter_map(|cell| cell.value().attr("data-date"))
            .collect();
        assert_eq!(income_days, ["2025-03-03"]);
        let expense_selector = Selector::parse("td.expense-day").unwrap();
        let expense_days: Vec<_> = html
            .select(&expense_selector)
            .filter_map(|cell| cell.value().attr("data-date"))
            .collect();
        assert_eq!(expense_days, ["2025-03-04"]);
        assert_eq!(select_text(&html, "tbody tr[data-transaction-id]").len(), 2);
    }

    #[test]
    fn selected_day_lists_only_that_day() {
        let store = get_test_store();
        insert_transaction(&store, TransactionType::Income, 50.0, "Salary", datetime!(2025-02-03 09:00 UTC));
        insert_transaction(&store, TransactionType::Expense, 20.0, "Food", datetime!(2025-02-04 09:00 UTC));

        let html = render(&query(Some("2025-02"), Some("2025-02-04")), &store);

        assert_valid_html(&html);
        assert_eq!(select_text(&html, "h2"), ["Transactions on 2025-02-04"]);
        let rows = select_text(&html, "tbody tr[data-transaction-id] td:nth-child(2)");
        assert_eq!(rows, ["Food"]);
        let selector = Selector::parse("td.selected").unwrap();
        let selected: Vec<_> = html
            .select(&selector)
            .filter_map(|cell| cell.value().attr("data-date"))
            .collect();
        assert_eq!(selected, ["2025-02-04"]);
    }

    #[test]
    fn day_without_month_selects_its_month() {
        let store = get_test_store();

        let html = render(&query(None, Some("2024-12-25")), &store);

        assert_eq!(select_text(&html, "h2"), ["Transactions on 2024-12-25"]);
        let links = Selector::parse("nav.month-navigation a").unwrap();
        let hrefs: Vec<_> = html
            .select(&links)
            .filter_map(|anchor| anchor.value().attr("href"))
            .collect();
        assert_eq!(
            hrefs,
            [
                "/transactions?month=2024-11",
                "/transactions?month=2025-03",
                "/transactions?month=2025-01"
            ]
        );
    }

    #[test]
    fn invalid_month_falls_back_to_today() {
        let store = get_test_store();

        let html = render(&query(Some("not-a-month"), None), &store);

        assert_eq!(select_text(&html, "h2"), ["Transactions in 2025-03"]);
        assert_eq!(
            select_text(&html, "p.empty"),
            ["No transactions for this period."]
        );
    }

    #[test]
    fn last_month_of_calendar_has_no_next_link() {
        let store = get_test_store();

        let html = render(&query(Some("9999-12"), None), &store);

        assert_valid_html(&html);
        assert_eq!(select_text(&html, "h2"), ["Transactions in 9999-12"]);
        assert_eq!(
            select_text(&html, "nav.month-navigation a"),
            ["Previous month", "This month"]
        );
    }

    #[test]
    fn first_month_of_calendar_has_no_previous_link() {
        let store = get_test_store();

        let html = render(&query(Some("-9999-01"), None), &store);

        assert_valid_html(&html);
        assert_eq!(
            select_text(&html, "nav.month-navigation a"),
            ["This month", "Next month"]
        );
    }
}
