//! Summary cards for the month's totals.

use maud::{Markup, html};

use crate::{
    html::{CARD_EXPENSE_STYLE, CARD_INCOME_STYLE, CARD_STYLE, format_currency},
    summary::Summary,
};

/// Renders one card each for income, expenses, net income and the number of
/// transactions.
pub(super) fn summary_cards_view(summary: &Summary) -> Markup {
    let net_style = if summary.net_income < 0.0 {
        CARD_EXPENSE_STYLE
    } else {
        CARD_INCOME_STYLE
    };

    html! {
        section class="cards"
        {
            (card(CARD_INCOME_STYLE, "Income", &format_currency(summary.income)))
            (card(CARD_EXPENSE_STYLE, "Expenses", &format_currency(summary.expense)))
            (card(net_style, "Net Income", &format_currency(summary.net_income)))
            (card(CARD_STYLE, "Transactions", &summary.transaction_count.to_string()))
        }
    }
}

fn card(style: &str, title: &str, value: &str) -> Markup {
    html! {
        div class=(style)
        {
            h3 { (title) }
            p class="value" { (value) }
        }
    }
}
