//! A table of transactions shared by the HTML views.

use maud::{Markup, html};
use time::{UtcOffset, macros::format_description};

use crate::{
    html::{TABLE_AMOUNT_CELL_STYLE, TABLE_CELL_STYLE, TABLE_STYLE, format_currency},
    timezone::to_local,
    transaction::{Transaction, TransactionType},
};

/// Render `transactions` as a table with dates shown in `offset`.
///
/// Renders `empty_message` instead when there are no transactions.
pub fn transactions_table(
    transactions: &[Transaction],
    offset: UtcOffset,
    empty_message: &str,
) -> Markup {
    if transactions.is_empty() {
        return html! {
            p class="empty" { (empty_message) }
        };
    }

    let date_format = format_description!("[year]-[month]-[day] [hour]:[minute]");

    html! {
        table class=(TABLE_STYLE)
        {
            thead
            {
                tr
                {
                    th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                    th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                    th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                    th scope="col" class=(TABLE_AMOUNT_CELL_STYLE) { "Amount" }
                }
            }

            tbody
            {
                @for transaction in transactions {
                    @let created_at = to_local(transaction.created_at, offset);
                    @let (amount_class, amount) = match transaction.transaction_type {
                        TransactionType::Income => ("income-amount", transaction.amount),
                        TransactionType::Expense => ("expense-amount", -transaction.amount),
                    };

                    tr data-transaction-id=(transaction.id)
                    {
                        td class=(TABLE_CELL_STYLE)
                        {
                            (created_at.format(date_format).unwrap_or_else(|_| created_at.date().to_string()))
                        }
                        td class=(TABLE_CELL_STYLE) { (transaction.category) }
                        td class=(TABLE_CELL_STYLE) { (transaction.description.as_deref().unwrap_or("")) }
                        td class={ (TABLE_AMOUNT_CELL_STYLE) " " (amount_class) } { (format_currency(amount)) }
                    }
                }
            }
        }
    }
}
