//! Table views for the category breakdowns.

use std::collections::BTreeMap;

use maud::{Markup, html};

use crate::html::{TABLE_AMOUNT_CELL_STYLE, TABLE_CELL_STYLE, TABLE_STYLE, format_currency};

/// Renders a table of the amount per category, largest first.
///
/// Renders a short message instead if `by_category` is empty.
pub(super) fn category_table(title: &str, by_category: &BTreeMap<String, f64>) -> Markup {
    let mut rows: Vec<(&String, &f64)> = by_category.iter().collect();
    rows.sort_by(|(_, a), (_, b)| b.total_cmp(a));

    html! {
        section class="category-breakdown"
        {
            h2 { (title) }

            @if rows.is_empty() {
                p class="empty" { "Nothing recorded this month." }
            } @else {
                table class=(TABLE_STYLE)
                {
                    thead
                    {
                        tr
                        {
                            th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                            th scope="col" class=(TABLE_AMOUNT_CELL_STYLE) { "Amount" }
                        }
                    }

                    tbody
                    {
                        @for (category, amount) in rows {
                            tr
                            {
                                td class=(TABLE_CELL_STYLE) { (category) }
                                td class=(TABLE_AMOUNT_CELL_STYLE) { (format_currency(*amount)) }
                            }
                        }
                    }
                }
            }
        }
    }
}
