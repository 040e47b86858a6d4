//! Shared page layout, styles and formatting helpers for the HTML views.

use std::sync::OnceLock;

use maud::{DOCTYPE, Markup, PreEscaped, html};
use numfmt::{Formatter, Precision};

use crate::navigation::NavBar;

// Page container
pub const PAGE_CONTAINER_STYLE: &str = "page";

// Card styles
pub const CARD_STYLE: &str = "card";
pub const CARD_INCOME_STYLE: &str = "card income";
pub const CARD_EXPENSE_STYLE: &str = "card expense";

// Table styles
pub const TABLE_STYLE: &str = "table";
pub const TABLE_CELL_STYLE: &str = "cell";
pub const TABLE_AMOUNT_CELL_STYLE: &str = "cell amount";

// Link styles
pub const LINK_STYLE: &str = "link";

const STYLESHEET: &str = r#"
    body { margin: 0; font-family: system-ui, sans-serif; background: #f9fafb; color: #111827; }
    nav { display: flex; gap: 1.5rem; padding: 1rem 1.5rem; background: #fff; border-bottom: 1px solid #e5e7eb; }
    nav a { color: #374151; text-decoration: none; }
    nav a.current { color: #1d4ed8; font-weight: 600; }
    .page { max-width: 64rem; margin: 0 auto; padding: 1.5rem; }
    .cards { display: grid; grid-template-columns: repeat(auto-fit, minmax(12rem, 1fr)); gap: 1rem; }
    .card { background: #fff; border: 1px solid #e5e7eb; border-radius: 0.5rem; padding: 1rem; }
    .card.income .value, .income-amount { color: #15803d; }
    .card.expense .value, .expense-amount { color: #b91c1c; }
    .card .value { font-size: 1.5rem; font-weight: 700; }
    .table { width: 100%; border-collapse: collapse; background: #fff; }
    .cell { padding: 0.5rem 0.75rem; border-bottom: 1px solid #e5e7eb; text-align: left; }
    .amount { text-align: right; font-variant-numeric: tabular-nums; }
    .link { color: #2563eb; }
    .calendar { width: 100%; table-layout: fixed; border-collapse: collapse; background: #fff; }
    .calendar td, .calendar th { border: 1px solid #e5e7eb; height: 3rem; vertical-align: top; padding: 0.25rem; }
    .calendar a { display: block; height: 100%; color: inherit; text-decoration: none; }
    .calendar .outside { color: #9ca3af; }
    .calendar .selected { outline: 2px solid #2563eb; }
    .income-day { background: #dcfce7; }
    .expense-day { background: #fee2e2; }
    .income-day.expense-day { background: linear-gradient(135deg, #dcfce7 50%, #fee2e2 50%); }
"#;

/// Wrap `content` in the full page layout with the navigation bar.
///
/// `active_endpoint` is the path of the current page, used to highlight its
/// navigation link.
pub fn base(title: &str, active_endpoint: &str, content: &Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en"
        {
            head
            {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) " - Fintrack" }
                style { (PreEscaped(STYLESHEET)) }
            }

            body
            {
                (NavBar::new(active_endpoint).into_html())

                main class=(PAGE_CONTAINER_STYLE)
                {
                    (content)
                }
            }
        }
    }
}

/// A link with blue text.
pub fn link(url: &str, text: &str) -> Markup {
    html! {
        a href=(url) class=(LINK_STYLE) { (text) }
    }
}

/// Format `number` as dollars with two decimal places.
pub fn format_currency(number: f64) -> String {
    static POSITIVE_FMT: OnceLock<Option<Formatter>> = OnceLock::new();
    static NEGATIVE_FMT: OnceLock<Option<Formatter>> = OnceLock::new();

    let formatter = |prefix: &str| {
        Formatter::currency(prefix)
            .map(|formatter| formatter.precision(Precision::Decimals(2)))
            .ok()
    };

    let formatted_string = if number < 0.0 {
        NEGATIVE_FMT
            .get_or_init(|| formatter("-$"))
            .as_ref()
            .map(|fmt| fmt.fmt_string(number.abs()))
    } else if number > 0.0 {
        POSITIVE_FMT
            .get_or_init(|| formatter("$"))
            .as_ref()
            .map(|fmt| fmt.fmt_string(number))
    } else {
        // Zero is hardcoded as "0", so we must specify the formatted string for zero
        Some("$0.00".to_owned())
    };

    let Some(mut formatted_string) = formatted_string else {
        return format!("{}${:.2}", if number < 0.0 { "-" } else { "" }, number.abs());
    };

    // numfmt drops trailing zeros, e.g. "12.30" is rendered as "12.3".
    match formatted_string.find('.') {
        None => formatted_string.push_str(".00"),
        Some(index) if formatted_string.len() - index == 2 => formatted_string.push('0'),
        Some(_) => {}
    }

    formatted_string
}

#[cfg(test)]
mod tests {
    use super::format_currency;

    #[test]
    fn formats_currency() {
        assert_eq!(format_currency(0.0), "$0.00");
        assert_eq!(format_currency(12.3), "$12.30");
        assert_eq!(format_currency(45.67), "$45.67");
        assert_eq!(format_currency(-5.5), "-$5.50");
    }
}
