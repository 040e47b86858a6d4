//! Month calendar grids marked with the days that have income or expenses.

use std::collections::HashSet;

use maud::{Markup, html};
use time::{Date, Duration, OffsetDateTime, Time, UtcOffset, macros::format_description};

use crate::{
    timezone::to_local,
    transaction::{Transaction, TransactionType},
};

/// A single cell in a [MonthGrid].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarDay {
    /// The date of the cell.
    pub date: Date,
    /// Whether `date` is in the displayed month, as opposed to padding.
    pub in_month: bool,
    /// Whether any income happened on `date`.
    pub has_income: bool,
    /// Whether any expense happened on `date`.
    pub has_expense: bool,
}

/// The weeks of a month, each starting on Sunday.
///
/// The first and last weeks are padded with days from the neighbouring months.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthGrid {
    /// The first day of the displayed month.
    pub month: Date,
    /// Rows of seven days.
    pub weeks: Vec<Vec<CalendarDay>>,
}

/// Lay out the month containing `date`, marking days with transactions.
///
/// Transactions are placed on their calendar date in `offset`.
pub fn month_grid(date: Date, transactions: &[Transaction], offset: UtcOffset) -> MonthGrid {
    let month = first_day_of_month(date);

    let marked_days: HashSet<(Date, TransactionType)> = transactions
        .iter()
        .map(|transaction| {
            (
                to_local(transaction.created_at, offset).date(),
                transaction.transaction_type,
            )
        })
        .collect();

    let padding = Duration::days(i64::from(month.weekday().number_days_from_sunday()));
    let mut week_start = month.checked_sub(padding).unwrap_or(month);
    let mut weeks = Vec::new();

    loop {
        // Days past the end of the calendar are left off the last week.
        let week = (0..7)
            .filter_map(|offset_days| week_start.checked_add(Duration::days(offset_days)))
            .map(|date| CalendarDay {
                date,
                in_month: date.month() == month.month(),
                has_income: marked_days.contains(&(date, TransactionType::Income)),
                has_expense: marked_days.contains(&(date, TransactionType::Expense)),
            })
            .collect();

        weeks.push(week);

        match week_start.checked_add(Duration::WEEK) {
            Some(next_week) if next_week <= last_day_of_month(month) => week_start = next_week,
            _ => break,
        }
    }

    MonthGrid { month, weeks }
}

/// The first day of the month containing `date`.
pub fn first_day_of_month(date: Date) -> Date {
    date.replace_day(1).unwrap_or(date)
}

/// The last day of the month containing `date`.
pub fn last_day_of_month(date: Date) -> Date {
    (28..=31)
        .rev()
        .find_map(|day| date.replace_day(day).ok())
        .unwrap_or(date)
}

/// The first day of the month after the one containing `date`.
///
/// Returns `None` past the last representable month.
pub fn next_month(date: Date) -> Option<Date> {
    last_day_of_month(date).next_day()
}

/// The first day of the month before the one containing `date`.
///
/// Returns `None` before the first representable month.
pub fn previous_month(date: Date) -> Option<Date> {
    first_day_of_month(date)
        .previous_day()
        .map(first_day_of_month)
}

/// The first and last moments of the month containing `date` in `offset`.
pub fn month_bounds(date: Date, offset: UtcOffset) -> (OffsetDateTime, OffsetDateTime) {
    (
        first_day_of_month(date).midnight().assume_offset(offset),
        last_day_of_month(date).with_time(Time::MAX).assume_offset(offset),
    )
}

/// Parse a month in the form "YYYY-MM" into its first day.
pub fn parse_month(text: &str) -> Option<Date> {
    Date::parse(
        &format!("{}-01", text.trim()),
        format_description!("[year]-[month]-[day]"),
    )
    .ok()
}

/// Format the month containing `date` as "YYYY-MM".
pub fn format_month(date: Date) -> String {
    format!("{:04}-{:02}", date.year(), u8::from(date.month()))
}

impl CalendarDay {
    fn class_names(&self, selected: Option<Date>) -> String {
        let mut class_names = Vec::new();

        if !self.in_month {
            class_names.push("outside");
        }
        if self.has_income {
            class_names.push("income-day");
        }
        if self.has_expense {
            class_names.push("expense-day");
        }
        if selected == Some(self.date) {
            class_names.push("selected");
        }

        class_names.join(" ")
    }
}

impl MonthGrid {
    /// Render the grid as a table.
    ///
    /// Each day links to `day_url(date)`. The `selected` day is outlined.
    pub fn render(&self, selected: Option<Date>, day_url: impl Fn(Date) -> String) -> Markup {
        html! {
            table class="calendar"
            {
                caption { (self.month.month().to_string()) " " (self.month.year()) }

                thead
                {
                    tr
                    {
                        @for name in ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"] {
                            th scope="col" { (name) }
                        }
                    }
                }

                tbody
                {
                    @for week in &self.weeks {
                        tr
                        {
                            @for day in week {
                                td class=(day.class_names(selected)) data-date=(day.date.to_string())
                                {
                                    a href=(day_url(day.date)) { (day.date.day()) }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}
