use std::cell::RefCell;
use std::rc::Rc;

use chrono::{Datelike, Local, NaiveDate};
use gtk4 as gtk;
use gtk4::glib;
use gtk4::prelude::*;

use super::state::AppState;

pub(super) const IMPORTANT_DATES: [(u32, u32, &str); 3] = [
    (1, 20, "My Birthday 🎂"),
    (8, 23, "Her Birthday 💖"),
    (5, 22, "Anniversary 💍"),
];

const REFRESH_INTERVAL_SECS: u32 = 3600;

/// Days from `today` until the next occurrence of `month`/`day`
/// (0 when it is today). `None` for dates that do not exist in either
/// of the next two years.
pub fn days_until(today: NaiveDate, month: u32, day: u32) -> Option<i64> {
    for year in [today.year(), today.year() + 1] {
        if let Some(candidate) = NaiveDate::from_ymd_opt(year, month, day)
            && candidate >= today
        {
            return Some((candidate - today).num_days());
        }
    }
    None
}

/// Shows the countdown section if hidden, removes it otherwise.
pub(super) fn toggle_dates_section(state: &Rc<RefCell<AppState>>) {
    let existing = {
        let mut st = state.borrow_mut();
        if let Some(section) = st.dates_box.take() {
            st.dates_labels.clear();
            if let Some(handle) = st.dates_refresh.take() {
                handle.remove();
            }
            Some(section)
        } else {
            None
        }
    };

    if let Some(section) = existing {
        if let Some(parent) = section.parent().and_downcast::<gtk::Box>() {
            parent.remove(&section);
        }
        return;
    }

    build_dates_section(state);
    refresh_countdowns(&state.borrow());

    let state_refresh = state.clone();
    let handle = glib::timeout_add_seconds_local(REFRESH_INTERVAL_SECS, move || {
        let st = state_refresh.borrow();
        if st.dates_box.is_none() {
            return glib::ControlFlow::Break;
        }
        refresh_countdowns(&st);
        glib::ControlFlow::Continue
    });
    state.borrow_mut().dates_refresh = Some(handle);
}

fn build_dates_section(state: &Rc<RefCell<AppState>>) {
    let mut st = state.borrow_mut();
    let Some(column) = &st.home_column else {
        return;
    };

    let section = gtk::Box::new(gtk::Orientation::Vertical, 4);
    section.set_halign(gtk::Align::Center);
    section.set_margin_top(8);
    section.set_margin_bottom(8);

    let heading = gtk::Label::new(Some("✨ Important Dates ✨"));
    heading.add_css_class("heading");
    section.append(&heading);

    let mut labels = Vec::new();
    for (month, day, title) in IMPORTANT_DATES {
        let label = gtk::Label::new(None);
        label.add_css_class("dim-label");
        section.append(&label);
        labels.push((label, month, day, title));
    }

    column.append(&section);
    st.dates_box = Some(section);
    st.dates_labels = labels;
}

fn refresh_countdowns(st: &AppState) {
    let today = Local::now().date_naive();
    for (label, month, day, title) in &st.dates_labels {
        match days_until(today, *month, *day) {
            Some(0) => label.set_text(&format!("{title}: today! 🎉")),
            Some(days) => label.set_text(&format!("{title}: {days} days left")),
            None => label.set_text(title),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn counts_down_within_the_same_year() {
        assert_eq!(days_until(date(2026, 5, 1), 5, 22), Some(21));
        assert_eq!(days_until(date(2026, 5, 22), 5, 22), Some(0));
    }

    #[test]
    fn wraps_to_next_year_once_the_date_has_passed() {
        assert_eq!(days_until(date(2026, 5, 23), 5, 22), Some(364));
        assert_eq!(days_until(date(2026, 12, 31), 1, 1), Some(1));
    }

    #[test]
    fn leap_day_resolves_to_the_next_leap_year_or_nothing() {
        // 2027 is not a leap year, 2028 is.
        assert_eq!(days_until(date(2027, 3, 1), 2, 29), Some(365));
        // Two consecutive non-leap years: no occurrence.
        assert_eq!(days_until(date(2029, 3, 1), 2, 29), None);
    }

    #[test]
    fn invalid_dates_are_none() {
        assert_eq!(days_until(date(2026, 1, 1), 13, 1), None);
        assert_eq!(days_until(date(2026, 1, 1), 4, 31), None);
    }
}
