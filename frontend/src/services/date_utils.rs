use js_sys::Date;

/// Current date in YYYY-MM-DD format
pub fn current_date() -> String {
    let now = Date::new_0();
    let year = now.get_full_year();
    let month = now.get_month() + 1; // JavaScript months are 0-indexed
    let day = now.get_date();

    format!("{:04}-{:02}-{:02}", year as u32, month as u32, day as u32)
}

/// Current wall-clock time in 24-hour HH:MM format
pub fn current_time_hhmm() -> String {
    let now = Date::new_0();
    format!("{:02}:{:02}", now.get_hours(), now.get_minutes())
}
