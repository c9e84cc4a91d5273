use time::{Date, Duration, Weekday};

pub const DAYS_IN_WEEK: u8 = 7;

/// Day index used by plans and user configuration: 0 = Sunday … 6 = Saturday
pub fn day_index(weekday: Weekday) -> u8 {
    weekday.number_days_from_sunday()
}

pub fn validate_day(day: u8) -> crate::Result<u8> {
    if day >= DAYS_IN_WEEK {
        return Err(crate::Error::InvalidDay(day));
    }

    Ok(day)
}

/// Returns the seven day indices in week order, starting at `week_start_day`
pub fn week_order(week_start_day: u8) -> crate::Result<[u8; 7]> {
    let start = validate_day(week_start_day)?;
    let mut days = [0; 7];

    for (offset, day) in days.iter_mut().enumerate() {
        *day = (start + offset as u8) % DAYS_IN_WEEK;
    }

    Ok(days)
}

/// Aligns `date` to the first day of its week for the configured start day
pub fn week_start(date: Date, week_start_day: u8) -> crate::Result<Date> {
    let start = validate_day(week_start_day)?;
    let current = day_index(date.weekday());
    let days_since_start = (current + DAYS_IN_WEEK - start) % DAYS_IN_WEEK;

    Ok(date - Duration::days(days_since_start as i64))
}

/// Returns the calendar date of `day` within the week beginning on `week_date`
pub fn date_of_day(week_date: Date, day: u8) -> crate::Result<Date> {
    let day = validate_day(day)?;
    let first = day_index(week_date.weekday());
    let offset = (day + DAYS_IN_WEEK - first) % DAYS_IN_WEEK;

    Ok(week_date + Duration::days(offset as i64))
}
