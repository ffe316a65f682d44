//! Period filtering: today, this week (from Sunday), this month, all time. Boundaries are
//! local midnights in the time zone of the `now` passed in.

use crate::models::GameRecord;
use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    #[default]
    Daily,
    Weekly,
    Monthly,
    AllTime,
}

impl FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "daily" => Ok(Period::Daily),
            "weekly" => Ok(Period::Weekly),
            "monthly" => Ok(Period::Monthly),
            "alltime" => Ok(Period::AllTime),
            other => Err(format!("Unknown period: {}", other)),
        }
    }
}

/// Midnight at the start of `date` in `tz`. If that midnight does not exist (DST gap),
/// the naive time is read as UTC.
fn midnight<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> DateTime<Tz> {
    let naive = date.and_time(chrono::NaiveTime::MIN);
    tz.from_local_datetime(&naive)
        .earliest()
        .unwrap_or_else(|| tz.from_utc_datetime(&naive))
}

/// Start of `now`'s local day.
pub fn local_day_start<Tz: TimeZone>(now: &DateTime<Tz>) -> DateTime<Tz> {
    midnight(&now.timezone(), now.date_naive())
}

/// First instant included in `period`, or `None` for all time.
pub fn period_start<Tz: TimeZone>(period: Period, now: &DateTime<Tz>) -> Option<DateTime<Tz>> {
    let today = now.date_naive();
    let date = match period {
        Period::Daily => today,
        Period::Weekly => today - Duration::days(i64::from(today.weekday().num_days_from_sunday())),
        Period::Monthly => today.with_day(1)?,
        Period::AllTime => return None,
    };
    Some(midnight(&now.timezone(), date))
}

/// Games dated at or after the start of `period`.
pub fn filter_games_by_period<Tz: TimeZone>(
    games: &[GameRecord],
    period: Period,
    now: &DateTime<Tz>,
) -> Vec<GameRecord> {
    match period_start(period, now) {
        Some(start) => {
            let start = start.with_timezone(&Utc);
            games.iter().filter(|g| g.date >= start).cloned().collect()
        }
        None => games.to_vec(),
    }
}
