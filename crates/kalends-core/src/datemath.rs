use anyhow::{
  Context,
  anyhow
};
use chrono::{
  Datelike,
  Duration,
  NaiveDate,
  NaiveDateTime
};
use regex::Regex;

pub fn first_day_of_month(
  year: i32,
  month: u32
) -> NaiveDate {
  NaiveDate::from_ymd_opt(
    year, month, 1
  )
  .unwrap_or(NaiveDate::MIN)
}

#[must_use]
pub fn start_of_month(
  date: NaiveDate
) -> NaiveDate {
  first_day_of_month(
    date.year(),
    date.month()
  )
}

#[must_use]
pub fn end_of_month(
  date: NaiveDate
) -> NaiveDate {
  let (next_year, next_month) =
    if date.month() >= 12 {
      (
        date.year().saturating_add(1),
        1_u32
      )
    } else {
      (date.year(), date.month() + 1)
    };
  add_days(
    first_day_of_month(
      next_year, next_month
    ),
    -1
  )
}

pub fn days_in_month(
  year: i32,
  month: u32
) -> u32 {
  end_of_month(first_day_of_month(
    year, month
  ))
  .day()
}

#[must_use]
pub fn add_days(
  date: NaiveDate,
  days: i64
) -> NaiveDate {
  date
    .checked_add_signed(Duration::days(
      days
    ))
    .unwrap_or(date)
}

#[must_use]
pub fn shift_months(
  date: NaiveDate,
  months: i32
) -> NaiveDate {
  let mut year = date.year();
  let mut month =
    date.month() as i32 + months;

  while month < 1 {
    month += 12;
    year = year.saturating_sub(1);
  }
  while month > 12 {
    month -= 12;
    year = year.saturating_add(1);
  }

  let month = month as u32;
  let day = date
    .day()
    .min(days_in_month(year, month));
  NaiveDate::from_ymd_opt(
    year, month, day
  )
  .unwrap_or(date)
}

#[must_use]
pub fn shift_years(
  date: NaiveDate,
  years: i32
) -> NaiveDate {
  let year =
    date.year().saturating_add(years);
  let month = date.month();
  let day = date
    .day()
    .min(days_in_month(year, month));
  NaiveDate::from_ymd_opt(
    year, month, day
  )
  .unwrap_or(date)
}

#[must_use]
pub fn with_year_month(
  date: NaiveDate,
  year: i32,
  month: u32
) -> NaiveDate {
  let day = date
    .day()
    .min(days_in_month(year, month));
  NaiveDate::from_ymd_opt(
    year, month, day
  )
  .unwrap_or(date)
}

#[must_use]
pub fn with_year(
  date: NaiveDate,
  year: i32
) -> NaiveDate {
  with_year_month(
    date,
    year,
    date.month()
  )
}

/// Weekday number with Sunday as 0,
/// matching a `week_offset` of 0.
pub fn weekday_number(
  date: NaiveDate
) -> u32 {
  date
    .weekday()
    .num_days_from_sunday()
}

pub fn leading_day_count(
  date: NaiveDate,
  week_offset: u32
) -> u32 {
  (weekday_number(date) + 7
    - week_offset)
    % 7
}

#[must_use]
pub fn start_of_week(
  date: NaiveDate,
  week_offset: u32
) -> NaiveDate {
  add_days(
    date,
    -i64::from(leading_day_count(
      date,
      week_offset
    ))
  )
}

#[must_use]
pub fn end_of_week(
  date: NaiveDate,
  week_offset: u32
) -> NaiveDate {
  add_days(
    start_of_week(date, week_offset),
    6
  )
}

pub fn same_month(
  a: NaiveDate,
  b: NaiveDate
) -> bool {
  a.year() == b.year()
    && a.month() == b.month()
}

pub fn is_before_month(
  a: NaiveDate,
  b: NaiveDate
) -> bool {
  (a.year(), a.month())
    < (b.year(), b.month())
}

pub fn is_after_month(
  a: NaiveDate,
  b: NaiveDate
) -> bool {
  (a.year(), a.month())
    > (b.year(), b.month())
}

pub fn parse_date(
  raw: &str
) -> anyhow::Result<NaiveDate> {
  let token = raw.trim();

  if let Ok(date) =
    NaiveDate::parse_from_str(
      token, "%Y-%m-%d"
    )
  {
    return Ok(date);
  }

  if let Ok(dt) =
    chrono::DateTime::parse_from_rfc3339(
      token
    )
  {
    return Ok(dt.date_naive());
  }

  for fmt in [
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y%m%dT%H%M%SZ"
  ] {
    if let Ok(ndt) =
      NaiveDateTime::parse_from_str(
        token, fmt
      )
    {
      return Ok(ndt.date());
    }
  }

  Err(anyhow!(
    "unrecognized date: {raw}"
  ))
  .context(
    "supported formats: YYYY-MM-DD, \
     RFC3339, YYYY-MM-DDTHH:MM, \
     YYYY-MM-DD HH:MM, \
     YYYYMMDDTHHMMSSZ"
  )
}

#[tracing::instrument(skip(today), fields(input = input))]
pub fn parse_date_expr(
  input: &str,
  today: NaiveDate
) -> anyhow::Result<NaiveDate> {
  let token = input.trim();
  let lower =
    token.to_ascii_lowercase();

  match lower.as_str() {
    | "today" => return Ok(today),
    | "tomorrow" => {
      return Ok(add_days(today, 1))
    }
    | "yesterday" => {
      return Ok(add_days(today, -1))
    }
    | _ => {}
  }

  if token.len() == 4
    && token
      .chars()
      .all(|c| c.is_ascii_digit())
  {
    let year: i32 =
      token.parse().context(
        "invalid 4-digit year"
      )?;
    return NaiveDate::from_ymd_opt(
      year, 1, 1
    )
    .ok_or_else(|| {
      anyhow!(
        "invalid year value: {year}"
      )
    });
  }

  if let Some(target_month) =
    parse_month_name(&lower)
  {
    return Ok(first_day_of_month(
      today.year(),
      target_month
    ));
  }

  let rel_re = Regex::new(r"^(?P<sign>[+-])(?P<num>\d+)(?P<unit>[dwm])$")
        .map_err(|e| anyhow!("internal regex compile failure: {e}"))?;

  if let Some(caps) =
    rel_re.captures(token)
  {
    let sign = caps
      .name("sign")
      .map(|m| m.as_str())
      .ok_or_else(|| {
        anyhow!("missing relative sign")
      })?;
    let num: i64 = caps
      .name("num")
      .map(|m| m.as_str())
      .ok_or_else(|| {
        anyhow!(
          "missing relative amount"
        )
      })?
      .parse()
      .context(
        "invalid relative number"
      )?;
    let unit = caps
      .name("unit")
      .map(|m| m.as_str())
      .ok_or_else(|| {
        anyhow!("missing relative unit")
      })?;

    let num = if sign == "-" {
      -num
    } else {
      num
    };

    return Ok(match unit {
      | "d" => add_days(today, num),
      | "w" => {
        add_days(today, num * 7)
      }
      | "m" => {
        shift_months(today, num as i32)
      }
      | _ => {
        return Err(anyhow!(
          "unknown relative unit: \
           {unit}"
        ))
      }
    });
  }

  parse_date(token).with_context(
    || {
      format!(
        "unrecognized date \
         expression: {input}"
      )
    }
  )
}

fn parse_month_name(
  token: &str
) -> Option<u32> {
  match token.trim() {
    | "january" | "jan" => Some(1),
    | "february" | "feb" => Some(2),
    | "march" | "mar" => Some(3),
    | "april" | "apr" => Some(4),
    | "may" => Some(5),
    | "june" | "jun" => Some(6),
    | "july" | "jul" => Some(7),
    | "august" | "aug" => Some(8),
    | "september" | "sep" | "sept" => {
      Some(9)
    }
    | "october" | "oct" => Some(10),
    | "november" | "nov" => Some(11),
    | "december" | "dec" => Some(12),
    | _ => None
  }
}
