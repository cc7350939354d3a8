// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::repo::{IntervalUnit, Schedule};
use chrono::{DateTime, Datelike, Duration, Months, NaiveTime, Timelike, Utc};

/// 预定义节奏的固定锚点时刻（02:00）
fn anchor_time() -> NaiveTime {
    NaiveTime::from_hms_opt(2, 0, 0).expect("02:00 is a valid time of day")
}

/// 判断仓库当前是否到期
///
/// 纯函数，多次调用结果一致。采用追赶语义：即使时钟滴答被
/// 延迟或完全错过，只要当前时刻已越过下一次执行时刻就返回到期，
/// 而不是只在精确的边界上触发一次。
///
/// # 参数
///
/// * `schedule` - 仓库的调度策略
/// * `last_run` - 最近一次执行的开始时间，从未执行过则为None
/// * `now` - 当前时刻
///
/// # 返回值
///
/// 到期返回true；手动调度恒为false
pub fn is_due(schedule: &Schedule, last_run: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    match next_run(schedule, last_run, now) {
        Some(at) => now >= at,
        None => false,
    }
}

/// 计算下一次允许执行的时刻
///
/// # 参数
///
/// * `schedule` - 仓库的调度策略
/// * `last_run` - 最近一次执行的开始时间
/// * `now` - 当前时刻，仅用于从未执行过的仓库
///
/// # 返回值
///
/// * `Some(timestamp)` - 下一次允许执行的时刻，严格晚于last_run
/// * `None` - 手动调度，永不自动执行
pub fn next_run(
    schedule: &Schedule,
    last_run: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    if matches!(schedule, Schedule::Manual) {
        return None;
    }

    // A repository that has never run is due immediately upon activation
    let last = match last_run {
        Some(last) => last,
        None => return Some(now),
    };

    let next = match schedule {
        Schedule::Manual => unreachable!("handled above"),
        Schedule::Hourly => {
            // Top of the next hour after last_run
            let hour_start = last
                .date_naive()
                .and_hms_opt(last.hour(), 0, 0)
                .unwrap_or_else(|| last.naive_utc())
                .and_utc();
            hour_start + Duration::hours(1)
        }
        Schedule::Daily => {
            let mut candidate = last.date_naive().and_time(anchor_time()).and_utc();
            if candidate <= last {
                candidate += Duration::days(1);
            }
            candidate
        }
        Schedule::Weekly => {
            // Sunday 02:00 of last_run's week, pushed forward until it
            // lies strictly after last_run
            let back = last.weekday().num_days_from_sunday() as i64;
            let sunday = last.date_naive() - Duration::days(back);
            let mut candidate = sunday.and_time(anchor_time()).and_utc();
            if candidate <= last {
                candidate += Duration::days(7);
            }
            candidate
        }
        Schedule::Monthly => {
            let first = last.date_naive().with_day(1).unwrap_or(last.date_naive());
            let mut candidate = first.and_time(anchor_time()).and_utc();
            if candidate <= last {
                let next_month = first
                    .checked_add_months(Months::new(1))
                    .unwrap_or(first);
                candidate = next_month.and_time(anchor_time()).and_utc();
            }
            candidate
        }
        Schedule::Custom { unit, count, at } => {
            let date = last.date_naive();
            let target_date = match unit {
                IntervalUnit::Day => date + Duration::days(*count as i64),
                IntervalUnit::Week => date + Duration::days(7 * *count as i64),
                // Calendar months, not fixed 30-day blocks
                IntervalUnit::Month => date
                    .checked_add_months(Months::new(*count))
                    .unwrap_or(date),
            };
            target_date.and_time(*at).and_utc()
        }
    };

    Some(next)
}

#[cfg(test)]
#[path = "evaluator_test.rs"]
mod tests;
