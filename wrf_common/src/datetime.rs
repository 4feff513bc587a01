/*
 * Copyright © 2025, United States Government, as represented by the Administrator of
 * the National Aeronautics and Space Administration. All rights reserved.
 *
 * The “wrf-rs” software is licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License. You may obtain a copy
 * of the License at http://www.apache.org/licenses/LICENSE-2.0.
 *
 * Unless required by applicable law or agreed to in writing, software distributed under
 * the License is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND,
 * either express or implied. See the License for the specific language governing permissions
 * and limitations under the License.
 */

use chrono::{DateTime,TimeDelta,Timelike,Utc};
use std::time::Duration;

#[inline] pub fn days (d: i64) -> TimeDelta { TimeDelta::days(d) }

/// this should be used wherever we might have to use sim clock instead of wall clock
#[inline]
pub fn utc_now()->DateTime<Utc> {
    Utc::now()
}

/// the given DateTime with hours, minutes, seconds and nanos all zeroed
pub fn start_of_day<Tz:chrono::TimeZone> (dt: &DateTime<Tz>)->DateTime<Tz> {
    dt.with_hour(0).unwrap().with_minute(0).unwrap().with_second(0).unwrap().with_nanosecond(0).unwrap()
}

/// compact date as used in NOMADS urls and grib filenames ("20240101")
pub fn yyyymmdd (dt: &DateTime<Utc>) -> String {
    format!("{}", dt.format("%Y%m%d"))
}

/// ISO calendar date as used for per-cycle directories ("2024-01-01")
pub fn iso_date (dt: &DateTime<Utc>) -> String {
    format!("{}", dt.format("%Y-%m-%d"))
}

/// timestamp in the format WPS/WRF namelists use ("2024-01-01_00:00:00")
pub fn wrf_timestamp (dt: &DateTime<Utc>) -> String {
    format!("{}", dt.format("%Y-%m-%d_%H:%M:%S"))
}

/// elapsed wall time in the coarsest unit that is >= 1
pub fn pretty_elapsed (elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    if secs < 60 {
        format!("{secs} seconds")
    } else if secs < 3600 {
        format!("{} minutes", secs / 60)
    } else {
        format!("{} hours", secs / 3600)
    }
}
