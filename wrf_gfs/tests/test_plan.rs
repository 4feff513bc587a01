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
#![allow(unused)]

use std::collections::HashSet;

use chrono::{TimeZone,Utc};
use wrf_common::geo::GeoRect;
use wrf_gfs::{plan_downloads, CycleHour, ForecastCycle, GfsConfig, WrfGfsError, MAX_FORECAST_HOURS};

// run with "cargo test test_xx -- --nocapture"

fn test_config ()->GfsConfig {
    GfsConfig {
        gfs_dir: "./gfs_dataset".into(),
        bbox: GeoRect::from_wsen_degrees( 95.0, -11.0, 141.0, 6.0),
        ..Default::default()
    }
}

fn test_cycle (cycle_hour: CycleHour, horizon: u32, increment: u32)->ForecastCycle {
    let origin = Utc.with_ymd_and_hms( 2024, 9, 23, 0, 0, 0).unwrap();
    ForecastCycle::new( &origin, cycle_hour, horizon, increment, test_config().bbox)
}

#[test]
fn test_task_count_and_stability() {
    let config = test_config();
    let cycle = test_cycle( CycleHour::H06, 30, 3);

    let tasks = plan_downloads( &config, &cycle).unwrap();
    assert_eq!( tasks.len(), 11); // floor(30/3) + 1

    let dests: HashSet<_> = tasks.iter().map( |t| t.dest.clone()).collect();
    assert_eq!( dests.len(), tasks.len());

    let replanned = plan_downloads( &config, &cycle).unwrap();
    assert_eq!( tasks, replanned);
}

#[test]
fn test_uneven_increment() {
    // last sample is the largest increment multiple not exceeding the horizon
    let tasks = plan_downloads( &test_config(), &test_cycle( CycleHour::H00, 7, 3)).unwrap();
    let hours: Vec<u32> = tasks.iter().map( |t| t.forecast_hour).collect();
    assert_eq!( hours, vec![0, 3, 6]);
}

#[test]
fn test_horizon_cap() {
    let config = test_config();

    let res = plan_downloads( &config, &test_cycle( CycleHour::H00, MAX_FORECAST_HOURS + 1, 3));
    assert!( matches!( res, Err(WrfGfsError::ConfigError(_))));

    let res = plan_downloads( &config, &test_cycle( CycleHour::H00, MAX_FORECAST_HOURS, 3));
    assert!( res.is_ok());
}

#[test]
fn test_zero_increment_rejected() {
    let res = plan_downloads( &test_config(), &test_cycle( CycleHour::H00, 6, 0));
    assert!( matches!( res, Err(WrfGfsError::ConfigError(_))));
}

#[test]
fn test_worked_example() {
    // cycle "00", horizon 6, increment 3, bbox (95, 141, 6, -11)
    let config = test_config();
    let tasks = plan_downloads( &config, &test_cycle( CycleHour::H00, 6, 3)).unwrap();

    let filenames: Vec<String> = tasks.iter()
        .map( |t| t.dest.file_name().unwrap().to_str().unwrap().to_string())
        .collect();
    assert_eq!( filenames, vec![
        "gfs_4_20240923_0000_000.grb2",
        "gfs_4_20240923_0000_003.grb2",
        "gfs_4_20240923_0000_006.grb2",
    ]);

    for task in &tasks {
        assert!( task.dest.starts_with( "./gfs_dataset/2024-09-23"));
        assert!( task.url.starts_with( "https://nomads.ncep.noaa.gov/cgi-bin/filter_gfs_0p25.pl?file=gfs.t00z.pgrb2.0p25.f"));
        assert!( task.url.contains( "&all_lev=on&all_var=on"));
        assert!( task.url.contains( "&leftlon=95&rightlon=141&toplat=6&bottomlat=-11"));
        assert!( task.url.ends_with( "&dir=%2Fgfs.20240923%2F00%2Fatmos"));
    }
    assert!( tasks[1].url.contains( "file=gfs.t00z.pgrb2.0p25.f003&"));
}
