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

use std::fs;

use reqwest::Client;
use wrf_gfs::{fetch_all, first_failure, DownloadTask, TaskOutcome};

#[tokio::test]
async fn test_existing_file_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join( "gfs_4_20240923_0000_000.grb2");
    fs::write( &dest, b"not really grib data").unwrap();

    // the url is intentionally unreachable - a skip must not touch the network
    let task = DownloadTask {
        url: "http://127.0.0.1:9/filter_gfs_0p25.pl".to_string(),
        dest: dest.clone(),
        forecast_hour: 0,
    };

    let outcomes = fetch_all( &Client::new(), vec![task], 2).await;
    assert_eq!( outcomes.len(), 1);
    assert!( outcomes[0].is_skipped());
    assert_eq!( fs::read( &dest).unwrap(), b"not really grib data"); // untouched
}

#[tokio::test]
async fn test_failed_task_is_explicit() {
    let dir = tempfile::tempdir().unwrap();

    let existing = dir.path().join( "gfs_4_20240923_0000_000.grb2");
    fs::write( &existing, b"x").unwrap();

    let tasks = vec![
        DownloadTask {
            url: "http://127.0.0.1:9/filter_gfs_0p25.pl".to_string(),
            dest: existing,
            forecast_hour: 0,
        },
        DownloadTask {
            url: "http://127.0.0.1:9/filter_gfs_0p25.pl".to_string(),
            dest: dir.path().join( "gfs_4_20240923_0000_003.grb2"),
            forecast_hour: 3,
        },
    ];

    let outcomes = fetch_all( &Client::new(), tasks, 2).await;
    assert_eq!( outcomes.len(), 2); // one bad task does not abort the pool

    let failed = first_failure( &outcomes).expect( "no failure reported");
    assert_eq!( failed.task().forecast_hour, 3);
    if let TaskOutcome::Failed{reason,..} = failed {
        assert!( !reason.is_empty());
    }

    // the failed download must not leave a partial destination file behind
    assert!( !dir.path().join( "gfs_4_20240923_0000_003.grb2").exists());
    assert_eq!( outcomes.iter().filter( |o| o.is_skipped()).count(), 1);
}
