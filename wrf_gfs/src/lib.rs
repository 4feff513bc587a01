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

//! acquisition of GFS 0.25 degree gridded forecast data from the NOAA NOMADS grib filter.
//! A [`ForecastCycle`] is turned into a deterministic batch of [`DownloadTask`]s which a bounded
//! worker pool then retrieves idempotently into a per-cycle dataset directory

use std::cmp::max;
use std::fmt::{self,Display};
use std::io::Write as IoWrite;
use std::path::{Path,PathBuf};
use std::str::FromStr;

use chrono::{DateTime,Utc};
use futures::stream::{self,StreamExt};
use reqwest::Client;
use serde::{Deserialize,Serialize};
use tempfile::NamedTempFile;
use tracing::{info,warn};

use wrf_common::{
    datetime::{self, iso_date, start_of_day, yyyymmdd},
    fs::ensure_writable_dir,
    geo::GeoRect,
};

mod errors;
pub use errors::*;

/// upstream NOMADS limit for GFS forecast hours
pub const MAX_FORECAST_HOURS: u32 = 384;

/// one of the four daily GFS issuance times
#[derive(Debug,Clone,Copy,PartialEq,Eq,Hash,Serialize,Deserialize)]
pub enum CycleHour { H00, H06, H12, H18 }

impl CycleHour {
    pub fn all ()->[CycleHour;4] {
        [CycleHour::H00, CycleHour::H06, CycleHour::H12, CycleHour::H18]
    }

    /// the 2-digit label used in NOMADS urls and grib filenames
    pub fn as_str (&self)->&'static str {
        match self {
            CycleHour::H00 => "00",
            CycleHour::H06 => "06",
            CycleHour::H12 => "12",
            CycleHour::H18 => "18",
        }
    }

}

impl FromStr for CycleHour {
    type Err = WrfGfsError;

    fn from_str (s: &str)->Result<Self> {
        match s {
            "00" | "0" => Ok(CycleHour::H00),
            "06" | "6" => Ok(CycleHour::H06),
            "12" => Ok(CycleHour::H12),
            "18" => Ok(CycleHour::H18),
            other => Err( config_error( format!("not a GFS cycle hour: {other}")))
        }
    }
}

impl Display for CycleHour {
    fn fmt (&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.as_str()) }
}

/// general GFS server / download parameters configuration
#[derive(Clone,Serialize,Deserialize,Debug)]
pub struct GfsConfig {
    /// server URL of the NOMADS grib filter endpoint
    pub url: String,

    /// root dir for downloaded datasets (one subdir per cycle date)
    pub gfs_dir: PathBuf,

    /// number of parallel download workers
    pub n_workers: usize,

    /// sampling increment between forecast hours
    pub increment: u32,

    /// geographic subregion to retrieve
    pub bbox: GeoRect,
}

impl Default for GfsConfig {
    fn default() -> Self {
        Self {
            url: "https://nomads.ncep.noaa.gov/cgi-bin/filter_gfs_0p25.pl".to_string(),
            gfs_dir: PathBuf::from("./gfs_dataset"),
            n_workers: 4,
            increment: 3,
            bbox: GeoRect::from_wsen_degrees( 110.0, -5.0, 115.0, -2.0),
        }
    }
}

/// one scheduled forecast data issuance, plus the horizon/increment/area that scope
/// what we retrieve for it. Constructed once per run and immutable thereafter
#[derive(Debug,Clone)]
pub struct ForecastCycle {
    /// calendar date of the cycle (midnight aligned)
    pub origin: DateTime<Utc>,
    pub cycle_hour: CycleHour,
    pub horizon_hours: u32,
    pub increment_hours: u32,
    pub bbox: GeoRect,
}

impl ForecastCycle {
    pub fn new (origin: &DateTime<Utc>, cycle_hour: CycleHour, horizon_hours: u32, increment_hours: u32, bbox: GeoRect)->Self {
        ForecastCycle { origin: start_of_day(origin), cycle_hour, horizon_hours, increment_hours, bbox }
    }

    /// the cycle feeding a model run of `run_days` days: origin is the day before `now`,
    /// the horizon covers the run plus a 6h spin-up margin
    pub fn for_run_days (now: &DateTime<Utc>, cycle_hour: CycleHour, run_days: u32, increment_hours: u32, bbox: GeoRect)->Self {
        let origin = start_of_day(now) - datetime::days(1);
        let horizon_hours = run_days * 24 + 6;
        ForecastCycle { origin, cycle_hour, horizon_hours, increment_hours, bbox }
    }

    /// per-cycle destination dir under the dataset root
    pub fn dataset_dir (&self, gfs_dir: impl AsRef<Path>)->PathBuf {
        gfs_dir.as_ref().join( iso_date( &self.origin))
    }

    /// the sample hours `0, inc, 2*inc, .. <= horizon` (no rounding correction - the last
    /// sample is the largest increment multiple not exceeding the horizon)
    pub fn forecast_hours (&self)->impl Iterator<Item=u32> + use<> {
        (0 ..= self.horizon_hours).step_by( max( self.increment_hours, 1) as usize)
    }
}

/// a (source url, destination path) pair for one forecast hour sample. The destination is a
/// pure function of cycle + hour, which is what makes re-runs skip completed files
#[derive(Debug,Clone,PartialEq,Eq)]
pub struct DownloadTask {
    pub url: String,
    pub dest: PathBuf,
    pub forecast_hour: u32,
}

/// turn a forecast cycle into the ordered download batch for it. Pure - no I/O, and stable
/// across repeated calls with the same inputs
pub fn plan_downloads (config: &GfsConfig, cycle: &ForecastCycle)->Result<Vec<DownloadTask>> {
    if cycle.horizon_hours > MAX_FORECAST_HOURS {
        return Err( config_error( format!("forecast horizon {} exceeds NOMADS limit of {} hours",
                                          cycle.horizon_hours, MAX_FORECAST_HOURS)))
    }
    if cycle.increment_hours == 0 {
        return Err( config_error( "forecast increment must be > 0"))
    }

    let date = yyyymmdd( &cycle.origin);
    let cc = cycle.cycle_hour.as_str();
    let bbox = &cycle.bbox;
    let dest_dir = cycle.dataset_dir( &config.gfs_dir);

    let tasks = cycle.forecast_hours().map( |hour| {
        let url = format!(
            "{}?file=gfs.t{}z.pgrb2.0p25.f{:03}&all_lev=on&all_var=on&subregion=&leftlon={}&rightlon={}&toplat={}&bottomlat={}&dir=%2Fgfs.{}%2F{}%2Fatmos",
            config.url, cc, hour,
            bbox.west().degrees(), bbox.east().degrees(), bbox.north().degrees(), bbox.south().degrees(),
            date, cc
        );
        let dest = dest_dir.join( format!("gfs_4_{}_{}00_{:03}.grb2", date, cc, hour));

        DownloadTask { url, dest, forecast_hour: hour }
    }).collect();

    Ok(tasks)
}

/* #region fetcher ****************************************************************************************/

/// per-task fetch result. Worker failures are explicit values so that one bad file neither
/// aborts the pool nor gets lost in it - the caller decides what a partial batch means
#[derive(Debug)]
pub enum TaskOutcome {
    Downloaded { task: DownloadTask, bytes: u64 },
    Skipped { task: DownloadTask },
    Failed { task: DownloadTask, reason: String },
}

impl TaskOutcome {
    pub fn task (&self)->&DownloadTask {
        match self {
            TaskOutcome::Downloaded{task,..} => task,
            TaskOutcome::Skipped{task} => task,
            TaskOutcome::Failed{task,..} => task,
        }
    }

    pub fn is_failed (&self)->bool { matches!( self, TaskOutcome::Failed{..}) }
    pub fn is_skipped (&self)->bool { matches!( self, TaskOutcome::Skipped{..}) }
    pub fn is_downloaded (&self)->bool { matches!( self, TaskOutcome::Downloaded{..}) }
}

/// drain the task list with a bounded pool of `n_workers` parallel downloads. Tasks are
/// independent and completion order is unconstrained. A task whose destination already
/// exists is a no-op (logged distinctly from a real download)
pub async fn fetch_all (client: &Client, tasks: Vec<DownloadTask>, n_workers: usize)->Vec<TaskOutcome> {
    stream::iter( tasks.into_iter().map( |task| {
        let client = client.clone();
        async move {
            if task.dest.is_file() {
                info!("file {:?} already downloaded, skipped", task.dest.file_name().unwrap_or_default());
                TaskOutcome::Skipped { task }
            } else {
                match download_file( &client, &task).await {
                    Ok(bytes) => TaskOutcome::Downloaded { task, bytes },
                    Err(e) => TaskOutcome::Failed { task, reason: e.to_string() },
                }
            }
        }
    }))
    .buffer_unordered( max( n_workers, 1))
    .collect().await
}

/// download a single grib file, making it visible under its destination name only once it is
/// complete - a killed run must not leave a truncated file that a later run would skip
async fn download_file (client: &Client, task: &DownloadTask)->Result<u64> {
    let dest_dir = task.dest.parent().ok_or( op_failed( format!("no parent dir for {:?}", task.dest)))?;
    info!("downloading {:?}..", task.dest.file_name().unwrap_or_default());

    let mut file = NamedTempFile::new_in( dest_dir)?;
    let mut response = client.get( &task.url).send().await?;
    if response.status() != reqwest::StatusCode::OK {
        return Err( op_failed( format!("request failed with code {}", response.status().as_str())))
    }
    while let Some(chunk) = response.chunk().await? {
        file.write_all( &chunk)?;
    }

    let bytes = file.as_file().metadata()?.len();
    if bytes == 0 {
        return Err( op_failed( "empty file"))
    }

    file.persist( &task.dest).map_err( |e| op_failed( format!("could not persist download: {e}")))?;
    Ok(bytes)
}

/// plan and fetch one whole cycle into its dataset dir, creating the dir first
pub async fn fetch_cycle (client: &Client, config: &GfsConfig, cycle: &ForecastCycle)->Result<Vec<TaskOutcome>> {
    let tasks = plan_downloads( config, cycle)?;
    let dest_dir = cycle.dataset_dir( &config.gfs_dir);
    ensure_writable_dir( &dest_dir)?;
    info!("dataset for cycle {} {}z will be saved in {:?}", iso_date( &cycle.origin), cycle.cycle_hour, dest_dir);

    let outcomes = fetch_all( client, tasks, config.n_workers).await;

    let n_downloaded = outcomes.iter().filter( |o| o.is_downloaded()).count();
    let n_skipped = outcomes.iter().filter( |o| o.is_skipped()).count();
    let n_failed = outcomes.iter().filter( |o| o.is_failed()).count();
    if n_failed > 0 {
        warn!("cycle {}z batch incomplete: {} of {} files failed", cycle.cycle_hour, n_failed, outcomes.len());
    } else {
        info!("cycle {}z complete ({} downloaded, {} skipped)", cycle.cycle_hour, n_downloaded, n_skipped);
    }

    Ok(outcomes)
}

pub fn first_failure (outcomes: &[TaskOutcome])->Option<&TaskOutcome> {
    outcomes.iter().find( |o| o.is_failed())
}

/* #endregion fetcher */
