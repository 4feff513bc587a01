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

use std::str::FromStr;

use chrono::NaiveDate;
use clap::Parser;
use reqwest::Client;

use wrf_common::{config::load_config, datetime};
use wrf_gfs::{
    fetch_cycle, first_failure, op_failed, CycleHour, ForecastCycle, GfsConfig, Result, TaskOutcome
};

#[derive(Parser)]
#[command(about="NOAA GFS download tool")]
struct Args {
    /// filename of GFS config file
    #[arg(short,long,default_value="wrf_gfs/configs/gfs.ron")]
    config: String,

    /// cycle origin date (YYYY-MM-DD), default is yesterday
    #[arg(short,long)]
    date: Option<NaiveDate>,

    /// forecast horizon in hours
    #[arg(long,default_value_t=30)]
    horizon: u32,

    /// cycle hours to fetch (00 06 12 18), default is all four
    cycles: Vec<String>,
}

#[tokio::main]
async fn main ()->Result<()> {
    tracing_subscriber::fmt().init();
    let args = Args::parse();

    let config: GfsConfig = load_config( &args.config)?;

    let origin = match args.date {
        Some(nd) => nd.and_hms_opt(0,0,0).unwrap().and_utc(), // 00:00:00 can't fail
        None => datetime::utc_now() - datetime::days(1),
    };

    let cycle_hours: Vec<CycleHour> = if args.cycles.is_empty() {
        CycleHour::all().to_vec()
    } else {
        args.cycles.iter().map( |s| CycleHour::from_str(s)).collect::<Result<Vec<_>>>()?
    };

    let client = Client::new();
    for cycle_hour in cycle_hours {
        let cycle = ForecastCycle::new( &origin, cycle_hour, args.horizon, config.increment, config.bbox.clone());
        let outcomes = fetch_cycle( &client, &config, &cycle).await?;

        if let Some(TaskOutcome::Failed{task,reason}) = first_failure( &outcomes) {
            return Err( op_failed( format!("download of {:?} failed: {}",
                task.dest.file_name().unwrap_or_default(), reason)))
        }
    }

    Ok(())
}
