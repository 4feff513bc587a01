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

use std::time::Instant;

use clap::Parser;
use tracing::info;

use wrf_common::{config::load_config, datetime::{pretty_elapsed,utc_now}};
use wrf_model::{ForecastPipeline, Result, WrfConfig};

#[derive(Parser)]
#[command(about="WRF-ARW / GFS forecast cycle automation")]
struct Args {
    /// filename of the forecast run config file
    #[arg(short,long,default_value="wrf_model/configs/wrf_forecast.ron")]
    config: String,
}

#[tokio::main]
async fn main ()->Result<()> {
    tracing_subscriber::fmt().init();
    let args = Args::parse();

    let config: WrfConfig = load_config( &args.config)?;
    let start = Instant::now();

    let mut pipeline = ForecastPipeline::new( config, &utc_now());
    let outcome = pipeline.run().await?;

    info!("automation - {} files downloaded, {} already present, output staged to {:?}",
          outcome.n_downloaded, outcome.n_skipped, outcome.staged_output);
    info!("automation - process completed in {}", pretty_elapsed( start.elapsed()));
    Ok(())
}
