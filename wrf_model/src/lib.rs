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

//! the staged forecast-cycle pipeline: GFS acquisition, namelist configuration and the
//! WPS/WRF external program chain, each stage gated on the success of the previous one.
//! The pipeline is strictly sequential - every stage blocks until its external programs or
//! patch operations complete, and the first failure terminates the run

use std::collections::BTreeMap;
use std::fmt::{self,Display};
use std::fs;
use std::path::{Path,PathBuf};

use chrono::{DateTime,Datelike,Timelike,Utc};
use reqwest::Client;
use serde::{Deserialize,Serialize};
use tokio::process::Command;
use tracing::{debug,error,info,warn};

use wrf_common::{
    datetime::{self, iso_date, start_of_day, wrf_timestamp},
    fs::{ensure_writable_dir, last_line, matching_files, remove_matching_files, symlink_file, symlink_matching_files},
};
use wrf_gfs::{fetch_cycle, first_failure, CycleHour, ForecastCycle, GfsConfig, TaskOutcome};
use wrf_namelist::{patch_file, NamelistPatch};

mod errors;
pub use errors::*;

/// the marker real.exe appends to its diagnostic log when initialization produced a valid model
/// state. Exit code zero alone is not sufficient to start the (expensive) integration
pub const INIT_SUCCESS_MARKER: &str = "SUCCESS COMPLETE REAL_EM INIT";

/// the real.exe diagnostic log we inspect for the marker
pub const INIT_DIAGNOSTIC_LOG: &str = "rsl.error.0000";

//--- the parameter identity sets that select namelist value formatting

const WPS_QUOTED_PARAMS: &[&str] = &[
    "wrf_core", "map_proj", "geog_data_path", "out_format", "prefix", "fg_name"
];
const WPS_DOMAIN_REPEATED_PARAMS: &[&str] = &[
    "start_date", "end_date", "geog_data_res"
];
const WPS_DOMAIN_LIST_PARAMS: &[&str] = &[
    "parent_id", "parent_grid_ratio", "i_parent_start", "j_parent_start", "e_we", "e_sn"
];

const WRF_DOMAIN_REPEATED_PARAMS: &[&str] = &[
    "start_year", "start_month", "start_day", "start_hour",
    "end_year", "end_month", "end_day", "end_hour"
];
const WRF_DOMAIN_LIST_PARAMS: &[&str] = &[
    "e_we", "e_sn", "e_vert", "dx", "dy", "grid_id", "parent_id",
    "i_parent_start", "j_parent_start", "parent_grid_ratio", "parent_time_step_ratio"
];

/* #region config ****************************************************************************************/

/// forecast run configuration. All values are passed in explicitly - there is no ambient
/// process-wide state
#[derive(Clone,Serialize,Deserialize,Debug)]
pub struct WrfConfig {
    /// dir containing the compiled WPS executables and namelist.wps
    pub wps_dir: PathBuf,

    /// dir containing the compiled WRF em_real executables and namelist.input
    pub wrf_dir: PathBuf,

    /// where to stage the wrfout files of finished runs
    pub output_dir: PathBuf,

    /// number of nested model domains
    pub max_dom: usize,

    /// length of the simulation in days
    pub run_days: u32,

    /// processors for real.exe/wrf.exe (run under the mpi launcher if > 1)
    pub num_proc: u32,

    /// the mpi launcher command
    pub mpi_cmd: String,

    /// which domain's wrfout file to keep
    pub saved_domain: u32,

    /// the issuance times to acquire before the run
    pub cycle_hours: Vec<CycleHour>,

    /// extra namelist.wps parameter overrides
    pub wps_opts: BTreeMap<String,String>,

    /// extra namelist.input parameter overrides
    pub wrf_opts: BTreeMap<String,String>,

    /// acquisition parameters
    pub gfs: GfsConfig,
}

impl Default for WrfConfig {
    fn default() -> Self {
        Self {
            wps_dir: PathBuf::from("./wps"),
            wrf_dir: PathBuf::from("./wrf/test/em_real"),
            output_dir: PathBuf::from("./wrf_output"),
            max_dom: 3,
            run_days: 1,
            num_proc: 4,
            mpi_cmd: "mpirun".to_string(),
            saved_domain: 3,
            cycle_hours: CycleHour::all().to_vec(),
            wps_opts: BTreeMap::new(),
            wrf_opts: BTreeMap::new(),
            gfs: GfsConfig::default(),
        }
    }
}

impl WrfConfig {
    pub fn namelist_wps (&self)->PathBuf { self.wps_dir.join("namelist.wps") }
    pub fn namelist_input (&self)->PathBuf { self.wrf_dir.join("namelist.input") }
}

/* #endregion config */

/* #region namelist parameter sets ************************************************************************/

/// the namelist.wps parameter set for a run window, merged with caller overrides
/// (overrides win, and get their formatting policy from the parameter identity)
pub fn wps_patches (max_dom: usize, start_date: &DateTime<Utc>, end_date: &DateTime<Utc>,
                    opts: &BTreeMap<String,String>) -> Vec<NamelistPatch>
{
    let mut patches: BTreeMap<String,NamelistPatch> = BTreeMap::new();

    add_patch( &mut patches, NamelistPatch::bare( "max_dom", max_dom));
    add_patch( &mut patches, NamelistPatch::domain_repeated( "start_date", wrf_timestamp(start_date)));
    add_patch( &mut patches, NamelistPatch::domain_repeated( "end_date", wrf_timestamp(end_date)));

    for (name,value) in opts {
        add_patch( &mut patches, wps_opt_patch( name, value));
    }
    patches.into_values().collect()
}

/// the namelist.input parameter set for a run window, merged with caller overrides.
/// Date components are written once per domain
pub fn wrf_patches (max_dom: usize, run_days: u32, start_date: &DateTime<Utc>, end_date: &DateTime<Utc>,
                    opts: &BTreeMap<String,String>) -> Vec<NamelistPatch>
{
    let mut patches: BTreeMap<String,NamelistPatch> = BTreeMap::new();

    add_patch( &mut patches, NamelistPatch::bare( "run_days", run_days));
    add_patch( &mut patches, NamelistPatch::bare( "max_dom", max_dom));

    add_patch( &mut patches, NamelistPatch::domain_repeated_bare( "start_year", start_date.year()));
    add_patch( &mut patches, NamelistPatch::domain_repeated_bare( "start_month", format!("{:02}", start_date.month())));
    add_patch( &mut patches, NamelistPatch::domain_repeated_bare( "start_day", format!("{:02}", start_date.day())));
    add_patch( &mut patches, NamelistPatch::domain_repeated_bare( "start_hour", format!("{:02}", start_date.hour())));
    add_patch( &mut patches, NamelistPatch::domain_repeated_bare( "end_year", end_date.year()));
    add_patch( &mut patches, NamelistPatch::domain_repeated_bare( "end_month", format!("{:02}", end_date.month())));
    add_patch( &mut patches, NamelistPatch::domain_repeated_bare( "end_day", format!("{:02}", end_date.day())));
    add_patch( &mut patches, NamelistPatch::domain_repeated_bare( "end_hour", format!("{:02}", end_date.hour())));

    for (name,value) in opts {
        add_patch( &mut patches, wrf_opt_patch( name, value));
    }
    patches.into_values().collect()
}

fn add_patch (patches: &mut BTreeMap<String,NamelistPatch>, patch: NamelistPatch) {
    patches.insert( patch.name.clone(), patch);
}

fn wps_opt_patch (name: &str, value: &str)->NamelistPatch {
    if WPS_QUOTED_PARAMS.contains(&name) { NamelistPatch::quoted( name, value) }
    else if WPS_DOMAIN_REPEATED_PARAMS.contains(&name) { NamelistPatch::domain_repeated( name, value) }
    else if WPS_DOMAIN_LIST_PARAMS.contains(&name) { NamelistPatch::domain_list( name, value) }
    else { NamelistPatch::bare( name, value) }
}

fn wrf_opt_patch (name: &str, value: &str)->NamelistPatch {
    if WRF_DOMAIN_REPEATED_PARAMS.contains(&name) { NamelistPatch::domain_repeated_bare( name, value) }
    else if WRF_DOMAIN_LIST_PARAMS.contains(&name) { NamelistPatch::domain_list( name, value) }
    else { NamelistPatch::bare( name, value) }
}

/* #endregion namelist parameter sets */

/* #region pipeline ****************************************************************************************/

/// pipeline progress. Stages are strictly sequential, each gated on the previous one;
/// `Failed` is terminal and reachable from any of them
#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub enum Stage {
    Idle,
    Acquiring,
    PreprocessConfigured,
    Preprocessed,
    IntegrationConfigured,
    Integrated,
    OutputStaged,
    Done,
    Failed,
}

impl Display for Stage {
    fn fmt (&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::Idle => "idle",
            Stage::Acquiring => "acquisition",
            Stage::PreprocessConfigured => "preprocess configuration",
            Stage::Preprocessed => "preprocessing",
            Stage::IntegrationConfigured => "integration configuration",
            Stage::Integrated => "integration",
            Stage::OutputStaged => "output staging",
            Stage::Done => "done",
            Stage::Failed => "failed",
        };
        write!(f, "{s}")
    }
}

/// transient result of one completed pipeline pass - not persisted
#[derive(Debug)]
pub struct RunOutcome {
    pub n_downloaded: usize,
    pub n_skipped: usize,
    pub init_marker_found: bool,
    pub staged_output: PathBuf,
}

/// one forecast-cycle orchestration run: acquire datasets, configure and execute the WPS
/// preprocessing chain, configure and execute the WRF integration, stage the output
pub struct ForecastPipeline {
    config: WrfConfig,
    client: Client,
    stage: Stage,

    cycles: Vec<ForecastCycle>,
    start_date: DateTime<Utc>,
    end_date: DateTime<Utc>,
}

impl ForecastPipeline {
    /// set up the pipeline for the cycle anchored at `now`: the simulation starts at the
    /// beginning of yesterday and runs for the configured number of days
    pub fn new (config: WrfConfig, now: &DateTime<Utc>)->Self {
        let cycles: Vec<ForecastCycle> = config.cycle_hours.iter().map( |cycle_hour| {
            ForecastCycle::for_run_days( now, *cycle_hour, config.run_days, config.gfs.increment, config.gfs.bbox.clone())
        }).collect();

        let start_date = start_of_day(now) - datetime::days(1);
        let end_date = start_date + datetime::days( config.run_days as i64);

        ForecastPipeline { config, client: Client::new(), stage: Stage::Idle, cycles, start_date, end_date }
    }

    pub fn stage (&self)->Stage { self.stage }
    pub fn start_date (&self)->&DateTime<Utc> { &self.start_date }
    pub fn end_date (&self)->&DateTime<Utc> { &self.end_date }

    pub async fn run (&mut self)->Result<RunOutcome> {
        info!("simulating from {} to {}", wrf_timestamp( &self.start_date), wrf_timestamp( &self.end_date));

        match self.run_stages().await {
            Ok(outcome) => {
                self.stage = Stage::Done;
                Ok(outcome)
            }
            Err(e) => {
                error!("forecast run failed during {}: {e}", self.stage);
                self.stage = Stage::Failed;
                Err(e)
            }
        }
    }

    async fn run_stages (&mut self)->Result<RunOutcome> {
        self.stage = Stage::Acquiring;
        let (n_downloaded, n_skipped) = self.acquire().await?;

        self.configure_wps()?;
        self.stage = Stage::PreprocessConfigured;

        self.run_wps().await?;
        self.stage = Stage::Preprocessed;

        self.configure_wrf()?;
        self.stage = Stage::IntegrationConfigured;

        self.run_wrf().await?;
        self.stage = Stage::Integrated;

        let staged_output = self.stage_output()?;
        self.stage = Stage::OutputStaged;

        Ok( RunOutcome { n_downloaded, n_skipped, init_marker_found: true, staged_output })
    }

    /// fetch every configured cycle, each batch independently idempotent. Any failed task
    /// aborts the run - there is no partial-batch continuation
    async fn acquire (&self)->Result<(usize,usize)> {
        let mut n_downloaded = 0;
        let mut n_skipped = 0;

        for cycle in &self.cycles {
            let outcomes = fetch_cycle( &self.client, &self.config.gfs, cycle).await?;

            if let Some(TaskOutcome::Failed{task,reason}) = first_failure( &outcomes) {
                return Err( acquisition_error( format!("download of {:?} failed: {}",
                    task.dest.file_name().unwrap_or_default(), reason)))
            }
            n_downloaded += outcomes.iter().filter( |o| o.is_downloaded()).count();
            n_skipped += outcomes.iter().filter( |o| o.is_skipped()).count();
        }
        Ok( (n_downloaded, n_skipped))
    }

    fn configure_wps (&self)->Result<()> {
        let patches = wps_patches( self.config.max_dom, &self.start_date, &self.end_date, &self.config.wps_opts);
        patch_file( &self.config.namelist_wps(), &patches, self.config.max_dom)?;
        info!("WPS - configuration file updated");
        Ok(())
    }

    /// the preprocessing chain: grid definition, raw-data extraction, grid interpolation/merge.
    /// Stale artifacts of the previous run are removed first - the preprocessors would pick them up
    async fn run_wps (&self)->Result<()> {
        let wps_dir = &self.config.wps_dir;

        remove_matching_files( wps_dir, &["FILE*", "PFILE*", "met_em*", "GRIBFILE*", "geo_em*"])?;

        execute_program( "./geogrid.exe", &[], wps_dir).await?;
        info!("WPS - geogrid.exe completed");

        self.link_grib_files()?;

        let vtable = wps_dir.join("Vtable");
        if vtable.is_symlink() || vtable.is_file() {
            info!("WPS - Vtable.GFS already linked");
        } else {
            symlink_file( Path::new("ungrib/Variable_Tables/Vtable.GFS"), &vtable)?;
            info!("WPS - symlink of Vtable.GFS created");
        }

        execute_program( "./ungrib.exe", &[], wps_dir).await?;
        info!("WPS - ungrib.exe completed");

        execute_program( "./metgrid.exe", &[], wps_dir).await?;
        info!("WPS - metgrid.exe completed, met_em files are ready");
        Ok(())
    }

    /// structured replacement for the WPS link_grib.csh helper: link each grib file of the
    /// cycle's dataset dir as GRIBFILE.AAA, GRIBFILE.AAB, .. into the WPS dir
    fn link_grib_files (&self)->Result<()> {
        let dataset_dir = self.config.gfs.gfs_dir.join( iso_date( &self.start_date));
        let gribs = matching_files( &dataset_dir, "*.grb2")?;
        if gribs.is_empty() {
            return Err( config_error( format!("no grib files in {:?}", dataset_dir)))
        }

        for (i,grib) in gribs.iter().enumerate() {
            let src = grib.canonicalize()?;
            let dst = self.config.wps_dir.join( format!("GRIBFILE.{}", gribfile_suffix(i)));
            symlink_file( &src, &dst)?;
        }
        info!("WPS - {} grib files linked", gribs.len());
        Ok(())
    }

    fn configure_wrf (&self)->Result<()> {
        let patches = wrf_patches( self.config.max_dom, self.config.run_days,
                                   &self.start_date, &self.end_date, &self.config.wrf_opts);
        patch_file( &self.config.namelist_input(), &patches, self.config.max_dom)?;
        info!("WRF - configuration file updated");
        Ok(())
    }

    /// initialization and integration. real.exe exiting zero is not enough to start wrf.exe -
    /// its diagnostic log has to end with the success marker, otherwise the run fails here
    async fn run_wrf (&self)->Result<()> {
        let wrf_dir = &self.config.wrf_dir;

        remove_matching_files( wrf_dir, &["met_em*", "wrfout*", "wrfrst*"])?;

        let links = symlink_matching_files( &self.config.wps_dir, "met_em*", wrf_dir)?;
        if links.is_empty() {
            return Err( config_error( format!("no met_em files in {:?} to link", self.config.wps_dir)))
        }
        info!("WRF - {} met_em files linked", links.len());

        self.execute_model_program( "./real.exe").await?;
        info!("WRF - real.exe executed");

        if !self.init_succeeded()? {
            return Err( validation_gate_error( format!(
                "{INIT_DIAGNOSTIC_LOG} does not report \"{INIT_SUCCESS_MARKER}\" - check namelist.input")))
        }

        self.execute_model_program( "./wrf.exe").await?;
        info!("WRF - simulation completed");
        Ok(())
    }

    /// check the last line of the real.exe diagnostic log for the init success marker
    fn init_succeeded (&self)->Result<bool> {
        let log = self.config.wrf_dir.join( INIT_DIAGNOSTIC_LOG);
        Ok( last_line( &log)?.contains( INIT_SUCCESS_MARKER))
    }

    async fn execute_model_program (&self, program: &str)->Result<()> {
        if self.config.num_proc > 1 {
            let np = self.config.num_proc.to_string();
            execute_program( &self.config.mpi_cmd, &["-np", np.as_str(), program], &self.config.wrf_dir).await
        } else {
            execute_program( program, &[], &self.config.wrf_dir).await
        }
    }

    /// relocate the saved domain's wrfout file into a date-stamped output dir
    fn stage_output (&self)->Result<PathBuf> {
        let date = iso_date( &self.start_date);
        let out_dir = self.config.output_dir.join( &date);
        ensure_writable_dir( &out_dir)?;

        let pattern = format!("wrfout_d{:02}*", self.config.saved_domain);
        let outputs = matching_files( &self.config.wrf_dir, &pattern)?;

        let Some(output) = outputs.first() else {
            return Err( config_error( format!("no {} output in {:?}", pattern, self.config.wrf_dir)))
        };
        if outputs.len() > 1 {
            warn!("{} wrfout files for domain {}, staging only {:?}", outputs.len(), self.config.saved_domain, output);
        }

        let dest = out_dir.join( format!("wrfout_d{:02}_{}.nc", self.config.saved_domain, date));
        if fs::rename( output, &dest).is_err() { // output dir might be on another volume
            fs::copy( output, &dest)?;
            fs::remove_file( output)?;
        }

        info!("WRF - simulation file for domain {} saved to {:?}", self.config.saved_domain, dest);
        Ok(dest)
    }
}

/// the lexicographic 3-letter suffix convention of link_grib.csh (AAA, AAB, .. ZZZ)
fn gribfile_suffix (i: usize)->String {
    let mut cs = [b'A'; 3];
    cs[2] += (i % 26) as u8;
    cs[1] += ((i / 26) % 26) as u8;
    cs[0] += ((i / 676) % 26) as u8;
    String::from_utf8_lossy(&cs).to_string()
}

/// run an external program as a blocking subprocess with explicit arguments and working dir
/// (no shell involved). Exit code zero is the success contract
pub async fn execute_program (program: &str, args: &[&str], cwd: impl AsRef<Path>)->Result<()> {
    let mut cmd = Command::new( program);
    cmd.args( args).current_dir( cwd.as_ref());
    debug!("executing {cmd:?}");

    match cmd.status().await {
        Ok(status) => {
            if status.success() {
                info!("{} completed with status {}", program, status);
                Ok(())
            } else {
                Err( WrfModelError::ExternalProgramError { program: program.to_string(), reason: status.to_string() })
            }
        }
        Err(e) => Err( WrfModelError::ExternalProgramError { program: program.to_string(), reason: e.to_string() })
    }
}

/* #endregion pipeline */
