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

use thiserror::Error;
use wrf_common::config::WrfConfigError;
use wrf_gfs::WrfGfsError;
use wrf_namelist::WrfNamelistError;

pub type Result<T> = std::result::Result<T, WrfModelError>;

#[derive(Error,Debug)]
pub enum WrfModelError {
    #[error("IO error {0}")]
    IOError( #[from] std::io::Error),

    /// horizon/domain-count/path mismatches - raised before any mutating action for the stage
    #[error("config error {0}")]
    ConfigError(String),

    /// a failed download batch - fatal, no retry, no partial continuation
    #[error("acquisition error {0}")]
    AcquisitionError(String),

    /// non-zero exit (or failed spawn) of a preprocessing/integration program
    #[error("external program {program} failed: {reason}")]
    ExternalProgramError { program: String, reason: String },

    /// detected by output inspection rather than exit status - the init log lacks the success marker
    #[error("validation gate error {0}")]
    ValidationGateError(String),
}

impl From<WrfConfigError> for WrfModelError {
    fn from (e: WrfConfigError) -> Self { WrfModelError::ConfigError(e.to_string()) }
}

impl From<WrfNamelistError> for WrfModelError {
    fn from (e: WrfNamelistError) -> Self {
        match e {
            WrfNamelistError::IOError(e) => WrfModelError::IOError(e),
            WrfNamelistError::ConfigError(msg) => WrfModelError::ConfigError(msg),
        }
    }
}

impl From<WrfGfsError> for WrfModelError {
    fn from (e: WrfGfsError) -> Self {
        match e {
            WrfGfsError::IOError(e) => WrfModelError::IOError(e),
            WrfGfsError::ConfigError(msg) => WrfModelError::ConfigError(msg),
            other => WrfModelError::AcquisitionError(other.to_string()),
        }
    }
}

pub fn config_error (msg: impl ToString)->WrfModelError {
    WrfModelError::ConfigError(msg.to_string())
}

pub fn acquisition_error (msg: impl ToString)->WrfModelError {
    WrfModelError::AcquisitionError(msg.to_string())
}

pub fn validation_gate_error (msg: impl ToString)->WrfModelError {
    WrfModelError::ValidationGateError(msg.to_string())
}
