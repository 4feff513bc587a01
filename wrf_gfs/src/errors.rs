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

pub type Result<T> = std::result::Result<T, WrfGfsError>;

#[derive(Error,Debug)]
pub enum WrfGfsError {
    #[error("IO error {0}")]
    IOError( #[from] std::io::Error),

    #[error("config error {0}")]
    ConfigError(String),

    #[error("http error {0}")]
    HttpError( #[from] reqwest::Error),

    /// a generic error
    #[error("operation failed {0}")]
    OpFailed(String)
}

impl From<WrfConfigError> for WrfGfsError {
    fn from (e: WrfConfigError) -> Self { WrfGfsError::ConfigError(e.to_string()) }
}

pub fn config_error (msg: impl ToString)->WrfGfsError {
    WrfGfsError::ConfigError(msg.to_string())
}

pub fn op_failed (msg: impl ToString)->WrfGfsError {
    WrfGfsError::OpFailed(msg.to_string())
}
