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

use std::ffi::OsStr;
use std::path::Path;
use thiserror::Error;

pub type ConfigResult<T> = std::result::Result<T, WrfConfigError>;

#[derive(Error,Debug)]
pub enum WrfConfigError {
    #[error("IO error {0}")]
    IOError( #[from] std::io::Error),

    #[error("config file not found: {0}")]
    ConfigFileNotFound(String),

    #[error("config parse error {0}")]
    ConfigParseError(String),
}

/// deserialize a RON config file into the given config struct.
/// Config values are passed into components explicitly - there is no ambient global config state
pub fn load_config <C:serde::de::DeserializeOwned> (pathname: impl AsRef<OsStr>)->ConfigResult<C> {
    let path = Path::new(&pathname);
    if path.is_file() {
        let contents = crate::fs::filepath_contents_as_string( &path)?;
        ron::from_str::<C>(contents.as_str()).map_err(|e| WrfConfigError::ConfigParseError(format!("{:?}", e)))
    } else {
        Err( WrfConfigError::ConfigFileNotFound(path.as_os_str().to_string_lossy().to_string()) )
    }
}
