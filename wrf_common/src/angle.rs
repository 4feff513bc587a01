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

use std::fmt;
use serde::{Serialize,Deserialize};

#[inline]
pub fn normalize_90 (d: f64) -> f64 {
    let x = d % 360.0;

    if x < -90.0 { -180.0 - x }
    else if x > 90.0 { 180.0 - x }
    else { x }
}

#[inline]
pub fn normalize_180 (d: f64) -> f64 {
    let x = d % 360.0;

    if x < -180.0 { 360.0 + x }
    else if x > 180.0 { x - 360.0 }
    else { x }
}

/// geodetic latitude in normalized degrees [-90,90]
#[derive(Debug,Clone,Copy,PartialEq,PartialOrd,Serialize,Deserialize)]
#[serde(from = "f64", into = "f64")]
pub struct Latitude(f64);

impl Latitude {
    #[inline] pub fn from_degrees (deg: f64) -> Self { Latitude( normalize_90(deg)) }
    #[inline] pub fn degrees (&self) -> f64 { self.0 }
}

impl From<f64> for Latitude {
    fn from (deg: f64) -> Self { Latitude::from_degrees(deg) }
}
impl From<Latitude> for f64 {
    fn from (lat: Latitude) -> f64 { lat.0 }
}

impl fmt::Display for Latitude {
    fn fmt (&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}deg", self.0) }
}

/// geodetic longitude in normalized degrees [-180,180]
#[derive(Debug,Clone,Copy,PartialEq,PartialOrd,Serialize,Deserialize)]
#[serde(from = "f64", into = "f64")]
pub struct Longitude(f64);

impl Longitude {
    #[inline] pub fn from_degrees (deg: f64) -> Self { Longitude( normalize_180(deg)) }
    #[inline] pub fn degrees (&self) -> f64 { self.0 }
}

impl From<f64> for Longitude {
    fn from (deg: f64) -> Self { Longitude::from_degrees(deg) }
}
impl From<Longitude> for f64 {
    fn from (lon: Longitude) -> f64 { lon.0 }
}

impl fmt::Display for Longitude {
    fn fmt (&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}deg", self.0) }
}
