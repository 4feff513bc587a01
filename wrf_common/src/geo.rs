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

//! geographic bounding boxes on the WGS84 ellipsoid surface. Following wrf-rs design principles
//! we wrap the respective [geo](https://docs.rs/geo/latest/geo/index.html) type to add lat/lon
//! value semantics and still retain the capability to use the 3rd party algorithms

use std::fmt;
use serde::{Serialize,Deserialize};
use geo::{Point,Rect};

use crate::angle::{Latitude,Longitude};

/// a wrapper for geo::Rect that uses geodetic degrees stored as f64
#[derive(Debug,Clone,PartialEq,Serialize,Deserialize)]
#[serde(from = "GeoRectFields", into = "GeoRectFields")]
pub struct GeoRect(Rect);

impl GeoRect {
    pub fn from_wsen (west: Longitude, south: Latitude, east: Longitude, north: Latitude) -> Self {
        GeoRect( Rect::new( Point::new( west.degrees(), south.degrees()), Point::new( east.degrees(), north.degrees()) ))
    }

    pub fn from_wsen_degrees (west: f64, south: f64, east: f64, north: f64) -> Self {
        Self::from_wsen( Longitude::from_degrees(west), Latitude::from_degrees(south),
                         Longitude::from_degrees(east), Latitude::from_degrees(north))
    }

    #[inline] pub fn west(&self)->Longitude { Longitude::from_degrees( self.0.min().x) }
    #[inline] pub fn east(&self)->Longitude { Longitude::from_degrees( self.0.max().x) }
    #[inline] pub fn south(&self)->Latitude { Latitude::from_degrees( self.0.min().y) }
    #[inline] pub fn north(&self)->Latitude { Latitude::from_degrees( self.0.max().y) }

    pub fn rect<'a> (&'a self) -> &'a Rect { &self.0 }
}

impl fmt::Display for GeoRect {
    fn fmt (&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{},{};{},{}]", self.west(), self.south(), self.east(), self.north())
    }
}

// the serde view - plain degrees so that configs read/write naturally
#[derive(Serialize,Deserialize)]
struct GeoRectFields {
    west: f64,
    south: f64,
    east: f64,
    north: f64,
}

impl From<GeoRectFields> for GeoRect {
    fn from (v: GeoRectFields) -> Self { GeoRect::from_wsen_degrees( v.west, v.south, v.east, v.north) }
}

impl From<GeoRect> for GeoRectFields {
    fn from (r: GeoRect) -> Self {
        GeoRectFields {
            west: r.west().degrees(),
            south: r.south().degrees(),
            east: r.east().degrees(),
            north: r.north().degrees(),
        }
    }
}
