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

use wrf_namelist::{
    patch_file, NamelistDocument, NamelistPatch, WrfNamelistError
};

const NAMELIST_WPS: &str = "\
&share
 wrf_core = 'ARW',
 max_dom = 2,
 start_date = '2023-04-11_00:00:00','2023-04-11_00:00:00',
 end_date   = '2023-04-12_18:00:00','2023-04-12_18:00:00',
 interval_seconds = 21600,
/

&geogrid
 parent_id         =   1,   1,
 parent_grid_ratio =   1,   3,
 i_parent_start    =   1,  31,
 j_parent_start    =   1,  17,
 e_we              =  100, 112,
 e_sn              =  100,  97,
 geog_data_res = 'default','default',
 dx = 27000,
 dy = 27000,
 map_proj = 'mercator',
 ref_lat   =  -3.5,
 ref_lon   = 112.5,
 geog_data_path = '/data/WPS_GEOG/',
/
";

#[test]
fn test_quoted_scalar() {
    let mut doc = NamelistDocument::parse( NAMELIST_WPS);
    let report = doc.apply( &[NamelistPatch::quoted( "map_proj", "lambert")], 2).unwrap();

    assert_eq!( report.replaced_count( "map_proj"), 1);
    assert_eq!( doc.value_of( "map_proj"), Some(" 'lambert',"));
    assert!( doc.render().contains( "\n map_proj = 'lambert',\n")); // name prefix untouched
}

#[test]
fn test_domain_repeated_date() {
    let mut doc = NamelistDocument::parse( NAMELIST_WPS);
    let patches = [
        NamelistPatch::domain_repeated( "start_date", "2024-01-01_00:00:00"),
        NamelistPatch::domain_repeated( "end_date", "2024-01-02_00:00:00"),
        NamelistPatch::bare( "max_dom", "3"),
    ];
    doc.apply( &patches, 3).unwrap();

    let text = doc.render();
    assert!( text.contains( " start_date = '2024-01-01_00:00:00','2024-01-01_00:00:00','2024-01-01_00:00:00',\n"));
    // original whitespace up to and including '=' is preserved
    assert!( text.contains( " end_date   = '2024-01-02_00:00:00','2024-01-02_00:00:00','2024-01-02_00:00:00',\n"));
    assert!( text.contains( " max_dom = 3,\n"));
}

#[test]
fn test_domain_repeated_bare() {
    let mut doc = NamelistDocument::parse( " start_year = 2023, 2023,\n");
    doc.apply( &[NamelistPatch::domain_repeated_bare( "start_year", "2024")], 3).unwrap();
    assert_eq!( doc.render(), " start_year = 2024, 2024, 2024,\n");
}

#[test]
fn test_domain_list_arity() {
    let mut doc = NamelistDocument::parse( NAMELIST_WPS);

    let res = doc.apply( &[NamelistPatch::domain_list( "e_we", "100,112")], 3);
    assert!( matches!( res, Err(WrfNamelistError::ConfigError(_))));

    let report = doc.apply( &[NamelistPatch::domain_list( "e_we", "100,112,124")], 3).unwrap();
    assert_eq!( report.replaced_count( "e_we"), 1);
    assert!( doc.render().contains( " e_we              = 100,112,124,\n"));
}

#[test]
fn test_anchored_name_match() {
    let text = "\
 start_date = 'a',
 start_date_wrf = 'b',
";
    let mut doc = NamelistDocument::parse( text);
    let report = doc.apply( &[NamelistPatch::quoted( "start_date", "c")], 1).unwrap();

    assert_eq!( report.replaced_count( "start_date"), 1);
    let rendered = doc.render();
    assert!( rendered.contains( " start_date = 'c',\n"));
    assert!( rendered.contains( " start_date_wrf = 'b',\n")); // longer name not confused with its prefix
}

#[test]
fn test_unmatched_parameter_reported() {
    let mut doc = NamelistDocument::parse( NAMELIST_WPS);
    let report = doc.apply( &[NamelistPatch::bare( "no_such_param", "1")], 2).unwrap();

    assert_eq!( report.replaced_count( "no_such_param"), 0);
    assert_eq!( report.unmatched(), vec!["no_such_param"]);
}

#[test]
fn test_patch_file_retains_backup() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join( "namelist.wps");
    fs::write( &path, NAMELIST_WPS).unwrap();

    patch_file( &path, &[NamelistPatch::bare( "max_dom", "3")], 3).unwrap();

    let backup = dir.path().join( "namelist.wps.backup");
    assert_eq!( fs::read_to_string( &backup).unwrap(), NAMELIST_WPS);
    assert!( fs::read_to_string( &path).unwrap().contains( " max_dom = 3,\n"));
}

#[test]
fn test_failed_patch_leaves_file_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join( "namelist.wps");
    fs::write( &path, NAMELIST_WPS).unwrap();

    let res = patch_file( &path, &[NamelistPatch::domain_list( "e_sn", "100,97")], 3);
    assert!( matches!( res, Err(WrfNamelistError::ConfigError(_))));

    assert_eq!( fs::read_to_string( &path).unwrap(), NAMELIST_WPS); // byte-identical
    assert!( !dir.path().join( "namelist.wps.backup").exists()); // not even a backup was made
}
