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

use wrf_common::fs::{backup_file, last_line, matching_files, remove_matching_files, symlink_matching_files};

// run with "cargo test test_xx -- --nocapture"

#[test]
fn test_matching_files() {
    let dir = tempfile::tempdir().unwrap();
    fs::write( dir.path().join("gfs_4_20240923_0000_003.grb2"), b"b").unwrap();
    fs::write( dir.path().join("gfs_4_20240923_0000_000.grb2"), b"a").unwrap();
    fs::write( dir.path().join("notes.txt"), b"c").unwrap();

    let files = matching_files( dir.path(), "*.grb2").unwrap();
    assert_eq!( files.len(), 2);
    assert!( files[0] < files[1]); // sorted, stable order
}

#[test]
fn test_remove_matching_files() {
    let dir = tempfile::tempdir().unwrap();
    fs::write( dir.path().join("FILE:2024-09-23_00"), b"").unwrap();
    fs::write( dir.path().join("met_em.d01.nc"), b"").unwrap();
    fs::write( dir.path().join("namelist.wps"), b"").unwrap();

    let n = remove_matching_files( dir.path(), &["FILE*", "met_em*", "GRIBFILE*"]).unwrap();
    assert_eq!( n, 2);
    assert!( dir.path().join("namelist.wps").is_file());
}

#[test]
fn test_backup_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("namelist.wps");
    fs::write( &path, b"&share\n/").unwrap();

    let backup = backup_file( &path).unwrap();
    assert_eq!( backup, dir.path().join("namelist.wps.backup"));
    assert_eq!( fs::read( &backup).unwrap(), fs::read( &path).unwrap());
}

#[test]
fn test_last_line() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rsl.error.0000");
    fs::write( &path, "starting wrf task\nd01 SUCCESS COMPLETE REAL_EM INIT\n\n").unwrap();

    assert_eq!( last_line( &path).unwrap(), "d01 SUCCESS COMPLETE REAL_EM INIT");
}

#[test]
fn test_symlink_matching_files() {
    let src = tempfile::tempdir().unwrap();
    let dst = tempfile::tempdir().unwrap();
    fs::write( src.path().join("met_em.d01.nc"), b"x").unwrap();
    fs::write( src.path().join("met_em.d02.nc"), b"y").unwrap();

    let links = symlink_matching_files( src.path(), "met_em*", dst.path()).unwrap();
    assert_eq!( links.len(), 2);
    for link in &links {
        assert!( link.is_symlink());
        assert!( fs::read( link).is_ok()); // resolves to the source file
    }
}
