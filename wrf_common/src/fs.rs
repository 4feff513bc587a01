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

use std::fs::{self,File};
use std::io::{self,Read,BufRead,BufReader,Error as IOError,ErrorKind};
use std::path::{Path,PathBuf};

use glob::glob;

type Result<T> = std::result::Result<T,std::io::Error>;

pub fn filename_of_path (path: impl AsRef<Path>)->Result<String> {
    let path = path.as_ref();

    Ok( path.file_name()
        .ok_or(IOError::other( format!("not a valid filename {path:?}")) )?
        .to_str().ok_or(IOError::other( format!("invalid char in filename {path:?}")) )?
        .to_string())
}

pub fn ensure_dir (path: impl AsRef<Path>)->io::Result<()> {
    let path = path.as_ref();
    if !path.is_dir() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}

/// check if dir pathname exists and is writable, try to create dir otherwise
pub fn ensure_writable_dir (path: impl AsRef<Path>) -> io::Result<()> {
    let path = path.as_ref();
    if path.is_dir() {
        let md = fs::metadata(&path)?;
        if md.permissions().readonly() {
            Err( IOError::new( ErrorKind::PermissionDenied, format!("output_dir {:?} not writable", &path)))
        } else {
            Ok(())
        }

    } else {
        fs::create_dir_all(path)
    }
}

pub fn path_to_lossy_string (path: impl AsRef<Path>) -> String {
    path.as_ref().to_string_lossy().as_ref().to_string()
}

pub fn filepath_contents_as_string <P: AsRef<Path>> (path: &P) -> Result<String> {
    let mut file = File::open(path)?;
    let len = file.metadata()?.len();
    let mut contents = String::with_capacity(len as usize);
    file.read_to_string(&mut contents)?;
    Ok(contents)
}

/// copy `path` to a sibling file with a ".backup" suffix, returning the backup pathname
pub fn backup_file (path: impl AsRef<Path>) -> Result<PathBuf> {
    let path = path.as_ref();
    let mut backup = path.as_os_str().to_os_string();
    backup.push(".backup");
    let backup = PathBuf::from(backup);

    fs::copy( path, &backup)?;
    Ok(backup)
}

/// all files in `dir` matching the given glob pattern, in sorted (stable) order
pub fn matching_files (dir: impl AsRef<Path>, pattern: &str) -> Result<Vec<PathBuf>> {
    let pat = path_to_lossy_string( dir.as_ref().join(pattern));
    let mut files: Vec<PathBuf> = Vec::new();

    for entry in glob( &pat).map_err(|e| IOError::other( format!("bad glob pattern {pat}: {e}")))? {
        match entry {
            Ok(path) => if path.is_file() || path.is_symlink() { files.push(path) },
            Err(e) => return Err( IOError::other( format!("unreadable dir entry: {e}")))
        }
    }

    files.sort();
    Ok(files)
}

/// remove all files in `dir` matching any of the given glob patterns (stale artifacts of a previous run).
/// Returns the number of removed files. Missing matches are not an error.
pub fn remove_matching_files (dir: impl AsRef<Path>, patterns: &[&str]) -> Result<usize> {
    let dir = dir.as_ref();
    let mut n = 0;

    for pattern in patterns {
        for path in matching_files( dir, pattern)? {
            fs::remove_file( &path)?;
            n += 1;
        }
    }
    Ok(n)
}

/// create a symlink `dst` pointing to `src`, replacing a previous link of the same name
pub fn symlink_file (src: impl AsRef<Path>, dst: impl AsRef<Path>) -> Result<()> {
    let dst = dst.as_ref();
    if dst.is_symlink() || dst.is_file() {
        fs::remove_file(dst)?;
    }
    std::os::unix::fs::symlink( src.as_ref(), dst)
}

/// symlink every file in `src_dir` matching `pattern` into `dst_dir`, keeping filenames.
/// Returns the link pathnames
pub fn symlink_matching_files (src_dir: impl AsRef<Path>, pattern: &str, dst_dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let dst_dir = dst_dir.as_ref();
    let mut links: Vec<PathBuf> = Vec::new();

    for src in matching_files( src_dir, pattern)? {
        let src = src.canonicalize()?;
        let dst = dst_dir.join( filename_of_path( &src)?);
        symlink_file( &src, &dst)?;
        links.push(dst);
    }
    Ok(links)
}

/// the last non-empty line of a text file (e.g. of a diagnostic log)
pub fn last_line (path: impl AsRef<Path>) -> Result<String> {
    let file = File::open( path.as_ref())?;
    let mut last = String::new();

    for line in BufReader::new(file).lines() {
        let line = line?;
        if !line.trim().is_empty() { last = line }
    }
    Ok(last)
}
