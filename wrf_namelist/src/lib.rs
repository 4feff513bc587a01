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

//! in-place patching of the namelist configuration format consumed by the WPS/WRF executables.
//!
//! Namelists are treated as semi-structured text, not parsed into a full grammar: a file is a
//! sequence of typed line records, where a parameter line is a parameter name anchored at the
//! start of the line (after leading whitespace) up to its `=`, followed by a comma-terminated
//! value list. Patching rewrites everything after the `=` and preserves the rest of the line
//! verbatim. The anchored name match is a whole token, so a parameter whose name is a textual
//! prefix of another (`start_date` vs `start_date_wrf`) can never be confused

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use tracing::warn;

use wrf_common::fs::{backup_file,filepath_contents_as_string};

mod errors;
pub use errors::*;

// one anchored scan classifies lines; group 1 is the prefix we preserve (up to and including '='),
// group 2 the parameter name, group 3 the comma-terminated value text we replace
static PARAM_LINE: LazyLock<Regex> = LazyLock::new( || {
    Regex::new( r"^(\s*([A-Za-z_][A-Za-z0-9_]*)\s*=)\s*([^,]+,.*)$").unwrap()
});

/* #region document ****************************************************************************************/

/// one line of a namelist file - either a parameter assignment or anything else
/// (section headers, terminators, comments), which we pass through untouched
#[derive(Debug,Clone)]
pub enum NamelistLine {
    Param { prefix: String, name: String, value: String },
    Other( String ),
}

/// an ordered sequence of typed namelist line records, built by a single anchored-prefix scan
#[derive(Debug,Clone)]
pub struct NamelistDocument {
    lines: Vec<NamelistLine>,
}

impl NamelistDocument {
    pub fn parse (text: &str)->Self {
        let lines = text.lines().map( |line| {
            if let Some(caps) = PARAM_LINE.captures(line) {
                NamelistLine::Param {
                    prefix: caps[1].to_string(),
                    name: caps[2].to_string(),
                    value: line[caps.get(1).unwrap().end()..].to_string(),
                }
            } else {
                NamelistLine::Other( line.to_string())
            }
        }).collect();

        NamelistDocument { lines }
    }

    pub fn from_file (path: impl AsRef<Path>)->Result<Self> {
        let text = filepath_contents_as_string( &path.as_ref())?;
        Ok( Self::parse( &text))
    }

    pub fn render (&self)->String {
        let mut text = String::new();
        for line in &self.lines {
            match line {
                NamelistLine::Param { prefix, value, .. } => { text.push_str(prefix); text.push_str(value); }
                NamelistLine::Other( s) => text.push_str(s),
            }
            text.push('\n');
        }
        text
    }

    /// the value text (everything after '=') of the first line assigning `name`
    pub fn value_of (&self, name: &str)->Option<&str> {
        self.lines.iter().find_map( |line| match line {
            NamelistLine::Param { name: n, value, .. } if n == name => Some(value.as_str()),
            _ => None
        })
    }

    /// replace the value text of every line assigning a patched parameter. All-or-nothing:
    /// every patch is validated against the domain count before the first line is touched
    pub fn apply (&mut self, patches: &[NamelistPatch], max_dom: usize)->Result<PatchReport> {
        if max_dom == 0 {
            return Err( config_error( "domain count must be > 0"))
        }
        for patch in patches {
            patch.value.validate( &patch.name, max_dom)?;
        }

        let mut report = PatchReport::new( patches);
        for line in self.lines.iter_mut() {
            if let NamelistLine::Param { name, value, .. } = line {
                if let Some(patch) = patches.iter().find( |p| p.name == *name) {
                    *value = patch.value.render( max_dom);
                    report.count( &patch.name);
                }
            }
        }
        Ok(report)
    }
}

/* #endregion document */

/* #region patches ****************************************************************************************/

/// value formatting policy, selected by parameter identity (see the `wps_patches`/`wrf_patches`
/// builders in wrf_model for which parameter gets which)
#[derive(Debug,Clone)]
pub enum ParamValue {
    /// string-quoted scalar, written as `'v',`
    Quoted(String),
    /// bare scalar, written as `v,`
    Bare(String),
    /// quoted scalar repeated once per domain: `'v','v','v',`
    DomainRepeated(String),
    /// bare scalar repeated once per domain: `v, v, v,`
    DomainRepeatedBare(String),
    /// caller-joined per-domain list `a,b,c` - element count must equal the domain count
    DomainList(String),
}

impl ParamValue {
    fn validate (&self, name: &str, max_dom: usize)->Result<()> {
        if let ParamValue::DomainList(v) = self {
            let n = v.split(',').count();
            if n != max_dom {
                return Err( config_error( format!(
                    "length of {name} value list ({n}) does not match domain count {max_dom}")))
            }
        }
        Ok(())
    }

    /// the replacement value text, including the leading blank after '='
    fn render (&self, max_dom: usize)->String {
        match self {
            ParamValue::Quoted(v) => format!(" '{v}',"),
            ParamValue::Bare(v) => format!(" {v},"),
            ParamValue::DomainRepeated(v) => format!(" {}", format!("'{v}',").repeat(max_dom)),
            ParamValue::DomainRepeatedBare(v) => {
                let repeated = format!("{v}, ").repeat(max_dom);
                format!(" {}", repeated.trim_end())
            }
            ParamValue::DomainList(v) => format!(" {v},"),
        }
    }
}

/// a single parameter assignment to rewrite
#[derive(Debug,Clone)]
pub struct NamelistPatch {
    pub name: String,
    pub value: ParamValue,
}

impl NamelistPatch {
    pub fn quoted (name: impl ToString, value: impl ToString)->Self {
        NamelistPatch { name: name.to_string(), value: ParamValue::Quoted(value.to_string()) }
    }
    pub fn bare (name: impl ToString, value: impl ToString)->Self {
        NamelistPatch { name: name.to_string(), value: ParamValue::Bare(value.to_string()) }
    }
    pub fn domain_repeated (name: impl ToString, value: impl ToString)->Self {
        NamelistPatch { name: name.to_string(), value: ParamValue::DomainRepeated(value.to_string()) }
    }
    pub fn domain_repeated_bare (name: impl ToString, value: impl ToString)->Self {
        NamelistPatch { name: name.to_string(), value: ParamValue::DomainRepeatedBare(value.to_string()) }
    }
    pub fn domain_list (name: impl ToString, value: impl ToString)->Self {
        NamelistPatch { name: name.to_string(), value: ParamValue::DomainList(value.to_string()) }
    }
}

/// per-patch replacement counts of an apply pass
#[derive(Debug)]
pub struct PatchReport {
    replaced: BTreeMap<String,usize>,
}

impl PatchReport {
    fn new (patches: &[NamelistPatch])->Self {
        PatchReport { replaced: patches.iter().map( |p| (p.name.clone(), 0)).collect() }
    }

    fn count (&mut self, name: &str) {
        if let Some(n) = self.replaced.get_mut(name) { *n += 1 }
    }

    pub fn replaced_count (&self, name: &str)->usize {
        self.replaced.get(name).copied().unwrap_or(0)
    }

    /// patched parameter names that did not occur in the document
    pub fn unmatched (&self)->Vec<&str> {
        self.replaced.iter().filter( |(_,n)| **n == 0).map( |(name,_)| name.as_str()).collect()
    }
}

/* #endregion patches */

/// rewrite the parameter lines of a namelist file in place, retaining the pre-patch file as a
/// `.backup` sibling. Validation happens before the first byte is written - on error the file
/// is left byte-identical to before the call
pub fn patch_file (path: impl AsRef<Path>, patches: &[NamelistPatch], max_dom: usize)->Result<PatchReport> {
    let path = path.as_ref();

    let mut doc = NamelistDocument::from_file( path)?;
    let report = doc.apply( patches, max_dom)?;

    for name in report.unmatched() {
        // non-fatal: templates may legitimately omit optional parameters, but surface possible typos
        warn!("parameter {} does not occur in {:?}, not patched", name, path);
    }

    backup_file( path)?;
    fs::write( path, doc.render())?;
    Ok(report)
}
