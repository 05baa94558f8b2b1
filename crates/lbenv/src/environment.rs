// Copyright (c) Contributors to the lbenv project.
// SPDX-License-Identifier: Apache-2.0

//! Environment composition sessions.
//!
//! An [`Environment`] owns a variable table and the log of every action
//! applied to it. Recipes are decoded into actions and replayed through the
//! same entry points used by direct callers, so nested includes recurse
//! through an identical code path.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use regex::Regex;

use crate::action::{
    Action, AppendVar, DeclareVar, PrependVar, RemoveMatching, RemoveVar, SetVar, UnsetVar,
};
use crate::processor::{default_processors, Processor};
use crate::var::{Var, VarKind, DOT};
use crate::{codec, locate, Config, Error, Result};

#[cfg(test)]
#[path = "./environment_test.rs"]
mod environment_test;

/// Name of the shell's "last argument" variable, never enumerated.
const UNDERSCORE: &str = "_";

/// One composition session.
#[derive(Debug, Clone)]
pub struct Environment {
    search_path: Vec<PathBuf>,
    default_path: Vec<PathBuf>,
    processors: Vec<Processor>,
    /// Snapshot seeding non-local declarations, when enabled.
    system: Option<HashMap<String, String>>,
    vars: BTreeMap<String, Var>,
    log: Vec<Action>,
    loaded: HashSet<PathBuf>,
    /// Values of `.` saved by each recipe being processed.
    dir_stack: Vec<Option<Var>>,
}

impl Default for Environment {
    fn default() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        let mut vars = BTreeMap::new();
        vars.insert(DOT.to_string(), dot_var(&cwd));
        Self {
            search_path: Vec::new(),
            default_path: vec![PathBuf::from(".")],
            processors: default_processors(),
            system: None,
            vars,
            log: Vec::new(),
            loaded: HashSet::new(),
            dir_stack: Vec::new(),
        }
    }
}

impl Environment {
    /// Start a session using the given process configuration.
    pub fn new(config: &Config) -> Self {
        let env = Self::default().with_default_path(config.envxml_path.clone());
        if config.load_from_system {
            env.with_system_vars(process_vars())
        } else {
            env
        }
    }

    /// Directories searched for included recipes before the default path.
    pub fn with_search_path(mut self, search_path: Vec<PathBuf>) -> Self {
        self.search_path = search_path;
        self
    }

    /// Directories searched for included recipes when nothing else matches.
    pub fn with_default_path(mut self, default_path: Vec<PathBuf>) -> Self {
        self.default_path = default_path;
        self
    }

    /// Replace the value processors run on every incoming value.
    pub fn with_processors(mut self, processors: Vec<Processor>) -> Self {
        self.processors = processors;
        self
    }

    /// Seed non-local declarations from these values.
    pub fn with_system_vars(mut self, vars: HashMap<String, String>) -> Self {
        self.system = Some(vars);
        self
    }

    pub fn search_path(&self) -> &[PathBuf] {
        &self.search_path
    }

    pub fn push_processor(&mut self, processor: Processor) {
        self.processors.push(processor);
    }

    /// Declare a variable.
    ///
    /// Declaring an existing variable again is a no-op when kind and
    /// locality agree, and an error otherwise.
    pub fn declare(&mut self, name: &str, kind: VarKind, local: bool) -> Result<()> {
        match self.vars.get(name) {
            Some(existing) if existing.kind != kind || existing.local != local => {
                return Err(Error::Redeclaration {
                    name: name.to_string(),
                    existing_kind: existing.kind,
                    existing_local: existing.local,
                    requested_kind: kind,
                    requested_local: local,
                });
            }
            Some(_) => {}
            None => {
                let mut var = Var::new(name, kind, local);
                let seed = match (&self.system, local) {
                    (Some(system), false) => system.get(name).cloned(),
                    _ => None,
                };
                if let Some(seed) = seed {
                    let value = self.process(&var, &seed);
                    var.set(value);
                }
                tracing::trace!("declared {name} ({kind}, local={local})");
                self.vars.insert(name.to_string(), var);
            }
        }
        self.log.push(Action::Declare(DeclareVar {
            name: name.to_string(),
            kind,
            local,
        }));
        Ok(())
    }

    pub fn set(&mut self, name: &str, value: &str) -> Result<()> {
        self.update(name, value, |var, value| var.set(value))?;
        self.log.push(Action::Set(SetVar {
            name: name.to_string(),
            value: value.to_string(),
        }));
        Ok(())
    }

    /// Remove a variable from the session.
    ///
    /// The `.` variable cannot be removed.
    pub fn unset(&mut self, name: &str) -> Result<()> {
        if name != DOT {
            self.vars.remove(name);
        }
        self.log.push(Action::Unset(UnsetVar {
            name: name.to_string(),
        }));
        Ok(())
    }

    pub fn append(&mut self, name: &str, value: &str) -> Result<()> {
        self.update(name, value, Var::append)?;
        self.log.push(Action::Append(AppendVar {
            name: name.to_string(),
            value: value.to_string(),
        }));
        Ok(())
    }

    pub fn prepend(&mut self, name: &str, value: &str) -> Result<()> {
        self.update(name, value, Var::prepend)?;
        self.log.push(Action::Prepend(PrependVar {
            name: name.to_string(),
            value: value.to_string(),
        }));
        Ok(())
    }

    /// Remove a literal value, see [`Var::remove`].
    pub fn remove(&mut self, name: &str, value: &str) -> Result<()> {
        self.update(name, value, Var::remove)?;
        self.log.push(Action::Remove(RemoveVar {
            name: name.to_string(),
            value: value.to_string(),
        }));
        Ok(())
    }

    /// Remove everything matched by `pattern`, see [`Var::remove_matching`].
    ///
    /// The pattern goes through the processors before it is compiled.
    pub fn remove_matching(&mut self, name: &str, pattern: &str) -> Result<()> {
        let mut var = self.ensure(name)?;
        let processed = self.process(&var, pattern);
        let re = Regex::new(&processed).map_err(|error| Error::InvalidPattern {
            variable: name.to_string(),
            pattern: processed.clone(),
            error,
        })?;
        var.remove_matching(&re);
        self.vars.insert(name.to_string(), var);
        self.log.push(Action::RemoveMatching(RemoveMatching {
            name: name.to_string(),
            pattern: pattern.to_string(),
        }));
        Ok(())
    }

    /// Locate a recipe and apply its actions.
    ///
    /// `caller` is the recipe holding the include, if any. A recipe that was
    /// already applied in this session is skipped silently.
    pub fn include(&mut self, file: &str, caller: Option<&Path>, hints: Option<&str>) -> Result<()> {
        let path = locate::locate(
            file,
            caller,
            hints,
            &self.search_path,
            &self.default_path,
        )?;
        self.load_file(&path)
    }

    /// Locate a recipe by name on the session search path and apply it.
    pub fn load_by_name(&mut self, file: &str) -> Result<()> {
        self.include(file, None, None)
    }

    /// Apply the recipe stored at `path`.
    ///
    /// While its actions run, `.` holds the directory of `path`.
    pub fn load_file(&mut self, path: &Path) -> Result<()> {
        let key = dunce::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        if !self.loaded.insert(key) {
            tracing::debug!("skipping already included [{}]", path.display());
            return Ok(());
        }
        tracing::debug!("including [{}]", path.display());

        let actions = codec::decode_file(path)?;
        let dir = path.parent().unwrap_or_else(|| Path::new(""));
        let previous = self.vars.insert(DOT.to_string(), dot_var(dir));
        self.dir_stack.push(previous);

        let result = actions
            .into_iter()
            .try_for_each(|action| self.apply(action));

        match self.dir_stack.pop().flatten() {
            Some(dot) => {
                self.vars.insert(DOT.to_string(), dot);
            }
            None => {
                self.vars.remove(DOT);
            }
        }
        result
    }

    /// Apply a recipe held in memory.
    ///
    /// Includes resolve against the session search path only, and `.` is
    /// left untouched.
    pub fn load_xml(&mut self, xml: &str) -> Result<()> {
        codec::decode_str(xml, None)?
            .into_iter()
            .try_for_each(|action| self.apply(action))
    }

    /// Apply a single action.
    pub fn apply(&mut self, action: Action) -> Result<()> {
        match action {
            Action::Declare(a) => self.declare(&a.name, a.kind, a.local),
            Action::Set(a) => self.set(&a.name, &a.value),
            Action::Unset(a) => self.unset(&a.name),
            Action::Append(a) => self.append(&a.name, &a.value),
            Action::Prepend(a) => self.prepend(&a.name, &a.value),
            Action::Remove(a) => self.remove(&a.name, &a.value),
            Action::RemoveMatching(a) => self.remove_matching(&a.name, &a.pattern),
            Action::Include(a) => self.include(&a.file, a.caller.as_deref(), a.hints.as_deref()),
        }
    }

    pub fn has(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&Var> {
        self.vars.get(name)
    }

    /// Names of the user-visible variables, in lexical order.
    pub fn keys(&self) -> Vec<&str> {
        self.visible().map(|var| var.name.as_str()).collect()
    }

    /// Name and value of every variable a child process should receive.
    pub fn exported(&self) -> Vec<(&str, &str)> {
        self.visible()
            .filter(|var| !var.local)
            .map(|var| (var.name.as_str(), var.value.as_str()))
            .collect()
    }

    /// Every action applied so far, includes flattened.
    pub fn actions(&self) -> &[Action] {
        &self.log
    }

    /// Encode the action log as a recipe that replays this session.
    pub fn save_xml(&self) -> String {
        codec::encode(&self.log)
    }

    /// Render a POSIX shell script exporting every visible variable,
    /// locals included.
    pub fn gen_script(&self) -> String {
        let mut out = String::from("#!/bin/sh\n");
        for var in self.visible() {
            // writing into a String cannot fail
            let _ = writeln!(out, "export {}=\"{}\"", var.name, shell_escape(&var.value));
        }
        out.push_str("## EOF\n");
        out
    }

    fn visible(&self) -> impl Iterator<Item = &Var> {
        self.vars
            .values()
            .filter(|var| var.name != DOT && var.name != UNDERSCORE)
    }

    /// Run `value` through every processor, in order.
    fn process(&self, var: &Var, value: &str) -> String {
        self.processors
            .iter()
            .fold(value.to_string(), |value, processor| processor(var, &value, self))
    }

    /// A copy of the named variable, declared with a guessed kind if needed.
    fn ensure(&mut self, name: &str) -> Result<Var> {
        if let Some(var) = self.vars.get(name) {
            return Ok(var.clone());
        }
        self.declare(name, VarKind::guess(name), false)?;
        Ok(self
            .vars
            .get(name)
            .cloned()
            .unwrap_or_else(|| Var::new(name, VarKind::guess(name), false)))
    }

    fn update<F>(&mut self, name: &str, value: &str, edit: F) -> Result<()>
    where
        F: FnOnce(&mut Var, &str),
    {
        let mut var = self.ensure(name)?;
        let processed = self.process(&var, value);
        edit(&mut var, &processed);
        self.vars.insert(name.to_string(), var);
        Ok(())
    }
}

fn dot_var(dir: &Path) -> Var {
    let mut var = Var::new(DOT, VarKind::Scalar, true);
    var.set(dir.to_string_lossy());
    var
}

/// The current process environment, skipping non-unicode entries.
pub fn process_vars() -> HashMap<String, String> {
    std::env::vars_os()
        .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
        .collect()
}

fn shell_escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '"' | '\\' | '`' | '$') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
