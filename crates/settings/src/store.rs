use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use ron::value::{Map as RonMap, Value as RonValue};
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, info, warn};

use crate::{Settings, SettingsError};

type Deltas = HashMap<String, RonValue>;

/* ------------------------------------------------------------------------- */
/* RON value helpers                                                         */
/* ------------------------------------------------------------------------- */

/// Serializes a section into a `ron::Value::Map`.
fn to_ron_map<T: Serialize>(value: &T) -> Result<RonMap, SettingsError> {
    let text = ron::to_string(value)?;
    match ron::from_str::<RonValue>(&text)? {
        RonValue::Map(map) => Ok(map),
        _ => Err(SettingsError::Invalid("section must serialize to a struct or map")),
    }
}

fn from_ron_map<T: DeserializeOwned>(map: &RonMap) -> Result<T, SettingsError> {
    Ok(RonValue::Map(map.clone()).into_rust()?)
}

/// Layers `delta` over `base`; nested maps merge key by key.
fn merge(base: &RonMap, delta: &RonMap) -> RonMap {
    let mut merged = base.clone();
    for (key, value) in delta.iter() {
        let next = match (merged.get(key), value) {
            (Some(RonValue::Map(inner)), RonValue::Map(delta_inner)) => {
                RonValue::Map(merge(inner, delta_inner))
            }
            _ => value.clone(),
        };
        merged.insert(key.clone(), next);
    }
    merged
}

/// Entries of `current` that differ from `defaults`, recursively.
fn diff(current: &RonMap, defaults: &RonMap) -> RonMap {
    let mut out = RonMap::new();
    for (key, value) in current.iter() {
        match (defaults.get(key), value) {
            (Some(RonValue::Map(def)), RonValue::Map(cur)) => {
                let inner = diff(cur, def);
                if !inner.is_empty() {
                    out.insert(key.clone(), RonValue::Map(inner));
                }
            }
            (Some(def), cur) if def == cur => {}
            _ => {
                out.insert(key.clone(), value.clone());
            }
        }
    }
    out
}

/// Drops keys of `delta` that `defaults` no longer knows.
fn prune(delta: &RonMap, defaults: &RonMap) -> RonMap {
    let mut out = RonMap::new();
    for (key, value) in delta.iter() {
        match (defaults.get(key), value) {
            (None, _) => debug!(key = ?key, "dropping stale settings key"),
            (Some(RonValue::Map(def)), RonValue::Map(inner)) => {
                let kept = prune(inner, def);
                if !kept.is_empty() {
                    out.insert(key.clone(), RonValue::Map(kept));
                }
            }
            (Some(_), _) => {
                out.insert(key.clone(), value.clone());
            }
        }
    }
    out
}

fn effective(defaults: &RonMap, delta: Option<&RonValue>) -> RonMap {
    match delta {
        Some(RonValue::Map(delta)) => merge(defaults, delta),
        _ => defaults.clone(),
    }
}

fn read_deltas(path: &Path) -> Result<Deltas, SettingsError> {
    if !path.exists() {
        return Ok(Deltas::new());
    }
    let content = fs::read_to_string(path)?;
    if content.trim().is_empty() {
        return Ok(Deltas::new());
    }
    Ok(ron::from_str(&content)?)
}

/* ------------------------------------------------------------------------- */
/* Builder                                                                   */
/* ------------------------------------------------------------------------- */

#[derive(Debug, Default)]
pub struct SettingsStoreBuilder {
    settings_file: Option<PathBuf>,
}

impl SettingsStoreBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.settings_file = Some(path.into());
        self
    }

    /// Reads the delta file if it exists. Nothing is written yet.
    pub fn build(self) -> Result<SettingsStore, SettingsError> {
        let file_path = self
            .settings_file
            .ok_or(SettingsError::Invalid("settings file not specified"))?;

        if let Some(dir) = file_path.parent() {
            if !dir.as_os_str().is_empty() && !dir.exists() {
                fs::create_dir_all(dir)?;
            }
        }

        let deltas = read_deltas(&file_path)?;
        debug!(path = %file_path.display(), sections = deltas.len(), "settings file loaded");

        Ok(SettingsStore {
            file_path,
            inner: RwLock::new(Inner {
                deltas,
                sections: HashMap::new(),
            }),
        })
    }
}

/* ------------------------------------------------------------------------- */
/* Store                                                                     */
/* ------------------------------------------------------------------------- */

struct Section {
    defaults: RonMap,
    value: RonMap,
}

struct Inner {
    /// Section name -> persisted delta, including sections not registered (yet).
    deltas: Deltas,
    sections: HashMap<&'static str, Section>,
}

/// Thread-safe settings store backed by one RON delta file.
pub struct SettingsStore {
    file_path: PathBuf,
    inner: RwLock<Inner>,
}

impl SettingsStore {
    pub fn builder() -> SettingsStoreBuilder {
        SettingsStoreBuilder::new()
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Inner>, SettingsError> {
        self.inner.read().map_err(|_| SettingsError::Poisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Inner>, SettingsError> {
        self.inner.write().map_err(|_| SettingsError::Poisoned)
    }

    pub fn is_registered<T: Settings>(&self) -> bool {
        self.read()
            .map(|inner| inner.sections.contains_key(T::name()))
            .unwrap_or(false)
    }

    /// Registers a section: defaults from `T::default()`, overlaid with any delta on disk.
    pub fn register<T>(&self) -> Result<(), SettingsError>
    where
        T: Settings + Default + Serialize + DeserializeOwned,
    {
        let section = T::name();
        let defaults = to_ron_map(&T::default())?;

        let mut inner = self.write()?;
        if inner.sections.contains_key(section) {
            return Err(SettingsError::AlreadyRegistered(section));
        }
        let value = effective(&defaults, inner.deltas.get(section));
        // Delta muss zum Typ passen, sonst schlägt `get` später fehl
        from_ron_map::<T>(&value)?;

        inner.sections.insert(section, Section { defaults, value });
        debug!(section, "settings section registered");
        Ok(())
    }

    /// Registers `T` unless it already is, then returns the current value.
    pub fn register_and_get<T>(&self) -> Result<Arc<T>, SettingsError>
    where
        T: Settings + Default + Serialize + DeserializeOwned,
    {
        if !self.is_registered::<T>() {
            self.register::<T>()?;
        }
        self.get::<T>()
    }

    /// Snapshot of the effective section value.
    pub fn get<T>(&self) -> Result<Arc<T>, SettingsError>
    where
        T: Settings + DeserializeOwned,
    {
        self.try_get::<T>()?
            .ok_or(SettingsError::NotRegistered(T::name()))
    }

    /// `None` if the section is not registered.
    pub fn try_get<T>(&self) -> Result<Option<Arc<T>>, SettingsError>
    where
        T: Settings + DeserializeOwned,
    {
        let inner = self.read()?;
        inner
            .sections
            .get(T::name())
            .map(|s| from_ron_map::<T>(&s.value).map(Arc::new))
            .transpose()
    }

    /// Mutates a section and persists its delta against the defaults.
    pub fn update<T, F>(&self, mutator: F) -> Result<(), SettingsError>
    where
        T: Settings + Serialize + DeserializeOwned,
        F: FnOnce(&mut T),
    {
        let section_name = T::name();
        {
            let mut inner = self.write()?;
            let section = inner
                .sections
                .get_mut(section_name)
                .ok_or(SettingsError::NotRegistered(section_name))?;

            let mut current: T = from_ron_map(&section.value)?;
            mutator(&mut current);
            section.value = to_ron_map(&current)?;

            let delta = diff(&section.value, &section.defaults);
            if delta.is_empty() {
                inner.deltas.remove(section_name);
            } else {
                inner
                    .deltas
                    .insert(section_name.to_string(), RonValue::Map(delta));
            }
        }
        info!(section = section_name, "settings updated");
        self.persist()
    }

    /// Re-reads the file and re-merges every registered section.
    pub fn reload(&self) -> Result<(), SettingsError> {
        let deltas = read_deltas(&self.file_path)?;
        let mut inner = self.write()?;
        let Inner {
            deltas: current,
            sections,
        } = &mut *inner;
        *current = deltas;
        for (name, section) in sections.iter_mut() {
            section.value = effective(&section.defaults, current.get(*name));
        }
        info!(path = %self.file_path.display(), "settings reloaded");
        Ok(())
    }

    /// Removes deltas of unregistered sections and keys the defaults no longer have.
    pub fn prune_stale(&self) -> Result<(), SettingsError> {
        {
            let mut inner = self.write()?;
            let Inner { deltas, sections } = &mut *inner;
            let before = deltas.len();
            let pruned: Deltas = deltas
                .drain()
                .filter_map(|(name, delta)| {
                    let section = sections.get(name.as_str())?;
                    match delta {
                        RonValue::Map(map) => {
                            let kept = prune(&map, &section.defaults);
                            (!kept.is_empty()).then(|| (name, RonValue::Map(kept)))
                        }
                        other => Some((name, other)),
                    }
                })
                .collect();
            if pruned.len() != before {
                warn!(removed = before - pruned.len(), "pruned stale settings sections");
            }
            *deltas = pruned;
        }
        self.persist()
    }

    fn persist(&self) -> Result<(), SettingsError> {
        let ordered: BTreeMap<String, RonValue> = {
            let inner = self.read()?;
            inner
                .deltas
                .iter()
                .filter(|(_, v)| !matches!(v, RonValue::Map(m) if m.is_empty()))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect()
        };

        let text = ron::ser::to_string_pretty(&ordered, ron::ser::PrettyConfig::default())?;
        let tmp = self.file_path.with_extension("tmp");
        fs::write(&tmp, text)?;
        fs::rename(&tmp, &self.file_path)?;
        debug!(path = %self.file_path.display(), sections = ordered.len(), "settings persisted");
        Ok(())
    }
}
