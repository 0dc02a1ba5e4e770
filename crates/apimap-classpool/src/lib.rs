#![forbid(unsafe_code)]

//! The class pool: a set of artifact locations (class directories and
//! archives) indexed up front so classes can be listed deterministically
//! and read on demand. Archives are reopened per read; no handles survive
//! a call.

use std::collections::{BTreeSet, HashMap};
use std::ffi::OsStr;
use std::io::Read;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum PoolError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("location does not exist: {0}")]
    InvalidLocation(PathBuf),
    #[error("class not found in pool: {0}")]
    ClassNotFound(String),
}

/// Whether a location is scanned for REST roots or only serves lookups.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Scope {
    Project,
    Dependency,
}

#[derive(Debug)]
enum LocationKind {
    ClassDir,
    Archive,
}

#[derive(Debug)]
struct Location {
    path: PathBuf,
    kind: LocationKind,
}

#[derive(Debug, Clone, Copy)]
struct ClassRef {
    location: usize,
}

#[derive(Debug, Default)]
pub struct ClassPool {
    locations: Vec<Location>,
    /// binary name → archive/dir entry, first registration wins.
    classes: HashMap<String, ClassRef>,
    /// entry path inside the owning location, e.g. `a/b/C.class` (jmod
    /// `classes/` prefix retained here, stripped in the binary name).
    entries: HashMap<String, String>,
    project_names: BTreeSet<String>,
    all_names: BTreeSet<String>,
    packages: BTreeSet<String>,
}

impl ClassPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a project artifact: scanned for REST roots and readable.
    pub fn add_project(&mut self, path: &Path) -> Result<(), PoolError> {
        self.add(path, Scope::Project)
    }

    /// Register a dependency artifact: readable for supertype and
    /// call-target resolution, never scanned for roots.
    pub fn add_dependency(&mut self, path: &Path) -> Result<(), PoolError> {
        self.add(path, Scope::Dependency)
    }

    pub fn add(&mut self, path: &Path, scope: Scope) -> Result<(), PoolError> {
        if !path.exists() {
            return Err(PoolError::InvalidLocation(path.to_path_buf()));
        }
        let index = self.locations.len();
        if path.is_dir() {
            self.locations.push(Location {
                path: path.to_path_buf(),
                kind: LocationKind::ClassDir,
            });
            self.index_dir(index, path, scope)?;
        } else {
            self.locations.push(Location {
                path: path.to_path_buf(),
                kind: LocationKind::Archive,
            });
            self.index_archive(index, path, scope)?;
        }
        Ok(())
    }

    /// Register the host JDK so supertype resolution can see platform and
    /// framework-shipped interfaces. Best-effort: returns the number of
    /// locations added, zero when no JDK is discoverable.
    pub fn add_platform_library(&mut self) -> usize {
        let Some(java_home) = std::env::var_os("JAVA_HOME").map(PathBuf::from) else {
            debug!("JAVA_HOME not set; platform classes unavailable");
            return 0;
        };

        let mut added = 0;
        let jmods = java_home.join("jmods");
        if jmods.is_dir() {
            let mut paths: Vec<PathBuf> = match std::fs::read_dir(&jmods) {
                Ok(entries) => entries
                    .filter_map(|e| e.ok())
                    .map(|e| e.path())
                    .filter(|p| p.extension() == Some(OsStr::new("jmod")))
                    .collect(),
                Err(_) => Vec::new(),
            };
            paths.sort();
            for path in paths {
                if self.add_dependency(&path).is_ok() {
                    added += 1;
                }
            }
            return added;
        }

        for legacy in ["jre/lib/rt.jar", "lib/rt.jar"] {
            let rt = java_home.join(legacy);
            if rt.is_file() && self.add_dependency(&rt).is_ok() {
                return 1;
            }
        }
        debug!(path = %java_home.display(), "no platform class library under JAVA_HOME");
        0
    }

    /// Sorted binary names of classes in project scope.
    pub fn class_names(&self) -> impl Iterator<Item = &str> {
        self.project_names.iter().map(String::as_str)
    }

    /// Sorted binary names across both scopes.
    pub fn all_class_names(&self) -> impl Iterator<Item = &str> {
        self.all_names.iter().map(String::as_str)
    }

    /// Sorted package names (each prefix of every class's package).
    pub fn package_names(&self) -> impl Iterator<Item = &str> {
        self.packages.iter().map(String::as_str)
    }

    pub fn contains(&self, binary_name: &str) -> bool {
        self.classes.contains_key(binary_name)
    }

    /// Whether the class came from a project-scope location.
    pub fn is_project_class(&self, binary_name: &str) -> bool {
        self.project_names.contains(binary_name)
    }

    /// Raw class-file bytes for a binary name; first-hit-wins across
    /// locations in registration order.
    pub fn read_class(&self, binary_name: &str) -> Result<Vec<u8>, PoolError> {
        let class_ref = self
            .classes
            .get(binary_name)
            .ok_or_else(|| PoolError::ClassNotFound(binary_name.to_string()))?;
        let entry = &self.entries[binary_name];
        let location = &self.locations[class_ref.location];
        match location.kind {
            LocationKind::ClassDir => Ok(std::fs::read(location.path.join(entry))?),
            LocationKind::Archive => {
                let file = std::fs::File::open(&location.path)?;
                let mut archive = zip::ZipArchive::new(file)?;
                let mut zipped = archive.by_name(entry)?;
                let mut bytes = Vec::with_capacity(zipped.size() as usize);
                zipped.read_to_end(&mut bytes)?;
                Ok(bytes)
            }
        }
    }

    fn index_dir(&mut self, location: usize, dir: &Path, scope: Scope) -> Result<(), PoolError> {
        let mut entries: Vec<String> = Vec::new();
        for entry in walkdir::WalkDir::new(dir)
            .follow_links(false)
            .into_iter()
            .filter_map(Result::ok)
        {
            if !entry.file_type().is_file() {
                continue;
            }
            if entry.path().extension() != Some(OsStr::new("class")) {
                continue;
            }
            let rel = entry
                .path()
                .strip_prefix(dir)
                .unwrap_or(entry.path())
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect::<Vec<_>>()
                .join("/");
            entries.push(rel);
        }
        entries.sort();
        for entry in entries {
            self.register(location, &entry, scope);
        }
        Ok(())
    }

    fn index_archive(&mut self, location: usize, path: &Path, scope: Scope) -> Result<(), PoolError> {
        let file = std::fs::File::open(path)?;
        let archive = zip::ZipArchive::new(file)?;
        let mut names: Vec<String> = archive
            .file_names()
            .filter(|name| name.ends_with(".class"))
            .map(str::to_string)
            .collect();
        names.sort();
        for name in names {
            self.register(location, &name, scope);
        }
        Ok(())
    }

    fn register(&mut self, location: usize, entry: &str, scope: Scope) {
        // `.jmod` archives keep their classes under a `classes/` prefix.
        let internal = entry
            .strip_suffix(".class")
            .map(|e| e.strip_prefix("classes/").unwrap_or(e))
            .unwrap_or(entry);
        if is_ignored_class(internal) {
            return;
        }
        let binary = internal.replace('/', ".");

        if let Some((package, _)) = binary.rsplit_once('.') {
            let mut prefix = String::new();
            for segment in package.split('.') {
                if !prefix.is_empty() {
                    prefix.push('.');
                }
                prefix.push_str(segment);
                self.packages.insert(prefix.clone());
            }
        }

        if scope == Scope::Project {
            self.project_names.insert(binary.clone());
        }
        self.all_names.insert(binary.clone());

        // First registration wins; later locations never shadow earlier ones.
        if !self.classes.contains_key(&binary) {
            self.entries.insert(binary.clone(), entry.to_string());
            self.classes.insert(binary, ClassRef { location });
        }
    }
}

fn is_ignored_class(internal_name: &str) -> bool {
    internal_name == "module-info"
        || internal_name == "package-info"
        || internal_name.ends_with("/package-info")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_class(dir: &Path, rel: &str) {
        let path = dir.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, b"\xCA\xFE\xBA\xBE").unwrap();
    }

    fn write_jar(path: &Path, entries: &[(&str, &[u8])]) {
        let file = std::fs::File::create(path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        let options = zip::write::FileOptions::default();
        for (name, bytes) in entries {
            writer.start_file(*name, options).unwrap();
            writer.write_all(bytes).unwrap();
        }
        writer.finish().unwrap();
    }

    #[test]
    fn missing_location_is_rejected() {
        let mut pool = ClassPool::new();
        let err = pool.add_project(Path::new("/does/not/exist")).unwrap_err();
        assert!(matches!(err, PoolError::InvalidLocation(_)));
    }

    #[test]
    fn dir_enumeration_is_sorted_and_packages_registered() {
        let tmp = tempfile::tempdir().unwrap();
        write_class(tmp.path(), "com/example/b/Second.class");
        write_class(tmp.path(), "com/example/a/First.class");
        write_class(tmp.path(), "com/example/package-info.class");

        let mut pool = ClassPool::new();
        pool.add_project(tmp.path()).unwrap();

        let names: Vec<&str> = pool.class_names().collect();
        assert_eq!(names, vec!["com.example.a.First", "com.example.b.Second"]);
        let packages: Vec<&str> = pool.package_names().collect();
        assert_eq!(
            packages,
            vec!["com", "com.example", "com.example.a", "com.example.b"]
        );
    }

    #[test]
    fn archive_read_and_first_hit_wins() {
        let tmp = tempfile::tempdir().unwrap();
        let first = tmp.path().join("first.jar");
        let second = tmp.path().join("second.jar");
        write_jar(&first, &[("pkg/Dup.class", b"from-first")]);
        write_jar(&second, &[("pkg/Dup.class", b"from-second"), ("pkg/Only.class", b"only")]);

        let mut pool = ClassPool::new();
        pool.add_project(&first).unwrap();
        pool.add_project(&second).unwrap();

        assert_eq!(pool.read_class("pkg.Dup").unwrap(), b"from-first");
        assert_eq!(pool.read_class("pkg.Only").unwrap(), b"only");
        assert!(matches!(
            pool.read_class("pkg.Missing").unwrap_err(),
            PoolError::ClassNotFound(_)
        ));
    }

    #[test]
    fn dependency_scope_is_not_listed_as_project() {
        let tmp = tempfile::tempdir().unwrap();
        write_class(tmp.path(), "dep/Helper.class");

        let mut pool = ClassPool::new();
        pool.add_dependency(tmp.path()).unwrap();

        assert_eq!(pool.class_names().count(), 0);
        let all: Vec<&str> = pool.all_class_names().collect();
        assert_eq!(all, vec!["dep.Helper"]);
        assert!(pool.contains("dep.Helper"));
    }
}
