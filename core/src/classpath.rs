use std::fmt;
use std::path::{Path, PathBuf};

#[cfg(windows)]
const PATH_SEPARATOR: &str = ";";
#[cfg(not(windows))]
const PATH_SEPARATOR: &str = ":";

/// An ordered set of compiled-artifact locations (class directories or jars).
///
/// Insertion order is preserved and a location is never stored twice, so
/// concatenating two classpaths keeps the first occurrence of each entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classpath {
    elements: Vec<PathBuf>,
}

impl Classpath {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn of<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let mut cp = Self::new();
        for p in paths {
            cp.add(p);
        }
        cp
    }

    /// Appends `path` unless it is already present.
    pub fn add(&mut self, path: impl Into<PathBuf>) {
        let path = path.into();
        if !self.elements.contains(&path) {
            self.elements.push(path);
        }
    }

    pub fn add_all(&mut self, other: &Classpath) {
        for p in &other.elements {
            self.add(p.clone());
        }
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.elements.iter().any(|p| p == path)
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.elements.iter().map(PathBuf::as_path)
    }
}

impl fmt::Display for Classpath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, p) in self.elements.iter().enumerate() {
            if i > 0 {
                f.write_str(PATH_SEPARATOR)?;
            }
            write!(f, "{}", p.display())?;
        }
        Ok(())
    }
}

impl<P: Into<PathBuf>> FromIterator<P> for Classpath {
    fn from_iter<I: IntoIterator<Item = P>>(iter: I) -> Self {
        Self::of(iter)
    }
}
