use memmap2::Mmap;
use std::fs::File;
use std::io::Cursor;
use std::path::Path;
use zip::ZipArchive;

use crate::error::CatalogError;

/// Lists the dotted class names of every concrete `.class` entry in a jar.
///
/// Directory entries, non-class resources and `package-info.class` files are skipped.
/// Inner classes keep their `$` name (`a.Outer$Inner`).
pub fn catalog(jar_path: &Path) -> Result<Vec<String>, CatalogError> {
    let file = File::open(jar_path).map_err(|source| CatalogError::Open {
        path: jar_path.to_path_buf(),
        source,
    })?;
    // SAFETY: The file is opened read-only and remains valid for the lifetime of the mmap.
    // The mmap is dropped before the file, ensuring memory safety.
    let mmap = unsafe { Mmap::map(&file) }.map_err(|source| CatalogError::Open {
        path: jar_path.to_path_buf(),
        source,
    })?;
    let zip_err = |source| CatalogError::Zip {
        path: jar_path.to_path_buf(),
        source,
    };
    let mut archive = ZipArchive::new(Cursor::new(&mmap[..])).map_err(zip_err)?;

    let mut classes = Vec::new();
    for i in 0..archive.len() {
        let entry = archive.by_index(i).map_err(zip_err)?;
        if entry.is_dir() {
            continue;
        }
        if let Some(class_name) = entry_class_name(entry.name()) {
            classes.push(class_name);
        }
    }
    Ok(classes)
}

/// `org/example/A.class` -> `org.example.A`.
pub fn entry_class_name(entry_name: &str) -> Option<String> {
    if entry_name.ends_with("package-info.class") {
        return None;
    }
    let stem = entry_name.strip_suffix(".class")?;
    Some(stem.replace('/', "."))
}
