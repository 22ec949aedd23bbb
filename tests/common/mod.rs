#![allow(dead_code)]

use std::io::Write;
use std::path::Path;

pub fn write_jar(path: &Path, entries: &[&str]) -> anyhow::Result<()> {
    use zip::write::FileOptions;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::File::create(path)?;
    let mut zip = zip::ZipWriter::new(file);
    let options = FileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    for name in entries {
        if name.ends_with('/') {
            zip.add_directory(*name, options)?;
            continue;
        }
        zip.start_file(*name, options)?;
        zip.write_all(b"\xca\xfe\xba\xbe")?;
    }
    zip.finish()?;
    Ok(())
}

/// `lib/a.jar` holds `com.x.A` and `com.x.B`; `lib/b.jar` holds `com.x.A` and `com.y.C`.
pub fn write_fixture_tree(root: &Path) -> anyhow::Result<()> {
    write_jar(
        &root.join("lib/a.jar"),
        &[
            "META-INF/MANIFEST.MF",
            "com/",
            "com/x/",
            "com/x/A.class",
            "com/x/B.class",
            "com/x/package-info.class",
        ],
    )?;
    write_jar(
        &root.join("lib/b.jar"),
        &["com/x/A.class", "com/y/C.class", "com/y/messages.properties"],
    )?;
    std::fs::write(root.join("lib/readme.txt"), "not a jar")?;
    Ok(())
}
