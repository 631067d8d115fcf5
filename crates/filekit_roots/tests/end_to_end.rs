use std::io::BufRead;
use std::sync::Arc;

use filekit_fs::{Capability, FileHandle, MemoryAssets};
use filekit_roots::{DirContext, Roots, CACHE};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn fixture() -> anyhow::Result<(TempDir, Roots)> {
    let dir = tempfile::tempdir()?;
    let context = DirContext::default()
        .data_dir(dir.path().join("data"))
        .external_dir(dir.path().join("external"))
        .removable_dir(dir.path().join("sdcard"))
        .with_assets(Arc::new(
            MemoryAssets::new()
                .with("data.txt", "assets")
                .with("shader/fragment.shader", "void main() {}\n")
                .with("shader/vertex.shader", "void main() {}\n"),
        ));
    let roots = Roots::init(&context, "X")?;
    Ok((dir, roots))
}

#[test]
fn test_write_and_inspect_internal_file() -> anyhow::Result<()> {
    let (_dir, roots) = fixture()?;
    let greet = roots.internal("greet.txt");

    greet.write_string("hello", false)?;

    assert!(greet.exists());
    assert_eq!(greet.read_string(None)?, "hello");
    assert_eq!(greet.length(), 5);
    assert_eq!(greet.formatted_size(), "5.00B");
    assert_eq!(greet.extension(), "txt");
    assert_eq!(greet.name_without_extension(), "greet");
    assert_eq!(greet.parent().path(), roots.internal_base().trim_end_matches('/'));
    Ok(())
}

#[test]
fn test_copy_assets_to_external_cache() -> anyhow::Result<()> {
    let (_dir, roots) = fixture()?;
    let cache = roots.external(CACHE);
    let shaders = roots.asset("shader");

    assert_eq!(shaders.capability(), Capability::ReadOnly);
    let copied = shaders.copy_to(&cache)?;

    assert_eq!(copied, cache);
    let mut names = cache.child("shader").list_paths();
    names.sort();
    assert_eq!(names, vec!["fragment.shader", "vertex.shader"]);
    assert_eq!(cache.length(), 30);
    assert!(roots.asset("shader").write_string("x", false).unwrap_err().is_capability());
    Ok(())
}

#[test]
fn test_move_between_roots() -> anyhow::Result<()> {
    let (_dir, roots) = fixture()?;
    let draft = roots.internal_in("drafts", "note.md");
    draft.write_line("first")?.write_line("second")?;

    let published = roots.removable_in("notes", "note.md");
    let moved = draft.move_to(&published)?;

    assert_eq!(moved, published);
    assert!(!draft.exists());
    let lines = published.reader_buffered(64, None)?.lines().count();
    assert_eq!(lines, 2);

    let top = roots.removable_top("X");
    assert!(top.is_directory());
    assert_eq!(top.list_paths(), vec!["notes"]);
    Ok(())
}

#[test]
fn test_absolute_handles_bypass_roots() -> anyhow::Result<()> {
    let (dir, roots) = fixture()?;
    let path = dir.path().join("outside.bin");

    let handle = roots.absolute(&path.to_string_lossy());
    handle.write_bytes(&[0, 1, 2, 3], false)?;

    assert_eq!(handle, FileHandle::new(path.to_string_lossy()));
    assert_eq!(handle.read_bytes()?, vec![0, 1, 2, 3]);
    Ok(())
}
