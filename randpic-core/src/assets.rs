use rand::Rng;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::category::{Category, Counts};
use crate::{BuildError, Result};

/// Source extensions picked up from a category folder, compared
/// case-insensitively.
pub const IMAGE_EXTENSIONS: [&str; 5] = ["webp", "jpg", "jpeg", "png", "gif"];

/// Every output file gets this extension. Bytes are copied as-is, so a
/// `.png` source ends up as PNG data behind a `.webp` name.
pub const OUTPUT_EXTENSION: &str = "webp";

fn has_image_extension(path: &Path) -> bool {
    match path.extension() {
        Some(ext) => {
            let ext = ext.to_string_lossy().to_ascii_lowercase();
            IMAGE_EXTENSIONS.contains(&ext.as_str())
        }
        None => false,
    }
}

/// Lists the images directly inside `dir`, sorted by file name so that a
/// seeded shuffle gives the same assignment on every filesystem.
/// Symlinked images count; a dangling link is an error.
pub fn collect_images(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).follow_links(true).min_depth(1).max_depth(1) {
        let entry = entry?;
        if !entry.path().is_file() {
            continue;
        }
        if has_image_extension(entry.path()) {
            files.push(entry.into_path());
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Unbiased in-place Fisher-Yates shuffle.
pub fn shuffle<T, R: Rng + ?Sized>(items: &mut [T], rng: &mut R) {
    let mut i = items.len();
    while i > 1 {
        i -= 1;
        let j = rng.gen_range(0..=i);
        if j != i {
            items.swap(i, j);
        }
    }
}

/// Output path of the asset with 1-based `index`.
pub fn asset_path(dest_root: &Path, category: Category, index: usize) -> PathBuf {
    dest_root
        .join(category.tag())
        .join(format!("{index}.{OUTPUT_EXTENSION}"))
}

/// Shuffles one category folder into `{dest_root}/{category}/1..=n.webp`.
///
/// A missing source folder yields zero assets. Any copy failure aborts,
/// since skipping a file would leave a gap in the numbering.
pub fn randomize_category<R: Rng + ?Sized>(
    category: Category,
    src_dir: &Path,
    dest_root: &Path,
    rng: &mut R,
) -> Result<usize> {
    if !src_dir.is_dir() {
        warn!("Source folder not found: {}", src_dir.display());
        return Ok(0);
    }

    let mut files = collect_images(src_dir)?;
    shuffle(&mut files, rng);

    let dest_dir = dest_root.join(category.tag());
    fs::create_dir_all(&dest_dir)?;

    for (i, src) in files.iter().enumerate() {
        let dest = asset_path(dest_root, category, i + 1);
        fs::copy(src, &dest).map_err(|source| BuildError::Copy {
            from: src.clone(),
            to: dest.clone(),
            source,
        })?;
    }

    info!("Processed {category}: {} images.", files.len());
    Ok(files.len())
}

/// Randomizes every `(category, source folder)` pair into `dest_root`.
///
/// `dest_root` is removed and recreated first; anything already in it is
/// lost.
pub fn randomize_assets<R: Rng + ?Sized>(
    sources: &[(Category, PathBuf)],
    dest_root: &Path,
    rng: &mut R,
) -> Result<Counts> {
    crate::recreate_dir(dest_root)?;

    let mut counts = Counts::new();
    for (category, src_dir) in sources {
        let n = randomize_category(*category, src_dir, dest_root, rng)?;
        counts.set(*category, n);
    }
    Ok(counts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::BTreeSet;

    fn write_files(dir: &Path, files: &[(&str, &[u8])]) {
        fs::create_dir_all(dir).unwrap();
        for (name, data) in files {
            fs::write(dir.join(name), data).unwrap();
        }
    }

    #[test]
    fn shuffle_is_a_permutation() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut items: Vec<u32> = (0..50).collect();
        shuffle(&mut items, &mut rng);
        let mut sorted = items.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn shuffle_handles_tiny_inputs() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut empty: Vec<u8> = Vec::new();
        shuffle(&mut empty, &mut rng);
        let mut one = vec![9];
        shuffle(&mut one, &mut rng);
        assert_eq!(one, vec![9]);
    }

    #[test]
    fn shuffle_reaches_every_ordering() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut seen = BTreeSet::new();
        for _ in 0..600 {
            let mut items = [1, 2, 3];
            shuffle(&mut items, &mut rng);
            seen.insert(items);
        }
        assert_eq!(seen.len(), 6);
    }

    #[test]
    fn collect_filters_extensions_case_insensitively() {
        let dir = tempfile::tempdir().unwrap();
        write_files(
            dir.path(),
            &[
                ("a.JPG", b"a"),
                ("b.png", b"b"),
                ("c.WebP", b"c"),
                ("notes.txt", b"n"),
                ("noext", b"x"),
            ],
        );
        fs::create_dir(dir.path().join("nested.png")).unwrap();

        let names: Vec<String> = collect_images(dir.path())
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.JPG", "b.png", "c.WebP"]);
    }

    #[test]
    fn missing_source_folder_counts_as_zero() {
        let dest = tempfile::tempdir().unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        let n = randomize_category(
            Category::Vertical,
            &dest.path().join("does-not-exist"),
            dest.path(),
            &mut rng,
        )
        .unwrap();
        assert_eq!(n, 0);
        assert!(!dest.path().join("v").exists());
    }

    #[test]
    fn category_output_is_contiguous_and_preserves_bytes() {
        let src = tempfile::tempdir().unwrap();
        let dest = tempfile::tempdir().unwrap();
        write_files(
            src.path(),
            &[("a.jpg", b"alpha"), ("b.png", b"bravo"), ("c.webp", b"charlie")],
        );

        let mut rng = StdRng::seed_from_u64(11);
        let n = randomize_category(Category::Horizontal, src.path(), dest.path(), &mut rng).unwrap();
        assert_eq!(n, 3);

        let mut contents = BTreeSet::new();
        for i in 1..=3 {
            let data = fs::read(asset_path(dest.path(), Category::Horizontal, i)).unwrap();
            contents.insert(data);
        }
        let expected: BTreeSet<Vec<u8>> =
            [b"alpha".to_vec(), b"bravo".to_vec(), b"charlie".to_vec()].into_iter().collect();
        assert_eq!(contents, expected);
        assert!(!asset_path(dest.path(), Category::Horizontal, 4).exists());
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_images_are_copied() {
        let src = tempfile::tempdir().unwrap();
        let outside = tempfile::tempdir().unwrap();
        let dest = tempfile::tempdir().unwrap();
        write_files(src.path(), &[("a.jpg", b"alpha")]);
        write_files(outside.path(), &[("real.png", b"linked")]);
        std::os::unix::fs::symlink(outside.path().join("real.png"), src.path().join("b.png"))
            .unwrap();

        assert_eq!(collect_images(src.path()).unwrap().len(), 2);

        let mut rng = StdRng::seed_from_u64(4);
        let n = randomize_category(Category::Horizontal, src.path(), dest.path(), &mut rng).unwrap();
        assert_eq!(n, 2);
        let contents: BTreeSet<Vec<u8>> = (1..=2)
            .map(|i| fs::read(asset_path(dest.path(), Category::Horizontal, i)).unwrap())
            .collect();
        assert!(contents.contains(&b"linked".to_vec()));
    }

    #[cfg(unix)]
    #[test]
    fn dangling_symlink_fails_the_scan() {
        let src = tempfile::tempdir().unwrap();
        std::os::unix::fs::symlink(src.path().join("gone.png"), src.path().join("b.png")).unwrap();
        assert!(collect_images(src.path()).is_err());
    }

    #[test]
    fn copy_failure_aborts_with_paths() {
        let src = tempfile::tempdir().unwrap();
        let dest = tempfile::tempdir().unwrap();
        write_files(src.path(), &[("a.jpg", b"alpha")]);
        // A directory where the renamed file must go makes the copy fail.
        fs::create_dir_all(asset_path(dest.path(), Category::Horizontal, 1)).unwrap();

        let mut rng = StdRng::seed_from_u64(9);
        let err = randomize_category(Category::Horizontal, src.path(), dest.path(), &mut rng)
            .unwrap_err();
        match err {
            BuildError::Copy { from, to, .. } => {
                assert_eq!(from, src.path().join("a.jpg"));
                assert_eq!(to, asset_path(dest.path(), Category::Horizontal, 1));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn same_seed_gives_same_assignment() {
        let src = tempfile::tempdir().unwrap();
        let files: Vec<(String, Vec<u8>)> =
            (0..10).map(|i| (format!("{i}.png"), vec![i as u8])).collect();
        for (name, data) in &files {
            fs::write(src.path().join(name), data).unwrap();
        }

        let run = |seed| {
            let dest = tempfile::tempdir().unwrap();
            let mut rng = StdRng::seed_from_u64(seed);
            randomize_category(Category::Horizontal, src.path(), dest.path(), &mut rng).unwrap();
            (1..=10)
                .map(|i| fs::read(asset_path(dest.path(), Category::Horizontal, i)).unwrap())
                .collect::<Vec<_>>()
        };
        assert_eq!(run(5), run(5));
    }

    #[test]
    fn randomize_assets_clears_previous_output() {
        let src = tempfile::tempdir().unwrap();
        let dest = tempfile::tempdir().unwrap();
        let out = dest.path().join("ri");
        write_files(&out.join("h"), &[("99.webp", b"stale")]);
        write_files(&src.path().join("h"), &[("x.gif", b"x")]);

        let mut rng = StdRng::seed_from_u64(0);
        let counts = randomize_assets(
            &[
                (Category::Horizontal, src.path().join("h")),
                (Category::Vertical, src.path().join("v")),
            ],
            &out,
            &mut rng,
        )
        .unwrap();

        assert_eq!(counts.get(Category::Horizontal), 1);
        assert_eq!(counts.get(Category::Vertical), 0);
        assert!(!out.join("h").join("99.webp").exists());
        assert_eq!(fs::read(out.join("h").join("1.webp")).unwrap(), b"x");
    }
}
