use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::category::Category;
use crate::manifest::RuntimeConfig;
use crate::Result;

pub const INDEX_FILE: &str = "index.html";
pub const GALLERY_FILE: &str = "gallery.html";
pub const LIB_DIR: &str = "lib";

/// Third-party scripts the gallery loads from `lib/`: (path under
/// `node_modules`, file name in `lib/`).
pub const VENDOR_LIBS: [(&str, &str); 3] = [
    ("masonry-layout/dist/masonry.pkgd.min.js", "masonry.pkgd.min.js"),
    ("imagesloaded/imagesloaded.pkgd.min.js", "imagesloaded.pkgd.min.js"),
    ("lozad/dist/lozad.min.js", "lozad.min.js"),
];

fn escape_attr(value: &str) -> String {
    v_htmlescape::escape(value).to_string()
}

/// Copies the project's own `index.html` when it has content, otherwise
/// writes the demo page.
pub fn write_index(root: &Path, dist: &Path) -> Result<PathBuf> {
    let src = root.join(INDEX_FILE);
    let dest = dist.join(INDEX_FILE);

    let has_content = fs::metadata(&src).map(|m| m.is_file() && m.len() > 0).unwrap_or(false);
    if has_content {
        fs::copy(&src, &dest)?;
        info!("Copied {INDEX_FILE} to {}", dist.display());
    } else {
        fs::write(&dest, DEMO_HTML)?;
        info!("Created demo {INDEX_FILE} in {}", dist.display());
    }
    Ok(dest)
}

/// Copies whichever gallery libraries are installed. Missing or unreadable
/// ones only produce a warning; the gallery page still gets written.
pub fn copy_vendor_libs(root: &Path, dist: &Path) -> Result<Vec<PathBuf>> {
    let lib_dir = dist.join(LIB_DIR);
    fs::create_dir_all(&lib_dir)?;

    let node_modules = root.join("node_modules");
    let mut copied = Vec::new();
    for (src, name) in VENDOR_LIBS {
        let src = node_modules.join(src);
        if !src.is_file() {
            warn!("Gallery library not found: {} (run npm install)", src.display());
            continue;
        }
        let dest = lib_dir.join(name);
        match fs::copy(&src, &dest) {
            Ok(_) => copied.push(dest),
            Err(e) => warn!("Could not copy {}: {e}", src.display()),
        }
    }
    Ok(copied)
}

pub fn render_gallery(config: &RuntimeConfig) -> String {
    let mut nav = String::from(
        r#"<button class="filter-btn active" onclick="filterGallery(event, 'all')">All</button>"#,
    );
    let mut sections = String::new();

    for category in Category::ALL {
        let count = config.count(category);
        if count == 0 {
            continue;
        }
        let tag = category.tag();

        nav.push_str(&format!(
            r#"<button class="filter-btn" onclick="filterGallery(event, '{tag}')">{}</button>"#,
            tag.to_ascii_uppercase()
        ));

        let mut items = String::new();
        for i in 1..=count {
            let url = escape_attr(&config.gallery_url_for(category, i));
            items.push_str(&format!(
                "                <div class=\"grid-item\"><img class=\"lozad\" data-src=\"{url}\" alt=\"{tag}-{i}\"></div>\n"
            ));
        }

        sections.push_str(&format!(
            r#"
        <section id="section-{tag}" class="gallery-section">
            <h2>Folder: {tag}</h2>
            <div class="grid" id="grid-{tag}">
                <div class="grid-sizer"></div>
{items}            </div>
        </section>
"#
        ));
    }

    GALLERY_TEMPLATE
        .replace("__NAV_BUTTONS__", &nav)
        .replace("__SECTIONS__", &sections)
}

pub fn write_gallery(root: &Path, dist: &Path, config: &RuntimeConfig) -> Result<Vec<PathBuf>> {
    let mut written = copy_vendor_libs(root, dist)?;
    let path = dist.join(GALLERY_FILE);
    fs::write(&path, render_gallery(config))?;
    info!("Created {GALLERY_FILE} in {}", dist.display());
    written.push(path);
    Ok(written)
}

const DEMO_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Static Random Pic API Demo</title>
    <style>
        body { font-family: sans-serif; max-width: 800px; margin: 20px auto; padding: 20px; }
        .card { border: 1px solid #ccc; padding: 20px; margin-bottom: 20px; border-radius: 8px; }
        img { max-width: 100%; height: auto; border-radius: 4px; display: block; background: #eee; min-height: 200px; }
        .btn { display: inline-block; padding: 10px 20px; background: #007bff; color: white; text-decoration: none; border-radius: 4px; border: 0; cursor: pointer; }
        .bg-box { width: 100%; height: 200px; background-size: cover; background-position: center; border-radius: 4px; border: 1px dashed #999; display: flex; align-items: center; justify-content: center; color: white; text-shadow: 0 1px 3px rgba(0,0,0,0.8); font-weight: bold; }
    </style>
</head>
<body>
    <h1>Static Random Pic API (Client-Side)</h1>
    <p>
        This is a static implementation. Images are randomized at build time.
        <a href="gallery.html" class="btn" style="float: right;">View Gallery</a>
    </p>

    <div class="card">
        <h2>Horizontal Image</h2>
        <p>Using <code>&lt;img alt="random:h"&gt;</code>:</p>
        <img alt="random:h" title="Random Horizontal Image" />
        <br>

        <p>Background Image (<code>data-random-bg="h"</code>):</p>
        <div class="bg-box" data-random-bg="h">
            Background Image
        </div>
    </div>

    <div class="card">
        <h2>Vertical Image</h2>
        <p>Using <code>&lt;img alt="random:v"&gt;</code>:</p>
        <img alt="random:v" style="max-height: 400px;" title="Random Vertical Image" />
    </div>

    <div class="card">
        <button class="btn" onclick="refreshRandomBackground()">Refresh background</button>
    </div>

    <script src="random.js"></script>
</body>
</html>
"##;

const GALLERY_TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Gallery - Static Random Pic API</title>
    <style>
        body {
            font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, "Helvetica Neue", Arial, sans-serif;
            margin: 0;
            padding: 20px;
            background-color: #f0f2f5;
        }
        h1 { text-align: center; color: #333; margin-bottom: 20px; }

        .filter-nav { text-align: center; margin-bottom: 30px; }
        .filter-btn {
            background: #fff; border: 1px solid #ddd; padding: 8px 16px; margin: 0 5px;
            border-radius: 20px; cursor: pointer; transition: all 0.2s; font-size: 14px;
            color: #555;
        }
        .filter-btn:hover { background: #f8f9fa; border-color: #ccc; }
        .filter-btn.active { background: #007bff; color: white; border-color: #007bff; }

        h2 { border-bottom: 2px solid #ddd; padding-bottom: 10px; margin-top: 40px; color: #555; text-transform: uppercase; font-size: 1.2rem; }

        .grid { margin: 0 auto; }
        .grid-sizer, .grid-item { width: 23%; margin-bottom: 10px; }
        .grid-item {
            float: left;
            border-radius: 4px;
            overflow: hidden;
            box-shadow: 0 1px 3px rgba(0,0,0,0.1);
            min-height: 150px;
            background-color: #eee;
            transition: background-color 0.3s;
        }
        .grid-item.content-loaded { min-height: 0; background-color: #fff; }
        .grid-item img { display: block; width: 100%; height: auto; opacity: 0; transition: opacity 0.4s; }
        .grid-item img[data-loaded="true"] { opacity: 1; }

        @media (max-width: 1200px) { .grid-sizer, .grid-item { width: 31%; } }
        @media (max-width: 800px) { .grid-sizer, .grid-item { width: 48%; } }
        @media (max-width: 500px) { .grid-sizer, .grid-item { width: 100%; } }
    </style>
</head>
<body>
    <h1>Static Image Gallery</h1>

    <div class="filter-nav">
        __NAV_BUTTONS__
    </div>
__SECTIONS__
    <script src="lib/masonry.pkgd.min.js"></script>
    <script src="lib/imagesloaded.pkgd.min.js"></script>
    <script src="lib/lozad.min.js"></script>
    <script>
        var masonryInstances = [];

        function relayout() {
            masonryInstances.forEach(function(msnry) { msnry.layout(); });
        }

        document.addEventListener('DOMContentLoaded', function() {
            document.querySelectorAll('.grid').forEach(function(grid) {
                masonryInstances.push(new Masonry(grid, {
                    itemSelector: '.grid-item',
                    columnWidth: '.grid-sizer',
                    percentPosition: true,
                    gutter: 15
                }));
            });

            var observer = lozad('.lozad', {
                rootMargin: '200px 0px',
                threshold: 0,
                loaded: function(el) {
                    var onImgLoad = function() {
                        el.setAttribute('data-loaded', true);
                        el.closest('.grid-item').classList.add('content-loaded');
                        relayout();
                    };
                    if (el.complete && el.naturalHeight !== 0) {
                        onImgLoad();
                    } else {
                        el.onload = onImgLoad;
                    }
                }
            });
            observer.observe();

            setTimeout(relayout, 100);
        });

        function filterGallery(event, type) {
            document.querySelectorAll('.filter-btn').forEach(function(btn) { btn.classList.remove('active'); });
            event.target.classList.add('active');

            document.querySelectorAll('.gallery-section').forEach(function(sec) {
                sec.style.display = (type === 'all' || sec.id === 'section-' + type) ? 'block' : 'none';
            });

            setTimeout(relayout, 10);
        }
    </script>
</body>
</html>
"##;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::Counts;

    fn config(h: usize, v: usize, domain: &str) -> RuntimeConfig {
        let counts: Counts = [(Category::Horizontal, h), (Category::Vertical, v)]
            .into_iter()
            .collect();
        RuntimeConfig::new(counts, domain)
    }

    fn data_src(url: &str) -> String {
        format!("data-src=\"{}\"", escape_attr(url))
    }

    #[test]
    fn gallery_lists_every_image() {
        let html = render_gallery(&config(3, 2, "https://pic.example/"));
        assert_eq!(html.matches("class=\"grid-item\"").count(), 5);
        assert!(html.contains(&format!(
            "{} alt=\"h-3\"",
            data_src("https://pic.example/ri/h/3.webp")
        )));
        assert!(html.contains(&data_src("https://pic.example/ri/v/2.webp")));
        assert!(!html.contains(&data_src("https://pic.example/ri/v/3.webp")));
        assert!(html.contains("filterGallery(event, 'v')\">V</button>"));
    }

    #[test]
    fn gallery_skips_empty_categories_and_uses_relative_urls() {
        let html = render_gallery(&config(0, 1, ""));
        assert!(!html.contains("section-h"));
        assert!(html.contains(&data_src("./ri/v/1.webp")));
        assert!(!html.contains("__SECTIONS__"));
        assert!(!html.contains("__NAV_BUTTONS__"));
    }

    #[test]
    fn urls_are_attribute_escaped() {
        let html = render_gallery(&config(1, 0, "https://x.example/a\"b"));
        assert!(html.contains("a&quot;b"));
        assert!(!html.contains("a\"b"));
    }

    #[test]
    fn empty_index_is_replaced_by_demo() {
        let root = tempfile::tempdir().unwrap();
        let dist = tempfile::tempdir().unwrap();
        fs::write(root.path().join(INDEX_FILE), "").unwrap();

        let path = write_index(root.path(), dist.path()).unwrap();
        let html = fs::read_to_string(path).unwrap();
        assert!(html.contains(r#"<script src="random.js"></script>"#));
        assert!(html.contains(r#"alt="random:h""#));
    }

    #[test]
    fn project_index_is_copied_verbatim() {
        let root = tempfile::tempdir().unwrap();
        let dist = tempfile::tempdir().unwrap();
        fs::write(root.path().join(INDEX_FILE), "<p>mine</p>").unwrap();

        write_index(root.path(), dist.path()).unwrap();
        assert_eq!(fs::read_to_string(dist.path().join(INDEX_FILE)).unwrap(), "<p>mine</p>");
    }

    #[test]
    fn installed_libraries_are_copied() {
        let root = tempfile::tempdir().unwrap();
        let dist = tempfile::tempdir().unwrap();
        let lozad = root.path().join("node_modules/lozad/dist");
        fs::create_dir_all(&lozad).unwrap();
        fs::write(lozad.join("lozad.min.js"), "/* lozad */").unwrap();

        let copied = copy_vendor_libs(root.path(), dist.path()).unwrap();
        assert_eq!(copied, vec![dist.path().join(LIB_DIR).join("lozad.min.js")]);
    }
}
