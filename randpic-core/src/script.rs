use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::manifest::RuntimeConfig;
use crate::Result;

pub const SCRIPT_FILE: &str = "random.js";

const CONFIG_PLACEHOLDER: &str = "__RANDPIC_CONFIG__";

// Browser counterpart of `crate::runtime`. Keep the two in step.
const SCRIPT_TEMPLATE: &str = r##"/**
 * Static Random Pic API
 * Generated at build time, do not edit.
 */
(function() {
    var config = __RANDPIC_CONFIG__;
    var counts = config.counts;
    var domain = config.domain;

    var DISABLED_KEY = 'theme-bg-disabled';
    var CONTAINER_ID = 'bg-box';
    var THEME_CLASS = 'wp-theme-zibll';
    var MARKER_ATTRIBUTE = 'data-random-bg';
    var LOADED_CLASS = 'loaded';
    var MOBILE_UA = /android|ipad|iphone|ipod|windows phone|iemobile|blackberry|mobile/i;

    function readDisabled() {
        try {
            return localStorage.getItem(DISABLED_KEY) === 'true';
        } catch (e) {
            return false;
        }
    }

    var backgroundDisabled = readDisabled();
    var backgroundUrl = null;
    var session = {};
    // Bumped on every apply/refresh; probes from older generations are ignored.
    var generation = 0;

    function hasCategory(type) {
        return Object.prototype.hasOwnProperty.call(counts, type);
    }

    function isMobile() {
        var ua = navigator.userAgent || navigator.vendor || window.opera || '';
        return MOBILE_UA.test(ua);
    }

    function pick(type) {
        if (!hasCategory(type) || !counts[type]) return '';
        if (session[type]) return session[type];

        var num = Math.floor(Math.random() * counts[type]) + 1;
        var url = domain + '/ri/' + type + '/' + num + '.webp';
        session[type] = url;
        return url;
    }

    function pickByDevice() {
        return pick(isMobile() ? 'v' : 'h');
    }

    function background() {
        if (backgroundUrl) return backgroundUrl;
        var url = pickByDevice();
        if (url) backgroundUrl = url;
        return url;
    }

    function probe(url, onLoad) {
        var ticket = generation;
        var img = new Image();
        img.onload = function() {
            if (ticket !== generation) return;
            onLoad();
            console.log('[RandomPic] background loaded:', url);
        };
        img.onerror = function() {
            if (ticket !== generation) return;
            console.error('[RandomPic] background failed to load:', url);
        };
        img.src = url;
    }

    function clearBackground(el) {
        el.style.backgroundImage = 'none';
        el.classList.remove(LOADED_CLASS);
    }

    function applyBackground() {
        generation++;
        var body = document.body;
        var container = document.getElementById(CONTAINER_ID);
        var themed = !!body && body.classList.contains(THEME_CLASS);

        if (backgroundDisabled) {
            if (container) clearBackground(container);
            if (themed) clearBackground(body);
            console.log('[RandomPic] background disabled');
            return;
        }

        var url;
        if (container) {
            url = background();
            if (!url) return;
            probe(url, function() {
                container.style.backgroundImage = "url('" + url + "')";
                container.classList.add(LOADED_CLASS);
                document.documentElement.style.setProperty('--card-bg', 'var(--card-bg-transparent)');
                document.documentElement.style.setProperty('--float-panel-bg', 'var(--float-panel-bg-transparent)');
            });
        } else if (themed) {
            url = background();
            if (!url) return;
            probe(url, function() {
                body.style.backgroundImage = "url('" + url + "')";
                body.style.backgroundPosition = 'center top';
                body.style.backgroundRepeat = 'no-repeat';
                body.style.backgroundAttachment = 'fixed';
                body.style.backgroundSize = 'cover';
                body.classList.add(LOADED_CLASS);
            });
        } else {
            var marked = document.querySelectorAll('[' + MARKER_ATTRIBUTE + ']');
            Array.prototype.forEach.call(marked, function(el) {
                if (el.id === CONTAINER_ID) return;
                var type = el.getAttribute(MARKER_ATTRIBUTE);
                if (!hasCategory(type)) return;
                var elUrl = pick(type);
                if (!elUrl) return;
                probe(elUrl, function() {
                    el.style.backgroundImage = 'url("' + elUrl + '")';
                    el.classList.add(LOADED_CLASS);
                });
            });
        }
    }

    function applyImageTags() {
        var imgs = document.getElementsByTagName('img');
        for (var i = 0; i < imgs.length; i++) {
            var img = imgs[i];
            var alt = img.getAttribute('alt');
            var src = img.getAttribute('src');

            if (alt === 'random:h' || (src && src.indexOf('/random/h') !== -1)) {
                img.src = pick('h');
            } else if (alt === 'random:v' || (src && src.indexOf('/random/v') !== -1)) {
                img.src = pick('v');
            }
        }
    }

    function init() {
        applyBackground();
        applyImageTags();
    }

    if (document.readyState === 'loading') {
        document.addEventListener('DOMContentLoaded', init);
    } else {
        init();
    }

    var hooksRegistered = false;
    function registerHooks() {
        if (hooksRegistered) return;
        if (window.swup && window.swup.hooks) {
            window.swup.hooks.on('content:replace', init);
            hooksRegistered = true;
            console.log('[RandomPic] registered content:replace hook');
        }
    }

    if (window.swup) {
        registerHooks();
    } else {
        document.addEventListener('swup:enable', registerHooks);
    }
    document.addEventListener('swup:contentReplaced', init);

    window.getRandomPicH = function() { return pick('h'); };
    window.getRandomPicV = function() { return pick('v'); };
    window.getRandomPic = function() { return pickByDevice(); };

    window.setBackgroundDisabled = function(disabled) {
        backgroundDisabled = Boolean(disabled);
        try {
            localStorage.setItem(DISABLED_KEY, backgroundDisabled ? 'true' : 'false');
        } catch (e) {
            console.error('[RandomPic] could not persist preference', e);
        }
        applyBackground();
    };

    window.refreshRandomBackground = function() {
        session = {};
        backgroundUrl = null;
        generation++;

        if (!backgroundDisabled) {
            applyBackground();
            console.log('[RandomPic] background refreshed');
        } else {
            console.log('[RandomPic] selection cleared, background is disabled');
        }
    };
})();
"##;

/// Renders `random.js` with `config` embedded as a JSON literal.
pub fn render_script(config: &RuntimeConfig) -> Result<String> {
    let json = config.to_json()?;
    Ok(SCRIPT_TEMPLATE.replace(CONFIG_PLACEHOLDER, &json))
}

pub fn write_script(dist: &Path, config: &RuntimeConfig) -> Result<PathBuf> {
    let path = dist.join(SCRIPT_FILE);
    fs::write(&path, render_script(config)?)?;
    info!("Wrote {}", path.display());
    Ok(path)
}
