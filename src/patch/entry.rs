// src/patch/entry.rs

//! Entry file patching
//!
//! Rewires an entry page so that it loads the donor tracking libraries,
//! constructs `window.LMSProxy` itself and hands that proxy to the content's
//! `LMSProxySelections` picker instead of the parent frame. The page is
//! treated as opaque bytes: only ASCII markers are matched and inserted, so
//! pages in any ASCII-compatible encoding come out byte-exact apart from
//! the patches. Every step checks for its own result first, so patching an
//! already patched page changes nothing.

use crate::error::Result;
use regex::bytes::Regex;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;
use tracing::{debug, info, warn};

/// Config script reference that points one directory up
const PARENT_CONFIG_REF: &str = "\"../tc-config.js\"";
const LOCAL_CONFIG_REF: &str = "\"tc-config.js\"";
const CONFIG_SCRIPT: &str = "tc-config.js";
/// Closing part of the config script tag; libraries go right after it
const CONFIG_TAG_END: &str = "tc-config.js\"></script>";

/// Library references as they appear in the patched page
pub const TINCAN_REF: &str = "lib/tincan.js";
pub const LMS_REF: &str = "lib/lms.js";

const LIBRARY_TAGS: &str = concat!(
    "\n    <script type=\"text/javascript\" src=\"lib/tincan.js\"></script>",
    "\n    <script type=\"text/javascript\" src=\"lib/lms.js\"></script>",
);

/// Statement that constructs the tracking proxy
pub const PROXY_INIT: &str = "window.LMSProxy = lms();";

const PROXY_BLOCK: &str = r#"<script>
window.LMSProxy = lms();
if (window.LMSProxy) {
  if (!window.LMSProxy.SetReachedEnd && window.LMSProxy.SetPassed) {
    window.LMSProxy.SetReachedEnd = function () { window.LMSProxy.SetPassed(); };
  }
  if (!window.LMSProxy.TCAPI_SetCompleted && window.LMSProxy.SetPassed) {
    window.LMSProxy.TCAPI_SetCompleted = function () { window.LMSProxy.SetPassed(); };
  }
}
</script>
"#;

/// Picker call once it is redirected to the proxy
pub const PROXY_SELECTION: &str = "pick(LMSProxySelections, window.LMSProxy";

// Unicode mode is off so that `[^>]` and `\s` match single bytes and
// invalid UTF-8 never blocks a match.
static HEAD_OPEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i-u)<head(\s[^>]*)?>").unwrap());

static HEAD_CLOSE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i-u)</head\s*>").unwrap());

static PARENT_SELECTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?-u)pick\((LMSProxySelections),\s*window\.parent\b").unwrap()
});

/// Where the library tags ended up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LibraryInjection {
    /// At least one library reference was already present
    AlreadyPresent,
    /// Inserted after the config script tag
    AfterConfigScript,
    /// Inserted as the first children of `<head>`
    HeadStart,
    /// No anchor found; nothing inserted
    NoAnchor,
}

/// What a patch pass changed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchReport {
    /// `../tc-config.js` was rebased to the page's own directory
    pub config_rebased: bool,
    pub libraries: LibraryInjection,
    /// The proxy initialisation block was inserted
    pub proxy_injected: bool,
    /// Number of picker calls redirected from `window.parent`
    pub selections_redirected: usize,
    /// The text differs from the input
    pub changed: bool,
}

/// Apply every patch step to the raw page bytes
pub fn patch_entry_bytes(page: &[u8]) -> (Vec<u8>, PatchReport) {
    let mut txt = page.to_vec();

    let config_rebased = find(&txt, PARENT_CONFIG_REF).is_some();
    if config_rebased {
        txt = replace_all(&txt, PARENT_CONFIG_REF, LOCAL_CONFIG_REF);
    }

    let libraries = inject_libraries(&mut txt);
    let proxy_injected = inject_proxy(&mut txt);

    let selections_redirected = PARENT_SELECTION_RE.find_iter(&txt).count();
    if selections_redirected > 0 {
        txt = PARENT_SELECTION_RE
            .replace_all(&txt, "pick(${1}, window.LMSProxy".as_bytes())
            .into_owned();
    }

    let changed = txt != page;
    let report = PatchReport {
        config_rebased,
        libraries,
        proxy_injected,
        selections_redirected,
        changed,
    };
    (txt, report)
}

/// Apply every patch step to `text`
pub fn patch_entry_text(text: &str) -> (String, PatchReport) {
    let (patched, report) = patch_entry_bytes(text.as_bytes());
    // Patches only insert ASCII at ASCII boundaries, so valid input stays valid
    (String::from_utf8_lossy(&patched).into_owned(), report)
}

fn find(haystack: &[u8], needle: &str) -> Option<usize> {
    let needle = needle.as_bytes();
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

fn replace_all(haystack: &[u8], from: &str, to: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(haystack.len());
    let mut rest = haystack;
    while let Some(pos) = find(rest, from) {
        out.extend_from_slice(&rest[..pos]);
        out.extend_from_slice(to.as_bytes());
        rest = &rest[pos + from.len()..];
    }
    out.extend_from_slice(rest);
    out
}

fn insert_at(txt: &mut Vec<u8>, pos: usize, snippet: &str) {
    txt.splice(pos..pos, snippet.bytes());
}

fn inject_libraries(txt: &mut Vec<u8>) -> LibraryInjection {
    if find(txt, TINCAN_REF).is_some() || find(txt, LMS_REF).is_some() {
        return LibraryInjection::AlreadyPresent;
    }

    if find(txt, CONFIG_SCRIPT).is_some() {
        if let Some(pos) = find(txt, CONFIG_TAG_END) {
            insert_at(txt, pos + CONFIG_TAG_END.len(), LIBRARY_TAGS);
            return LibraryInjection::AfterConfigScript;
        }
        debug!("{} referenced without a plain script tag", CONFIG_SCRIPT);
    }

    let Some(pos) = HEAD_OPEN_RE.find(txt).map(|m| m.end()) else {
        return LibraryInjection::NoAnchor;
    };
    insert_at(txt, pos, LIBRARY_TAGS);
    LibraryInjection::HeadStart
}

fn inject_proxy(txt: &mut Vec<u8>) -> bool {
    if find(txt, PROXY_INIT).is_some() {
        return false;
    }

    let pos = HEAD_CLOSE_RE.find(txt).map_or(0, |m| m.start());
    insert_at(txt, pos, PROXY_BLOCK);
    true
}

/// Patch the entry file at `path` in place
///
/// Returns `Ok(None)` when the file does not exist. The file is rewritten
/// only if its content changed.
pub fn patch_entry_file(path: &Path) -> Result<Option<PatchReport>> {
    if !path.exists() {
        return Ok(None);
    }

    let original = fs::read(path)?;
    let (patched, report) = patch_entry_bytes(&original);
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    if report.libraries == LibraryInjection::NoAnchor {
        warn!("No config script or <head> in {}; library tags not inserted", name);
    }
    if report.selections_redirected > 0 {
        info!(
            "Patched {} LMSProxySelections pick() call(s) in {}",
            report.selections_redirected, name
        );
    }

    if report.changed {
        fs::write(path, patched)?;
        debug!("Rewrote {}", path.display());
    }

    Ok(Some(report))
}
