//! Manifest discovery and parsing.
//!
//! A manifest is an XML document whose root holds `options` and `install`
//! elements in any order:
//!
//! ```xml
//! <build>
//!   <options>cd vendor prefix out</options>
//!   <install>
//!     http://example.org/zlib-1.3.tar.gz
//!     http://example.org/libpng-1.6.tar.gz enable-shared
//!     <patch to="Makefile.in">
//!       --- Makefile.in
//!       +++ Makefile.in
//!       ...
//!     </patch>
//!   </install>
//! </build>
//! ```
//!
//! `options` bodies are `key value` pairs that update the global options for
//! every later `install`. Each line of an `install` body is one task: a source
//! locator followed by bare flag names. Patches apply to every task of the
//! enclosing `install`.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{BuildError, Result};
use crate::spec::{InstallTask, OptionMap, OptionValue};

/// File name searched for by [`find_manifest`].
pub const MANIFEST_NAME: &str = "build.spec.xml";

/// Walk upward from `start` until a directory containing [`MANIFEST_NAME`]
/// is found.
pub fn find_manifest(start: &Path) -> Result<PathBuf> {
    find_manifest_below(start, None)
}

/// Like [`find_manifest`], but stops after checking `ceiling`.
pub fn find_manifest_below(start: &Path, ceiling: Option<&Path>) -> Result<PathBuf> {
    for dir in start.ancestors() {
        let candidate = dir.join(MANIFEST_NAME);
        if candidate.is_file() {
            debug!(manifest = %candidate.display(), "found manifest");
            return Ok(candidate);
        }
        if ceiling == Some(dir) {
            break;
        }
    }
    Err(BuildError::ManifestNotFound {
        start: start.to_path_buf(),
    })
}

/// Read and parse a manifest file.
pub fn load(path: &Path) -> Result<Vec<InstallTask>> {
    let text = fs::read_to_string(path).map_err(|e| BuildError::io(path, e))?;
    parse(&text)
}

/// Parse manifest text into install tasks, in document order.
pub fn parse(text: &str) -> Result<Vec<InstallTask>> {
    let doc = roxmltree::Document::parse(text).map_err(|e| BuildError::Parse(e.to_string()))?;

    let mut globals = OptionMap::new();
    let mut tasks = Vec::new();

    for element in doc.root_element().children().filter(|n| n.is_element()) {
        match element.tag_name().name() {
            "options" => {
                let declared = parse_options(&leading_text(element))?;
                globals.extend(&declared);
            }
            "install" => {
                // Frozen view of the options in effect for this element.
                let snapshot = globals.clone();
                let patches = parse_patches(element)?;

                for line in leading_text(element).lines() {
                    let mut tokens = line.split_whitespace();
                    let Some(source) = tokens.next() else {
                        continue;
                    };
                    let local: OptionMap = tokens.map(|flag| (flag, OptionValue::Flag)).collect();

                    let mut task = InstallTask::new(source, snapshot.merged(&local));
                    task.patches = patches.clone();
                    tasks.push(task);
                }
            }
            other => warn!(element = other, "ignoring unknown manifest element"),
        }
    }

    Ok(tasks)
}

/// Text before the first child element. Comments and processing
/// instructions are skipped, so text on either side of them is joined.
fn leading_text(element: roxmltree::Node) -> String {
    element
        .children()
        .take_while(|n| !n.is_element())
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .collect()
}

/// Parse a whitespace-separated `key value key value ...` list.
fn parse_options(body: &str) -> Result<OptionMap> {
    let tokens: Vec<&str> = body.split_whitespace().collect();
    if tokens.len() % 2 != 0 {
        return Err(BuildError::Parse(format!(
            "options list has an odd number of tokens ({}): every key needs a value",
            tokens.len()
        )));
    }
    Ok(tokens
        .chunks(2)
        .map(|pair| (pair[0], OptionValue::from(pair[1])))
        .collect())
}

fn parse_patches(install: roxmltree::Node) -> Result<BTreeMap<String, String>> {
    let mut patches = BTreeMap::new();
    for patch in install.children().filter(|n| n.has_tag_name("patch")) {
        let to = patch.attribute("to").ok_or_else(|| {
            let pos = install.document().text_pos_at(patch.range().start);
            BuildError::Parse(format!("<patch> at {} is missing the 'to' attribute", pos))
        })?;
        patches.insert(to.to_string(), dedent(&leading_text(patch)));
    }
    Ok(patches)
}

/// Remove the whitespace prefix common to every non-blank line.
///
/// Lines holding only whitespace are reduced to their line ending and do not
/// count towards the common prefix.
pub fn dedent(text: &str) -> String {
    let mut margin: Option<&str> = None;
    for line in text.lines() {
        if line.trim().is_empty() {
            continue;
        }
        let indent = &line[..line.len() - line.trim_start().len()];
        margin = Some(match margin {
            None => indent,
            Some(current) => common_prefix(current, indent),
        });
    }
    let margin = margin.unwrap_or("");

    let mut out = String::with_capacity(text.len());
    for line in text.split_inclusive('\n') {
        if line.trim().is_empty() {
            if line.ends_with("\r\n") {
                out.push_str("\r\n");
            } else if line.ends_with('\n') {
                out.push('\n');
            }
        } else {
            out.push_str(line.strip_prefix(margin).unwrap_or(line));
        }
    }
    out
}

fn common_prefix<'a>(a: &'a str, b: &str) -> &'a str {
    let end = a
        .char_indices()
        .zip(b.chars())
        .find(|((_, ca), cb)| ca != cb)
        .map(|((i, _), _)| i)
        .unwrap_or_else(|| a.len().min(b.len()));
    &a[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_task_with_global_options() {
        let tasks = parse(
            "<build><options>cd vendor</options>\
             <install>http://x/pkg-1.0.tar.gz enable-foo</install></build>",
        )
        .unwrap();

        assert_eq!(tasks.len(), 1);
        let task = &tasks[0];
        assert_eq!(task.source, "http://x/pkg-1.0.tar.gz");
        assert_eq!(task.options.get("cd"), Some(&"vendor".into()));
        assert_eq!(task.options.get("enable-foo"), Some(&OptionValue::Flag));
        assert_eq!(task.options.len(), 2);
        assert!(task.patches.is_empty());
    }

    #[test]
    fn test_later_options_overwrite_earlier() {
        let tasks = parse(
            "<build>\
               <options>cd a prefix out</options>\
               <install>first.tar.gz</install>\
               <options>cd b</options>\
               <install>second.tar.gz</install>\
             </build>",
        )
        .unwrap();

        assert_eq!(tasks[0].options.get("cd"), Some(&"a".into()));
        assert_eq!(tasks[1].options.get("cd"), Some(&"b".into()));
        assert_eq!(tasks[1].options.get("prefix"), Some(&"out".into()));
    }

    #[test]
    fn test_local_flag_overrides_only_its_task() {
        let tasks = parse(
            "<build><options>static no</options><install>\n\
               a.tar.gz static\n\
               b.tar.gz\n\
             </install></build>",
        )
        .unwrap();

        assert_eq!(tasks[0].options.get("static"), Some(&OptionValue::Flag));
        assert_eq!(tasks[1].options.get("static"), Some(&"no".into()));
    }

    #[test]
    fn test_odd_options_list_is_an_error() {
        let err = parse("<build><options>cd</options></build>").unwrap_err();
        assert!(matches!(err, BuildError::Parse(_)));
    }

    #[test]
    fn test_malformed_xml_is_an_error() {
        let err = parse("<build><install>a.tar.gz</build>").unwrap_err();
        assert!(matches!(err, BuildError::Parse(_)));
    }

    #[test]
    fn test_patches_shared_by_every_source_in_element() {
        let text = r#"<build>
  <install>
    one.tar.gz
    two.tar.gz
    <patch to="src/main.c">
      --- a
      +++ b
    </patch>
  </install>
  <install>three.tar.gz</install>
</build>"#;
        let tasks = parse(text).unwrap();

        assert_eq!(tasks.len(), 3);
        assert_eq!(tasks[0].patches, tasks[1].patches);
        assert_eq!(tasks[0].patches["src/main.c"], "\n--- a\n+++ b\n");
        assert!(tasks[2].patches.is_empty());
    }

    #[test]
    fn test_patch_without_target_is_an_error() {
        let err = parse("<build><install>a.tar.gz<patch>x</patch></install></build>").unwrap_err();
        assert!(err.to_string().contains("'to'"));
    }

    #[test]
    fn test_dedent_strips_common_margin() {
        let text = "    --- a/x\n    +++ b/x\n    @@ -1 +1 @@\n    -old\n      +new\n";
        assert_eq!(dedent(text), "--- a/x\n+++ b/x\n@@ -1 +1 @@\n-old\n  +new\n");
    }

    #[test]
    fn test_dedent_blank_lines() {
        let text = "\n    a\n   \n    b\n  ";
        assert_eq!(dedent(text), "\na\n\nb\n");
    }

    #[test]
    fn test_dedent_is_idempotent() {
        let text = "\t  line one\n\t    line two\n\n\t  end\n";
        let once = dedent(text);
        assert_eq!(dedent(&once), once);
    }

    #[test]
    fn test_find_manifest_walks_up() {
        let temp = tempfile::TempDir::new().unwrap();
        let nested = temp.path().join("a/b/c");
        fs::create_dir_all(&nested).unwrap();
        fs::write(temp.path().join("a").join(MANIFEST_NAME), "<build/>").unwrap();

        let found = find_manifest(&nested).unwrap();
        assert_eq!(found, temp.path().join("a").join(MANIFEST_NAME));
    }

    #[test]
    fn test_find_manifest_not_found() {
        let temp = tempfile::TempDir::new().unwrap();
        let nested = temp.path().join("a/b");
        fs::create_dir_all(&nested).unwrap();

        let err = find_manifest_below(&nested, Some(temp.path())).unwrap_err();
        assert!(matches!(err, BuildError::ManifestNotFound { ref start } if *start == nested));
    }

    #[test]
    fn test_find_manifest_checks_ceiling_itself() {
        let temp = tempfile::TempDir::new().unwrap();
        let nested = temp.path().join("a");
        fs::create_dir_all(&nested).unwrap();
        fs::write(temp.path().join(MANIFEST_NAME), "<build/>").unwrap();

        let found = find_manifest_below(&nested, Some(temp.path())).unwrap();
        assert_eq!(found, temp.path().join(MANIFEST_NAME));
        assert!(find_manifest_below(&nested, Some(nested.as_path())).is_err());
    }

    #[test]
    fn test_comments_do_not_hide_text() {
        let tasks = parse(
            "<build><options><!-- paths -->cd vendor</options>\
             <install><!-- zlib -->\nzlib-1.3.tar.gz\n<?hint x?>libpng.tar.gz\n</install></build>",
        )
        .unwrap();

        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[1].source, "libpng.tar.gz");
        assert_eq!(tasks[1].options.get("cd"), Some(&"vendor".into()));
    }

    #[test]
    fn test_unknown_element_is_skipped() {
        let tasks = parse(
            "<build><instal>typo.tar.gz</instal><install>real.tar.gz</install></build>",
        )
        .unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].source, "real.tar.gz");
    }
}
