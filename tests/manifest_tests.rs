//! Manifest parsing tests.
//!
//! Exercise the parser on realistic multi-element manifests, checking task
//! counts, option inheritance and patch handling.

mod helpers;

use buildspec::manifest::{self, dedent};
use buildspec::{BuildError, OptionValue};
use helpers::TestEnv;

const MANIFEST: &str = r#"<?xml version="1.0"?>
<build>
    <options>
        cd vendor
        prefix local
    </options>

    <install>
        http://zlib.net/zlib-1.3.1.tar.gz
    </install>

    <options>
        cppflags local/include
        rpath local/lib
    </options>

    <install>
        http://download.sf.net/libpng-1.6.43.tar.gz enable-shared disable-static
        http://download.osgeo.org/libtiff/tiff-4.6.0.tar.gz

        <patch to="libtiff/tif_config.h.in">
            --- libtiff/tif_config.h.in
            +++ libtiff/tif_config.h.in
            @@ -1,3 +1,3 @@
             /* Define to 1 if you have the assert.h header. */
            -#undef HAVE_ASSERT_H
            +#define HAVE_ASSERT_H 1
        </patch>
        <patch to="configure">
            --- configure
            +++ configure
        </patch>
    </install>
</build>
"#;

#[test]
fn test_task_count_matches_source_lines() {
    let tasks = manifest::parse(MANIFEST).unwrap();
    assert_eq!(tasks.len(), 3);

    let sources: Vec<_> = tasks.iter().map(|t| t.source.as_str()).collect();
    assert_eq!(
        sources,
        [
            "http://zlib.net/zlib-1.3.1.tar.gz",
            "http://download.sf.net/libpng-1.6.43.tar.gz",
            "http://download.osgeo.org/libtiff/tiff-4.6.0.tar.gz",
        ]
    );
}

#[test]
fn test_options_only_reach_later_installs() {
    let tasks = manifest::parse(MANIFEST).unwrap();

    let zlib = &tasks[0];
    assert_eq!(zlib.options.get("cd"), Some(&"vendor".into()));
    assert_eq!(zlib.options.get("prefix"), Some(&"local".into()));
    assert!(!zlib.options.contains_key("cppflags"));

    for task in &tasks[1..] {
        assert_eq!(task.options.get("cd"), Some(&"vendor".into()));
        assert_eq!(task.options.get("cppflags"), Some(&"local/include".into()));
        assert_eq!(task.options.get("rpath"), Some(&"local/lib".into()));
    }
}

#[test]
fn test_local_flags_do_not_leak_to_siblings() {
    let tasks = manifest::parse(MANIFEST).unwrap();
    let (png, tiff) = (&tasks[1], &tasks[2]);

    let flags: Vec<_> = png.options.flags().collect();
    assert_eq!(flags, ["enable-shared", "disable-static"]);
    assert_eq!(tiff.options.flags().count(), 0);
}

#[test]
fn test_patches_dedented_and_shared() {
    let tasks = manifest::parse(MANIFEST).unwrap();
    let (zlib, png, tiff) = (&tasks[0], &tasks[1], &tasks[2]);

    assert!(zlib.patches.is_empty());
    assert_eq!(png.patches, tiff.patches);
    assert_eq!(png.patches.len(), 2);

    let header = &png.patches["libtiff/tif_config.h.in"];
    assert!(header.starts_with("\n--- libtiff/tif_config.h.in\n"));
    // The context line keeps its single leading space.
    assert!(header.contains("\n /* Define to 1"));
    assert!(header.contains("\n-#undef HAVE_ASSERT_H\n+#define HAVE_ASSERT_H 1\n"));
    assert_eq!(dedent(header), *header);
}

#[test]
fn test_global_flag_overridden_by_local_flag() {
    let tasks = manifest::parse(
        "<build><options>enable-foo no</options>\
         <install>\na.tar.gz enable-foo\nb.tar.gz\n</install></build>",
    )
    .unwrap();

    assert_eq!(tasks[0].options.get("enable-foo"), Some(&OptionValue::Flag));
    assert_eq!(tasks[1].options.get("enable-foo"), Some(&"no".into()));
}

#[test]
fn test_empty_manifest_has_no_tasks() {
    assert!(manifest::parse("<build/>").unwrap().is_empty());
    assert!(manifest::parse("<build><install>   </install></build>")
        .unwrap()
        .is_empty());
}

#[test]
fn test_mismatched_options_rejected() {
    let err = manifest::parse("<build><options>cd vendor prefix</options></build>").unwrap_err();
    assert!(matches!(err, BuildError::Parse(_)));
    assert!(err.to_string().contains("odd number"));
}

#[test]
fn test_load_from_disk() {
    let env = TestEnv::new();
    let path = env.write_manifest(MANIFEST);

    let tasks = manifest::load(&path).unwrap();
    assert_eq!(tasks.len(), 3);
}

#[test]
fn test_load_missing_file_is_io_error() {
    let env = TestEnv::new();
    let err = manifest::load(&env.root.join("nope.xml")).unwrap_err();
    assert!(matches!(err, BuildError::Io { .. }));
}

#[test]
fn test_comments_inside_elements_are_skipped() {
    let tasks = manifest::parse(
        r#"<build>
    <options>
        <!-- install under the project -->
        prefix out
    </options>
    <install>
        <!-- compression -->
        zlib-1.3.tar.gz
        <!-- images -->
        libpng-1.6.tar.gz
        <patch to="Makefile.in">
            <!-- fixes the install target -->
            --- Makefile.in
            +++ Makefile.in
        </patch>
    </install>
</build>"#,
    )
    .unwrap();

    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0].source, "zlib-1.3.tar.gz");
    assert_eq!(tasks[1].source, "libpng-1.6.tar.gz");
    assert_eq!(tasks[1].options.get("prefix"), Some(&"out".into()));

    let patch = &tasks[0].patches["Makefile.in"];
    assert!(patch.contains("--- Makefile.in\n+++ Makefile.in\n"));
    assert!(!patch.contains("fixes"));
}
