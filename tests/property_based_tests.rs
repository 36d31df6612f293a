//! Property-based tests for command construction and properties parsing

use proptest::prelude::*;

use nantrun::{
    CommandBuilder, ExecutionContext, LocalContext, Platform, VariableResolver, normalize_targets,
    parse_properties, replace_macro,
};

fn unix() -> impl ExecutionContext {
    LocalContext::new().platform_override(Platform::Unix)
}

proptest! {
    /// Normalized targets never contain tab, CR or LF and have no outer whitespace
    #[test]
    fn prop_normalize_targets_strips_line_breaks(targets in "[a-z \t\r\n]{0,40}") {
        let normalized = normalize_targets(&targets);
        prop_assert!(!normalized.contains(['\t', '\r', '\n']));
        prop_assert_eq!(normalized.trim(), normalized.as_str());
        prop_assert_eq!(
            normalized.split_whitespace().collect::<Vec<_>>(),
            targets.split_whitespace().collect::<Vec<_>>()
        );
    }

    /// Every target token becomes exactly one trailing argument
    #[test]
    fn prop_targets_become_trailing_arguments(
        targets in proptest::collection::vec("[A-Za-z][A-Za-z0-9._-]{0,10}", 0..6),
        separator in prop::sample::select(vec![" ", "\n", "\t", "\r\n", " \n\t "]),
    ) {
        let joined = targets.join(separator);
        let args = CommandBuilder::new()
            .build_file("build.xml")
            .targets(&joined)
            .build(&unix())
            .unwrap();

        prop_assert_eq!(&args.as_slice()[0], "nant");
        prop_assert_eq!(&args.as_slice()[1], "-buildfile:build.xml");
        prop_assert_eq!(&args.as_slice()[2..], targets.as_slice());
    }

    /// Windows wrapping always yields three tokens ending in the exit code relay
    #[test]
    fn prop_windows_wrapping_shape(
        build_file in "[A-Za-z0-9 ._\\\\-]{0,20}",
        targets in "[a-z ]{0,20}",
    ) {
        let ctx = LocalContext::new().platform_override(Platform::Windows);
        let args = CommandBuilder::new()
            .build_file(&build_file)
            .targets(&targets)
            .build(&ctx)
            .unwrap();

        prop_assert_eq!(args.len(), 3);
        prop_assert_eq!(&args.as_slice()[0], "cmd.exe");
        prop_assert_eq!(&args.as_slice()[1], "/C");
        let last = &args.as_slice()[2];
        prop_assert!(last.starts_with("\"NAnt.exe"));
        prop_assert!(last.ends_with(" && exit %ERRORLEVEL%\""));
    }

    /// Simple key=value lines parse back to the same pairs, in order
    #[test]
    fn prop_simple_properties_parse(
        entries in proptest::collection::btree_map("[a-z][a-z0-9_.]{0,8}", "[A-Za-z0-9_./-]{0,12}", 0..8)
    ) {
        let text = entries
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("\n");
        let parsed = parse_properties(&text).unwrap();
        let expected: Vec<(String, String)> = entries.into_iter().collect();
        prop_assert_eq!(parsed, expected);
    }

    /// Parsing arbitrary text either succeeds or reports invalid properties, never panics
    #[test]
    fn prop_parse_properties_total(text in "\\PC{0,64}") {
        let _ = parse_properties(&text);
    }

    /// Text without `$` is never changed by substitution
    #[test]
    fn prop_replace_macro_identity_without_dollar(text in "[^$]{0,40}") {
        let resolver = VariableResolver::new().with("A", "1");
        prop_assert_eq!(replace_macro(&text, &resolver), text);
    }
}
