//! Property tests for the diagram parser.

use proptest::prelude::*;

use microzoo::parse;

fn component_line() -> impl Strategy<Value = String> {
    ("[a-zA-Z0-9]{0,8}", prop::sample::select(vec!["service", "database", "queue"]))
        .prop_map(|(name, kind)| format!("component Svc{name} <<{kind}>>"))
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 64,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: arbitrary text either parses or yields a line-numbered error.
    #[test]
    fn property_parse_never_panics(source in "(\\PC|\\n){0,400}") {
        if let Err(err) = parse("fuzz", &source) {
            prop_assert!(err.line >= 1);
            prop_assert!(err.line <= source.lines().count().max(1));
        }
    }

    /// PROPERTY: every declared component survives parsing, in order.
    #[test]
    fn property_declared_components_are_kept(lines in prop::collection::vec(component_line(), 1..8)) {
        let mut seen = std::collections::HashSet::new();
        let unique: Vec<String> = lines
            .into_iter()
            .filter(|l| seen.insert(l.split_whitespace().nth(1).unwrap().to_lowercase()))
            .collect();
        let source = format!("@startuml\n{}\n@enduml\n", unique.join("\n"));

        let system = parse("generated", &source).unwrap();
        prop_assert_eq!(system.components.len(), unique.len());
    }

    /// PROPERTY: comments and blank lines never change the result.
    #[test]
    fn property_comments_are_ignored(comment in "[a-z ]{0,30}") {
        let plain = parse("x", "component A <<service>>\n").unwrap();
        let noisy = parse("x", &format!("' {comment}\n\ncomponent A <<service>>\n// {comment}\n")).unwrap();
        prop_assert_eq!(plain.components.len(), noisy.components.len());
        prop_assert_eq!(&plain.components[0].id, &noisy.components[0].id);
    }
}
