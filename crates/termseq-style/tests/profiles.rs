//! Formatting behavior across every compiled-in profile.

use std::sync::Arc;

use termseq_core::{BuiltinDatabase, CapabilityRegistry, Profile};
use termseq_style::{Formatter, FormatterResolver};

fn styles(profile: Profile, styling: bool) -> FormatterResolver {
    let registry = CapabilityRegistry::new(profile.as_str(), Arc::new(BuiltinDatabase::new()));
    FormatterResolver::new(Arc::new(registry), styling)
}

fn seq(styles: &FormatterResolver, attr: &str) -> String {
    styles.resolve(attr).unwrap().sequence().to_string()
}

#[test]
fn nested_formatting_on_every_profile() {
    for profile in Profile::all() {
        let t = styles(*profile, true);
        let green = t.resolve("green").unwrap();
        let bold = t.resolve("bold").unwrap();
        let normal = t.normal().unwrap();

        let inner = bold.paint(["-b-"]).unwrap();
        let given = green.paint(["-a-", inner.as_str(), "-e-"]).unwrap();

        let (g, b) = (seq(&t, "green"), seq(&t, "bold"));
        let inner_expected = if b.is_empty() {
            "-b-".to_string()
        } else {
            format!("{b}-b-{normal}")
        };
        assert_eq!(inner, inner_expected, "{profile}");
        let expected = match (g.is_empty(), b.is_empty()) {
            (true, _) => format!("-a-{inner}-e-"),
            (false, true) => format!("{g}-a--b--e-{normal}"),
            (false, false) => [g.as_str(), "-a-", &b, "-b-", &normal, &g, "-e-", &normal].concat(),
        };
        assert_eq!(given, expected, "{profile}");
    }
}

#[test]
fn compound_matches_its_parts_on_every_profile() {
    for profile in Profile::all() {
        let t = styles(*profile, true);
        let compound = t.resolve("bold_green").unwrap();
        assert_eq!(
            compound.sequence(),
            format!("{}{}", seq(&t, "bold"), seq(&t, "green")),
            "{profile}"
        );
    }
}

#[test]
fn movement_sugar_on_every_profile() {
    for profile in Profile::all() {
        let t = styles(*profile, true);
        let registry = t.registry();
        for (sugar, plain, counted) in [
            ("move_left", "cub1", "cub"),
            ("move_right", "cuf1", "cuf"),
            ("move_up", "cuu1", "cuu"),
            ("move_down", "cud1", "cud"),
        ] {
            let fmt = t.resolve(sugar).unwrap();
            let plain = registry.template(plain).unwrap_or_default();
            assert_eq!(fmt.sequence(), plain, "{profile} {sugar}");
            if !plain.is_empty() {
                assert_eq!(fmt.with_params(&[]).unwrap().sequence(), plain, "{profile} {sugar}");
            }
            let counted = registry.template(counted).unwrap_or_default();
            if !counted.is_empty() && !matches!(fmt, Formatter::Null) {
                let rendered = fmt.with_params(&[2]).unwrap();
                assert!(!rendered.sequence().is_empty(), "{profile} {sugar}");
            }
        }
    }
}

#[test]
fn without_styling_every_profile_is_plain() {
    for profile in Profile::all() {
        let t = styles(*profile, false);
        let given = t
            .resolve("green")
            .unwrap()
            .paint(["off ", "ON", " off"])
            .unwrap();
        assert_eq!(given, "off ON off", "{profile}");
        assert_eq!(
            t.resolve("on_bright_red_bold_bright_green_underline")
                .unwrap()
                .paint(["meh"])
                .unwrap(),
            "meh"
        );
    }
}
