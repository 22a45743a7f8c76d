use proptest::prelude::*;
use proptest::test_runner::Config as ProptestConfig;
use skein_parser::parse_source;

fn any_script_like() -> impl Strategy<Value = String> {
    let fragments = prop::sample::select(vec![
        "var ", "let ", "const ", "x", "y", " = ", "1", "0x1f", "'s'", "\"t\"", "(", ")", "[", "]",
        "{", "}", ",", ";", "\n", ".", "+", "-", "*", "/", "<", ">>>", "===", "!", "?", ":",
        "function ", "return ", "if ", "else ", "while ", "for ", " in ", "do ", "break", "continue",
        "try ", "catch ", "finally ", "throw ", "new ", "typeof ", "this", "null", "true", "++",
        "--", "&&", "||", "/* c */", "// c\n",
    ]);
    proptest::collection::vec(fragments, 0..60).prop_map(|v| v.concat())
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 64, max_shrink_iters: 200, .. ProptestConfig::default()
    })]
    #[test]
    fn parse_random_input_should_not_panic(s in any_script_like()) {
        let result = parse_source(&s);
        for d in &result.diagnostics {
            if let Some(span) = d.span {
                prop_assert!(span.start.0 <= span.end.0);
                prop_assert!(span.end.0 as usize <= s.len());
            }
        }
    }
}
