use proptest::prelude::*;
use proptest::test_runner::Config as ProptestConfig;
use skein_lexer::Lexer;
use skein_syntax::TokenKind;

fn any_script_like() -> impl Strategy<Value = String> {
    let ascii =
        proptest::collection::vec(any::<char>().prop_filter("ascii", |c| c.is_ascii()), 0..40)
            .prop_map(|v| v.into_iter().collect::<String>());
    let unicode = proptest::collection::vec(any::<char>(), 0..20)
        .prop_map(|v| v.into_iter().collect::<String>());
    let sym = "€ Ω … \u{2028} ,;()[]{}?/* */ // \"\\ '\\ \n \t . 0x 1e 1_ >>>= === if else while for in return break continue throw try catch finally new typeof"
        .to_string();
    (ascii, unicode, any::<bool>()).prop_map(move |(a, b, f)| {
        let mut s = String::new();
        s.push_str(&a);
        if f {
            s.push_str(&sym);
        }
        s.push_str(&b);
        s.chars().take(200).collect()
    })
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 64, max_shrink_iters: 200, .. ProptestConfig::default()
    })]
    #[test]
    fn lex_random_input_should_not_panic(s in any_script_like()) {
        let result = Lexer::new(&s).lex();
        assert!(matches!(result.tokens.last().map(|t| t.kind), Some(TokenKind::Eof)));
        for t in &result.tokens {
            assert!(t.span.start.0 <= t.span.end.0);
            assert!(s.is_char_boundary(t.span.start.0 as usize));
            assert!(s.is_char_boundary(t.span.end.0 as usize));
        }
    }
}
