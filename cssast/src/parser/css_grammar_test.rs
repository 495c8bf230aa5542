#[cfg(test)]
mod css_grammar_test {
    use crate::ast::*;
    use crate::config::Config;
    use crate::error::{ParseError, ParseErrorKind};
    use crate::parser::{is_unit, Parser, MAX_NESTING_DEPTH};
    use crate::tokenizer::tokenize;
    use cssast_macro::{assert_parse_error, assert_parse_node};

    fn assert_node<T, F: Fn(&mut Parser) -> Option<T>>(text: &str, f: F) -> T {
        println!("text: {text}");
        let mut parser = Parser::new(tokenize(text.as_bytes()));
        let node = f(&mut parser);
        assert!(parser.at_eof(), "did not consume all of `{text}`, stopped at {:?}", parser.current());
        let errors = parser.into_errors();
        assert!(errors.is_empty(), "unexpected errors while parsing `{text}`: {errors:?}");
        node.unwrap_or_else(|| panic!("did not parse expected node from text `{text}`"))
    }

    fn assert_error<T, F: Fn(&mut Parser) -> Option<T>>(text: &str, f: F, expected: ParseErrorKind) -> Vec<ParseError> {
        println!("text: {text}");
        let mut parser = Parser::new(tokenize(text.as_bytes()));
        let _ = f(&mut parser);
        let errors = parser.into_errors();
        assert!(!errors.is_empty(), "expected parse error `{expected:?}`, but none were found, while parsing `{text}`");
        assert_eq!(errors[0].kind, expected, "unexpected first error while parsing `{text}`: {errors:?}");
        errors
    }

    fn dump(text: &str) -> String {
        crate::parse_with_config(text.as_bytes(), &Config::default()).debug_dump()
    }

    fn stylesheet(text: &str) -> Stylesheet {
        assert_node(text, |p: &mut Parser| p.parse_stylesheet_fall())
    }

    fn basic(values: &[&str]) -> Vec<Value> {
        values.iter().map(|v| Value::basic(*v)).collect()
    }

    // ===============
    // end to end
    // ===============

    #[test]
    fn hex_color_and_hash_id() {
        let expected = r##"Stylesheet {
  Rules: [
    Selector {
      Selectors: [
        SelectorValue { Kind: ID, Value: "#main" }
        SelectorValue { Kind: Combinator, Value: ">" }
        SelectorValue { Kind: Class, Value: ".article" }
        SelectorValue { Kind: Element, Value: "p" }
        SelectorValue { Kind: Pseudo, Value: ":first-child" }
      ]
      Rules: [
        Declaration {
          Key: "color"
          Value: [
            BasicValue { Value: "#ff0000" }
          ]
          Important: false
        }
      ]
    }
  ]
}"##;
        assert_eq!(dump("#main > .article p:first-child { color: #ff0000; }"), expected);
    }

    #[test]
    fn hash_fallback_is_fused() {
        let sheet = stylesheet(".x { color: #1234ZZ; }");
        let Node::Selector(selector) = &sheet.rules[0] else {
            panic!("expected selector, got {}", sheet.rules[0]);
        };
        let Node::Declaration(declaration) = &selector.rules[0] else {
            panic!("expected declaration");
        };
        assert_eq!(declaration.value, basic(&["#1234ZZ"]));
    }

    #[test]
    fn custom_property_and_var() {
        let expected = r#"Stylesheet {
  Rules: [
    Selector {
      Selectors: [
        SelectorValue { Kind: Pseudo, Value: ":root" }
      ]
      Rules: [
        Declaration {
          Key: "--main-color"
          Value: [
            BasicValue { Value: "blue" }
          ]
          Important: false
        }
      ]
    }
    Selector {
      Selectors: [
        SelectorValue { Kind: Element, Value: "body" }
      ]
      Rules: [
        Declaration {
          Key: "color"
          Value: [
            FunctionValue {
              Name: "var"
              Args: [
                BasicValue { Value: "--main-color" }
              ]
            }
          ]
          Important: false
        }
      ]
    }
  ]
}"#;
        assert_eq!(dump(":root { --main-color: blue; } body { color: var(--main-color); }"), expected);
    }

    #[test]
    fn media_query_with_features() {
        let expected = r#"Stylesheet {
  Rules: [
    MediaAtRule {
      Query: MediaQuery {
        Expressions: [
          MediaQueryExpression {
            Not: false
            Only: false
            MediaType: "screen"
            Features: [
              MediaFeature { Name: "min-width", Value: "768px" }
              MediaFeature { Name: "max-width", Value: "1024px" }
            ]
          }
        ]
      }
      Rules: [
        Selector {
          Selectors: [
            SelectorValue { Kind: Class, Value: ".sidebar" }
          ]
          Rules: [
            Declaration {
              Key: "display"
              Value: [
                BasicValue { Value: "none" }
              ]
              Important: false
            }
          ]
        }
      ]
    }
  ]
}"#;
        assert_eq!(
            dump("@media screen and (min-width: 768px) and (max-width: 1024px) { .sidebar { display: none; } }"),
            expected
        );
    }

    #[test]
    fn keyframes_with_grouped_stops() {
        let expected = r#"Stylesheet {
  Rules: [
    KeyframesAtRule {
      Name: "multi-step"
      WebkitPrefix: false
      Stops: [
        KeyframeStop {
          Stops: [
            "0%"
            "100%"
          ]
          Rules: [
            Declaration {
              Key: "opacity"
              Value: [
                BasicValue { Value: "0" }
              ]
              Important: false
            }
          ]
        }
        KeyframeStop {
          Stops: [
            "25%"
            "75%"
          ]
          Rules: [
            Declaration {
              Key: "opacity"
              Value: [
                BasicValue { Value: "0.5" }
              ]
              Important: false
            }
          ]
        }
        KeyframeStop {
          Stops: [
            "50%"
          ]
          Rules: [
            Declaration {
              Key: "opacity"
              Value: [
                BasicValue { Value: "1" }
              ]
              Important: false
            }
          ]
        }
      ]
    }
  ]
}"#;
        assert_eq!(
            dump("@keyframes multi-step { 0%,100%{opacity:0;} 25%,75%{opacity:0.5;} 50%{opacity:1;} }"),
            expected
        );
    }

    #[test]
    fn import_with_layer_supports_and_media() {
        let expected = r#"Stylesheet {
  Rules: [
    ImportAtRule {
      Url: FunctionValue {
        Name: "url"
        Args: [
          StringValue { SingleQuote: false, Value: "complex.css" }
        ]
      }
      Layer: FunctionValue {
        Name: "layer"
        Args: [
          BasicValue { Value: "utilities" }
        ]
      }
      Supports: SupportsGroup {
        Conditions: [
          SupportsDeclaration {
            Key: "display"
            Value: [
              BasicValue { Value: "flex" }
            ]
          }
          SupportsOperator { Op: "and" }
          SupportsNot {
            Inner: SupportsDeclaration {
              Key: "color"
              Value: [
                BasicValue { Value: "green" }
              ]
            }
          }
        ]
      }
      Media: MediaQuery {
        Expressions: [
          MediaQueryExpression {
            Not: false
            Only: false
            MediaType: "screen"
            Features: [
              MediaFeature { Name: "min-width", Value: "1024px" }
            ]
          }
        ]
      }
    }
  ]
}"#;
        assert_eq!(
            dump(r#"@import url("complex.css") layer(utilities) supports((display: flex) and (not (color: green))) screen and (min-width: 1024px);"#),
            expected
        );
    }

    #[test]
    fn errors_follow_the_tree_in_debug_dump() {
        let expected = r#"Stylesheet {
  Rules: []
}
error css-unsupported-at-rule: 1:2: Unsupported at-rule (IDENT)"#;
        assert_eq!(dump("@property --x { syntax: '<color>'; }"), expected);
    }

    // ===============
    // stylesheet
    // ===============

    #[test]
    fn stylesheet_productions() {
        let f = |p: &mut Parser| p.parse_stylesheet_fall();
        assert_node("", f);
        assert_node("@charset \"demo\" ;", f);
        assert_node("body { margin: 0px; padding: 3em, 6em; }", f);
        assert_node("@media screen, projection { }", f);
        assert_node("@media screen and (max-width: 400px) {  @-ms-viewport { width: 320px; }}", f);
        assert_node("@-ms-viewport { width: 320px; height: 768px; }", f);
        assert_node("#boo, far {} \n.far boo {}", f);
        assert_node("@page { margin: 2.5cm; }", f);
        assert_node(r#"@font-face { font-family: "Example Font"; }"#, f);
        assert_node(r#"@namespace "http://www.w3.org/1999/xhtml";"#, f);
        assert_node("@namespace pref url(http://test);", f);
        assert_node(r#"E E[foo] E[foo="bar"] E[foo~="bar"] E[foo^="bar"] E[foo$="bar"] E[foo*="bar"] E[foo|="en"] {}"#, f);
        assert_node(r#"input[type="submit"] {}"#, f);
        assert_node("E:root E:nth-child(n) E:nth-last-child(2n+1) E:nth-of-type(n) E:first-child {}", f);
        assert_node("E::first-line E::first-letter E::before E::after {}", f);
        assert_node("E.warning E#myid E:not(s) {}", f);
        assert_node("*, ::after, ::before { box-sizing: border-box }", f);
        assert_node("/* header */ a { } /* footer */", f);

        assert_parse_node!("a { color: red }", stylesheet_fall);
        assert_parse_error!("@namespace;", stylesheet_fall, Expected);
        assert_parse_error!("@namespace url(http://test)", stylesheet_fall, Expected);
    }

    #[test]
    fn stylesheet_error() {
        let f = |p: &mut Parser| p.parse_stylesheet_fall();
        assert_error("#boo, far } \n.far boo {}", f, ParseErrorKind::Expected);
        assert_error("#boo, far { far: 43px; \n.far boo {}", f, ParseErrorKind::Expected);
        assert_error(r#"- @import "foo";"#, f, ParseErrorKind::Unexpected);
        assert_error("a { } }", f, ParseErrorKind::Unexpected);
        assert_error(";", f, ParseErrorKind::Unexpected);
    }

    #[test]
    fn comments_are_nodes_unless_disabled() {
        let sheet = stylesheet("/* a */ b { /* c */ color: red; }");
        assert_eq!(sheet.rules.len(), 2);
        assert_eq!(sheet.rules[0], Node::Comment(Comment { text: b"/* a */".to_vec() }));
        let Node::Selector(selector) = &sheet.rules[1] else {
            panic!("expected selector");
        };
        assert_eq!(selector.rules.len(), 2);
        assert_eq!(selector.rules[0].kind(), NodeKind::Comment);

        let config = Config {
            keep_comments: false,
            ..Config::default()
        };
        let (sheet, errors) = crate::parse_with_config(b"/* a */ b { /* c */ color: red; }", &config).into_parts();
        assert!(errors.is_empty());
        assert_eq!(sheet.rules.len(), 1);
        let Node::Selector(selector) = &sheet.rules[0] else {
            panic!("expected selector");
        };
        assert_eq!(selector.rules.len(), 1);
    }

    // ===============
    // selectors
    // ===============

    #[test]
    fn selector_atoms() {
        let selector = assert_parse_node!(r#"a[href^="http"]:not(.ext, #id) > li::before, *+b~c {}"#, selector);
        let expected = vec![
            SelectorValue::new(SelectorKind::Element, "a"),
            SelectorValue::new(SelectorKind::Attribute, r#"[href^="http"]"#),
            SelectorValue::new(SelectorKind::Pseudo, ":not(.ext, #id)"),
            SelectorValue::new(SelectorKind::Combinator, ">"),
            SelectorValue::new(SelectorKind::Element, "li"),
            SelectorValue::new(SelectorKind::Pseudo, "::before"),
            SelectorValue::new(SelectorKind::Combinator, ","),
            SelectorValue::new(SelectorKind::Element, "*"),
            SelectorValue::new(SelectorKind::Combinator, "+"),
            SelectorValue::new(SelectorKind::Element, "b"),
            SelectorValue::new(SelectorKind::Combinator, "~"),
            SelectorValue::new(SelectorKind::Element, "c"),
        ];
        assert_eq!(selector.selectors, expected);
        assert!(selector.rules.is_empty());
    }

    #[test]
    fn selector_pseudo_arguments_nest() {
        let selector = assert_parse_node!(".a:is(:not([multiple]), :where(.b)) {}", selector);
        assert_eq!(
            selector.selectors[1],
            SelectorValue::new(SelectorKind::Pseudo, ":is(:not([multiple]), :where(.b))")
        );
        let selector = assert_parse_node!("#abc:nth-child(2n+1) {}", selector);
        assert_eq!(selector.selectors[0], SelectorValue::new(SelectorKind::Id, "#abc"));
        assert_eq!(selector.selectors[1], SelectorValue::new(SelectorKind::Pseudo, ":nth-child(2n+1)"));
    }

    #[test]
    fn selector_block_members() {
        let selector = assert_parse_node!(".a { color: red; .b { margin: 0 } /* c */ ; }", selector);
        let kinds: Vec<NodeKind> = selector.rules.iter().map(|rule| rule.kind()).collect();
        assert_eq!(kinds, vec![NodeKind::Declaration, NodeKind::Selector, NodeKind::Comment]);
    }

    #[test]
    fn selector_error() {
        assert_parse_error!(". {}", selector, Expected);
        assert_parse_error!("# {}", selector, Expected);
        assert_parse_error!("a: {}", selector, Expected);
        assert_parse_error!("a ) b {}", selector, Unexpected);
        assert_parse_error!("a b", selector, Expected);
        assert_parse_error!("a { color: red;", selector, Expected);
        assert_parse_error!("[a {}", selector, Expected);

        let errors = assert_parse_error!("a { 12 ; color: red }", selector, Expected);
        assert_eq!(errors[0].message, "Expected property name");
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn at_rules_are_not_kept_in_rule_sets() {
        let mut parser = Parser::new(tokenize(b"a { @media print { b { } } color: red; }"));
        let selector = parser.parse_selector().unwrap();
        assert!(parser.at_eof());
        let errors = parser.into_errors();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "Unexpected token in selector");
        assert_eq!(selector.rules.len(), 1);
        assert_eq!(selector.rules[0].kind(), NodeKind::Declaration);
    }

    // ===============
    // declarations and values
    // ===============

    #[test]
    fn declaration() {
        let declaration = assert_parse_node!("margin: 0 auto !important", declaration);
        assert_eq!(declaration.key, b"margin");
        assert_eq!(declaration.value, basic(&["0", "auto"]));
        assert!(declaration.important);

        let declaration = assert_parse_node!("color: red ! IMPORTANT", declaration);
        assert!(declaration.important);

        let declaration = assert_parse_node!("font-family: Arial, 'Helvetica Neue', sans-serif", declaration);
        assert_eq!(
            declaration.value,
            vec![
                Value::basic("Arial"),
                Value::String(StringValue {
                    single_quote: true,
                    value: b"Helvetica Neue".to_vec()
                }),
                Value::basic("sans-serif"),
            ]
        );

        let declaration = assert_parse_node!("font: 1rem/1.5 serif", declaration);
        assert_eq!(declaration.value, basic(&["1rem", "/", "1.5", "serif"]));
    }

    #[test]
    fn declaration_error() {
        assert_parse_error!("color red", declaration, Expected);
        assert_parse_error!("color:", declaration, Expected);
        assert_parse_error!("color: ;", declaration, Expected);
        assert_parse_error!("12: red", declaration, Expected);
        assert_parse_error!("color: {", declaration, Unexpected);
    }

    #[test]
    fn error_position_and_message() {
        let (sheet, errors) = crate::parse(b"a {\n  color red;\n  margin: 0;\n}");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].to_string(), "2:9: Expected ':' after property name");
        assert_eq!(errors[0].token_kind.to_string(), "IDENT");
        let Node::Selector(selector) = &sheet.rules[0] else {
            panic!("expected selector");
        };
        assert_eq!(selector.rules.len(), 1);
    }

    #[test]
    fn nested_rule_set_or_declaration() {
        let selector = assert_parse_node!("a { b:hover { color: red } c: d; e f { } }", selector);
        let kinds: Vec<NodeKind> = selector.rules.iter().map(|rule| rule.kind()).collect();
        assert_eq!(kinds, vec![NodeKind::Selector, NodeKind::Declaration, NodeKind::Selector]);

        let errors = assert_parse_error!("a { color red }", selector, Expected);
        assert_eq!(errors[0].message, "Expected ':' after property name");
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn empty_custom_property_value() {
        let (sheet, errors) = crate::parse(b".btn {\n  --bs-btn-font-family: ;\n  --bs-btn-font-size: 1rem;\n}\n.card { --bs-card-height: ; }");
        assert!(errors.is_empty(), "{errors:?}");
        let Node::Selector(btn) = &sheet.rules[0] else {
            panic!("expected selector");
        };
        assert_eq!(btn.rules.len(), 2);
        let Node::Declaration(family) = &btn.rules[0] else {
            panic!("expected declaration");
        };
        assert_eq!(family.key, b"--bs-btn-font-family");
        assert!(family.value.is_empty());

        let declaration = assert_parse_node!("--x:", declaration);
        assert!(declaration.value.is_empty());
        assert_parse_error!("x: ;", declaration, Expected);
    }

    #[test]
    fn stray_exclamation_in_value() {
        let (sheet, errors) = crate::parse(b"a { color: red !foo }");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].to_string(), "1:16: Unexpected token in declaration value");
        let Node::Selector(selector) = &sheet.rules[0] else {
            panic!("expected selector");
        };
        let Node::Declaration(declaration) = &selector.rules[0] else {
            panic!("expected declaration");
        };
        assert_eq!(declaration.value, basic(&["red", "foo"]));
        assert!(!declaration.important);

        assert_parse_error!("f(!important)", value, Unexpected);
    }

    #[test]
    fn numbers_fuse_with_units() {
        assert_eq!(assert_parse_node!("10px", value), Value::basic("10px"));
        assert_eq!(assert_parse_node!("50%", value), Value::basic("50%"));
        assert_eq!(assert_parse_node!("-.5rem", value), Value::basic("-.5rem"));
        assert_eq!(assert_parse_node!(".25s", value), Value::basic(".25s"));
        assert_eq!(assert_parse_node!("+3", value), Value::basic("+3"));
        assert_eq!(assert_parse_node!("300DPI", value), Value::basic("300DPI"));
        assert_eq!(assert_parse_node!("1fr", value), Value::basic("1fr"));

        let declaration = assert_parse_node!("width: 10 px 3foo", declaration);
        assert_eq!(declaration.value, basic(&["10", "px", "3", "foo"]));
    }

    #[test]
    fn unit_table() {
        for unit in ["%", "px", "Q", "rem", "svmin", "dvh", "cqmax", "turn", "ms", "kHz", "dppx", "fr"] {
            assert!(is_unit(unit.as_bytes()), "{unit} should be a unit");
        }
        for word in ["", "foo", "pxx", "e3", "n"] {
            assert!(!is_unit(word.as_bytes()), "{word} should not be a unit");
        }
    }

    #[test]
    fn functions() {
        let value = assert_parse_node!("rgba(var(--x), .5)", value);
        assert_eq!(
            value,
            Value::Function(FunctionValue {
                name: b"rgba".to_vec(),
                args: vec![
                    Value::Function(FunctionValue {
                        name: b"var".to_vec(),
                        args: basic(&["--x"]),
                    }),
                    Value::basic(".5"),
                ],
            })
        );

        let value = assert_parse_node!("(1 + 2)", value);
        assert_eq!(
            value,
            Value::Function(FunctionValue {
                name: Vec::new(),
                args: basic(&["1", "+", "2"]),
            })
        );

        assert_parse_error!("rgb(1, 2", value, Expected);
        assert_parse_error!("rgb(1, 2;", value, Unexpected);
    }

    #[test]
    fn urls() {
        let url = |arg: Value| {
            Value::Function(FunctionValue {
                name: b"url".to_vec(),
                args: vec![arg],
            })
        };
        assert_eq!(assert_parse_node!("url( a.png )", value), url(Value::basic("a.png")));
        assert_eq!(
            assert_parse_node!("url( 'a.png' )", value),
            url(Value::String(StringValue {
                single_quote: true,
                value: b"a.png".to_vec()
            }))
        );
        assert_eq!(
            assert_parse_node!(r#"url("a.png")"#, value),
            url(Value::String(StringValue {
                single_quote: false,
                value: b"a.png".to_vec()
            }))
        );
    }

    #[test]
    fn illegal_tokens_in_values() {
        assert_parse_error!("< b", value, Unexpected);
        let errors = assert_error(
            "a { width: 1px ? 2px }",
            |p: &mut Parser| p.parse_selector(),
            ParseErrorKind::Unexpected,
        );
        assert_eq!(errors[0].message, "Unexpected token in declaration value");
    }

    // ===============
    // at-rules
    // ===============

    #[test]
    fn at_media() {
        let f = |p: &mut Parser| p.parse_stylesheet_fall();
        assert_node("@media asdsa { }", f);
        assert_node("@meDia sadd{}  ", f);
        assert_node("@media somename, othername2 { }", f);
        assert_node("@media only screen and (max-width:850px) { }", f);
        assert_node("@media screen and (color), projection and (color) { }", f);
        assert_node("@media not screen and (device-aspect-ratio: 16/9) { }", f);
        assert_node("@media print and (min-resolution: 300dpi) { }", f);
        assert_node("@media (prefers-reduced-motion: reduce) { .a { transition: none } }", f);
        assert_node("@media print { @page { margin: 1cm } }", f);

        let query = assert_node("not print, (hover), only screen", |p: &mut Parser| Some(p.parse_media_query()));
        assert_eq!(query.expressions.len(), 3);
        assert!(query.expressions[0].not);
        assert_eq!(query.expressions[0].media_type.as_deref(), Some(&b"print"[..]));
        assert_eq!(query.expressions[1].media_type, None);
        assert_eq!(
            query.expressions[1].features,
            vec![MediaFeature {
                name: b"hover".to_vec(),
                value: None
            }]
        );
        assert!(query.expressions[2].only);

        let feature = assert_parse_node!("(width >= 600px)", media_feature);
        assert_eq!(feature.value.as_deref(), Some(&b">= 600px"[..]));
        let feature = assert_parse_node!("(min-aspect-ratio: 16/9)", media_feature);
        assert_eq!(feature.value.as_deref(), Some(&b"16/9"[..]));
    }

    #[test]
    fn at_media_error() {
        let f = |p: &mut Parser| p.parse_stylesheet_fall();
        assert_error("@media screen and { }", f, ParseErrorKind::Expected);
        assert_error("@media screen { a { } ", f, ParseErrorKind::Expected);
        assert_error("@media screen { ) }", f, ParseErrorKind::Unexpected);
        assert_error("@media screen ] { }", f, ParseErrorKind::Unexpected);
        assert_error("@media (min-width: ) { }", f, ParseErrorKind::Expected);
        assert_error("@media (min-width: 1px { }", f, ParseErrorKind::Expected);
        assert_parse_error!("(: 1px)", media_feature, Expected);
    }

    #[test]
    fn at_keyframes() {
        let f = |p: &mut Parser| p.parse_at_rule();
        assert_node("@keyframes name {}", f);
        assert_node("@keyframes name { from {} to {}}", f);
        assert_node("@keyframes name { from { top: 0px; } 70%, 80% { top: 100px; } 100% { top: 50px; }}", f);
        assert_node("@keyframes name { from { top: 0px; left: 1px; right: 2px }}", f);

        let Node::Keyframes(keyframes) = assert_node(
            "@-webkit-keyframes spin { from { transform: rotate(0deg) } to { transform: rotate(360deg) } }",
            f,
        ) else {
            panic!("expected keyframes");
        };
        assert!(keyframes.webkit_prefix);
        assert_eq!(keyframes.name, b"spin");
        assert_eq!(keyframes.stops.len(), 2);

        let Node::Keyframes(keyframes) = assert_node(r#"@keyframes "quoted" { }"#, f) else {
            panic!("expected keyframes");
        };
        assert_eq!(keyframes.name, b"quoted");
        assert!(!keyframes.webkit_prefix);

        let stop = assert_parse_node!("0%, 50.5% { opacity: .5 }", keyframe_stop);
        assert_eq!(stop.stops, vec![b"0%".to_vec(), b"50.5%".to_vec()]);
        assert_eq!(stop.rules[0].value, basic(&[".5"]));
    }

    #[test]
    fn at_keyframes_error() {
        let f = |p: &mut Parser| p.parse_at_rule();
        assert_error("@keyframes )", f, ParseErrorKind::Expected);
        assert_error("@keyframes name { { top: 0px; } }", f, ParseErrorKind::Expected);
        assert_error("@keyframes name { from, #123 { } }", f, ParseErrorKind::Unexpected);
        assert_error("@keyframes name { cover 10% { } }", f, ParseErrorKind::Unexpected);
        assert_error("@keyframes name { from { top: 0px; }", f, ParseErrorKind::Expected);
        assert_parse_error!("from ;", keyframe_stop, Expected);
    }

    #[test]
    fn at_import() {
        let f = |p: &mut Parser| p.parse_at_rule();
        let import = |text: &str| match assert_node(text, f) {
            Node::Import(import) => import,
            node => panic!("expected import, got {node}"),
        };

        let rule = import(r#"@import "foo.css";"#);
        assert!(matches!(rule.url, Value::String(_)));
        assert_eq!((rule.layer, rule.supports, rule.media), (None, None, None));

        let rule = import("@import url(/css/screen.css) screen, projection;");
        assert_eq!(rule.media.map(|m| m.expressions.len()), Some(2));

        let rule = import(r#"@import url("override.css") layer;"#);
        assert_eq!(rule.layer, Some(Value::basic("layer")));

        let rule = import(r#"@import url("tabs.css") layer(framework.component);"#);
        assert!(matches!(rule.layer, Some(Value::Function(_))));

        let rule = import(r#"@import "mystyle.css" supports(display: flex);"#);
        assert_eq!(
            rule.supports,
            Some(SupportsCondition::Group {
                conditions: vec![SupportsCondition::Declaration {
                    key: b"display".to_vec(),
                    value: basic(&["flex"]),
                }],
            })
        );

        let rule = import(r#"@import url("fallback-layout.css") supports(not (display: flex));"#);
        let Some(SupportsCondition::Group { conditions }) = rule.supports else {
            panic!("expected supports group");
        };
        assert!(matches!(conditions[..], [SupportsCondition::Not { .. }]));

        import(r#"@import url("./700.css") only screen and (max-width: 700px);"#);
        import(r#"@ImPort "asdsadsa";"#);
    }

    #[test]
    fn at_import_error() {
        let f = |p: &mut Parser| p.parse_at_rule();
        assert_error("@import", f, ParseErrorKind::Expected);
        assert_error("@import;", f, ParseErrorKind::Expected);
        assert_error(r#"@import "a.css""#, f, ParseErrorKind::Expected);
        assert_error(r#"@import "a.css" layer layer;"#, f, ParseErrorKind::Unexpected);
        assert_error(r#"@import "a.css" screen, print (color) ];"#, f, ParseErrorKind::Unexpected);
        assert_error(r#"@import "a.css" supports((display: flex);"#, f, ParseErrorKind::Expected);
    }

    #[test]
    fn at_supports() {
        let f = |p: &mut Parser| p.parse_stylesheet_fall();
        assert_node("@supports ( display: flexbox ) { body { display: flexbox } }", f);
        assert_node("@supports not (display: flexbox) { .outline { box-shadow: 2px 2px 2px black; /* unprefixed last */ } }", f);
        assert_node("@supports ((transition-property: color) or (animation-name: foo)) and (transform: rotate(10deg)) { }", f);
        assert_node("@supports ((display: flexbox)) { }", f);
        assert_node("@supports (display: flexbox !important) { }", f);
        assert_node("@supports (grid-area: auto) { @media screen and (min-width: 768px) { .me { } } }", f);
        assert_node("@supports (column-width: 1rem) OR (-moz-column-width: 1rem) { }", f);
        assert_node("@supports selector(:has(a)) { }", f);

        let Node::Supports(supports) = assert_node(
            "@supports (display: grid) and (not (display: inline-grid)) { .a { float: none } }",
            |p: &mut Parser| p.parse_at_rule(),
        ) else {
            panic!("expected supports");
        };
        let SupportsCondition::Group { conditions } = &supports.condition else {
            panic!("expected group");
        };
        assert_eq!(conditions.len(), 3);
        assert_eq!(conditions[1], SupportsCondition::Operator { op: b"and".to_vec() });
        assert!(matches!(&conditions[2], SupportsCondition::Not { inner } if matches!(**inner, SupportsCondition::Declaration { .. })));
        assert_eq!(supports.rules.len(), 1);
    }

    #[test]
    fn at_supports_error() {
        let f = |p: &mut Parser| p.parse_stylesheet_fall();
        assert_error("@supports (display: flex { }", f, ParseErrorKind::Expected);
        assert_error("@supports () { }", f, ParseErrorKind::Expected);
        assert_error("@supports (display: ) { }", f, ParseErrorKind::Expected);
        assert_error("@supports not display { }", f, ParseErrorKind::Expected);
        assert_error("@supports (a: b) ] { }", f, ParseErrorKind::Unexpected);
    }

    #[test]
    fn at_charset() {
        let Node::Charset(charset) = assert_parse_node!(r#"@charset "UTF-8";"#, at_rule) else {
            panic!("expected charset");
        };
        assert_eq!(charset.charset, b"UTF-8");
        assert_parse_error!("@charset utf8;", at_rule, Expected);
        assert_parse_error!("@charset 'utf8'", at_rule, Expected);
    }

    #[test]
    fn at_font_face() {
        let Node::FontFace(font_face) = assert_parse_node!(
            r#"@font-face { font-family: "Example Font"; src: url(a.woff2) format("woff2"), url(a.woff); }"#,
            at_rule
        ) else {
            panic!("expected font-face");
        };
        assert_eq!(font_face.declarations.len(), 2);
        assert_eq!(font_face.declarations[1].value.len(), 3);
        assert_parse_node!("@font-face {}", at_rule);
        assert_parse_node!("@font-face { unicode-range: U+0021-007F }", at_rule);

        assert_parse_error!("@font-face ;", at_rule, Expected);
        assert_parse_error!("@font-face { font-style: normal; ) }", at_rule, Expected);
    }

    #[test]
    fn at_font_feature_values() {
        let Node::FontFeatureValues(rule) = assert_parse_node!(
            r#"@font-feature-values Font One, "Other Font" { @styleset { nice-style: 12; } @swash { fancy: 1 } }"#,
            at_rule
        ) else {
            panic!("expected font-feature-values");
        };
        assert_eq!(rule.font_families, vec![b"Font One".to_vec(), b"Other Font".to_vec()]);
        let names: Vec<&[u8]> = rule.blocks.iter().map(|b| &b.name[..]).collect();
        assert_eq!(names, vec![&b"styleset"[..], &b"swash"[..]]);

        assert_parse_error!("@font-feature-values Font One { a: b }", at_rule, Unexpected);
        assert_parse_error!("@font-feature-values { }", at_rule, Expected);
        assert_parse_error!("@font-feature-values Font ; { }", at_rule, Expected);
    }

    #[test]
    fn at_color_profile_and_counter_style() {
        let Node::ColorProfile(profile) = assert_parse_node!("@color-profile --fogra39 { src: url(a.icc) }", at_rule) else {
            panic!("expected color-profile");
        };
        assert!(!profile.device_cmyk);
        assert_eq!(profile.name.as_deref(), Some(&b"--fogra39"[..]));

        let Node::ColorProfile(profile) = assert_parse_node!("@color-profile device-cmyk { src: url(b.icc) }", at_rule) else {
            panic!("expected color-profile");
        };
        assert!(profile.device_cmyk);
        assert_eq!(profile.name, None);
        assert_parse_error!("@color-profile fogra { }", at_rule, Expected);

        let Node::CounterStyle(counter) =
            assert_parse_node!(r#"@counter-style thumbs { system: cyclic; symbols: "👍"; suffix: " "; }"#, at_rule)
        else {
            panic!("expected counter-style");
        };
        assert_eq!(counter.name, b"thumbs");
        assert_eq!(counter.declarations.len(), 3);
        assert_parse_error!("@counter-style { }", at_rule, Expected);
    }

    #[test]
    fn at_container() {
        let Node::Container(container) = assert_parse_node!(
            "@container sidebar (min-width: 400px) and (orientation: landscape) { .card { display: grid; } color: red; }",
            at_rule
        ) else {
            panic!("expected container");
        };
        assert_eq!(container.name.as_deref(), Some(&b"sidebar"[..]));
        assert_eq!(container.query.len(), 2);
        assert_eq!(
            container.query[0].features,
            vec![MediaFeature {
                name: b"min-width".to_vec(),
                value: Some(b"400px".to_vec())
            }]
        );
        let kinds: Vec<NodeKind> = container.rules.iter().map(|rule| rule.kind()).collect();
        assert_eq!(kinds, vec![NodeKind::Selector, NodeKind::Declaration]);

        let condition = assert_node("(min-width: 1px and max-width: 2px)", |p: &mut Parser| {
            Some(p.parse_container_condition())
        });
        assert_eq!(condition.features.len(), 2);

        assert_parse_node!("@container (min-width: 700px) { .card h2 { font-size: max(1.5em, 1.23em + 2cqi); } }", at_rule);
        assert_parse_error!("@container (min-width: 1px) { @media x {} }", at_rule, Unexpected);
        assert_parse_error!("@container (min-width: 1px) ] { }", at_rule, Unexpected);
        assert_parse_error!("@container (min-width: 1px) ;", at_rule, Expected);
    }

    #[test]
    fn at_layer_page_namespace_viewport() {
        let Node::Layer(layer) = assert_parse_node!("@layer base, components.buttons;", at_rule) else {
            panic!("expected layer");
        };
        assert_eq!(layer.names, vec![b"base".to_vec(), b"components.buttons".to_vec()]);
        assert_eq!(layer.rules, None);

        let Node::Layer(layer) = assert_parse_node!("@layer utilities { .p-4 { padding: 1rem } }", at_rule) else {
            panic!("expected layer");
        };
        assert_eq!(layer.rules.map(|rules| rules.len()), Some(1));
        assert_parse_node!("@layer { a { } }", at_rule);
        assert_parse_error!("@layer a", at_rule, Expected);

        let Node::Page(page) = assert_parse_node!("@page :first { margin: 1in; }", at_rule) else {
            panic!("expected page");
        };
        assert_eq!(page.selector.as_deref(), Some(&b":first"[..]));

        let Node::Namespace(namespace) = assert_parse_node!("@namespace svg url(http://www.w3.org/2000/svg);", at_rule) else {
            panic!("expected namespace");
        };
        assert_eq!(namespace.prefix.as_deref(), Some(&b"svg"[..]));
        assert!(matches!(namespace.url, Value::Function(_)));

        let Node::Viewport(viewport) = assert_parse_node!("@-ms-viewport { width: device-width; }", at_rule) else {
            panic!("expected viewport");
        };
        assert_eq!(viewport.name, b"-ms-viewport");
    }

    #[test]
    fn unsupported_at_rules_are_skipped() {
        let (sheet, errors) = crate::parse(b"@property --x { syntax: '<color>'; } @foo { a { } } @bar baz; .b { }");
        assert_eq!(sheet.rules.len(), 1);
        assert_eq!(sheet.rules[0].kind(), NodeKind::Selector);
        assert_eq!(errors.len(), 3);
        assert!(errors.iter().all(|e| e.kind == ParseErrorKind::Unsupported));
        assert_eq!(errors[0].to_string(), "1:2: Unsupported at-rule");

        assert_parse_error!("@ media {}", at_rule, Expected);
        assert_parse_error!("@{}", at_rule, Expected);
        assert_parse_error!("@-moz-document url(x) { a { } }", at_rule, Unsupported);
    }

    // ===============
    // config
    // ===============

    #[test]
    fn config_shapes_the_registry() {
        let config = Config::from_json(r#"{"atRuleAliases": {"-moz-keyframes": "keyframes"}, "disabledAtRules": ["media"]}"#).unwrap();
        let parse = crate::parse_with_config(b"@-moz-keyframes x { from { top: 0 } } @media print { }", &config);
        assert_eq!(parse.stylesheet().rules.len(), 1);
        assert_eq!(parse.stylesheet().rules[0].kind(), NodeKind::KeyframesAtRule);
        assert_eq!(parse.errors().len(), 1);
        assert_eq!(parse.errors()[0].kind, ParseErrorKind::Unsupported);
    }

    #[test]
    fn max_errors_caps_the_list() {
        let input = b"a { b } c { d } e { f } g { h: 1 }";
        let (sheet, errors) = crate::parse(input);
        assert_eq!(errors.len(), 3);
        let config = Config {
            max_errors: Some(1),
            ..Config::default()
        };
        let parse = crate::parse_with_config(input, &config);
        assert_eq!(parse.errors().len(), 1);
        assert_eq!(parse.stylesheet(), &sheet);
    }

    // ===============
    // nesting limit
    // ===============

    fn has_error(errors: &[ParseError], message: &str) -> bool {
        errors.iter().any(|error| error.message == message)
    }

    #[test]
    fn deeply_nested_rule_sets_are_cut_off() {
        let input = "a{".repeat(100_000);
        let (sheet, errors) = crate::parse(input.as_bytes());
        assert!(has_error(&errors, "Unexpected token in selector"));

        let mut depth = 0;
        let mut rules = &sheet.rules;
        while let Some(Node::Selector(selector)) = rules.first() {
            depth += 1;
            rules = &selector.rules;
        }
        assert_eq!(depth, MAX_NESTING_DEPTH);
    }

    #[test]
    fn deeply_nested_parentheses_are_cut_off() {
        let input = format!("a {{ b: {} }} c {{ d: e }}", "(".repeat(100_000));
        let (sheet, errors) = crate::parse(input.as_bytes());
        assert!(has_error(&errors, "Unexpected token in function"));
        assert_eq!(sheet.rules.len(), 2);

        let Node::Selector(selector) = &sheet.rules[0] else {
            panic!("expected selector");
        };
        let Node::Declaration(declaration) = &selector.rules[0] else {
            panic!("expected declaration");
        };
        let mut depth = 0;
        let mut value = declaration.value.first();
        while let Some(Value::Function(function)) = value {
            depth += 1;
            value = function.args.first();
        }
        assert!(depth > 0 && depth <= MAX_NESTING_DEPTH);
    }

    #[test]
    fn deeply_nested_at_rules_are_cut_off() {
        let (_, errors) = crate::parse("@media x {".repeat(100_000).as_bytes());
        assert!(has_error(&errors, "Unexpected token in nested at-rule"));

        let input = format!("@supports {} {{ }}", "(".repeat(100_000));
        let (_, errors) = crate::parse(input.as_bytes());
        assert!(has_error(&errors, "Unexpected token in supports condition"));

        let input = format!("@container {} {{ }}", "(".repeat(100_000));
        let (_, errors) = crate::parse(input.as_bytes());
        assert!(has_error(&errors, "Unexpected token in container rule"));
    }

    #[test]
    fn nesting_below_the_limit_is_kept() {
        let depth = MAX_NESTING_DEPTH - 1;
        let input = format!("{}{}", "a{".repeat(depth), "}".repeat(depth));
        let (sheet, errors) = crate::parse(input.as_bytes());
        assert!(errors.is_empty(), "{errors:?}");
        assert_eq!(sheet.rules.len(), 1);
    }

    // ===============
    // invariants
    // ===============

    fn check_value(value: &Value) {
        match value {
            Value::Basic(basic) => {
                let mut rest = &basic.value[..];
                if let [b'+' | b'-', tail @ ..] = rest {
                    rest = tail;
                }
                if let [b'.', tail @ ..] = rest {
                    rest = tail;
                }
                if rest.first().is_some_and(|b| b.is_ascii_digit()) {
                    let start = rest.iter().position(|b| !b.is_ascii_digit() && *b != b'.').unwrap_or(rest.len());
                    let suffix = &rest[start..];
                    assert!(suffix.is_empty() || is_unit(suffix), "bad unit in {value}");
                }
            }
            Value::String(_) => {}
            Value::Function(function) => function.args.iter().for_each(check_value),
        }
    }

    fn check_declaration(declaration: &Declaration) {
        assert!(!declaration.key.is_empty());
        assert!(
            !declaration.value.is_empty() || declaration.key.starts_with(b"--"),
            "empty value in {declaration}"
        );
        declaration.value.iter().for_each(check_value);
    }

    fn check_rules(rules: &[Node]) {
        for rule in rules {
            match rule {
                Node::Selector(selector) => {
                    for member in &selector.rules {
                        assert!(
                            matches!(member, Node::Declaration(_) | Node::Selector(_) | Node::Comment(_)),
                            "{} inside a rule-set",
                            member.kind()
                        );
                    }
                    check_rules(&selector.rules);
                }
                Node::Declaration(declaration) => check_declaration(declaration),
                Node::Media(media) => check_rules(&media.rules),
                Node::Supports(supports) => check_rules(&supports.rules),
                Node::Container(container) => check_rules(&container.rules),
                Node::Layer(layer) => check_rules(layer.rules.as_deref().unwrap_or_default()),
                Node::Keyframes(keyframes) => {
                    for stop in &keyframes.stops {
                        assert!(!stop.stops.is_empty());
                        stop.rules.iter().for_each(check_declaration);
                    }
                }
                Node::FontFace(font_face) => font_face.declarations.iter().for_each(check_declaration),
                _ => {}
            }
        }
    }

    #[test]
    fn random_css_like_input_terminates_and_keeps_invariants() {
        let pieces: &[&[u8]] = &[
            b"a", b"-", b".", b"#", b"1", b"%", b"px", b":", b";", b"{", b"}", b"(", b")", b"[", b"]",
            b",", b"@media", b"@keyframes", b"@import", b"@supports", b"@layer", b"@container",
            b"@font-feature-values", b"@page", b"@foo", b"@", b"!", b"important", b"\"s\"", b"url(x)",
            b"/*c*/", b" ", b"\n", b"and", b"not", b"from", b">", b"+", b"~", b"*", b"=", b"\xff",
        ];
        let mut rng = fastrand::Rng::with_seed(42);
        for _ in 0..500 {
            let mut input = Vec::new();
            for _ in 0..rng.usize(0..60) {
                input.extend_from_slice(pieces[rng.usize(..pieces.len())]);
            }
            let (sheet, _errors) = crate::parse(&input);
            check_rules(&sheet.rules);
        }
    }
}
