use std::fs;
use std::path::Path;

use jack_analyzer::parser::Parser;

fn parse_fixture(name: &str) -> String {
    let source = fs::read_to_string(Path::new("tests/fixtures").join(format!("{name}.jack")))
        .unwrap_or_else(|_| panic!("missing fixture {name}.jack"));
    let lines = Parser::new(&source).unwrap().parse_class().unwrap();
    lines.join("\n") + "\n"
}

fn expected(name: &str) -> String {
    fs::read_to_string(Path::new("tests/fixtures").join(format!("{name}.xml")))
        .unwrap_or_else(|_| panic!("missing expected output for {name}"))
}

#[test]
fn minimal_class_matches_expected_parse_tree() {
    assert_eq!(parse_fixture("Minimal"), expected("Minimal"));
}

#[test]
fn square_class_matches_expected_parse_tree() {
    assert_eq!(parse_fixture("Square"), expected("Square"));
}

#[test]
fn square_parse_tree_covers_full_grammar() {
    let xml = parse_fixture("Square");
    for tag in [
        "<class>",
        "<classVarDec>",
        "<subroutineDec>",
        "<parameterList>",
        "<subroutineBody>",
        "<varDec>",
        "<statements>",
        "<ifStatement>",
        "<whileStatement>",
        "<letStatement>",
        "<doStatement>",
        "<returnStatement>",
        "<expression>",
        "<expressionList>",
        "<term>",
    ] {
        assert!(xml.contains(tag), "expected {tag} in parse tree");
    }
}
