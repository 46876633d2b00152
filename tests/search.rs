//! Searches over the fixture trees through the library API

use codesearch::{CodeSearch, Entry, EntryKind, Error, Operation, SearchResult};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn open(name: &str) -> CodeSearch {
    CodeSearch::open(&fixture(name), false).expect("fixture tree should open")
}

/// (kind, name, line, col) of every entry for one file, order ignored
fn summary(result: &SearchResult, path: &Path) -> HashSet<(EntryKind, String, u32, u32)> {
    result
        .get(path)
        .unwrap_or_else(|| panic!("{} missing from result", path.display()))
        .iter()
        .map(|e: &Entry| (e.kind, e.name.clone(), e.line, e.col))
        .collect()
}

fn set(entries: &[(EntryKind, &str, u32, u32)]) -> HashSet<(EntryKind, String, u32, u32)> {
    entries
        .iter()
        .map(|(kind, name, line, col)| (*kind, name.to_string(), *line, *col))
        .collect()
}

#[test]
fn test_python_functions() {
    let search = open("python-tree");
    let result = search.search(Operation::Functions, "some").unwrap();
    let main = search.root().join("main.py");

    assert_eq!(
        summary(&result, &main),
        set(&[
            (EntryKind::Function, "some_fun", 1, 4),
            (EntryKind::Function, "hello_some", 7, 4),
        ])
    );
    assert_eq!(
        summary(&result, &search.root().join("pkg/util.py")),
        set(&[(EntryKind::Function, "awesome_path", 4, 4)])
    );
}

#[test]
fn test_python_classes() {
    let search = open("python-tree");
    let result = search.search(Operation::Classes, "Manager").unwrap();

    assert_eq!(
        summary(&result, &search.root().join("main.py")),
        set(&[
            (EntryKind::Class, "Manager", 16, 6),
            (EntryKind::Class, "CatManager", 19, 6),
            (EntryKind::Class, "CatManagerManager", 22, 6),
        ])
    );
    // searched, nothing matched
    assert!(result[&search.root().join("pkg/util.py")].is_empty());
}

#[test]
fn test_python_references() {
    let search = open("python-tree");
    let result = search.search(Operation::References, "some_fun").unwrap();

    assert_eq!(
        summary(&result, &search.root().join("main.py")),
        set(&[
            (EntryKind::Call, "some_fun", 12, 4),
            (EntryKind::Call, "some_fun", 24, 15),
            (EntryKind::Call, "some_fun", 28, 4),
        ])
    );
}

#[test]
fn test_config_file_exclusions_apply() {
    let search = open("python-tree");
    let hidden = search.root().join("ignored/hidden.py");

    assert!(!search.files().contains(&hidden));
    let result = search.search(Operation::Functions, "hidden").unwrap();
    assert!(!result.contains_key(&hidden));
    assert!(result.values().all(Vec::is_empty));
}

#[test]
fn test_result_follows_file_set_order() {
    let search = open("python-tree");
    let result = search.search(Operation::Functions, ".").unwrap();

    let keys: Vec<&PathBuf> = result.keys().collect();
    let in_walk_order: Vec<&PathBuf> = search.files().iter().filter(|p| result.contains_key(*p)).collect();
    assert_eq!(keys, in_walk_order);
}

#[test]
fn test_js_functions() {
    let search = open("js-tree");
    let result = search.search(Operation::Functions, "other").unwrap();

    assert_eq!(
        summary(&result, &search.root().join("es6.js")),
        set(&[
            (EntryKind::Function, "anotherFunction", 11, 6),
            (EntryKind::Function, "otherFun", 17, 9),
        ])
    );
}

#[test]
fn test_js_classes() {
    let search = open("js-tree");
    let result = search.search(Operation::Classes, "Hello").unwrap();

    assert_eq!(
        summary(&result, &search.root().join("es6.js")),
        set(&[
            (EntryKind::Class, "Hello", 1, 6),
            (EntryKind::Class, "HelloWorld", 15, 6),
        ])
    );
}

#[test]
fn test_js_references() {
    let search = open("js-tree");
    let result = search.search(Operation::References, "otherFun").unwrap();

    assert_eq!(
        summary(&result, &search.root().join("es6.js")),
        set(&[
            (EntryKind::Call, "otherFun", 7, 11),
            (EntryKind::Call, "otherFun", 21, 0),
        ])
    );
}

#[test]
fn test_cpp_functions() {
    let search = open("cpp-tree");
    let result = search.search(Operation::Functions, "do").unwrap();

    assert_eq!(
        summary(&result, &search.root().join("main.cpp")),
        set(&[
            (EntryKind::Function, "do_this", 1, 5),
            (EntryKind::Function, "does_that_do_this", 5, 5),
            (EntryKind::Function, "why_do_that", 16, 5),
        ])
    );
}

#[test]
fn test_cpp_classes() {
    let search = open("cpp-tree");
    let result = search.search(Operation::Classes, "Man").unwrap();

    assert_eq!(
        summary(&result, &search.root().join("main.cpp")),
        set(&[
            (EntryKind::Class, "Manager", 9, 7),
            (EntryKind::Class, "CatManager", 14, 6),
        ])
    );
}

#[test]
fn test_cpp_references_unsupported() {
    let search = open("cpp-tree");
    let result = search.search(Operation::References, "do_this").unwrap();

    assert!(result[&search.root().join("main.cpp")].is_empty());
}

#[test]
fn test_ts_definitions_and_references() {
    let search = open("ts-tree");
    let main = search.root().join("main.ts");

    let functions = search.search(Operation::Functions, "thing").unwrap();
    assert_eq!(
        summary(&functions, &main),
        set(&[
            (EntryKind::Function, "something", 13, 9),
            (EntryKind::Function, "nothing", 15, 16),
        ])
    );

    let classes = search.search(Operation::Classes, "^Shelf$").unwrap();
    assert_eq!(summary(&classes, &main), set(&[(EntryKind::Class, "Shelf", 17, 6)]));

    let calls = search.search(Operation::References, "something").unwrap();
    assert_eq!(
        summary(&calls, &main),
        set(&[
            (EntryKind::Call, "something", 21, 0),
            (EntryKind::Call, "something", 25, 12),
        ])
    );
}

#[test]
fn test_match_span_points_into_name() {
    let search = open("python-tree");
    let result = search.search(Operation::Classes, "Manager$").unwrap();

    for entry in &result[&search.root().join("main.py")] {
        let (start, end) = entry.match_span.unwrap();
        assert_eq!(&entry.name[start..end], "Manager");
    }
}

#[test]
fn test_include_source() {
    let search = CodeSearch::open(&fixture("python-tree"), true).unwrap();
    let result = search.search(Operation::Classes, "^Manager$").unwrap();

    let entry = &result[&search.root().join("main.py")][0];
    assert_eq!(entry.source_text.as_deref(), Some("class Manager:\n    pass"));
}

#[test]
fn test_nothing_found() {
    let search = open("js-tree");
    let result = search.search(Operation::Classes, "NoSuchClass").unwrap();

    assert!(codesearch::entry::is_empty_result(&result));
    assert!(result.contains_key(&search.root().join("es6.js")));
}

#[test]
fn test_invalid_dir() {
    assert!(matches!(
        CodeSearch::open(Path::new("./invalid-dir"), false),
        Err(Error::InvalidDirectoryPath(_))
    ));
}
