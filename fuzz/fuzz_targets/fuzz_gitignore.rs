#![no_main]

use arbitrary::Arbitrary;
use codesearch::config::gitignore_rules;
use libfuzzer_sys::fuzz_target;
use std::path::Path;

#[derive(Arbitrary, Debug)]
struct Input<'a> {
    root: &'a str,
    gitignore: &'a str,
    probe: &'a str,
}

fuzz_target!(|input: Input<'_>| {
    // Every translated rule must compile and match without panicking
    let root = Path::new("/").join(input.root);
    let rules = gitignore_rules(input.gitignore, &root);
    let matcher = rules.matcher(&root);
    let _ = matcher.is_excluded(&root.join(input.probe));
});
