// Fixture trees are compiled into test cases by test-generator, so new or edited samples need a rebuild.
fn main() {
    build_deps::rerun_if_changed_paths("samples/**").expect("Sample glob should be valid");
}
