//! Property-style tests for the radix trie: exact matches, wildcard
//! precedence, insertion-order independence and leaf enumeration.

use routrie::RadixTrie;

const PATHS: &[&str] = &[
    "/foo/bar/baz",
    "/foo/bar/buz",
    "/foo/bar/bed",
    "/foo/bar",
    "/foo/bar/bug",
    "/foo/biz/fiz",
    "/hi",
    "/contact",
    "/co",
    "/c",
    "/a",
    "/ab",
    "/doc/",
    "/doc/go_faq.html",
    "/doc/go1.html",
    "/α",
    "/β",
];

fn build(paths: &[&str]) -> RadixTrie<usize> {
    let mut trie = RadixTrie::new();
    for (idx, path) in paths.iter().enumerate() {
        trie.add(path, idx);
    }
    trie
}

#[test]
fn every_registered_path_resolves_to_its_own_value() {
    let trie = build(PATHS);
    for (idx, path) in PATHS.iter().enumerate() {
        assert_eq!(trie.get(path), Some(&idx), "path {path}");
    }
}

#[test]
fn unregistered_paths_without_wildcard_ancestors_miss() {
    let trie = build(PATHS);
    for miss in [
        "/foo",
        "/foo/",
        "/foo/bar/",
        "/foo/bar/baz/qux",
        "/doc",
        "/d",
        "/",
        "/zzz",
        "foo/bar",
        "/αβ",
    ] {
        assert_eq!(trie.get(miss), None, "query {miss:?}");
    }
}

#[test]
fn insertion_order_does_not_affect_lookups() {
    let mut forward = RadixTrie::new();
    for path in PATHS {
        forward.add(path, (*path).to_string());
    }
    let mut backward = RadixTrie::new();
    for path in PATHS.iter().rev() {
        backward.add(path, (*path).to_string());
    }

    let queries: Vec<String> = PATHS
        .iter()
        .map(|p| (*p).to_string())
        .chain(PATHS.iter().map(|p| format!("{p}/extra")))
        .chain(["/zzz".to_string(), "/f".to_string(), "/doc/go".to_string()])
        .collect();

    for query in &queries {
        assert_eq!(forward.get(query), backward.get(query), "query {query}");
    }
}

#[test]
fn wildcard_insertion_order_does_not_affect_lookups() {
    let sets: [&[&str]; 2] = [
        &["/api/*", "/api/health", "/api/v1/*", "/api/v1/users"],
        &["/api/v1/users", "/api/v1/*", "/api/health", "/api/*"],
    ];

    for (set_idx, set) in sets.iter().enumerate() {
        let mut trie = RadixTrie::new();
        for path in set.iter() {
            trie.add(path, (*path).to_string());
        }

        let expect = [
            ("/api/health", Some("/api/health")),
            ("/api/other", Some("/api/*")),
            ("/api/v1/users", Some("/api/v1/users")),
            ("/api/v1/anything", Some("/api/v1/*")),
            ("/api/v1/users/42", Some("/api/v1/*")),
            ("/api", None),
            ("/outside", None),
        ];
        for (query, want) in expect {
            assert_eq!(
                trie.get(query).map(String::as_str),
                want,
                "set {set_idx}, query {query}"
            );
        }
    }
}

#[test]
fn wildcard_covers_every_suffix_unless_shadowed() {
    let mut trie = RadixTrie::new();
    trie.add("/files/*", "catchall");
    trie.add("/files/index", "index");

    assert_eq!(trie.get("/files/index"), Some(&"index"));
    for query in ["/files/", "/files/a", "/files/a/b/c", "/files/index2"] {
        assert_eq!(trie.get(query), Some(&"catchall"), "query {query}");
    }
    assert_eq!(trie.get("/files"), None);
}

#[test]
fn nearest_enclosing_wildcard_wins() {
    let mut trie = RadixTrie::new();
    trie.add("/s/*", "outer");
    trie.add("/s/inner/*", "inner");

    assert_eq!(trie.get("/s/inner/x"), Some(&"inner"));
    assert_eq!(trie.get("/s/inner/"), Some(&"inner"));
    assert_eq!(trie.get("/s/other"), Some(&"outer"));
    // "/s/inner" itself does not start with "/s/inner/", so the outer
    // wildcard takes it.
    assert_eq!(trie.get("/s/inner"), Some(&"outer"));
}

#[test]
fn leaves_enumerate_exactly_the_registered_paths() {
    let trie = build(PATHS);
    let leaves = trie.leaves();
    assert_eq!(leaves.len(), PATHS.len());
    for (idx, path) in PATHS.iter().enumerate() {
        assert_eq!(leaves.get(*path).copied(), Some(&idx), "leaf {path}");
    }
}

#[test]
fn unicode_paths_are_matched_bytewise() {
    let trie = build(PATHS);
    let alpha = PATHS.iter().position(|p| *p == "/α").unwrap();
    let beta = PATHS.iter().position(|p| *p == "/β").unwrap();
    assert_eq!(trie.get("/α"), Some(&alpha));
    assert_eq!(trie.get("/β"), Some(&beta));
    assert_eq!(trie.get("/γ"), None);
}
