//! Segment trie.
//!
//! Each node is one `/`-delimited path segment. Children are split by kind:
//! literal segments live in a map keyed by their text, and at most one
//! wildcard child (`:name`) binds whatever value appears in its position.
//!
//! ```text
//! insert /users            insert /users/:id         insert /users/:id/posts
//!
//! /                        /                         /
//! └── users  ●             └── users  ●              └── users  ●
//!                              └── :id  ●                └── :id  ●
//!                                                            └── posts  ●
//! ```
//!
//! Matching walks one segment at a time and prefers a literal child over the
//! wildcard. It never backtracks: once `/users/new` has taken the literal
//! `new` child, a failure further down is a miss even if `/users/:id/...`
//! would have matched. That keeps a lookup to a single pass over the path.

use std::collections::BTreeMap;
use std::fmt;

use crate::error::Error;
use crate::params::Params;

const WILDCARD_MARKER: char = ':';

/// One segment of a path tree.
///
/// Nodes own their children by value; the tree has no shared or back
/// references. `H` is the handler stored at routable nodes.
pub(crate) struct Node<H> {
    /// Literal text, or the wildcard name without its marker. Empty at the root.
    segment: String,
    /// Canonical path from the root to this node, e.g. `/users/:id`.
    full_path: String,
    wildcard: bool,
    static_children: BTreeMap<String, Node<H>>,
    wildcard_child: Option<Box<Node<H>>>,
    /// `None` for intermediate nodes.
    handler: Option<H>,
}

#[derive(Clone, Copy)]
enum Segment<'a> {
    Static(&'a str),
    Wildcard(&'a str),
}

impl<H> Node<H> {
    pub(crate) fn root() -> Self {
        Self::new("", "/".to_owned(), false)
    }

    fn new(segment: &str, full_path: String, wildcard: bool) -> Self {
        Self {
            segment: segment.to_owned(),
            full_path,
            wildcard,
            static_children: BTreeMap::new(),
            wildcard_child: None,
            handler: None,
        }
    }

    pub(crate) fn full_path(&self) -> &str {
        &self.full_path
    }

    pub(crate) fn handler(&self) -> Option<&H> {
        self.handler.as_ref()
    }

    /// Attaches `handler` at `path`, creating intermediate nodes as needed.
    ///
    /// A second registration of the same path replaces the handler. Returns
    /// the canonical full path of the terminal node. On error the tree is
    /// left exactly as it was.
    pub(crate) fn insert(&mut self, path: &str, handler: H) -> Result<&str, Error> {
        let segments = parse(path)?;
        self.check_wildcards(path, &segments)?;

        let mut node = self;
        for &segment in &segments {
            node = node.child_mut(segment);
        }
        node.handler = Some(handler);
        Ok(&node.full_path)
    }

    /// Walks `path` from this node and returns the handler-bearing node it
    /// ends on, along with the wildcard values bound on the way.
    ///
    /// Returns `None` when a segment has no candidate child, or when the walk
    /// ends on an intermediate node.
    pub(crate) fn search(&self, path: &str) -> Option<(&Node<H>, Params)> {
        let mut params = Params::new();
        let mut node = self;

        for segment in segments(path) {
            node = match node.static_children.get(segment) {
                Some(child) => child,
                None => {
                    let child = node.wildcard_child.as_deref()?;
                    params.bind(&child.segment, segment);
                    child
                }
            };
        }

        node.handler.is_some().then_some((node, params))
    }

    fn child_mut(&mut self, segment: Segment<'_>) -> &mut Node<H> {
        match segment {
            Segment::Static(text) => {
                let full_path = child_path(&self.full_path, text);
                self.static_children
                    .entry(text.to_owned())
                    .or_insert_with(|| Node::new(text, full_path, false))
            }
            Segment::Wildcard(name) => {
                let full_path = child_path(&self.full_path, &format!("{WILDCARD_MARKER}{name}"));
                &mut **self
                    .wildcard_child
                    .get_or_insert_with(|| Box::new(Node::new(name, full_path, true)))
            }
        }
    }

    /// Read-only pass over the existing tree: a wildcard may only be reused
    /// under its own name.
    fn check_wildcards(&self, path: &str, segments: &[Segment<'_>]) -> Result<(), Error> {
        let mut node = Some(self);
        for &segment in segments {
            let Some(current) = node else { break };
            node = match segment {
                Segment::Static(text) => current.static_children.get(text),
                Segment::Wildcard(name) => match current.wildcard_child.as_deref() {
                    Some(existing) if existing.segment != name => {
                        return Err(Error::WildcardConflict {
                            path: path.to_owned(),
                            name: name.to_owned(),
                            existing: existing.segment.clone(),
                            at: current.full_path.clone(),
                        });
                    }
                    other => other,
                },
            };
        }
        Ok(())
    }

    fn render(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        write!(f, "{:indent$}|-> ", "", indent = depth * 2)?;
        if self.wildcard {
            write!(f, "{WILDCARD_MARKER}{} ", self.segment)?;
        } else if !self.segment.is_empty() {
            write!(f, "{} ", self.segment)?;
        }
        writeln!(f, "[ uri: '{}' handler: {} ]", self.full_path, self.handler.is_some())?;

        for child in self.static_children.values() {
            child.render(f, depth + 1)?;
        }
        if let Some(child) = &self.wildcard_child {
            child.render(f, depth + 1)?;
        }
        Ok(())
    }
}

/// Indented listing of the subtree: segment, full path and whether the node
/// is routable, literal children before the wildcard.
impl<H> fmt::Display for Node<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.render(f, 0)
    }
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

fn parse(path: &str) -> Result<Vec<Segment<'_>>, Error> {
    if !path.starts_with('/') {
        return Err(Error::InvalidPath(path.to_owned()));
    }
    segments(path)
        .map(|s| match s.strip_prefix(WILDCARD_MARKER) {
            Some("") => Err(Error::EmptyWildcard(path.to_owned())),
            Some(name) => Ok(Segment::Wildcard(name)),
            None => Ok(Segment::Static(s)),
        })
        .collect()
}

fn child_path(parent: &str, segment: &str) -> String {
    if parent == "/" {
        format!("/{segment}")
    } else {
        format!("{parent}/{segment}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree(paths: &[&'static str]) -> Node<&'static str> {
        let mut root = Node::root();
        for path in paths {
            root.insert(path, *path).unwrap();
        }
        root
    }

    fn matched(root: &Node<&'static str>, path: &str) -> Option<(&'static str, Params)> {
        root.search(path).map(|(node, params)| (*node.handler().unwrap(), params))
    }

    #[test]
    fn dump_lists_every_node() {
        let root = tree(&["/users", "/users/:id", "/users/:id/subscriptions"]);

        let expected = "|-> [ uri: '/' handler: false ]\n\
                        \x20 |-> users [ uri: '/users' handler: true ]\n\
                        \x20   |-> :id [ uri: '/users/:id' handler: true ]\n\
                        \x20     |-> subscriptions [ uri: '/users/:id/subscriptions' handler: true ]\n";
        assert_eq!(root.to_string(), expected);
    }

    #[test]
    fn dump_orders_literals_before_the_wildcard() {
        let root = tree(&["/b/:x", "/b/a", "/a"]);

        let expected = "|-> [ uri: '/' handler: false ]\n\
                        \x20 |-> a [ uri: '/a' handler: true ]\n\
                        \x20 |-> b [ uri: '/b' handler: false ]\n\
                        \x20   |-> a [ uri: '/b/a' handler: true ]\n\
                        \x20   |-> :x [ uri: '/b/:x' handler: true ]\n";
        assert_eq!(root.to_string(), expected);
    }

    #[test]
    fn wildcard_binds_segment_value() {
        let root = tree(&["/users/:id", "/users/:id/subscriptions"]);

        let (handler, params) = matched(&root, "/users/42").unwrap();
        assert_eq!(handler, "/users/:id");
        assert_eq!(params.get("id"), Some("42"));

        let (handler, params) = matched(&root, "/users/42/subscriptions").unwrap();
        assert_eq!(handler, "/users/:id/subscriptions");
        assert_eq!(params.get("id"), Some("42"));
    }

    #[test]
    fn literal_child_wins_over_wildcard() {
        let root = tree(&["/users/new", "/users/:id"]);

        let (handler, params) = matched(&root, "/users/new").unwrap();
        assert_eq!(handler, "/users/new");
        assert!(params.is_empty());

        let (handler, _) = matched(&root, "/users/old").unwrap();
        assert_eq!(handler, "/users/:id");
    }

    #[test]
    fn no_backtracking_after_a_literal_match() {
        let root = tree(&["/users/new", "/users/:id/posts"]);

        assert!(matched(&root, "/users/7/posts").is_some());
        assert!(matched(&root, "/users/new/posts").is_none());
    }

    #[test]
    fn intermediate_node_is_not_a_match() {
        let root = tree(&["/users/:id/subscriptions"]);

        assert!(matched(&root, "/users").is_none());
        assert!(matched(&root, "/users/1").is_none());
    }

    #[test]
    fn segment_count_must_agree() {
        let root = tree(&["/users/:id"]);

        assert!(matched(&root, "/users/1/2").is_none());
        assert!(matched(&root, "/").is_none());
    }

    #[test]
    fn matching_is_case_sensitive() {
        let root = tree(&["/users"]);
        assert!(matched(&root, "/Users").is_none());
    }

    #[test]
    fn empty_tree_matches_nothing() {
        let root: Node<&'static str> = Node::root();
        assert!(root.search("/").is_none());
        assert!(root.search("").is_none());
        assert!(root.search("/anything").is_none());
    }

    #[test]
    fn root_is_routable_only_when_registered() {
        let root = tree(&["/"]);
        let (node, params) = root.search("/").unwrap();
        assert_eq!(node.full_path(), "/");
        assert!(params.is_empty());
    }

    #[test]
    fn reinsert_replaces_handler() {
        let mut root = Node::root();
        root.insert("/users", "first").unwrap();
        root.insert("/users", "second").unwrap();

        let (node, _) = root.search("/users").unwrap();
        assert_eq!(node.handler(), Some(&"second"));
    }

    #[test]
    fn insert_returns_canonical_path() {
        let mut root = Node::root();
        assert_eq!(root.insert("//users//:id/", "h").unwrap(), "/users/:id");
        assert_eq!(root.insert("/", "h").unwrap(), "/");
    }

    #[test]
    fn same_wildcard_name_is_reused() {
        let mut root = tree(&["/users/:id"]);
        root.insert("/users/:id/posts", "/users/:id/posts").unwrap();

        let (handler, params) = matched(&root, "/users/9/posts").unwrap();
        assert_eq!(handler, "/users/:id/posts");
        assert_eq!(params.get("id"), Some("9"));
    }

    #[test]
    fn conflicting_wildcard_name_is_rejected_without_side_effects() {
        let mut root = tree(&["/users/:id"]);
        let before = root.to_string();

        let err = root.insert("/users/:name/profile/extra", "x").unwrap_err();
        match err {
            Error::WildcardConflict { name, existing, at, .. } => {
                assert_eq!(name, "name");
                assert_eq!(existing, "id");
                assert_eq!(at, "/users");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(root.to_string(), before);
    }

    #[test]
    fn malformed_paths_are_rejected() {
        let mut root: Node<&'static str> = Node::root();
        assert!(matches!(root.insert("", "x"), Err(Error::InvalidPath(_))));
        assert!(matches!(root.insert("users", "x"), Err(Error::InvalidPath(_))));
        assert!(matches!(root.insert("/users/:", "x"), Err(Error::EmptyWildcard(_))));
    }

    #[test]
    fn repeated_wildcard_name_keeps_deepest_value() {
        let root = tree(&["/users/:id/subscriptions/:id"]);
        let (_, params) = matched(&root, "/users/1/subscriptions/2").unwrap();
        assert_eq!(params.get("id"), Some("2"));
    }
}
