//! Client for the mind-map REST service.
//!
//! A user browses spaces, opens one to see its node tree, selects nodes to
//! read their generated content, and adds, edits or deletes nodes. Content is
//! generated server-side after a node is created; [`net::poll`] waits for it.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`config`] | Environment-driven base URL and poll settings |
//! | [`net`] | HTTP client, wire types, errors, content polling |
//! | [`tree`] | Pure tree projection and traversal helpers |
//! | [`state`] | Per-view state: space list, space tree, node detail |
//! | [`render`] | Plain-text output for the terminal |

pub mod config;
pub mod net;
pub mod render;
pub mod state;
pub mod tree;
