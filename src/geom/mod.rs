//! Geometry backends and the navigation contract.
//!
//! This module provides:
//! - [`VolumeNavigator`] - the backend trait every geometry driver implements
//! - [`NavStep`] - one boundary query result (distance + crossed flag)
//! - [`BoxTree`] - the built-in nested axis-aligned box backend
//!
//! Backends are stateless against queries: every call carries the full
//! position and direction, so a navigator can serve many traversals at once.

pub mod boxtree;
pub mod navigator;

pub use boxtree::BoxTree;
pub use navigator::{NavStep, VolumeNavigator};
