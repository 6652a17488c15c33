//! Pet health map: spatial annotation of a pet's body with optimistic persistence.
//!
//! This crate owns everything about the map that does not depend on a
//! particular rendering surface or network stack: mapping pointer positions to
//! resolution-independent fractions, the optimistic marker store and its
//! rollback ledger, the interaction state machine, SVG overlay rendering, and
//! the flatten-to-PNG export. The external marker and photo services are
//! reached only through the traits in [`gateway`]; the host supplies the
//! implementations.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Interaction controller; turns host events into [`engine::Action`]s |
//! | [`session`] | Async driver: sends queued persistence requests and reconciles outcomes |
//! | [`store`] | Ordered marker list with an explicit optimistic-operation ledger |
//! | [`marker`] | Marker type, ids, and the persisted list encoding |
//! | [`mapper`] | Screen pixel / logical canvas / fraction conversions |
//! | [`background`] | Silhouette or photo background and the command that switches it |
//! | [`input`] | Interaction modes, drafts, pointer kinds, keys |
//! | [`hit`] | Marker hit-testing in screen space |
//! | [`render`] | Interactive and export SVG overlays, marker legend |
//! | [`silhouette`] | Default body outline path |
//! | [`export`] | Flatten/export pipeline |
//! | [`gateway`] | Collaborator traits and request/outcome translation |
//! | [`consts`] | Canvas size, export scale, marker geometry and colors |

pub mod background;
pub mod consts;
pub mod engine;
pub mod export;
pub mod gateway;
pub mod hit;
pub mod input;
pub mod mapper;
pub mod marker;
pub mod render;
pub mod session;
pub mod silhouette;
pub mod store;

#[cfg(test)]
mod testing;
