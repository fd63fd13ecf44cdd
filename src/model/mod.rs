//! Canonical item graph
//!
//! Every format adapter ends up producing the same model: [`Item`]s keyed by
//! [`Iri`]s, holding [`Value`]s in an alias-aware [`PropertyList`].

mod alias;
mod iri;
mod item;
mod object_model;
mod property_list;
mod value;

pub use alias::*;
pub use iri::*;
pub use item::*;
pub use object_model::*;
pub use property_list::*;
pub use value::*;
