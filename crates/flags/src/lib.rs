//! # Flags resolution and operator algebra
//!
//! Resolves enumeration member names, integer literals, and comma lists
//! to bitmask values, and applies operator-driven expressions that
//! mutate an old value item by item.
//!
//! ## Expression grammar
//!
//! ```text
//! expression = item (sep item)*
//! sep        = whitespace | "," | "|" | ";"
//! item       = [operator] (member | integer | pattern)
//! operator   = "/" select  | "+" add        | "-" remove
//!            | "=" set     | ":" set-then-add | "&" keep
//! ```
//!
//! The current operator starts at `:` and persists across items until
//! another prefix replaces it; `:` itself decays to `+` after it fires,
//! so an unprefixed expression replaces the old value with its first
//! item and accumulates the rest. A bare operator item updates the
//! state without applying anything.
//!
//! ```
//! use skald_flags::{CombineOptions, FlagsEngine, FlagsTypeBuilder, Repr};
//!
//! let engine = FlagsEngine::new();
//! engine.register(
//!     FlagsTypeBuilder::new("Access", Repr::U32)
//!         .flags(true)
//!         .member("None", 0)
//!         .member("Read", 0x1)
//!         .member("Write", 0x2)
//!         .member("Execute", 0x4)
//!         .build()?,
//! )?;
//!
//! let value = engine.resolve_flags_expression(
//!     "Access",
//!     "Read,Execute",
//!     "+Write -Execute",
//!     None,
//!     None,
//!     CombineOptions::default(),
//! )?;
//! assert_eq!(value.bits(), 0x3);
//! assert_eq!(value.to_string(), "Read, Write");
//! # Ok::<(), skald_flags::FlagsError>(())
//! ```
//!
//! Values are carried as canonical `u64` bit patterns masked to the
//! type's declared width, so 32-bit signed flags types combine without
//! sign-extension artifacts; literals are round-trip checked against
//! that width on entry.

mod algebra;
mod cache;
mod engine;
mod error;
mod format;
mod mask;
mod op;
mod registry;
mod repr;
mod resolve;
mod tables;
mod value;

pub use algebra::CombineOptions;
pub use cache::Snapshot;
pub use engine::{EngineConfig, FlagsEngine};
pub use error::FlagsError;
pub use op::{FlagsOp, OpSet};
pub use registry::{FlagsMember, FlagsType, FlagsTypeBuilder, FlagsTypeDef, FlagsTypeReg};
pub use repr::Repr;
pub use resolve::ResolveFlags;
pub use tables::{Bucket, ParamSlots, ParamTables, TableOptions};
pub use value::FlagsValue;
