//! Generic resource lifecycle: plan, create, read, update, delete and import
//! for any item kind that supplies a [`ResourceKind`].
//!
//! Remote access goes through [`ItemsClient`]; every call runs inside an
//! [`OpScope`] so cancellation and per-operation deadlines apply uniformly.

pub mod client;
pub mod context;
pub mod controller;
mod error;
pub mod kind;
pub mod kinds;
pub mod memory;
pub mod planner;

pub use client::{CreateItemRequest, ItemsClient, Page, RemoteItem, UpdateItemRequest, WireDefinition, WirePart};
pub use context::{CallContext, OpScope};
pub use controller::{FoundItem, LifecycleController};
pub use error::{LifecycleError, RemoteError};
pub use kind::{KindDescriptor, NoConfiguration, NoProperties, ResourceKind};
pub use kinds::KindRegistry;
pub use memory::MemoryItemsClient;
pub use planner::{Plan, PlanAction, Planner, DEFINITION_UPDATE_SUMMARY};
